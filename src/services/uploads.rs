//! Storage of uploaded profile photos under the uploads directory

use std::path::PathBuf;

use uuid::Uuid;

use crate::{
    config::UploadsConfig,
    error::{AppError, AppResult},
};

/// Public URL prefix under which the uploads directory is served
pub const PUBLIC_PREFIX: &str = "/uploads";

#[derive(Clone)]
pub struct UploadsService {
    config: UploadsConfig,
}

impl UploadsService {
    pub fn new(config: UploadsConfig) -> Self {
        Self { config }
    }

    /// Write a profile photo and return its public path
    pub async fn save_profile_photo(&self, content_type: Option<&str>, data: &[u8]) -> AppResult<String> {
        let ext = image_extension(content_type).ok_or_else(|| {
            AppError::Validation("Profile photo must be a PNG, JPEG or WebP image".to_string())
        })?;
        if data.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }
        if data.len() > self.config.max_bytes {
            return Err(AppError::Validation(format!(
                "Uploaded file exceeds {} bytes",
                self.config.max_bytes
            )));
        }

        let dir = PathBuf::from(&self.config.directory).join("profiles");
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Internal(format!("Cannot create upload directory: {}", e)))?;

        let file_name = format!("{}.{}", Uuid::new_v4(), ext);
        tokio::fs::write(dir.join(&file_name), data)
            .await
            .map_err(|e| AppError::Internal(format!("Cannot write upload: {}", e)))?;

        tracing::debug!(file = %file_name, bytes = data.len(), "Profile photo stored");
        Ok(format!("{}/profiles/{}", PUBLIC_PREFIX, file_name))
    }
}

/// File extension for an accepted image content type
pub fn image_extension(content_type: Option<&str>) -> Option<&'static str> {
    let mime = content_type?.split(';').next()?.trim().to_ascii_lowercase();
    match mime.as_str() {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}
