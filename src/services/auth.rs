//! Authentication service: login, and self-registration confirmed by an emailed code

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        enums::UserRole,
        user::{RegisterRequest, User, UserClaims, VerifyRequest},
        verification::VerificationCode,
    },
    repository::{users::NewUser, Repository},
    services::email::EmailService,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
    email: EmailService,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig, email: EmailService) -> Self {
        Self { repository, config, email }
    }

    /// Authenticate by email and password, returning a signed token
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users_get_by_email(email.trim())
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !verify_password(&user.password, password)? {
            tracing::info!(email = %user.email, "Failed login attempt");
            return Err(AppError::Authentication("Invalid email or password".to_string()));
        }

        let token = self.create_token_for_user(&user)?;
        tracing::info!(user_id = user.id, role = %user.role, "User logged in");
        Ok((token, user))
    }

    /// Start a registration: store the pending account and email a code
    pub async fn register(&self, request: RegisterRequest) -> AppResult<()> {
        request.validate()?;

        let email = request.email.trim().to_lowercase();
        if !email_domain_allowed(&email, &self.config.allowed_email_domains) {
            return Err(AppError::Validation(format!(
                "Registration requires an institutional email ({})",
                self.config.allowed_email_domains.join(", ")
            )));
        }
        if !request.role.is_self_assignable() {
            return Err(AppError::Validation(format!(
                "Role '{}' cannot be chosen at registration",
                request.role
            )));
        }
        if self.repository.users_email_exists(&email).await? {
            return Err(AppError::Conflict("An account with this email already exists".to_string()));
        }

        let code = generate_code();
        let now = Utc::now();
        let pending = VerificationCode {
            email: email.clone(),
            code_hash: hash_code(&code),
            name: request.name.trim().to_string(),
            department: request.department.trim().to_string(),
            role: request.role,
            password: hash_password(&request.password)?,
            supervisor: request.supervisor.filter(|s| !s.trim().is_empty()),
            attempts: 0,
            expires_at: now + Duration::minutes(self.config.otp_ttl_minutes),
            crea_date: now,
        };

        self.repository.verification_upsert(&pending).await?;
        self.email
            .send_verification_code(&email, &pending.name, &code, self.config.otp_ttl_minutes)
            .await?;

        tracing::info!(email = %email, role = %pending.role, "Verification code issued");
        Ok(())
    }

    /// Issue a fresh code for a pending registration
    pub async fn resend_code(&self, email: &str) -> AppResult<()> {
        let email = email.trim().to_lowercase();
        let pending = self
            .repository
            .verification_get(&email)
            .await?
            .ok_or_else(|| AppError::NotFound("No pending registration for this email".to_string()))?;

        let code = generate_code();
        let expires_at = Utc::now() + Duration::minutes(self.config.otp_ttl_minutes);
        self.repository
            .verification_refresh_code(&email, &hash_code(&code), expires_at)
            .await?;
        self.email
            .send_verification_code(&email, &pending.name, &code, self.config.otp_ttl_minutes)
            .await?;

        tracing::info!(email = %email, "Verification code re-issued");
        Ok(())
    }

    /// Check the emailed code and create the account
    pub async fn verify(&self, request: VerifyRequest) -> AppResult<User> {
        request.validate()?;
        let email = request.email.trim().to_lowercase();

        let pending = self
            .repository
            .verification_get(&email)
            .await?
            .ok_or_else(|| AppError::Verification("No pending registration for this email".to_string()))?;

        if pending.is_expired(Utc::now()) {
            self.repository.verification_delete(&email).await?;
            return Err(AppError::Verification("Verification code has expired".to_string()));
        }
        if pending.attempts >= self.config.otp_max_attempts {
            return Err(AppError::Verification(
                "Too many failed attempts, request a new code".to_string(),
            ));
        }
        if hash_code(request.code.trim()) != pending.code_hash {
            self.repository.verification_increment_attempts(&email).await?;
            return Err(AppError::Verification("Invalid verification code".to_string()));
        }

        let user = self.repository.users_create(&NewUser::from(&pending)).await?;
        self.repository.verification_delete(&email).await?;

        tracing::info!(user_id = user.id, email = %user.email, "Account verified and created");
        Ok(user)
    }

    /// Make sure the configured super-admin exists.
    ///
    /// An existing account with that email is promoted; otherwise one is created
    /// with the configured password. Returns `None` when nothing is configured.
    pub async fn bootstrap_super_admin(&self) -> AppResult<Option<User>> {
        let Some(email) = self
            .config
            .super_admin_email
            .as_deref()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
        else {
            return Ok(None);
        };

        if let Some(user) = self.repository.users_get_by_email(&email).await? {
            if user.role.is_super_admin() {
                return Ok(Some(user));
            }
            let user = self.repository.users_update_role(user.id, UserRole::SuperAdmin).await?;
            tracing::info!(user_id = user.id, email = %email, "Existing account promoted to super-admin");
            return Ok(Some(user));
        }

        let Some(password) = self.config.super_admin_password.as_deref().filter(|p| !p.is_empty())
        else {
            tracing::warn!(email = %email, "Super-admin account missing and no password configured");
            return Ok(None);
        };

        let name = email.split('@').next().unwrap_or(&email).to_string();
        let user = self
            .repository
            .users_create(&NewUser {
                name,
                email: email.clone(),
                department: "Administration".to_string(),
                role: UserRole::SuperAdmin,
                password: hash_password(password)?,
                supervisor: None,
            })
            .await?;
        tracing::info!(user_id = user.id, email = %email, "Super-admin account created");
        Ok(Some(user))
    }

    /// Create JWT token for a user
    pub fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            role: user.role,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }
}

/// Whether the email's domain is one of `domains` (or a subdomain of one)
pub fn email_domain_allowed(email: &str, domains: &[String]) -> bool {
    let Some((_, domain)) = email.rsplit_once('@') else {
        return false;
    };
    let domain = domain.to_lowercase();
    domains.iter().any(|allowed| {
        let allowed = allowed.trim().trim_start_matches('@').to_lowercase();
        domain == allowed || domain.ends_with(&format!(".{}", allowed))
    })
}

/// Random 6-digit code
pub fn generate_code() -> String {
    let num: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:06}", num)
}

/// SHA-256 hex digest of a verification code
pub fn hash_code(code: &str) -> String {
    hex::encode(Sha256::digest(code.as_bytes()))
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against its Argon2 hash
pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn institutional_domains() {
        let domains = vec!["university.edu".to_string()];
        assert!(email_domain_allowed("ada@university.edu", &domains));
        assert!(email_domain_allowed("ada@chem.university.edu", &domains));
        assert!(email_domain_allowed("Ada@UNIVERSITY.EDU", &domains));
        assert!(!email_domain_allowed("ada@gmail.com", &domains));
        assert!(!email_domain_allowed("ada@notuniversity.edu", &domains));
        assert!(!email_domain_allowed("university.edu", &domains));
    }

    #[test]
    fn codes_are_six_digits() {
        for _ in 0..50 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn code_hash_is_stable_hex() {
        let hash = hash_code("123456");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_code("123456"));
        assert_ne!(hash, hash_code("123457"));
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password(&hash, "correct horse").unwrap());
        assert!(!verify_password(&hash, "battery staple").unwrap());
    }
}
