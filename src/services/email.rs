//! Email service for verification codes and booking notifications

use lettre::{
    message::{header::ContentType, Mailbox, Message, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};
use std::str::FromStr;

use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
    models::{booking::Booking, enums::BookingStatus},
};

#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Send the registration verification code
    pub async fn send_verification_code(
        &self,
        to: &str,
        name: &str,
        code: &str,
        ttl_minutes: i64,
    ) -> AppResult<()> {
        let subject = "Your Labslot verification code";
        let body = format!(
            r#"
Hello {name},

Your verification code is: {code}

This code will expire in {ttl_minutes} minutes.

If you didn't create a Labslot account, please ignore this email.
"#
        );

        self.send_email(to, subject, &body).await
    }

    /// Tell a user their booking was approved or rejected
    pub async fn send_booking_status(
        &self,
        to: &str,
        booking: &Booking,
        equipment_name: &str,
    ) -> AppResult<()> {
        let verdict = match booking.status {
            BookingStatus::Approved => "approved",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Completed => "marked as completed",
            BookingStatus::Pending => "received",
        };
        let subject = format!("Booking #{} {}", booking.id, verdict);
        let body = format!(
            r#"
Your booking of {equipment} on {date} at {start} ({duration} h) has been {verdict}.

Purpose: {purpose}
"#,
            equipment = equipment_name,
            date = booking.date.format("%Y-%m-%d"),
            start = booking.start_time.format("%H:%M"),
            duration = booking.duration,
            purpose = booking.purpose.as_deref().unwrap_or("-"),
        );

        self.send_email(to, &subject, &body).await
    }

    /// Generic email sending function
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        if !self.config.enabled {
            tracing::info!(to, subject, body, "Email delivery disabled, message not sent");
            return Ok(());
        }

        let from_name = self.config.smtp_from_name.as_deref().unwrap_or("Labslot");
        let from_mailbox = Mailbox::from_str(&format!("{} <{}>", from_name, self.config.smtp_from))
            .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;

        let to_mailbox = Mailbox::from_str(to)
            .map_err(|e| AppError::Internal(format!("Invalid to address: {}", e)))?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body(body)),
                    ),
            )
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        let mailer_builder = if self.config.smtp_use_tls {
            SmtpTransport::starttls_relay(&self.config.smtp_host)
                .map_err(|e| AppError::Internal(format!("Failed to create SMTP transport: {}", e)))?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        }
        .port(self.config.smtp_port);

        let mailer_builder = if let (Some(username), Some(password)) =
            (&self.config.smtp_username, &self.config.smtp_password)
        {
            mailer_builder.credentials(Credentials::new(username.clone(), password.clone()))
        } else {
            mailer_builder
        };

        let mailer = mailer_builder.build();

        // SmtpTransport is blocking
        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::Internal(format!("Email task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))?;

        tracing::info!(to, subject, "Email sent");
        Ok(())
    }
}

/// HTML alternative of a plain-text message; user-supplied text is escaped
fn html_body(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    format!("<html><body><pre>{}</pre></body></html>", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_part_escapes_user_text() {
        let html = html_body("Purpose: <script>alert(1)</script> & \"co\"\nline two");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt; &amp; &quot;co&quot;"));
        assert!(html.contains("\nline two"));
        assert!(html.starts_with("<html><body><pre>"));
    }
}
