//! Canned message bodies.

use crate::EmailContent;

/// Password reset message pointing at the one-time reset link.
pub fn password_reset_email(to_email: &str, to_name: &str, reset_link: &str) -> EmailContent {
    let greeting_name = if to_name.is_empty() { "there" } else { to_name };

    let text_body = format!(
        "Hi {greeting_name},\n\n\
         We received a request to reset your password. Open the link below to choose a new one:\n\n\
         {reset_link}\n\n\
         The link expires in one hour. If you did not request this, you can ignore this email."
    );

    let html_body = format!(
        "<p>Hi {greeting_name},</p>\
         <p>We received a request to reset your password. Click the link below to choose a new one:</p>\
         <p><a href=\"{reset_link}\">Reset your password</a></p>\
         <p>The link expires in one hour. If you did not request this, you can ignore this email.</p>"
    );

    EmailContent {
        to_email: to_email.to_string(),
        to_name: to_name.to_string(),
        subject: "Reset your password".to_string(),
        html_body,
        text_body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_reset_email_includes_link() {
        let email = password_reset_email(
            "user@example.com",
            "Budi",
            "https://kedai.example/reset?token=abc",
        );
        assert_eq!(email.to_email, "user@example.com");
        assert!(email.text_body.contains("https://kedai.example/reset?token=abc"));
        assert!(email.html_body.contains("https://kedai.example/reset?token=abc"));
        assert!(email.text_body.contains("Budi"));
    }

    #[test]
    fn test_password_reset_email_without_name() {
        let email = password_reset_email("user@example.com", "", "https://x/reset");
        assert!(email.text_body.contains("Hi there"));
    }
}
