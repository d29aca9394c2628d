//! Forms used by the registration, login and password recovery flows.

use serde::Deserialize;
use validator::Validate;

use crate::domain::types::{EmailAddress, Username};
use crate::forms::{FormError, trimmed};

#[derive(Debug, Deserialize, Validate)]
/// JSON body of `POST /auth/register`.
pub struct RegisterForm {
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

/// Validated registration data. The password is still in clear text.
pub struct RegisterPayload {
    pub username: Username,
    pub email: EmailAddress,
    pub password: String,
}

impl TryFrom<RegisterForm> for RegisterPayload {
    type Error = FormError;

    fn try_from(form: RegisterForm) -> Result<Self, Self::Error> {
        form.validate()?;

        Ok(Self {
            username: Username::new(form.username).map_err(|_| FormError::InvalidUsername)?,
            email: EmailAddress::new(form.email).map_err(|_| FormError::InvalidEmail)?,
            password: form.password,
        })
    }
}

#[derive(Debug, Deserialize)]
/// Form-urlencoded body of `POST /auth/login`.
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
/// Body carrying a single email address.
pub struct EmailForm {
    #[serde(deserialize_with = "trimmed")]
    #[validate(email)]
    pub email: String,
}

impl TryFrom<EmailForm> for EmailAddress {
    type Error = FormError;

    fn try_from(form: EmailForm) -> Result<Self, Self::Error> {
        form.validate()?;
        EmailAddress::new(form.email).map_err(|_| FormError::InvalidEmail)
    }
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenForm {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordForm {
    pub token: String,
    #[validate(length(min = 6))]
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_form_normalizes_email() {
        let form = RegisterForm {
            username: " alice ".into(),
            email: "Alice@Example.com".into(),
            password: "secret123".into(),
        };

        let payload = RegisterPayload::try_from(form).unwrap();

        assert_eq!(payload.username.as_str(), "alice");
        assert_eq!(payload.email.as_str(), "alice@example.com");
    }

    #[test]
    fn register_form_rejects_short_password() {
        let form = RegisterForm {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "123".into(),
        };

        assert!(matches!(
            RegisterPayload::try_from(form),
            Err(FormError::Validation(_))
        ));
    }

    #[test]
    fn padded_emails_are_accepted() {
        let form: RegisterForm = serde_json::from_value(serde_json::json!({
            "username": "alice",
            "email": " Alice@Example.com ",
            "password": "secret123",
        }))
        .unwrap();
        let payload = RegisterPayload::try_from(form).unwrap();
        assert_eq!(payload.email.as_str(), "alice@example.com");

        let form: EmailForm =
            serde_json::from_value(serde_json::json!({ "email": " jane@example.com " })).unwrap();
        assert_eq!(
            EmailAddress::try_from(form).unwrap().as_str(),
            "jane@example.com"
        );
    }

    #[test]
    fn email_form_rejects_garbage() {
        let form = EmailForm {
            email: "nope".into(),
        };
        assert!(EmailAddress::try_from(form).is_err());
    }
}
