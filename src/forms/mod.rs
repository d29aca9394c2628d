//! Request payloads accepted by the HTTP routes and their validation.

use serde::{Deserialize, Deserializer};
use thiserror::Error;
use validator::ValidationErrors;

pub mod auth;
pub mod contacts;
pub mod users;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid email address")]
    InvalidEmail,

    #[error("invalid username")]
    InvalidUsername,

    #[error("invalid name")]
    InvalidName,

    #[error("invalid surname")]
    InvalidSurname,

    #[error("invalid phone number")]
    InvalidPhoneNumber,

    #[error("invalid additional info")]
    InvalidAdditionalInfo,

    #[error("days must be between 0 and {0}")]
    InvalidDays(u32),

    #[error("file is empty")]
    EmptyFile,
}

/// Strips surrounding whitespace before field validators see the value.
pub(crate) fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|value| value.trim().to_string())
}

pub(crate) fn trimmed_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
        .map(|value| value.map(|v| v.trim().to_string()))
}
