//! Response bodies returned by the JSON API.

use serde::Serialize;

pub mod auth;
pub mod contacts;
pub mod users;

/// Plain acknowledgement body: `{"message": "..."}`.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
