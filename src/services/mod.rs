//! Business rules behind the HTTP handlers.
//!
//! Services are free functions generic over the repository traits they need,
//! so they can be exercised against mocks without a database.

pub mod auth;
pub mod contacts;
pub mod email;
pub mod errors;
pub mod upload_file;
pub mod users;

pub use errors::{ServiceError, ServiceResult};
