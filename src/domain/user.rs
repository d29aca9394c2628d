use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::types::{AvatarUrl, EmailAddress, HashedPassword, UserId, UserRole, Username};

/// Registered application user.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: EmailAddress,
    #[serde(skip_serializing)]
    pub hashed_password: HashedPassword,
    pub created_at: NaiveDateTime,
    pub avatar: Option<AvatarUrl>,
    /// Whether the owner proved access to `email`.
    pub confirmed: bool,
    pub role: UserRole,
}

/// Data required to register a user.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: Username,
    pub email: EmailAddress,
    pub hashed_password: HashedPassword,
    pub avatar: Option<AvatarUrl>,
}

impl NewUser {
    #[must_use]
    pub fn new(username: Username, email: EmailAddress, hashed_password: HashedPassword) -> Self {
        Self {
            username,
            email,
            hashed_password,
            avatar: None,
        }
    }

    #[must_use]
    pub fn with_avatar(mut self, avatar: AvatarUrl) -> Self {
        self.avatar = Some(avatar);
        self
    }
}
