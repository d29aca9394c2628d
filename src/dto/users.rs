use serde::Serialize;

use crate::domain::user::User;

/// Public view of a user.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub avatar: Option<String>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.get(),
            username: user.username.to_string(),
            email: user.email.to_string(),
            avatar: user.avatar.as_ref().map(ToString::to_string),
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}
