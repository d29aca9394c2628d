//! Diesel models representing application users.

use std::str::FromStr;

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::types::{
    AvatarUrl, EmailAddress, HashedPassword, TypeConstraintError, UserId, UserRole, Username,
};
use crate::domain::user::{NewUser as DomainNewUser, User as DomainUser};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
/// Diesel model for [`crate::domain::user::User`].
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub created_at: NaiveDateTime,
    pub avatar: Option<String>,
    pub confirmed: bool,
    pub role: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
/// Insertable form of [`User`].
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub hashed_password: &'a str,
    pub avatar: Option<&'a str>,
}

impl TryFrom<User> for DomainUser {
    type Error = TypeConstraintError;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::try_from(user.id)?,
            username: Username::new(user.username)?,
            email: EmailAddress::new(user.email)?,
            hashed_password: HashedPassword::new(user.hashed_password)?,
            created_at: user.created_at,
            avatar: user.avatar.map(AvatarUrl::new).transpose()?,
            confirmed: user.confirmed,
            role: UserRole::from_str(&user.role)?,
        })
    }
}

impl<'a> From<&'a DomainNewUser> for NewUser<'a> {
    fn from(user: &'a DomainNewUser) -> Self {
        Self {
            username: user.username.as_str(),
            email: user.email.as_str(),
            hashed_password: user.hashed_password.as_str(),
            avatar: user.avatar.as_ref().map(AvatarUrl::as_str),
        }
    }
}
