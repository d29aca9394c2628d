use crate::{
    db::{DbConnection, DbPool},
    domain::{
        contact::{Contact, NewContact, UpdateContact},
        types::{AvatarUrl, ContactId, EmailAddress, HashedPassword, UserId, Username},
        user::{NewUser, User},
    },
    repository::errors::RepositoryResult,
};

pub mod contact;
pub mod errors;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;
pub mod user;

/// Default number of contacts returned by a list query.
pub const DEFAULT_CONTACTS_LIMIT: i64 = 50;
/// Upper bound for the number of contacts returned by a list query.
pub const MAX_CONTACTS_LIMIT: i64 = 100;

#[derive(Debug, Clone)]
pub struct ContactListQuery {
    pub user_id: UserId,
    pub search: Option<String>,
    pub skip: i64,
    pub limit: i64,
}

impl ContactListQuery {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            search: None,
            skip: 0,
            limit: DEFAULT_CONTACTS_LIMIT,
        }
    }

    /// Case-insensitive substring matched against name, surname and email.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Offset-based window. `limit` is clamped to `1..=MAX_CONTACTS_LIMIT`.
    pub fn window(mut self, skip: i64, limit: i64) -> Self {
        self.skip = skip.max(0);
        self.limit = limit.clamp(1, MAX_CONTACTS_LIMIT);
        self
    }
}

pub trait UserReader {
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;
    fn get_user_by_username(&self, username: &Username) -> RepositoryResult<Option<User>>;
    fn get_user_by_email(&self, email: &EmailAddress) -> RepositoryResult<Option<User>>;
}

pub trait UserWriter {
    fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
    /// Marks the email as confirmed. Fails with `NotFound` for unknown emails.
    fn confirm_user_email(&self, email: &EmailAddress) -> RepositoryResult<User>;
    fn update_user_avatar(&self, email: &EmailAddress, avatar: &AvatarUrl)
    -> RepositoryResult<User>;
    /// Returns the number of updated rows.
    fn update_user_password(
        &self,
        email: &EmailAddress,
        hashed_password: &HashedPassword,
    ) -> RepositoryResult<usize>;
}

pub trait ContactReader {
    fn get_contact_by_id(&self, id: ContactId, user_id: UserId)
    -> RepositoryResult<Option<Contact>>;
    fn list_contacts(&self, query: ContactListQuery) -> RepositoryResult<Vec<Contact>>;
    /// All contacts of the user that have a birthday recorded.
    fn list_contacts_with_birthday(&self, user_id: UserId) -> RepositoryResult<Vec<Contact>>;
}

pub trait ContactWriter {
    fn create_contact(&self, new_contact: &NewContact) -> RepositoryResult<Contact>;
    /// Returns `None` when the contact does not exist or belongs to another user.
    fn update_contact(
        &self,
        id: ContactId,
        user_id: UserId,
        updates: &UpdateContact,
    ) -> RepositoryResult<Option<Contact>>;
    /// Returns the removed contact, `None` when nothing matched.
    fn delete_contact(&self, id: ContactId, user_id: UserId) -> RepositoryResult<Option<Contact>>;
}

/// Diesel-backed implementation of every repository trait.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}
