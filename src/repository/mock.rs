//! Mock repository implementations for isolating services in tests.

use mockall::mock;

use crate::domain::contact::{Contact, NewContact, UpdateContact};
use crate::domain::types::{AvatarUrl, ContactId, EmailAddress, HashedPassword, UserId, Username};
use crate::domain::user::{NewUser, User};
use crate::repository::errors::RepositoryResult;
use crate::repository::{ContactListQuery, ContactReader, ContactWriter, UserReader, UserWriter};

mock! {
    pub Repository {}

    impl UserReader for Repository {
        fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;
        fn get_user_by_username(&self, username: &Username) -> RepositoryResult<Option<User>>;
        fn get_user_by_email(&self, email: &EmailAddress) -> RepositoryResult<Option<User>>;
    }

    impl UserWriter for Repository {
        fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
        fn confirm_user_email(&self, email: &EmailAddress) -> RepositoryResult<User>;
        fn update_user_avatar(
            &self,
            email: &EmailAddress,
            avatar: &AvatarUrl,
        ) -> RepositoryResult<User>;
        fn update_user_password(
            &self,
            email: &EmailAddress,
            hashed_password: &HashedPassword,
        ) -> RepositoryResult<usize>;
    }

    impl ContactReader for Repository {
        fn get_contact_by_id(
            &self,
            id: ContactId,
            user_id: UserId,
        ) -> RepositoryResult<Option<Contact>>;
        fn list_contacts(&self, query: ContactListQuery) -> RepositoryResult<Vec<Contact>>;
        fn list_contacts_with_birthday(&self, user_id: UserId) -> RepositoryResult<Vec<Contact>>;
    }

    impl ContactWriter for Repository {
        fn create_contact(&self, new_contact: &NewContact) -> RepositoryResult<Contact>;
        fn update_contact(
            &self,
            id: ContactId,
            user_id: UserId,
            updates: &UpdateContact,
        ) -> RepositoryResult<Option<Contact>>;
        fn delete_contact(
            &self,
            id: ContactId,
            user_id: UserId,
        ) -> RepositoryResult<Option<Contact>>;
    }
}
