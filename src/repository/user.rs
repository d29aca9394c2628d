//! Repository implementation for application users.

use diesel::prelude::*;

use crate::{
    domain::{
        types::{AvatarUrl, EmailAddress, HashedPassword, UserId, Username},
        user::{NewUser, User},
    },
    models::user::{NewUser as DbNewUser, User as DbUser},
    repository::{
        DieselRepository, UserReader, UserWriter,
        errors::{RepositoryError, RepositoryResult},
    },
};

fn into_domain(db_user: Option<DbUser>) -> RepositoryResult<Option<User>> {
    db_user
        .map(|user| User::try_from(user).map_err(RepositoryError::from))
        .transpose()
}

impl UserReader for DieselRepository {
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_user = users::table
            .filter(users::id.eq(id.get()))
            .select(DbUser::as_select())
            .first(&mut conn)
            .optional()?;

        into_domain(db_user)
    }

    fn get_user_by_username(&self, username: &Username) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_user = users::table
            .filter(users::username.eq(username.as_str()))
            .select(DbUser::as_select())
            .first(&mut conn)
            .optional()?;

        into_domain(db_user)
    }

    fn get_user_by_email(&self, email: &EmailAddress) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_user = users::table
            .filter(users::email.eq(email.as_str()))
            .select(DbUser::as_select())
            .first(&mut conn)
            .optional()?;

        into_domain(db_user)
    }
}

impl UserWriter for DieselRepository {
    fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_new_user: DbNewUser = new_user.into();

        let db_user = diesel::insert_into(users::table)
            .values(&db_new_user)
            .returning(DbUser::as_returning())
            .get_result(&mut conn)?;

        Ok(User::try_from(db_user)?)
    }

    fn confirm_user_email(&self, email: &EmailAddress) -> RepositoryResult<User> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_user = diesel::update(users::table.filter(users::email.eq(email.as_str())))
            .set(users::confirmed.eq(true))
            .returning(DbUser::as_returning())
            .get_result(&mut conn)?;

        Ok(User::try_from(db_user)?)
    }

    fn update_user_avatar(
        &self,
        email: &EmailAddress,
        avatar: &AvatarUrl,
    ) -> RepositoryResult<User> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_user = diesel::update(users::table.filter(users::email.eq(email.as_str())))
            .set(users::avatar.eq(avatar.as_str()))
            .returning(DbUser::as_returning())
            .get_result(&mut conn)?;

        Ok(User::try_from(db_user)?)
    }

    fn update_user_password(
        &self,
        email: &EmailAddress,
        hashed_password: &HashedPassword,
    ) -> RepositoryResult<usize> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let updated = diesel::update(users::table.filter(users::email.eq(email.as_str())))
            .set(users::hashed_password.eq(hashed_password.as_str()))
            .execute(&mut conn)?;

        Ok(updated)
    }
}
