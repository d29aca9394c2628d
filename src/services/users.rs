//! User account services: creation, lookups and profile updates.

use crate::domain::types::{AvatarUrl, EmailAddress, HashedPassword, UserId, UserRole, Username};
use crate::domain::user::{NewUser, User};
use crate::forms::FormError;
use crate::repository::errors::RepositoryError;
use crate::repository::{UserReader, UserWriter};
use crate::services::auth::AuthService;
use crate::services::upload_file::AvatarUploader;
use crate::services::{ServiceError, ServiceResult};

fn missing_user(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::NotFound => ServiceError::NotFound("User not found".to_string()),
        other => other.into(),
    }
}

/// Gravatar image for the address, derived from the MD5 of the lowercased
/// trimmed email.
pub fn gravatar_url(email: &EmailAddress) -> Option<AvatarUrl> {
    let digest = md5::compute(email.as_str().trim().to_lowercase().as_bytes());
    AvatarUrl::new(format!("https://www.gravatar.com/avatar/{digest:x}")).ok()
}

/// Persists a new user. A Gravatar avatar is attached unless one is set.
pub fn create_user<R>(repo: &R, mut new_user: NewUser) -> ServiceResult<User>
where
    R: UserWriter + ?Sized,
{
    if new_user.avatar.is_none() {
        new_user.avatar = gravatar_url(&new_user.email);
    }

    repo.create_user(&new_user).map_err(|e| match e {
        RepositoryError::ConstraintViolation(_) => {
            ServiceError::Conflict("User with this email or name already exists".to_string())
        }
        other => other.into(),
    })
}

pub fn get_user_by_id<R>(repo: &R, id: UserId) -> ServiceResult<Option<User>>
where
    R: UserReader + ?Sized,
{
    Ok(repo.get_user_by_id(id)?)
}

pub fn get_user_by_username<R>(repo: &R, username: &Username) -> ServiceResult<Option<User>>
where
    R: UserReader + ?Sized,
{
    Ok(repo.get_user_by_username(username)?)
}

pub fn get_user_by_email<R>(repo: &R, email: &EmailAddress) -> ServiceResult<Option<User>>
where
    R: UserReader + ?Sized,
{
    Ok(repo.get_user_by_email(email)?)
}

/// Marks the address as confirmed and evicts the cached user.
pub fn confirm_email<R>(repo: &R, auth: &AuthService, email: &EmailAddress) -> ServiceResult<User>
where
    R: UserWriter + ?Sized,
{
    let user = repo.confirm_user_email(email).map_err(missing_user)?;

    auth.forget_user(&user.username);
    log::info!("User {} confirmed {}", user.username, user.email);

    Ok(user)
}

/// Stores a new avatar URL for the user owning `email`.
pub fn update_avatar_url<R>(
    repo: &R,
    auth: &AuthService,
    email: &EmailAddress,
    avatar: &AvatarUrl,
) -> ServiceResult<User>
where
    R: UserWriter + ?Sized,
{
    let user = repo.update_user_avatar(email, avatar).map_err(missing_user)?;
    auth.forget_user(&user.username);

    Ok(user)
}

/// Replaces the password of the user owning `email`. Unknown addresses are
/// ignored.
pub fn update_password_by_email<R>(
    repo: &R,
    auth: &AuthService,
    email: &EmailAddress,
    hashed_password: &HashedPassword,
) -> ServiceResult<()>
where
    R: UserReader + UserWriter + ?Sized,
{
    let Some(user) = repo.get_user_by_email(email)? else {
        log::warn!("Password reset for unknown address {email}");
        return Ok(());
    };

    repo.update_user_password(email, hashed_password)?;
    auth.forget_user(&user.username);

    Ok(())
}

/// Rejects users lacking `role`.
pub fn ensure_role(user: &User, role: UserRole) -> ServiceResult<()> {
    if user.role != role {
        return Err(ServiceError::Forbidden(
            "Operation not allowed. Please contact the admin.".to_string(),
        ));
    }
    Ok(())
}

/// Uploads a new avatar for an admin user and stores its URL.
pub async fn update_avatar<R, U>(
    repo: &R,
    auth: &AuthService,
    uploader: &U,
    user: &User,
    image: Vec<u8>,
) -> ServiceResult<User>
where
    R: UserWriter + ?Sized,
    U: AvatarUploader,
{
    ensure_role(user, UserRole::Admin)?;

    if image.is_empty() {
        return Err(FormError::EmptyFile.into());
    }

    let avatar = uploader.upload_avatar(image, &user.username).await?;

    update_avatar_url(repo, auth, &user.email, &avatar)
}
