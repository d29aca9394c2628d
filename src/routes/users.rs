//! Profile endpoints under `/api/users`.

use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, patch, web};

use crate::domain::types::UserRole;
use crate::dto::users::UserResponse;
use crate::extractors::CurrentUser;
use crate::forms::users::UploadAvatarForm;
use crate::repository::DieselRepository;
use crate::services::auth::AuthService;
use crate::services::upload_file::CloudinaryUploader;
use crate::services::users as users_service;
use crate::services::ServiceError;

/// `GET /users/me`, mounted behind the per-IP rate limit in [`crate::run`].
pub async fn me(CurrentUser(user): CurrentUser) -> HttpResponse {
    HttpResponse::Ok().json(UserResponse::from(user))
}

#[patch("/avatar")]
pub async fn update_avatar(
    CurrentUser(user): CurrentUser,
    repo: web::Data<DieselRepository>,
    auth: web::Data<AuthService>,
    uploader: web::Data<CloudinaryUploader>,
    form: Result<MultipartForm<UploadAvatarForm>, actix_web::Error>,
) -> Result<HttpResponse, actix_web::Error> {
    // The role check comes first so non-admins get 403 whatever the body holds.
    users_service::ensure_role(&user, UserRole::Admin)?;
    let MultipartForm(form) = form?;

    let path = form.file.file.path().to_path_buf();
    let image = web::block(move || std::fs::read(path))
        .await
        .map_err(|e| ServiceError::Internal(format!("avatar read task failed: {e}")))?
        .map_err(|e| {
            log::error!("Failed to read uploaded avatar: {e}");
            ServiceError::Internal("failed to read upload".to_string())
        })?;

    let updated = users_service::update_avatar(
        repo.get_ref(),
        auth.get_ref(),
        uploader.get_ref(),
        &user,
        image,
    )
    .await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(updated)))
}
