//! Account endpoints under `/api/auth`.

use actix_web::{HttpRequest, HttpResponse, get, post, web};

use crate::dto::users::UserResponse;
use crate::forms::auth::{EmailForm, LoginForm, RefreshTokenForm, RegisterForm, ResetPasswordForm};
use crate::repository::DieselRepository;
use crate::routes::base_url;
use crate::services::ServiceError;
use crate::services::auth::{self as auth_service, AuthService};
use crate::services::email::EmailService;

#[post("/register")]
pub async fn register(
    req: HttpRequest,
    repo: web::Data<DieselRepository>,
    auth: web::Data<AuthService>,
    mailer: web::Data<EmailService>,
    web::Json(form): web::Json<RegisterForm>,
) -> Result<HttpResponse, ServiceError> {
    let user = auth_service::register(
        repo.get_ref(),
        auth.get_ref(),
        mailer.get_ref(),
        form,
        &base_url(&req),
    )?;
    log::info!("Registered user {}", user.username);

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

#[post("/login")]
pub async fn login(
    repo: web::Data<DieselRepository>,
    auth: web::Data<AuthService>,
    web::Form(form): web::Form<LoginForm>,
) -> Result<HttpResponse, ServiceError> {
    let tokens = auth_service::login(repo.get_ref(), auth.get_ref(), form)?;
    Ok(HttpResponse::Ok().json(tokens))
}

#[get("/confirmed_email/{token}")]
pub async fn confirmed_email(
    token: web::Path<String>,
    repo: web::Data<DieselRepository>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, ServiceError> {
    let message = auth_service::confirmed_email(repo.get_ref(), auth.get_ref(), &token)?;
    Ok(HttpResponse::Ok().json(message))
}

#[post("/request_email")]
pub async fn request_email(
    req: HttpRequest,
    repo: web::Data<DieselRepository>,
    auth: web::Data<AuthService>,
    mailer: web::Data<EmailService>,
    web::Json(form): web::Json<EmailForm>,
) -> Result<HttpResponse, ServiceError> {
    let message = auth_service::request_email(
        repo.get_ref(),
        auth.get_ref(),
        mailer.get_ref(),
        form,
        &base_url(&req),
    )?;
    Ok(HttpResponse::Ok().json(message))
}

#[post("/refresh-token")]
pub async fn refresh_token(
    repo: web::Data<DieselRepository>,
    auth: web::Data<AuthService>,
    web::Json(form): web::Json<RefreshTokenForm>,
) -> Result<HttpResponse, ServiceError> {
    let tokens = auth_service::refresh_token(repo.get_ref(), auth.get_ref(), form)?;
    Ok(HttpResponse::Ok().json(tokens))
}

#[post("/password/forgot")]
pub async fn forgot_password(
    req: HttpRequest,
    repo: web::Data<DieselRepository>,
    auth: web::Data<AuthService>,
    mailer: web::Data<EmailService>,
    web::Json(form): web::Json<EmailForm>,
) -> Result<HttpResponse, ServiceError> {
    let message = auth_service::forgot_password(
        repo.get_ref(),
        auth.get_ref(),
        mailer.get_ref(),
        form,
        &base_url(&req),
    )?;
    Ok(HttpResponse::Ok().json(message))
}

#[post("/password/reset")]
pub async fn reset_password(
    repo: web::Data<DieselRepository>,
    auth: web::Data<AuthService>,
    web::Json(form): web::Json<ResetPasswordForm>,
) -> Result<HttpResponse, ServiceError> {
    let message = auth_service::reset_password(repo.get_ref(), auth.get_ref(), form)?;
    Ok(HttpResponse::Ok().json(message))
}
