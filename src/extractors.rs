//! Request extractors shared by the API handlers.

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, web};
use futures::future::{Ready, ready};

use crate::domain::user::User;
use crate::repository::DieselRepository;
use crate::services::ServiceError;
use crate::services::auth::AuthService;

/// The user owning the bearer access token of the request.
///
/// Rejects the request with `401 Could not validate credentials` when the
/// `Authorization` header is missing, malformed or carries an unusable token.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Token part of an `Authorization: Bearer <token>` header.
pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

fn resolve(req: &HttpRequest) -> Result<CurrentUser, ServiceError> {
    let token = bearer_token(req).ok_or_else(ServiceError::credentials)?;

    let (Some(auth), Some(repo)) = (
        req.app_data::<web::Data<AuthService>>(),
        req.app_data::<web::Data<DieselRepository>>(),
    ) else {
        log::error!("Authentication state is not registered");
        return Err(ServiceError::Internal("authentication unavailable".to_string()));
    };

    match auth.current_user(repo.get_ref(), token) {
        Ok(user) => Ok(CurrentUser(user)),
        Err(ServiceError::Repository(e)) => {
            log::error!("Failed to load current user: {e}");
            Err(ServiceError::credentials())
        }
        Err(e) => Err(e),
    }
}

impl FromRequest for CurrentUser {
    type Error = ServiceError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve(req))
    }
}
