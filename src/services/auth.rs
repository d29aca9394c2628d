//! Authentication: password hashing, JWT handling, the cached current-user
//! lookup and the account flows behind `/api/auth`.

use std::time::Duration;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind as JwtErrorKind,
};
use moka::sync::Cache;
use uuid::Uuid;
use validator::Validate;

use crate::domain::token::{TokenClaims, TokenKind};
use crate::domain::types::{EmailAddress, HashedPassword, Username};
use crate::domain::user::{NewUser, User};
use crate::dto::MessageResponse;
use crate::dto::auth::TokenResponse;
use crate::forms::FormError;
use crate::forms::auth::{
    EmailForm, LoginForm, RefreshTokenForm, RegisterForm, RegisterPayload, ResetPasswordForm,
};
use crate::models::config::JwtConfig;
use crate::repository::{UserReader, UserWriter};
use crate::services::email::EmailService;
use crate::services::users as users_service;
use crate::services::{ServiceError, ServiceResult};

/// Upper bound of users kept in the lookup cache.
const USER_CACHE_CAPACITY: u64 = 10_000;

/// Hashes a plaintext password with Argon2id and a random salt.
pub fn hash_password(password: &str) -> ServiceResult<HashedPassword> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            log::error!("Password hashing failed: {e}");
            ServiceError::Internal("password hashing failed".to_string())
        })?;

    Ok(HashedPassword::new(hash.to_string())?)
}

/// Checks a plaintext password against a stored hash. Malformed hashes never
/// verify.
pub fn verify_password(password: &str, hash: &HashedPassword) -> bool {
    let parsed = match PasswordHash::new(hash.as_str()) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::error!("Stored password hash is malformed: {e}");
            return false;
        }
    };

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => true,
        Err(argon2::password_hash::Error::Password) => false,
        Err(e) => {
            log::error!("Password verification failed: {e}");
            false
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum TokenError {
    Expired,
    Invalid,
}

#[derive(Clone, Copy, Debug)]
struct TokenLifetimes {
    access: TimeDelta,
    refresh: TimeDelta,
    email: TimeDelta,
    reset: TimeDelta,
}

/// Issues and verifies tokens and resolves bearer tokens to users.
#[derive(Clone)]
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetimes: TokenLifetimes,
    users: Cache<String, User>,
}

impl AuthService {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            lifetimes: TokenLifetimes {
                access: TimeDelta::seconds(config.access_ttl_secs),
                refresh: TimeDelta::seconds(config.refresh_ttl_secs),
                email: TimeDelta::seconds(config.email_ttl_secs),
                reset: TimeDelta::seconds(config.reset_ttl_secs),
            },
            users: Cache::builder()
                .max_capacity(USER_CACHE_CAPACITY)
                .time_to_live(Duration::from_secs(config.user_cache_ttl_secs))
                .build(),
        }
    }

    /// Signs a token of the given kind for `subject`, valid for `ttl`.
    pub fn create_token(
        &self,
        subject: &str,
        kind: TokenKind,
        ttl: TimeDelta,
    ) -> ServiceResult<String> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: kind,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            log::error!("Failed to sign {kind:?} token: {e}");
            ServiceError::Internal("failed to sign token".to_string())
        })
    }

    pub fn create_access_token(&self, username: &Username) -> ServiceResult<String> {
        self.create_token(username.as_str(), TokenKind::Access, self.lifetimes.access)
    }

    pub fn create_refresh_token(&self, username: &Username) -> ServiceResult<String> {
        self.create_token(username.as_str(), TokenKind::Refresh, self.lifetimes.refresh)
    }

    pub fn create_email_token(&self, email: &EmailAddress) -> ServiceResult<String> {
        self.create_token(email.as_str(), TokenKind::Email, self.lifetimes.email)
    }

    pub fn create_reset_token(&self, email: &EmailAddress) -> ServiceResult<String> {
        self.create_token(email.as_str(), TokenKind::Reset, self.lifetimes.reset)
    }

    fn decode(&self, token: &str, expected: TokenKind) -> Result<TokenClaims, TokenError> {
        let claims = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })?
            .claims;

        if claims.token_type != expected {
            return Err(TokenError::Invalid);
        }

        Ok(claims)
    }

    /// Resolves the owner of a refresh token. `None` for any unusable token.
    pub fn verify_refresh_token<R>(&self, repo: &R, token: &str) -> ServiceResult<Option<User>>
    where
        R: UserReader + ?Sized,
    {
        let Ok(claims) = self.decode(token, TokenKind::Refresh) else {
            return Ok(None);
        };
        let Ok(username) = Username::new(claims.sub) else {
            return Ok(None);
        };

        Ok(repo.get_user_by_username(&username)?)
    }

    /// Extracts the address from an email confirmation token.
    pub fn email_from_token(&self, token: &str) -> ServiceResult<EmailAddress> {
        let claims = self
            .decode(token, TokenKind::Email)
            .map_err(|_| ServiceError::InvalidToken)?;

        EmailAddress::new(claims.sub).map_err(|_| ServiceError::InvalidToken)
    }

    /// Extracts the address from a password reset token.
    pub fn email_from_reset_token(&self, token: &str) -> ServiceResult<EmailAddress> {
        let claims = self
            .decode(token, TokenKind::Reset)
            .map_err(|e| match e {
                TokenError::Expired => ServiceError::TokenExpired,
                TokenError::Invalid => ServiceError::InvalidToken,
            })?;

        EmailAddress::new(claims.sub).map_err(|_| ServiceError::InvalidToken)
    }

    /// Resolves the user behind a bearer access token.
    pub fn current_user<R>(&self, repo: &R, token: &str) -> ServiceResult<User>
    where
        R: UserReader + ?Sized,
    {
        let claims = self
            .decode(token, TokenKind::Access)
            .map_err(|_| ServiceError::credentials())?;
        let username = Username::new(claims.sub).map_err(|_| ServiceError::credentials())?;

        self.cached_user(repo, &username)?
            .ok_or_else(ServiceError::credentials)
    }

    /// Looks the user up in the cache first, then in the repository.
    pub fn cached_user<R>(&self, repo: &R, username: &Username) -> ServiceResult<Option<User>>
    where
        R: UserReader + ?Sized,
    {
        if let Some(user) = self.users.get(username.as_str()) {
            return Ok(Some(user));
        }

        let user = repo.get_user_by_username(username)?;
        if let Some(user) = &user {
            self.users.insert(username.to_string(), user.clone());
        }

        Ok(user)
    }

    /// Drops the cached copy of a user after the record changed.
    pub fn forget_user(&self, username: &Username) {
        self.users.invalidate(username.as_str());
    }
}

/// Creates an unconfirmed account and mails a confirmation link.
pub fn register<R>(
    repo: &R,
    auth: &AuthService,
    mailer: &EmailService,
    form: RegisterForm,
    host: &str,
) -> ServiceResult<User>
where
    R: UserReader + UserWriter + ?Sized,
{
    let payload = RegisterPayload::try_from(form)?;

    if repo.get_user_by_email(&payload.email)?.is_some() {
        return Err(ServiceError::Conflict(
            "User with this email already exists".to_string(),
        ));
    }

    if repo.get_user_by_username(&payload.username)?.is_some() {
        return Err(ServiceError::Conflict(
            "User with this name already exists".to_string(),
        ));
    }

    let hashed_password = hash_password(&payload.password)?;
    let new_user = NewUser::new(payload.username, payload.email, hashed_password);
    let user = users_service::create_user(repo, new_user)?;

    let token = auth.create_email_token(&user.email)?;
    mailer.send_confirm_email(&user.email, &user.username, host, &token);

    Ok(user)
}

/// Exchanges valid credentials of a confirmed user for a token pair.
pub fn login<R>(repo: &R, auth: &AuthService, form: LoginForm) -> ServiceResult<TokenResponse>
where
    R: UserReader + ?Sized,
{
    let incorrect = || ServiceError::InvalidCredentials("Incorrect login or password".to_string());

    let username = Username::new(form.username).map_err(|_| incorrect())?;
    let user = repo.get_user_by_username(&username)?.ok_or_else(incorrect)?;

    if !verify_password(&form.password, &user.hashed_password) {
        return Err(incorrect());
    }

    if !user.confirmed {
        return Err(ServiceError::Unauthorized(
            "Email is not confirmed".to_string(),
        ));
    }

    let access_token = auth.create_access_token(&user.username)?;
    let refresh_token = auth.create_refresh_token(&user.username)?;

    Ok(TokenResponse::bearer(access_token, refresh_token))
}

/// Confirms the email address carried by a confirmation token.
pub fn confirmed_email<R>(repo: &R, auth: &AuthService, token: &str) -> ServiceResult<MessageResponse>
where
    R: UserReader + UserWriter + ?Sized,
{
    let email = auth.email_from_token(token)?;

    let user = repo
        .get_user_by_email(&email)?
        .ok_or_else(|| ServiceError::BadRequest("Verification error".to_string()))?;

    if user.confirmed {
        return Ok(MessageResponse::new("Email already confirmed"));
    }

    users_service::confirm_email(repo, auth, &email)?;

    Ok(MessageResponse::new("Email confirmed"))
}

/// Re-sends the confirmation link. Unknown addresses get the same answer.
pub fn request_email<R>(
    repo: &R,
    auth: &AuthService,
    mailer: &EmailService,
    form: EmailForm,
    host: &str,
) -> ServiceResult<MessageResponse>
where
    R: UserReader + ?Sized,
{
    let email = EmailAddress::try_from(form)?;

    match repo.get_user_by_email(&email)? {
        Some(user) if user.confirmed => {
            return Ok(MessageResponse::new("Email already confirmed"));
        }
        Some(user) => {
            let token = auth.create_email_token(&user.email)?;
            mailer.send_confirm_email(&user.email, &user.username, host, &token);
        }
        None => {}
    }

    Ok(MessageResponse::new("Please check your email for confirmation"))
}

/// Issues a new access token; the refresh token is handed back unchanged.
pub fn refresh_token<R>(
    repo: &R,
    auth: &AuthService,
    form: RefreshTokenForm,
) -> ServiceResult<TokenResponse>
where
    R: UserReader + ?Sized,
{
    let user = auth
        .verify_refresh_token(repo, &form.refresh_token)?
        .ok_or_else(|| {
            ServiceError::Unauthorized("Invalid or expired refresh token".to_string())
        })?;

    let access_token = auth.create_access_token(&user.username)?;

    Ok(TokenResponse::bearer(access_token, form.refresh_token))
}

/// Mails a password reset link when the address belongs to a user.
pub fn forgot_password<R>(
    repo: &R,
    auth: &AuthService,
    mailer: &EmailService,
    form: EmailForm,
    host: &str,
) -> ServiceResult<MessageResponse>
where
    R: UserReader + ?Sized,
{
    let email = EmailAddress::try_from(form)?;

    if let Some(user) = repo.get_user_by_email(&email)? {
        let token = auth.create_reset_token(&user.email)?;
        mailer.send_password_reset_email(&user.email, &user.username, host, &token);
    }

    Ok(MessageResponse::new("Reset link was sent"))
}

/// Stores a new password for the owner of a reset token.
pub fn reset_password<R>(
    repo: &R,
    auth: &AuthService,
    form: ResetPasswordForm,
) -> ServiceResult<MessageResponse>
where
    R: UserReader + UserWriter + ?Sized,
{
    form.validate().map_err(FormError::from)?;

    let email = auth
        .email_from_reset_token(&form.token)
        .map_err(|_| ServiceError::BadRequest("Invalid reset token".to_string()))?;

    let hashed_password = hash_password(&form.new_password)?;
    users_service::update_password_by_email(repo, auth, &email, &hashed_password)?;

    Ok(MessageResponse::new("Password updated"))
}
