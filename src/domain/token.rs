//! Token kinds and JWT claims issued by the authentication service.

use serde::{Deserialize, Serialize};

/// Purpose a token was issued for. A token is only accepted where its kind
/// matches.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived bearer token for API calls. Subject is the username.
    Access,
    /// Long-lived token exchanged for new access tokens. Subject is the username.
    Refresh,
    /// Email confirmation link token. Subject is the email address.
    Email,
    /// Password reset link token. Subject is the email address.
    Reset,
}

/// Claims carried by every issued JWT.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub token_type: TokenKind,
}
