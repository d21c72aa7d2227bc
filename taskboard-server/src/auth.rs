//! Bearer-token gate.
//!
//! Tokens are issued by the external auth provider and signed with HS256
//! using a secret shared with this server. The gate only verifies them:
//! signature, expiry and (optionally) audience. Requests without a valid
//! token are answered with 401 before any handler or store access runs.

use std::fmt;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::error::ApiErrorResponse;

/// Claims this server reads from a verified token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id at the auth provider).
    pub sub: String,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
    /// Provider role, e.g. `authenticated`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// User email, when the provider includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Why a request was refused.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No `Authorization` header.
    #[error("missing bearer token")]
    MissingToken,

    /// `Authorization` header present but not `Bearer <token>`.
    #[error("malformed authorization header")]
    MalformedHeader,

    /// The token's `exp` is in the past.
    #[error("token expired")]
    Expired,

    /// Bad signature, wrong algorithm, wrong audience, or unparsable token.
    #[error("invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        match error.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Invalid(error),
        }
    }
}

/// Verifies bearer tokens against the shared secret.
#[derive(Clone)]
pub struct AuthGate {
    key: DecodingKey,
    validation: Validation,
}

impl AuthGate {
    /// Creates a gate for HS256 tokens signed with `secret`.
    ///
    /// When `audience` is `None` the `aud` claim is not checked.
    #[must_use]
    pub fn new(secret: &str, audience: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verifies a raw token and returns its claims.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Expired`] or [`AuthError::Invalid`].
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        Ok(data.claims)
    }
}

impl fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGate").finish_non_exhaustive()
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
///
/// # Errors
///
/// Returns [`AuthError::MissingToken`] or [`AuthError::MalformedHeader`].
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?;
    let value = value.to_str().map_err(|_| AuthError::MalformedHeader)?;
    let (scheme, token) = value.split_once(' ').ok_or(AuthError::MalformedHeader)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }
    Ok(token)
}

/// Middleware guarding every protected route.
///
/// On success the verified [`Claims`] are stored as a request extension.
///
/// # Errors
///
/// Responds 401 when the token is missing or does not verify.
pub async fn require_bearer(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiErrorResponse> {
    let claims = match bearer_token(request.headers()).and_then(|t| state.auth.verify(t)) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!(
                method = %request.method(),
                path = %request.uri().path(),
                error = %e,
                "rejected unauthenticated request"
            );
            return Err(e.into());
        }
    };
    tracing::debug!(sub = %claims.sub, "request authenticated");
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
