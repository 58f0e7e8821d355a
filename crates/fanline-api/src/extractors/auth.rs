//! `AuthUser` extractor: pulls the JWT from the Authorization header,
//! validates it and injects the caller's user id.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fanline_core::config::AuthConfig;
use fanline_core::error::AppError;
use fanline_core::result::AppResult;

use crate::error::ApiError;
use crate::state::AppState;

/// JWT claims issued by the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: Uuid,
    /// Expiry, seconds since epoch.
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Decode and validate an access token against the configured secret.
pub fn decode_token(token: &str, auth: &AuthConfig) -> AppResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    if let Some(issuer) = &auth.issuer {
        validation.set_issuer(std::slice::from_ref(issuer));
    }
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| AppError::with_source(fanline_core::error::ErrorKind::Authentication, "Invalid access token", e))?;
    Ok(data.claims)
}

/// Extracted authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::authentication("Missing Authorization header"))
            .map_err(ApiError)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::authentication("Invalid Authorization header format"))
            .map_err(ApiError)?;

        let claims = decode_token(token, &state.auth).map_err(ApiError)?;
        Ok(AuthUser { user_id: claims.sub })
    }
}
