//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// JWT validation settings.
///
/// Token issuance lives in the account service; this backend only
/// validates access tokens presented on REST calls and websocket upgrades.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for access token validation.
    pub jwt_secret: String,
    /// Expected token issuer, if any.
    #[serde(default)]
    pub issuer: Option<String>,
}
