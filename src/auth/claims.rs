use serde::{Deserialize, Serialize};

/// Verified payload of an issuer-signed access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,   // user ID
    #[serde(default)]
    pub email: String, // empty for phone/anonymous sign-ins
    #[serde(default)]
    pub role: String,  // typically "authenticated"
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// The caller as seen by handlers. Only these two fields leave the verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
        }
    }
}
