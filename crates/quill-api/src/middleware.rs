use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use quill_types::api::Claims;

use crate::error::ApiError;
use crate::state::AppState;

/// Verifies provider-issued bearer tokens. Built once at startup from the
/// configured key and shared through state — never re-read per request.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// An RSA public key in PEM form selects RS256; anything else is
    /// treated as an HMAC secret.
    pub fn new(raw_key: &str) -> anyhow::Result<Self> {
        if raw_key.contains("-----BEGIN") {
            Ok(Self {
                key: DecodingKey::from_rsa_pem(raw_key.as_bytes())?,
                validation: Validation::new(Algorithm::RS256),
            })
        } else {
            Ok(Self {
                key: DecodingKey::from_secret(raw_key.as_bytes()),
                validation: Validation::default(),
            })
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Ok(decode::<Claims>(token, &self.key, &self.validation)?.claims)
    }
}

/// Extract and validate the bearer token from the Authorization header.
/// Rejected requests terminate here; no handler or store access happens.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::AuthMissing)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::AuthInvalid("malformed authorization header".to_string()))?;

    let claims = state
        .verifier
        .verify(token)
        .map_err(|e| ApiError::AuthInvalid(e.to_string()))?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
