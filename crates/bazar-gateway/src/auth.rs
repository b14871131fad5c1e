// SPDX-FileCopyrightText: 2026 Bazar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token verification for the gateway.
//!
//! Connections present an HS256-signed JWT, either as a `token` query
//! parameter (WebSocket handshake) or an `Authorization: Bearer` header
//! (REST). The verified token's subject claim is the user id. When no
//! signing key is configured, all requests are rejected (fail-closed).

use std::collections::HashSet;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use base64::Engine;
use bazar_core::BazarError;
use jwt_simple::prelude::{HS256Key, MACLike, NoCustomClaims, VerificationOptions};

/// Verifies HS256 tokens and extracts the subject as the user id.
#[derive(Clone)]
pub struct TokenVerifier {
    key: HS256Key,
    issuer: Option<String>,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("key", &"[redacted]")
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl TokenVerifier {
    /// Build a verifier from raw key bytes.
    pub fn from_key_bytes(bytes: &[u8], issuer: Option<&str>) -> Self {
        Self {
            key: HS256Key::from_bytes(bytes),
            issuer: issuer.map(str::to_string),
        }
    }

    /// Build a verifier from a base64-encoded key (URL-safe or standard
    /// alphabet, padded or not).
    pub fn from_base64_key(encoded: &str, issuer: Option<&str>) -> Result<Self, BazarError> {
        let trimmed = encoded.trim();
        if trimmed.is_empty() {
            return Err(BazarError::Auth("empty token key".to_string()));
        }
        let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(trimmed)
            .or_else(|_| base64::engine::general_purpose::STANDARD.decode(trimmed))
            .or_else(|_| base64::engine::general_purpose::STANDARD_NO_PAD.decode(trimmed))
            .map_err(|e| BazarError::Auth(format!("invalid token key encoding: {e}")))?;
        if decoded.is_empty() {
            return Err(BazarError::Auth("empty token key".to_string()));
        }
        Ok(Self::from_key_bytes(&decoded, issuer))
    }

    /// Verify a token and return its subject (the user id).
    pub fn verify(&self, token: &str) -> Result<String, BazarError> {
        let mut options = VerificationOptions::default();
        if let Some(ref issuer) = self.issuer {
            let mut issuers = HashSet::new();
            issuers.insert(issuer.clone());
            options.allowed_issuers = Some(issuers);
        }

        let claims = self
            .key
            .verify_token::<NoCustomClaims>(token, Some(options))
            .map_err(|e| BazarError::Auth(format!("invalid token: {e}")))?;

        match claims.subject {
            Some(subject) if !subject.trim().is_empty() => Ok(subject),
            _ => Err(BazarError::Auth("token has no subject".to_string())),
        }
    }
}

/// Auth state shared with the REST middleware. `None` means no key is
/// configured and every authenticated route is rejected.
#[derive(Debug, Clone)]
pub struct AuthState {
    pub verifier: Option<TokenVerifier>,
}

/// Middleware validating `Authorization: Bearer <jwt>` on REST routes.
pub async fn auth_middleware(
    State(auth): State<AuthState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(ref verifier) = auth.verifier else {
        tracing::error!("gateway has no token key configured, rejecting request");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match token.map(|t| verifier.verify(t)) {
        Some(Ok(_user_id)) => Ok(next.run(request).await),
        Some(Err(e)) => {
            tracing::debug!(error = %e, "rejected REST request");
            Err(StatusCode::UNAUTHORIZED)
        }
        None => Err(StatusCode::UNAUTHORIZED),
    }
}
