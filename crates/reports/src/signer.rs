//! ES256 token signing for the App Store Connect API.
//!
//! Tokens are minted per run and never cached.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{Duration, TimeZone, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use log::debug;
use serde::Serialize;

use crate::clock::{Clock, SystemClock};
use crate::errors::{ReportsError, Result};
use crate::models::{Credential, SignedToken};

/// Audience expected by the service.
pub const TOKEN_AUDIENCE: &str = "appstoreconnect-v1";

/// Token lifetime in seconds.
pub const TOKEN_TTL_SECS: i64 = 600;

const PEM_MARKER: &str = "-----BEGIN";

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    iat: i64,
    exp: i64,
    aud: &'a str,
}

/// Signs short-lived bearer tokens from an API key credential.
#[derive(Clone)]
pub struct TokenSigner {
    clock: Arc<dyn Clock>,
}

impl TokenSigner {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Sign a fresh token valid for [`TOKEN_TTL_SECS`] from now.
    pub fn sign(&self, credential: &Credential) -> Result<SignedToken> {
        let pem = normalize_key_material(&credential.private_key)?;
        let key = EncodingKey::from_ec_pem(pem.as_bytes())
            .map_err(|e| ReportsError::credential(format!("Invalid EC private key: {}", e)))?;

        let iat = self.clock.now().timestamp();
        let exp = iat + TOKEN_TTL_SECS;
        let claims = Claims {
            iss: &credential.issuer_id,
            iat,
            exp,
            aud: TOKEN_AUDIENCE,
        };

        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some(credential.key_id.clone());
        header.typ = Some("JWT".to_string());

        let value = encode(&header, &claims, &key)
            .map_err(|e| ReportsError::credential(format!("Failed to sign token: {}", e)))?;

        let issued_at = Utc
            .timestamp_opt(iat, 0)
            .single()
            .ok_or_else(|| ReportsError::credential("Clock out of range"))?;
        debug!(
            "[TokenSigner] Signed token for key {} expiring at {}",
            credential.key_id,
            issued_at + Duration::seconds(TOKEN_TTL_SECS)
        );

        Ok(SignedToken {
            value,
            issued_at,
            expires_at: issued_at + Duration::seconds(TOKEN_TTL_SECS),
        })
    }
}

impl Default for TokenSigner {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

/// Turn the stored key material into PEM text.
///
/// PEM values may carry literal `\n` escapes from single-line storage;
/// anything else is taken to be the base64 encoding of the PEM file.
pub fn normalize_key_material(raw: &str) -> Result<String> {
    if raw.contains(PEM_MARKER) {
        return Ok(raw.replace("\\n", "\n"));
    }

    let compact: String = raw.split_whitespace().collect();
    let decoded = BASE64
        .decode(compact.as_bytes())
        .map_err(|e| ReportsError::credential(format!("Private key is not base64: {}", e)))?;
    String::from_utf8(decoded)
        .map_err(|_| ReportsError::credential("Decoded private key is not UTF-8"))
}
