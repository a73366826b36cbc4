//! Unverified decoding of bearer token claims
//!
//! Only the payload segment is inspected and the signature is never checked.
//! The result drives a local expiry heuristic and nothing else.

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("token must have three dot-separated segments, found {0}")]
    Malformed(usize),

    #[error("token payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("token payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Claims carried in the payload segment of a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Expiry, seconds since epoch. NumericDate allows fractions.
    pub exp: f64,
    #[serde(default)]
    pub sub: Option<Value>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenClaims {
    /// A token is usable only while `exp` is strictly in the future
    pub fn is_expired_at(&self, now_secs: f64) -> bool {
        self.exp <= now_secs
    }
}

/// Decode the middle segment of `token` into its claims
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(TokenError::Malformed(segments.len()));
    }

    let payload = segments[1];
    let bytes = URL_SAFE_LENIENT
        .decode(payload)
        .or_else(|_| STANDARD_LENIENT.decode(payload))?;

    Ok(serde_json::from_slice(&bytes)?)
}
