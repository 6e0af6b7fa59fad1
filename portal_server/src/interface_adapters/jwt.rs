use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::domain::auth::Claims;
use crate::domain::errors::AuthError;
use crate::domain::ports::TokenCodec;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";

#[derive(Serialize, Deserialize)]
struct Header {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

/// HMAC-SHA256 signed JSON Web Tokens.
///
/// Only `HS256` is accepted on decode. A token is expired once
/// `exp + leeway_seconds <= now`.
#[derive(Clone)]
pub struct Hs256Codec {
    secret: Arc<[u8]>,
    leeway_seconds: u64,
}

impl Hs256Codec {
    pub fn new(secret: impl AsRef<[u8]>, leeway_seconds: u64) -> Self {
        Self {
            secret: Arc::from(secret.as_ref()),
            leeway_seconds,
        }
    }

    fn mac(&self, signing_input: &str) -> Result<HmacSha256, AuthError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret).map_err(|_| AuthError::Encoding)?;
        mac.update(signing_input.as_bytes());
        Ok(mac)
    }
}

impl TokenCodec for Hs256Codec {
    fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
        let header = Header {
            alg: ALGORITHM.to_string(),
            typ: Some("JWT".to_string()),
        };
        let header_part =
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header).map_err(|_| AuthError::Encoding)?);
        let claims_part =
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).map_err(|_| AuthError::Encoding)?);

        let signing_input = format!("{header_part}.{claims_part}");
        let signature = self.mac(&signing_input)?.finalize().into_bytes();
        Ok(format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature)))
    }

    fn decode(&self, token: &str, now: u64) -> Result<Claims, AuthError> {
        let mut parts = token.split('.');
        let (Some(header_part), Some(claims_part), Some(signature_part), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::Malformed);
        };

        let header: Header = decode_segment(header_part)?;
        if header.alg != ALGORITHM {
            return Err(AuthError::UnsupportedAlgorithm);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_part)
            .map_err(|_| AuthError::InvalidSignature)?;
        self.mac(&format!("{header_part}.{claims_part}"))?
            .verify_slice(&signature)
            .map_err(|_| AuthError::InvalidSignature)?;

        let claims: Claims = decode_segment(claims_part)?;
        if claims.exp.saturating_add(self.leeway_seconds) <= now {
            return Err(AuthError::Expired);
        }
        Ok(claims)
    }
}

fn decode_segment<T: for<'de> Deserialize<'de>>(segment: &str) -> Result<T, AuthError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AuthError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| AuthError::Malformed)
}
