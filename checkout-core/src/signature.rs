//! Verification of provider-signed webhook payloads.
//!
//! The provider sends a header of the form `t=<unix seconds>,v1=<hex>[,v1=<hex>]`
//! where each `v1` value is HMAC-SHA256 over `"{t}.{raw body}"` keyed with the
//! endpoint secret. Any matching `v1` accepts the payload.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_TOLERANCE_SECONDS: i64 = 300;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing signature header")]
    MissingHeader,
    #[error("malformed signature header")]
    MalformedHeader,
    #[error("timestamp outside the tolerance window")]
    StaleTimestamp,
    #[error("no signature matches the payload")]
    Mismatch,
}

#[derive(Clone)]
pub struct WebhookVerifier {
    secret: String,
    tolerance_seconds: i64,
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("secret", &"********")
            .field("tolerance_seconds", &self.tolerance_seconds)
            .finish()
    }
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<String>, tolerance_seconds: i64) -> Self {
        Self {
            secret: secret.into(),
            tolerance_seconds,
        }
    }

    /// Verify against the current wall clock.
    pub fn verify(&self, payload: &[u8], header: Option<&str>) -> Result<(), SignatureError> {
        self.verify_at(payload, header, chrono::Utc::now().timestamp())
    }

    pub fn verify_at(
        &self,
        payload: &[u8],
        header: Option<&str>,
        now: i64,
    ) -> Result<(), SignatureError> {
        let header = header
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(SignatureError::MissingHeader)?;

        let mut timestamp: Option<i64> = None;
        let mut signatures: Vec<Vec<u8>> = Vec::new();

        for part in header.split(',') {
            let (key, value) = part
                .trim()
                .split_once('=')
                .ok_or(SignatureError::MalformedHeader)?;
            match key {
                "t" => {
                    timestamp = Some(value.parse().map_err(|_| SignatureError::MalformedHeader)?)
                }
                // Unparseable candidates simply never match
                "v1" => {
                    if let Ok(bytes) = hex::decode(value) {
                        signatures.push(bytes);
                    }
                }
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(SignatureError::MalformedHeader)?;
        if signatures.is_empty() && !header.contains("v1=") {
            return Err(SignatureError::MalformedHeader);
        }

        if now.abs_diff(timestamp) > self.tolerance_seconds.unsigned_abs() {
            return Err(SignatureError::StaleTimestamp);
        }

        let mac = self.mac(payload, timestamp)?;
        if signatures
            .iter()
            .any(|candidate| mac.clone().verify_slice(candidate).is_ok())
        {
            Ok(())
        } else {
            Err(SignatureError::Mismatch)
        }
    }

    /// Produce a header value for `payload` at `timestamp`. Used by tests and
    /// local tooling that replays events.
    pub fn sign(&self, payload: &[u8], timestamp: i64) -> Result<String, SignatureError> {
        let mac = self.mac(payload, timestamp)?;
        Ok(format!(
            "t={},v1={}",
            timestamp,
            hex::encode(mac.finalize().into_bytes())
        ))
    }

    fn mac(&self, payload: &[u8], timestamp: i64) -> Result<HmacSha256, SignatureError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|_| SignatureError::Mismatch)?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(mac)
    }
}
