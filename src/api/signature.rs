use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::error;

use crate::errors::SlackError;

/// Requests older than this are treated as replays.
const MAX_REQUEST_AGE_SECS: u64 = 300;
/// Tolerated clock skew for timestamps from the future.
const MAX_CLOCK_SKEW_SECS: u64 = 60;

/// Verify Slack's `v0` request signature over the raw body.
///
/// # Errors
///
/// Returns `SlackError::SignatureError` when the timestamp is malformed or
/// outside the replay window, or the signature does not match.
pub fn verify_slack_signature(
    request_body: &str,
    timestamp: &str,
    signature: &str,
    signing_secret: &str,
) -> Result<(), SlackError> {
    let now_secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    verify_slack_signature_at(request_body, timestamp, signature, signing_secret, now_secs)
}

/// Same as [`verify_slack_signature`] with an explicit clock.
///
/// # Errors
///
/// See [`verify_slack_signature`].
pub fn verify_slack_signature_at(
    request_body: &str,
    timestamp: &str,
    signature: &str,
    signing_secret: &str,
    now_secs: u64,
) -> Result<(), SlackError> {
    let ts = timestamp.trim().parse::<u64>().map_err(|_| {
        SlackError::SignatureError(format!("malformed timestamp '{timestamp}'"))
    })?;

    if now_secs.saturating_sub(ts) > MAX_REQUEST_AGE_SECS || ts > now_secs + MAX_CLOCK_SKEW_SECS {
        error!("Timestamp out of range, potential replay attack");
        return Err(SlackError::SignatureError(
            "timestamp out of range".to_string(),
        ));
    }

    let Some(received) = signature
        .strip_prefix("v0=")
        .and_then(|hex_sig| hex::decode(hex_sig).ok())
    else {
        return Err(SlackError::SignatureError(
            "malformed signature".to_string(),
        ));
    };

    let mut mac = Hmac::<Sha256>::new_from_slice(signing_secret.as_bytes())
        .map_err(|e| SlackError::SignatureError(format!("Failed to create HMAC: {e}")))?;
    mac.update(format!("v0:{timestamp}:{request_body}").as_bytes());

    mac.verify_slice(&received).map_err(|_| {
        error!("Slack signature verification failed");
        SlackError::SignatureError("signature mismatch".to_string())
    })
}

#[must_use]
pub fn compute_signature(timestamp: &str, request_body: &str, signing_secret: &str) -> String {
    let base_string = format!("v0:{timestamp}:{request_body}");
    let mut mac = match Hmac::<Sha256>::new_from_slice(signing_secret.as_bytes()) {
        Ok(mac) => mac,
        Err(e) => {
            error!("Failed to create HMAC: {}", e);
            return String::new();
        }
    };
    mac.update(base_string.as_bytes());
    format!("v0={}", hex::encode(mac.finalize().into_bytes()))
}
