//! Webhook signature verification.
//!
//! Paystack signs webhook deliveries with an HMAC-SHA512 of the raw body
//! keyed by the account's secret key, hex-encoded in the
//! `x-paystack-signature` header. The signature must be recomputed over
//! the exact bytes received; re-serializing the parsed JSON would break
//! verification.

use hmac::{Hmac, Mac};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Header carrying the provider-computed webhook signature.
pub const SIGNATURE_HEADER: &str = "x-paystack-signature";

/// Check a webhook payload against its claimed signature.
///
/// Returns `false` for malformed hex as well as genuine mismatches; the
/// comparison itself is constant-time.
pub fn verify_signature(secret: &str, body: &[u8], signature_hex: &str) -> bool {
    let Ok(claimed) = hex::decode(signature_hex) else {
        return false;
    };

    let Ok(mut mac) = HmacSha512::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&claimed).is_ok()
}
