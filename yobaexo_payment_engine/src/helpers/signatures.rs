//! # Gateway signatures
//!
//! The gateway signs two kinds of message, each with its own secret:
//!
//! * **Checkout callbacks.** After a successful hosted checkout the client receives `razorpay_signature`, the
//!   hex-encoded HMAC-SHA256 of `{order_id}|{payment_id}` keyed with the API key secret.
//! * **Webhooks.** Every webhook carries an `X-Razorpay-Signature` header holding the hex-encoded HMAC-SHA256 of the
//!   raw request body, keyed with the webhook secret configured in the gateway dashboard.
//!
//! Comparisons are constant-time. Malformed signatures are never an error; they simply do not match.
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn keyed_mac(secret: &str) -> HmacSha256 {
    // HMAC accepts keys of any length, so this cannot fail
    <HmacSha256 as Mac>::new_from_slice(secret.as_bytes()).unwrap_or_else(|_| unreachable!())
}

/// Returns the hex-encoded HMAC-SHA256 of `data` keyed with `secret`.
pub fn calculate_hmac(secret: &str, data: &[u8]) -> String {
    let mut mac = keyed_mac(secret);
    mac.update(data);
    hex::encode(mac.finalize().into_bytes())
}

fn verify_hmac(secret: &str, data: &[u8], signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let mut mac = keyed_mac(secret);
    mac.update(data);
    mac.verify_slice(&expected).is_ok()
}

/// Checks the signature returned to the client by the hosted checkout.
pub fn verify_payment_signature(order_id: &str, payment_id: &str, signature: &str, key_secret: &str) -> bool {
    let message = format!("{order_id}|{payment_id}");
    verify_hmac(key_secret, message.as_bytes(), signature)
}

/// Checks the `X-Razorpay-Signature` header of a webhook against the exact bytes of the request body.
pub fn verify_webhook_signature(body: &[u8], signature: &str, webhook_secret: &str) -> bool {
    verify_hmac(webhook_secret, body, signature)
}
