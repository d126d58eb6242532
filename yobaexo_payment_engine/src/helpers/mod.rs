mod signatures;
mod validation;

pub use signatures::{calculate_hmac, verify_payment_signature, verify_webhook_signature};
pub use validation::{is_valid_email, non_blank};
