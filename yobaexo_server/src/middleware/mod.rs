mod cors;
mod hmac;

pub use cors::{CorsMiddlewareFactory, CorsMiddlewareService};
pub use hmac::{HmacMiddlewareFactory, HmacMiddlewareService, RAZORPAY_SIGNATURE_HEADER};
