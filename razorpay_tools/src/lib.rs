//! A small client for the parts of the Razorpay REST API that the Yobaexo backend uses: creating orders and fetching
//! them back to confirm their payment status.
mod api;
mod config;
mod data_objects;
mod error;

pub use api::RazorpayApi;
pub use config::RazorpayConfig;
pub use data_objects::{NewRazorpayOrder, RazorpayErrorBody, RazorpayOrder};
pub use error::RazorpayApiError;
