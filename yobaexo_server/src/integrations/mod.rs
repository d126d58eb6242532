//! Adapters between the vendor clients and the traits the route handlers are written against. Handlers never see a
//! concrete client, so tests can swap in mocks.
mod emailjs;
mod razorpay;
mod youtube;

pub use emailjs::ContactMailer;
pub use razorpay::{gateway_order, RazorpayGateway};
pub use youtube::VideoCatalog;
