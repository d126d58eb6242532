//! # Yobaexo server
//!
//! The HTTP front end of the Yobaexo backend. It is responsible for:
//! * Registering users and issuing session tokens.
//! * Creating gateway orders, tracking purchases, verifying checkouts and receiving gateway webhooks. The payment
//!   rules themselves live in `yobaexo_payment_engine`.
//! * Proxying the artist's YouTube catalogue and the site's contact form.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! `/health` answers with a 200. Everything else lives under `/api`; see [routes](routes/index.html).
pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
