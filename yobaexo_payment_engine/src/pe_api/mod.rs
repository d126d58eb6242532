//! # Payment engine public API
//!
//! The `pe_api` module exposes the programmatic API of the payment engine. Each API is created by supplying a backend
//! that implements the storage traits it needs, so callers only pay for the functionality they use.
//!
//! * [`payment_flow_api`] drives the payment lifecycle: gateway order creation, client tracking, checkout
//!   verification and gateway webhooks.
//! * [`accounts_api`] provides the paged payment history of a user.
//! * [`auth_api`] registers users and checks their credentials.
//!
//! ```rust,ignore
//! use yobaexo_payment_engine::{AccountApi, Pagination, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/yobaexo.db", 5).await?;
//! // SqliteDatabase implements PaymentRecordStore
//! let api = AccountApi::new(db);
//! let history = api.payment_history("some-user-id", Pagination::default()).await?;
//! ```
pub mod accounts_api;
pub mod auth_api;
pub mod errors;
pub mod payment_flow_api;
pub mod payment_objects;
