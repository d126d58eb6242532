//! Yobaexo Payment Engine
//!
//! The payment engine holds the core logic of the Yobaexo backend: it tracks the lifecycle of every purchase made
//! through the payment gateway, and flips a user's licence to `active` once a payment has been verified.
//!
//! The library is divided into these sections:
//! 1. Storage ([`mod@db`]). The [`PaymentRecordStore`] and [`UserManagement`] traits define what a backend must
//!    provide, and [`SqliteDatabase`] implements them. The data types stored in the database live in [`db_types`].
//! 2. The lifecycle rules. [`webhooks`] parses gateway notifications, and [`state_machine`] decides how each event
//!    changes a payment record. Neither touches storage.
//! 3. The public API ([`mod@pe_api`]). [`PaymentFlowApi`], [`AccountApi`] and [`AuthApi`] combine storage and the
//!    lifecycle rules into the operations the HTTP server exposes.
//!
//! The payment gateway itself is abstracted behind the [`PaymentGateway`] trait, so the engine never performs any
//! network calls of its own.
pub mod db;
pub mod db_types;
pub mod gateway;
pub mod helpers;
mod pe_api;
pub mod state_machine;
pub mod webhooks;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use db::sqlite::{SqliteDatabase, SqliteDatabaseError};
pub use db::{AccountApiError, LicensingDatabase, PaymentRecordStore, PaymentStoreError, UserManagement};
pub use gateway::{GatewayError, GatewayOrder, GatewayOrderStatus, NewGatewayOrder, PaymentGateway};
pub use pe_api::{
    accounts_api::AccountApi,
    auth_api::{AuthApi, LoginRequest, RegisterRequest},
    errors::{AuthApiError, PaymentFlowError},
    payment_flow_api::{CheckoutKeys, PaymentFlowApi},
    payment_objects,
};
