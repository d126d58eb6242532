//! # Storage backends
//!
//! The [`traits`] module defines the contracts a storage backend must honour in order to serve the payment engine:
//!
//! * [`PaymentRecordStore`] persists payment lifecycle records. At most one record exists per gateway `order_id`,
//!   and every mutation stamps `updated_at`.
//! * [`UserManagement`] stores user accounts, their credentials and their licence flag.
//!
//! [`sqlite`] contains the SQLite implementation of both.
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use traits::{AccountApiError, LicensingDatabase, PaymentRecordStore, PaymentStoreError, UserManagement};
