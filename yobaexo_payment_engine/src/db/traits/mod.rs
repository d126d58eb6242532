mod payment_record_store;
mod user_management;

pub use payment_record_store::{PaymentRecordStore, PaymentStoreError};
pub use user_management::{AccountApiError, UserManagement};

/// The full set of storage behaviour the payment flow needs: payment records plus the user licence flag.
pub trait LicensingDatabase: PaymentRecordStore + UserManagement {}

impl<T> LicensingDatabase for T where T: PaymentRecordStore + UserManagement {}
