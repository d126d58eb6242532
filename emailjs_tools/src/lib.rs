mod api;
mod config;
mod data_objects;
mod error;

pub use api::EmailJsApi;
pub use config::{EmailJsConfig, DEFAULT_CONTACT_EMAIL};
pub use data_objects::{ContactMessage, SendEmailRequest, TemplateParams};
pub use error::EmailJsError;
