//! Managed-backend tooling for sangeet.
//!
//! Holds the layered configuration, the static identifiers of the hosted
//! auth/database/storage project, the service credential loader, and the
//! admin client used to provision privileged accounts.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod admin;
pub mod config;
pub mod credentials;
pub mod error;
pub mod settings;

pub use admin::{promote_to_admin, provision_admin, AdminApi, AdminRequest, ProvisionMode, RestAdminClient};
pub use config::Config;
pub use credentials::ServiceCredentials;
pub use error::{AdminError, AdminResult};
pub use settings::BackendConfig;
