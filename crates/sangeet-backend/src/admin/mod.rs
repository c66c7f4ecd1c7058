//! Admin API of the managed backend.
//!
//! [`AdminApi`] is the seam between the provisioning flow and the hosted
//! service. [`RestAdminClient`] talks to the real accounts and document
//! APIs; tests substitute an in-memory implementation.

mod client;
mod provision;

pub use client::RestAdminClient;
pub use provision::{promote_to_admin, provision_admin, AdminRequest, ProvisionMode};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sangeet_core::Role;
use serde::Serialize;

use crate::error::AdminResult;

/// Collection holding one profile document per user, keyed by uid.
pub const USERS_COLLECTION: &str = "users";

/// An account registered with the hosted authentication service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub email_verified: bool,
}

/// Fields for a new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

/// Changes to an existing account. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountUpdate {
    pub password: Option<String>,
    pub display_name: Option<String>,
}

/// Profile document stored under `users/{uid}`; the client reads `role`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    pub email: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub updated_at: DateTime<Utc>,
}

impl UserDocument {
    #[must_use]
    pub fn admin(account: &Account) -> Self {
        Self {
            email: account.email.clone(),
            display_name: account.display_name.clone(),
            role: Role::Admin,
            updated_at: Utc::now(),
        }
    }
}

/// Privileged operations on the hosted auth and document services.
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn find_account_by_email(&self, email: &str) -> AdminResult<Option<Account>>;

    async fn create_account(&self, account: &NewAccount) -> AdminResult<Account>;

    async fn update_account(&self, uid: &str, update: &AccountUpdate) -> AdminResult<Account>;

    /// Write the fields of `document` into the profile of `uid`, creating
    /// the profile if needed. Fields not in `document` are left untouched.
    async fn set_user_document(&self, uid: &str, document: &UserDocument) -> AdminResult<()>;
}
