use crate::admin::{Account, AccountUpdate, AdminApi, NewAccount, UserDocument};
use crate::error::{AdminError, AdminResult};

/// Minimum password length accepted by the hosted auth service.
const MIN_PASSWORD_LEN: usize = 6;

/// What to do when the email is already registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionMode {
    /// Fail with [`AdminError::AccountExists`].
    CreateOnly,
    /// Reset the existing account's password and display name.
    Upsert,
}

/// A privileged account to create or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminRequest {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

impl AdminRequest {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            display_name: None,
        }
    }

    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    fn validate(&self) -> AdminResult<()> {
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(AdminError::InvalidRequest(format!(
                "'{}' is not an email address",
                self.email
            )));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AdminError::InvalidRequest(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(())
    }
}

/// Create (or update) an account and mark it as admin.
///
/// The account is looked up by email first. Depending on `mode` an existing
/// account is either an error or gets its password and display name reset.
/// Either way the user's profile document is then written with the admin
/// role.
///
/// # Errors
/// Returns an error if the request is invalid, the account already exists
/// under [`ProvisionMode::CreateOnly`], or any backend call fails.
pub async fn provision_admin<A>(
    api: &A,
    request: &AdminRequest,
    mode: ProvisionMode,
) -> AdminResult<Account>
where
    A: AdminApi + ?Sized,
{
    request.validate()?;

    let existing = api.find_account_by_email(&request.email).await?;

    let account = match (existing, mode) {
        (Some(_), ProvisionMode::CreateOnly) => {
            return Err(AdminError::AccountExists(request.email.clone()));
        }
        (Some(account), ProvisionMode::Upsert) => {
            log::info!("Updating existing account {} ({})", account.email, account.uid);
            let update = AccountUpdate {
                password: Some(request.password.clone()),
                display_name: request.display_name.clone(),
            };
            let mut updated = api.update_account(&account.uid, &update).await?;
            if updated.email.is_empty() {
                updated.email = account.email;
            }
            updated
        }
        (None, _) => {
            log::info!("Creating account {}", request.email);
            let new_account = NewAccount {
                email: request.email.clone(),
                password: request.password.clone(),
                display_name: request.display_name.clone(),
            };
            api.create_account(&new_account).await?
        }
    };

    api.set_user_document(&account.uid, &UserDocument::admin(&account))
        .await?;
    log::info!("Granted admin role to {} ({})", account.email, account.uid);

    Ok(account)
}

/// Mark an already registered account as admin.
///
/// # Errors
/// Returns [`AdminError::AccountNotFound`] when no account uses `email`, or
/// any backend error.
pub async fn promote_to_admin<A>(api: &A, email: &str) -> AdminResult<Account>
where
    A: AdminApi + ?Sized,
{
    let account = api
        .find_account_by_email(email)
        .await?
        .ok_or_else(|| AdminError::AccountNotFound(email.to_string()))?;

    api.set_user_document(&account.uid, &UserDocument::admin(&account))
        .await?;
    log::info!("Granted admin role to {} ({})", account.email, account.uid);

    Ok(account)
}
