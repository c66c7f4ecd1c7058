use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::admin::{Account, AccountUpdate, AdminApi, NewAccount, UserDocument, USERS_COLLECTION};
use crate::credentials::ServiceCredentials;
use crate::error::{AdminError, AdminResult};
use crate::settings::BackendConfig;

const AUTH_SERVICE: &str = "auth";
const DATABASE_SERVICE: &str = "database";

/// Retries after the first attempt, so at most three requests per call.
const MAX_RETRIES: usize = 2;

/// Query parameter naming each field a document PATCH may touch.
const UPDATE_MASK_PARAM: &str = "updateMask.fieldPaths";

/// Admin client for the hosted accounts and document APIs.
#[derive(Debug, Clone)]
pub struct RestAdminClient {
    http: Client,
    backend: BackendConfig,
    credentials: ServiceCredentials,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountRecord {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    email_verified: bool,
}

impl AccountRecord {
    fn into_account(self, fallback_email: &str) -> Account {
        Account {
            uid: self.local_id,
            email: self.email.unwrap_or_else(|| fallback_email.to_string()),
            display_name: self.display_name,
            email_verified: self.email_verified,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountRecord>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl RestAdminClient {
    /// Create a new admin client.
    ///
    /// # Errors
    /// Returns an error if the backend project is not configured or the HTTP
    /// client cannot be created.
    pub fn new(backend: BackendConfig, credentials: ServiceCredentials) -> AdminResult<Self> {
        backend.validate()?;

        if credentials.project_id != backend.project_id {
            log::warn!(
                "Credentials belong to project '{}' but backend.project_id is '{}'",
                credentials.project_id,
                backend.project_id
            );
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("sangeet-admin/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            backend,
            credentials,
        })
    }

    #[must_use]
    pub const fn backend(&self) -> &BackendConfig {
        &self.backend
    }

    /// Send an idempotent request built by `build`, retrying transient
    /// failures.
    async fn send<T, F>(&self, service: &'static str, build: F) -> AdminResult<T>
    where
        T: DeserializeOwned + Send,
        F: Fn(&Client) -> RequestBuilder + Send + Sync,
    {
        self.send_with(service, AdminError::is_transient, build).await
    }

    async fn send_with<T, F>(
        &self,
        service: &'static str,
        retry_when: fn(&AdminError) -> bool,
        build: F,
    ) -> AdminResult<T>
    where
        T: DeserializeOwned + Send,
        F: Fn(&Client) -> RequestBuilder + Send + Sync,
    {
        let attempt = || self.send_once(service, &build);

        attempt
            .retry(ExponentialBuilder::default().with_max_times(MAX_RETRIES))
            .when(retry_when)
            .notify(|err: &AdminError, delay: Duration| {
                log::warn!("{} request failed ({}), retrying in {:?}", service, err, delay);
            })
            .await
    }

    async fn send_once<T, F>(&self, service: &'static str, build: &F) -> AdminResult<T>
    where
        T: DeserializeOwned,
        F: Fn(&Client) -> RequestBuilder,
    {
        let response = build(&self.http)
            .bearer_auth(&self.credentials.access_token)
            .send()
            .await?;
        decode(service, response).await
    }
}

async fn decode<T: DeserializeOwned>(service: &'static str, response: Response) -> AdminResult<T> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(AdminError::RateLimited { service });
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AdminError::Http {
            service,
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| AdminError::Parse {
        service,
        message: e.to_string(),
    })
}

/// Pull the service's error code out of a JSON error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

/// Typed field map of the document database's REST representation.
fn document_fields(document: &UserDocument) -> Value {
    let mut fields = json!({
        "email": { "stringValue": document.email },
        "role": { "stringValue": document.role.as_str() },
        "updatedAt": { "timestampValue": document.updated_at.to_rfc3339() },
    });
    if let Some(name) = &document.display_name {
        fields["displayName"] = json!({ "stringValue": name });
    }
    json!({ "fields": fields })
}

/// One mask entry per written field, so a PATCH leaves the rest of the
/// document alone.
fn update_mask(document: &Value) -> Vec<(&'static str, String)> {
    document["fields"]
        .as_object()
        .map(|fields| {
            fields
                .keys()
                .map(|name| (UPDATE_MASK_PARAM, name.clone()))
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl AdminApi for RestAdminClient {
    async fn find_account_by_email(&self, email: &str) -> AdminResult<Option<Account>> {
        let url = format!("{}:lookup", self.backend.auth_endpoint());
        let body = json!({ "email": [email] });

        let response: LookupResponse = self
            .send(AUTH_SERVICE, |http| http.post(&url).json(&body))
            .await?;

        Ok(response
            .users
            .into_iter()
            .next()
            .map(|record| record.into_account(email)))
    }

    async fn create_account(&self, account: &NewAccount) -> AdminResult<Account> {
        let url = self.backend.auth_endpoint();
        let mut body = json!({
            "email": account.email,
            "password": account.password,
            "emailVerified": true,
        });
        if let Some(name) = &account.display_name {
            body["displayName"] = json!(name);
        }

        // A timed-out create may already have succeeded, so only resend
        // when the service explicitly turned the request away.
        let result: AdminResult<AccountRecord> = self
            .send_with(AUTH_SERVICE, AdminError::is_retryable_write, |http| {
                http.post(&url).json(&body)
            })
            .await;

        match result {
            Ok(record) => Ok(record.into_account(&account.email)),
            Err(AdminError::Http { message, .. }) if message.starts_with("EMAIL_EXISTS") => {
                Err(AdminError::AccountExists(account.email.clone()))
            }
            Err(e) => Err(e),
        }
    }

    async fn update_account(&self, uid: &str, update: &AccountUpdate) -> AdminResult<Account> {
        let url = format!("{}:update", self.backend.auth_endpoint());
        let mut body = json!({ "localId": uid });
        if let Some(password) = &update.password {
            body["password"] = json!(password);
        }
        if let Some(name) = &update.display_name {
            body["displayName"] = json!(name);
        }

        let record: AccountRecord = self
            .send(AUTH_SERVICE, |http| http.post(&url).json(&body))
            .await?;

        Ok(record.into_account(""))
    }

    async fn set_user_document(&self, uid: &str, document: &UserDocument) -> AdminResult<()> {
        let url = self.backend.document_endpoint(USERS_COLLECTION, uid);
        let body = document_fields(document);
        let mask = update_mask(&body);

        let _stored: Value = self
            .send(DATABASE_SERVICE, |http| {
                http.patch(&url).query(&mask).json(&body)
            })
            .await?;

        log::debug!("Wrote {}/{} (role = {})", USERS_COLLECTION, uid, document.role);
        Ok(())
    }
}
