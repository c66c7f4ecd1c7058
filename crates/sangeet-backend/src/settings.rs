use serde::{Deserialize, Serialize};

use crate::error::{AdminError, AdminResult};

const DEFAULT_AUTH_URL: &str = "https://identitytoolkit.googleapis.com";
const DEFAULT_DATABASE_URL: &str = "https://firestore.googleapis.com";
const DEFAULT_STORAGE_URL: &str = "https://firebasestorage.googleapis.com";

/// Static identifiers of the hosted auth/database/storage project.
///
/// These are the same values the web client is built with. None of them is
/// secret; privileged calls additionally need [`ServiceCredentials`].
///
/// [`ServiceCredentials`]: crate::credentials::ServiceCredentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub project_id: String,
    pub api_key: String,
    pub auth_domain: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,

    /// Base URL of the accounts API (override to point at an emulator).
    pub auth_url: String,

    /// Base URL of the document database API.
    pub database_url: String,

    /// Base URL of the blob storage API.
    pub storage_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            api_key: String::new(),
            auth_domain: String::new(),
            storage_bucket: String::new(),
            messaging_sender_id: String::new(),
            app_id: String::new(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            storage_url: DEFAULT_STORAGE_URL.to_string(),
        }
    }
}

impl BackendConfig {
    /// Check that the identifiers needed for admin calls are present.
    pub fn validate(&self) -> AdminResult<()> {
        if self.project_id.trim().is_empty() {
            return Err(AdminError::NotConfigured(
                "backend.project_id is not set".to_string(),
            ));
        }
        Ok(())
    }

    /// Accounts endpoint for this project.
    #[must_use]
    pub fn auth_endpoint(&self) -> String {
        format!(
            "{}/v1/projects/{}/accounts",
            self.auth_url.trim_end_matches('/'),
            self.project_id
        )
    }

    /// Endpoint of a single document in the project's default database.
    #[must_use]
    pub fn document_endpoint(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/v1/projects/{}/databases/(default)/documents/{}/{}",
            self.database_url.trim_end_matches('/'),
            self.project_id,
            collection,
            id
        )
    }

    /// Download URL of an object in the project's storage bucket.
    #[must_use]
    pub fn storage_object_url(&self, path: &str) -> String {
        format!(
            "{}/v0/b/{}/o/{}?alt=media",
            self.storage_url.trim_end_matches('/'),
            self.storage_bucket,
            encode_object_path(path)
        )
    }
}

/// Percent-encode an object path so it fits in a single URL segment.
fn encode_object_path(path: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";

    let mut out = String::with_capacity(path.len());
    for byte in path.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            out.push(char::from(byte));
        } else {
            out.push('%');
            out.push(char::from(HEX[usize::from(byte >> 4)]));
            out.push(char::from(HEX[usize::from(byte & 0x0F)]));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BackendConfig {
        BackendConfig {
            project_id: "raga-studio".to_string(),
            storage_bucket: "raga-studio.appspot.com".to_string(),
            ..BackendConfig::default()
        }
    }

    #[test]
    fn test_default_is_unconfigured() {
        let err = BackendConfig::default().validate().unwrap_err();
        assert!(matches!(err, AdminError::NotConfigured(_)));
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_auth_endpoint() {
        assert_eq!(
            config().auth_endpoint(),
            "https://identitytoolkit.googleapis.com/v1/projects/raga-studio/accounts"
        );
    }

    #[test]
    fn test_document_endpoint_with_emulator() {
        let mut config = config();
        config.database_url = "http://localhost:8080/".to_string();
        assert_eq!(
            config.document_endpoint("users", "abc"),
            "http://localhost:8080/v1/projects/raga-studio/databases/(default)/documents/users/abc"
        );
    }

    #[test]
    fn test_storage_object_url_encodes_path() {
        assert_eq!(
            config().storage_object_url("audio/evening raga.mp3"),
            "https://firebasestorage.googleapis.com/v0/b/raga-studio.appspot.com/o/audio%2Fevening%20raga.mp3?alt=media"
        );
    }
}
