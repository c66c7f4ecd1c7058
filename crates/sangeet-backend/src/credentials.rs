use serde::Deserialize;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{AdminError, AdminResult};

/// Privileged credentials for the managed backend's admin API.
///
/// Loaded from a local JSON file that operators keep out of version control.
#[derive(Clone, Deserialize)]
pub struct ServiceCredentials {
    pub project_id: String,
    pub client_email: String,
    /// Bearer token sent with every admin request.
    pub access_token: String,
}

// Keep the token out of logs.
impl fmt::Debug for ServiceCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceCredentials")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl ServiceCredentials {
    /// Read credentials from `path`.
    ///
    /// # Errors
    /// Returns [`AdminError::MissingCredentials`] when the file is absent and
    /// [`AdminError::InvalidCredentials`] when it cannot be parsed or lacks a
    /// token.
    pub fn load(path: impl AsRef<Path>) -> AdminResult<Self> {
        let path = path.as_ref();
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AdminError::MissingCredentials(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };

        let credentials: Self =
            serde_json::from_str(&contents).map_err(|e| invalid(path, e.to_string()))?;

        if credentials.access_token.trim().is_empty() {
            return Err(invalid(path, "access_token is empty".to_string()));
        }

        log::debug!(
            "Loaded credentials for {} ({})",
            credentials.client_email,
            credentials.project_id
        );
        Ok(credentials)
    }
}

fn invalid(path: &Path, message: String) -> AdminError {
    AdminError::InvalidCredentials {
        path: PathBuf::from(path),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.json");
        assert!(matches!(
            ServiceCredentials::load(&path),
            Err(AdminError::MissingCredentials(p)) if p == path
        ));
    }

    #[test]
    fn test_load_valid_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sa.json");
        std::fs::write(
            &path,
            r#"{"project_id":"raga-studio","client_email":"ops@raga-studio.iam","access_token":"tok","type":"service_account"}"#,
        )
        .unwrap();

        let credentials = ServiceCredentials::load(&path).unwrap();
        assert_eq!(credentials.project_id, "raga-studio");
        assert!(!format!("{credentials:?}").contains("tok\""));
    }

    #[test]
    fn test_malformed_and_empty_token() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sa.json");

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            ServiceCredentials::load(&path),
            Err(AdminError::InvalidCredentials { .. })
        ));

        std::fs::write(
            &path,
            r#"{"project_id":"p","client_email":"e","access_token":"  "}"#,
        )
        .unwrap();
        assert!(matches!(
            ServiceCredentials::load(&path),
            Err(AdminError::InvalidCredentials { .. })
        ));
    }
}
