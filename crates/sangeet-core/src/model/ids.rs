use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Number of random characters appended after the timestamp prefix.
const SUFFIX_LEN: usize = 9;

/// Identifier of a saved composition.
///
/// Generated ids are a base-36 millisecond timestamp followed by a short
/// random suffix. Collisions are unlikely but not checked; ids read back
/// from storage are kept verbatim, whatever their shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompositionId(String);

impl CompositionId {
    #[must_use]
    pub fn generate() -> Self {
        Self::generate_at(Utc::now())
    }

    /// Generate an id whose prefix encodes `at`.
    #[must_use]
    pub fn generate_at(at: DateTime<Utc>) -> Self {
        let millis = u64::try_from(at.timestamp_millis()).unwrap_or(0);
        let random = Uuid::new_v4().simple().to_string();
        Self(format!("{}{}", to_base36(millis), &random[..SUFFIX_LEN]))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CompositionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for CompositionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for CompositionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return String::from("0");
    }

    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    out.into_iter().map(char::from).collect()
}
