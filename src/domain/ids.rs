//! Domain identifier types with validation
//!
//! Newtype wrappers for the identifiers that cross the sink boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Session identity assigned by the sink on creation
///
/// # Examples
///
/// ```
/// use sessionframe::domain::ids::SessionKey;
/// use std::str::FromStr;
///
/// let key = SessionKey::from_str("6f1c0d3e-5b7a-4a8e-9c2d-1f0e9b8a7c6d").unwrap();
/// assert_eq!(key.to_string(), "6f1c0d3e-5b7a-4a8e-9c2d-1f0e9b8a7c6d");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionKey(Uuid);

impl SessionKey {
    /// Generates a fresh random key
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| format!("Invalid session key '{s}': {e}"))
    }
}

/// Channel name newtype wrapper
///
/// Channel names are column labels taken verbatim. Comparison is case-sensitive
/// and the only rule enforced here is that a name is not blank.
///
/// # Examples
///
/// ```
/// use sessionframe::domain::ids::ChannelName;
///
/// let name = ChannelName::new("Speed").unwrap();
/// assert_ne!(name, ChannelName::new("speed").unwrap());
/// assert!(ChannelName::new("  ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelName(String);

impl ChannelName {
    /// Creates a new ChannelName
    ///
    /// # Returns
    ///
    /// Returns `Ok(ChannelName)` if the name is not blank, `Err` otherwise
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("Channel name cannot be empty".to_string());
        }
        Ok(Self(name))
    }

    /// Returns the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChannelName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ChannelName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
