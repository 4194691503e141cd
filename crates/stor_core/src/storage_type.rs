//! Storage type identifiers.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Maximum length of a storage type identifier, in bytes.
pub const MAX_TYPE_LEN: usize = 20;

/// Identifies a storage implementation.
///
/// The empty identifier is reserved and means "no type chosen"; it is also
/// the default. Every other identifier is a key in a
/// [`Registry`](crate::Registry).
///
/// ```rust
/// use stor_core::StorageType;
///
/// let ty: StorageType = "LocalDir".parse().unwrap();
/// assert_eq!(ty.as_str(), "LocalDir");
/// assert!(StorageType::default().is_unspecified());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageType(Cow<'static, str>);

impl StorageType {
    /// The reserved "unspecified" type.
    pub const UNSPECIFIED: Self = Self(Cow::Borrowed(""));

    /// Creates a type from a static string, usable in constants.
    #[must_use]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Creates a type from an owned name, e.g. one read from configuration.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for the reserved unspecified type.
    #[must_use]
    pub fn is_unspecified(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the identifier length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the identifier is empty (same as [`Self::is_unspecified`]).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for StorageType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for StorageType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for StorageType {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}
