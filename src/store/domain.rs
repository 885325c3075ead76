//! Entity namespaces.

use std::borrow::Cow;
use std::fmt;

use crate::error::{CacheError, CacheResult};

/// A named collection of entities.
///
/// Used verbatim as the document store collection name and as the
/// `domain:item_id` key prefix in the field store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Domain(Cow<'static, str>);

impl Domain {
    pub const USERS: Domain = Domain(Cow::Borrowed("users"));
    pub const GUILDS: Domain = Domain(Cow::Borrowed("guilds"));

    /// Create a domain from a runtime name.
    ///
    /// # Errors
    /// Returns [`CacheError::InvalidArgument`] if `name` is empty.
    pub fn new(name: impl Into<String>) -> CacheResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(CacheError::invalid("domain name must not be empty"));
        }
        Ok(Self(Cow::Owned(name)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Field store key for an item in this domain.
    pub fn key(&self, item_id: &str) -> String {
        format!("{}:{}", self.0, item_id)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
