//! Local tier configuration.

use std::time::Duration;

/// Configuration for the in-process tier in front of the field store.
#[derive(Debug, Clone)]
pub struct LocalCacheConfig {
    /// When false the item cache skips the local tier entirely.
    pub enabled: bool,

    /// Maximum number of items held.
    pub max_capacity: u64,

    /// Time-to-live for entries.
    /// Bounds how long another process's update can stay invisible here.
    pub ttl: Option<Duration>,

    /// Time-to-idle for entries.
    pub tti: Option<Duration>,
}

impl Default for LocalCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_capacity: 10_000,
            ttl: Some(Duration::from_secs(60)),
            tti: None,
        }
    }
}

impl LocalCacheConfig {
    /// A config with the local tier turned off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Set max capacity (builder pattern).
    #[must_use]
    pub fn max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    /// Set time-to-live for entries.
    #[must_use]
    pub fn ttl(mut self, duration: Duration) -> Self {
        self.ttl = Some(duration);
        self
    }

    /// Set time-to-idle for entries.
    #[must_use]
    pub fn tti(mut self, duration: Duration) -> Self {
        self.tti = Some(duration);
        self
    }
}
