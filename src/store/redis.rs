//! Redis field store.
//!
//! Each item is a hash at `domain:item_id`. Values are stored as strings and
//! keys carry no expiry.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use fred::prelude::*;
use tracing::info;

use super::{FieldMap, FieldStore, FieldValue};
use crate::error::StoreError;

/// Connection handle to a Redis instance.
///
/// Wraps a [`fred::prelude::Client`]; cloning shares the connection.
#[derive(Clone)]
pub struct RedisFieldStore {
    client: Client,
}

impl RedisFieldStore {
    /// Connect to Redis at `host:port`.
    ///
    /// # Errors
    /// Returns [`StoreError::Redis`] if the config is invalid or the
    /// connection fails.
    pub async fn connect(
        host: &str,
        port: u16,
        password: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let mut config = Config::from_url(&format!("redis://{host}:{port}"))?;
        config.password = password.map(str::to_owned);

        let client = Builder::from_config(config)
            .with_connection_config(|conn| {
                conn.connection_timeout = timeout;
            })
            .build()?;
        client.init().await?;

        info!("Connected to Redis at {}:{}", host, port);
        Ok(Self { client })
    }
}

#[async_trait]
impl FieldStore for RedisFieldStore {
    async fn hgetall(&self, key: &str) -> Result<FieldMap, StoreError> {
        let raw: HashMap<String, String> = self.client.hgetall(key).await?;
        Ok(raw
            .into_iter()
            .map(|(field, value)| (field, FieldValue::Str(value)))
            .collect())
    }

    async fn hmget(&self, key: &str, fields: &[String]) -> Result<Vec<Option<FieldValue>>, StoreError> {
        if fields.is_empty() {
            return Ok(Vec::new());
        }

        let raw: Vec<Option<String>> = self.client.hmget(key, fields.to_vec()).await?;
        Ok(raw.into_iter().map(|v| v.map(FieldValue::Str)).collect())
    }

    async fn hset(&self, key: &str, fields: &FieldMap) -> Result<(), StoreError> {
        if fields.is_empty() {
            return Ok(());
        }

        let values: HashMap<String, String> = fields
            .iter()
            .map(|(field, value)| (field.clone(), value.to_string()))
            .collect();

        let _: i64 = self.client.hset(key, values).await?;
        Ok(())
    }
}
