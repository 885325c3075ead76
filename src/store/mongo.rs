//! MongoDB document store.

use async_trait::async_trait;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{ClientOptions, FindOneOptions};
use mongodb::{Client, Collection};
use tracing::{debug, info};

use super::{Domain, DocumentStore, FieldMap};
use crate::error::StoreError;

/// Document store backed by a MongoDB database, one collection per domain.
#[derive(Debug, Clone)]
pub struct MongoDocumentStore {
    db: mongodb::Database,
}

impl MongoDocumentStore {
    /// Connect to MongoDB with the given URI and database name.
    ///
    /// # Errors
    /// Returns error if the URI is invalid or the server does not answer a
    /// ping.
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, StoreError> {
        let options = ClientOptions::parse(uri).await?;
        let client = Client::with_options(options)?;

        // Ping the database to verify connection
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;

        info!("Successfully connected to MongoDB");

        Ok(Self {
            db: client.database(db_name),
        })
    }

    fn collection(&self, domain: &Domain) -> Collection<Document> {
        self.db.collection(domain.as_str())
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    async fn find_one(
        &self,
        domain: &Domain,
        item_id: &str,
        projection: &[String],
    ) -> Result<Option<Document>, StoreError> {
        let filter = doc! { "_id": item_id };

        let options = if projection.is_empty() {
            None
        } else {
            let fields: Document = projection
                .iter()
                .map(|name| (name.clone(), Bson::Boolean(true)))
                .collect();
            Some(FindOneOptions::builder().projection(fields).build())
        };

        let result = self
            .collection(domain)
            .find_one(filter)
            .with_options(options)
            .await?;

        debug!("DB get {}:{}: {:?}", domain, item_id, result.is_some());
        Ok(result)
    }

    async fn set_fields(
        &self,
        domain: &Domain,
        item_id: &str,
        fields: &FieldMap,
    ) -> Result<(), StoreError> {
        let set: Document = fields
            .iter()
            .map(|(name, value)| (name.clone(), Bson::from(value)))
            .collect();

        let filter = doc! { "_id": item_id };
        let update = doc! { "$set": set };

        let result = self.collection(domain).update_one(filter, update).await?;
        debug!(
            "Updated {}:{} (matched {})",
            domain, item_id, result.matched_count
        );

        Ok(())
    }
}
