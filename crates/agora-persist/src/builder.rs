use std::sync::Arc;

use crate::Forum;
use crate::dbs::InMemoryPersistenceClient;
use crate::trait_client::PersistenceClient;
use crate::error::{Result, PersistError};

/// Builds a [`Forum`] on top of the configured storage backend
///
/// ```ignore
/// let forum = ForumBuilder::new()
///     .mongodb_uri("mongodb://localhost:27017")
///     .database("agora")
///     .build()
///     .await?;
/// ```
pub struct ForumBuilder {
    mongodb_uri: Option<String>,
    database: Option<String>,
    in_memory: bool,
    client: Option<Arc<dyn PersistenceClient>>,
}

impl ForumBuilder {
    pub fn new() -> Self {
        Self {
            mongodb_uri: None,
            database: None,
            in_memory: false,
            client: None,
        }
    }

    pub fn mongodb_uri(mut self, uri: impl Into<String>) -> Self {
        self.mongodb_uri = Some(uri.into());
        self
    }

    pub fn database(mut self, db: impl Into<String>) -> Self {
        self.database = Some(db.into());
        self
    }

    /// Keep all documents in process memory instead of MongoDB
    pub fn in_memory(mut self) -> Self {
        self.in_memory = true;
        self
    }

    /// Use an already constructed persistence client
    pub fn client(mut self, client: Arc<dyn PersistenceClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub async fn build(self) -> Result<Forum> {
        if let Some(client) = self.client {
            return Ok(Forum::new(client));
        }

        if self.in_memory {
            tracing::info!("Using in-memory storage");
            return Ok(Forum::new(Arc::new(InMemoryPersistenceClient::new())));
        }

        let mongodb_uri = self.mongodb_uri
            .ok_or_else(|| PersistError::Internal("mongodb_uri is required".to_string()))?;
        let database = self.database
            .ok_or_else(|| PersistError::Internal("database is required".to_string()))?;

        Self::connect_mongo(&mongodb_uri, &database).await
    }

    #[cfg(feature = "mongodb")]
    async fn connect_mongo(mongodb_uri: &str, database: &str) -> Result<Forum> {
        let client = crate::dbs::MongoPersistenceClient::connect(mongodb_uri, database).await?;
        tracing::info!(database, "Using MongoDB storage");
        Ok(Forum::new(Arc::new(client)))
    }

    #[cfg(not(feature = "mongodb"))]
    async fn connect_mongo(_mongodb_uri: &str, _database: &str) -> Result<Forum> {
        Err(PersistError::Internal(
            "MongoDB storage requires the `mongodb` feature".to_string(),
        ))
    }
}

impl Default for ForumBuilder {
    fn default() -> Self {
        Self::new()
    }
}
