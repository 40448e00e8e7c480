#[cfg(feature = "mongodb")]
use mongodb::{Client, Collection, bson::doc, bson::oid::ObjectId};
#[cfg(feature = "mongodb")]
use futures::TryStreamExt;

#[cfg(feature = "mongodb")]
use crate::dbs::mongo::models::MongoThread;
#[cfg(feature = "mongodb")]
use crate::error::Result;

#[cfg(feature = "mongodb")]
#[derive(Clone)]
pub struct MongoThreadRepository {
    collection: Collection<MongoThread>,
}

#[cfg(feature = "mongodb")]
impl MongoThreadRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("threads");
        Self { collection }
    }

    /// Insert a thread
    pub async fn insert_thread(&self, thread: &MongoThread) -> Result<()> {
        self.collection.insert_one(thread).await?;
        Ok(())
    }

    /// Get thread by ID
    pub async fn get_thread(&self, thread_id: ObjectId) -> Result<Option<MongoThread>> {
        let filter = doc! { "_id": thread_id };
        Ok(self.collection.find_one(filter).await?)
    }

    pub async fn get_threads(&self, thread_ids: Vec<ObjectId>) -> Result<Vec<MongoThread>> {
        if thread_ids.is_empty() {
            return Ok(Vec::new());
        }
        let filter = doc! { "_id": { "$in": thread_ids } };
        let threads = self.collection
            .find(filter)
            .await?
            .try_collect()
            .await?;
        Ok(threads)
    }

    /// Top-level threads (no parent), newest first
    pub async fn list_top_level(&self, skip: u64, limit: i64) -> Result<Vec<MongoThread>> {
        // `null` matches both an explicit null and a missing field
        let filter = doc! { "parent_id": null };
        let threads = self.collection
            .find(filter)
            .sort(doc! { "created_at": -1, "_id": -1 })
            .skip(skip)
            .limit(limit)
            .await?
            .try_collect()
            .await?;
        Ok(threads)
    }

    pub async fn count_top_level(&self) -> Result<u64> {
        let filter = doc! { "parent_id": null };
        Ok(self.collection.count_documents(filter).await?)
    }

    pub async fn find_children(&self, parent_id: ObjectId) -> Result<Vec<MongoThread>> {
        let filter = doc! { "parent_id": parent_id };
        let threads = self.collection
            .find(filter)
            .sort(doc! { "created_at": 1, "_id": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(threads)
    }

    pub async fn find_by_author(&self, user_id: &str) -> Result<Vec<MongoThread>> {
        let filter = doc! { "author": user_id };
        let threads = self.collection
            .find(filter)
            .sort(doc! { "created_at": -1, "_id": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(threads)
    }

    pub async fn push_child(&self, parent_id: ObjectId, child_id: ObjectId) -> Result<()> {
        let filter = doc! { "_id": parent_id };
        let update = doc! { "$push": { "children": child_id } };
        self.collection.update_one(filter, update).await?;
        Ok(())
    }

    pub async fn pull_child(&self, parent_id: ObjectId, child_id: ObjectId) -> Result<()> {
        let filter = doc! { "_id": parent_id };
        let update = doc! { "$pull": { "children": child_id } };
        self.collection.update_one(filter, update).await?;
        Ok(())
    }

    /// Returns whether the thread exists
    pub async fn add_like(&self, thread_id: ObjectId, user_id: &str) -> Result<bool> {
        let filter = doc! { "_id": thread_id };
        let update = doc! { "$addToSet": { "likes": user_id } };
        let result = self.collection.update_one(filter, update).await?;
        Ok(result.matched_count > 0)
    }

    /// Returns whether the thread exists
    pub async fn remove_like(&self, thread_id: ObjectId, user_id: &str) -> Result<bool> {
        let filter = doc! { "_id": thread_id };
        let update = doc! { "$pull": { "likes": user_id } };
        let result = self.collection.update_one(filter, update).await?;
        Ok(result.matched_count > 0)
    }

    pub async fn delete_many(&self, thread_ids: Vec<ObjectId>) -> Result<u64> {
        if thread_ids.is_empty() {
            return Ok(0);
        }
        let filter = doc! { "_id": { "$in": thread_ids } };
        let result = self.collection.delete_many(filter).await?;
        Ok(result.deleted_count)
    }
}
