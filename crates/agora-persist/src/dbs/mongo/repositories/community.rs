#[cfg(feature = "mongodb")]
use mongodb::{Client, Collection, bson::doc, bson::oid::ObjectId};
#[cfg(feature = "mongodb")]
use futures::TryStreamExt;

#[cfg(feature = "mongodb")]
use crate::dbs::mongo::models::MongoCommunity;
#[cfg(feature = "mongodb")]
use crate::error::Result;

#[cfg(feature = "mongodb")]
#[derive(Clone)]
pub struct MongoCommunityRepository {
    collection: Collection<MongoCommunity>,
}

#[cfg(feature = "mongodb")]
impl MongoCommunityRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("communities");
        Self { collection }
    }

    pub async fn insert_community(&self, community: &MongoCommunity) -> Result<()> {
        self.collection.insert_one(community).await?;
        Ok(())
    }

    pub async fn get_community(&self, community_id: &str) -> Result<Option<MongoCommunity>> {
        let filter = doc! { "_id": community_id };
        Ok(self.collection.find_one(filter).await?)
    }

    pub async fn get_communities(&self, community_ids: &[String]) -> Result<Vec<MongoCommunity>> {
        if community_ids.is_empty() {
            return Ok(Vec::new());
        }
        let filter = doc! { "_id": { "$in": community_ids.to_vec() } };
        let communities = self.collection
            .find(filter)
            .await?
            .try_collect()
            .await?;
        Ok(communities)
    }

    /// Communities, newest first
    pub async fn list_communities(&self, skip: u64, limit: i64) -> Result<Vec<MongoCommunity>> {
        let communities = self.collection
            .find(doc! {})
            .sort(doc! { "created_at": -1, "_id": -1 })
            .skip(skip)
            .limit(limit)
            .await?
            .try_collect()
            .await?;
        Ok(communities)
    }

    pub async fn count_communities(&self) -> Result<u64> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }

    pub async fn push_thread(&self, community_id: &str, thread_id: ObjectId) -> Result<()> {
        let filter = doc! { "_id": community_id };
        let update = doc! { "$push": { "threads": thread_id } };
        self.collection.update_one(filter, update).await?;
        Ok(())
    }

    pub async fn pull_threads(
        &self,
        community_ids: &[String],
        thread_ids: Vec<ObjectId>,
    ) -> Result<()> {
        if community_ids.is_empty() || thread_ids.is_empty() {
            return Ok(());
        }
        let filter = doc! { "_id": { "$in": community_ids.to_vec() } };
        let update = doc! { "$pull": { "threads": { "$in": thread_ids } } };
        self.collection.update_many(filter, update).await?;
        Ok(())
    }

    /// Returns whether the community exists
    pub async fn add_member(&self, community_id: &str, user_id: &str) -> Result<bool> {
        let filter = doc! { "_id": community_id };
        let update = doc! { "$addToSet": { "members": user_id } };
        let result = self.collection.update_one(filter, update).await?;
        Ok(result.matched_count > 0)
    }

    /// Returns whether the community exists
    pub async fn remove_member(&self, community_id: &str, user_id: &str) -> Result<bool> {
        let filter = doc! { "_id": community_id };
        let update = doc! { "$pull": { "members": user_id } };
        let result = self.collection.update_one(filter, update).await?;
        Ok(result.matched_count > 0)
    }
}
