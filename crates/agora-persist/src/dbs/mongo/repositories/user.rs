#[cfg(feature = "mongodb")]
use mongodb::{Client, Collection, bson, bson::doc, bson::oid::ObjectId};
#[cfg(feature = "mongodb")]
use futures::TryStreamExt;

#[cfg(feature = "mongodb")]
use crate::dbs::mongo::models::MongoUser;
#[cfg(feature = "mongodb")]
use crate::models::UserProfile;
#[cfg(feature = "mongodb")]
use crate::error::{PersistError, Result};

#[cfg(feature = "mongodb")]
#[derive(Clone)]
pub struct MongoUserRepository {
    collection: Collection<MongoUser>,
}

#[cfg(feature = "mongodb")]
impl MongoUserRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("users");
        Self { collection }
    }

    /// Create or update the profile, keeping thread and community lists
    pub async fn upsert_user(&self, profile: UserProfile) -> Result<MongoUser> {
        let filter = doc! { "_id": profile.id.as_str() };
        let update = doc! {
            "$set": {
                "username": profile.username.as_str(),
                "name": profile.name.as_str(),
                "image": profile.image.as_deref(),
                "bio": profile.bio.as_deref(),
                "onboarded": true
            },
            "$setOnInsert": {
                "threads": [],
                "communities": [],
                "created_at": bson::DateTime::now()
            }
        };
        self.collection.update_one(filter.clone(), update).upsert(true).await?;

        self.collection
            .find_one(filter)
            .await?
            .ok_or(PersistError::UserNotFound(profile.id))
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<MongoUser>> {
        let filter = doc! { "_id": user_id };
        Ok(self.collection.find_one(filter).await?)
    }

    pub async fn get_users(&self, user_ids: &[String]) -> Result<Vec<MongoUser>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let filter = doc! { "_id": { "$in": user_ids.to_vec() } };
        let users = self.collection
            .find(filter)
            .await?
            .try_collect()
            .await?;
        Ok(users)
    }

    pub async fn push_thread(&self, user_id: &str, thread_id: ObjectId) -> Result<()> {
        let filter = doc! { "_id": user_id };
        let update = doc! { "$push": { "threads": thread_id } };
        self.collection.update_one(filter, update).await?;
        Ok(())
    }

    pub async fn pull_threads(&self, user_ids: &[String], thread_ids: Vec<ObjectId>) -> Result<()> {
        if user_ids.is_empty() || thread_ids.is_empty() {
            return Ok(());
        }
        let filter = doc! { "_id": { "$in": user_ids.to_vec() } };
        let update = doc! { "$pull": { "threads": { "$in": thread_ids } } };
        self.collection.update_many(filter, update).await?;
        Ok(())
    }

    pub async fn add_community(&self, user_id: &str, community_id: &str) -> Result<()> {
        let filter = doc! { "_id": user_id };
        let update = doc! { "$addToSet": { "communities": community_id } };
        self.collection.update_one(filter, update).await?;
        Ok(())
    }

    pub async fn remove_community(&self, user_id: &str, community_id: &str) -> Result<()> {
        let filter = doc! { "_id": user_id };
        let update = doc! { "$pull": { "communities": community_id } };
        self.collection.update_one(filter, update).await?;
        Ok(())
    }
}
