#[cfg(feature = "mongodb")]
use mongodb::{Client, Database, bson::doc, bson::oid::ObjectId};
#[cfg(feature = "mongodb")]
use async_trait::async_trait;

#[cfg(feature = "mongodb")]
use crate::trait_client::PersistenceClient;
#[cfg(feature = "mongodb")]
use crate::models::{Community, NewCommunity, NewThread, Thread, User, UserProfile};
#[cfg(feature = "mongodb")]
use crate::dbs::mongo::models::{parse_object_id, parse_object_ids, MongoCommunity, MongoThread};
#[cfg(feature = "mongodb")]
use crate::dbs::mongo::repositories::{
    MongoCommunityRepository, MongoThreadRepository, MongoUserRepository,
};
#[cfg(feature = "mongodb")]
use crate::error::{Result, PersistError};

#[cfg(feature = "mongodb")]
pub struct MongoPersistenceClient {
    database: Database,
    thread_repo: MongoThreadRepository,
    user_repo: MongoUserRepository,
    community_repo: MongoCommunityRepository,
}

#[cfg(feature = "mongodb")]
impl MongoPersistenceClient {
    /// Connect to MongoDB and create client
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        tracing::debug!(database, "MongoDB client created");

        Ok(Self {
            database: client.database(database),
            thread_repo: MongoThreadRepository::new(&client, database),
            user_repo: MongoUserRepository::new(&client, database),
            community_repo: MongoCommunityRepository::new(&client, database),
        })
    }
}

#[cfg(feature = "mongodb")]
fn into_models<M, T: From<M>>(docs: Vec<M>) -> Vec<T> {
    docs.into_iter().map(T::from).collect()
}

#[cfg(feature = "mongodb")]
#[async_trait]
impl PersistenceClient for MongoPersistenceClient {
    async fn create_thread(&self, thread: NewThread) -> Result<Thread> {
        let parent_id = thread.parent_id.as_deref().map(parse_object_id).transpose()?;
        let mongo_thread = MongoThread {
            id: ObjectId::new(),
            text: thread.text,
            author: thread.author,
            community: thread.community,
            parent_id,
            children: Vec::new(),
            likes: Vec::new(),
            created_at: thread.created_at,
        };
        self.thread_repo.insert_thread(&mongo_thread).await?;
        Ok(mongo_thread.into())
    }

    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        let object_id = parse_object_id(thread_id)?;
        let thread = self.thread_repo.get_thread(object_id).await?;
        Ok(thread.map(Thread::from))
    }

    async fn get_threads(&self, thread_ids: &[String]) -> Result<Vec<Thread>> {
        let threads = self.thread_repo.get_threads(parse_object_ids(thread_ids)).await?;
        Ok(into_models(threads))
    }

    async fn list_top_level_threads(&self, skip: u64, limit: i64) -> Result<Vec<Thread>> {
        let threads = self.thread_repo.list_top_level(skip, limit).await?;
        Ok(into_models(threads))
    }

    async fn count_top_level_threads(&self) -> Result<u64> {
        self.thread_repo.count_top_level().await
    }

    async fn find_child_threads(&self, parent_id: &str) -> Result<Vec<Thread>> {
        let object_id = parse_object_id(parent_id)?;
        let threads = self.thread_repo.find_children(object_id).await?;
        Ok(into_models(threads))
    }

    async fn find_threads_by_author(&self, user_id: &str) -> Result<Vec<Thread>> {
        let threads = self.thread_repo.find_by_author(user_id).await?;
        Ok(into_models(threads))
    }

    async fn push_thread_child(&self, parent_id: &str, child_id: &str) -> Result<()> {
        self.thread_repo
            .push_child(parse_object_id(parent_id)?, parse_object_id(child_id)?)
            .await
    }

    async fn pull_thread_child(&self, parent_id: &str, child_id: &str) -> Result<()> {
        self.thread_repo
            .pull_child(parse_object_id(parent_id)?, parse_object_id(child_id)?)
            .await
    }

    async fn add_like(&self, thread_id: &str, user_id: &str) -> Result<()> {
        if !self.thread_repo.add_like(parse_object_id(thread_id)?, user_id).await? {
            return Err(PersistError::ThreadNotFound(thread_id.to_string()));
        }
        Ok(())
    }

    async fn remove_like(&self, thread_id: &str, user_id: &str) -> Result<()> {
        if !self.thread_repo.remove_like(parse_object_id(thread_id)?, user_id).await? {
            return Err(PersistError::ThreadNotFound(thread_id.to_string()));
        }
        Ok(())
    }

    async fn delete_threads(&self, thread_ids: &[String]) -> Result<u64> {
        self.thread_repo.delete_many(parse_object_ids(thread_ids)).await
    }

    async fn upsert_user(&self, profile: UserProfile) -> Result<User> {
        let user = self.user_repo.upsert_user(profile).await?;
        Ok(user.into())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        let user = self.user_repo.get_user(user_id).await?;
        Ok(user.map(User::from))
    }

    async fn get_users(&self, user_ids: &[String]) -> Result<Vec<User>> {
        let users = self.user_repo.get_users(user_ids).await?;
        Ok(into_models(users))
    }

    async fn push_user_thread(&self, user_id: &str, thread_id: &str) -> Result<()> {
        self.user_repo.push_thread(user_id, parse_object_id(thread_id)?).await
    }

    async fn pull_user_threads(&self, user_ids: &[String], thread_ids: &[String]) -> Result<()> {
        self.user_repo.pull_threads(user_ids, parse_object_ids(thread_ids)).await
    }

    async fn add_user_community(&self, user_id: &str, community_id: &str) -> Result<()> {
        self.user_repo.add_community(user_id, community_id).await
    }

    async fn remove_user_community(&self, user_id: &str, community_id: &str) -> Result<()> {
        self.user_repo.remove_community(user_id, community_id).await
    }

    async fn create_community(&self, community: NewCommunity) -> Result<Community> {
        if self.community_repo.get_community(&community.id).await?.is_some() {
            return Err(PersistError::CommunityExists(community.id));
        }
        let mongo_community = MongoCommunity {
            id: community.id,
            username: community.username,
            name: community.name,
            image: community.image,
            bio: community.bio,
            created_by: community.created_by,
            threads: Vec::new(),
            members: Vec::new(),
            created_at: chrono::Utc::now(),
        };
        self.community_repo.insert_community(&mongo_community).await?;
        Ok(mongo_community.into())
    }

    async fn get_community(&self, community_id: &str) -> Result<Option<Community>> {
        let community = self.community_repo.get_community(community_id).await?;
        Ok(community.map(Community::from))
    }

    async fn get_communities(&self, community_ids: &[String]) -> Result<Vec<Community>> {
        let communities = self.community_repo.get_communities(community_ids).await?;
        Ok(into_models(communities))
    }

    async fn list_communities(&self, skip: u64, limit: i64) -> Result<Vec<Community>> {
        let communities = self.community_repo.list_communities(skip, limit).await?;
        Ok(into_models(communities))
    }

    async fn count_communities(&self) -> Result<u64> {
        self.community_repo.count_communities().await
    }

    async fn push_community_thread(&self, community_id: &str, thread_id: &str) -> Result<()> {
        self.community_repo
            .push_thread(community_id, parse_object_id(thread_id)?)
            .await
    }

    async fn pull_community_threads(
        &self,
        community_ids: &[String],
        thread_ids: &[String],
    ) -> Result<()> {
        self.community_repo
            .pull_threads(community_ids, parse_object_ids(thread_ids))
            .await
    }

    async fn add_community_member(&self, community_id: &str, user_id: &str) -> Result<()> {
        if !self.community_repo.add_member(community_id, user_id).await? {
            return Err(PersistError::CommunityNotFound(community_id.to_string()));
        }
        Ok(())
    }

    async fn remove_community_member(&self, community_id: &str, user_id: &str) -> Result<()> {
        if !self.community_repo.remove_member(community_id, user_id).await? {
            return Err(PersistError::CommunityNotFound(community_id.to_string()));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}
