use async_trait::async_trait;
use crate::models::{Community, NewCommunity, NewThread, Thread, User, UserProfile};
use crate::error::Result;

/// Trait for database persistence operations
///
/// Implementations provide database-specific document CRUD. Every method is a
/// single read or write; multi-step forum logic lives in [`crate::Forum`].
/// Bulk methods silently skip ids that do not exist.
#[async_trait]
pub trait PersistenceClient: Send + Sync {
    // Threads

    /// Insert a thread and return it with its assigned id
    async fn create_thread(&self, thread: NewThread) -> Result<Thread>;

    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>>;

    /// Fetch several threads; order of the result is unspecified
    async fn get_threads(&self, thread_ids: &[String]) -> Result<Vec<Thread>>;

    /// Top-level threads, newest first
    async fn list_top_level_threads(&self, skip: u64, limit: i64) -> Result<Vec<Thread>>;

    async fn count_top_level_threads(&self) -> Result<u64>;

    /// Direct replies of a thread
    async fn find_child_threads(&self, parent_id: &str) -> Result<Vec<Thread>>;

    /// Every thread written by a user, newest first
    async fn find_threads_by_author(&self, user_id: &str) -> Result<Vec<Thread>>;

    async fn push_thread_child(&self, parent_id: &str, child_id: &str) -> Result<()>;

    async fn pull_thread_child(&self, parent_id: &str, child_id: &str) -> Result<()>;

    /// Add a liker; a no-op when the user already likes the thread
    async fn add_like(&self, thread_id: &str, user_id: &str) -> Result<()>;

    async fn remove_like(&self, thread_id: &str, user_id: &str) -> Result<()>;

    /// Delete threads by id, returning how many were removed
    async fn delete_threads(&self, thread_ids: &[String]) -> Result<u64>;

    // Users

    /// Create the user or update its profile fields, marking it onboarded
    async fn upsert_user(&self, profile: UserProfile) -> Result<User>;

    async fn get_user(&self, user_id: &str) -> Result<Option<User>>;

    async fn get_users(&self, user_ids: &[String]) -> Result<Vec<User>>;

    async fn push_user_thread(&self, user_id: &str, thread_id: &str) -> Result<()>;

    /// Remove `thread_ids` from the `threads` list of every user in `user_ids`
    async fn pull_user_threads(&self, user_ids: &[String], thread_ids: &[String]) -> Result<()>;

    async fn add_user_community(&self, user_id: &str, community_id: &str) -> Result<()>;

    async fn remove_user_community(&self, user_id: &str, community_id: &str) -> Result<()>;

    // Communities

    async fn create_community(&self, community: NewCommunity) -> Result<Community>;

    async fn get_community(&self, community_id: &str) -> Result<Option<Community>>;

    async fn get_communities(&self, community_ids: &[String]) -> Result<Vec<Community>>;

    /// Communities, newest first
    async fn list_communities(&self, skip: u64, limit: i64) -> Result<Vec<Community>>;

    async fn count_communities(&self) -> Result<u64>;

    async fn push_community_thread(&self, community_id: &str, thread_id: &str) -> Result<()>;

    /// Remove `thread_ids` from the `threads` list of every community in `community_ids`
    async fn pull_community_threads(
        &self,
        community_ids: &[String],
        thread_ids: &[String],
    ) -> Result<()>;

    async fn add_community_member(&self, community_id: &str, user_id: &str) -> Result<()>;

    async fn remove_community_member(&self, community_id: &str, user_id: &str) -> Result<()>;

    /// Cheap round trip used by health checks
    async fn ping(&self) -> Result<()>;
}
