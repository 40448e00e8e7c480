use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::trait_client::PersistenceClient;
use crate::models::{Community, NewCommunity, NewThread, Thread, User, UserProfile};
use crate::error::{PersistError, Result};

/// Documents keep an insertion sequence so "newest first" is stable when
/// timestamps collide.
#[derive(Debug, Clone)]
struct Stored<T> {
    doc: T,
    seq: u64,
}

#[derive(Debug, Default)]
struct Store {
    threads: HashMap<String, Stored<Thread>>,
    users: HashMap<String, User>,
    communities: HashMap<String, Stored<Community>>,
    next_seq: u64,
}

impl Store {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn thread_mut(&mut self, thread_id: &str) -> Option<&mut Thread> {
        self.threads.get_mut(thread_id).map(|s| &mut s.doc)
    }

    fn community_mut(&mut self, community_id: &str) -> Option<&mut Community> {
        self.communities.get_mut(community_id).map(|s| &mut s.doc)
    }
}

fn newest_first<T: Clone>(mut docs: Vec<&Stored<T>>, created_at: impl Fn(&T) -> chrono::DateTime<Utc>) -> Vec<T> {
    docs.sort_by(|a, b| {
        created_at(&b.doc)
            .cmp(&created_at(&a.doc))
            .then(b.seq.cmp(&a.seq))
    });
    docs.into_iter().map(|s| s.doc.clone()).collect()
}

fn page<T>(docs: Vec<T>, skip: u64, limit: i64) -> Vec<T> {
    let skip = usize::try_from(skip).unwrap_or(usize::MAX);
    let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
    docs.into_iter().skip(skip).take(limit).collect()
}

fn push_unique(list: &mut Vec<String>, id: &str) {
    if !list.iter().any(|existing| existing == id) {
        list.push(id.to_string());
    }
}

/// In-process backend used for development and tests
#[derive(Clone, Default)]
pub struct InMemoryPersistenceClient {
    store: Arc<RwLock<Store>>,
}

impl InMemoryPersistenceClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersistenceClient for InMemoryPersistenceClient {
    async fn create_thread(&self, thread: NewThread) -> Result<Thread> {
        let mut store = self.store.write().await;
        let thread = Thread {
            id: uuid::Uuid::new_v4().to_string(),
            text: thread.text,
            author: thread.author,
            community: thread.community,
            parent_id: thread.parent_id,
            children: Vec::new(),
            likes: Vec::new(),
            created_at: thread.created_at,
        };
        let seq = store.next_seq();
        store.threads.insert(thread.id.clone(), Stored { doc: thread.clone(), seq });
        Ok(thread)
    }

    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        let store = self.store.read().await;
        Ok(store.threads.get(thread_id).map(|s| s.doc.clone()))
    }

    async fn get_threads(&self, thread_ids: &[String]) -> Result<Vec<Thread>> {
        let store = self.store.read().await;
        Ok(thread_ids
            .iter()
            .filter_map(|id| store.threads.get(id).map(|s| s.doc.clone()))
            .collect())
    }

    async fn list_top_level_threads(&self, skip: u64, limit: i64) -> Result<Vec<Thread>> {
        let store = self.store.read().await;
        let top_level: Vec<&Stored<Thread>> = store.threads.values().filter(|s| s.doc.is_top_level()).collect();
        Ok(page(newest_first(top_level, |t: &Thread| t.created_at), skip, limit))
    }

    async fn count_top_level_threads(&self) -> Result<u64> {
        let store = self.store.read().await;
        Ok(store.threads.values().filter(|s| s.doc.is_top_level()).count() as u64)
    }

    async fn find_child_threads(&self, parent_id: &str) -> Result<Vec<Thread>> {
        let store = self.store.read().await;
        let mut children: Vec<&Stored<Thread>> = store
            .threads
            .values()
            .filter(|s| s.doc.parent_id.as_deref() == Some(parent_id))
            .collect();
        children.sort_by_key(|s| s.seq);
        Ok(children.into_iter().map(|s| s.doc.clone()).collect())
    }

    async fn find_threads_by_author(&self, user_id: &str) -> Result<Vec<Thread>> {
        let store = self.store.read().await;
        let authored: Vec<&Stored<Thread>> = store.threads.values().filter(|s| s.doc.author == user_id).collect();
        Ok(newest_first(authored, |t: &Thread| t.created_at))
    }

    async fn push_thread_child(&self, parent_id: &str, child_id: &str) -> Result<()> {
        let mut store = self.store.write().await;
        if let Some(parent) = store.thread_mut(parent_id) {
            parent.children.push(child_id.to_string());
        }
        Ok(())
    }

    async fn pull_thread_child(&self, parent_id: &str, child_id: &str) -> Result<()> {
        let mut store = self.store.write().await;
        if let Some(parent) = store.thread_mut(parent_id) {
            parent.children.retain(|id| id != child_id);
        }
        Ok(())
    }

    async fn add_like(&self, thread_id: &str, user_id: &str) -> Result<()> {
        let mut store = self.store.write().await;
        let thread = store
            .thread_mut(thread_id)
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))?;
        push_unique(&mut thread.likes, user_id);
        Ok(())
    }

    async fn remove_like(&self, thread_id: &str, user_id: &str) -> Result<()> {
        let mut store = self.store.write().await;
        let thread = store
            .thread_mut(thread_id)
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))?;
        thread.likes.retain(|id| id != user_id);
        Ok(())
    }

    async fn delete_threads(&self, thread_ids: &[String]) -> Result<u64> {
        let mut store = self.store.write().await;
        let deleted = thread_ids
            .iter()
            .filter(|id| store.threads.remove(id.as_str()).is_some())
            .count();
        Ok(deleted as u64)
    }

    async fn upsert_user(&self, profile: UserProfile) -> Result<User> {
        let mut store = self.store.write().await;
        let user = store.users.entry(profile.id.clone()).or_insert_with(|| User {
            id: profile.id.clone(),
            username: String::new(),
            name: String::new(),
            image: None,
            bio: None,
            onboarded: false,
            threads: Vec::new(),
            communities: Vec::new(),
            created_at: Utc::now(),
        });
        user.username = profile.username;
        user.name = profile.name;
        user.image = profile.image;
        user.bio = profile.bio;
        user.onboarded = true;
        Ok(user.clone())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        let store = self.store.read().await;
        Ok(store.users.get(user_id).cloned())
    }

    async fn get_users(&self, user_ids: &[String]) -> Result<Vec<User>> {
        let store = self.store.read().await;
        Ok(user_ids.iter().filter_map(|id| store.users.get(id).cloned()).collect())
    }

    async fn push_user_thread(&self, user_id: &str, thread_id: &str) -> Result<()> {
        let mut store = self.store.write().await;
        if let Some(user) = store.users.get_mut(user_id) {
            user.threads.push(thread_id.to_string());
        }
        Ok(())
    }

    async fn pull_user_threads(&self, user_ids: &[String], thread_ids: &[String]) -> Result<()> {
        let mut store = self.store.write().await;
        for user_id in user_ids {
            if let Some(user) = store.users.get_mut(user_id) {
                user.threads.retain(|id| !thread_ids.contains(id));
            }
        }
        Ok(())
    }

    async fn add_user_community(&self, user_id: &str, community_id: &str) -> Result<()> {
        let mut store = self.store.write().await;
        if let Some(user) = store.users.get_mut(user_id) {
            push_unique(&mut user.communities, community_id);
        }
        Ok(())
    }

    async fn remove_user_community(&self, user_id: &str, community_id: &str) -> Result<()> {
        let mut store = self.store.write().await;
        if let Some(user) = store.users.get_mut(user_id) {
            user.communities.retain(|id| id != community_id);
        }
        Ok(())
    }

    async fn create_community(&self, community: NewCommunity) -> Result<Community> {
        let mut store = self.store.write().await;
        if store.communities.contains_key(&community.id) {
            return Err(PersistError::CommunityExists(community.id));
        }
        let community = Community {
            id: community.id,
            username: community.username,
            name: community.name,
            image: community.image,
            bio: community.bio,
            created_by: community.created_by,
            threads: Vec::new(),
            members: Vec::new(),
            created_at: Utc::now(),
        };
        let seq = store.next_seq();
        store
            .communities
            .insert(community.id.clone(), Stored { doc: community.clone(), seq });
        Ok(community)
    }

    async fn get_community(&self, community_id: &str) -> Result<Option<Community>> {
        let store = self.store.read().await;
        Ok(store.communities.get(community_id).map(|s| s.doc.clone()))
    }

    async fn get_communities(&self, community_ids: &[String]) -> Result<Vec<Community>> {
        let store = self.store.read().await;
        Ok(community_ids
            .iter()
            .filter_map(|id| store.communities.get(id).map(|s| s.doc.clone()))
            .collect())
    }

    async fn list_communities(&self, skip: u64, limit: i64) -> Result<Vec<Community>> {
        let store = self.store.read().await;
        let all: Vec<&Stored<Community>> = store.communities.values().collect();
        Ok(page(newest_first(all, |c: &Community| c.created_at), skip, limit))
    }

    async fn count_communities(&self) -> Result<u64> {
        Ok(self.store.read().await.communities.len() as u64)
    }

    async fn push_community_thread(&self, community_id: &str, thread_id: &str) -> Result<()> {
        let mut store = self.store.write().await;
        if let Some(community) = store.community_mut(community_id) {
            community.threads.push(thread_id.to_string());
        }
        Ok(())
    }

    async fn pull_community_threads(
        &self,
        community_ids: &[String],
        thread_ids: &[String],
    ) -> Result<()> {
        let mut store = self.store.write().await;
        for community_id in community_ids {
            if let Some(community) = store.community_mut(community_id) {
                community.threads.retain(|id| !thread_ids.contains(id));
            }
        }
        Ok(())
    }

    async fn add_community_member(&self, community_id: &str, user_id: &str) -> Result<()> {
        let mut store = self.store.write().await;
        let community = store
            .community_mut(community_id)
            .ok_or_else(|| PersistError::CommunityNotFound(community_id.to_string()))?;
        push_unique(&mut community.members, user_id);
        Ok(())
    }

    async fn remove_community_member(&self, community_id: &str, user_id: &str) -> Result<()> {
        let mut store = self.store.write().await;
        let community = store
            .community_mut(community_id)
            .ok_or_else(|| PersistError::CommunityNotFound(community_id.to_string()))?;
        community.members.retain(|id| id != user_id);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
