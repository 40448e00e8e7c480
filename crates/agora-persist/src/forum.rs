use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;
use futures::future::{BoxFuture, FutureExt};

use crate::trait_client::PersistenceClient;
use crate::models::{
    AuthorSummary, CommunitiesPage, Community, CommunitySummary, CreateThreadParams,
    DeletedThreads, LikeState, NewCommunity, NewThread, PostsPage, Thread, ThreadView, User,
    UserProfile,
};
use crate::error::{PersistError, Result};

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Levels of replies expanded by [`Forum::fetch_thread_by_id`]
const THREAD_DETAIL_DEPTH: usize = 2;
/// Levels of replies expanded for feed-style listings
const LISTING_DEPTH: usize = 1;

/// One-based page request, clamped to sane bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u64,
    pub size: u64,
}

impl Page {
    pub fn new(number: u64, size: u64) -> Self {
        Self {
            number: number.max(1),
            size: size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn skip(&self) -> u64 {
        (self.number - 1).saturating_mul(self.size)
    }

    pub fn limit(&self) -> i64 {
        self.size as i64
    }

    /// Whether documents remain after this page
    pub fn has_next(&self, total: u64, returned: usize) -> bool {
        total > self.skip() + returned as u64
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

fn require_text(text: &str, what: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(PersistError::Validation(format!("{} must not be empty", what)));
    }
    Ok(())
}

/// Newest first by `created_at`; ties go to the later entry in `push_order`,
/// the order ids were appended to the owning list.
fn sort_newest_first(threads: &mut [Thread], push_order: &[String]) {
    let position: HashMap<&str, usize> = push_order
        .iter()
        .enumerate()
        .map(|(index, id)| (id.as_str(), index))
        .collect();
    threads.sort_by(|a, b| {
        b.created_at.cmp(&a.created_at).then_with(|| {
            let a_pos = position.get(a.id.as_str());
            let b_pos = position.get(b.id.as_str());
            b_pos.cmp(&a_pos)
        })
    });
}

/// Forum operations over a [`PersistenceClient`]
///
/// Each operation is a short sequence of document reads and writes. There are
/// no transactions: a failure part-way leaves earlier writes in place.
#[derive(Clone)]
pub struct Forum {
    persist: Arc<dyn PersistenceClient>,
}

impl Forum {
    pub fn new(persist: Arc<dyn PersistenceClient>) -> Self {
        Self { persist }
    }

    pub fn persistence(&self) -> &Arc<dyn PersistenceClient> {
        &self.persist
    }

    // Threads

    /// Paginated feed of top-level threads, newest first
    pub async fn fetch_posts(&self, page: Page) -> Result<PostsPage> {
        let total = self.persist.count_top_level_threads().await?;
        let threads = self
            .persist
            .list_top_level_threads(page.skip(), page.limit())
            .await?;

        let is_next = page.has_next(total, threads.len());
        let posts = self.populate(threads, LISTING_DEPTH).await?;

        tracing::debug!(page = page.number, returned = posts.len(), total, "Fetched feed page");

        Ok(PostsPage { posts, is_next })
    }

    /// Create a top-level thread, optionally inside a community
    pub async fn create_thread(&self, params: CreateThreadParams) -> Result<Thread> {
        require_text(&params.text, "Thread text")?;
        self.require_user(&params.author).await?;

        let community = match params.community_id.as_deref() {
            Some(community_id) => {
                let community = self.persist.get_community(community_id).await?;
                if community.is_none() {
                    tracing::warn!(
                        community_id,
                        "Community not found, creating personal thread"
                    );
                }
                community
            }
            None => None,
        };

        let thread = self
            .persist
            .create_thread(NewThread::post(
                params.text,
                params.author.clone(),
                community.as_ref().map(|c| c.id.clone()),
            ))
            .await?;

        self.persist.push_user_thread(&params.author, &thread.id).await?;
        if let Some(community) = &community {
            self.persist.push_community_thread(&community.id, &thread.id).await?;
        }

        tracing::info!(
            thread_id = %thread.id,
            author = %thread.author,
            community = ?thread.community,
            "Thread created"
        );

        Ok(thread)
    }

    /// Every descendant of a thread, level by level
    pub async fn fetch_all_child_threads(&self, thread_id: &str) -> Result<Vec<Thread>> {
        self.require_thread(thread_id).await?;
        self.collect_descendants(thread_id).await
    }

    async fn collect_descendants(&self, thread_id: &str) -> Result<Vec<Thread>> {
        let mut descendants = Vec::new();
        let mut seen: HashSet<String> = HashSet::from([thread_id.to_string()]);
        let mut queue = VecDeque::from([thread_id.to_string()]);

        while let Some(parent_id) = queue.pop_front() {
            for child in self.persist.find_child_threads(&parent_id).await? {
                if seen.insert(child.id.clone()) {
                    queue.push_back(child.id.clone());
                    descendants.push(child);
                }
            }
        }

        Ok(descendants)
    }

    /// Delete a thread with its whole reply subtree and retract every reference to it
    pub async fn delete_thread(&self, thread_id: &str) -> Result<DeletedThreads> {
        let root = self.require_thread(thread_id).await?;
        let descendants = self.collect_descendants(&root.id).await?;

        let all: Vec<&Thread> = std::iter::once(&root).chain(descendants.iter()).collect();
        let thread_ids: Vec<String> = all.iter().map(|t| t.id.clone()).collect();
        let author_ids: Vec<String> = all
            .iter()
            .map(|t| t.author.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let community_ids: Vec<String> = all
            .iter()
            .filter_map(|t| t.community.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let deleted = self.persist.delete_threads(&thread_ids).await?;
        self.persist.pull_user_threads(&author_ids, &thread_ids).await?;
        self.persist.pull_community_threads(&community_ids, &thread_ids).await?;
        if let Some(parent_id) = &root.parent_id {
            self.persist.pull_thread_child(parent_id, &root.id).await?;
        }

        tracing::info!(
            thread_id = %root.id,
            deleted,
            authors = author_ids.len(),
            communities = community_ids.len(),
            "Thread deleted"
        );

        Ok(DeletedThreads {
            thread_ids,
            author_ids,
            community_ids,
        })
    }

    /// A thread with author, community and two levels of replies
    pub async fn fetch_thread_by_id(&self, thread_id: &str) -> Result<ThreadView> {
        let thread = self.require_thread(thread_id).await?;
        self.populate(vec![thread], THREAD_DETAIL_DEPTH)
            .await?
            .pop()
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))
    }

    /// Reply to a thread
    pub async fn add_comment_to_thread(
        &self,
        thread_id: &str,
        text: &str,
        user_id: &str,
    ) -> Result<Thread> {
        let parent = self.require_thread(thread_id).await?;
        require_text(text, "Comment text")?;
        self.require_user(user_id).await?;

        let comment = self
            .persist
            .create_thread(NewThread::reply(text, user_id, parent.id.clone()))
            .await?;
        self.persist.push_thread_child(&parent.id, &comment.id).await?;

        tracing::info!(
            thread_id = %parent.id,
            comment_id = %comment.id,
            author = %user_id,
            "Comment added"
        );

        Ok(comment)
    }

    /// Like the thread, or remove the like if the user already gave one
    pub async fn toggle_like(&self, thread_id: &str, user_id: &str) -> Result<LikeState> {
        let thread = self.require_thread(thread_id).await?;

        let liked = if thread.is_liked_by(user_id) {
            self.persist.remove_like(&thread.id, user_id).await?;
            tracing::info!(thread_id = %thread.id, user_id, "Like removed");
            false
        } else {
            self.persist.add_like(&thread.id, user_id).await?;
            tracing::info!(thread_id = %thread.id, user_id, "Like added");
            true
        };

        // Count from the stored document; other likers may have written since the read.
        let updated = self.require_thread(&thread.id).await?;
        Ok(LikeState {
            liked,
            likes_count: updated.likes.len(),
        })
    }

    // Users

    pub async fn upsert_user(&self, profile: UserProfile) -> Result<User> {
        require_text(&profile.id, "User id")?;
        require_text(&profile.username, "Username")?;
        require_text(&profile.name, "Name")?;

        let user = self.persist.upsert_user(profile.normalized()).await?;
        tracing::info!(user_id = %user.id, username = %user.username, "User profile saved");
        Ok(user)
    }

    pub async fn fetch_user(&self, user_id: &str) -> Result<User> {
        self.require_user(user_id).await
    }

    /// A user's top-level threads, newest first
    pub async fn fetch_user_posts(&self, user_id: &str) -> Result<Vec<ThreadView>> {
        let user = self.require_user(user_id).await?;
        let mut threads = self.persist.get_threads(&user.threads).await?;
        sort_newest_first(&mut threads, &user.threads);
        self.populate(threads, LISTING_DEPTH).await
    }

    /// Replies by other users to anything the user wrote, newest first
    pub async fn get_activity(&self, user_id: &str) -> Result<Vec<ThreadView>> {
        let user = self.require_user(user_id).await?;

        let authored = self.persist.find_threads_by_author(&user.id).await?;
        let reply_ids: Vec<String> = authored
            .into_iter()
            .flat_map(|thread| thread.children)
            .collect();

        let mut replies: Vec<Thread> = self
            .persist
            .get_threads(&reply_ids)
            .await?
            .into_iter()
            .filter(|reply| reply.author != user.id)
            .collect();
        sort_newest_first(&mut replies, &reply_ids);

        self.populate(replies, 0).await
    }

    // Communities

    pub async fn create_community(&self, community: NewCommunity) -> Result<Community> {
        require_text(&community.id, "Community id")?;
        require_text(&community.name, "Community name")?;
        let creator = self.require_user(&community.created_by).await?;

        let created = self.persist.create_community(community).await?;
        self.persist.add_community_member(&created.id, &creator.id).await?;
        self.persist.add_user_community(&creator.id, &created.id).await?;

        tracing::info!(community_id = %created.id, created_by = %creator.id, "Community created");

        self.require_community(&created.id).await
    }

    pub async fn fetch_community(&self, community_id: &str) -> Result<Community> {
        self.require_community(community_id).await
    }

    pub async fn fetch_communities(&self, page: Page) -> Result<CommunitiesPage> {
        let total = self.persist.count_communities().await?;
        let communities = self
            .persist
            .list_communities(page.skip(), page.limit())
            .await?;
        let is_next = page.has_next(total, communities.len());
        Ok(CommunitiesPage { communities, is_next })
    }

    /// Threads posted into a community, newest first
    pub async fn fetch_community_posts(&self, community_id: &str) -> Result<Vec<ThreadView>> {
        let community = self.require_community(community_id).await?;
        let mut threads = self.persist.get_threads(&community.threads).await?;
        sort_newest_first(&mut threads, &community.threads);
        self.populate(threads, LISTING_DEPTH).await
    }

    pub async fn join_community(&self, community_id: &str, user_id: &str) -> Result<Community> {
        let community = self.require_community(community_id).await?;
        let user = self.require_user(user_id).await?;

        if community.has_member(&user.id) && user.communities.contains(&community.id) {
            tracing::debug!(community_id = %community.id, user_id = %user.id, "User already a member");
            return Ok(community);
        }

        self.persist.add_community_member(&community.id, &user.id).await?;
        self.persist.add_user_community(&user.id, &community.id).await?;

        tracing::info!(community_id = %community.id, user_id = %user.id, "User joined community");
        self.require_community(&community.id).await
    }

    pub async fn leave_community(&self, community_id: &str, user_id: &str) -> Result<Community> {
        let community = self.require_community(community_id).await?;
        let user = self.require_user(user_id).await?;

        self.persist.remove_community_member(&community.id, &user.id).await?;
        self.persist.remove_user_community(&user.id, &community.id).await?;

        tracing::info!(community_id = %community.id, user_id = %user.id, "User left community");
        self.require_community(&community.id).await
    }

    // Lookups

    async fn require_thread(&self, thread_id: &str) -> Result<Thread> {
        self.persist
            .get_thread(thread_id)
            .await?
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))
    }

    async fn require_user(&self, user_id: &str) -> Result<User> {
        self.persist
            .get_user(user_id)
            .await?
            .ok_or_else(|| PersistError::UserNotFound(user_id.to_string()))
    }

    async fn require_community(&self, community_id: &str) -> Result<Community> {
        self.persist
            .get_community(community_id)
            .await?
            .ok_or_else(|| PersistError::CommunityNotFound(community_id.to_string()))
    }

    /// Resolve authors and communities for `threads` and expand `depth` levels
    /// of replies, keeping each parent's `children` order.
    fn populate(&self, threads: Vec<Thread>, depth: usize) -> BoxFuture<'_, Result<Vec<ThreadView>>> {
        async move {
            if threads.is_empty() {
                return Ok(Vec::new());
            }

            let author_ids: Vec<String> = threads
                .iter()
                .map(|t| t.author.clone())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            let community_ids: Vec<String> = threads
                .iter()
                .filter_map(|t| t.community.clone())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();

            let authors: HashMap<String, AuthorSummary> = self
                .persist
                .get_users(&author_ids)
                .await?
                .iter()
                .map(|u| (u.id.clone(), AuthorSummary::from(u)))
                .collect();
            let communities: HashMap<String, CommunitySummary> = self
                .persist
                .get_communities(&community_ids)
                .await?
                .iter()
                .map(|c| (c.id.clone(), CommunitySummary::from(c)))
                .collect();

            let mut children: HashMap<String, ThreadView> = if depth > 0 {
                let child_ids: Vec<String> =
                    threads.iter().flat_map(|t| t.children.iter().cloned()).collect();
                let child_threads = self.persist.get_threads(&child_ids).await?;
                self.populate(child_threads, depth - 1)
                    .await?
                    .into_iter()
                    .map(|view| (view.id.clone(), view))
                    .collect()
            } else {
                HashMap::new()
            };

            let views = threads
                .into_iter()
                .map(|thread| {
                    let child_order = thread.children.clone();
                    let author = authors.get(&thread.author).cloned();
                    let community = thread
                        .community
                        .as_ref()
                        .and_then(|id| communities.get(id))
                        .cloned();

                    let mut view = ThreadView::from_thread(thread, author, community);
                    view.children = child_order
                        .iter()
                        .filter_map(|id| children.remove(id))
                        .collect();
                    view
                })
                .collect();

            Ok(views)
        }
        .boxed()
    }
}
