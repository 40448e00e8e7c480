use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use super::{Community, Thread, User};

/// Author fields embedded in a populated thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: String,
    pub username: String,
    pub name: String,
    pub image: Option<String>,
}

impl From<&User> for AuthorSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            name: user.name.clone(),
            image: user.image.clone(),
        }
    }
}

/// Community fields embedded in a populated thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunitySummary {
    pub id: String,
    pub username: String,
    pub name: String,
    pub image: Option<String>,
}

impl From<&Community> for CommunitySummary {
    fn from(community: &Community) -> Self {
        Self {
            id: community.id.clone(),
            username: community.username.clone(),
            name: community.name.clone(),
            image: community.image.clone(),
        }
    }
}

/// A thread with its author, community and (some levels of) children resolved.
///
/// `author` is `None` when the author document no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadView {
    pub id: String,
    pub text: String,
    pub parent_id: Option<String>,
    pub author: Option<AuthorSummary>,
    pub community: Option<CommunitySummary>,
    pub likes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub children: Vec<ThreadView>,
    /// Reply count, available even when `children` was not expanded
    pub children_count: usize,
}

impl ThreadView {
    pub(crate) fn from_thread(
        thread: Thread,
        author: Option<AuthorSummary>,
        community: Option<CommunitySummary>,
    ) -> Self {
        Self {
            id: thread.id,
            text: thread.text,
            parent_id: thread.parent_id,
            author,
            community,
            likes: thread.likes,
            created_at: thread.created_at,
            children: Vec::new(),
            children_count: thread.children.len(),
        }
    }

    pub fn likes_count(&self) -> usize {
        self.likes.len()
    }
}

/// One page of the top-level feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostsPage {
    pub posts: Vec<ThreadView>,
    pub is_next: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunitiesPage {
    pub communities: Vec<Community>,
    pub is_next: bool,
}
