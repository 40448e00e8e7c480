use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Database-agnostic thread model
///
/// A thread without `parent_id` is a top-level post; a thread with one is a
/// reply and is listed in its parent's `children`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub text: String,
    pub author: String,
    pub community: Option<String>,
    pub parent_id: Option<String>,
    pub children: Vec<String>,
    pub likes: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Thread {
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|id| id == user_id)
    }
}

/// Fields supplied when inserting a thread; the backend assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewThread {
    pub text: String,
    pub author: String,
    pub community: Option<String>,
    pub parent_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewThread {
    pub fn post(text: impl Into<String>, author: impl Into<String>, community: Option<String>) -> Self {
        Self {
            text: text.into(),
            author: author.into(),
            community,
            parent_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn reply(text: impl Into<String>, author: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: author.into(),
            community: None,
            parent_id: Some(parent_id.into()),
            created_at: Utc::now(),
        }
    }
}

/// Parameters of a new top-level post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateThreadParams {
    pub text: String,
    pub author: String,
    pub community_id: Option<String>,
}

/// Result of a like toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeState {
    pub liked: bool,
    pub likes_count: usize,
}

/// Ids removed by a thread deletion, root first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeletedThreads {
    pub thread_ids: Vec<String>,
    pub author_ids: Vec<String>,
    pub community_ids: Vec<String>,
}

/// Human readable like count, `None` when nobody liked the thread.
pub fn likes_label(count: usize) -> Option<String> {
    match count {
        0 => None,
        1 => Some("1 like".to_string()),
        n => Some(format!("{} likes", n)),
    }
}
