use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Database-agnostic community model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Community {
    pub id: String,
    pub username: String,
    pub name: String,
    pub image: Option<String>,
    pub bio: Option<String>,
    pub created_by: String,
    pub threads: Vec<String>,
    pub members: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Community {
    pub fn has_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|id| id == user_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCommunity {
    pub id: String,
    pub username: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    pub created_by: String,
}
