#[cfg(feature = "mongodb")]
use mongodb::bson::{oid::ObjectId, serde_helpers::chrono_datetime_as_bson_datetime};
#[cfg(feature = "mongodb")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "mongodb")]
use chrono::{DateTime, Utc};

#[cfg(feature = "mongodb")]
use crate::models::{Community, Thread, User};
#[cfg(feature = "mongodb")]
use crate::error::{PersistError, Result};

/// MongoDB-specific Thread model (uses ObjectId)
#[cfg(feature = "mongodb")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoThread {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub text: String,
    pub author: String,
    pub community: Option<String>,
    pub parent_id: Option<ObjectId>,
    #[serde(default)]
    pub children: Vec<ObjectId>,
    #[serde(default)]
    pub likes: Vec<String>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// MongoDB-specific User model; `_id` is the identity provider id
#[cfg(feature = "mongodb")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoUser {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub name: String,
    pub image: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub onboarded: bool,
    #[serde(default)]
    pub threads: Vec<ObjectId>,
    #[serde(default)]
    pub communities: Vec<String>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// MongoDB-specific Community model
#[cfg(feature = "mongodb")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoCommunity {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub name: String,
    pub image: Option<String>,
    pub bio: Option<String>,
    pub created_by: String,
    #[serde(default)]
    pub threads: Vec<ObjectId>,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

#[cfg(feature = "mongodb")]
pub fn parse_object_id(id: &str) -> Result<ObjectId> {
    ObjectId::parse_str(id).map_err(|e| PersistError::InvalidObjectId(format!("{}: {}", id, e)))
}

/// Ids that are not valid ObjectIds cannot match any document and are dropped.
#[cfg(feature = "mongodb")]
pub fn parse_object_ids(ids: &[String]) -> Vec<ObjectId> {
    ids.iter().filter_map(|id| ObjectId::parse_str(id).ok()).collect()
}

#[cfg(feature = "mongodb")]
fn to_hex_ids(ids: Vec<ObjectId>) -> Vec<String> {
    ids.into_iter().map(|id| id.to_hex()).collect()
}

// Conversions from MongoDB-specific to database-agnostic models

#[cfg(feature = "mongodb")]
impl From<MongoThread> for Thread {
    fn from(thread: MongoThread) -> Self {
        Self {
            id: thread.id.to_hex(),
            text: thread.text,
            author: thread.author,
            community: thread.community,
            parent_id: thread.parent_id.map(|id| id.to_hex()),
            children: to_hex_ids(thread.children),
            likes: thread.likes,
            created_at: thread.created_at,
        }
    }
}

#[cfg(feature = "mongodb")]
impl From<MongoUser> for User {
    fn from(user: MongoUser) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            image: user.image,
            bio: user.bio,
            onboarded: user.onboarded,
            threads: to_hex_ids(user.threads),
            communities: user.communities,
            created_at: user.created_at,
        }
    }
}

#[cfg(feature = "mongodb")]
impl From<MongoCommunity> for Community {
    fn from(community: MongoCommunity) -> Self {
        Self {
            id: community.id,
            username: community.username,
            name: community.name,
            image: community.image,
            bio: community.bio,
            created_by: community.created_by,
            threads: to_hex_ids(community.threads),
            members: community.members,
            created_at: community.created_at,
        }
    }
}

#[cfg(all(test, feature = "mongodb"))]
mod tests {
    use super::*;

    #[test]
    fn test_thread_conversion_uses_hex_ids() {
        let parent = ObjectId::new();
        let child = ObjectId::new();
        let mongo = MongoThread {
            id: ObjectId::new(),
            text: "hello".to_string(),
            author: "user_1".to_string(),
            community: None,
            parent_id: Some(parent),
            children: vec![child],
            likes: vec!["user_2".to_string()],
            created_at: Utc::now(),
        };

        let thread: Thread = mongo.clone().into();
        assert_eq!(thread.id, mongo.id.to_hex());
        assert_eq!(thread.parent_id, Some(parent.to_hex()));
        assert_eq!(thread.children, vec![child.to_hex()]);
    }

    #[test]
    fn test_invalid_ids_are_dropped() {
        let valid = ObjectId::new().to_hex();
        let ids = parse_object_ids(&[valid.clone(), "not-an-id".to_string()]);
        assert_eq!(ids.len(), 1);
        assert_eq!(ids[0].to_hex(), valid);
        assert!(parse_object_id("not-an-id").is_err());
    }
}
