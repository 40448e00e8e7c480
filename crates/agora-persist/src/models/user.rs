use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Database-agnostic user model
///
/// `id` is the identity provider's id, supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub name: String,
    pub image: Option<String>,
    pub bio: Option<String>,
    pub onboarded: bool,
    pub threads: Vec<String>,
    pub communities: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Profile fields written by an upsert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

impl UserProfile {
    /// Usernames are stored lowercase and trimmed.
    pub fn normalized(mut self) -> Self {
        self.username = self.username.trim().to_lowercase();
        self.name = self.name.trim().to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_normalization() {
        let profile = UserProfile {
            id: "user_1".to_string(),
            username: "  MixedCase ".to_string(),
            name: " Ada ".to_string(),
            image: None,
            bio: None,
        }
        .normalized();

        assert_eq!(profile.username, "mixedcase");
        assert_eq!(profile.name, "Ada");
    }
}
