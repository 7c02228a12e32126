pub mod dummyjson;

use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub company: Company,
    #[serde(default)]
    pub address: Address,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Company {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
}

/// Identity fields handed from the user list to the post screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub image: String,
}

impl User {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            image: self.image.clone(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl UserSummary {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub reactions: Reactions,
    #[serde(default)]
    pub views: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Reactions {
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub dislikes: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("server responded with {status}")]
    Response { status: reqwest::StatusCode },
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

#[async_trait]
pub trait UserSource: Send + Sync {
    async fn fetch_users(&self) -> Result<Vec<User>, FetchError>;
    async fn fetch_posts(&self, user_id: u64) -> Result<Vec<Post>, FetchError>;
}
