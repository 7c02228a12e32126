use super::{FetchError, Post, User, UserSource};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://dummyjson.com";

pub struct DummyJsonClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct UsersResponse {
    users: Vec<User>,
}

#[derive(Debug, Deserialize)]
struct PostsResponse {
    posts: Vec<Post>,
}

impl DummyJsonClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("userfeed/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Response {
                status: response.status(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl UserSource for DummyJsonClient {
    async fn fetch_users(&self) -> Result<Vec<User>, FetchError> {
        let envelope: UsersResponse = self.get_json("/users").await?;
        Ok(envelope.users)
    }

    async fn fetch_posts(&self, user_id: u64) -> Result<Vec<Post>, FetchError> {
        let envelope: PostsResponse = self
            .get_json(&format!("/users/{}/posts", user_id))
            .await?;
        Ok(envelope.posts)
    }
}
