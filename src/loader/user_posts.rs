use super::{LoadState, LoaderMessage, LoaderSender, RevealCursor};
use crate::api::{Post, UserSource, UserSummary};
use crate::config::PostsConfig;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Fetches one user's posts, with pull-to-refresh and incremental reveal.
///
/// Constructing the loader issues the initial fetch. Dropping it aborts any
/// fetch still in flight, and messages tagged with another `session` are
/// ignored, so a replaced loader never observes a late result.
pub struct UserPostLoader {
    session: u64,
    user: UserSummary,
    source: Arc<dyn UserSource>,
    tx: LoaderSender,
    posts: Vec<Post>,
    cursor: RevealCursor,
    state: LoadState,
    epoch: u64,
    fetch_task: Option<JoinHandle<()>>,
}

impl UserPostLoader {
    pub fn new(
        session: u64,
        user: UserSummary,
        config: &PostsConfig,
        source: Arc<dyn UserSource>,
        tx: LoaderSender,
    ) -> Self {
        let mut loader = Self {
            session,
            user,
            source,
            tx,
            posts: Vec::new(),
            cursor: RevealCursor::new(config.page_size),
            state: LoadState::Idle,
            epoch: 0,
            fetch_task: None,
        };
        loader.load();
        loader
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn user(&self) -> &UserSummary {
        &self.user
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn cursor(&self) -> RevealCursor {
        self.cursor
    }

    pub fn total(&self) -> usize {
        self.posts.len()
    }

    pub fn visible(&self) -> &[Post] {
        &self.posts[..self.cursor.visible()]
    }

    pub fn has_more(&self) -> bool {
        self.cursor.has_more(self.posts.len())
    }

    /// Loaded successfully with nothing to show. Distinct from `Failed`.
    pub fn is_empty_result(&self) -> bool {
        self.state == LoadState::Loaded && self.posts.is_empty()
    }

    pub fn load(&mut self) {
        self.state = LoadState::Loading;
        self.start_fetch();
    }

    /// Re-fetch for the same user. A fetch still in flight is superseded.
    pub fn refresh(&mut self) {
        self.state = LoadState::Refreshing;
        self.start_fetch();
    }

    pub fn load_more(&mut self) {
        if self.state != LoadState::Loaded || !self.has_more() {
            return;
        }
        self.cursor.advance(self.posts.len());
    }

    fn start_fetch(&mut self) {
        self.epoch += 1;
        if let Some(task) = self.fetch_task.take() {
            task.abort();
        }

        let session = self.session;
        let epoch = self.epoch;
        let user_id = self.user.id;
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        log::debug!(
            "fetching posts for user {} (session {}, epoch {})",
            user_id,
            session,
            epoch
        );
        self.fetch_task = Some(tokio::spawn(async move {
            let result = source.fetch_posts(user_id).await;
            let _ = tx.send(LoaderMessage::Posts {
                session,
                epoch,
                result,
            });
        }));
    }

    pub fn apply(&mut self, message: LoaderMessage) -> bool {
        let LoaderMessage::Posts {
            session,
            epoch,
            result,
        } = message
        else {
            return false;
        };

        if session != self.session || epoch != self.epoch {
            log::debug!(
                "dropping stale posts (session {}, epoch {}) for session {}",
                session,
                epoch,
                self.session
            );
            return false;
        }

        self.fetch_task = None;
        match result {
            Ok(posts) => {
                log::info!("fetched {} posts for user {}", posts.len(), self.user.id);
                self.posts = posts;
                self.cursor.reset(self.posts.len());
                self.state = LoadState::Loaded;
            }
            Err(e) => {
                log::warn!("post fetch for user {} failed: {}", self.user.id, e);
                self.posts.clear();
                self.cursor.clear();
                self.state = LoadState::Failed(format!("Error fetching posts: {}", e));
            }
        }
        true
    }
}

impl Drop for UserPostLoader {
    fn drop(&mut self) {
        if let Some(task) = self.fetch_task.take() {
            task.abort();
        }
    }
}
