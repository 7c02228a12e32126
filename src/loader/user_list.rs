use super::{LoadState, LoaderMessage, LoaderSender, RevealCursor};
use crate::api::{User, UserSource, UserSummary};
use crate::config::UsersConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Fetches the whole user collection once and reveals it a page at a time.
pub struct UserListLoader {
    source: Arc<dyn UserSource>,
    tx: LoaderSender,
    load_more_delay: Duration,
    users: Vec<User>,
    cursor: RevealCursor,
    state: LoadState,
    epoch: u64,
    fetch_task: Option<JoinHandle<()>>,
    reveal_task: Option<JoinHandle<()>>,
}

impl UserListLoader {
    pub fn new(config: &UsersConfig, source: Arc<dyn UserSource>, tx: LoaderSender) -> Self {
        Self {
            source,
            tx,
            load_more_delay: config.load_more_delay(),
            users: Vec::new(),
            cursor: RevealCursor::new(config.page_size),
            state: LoadState::Idle,
            epoch: 0,
            fetch_task: None,
            reveal_task: None,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn cursor(&self) -> RevealCursor {
        self.cursor
    }

    pub fn total(&self) -> usize {
        self.users.len()
    }

    /// The currently revealed prefix of the collection.
    pub fn visible(&self) -> &[User] {
        &self.users[..self.cursor.visible()]
    }

    pub fn has_more(&self) -> bool {
        self.cursor.has_more(self.users.len())
    }

    /// Start fetching the user collection. Ignored while a fetch is in flight.
    pub fn load(&mut self) {
        if self.state == LoadState::Loading {
            log::debug!("user list load ignored, fetch already in flight");
            return;
        }

        self.epoch += 1;
        if let Some(task) = self.reveal_task.take() {
            task.abort();
        }
        self.state = LoadState::Loading;

        let epoch = self.epoch;
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        log::debug!("fetching users (epoch {})", epoch);
        self.fetch_task = Some(tokio::spawn(async move {
            let result = source.fetch_users().await;
            let _ = tx.send(LoaderMessage::Users { epoch, result });
        }));
    }

    /// Reveal the next page. No-op unless the list is loaded with items left
    /// to show; in particular repeated calls while a reveal is pending are
    /// ignored.
    pub fn load_more(&mut self) {
        if self.state != LoadState::Loaded || !self.has_more() {
            return;
        }

        if self.load_more_delay.is_zero() {
            self.cursor.advance(self.users.len());
            return;
        }

        self.state = LoadState::LoadingMore;
        let epoch = self.epoch;
        let delay = self.load_more_delay;
        let tx = self.tx.clone();
        self.reveal_task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(LoaderMessage::UsersRevealed { epoch });
        }));
    }

    /// Identity payload for the visible row at `index`.
    pub fn select(&self, index: usize) -> Option<UserSummary> {
        self.visible().get(index).map(User::summary)
    }

    /// Apply a message produced by one of this loader's tasks. Returns whether
    /// the message changed the loader.
    pub fn apply(&mut self, message: LoaderMessage) -> bool {
        match message {
            LoaderMessage::Users { epoch, result } => {
                if epoch != self.epoch || self.state != LoadState::Loading {
                    log::debug!("dropping stale user fetch (epoch {})", epoch);
                    return false;
                }
                self.fetch_task = None;
                match result {
                    Ok(users) => {
                        log::info!("fetched {} users", users.len());
                        self.users = users;
                        self.cursor.reset(self.users.len());
                        self.state = LoadState::Loaded;
                    }
                    Err(e) => {
                        log::warn!("user fetch failed: {}", e);
                        self.state = LoadState::Failed(format!("Error fetching users: {}", e));
                    }
                }
                true
            }
            LoaderMessage::UsersRevealed { epoch } => {
                if epoch != self.epoch || self.state != LoadState::LoadingMore {
                    return false;
                }
                self.reveal_task = None;
                self.cursor.advance(self.users.len());
                self.state = LoadState::Loaded;
                true
            }
            LoaderMessage::Posts { .. } => false,
        }
    }
}

impl Drop for UserListLoader {
    fn drop(&mut self) {
        if let Some(task) = self.fetch_task.take() {
            task.abort();
        }
        if let Some(task) = self.reveal_task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::testing::{Reply, StubSource};
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn config(delay_ms: u64) -> UsersConfig {
        UsersConfig {
            page_size: 5,
            load_more_delay_ms: delay_ms,
        }
    }

    fn loader_with(
        source: StubSource,
        delay_ms: u64,
    ) -> (UserListLoader, UnboundedReceiver<LoaderMessage>, Arc<StubSource>) {
        let source = Arc::new(source);
        let (tx, rx) = mpsc::unbounded_channel();
        let loader = UserListLoader::new(&config(delay_ms), source.clone(), tx);
        (loader, rx, source)
    }

    async fn settle(loader: &mut UserListLoader, rx: &mut UnboundedReceiver<LoaderMessage>) {
        let message = rx.recv().await.unwrap();
        assert!(loader.apply(message));
    }

    #[tokio::test]
    async fn test_initial_state_is_idle() {
        let (loader, _rx, source) = loader_with(StubSource::new(), 0);
        assert_eq!(loader.state(), &LoadState::Idle);
        assert!(loader.visible().is_empty());
        assert_eq!(source.user_calls(), 0);
    }

    #[tokio::test]
    async fn test_load_reveals_first_page() {
        let (mut loader, mut rx, source) =
            loader_with(StubSource::new().with_users(Reply::Items(12)), 0);

        loader.load();
        assert_eq!(loader.state(), &LoadState::Loading);
        settle(&mut loader, &mut rx).await;

        assert_eq!(loader.state(), &LoadState::Loaded);
        assert_eq!(loader.visible().len(), 5);
        assert_eq!(loader.total(), 12);
        assert_eq!(source.user_calls(), 1);
    }

    #[tokio::test]
    async fn test_load_small_collection_shows_all() {
        let (mut loader, mut rx, _source) =
            loader_with(StubSource::new().with_users(Reply::Items(3)), 0);
        loader.load();
        settle(&mut loader, &mut rx).await;
        assert_eq!(loader.visible().len(), 3);
        assert!(!loader.has_more());
    }

    #[tokio::test]
    async fn test_twelve_users_paged_by_five() {
        let (mut loader, mut rx, _source) =
            loader_with(StubSource::new().with_users(Reply::Items(12)), 1);
        loader.load();
        settle(&mut loader, &mut rx).await;
        assert_eq!(loader.visible().len(), 5);

        loader.load_more();
        assert_eq!(loader.state(), &LoadState::LoadingMore);
        settle(&mut loader, &mut rx).await;
        assert_eq!(loader.visible().len(), 10);

        loader.load_more();
        settle(&mut loader, &mut rx).await;
        assert_eq!(loader.visible().len(), 12);

        loader.load_more();
        assert_eq!(loader.state(), &LoadState::Loaded);
        assert_eq!(loader.visible().len(), 12);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_repeated_load_more_while_pending_advances_once() {
        let (mut loader, mut rx, _source) =
            loader_with(StubSource::new().with_users(Reply::Items(30)), 5);
        loader.load();
        settle(&mut loader, &mut rx).await;

        loader.load_more();
        loader.load_more();
        loader.load_more();
        settle(&mut loader, &mut rx).await;
        assert_eq!(loader.visible().len(), 10);
        assert_eq!(loader.state(), &LoadState::Loaded);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_load_more_without_delay_is_immediate() {
        let (mut loader, mut rx, _source) =
            loader_with(StubSource::new().with_users(Reply::Items(7)), 0);
        loader.load();
        settle(&mut loader, &mut rx).await;

        loader.load_more();
        assert_eq!(loader.state(), &LoadState::Loaded);
        assert_eq!(loader.visible().len(), 7);
    }

    #[tokio::test]
    async fn test_load_more_before_load_is_noop() {
        let (mut loader, mut rx, _source) = loader_with(StubSource::new(), 0);
        loader.load_more();
        assert_eq!(loader.state(), &LoadState::Idle);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_load_ignored_while_in_flight() {
        let (mut loader, mut rx, source) = loader_with(
            StubSource::new().with_users(Reply::ItemsAfter(6, Duration::from_millis(10))),
            0,
        );
        loader.load();
        loader.load();
        settle(&mut loader, &mut rx).await;
        assert_eq!(source.user_calls(), 1);
        assert_eq!(loader.visible().len(), 5);
    }

    #[tokio::test]
    async fn test_failure_sets_failed_state() {
        let (mut loader, mut rx, _source) =
            loader_with(StubSource::new().with_users(Reply::Status(503)), 0);
        loader.load();
        settle(&mut loader, &mut rx).await;

        match loader.state() {
            LoadState::Failed(message) => {
                assert!(message.starts_with("Error fetching users"));
                assert!(message.contains("503"));
            }
            other => panic!("unexpected state: {other:?}"),
        }
        assert!(loader.visible().is_empty());
    }

    #[tokio::test]
    async fn test_failed_retry_keeps_revealed_users() {
        let (mut loader, mut rx, _source) = loader_with(
            StubSource::new()
                .with_users(Reply::Items(12))
                .with_users(Reply::Status(500)),
            0,
        );
        loader.load();
        settle(&mut loader, &mut rx).await;
        loader.load_more();
        assert_eq!(loader.visible().len(), 10);

        loader.load();
        settle(&mut loader, &mut rx).await;
        assert!(matches!(loader.state(), LoadState::Failed(_)));
        assert_eq!(loader.visible().len(), 10);
    }

    #[tokio::test]
    async fn test_retry_after_failure_loads() {
        let (mut loader, mut rx, source) = loader_with(
            StubSource::new()
                .with_users(Reply::Status(500))
                .with_users(Reply::Items(4)),
            0,
        );
        loader.load();
        settle(&mut loader, &mut rx).await;
        loader.load();
        settle(&mut loader, &mut rx).await;
        assert_eq!(loader.state(), &LoadState::Loaded);
        assert_eq!(loader.visible().len(), 4);
        assert_eq!(source.user_calls(), 2);
    }

    #[tokio::test]
    async fn test_stale_messages_are_dropped() {
        let (mut loader, mut rx, _source) =
            loader_with(StubSource::new().with_users(Reply::Items(8)), 0);
        loader.load();
        settle(&mut loader, &mut rx).await;

        assert!(!loader.apply(LoaderMessage::Users {
            epoch: 0,
            result: Ok(Vec::new()),
        }));
        assert!(!loader.apply(LoaderMessage::UsersRevealed { epoch: 1 }));
        assert_eq!(loader.visible().len(), 5);
    }

    #[tokio::test]
    async fn test_select_yields_identity_payload() {
        let (mut loader, mut rx, _source) =
            loader_with(StubSource::new().with_users(Reply::Items(6)), 0);
        loader.load();
        settle(&mut loader, &mut rx).await;

        let summary = loader.select(2).unwrap();
        assert_eq!(summary.id, 3);
        assert_eq!(summary.first_name, "First3");
        assert_eq!(summary.last_name, "Last3");
        assert_eq!(summary.image, "https://dummyjson.com/icon/3/128");

        // Row 5 exists in the collection but is not revealed yet.
        assert!(loader.select(5).is_none());
    }
}
