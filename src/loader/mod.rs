//! Fetch lifecycle and incremental reveal for the two screens.
//!
//! A loader owns its collection, its [`RevealCursor`] and its [`LoadState`].
//! Network reads run on spawned tasks and report back through a
//! [`LoaderMessage`] channel; the owner feeds each message to `apply`, which
//! drops anything that belongs to a superseded fetch.

pub mod cursor;
pub mod user_list;
pub mod user_posts;

pub use cursor::RevealCursor;
pub use user_list::UserListLoader;
pub use user_posts::UserPostLoader;

use crate::api::{FetchError, Post, User};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    LoadingMore,
    Refreshing,
    Failed(String),
}

impl LoadState {
    /// A fetch or reveal is outstanding.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            LoadState::Loading | LoadState::LoadingMore | LoadState::Refreshing
        )
    }
}

#[derive(Debug)]
pub enum LoaderMessage {
    Users {
        epoch: u64,
        result: Result<Vec<User>, FetchError>,
    },
    UsersRevealed {
        epoch: u64,
    },
    Posts {
        session: u64,
        epoch: u64,
        result: Result<Vec<Post>, FetchError>,
    },
}

pub type LoaderSender = UnboundedSender<LoaderMessage>;

/// Common surface of both loaders, for code that drives them without a UI.
pub trait Loader {
    fn state(&self) -> &LoadState;
    fn apply(&mut self, message: LoaderMessage) -> bool;
}

impl Loader for UserListLoader {
    fn state(&self) -> &LoadState {
        UserListLoader::state(self)
    }

    fn apply(&mut self, message: LoaderMessage) -> bool {
        UserListLoader::apply(self, message)
    }
}

impl Loader for UserPostLoader {
    fn state(&self) -> &LoadState {
        UserPostLoader::state(self)
    }

    fn apply(&mut self, message: LoaderMessage) -> bool {
        UserPostLoader::apply(self, message)
    }
}

/// Apply messages from `rx` until `loader` has nothing pending. Returns false
/// if the channel closed first.
pub async fn settle<L: Loader>(loader: &mut L, rx: &mut UnboundedReceiver<LoaderMessage>) -> bool {
    while loader.state().is_pending() {
        match rx.recv().await {
            Some(message) => {
                loader.apply(message);
            }
            None => return false,
        }
    }
    true
}
