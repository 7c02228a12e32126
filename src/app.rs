use crate::api::UserSource;
use crate::config::Config;
use crate::loader::{LoaderMessage, LoaderSender, UserListLoader, UserPostLoader};
use crate::ui;
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::widgets::ListState;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};

const INPUT_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    UserList,
    UserPosts,
}

pub struct App {
    config: Config,
    source: Arc<dyn UserSource>,
    tx: LoaderSender,
    rx: UnboundedReceiver<LoaderMessage>,
    users: UserListLoader,
    posts: Option<UserPostLoader>,
    user_list_state: ListState,
    post_list_state: ListState,
    next_session: u64,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config, source: Arc<dyn UserSource>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let users = UserListLoader::new(&config.users, Arc::clone(&source), tx.clone());

        let mut user_list_state = ListState::default();
        user_list_state.select(Some(0));

        Self {
            config,
            source,
            tx,
            rx,
            users,
            posts: None,
            user_list_state,
            post_list_state: ListState::default(),
            next_session: 1,
            should_quit: false,
        }
    }

    pub fn screen(&self) -> Screen {
        if self.posts.is_some() {
            Screen::UserPosts
        } else {
            Screen::UserList
        }
    }

    pub fn users(&self) -> &UserListLoader {
        &self.users
    }

    pub fn posts(&self) -> Option<&UserPostLoader> {
        self.posts.as_ref()
    }

    pub fn user_list_state(&self) -> &ListState {
        &self.user_list_state
    }

    pub fn post_list_state(&self) -> &ListState {
        &self.post_list_state
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Drive the interactive UI until the user quits. Must be called from
    /// within a tokio runtime; fetches are spawned onto it.
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = ratatui::init();
        let result = self.event_loop(&mut terminal);
        ratatui::restore();
        result
    }

    /// Kick off the initial user fetch.
    pub fn start(&mut self) {
        self.users.load();
    }

    fn event_loop(&mut self, terminal: &mut ratatui::DefaultTerminal) -> Result<()> {
        self.start();

        while !self.should_quit {
            while let Ok(message) = self.rx.try_recv() {
                self.handle_message(message);
            }

            terminal
                .draw(|frame| ui::render(frame, self))
                .context("Failed to draw frame")?;

            if event::poll(INPUT_POLL)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }
        }

        Ok(())
    }

    #[cfg(test)]
    pub(crate) async fn pump(&mut self) {
        let message = self.rx.recv().await.unwrap();
        self.handle_message(message);
    }

    pub fn handle_message(&mut self, message: LoaderMessage) {
        let applied = match message {
            LoaderMessage::Posts { .. } => match self.posts.as_mut() {
                Some(posts) => posts.apply(message),
                None => false,
            },
            _ => self.users.apply(message),
        };

        // A reload or refresh shrinks the visible rows back to the first page.
        if applied {
            clamp_selection(&mut self.user_list_state, self.users.visible().len());
            if let Some(posts) = self.posts.as_ref() {
                clamp_selection(&mut self.post_list_state, posts.visible().len());
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        if key.code == KeyCode::Char('q') {
            self.should_quit = true;
            return;
        }

        match self.screen() {
            Screen::UserList => self.handle_user_list_key(key.code),
            Screen::UserPosts => self.handle_user_posts_key(key.code),
        }
    }

    fn handle_user_list_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Down | KeyCode::Char('j') => self.scroll_users_down(),
            KeyCode::Up | KeyCode::Char('k') => scroll_up(&mut self.user_list_state),
            KeyCode::Enter => self.open_selected_user(),
            KeyCode::Char('r') => self.users.load(),
            _ => {}
        }
    }

    fn handle_user_posts_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Down | KeyCode::Char('j') => self.scroll_posts_down(),
            KeyCode::Up | KeyCode::Char('k') => scroll_up(&mut self.post_list_state),
            KeyCode::Char('r') => {
                if let Some(posts) = self.posts.as_mut() {
                    posts.refresh();
                }
            }
            KeyCode::Char('o') => self.open_user_image(),
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('h') => self.close_posts(),
            _ => {}
        }
    }

    fn scroll_users_down(&mut self) {
        let len = self.users.visible().len();
        if scroll_down(&mut self.user_list_state, len) {
            self.users.load_more();
        }
    }

    fn scroll_posts_down(&mut self) {
        if let Some(posts) = self.posts.as_mut() {
            let len = posts.visible().len();
            if scroll_down(&mut self.post_list_state, len) {
                posts.load_more();
            }
        }
    }

    fn open_selected_user(&mut self) {
        let Some(summary) = self
            .user_list_state
            .selected()
            .and_then(|idx| self.users.select(idx))
        else {
            return;
        };

        log::info!("opening posts for user {}", summary.id);
        let session = self.next_session;
        self.next_session += 1;
        self.post_list_state = ListState::default();
        self.posts = Some(UserPostLoader::new(
            session,
            summary,
            &self.config.posts,
            Arc::clone(&self.source),
            self.tx.clone(),
        ));
    }

    fn close_posts(&mut self) {
        self.posts = None;
        self.post_list_state = ListState::default();
    }

    fn open_user_image(&self) {
        let Some(posts) = self.posts.as_ref() else {
            return;
        };
        let url = &posts.user().image;
        if url.is_empty() {
            return;
        }
        if let Err(e) = open::that(url) {
            log::warn!("failed to open {}: {}", url, e);
        }
    }
}

/// Move the selection down. Returns true when the selection sits on the last
/// row afterwards, which is the signal to reveal more.
fn scroll_down(state: &mut ListState, len: usize) -> bool {
    if len == 0 {
        return false;
    }
    let next = match state.selected() {
        Some(selected) if selected + 1 < len => selected + 1,
        Some(selected) => selected,
        None => 0,
    };
    state.select(Some(next));
    next + 1 >= len
}

/// Keep the selection on a visible row, or clear it when there is none.
fn clamp_selection(state: &mut ListState, len: usize) {
    if len == 0 {
        state.select(None);
    } else {
        let selected = state.selected().unwrap_or(0);
        state.select(Some(selected.min(len - 1)));
    }
}

fn scroll_up(state: &mut ListState) {
    if let Some(selected) = state.selected() {
        if selected > 0 {
            state.select(Some(selected - 1));
        }
    }
}
