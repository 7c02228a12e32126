pub mod user_list;
pub mod user_posts;

use crate::app::{App, Screen};
use crate::loader::LoadState;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const HEADER_BG: Color = Color::Rgb(0x51, 0x5a, 0xdc);

pub fn render(frame: &mut Frame, app: &App) {
    let [header, body, help] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    match app.screen() {
        Screen::UserList => {
            render_header(frame, header, "User List");
            user_list::render(frame, body, app.users(), app.user_list_state());
            render_help(
                frame,
                help,
                &[("j/k", "move"), ("enter", "posts"), ("r", "reload"), ("q", "quit")],
            );
        }
        Screen::UserPosts => {
            let title = match app.posts().map(|posts| posts.state()) {
                Some(LoadState::Refreshing) => "User Posts (refreshing...)",
                _ => "User Posts",
            };
            render_header(frame, header, title);
            if let Some(posts) = app.posts() {
                user_posts::render(frame, body, posts, app.post_list_state());
            }
            render_help(
                frame,
                help,
                &[
                    ("j/k", "move"),
                    ("r", "refresh"),
                    ("o", "open image"),
                    ("esc/h", "back"),
                    ("q", "quit"),
                ],
            );
        }
    }
}

fn render_header(frame: &mut Frame, area: Rect, title: &str) {
    let header = Paragraph::new(Line::from(Span::styled(
        title,
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::BOTTOM))
    .style(Style::default().bg(HEADER_BG));
    frame.render_widget(header, area);
}

fn render_help(frame: &mut Frame, area: Rect, keys: &[(&str, &str)]) {
    let mut spans = Vec::with_capacity(keys.len() * 2);
    for (key, action) in keys {
        spans.push(Span::styled(
            format!(" {} ", key),
            Style::default().fg(Color::Yellow),
        ));
        spans.push(Span::styled(
            format!("{} ", action),
            Style::default().fg(Color::DarkGray),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// A bordered single message in place of a list.
pub(crate) fn render_message(frame: &mut Frame, area: Rect, block: Block, text: &str, color: Color) {
    let paragraph = Paragraph::new(Span::styled(text, Style::default().fg(color)))
        .wrap(ratatui::widgets::Wrap { trim: true })
        .block(block);
    frame.render_widget(paragraph, area);
}

/// Empty or whitespace fields render as `N/A`.
pub(crate) fn or_na(value: &str) -> &str {
    if value.trim().is_empty() {
        "N/A"
    } else {
        value
    }
}
