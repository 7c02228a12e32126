use super::{or_na, render_message};
use crate::api::User;
use crate::loader::{LoadState, UserListLoader};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

pub fn render(frame: &mut Frame, area: Rect, loader: &UserListLoader, list_state: &ListState) {
    let block = Block::default()
        .title(format!(
            " {} of {} ",
            loader.visible().len(),
            loader.total()
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let mut error = None;
    let mut footer = None;
    match loader.state() {
        LoadState::Idle | LoadState::Loading => {
            if loader.visible().is_empty() {
                render_message(frame, area, block, "Loading users...", Color::Gray);
                return;
            }
        }
        LoadState::Loaded | LoadState::Refreshing => {}
        LoadState::LoadingMore => footer = Some("Loading more users..."),
        LoadState::Failed(message) => error = Some(message.as_str()),
    }

    if loader.visible().is_empty() {
        match error {
            Some(message) => render_message(frame, area, block, message, Color::Red),
            None => render_message(frame, area, block, "No users to show", Color::Gray),
        }
        return;
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [error_area, list_area, footer_area] = Layout::vertical([
        Constraint::Length(u16::from(error.is_some())),
        Constraint::Min(0),
        Constraint::Length(u16::from(footer.is_some())),
    ])
    .areas(inner);

    if let Some(message) = error {
        frame.render_widget(
            Paragraph::new(Span::styled(message, Style::default().fg(Color::Red))),
            error_area,
        );
    }

    let items: Vec<ListItem> = loader.visible().iter().map(user_item).collect();
    let list = List::new(items).highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    );
    let mut state = list_state.clone();
    frame.render_stateful_widget(list, list_area, &mut state);

    if let Some(text) = footer {
        frame.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(Color::Yellow))),
            footer_area,
        );
    }
}

fn user_item(user: &User) -> ListItem<'_> {
    let mut lines = vec![Line::from(Span::styled(
        user.full_name(),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    ))];

    for (label, value) in [
        ("Email", user.email.as_str()),
        ("Company", user.company.name.as_str()),
        ("Phone", user.phone.as_str()),
        ("City", user.address.city.as_str()),
        ("State", user.address.state.as_str()),
    ] {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<9}", label), Style::default().fg(Color::DarkGray)),
            Span::styled(or_na(value), Style::default().fg(Color::Cyan)),
        ]));
    }
    lines.push(Line::from(""));

    ListItem::new(lines)
}
