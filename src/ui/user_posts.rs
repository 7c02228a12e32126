use super::render_message;
use crate::api::Post;
use crate::loader::{LoadState, UserPostLoader};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

pub fn render(frame: &mut Frame, area: Rect, loader: &UserPostLoader, list_state: &ListState) {
    let [identity_area, posts_area] =
        Layout::vertical([Constraint::Length(2), Constraint::Min(0)]).areas(area);

    let user = loader.user();
    let identity = Line::from(vec![
        Span::styled(
            format!(" {}", user.full_name()),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" (#{})", user.id), Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(identity), identity_area);

    let block = Block::default()
        .title(format!(
            " {} of {} ",
            loader.visible().len(),
            loader.total()
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    match loader.state() {
        LoadState::Idle | LoadState::Loading => {
            render_message(frame, posts_area, block, "Loading posts...", Color::Gray);
        }
        LoadState::Failed(message) => {
            render_message(frame, posts_area, block, message, Color::Red);
        }
        LoadState::Refreshing if loader.total() == 0 => {
            render_message(frame, posts_area, block, "Refreshing posts...", Color::Gray);
        }
        LoadState::Loaded | LoadState::LoadingMore | LoadState::Refreshing => {
            if loader.is_empty_result() {
                render_message(
                    frame,
                    posts_area,
                    block,
                    "There are no posts to show",
                    Color::Gray,
                );
                return;
            }

            let width = usize::from(block.inner(posts_area).width.saturating_sub(4)).max(10);
            let items: Vec<ListItem> = loader
                .visible()
                .iter()
                .map(|post| post_item(post, width))
                .collect();
            let list = List::new(items).block(block).highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            );
            let mut state = list_state.clone();
            frame.render_stateful_widget(list, posts_area, &mut state);
        }
    }
}

fn post_item(post: &Post, width: usize) -> ListItem<'_> {
    let mut lines = vec![Line::from(Span::styled(
        post.title.as_str(),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    ))];

    for chunk in textwrap::wrap(&post.body, width) {
        lines.push(Line::from(Span::raw(chunk.into_owned())));
    }

    if !post.tags.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("#{}", post.tags.join(", ")),
            Style::default().fg(Color::Cyan),
        )));
    }

    lines.push(Line::from(vec![
        Span::styled(
            format!("+{} ", post.reactions.likes),
            Style::default().fg(Color::Green),
        ),
        Span::styled(
            format!("-{} ", post.reactions.dislikes),
            Style::default().fg(Color::Red),
        ),
        Span::styled(
            format!("{} views", post.views),
            Style::default().fg(Color::DarkGray),
        ),
    ]));
    lines.push(Line::from(""));

    ListItem::new(lines)
}
