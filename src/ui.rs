//! Terminal UI rendering.
//!
//! Drawing only reads the region models kept in [`Views`]; it never looks
//! at the application state directly.  The models are rebuilt by the render
//! routines when their state path changes, this module just lays them out.
//!
//! ## For contributors
//!
//! * Layout, top to bottom: header, URL form, feedback line, then posts
//!   (left) and feeds (right), and a one-line status bar.
//! * The preview is drawn last, as a centred overlay.
//! * Colours and styles are defined inline.

use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Focus};
use crate::view::{FeedbackKind, ModalView, Views};

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [header_area, form_area, feedback_area, main_area, status_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let [posts_area, feeds_area] =
        Layout::horizontal([Constraint::Percentage(65), Constraint::Percentage(35)])
            .areas(main_area);

    draw_header(app.store.renderer(), frame, header_area);
    draw_form(app, frame, form_area);
    draw_feedback(app.store.renderer(), frame, feedback_area);
    draw_posts(app, frame, posts_area);
    draw_feeds(app.store.renderer(), frame, feeds_area);
    draw_status_bar(app, frame, status_area);

    if let Some(modal) = &app.store.renderer().modal {
        draw_modal(app.store.renderer(), modal, frame);
    }
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn draw_header(views: &Views, frame: &mut Frame, area: Rect) {
    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            views.t("app.title"),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            views.t("app.lead"),
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    frame.render_widget(header, area);
}

/// Render the URL input with the add button in its title.
fn draw_form(app: &App, frame: &mut Frame, area: Rect) {
    let views = app.store.renderer();
    let form = &views.form;

    let border = if form.invalid {
        Style::default().fg(Color::Red)
    } else {
        focus_style(app.focus == Focus::Form)
    };
    let button_style = if views.add_button.disabled {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    };

    let input = if form.input.is_empty() {
        Span::styled(views.t("form.example"), Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(form.input.as_str())
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(format!(" {} ", views.t("form.label")))
        .title(
            Line::from(Span::styled(
                format!(" [{}] ", views.add_button.label),
                button_style,
            ))
            .right_aligned(),
        );

    frame.render_widget(Paragraph::new(Line::from(input)).block(block), area);
}

fn draw_feedback(views: &Views, frame: &mut Frame, area: Rect) {
    let Some(feedback) = &views.form.feedback else {
        return;
    };
    let colour = match feedback.kind {
        FeedbackKind::Success => Color::Green,
        FeedbackKind::Danger => Color::Red,
    };
    let line = Paragraph::new(Span::styled(
        format!(" {}", feedback.text),
        Style::default().fg(colour),
    ));
    frame.render_widget(line, area);
}

/// Render the posts list, newest first.  Unread posts are bold.
fn draw_posts(app: &mut App, frame: &mut Frame, area: Rect) {
    let views = app.store.renderer();
    let title = format!(" {} ", views.t("posts.title"));
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(focus_style(app.focus == Focus::Posts));

    if views.posts.is_empty() {
        let empty = Paragraph::new(Span::styled(
            views.t("posts.empty"),
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let list_items: Vec<ListItem> = views
        .posts
        .iter()
        .map(|post| {
            let date_str = post
                .published
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();

            let title_style = if post.viewed {
                Style::default().fg(Color::Gray)
            } else {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            };

            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<17}", date_str),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(" "),
                Span::styled(post.title.as_str(), title_style),
            ]))
        })
        .collect();

    let list = List::new(list_items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn draw_feeds(views: &Views, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(format!(" {} ", views.t("feeds.title")))
        .borders(Borders::ALL);

    let lines: Vec<Line> = if views.feeds.is_empty() {
        vec![Line::from(Span::styled(
            views.t("feeds.empty"),
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        views
            .feeds
            .iter()
            .flat_map(|feed| {
                [
                    Line::from(Span::styled(
                        feed.title.as_str(),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        feed.description.as_str(),
                        Style::default().fg(Color::DarkGray),
                    )),
                ]
            })
            .collect()
    };

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let views = app.store.renderer();
    let help = match app.focus {
        Focus::Form => views.t("status.help_form"),
        Focus::Posts => views.t("status.help_posts"),
    };
    let status = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(
            format!("{} / {}", views.feeds.len(), views.posts.len()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  "),
        Span::styled(help, Style::default().fg(Color::Yellow)),
    ]));
    frame.render_widget(status, area);
}

/// Centre a `width` x `height` percentage box inside `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [area] = Layout::vertical([Constraint::Percentage(height)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Percentage(width)])
        .flex(Flex::Center)
        .areas(area);
    area
}

fn draw_modal(views: &Views, modal: &ModalView, frame: &mut Frame) {
    let area = centered(frame.area(), 70, 60);

    let mut lines = vec![
        Line::from(Span::styled(
            modal.feed_title.as_str(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::default(),
        Line::from(modal.body.as_str()),
        Line::default(),
    ];
    if let Some(link) = &modal.link {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{}: ", views.t("modal.read")),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(link.as_str(), Style::default().fg(Color::Cyan)),
        ]));
    }

    let block = Block::default()
        .title(format!(" {} ", modal.title))
        .title_bottom(Line::from(format!(" {} ", views.t("modal.close"))).right_aligned())
        .borders(Borders::ALL);

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}
