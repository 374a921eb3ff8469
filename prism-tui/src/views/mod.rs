//! View rendering dispatch.

pub mod agent;
pub mod correlation;
pub mod entity;
pub mod helpers;

pub use helpers::{body_state, centered_rect, panel_title, two_column, BodyState};

use crate::nav::View;
use crate::state::App;
use crate::theme::{load_state_color, notification_color};
use prism_core::LoadState;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{block::Title, Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};

const HELP_TEXT: &str = "Tab/1-3 switch view • j/k move • r refresh • t type filter • +/- min strength • ? help • q quit";

const KEY_HELP: &[(&str, &str)] = &[
    ("Tab / BackTab", "next / previous view"),
    ("1 2 3", "jump to view"),
    ("j k / arrows", "move selection"),
    ("r / Ctrl-R", "refresh active view"),
    ("t", "cycle type filter"),
    ("+ / -", "raise / lower minimum strength"),
    ("Esc", "close this dialog"),
    ("q / Ctrl-C", "quit"),
];

pub fn render_view(f: &mut Frame<'_>, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    render_header(f, app, layout[0]);

    match app.active_view {
        View::Correlations => correlation::render(f, app, layout[1]),
        View::Entities => entity::render(f, app, layout[1]),
        View::Agents => agent::render(f, app, layout[1]),
    }

    render_footer(f, app, layout[2]);

    if app.modal.is_some() {
        render_help_modal(f, app);
    }
}

fn render_header(f: &mut Frame<'_>, app: &App, area: Rect) {
    let state = if app.is_loading() {
        LoadState::Loading
    } else {
        LoadState::Ready
    };
    let titles: Vec<Line> = View::all()
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!("{} {}", i + 1, view.title())))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.active_view.index())
        .style(Style::default().fg(app.theme.text_dim))
        .highlight_style(
            Style::default()
                .fg(app.theme.primary)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(
                    "PRISM",
                    Style::default().fg(app.theme.primary),
                ))
                .title(
                    Title::from(Span::styled(
                        state_label(state),
                        Style::default().fg(load_state_color(state, &app.theme)),
                    ))
                    .alignment(Alignment::Right),
                ),
        );
    f.render_widget(tabs, area);
}

fn state_label(state: LoadState) -> &'static str {
    match state {
        LoadState::Loading => "LOADING",
        LoadState::Ready => "READY",
    }
}

fn render_footer(f: &mut Frame<'_>, app: &App, area: Rect) {
    let (text, style) = match app.latest_notification() {
        Some(note) => (
            format!("{}: {}", note.level.label(), note.message),
            Style::default().fg(notification_color(note.level, &app.theme)),
        ),
        None => (
            HELP_TEXT.to_string(),
            Style::default().fg(app.theme.text_dim),
        ),
    };
    let footer = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .style(style);
    f.render_widget(footer, area);
}

fn render_help_modal(f: &mut Frame<'_>, app: &App) {
    let Some(modal) = &app.modal else {
        return;
    };
    let area = centered_rect(60, 50, f.size());

    let mut lines = vec![Line::from(modal.message.clone()), Line::from("")];
    lines.extend(KEY_HELP.iter().map(|(keys, action)| {
        Line::from(vec![
            Span::styled(format!("{:<16}", keys), Style::default().fg(app.theme.primary)),
            Span::raw(*action),
        ])
    }));

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(modal.title.as_str())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border_focus)),
        );
    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}
