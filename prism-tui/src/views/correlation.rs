//! Correlation graph view.

use crate::state::App;
use crate::theme::strength_tier_color;
use crate::views::{body_state, panel_title, two_column, BodyState};
use crate::widgets::filter::type_options;
use crate::widgets::{DetailPanel, FilterBar, GraphCanvas, Skeleton, StatusIndicator};
use prism_core::identity::short_id;
use prism_core::StrengthTier;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    render_stat_cards(f, app, chunks[0]);
    render_filter_bar(f, app, chunks[1]);

    let view = &app.correlation_view;
    if body_state(view.is_loading(), !view.correlations.records().is_empty())
        == BodyState::Skeleton
    {
        Skeleton {
            title: "Correlation Graph",
            style: Style::default().fg(app.theme.text_muted),
        }
        .render(f, chunks[2]);
        return;
    }

    let (graph_area, side_area) = two_column(chunks[2], 60);
    render_graph(f, app, graph_area);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(side_area);
    render_list(f, app, side[0]);
    render_detail_panel(f, app, side[1]);
}

fn render_stat_cards(f: &mut Frame<'_>, app: &App, area: Rect) {
    let stats = app.correlation_view.stats();
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    let entries = [
        ("Total", stats.total, Style::default().fg(app.theme.primary)),
        (
            "Strong > 0.7",
            stats.strong,
            tier_style(StrengthTier::Strong, app),
        ),
        (
            "Medium 0.5-0.7",
            stats.medium,
            tier_style(StrengthTier::Medium, app),
        ),
        ("Weak <= 0.5", stats.weak, tier_style(StrengthTier::Weak, app)),
    ];
    for ((title, value, style), card_area) in entries.into_iter().zip(cards.iter()) {
        StatusIndicator {
            title: title.to_string(),
            value: value.to_string(),
            style,
        }
        .render(f, *card_area);
    }
}

fn tier_style(tier: StrengthTier, app: &App) -> Style {
    Style::default().fg(strength_tier_color(tier, &app.theme))
}

fn render_filter_bar(f: &mut Frame<'_>, app: &App, area: Rect) {
    let view = &app.correlation_view;
    let options = type_options(&view.types, &view.filter.correlation_type);
    FilterBar {
        title: "Filter [t type, +/- strength]",
        filters: &options,
        min_strength: Some(view.filter.min_strength),
        active_style: Style::default().fg(app.theme.primary),
        inactive_style: Style::default().fg(app.theme.text_dim),
    }
    .render(f, area);
}

fn render_graph(f: &mut Frame<'_>, app: &App, area: Rect) {
    let view = &app.correlation_view;
    if view.graph.is_empty() {
        let message = Paragraph::new("No correlations match the current filter")
            .style(Style::default().fg(app.theme.text_dim))
            .block(
                Block::default()
                    .title("Correlation Graph")
                    .borders(Borders::ALL),
            );
        f.render_widget(message, area);
        return;
    }

    let title = format!(
        "Correlation Graph ({} agents, {} edges)",
        view.graph.nodes.len(),
        view.graph.edges.len()
    );
    GraphCanvas {
        title: &title,
        graph: &view.graph,
        radius: view.layout.radius,
        selected: view.selected,
        tick: app.tick,
        theme: &app.theme,
    }
    .render(f, area);
}

fn render_list(f: &mut Frame<'_>, app: &App, area: Rect) {
    let view = &app.correlation_view;
    let filtered = view.filtered();

    let items: Vec<ListItem> = filtered
        .iter()
        .map(|record| {
            let tier = StrengthTier::classify(record.strength);
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:.2} ", record.strength), tier_style(tier, app)),
                Span::raw(format!(
                    "{} -> {} [{}]",
                    view.agent_name(&record.source_agent_id),
                    view.agent_name(&record.target_agent_id),
                    record.correlation_type
                )),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    if let Some(selected) = view.selected {
        state.select(filtered.iter().position(|r| r.id == selected));
    }

    let list = List::new(items)
        .block(
            Block::default()
                .title(panel_title(
                    &format!("Correlations ({})", filtered.len()),
                    body_state(view.is_loading(), !view.correlations.records().is_empty()),
                ))
                .borders(Borders::ALL),
        )
        .highlight_style(Style::default().fg(app.theme.primary).bg(app.theme.bg_highlight));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_detail_panel(f: &mut Frame<'_>, app: &App, area: Rect) {
    let view = &app.correlation_view;
    let mut fields = Vec::new();
    if let Some(record) = view.selected_record() {
        fields.push(("ID", short_id(&record.id)));
        fields.push(("Source", view.agent_name(&record.source_agent_id)));
        fields.push(("Target", view.agent_name(&record.target_agent_id)));
        fields.push(("Type", record.correlation_type.clone()));
        fields.push((
            "Strength",
            format!(
                "{:.3} ({})",
                record.strength,
                StrengthTier::classify(record.strength).label()
            ),
        ));
        fields.push(("Discovered", record.discovered_at.to_rfc3339()));
        if !record.metadata.is_null() {
            fields.push(("Metadata", record.metadata.to_string()));
        }
    }

    DetailPanel {
        title: "Details",
        fields,
        style: Style::default().fg(app.theme.secondary),
        placeholder: "Select a correlation with j/k",
        placeholder_style: Style::default().fg(app.theme.text_dim),
    }
    .render(f, area);
}
