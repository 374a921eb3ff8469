//! Semantic entity analytics view.

use crate::state::App;
use crate::theme::confidence_color;
use crate::views::{body_state, panel_title, two_column, BodyState};
use crate::widgets::filter::type_options;
use crate::widgets::{DetailPanel, FilterBar, Skeleton};
use prism_core::identity::short_id;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Cell, List, ListItem, ListState, Row, Table},
    Frame,
};

/// Marks types whose running average differs from the true mean.
const DIVERGENCE_MARKER: &str = "*";

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let view = &app.entity_view;
    if body_state(view.entities.is_loading(), !view.entities.records().is_empty())
        == BodyState::Skeleton
    {
        Skeleton {
            title: "Semantic Entities",
            style: Style::default().fg(app.theme.text_muted),
        }
        .render(f, area);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    let (table_area, chart_area) = two_column(rows[0], 50);
    render_aggregate_table(f, app, table_area);
    render_histogram(f, app, chart_area);
    render_filter_bar(f, app, rows[1]);

    let (list_area, detail_area) = two_column(rows[2], 60);
    render_list(f, app, list_area);
    render_detail_panel(f, app, detail_area);
}

fn format_confidence(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.3}", v))
        .unwrap_or_else(|| "-".to_string())
}

fn render_aggregate_table(f: &mut Frame<'_>, app: &App, area: Rect) {
    let header = Row::new(vec!["Type", "Count", "Avg", "Mean", ""]).style(
        Style::default()
            .fg(app.theme.primary)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = app
        .entity_view
        .aggregates
        .iter()
        .map(|(entity_type, aggregate)| {
            let marker = if aggregate.diverges() {
                DIVERGENCE_MARKER
            } else {
                ""
            };
            Row::new(vec![
                Cell::from(entity_type.clone()),
                Cell::from(aggregate.count.to_string()),
                Cell::from(format_confidence(aggregate.avg_confidence)).style(
                    Style::default().fg(confidence_color(aggregate.avg_confidence, &app.theme)),
                ),
                Cell::from(format_confidence(aggregate.mean_confidence())),
                Cell::from(marker).style(Style::default().fg(app.theme.warning)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Percentage(40),
        Constraint::Percentage(15),
        Constraint::Percentage(20),
        Constraint::Percentage(20),
        Constraint::Percentage(5),
    ];
    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(format!(
                "Entity Types ({} {} = avg differs from mean)",
                app.entity_view.aggregates.len(),
                DIVERGENCE_MARKER
            ))
            .borders(Borders::ALL),
    );
    f.render_widget(table, area);
}

fn render_histogram(f: &mut Frame<'_>, app: &App, area: Rect) {
    let labelled = app.entity_view.histogram.labelled();
    let data: Vec<(&str, u64)> = labelled
        .iter()
        .map(|(label, count)| (label.as_str(), *count))
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .title(format!(
                    "Confidence Distribution ({} scored)",
                    app.entity_view.histogram.total()
                ))
                .borders(Borders::ALL),
        )
        .data(data.as_slice())
        .bar_width(7)
        .bar_gap(1)
        .bar_style(Style::default().fg(app.theme.secondary))
        .value_style(Style::default().fg(app.theme.bg).bg(app.theme.secondary))
        .label_style(Style::default().fg(app.theme.text_dim));
    f.render_widget(chart, area);
}

fn render_filter_bar(f: &mut Frame<'_>, app: &App, area: Rect) {
    let view = &app.entity_view;
    let options = type_options(&view.types, &view.filter);
    FilterBar {
        title: "Entity Type [t]",
        filters: &options,
        min_strength: None,
        active_style: Style::default().fg(app.theme.primary),
        inactive_style: Style::default().fg(app.theme.text_dim),
    }
    .render(f, area);
}

fn render_list(f: &mut Frame<'_>, app: &App, area: Rect) {
    let view = &app.entity_view;
    let visible = view.visible();

    let items: Vec<ListItem> = visible
        .iter()
        .map(|entity| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:>6} ", format_confidence(entity.confidence)),
                    Style::default().fg(confidence_color(entity.confidence, &app.theme)),
                ),
                Span::raw(format!("{}: {}", entity.entity_type, entity.entity_value)),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    if let Some(selected) = view.selected {
        state.select(visible.iter().position(|e| e.id == selected));
    }

    let list = List::new(items)
        .block(
            Block::default()
                .title(panel_title(
                    &format!("Entities ({})", visible.len()),
                    body_state(view.entities.is_loading(), !view.entities.records().is_empty()),
                ))
                .borders(Borders::ALL),
        )
        .highlight_style(Style::default().fg(app.theme.primary).bg(app.theme.bg_highlight));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_detail_panel(f: &mut Frame<'_>, app: &App, area: Rect) {
    let mut fields = Vec::new();
    if let Some(entity) = app.entity_view.selected_record() {
        fields.push(("ID", short_id(&entity.id)));
        fields.push(("Type", entity.entity_type.clone()));
        fields.push(("Value", entity.entity_value.clone()));
        fields.push(("Confidence", format_confidence(entity.confidence)));
        if let Some(source_field) = &entity.source_field {
            fields.push(("Source Field", source_field.clone()));
        }
        fields.push(("Data Record", entity.data_id.to_string()));
        fields.push(("Created", entity.created_at.to_rfc3339()));
    }

    DetailPanel {
        title: "Details",
        fields,
        style: Style::default().fg(app.theme.secondary),
        placeholder: "Select an entity with j/k",
        placeholder_style: Style::default().fg(app.theme.text_dim),
    }
    .render(f, area);
}
