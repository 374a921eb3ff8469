//! Agent directory view.

use crate::state::App;
use crate::views::{body_state, panel_title, two_column, BodyState};
use crate::widgets::{DetailPanel, Skeleton};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let view = &app.agent_view;
    let body = body_state(view.agents.is_loading(), !view.agents.records().is_empty());
    if body == BodyState::Skeleton {
        Skeleton {
            title: "Agents",
            style: Style::default().fg(app.theme.text_muted),
        }
        .render(f, area);
        return;
    }

    let (list_area, detail_area) = two_column(area, 60);
    let agents = view.agents.records();

    let items: Vec<ListItem> = agents
        .iter()
        .map(|agent| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:>8} ", agent.data_count),
                    Style::default().fg(app.theme.tertiary),
                ),
                Span::raw(agent.name.clone()),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    if let Some(selected) = view.selected {
        state.select(agents.iter().position(|a| a.id == selected));
    }

    let list = List::new(items)
        .block(
            Block::default()
                .title(panel_title(
                    &format!("Agents ({}, {} records)", agents.len(), view.total_records()),
                    body,
                ))
                .borders(Borders::ALL),
        )
        .highlight_style(Style::default().fg(app.theme.primary).bg(app.theme.bg_highlight));
    f.render_stateful_widget(list, list_area, &mut state);

    render_detail_panel(f, app, detail_area);
}

fn render_detail_panel(f: &mut Frame<'_>, app: &App, area: Rect) {
    let mut fields = Vec::new();
    if let Some(agent) = app.agent_view.selected_agent() {
        fields.push(("Agent ID", agent.id.to_string()));
        fields.push(("Name", agent.name.clone()));
        fields.push(("Data Records", agent.data_count.to_string()));
    }

    DetailPanel {
        title: "Details",
        fields,
        style: Style::default().fg(app.theme.secondary),
        placeholder: "Select an agent with j/k",
        placeholder_style: Style::default().fg(app.theme.text_dim),
    }
    .render(f, area);
}
