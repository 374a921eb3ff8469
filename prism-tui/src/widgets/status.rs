//! Stat card widget.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub struct StatusIndicator {
    pub title: String,
    pub value: String,
    pub style: Style,
}

impl StatusIndicator {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let paragraph = Paragraph::new(self.value.clone())
            .style(self.style.add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .title(self.title.as_str())
                    .borders(Borders::ALL)
                    .border_style(self.style),
            );
        f.render_widget(paragraph, area);
    }
}
