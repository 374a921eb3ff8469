//! Detail panel widget for showing field/value pairs.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub struct DetailPanel<'a> {
    pub title: &'a str,
    pub fields: Vec<(&'a str, String)>,
    pub style: Style,
    /// Shown when nothing is selected.
    pub placeholder: &'a str,
    pub placeholder_style: Style,
}

impl<'a> DetailPanel<'a> {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let lines: Vec<Line> = if self.fields.is_empty() {
            vec![Line::from(Span::styled(
                self.placeholder,
                self.placeholder_style,
            ))]
        } else {
            self.fields
                .iter()
                .map(|(label, value)| {
                    Line::from(vec![
                        Span::styled(format!("{}: ", label), self.style),
                        Span::raw(value.clone()),
                    ])
                })
                .collect()
        };

        let widget = Paragraph::new(Text::from(lines))
            .block(Block::default().title(self.title).borders(Borders::ALL))
            .wrap(Wrap { trim: true });

        f.render_widget(widget, area);
    }
}
