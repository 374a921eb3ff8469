//! Placeholder shown while a view has no data yet.

use ratatui::{
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub struct Skeleton<'a> {
    pub title: &'a str,
    pub style: Style,
}

impl<'a> Skeleton<'a> {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let inner_width = area.width.saturating_sub(2) as usize;
        let rows = area.height.saturating_sub(2) as usize;
        let lines: Vec<Line> = (0..rows)
            .map(|row| Line::styled(placeholder_row(row, inner_width), self.style))
            .collect();

        let paragraph = Paragraph::new(lines)
            .block(Block::default().title(self.title).borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }
}

/// Shaded bar for `row`; every third row is blank, the others alternate
/// between full and two-thirds width.
fn placeholder_row(row: usize, width: usize) -> String {
    let len = match row % 3 {
        0 => width,
        1 => width * 2 / 3,
        _ => 0,
    };
    "░".repeat(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_rows_vary() {
        assert_eq!(placeholder_row(0, 9).chars().count(), 9);
        assert_eq!(placeholder_row(1, 9).chars().count(), 6);
        assert!(placeholder_row(2, 9).is_empty());
    }
}
