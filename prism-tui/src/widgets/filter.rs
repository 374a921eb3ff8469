//! Filter bar widget.
//!
//! Renders the active type filter among its options, plus an optional
//! threshold readout.

use prism_core::TypeFilter;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    pub label: String,
    pub active: bool,
}

/// `All` followed by each type, with the current filter marked active.
pub fn type_options(types: &[String], current: &TypeFilter) -> Vec<FilterOption> {
    std::iter::once(FilterOption {
        label: "all".to_string(),
        active: *current == TypeFilter::All,
    })
    .chain(types.iter().map(|t| FilterOption {
        label: t.clone(),
        active: current.matches(t) && *current != TypeFilter::All,
    }))
    .collect()
}

pub struct FilterBar<'a> {
    pub title: &'a str,
    pub filters: &'a [FilterOption],
    pub min_strength: Option<f64>,
    pub active_style: Style,
    pub inactive_style: Style,
}

impl<'a> FilterBar<'a> {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let mut spans: Vec<Span> = self
            .filters
            .iter()
            .map(|filter| {
                let style = if filter.active {
                    self.active_style
                } else {
                    self.inactive_style
                };
                Span::styled(format!(" {} ", filter.label), style)
            })
            .collect();

        if let Some(min) = self.min_strength {
            spans.push(Span::styled(" | ", self.inactive_style));
            spans.push(Span::styled(format!("min strength >= {:.1}", min), self.active_style));
        }

        let paragraph = Paragraph::new(Line::from(spans))
            .block(Block::default().title(self.title).borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_options_marks_only_current() {
        let types = vec!["spatial".to_string(), "temporal".to_string()];
        let options = type_options(&types, &TypeFilter::Only("temporal".to_string()));
        let active: Vec<&str> = options
            .iter()
            .filter(|o| o.active)
            .map(|o| o.label.as_str())
            .collect();
        assert_eq!(active, vec!["temporal"]);
        assert_eq!(options.len(), 3);
    }

    #[test]
    fn test_type_options_all_active_by_default() {
        let options = type_options(&["spatial".to_string()], &TypeFilter::All);
        assert!(options[0].active);
        assert!(!options[1].active);
    }
}
