//! Common view layout helpers.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Left list area and right detail area.
pub fn two_column(area: Rect, left_percent: u16) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(left_percent),
            Constraint::Percentage(100 - left_percent),
        ])
        .split(area);
    (chunks[0], chunks[1])
}

/// Rectangle of the given percentage size centred in `area`.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// What a view body shows for its snapshot state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyState {
    /// First load, nothing to show yet.
    Skeleton,
    /// Refresh in flight; previous records stay on screen.
    Refreshing,
    Ready,
}

pub fn body_state(loading: bool, has_records: bool) -> BodyState {
    match (loading, has_records) {
        (true, false) => BodyState::Skeleton,
        (true, true) => BodyState::Refreshing,
        (false, _) => BodyState::Ready,
    }
}

/// Panel title, marked while a refresh is in flight.
pub fn panel_title(base: &str, state: BodyState) -> String {
    match state {
        BodyState::Refreshing => format!("{} [refreshing]", base),
        BodyState::Skeleton | BodyState::Ready => base.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skeleton_only_before_first_records() {
        assert_eq!(body_state(true, false), BodyState::Skeleton);
        assert_eq!(body_state(true, true), BodyState::Refreshing);
        assert_eq!(body_state(false, false), BodyState::Ready);
        assert_eq!(body_state(false, true), BodyState::Ready);
    }

    #[test]
    fn test_refresh_marks_title() {
        assert_eq!(
            panel_title("Agents (3)", BodyState::Refreshing),
            "Agents (3) [refreshing]"
        );
        assert_eq!(panel_title("Agents (3)", BodyState::Ready), "Agents (3)");
    }
}
