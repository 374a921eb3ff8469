//! Correlation graph drawn on a braille canvas.

use crate::theme::{pulse_color, strength_tier_color, SynthBruteTheme};
use prism_core::{CorrelationGraph, GraphEdge, GraphNode};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::Span,
    widgets::{
        canvas::{Canvas, Circle, Context, Line},
        Block, Borders,
    },
    Frame,
};
use uuid::Uuid;

/// Canvas extent relative to the layout radius, leaving room for labels.
const BOUNDS_MARGIN: f64 = 1.3;
/// Spacing between the parallel strokes of a wide edge, relative to radius.
const STROKE_SPACING: f64 = 0.012;
const NODE_RADIUS: f64 = 0.04;
/// Upper bound on parallel strokes drawn for one edge.
pub const MAX_STROKES: usize = 8;

pub struct GraphCanvas<'a> {
    pub title: &'a str,
    pub graph: &'a CorrelationGraph,
    pub radius: f64,
    pub selected: Option<Uuid>,
    pub tick: u64,
    pub theme: &'a SynthBruteTheme,
}

impl<'a> GraphCanvas<'a> {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let bounds = canvas_bounds(self.radius);
        let canvas = Canvas::default()
            .block(
                Block::default()
                    .title(self.title)
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.border)),
            )
            .marker(Marker::Braille)
            .x_bounds(bounds)
            .y_bounds(bounds)
            .paint(|ctx| {
                for edge in &self.graph.edges {
                    self.draw_edge(ctx, edge);
                }
                ctx.layer();
                for node in &self.graph.nodes {
                    self.draw_node(ctx, node);
                }
            });
        f.render_widget(canvas, area);
    }

    fn edge_color(&self, edge: &GraphEdge) -> Color {
        if self.selected == Some(edge.correlation_id) {
            self.theme.secondary
        } else if edge.animated {
            pulse_color(edge.tier, self.tick, self.theme)
        } else {
            strength_tier_color(edge.tier, self.theme)
        }
    }

    fn draw_edge(&self, ctx: &mut Context<'_>, edge: &GraphEdge) {
        let (Some(source), Some(target)) =
            (self.graph.node(&edge.source), self.graph.node(&edge.target))
        else {
            return;
        };
        let color = self.edge_color(edge);

        if edge.source == edge.target {
            ctx.draw(&Circle {
                x: source.x,
                y: source.y,
                radius: self.radius * NODE_RADIUS * 2.0,
                color,
            });
            return;
        }

        let (dx, dy) = (target.x - source.x, target.y - source.y);
        let length = dx.hypot(dy);
        let (nx, ny) = (-dy / length, dx / length);
        for offset in stroke_offsets(edge.width, self.radius * STROKE_SPACING) {
            ctx.draw(&Line {
                x1: source.x + nx * offset,
                y1: source.y + ny * offset,
                x2: target.x + nx * offset,
                y2: target.y + ny * offset,
                color,
            });
        }
    }

    fn draw_node(&self, ctx: &mut Context<'_>, node: &GraphNode) {
        ctx.draw(&Circle {
            x: node.x,
            y: node.y,
            radius: self.radius * NODE_RADIUS,
            color: self.theme.primary,
        });
        ctx.print(
            node.x,
            node.y,
            Span::styled(node.label.clone(), Style::default().fg(self.theme.text)),
        );
    }
}

pub fn canvas_bounds(radius: f64) -> [f64; 2] {
    [-radius * BOUNDS_MARGIN, radius * BOUNDS_MARGIN]
}

/// Perpendicular offsets of the strokes for an edge of `width`, centred on
/// the straight line between the endpoints. At most `MAX_STROKES`.
pub fn stroke_offsets(width: f64, spacing: f64) -> Vec<f64> {
    let strokes = width.round().max(1.0).min(MAX_STROKES as f64) as usize;
    let centre = (strokes - 1) as f64 / 2.0;
    (0..strokes)
        .map(|i| (i as f64 - centre) * spacing)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_stroke_is_centred() {
        assert_eq!(stroke_offsets(1.0, 2.0), vec![0.0]);
        assert_eq!(stroke_offsets(0.2, 2.0), vec![0.0]);
    }

    #[test]
    fn test_wide_edge_strokes_are_symmetric() {
        let offsets = stroke_offsets(4.6, 1.0);
        assert_eq!(offsets, vec![-2.0, -1.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_stroke_count_is_capped() {
        assert_eq!(stroke_offsets(5e12, 1.0).len(), MAX_STROKES);
        assert_eq!(stroke_offsets(f64::INFINITY, 1.0).len(), MAX_STROKES);
        assert_eq!(stroke_offsets(f64::NAN, 1.0), vec![0.0]);
    }

    #[test]
    fn test_bounds_leave_label_margin() {
        let [min, max] = canvas_bounds(300.0);
        assert!(min < -300.0 && max > 300.0);
        assert_eq!(min, -max);
    }
}
