//! Network graph rendering on a braille canvas
//!
//! Layout coordinates grow downward like screen space; the canvas grows
//! upward, so every y is flipped on the way in and out.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::canvas::{Canvas, Circle, Line};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

use crate::app::{App, Panel};
use crate::domain::{is_link_active, is_node_active, GraphLayout, Point};
use crate::ui::layout::rect_inner;

/// Room around the circle for node bodies and labels
pub const GRAPH_MARGIN: f64 = 50.0;

const NODE_RADIUS: f64 = 25.0;
const SELECTED_NODE_RADIUS: f64 = 35.0;

/// Maps between terminal cells of the canvas interior and layout space
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub inner: Rect,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl Viewport {
    pub fn new(area: Rect, layout: &GraphLayout<'_>) -> Self {
        let (x_bounds, y_bounds) = layout.bounds(GRAPH_MARGIN);
        Self {
            inner: rect_inner(area),
            x_bounds,
            y_bounds,
        }
    }

    /// Layout y to canvas y
    pub fn flip(&self, y: f64) -> f64 {
        self.y_bounds[0] + self.y_bounds[1] - y
    }

    /// Center of a terminal cell in layout space
    pub fn cell_to_point(&self, col: u16, row: u16) -> Option<Point> {
        let inner = self.inner;
        if inner.width == 0
            || inner.height == 0
            || col < inner.x
            || row < inner.y
            || col >= inner.x + inner.width
            || row >= inner.y + inner.height
        {
            return None;
        }
        let fx = (f64::from(col - inner.x) + 0.5) / f64::from(inner.width);
        let fy = (f64::from(row - inner.y) + 0.5) / f64::from(inner.height);
        Some(Point {
            x: self.x_bounds[0] + fx * (self.x_bounds[1] - self.x_bounds[0]),
            y: self.y_bounds[0] + fy * (self.y_bounds[1] - self.y_bounds[0]),
        })
    }

    /// Layout units covered by one cell, the coarser axis
    pub fn cell_size(&self) -> f64 {
        let w = (self.x_bounds[1] - self.x_bounds[0]) / f64::from(self.inner.width.max(1));
        let h = (self.y_bounds[1] - self.y_bounds[0]) / f64::from(self.inner.height.max(1));
        w.max(h)
    }
}

/// Parallel strokes used to show a link's weight
pub fn stroke_count(weight: f64) -> usize {
    (weight / 5.0).ceil().clamp(1.0, 3.0) as usize
}

/// `0x1a2b3c` -> `0x1a2...`
pub fn node_label(id: &str) -> String {
    let head: String = id.chars().take(5).collect();
    format!("{head}...")
}

pub fn draw_graph(f: &mut Frame, area: Rect, app: &App) {
    let layout = app.graph_layout();
    let viewport = Viewport::new(area, &layout);
    let selected = app.selection.selected_wallet();
    let graph_txs = app.graph_transactions();
    let links = layout.resolve_links(graph_txs.iter().copied());
    let cursor = (app.focus == Panel::Graph)
        .then(|| layout.nodes().get(app.selected_node))
        .flatten()
        .map(|node| node.id.as_str());

    let border_style = if app.focus == Panel::Graph {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let mut title = format!(" Network ({} nodes, {} links) ", layout.len(), links.links.len());
    if !links.invalid.is_empty() {
        title.push_str(&format!("[{} unresolved] ", links.invalid.len()));
    }

    let canvas = Canvas::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(border_style),
        )
        .x_bounds(viewport.x_bounds)
        .y_bounds(viewport.y_bounds)
        .paint(|ctx| {
            // inactive links first so highlighted ones stay on top
            for pass_active in [false, true] {
                for link in &links.links {
                    let active = is_link_active(link, selected);
                    if active != pass_active {
                        continue;
                    }
                    let color = if active {
                        Color::LightCyan
                    } else if link.transaction.is_flagged {
                        Color::Red
                    } else {
                        Color::DarkGray
                    };
                    let (dx, dy) = (link.to.x - link.from.x, link.to.y - link.from.y);
                    let len = (dx * dx + dy * dy).sqrt().max(f64::EPSILON);
                    let (nx, ny) = (-dy / len, dx / len);
                    let strokes = stroke_count(link.weight);
                    for i in 0..strokes {
                        let offset = (i as f64 - (strokes - 1) as f64 / 2.0) * 3.5;
                        ctx.draw(&Line {
                            x1: link.from.x + nx * offset,
                            y1: viewport.flip(link.from.y + ny * offset),
                            x2: link.to.x + nx * offset,
                            y2: viewport.flip(link.to.y + ny * offset),
                            color,
                        });
                    }
                }
            }
            ctx.layer();

            for (node, pos) in layout.positions() {
                let active = is_node_active(node, selected);
                let color = if node.is_critical {
                    Color::LightRed
                } else if active {
                    Color::LightCyan
                } else {
                    Color::Gray
                };
                let radius = if active { SELECTED_NODE_RADIUS } else { NODE_RADIUS };
                ctx.draw(&Circle {
                    x: pos.x,
                    y: viewport.flip(pos.y),
                    radius,
                    color,
                });
                if cursor == Some(node.id.as_str()) {
                    ctx.draw(&Circle {
                        x: pos.x,
                        y: viewport.flip(pos.y),
                        radius: radius + 6.0,
                        color: Color::Yellow,
                    });
                }
            }

            for (node, pos) in layout.positions() {
                let label = node_label(&node.id);
                let half = label.chars().count() as f64 * viewport.cell_size() / 2.0;
                let style = if node.is_critical {
                    Style::default().fg(Color::LightRed)
                } else {
                    Style::default().fg(Color::Gray)
                };
                ctx.print(
                    pos.x - half,
                    viewport.flip(pos.y - NODE_RADIUS - 12.0),
                    TextLine::from(Span::styled(label, style)),
                );
            }
        });

    f.render_widget(canvas, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LayoutConfig, Node, NodeType};

    fn nodes() -> Vec<Node> {
        vec![
            Node::new("A", "a", NodeType::Wallet),
            Node::new("B", "b", NodeType::Wallet),
            Node::new("C", "c", NodeType::Wallet),
            Node::new("D", "d", NodeType::Wallet),
        ]
    }

    #[test]
    fn test_flip_is_involutive() {
        let nodes = nodes();
        let layout = GraphLayout::new(LayoutConfig::default(), &nodes);
        let viewport = Viewport::new(Rect::new(0, 0, 102, 52), &layout);
        assert_eq!(viewport.flip(viewport.flip(123.0)), 123.0);
        assert_eq!(viewport.flip(viewport.y_bounds[0]), viewport.y_bounds[1]);
    }

    #[test]
    fn test_cell_to_point_round_trips_node_positions() {
        let nodes = nodes();
        let layout = GraphLayout::new(LayoutConfig::default(), &nodes);
        let viewport = Viewport::new(Rect::new(0, 0, 102, 52), &layout);
        // node at angle 0 sits at (600, 200), rightmost point of the circle
        let pos = layout.position(0);
        let fx = (pos.x - viewport.x_bounds[0]) / (viewport.x_bounds[1] - viewport.x_bounds[0]);
        let fy = (pos.y - viewport.y_bounds[0]) / (viewport.y_bounds[1] - viewport.y_bounds[0]);
        let col = 1 + (fx * 100.0) as u16;
        let row = 1 + (fy * 50.0) as u16;
        let point = viewport.cell_to_point(col, row).unwrap();
        assert!(point.distance(pos) <= viewport.cell_size());
        assert_eq!(layout.node_at(point, 30.0).map(|n| n.id.as_str()), Some("A"));
    }

    #[test]
    fn test_cell_outside_canvas() {
        let nodes = nodes();
        let layout = GraphLayout::new(LayoutConfig::default(), &nodes);
        let viewport = Viewport::new(Rect::new(10, 10, 40, 20), &layout);
        assert!(viewport.cell_to_point(10, 10).is_none());
        assert!(viewport.cell_to_point(49, 15).is_none());
        assert!(viewport.cell_to_point(11, 11).is_some());
    }

    #[test]
    fn test_stroke_count_is_monotonic() {
        let weights = [0.0, 0.87, 4.5, 8.92, 12.55, 20.0, 200.0];
        let counts: Vec<usize> = weights.iter().map(|w| stroke_count(*w)).collect();
        assert_eq!(counts, vec![1, 1, 1, 2, 3, 3, 3]);
        assert!(counts.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_node_label() {
        assert_eq!(node_label("0x1a2b3c"), "0x1a2...");
        assert_eq!(node_label("ab"), "ab...");
    }
}
