//! Deterministic circular layout and link resolution

use std::collections::HashMap;
use std::f64::consts::TAU;

use serde::Deserialize;

use crate::domain::{Node, Transaction};

/// Logical canvas parameters
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub width: f64,
    pub height: f64,
    pub radius: f64,
    /// Stroke width per unit of transaction amount
    pub link_weight: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 400.0,
            radius: 300.0,
            link_weight: 0.1,
        }
    }
}

impl LayoutConfig {
    pub fn center(&self) -> Point {
        Point {
            x: self.width / 2.0,
            y: self.height / 2.0,
        }
    }

    /// Linear, monotonic mapping from amount to visual weight
    pub fn link_weight(&self, amount: f64) -> f64 {
        amount.max(0.0) * self.link_weight
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn distance(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// A drawable edge with both endpoints resolved against the node set
#[derive(Debug, Clone, Copy)]
pub struct Link<'a> {
    pub source: &'a Node,
    pub target: &'a Node,
    pub transaction: &'a Transaction,
    pub from: Point,
    pub to: Point,
    pub weight: f64,
}

impl Link<'_> {
    pub fn touches(&self, wallet: &str) -> bool {
        self.source.id == wallet || self.target.id == wallet
    }
}

/// Result of resolving a batch of transactions into links
#[derive(Debug, Default)]
pub struct LinkSet<'a> {
    pub links: Vec<Link<'a>>,
    /// Ids of transactions with an endpoint missing from the node set
    pub invalid: Vec<&'a str>,
}

/// Uniform circular placement of a node list.
///
/// Node `i` of `N` sits at angle `i / N * 2π` on a circle of `radius`
/// around the canvas center. Positions depend only on list order.
#[derive(Debug)]
pub struct GraphLayout<'a> {
    config: LayoutConfig,
    nodes: &'a [Node],
    index: HashMap<&'a str, usize>,
}

impl<'a> GraphLayout<'a> {
    pub fn new(config: LayoutConfig, nodes: &'a [Node]) -> Self {
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            // first occurrence wins
            index.entry(node.id.as_str()).or_insert(i);
        }
        Self {
            config,
            nodes,
            index,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn nodes(&self) -> &'a [Node] {
        self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Angle in radians for the node at `index`
    pub fn angle(&self, index: usize) -> f64 {
        if self.nodes.is_empty() {
            return 0.0;
        }
        (index as f64 / self.nodes.len() as f64) * TAU
    }

    pub fn position(&self, index: usize) -> Point {
        let theta = self.angle(index);
        let center = self.config.center();
        Point {
            x: center.x + self.config.radius * theta.cos(),
            y: center.y + self.config.radius * theta.sin(),
        }
    }

    /// Position of the node with `id`, if it is part of the layout
    pub fn node_position(&self, id: &str) -> Option<Point> {
        self.index.get(id).map(|&i| self.position(i))
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn positions(&self) -> impl Iterator<Item = (&'a Node, Point)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(move |(i, node)| (node, self.position(i)))
    }

    pub fn resolve(&self, tx: &'a Transaction) -> Option<Link<'a>> {
        let source_idx = *self.index.get(tx.source.as_str())?;
        let target_idx = *self.index.get(tx.target.as_str())?;
        Some(Link {
            source: &self.nodes[source_idx],
            target: &self.nodes[target_idx],
            transaction: tx,
            from: self.position(source_idx),
            to: self.position(target_idx),
            weight: self.config.link_weight(tx.amount),
        })
    }

    /// Resolve every transaction; unresolvable ones are collected, never drawn
    pub fn resolve_links<I>(&self, txs: I) -> LinkSet<'a>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut set = LinkSet::default();
        for tx in txs {
            match self.resolve(tx) {
                Some(link) => set.links.push(link),
                None => set.invalid.push(tx.id.as_str()),
            }
        }
        set
    }

    /// Closest node whose center lies within `tolerance` of `point`
    pub fn node_at(&self, point: Point, tolerance: f64) -> Option<&'a Node> {
        self.positions()
            .map(|(node, pos)| (node, pos.distance(point)))
            .filter(|(_, dist)| *dist <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(node, _)| node)
    }

    /// Bounding box `[(min_x, max_x), (min_y, max_y)]` of the circle plus `margin`
    pub fn bounds(&self, margin: f64) -> ([f64; 2], [f64; 2]) {
        let center = self.config.center();
        let reach = self.config.radius + margin;
        (
            [center.x - reach, center.x + reach],
            [center.y - reach, center.y + reach],
        )
    }
}

/// Highlight predicate for nodes
pub fn is_node_active(node: &Node, selected_wallet: Option<&str>) -> bool {
    selected_wallet == Some(node.id.as_str())
}

/// Highlight predicate for links
pub fn is_link_active(link: &Link<'_>, selected_wallet: Option<&str>) -> bool {
    selected_wallet.is_some_and(|wallet| link.touches(wallet))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NodeType;

    fn nodes(n: usize) -> Vec<Node> {
        (0..n)
            .map(|i| Node::new(format!("n{i}"), format!("Node {i}"), NodeType::Wallet))
            .collect()
    }

    #[test]
    fn test_positions_are_stable() {
        let nodes = nodes(5);
        let layout = GraphLayout::new(LayoutConfig::default(), &nodes);
        let first: Vec<Point> = (0..5).map(|i| layout.position(i)).collect();
        let again = GraphLayout::new(LayoutConfig::default(), &nodes);
        let second: Vec<Point> = (0..5).map(|i| again.position(i)).collect();
        assert_eq!(first, second);
        assert_eq!(layout.node_position("n3"), Some(first[3]));
    }

    #[test]
    fn test_first_node_sits_right_of_center() {
        let nodes = nodes(4);
        let layout = GraphLayout::new(LayoutConfig::default(), &nodes);
        let p = layout.position(0);
        assert!((p.x - 600.0).abs() < 1e-9);
        assert!((p.y - 200.0).abs() < 1e-9);
        let p = layout.position(1);
        assert!((p.x - 300.0).abs() < 1e-9);
        assert!((p.y - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_angles_evenly_spaced() {
        let nodes = nodes(7);
        let layout = GraphLayout::new(LayoutConfig::default(), &nodes);
        let step = TAU / 7.0;
        for i in 1..7 {
            let delta = layout.angle(i) - layout.angle(i - 1);
            assert!((delta - step).abs() < 1e-12);
        }
    }

    #[test]
    fn test_invalid_links_are_excluded() {
        let nodes = nodes(2);
        let txs = vec![
            Transaction::new("ok", "n0", "n1", 20.0, 1),
            Transaction::new("bad", "n0", "ghost", 5.0, 1),
        ];
        let layout = GraphLayout::new(LayoutConfig::default(), &nodes);
        let set = layout.resolve_links(&txs);
        assert_eq!(set.links.len(), 1);
        assert_eq!(set.invalid, vec!["bad"]);
        assert_eq!(set.links[0].weight, 2.0);
    }

    #[test]
    fn test_empty_layout_is_safe() {
        let nodes: Vec<Node> = Vec::new();
        let layout = GraphLayout::new(LayoutConfig::default(), &nodes);
        assert_eq!(layout.angle(0), 0.0);
        assert!(layout.node_position("x").is_none());
        assert!(layout.node_at(Point { x: 300.0, y: 200.0 }, 50.0).is_none());
    }

    #[test]
    fn test_link_weight_is_linear() {
        let config = LayoutConfig::default();
        assert_eq!(config.link_weight(0.0), 0.0);
        assert!((config.link_weight(150.0) - 15.0).abs() < 1e-9);
        assert!(config.link_weight(20.0) > config.link_weight(10.0));
    }

    #[test]
    fn test_highlight_predicates() {
        let nodes = nodes(3);
        let txs = vec![Transaction::new("t", "n0", "n1", 1.0, 1)];
        let layout = GraphLayout::new(LayoutConfig::default(), &nodes);
        let link = layout.resolve(&txs[0]).unwrap();
        assert!(is_link_active(&link, Some("n1")));
        assert!(!is_link_active(&link, Some("n2")));
        assert!(!is_link_active(&link, None));
        assert!(is_node_active(&nodes[2], Some("n2")));
        assert!(!is_node_active(&nodes[2], None));
    }

    #[test]
    fn test_node_at_picks_closest() {
        let nodes = nodes(4);
        let layout = GraphLayout::new(LayoutConfig::default(), &nodes);
        let near_second = Point { x: 305.0, y: 495.0 };
        assert_eq!(layout.node_at(near_second, 30.0).map(|n| n.id.as_str()), Some("n1"));
        assert!(layout.node_at(Point { x: 300.0, y: 200.0 }, 30.0).is_none());
    }
}
