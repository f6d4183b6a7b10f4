//! Serpentine map placement and connector paths.
//!
//! # Invariants
//! - Even rows run left to right, odd rows right to left.
//! - Consecutive cells on one row join with a straight line; a row change
//!   joins with a cubic that bulges past the row end in its travel direction.
//! - Derived data only: nothing here is persisted.

use crate::config::SnakeConfig;
use crate::model::node::{Node, NodeId};
use kurbo::{BezPath, Point};

/// Grid cell of one node on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnakeCell {
    pub row: usize,
    pub col: usize,
}

impl SnakeCell {
    /// Cell for node `index` with `columns` cells per row.
    pub fn for_index(index: usize, columns: usize) -> Self {
        let columns = columns.max(1);
        let row = index / columns;
        let offset = index % columns;
        let col = if row % 2 == 0 {
            offset
        } else {
            columns - 1 - offset
        };
        Self { row, col }
    }

    /// Whether this cell's row is traversed left to right.
    pub fn runs_forward(&self) -> bool {
        self.row % 2 == 0
    }
}

/// World-space center of node `index`.
pub fn snake_position(index: usize, config: &SnakeConfig) -> Point {
    let cell = SnakeCell::for_index(index, config.columns);
    Point::new(
        config.margin_x + cell.col as f64 * config.spacing_x,
        config.margin_y + cell.row as f64 * config.spacing_y,
    )
}

/// One connector between consecutive nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    Line {
        from: Point,
        to: Point,
    },
    Cubic {
        from: Point,
        ctrl1: Point,
        ctrl2: Point,
        to: Point,
    },
}

/// Connectors for a sequence of `count` nodes.
pub fn snake_path(count: usize, config: &SnakeConfig) -> Vec<PathSegment> {
    (1..count)
        .map(|index| {
            let prev = SnakeCell::for_index(index - 1, config.columns);
            let from = snake_position(index - 1, config);
            let to = snake_position(index, config);
            let next = SnakeCell::for_index(index, config.columns);
            if prev.row == next.row {
                return PathSegment::Line { from, to };
            }
            let bulge = if prev.runs_forward() {
                config.turn_bulge
            } else {
                -config.turn_bulge
            };
            PathSegment::Cubic {
                from,
                ctrl1: Point::new(from.x + bulge, from.y),
                ctrl2: Point::new(to.x + bulge, to.y),
                to,
            }
        })
        .collect()
}

/// Joins segments into one drawable path.
pub fn to_bez_path(segments: &[PathSegment]) -> BezPath {
    let mut path = BezPath::new();
    let mut cursor: Option<Point> = None;
    for segment in segments {
        let (start, end) = match *segment {
            PathSegment::Line { from, to } | PathSegment::Cubic { from, to, .. } => (from, to),
        };
        if cursor != Some(start) {
            path.move_to(start);
        }
        match *segment {
            PathSegment::Line { to, .. } => path.line_to(to),
            PathSegment::Cubic {
                ctrl1, ctrl2, to, ..
            } => path.curve_to(ctrl1, ctrl2, to),
        }
        cursor = Some(end);
    }
    path
}

/// Map geometry memoized on the node-id sequence.
#[derive(Debug, Default)]
pub struct SnakeLayout {
    key: Vec<NodeId>,
    config: Option<SnakeConfig>,
    positions: Vec<Point>,
    segments: Vec<PathSegment>,
}

impl SnakeLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes only when the id order or the config changed.
    ///
    /// Returns `true` when the cached geometry was rebuilt.
    pub fn update(&mut self, nodes: &[Node], config: &SnakeConfig) -> bool {
        let same_ids = self.key.len() == nodes.len()
            && self.key.iter().zip(nodes).all(|(id, node)| id == &node.id);
        if same_ids && self.config.as_ref() == Some(config) {
            return false;
        }
        self.key = nodes.iter().map(|node| node.id.clone()).collect();
        self.config = Some(*config);
        self.positions = (0..nodes.len())
            .map(|index| snake_position(index, config))
            .collect();
        self.segments = snake_path(nodes.len(), config);
        true
    }

    pub fn positions(&self) -> &[Point] {
        &self.positions
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Position of the node with `id`, if it is laid out.
    pub fn position_of(&self, id: &NodeId) -> Option<Point> {
        self.key
            .iter()
            .position(|candidate| candidate == id)
            .and_then(|index| self.positions.get(index).copied())
    }

    /// SVG path data for the connectors.
    pub fn svg_path(&self) -> String {
        to_bez_path(&self.segments).to_svg()
    }
}
