//! Synthetic coverage topology: a grid of unit-area cells with nodes at the
//! grid intersections.
//!
//! A node at intersection `(row, col)` covers the up to four cells touching that
//! intersection. Two nodes interfere only when their covered cell sets intersect.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unit-area cell (1 km²).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub row: usize,
    pub col: usize,
    /// Covered cells, sorted and unique.
    pub cells: Vec<CellId>,
}

impl Node {
    pub fn new(id: usize, row: usize, col: usize, cells: impl IntoIterator<Item = usize>) -> Self {
        let mut cells: Vec<CellId> = cells.into_iter().map(CellId).collect();
        cells.sort_unstable();
        cells.dedup();
        Self {
            id: NodeId(id),
            row,
            col,
            cells,
        }
    }

    /// Area in cells, used as km² by usage integration.
    pub fn area(&self) -> usize {
        self.cells.len()
    }

    pub fn shares_cell_with(&self, other: &Node) -> bool {
        // Both lists are sorted, so a merge walk suffices.
        let (mut i, mut j) = (0, 0);
        while i < self.cells.len() && j < other.cells.len() {
            match self.cells[i].cmp(&other.cells[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => return true,
            }
        }
        false
    }
}

/// Spatial relationship between two nodes that share coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRelationship {
    Same,
    Adjacent,
    Opposite,
}

/// Immutable node layout plus neighbor lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    nodes: Vec<Node>,
    neighbors: Vec<Vec<NodeId>>,
    num_cells: usize,
}

impl Topology {
    /// Grid of `squares_rows x squares_cols` cells with `(rows + 1) x (cols + 1)` nodes.
    pub fn grid(squares_rows: usize, squares_cols: usize) -> ConfigResult<Self> {
        if squares_rows == 0 || squares_cols == 0 {
            return Err(ConfigError::InvalidTopology(
                "grid needs at least one row and one column of cells".into(),
            ));
        }
        let node_rows = squares_rows + 1;
        let node_cols = squares_cols + 1;
        let cell_at = |r: usize, c: usize| r * squares_cols + c;

        let mut nodes = Vec::with_capacity(node_rows * node_cols);
        for r in 0..node_rows {
            for c in 0..node_cols {
                let mut cells = Vec::with_capacity(4);
                if r < squares_rows && c < squares_cols {
                    cells.push(cell_at(r, c));
                }
                if r > 0 && c < squares_cols {
                    cells.push(cell_at(r - 1, c));
                }
                if c > 0 && r < squares_rows {
                    cells.push(cell_at(r, c - 1));
                }
                if r > 0 && c > 0 {
                    cells.push(cell_at(r - 1, c - 1));
                }
                nodes.push(Node::new(r * node_cols + c, r, c, cells));
            }
        }

        let neighbors = nodes
            .iter()
            .map(|node| {
                let mut out = Vec::with_capacity(4);
                if node.row > 0 {
                    out.push(NodeId((node.row - 1) * node_cols + node.col));
                }
                if node.row + 1 < node_rows {
                    out.push(NodeId((node.row + 1) * node_cols + node.col));
                }
                if node.col > 0 {
                    out.push(NodeId(node.row * node_cols + node.col - 1));
                }
                if node.col + 1 < node_cols {
                    out.push(NodeId(node.row * node_cols + node.col + 1));
                }
                out
            })
            .collect();

        Ok(Self {
            nodes,
            neighbors,
            num_cells: squares_rows * squares_cols,
        })
    }

    /// Hand-built layout. Node ids must match their position and neighbor lists
    /// must reference existing nodes; cells are counted from the highest id used.
    pub fn custom(nodes: Vec<Node>, neighbors: Vec<Vec<NodeId>>) -> ConfigResult<Self> {
        if nodes.is_empty() {
            return Err(ConfigError::InvalidTopology("no nodes".into()));
        }
        if neighbors.len() != nodes.len() {
            return Err(ConfigError::InvalidTopology(format!(
                "{} neighbor lists for {} nodes",
                neighbors.len(),
                nodes.len()
            )));
        }
        for (index, node) in nodes.iter().enumerate() {
            if node.id.0 != index {
                return Err(ConfigError::InvalidTopology(format!(
                    "node at position {index} has id {}",
                    node.id
                )));
            }
            if node.cells.is_empty() {
                return Err(ConfigError::InvalidTopology(format!(
                    "node {} covers no cells",
                    node.id
                )));
            }
        }
        for (index, list) in neighbors.iter().enumerate() {
            if let Some(bad) = list.iter().find(|n| n.0 >= nodes.len() || n.0 == index) {
                return Err(ConfigError::InvalidTopology(format!(
                    "node {index} lists invalid neighbor {bad}"
                )));
            }
        }
        let num_cells = nodes
            .iter()
            .flat_map(|n| n.cells.iter())
            .map(|c| c.0 + 1)
            .max()
            .unwrap_or(0);

        Ok(Self {
            nodes,
            neighbors,
            num_cells,
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of cells (total area in km²).
    pub fn num_cells(&self) -> usize {
        self.num_cells
    }

    /// Cells covered by `id`; empty for unknown nodes.
    pub fn cells(&self, id: NodeId) -> &[CellId] {
        self.node(id).map(|n| n.cells.as_slice()).unwrap_or(&[])
    }

    pub fn area(&self, id: NodeId) -> usize {
        self.cells(id).len()
    }

    pub fn neighbors(&self, id: NodeId) -> &[NodeId] {
        self.neighbors.get(id.0).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn shares_cell(&self, a: NodeId, b: NodeId) -> bool {
        match (self.node(a), self.node(b)) {
            (Some(a), Some(b)) => a.shares_cell_with(b),
            _ => false,
        }
    }

    /// `None` when the nodes share no coverage (no interference possible).
    pub fn relationship(&self, a: NodeId, b: NodeId) -> Option<NodeRelationship> {
        if a == b {
            return self.node(a).map(|_| NodeRelationship::Same);
        }
        let (na, nb) = (self.node(a)?, self.node(b)?);
        if !na.shares_cell_with(nb) {
            return None;
        }
        let distance = na.row.abs_diff(nb.row) + na.col.abs_diff(nb.col);
        if distance == 1 {
            Some(NodeRelationship::Adjacent)
        } else {
            Some(NodeRelationship::Opposite)
        }
    }
}
