//! Index-based graph the solver works on.

use drift_core::{GraphSnapshot, NodeId, Result};
use rustc_hash::FxHashMap as HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct LayeredNode {
    pub id: NodeId,
    pub width: f64,
    pub height: f64,
    /// Index of the enclosing compound node, if it is part of the graph.
    pub parent: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct LayeredGraph {
    nodes: Vec<LayeredNode>,
    edges: Vec<(usize, usize)>,
    index: HashMap<NodeId, usize>,
    children: Vec<Vec<usize>>,
}

impl LayeredGraph {
    pub fn from_snapshot(snapshot: &GraphSnapshot) -> Result<Self> {
        snapshot.validate()?;
        let index: HashMap<NodeId, usize> = snapshot
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
        let nodes: Vec<LayeredNode> = snapshot
            .nodes
            .iter()
            .map(|n| LayeredNode {
                id: n.id.clone(),
                width: n.width.max(0.0),
                height: n.height.max(0.0),
                parent: n.parent.as_ref().and_then(|p| index.get(p).copied()),
            })
            .collect();
        let edges = snapshot
            .edges
            .iter()
            .filter_map(|e| Some((*index.get(&e.source)?, *index.get(&e.target)?)))
            .collect();

        let mut children = vec![Vec::new(); nodes.len()];
        for (i, n) in nodes.iter().enumerate() {
            if let Some(p) = n.parent {
                if p != i {
                    children[p].push(i);
                }
            }
        }
        Ok(Self {
            nodes,
            edges,
            index,
            children,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[LayeredNode] {
        &self.nodes
    }

    pub fn node(&self, i: usize) -> &LayeredNode {
        &self.nodes[i]
    }

    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn children(&self, i: usize) -> &[usize] {
        &self.children[i]
    }

    /// Compound nodes are positioned from their children instead of being ranked.
    pub fn is_compound(&self, i: usize) -> bool {
        !self.children[i].is_empty()
    }
}
