//! The request body sent to a layout service: `{graph: {nodes, edges}, layout, options}`.

use drift_core::{EdgeId, GraphSnapshot, NodeId, Point};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteNode {
    pub id: NodeId,
    pub position: Point,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RemoteGraph {
    pub nodes: Vec<RemoteNode>,
    pub edges: Vec<RemoteEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRequest {
    pub graph: RemoteGraph,
    /// Which layout algorithm the service should run.
    pub layout: String,
    #[serde(default)]
    pub options: Value,
}

impl RemoteRequest {
    pub fn from_snapshot(snapshot: &GraphSnapshot, layout: &str, options: Value) -> Self {
        let nodes = snapshot
            .nodes
            .iter()
            .map(|n| RemoteNode {
                id: n.id.clone(),
                position: n.position,
                width: n.width,
                height: n.height,
                parent: n.parent.clone(),
                data: n.data.clone(),
            })
            .collect();
        let edges = snapshot
            .edges
            .iter()
            .map(|e| RemoteEdge {
                id: e.id.clone(),
                source: e.source.clone(),
                target: e.target.clone(),
                data: e.data.clone(),
            })
            .collect();
        Self {
            graph: RemoteGraph { nodes, edges },
            layout: layout.to_string(),
            options,
        }
    }

    pub fn to_body(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}
