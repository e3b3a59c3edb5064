use crate::acyclic::forward_edges;
use crate::graph::LayeredGraph;
use crate::options::{Direction, Spacing};
use crate::order::{barycenter_sweep, layers};
use crate::rank::longest_path;
use drift_core::{NodeId, Point, Result};
use std::collections::BTreeMap;

/// One-shot layered placement. Returned points are node centers with the content's top-left
/// corner at the origin.
pub trait HierarchicalSolver {
    fn solve(&self, graph: &LayeredGraph, spacing: &Spacing) -> Result<BTreeMap<NodeId, Point>>;
}

/// Longest-path ranking, one barycenter sweep, and packed coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongestPathSolver;

impl HierarchicalSolver for LongestPathSolver {
    fn solve(&self, graph: &LayeredGraph, spacing: &Spacing) -> Result<BTreeMap<NodeId, Point>> {
        spacing.validate()?;
        let n = graph.len();
        let keep = forward_edges(n, graph.edges());
        let edges: Vec<(usize, usize)> = graph
            .edges()
            .iter()
            .zip(keep)
            .filter_map(|(&e, k)| k.then_some(e))
            .collect();
        let members: Vec<bool> = (0..n).map(|i| !graph.is_compound(i)).collect();
        let ranks = longest_path(&members, &edges);
        let mut layered = layers(&ranks);
        barycenter_sweep(&mut layered, &ranks, &edges);

        let mut centers: Vec<Option<Point>> = vec![None; n];
        place_layers(graph, &layered, spacing, &mut centers);
        let mut visiting = vec![false; n];
        for i in 0..n {
            compound_center(graph, i, &mut centers, &mut visiting);
        }

        tracing::trace!(nodes = n, ranks = layered.len(), "layered solve finished");
        Ok(centers
            .into_iter()
            .enumerate()
            .filter_map(|(i, p)| Some((graph.node(i).id.clone(), p?)))
            .collect())
    }
}

fn place_layers(
    graph: &LayeredGraph,
    layered: &[Vec<usize>],
    spacing: &Spacing,
    centers: &mut [Option<Point>],
) {
    // (along, across) extents depend on which way ranks advance.
    let extent = |i: usize| {
        let n = graph.node(i);
        match spacing.direction {
            Direction::TopBottom => (n.height, n.width),
            Direction::LeftRight => (n.width, n.height),
        }
    };
    let span = |layer: &[usize]| {
        let total: f64 = layer.iter().map(|&i| extent(i).1).sum();
        total + spacing.node_sep * layer.len().saturating_sub(1) as f64
    };
    let widest = layered.iter().map(|l| span(l)).fold(0.0, f64::max);

    let mut along = 0.0;
    for layer in layered {
        let thickness = layer.iter().map(|&i| extent(i).0).fold(0.0, f64::max);
        let mut across = (widest - span(layer)) / 2.0;
        for &i in layer {
            let (_, size) = extent(i);
            let a = along + thickness / 2.0;
            let c = across + size / 2.0;
            centers[i] = Some(match spacing.direction {
                Direction::TopBottom => Point::new(c, a),
                Direction::LeftRight => Point::new(a, c),
            });
            across += size + spacing.node_sep;
        }
        along += thickness + spacing.rank_sep;
    }
}

/// Centers a compound node on the extents of its children, resolving nested compounds first.
fn compound_center(
    graph: &LayeredGraph,
    i: usize,
    centers: &mut [Option<Point>],
    visiting: &mut [bool],
) -> Option<Point> {
    if let Some(p) = centers[i] {
        return Some(p);
    }
    if visiting[i] || !graph.is_compound(i) {
        return None;
    }
    visiting[i] = true;

    let (mut x1, mut y1, mut x2, mut y2) = (
        f64::INFINITY,
        f64::INFINITY,
        f64::NEG_INFINITY,
        f64::NEG_INFINITY,
    );
    for &c in graph.children(i) {
        let Some(p) = compound_center(graph, c, centers, visiting) else {
            continue;
        };
        let node = graph.node(c);
        x1 = x1.min(p.x - node.width / 2.0);
        y1 = y1.min(p.y - node.height / 2.0);
        x2 = x2.max(p.x + node.width / 2.0);
        y2 = y2.max(p.y + node.height / 2.0);
    }
    visiting[i] = false;
    if x1 > x2 {
        return None;
    }
    let p = Point::new((x1 + x2) / 2.0, (y1 + y2) / 2.0);
    centers[i] = Some(p);
    Some(p)
}
