//! In-rank ordering.

/// Groups ranked nodes into layers, keeping input order inside each layer.
pub fn layers(ranks: &[Option<usize>]) -> Vec<Vec<usize>> {
    let depth = ranks.iter().flatten().max().map_or(0, |r| r + 1);
    let mut layers = vec![Vec::new(); depth];
    for (v, r) in ranks.iter().enumerate() {
        if let Some(r) = r {
            layers[*r].push(v);
        }
    }
    layers
}

/// One top-down barycenter sweep.
///
/// Each node is keyed by the mean in-layer position of its predecessors on shallower ranks.
/// Nodes without such predecessors keep their current position as key. The sort is stable.
pub fn barycenter_sweep(
    layers: &mut [Vec<usize>],
    ranks: &[Option<usize>],
    edges: &[(usize, usize)],
) {
    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); ranks.len()];
    for &(v, w) in edges {
        match (ranks[v], ranks[w]) {
            (Some(rv), Some(rw)) if rv < rw => preds[w].push(v),
            _ => {}
        }
    }

    let mut pos = vec![0.0f64; ranks.len()];
    for layer in layers.iter() {
        for (i, &v) in layer.iter().enumerate() {
            pos[v] = i as f64;
        }
    }

    for layer in layers.iter_mut().skip(1) {
        let mut keyed: Vec<(f64, usize)> = layer
            .iter()
            .map(|&v| {
                let key = if preds[v].is_empty() {
                    pos[v]
                } else {
                    preds[v].iter().map(|&u| pos[u]).sum::<f64>() / preds[v].len() as f64
                };
                (key, v)
            })
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        for (i, (_, v)) in keyed.into_iter().enumerate() {
            layer[i] = v;
            pos[v] = i as f64;
        }
    }
}
