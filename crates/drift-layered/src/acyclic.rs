//! Back-edge detection. Edges that close a cycle are left out of ranking.

/// Returns, for each edge in `edges`, whether it survives as a forward edge.
///
/// A depth-first walk from every node in input order marks an edge as a back edge when its
/// target is still on the walk's stack. Self loops are always dropped.
pub fn forward_edges(node_count: usize, edges: &[(usize, usize)]) -> Vec<bool> {
    let mut out: Vec<Vec<(usize, usize)>> = vec![Vec::new(); node_count];
    for (ei, &(v, w)) in edges.iter().enumerate() {
        out[v].push((ei, w));
    }

    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        OnStack,
        Done,
    }

    let mut keep = vec![true; edges.len()];
    let mut mark = vec![Mark::Unvisited; node_count];
    for root in 0..node_count {
        if mark[root] != Mark::Unvisited {
            continue;
        }
        // Iterative DFS: (node, next out-edge cursor).
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
        mark[root] = Mark::OnStack;
        while let Some(top) = stack.last_mut() {
            let v = top.0;
            let Some(&(ei, w)) = out[v].get(top.1) else {
                mark[v] = Mark::Done;
                stack.pop();
                continue;
            };
            top.1 += 1;
            match mark[w] {
                Mark::OnStack => keep[ei] = false,
                Mark::Done => {}
                Mark::Unvisited => {
                    mark[w] = Mark::OnStack;
                    stack.push((w, 0));
                }
            }
        }
    }
    keep
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_loses_exactly_one_edge() {
        let keep = forward_edges(3, &[(0, 1), (1, 2), (2, 0)]);
        assert_eq!(keep, vec![true, true, false]);
    }

    #[test]
    fn self_loops_and_dag_edges() {
        let keep = forward_edges(3, &[(0, 0), (0, 1), (0, 2), (1, 2)]);
        assert_eq!(keep, vec![false, true, true, true]);
    }
}
