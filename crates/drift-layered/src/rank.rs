//! Longest-path ranking.

/// Ranks the `members` of an acyclic graph so every edge points to a strictly deeper rank.
///
/// Sinks start at rank 0 and each node sits one rank above its shallowest successor, then ranks
/// are shifted so the smallest is 0. Non-members get `None`; edges touching them are ignored.
pub fn longest_path(members: &[bool], edges: &[(usize, usize)]) -> Vec<Option<usize>> {
    let n = members.len();
    let mut out: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut indegree = vec![0usize; n];
    for &(v, w) in edges {
        if members[v] && members[w] && v != w {
            out[v].push(w);
            indegree[w] += 1;
        }
    }

    // Kahn's order; edges are assumed acyclic so every member is reached.
    let mut topo: Vec<usize> = (0..n).filter(|&v| members[v] && indegree[v] == 0).collect();
    let mut head = 0;
    while head < topo.len() {
        let v = topo[head];
        head += 1;
        for &w in &out[v] {
            indegree[w] -= 1;
            if indegree[w] == 0 {
                topo.push(w);
            }
        }
    }

    let mut rank: Vec<Option<i64>> = vec![None; n];
    for &v in topo.iter().rev() {
        let r = out[v]
            .iter()
            .filter_map(|&w| rank[w])
            .map(|rw| rw - 1)
            .min()
            .unwrap_or(0);
        rank[v] = Some(r);
    }

    let min = rank.iter().flatten().copied().min().unwrap_or(0);
    rank.into_iter()
        .map(|r| r.map(|r| (r - min) as usize))
        .collect()
}
