//! Shared graph builders for the integration tests.
#![allow(dead_code)] // each test binary uses its own subset

use lodestone::Graph;

/// Path graph `0 - 1 - … - n-1`.
pub fn path_graph(n: usize) -> Graph {
    from_edges(n, (0..n - 1).map(|v| (v, v + 1)).collect())
}

/// Cycle graph on `n` vertices.
pub fn cycle_graph(n: usize) -> Graph {
    let mut edges: Vec<(usize, usize)> = (0..n - 1).map(|v| (v, v + 1)).collect();
    edges.push((n - 1, 0));
    from_edges(n, edges)
}

/// `w × h` grid, vertex `(x, y)` at index `x + y * w`.
pub fn grid2(w: usize, h: usize) -> Graph {
    let mut edges = Vec::new();
    for y in 0..h {
        for x in 0..w {
            let v = x + y * w;
            if x + 1 < w {
                edges.push((v, v + 1));
            }
            if y + 1 < h {
                edges.push((v, v + w));
            }
        }
    }
    from_edges(w * h, edges)
}

/// `x × y × z` grid, vertex `(i, j, k)` at index `i + j * x + k * x * y`.
pub fn grid3(x: usize, y: usize, z: usize) -> Graph {
    let mut edges = Vec::new();
    for k in 0..z {
        for j in 0..y {
            for i in 0..x {
                let v = i + j * x + k * x * y;
                if i + 1 < x {
                    edges.push((v, v + 1));
                }
                if j + 1 < y {
                    edges.push((v, v + x));
                }
                if k + 1 < z {
                    edges.push((v, v + x * y));
                }
            }
        }
    }
    from_edges(x * y * z, edges)
}

/// Complete graph on `n` vertices.
pub fn complete_graph(n: usize) -> Graph {
    let mut edges = Vec::new();
    for v in 0..n {
        for w in v + 1..n {
            edges.push((v, w));
        }
    }
    from_edges(n, edges)
}

/// Two disjoint cliques of `n` vertices each.
pub fn two_cliques(n: usize) -> Graph {
    let mut edges = Vec::new();
    for base in [0, n] {
        for v in 0..n {
            for w in v + 1..n {
                edges.push((base + v, base + w));
            }
        }
    }
    from_edges(2 * n, edges)
}

/// Build an unloaded graph from undirected edge pairs.
pub fn from_edges(n: usize, edges: Vec<(usize, usize)>) -> Graph {
    from_edges_weighted(n, edges.into_iter().map(|(v, w)| (v, w, 1)).collect(), false)
}

/// Build a graph from weighted undirected edges; `keep_loads` keeps the
/// edge load array even when every load is 1.
pub fn from_edges_weighted(n: usize, edges: Vec<(usize, usize, i64)>, keep_loads: bool) -> Graph {
    let mut adj: Vec<Vec<(usize, i64)>> = vec![Vec::new(); n];
    for (v, w, load) in edges {
        adj[v].push((w, load));
        adj[w].push((v, load));
    }
    let mut verttab = Vec::with_capacity(n + 1);
    verttab.push(0usize);
    let mut edgetab = Vec::new();
    let mut edlotab = Vec::new();
    let mut uniform = true;
    for list in &adj {
        for &(w, load) in list {
            edgetab.push(w);
            edlotab.push(load);
            uniform &= load == 1;
        }
        verttab.push(edgetab.len());
    }
    let edlotab = if uniform && !keep_loads {
        None
    } else {
        Some(edlotab)
    };
    Graph::build(0, verttab, edgetab, None, edlotab).expect("well-formed test graph")
}
