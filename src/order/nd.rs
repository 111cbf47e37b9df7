//! Halo nested dissection.
//!
//! Splits the graph into `A ∪ S ∪ B` with a vertex separator `S`, numbers
//! `A`, then `B`, then `S` last, and recurses on the two halves with `S`
//! appended to their halo, so the minimum-fill base case accounts for
//! elimination fill across the separator. The separator comes out of a
//! multilevel edge bipartition: the frontier vertices of the side with the
//! smaller frontier form `S`.

use log::debug;

use crate::bipart::{BipartParams, bipart_multilevel};
use crate::config::IntOption;
use crate::context::Context;
use crate::error::Result;
use crate::graph::Graph;
use crate::halo::HaloGraph;
use crate::order::hamf::hamf_order;
use crate::order::{CblkKind, OrderCblk, Ordering};

/// Order a plain graph by halo nested dissection.
pub fn order_graph(ctx: &Context, graph: &Graph) -> Result<Ordering> {
    order_halo(ctx, &HaloGraph::from_graph(graph.clone()))
}

/// Order the anchor prefix of a halo graph.
pub fn order_halo(ctx: &Context, hgraph: &HaloGraph) -> Result<Ordering> {
    ctx.random_reset();
    let vnohnbr = hgraph.vnohnbr();
    let mut state = NdState {
        peritab: vec![usize::MAX; vnohnbr],
        cblktab: Vec::new(),
    };
    let globtab: Vec<usize> = (0..vnohnbr).collect();
    recurse(ctx, hgraph, &globtab, 0, -1, &mut state)?;

    let mut permtab = vec![0usize; vnohnbr];
    for (rank, &v) in state.peritab.iter().enumerate() {
        permtab[v] = rank;
    }
    // Column counts of the permuted matrix: the diagonal plus the
    // neighbours eliminated later.
    let graph = hgraph.graph();
    let colcnttab = (0..vnohnbr)
        .map(|rank| {
            let v = state.peritab[rank];
            1 + graph
                .neighbors(v)
                .iter()
                .filter(|&&w| w < vnohnbr && permtab[w] > rank)
                .count() as i64
        })
        .collect();

    Ok(Ordering {
        permtab,
        peritab: state.peritab,
        cblktab: state.cblktab,
        colcnttab,
    })
}

struct NdState {
    peritab: Vec<usize>,
    cblktab: Vec<OrderCblk>,
}

/// Order the anchors of `hgraph` into ranks `[base, base + vnohnbr)`.
/// `globtab` maps local anchors to root-graph vertices.
fn recurse(
    ctx: &Context,
    hgraph: &HaloGraph,
    globtab: &[usize],
    base: usize,
    parent: i64,
    state: &mut NdState,
) -> Result<()> {
    let vnohnbr = hgraph.vnohnbr();
    if vnohnbr == 0 {
        return Ok(());
    }
    let cutoff = ctx.values().int(IntOption::CoarsenVertexCutoff).max(2) as usize;
    if vnohnbr <= cutoff {
        return order_leaf(hgraph, globtab, base, parent, state);
    }

    // Bisect the anchor subgraph (the halo does not vote on the cut).
    let anchors: Vec<usize> = (0..vnohnbr).collect();
    let induced = hgraph.graph().induce_list(&anchors)?;
    let sub = &induced.graph;
    let velomax = (0..sub.vertnbr()).map(|v| sub.velo(v)).max().unwrap_or(1);
    let params = BipartParams::new(sub.velosum() / 2, velomax.max(sub.velosum() / 20));
    let sides = bipart_multilevel(ctx, sub, &params)?;

    // Separator: the frontier of the side with the smaller frontier.
    let mut front0: Vec<usize> = Vec::new();
    let mut front1: Vec<usize> = Vec::new();
    for v in 0..vnohnbr {
        for e in sub.edge_range(v) {
            if sides[sub.edge_target(e)] != sides[v] {
                if sides[v] == 0 {
                    front0.push(v);
                } else {
                    front1.push(v);
                }
                break;
            }
        }
    }
    let septab = if front0.len() <= front1.len() {
        front0
    } else {
        front1
    };
    if septab.is_empty() || septab.len() >= vnohnbr {
        // Disconnected halves need no separator; order each side in turn.
        // A separator covering everything degenerates to minimum fill.
        if septab.is_empty() && !sides.iter().all(|&s| s == sides[0]) {
            return order_split(ctx, hgraph, globtab, &sides, base, parent, state);
        }
        return order_leaf(hgraph, globtab, base, parent, state);
    }

    let mut issep = vec![false; vnohnbr];
    for &v in &septab {
        issep[v] = true;
    }
    let parta: Vec<usize> = (0..vnohnbr)
        .filter(|&v| sides[v] == 0 && !issep[v])
        .collect();
    let partb: Vec<usize> = (0..vnohnbr)
        .filter(|&v| sides[v] == 1 && !issep[v])
        .collect();
    if parta.is_empty() || partb.is_empty() {
        return order_leaf(hgraph, globtab, base, parent, state);
    }
    debug!(
        "dissecting {} anchors into {} | {} | {}",
        vnohnbr,
        parta.len(),
        septab.len(),
        partb.len()
    );

    let cblk = state.cblktab.len();
    state.cblktab.push(OrderCblk {
        parent,
        kind: CblkKind::Nested,
        ordenum: base,
        vnodnbr: vnohnbr,
    });

    // A first, B second, S last.
    let (ha, gla) = induce_half(hgraph, globtab, &parta)?;
    recurse(ctx, &ha, &gla, base, cblk as i64, state)?;
    let (hb, glb) = induce_half(hgraph, globtab, &partb)?;
    recurse(ctx, &hb, &glb, base + parta.len(), cblk as i64, state)?;

    let sepbase = base + parta.len() + partb.len();
    state.cblktab.push(OrderCblk {
        parent: cblk as i64,
        kind: CblkKind::Separator,
        ordenum: sepbase,
        vnodnbr: septab.len(),
    });
    for (i, &v) in septab.iter().enumerate() {
        state.peritab[sepbase + i] = globtab[v];
    }
    Ok(())
}

/// Induce the halo graph of one half and carry the global numbering along.
fn induce_half(
    hgraph: &HaloGraph,
    globtab: &[usize],
    half: &[usize],
) -> Result<(HaloGraph, Vec<usize>)> {
    let (sub, orgtab) = hgraph.induce_list(half)?;
    let glob = orgtab[..sub.vnohnbr()]
        .iter()
        .map(|&v| globtab[v])
        .collect();
    Ok((sub, glob))
}

/// Two disconnected halves: order side 0, then side 1, under one tree node.
fn order_split(
    ctx: &Context,
    hgraph: &HaloGraph,
    globtab: &[usize],
    sides: &[u8],
    base: usize,
    parent: i64,
    state: &mut NdState,
) -> Result<()> {
    let parta: Vec<usize> = (0..hgraph.vnohnbr()).filter(|&v| sides[v] == 0).collect();
    let partb: Vec<usize> = (0..hgraph.vnohnbr()).filter(|&v| sides[v] == 1).collect();
    let cblk = state.cblktab.len();
    state.cblktab.push(OrderCblk {
        parent,
        kind: CblkKind::Nested,
        ordenum: base,
        vnodnbr: hgraph.vnohnbr(),
    });
    let (ha, gla) = induce_half(hgraph, globtab, &parta)?;
    recurse(ctx, &ha, &gla, base, cblk as i64, state)?;
    let (hb, glb) = induce_half(hgraph, globtab, &partb)?;
    recurse(ctx, &hb, &glb, base + parta.len(), cblk as i64, state)
}

/// Base case: halo approximate minimum fill on the whole block.
fn order_leaf(
    hgraph: &HaloGraph,
    globtab: &[usize],
    base: usize,
    parent: i64,
    state: &mut NdState,
) -> Result<()> {
    let hamf = hamf_order(hgraph);
    state.cblktab.push(OrderCblk {
        parent,
        kind: CblkKind::Leaf,
        ordenum: base,
        vnodnbr: hgraph.vnohnbr(),
    });
    for (i, &v) in hamf.peritab.iter().enumerate() {
        state.peritab[base + i] = globtab[v];
    }
    Ok(())
}
