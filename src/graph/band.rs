//! Band-graph extraction around a partition frontier.
//!
//! The k-way diffusion refiner does not run on the whole graph: it runs on
//! the *band* of vertices within a few layers of the current frontier, with
//! one synthetic *anchor* vertex appended per target domain. Each anchor is
//! connected to the band's outer-boundary vertices currently mapped to its
//! domain and carries, as vertex load, the load of everything outside the
//! band still mapped to that domain. The k-way constraint thereby becomes a
//! local problem on the band while global balance stays represented.

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::metrics;

/// A band graph: the induced band plus one anchor per domain at the tail.
#[derive(Clone, Debug)]
pub(crate) struct BandGraph {
    /// Band vertices first, then `domnnbr` anchors.
    pub graph: Graph,
    /// Parent index of each non-anchor band vertex.
    pub orgtab: Vec<usize>,
    /// Number of non-anchor band vertices.
    pub vancnbr: usize,
    /// Number of anchors (= number of live domains).
    pub domnnbr: usize,
    /// Current part of every band vertex; anchor `d` is pinned to `d`.
    pub parttab: Vec<i64>,
}

/// Extract the band of vertices at graph distance `<= layers` from the
/// frontier, with anchors. `compload[d]` is the realised load of domain `d`
/// over the whole graph.
pub(crate) fn extract_band(
    graph: &Graph,
    parttab: &[i64],
    frontier: &[usize],
    layers: usize,
    domnnbr: usize,
    compload: &[i64],
) -> Result<BandGraph> {
    const ROUTINE: &str = "band::extract_band";
    if frontier.is_empty() {
        return Err(Error::TransientFailure("empty frontier".into()));
    }
    let vertnbr = graph.vertnbr();
    let mut bandidx = metrics::alloc_vec(vertnbr, usize::MAX, ROUTINE)?;
    let mut bandtab: Vec<usize> = Vec::with_capacity(frontier.len() * 2);

    for &v in frontier {
        if bandidx[v] == usize::MAX {
            bandidx[v] = bandtab.len();
            bandtab.push(v);
        }
    }
    let mut layer_end = bandtab.len();
    let mut layer_beg = 0;
    for _ in 0..layers {
        for i in layer_beg..layer_end {
            let v = bandtab[i];
            for e in graph.edge_range(v) {
                let w = graph.edge_target(e);
                if bandidx[w] == usize::MAX {
                    bandidx[w] = bandtab.len();
                    bandtab.push(w);
                }
            }
        }
        layer_beg = layer_end;
        layer_end = bandtab.len();
    }

    let vancnbr = bandtab.len();
    let bandnbr = vancnbr + domnnbr;

    // Outer boundary: band vertices with at least one neighbor outside.
    // Each gets a single edge to the anchor of its own domain.
    let mut boundtab = metrics::alloc_vec(vancnbr, false, ROUTINE)?;
    let mut edlomax = 1i64;
    for (local, &v) in bandtab.iter().enumerate() {
        for e in graph.edge_range(v) {
            let w = graph.edge_target(e);
            if bandidx[w] == usize::MAX {
                boundtab[local] = true;
            } else if graph.has_edlo() {
                edlomax = edlomax.max(graph.edlo(e));
            }
        }
    }

    let mut verttab = Vec::with_capacity(bandnbr + 1);
    verttab.push(0usize);
    let mut edgetab = Vec::new();
    let mut edlotab = if graph.has_edlo() { Some(Vec::new()) } else { None };
    for (local, &v) in bandtab.iter().enumerate() {
        for e in graph.edge_range(v) {
            let w = graph.edge_target(e);
            if bandidx[w] == usize::MAX {
                continue;
            }
            edgetab.push(bandidx[w]);
            if let Some(edlo) = edlotab.as_mut() {
                edlo.push(graph.edlo(e));
            }
        }
        if boundtab[local] {
            edgetab.push(vancnbr + parttab[v] as usize);
            if let Some(edlo) = edlotab.as_mut() {
                edlo.push(edlomax);
            }
        }
        verttab.push(edgetab.len());
    }
    for d in 0..domnnbr {
        // anchor side of the boundary edges, keeping the CSR symmetric
        for (local, &v) in bandtab.iter().enumerate() {
            if boundtab[local] && parttab[v] as usize == d {
                edgetab.push(local);
                if let Some(edlo) = edlotab.as_mut() {
                    edlo.push(edlomax);
                }
            }
        }
        verttab.push(edgetab.len());
    }

    // Band loads, then anchor loads (what remains outside the band).
    let mut velotab = Vec::with_capacity(bandnbr);
    let mut bandload = metrics::alloc_vec(domnnbr, 0i64, ROUTINE)?;
    for &v in &bandtab {
        let velo = graph.velo(v);
        velotab.push(velo);
        bandload[parttab[v] as usize] += velo;
    }
    for d in 0..domnnbr {
        velotab.push((compload[d] - bandload[d]).max(0));
    }

    let band = Graph::build_raw(
        graph.baseval(),
        verttab,
        edgetab,
        Some(velotab),
        edlotab,
    );

    let mut bandpart = Vec::with_capacity(bandnbr);
    bandpart.extend(bandtab.iter().map(|&v| parttab[v]));
    bandpart.extend(0..domnnbr as i64);

    Ok(BandGraph {
        graph: band,
        orgtab: bandtab,
        vancnbr,
        domnnbr,
        parttab: bandpart,
    })
}
