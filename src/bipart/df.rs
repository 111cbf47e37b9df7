//! Two-liquid diffusion refinement.
//!
//! The jug-of-the-Danaides model restricted to two liquids: one tap pours
//! part-0 liquid at one pseudo-peripheral extremity of the graph, an
//! antagonistic tap pours part-1 liquid at the opposite extremity, every
//! vertex leaks its own load per time step, and edges carry liquid from
//! fuller to emptier barrels with conductance proportional to the edge
//! load. Opposite liquids annihilate, so each barrel holds a signed
//! amount; after the configured number of steps the sign decides the side,
//! ties keeping the old one.
//!
//! Floating-point overflow on degenerate graphs shows up as NaN and aborts
//! the refiner, leaving the input state untouched; a result that worsens
//! cost or breaks the balance tolerance is likewise discarded.

use crate::bipart::BipartGraph;
use crate::config::IntOption;
use crate::context::Context;
use crate::metrics;

/// Run the refiner.
pub fn bipart_df(ctx: &Context, bgraph: &mut BipartGraph<'_>) {
    let graph = bgraph.graph;
    let vertnbr = graph.vertnbr();
    if vertnbr < 2 || bgraph.fronttab.is_empty() {
        return;
    }
    let passnbr = ctx.values().int(IntOption::DiffusionPassCount).max(1);

    // Taps sit at a pseudo-peripheral pair, so the two liquids meet in the
    // middle rather than at an arbitrary corner.
    let tap1 = far_vertex(bgraph, {
        let mut rng = ctx.rng();
        rng.next_index(vertnbr)
    });
    let tap0 = far_vertex(bgraph, tap1);

    // Conductance normalisation per vertex.
    let velstax: Vec<f64> = (0..vertnbr)
        .map(|v| {
            graph
                .edge_range(v)
                .map(|e| graph.edlo(e) as f64)
                .sum::<f64>()
                .max(1.0)
        })
        .collect();

    let pour0 = bgraph.compload0avg as f64;
    let pour1 = (graph.velosum() - bgraph.compload0avg) as f64;
    let mut old: Vec<f64> = bgraph
        .parttab
        .iter()
        .map(|&p| if p == 0 { 1.0 } else { -1.0 })
        .collect();
    let mut new = vec![0.0f64; vertnbr];

    for _ in 0..passnbr {
        for v in 0..vertnbr {
            // Gather what the neighbours push along their edges.
            let mut liquid: f64 = graph
                .edge_range(v)
                .map(|e| {
                    let w = graph.edge_target(e);
                    old[w] * graph.edlo(e) as f64 / velstax[w]
                })
                .sum();
            if v == tap0 {
                liquid += pour0;
            } else if v == tap1 {
                liquid -= pour1;
            }
            if !liquid.is_finite() {
                return; // overflow: abandon the refinement
            }
            // Leak the barrel by the vertex load; liquids annihilate, so
            // the leak applies to the magnitude.
            let velo = graph.velo(v) as f64;
            let kept = (liquid.abs() - velo).max(0.0);
            new[v] = kept.copysign(liquid);
        }
        std::mem::swap(&mut old, &mut new);
        metrics::note_refine_pass();
    }

    // Sign decides the side; a dry barrel keeps its old part.
    let saved = bgraph.parttab.clone();
    let savedload = bgraph.commload;
    let saveddlt = bgraph.compload0dlt().abs();
    let dltgoal =
        (ctx.values().dbl(crate::config::DblOption::ImbalanceRatio) * bgraph.compload0avg as f64)
            as i64;
    for v in 0..vertnbr {
        if !bgraph.movable(v) || old[v] == 0.0 {
            continue;
        }
        bgraph.parttab[v] = if old[v] > 0.0 { 0 } else { 1 };
    }
    bgraph.recompute();
    let dltabs = bgraph.compload0dlt().abs();
    if bgraph.commload > savedload || (dltabs > dltgoal && dltabs > saveddlt) {
        bgraph.parttab = saved;
        bgraph.recompute();
    }
}

/// Last vertex reached by a BFS from `start`.
fn far_vertex(bgraph: &BipartGraph<'_>, start: usize) -> usize {
    let graph = bgraph.graph;
    let mut seen = vec![false; graph.vertnbr()];
    let mut queue = std::collections::VecDeque::new();
    seen[start] = true;
    queue.push_back(start);
    let mut last = start;
    while let Some(v) = queue.pop_front() {
        last = v;
        for e in graph.edge_range(v) {
            let w = graph.edge_target(e);
            if !seen[w] {
                seen[w] = true;
                queue.push_back(w);
            }
        }
    }
    last
}
