//! Fiduccia–Mattheyses 2-way refinement.
//!
//! Classical hill climbing over frontier moves: vertices are drawn best
//! gain first, each vertex moves at most once per pass, negative-gain moves
//! are accepted while a move budget lasts, and the best state seen during
//! the pass is restored at its end. Passes repeat until the configured
//! count is reached or a pass brings no improvement.
//!
//! The gain structure is a lazily revalidated priority queue: popped
//! entries whose cached gain no longer matches are re-pushed with the fresh
//! value, which keeps the classical bucket discipline without maintaining
//! bucket lists under every neighbour update.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::bipart::BipartGraph;
use crate::config::{DblOption, IntOption};
use crate::context::Context;
use crate::metrics;

/// Run the refiner.
pub fn bipart_fm(ctx: &Context, bgraph: &mut BipartGraph<'_>) {
    let passnbr = ctx.values().int(IntOption::FmPassCount).max(1);
    let movemax = ctx.values().int(IntOption::FmMoveBudget).max(1);
    // The tolerance on `compload0dltmax` is padded so single vertices can
    // move through; kept states must meet the caller's actual goal.
    let dltgoal =
        (ctx.values().dbl(DblOption::ImbalanceRatio) * bgraph.compload0avg as f64) as i64;

    for _ in 0..passnbr {
        let commload0 = bgraph.commload;
        run_pass(bgraph, movemax, dltgoal);
        metrics::note_refine_pass();
        if bgraph.commload >= commload0 {
            break;
        }
    }
}

fn run_pass(bgraph: &mut BipartGraph<'_>, movemax: i64, dltgoal: i64) {
    let graph = bgraph.graph;
    let mut moved = vec![false; graph.vertnbr()];
    let mut heap: BinaryHeap<Reverse<(i64, usize)>> = BinaryHeap::new();
    for &v in &bgraph.fronttab {
        if bgraph.movable(v) {
            heap.push(Reverse((bgraph.move_gain(v), v)));
        }
    }

    let mut movelog: Vec<usize> = Vec::new();
    let mut bestlen = 0usize;
    let mut bestload = bgraph.commload;
    let startdlt = bgraph.compload0dlt().abs();
    let mut bestdlt = startdlt;
    let mut budget = movemax;

    while let Some(Reverse((gain, v))) = heap.pop() {
        if moved[v] {
            continue;
        }
        let fresh = bgraph.move_gain(v);
        if fresh != gain {
            heap.push(Reverse((fresh, v)));
            continue;
        }
        // Balance legality: stay within the tolerance, or get closer to it.
        let dlt = bgraph.compload0dlt();
        let velo = graph.velo(v);
        let dltnew = if bgraph.parttab[v] == 0 {
            dlt - velo
        } else {
            dlt + velo
        };
        if dltnew.abs() > bgraph.compload0dltmax && dltnew.abs() >= dlt.abs() {
            continue;
        }

        bgraph.flip(v);
        moved[v] = true;
        movelog.push(v);
        for e in graph.edge_range(v) {
            let w = graph.edge_target(e);
            if !moved[w] && bgraph.movable(w) {
                heap.push(Reverse((bgraph.move_gain(w), w)));
            }
        }

        let dltabs = bgraph.compload0dlt().abs();
        // A state only qualifies as best when its balance meets the goal
        // or improves on the pass start; cheap cuts that starve one side
        // must not survive the pass.
        let balance_ok = dltabs <= dltgoal || dltabs < startdlt;
        if balance_ok && (bgraph.commload, dltabs) < (bestload, bestdlt) {
            bestload = bgraph.commload;
            bestdlt = dltabs;
            bestlen = movelog.len();
            budget = movemax;
        } else {
            budget -= 1;
            if budget <= 0 {
                break;
            }
        }
    }

    // Restore the best state seen: undo the tail of the move log.
    for &v in movelog[bestlen..].iter().rev() {
        bgraph.flip(v);
    }
    bgraph.recompute();
}
