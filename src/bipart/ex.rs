//! Balance exactifier.
//!
//! Post-pass that walks the frontier of the overloaded side and moves the
//! vertices of least cost loss across, until the imbalance cannot be
//! reduced any further. Run after the hill climbers, it trades a minimal
//! amount of cut quality for the load balance the caller asked for.

use crate::bipart::BipartGraph;

/// Run the exactifier.
pub fn bipart_ex(bgraph: &mut BipartGraph<'_>) {
    let graph = bgraph.graph;
    let mut moves = graph.vertnbr(); // hard stop against cycling
    loop {
        let dlt = bgraph.compload0dlt();
        if dlt == 0 || moves == 0 {
            break;
        }
        let heavy = if dlt > 0 { 0u8 } else { 1u8 };
        // Least gain loss first, then smallest load, among frontier
        // vertices of the heavy side that actually reduce the imbalance.
        let mut best: Option<(i64, i64, usize)> = None;
        for &v in &bgraph.fronttab {
            if bgraph.parttab[v] != heavy || !bgraph.movable(v) {
                continue;
            }
            let velo = graph.velo(v);
            if (dlt.abs() - velo).abs() >= dlt.abs() {
                continue; // would not improve balance
            }
            let key = (bgraph.move_gain(v), velo, v);
            if best.is_none_or(|b| key < b) {
                best = Some(key);
            }
        }
        let Some((_, _, v)) = best else {
            break; // nothing on the frontier can help
        };
        bgraph.flip(v);
        bgraph.recompute(); // the frontier moved with the vertex
        moves -= 1;
    }
}
