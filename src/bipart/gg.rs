//! Greedy graph-growing initial bipartition.
//!
//! Part 0 grows from a pseudo-peripheral seed, absorbing at every step the
//! frontier vertex whose move costs least, until it reaches its target
//! load. Two growing attempts from independently drawn seeds are made and
//! the better final state (cost first, then balance) is kept.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::bipart::BipartGraph;
use crate::context::Context;

const TRY_NBR: usize = 2;

/// Run the grower. Pinned vertices keep their side; only free vertices
/// take part in the growth.
pub fn bipart_gg(ctx: &Context, bgraph: &mut BipartGraph<'_>) {
    let graph = bgraph.graph;
    let vertnbr = graph.vertnbr();
    if vertnbr == 0 {
        return;
    }

    let mut best: Option<(i64, i64, Vec<u8>)> = None;
    for _ in 0..TRY_NBR {
        let mut seed = pseudo_peripheral(ctx, bgraph);
        if !bgraph.movable(seed) {
            match (0..vertnbr).find(|&v| bgraph.movable(v)) {
                Some(free) => seed = free,
                None => return, // everything pinned: nothing to grow
            }
        }

        // Everything free starts in part 1; the seed side grows back.
        for v in 0..vertnbr {
            if bgraph.movable(v) {
                bgraph.parttab[v] = 1;
            }
        }
        bgraph.recompute();

        let mut heap: BinaryHeap<Reverse<(i64, usize)>> = BinaryHeap::new();
        if bgraph.movable(seed) {
            heap.push(Reverse((bgraph.move_gain(seed), seed)));
        }
        while bgraph.compload0 < bgraph.compload0avg {
            // Lazy heap: entries with stale gains are re-pushed.
            let Some(Reverse((gain, v))) = heap.pop() else {
                break; // component exhausted: restart from a fresh seed
            };
            if bgraph.parttab[v] == 0 {
                continue;
            }
            let current = bgraph.move_gain(v);
            if current != gain {
                heap.push(Reverse((current, v)));
                continue;
            }
            bgraph.flip(v);
            for e in graph.edge_range(v) {
                let w = graph.edge_target(e);
                if bgraph.parttab[w] == 1 && bgraph.movable(w) {
                    heap.push(Reverse((bgraph.move_gain(w), w)));
                }
            }
            if heap.is_empty() && bgraph.compload0 < bgraph.compload0avg {
                // Disconnected graph: seed the next component.
                if let Some(next) = (0..vertnbr)
                    .find(|&w| bgraph.parttab[w] == 1 && bgraph.movable(w))
                {
                    heap.push(Reverse((bgraph.move_gain(next), next)));
                }
            }
        }
        bgraph.recompute();

        let key = (bgraph.commload, bgraph.compload0dlt().abs());
        if best
            .as_ref()
            .is_none_or(|(c, d, _)| key < (*c, *d))
        {
            best = Some((key.0, key.1, bgraph.parttab.clone()));
        }
    }

    if let Some((_, _, parttab)) = best {
        bgraph.parttab = parttab;
        bgraph.recompute();
    }
}

/// Double BFS sweep: start anywhere, run to the farthest vertex, and run
/// again; the last vertex reached is a good growing seed.
fn pseudo_peripheral(ctx: &Context, bgraph: &BipartGraph<'_>) -> usize {
    let graph = bgraph.graph;
    let vertnbr = graph.vertnbr();
    let start = {
        let mut rng = ctx.rng();
        rng.next_index(vertnbr)
    };
    let far = bfs_farthest(bgraph, start);
    bfs_farthest(bgraph, far)
}

fn bfs_farthest(bgraph: &BipartGraph<'_>, start: usize) -> usize {
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
