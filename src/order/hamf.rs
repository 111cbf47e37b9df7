//! Halo approximate minimum fill.
//!
//! Quotient-graph minimum-degree ordering in the AMD family, with halo
//! awareness: halo vertices take part in degrees and element boundaries —
//! they stand for rows already eliminated across an enclosing separator —
//! but are never selected for elimination themselves.
//!
//! The quotient graph keeps, per live variable, its list of adjacent
//! variables and its list of *elements* (eliminated pivots); an element
//! keeps the boundary variables of its clique. Eliminating a pivot turns
//! it into an element whose boundary is its current reach set, absorbs the
//! elements it covered, and updates the approximate degrees of the
//! boundary. The degree is the classical upper bound: adjacent variables
//! plus the sizes of the adjacent element boundaries, without dedup across
//! elements.

use crate::halo::HaloGraph;

/// Result of one halo-AMF run.
pub struct HamfOrder {
    /// Anchors in elimination order (local indices).
    pub peritab: Vec<usize>,
    /// Reach-set size (diagonal included) of every pivot at elimination,
    /// indexed like `peritab`.
    pub colcnttab: Vec<i64>,
}

/// Order the anchor prefix of `hgraph`.
pub fn hamf_order(hgraph: &HaloGraph) -> HamfOrder {
    let graph = hgraph.graph();
    let vertnbr = graph.vertnbr();
    let vnohnbr = hgraph.vnohnbr();

    // Quotient graph state. Variables hold variable and element lists;
    // elements hold their boundary.
    let mut vartab: Vec<Vec<usize>> = (0..vertnbr)
        .map(|v| graph.neighbors(v).to_vec())
        .collect();
    let mut elemtab: Vec<Vec<usize>> = (0..vertnbr).map(|_| Vec::new()).collect();
    let mut boundtab: Vec<Vec<usize>> = (0..vertnbr).map(|_| Vec::new()).collect();
    let mut alive = vec![true; vertnbr];
    let mut degrtab: Vec<i64> = (0..vertnbr).map(|v| graph.degree(v) as i64).collect();

    let mut peritab = Vec::with_capacity(vnohnbr);
    let mut colcnttab = Vec::with_capacity(vnohnbr);

    for _ in 0..vnohnbr {
        // Minimum approximate degree among live anchors; ties fall to the
        // lowest index, keeping the ordering reproducible.
        let pivot = (0..vnohnbr)
            .filter(|&v| alive[v])
            .min_by_key(|&v| (degrtab[v], v))
            .expect("one live anchor per elimination step");

        // Reach set: adjacent variables plus the boundaries of adjacent
        // elements, minus the pivot itself.
        let mut reach: Vec<usize> = Vec::new();
        for &w in &vartab[pivot] {
            if alive[w] {
                reach.push(w);
            }
        }
        for &e in &elemtab[pivot] {
            for &w in &boundtab[e] {
                if alive[w] && w != pivot {
                    reach.push(w);
                }
            }
        }
        reach.sort_unstable();
        reach.dedup();

        alive[pivot] = false;
        peritab.push(pivot);
        colcnttab.push(reach.len() as i64 + 1);

        // The pivot becomes an element with the reach set as boundary; the
        // elements it covered are absorbed.
        let absorbed = std::mem::take(&mut elemtab[pivot]);
        boundtab[pivot] = reach.clone();
        for &w in &reach {
            // Drop the pivot and the absorbed elements from w, then attach
            // the new element.
            vartab[w].retain(|&x| x != pivot);
            elemtab[w].retain(|e| !absorbed.contains(e));
            elemtab[w].push(pivot);
            // Approximate external degree: variables still adjacent plus
            // element boundaries, pivot excluded.
            let mut degree = vartab[w].iter().filter(|&&x| alive[x]).count() as i64;
            for &e in &elemtab[w] {
                degree += boundtab[e].len() as i64 - 1;
            }
            degrtab[w] = degree;
        }
        for e in absorbed {
            boundtab[e].clear();
        }
    }

    HamfOrder {
        peritab,
        colcnttab,
    }
}
