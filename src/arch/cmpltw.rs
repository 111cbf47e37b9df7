//! Weighted complete-graph architecture.
//!
//! Terminals carry strictly positive loads. At build time the load table is
//! pre-sorted recursively: terminals are sorted by load, then assigned from
//! the largest remaining into the lighter of two sub-intervals, and the
//! same split is applied to each half. The recursion persists in the array
//! layout, so every later domain bipartition is a cheap interval cut whose
//! two sides are near-optimally balanced.

use crate::arch::{Arch, ArchDom};
use crate::error::{Error, Result};

/// One terminal of the weighted table: load and original terminal number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CmpltwLoad {
    pub velo: i64,
    pub term: i64,
}

/// Weighted complete graph. See the module documentation.
#[derive(Clone, Debug)]
pub struct ArchCmpltw {
    velotab: Vec<CmpltwLoad>,
    velosum: i64,
}

fn dom(dom: &ArchDom) -> (i64, i64, i64) {
    match dom {
        ArchDom::Cmpltw { min, nbr, wght } => (*min, *nbr, *wght),
        _ => panic!("domain does not belong to a cmpltw architecture"),
    }
}

/// Recursive balanced greedy split of `velotab[beg..end]`, which is sorted
/// by ascending load. Scanning from the heaviest down, each terminal goes
/// to the lighter side; the two sides are then laid out contiguously and
/// split again.
fn presort(velotab: &mut [CmpltwLoad]) {
    if velotab.len() < 3 {
        return;
    }
    let mut side0 = Vec::with_capacity(velotab.len());
    let mut side1 = Vec::with_capacity(velotab.len());
    let mut sum0 = 0i64;
    let mut sum1 = 0i64;
    for &entry in velotab.iter().rev() {
        if sum0 <= sum1 {
            sum0 += entry.velo;
            side0.push(entry);
        } else {
            sum1 += entry.velo;
            side1.push(entry);
        }
    }
    // Heaviest side first so the first sub-domain keeps the canonical
    // number of the heaviest terminal.
    if sum0 < sum1 {
        std::mem::swap(&mut side0, &mut side1);
    }
    let nbr0 = side0.len();
    // Restore ascending order within each side before recursing.
    side0.reverse();
    side1.reverse();
    velotab[..nbr0].copy_from_slice(&side0);
    velotab[nbr0..].copy_from_slice(&side1);
    presort(&mut velotab[..nbr0]);
    presort(&mut velotab[nbr0..]);
}

impl ArchCmpltw {
    pub(crate) fn build(wghttab: &[i64]) -> Result<ArchCmpltw> {
        const ROUTINE: &str = "ArchCmpltw::build";
        if wghttab.is_empty() {
            return Err(Error::InvalidArgument("no terminal weights".into()).report(ROUTINE));
        }
        if wghttab.iter().any(|&w| w <= 0) {
            return Err(
                Error::InvalidArgument("terminal weights must be positive".into()).report(ROUTINE)
            );
        }
        let mut velotab: Vec<CmpltwLoad> = wghttab
            .iter()
            .enumerate()
            .map(|(term, &velo)| CmpltwLoad {
                velo,
                term: term as i64,
            })
            .collect();
        // Sort by both keys for a layout independent of sort stability.
        velotab.sort_by_key(|e| (e.velo, e.term));
        presort(&mut velotab);
        let velosum = wghttab.iter().sum();
        Ok(ArchCmpltw { velotab, velosum })
    }

    /// Number of terminals.
    pub fn termnbr(&self) -> i64 {
        self.velotab.len() as i64
    }

    pub(crate) fn dom_frst(&self) -> ArchDom {
        ArchDom::Cmpltw {
            min: 0,
            nbr: self.velotab.len() as i64,
            wght: self.velosum,
        }
    }

    pub(crate) fn dom_num(&self, d: &ArchDom) -> i64 {
        self.velotab[dom(d).0 as usize].term
    }

    pub(crate) fn dom_term(&self, num: i64) -> ArchDom {
        let idx = self
            .velotab
            .iter()
            .position(|e| e.term == num)
            .expect("terminal number validated by caller");
        ArchDom::Cmpltw {
            min: idx as i64,
            nbr: 1,
            wght: self.velotab[idx].velo,
        }
    }

    pub(crate) fn dom_size(&self, d: &ArchDom) -> i64 {
        dom(d).1
    }

    pub(crate) fn dom_wght(&self, d: &ArchDom) -> i64 {
        dom(d).2
    }

    pub(crate) fn dom_dist(&self, d0: &ArchDom, d1: &ArchDom) -> i64 {
        let (min0, nbr0, _) = dom(d0);
        let (min1, nbr1, _) = dom(d1);
        i64::from((min0, nbr0) != (min1, nbr1))
    }

    pub(crate) fn dom_bipart(&self, d: &ArchDom) -> Option<(ArchDom, ArchDom)> {
        let (min, nbr, wght) = dom(d);
        if nbr <= 1 {
            return None;
        }
        // The presorted layout guarantees a contiguous split; find it by
        // accumulating the lighter tail until it would pass half the load.
        let mut idx = min + nbr - 1;
        let mut wght1 = self.velotab[idx as usize].velo;
        let half = wght / 2;
        while idx > min + 1 {
            let tmp = wght1 + self.velotab[(idx - 1) as usize].velo;
            if tmp > half {
                break;
            }
            wght1 = tmp;
            idx -= 1;
        }
        Some((
            ArchDom::Cmpltw {
                min,
                nbr: idx - min,
                wght: wght - wght1,
            },
            ArchDom::Cmpltw {
                min: idx,
                nbr: min + nbr - idx,
                wght: wght1,
            },
        ))
    }

    pub(crate) fn dom_incl(&self, outer: &ArchDom, inner: &ArchDom) -> bool {
        let (omin, onbr, _) = dom(outer);
        let (imin, inbr, _) = dom(inner);
        imin >= omin && imin + inbr <= omin + onbr
    }

    pub(crate) fn coarsen_match(&self) -> Result<(Arch, Vec<[i64; 2]>)> {
        // Pair neighbours in the presorted layout, so paired terminals are
        // ones a recursive bipartition would separate last.
        let termnbr = self.velotab.len();
        let coarnbr = termnbr.div_ceil(2);
        let mut multtab = Vec::with_capacity(coarnbr);
        let mut wghttab = Vec::with_capacity(coarnbr);
        for c in 0..coarnbr {
            let i0 = 2 * c;
            let i1 = 2 * c + 1;
            if i1 < termnbr {
                multtab.push([self.velotab[i0].term, self.velotab[i1].term]);
                wghttab.push(self.velotab[i0].velo + self.velotab[i1].velo);
            } else {
                multtab.push([self.velotab[i0].term, -1]);
                wghttab.push(self.velotab[i0].velo);
            }
        }
        Ok((Arch::cmpltw(&wghttab)?, multtab))
    }

    /// The terminal weights in original terminal order, for saving.
    pub(crate) fn wghts_by_term(&self) -> Vec<i64> {
        let mut out = vec![0i64; self.velotab.len()];
        for e in &self.velotab {
            out[e.term as usize] = e.velo;
        }
        out
    }
}
