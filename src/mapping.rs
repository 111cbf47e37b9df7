//! Mapping of a graph onto the domains of a target architecture.
//!
//! A [`Mapping`] binds a part array (`parttab[v]` indexes the live-domain
//! table, or is `-1` when incomplete mappings are allowed) to a dense table
//! of live [`ArchDom`] entries. Splitting a live domain allocates a new
//! slot and bipartitions the architecture domain; merging folds one slot
//! into another and compacts the table. Part labels handed to users are the
//! canonical terminal numbers of the live domains, not the slot indices.
//!
//! # Example
//!
//! ```
//! use lodestone::{Arch, Graph, Mapping};
//!
//! let g = Graph::build(0, vec![0, 1, 2], vec![1, 0], None, None)?;
//! let arch = Arch::cmplt(2)?;
//! let mut m = Mapping::init(&g, arch, None)?;
//! let (i, j) = m.split(0)?.expect("two terminals to split");
//! m.set_part(1, j as i64);
//! m.check(&g)?;
//! # Ok::<(), lodestone::Error>(())
//! ```

use crate::arch::{Arch, ArchDom};
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::metrics;

/// Minimum live-domain capacity.
const DOMN_MIN: usize = 16;

/// A graph-to-architecture association. See the module documentation.
#[derive(Clone, Debug)]
pub struct Mapping {
    arch: Arch,
    rootdom: ArchDom,
    parttab: Vec<i64>,
    domntab: Vec<ArchDom>,
    domnmax: usize,
    allow_incomplete: bool,
    fixtab: Option<Vec<i64>>,
}

/// Aggregate view of a mapping, as computed by [`Mapping::view`].
#[derive(Clone, Debug, PartialEq)]
pub struct MappingView {
    /// Target weight of every live domain.
    pub domnwght: Vec<i64>,
    /// Realised load of every live domain.
    pub compload: Vec<i64>,
    /// Number of cut edges (each counted once).
    pub edge_cut: i64,
    /// Distance-weighted communication load (each edge counted once).
    pub comm_load: i64,
}

impl Mapping {
    /// Create a mapping with every vertex in slot 0, seeded with
    /// `rootdom` (or the architecture's first domain).
    pub fn init(graph: &Graph, arch: Arch, rootdom: Option<ArchDom>) -> Result<Mapping> {
        const ROUTINE: &str = "Mapping::init";
        let rootdom = rootdom.unwrap_or_else(|| arch.first_domain());
        if !arch.dom_incl(&arch.first_domain(), &rootdom) {
            return Err(
                Error::InvalidArgument("root domain outside the architecture".into())
                    .report(ROUTINE),
            );
        }
        let parttab = metrics::alloc_vec(graph.vertnbr(), 0i64, ROUTINE)?;
        let mut domntab = Vec::with_capacity(DOMN_MIN);
        domntab.push(rootdom.clone());
        Ok(Mapping {
            arch,
            rootdom,
            parttab,
            domntab,
            domnmax: DOMN_MIN,
            allow_incomplete: false,
            fixtab: None,
        })
    }

    /// Allow `parttab` entries of `-1` (not yet mapped).
    pub fn set_allow_incomplete(&mut self, allow: bool) {
        self.allow_incomplete = allow;
    }

    /// Pin vertices to terminals: `fixtab[v]` is a terminal number, or `-1`
    /// for a free vertex.
    pub fn set_fixed(&mut self, fixtab: Vec<i64>) -> Result<()> {
        if fixtab.len() != self.parttab.len() {
            return Err(Error::InvalidArgument("fixed array length mismatch".into())
                .report("Mapping::set_fixed"));
        }
        self.fixtab = Some(fixtab);
        Ok(())
    }

    /// The bound architecture.
    pub fn arch(&self) -> &Arch {
        &self.arch
    }

    /// The domain the whole mapping lives in.
    pub fn rootdom(&self) -> &ArchDom {
        &self.rootdom
    }

    /// The fixed-terminal array, if any.
    pub fn fixed(&self) -> Option<&[i64]> {
        self.fixtab.as_deref()
    }

    /// Number of live domains.
    pub fn domnnbr(&self) -> usize {
        self.domntab.len()
    }

    /// A live domain by slot index.
    pub fn domain(&self, slot: usize) -> &ArchDom {
        &self.domntab[slot]
    }

    /// The live-domain table.
    pub fn domains(&self) -> &[ArchDom] {
        &self.domntab
    }

    /// The slot of vertex `v` (`-1` when unmapped).
    #[inline]
    pub fn part(&self, v: usize) -> i64 {
        self.parttab[v]
    }

    /// The part array.
    pub fn parts(&self) -> &[i64] {
        &self.parttab
    }

    /// Assign vertex `v` to slot `slot`. Callers keep slot validity.
    #[inline]
    pub fn set_part(&mut self, v: usize, slot: i64) {
        self.parttab[v] = slot;
    }

    /// Mutable access for refiners writing back whole part arrays.
    pub(crate) fn parts_mut(&mut self) -> &mut [i64] {
        &mut self.parttab
    }

    /// The canonical terminal number of the domain of `v`, which is the
    /// part label exposed to users. `-1` when unmapped.
    pub fn term_num(&self, v: usize) -> i64 {
        let slot = self.parttab[v];
        if slot < 0 {
            -1
        } else {
            self.arch.dom_num(&self.domntab[slot as usize])
        }
    }

    /// Grow the live-domain capacity: ×1.5 with a floor of 16 slots.
    fn grow(&mut self) {
        if self.domntab.len() == self.domnmax {
            self.domnmax = (self.domnmax + self.domnmax / 2).max(DOMN_MIN);
            self.domntab.reserve(self.domnmax - self.domntab.len());
        }
    }

    /// Split live domain `slot` through the architecture. Returns the two
    /// slot indices, the second freshly allocated, or `None` when the
    /// domain is a terminal. `parttab` entries are not touched.
    pub fn split(&mut self, slot: usize) -> Result<Option<(usize, usize)>> {
        if slot >= self.domntab.len() {
            return Err(Error::InvalidArgument(format!("no live domain in slot {slot}"))
                .report("Mapping::split"));
        }
        let Some((dom0, dom1)) = self.arch.dom_bipart(&self.domntab[slot]) else {
            return Ok(None);
        };
        self.grow();
        self.domntab[slot] = dom0;
        self.domntab.push(dom1);
        Ok(Some((slot, self.domntab.len() - 1)))
    }

    /// Merge two live domains. The lower slot survives, holding the
    /// smallest common enclosing domain; vertices of the removed slot move
    /// over and the table is compacted.
    pub fn merge(&mut self, slot0: usize, slot1: usize) -> Result<()> {
        const ROUTINE: &str = "Mapping::merge";
        let domnnbr = self.domntab.len();
        if slot0 >= domnnbr || slot1 >= domnnbr || slot0 == slot1 {
            return Err(Error::InvalidArgument(format!("cannot merge slots {slot0} and {slot1}"))
                .report(ROUTINE));
        }
        // The lower slot survives, so compaction never moves it.
        let (slot0, slot1) = if slot0 < slot1 {
            (slot0, slot1)
        } else {
            (slot1, slot0)
        };
        // Enclosing domain: walk up from the root by bipartition until the
        // two domains separate.
        let merged = self.enclosing(&self.domntab[slot0], &self.domntab[slot1]);
        self.domntab[slot0] = merged;
        let last = domnnbr - 1;
        self.domntab.swap_remove(slot1);
        for part in &mut self.parttab {
            if *part == slot1 as i64 {
                *part = slot0 as i64;
            } else if *part == last as i64 {
                *part = slot1 as i64; // compaction moved the last slot here
            }
        }
        Ok(())
    }

    /// Smallest domain of the bipartition tree containing both arguments.
    fn enclosing(&self, dom0: &ArchDom, dom1: &ArchDom) -> ArchDom {
        let mut cur = self.rootdom.clone();
        loop {
            let Some((c0, c1)) = self.arch.dom_bipart(&cur) else {
                return cur;
            };
            if self.arch.dom_incl(&c0, dom0) && self.arch.dom_incl(&c0, dom1) {
                cur = c0;
            } else if self.arch.dom_incl(&c1, dom0) && self.arch.dom_incl(&c1, dom1) {
                cur = c1;
            } else {
                return cur;
            }
        }
    }

    /// Restore a snapshot taken before a failed engine call: splits are
    /// undone by putting back the saved live-domain table, assignments by
    /// putting back the saved part array.
    pub(crate) fn rollback(&mut self, domntab: Vec<ArchDom>, parttab: Vec<i64>) {
        self.domntab = domntab;
        self.parttab = parttab;
    }

    /// Aggregate loads and costs.
    pub fn view(&self, graph: &Graph) -> MappingView {
        let domnnbr = self.domntab.len();
        let domnwght = self.domntab.iter().map(|d| self.arch.dom_wght(d)).collect();
        let mut compload = vec![0i64; domnnbr];
        for v in 0..graph.vertnbr() {
            let slot = self.parttab[v];
            if slot >= 0 {
                compload[slot as usize] += graph.velo(v);
            }
        }
        let mut edge_cut = 0i64;
        let mut comm_load = 0i64;
        for v in 0..graph.vertnbr() {
            let slot0 = self.parttab[v];
            if slot0 < 0 {
                continue;
            }
            for e in graph.edge_range(v) {
                let w = graph.edge_target(e);
                if w <= v {
                    continue; // count each edge once
                }
                let slot1 = self.parttab[w];
                if slot1 < 0 || slot0 == slot1 {
                    continue;
                }
                edge_cut += 1;
                comm_load += graph.edlo(e)
                    * self
                        .arch
                        .dom_dist(&self.domntab[slot0 as usize], &self.domntab[slot1 as usize]);
            }
        }
        MappingView {
            domnwght,
            compload,
            edge_cut,
            comm_load,
        }
    }

    /// Distance-weighted communication load, each edge counted once.
    pub fn comm_load(&self, graph: &Graph) -> i64 {
        self.view(graph).comm_load
    }

    /// Consistency check: slots in range, every live domain included in the
    /// root domain, fixed-vertex constraints honoured, completeness unless
    /// waived. Returns [`Error::InconsistentState`] on violation.
    pub fn check(&self, graph: &Graph) -> Result<()> {
        const ROUTINE: &str = "Mapping::check";
        let fail = |msg: String| Err(Error::InconsistentState(msg).report(ROUTINE));
        if self.parttab.len() != graph.vertnbr() {
            return fail("part array length mismatch".into());
        }
        let domnnbr = self.domntab.len() as i64;
        for dom in &self.domntab {
            if !self.arch.dom_incl(&self.rootdom, dom) {
                return fail("live domain outside the root domain".into());
            }
        }
        for (v, &slot) in self.parttab.iter().enumerate() {
            if slot < 0 {
                if !self.allow_incomplete {
                    return fail(format!("vertex {v} is unmapped"));
                }
                continue;
            }
            if slot >= domnnbr {
                return fail(format!("vertex {v} mapped to dead slot {slot}"));
            }
            if let Some(fixtab) = &self.fixtab {
                let fixed = fixtab[v];
                if fixed >= 0 && self.arch.dom_num(&self.domntab[slot as usize]) != fixed {
                    return fail(format!("fixed vertex {v} strayed from terminal {fixed}"));
                }
            }
        }
        Ok(())
    }
}
