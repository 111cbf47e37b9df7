//! Target-architecture algebra.
//!
//! An [`Arch`] abstracts the target topology as a hierarchy of *domains*,
//! each standing for a non-empty subset of processing elements. The mapper
//! only ever talks to an architecture through the capability set below:
//! first domain, bipartition, size, weight, distance, inclusion, canonical
//! numbering, plus the match operations used when the architecture itself
//! is coarsened.
//!
//! Variants are a tagged enum and every operation dispatches on the tag;
//! the variant count is small and branch-predictable, so no trait objects
//! are involved.
//!
//! # Example
//!
//! ```
//! use lodestone::Arch;
//!
//! let arch = Arch::mesh2(3, 2)?;
//! let top = arch.first_domain();
//! assert_eq!(arch.dom_size(&top), 6);
//! let (d0, d1) = arch.dom_bipart(&top).expect("splittable");
//! assert!(arch.dom_incl(&top, &d0) && arch.dom_incl(&top, &d1));
//! # Ok::<(), lodestone::Error>(())
//! ```

pub mod cmplt;
pub mod cmpltw;
pub mod deco;
pub mod hcub;
pub mod mesh;
pub mod sub;
pub mod tleaf;

use crate::error::{Error, Result};

pub use cmplt::ArchCmplt;
pub use cmpltw::ArchCmpltw;
pub use deco::ArchDeco;
pub use hcub::ArchHcub;
pub use mesh::{ArchMesh, ArchTorus};
pub use sub::ArchSub;
pub use tleaf::ArchTleaf;

/// A target architecture. See the module documentation.
#[derive(Clone, Debug)]
pub enum Arch {
    /// Complete graph: all terminals at unit distance.
    Cmplt(ArchCmplt),
    /// Complete graph with per-terminal weights.
    Cmpltw(ArchCmpltw),
    /// Binary hypercube of a given dimension.
    Hcub(ArchHcub),
    /// d-dimensional mesh, L1 distance.
    Mesh(ArchMesh),
    /// d-dimensional torus, wrap-around L1 distance.
    Torus(ArchTorus),
    /// Tree-leaf hierarchy with per-level link costs.
    Tleaf(ArchTleaf),
    /// Induced architecture over a subset of a parent's terminals.
    Sub(ArchSub),
    /// Decomposition-defined: explicit terminal weights and distances.
    Deco(ArchDeco),
}

/// A domain of some architecture. Only meaningful together with the
/// architecture that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArchDom {
    /// Interval of terminals.
    Cmplt { min: i64, nbr: i64 },
    /// Interval into the presorted weight table, with its load sum.
    Cmpltw { min: i64, nbr: i64, wght: i64 },
    /// Bit-pattern prefix: `depth` fixed low-order bits.
    Hcub { depth: u32, bits: i64 },
    /// Per-dimension index intervals.
    Mesh { min: Vec<i64>, nbr: Vec<i64> },
    /// Per-dimension index intervals with wrap-around distance.
    Torus { min: Vec<i64>, nbr: Vec<i64> },
    /// Interval of tree nodes at one level.
    Tleaf { lvl: usize, min: i64, nbr: i64 },
    /// Node of the induced decomposition tree.
    Sub { idx: usize },
    /// Node of the decomposition tree.
    Deco { idx: usize },
}

impl Arch {
    /// The unique top domain covering the whole machine.
    pub fn first_domain(&self) -> ArchDom {
        match self {
            Arch::Cmplt(a) => a.dom_frst(),
            Arch::Cmpltw(a) => a.dom_frst(),
            Arch::Hcub(a) => a.dom_frst(),
            Arch::Mesh(a) => a.dom_frst(),
            Arch::Torus(a) => a.dom_frst(),
            Arch::Tleaf(a) => a.dom_frst(),
            Arch::Sub(a) => a.dom_frst(),
            Arch::Deco(a) => a.dom_frst(),
        }
    }

    /// Number of terminals of the whole machine.
    pub fn term_nbr(&self) -> i64 {
        self.dom_size(&self.first_domain())
    }

    /// Canonical number of the smallest terminal inside `dom`.
    pub fn dom_num(&self, dom: &ArchDom) -> i64 {
        match (self, dom) {
            (Arch::Cmplt(a), d) => a.dom_num(d),
            (Arch::Cmpltw(a), d) => a.dom_num(d),
            (Arch::Hcub(a), d) => a.dom_num(d),
            (Arch::Mesh(a), d) => a.dom_num(d),
            (Arch::Torus(a), d) => a.dom_num(d),
            (Arch::Tleaf(a), d) => a.dom_num(d),
            (Arch::Sub(a), d) => a.dom_num(d),
            (Arch::Deco(a), d) => a.dom_num(d),
        }
    }

    /// The terminal domain with canonical number `num`.
    pub fn dom_term(&self, num: i64) -> Result<ArchDom> {
        if num < 0 || num >= self.term_nbr() {
            return Err(Error::InvalidArgument(format!("terminal {num} out of range"))
                .report("Arch::dom_term"));
        }
        Ok(match self {
            Arch::Cmplt(a) => a.dom_term(num),
            Arch::Cmpltw(a) => a.dom_term(num),
            Arch::Hcub(a) => a.dom_term(num),
            Arch::Mesh(a) => a.dom_term(num),
            Arch::Torus(a) => a.dom_term(num),
            Arch::Tleaf(a) => a.dom_term(num),
            Arch::Sub(a) => a.dom_term(num),
            Arch::Deco(a) => a.dom_term(num),
        })
    }

    /// Number of terminals inside `dom`.
    pub fn dom_size(&self, dom: &ArchDom) -> i64 {
        match (self, dom) {
            (Arch::Cmplt(a), d) => a.dom_size(d),
            (Arch::Cmpltw(a), d) => a.dom_size(d),
            (Arch::Hcub(a), d) => a.dom_size(d),
            (Arch::Mesh(a), d) => a.dom_size(d),
            (Arch::Torus(a), d) => a.dom_size(d),
            (Arch::Tleaf(a), d) => a.dom_size(d),
            (Arch::Sub(a), d) => a.dom_size(d),
            (Arch::Deco(a), d) => a.dom_size(d),
        }
    }

    /// Load capacity of `dom`. Equals [`Self::dom_size`] for unweighted
    /// variants.
    pub fn dom_wght(&self, dom: &ArchDom) -> i64 {
        match (self, dom) {
            (Arch::Cmplt(a), d) => a.dom_size(d),
            (Arch::Cmpltw(a), d) => a.dom_wght(d),
            (Arch::Hcub(a), d) => a.dom_size(d),
            (Arch::Mesh(a), d) => a.dom_size(d),
            (Arch::Torus(a), d) => a.dom_size(d),
            (Arch::Tleaf(a), d) => a.dom_size(d),
            (Arch::Sub(a), d) => a.dom_wght(d),
            (Arch::Deco(a), d) => a.dom_wght(d),
        }
    }

    /// Traversal cost of a unit of traffic between two domains. Zero for a
    /// domain against itself, non-negative, symmetric.
    pub fn dom_dist(&self, dom0: &ArchDom, dom1: &ArchDom) -> i64 {
        match self {
            Arch::Cmplt(a) => a.dom_dist(dom0, dom1),
            Arch::Cmpltw(a) => a.dom_dist(dom0, dom1),
            Arch::Hcub(a) => a.dom_dist(dom0, dom1),
            Arch::Mesh(a) => a.dom_dist(dom0, dom1),
            Arch::Torus(a) => a.dom_dist(dom0, dom1),
            Arch::Tleaf(a) => a.dom_dist(dom0, dom1),
            Arch::Sub(a) => a.dom_dist(dom0, dom1),
            Arch::Deco(a) => a.dom_dist(dom0, dom1),
        }
    }

    /// Split `dom` into two non-empty disjoint sub-domains covering it.
    /// Returns `None` when `dom` is a terminal (leaf) domain. The first
    /// sub-domain keeps the canonical number of `dom`.
    pub fn dom_bipart(&self, dom: &ArchDom) -> Option<(ArchDom, ArchDom)> {
        match self {
            Arch::Cmplt(a) => a.dom_bipart(dom),
            Arch::Cmpltw(a) => a.dom_bipart(dom),
            Arch::Hcub(a) => a.dom_bipart(dom),
            Arch::Mesh(a) => a.dom_bipart(dom),
            Arch::Torus(a) => a.dom_bipart(dom),
            Arch::Tleaf(a) => a.dom_bipart(dom),
            Arch::Sub(a) => a.dom_bipart(dom),
            Arch::Deco(a) => a.dom_bipart(dom),
        }
    }

    /// True when `inner` is included in (or equal to) `outer`.
    pub fn dom_incl(&self, outer: &ArchDom, inner: &ArchDom) -> bool {
        match self {
            Arch::Cmplt(a) => a.dom_incl(outer, inner),
            Arch::Cmpltw(a) => a.dom_incl(outer, inner),
            Arch::Hcub(a) => a.dom_incl(outer, inner),
            Arch::Mesh(a) => a.dom_incl(outer, inner),
            Arch::Torus(a) => a.dom_incl(outer, inner),
            Arch::Tleaf(a) => a.dom_incl(outer, inner),
            Arch::Sub(a) => a.dom_incl(outer, inner),
            Arch::Deco(a) => a.dom_incl(outer, inner),
        }
    }

    /// True when distances are 0/1 only, letting the engine collapse
    /// distance computations to a plain cut count.
    pub fn is_part(&self) -> bool {
        matches!(self, Arch::Cmplt(_) | Arch::Cmpltw(_))
            || matches!(self, Arch::Sub(a) if a.parent().is_part())
    }

    /// True when sub-domains may have any size. No built-in variant is
    /// variable-sized; the flag is part of the capability surface and is
    /// checked by algorithms that require fixed sizes.
    pub fn is_variable(&self) -> bool {
        match self {
            Arch::Sub(a) => a.parent().is_variable(),
            _ => false,
        }
    }

    /// Pair up the machine's terminals for architecture coarsening.
    /// Returns the coarsened architecture and the multinode table:
    /// `multtab[c]` holds the (up to two, -1 for none) fine terminals of
    /// coarse terminal `c`.
    ///
    /// Supported for the complete, weighted complete, hypercube and
    /// tree-leaf variants; others return [`Error::UnsupportedConfig`].
    pub fn coarsen_match(&self) -> Result<(Arch, Vec<[i64; 2]>)> {
        const ROUTINE: &str = "Arch::coarsen_match";
        match self {
            Arch::Cmplt(a) => a.coarsen_match(),
            Arch::Cmpltw(a) => a.coarsen_match(),
            Arch::Hcub(a) => a.coarsen_match(),
            Arch::Tleaf(a) => a.coarsen_match(),
            _ => Err(Error::UnsupportedConfig(
                "architecture variant cannot be match-coarsened".into(),
            )
            .report(ROUTINE)),
        }
    }

    // Convenience constructors, named after the original's type keywords.

    /// Complete graph on `nbr` terminals.
    pub fn cmplt(nbr: i64) -> Result<Arch> {
        Ok(Arch::Cmplt(ArchCmplt::build(nbr)?))
    }

    /// Weighted complete graph; one strictly positive load per terminal.
    pub fn cmpltw(wghttab: &[i64]) -> Result<Arch> {
        Ok(Arch::Cmpltw(ArchCmpltw::build(wghttab)?))
    }

    /// Binary hypercube of dimension `dim`.
    pub fn hcub(dim: u32) -> Result<Arch> {
        Ok(Arch::Hcub(ArchHcub::build(dim)?))
    }

    /// Two-dimensional mesh.
    pub fn mesh2(x: i64, y: i64) -> Result<Arch> {
        Ok(Arch::Mesh(ArchMesh::build(&[x, y])?))
    }

    /// Three-dimensional mesh.
    pub fn mesh3(x: i64, y: i64, z: i64) -> Result<Arch> {
        Ok(Arch::Mesh(ArchMesh::build(&[x, y, z])?))
    }

    /// Mesh of arbitrary dimension.
    pub fn mesh(dimtab: &[i64]) -> Result<Arch> {
        Ok(Arch::Mesh(ArchMesh::build(dimtab)?))
    }

    /// Torus of arbitrary dimension.
    pub fn torus(dimtab: &[i64]) -> Result<Arch> {
        Ok(Arch::Torus(ArchTorus::build(dimtab)?))
    }

    /// Tree-leaf hierarchy: per-level fan-outs and link costs.
    pub fn tleaf(sizetab: &[i64], linktab: &[i64]) -> Result<Arch> {
        Ok(Arch::Tleaf(ArchTleaf::build(sizetab, linktab)?))
    }

    /// Sub-architecture of `parent` on the given parent terminal numbers.
    pub fn sub(parent: Arch, termtab: &[i64]) -> Result<Arch> {
        Ok(Arch::Sub(ArchSub::build(parent, termtab)?))
    }

    /// Decomposition-defined architecture: terminal weights and a full
    /// terminal-to-terminal distance matrix (row-major, `n * n`).
    pub fn deco(wghttab: &[i64], disttab: &[i64]) -> Result<Arch> {
        Ok(Arch::Deco(ArchDeco::build(wghttab, disttab)?))
    }
}
