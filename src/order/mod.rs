//! Fill-reducing ordering engine.
//!
//! Orders the vertices of a (halo) graph for sparse factorization: nested
//! dissection down to a size cutoff, then halo approximate minimum fill on
//! the remaining blocks. The result carries the permutation, its inverse,
//! the separator tree, and per-column counts for direct solvers.

pub mod hamf;
pub mod nd;

pub use nd::{order_graph, order_halo};

/// Kind of a separator-tree node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CblkKind {
    /// Internal node: two recursed halves and a separator child.
    Nested,
    /// Block ordered by halo approximate minimum fill.
    Leaf,
    /// Separator block, ordered after both halves.
    Separator,
}

/// A node of the separator tree.
#[derive(Clone, Debug)]
pub struct OrderCblk {
    /// Parent node index, `-1` at the root.
    pub parent: i64,
    /// Node kind.
    pub kind: CblkKind,
    /// First position of the block in the permutation.
    pub ordenum: usize,
    /// Number of vertices in the block (subtree included for `Nested`).
    pub vnodnbr: usize,
}

/// An elimination ordering. See the module documentation.
#[derive(Clone, Debug)]
pub struct Ordering {
    /// `permtab[v]` is the elimination rank of vertex `v`.
    pub permtab: Vec<usize>,
    /// Inverse permutation: `peritab[r]` is the vertex eliminated at rank
    /// `r`.
    pub peritab: Vec<usize>,
    /// Separator tree, root first.
    pub cblktab: Vec<OrderCblk>,
    /// Per-column nonzero counts of the permuted matrix (diagonal
    /// included), indexed by elimination rank.
    pub colcnttab: Vec<i64>,
}

impl Ordering {
    /// Number of ordered vertices.
    pub fn vertnbr(&self) -> usize {
        self.permtab.len()
    }
}
