//! Subgraph induction.
//!
//! Both entry points build the subgraph on a selected vertex set,
//! renumbering vertices densely and keeping an injective mapping back to
//! the parent (`orgtab`). Edges whose other endpoint is not selected are
//! dropped; loads are preserved.

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::metrics;

/// An induced subgraph plus the mapping back to its parent.
#[derive(Clone, Debug)]
pub struct InducedGraph {
    /// The induced graph, densely renumbered.
    pub graph: Graph,
    /// `orgtab[local]` is the parent index of induced vertex `local`.
    pub orgtab: Vec<usize>,
}

impl Graph {
    /// Induce the subgraph on `{v : parttab[v] == part}`.
    pub fn induce_part(&self, parttab: &[i64], part: i64) -> Result<InducedGraph> {
        const ROUTINE: &str = "Graph::induce_part";
        if parttab.len() != self.vertnbr() {
            return Err(
                Error::InvalidArgument("part array length mismatch".into()).report(ROUTINE)
            );
        }
        let list: Vec<usize> = (0..self.vertnbr())
            .filter(|&v| parttab[v] == part)
            .collect();
        self.induce_list(&list)
    }

    /// Induce the subgraph on an explicit vertex list. The list must hold
    /// distinct, in-range vertices; induced vertices are numbered in list
    /// order.
    pub fn induce_list(&self, list: &[usize]) -> Result<InducedGraph> {
        const ROUTINE: &str = "Graph::induce_list";
        let vertnbr = self.vertnbr();
        let mut localtab = metrics::alloc_vec(vertnbr, usize::MAX, ROUTINE)?;
        for (local, &v) in list.iter().enumerate() {
            if v >= vertnbr {
                return Err(
                    Error::InvalidArgument(format!("vertex {v} out of range")).report(ROUTINE)
                );
            }
            if localtab[v] != usize::MAX {
                return Err(
                    Error::InvalidArgument(format!("vertex {v} listed twice")).report(ROUTINE)
                );
            }
            localtab[v] = local;
        }

        let mut verttab = Vec::with_capacity(list.len() + 1);
        verttab.push(0usize);
        let mut edgetab = Vec::new();
        let mut edlotab = if self.has_edlo() { Some(Vec::new()) } else { None };
        for &v in list {
            for e in self.edge_range(v) {
                let w = self.edge_target(e);
                if localtab[w] == usize::MAX {
                    continue; // endpoint not selected
                }
                edgetab.push(localtab[w]);
                if let Some(edlo) = edlotab.as_mut() {
                    edlo.push(self.edlo(e));
                }
            }
            verttab.push(edgetab.len());
        }
        let velotab = if self.has_velo() {
            Some(list.iter().map(|&v| self.velo(v)).collect())
        } else {
            None
        };

        let graph = Graph::build(self.baseval(), verttab, edgetab, velotab, edlotab)?;
        Ok(InducedGraph {
            graph,
            orgtab: list.to_vec(),
        })
    }
}
