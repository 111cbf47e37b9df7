//! Sub-architecture: a parent architecture restricted to a subset of its
//! terminals.
//!
//! The induced domain hierarchy is computed once at build time by replaying
//! the parent's recursive bipartition and pruning branches that contain no
//! retained terminal; branches with a single retained child collapse into
//! it. Distances and weights delegate to the parent, so a sub-architecture
//! of a mesh keeps mesh geometry, of a tree keeps link costs, and so on.

use crate::arch::{Arch, ArchDom};
use crate::error::{Error, Result};

#[derive(Clone, Debug)]
struct SubNode {
    /// Parent-architecture domain this node was carved from.
    pardom: ArchDom,
    /// Smallest sub-terminal number covered (canonical number).
    termmin: i64,
    /// DFS leaf-rank interval covered by this node.
    rankmin: i64,
    ranknbr: i64,
    /// Total parent weight of the retained terminals covered.
    wght: i64,
    children: Option<(usize, usize)>,
}

/// Induced architecture over retained parent terminals.
#[derive(Clone, Debug)]
pub struct ArchSub {
    parent: Box<Arch>,
    /// `termtab[s]` is the parent terminal number of sub terminal `s`.
    termtab: Vec<i64>,
    nodes: Vec<SubNode>,
    /// Node index of every leaf, by DFS rank.
    leaftab: Vec<usize>,
    root: usize,
}

fn dom(dom: &ArchDom) -> usize {
    match dom {
        ArchDom::Sub { idx } => *idx,
        _ => panic!("domain does not belong to a sub architecture"),
    }
}

impl ArchSub {
    pub(crate) fn build(parent: Arch, termtab: &[i64]) -> Result<ArchSub> {
        const ROUTINE: &str = "ArchSub::build";
        if termtab.is_empty() {
            return Err(Error::InvalidArgument("no retained terminals".into()).report(ROUTINE));
        }
        let mut seen = termtab.to_vec();
        seen.sort_unstable();
        if seen.windows(2).any(|w| w[0] == w[1]) {
            return Err(
                Error::InvalidArgument("retained terminal listed twice".into()).report(ROUTINE)
            );
        }
        // Parent terminal domains of every retained terminal, by sub number.
        let mut termdom = Vec::with_capacity(termtab.len());
        for &t in termtab {
            termdom.push(parent.dom_term(t)?);
        }

        let mut sub = ArchSub {
            parent: Box::new(parent),
            termtab: termtab.to_vec(),
            nodes: Vec::new(),
            leaftab: vec![0; termtab.len()],
            root: 0,
        };
        let all: Vec<usize> = (0..termtab.len()).collect();
        let top = sub.parent.first_domain();
        let root = sub.grow(top, &all, &termdom);
        sub.root = root;
        Ok(sub)
    }

    /// Recursively carve `pardom` along the parent's bipartition tree,
    /// keeping only the retained terminals in `inside` (sub numbers).
    fn grow(&mut self, pardom: ArchDom, inside: &[usize], termdom: &[ArchDom]) -> usize {
        if inside.len() == 1 {
            let s = inside[0];
            let rank = self
                .nodes
                .iter()
                .filter(|n| n.children.is_none())
                .count() as i64;
            let idx = self.nodes.len();
            self.nodes.push(SubNode {
                pardom: termdom[s].clone(),
                termmin: s as i64,
                rankmin: rank,
                ranknbr: 1,
                wght: self.parent.dom_wght(&termdom[s]),
                children: None,
            });
            self.leaftab[rank as usize] = idx;
            return idx;
        }
        // Split the parent domain until the retained terminals separate.
        let mut cur = pardom;
        loop {
            let (d0, d1) = self
                .parent
                .dom_bipart(&cur)
                .expect("several terminals left to separate");
            let in0: Vec<usize> = inside
                .iter()
                .copied()
                .filter(|&s| self.parent.dom_incl(&d0, &termdom[s]))
                .collect();
            if in0.is_empty() {
                cur = d1;
                continue;
            }
            if in0.len() == inside.len() {
                cur = d0;
                continue;
            }
            let in1: Vec<usize> = inside
                .iter()
                .copied()
                .filter(|&s| self.parent.dom_incl(&d1, &termdom[s]))
                .collect();
            let c0 = self.grow(d0, &in0, termdom);
            let c1 = self.grow(d1, &in1, termdom);
            let idx = self.nodes.len();
            let (termmin, rankmin, ranknbr, wght) = {
                let (n0, n1) = (&self.nodes[c0], &self.nodes[c1]);
                (
                    n0.termmin.min(n1.termmin),
                    n0.rankmin,
                    n0.ranknbr + n1.ranknbr,
                    n0.wght + n1.wght,
                )
            };
            self.nodes.push(SubNode {
                pardom: cur,
                termmin,
                rankmin,
                ranknbr,
                wght,
                children: Some((c0, c1)),
            });
            return idx;
        }
    }

    /// The wrapped parent architecture.
    pub fn parent(&self) -> &Arch {
        &self.parent
    }

    /// Parent terminal numbers of the retained terminals, by sub number.
    pub fn terms(&self) -> &[i64] {
        &self.termtab
    }

    pub(crate) fn dom_frst(&self) -> ArchDom {
        ArchDom::Sub { idx: self.root }
    }

    pub(crate) fn dom_num(&self, d: &ArchDom) -> i64 {
        self.nodes[dom(d)].termmin
    }

    pub(crate) fn dom_term(&self, num: i64) -> ArchDom {
        let idx = self
            .leaftab
            .iter()
            .copied()
            .find(|&n| self.nodes[n].termmin == num)
            .expect("terminal number validated by caller");
        ArchDom::Sub { idx }
    }

    pub(crate) fn dom_size(&self, d: &ArchDom) -> i64 {
        self.nodes[dom(d)].ranknbr
    }

    pub(crate) fn dom_wght(&self, d: &ArchDom) -> i64 {
        self.nodes[dom(d)].wght
    }

    pub(crate) fn dom_dist(&self, d0: &ArchDom, d1: &ArchDom) -> i64 {
        let (n0, n1) = (&self.nodes[dom(d0)], &self.nodes[dom(d1)]);
        self.parent.dom_dist(&n0.pardom, &n1.pardom)
    }

    pub(crate) fn dom_bipart(&self, d: &ArchDom) -> Option<(ArchDom, ArchDom)> {
        self.nodes[dom(d)]
            .children
            .map(|(c0, c1)| (ArchDom::Sub { idx: c0 }, ArchDom::Sub { idx: c1 }))
    }

    pub(crate) fn dom_incl(&self, outer: &ArchDom, inner: &ArchDom) -> bool {
        let (no, ni) = (&self.nodes[dom(outer)], &self.nodes[dom(inner)]);
        ni.rankmin >= no.rankmin && ni.rankmin + ni.ranknbr <= no.rankmin + no.ranknbr
    }
}
