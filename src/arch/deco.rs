//! Decomposition-defined architecture.
//!
//! The machine is given extensionally: one weight per terminal and a full
//! terminal-to-terminal distance matrix. The domain hierarchy is a binary
//! decomposition tree computed at build time by recursive balanced
//! bisection of the weight list (the same greedy rule as the weighted
//! complete graph); distances between domains read the matrix at the
//! canonical terminals.

use crate::arch::ArchDom;
use crate::error::{Error, Result};

#[derive(Clone, Debug)]
struct DecoNode {
    /// Smallest terminal number covered (canonical number).
    termmin: i64,
    /// DFS leaf-rank interval covered by this node.
    rankmin: i64,
    ranknbr: i64,
    wght: i64,
    children: Option<(usize, usize)>,
}

/// Decomposition-defined architecture. See the module documentation.
#[derive(Clone, Debug)]
pub struct ArchDeco {
    termnbr: usize,
    wghttab: Vec<i64>,
    /// Row-major `termnbr * termnbr` distance matrix.
    disttab: Vec<i64>,
    nodes: Vec<DecoNode>,
    leaftab: Vec<usize>,
    root: usize,
}

fn dom(dom: &ArchDom) -> usize {
    match dom {
        ArchDom::Deco { idx } => *idx,
        _ => panic!("domain does not belong to a deco architecture"),
    }
}

impl ArchDeco {
    pub(crate) fn build(wghttab: &[i64], disttab: &[i64]) -> Result<ArchDeco> {
        const ROUTINE: &str = "ArchDeco::build";
        let termnbr = wghttab.len();
        if termnbr == 0 {
            return Err(Error::InvalidArgument("no terminals".into()).report(ROUTINE));
        }
        if wghttab.iter().any(|&w| w <= 0) {
            return Err(
                Error::InvalidArgument("terminal weights must be positive".into()).report(ROUTINE)
            );
        }
        if disttab.len() != termnbr * termnbr {
            return Err(Error::InvalidArgument(format!(
                "distance matrix must hold {} entries",
                termnbr * termnbr
            ))
            .report(ROUTINE));
        }
        for i in 0..termnbr {
            if disttab[i * termnbr + i] != 0 {
                return Err(
                    Error::InvalidArgument("distance matrix diagonal must be zero".into())
                        .report(ROUTINE),
                );
            }
            for j in 0..i {
                let d = disttab[i * termnbr + j];
                if d < 0 || d != disttab[j * termnbr + i] {
                    return Err(Error::InvalidArgument(
                        "distance matrix must be symmetric and non-negative".into(),
                    )
                    .report(ROUTINE));
                }
            }
        }

        let mut deco = ArchDeco {
            termnbr,
            wghttab: wghttab.to_vec(),
            disttab: disttab.to_vec(),
            nodes: Vec::new(),
            leaftab: vec![0; termnbr],
            root: 0,
        };
        // Heaviest-first index list for the greedy bisection.
        let mut terms: Vec<usize> = (0..termnbr).collect();
        terms.sort_by_key(|&t| (std::cmp::Reverse(wghttab[t]), t));
        let mut rank = 0i64;
        let root = deco.grow(&terms, &mut rank);
        deco.root = root;
        Ok(deco)
    }

    /// Build the subtree over `terms` (sorted by descending weight).
    fn grow(&mut self, terms: &[usize], rank: &mut i64) -> usize {
        if terms.len() == 1 {
            let idx = self.nodes.len();
            self.nodes.push(DecoNode {
                termmin: terms[0] as i64,
                rankmin: *rank,
                ranknbr: 1,
                wght: self.wghttab[terms[0]],
                children: None,
            });
            self.leaftab[*rank as usize] = idx;
            *rank += 1;
            return idx;
        }
        // Greedy balanced split: each terminal to the lighter side.
        let mut side0 = Vec::new();
        let mut side1 = Vec::new();
        let mut sum0 = 0i64;
        let mut sum1 = 0i64;
        for &t in terms {
            if sum0 <= sum1 {
                sum0 += self.wghttab[t];
                side0.push(t);
            } else {
                sum1 += self.wghttab[t];
                side1.push(t);
            }
        }
        let c0 = self.grow(&side0, rank);
        let c1 = self.grow(&side1, rank);
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
        self.nodes.push(DecoNode {
            termmin,
            rankmin,
            ranknbr,
            wght,
            children: Some((c0, c1)),
        });
        idx
    }

    /// Number of terminals.
    pub fn termnbr(&self) -> i64 {
        self.termnbr as i64
    }

    /// The terminal weights.
    pub(crate) fn wghts(&self) -> &[i64] {
        &self.wghttab
    }

    /// The distance matrix, row-major.
    pub(crate) fn dists(&self) -> &[i64] {
        &self.disttab
    }

    pub(crate) fn dom_frst(&self) -> ArchDom {
        ArchDom::Deco { idx: self.root }
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
        ArchDom::Deco { idx }
    }

    pub(crate) fn dom_size(&self, d: &ArchDom) -> i64 {
        self.nodes[dom(d)].ranknbr
    }

    pub(crate) fn dom_wght(&self, d: &ArchDom) -> i64 {
        self.nodes[dom(d)].wght
    }

    pub(crate) fn dom_dist(&self, d0: &ArchDom, d1: &ArchDom) -> i64 {
        let t0 = self.nodes[dom(d0)].termmin as usize;
        let t1 = self.nodes[dom(d1)].termmin as usize;
        self.disttab[t0 * self.termnbr + t1]
    }

    pub(crate) fn dom_bipart(&self, d: &ArchDom) -> Option<(ArchDom, ArchDom)> {
        self.nodes[dom(d)]
            .children
            .map(|(c0, c1)| (ArchDom::Deco { idx: c0 }, ArchDom::Deco { idx: c1 }))
    }

    pub(crate) fn dom_incl(&self, outer: &ArchDom, inner: &ArchDom) -> bool {
        let (no, ni) = (&self.nodes[dom(outer)], &self.nodes[dom(inner)]);
        ni.rankmin >= no.rankmin && ni.rankmin + ni.ranknbr <= no.rankmin + no.ranknbr
    }
}
