//! Tree-leaf architecture.
//!
//! The machine is a balanced tree: `sizetab[l]` children under every node
//! of level `l`, terminals at the bottom, and `linktab[l]` the cost of the
//! links joining level `l` to level `l + 1`. A domain is an interval of
//! nodes at one level; the distance between two domains is the cost of the
//! topmost link a message between them has to cross.

use crate::arch::{Arch, ArchDom};
use crate::error::{Error, Result};

/// Tree-leaf hierarchy. See the module documentation.
#[derive(Clone, Debug)]
pub struct ArchTleaf {
    sizetab: Vec<i64>,
    linktab: Vec<i64>,
}

fn dom(dom: &ArchDom) -> (usize, i64, i64) {
    match dom {
        ArchDom::Tleaf { lvl, min, nbr } => (*lvl, *min, *nbr),
        _ => panic!("domain does not belong to a tleaf architecture"),
    }
}

impl ArchTleaf {
    pub(crate) fn build(sizetab: &[i64], linktab: &[i64]) -> Result<ArchTleaf> {
        const ROUTINE: &str = "ArchTleaf::build";
        if sizetab.is_empty() || sizetab.len() != linktab.len() {
            return Err(
                Error::InvalidArgument("level and link tables must match".into()).report(ROUTINE)
            );
        }
        if sizetab.iter().any(|&s| s < 2) {
            return Err(
                Error::InvalidArgument("level fan-outs must be at least 2".into()).report(ROUTINE)
            );
        }
        if linktab.iter().any(|&c| c < 1) {
            return Err(
                Error::InvalidArgument("link costs must be positive".into()).report(ROUTINE)
            );
        }
        Ok(ArchTleaf {
            sizetab: sizetab.to_vec(),
            linktab: linktab.to_vec(),
        })
    }

    /// Fan-out per level.
    pub fn sizes(&self) -> &[i64] {
        &self.sizetab
    }

    /// Link cost per level.
    pub fn links(&self) -> &[i64] {
        &self.linktab
    }

    /// Number of terminals under one node of level `lvl`.
    fn leaves_below(&self, lvl: usize) -> i64 {
        self.sizetab[lvl..].iter().product()
    }

    pub(crate) fn dom_frst(&self) -> ArchDom {
        ArchDom::Tleaf {
            lvl: 0,
            min: 0,
            nbr: 1,
        }
    }

    pub(crate) fn dom_num(&self, d: &ArchDom) -> i64 {
        let (lvl, min, _) = dom(d);
        min * self.leaves_below(lvl)
    }

    pub(crate) fn dom_term(&self, num: i64) -> ArchDom {
        ArchDom::Tleaf {
            lvl: self.sizetab.len(),
            min: num,
            nbr: 1,
        }
    }

    pub(crate) fn dom_size(&self, d: &ArchDom) -> i64 {
        let (lvl, _, nbr) = dom(d);
        nbr * self.leaves_below(lvl)
    }

    pub(crate) fn dom_dist(&self, d0: &ArchDom, d1: &ArchDom) -> i64 {
        let (mut lvl0, mut idx0, _) = dom(d0);
        let (mut lvl1, mut idx1, _) = dom(d1);
        // Lift the deeper representative to the shallower level, then climb
        // both until the indices meet; the last link climbed is the answer.
        while lvl0 > lvl1 {
            lvl0 -= 1;
            idx0 /= self.sizetab[lvl0];
        }
        while lvl1 > lvl0 {
            lvl1 -= 1;
            idx1 /= self.sizetab[lvl1];
        }
        let mut dist = 0i64;
        while idx0 != idx1 {
            lvl0 -= 1;
            idx0 /= self.sizetab[lvl0];
            idx1 /= self.sizetab[lvl0];
            dist = self.linktab[lvl0];
        }
        dist
    }

    pub(crate) fn dom_bipart(&self, d: &ArchDom) -> Option<(ArchDom, ArchDom)> {
        let (lvl, min, nbr) = dom(d);
        if nbr > 1 {
            let nbr0 = (nbr + 1) / 2;
            return Some((
                ArchDom::Tleaf {
                    lvl,
                    min,
                    nbr: nbr0,
                },
                ArchDom::Tleaf {
                    lvl,
                    min: min + nbr0,
                    nbr: nbr - nbr0,
                },
            ));
        }
        if lvl >= self.sizetab.len() {
            return None;
        }
        // A single node: descend to its children interval.
        let size = self.sizetab[lvl];
        let nbr0 = (size + 1) / 2;
        Some((
            ArchDom::Tleaf {
                lvl: lvl + 1,
                min: min * size,
                nbr: nbr0,
            },
            ArchDom::Tleaf {
                lvl: lvl + 1,
                min: min * size + nbr0,
                nbr: size - nbr0,
            },
        ))
    }

    pub(crate) fn dom_incl(&self, outer: &ArchDom, inner: &ArchDom) -> bool {
        let (olvl, omin, onbr) = dom(outer);
        let (ilvl, mut imin, inbr) = dom(inner);
        if ilvl < olvl {
            return false;
        }
        // Lift the inner interval's ends to the outer level.
        let mut imax = imin + inbr - 1;
        for lvl in (olvl..ilvl).rev() {
            imin /= self.sizetab[lvl];
            imax /= self.sizetab[lvl];
        }
        imin >= omin && imax < omin + onbr
    }

    pub(crate) fn coarsen_match(&self) -> Result<(Arch, Vec<[i64; 2]>)> {
        // Collapse the bottom level two terminals at a time; the coarsened
        // machine keeps the upper levels and halves the bottom fan-out, or
        // drops the level entirely when its fan-out was 2.
        let lvlnbr = self.sizetab.len();
        let termnbr = self.leaves_below(0);
        let bottom = self.sizetab[lvlnbr - 1];
        if bottom % 2 != 0 {
            return Err(Error::UnsupportedConfig(
                "tleaf bottom fan-out must be even to match-coarsen".into(),
            )
            .report("ArchTleaf::coarsen_match"));
        }
        let multtab = (0..termnbr / 2).map(|c| [2 * c, 2 * c + 1]).collect();
        let arch = if bottom == 2 {
            if lvlnbr == 1 {
                Arch::cmplt(1)?
            } else {
                Arch::tleaf(&self.sizetab[..lvlnbr - 1], &self.linktab[..lvlnbr - 1])?
            }
        } else {
            let mut sizetab = self.sizetab.clone();
            sizetab[lvlnbr - 1] = bottom / 2;
            Arch::tleaf(&sizetab, &self.linktab)?
        };
        Ok((arch, multtab))
    }
}
