//! Complete-graph architecture: every terminal at distance 1 from every
//! other. Domains are plain intervals of terminal numbers.

use crate::arch::{Arch, ArchDom};
use crate::error::{Error, Result};

/// Complete graph on `nbr` terminals.
#[derive(Clone, Debug)]
pub struct ArchCmplt {
    termnbr: i64,
}

fn dom(dom: &ArchDom) -> (i64, i64) {
    match dom {
        ArchDom::Cmplt { min, nbr } => (*min, *nbr),
        _ => panic!("domain does not belong to a cmplt architecture"),
    }
}

impl ArchCmplt {
    pub(crate) fn build(termnbr: i64) -> Result<ArchCmplt> {
        if termnbr < 1 {
            return Err(Error::InvalidArgument(format!("invalid terminal count {termnbr}"))
                .report("ArchCmplt::build"));
        }
        Ok(ArchCmplt { termnbr })
    }

    /// Number of terminals.
    pub fn termnbr(&self) -> i64 {
        self.termnbr
    }

    pub(crate) fn dom_frst(&self) -> ArchDom {
        ArchDom::Cmplt {
            min: 0,
            nbr: self.termnbr,
        }
    }

    pub(crate) fn dom_num(&self, d: &ArchDom) -> i64 {
        dom(d).0
    }

    pub(crate) fn dom_term(&self, num: i64) -> ArchDom {
        ArchDom::Cmplt { min: num, nbr: 1 }
    }

    pub(crate) fn dom_size(&self, d: &ArchDom) -> i64 {
        dom(d).1
    }

    pub(crate) fn dom_dist(&self, d0: &ArchDom, d1: &ArchDom) -> i64 {
        i64::from(dom(d0) != dom(d1))
    }

    pub(crate) fn dom_bipart(&self, d: &ArchDom) -> Option<(ArchDom, ArchDom)> {
        let (min, nbr) = dom(d);
        if nbr <= 1 {
            return None;
        }
        let nbr0 = (nbr + 1) / 2; // first half keeps the canonical number
        Some((
            ArchDom::Cmplt { min, nbr: nbr0 },
            ArchDom::Cmplt {
                min: min + nbr0,
                nbr: nbr - nbr0,
            },
        ))
    }

    pub(crate) fn dom_incl(&self, outer: &ArchDom, inner: &ArchDom) -> bool {
        let (omin, onbr) = dom(outer);
        let (imin, inbr) = dom(inner);
        imin >= omin && imin + inbr <= omin + onbr
    }

    pub(crate) fn coarsen_match(&self) -> Result<(Arch, Vec<[i64; 2]>)> {
        let coarnbr = (self.termnbr + 1) / 2;
        let multtab = (0..coarnbr)
            .map(|c| {
                let v0 = 2 * c;
                let v1 = 2 * c + 1;
                [v0, if v1 < self.termnbr { v1 } else { -1 }]
            })
            .collect();
        Ok((Arch::cmplt(coarnbr)?, multtab))
    }
}
