//! Binary hypercube architecture.
//!
//! Terminals are the corners of a `dim`-dimensional hypercube; a domain
//! fixes the `depth` low-order bits of the corner number. Distance between
//! terminals is the Hamming distance; for partial domains the unfixed
//! dimensions count half a hop each.

use crate::arch::{Arch, ArchDom};
use crate::error::{Error, Result};

/// Hypercube of dimension `dim` (1 ≤ dim ≤ 62).
#[derive(Clone, Debug)]
pub struct ArchHcub {
    dim: u32,
}

fn dom(dom: &ArchDom) -> (u32, i64) {
    match dom {
        ArchDom::Hcub { depth, bits } => (*depth, *bits),
        _ => panic!("domain does not belong to a hcub architecture"),
    }
}

impl ArchHcub {
    pub(crate) fn build(dim: u32) -> Result<ArchHcub> {
        if dim == 0 || dim > 62 {
            return Err(Error::InvalidArgument(format!("invalid hypercube dimension {dim}"))
                .report("ArchHcub::build"));
        }
        Ok(ArchHcub { dim })
    }

    /// The hypercube dimension.
    pub fn dim(&self) -> u32 {
        self.dim
    }

    pub(crate) fn dom_frst(&self) -> ArchDom {
        ArchDom::Hcub { depth: 0, bits: 0 }
    }

    pub(crate) fn dom_num(&self, d: &ArchDom) -> i64 {
        dom(d).1 // unfixed high bits are zero: smallest corner
    }

    pub(crate) fn dom_term(&self, num: i64) -> ArchDom {
        ArchDom::Hcub {
            depth: self.dim,
            bits: num,
        }
    }

    pub(crate) fn dom_size(&self, d: &ArchDom) -> i64 {
        1i64 << (self.dim - dom(d).0)
    }

    pub(crate) fn dom_dist(&self, d0: &ArchDom, d1: &ArchDom) -> i64 {
        let (depth0, bits0) = dom(d0);
        let (depth1, bits1) = dom(d1);
        let common = depth0.min(depth1);
        let mask = (1i64 << common) - 1;
        let fixed = ((bits0 ^ bits1) & mask).count_ones() as i64;
        // unfixed dimensions of either side count half a hop each
        let free = (depth0 - common) as i64 + (depth1 - common) as i64;
        fixed + (free + 1) / 2
    }

    pub(crate) fn dom_bipart(&self, d: &ArchDom) -> Option<(ArchDom, ArchDom)> {
        let (depth, bits) = dom(d);
        if depth >= self.dim {
            return None;
        }
        Some((
            ArchDom::Hcub {
                depth: depth + 1,
                bits,
            },
            ArchDom::Hcub {
                depth: depth + 1,
                bits: bits | (1i64 << depth),
            },
        ))
    }

    pub(crate) fn dom_incl(&self, outer: &ArchDom, inner: &ArchDom) -> bool {
        let (odepth, obits) = dom(outer);
        let (idepth, ibits) = dom(inner);
        if odepth > idepth {
            return false;
        }
        let mask = (1i64 << odepth) - 1;
        (obits & mask) == (ibits & mask)
    }

    pub(crate) fn coarsen_match(&self) -> Result<(Arch, Vec<[i64; 2]>)> {
        if self.dim == 1 {
            return Ok((Arch::cmplt(1)?, vec![[0, 1]]));
        }
        // Collapse the topmost dimension: corner pairs differing in it.
        let coarnbr = 1i64 << (self.dim - 1);
        let multtab = (0..coarnbr)
            .map(|c| [c, c | (1i64 << (self.dim - 1))])
            .collect();
        Ok((Arch::hcub(self.dim - 1)?, multtab))
    }
}
