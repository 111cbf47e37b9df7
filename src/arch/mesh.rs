//! Mesh and torus architectures of arbitrary dimension.
//!
//! A domain is a box: one index interval per dimension. Bipartition cuts
//! the longest extent in half; distance is the L1 distance between box
//! midpoints, computed in half-units so it stays exact on terminals. The
//! torus shares the domain encoding and wraps every per-dimension distance
//! around the ring.

use crate::arch::ArchDom;
use crate::error::{Error, Result};

// The two variants share everything but the per-dimension distance.
#[derive(Clone, Debug)]
pub(crate) struct MeshBody {
    dimtab: Vec<i64>,
}

/// d-dimensional mesh.
#[derive(Clone, Debug)]
pub struct ArchMesh {
    body: MeshBody,
}

/// d-dimensional torus.
#[derive(Clone, Debug)]
pub struct ArchTorus {
    body: MeshBody,
}

fn dom_mesh(dom: &ArchDom) -> (&[i64], &[i64]) {
    match dom {
        ArchDom::Mesh { min, nbr } => (min, nbr),
        _ => panic!("domain does not belong to a mesh architecture"),
    }
}

fn dom_torus(dom: &ArchDom) -> (&[i64], &[i64]) {
    match dom {
        ArchDom::Torus { min, nbr } => (min, nbr),
        _ => panic!("domain does not belong to a torus architecture"),
    }
}

impl MeshBody {
    fn build(dimtab: &[i64], routine: &str) -> Result<MeshBody> {
        if dimtab.is_empty() || dimtab.len() > 5 {
            return Err(Error::InvalidArgument(format!(
                "invalid dimension count {}",
                dimtab.len()
            ))
            .report(routine));
        }
        if dimtab.iter().any(|&s| s < 1) {
            return Err(
                Error::InvalidArgument("mesh dimensions must be positive".into()).report(routine)
            );
        }
        Ok(MeshBody {
            dimtab: dimtab.to_vec(),
        })
    }

    fn frst(&self) -> (Vec<i64>, Vec<i64>) {
        (vec![0; self.dimtab.len()], self.dimtab.clone())
    }

    /// Canonical number: row-major with dimension 0 varying fastest.
    fn num(&self, min: &[i64]) -> i64 {
        let mut num = 0i64;
        for d in (0..self.dimtab.len()).rev() {
            num = num * self.dimtab[d] + min[d];
        }
        num
    }

    fn term(&self, num: i64) -> (Vec<i64>, Vec<i64>) {
        let mut min = vec![0i64; self.dimtab.len()];
        let mut rest = num;
        for d in 0..self.dimtab.len() {
            min[d] = rest % self.dimtab[d];
            rest /= self.dimtab[d];
        }
        (min, vec![1; self.dimtab.len()])
    }

    fn size(&self, nbr: &[i64]) -> i64 {
        nbr.iter().product()
    }

    /// Split the dimension of largest extent; ties go to the lowest
    /// dimension. The first box keeps the low corner.
    fn bipart(&self, min: &[i64], nbr: &[i64]) -> Option<(Vec<i64>, Vec<i64>, Vec<i64>, Vec<i64>)> {
        let (dim, &extent) = nbr
            .iter()
            .enumerate()
            .max_by_key(|&(d, &n)| (n, std::cmp::Reverse(d)))?;
        if extent <= 1 {
            return None;
        }
        let nbr0dim = (extent + 1) / 2;
        let mut nbr0 = nbr.to_vec();
        nbr0[dim] = nbr0dim;
        let mut min1 = min.to_vec();
        min1[dim] += nbr0dim;
        let mut nbr1 = nbr.to_vec();
        nbr1[dim] = extent - nbr0dim;
        Some((min.to_vec(), nbr0, min1, nbr1))
    }

    fn incl(&self, omin: &[i64], onbr: &[i64], imin: &[i64], inbr: &[i64]) -> bool {
        (0..self.dimtab.len())
            .all(|d| imin[d] >= omin[d] && imin[d] + inbr[d] <= omin[d] + onbr[d])
    }
}

impl ArchMesh {
    pub(crate) fn build(dimtab: &[i64]) -> Result<ArchMesh> {
        Ok(ArchMesh {
            body: MeshBody::build(dimtab, "ArchMesh::build")?,
        })
    }

    /// Extent of every dimension.
    pub fn dims(&self) -> &[i64] {
        &self.body.dimtab
    }

    pub(crate) fn dom_frst(&self) -> ArchDom {
        let (min, nbr) = self.body.frst();
        ArchDom::Mesh { min, nbr }
    }

    pub(crate) fn dom_num(&self, d: &ArchDom) -> i64 {
        self.body.num(dom_mesh(d).0)
    }

    pub(crate) fn dom_term(&self, num: i64) -> ArchDom {
        let (min, nbr) = self.body.term(num);
        ArchDom::Mesh { min, nbr }
    }

    pub(crate) fn dom_size(&self, d: &ArchDom) -> i64 {
        self.body.size(dom_mesh(d).1)
    }

    pub(crate) fn dom_dist(&self, d0: &ArchDom, d1: &ArchDom) -> i64 {
        let (min0, nbr0) = dom_mesh(d0);
        let (min1, nbr1) = dom_mesh(d1);
        // midpoint L1 in half-units, summed, then halved
        let total: i64 = (0..min0.len())
            .map(|d| ((2 * min0[d] + nbr0[d]) - (2 * min1[d] + nbr1[d])).abs())
            .sum();
        total / 2
    }

    pub(crate) fn dom_bipart(&self, d: &ArchDom) -> Option<(ArchDom, ArchDom)> {
        let (min, nbr) = dom_mesh(d);
        let (min0, nbr0, min1, nbr1) = self.body.bipart(min, nbr)?;
        Some((
            ArchDom::Mesh {
                min: min0,
                nbr: nbr0,
            },
            ArchDom::Mesh {
                min: min1,
                nbr: nbr1,
            },
        ))
    }

    pub(crate) fn dom_incl(&self, outer: &ArchDom, inner: &ArchDom) -> bool {
        let (omin, onbr) = dom_mesh(outer);
        let (imin, inbr) = dom_mesh(inner);
        self.body.incl(omin, onbr, imin, inbr)
    }
}

impl ArchTorus {
    pub(crate) fn build(dimtab: &[i64]) -> Result<ArchTorus> {
        Ok(ArchTorus {
            body: MeshBody::build(dimtab, "ArchTorus::build")?,
        })
    }

    /// Extent of every dimension.
    pub fn dims(&self) -> &[i64] {
        &self.body.dimtab
    }

    pub(crate) fn dom_frst(&self) -> ArchDom {
        let (min, nbr) = self.body.frst();
        ArchDom::Torus { min, nbr }
    }

    pub(crate) fn dom_num(&self, d: &ArchDom) -> i64 {
        self.body.num(dom_torus(d).0)
    }

    pub(crate) fn dom_term(&self, num: i64) -> ArchDom {
        let (min, nbr) = self.body.term(num);
        ArchDom::Torus { min, nbr }
    }

    pub(crate) fn dom_size(&self, d: &ArchDom) -> i64 {
        self.body.size(dom_torus(d).1)
    }

    pub(crate) fn dom_dist(&self, d0: &ArchDom, d1: &ArchDom) -> i64 {
        let (min0, nbr0) = dom_torus(d0);
        let (min1, nbr1) = dom_torus(d1);
        let total: i64 = (0..min0.len())
            .map(|d| {
                let straight = ((2 * min0[d] + nbr0[d]) - (2 * min1[d] + nbr1[d])).abs();
                straight.min(2 * self.body.dimtab[d] - straight)
            })
            .sum();
        total / 2
    }

    pub(crate) fn dom_bipart(&self, d: &ArchDom) -> Option<(ArchDom, ArchDom)> {
        let (min, nbr) = dom_torus(d);
        let (min0, nbr0, min1, nbr1) = self.body.bipart(min, nbr)?;
        Some((
            ArchDom::Torus {
                min: min0,
                nbr: nbr0,
            },
            ArchDom::Torus {
                min: min1,
                nbr: nbr1,
            },
        ))
    }

    pub(crate) fn dom_incl(&self, outer: &ArchDom, inner: &ArchDom) -> bool {
        let (omin, onbr) = dom_torus(outer);
        let (imin, inbr) = dom_torus(inner);
        self.body.incl(omin, onbr, imin, inbr)
    }
}
