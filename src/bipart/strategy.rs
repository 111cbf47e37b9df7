//! Refiner strategy strings.
//!
//! A strategy is a sequence of single-letter refiner codes, applied left to
//! right: `g` greedy graph growing, `f` Fiduccia–Mattheyses, `d` diffusion,
//! `x` exactifier. `"gfx"` therefore grows an initial solution, hill-climbs
//! it, then restores exact balance.

use crate::error::{Error, Result};

/// One local 2-way solver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefinerKind {
    /// Greedy graph growing from a pseudo-peripheral seed.
    GreedyGrow,
    /// Fiduccia–Mattheyses hill climbing.
    FiducciaMattheyses,
    /// Two-liquid diffusion smoothing.
    Diffusion,
    /// Balance exactifier.
    Exactify,
}

/// An ordered list of refiners.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Strategy(pub Vec<RefinerKind>);

impl Strategy {
    /// Parse a strategy string.
    pub fn parse(text: &str) -> Result<Strategy> {
        let mut kinds = Vec::with_capacity(text.len());
        for c in text.chars() {
            kinds.push(match c {
                'g' => RefinerKind::GreedyGrow,
                'f' => RefinerKind::FiducciaMattheyses,
                'd' => RefinerKind::Diffusion,
                'x' => RefinerKind::Exactify,
                _ => {
                    return Err(Error::InvalidArgument(format!(
                        "unknown refiner code '{c}' in strategy"
                    ))
                    .report("Strategy::parse"));
                }
            });
        }
        Ok(Strategy(kinds))
    }

    /// Strategy used on the coarsest graph: grow, climb, exactify.
    pub fn default_initial() -> Strategy {
        Strategy(vec![
            RefinerKind::GreedyGrow,
            RefinerKind::FiducciaMattheyses,
            RefinerKind::Exactify,
        ])
    }

    /// Strategy used after each prolongation: climb, exactify.
    pub fn default_refine() -> Strategy {
        Strategy(vec![RefinerKind::FiducciaMattheyses, RefinerKind::Exactify])
    }
}
