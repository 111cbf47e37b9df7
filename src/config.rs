//! Configuration values carried by a [`Context`](crate::Context).
//!
//! A small, fixed table of integer and floating options, addressed by enum.
//! Every option has a constant default; a `set` call changes exactly one
//! value. Contexts share the table copy-on-write, so cloning a context is
//! cheap and setting an option never affects runs already in flight.

use std::sync::Arc;

/// Integer-valued options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntOption {
    /// Non-zero forces sequential kernels and fixed random seeds, making
    /// runs byte-identical for identical inputs.
    DeterministicMode,
    /// Non-zero seeds the random stream with a fixed constant instead of
    /// entropy.
    RandomFixedSeed,
    /// Stop coarsening once this many vertices remain.
    CoarsenVertexCutoff,
    /// Number of diffusion time steps per refinement call.
    DiffusionPassCount,
    /// Maximum Fiduccia–Mattheyses passes per refinement call.
    FmPassCount,
    /// Maximum moves accepted past the best state within one FM pass.
    FmMoveBudget,
    /// Breadth of the band graph around the frontier, in layers.
    BandLayerCount,
    /// Number of band-refinement iterations of the k-way mapper.
    KwayPassCount,
}

/// Floating-valued options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DblOption {
    /// Coarsening is abandoned when `coarse / fine` exceeds this ratio.
    CoarsenRatio,
    /// Allowed relative deviation of a part load from its target.
    ImbalanceRatio,
}

const INT_NBR: usize = 8;
const DBL_NBR: usize = 2;

/// The option table. Obtain one from [`ConfigValues::default`], read with
/// [`ConfigValues::int`] / [`ConfigValues::dbl`].
#[derive(Clone, Debug)]
pub struct ConfigValues {
    ints: [i64; INT_NBR],
    dbls: [f64; DBL_NBR],
}

impl Default for ConfigValues {
    fn default() -> Self {
        let mut ints = [0i64; INT_NBR];
        ints[IntOption::DeterministicMode as usize] = 0;
        ints[IntOption::RandomFixedSeed as usize] = 0;
        ints[IntOption::CoarsenVertexCutoff as usize] = 96;
        ints[IntOption::DiffusionPassCount as usize] = 40;
        ints[IntOption::FmPassCount as usize] = 10;
        ints[IntOption::FmMoveBudget as usize] = 120;
        ints[IntOption::BandLayerCount as usize] = 3;
        ints[IntOption::KwayPassCount as usize] = 4;
        let mut dbls = [0f64; DBL_NBR];
        dbls[DblOption::CoarsenRatio as usize] = 0.8;
        dbls[DblOption::ImbalanceRatio as usize] = 0.05;
        ConfigValues { ints, dbls }
    }
}

impl ConfigValues {
    /// Read an integer option.
    pub fn int(&self, option: IntOption) -> i64 {
        self.ints[option as usize]
    }

    /// Read a floating option.
    pub fn dbl(&self, option: DblOption) -> f64 {
        self.dbls[option as usize]
    }

    /// Set an integer option in place.
    pub fn set_int(&mut self, option: IntOption, value: i64) {
        self.ints[option as usize] = value;
    }

    /// Set a floating option in place.
    pub fn set_dbl(&mut self, option: DblOption, value: f64) {
        self.dbls[option as usize] = value;
    }

    /// Copy-on-write setter used by the context.
    pub(crate) fn set_int_cow(values: &mut Arc<ConfigValues>, option: IntOption, value: i64) {
        Arc::make_mut(values).set_int(option, value);
    }

    /// Copy-on-write setter used by the context.
    pub(crate) fn set_dbl_cow(values: &mut Arc<ConfigValues>, option: DblOption, value: f64) {
        Arc::make_mut(values).set_dbl(option, value);
    }
}
