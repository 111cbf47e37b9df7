//! Execution diagnostics: memory-use counter and engine statistics.
//!
//! The engine keeps a thin process-wide counter of the heap bytes it has
//! handed out for large working arrays (current and peak), plus a few event
//! counters (coarsening levels built, refinement passes run, transient
//! fallbacks taken). None of this affects results; it exists so that a run
//! can be characterized after the fact.
//!
//! # Example
//!
//! ```no_run
//! use lodestone::metrics;
//!
//! metrics::reset();
//! // ... run the engine ...
//! let report = metrics::report();
//! report.print();
//! report.save_to_file("lodestone-metrics.json")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use serde_json::{Value, json};
use std::fs::File;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Error, Result};

static MEM_CURRENT: AtomicU64 = AtomicU64::new(0);
static MEM_PEAK: AtomicU64 = AtomicU64::new(0);
static COARSEN_LEVELS: AtomicU64 = AtomicU64::new(0);
static REFINE_PASSES: AtomicU64 = AtomicU64::new(0);
static TRANSIENT_FALLBACKS: AtomicU64 = AtomicU64::new(0);

/// Record `bytes` of working memory handed out.
pub(crate) fn note_alloc(bytes: u64) {
    let now = MEM_CURRENT.fetch_add(bytes, Ordering::Relaxed) + bytes;
    MEM_PEAK.fetch_max(now, Ordering::Relaxed);
}

/// Record `bytes` of working memory released.
pub(crate) fn note_release(bytes: u64) {
    // Saturating: releases may be reported against a reset counter.
    let _ = MEM_CURRENT.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
        Some(v.saturating_sub(bytes))
    });
}

pub(crate) fn note_coarsen_level() {
    COARSEN_LEVELS.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn note_refine_pass() {
    REFINE_PASSES.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn note_transient_fallback() {
    TRANSIENT_FALLBACKS.fetch_add(1, Ordering::Relaxed);
}

/// Allocate a filled `Vec`, accounting it and mapping allocator refusal to
/// [`Error::ResourceExhausted`] instead of aborting the process.
pub(crate) fn alloc_vec<T: Clone>(len: usize, value: T, routine: &str) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len).map_err(|_| {
        Error::ResourceExhausted(format!("cannot allocate {len} entries")).report(routine)
    })?;
    v.resize(len, value);
    note_alloc((len * size_of::<T>()) as u64);
    Ok(v)
}

/// Current tracked heap use in bytes.
pub fn current() -> u64 {
    MEM_CURRENT.load(Ordering::Relaxed)
}

/// Peak tracked heap use in bytes since the last [`reset`].
pub fn peak() -> u64 {
    MEM_PEAK.load(Ordering::Relaxed)
}

/// Zero every counter.
pub fn reset() {
    MEM_CURRENT.store(0, Ordering::Relaxed);
    MEM_PEAK.store(0, Ordering::Relaxed);
    COARSEN_LEVELS.store(0, Ordering::Relaxed);
    REFINE_PASSES.store(0, Ordering::Relaxed);
    TRANSIENT_FALLBACKS.store(0, Ordering::Relaxed);
}

/// Snapshot of the diagnostic counters.
#[derive(Clone, Debug)]
pub struct MetricsReport {
    /// Tracked heap bytes currently out.
    pub mem_current: u64,
    /// Peak tracked heap bytes.
    pub mem_peak: u64,
    /// Coarsening levels built.
    pub coarsen_levels: u64,
    /// Refinement passes run (all refiners).
    pub refine_passes: u64,
    /// Transient failures recovered by falling back.
    pub transient_fallbacks: u64,
}

/// Take a snapshot of the counters.
pub fn report() -> MetricsReport {
    MetricsReport {
        mem_current: current(),
        mem_peak: peak(),
        coarsen_levels: COARSEN_LEVELS.load(Ordering::Relaxed),
        refine_passes: REFINE_PASSES.load(Ordering::Relaxed),
        transient_fallbacks: TRANSIENT_FALLBACKS.load(Ordering::Relaxed),
    }
}

impl MetricsReport {
    /// The report as a JSON value.
    pub fn to_json(&self) -> Value {
        json!({
            "memory_current_bytes": self.mem_current,
            "memory_peak_bytes": self.mem_peak,
            "coarsen_levels": self.coarsen_levels,
            "refine_passes": self.refine_passes,
            "transient_fallbacks": self.transient_fallbacks,
        })
    }

    /// Print the report to stdout.
    pub fn print(&self) {
        println!("{:#}", self.to_json());
    }

    /// Save the report as JSON.
    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(self.to_json().to_string().as_bytes())?;
        Ok(())
    }
}
