//! Execution context: worker pool, random stream, configuration values.
//!
//! A [`Context`] is the bag every top-level call runs under. It owns an
//! optional `rayon` thread pool, the pseudo-random stream, and the
//! copy-on-write [`ConfigValues`] table. Outside a context (or with a single
//! worker) every kernel runs sequentially; with a pool, kernels offer work
//! through [`Context::launch`], which hands each worker a
//! [`ThreadDescriptor`] exposing its index, the pool width, and the three
//! synchronisation primitives the engine is allowed to use: `barrier`,
//! `reduce` and `scan`.
//!
//! # Example
//!
//! ```
//! use lodestone::{Context, IntOption};
//!
//! let mut ctx = Context::with_workers(4);
//! ctx.set_int(IntOption::DeterministicMode, 1);
//!
//! let partials = ctx.launch(&(), |desc, _| desc.index() as i64);
//! assert_eq!(partials.len(), 1); // deterministic mode runs sequentially
//! ```
//!
//! # Determinism
//!
//! When the `DeterministicMode` option is set, or when the pool has a single
//! worker, `launch` degrades to an inline sequential call and the random
//! stream is re-armed from a fixed seed at every top-level entry. Two runs
//! with identical inputs and configuration then produce byte-identical
//! outputs.

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier, Mutex, MutexGuard};

use crate::config::{ConfigValues, DblOption, IntOption};
use crate::random::{FIXED_SEED, RandomState};

/// Shared synchronisation state for one `launch` call.
struct SyncState {
    barrier: Barrier,
    slots: Vec<Mutex<Option<Box<dyn Any + Send>>>>,
    abort: AtomicBool,
}

impl SyncState {
    fn new(count: usize) -> Self {
        SyncState {
            barrier: Barrier::new(count),
            slots: (0..count).map(|_| Mutex::new(None)).collect(),
            abort: AtomicBool::new(false),
        }
    }
}

/// Per-worker view handed to the function given to [`Context::launch`].
pub struct ThreadDescriptor<'a> {
    index: usize,
    count: usize,
    sync: &'a SyncState,
}

impl ThreadDescriptor<'_> {
    /// This worker's index in `[0, count)`.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The number of workers executing the launch.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Block until every worker reaches the barrier.
    pub fn barrier(&self) {
        if self.count > 1 {
            self.sync.barrier.wait();
        }
    }

    /// Request a clean abort; observed by [`Self::aborted`] on all workers.
    pub fn abort(&self) {
        self.sync.abort.store(true, Ordering::Release);
    }

    /// True once any worker has called [`Self::abort`].
    pub fn aborted(&self) -> bool {
        self.sync.abort.load(Ordering::Acquire)
    }

    /// Tree reduction. Every worker contributes `local`; the combined value
    /// is deposited in worker 0 (`Some`), all others receive `None`.
    ///
    /// All workers must call this the same number of times, in the same
    /// order, with the same `T`.
    pub fn reduce<T, F>(&self, local: T, combine: F) -> Option<T>
    where
        T: Send + 'static,
        F: Fn(T, T) -> T,
    {
        if self.count == 1 {
            return Some(local);
        }
        *self.sync.slots[self.index].lock().unwrap() = Some(Box::new(local));
        let mut step = 1;
        while step < self.count {
            self.barrier();
            if self.index % (2 * step) == 0 && self.index + step < self.count {
                let remote = self.sync.slots[self.index + step]
                    .lock()
                    .unwrap()
                    .take()
                    .map(|b| *b.downcast::<T>().expect("reduce type"));
                if let Some(remote) = remote {
                    let mine = self.sync.slots[self.index]
                        .lock()
                        .unwrap()
                        .take()
                        .map(|b| *b.downcast::<T>().expect("reduce type"))
                        .expect("reduce slot");
                    *self.sync.slots[self.index].lock().unwrap() =
                        Some(Box::new(combine(mine, remote)));
                }
            }
            step *= 2;
        }
        self.barrier();
        if self.index == 0 {
            self.sync.slots[0]
                .lock()
                .unwrap()
                .take()
                .map(|b| *b.downcast::<T>().expect("reduce type"))
        } else {
            None
        }
    }

    /// Exclusive prefix scan: worker `i` receives the combination of the
    /// `local` values of workers `0..i`; worker 0 receives `T::default()`.
    pub fn scan<T, F>(&self, local: T, combine: F) -> T
    where
        T: Send + Clone + Default + 'static,
        F: Fn(&T, &T) -> T,
    {
        if self.count == 1 {
            return T::default();
        }
        *self.sync.slots[self.index].lock().unwrap() = Some(Box::new(local));
        self.barrier();
        let mut acc = T::default();
        for i in 0..self.index {
            let guard = self.sync.slots[i].lock().unwrap();
            let remote = guard
                .as_ref()
                .and_then(|b| b.downcast_ref::<T>())
                .expect("scan slot");
            acc = combine(&acc, remote);
        }
        self.barrier(); // all reads done before slots are reused
        self.sync.slots[self.index].lock().unwrap().take();
        acc
    }
}

/// Execution context. See the module documentation.
pub struct Context {
    pool: Option<Arc<rayon::ThreadPool>>,
    worker_count: usize,
    random: Mutex<RandomState>,
    values: Arc<ConfigValues>,
}

impl Default for Context {
    fn default() -> Self {
        Context::new()
    }
}

impl Context {
    /// A single-worker context. All kernels run sequentially.
    pub fn new() -> Self {
        Context {
            pool: None,
            worker_count: 1,
            random: Mutex::new(RandomState::from_entropy()),
            values: Arc::new(ConfigValues::default()),
        }
    }

    /// A context with `workers` pool threads. `workers <= 1` builds no pool;
    /// `0` means one worker per available CPU.
    pub fn with_workers(workers: usize) -> Self {
        let workers = if workers == 0 {
            num_cpus::get().max(2)
        } else {
            workers
        };
        if workers <= 1 {
            return Context::new();
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .ok()
            .map(Arc::new);
        let worker_count = pool.as_ref().map_or(1, |p| p.current_num_threads());
        Context {
            pool,
            worker_count,
            random: Mutex::new(RandomState::from_entropy()),
            values: Arc::new(ConfigValues::default()),
        }
    }

    /// Number of pool workers (1 when no pool was built).
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// True when kernels must run their sequential variants.
    pub fn deterministic(&self) -> bool {
        self.values.int(IntOption::DeterministicMode) != 0 || self.worker_count <= 1
    }

    /// The configuration table in force.
    pub fn values(&self) -> &ConfigValues {
        &self.values
    }

    /// Set one integer option (copy-on-write).
    pub fn set_int(&mut self, option: IntOption, value: i64) {
        ConfigValues::set_int_cow(&mut self.values, option, value);
    }

    /// Set one floating option (copy-on-write).
    pub fn set_dbl(&mut self, option: DblOption, value: f64) {
        ConfigValues::set_dbl_cow(&mut self.values, option, value);
    }

    /// Exclusive access to the random stream.
    pub fn rng(&self) -> MutexGuard<'_, RandomState> {
        self.random.lock().unwrap()
    }

    /// Re-arm the random stream for a fresh top-level call. Under
    /// `DeterministicMode` or `RandomFixedSeed` the stream restarts from the
    /// fixed seed, making the call reproducible. Called by every public
    /// engine entry point; embedders may call it to replay a sequence.
    pub fn random_reset(&self) {
        let fixed = self.values.int(IntOption::DeterministicMode) != 0
            || self.values.int(IntOption::RandomFixedSeed) != 0;
        let mut rng = self.random.lock().unwrap();
        if fixed {
            *rng = RandomState::from_seed(FIXED_SEED);
        }
    }

    /// Clone this context with an independent random stream. The worker
    /// pool and configuration are shared; the clone's random sequence is
    /// derived from (and does not disturb) the parent's.
    pub fn split(&self) -> Context {
        let stream = self.random.lock().unwrap().split();
        Context {
            pool: self.pool.clone(),
            worker_count: self.worker_count,
            random: Mutex::new(stream),
            values: Arc::clone(&self.values),
        }
    }

    /// Run a rayon-parallel region inside this context's pool (or inline
    /// when the context is sequential).
    pub(crate) fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    /// Offer `func` to every worker. Returns the per-worker results in
    /// index order. Sequential contexts (and deterministic mode) run a
    /// single inline call.
    pub fn launch<S, R, F>(&self, shared: &S, func: F) -> Vec<R>
    where
        S: Sync,
        R: Send,
        F: Fn(&ThreadDescriptor<'_>, &S) -> R + Sync,
    {
        let count = if self.deterministic() {
            1
        } else {
            self.worker_count
        };
        if count <= 1 {
            let sync = SyncState::new(1);
            let desc = ThreadDescriptor {
                index: 0,
                count: 1,
                sync: &sync,
            };
            return vec![func(&desc, shared)];
        }
        let pool = self.pool.as_ref().expect("pool sized above 1");
        let sync = SyncState::new(count);
        let mut results = pool.broadcast(|bctx| {
            let desc = ThreadDescriptor {
                index: bctx.index(),
                count,
                sync: &sync,
            };
            (bctx.index(), func(&desc, shared))
        });
        results.sort_by_key(|(i, _)| *i);
        results.into_iter().map(|(_, r)| r).collect()
    }
}
