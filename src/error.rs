//! Error taxonomy and the error reporting side channel.
//!
//! Every public entry point of the engine returns [`Result`]. The variants of
//! [`Error`] separate caller mistakes ([`Error::InvalidArgument`],
//! [`Error::UnsupportedConfig`]) from environmental failures ([`Error::Io`],
//! [`Error::ResourceExhausted`]) and from conditions the engine recovers from
//! internally ([`Error::TransientFailure`]). [`Error::InconsistentState`] is
//! only produced by debug consistency checks and always indicates a bug,
//! either in the engine or in arrays handed to it.
//!
//! # Reporting
//!
//! In addition to the returned value, every error built through
//! [`Error::report`] is forwarded to a process-wide callback together with
//! the name of the failing routine. By default the message goes to
//! `log::error!`; embedders that want the message elsewhere (a GUI console,
//! a Fortran unit, …) install their own sink once at program start:
//!
//! ```
//! lodestone::set_error_callback(|msg| eprintln!("solver: {msg}"));
//! ```

use std::sync::RwLock;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// The error taxonomy of the engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O failure or malformed input stream.
    #[error("i/o error: {0}")]
    Io(String),

    /// A caller-supplied value is out of contract: base value not 0 or 1,
    /// non-positive load, incompatible dimensions, and the like.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An allocation was refused. Partial state has been released.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// A debug consistency check failed. Always a bug.
    #[error("inconsistent state: {0}")]
    InconsistentState(String),

    /// A configuration or architecture capability mismatch, e.g. a
    /// variable-sized architecture passed to an algorithm that requires
    /// fixed domain sizes.
    #[error("unsupported configuration: {0}")]
    UnsupportedConfig(String),

    /// A recoverable condition, e.g. a matching pass that contracted too
    /// little. Callers inside the engine catch this and fall back.
    #[error("transient failure: {0}")]
    TransientFailure(String),
}

impl Error {
    /// Forward this error to the installed callback, tagged with the
    /// reporting routine, and return it for propagation with `?`.
    pub(crate) fn report(self, routine: &str) -> Self {
        emit(&format!("{routine}: {self}"));
        self
    }

    /// True for the variants the multilevel driver recovers from locally.
    pub(crate) fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::TransientFailure(_) | Error::ResourceExhausted(_)
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

type Callback = Box<dyn Fn(&str) + Send + Sync>;

static CALLBACK: RwLock<Option<Callback>> = RwLock::new(None);

/// Install the process-wide error sink. Replaces any previous callback.
pub fn set_error_callback<F>(callback: F)
where
    F: Fn(&str) + Send + Sync + 'static,
{
    *CALLBACK.write().unwrap() = Some(Box::new(callback));
}

/// Remove the installed callback, restoring the `log::error!` default.
pub fn clear_error_callback() {
    *CALLBACK.write().unwrap() = None;
}

fn emit(message: &str) {
    let guard = CALLBACK.read().unwrap();
    match guard.as_ref() {
        Some(cb) => cb(message),
        None => log::error!("{message}"),
    }
}
