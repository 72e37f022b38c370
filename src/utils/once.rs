//! Exactly-once loading for process-lifetime services.

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use crate::error::{Result, RexError};

const STATE_UNINITIALIZED: u8 = 0;
const STATE_LOADING: u8 = 1;
const STATE_READY: u8 = 2;
const STATE_FAILED: u8 = 3;

/// Lifecycle of a one-time-loaded service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    Uninitialized,
    Loading,
    Ready,
    Failed,
}

impl LoadState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One-shot load cell shared by long-lived services.
///
/// The first caller runs the load closure; concurrent first callers block on
/// that same in-flight load and share its outcome. A failed load is
/// terminal: the cause is cached and every later call gets
/// [`RexError::Init`] wrapping it, without re-running the closure.
pub struct OnceLoader<T> {
    cell: OnceLock<std::result::Result<Arc<T>, Arc<RexError>>>,
    state: AtomicU8,
    attempts: AtomicUsize,
}

impl<T> OnceLoader<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
            state: AtomicU8::new(STATE_UNINITIALIZED),
            attempts: AtomicUsize::new(0),
        }
    }

    /// Return the loaded value, running `load` if this is the first access.
    ///
    /// Exactly one closure invocation happens for the lifetime of the cell,
    /// however many threads race here.
    pub fn get_or_load<F>(&self, load: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Result<T>,
    {
        let outcome = self.cell.get_or_init(|| {
            self.state.store(STATE_LOADING, Ordering::SeqCst);
            self.attempts.fetch_add(1, Ordering::SeqCst);
            match load() {
                Ok(value) => {
                    self.state.store(STATE_READY, Ordering::SeqCst);
                    Ok(Arc::new(value))
                }
                Err(err) => {
                    self.state.store(STATE_FAILED, Ordering::SeqCst);
                    Err(Arc::new(err))
                }
            }
        });
        match outcome {
            Ok(value) => Ok(Arc::clone(value)),
            Err(cause) => Err(RexError::Init(Arc::clone(cause))),
        }
    }

    /// Already-loaded value, if any. Never triggers a load.
    pub fn get(&self) -> Option<Arc<T>> {
        self.cell
            .get()
            .and_then(|outcome| outcome.as_ref().ok())
            .map(Arc::clone)
    }

    pub fn state(&self) -> LoadState {
        match self.state.load(Ordering::SeqCst) {
            STATE_LOADING => LoadState::Loading,
            STATE_READY => LoadState::Ready,
            STATE_FAILED => LoadState::Failed,
            _ => LoadState::Uninitialized,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == LoadState::Ready
    }

    /// How many times the load closure actually ran (0 or 1).
    pub fn load_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl<T> Default for OnceLoader<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for OnceLoader<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnceLoader")
            .field("state", &self.state())
            .field("attempts", &self.load_attempts())
            .finish()
    }
}
