//! Shared helpers for deterministic data-parallel execution.
//!
//! Parallelism is opt-in through the `parallel` cargo feature and can be
//! suppressed at runtime with [`set_parallelism`]. Every parallelised stage
//! partitions work by position, so output is bit-for-bit identical with
//! parallelism on or off.

#[cfg(feature = "parallel")]
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(feature = "parallel")]
static PARALLEL_ENABLED: AtomicBool = AtomicBool::new(true);

#[cfg(feature = "parallel")]
pub fn parallelism_enabled() -> bool {
    PARALLEL_ENABLED.load(Ordering::SeqCst)
}

#[cfg(not(feature = "parallel"))]
pub fn parallelism_enabled() -> bool {
    false
}

/// Toggles parallel execution, returning a guard that restores the previous
/// setting when dropped.
#[cfg(feature = "parallel")]
pub fn set_parallelism(enabled: bool) -> ParallelismGuard {
    let previous = PARALLEL_ENABLED.swap(enabled, Ordering::SeqCst);
    ParallelismGuard { previous }
}

#[cfg(not(feature = "parallel"))]
pub fn set_parallelism(_enabled: bool) -> ParallelismGuard {
    ParallelismGuard {}
}

pub struct ParallelismGuard {
    #[cfg(feature = "parallel")]
    previous: bool,
}

#[cfg(feature = "parallel")]
impl Drop for ParallelismGuard {
    fn drop(&mut self) {
        PARALLEL_ENABLED.store(self.previous, Ordering::SeqCst);
    }
}

#[cfg(not(feature = "parallel"))]
impl Drop for ParallelismGuard {
    fn drop(&mut self) {}
}

/// Collects `op(i)` for every index in `0..count`, in parallel when enabled.
pub fn collect_indexed<R, O>(count: usize, op: O) -> Vec<R>
where
    R: Send,
    O: Fn(usize) -> R + Send + Sync,
{
    #[cfg(feature = "parallel")]
    if parallelism_enabled() {
        use rayon::prelude::*;
        return (0..count).into_par_iter().map(op).collect();
    }
    (0..count).map(op).collect()
}
