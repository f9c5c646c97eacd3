//! Runtime metrics shown in the side panel of verbose output.
//!
//! A [`MetricsSource`] produces a [`MetricsSample`] on demand. The default
//! source, [`ProcessMetrics`], reads what the current process exposes; any
//! closure returning a sample can be used instead:
//!
//! ```rust
//! use boxlog::metrics::{MetricsSample, MetricsSource};
//!
//! let source = || MetricsSample {
//!     active_workers: Some(4),
//!     ..MetricsSample::unknown()
//! };
//! assert_eq!(source.snapshot().active_workers, Some(4));
//! ```

pub mod panel;
mod process;

use core::time::Duration;

pub use self::{
    panel::{PanelLayout, PanelTier, PanelTiers},
    process::ProcessMetrics,
};

/// A point-in-time reading of process health.
///
/// Values a source cannot provide are `None` and render as `n/a`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MetricsSample {
    /// Number of live worker threads
    pub active_workers: Option<usize>,
    /// Bytes currently held by the process
    pub heap_bytes: Option<u64>,
    /// Bytes of address space reserved by the process
    pub total_alloc_bytes: Option<u64>,
    /// Total time spent in collector pauses
    pub gc_pause_total: Option<Duration>,
    /// Number of completed collections
    pub gc_count: Option<u64>,
    /// Logical CPUs visible to the process
    pub cpu_count: usize,
    /// Threads the runtime may run in parallel
    pub scheduler_parallelism: usize,
}

impl MetricsSample {
    /// A sample with nothing known and a single CPU.
    pub const fn unknown() -> Self {
        Self {
            active_workers: None,
            heap_bytes: None,
            total_alloc_bytes: None,
            gc_pause_total: None,
            gc_count: None,
            cpu_count: 1,
            scheduler_parallelism: 1,
        }
    }
}

impl Default for MetricsSample {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Produces metric samples for the panel.
///
/// Called once per rendered event while the sink lock is held, so
/// implementations should be quick.
pub trait MetricsSource: Send + Sync + 'static {
    /// Takes a sample.
    fn snapshot(&self) -> MetricsSample;
}

impl<F> MetricsSource for F
where
    F: Fn() -> MetricsSample + Send + Sync + 'static,
{
    fn snapshot(&self) -> MetricsSample {
        self()
    }
}
