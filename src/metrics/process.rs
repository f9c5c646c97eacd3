use core::num::NonZeroUsize;

#[cfg(feature = "process-metrics")]
use parking_lot::Mutex;
#[cfg(feature = "process-metrics")]
use sysinfo::{CpuRefreshKind, Pid, ProcessRefreshKind, ProcessesToUpdate, RefreshKind, System};

use crate::metrics::{MetricsSample, MetricsSource};

/// Metrics of the current process.
///
/// Thread count comes from `/proc/self/task` on Linux and parallelism from
/// the standard library. With the `process-metrics` feature, CPU count and
/// resident and virtual memory are read through `sysinfo`. Collector fields
/// are always `None`.
#[derive(Debug)]
pub struct ProcessMetrics {
    #[cfg(feature = "process-metrics")]
    system: Mutex<System>,
    #[cfg(feature = "process-metrics")]
    pid: Option<Pid>,
}

impl ProcessMetrics {
    /// Creates the source. With `process-metrics` this loads the CPU list once.
    pub fn new() -> Self {
        Self {
            #[cfg(feature = "process-metrics")]
            system: Mutex::new(System::new_with_specifics(
                RefreshKind::nothing().with_cpu(CpuRefreshKind::nothing()),
            )),
            #[cfg(feature = "process-metrics")]
            pid: sysinfo::get_current_pid()
                .inspect_err(|error| {
                    tracing::debug!(target: "boxlog", %error, "current pid unavailable");
                })
                .ok(),
        }
    }

    #[cfg(feature = "process-metrics")]
    fn fill_memory(&self, sample: &mut MetricsSample) {
        let mut system = self.system.lock();
        let cpus = system.cpus().len();
        if cpus > 0 {
            sample.cpu_count = cpus;
        }
        let Some(pid) = self.pid else {
            return;
        };
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
        if let Some(process) = system.process(pid) {
            sample.heap_bytes = Some(process.memory());
            sample.total_alloc_bytes = Some(process.virtual_memory());
        }
    }

    #[cfg(not(feature = "process-metrics"))]
    fn fill_memory(&self, _sample: &mut MetricsSample) {}
}

impl Default for ProcessMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsSource for ProcessMetrics {
    fn snapshot(&self) -> MetricsSample {
        let parallelism = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
        let mut sample = MetricsSample {
            active_workers: thread_count(),
            cpu_count: parallelism,
            scheduler_parallelism: parallelism,
            ..MetricsSample::unknown()
        };
        self.fill_memory(&mut sample);
        sample
    }
}

#[cfg(target_os = "linux")]
fn thread_count() -> Option<usize> {
    std::fs::read_dir("/proc/self/task")
        .inspect_err(|error| {
            tracing::trace!(target: "boxlog", %error, "thread count unavailable");
        })
        .ok()
        .map(Iterator::count)
}

#[cfg(not(target_os = "linux"))]
fn thread_count() -> Option<usize> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reports_parallelism() {
        let sample = ProcessMetrics::new().snapshot();
        assert!(sample.scheduler_parallelism >= 1);
        assert!(sample.cpu_count >= 1);
        assert_eq!(sample.gc_count, None);
        assert_eq!(sample.gc_pause_total, None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_thread_count_on_linux() {
        assert!(thread_count().is_some_and(|count| count >= 1));
    }

    #[cfg(all(feature = "process-metrics", target_os = "linux"))]
    #[test]
    fn test_memory_is_reported() {
        let sample = ProcessMetrics::new().snapshot();
        assert!(sample.heap_bytes.is_some_and(|bytes| bytes > 0));
        assert!(sample.total_alloc_bytes.is_some());
    }
}
