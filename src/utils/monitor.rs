#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessesToUpdate, System};

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct RunStats {
    pub memory_usage_mb: u64,
    pub peak_memory_mb: u64,
    pub rows_per_second: f64,
    pub elapsed_time: Duration,
}

/// 記錄批次執行期間的記憶體與吞吐量
#[cfg(feature = "cli")]
pub struct SystemMonitor {
    system: Mutex<System>,
    pid: Option<Pid>,
    start_time: Instant,
    peak_memory: Mutex<u64>,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        Self {
            system: Mutex::new(System::new()),
            pid: sysinfo::get_current_pid().ok(),
            start_time: Instant::now(),
            peak_memory: Mutex::new(0),
            enabled,
        }
    }

    pub fn get_stats(&self, rows_processed: usize) -> Option<RunStats> {
        if !self.enabled {
            return None;
        }

        let pid = self.pid?;
        let mut system = self.system.lock().ok()?;
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        let memory_mb = system.process(pid)?.memory() / 1024 / 1024;

        let mut peak = self.peak_memory.lock().ok()?;
        *peak = (*peak).max(memory_mb);

        let elapsed_time = self.start_time.elapsed();
        let seconds = elapsed_time.as_secs_f64();
        let rows_per_second = if seconds > 0.0 {
            rows_processed as f64 / seconds
        } else {
            0.0
        };

        Some(RunStats {
            memory_usage_mb: memory_mb,
            peak_memory_mb: *peak,
            rows_per_second,
            elapsed_time,
        })
    }

    pub fn log_file_stats(&self, file_name: &str, rows_processed: usize) {
        if let Some(stats) = self.get_stats(rows_processed) {
            tracing::info!(
                "📊 {} - Memory: {}MB, Peak: {}MB, Rows/s: {:.1}, Time: {:?}",
                file_name,
                stats.memory_usage_mb,
                stats.peak_memory_mb,
                stats.rows_per_second,
                stats.elapsed_time
            );
        }
    }

    pub fn log_final_stats(&self, rows_processed: usize) {
        if let Some(stats) = self.get_stats(rows_processed) {
            tracing::info!(
                "📊 Final Stats - Rows: {}, Total Time: {:?}, Peak Memory: {}MB",
                rows_processed,
                stats.elapsed_time,
                stats.peak_memory_mb
            );
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(feature = "cli")]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// 非 CLI 環境的空實現
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn log_file_stats(&self, _file_name: &str, _rows_processed: usize) {}

    pub fn log_final_stats(&self, _rows_processed: usize) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}
