// io_status.rs - read statistics and timing of audit phases
use std::fmt;
use std::time::{Duration, Instant};

use tracing::info;

/// Input statistics of the current process.
///
/// `read_chars` counts every byte handed to `read` calls (page cache hits
/// included), `read_bytes` only what was fetched from storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IOStats {
    pub read_chars: u64,
    pub read_bytes: u64,
    pub read_syscalls: u64,
}

impl IOStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculates the difference between two snapshots, saturating at zero.
    pub fn diff(&self, other: &IOStats) -> IOStats {
        IOStats {
            read_chars: self.read_chars.saturating_sub(other.read_chars),
            read_bytes: self.read_bytes.saturating_sub(other.read_bytes),
            read_syscalls: self.read_syscalls.saturating_sub(other.read_syscalls),
        }
    }

    pub fn has_io(&self) -> bool {
        self.read_chars > 0 || self.read_bytes > 0 || self.read_syscalls > 0
    }

    /// Reads the current process's counters from `/proc/self/io`.
    #[cfg(target_os = "linux")]
    pub fn current() -> std::io::Result<IOStats> {
        let io_content = std::fs::read_to_string("/proc/self/io")?;
        Ok(Self::parse_proc_io(&io_content))
    }

    /// Detailed IO counters are only available on Linux.
    #[cfg(not(target_os = "linux"))]
    pub fn current() -> std::io::Result<IOStats> {
        Ok(IOStats::new())
    }

    fn parse_proc_io(io_content: &str) -> IOStats {
        let mut stats = IOStats::new();
        for line in io_content.lines() {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() == 2 {
                if let Ok(value) = parts[1].parse::<u64>() {
                    match parts[0] {
                        "rchar:" => stats.read_chars = value,
                        "read_bytes:" => stats.read_bytes = value,
                        "syscr:" => stats.read_syscalls = value,
                        _ => {}
                    }
                }
            }
        }
        stats
    }
}

impl fmt::Display for IOStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f,
               "read {} bytes ({} from storage, {} syscalls)",
               self.read_chars, self.read_bytes, self.read_syscalls
        )
    }
}

/// Return value of a measured phase together with its duration and read statistics.
pub struct PhaseResult<T> {
    pub result: T,
    pub duration: Duration,
    pub io_stats: IOStats,
}

/// Runs `f` and measures its duration and the reads it caused.
pub fn measure<F, R>(f: F) -> PhaseResult<R>
where
    F: FnOnce() -> R,
{
    let start_io = IOStats::current().unwrap_or_default();
    let start_time = Instant::now();

    let result = f();

    let duration = start_time.elapsed();
    let io_stats = IOStats::current().unwrap_or_default().diff(&start_io);
    PhaseResult {
        result,
        duration,
        io_stats,
    }
}

/// Runs `f`, logs its duration and reads at `info` level under `phase`, and returns its value.
pub fn measure_and_log<F, R>(phase: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let measured = measure(f);
    if measured.io_stats.has_io() {
        info!(phase, elapsed_us = measured.duration.as_micros() as u64, "{}", measured.io_stats);
    } else {
        info!(phase, elapsed_us = measured.duration.as_micros() as u64, "done");
    }
    measured.result
}

/// Wraps a block in [`measure_and_log`].
#[macro_export]
macro_rules! measure_phase {
    ($name:expr, $code:block) => {{
        $crate::io_status::measure_and_log($name, || $code)
    }};
}
