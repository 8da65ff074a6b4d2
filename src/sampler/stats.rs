use chrono::Utc;
use thiserror::Error;

use super::history::HistoryBuffer;
use super::snapshot::{
    CpuReading, HistoryReading, MemoryReading, SCHEMA_VERSION, StatsSnapshot,
};

const FALLBACK_PAGE_SIZE: u64 = 4096;
const MIN_INTERVAL_SECS: f64 = 0.5;

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("cpu tick counters unavailable: {0}")]
    CounterUnavailable(String),
    #[error("memory counters unavailable: {0}")]
    MemoryUnavailable(String),
}

/// Cumulative per-core scheduler tick counters since boot.
///
/// Counters are monotonically non-decreasing in steady state; deltas are
/// taken with wrapping subtraction at the probe's [`CounterWidth`] so a
/// counter wrap still yields the right difference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoreTicks {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
}

/// Native bit width of a probe's cumulative tick counters.
///
/// Modular deltas are only correct when the subtraction runs at the width the
/// counters actually wrap at, so sources backed by 32-bit kernel counters
/// must report [`CounterWidth::U32`] even though [`CoreTicks`] carries the
/// values as u64.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CounterWidth {
    U32,
    U64,
}

impl CounterWidth {
    fn mask(self) -> u64 {
        match self {
            CounterWidth::U32 => u64::from(u32::MAX),
            CounterWidth::U64 => u64::MAX,
        }
    }
}

/// Raw virtual-memory page counts, in units of `page_size` bytes.
///
/// The buckets mirror the Mach vm_statistics categories; platforms without
/// that granularity fold their used-page estimate into `active` and leave the
/// rest zero.
#[derive(Clone, Copy, Debug, Default)]
pub struct VmCounters {
    pub active: u64,
    pub wired: u64,
    pub compressed: u64,
    pub speculative: u64,
    pub external: u64,
    pub purgeable: u64,
    /// Bytes per page; `None` falls back to 4096.
    pub page_size: Option<u64>,
}

/// Raw counter source backing a [`StatsSampler`].
///
/// Splitting the OS queries out of the sampler keeps the delta arithmetic and
/// clamping logic platform-neutral and testable with synthetic counters.
pub trait StatsProbe {
    fn cpu_ticks(&mut self) -> Result<Vec<CoreTicks>, SampleError>;
    /// Width the counters behind [`Self::cpu_ticks`] wrap at.
    fn counter_width(&self) -> CounterWidth {
        CounterWidth::U64
    }
    fn vm_counters(&mut self) -> Result<VmCounters, SampleError>;
    fn total_memory(&mut self) -> u64;
    /// Swap bytes in use; sources without swap info report 0.
    fn swap_used(&mut self) -> u64;
    fn uptime_secs(&mut self) -> f64;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplerConfig {
    pub sample_interval_secs: f64,
    pub history_window_secs: f64,
}

impl SamplerConfig {
    pub fn new(sample_interval_secs: f64, history_window_secs: f64) -> Self {
        Self {
            sample_interval_secs,
            history_window_secs: history_window_secs.max(sample_interval_secs),
        }
    }

    /// Number of trend samples that fit in the history window at the current
    /// cadence, never less than one.
    pub fn history_capacity(&self) -> usize {
        let per_window =
            self.history_window_secs / self.sample_interval_secs.max(MIN_INTERVAL_SECS);
        (per_window.round() as usize).max(1)
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self::new(
            crate::config::DEFAULT_INTERVAL_SECS,
            crate::config::HISTORY_WINDOW_SECS,
        )
    }
}

/// Computes one CPU and memory reading per call from cumulative OS counters.
///
/// The first call after construction (or after a reconfiguration, or a change
/// in the detected core count) has no baseline to diff against and reports 0%
/// usage while recording the raw counters for the next call.
pub struct StatsSampler<P> {
    probe: P,
    config: SamplerConfig,
    baseline: Option<Vec<CoreTicks>>,
    cpu_history: HistoryBuffer<f64>,
    memory_history: HistoryBuffer<f64>,
}

impl<P: StatsProbe> StatsSampler<P> {
    pub fn new(probe: P, config: SamplerConfig) -> Self {
        let capacity = config.history_capacity();
        Self {
            probe,
            config,
            baseline: None,
            cpu_history: HistoryBuffer::new(capacity),
            memory_history: HistoryBuffer::new(capacity),
        }
    }

    pub fn config(&self) -> SamplerConfig {
        self.config
    }

    /// Replaces the sampling configuration. History is not resampled across a
    /// resolution change: both buffers are recreated empty and the CPU
    /// baseline is dropped so the next call restarts cold.
    pub fn update_config(&mut self, config: SamplerConfig) {
        self.config = config;
        let capacity = config.history_capacity();
        self.cpu_history = HistoryBuffer::new(capacity);
        self.memory_history = HistoryBuffer::new(capacity);
        self.baseline = None;
    }

    /// Seeds the history buffers from a previously persisted snapshot so a
    /// restarted agent does not publish an empty chart. Keeps the most recent
    /// `capacity` entries of each series.
    pub fn seed(&mut self, snapshot: &StatsSnapshot) {
        let capacity = self.config.history_capacity();
        self.cpu_history = HistoryBuffer::new(capacity);
        self.memory_history = HistoryBuffer::new(capacity);

        let skip = snapshot.history.cpu.len().saturating_sub(capacity);
        for value in snapshot.history.cpu.iter().skip(skip) {
            self.cpu_history.append(*value);
        }
        let skip = snapshot.history.memory.len().saturating_sub(capacity);
        for value in snapshot.history.memory.iter().skip(skip) {
            self.memory_history.append(*value);
        }
    }

    pub fn take_snapshot(&mut self) -> Result<StatsSnapshot, SampleError> {
        let (total, per_core) = self.compute_cpu()?;
        let memory = self.compute_memory()?;
        let uptime = self.probe.uptime_secs();

        self.cpu_history.append(total);
        let memory_ratio = if memory.total_bytes > 0 {
            memory.used_bytes as f64 / memory.total_bytes as f64
        } else {
            0.0
        };
        self.memory_history.append(memory_ratio);

        Ok(StatsSnapshot {
            version: SCHEMA_VERSION,
            timestamp: Utc::now(),
            cpu: CpuReading { total, per_core },
            memory,
            uptime,
            history: HistoryReading {
                cpu: self.cpu_history.values_oldest_first(),
                memory: self.memory_history.values_oldest_first(),
                window_sec: self.config.history_window_secs,
            },
        })
    }

    fn compute_cpu(&mut self) -> Result<(f64, Vec<f64>), SampleError> {
        let current = self.probe.cpu_ticks()?;
        if current.is_empty() {
            return Err(SampleError::CounterUnavailable(
                "no cores reported".to_string(),
            ));
        }

        let previous = match self.baseline.replace(current.clone()) {
            Some(previous) if previous.len() == current.len() => previous,
            // Cold start, or the core count changed out from under us: the
            // old baseline would produce nonsensical deltas, so restart it.
            _ => return Ok((0.0, vec![0.0; current.len()])),
        };

        let mut total_busy = 0.0;
        let mut total_ticks = 0.0;
        let mut per_core = Vec::with_capacity(current.len());

        // Masking keeps the modular subtraction at the counters' native
        // width: a wrapped 32-bit counter diffed at u64 width would read as a
        // delta near 2^64 and swamp the aggregate.
        let mask = self.probe.counter_width().mask();
        for (now, prev) in current.iter().zip(&previous) {
            let user = (now.user.wrapping_sub(prev.user) & mask) as f64;
            let nice = (now.nice.wrapping_sub(prev.nice) & mask) as f64;
            let system = (now.system.wrapping_sub(prev.system) & mask) as f64;
            let idle = (now.idle.wrapping_sub(prev.idle) & mask) as f64;

            let busy = (user + system + nice).max(0.0);
            let ticks = busy + idle.max(0.0);
            let usage = if ticks > 0.0 { busy / ticks } else { 0.0 };
            per_core.push(usage.clamp(0.0, 1.0));
            total_busy += busy;
            total_ticks += ticks;
        }

        // Weighted by each core's tick total, not the mean of the per-core
        // fractions, so busier cores count proportionally.
        let total = if total_ticks > 0.0 {
            (total_busy / total_ticks).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Ok((total, per_core))
    }

    fn compute_memory(&mut self) -> Result<MemoryReading, SampleError> {
        let vm = self.probe.vm_counters()?;
        let page_size = vm.page_size.filter(|size| *size > 0).unwrap_or(FALLBACK_PAGE_SIZE);

        // Best-effort accounting: purgeable pages are subtracted even though
        // some of them overlap the other buckets, so clamp against total
        // rather than trusting the sum.
        let used_pages = (vm.active + vm.wired + vm.compressed + vm.speculative + vm.external)
            .saturating_sub(vm.purgeable);
        let used_bytes = used_pages.saturating_mul(page_size);
        let total_bytes = self.probe.total_memory();

        Ok(MemoryReading {
            used_bytes: used_bytes.min(total_bytes),
            total_bytes,
            swap_used_bytes: self.probe.swap_used(),
        })
    }
}
