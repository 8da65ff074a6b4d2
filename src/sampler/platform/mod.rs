use sysinfo::System;

use super::stats::{CoreTicks, CounterWidth, SampleError, StatsProbe, VmCounters};

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(target_os = "macos")]
use macos as platform_impl;

/// Live counter source for the running host.
///
/// Per-core tick counters and vm page categories come from the platform
/// backend; totals, swap, and uptime come from sysinfo, which already
/// abstracts those cleanly.
pub struct SystemProbe {
    sys: System,
}

impl SystemProbe {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        Self { sys }
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsProbe for SystemProbe {
    fn cpu_ticks(&mut self) -> Result<Vec<CoreTicks>, SampleError> {
        platform_impl::cpu_ticks()
    }

    fn counter_width(&self) -> CounterWidth {
        platform_impl::COUNTER_WIDTH
    }

    fn vm_counters(&mut self) -> Result<VmCounters, SampleError> {
        platform_impl::vm_counters()
    }

    fn total_memory(&mut self) -> u64 {
        self.sys.refresh_memory();
        self.sys.total_memory()
    }

    fn swap_used(&mut self) -> u64 {
        // refresh_memory in total_memory also refreshed swap; a standalone
        // call still returns the last refreshed value.
        self.sys.used_swap()
    }

    fn uptime_secs(&mut self) -> f64 {
        System::uptime() as f64
    }
}
