use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config;
use crate::display::platform::SystemDisplayProbe;
use crate::display::sampler::TopologySampler;
use crate::display::snapshot::DisplaySnapshot;
use crate::sampler::platform::SystemProbe;
use crate::sampler::snapshot::StatsSnapshot;
use crate::sampler::stats::{SamplerConfig, StatsSampler};
use crate::store::SnapshotStore;

/// Interval changes smaller than this are treated as noise.
const INTERVAL_DEAD_BAND: f64 = 0.1;

/// The producer side: owns all sampler and buffer state and runs the
/// sequential tick loop. Every tick (sample, update history, persist)
/// completes before the next begins; nothing here is shared across tasks.
pub struct Agent {
    root: Option<PathBuf>,
    stats_sampler: StatsSampler<SystemProbe>,
    display_sampler: TopologySampler<SystemDisplayProbe>,
    stats_store: SnapshotStore<StatsSnapshot>,
    display_store: SnapshotStore<DisplaySnapshot>,
    interval_secs: f64,
}

impl Agent {
    pub fn new(root: Option<PathBuf>) -> Self {
        let settings = root.as_deref().map(config::load_settings).unwrap_or_default();
        let interval_secs = settings
            .sample_interval()
            .unwrap_or(config::DEFAULT_INTERVAL_SECS);

        let mut stats_sampler = StatsSampler::new(
            SystemProbe::new(),
            SamplerConfig::new(interval_secs, config::HISTORY_WINDOW_SECS),
        );
        let stats_store = SnapshotStore::new(root.clone(), config::STATS_FILE);
        let display_store = SnapshotStore::new(root.clone(), config::DISPLAYS_FILE);

        // Reseed trend history from the last run so a restart does not
        // publish an empty chart. Absent or corrupt data just starts fresh.
        match stats_store.read_latest() {
            Ok(Some(snapshot)) => stats_sampler.seed(&snapshot),
            Ok(None) => {}
            Err(e) => warn!("ignoring persisted history: {e}"),
        }

        Self {
            root,
            stats_sampler,
            display_sampler: TopologySampler::new(SystemDisplayProbe::new()),
            stats_store,
            display_store,
            interval_secs,
        }
    }

    /// One sampling cycle. Failures are contained per snapshot kind: a
    /// failed query or write is logged and skipped, leaving the last good
    /// persisted file in place for consumers.
    pub fn tick(&mut self) {
        match self.stats_sampler.take_snapshot() {
            Ok(snapshot) => match self.stats_store.write(&snapshot) {
                Ok(path) => debug!(path = %path.display(), "stats snapshot written"),
                Err(e) => warn!("stats persistence failed: {e}"),
            },
            Err(e) => warn!("stats sampling failed: {e}"),
        }

        match self.display_sampler.capture_snapshot() {
            Ok(snapshot) => match self.display_store.write(&snapshot) {
                Ok(path) => debug!(path = %path.display(), "display snapshot written"),
                Err(e) => warn!("display persistence failed: {e}"),
            },
            Err(e) => warn!("display sampling failed: {e}"),
        }
    }

    /// Re-reads the shared settings so an external interval change takes
    /// effect on the next cycle. Non-positive or unreadable values keep the
    /// previous interval; a real change also reconfigures the sampler
    /// (which restarts its history at the new resolution).
    pub fn resolve_interval(&mut self) -> Duration {
        if let Some(root) = self.root.as_deref() {
            let settings = config::load_settings(root);
            if let Some(secs) = settings.sample_interval()
                && (secs - self.interval_secs).abs() > INTERVAL_DEAD_BAND
            {
                info!(
                    previous_secs = self.interval_secs,
                    next_secs = secs,
                    "sampling interval changed"
                );
                self.interval_secs = secs;
                self.stats_sampler
                    .update_config(SamplerConfig::new(secs, config::HISTORY_WINDOW_SECS));
            }
        }
        Duration::from_secs_f64(self.interval_secs)
    }

    /// Runs the tick loop until ctrl-c. Cancellation lands at the sleep
    /// boundary, never inside a tick, so an in-flight write either completes
    /// its atomic replace or leaves the previous file untouched.
    pub async fn run(&mut self) {
        info!(interval_secs = self.interval_secs, "sampling agent started");
        loop {
            self.tick();
            let interval = self.resolve_interval();
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("shutdown requested");
                    break;
                }
            }
        }
    }
}
