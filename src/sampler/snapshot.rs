use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

/// Point-in-time host resource reading, persisted as `stats.json`.
///
/// Snapshots are value objects: produced once per tick, serialized by the
/// store, and decoded fresh by every consumer. The wire format is versioned
/// camelCase JSON so independently-built readers stay compatible.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub version: u32,
    pub timestamp: DateTime<Utc>,
    pub cpu: CpuReading,
    pub memory: MemoryReading,
    /// Seconds since boot.
    pub uptime: f64,
    pub history: HistoryReading,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuReading {
    /// Aggregate usage across all cores, 0..1.
    pub total: f64,
    /// Per-core usage fractions, 0..1, in core order.
    pub per_core: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryReading {
    pub used_bytes: u64,
    pub total_bytes: u64,
    pub swap_used_bytes: u64,
}

/// Trailing trend window carried inside each snapshot so a consumer can draw
/// a chart from a single read.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryReading {
    /// Aggregate CPU fractions, oldest first.
    pub cpu: Vec<f64>,
    /// Memory used/total ratios, oldest first.
    pub memory: Vec<f64>,
    pub window_sec: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> StatsSnapshot {
        StatsSnapshot {
            version: SCHEMA_VERSION,
            timestamp: Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap(),
            cpu: CpuReading {
                total: 0.42,
                per_core: vec![0.1, 0.74],
            },
            memory: MemoryReading {
                used_bytes: 12_884_901_888,
                total_bytes: 17_179_869_184,
                swap_used_bytes: 536_870_912,
            },
            uptime: 86_400.5,
            history: HistoryReading {
                cpu: vec![0.2, 0.3, 0.42],
                memory: vec![0.7, 0.71, 0.75],
                window_sec: 180.0,
            },
        }
    }

    #[test]
    fn json_round_trip_preserves_all_fields() {
        let snapshot = sample();
        let encoded = serde_json::to_string(&snapshot).unwrap();
        let decoded: StatsSnapshot = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn wire_format_uses_camel_case_keys() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["version"], 1);
        assert!(value["timestamp"].as_str().unwrap().starts_with("2026-03-14T09:26:53"));
        assert_eq!(value["cpu"]["perCore"].as_array().unwrap().len(), 2);
        assert_eq!(value["memory"]["usedBytes"], 12_884_901_888_u64);
        assert_eq!(value["memory"]["swapUsedBytes"], 536_870_912_u64);
        assert_eq!(value["history"]["windowSec"], 180.0);
    }
}
