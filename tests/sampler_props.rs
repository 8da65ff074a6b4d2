use std::collections::VecDeque;

use hostpulse::sampler::history::HistoryBuffer;
use hostpulse::sampler::stats::{
    CoreTicks, SampleError, SamplerConfig, StatsProbe, StatsSampler, VmCounters,
};
use proptest::prelude::*;

struct ScriptedProbe {
    ticks: VecDeque<Vec<CoreTicks>>,
    vm: VmCounters,
    total: u64,
}

impl StatsProbe for ScriptedProbe {
    fn cpu_ticks(&mut self) -> Result<Vec<CoreTicks>, SampleError> {
        self.ticks
            .pop_front()
            .ok_or_else(|| SampleError::CounterUnavailable("exhausted".to_string()))
    }

    fn vm_counters(&mut self) -> Result<VmCounters, SampleError> {
        Ok(self.vm)
    }

    fn total_memory(&mut self) -> u64 {
        self.total
    }

    fn swap_used(&mut self) -> u64 {
        0
    }

    fn uptime_secs(&mut self) -> f64 {
        1.0
    }
}

type CoreDelta = (u64, u64, u64, u64);

fn arb_core() -> impl Strategy<Value = (CoreTicks, CoreDelta)> {
    (
        prop::array::uniform4(0u64..1_000_000_000),
        prop::array::uniform4(0u64..1_000_000),
    )
        .prop_map(|([user, nice, system, idle], [du, dn, ds, di])| {
            (
                CoreTicks {
                    user,
                    nice,
                    system,
                    idle,
                },
                (du, dn, ds, di),
            )
        })
}

proptest! {
    #[test]
    fn usage_fractions_stay_in_unit_interval(
        cores in prop::collection::vec(arb_core(), 1..16),
    ) {
        let baseline: Vec<CoreTicks> = cores.iter().map(|(t, _)| *t).collect();
        let advanced: Vec<CoreTicks> = cores
            .iter()
            .map(|(t, (du, dn, ds, di))| CoreTicks {
                user: t.user + du,
                nice: t.nice + dn,
                system: t.system + ds,
                idle: t.idle + di,
            })
            .collect();

        let probe = ScriptedProbe {
            ticks: vec![baseline, advanced].into(),
            vm: VmCounters { active: 1, page_size: Some(4096), ..VmCounters::default() },
            total: 1 << 34,
        };
        let mut sampler = StatsSampler::new(probe, SamplerConfig::new(10.0, 180.0));

        let first = sampler.take_snapshot().unwrap();
        prop_assert_eq!(first.cpu.total, 0.0);
        prop_assert!(first.cpu.per_core.iter().all(|c| *c == 0.0));

        let second = sampler.take_snapshot().unwrap();
        prop_assert!((0.0..=1.0).contains(&second.cpu.total));
        for core in &second.cpu.per_core {
            prop_assert!((0.0..=1.0).contains(core), "core fraction {core}");
        }
    }

    #[test]
    fn memory_used_never_exceeds_total(
        active in 0u64..1_000_000_000,
        wired in 0u64..1_000_000,
        compressed in 0u64..1_000_000,
        speculative in 0u64..1_000_000,
        external in 0u64..1_000_000,
        purgeable in 0u64..1_000_000,
        total in 1u64..(1 << 40),
    ) {
        let probe = ScriptedProbe {
            ticks: vec![vec![CoreTicks { user: 0, nice: 0, system: 0, idle: 0 }]].into(),
            vm: VmCounters {
                active,
                wired,
                compressed,
                speculative,
                external,
                purgeable,
                page_size: Some(4096),
            },
            total,
        };
        let mut sampler = StatsSampler::new(probe, SamplerConfig::new(10.0, 180.0));
        let snapshot = sampler.take_snapshot().unwrap();
        prop_assert!(snapshot.memory.used_bytes <= snapshot.memory.total_bytes);
    }

    #[test]
    fn history_keeps_the_last_capacity_values(
        values in prop::collection::vec(any::<u32>(), 0..200),
        capacity in 1usize..40,
    ) {
        let mut buffer = HistoryBuffer::new(capacity);
        for value in &values {
            buffer.append(*value);
        }

        let oldest_first = buffer.values_oldest_first();
        prop_assert_eq!(oldest_first.len(), values.len().min(capacity));

        let expected: Vec<u32> = values
            .iter()
            .skip(values.len().saturating_sub(capacity))
            .copied()
            .collect();
        prop_assert_eq!(&oldest_first, &expected);

        let mut reversed = oldest_first.clone();
        reversed.reverse();
        prop_assert_eq!(buffer.values_newest_first(), reversed);
    }
}
