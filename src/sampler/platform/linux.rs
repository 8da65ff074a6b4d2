use super::super::stats::{CoreTicks, CounterWidth, SampleError, VmCounters};

const PAGE_SIZE: u64 = 4096;

/// /proc/stat counters are full-width on 64-bit kernels.
pub const COUNTER_WIDTH: CounterWidth = CounterWidth::U64;

/// Per-core cumulative ticks from /proc/stat.
pub fn cpu_ticks() -> Result<Vec<CoreTicks>, SampleError> {
    let contents = std::fs::read_to_string("/proc/stat")
        .map_err(|e| SampleError::CounterUnavailable(format!("/proc/stat: {e}")))?;
    let cores = parse_proc_stat(&contents);
    if cores.is_empty() {
        return Err(SampleError::CounterUnavailable(
            "/proc/stat: no per-core cpu lines".to_string(),
        ));
    }
    Ok(cores)
}

fn parse_proc_stat(contents: &str) -> Vec<CoreTicks> {
    let mut cores = Vec::new();
    for line in contents.lines() {
        let Some(rest) = line.strip_prefix("cpu") else {
            continue;
        };
        // Skip the aggregate "cpu " line; per-core lines are "cpuN ...".
        if !rest.starts_with(|c: char| c.is_ascii_digit()) {
            continue;
        }
        // Field order: user nice system idle iowait irq softirq steal ...
        let mut fields = rest.split_whitespace().skip(1).map(str::parse::<u64>);
        if let (Some(Ok(user)), Some(Ok(nice)), Some(Ok(system)), Some(Ok(idle))) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        {
            cores.push(CoreTicks {
                user,
                nice,
                system,
                idle,
            });
        }
    }
    cores
}

/// Used-page estimate from /proc/meminfo.
///
/// meminfo reports kB, not the Mach page categories, so the
/// total-minus-available figure is folded into the `active` bucket and the
/// mach-specific buckets stay zero. The downstream formula then reduces to
/// the usual Linux notion of used memory.
pub fn vm_counters() -> Result<VmCounters, SampleError> {
    let contents = std::fs::read_to_string("/proc/meminfo")
        .map_err(|e| SampleError::MemoryUnavailable(format!("/proc/meminfo: {e}")))?;
    parse_meminfo(&contents)
}

fn parse_meminfo(contents: &str) -> Result<VmCounters, SampleError> {
    let mut total_kb = None;
    let mut available_kb = None;
    for line in contents.lines() {
        if let Some(rest) = line.strip_prefix("MemTotal:") {
            total_kb = parse_kb(rest);
        } else if let Some(rest) = line.strip_prefix("MemAvailable:") {
            available_kb = parse_kb(rest);
        }
        if total_kb.is_some() && available_kb.is_some() {
            break;
        }
    }

    let (Some(total_kb), Some(available_kb)) = (total_kb, available_kb) else {
        return Err(SampleError::MemoryUnavailable(
            "/proc/meminfo: missing MemTotal or MemAvailable".to_string(),
        ));
    };

    let used_kb = total_kb.saturating_sub(available_kb);
    Ok(VmCounters {
        active: used_kb * 1024 / PAGE_SIZE,
        page_size: Some(PAGE_SIZE),
        ..VmCounters::default()
    })
}

fn parse_kb(rest: &str) -> Option<u64> {
    rest.split_whitespace().next()?.parse().ok()
}
