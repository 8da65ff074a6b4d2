use std::mem::size_of;
use std::ptr;

use libc::{c_int, c_uint};

use super::super::stats::{CoreTicks, CounterWidth, SampleError, VmCounters};

type KernReturn = c_int;
type MachPort = c_uint;
type Natural = c_uint;

const KERN_SUCCESS: KernReturn = 0;
const PROCESSOR_CPU_LOAD_INFO: c_int = 2;
const HOST_VM_INFO64: c_int = 4;

/// The processor_info load counters are 32-bit and wrap in that domain, so
/// deltas must be taken at u32 width even though ticks travel as u64.
pub const COUNTER_WIDTH: CounterWidth = CounterWidth::U32;

const CPU_STATE_USER: usize = 0;
const CPU_STATE_SYSTEM: usize = 1;
const CPU_STATE_IDLE: usize = 2;
const CPU_STATE_NICE: usize = 3;
const CPU_STATE_MAX: usize = 4;

/// Mach vm_statistics64, field-for-field.
#[repr(C)]
#[derive(Default)]
struct VmStatistics64 {
    free_count: u32,
    active_count: u32,
    inactive_count: u32,
    wire_count: u32,
    zero_fill_count: u64,
    reactivations: u64,
    pageins: u64,
    pageouts: u64,
    faults: u64,
    cow_faults: u64,
    lookups: u64,
    hits: u64,
    purges: u64,
    purgeable_count: u32,
    speculative_count: u32,
    decompressions: u64,
    compressions: u64,
    swapins: u64,
    swapouts: u64,
    compressor_page_count: u32,
    throttled_count: u32,
    external_page_count: u32,
    internal_page_count: u32,
    total_uncompressed_pages_in_compressor: u64,
}

unsafe extern "C" {
    static mach_task_self_: MachPort;
    fn mach_host_self() -> MachPort;
    fn host_processor_info(
        host: MachPort,
        flavor: c_int,
        out_processor_count: *mut Natural,
        out_processor_info: *mut *mut c_int,
        out_processor_info_count: *mut Natural,
    ) -> KernReturn;
    fn host_statistics64(
        host: MachPort,
        flavor: c_int,
        host_info: *mut c_int,
        count: *mut Natural,
    ) -> KernReturn;
    fn host_page_size(host: MachPort, page_size: *mut usize) -> KernReturn;
    fn vm_deallocate(target_task: MachPort, address: usize, size: usize) -> KernReturn;
}

/// Per-core cumulative ticks via host_processor_info.
pub fn cpu_ticks() -> Result<Vec<CoreTicks>, SampleError> {
    let mut core_count: Natural = 0;
    let mut info: *mut c_int = ptr::null_mut();
    let mut info_count: Natural = 0;

    let kr = unsafe {
        host_processor_info(
            mach_host_self(),
            PROCESSOR_CPU_LOAD_INFO,
            &mut core_count,
            &mut info,
            &mut info_count,
        )
    };
    if kr != KERN_SUCCESS || info.is_null() {
        return Err(SampleError::CounterUnavailable(format!(
            "host_processor_info returned {kr}"
        )));
    }

    let mut cores = Vec::with_capacity(core_count as usize);
    for index in 0..core_count as usize {
        // The info array holds CPU_STATE_MAX u32 counters per core.
        let tick = |state: usize| {
            let value = unsafe { *info.add(index * CPU_STATE_MAX + state) };
            value as u32 as u64
        };
        cores.push(CoreTicks {
            user: tick(CPU_STATE_USER),
            nice: tick(CPU_STATE_NICE),
            system: tick(CPU_STATE_SYSTEM),
            idle: tick(CPU_STATE_IDLE),
        });
    }

    unsafe {
        vm_deallocate(
            mach_task_self_,
            info as usize,
            info_count as usize * size_of::<c_int>(),
        );
    }
    Ok(cores)
}

/// Page-category counters via host_statistics64.
pub fn vm_counters() -> Result<VmCounters, SampleError> {
    let mut stats = VmStatistics64::default();
    let mut count = (size_of::<VmStatistics64>() / size_of::<c_int>()) as Natural;

    let kr = unsafe {
        host_statistics64(
            mach_host_self(),
            HOST_VM_INFO64,
            (&mut stats as *mut VmStatistics64).cast(),
            &mut count,
        )
    };
    if kr != KERN_SUCCESS {
        return Err(SampleError::MemoryUnavailable(format!(
            "host_statistics64 returned {kr}"
        )));
    }

    let mut page_size: usize = 0;
    let page_kr = unsafe { host_page_size(mach_host_self(), &mut page_size) };
    let page_size = (page_kr == KERN_SUCCESS && page_size > 0).then_some(page_size as u64);

    Ok(VmCounters {
        active: stats.active_count as u64,
        wired: stats.wire_count as u64,
        compressed: stats.compressor_page_count as u64,
        speculative: stats.speculative_count as u64,
        external: stats.external_page_count as u64,
        purgeable: stats.purgeable_count as u64,
        page_size,
    })
}
