//! Hand-written `perf_event_open(2)` ABI surface for the fixed six-event
//! panel this crate opens.
//!
//! The teacher this module is adapted from generates a full,
//! kernel-version-matrixed `perf_event_attr` from vendored headers via
//! `bindgen`, because it exposes the entire `perf_event_open` surface
//! (sampling, breakpoints, tracepoints, BPF attachment, ...). This crate
//! only ever counts six hardware events, so `PerfEventAttr` below covers
//! the stable prefix of the real kernel struct up through `config2` —
//! every field the kernel needs to open a disabled, non-sampling counter
//! — and sets `size` to its own size so the kernel zero-fills everything
//! past it, exactly like an older userspace talking to a newer kernel.

use std::io::{Error, Result};
use std::os::fd::{AsRawFd, FromRawFd};
use std::fs::File;

pub const PERF_TYPE_HARDWARE: u32 = 0;
pub const PERF_TYPE_HW_CACHE: u32 = 3;

pub const PERF_COUNT_HW_CPU_CYCLES: u64 = 0;
pub const PERF_COUNT_HW_INSTRUCTIONS: u64 = 1;
pub const PERF_COUNT_HW_BRANCH_INSTRUCTIONS: u64 = 4;
pub const PERF_COUNT_HW_BRANCH_MISSES: u64 = 5;

const CACHE_L1D: u64 = 0;
const CACHE_LL: u64 = 2;
const CACHE_OP_READ: u64 = 0;
const CACHE_RESULT_ACCESS: u64 = 0;
const CACHE_RESULT_MISS: u64 = 1;

pub fn cache_config(cache: u64, op: u64, result: u64) -> u64 {
    cache | (op << 8) | (result << 16)
}

pub fn l1d_read_miss_config() -> u64 {
    cache_config(CACHE_L1D, CACHE_OP_READ, CACHE_RESULT_MISS)
}

pub fn llc_miss_config() -> u64 {
    cache_config(CACHE_LL, CACHE_OP_READ, CACHE_RESULT_MISS)
}

#[allow(dead_code)]
pub fn l1d_read_access_config() -> u64 {
    cache_config(CACHE_L1D, CACHE_OP_READ, CACHE_RESULT_ACCESS)
}

// Bit positions within the 64-bit flags word that follows `read_format`
// in the real kernel struct.
const FLAG_DISABLED: u64 = 1 << 0;
const FLAG_EXCLUDE_KERNEL: u64 = 1 << 5;
const FLAG_EXCLUDE_HV: u64 = 1 << 6;

// `_IO('$', nr)` as defined by the kernel's ioctl encoding macros:
// direction and size are both zero for these ops, so the value reduces to
// `(type << 8) | nr` with `type` the ASCII code for `$` (0x24).
const PERF_IOC_TYPE: u64 = 0x24;
pub const PERF_EVENT_IOC_ENABLE: u64 = (PERF_IOC_TYPE << 8) | 0;
pub const PERF_EVENT_IOC_DISABLE: u64 = (PERF_IOC_TYPE << 8) | 1;
pub const PERF_EVENT_IOC_RESET: u64 = (PERF_IOC_TYPE << 8) | 3;

const PERF_FLAG_FD_CLOEXEC: u64 = 1 << 3;

/// Stable prefix of `struct perf_event_attr`, sized for counting-only use.
#[repr(C)]
#[derive(Clone, Copy, Default)]
pub struct PerfEventAttr {
    pub ty: u32,
    pub size: u32,
    pub config: u64,
    pub sample_period_or_freq: u64,
    pub sample_type: u64,
    pub read_format: u64,
    pub flags: u64,
    pub wakeup_events_or_watermark: u32,
    pub bp_type: u32,
    pub config1_or_bp_addr: u64,
    pub config2_or_bp_len: u64,
}

impl PerfEventAttr {
    pub fn counting(ty: u32, config: u64) -> Self {
        let mut attr = PerfEventAttr {
            ty,
            config,
            flags: FLAG_DISABLED | FLAG_EXCLUDE_HV,
            ..Default::default()
        };
        // Kernel-space events stay included (no `FLAG_EXCLUDE_KERNEL`);
        // only user/hypervisor exclusions apply per this panel's design.
        debug_assert!(attr.flags & FLAG_EXCLUDE_KERNEL == 0);
        attr.size = std::mem::size_of::<PerfEventAttr>() as u32;
        attr
    }
}

/// Opens one `perf_event_open` file descriptor, attached to the calling
/// process (`pid = 0`) on any CPU (`cpu = -1`), not part of a group.
pub fn perf_event_open(attr: &PerfEventAttr) -> Result<File> {
    let fd = unsafe {
        libc::syscall(
            libc::SYS_perf_event_open,
            attr as *const PerfEventAttr,
            0i32,  // pid: calling process
            -1i32, // cpu: any
            -1i32, // group_fd: none
            PERF_FLAG_FD_CLOEXEC,
        )
    };
    if fd == -1 {
        Err(Error::last_os_error())
    } else {
        Ok(unsafe { File::from_raw_fd(fd as i32) })
    }
}

pub fn ioctl_noarg(file: &File, op: u64) -> Result<()> {
    let rc = unsafe { libc::ioctl(file.as_raw_fd(), op as _, 0) };
    if rc == -1 {
        Err(Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Reads exactly 8 bytes (one `u64` counter value) from the event fd.
/// Returns `None` on a short read, which callers treat as "report zero
/// for this iteration only".
pub fn read_u64(file: &File) -> Result<Option<u64>> {
    let mut buf = [0u8; 8];
    let n = unsafe { libc::read(file.as_raw_fd(), buf.as_mut_ptr() as *mut _, 8) };
    if n == -1 {
        return Err(Error::last_os_error());
    }
    if n != 8 {
        return Ok(None);
    }
    Ok(Some(u64::from_ne_bytes(buf)))
}
