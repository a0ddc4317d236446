//! Fixed six-event PMU panel: open/reset/enable/disable/read, following
//! the state machine `Uninitialized -> Opened -> Counting -> Idle -> Closed`.
//!
//! Mirrors the teacher crate's [`Counter`]-over-one-fd design
//! (`count::Counter`, `ffi::syscall::{ioctl_arg, read}`), narrowed to the
//! fixed panel this framework needs instead of an arbitrary user-chosen
//! event.

mod ffi;

use std::fs::File;

use arrayvec::ArrayVec;

use self::ffi::{
    l1d_read_miss_config, llc_miss_config, perf_event_open, read_u64, ioctl_noarg, PerfEventAttr,
    PERF_COUNT_HW_BRANCH_INSTRUCTIONS, PERF_COUNT_HW_BRANCH_MISSES, PERF_COUNT_HW_CPU_CYCLES,
    PERF_COUNT_HW_INSTRUCTIONS, PERF_EVENT_IOC_DISABLE, PERF_EVENT_IOC_ENABLE,
    PERF_EVENT_IOC_RESET, PERF_TYPE_HARDWARE, PERF_TYPE_HW_CACHE,
};

const PANEL_SIZE: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Instructions,
    Cycles,
    L1dReadMisses,
    LlcMisses,
    Branches,
    BranchMisses,
}

impl Event {
    const ALL: [Event; PANEL_SIZE] = [
        Event::Instructions,
        Event::Cycles,
        Event::L1dReadMisses,
        Event::LlcMisses,
        Event::Branches,
        Event::BranchMisses,
    ];

    fn attr(self) -> PerfEventAttr {
        match self {
            Event::Instructions => {
                PerfEventAttr::counting(PERF_TYPE_HARDWARE, PERF_COUNT_HW_INSTRUCTIONS)
            }
            Event::Cycles => PerfEventAttr::counting(PERF_TYPE_HARDWARE, PERF_COUNT_HW_CPU_CYCLES),
            Event::L1dReadMisses => {
                PerfEventAttr::counting(PERF_TYPE_HW_CACHE, l1d_read_miss_config())
            }
            Event::LlcMisses => PerfEventAttr::counting(PERF_TYPE_HW_CACHE, llc_miss_config()),
            Event::Branches => {
                PerfEventAttr::counting(PERF_TYPE_HARDWARE, PERF_COUNT_HW_BRANCH_INSTRUCTIONS)
            }
            Event::BranchMisses => {
                PerfEventAttr::counting(PERF_TYPE_HARDWARE, PERF_COUNT_HW_BRANCH_MISSES)
            }
        }
    }

    /// These two events gate the whole panel: if either fails to open,
    /// the group reports unavailable.
    fn mandatory(self) -> bool {
        matches!(self, Event::Instructions | Event::Cycles)
    }
}

struct Slot {
    event: Event,
    file: Option<File>,
    delta: u64,
}

/// Raw deltas for one `start()`/`stop()` bracket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HwStat {
    pub instructions: u64,
    pub cycles: u64,
    pub l1d_read_misses: u64,
    pub llc_misses: u64,
    pub branches: u64,
    pub branch_misses: u64,
}

impl HwStat {
    /// Instructions-per-cycle, `0.0` when `cycles == 0`.
    pub fn ipc(&self) -> f64 {
        if self.cycles == 0 {
            0.0
        } else {
            self.instructions as f64 / self.cycles as f64
        }
    }

    /// Fraction of branches mispredicted, `0.0` when `branches == 0`.
    pub fn branch_miss_rate(&self) -> f64 {
        if self.branches == 0 {
            0.0
        } else {
            self.branch_misses as f64 / self.branches as f64
        }
    }
}

/// Fixed panel of hardware performance counters.
///
/// `available()` is `false` whenever either mandatory event
/// (instructions, cycles) could not be opened — typically
/// `perf_event_paranoid` denying access without `CAP_PERFMON`. In that
/// case every operation on this type is a no-op and [`HwCounterGroup::stop`]
/// always yields an all-zero [`HwStat`]; scenarios must continue without
/// hardware counters rather than abort.
pub struct HwCounterGroup {
    slots: ArrayVec<Slot, PANEL_SIZE>,
    available: bool,
}

impl HwCounterGroup {
    /// Opens the panel. Never fails: unavailability is represented by
    /// `available() == false`, not an `Err`.
    pub fn init() -> Self {
        let mut slots = ArrayVec::new();
        let mut available = true;

        for event in Event::ALL {
            let attr = event.attr();
            match perf_event_open(&attr) {
                Ok(file) => slots.push(Slot {
                    event,
                    file: Some(file),
                    delta: 0,
                }),
                Err(e) => {
                    if event.mandatory() {
                        log::warn!(
                            "hwcounter: mandatory event {event:?} failed to open ({e}), \
                             hardware counters unavailable for this scenario"
                        );
                        available = false;
                    } else {
                        log::warn!("hwcounter: optional event {event:?} failed to open ({e})");
                    }
                    slots.push(Slot {
                        event,
                        file: None,
                        delta: 0,
                    });
                }
            }
        }

        if !available {
            for slot in &mut slots {
                slot.file = None;
            }
        }

        Self { slots, available }
    }

    pub fn available(&self) -> bool {
        self.available
    }

    /// Resets each live counter to zero, then enables it.
    pub fn start(&mut self) {
        if !self.available {
            return;
        }
        for slot in &mut self.slots {
            if let Some(file) = &slot.file {
                let _ = ioctl_noarg(file, PERF_EVENT_IOC_RESET);
                let _ = ioctl_noarg(file, PERF_EVENT_IOC_ENABLE);
            }
        }
    }

    /// Disables each live counter and reads its delta.
    pub fn stop(&mut self) -> HwStat {
        if !self.available {
            return HwStat::default();
        }
        for slot in &mut self.slots {
            if let Some(file) = &slot.file {
                let _ = ioctl_noarg(file, PERF_EVENT_IOC_DISABLE);
                slot.delta = match read_u64(file) {
                    Ok(Some(v)) => v,
                    Ok(None) => {
                        log::warn!("hwcounter: short read on {:?}, reporting 0", slot.event);
                        0
                    }
                    Err(e) => {
                        log::warn!("hwcounter: read failed on {:?} ({e}), reporting 0", slot.event);
                        0
                    }
                };
            } else {
                slot.delta = 0;
            }
        }
        self.stat()
    }

    fn stat(&self) -> HwStat {
        let mut stat = HwStat::default();
        for slot in &self.slots {
            let v = slot.delta;
            match slot.event {
                Event::Instructions => stat.instructions = v,
                Event::Cycles => stat.cycles = v,
                Event::L1dReadMisses => stat.l1d_read_misses = v,
                Event::LlcMisses => stat.llc_misses = v,
                Event::Branches => stat.branches = v,
                Event::BranchMisses => stat.branch_misses = v,
            }
        }
        stat
    }

    /// Closes all file descriptors. Also runs on `Drop`.
    pub fn close(&mut self) {
        for slot in &mut self.slots {
            slot.file = None;
        }
    }
}

impl Drop for HwCounterGroup {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ipc_zero_when_cycles_zero() {
        let stat = HwStat::default();
        assert_eq!(stat.ipc(), 0.0);
    }

    #[test]
    fn branch_miss_rate_zero_when_no_branches() {
        let stat = HwStat::default();
        assert_eq!(stat.branch_miss_rate(), 0.0);
    }

    #[test]
    fn ipc_computed_correctly() {
        let stat = HwStat {
            instructions: 200,
            cycles: 100,
            ..Default::default()
        };
        assert_eq!(stat.ipc(), 2.0);
    }

    // Opening real perf events requires `perf_event_paranoid` to allow
    // it (or CAP_PERFMON); not guaranteed in CI sandboxes.
    #[test]
    #[ignore = "requires perf_event_open access (CAP_PERFMON or relaxed perf_event_paranoid)"]
    fn init_start_stop_on_real_hardware() {
        let mut group = HwCounterGroup::init();
        if !group.available() {
            return;
        }
        group.start();
        let mut acc: u64 = 0;
        for i in 0..1_000_000u64 {
            acc = acc.wrapping_add(i);
        }
        std::hint::black_box(acc);
        let stat = group.stop();
        assert!(stat.cycles > 0);
    }
}
