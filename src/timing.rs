//! Monotonic-raw nanosecond clock.

use std::io::{Error, Result};

/// Reads `CLOCK_MONOTONIC_RAW`, in nanoseconds since an unspecified epoch.
///
/// This clock is not subject to NTP slewing or stepping, unlike
/// `CLOCK_MONOTONIC`, so back-to-back reads around a workload can never
/// observe a negative or inflated delta because of clock discipline. On
/// x86_64/Linux the call is VDSO-accelerated, keeping per-call overhead
/// well under the 100ns this framework's measured regions can tolerate.
///
/// Returns an error if the kernel does not support the clock id at all
/// (ancient kernels); callers must treat that as fatal rather than
/// falling back to a noisier clock.
pub fn now_ns() -> Result<u64> {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    let rc = unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC_RAW, &mut ts) };
    if rc != 0 {
        return Err(Error::last_os_error());
    }
    Ok(ts.tv_sec as u64 * 1_000_000_000 + ts.tv_nsec as u64)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn monotonic_nondecreasing() {
        let a = now_ns().unwrap();
        let b = now_ns().unwrap();
        assert!(b >= a);
    }

    #[test]
    fn resolution_is_nanosecond_scale() {
        let a = now_ns().unwrap();
        let mut b = now_ns().unwrap();
        // Spin briefly so the two reads are not bit-identical on a fast clock.
        while b == a {
            b = now_ns().unwrap();
        }
        assert!(b > a);
    }
}
