//! NUMA topology discovery and node-bound/interleaved page allocation.
//!
//! Binding uses the raw `mbind(2)` syscall via `libc::syscall`, since the
//! `libc` crate does not wrap it directly — the same approach the wider
//! NUMA-aware allocator code in the retrieval corpus uses.

mod cpuset;

use std::io::{Error, Result};
use std::path::Path;
use std::sync::OnceLock;

pub use cpuset::CpuSet;

const MPOL_BIND: i32 = 2;
const MPOL_INTERLEAVE: i32 = 3;

static NODE_COUNT: OnceLock<usize> = OnceLock::new();

/// Number of NUMA nodes, detected by enumerating `/sys/devices/system/node`
/// until the next index is missing. Cached for the process lifetime; the
/// `OnceLock` itself is the "uninitialized" sentinel (nothing cached yet),
/// and a detection failure collapses to `1` ("unavailable" == single node).
pub fn node_count() -> usize {
    *NODE_COUNT.get_or_init(detect_node_count)
}

fn detect_node_count() -> usize {
    let mut n = 0usize;
    loop {
        let path = format!("/sys/devices/system/node/node{n}");
        if Path::new(&path).is_dir() {
            n += 1;
        } else {
            break;
        }
    }
    n.max(1)
}

/// True if the system has more than one NUMA node.
pub fn available() -> bool {
    node_count() > 1
}

/// Parses a node's `cpulist` file fully: comma-separated singletons and
/// `A-B` ranges, not just the first entry.
pub fn node_cpus(node: usize) -> Result<CpuSet> {
    let path = format!("/sys/devices/system/node/node{node}/cpulist");
    let text = std::fs::read_to_string(path)?;
    Ok(parse_cpulist(&text))
}

fn parse_cpulist(text: &str) -> CpuSet {
    let mut set = CpuSet::new();
    for part in text.trim().split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if let Some((lo, hi)) = part.split_once('-') {
            if let (Ok(lo), Ok(hi)) = (lo.trim().parse::<u32>(), hi.trim().parse::<u32>()) {
                for cpu in lo..=hi {
                    set.insert(cpu);
                }
            }
        } else if let Ok(cpu) = part.parse::<u32>() {
            set.insert(cpu);
        }
    }
    set
}

/// A page-mapped region bound (best-effort) to one or more NUMA nodes.
///
/// Must be released through this type's `Drop` (or the explicit
/// [`NumaAlloc::free`]) rather than a generic deallocator, since the
/// underlying memory is `mmap`-backed, not heap-backed.
pub struct NumaAlloc {
    ptr: *mut u8,
    size: usize,
    /// Set when the requested binding could not be honored and the
    /// region was returned unbound on a best-effort basis.
    pub degraded: bool,
}

// Safety: `NumaAlloc` owns an exclusive mapping; callers coordinate any
// cross-thread sharing of the pointed-to bytes themselves (workloads that
// share buffers across threads already do this via atomics/locks).
unsafe impl Send for NumaAlloc {}

impl NumaAlloc {
    /// Raw pointer to the start of the mapped region.
    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Explicit release, equivalent to dropping the value.
    pub fn free(self) {
        drop(self)
    }
}

impl Drop for NumaAlloc {
    fn drop(&mut self) {
        if !self.ptr.is_null() && self.size > 0 {
            unsafe {
                libc::munmap(self.ptr as *mut libc::c_void, self.size);
            }
        }
    }
}

fn mmap_anon(size: usize) -> Result<*mut u8> {
    let ptr = unsafe {
        libc::mmap(
            std::ptr::null_mut(),
            size,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
            -1,
            0,
        )
    };
    if ptr == libc::MAP_FAILED {
        Err(Error::last_os_error())
    } else {
        Ok(ptr as *mut u8)
    }
}

fn mbind(ptr: *mut u8, size: usize, mode: i32, node_mask: u64) -> Result<()> {
    let rc = unsafe {
        libc::syscall(
            libc::SYS_mbind,
            ptr,
            size,
            mode,
            &node_mask as *const u64,
            64u64, // number of bits in the mask
            0u32,  // flags
        )
    };
    if rc == -1 {
        Err(Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Allocates page-aligned anonymous memory bound to `node`.
///
/// On a single-node system this transparently degrades to an ordinary
/// (unbound) mapping. If binding fails on a multi-node system, the
/// mapped-but-unbound region is still returned with [`NumaAlloc::degraded`]
/// set — scenarios run on a best-effort basis rather than failing outright.
pub fn alloc_on_node(size: usize, node: usize) -> Result<NumaAlloc> {
    let ptr = mmap_anon(size)?;

    if !available() {
        return Ok(NumaAlloc {
            ptr,
            size,
            degraded: false,
        });
    }

    if node >= 64 {
        log::warn!("numa: node {node} out of range for mask-based mbind, leaving unbound");
        return Ok(NumaAlloc {
            ptr,
            size,
            degraded: true,
        });
    }

    let mask = 1u64 << node;
    match mbind(ptr, size, MPOL_BIND, mask) {
        Ok(()) => Ok(NumaAlloc {
            ptr,
            size,
            degraded: false,
        }),
        Err(e) => {
            log::warn!("numa: mbind to node {node} failed ({e}), continuing unbound");
            Ok(NumaAlloc {
                ptr,
                size,
                degraded: true,
            })
        }
    }
}

/// Allocates memory with pages interleaved round-robin across all nodes.
pub fn alloc_interleaved(size: usize) -> Result<NumaAlloc> {
    let ptr = mmap_anon(size)?;

    if !available() {
        return Ok(NumaAlloc {
            ptr,
            size,
            degraded: false,
        });
    }

    let nodes = node_count().min(64);
    let mask = if nodes >= 64 { u64::MAX } else { (1u64 << nodes) - 1 };
    match mbind(ptr, size, MPOL_INTERLEAVE, mask) {
        Ok(()) => Ok(NumaAlloc {
            ptr,
            size,
            degraded: false,
        }),
        Err(e) => {
            log::warn!("numa: interleave mbind failed ({e}), continuing unbound");
            Ok(NumaAlloc {
                ptr,
                size,
                degraded: true,
            })
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_comma_separated_ranges() {
        let set = parse_cpulist("0-3,8,10-11\n");
        for cpu in [0, 1, 2, 3, 8, 10, 11] {
            assert!(set.contains(cpu), "expected {cpu} in set");
        }
        assert!(!set.contains(4));
        assert!(!set.contains(9));
    }

    #[test]
    fn parses_single_range() {
        let set = parse_cpulist("0-7");
        assert_eq!(set.iter().count(), 8);
    }

    #[test]
    fn node_count_is_at_least_one() {
        assert!(node_count() >= 1);
    }

    #[test]
    fn alloc_and_free_roundtrip() {
        let alloc = alloc_on_node(4096, 0).unwrap();
        assert_eq!(alloc.len(), 4096);
        unsafe {
            std::ptr::write_bytes(alloc.as_ptr(), 0xAB, alloc.len());
            assert_eq!(*alloc.as_ptr(), 0xAB);
        }
        alloc.free();
    }

    #[test]
    fn interleaved_alloc_roundtrip() {
        let alloc = alloc_interleaved(8192).unwrap();
        assert_eq!(alloc.len(), 8192);
    }
}
