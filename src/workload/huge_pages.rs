//! Allocates the measured buffer as ordinary pages, transparent huge pages
//! (`madvise(MADV_HUGEPAGE)` hint), or explicit huge pages
//! (`mmap(MAP_HUGETLB)`), then runs a fixed page-strided access pattern.

use std::io::{Error, Result};

const PAGE_SIZE: usize = 4096;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageKind {
    Ordinary,
    TransparentHint,
    Explicit,
}

pub struct HugePageWorkload {
    ptr: *mut u8,
    size: usize,
    page_stride_bytes: usize,
    /// Set when `Explicit` huge pages were requested but the mapping
    /// fell back to ordinary pages (no hugetlbfs pool configured).
    pub degraded: bool,
}

unsafe impl Send for HugePageWorkload {}

pub fn prepare(size_bytes: usize, kind: PageKind, page_stride_bytes: usize) -> Result<HugePageWorkload> {
    let size = size_bytes.max(PAGE_SIZE);

    match kind {
        PageKind::Ordinary => {
            let ptr = mmap_anon(size, 0)?;
            Ok(HugePageWorkload { ptr, size, page_stride_bytes, degraded: false })
        }
        PageKind::TransparentHint => {
            let ptr = mmap_anon(size, 0)?;
            let rc = unsafe { libc::madvise(ptr as *mut libc::c_void, size, libc::MADV_HUGEPAGE) };
            let degraded = rc != 0;
            if degraded {
                log::warn!("huge_pages: MADV_HUGEPAGE hint rejected ({})", Error::last_os_error());
            }
            Ok(HugePageWorkload { ptr, size, page_stride_bytes, degraded })
        }
        PageKind::Explicit => match mmap_anon(size, libc::MAP_HUGETLB) {
            Ok(ptr) => Ok(HugePageWorkload { ptr, size, page_stride_bytes, degraded: false }),
            Err(e) => {
                log::warn!("huge_pages: MAP_HUGETLB failed ({e}), falling back to ordinary pages");
                let ptr = mmap_anon(size, 0)?;
                Ok(HugePageWorkload { ptr, size, page_stride_bytes, degraded: true })
            }
        },
    }
}

fn mmap_anon(size: usize, extra_flags: i32) -> Result<*mut u8> {
    let ptr = unsafe {
        libc::mmap(
            std::ptr::null_mut(),
            size,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_PRIVATE | libc::MAP_ANONYMOUS | extra_flags,
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

impl HugePageWorkload {
    pub fn run(&self) -> u64 {
        let stride = self.page_stride_bytes.max(PAGE_SIZE);
        let mut sum = 0u64;
        let mut offset = 0usize;
        while offset < self.size {
            unsafe {
                sum = sum.wrapping_add(self.ptr.add(offset).read_volatile() as u64);
            }
            offset += stride;
        }
        std::hint::black_box(sum)
    }
}

impl Drop for HugePageWorkload {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.ptr as *mut libc::c_void, self.size);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ordinary_pages_round_trip() {
        let w = prepare(16 * PAGE_SIZE, PageKind::Ordinary, PAGE_SIZE).unwrap();
        assert!(!w.degraded);
        let _ = w.run();
    }

    #[test]
    fn transparent_hint_never_hard_fails() {
        let w = prepare(16 * PAGE_SIZE, PageKind::TransparentHint, PAGE_SIZE).unwrap();
        let _ = w.run();
    }

    #[test]
    #[ignore = "requires a configured hugetlbfs pool"]
    fn explicit_huge_pages_if_pool_configured() {
        let w = prepare(2 * 1024 * 1024, PageKind::Explicit, PAGE_SIZE).unwrap();
        assert!(!w.degraded);
    }
}
