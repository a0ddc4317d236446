//! File I/O patterns: sequential read, sequential write, random-seek
//! read, unbuffered direct read, memory-mapped sequential read, and
//! memory-mapped random access — over a test file created in the backing
//! temporary directory and unlinked after use.

use std::fs::{File, OpenOptions};
use std::io::{Error, Read, Result, Seek, SeekFrom, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;

use tempfile::TempDir;

use super::rng::Seeded;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    SequentialRead,
    SequentialWrite,
    RandomSeekRead,
    DirectRead,
    MmapSequentialRead,
    MmapRandomAccess,
}

pub struct FileIoWorkload {
    _dir: TempDir,
    path: std::path::PathBuf,
    size_bytes: usize,
    mode: Mode,
    seed: u64,
    /// Set when `DirectRead` was requested but `O_DIRECT` was rejected
    /// (common on tmpfs-backed temp directories) and buffered I/O was
    /// used instead.
    pub degraded: bool,
}

const RECORD_BYTES: usize = 4096;

/// Creates and fills the backing file before any measured access.
pub fn prepare(size_bytes: usize, mode: Mode, seed: u64) -> Result<FileIoWorkload> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("perflab_fileio.bin");
    let size_bytes = size_bytes.max(RECORD_BYTES);

    {
        let mut f = File::create(&path)?;
        let buf = vec![0xA5u8; RECORD_BYTES];
        let mut written = 0usize;
        while written < size_bytes {
            f.write_all(&buf)?;
            written += buf.len();
        }
        f.flush()?;
    }

    Ok(FileIoWorkload { _dir: dir, path, size_bytes, mode, seed, degraded: false })
}

impl FileIoWorkload {
    pub fn run(&mut self) -> Result<u64> {
        match self.mode {
            Mode::SequentialRead => self.sequential_read(),
            Mode::SequentialWrite => self.sequential_write(),
            Mode::RandomSeekRead => self.random_seek_read(),
            Mode::DirectRead => self.direct_read(),
            Mode::MmapSequentialRead => self.mmap_sequential_read(),
            Mode::MmapRandomAccess => self.mmap_random_access(),
        }
    }

    fn sequential_read(&self) -> Result<u64> {
        let mut f = File::open(&self.path)?;
        let mut buf = [0u8; RECORD_BYTES];
        let mut sum = 0u64;
        loop {
            let n = f.read(&mut buf)?;
            if n == 0 {
                break;
            }
            sum = sum.wrapping_add(buf[..n].iter().map(|&b| b as u64).sum::<u64>());
        }
        Ok(sum)
    }

    fn sequential_write(&self) -> Result<u64> {
        let mut f = OpenOptions::new().write(true).open(&self.path)?;
        let buf = vec![0x5Au8; RECORD_BYTES];
        let mut written = 0usize;
        while written < self.size_bytes {
            f.write_all(&buf)?;
            written += buf.len();
        }
        f.flush()?;
        Ok(written as u64)
    }

    fn random_seek_read(&self) -> Result<u64> {
        let mut f = File::open(&self.path)?;
        let records = (self.size_bytes / RECORD_BYTES).max(1);
        let mut rng = Seeded::new(self.seed);
        let mut buf = [0u8; RECORD_BYTES];
        let mut sum = 0u64;
        for _ in 0..records {
            let rec = rng.gen_range(records);
            f.seek(SeekFrom::Start((rec * RECORD_BYTES) as u64))?;
            let n = f.read(&mut buf)?;
            sum = sum.wrapping_add(buf[..n].iter().map(|&b| b as u64).sum::<u64>());
        }
        Ok(sum)
    }

    fn direct_read(&mut self) -> Result<u64> {
        let opened = OpenOptions::new().read(true).custom_flags(libc::O_DIRECT).open(&self.path);
        let mut f = match opened {
            Ok(f) => f,
            Err(_) => {
                self.degraded = true;
                File::open(&self.path)?
            }
        };

        let layout_size = RECORD_BYTES;
        let mut buf = AlignedBuf::new(layout_size);
        let mut sum = 0u64;
        loop {
            let n = f.read(buf.as_mut_slice())?;
            if n == 0 {
                break;
            }
            sum = sum.wrapping_add(buf.as_slice()[..n].iter().map(|&b| b as u64).sum::<u64>());
        }
        Ok(sum)
    }

    fn mmap_sequential_read(&self) -> Result<u64> {
        let map = Mmap::open_readonly(&self.path)?;
        let mut sum = 0u64;
        for &b in map.as_slice() {
            sum = sum.wrapping_add(b as u64);
        }
        Ok(sum)
    }

    fn mmap_random_access(&self) -> Result<u64> {
        let map = Mmap::open_readonly(&self.path)?;
        let slice = map.as_slice();
        let mut rng = Seeded::new(self.seed);
        let accesses = (self.size_bytes / RECORD_BYTES).max(1);
        let mut sum = 0u64;
        for _ in 0..accesses {
            let idx = rng.gen_range(slice.len());
            sum = sum.wrapping_add(slice[idx] as u64);
        }
        Ok(sum)
    }
}

/// A page-aligned heap buffer, since `O_DIRECT` requires aligned
/// user-space buffers on most filesystems.
struct AlignedBuf {
    ptr: *mut u8,
    len: usize,
}

impl AlignedBuf {
    fn new(len: usize) -> Self {
        let layout = std::alloc::Layout::from_size_align(len, 4096).expect("valid alignment");
        let ptr = unsafe { std::alloc::alloc_zeroed(layout) };
        Self { ptr, len }
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr, self.len) }
    }

    fn as_slice(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.ptr, self.len) }
    }
}

impl Drop for AlignedBuf {
    fn drop(&mut self) {
        let layout = std::alloc::Layout::from_size_align(self.len, 4096).expect("valid alignment");
        unsafe { std::alloc::dealloc(self.ptr, layout) };
    }
}

struct Mmap {
    ptr: *mut u8,
    len: usize,
}

impl Mmap {
    fn open_readonly(path: &std::path::Path) -> Result<Self> {
        let f = File::open(path)?;
        let len = f.metadata()?.len() as usize;
        let ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                len,
                libc::PROT_READ,
                libc::MAP_PRIVATE,
                f.as_raw_fd(),
                0,
            )
        };
        if ptr == libc::MAP_FAILED {
            return Err(Error::last_os_error());
        }
        Ok(Self { ptr: ptr as *mut u8, len })
    }

    fn as_slice(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.ptr, self.len) }
    }
}

impl Drop for Mmap {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.ptr as *mut libc::c_void, self.len);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sequential_read_sees_filled_bytes() {
        let mut w = prepare(16 * RECORD_BYTES, Mode::SequentialRead, 1).unwrap();
        let sum = w.run().unwrap();
        assert_eq!(sum, 0xA5u64 * (16 * RECORD_BYTES) as u64);
    }

    #[test]
    fn sequential_write_reports_bytes_written() {
        let mut w = prepare(8 * RECORD_BYTES, Mode::SequentialWrite, 1).unwrap();
        let n = w.run().unwrap();
        assert_eq!(n as usize, 8 * RECORD_BYTES);
    }

    #[test]
    fn random_seek_read_runs_without_panicking() {
        let mut w = prepare(8 * RECORD_BYTES, Mode::RandomSeekRead, 3).unwrap();
        let _ = w.run().unwrap();
    }

    #[test]
    fn direct_read_degrades_gracefully_if_unsupported() {
        let mut w = prepare(4 * RECORD_BYTES, Mode::DirectRead, 2).unwrap();
        let _ = w.run().unwrap();
    }

    #[test]
    fn mmap_sequential_matches_plain_sequential() {
        let mut a = prepare(16 * RECORD_BYTES, Mode::SequentialRead, 1).unwrap();
        let mut b = prepare(16 * RECORD_BYTES, Mode::MmapSequentialRead, 1).unwrap();
        assert_eq!(a.run().unwrap(), b.run().unwrap());
    }

    #[test]
    fn mmap_random_access_runs_without_panicking() {
        let mut w = prepare(8 * RECORD_BYTES, Mode::MmapRandomAccess, 4).unwrap();
        let _ = w.run().unwrap();
    }
}
