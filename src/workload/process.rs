//! Process/thread creation: full fork, vfork, thread-like clone sharing
//! address space, and posix_spawn of a trivial child. Each variant creates
//! a child doing minimal work then reaps it; the measured interval is the
//! whole create-exit-reap cycle.

use std::ffi::CString;
use std::io::{Error, Result};
use std::ptr;
use std::sync::atomic::{AtomicI32, Ordering};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    Fork,
    VFork,
    CloneThread,
    PosixSpawn,
}

pub struct ProcessWorkload {
    variant: Variant,
}

pub fn prepare(variant: Variant) -> ProcessWorkload {
    ProcessWorkload { variant }
}

impl ProcessWorkload {
    /// Creates, runs, and reaps one child. Returns the child's exit status
    /// on success.
    pub fn run(&self) -> Result<i32> {
        match self.variant {
            Variant::Fork => self.run_fork(),
            Variant::VFork => self.run_vfork(),
            Variant::CloneThread => self.run_clone_thread(),
            Variant::PosixSpawn => self.run_posix_spawn(),
        }
    }

    fn run_fork(&self) -> Result<i32> {
        let pid = unsafe { libc::fork() };
        if pid < 0 {
            return Err(Error::last_os_error());
        }
        if pid == 0 {
            unsafe { libc::_exit(0) };
        }
        reap(pid)
    }

    fn run_vfork(&self) -> Result<i32> {
        let pid = unsafe { libc::vfork() };
        if pid < 0 {
            return Err(Error::last_os_error());
        }
        if pid == 0 {
            unsafe { libc::_exit(0) };
        }
        reap(pid)
    }

    /// `clone(2)` with `CLONE_VM | CLONE_THREAD | CLONE_SIGHAND` sharing
    /// the address space, joined via its own futex-free exit wait rather
    /// than `waitpid` (thread-group children are not waitable that way).
    ///
    /// The child shares `stack` via `CLONE_VM`, so the parent must not
    /// free it until the child is provably done with it. The trampoline
    /// signals completion through an `AtomicI32` flag kept in its own heap
    /// allocation (outliving both sides independently of `stack` or the
    /// parent's own frame); the parent spins on that flag rather than
    /// guessing with a fixed yield count, and only lets `stack` drop after
    /// observing it set.
    fn run_clone_thread(&self) -> Result<i32> {
        const STACK_SIZE: usize = 64 * 1024;
        let mut stack = vec![0u8; STACK_SIZE];
        let stack_top = unsafe { stack.as_mut_ptr().add(STACK_SIZE) } as *mut libc::c_void;

        let done = Box::into_raw(Box::new(AtomicI32::new(0)));

        extern "C" fn trampoline(arg: *mut libc::c_void) -> i32 {
            let done = arg as *const AtomicI32;
            unsafe { (*done).store(1, Ordering::Release) };
            0
        }

        let flags = libc::CLONE_VM | libc::CLONE_THREAD | libc::CLONE_SIGHAND | libc::CLONE_FS | libc::CLONE_FILES;
        let mut parent_tid: libc::pid_t = 0;
        let tid = unsafe {
            libc::clone(
                trampoline,
                stack_top,
                flags,
                done as *mut libc::c_void,
                &mut parent_tid as *mut libc::pid_t,
                ptr::null_mut::<libc::c_void>(),
                ptr::null_mut::<libc::c_void>(),
            )
        };
        if tid < 0 {
            unsafe { drop(Box::from_raw(done)) };
            return Err(Error::last_os_error());
        }

        // CLONE_THREAD children share a thread group and are not reapable
        // via waitpid; spin on the flag the trampoline itself sets before
        // returning, rather than guessing with a fixed yield count.
        let done_ref = unsafe { &*done };
        while done_ref.load(Ordering::Acquire) == 0 {
            libc_sched_yield();
        }
        unsafe { drop(Box::from_raw(done)) };

        Ok(0)
    }

    fn run_posix_spawn(&self) -> Result<i32> {
        let path = CString::new("/bin/true").unwrap_or_else(|_| CString::new("/bin/sh").unwrap());
        let argv0 = path.clone();
        let argv: [*mut libc::c_char; 2] = [argv0.as_ptr() as *mut libc::c_char, ptr::null_mut()];
        let mut pid: libc::pid_t = 0;

        let rc = unsafe {
            libc::posix_spawn(
                &mut pid,
                path.as_ptr(),
                ptr::null(),
                ptr::null(),
                argv.as_ptr() as *const *mut libc::c_char,
                ptr::null(),
            )
        };
        if rc != 0 {
            return Err(Error::from_raw_os_error(rc));
        }
        reap(pid)
    }
}

fn reap(pid: libc::pid_t) -> Result<i32> {
    let mut status: i32 = 0;
    let rc = unsafe { libc::waitpid(pid, &mut status, 0) };
    if rc < 0 {
        return Err(Error::last_os_error());
    }
    Ok(libc::WEXITSTATUS(status))
}

fn libc_sched_yield() {
    unsafe {
        libc::sched_yield();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fork_child_reaps_cleanly() {
        let status = prepare(Variant::Fork).run().unwrap();
        assert_eq!(status, 0);
    }

    #[test]
    fn vfork_child_reaps_cleanly() {
        let status = prepare(Variant::VFork).run().unwrap();
        assert_eq!(status, 0);
    }

    #[test]
    fn clone_thread_does_not_error() {
        prepare(Variant::CloneThread).run().unwrap();
    }

    #[test]
    #[ignore = "requires /bin/true to exist in the test sandbox"]
    fn posix_spawn_child_reaps_cleanly() {
        let status = prepare(Variant::PosixSpawn).run().unwrap();
        assert_eq!(status, 0);
    }
}
