//! SIGUSR1 toggle bridge.
//!
//! The handler stores `true` into a process-wide [`AtomicBool`] and does
//! nothing else: no allocation, no I/O, no barrier requests.
//!
//! # No lost wake-ups
//!
//! A plain `poll(2)` would leave a window between the loop reading the flag
//! and the wait starting to block: a signal landing there sets the flag but
//! interrupts nothing, and the toggle sits unobserved until some unrelated
//! X event arrives.
//!
//! So [`ToggleSignal::install`] keeps SIGUSR1 blocked on the loop thread, and
//! [`wait_readable`] waits with `ppoll(2)`, which unblocks SIGUSR1 atomically
//! for the duration of the wait only.  A signal raised while the loop is busy
//! stays pending and interrupts the next wait at once with `EINTR`.
//!
//! `SA_RESTART` is not set in `sa_flags`, so the interrupted wait is never
//! resumed by the kernel.

use std::io;
use std::os::fd::RawFd;
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::application::reconcile::ToggleSource;

/// The signal that flips the activation state.
pub const TOGGLE_SIGNAL: libc::c_int = libc::SIGUSR1;

static TOGGLE_REQUESTED: AtomicBool = AtomicBool::new(false);

extern "C" fn handle_toggle_signal(_sig: libc::c_int) {
    TOGGLE_REQUESTED.store(true, Ordering::SeqCst);
}

/// Handle to the installed SIGUSR1 handler.
///
/// There is one flag per process; every `ToggleSignal` reads the same one.
#[derive(Debug)]
pub struct ToggleSignal {
    _installed: (),
}

impl ToggleSignal {
    /// Blocks SIGUSR1 on the calling thread, then installs its handler.
    ///
    /// From here on the signal is only delivered inside [`wait_readable`], so
    /// this must be called on the thread that runs the loop.
    ///
    /// # Errors
    ///
    /// Returns the OS error if `pthread_sigmask` or `sigaction` fails.
    pub fn install() -> io::Result<Self> {
        // SAFETY: `blocked` is initialised by sigemptyset before use.
        let rc = unsafe {
            let mut blocked: libc::sigset_t = std::mem::zeroed();
            libc::sigemptyset(&mut blocked);
            libc::sigaddset(&mut blocked, TOGGLE_SIGNAL);
            libc::pthread_sigmask(libc::SIG_BLOCK, &blocked, ptr::null_mut())
        };
        if rc != 0 {
            return Err(io::Error::from_raw_os_error(rc));
        }

        // SAFETY: `action` is fully initialised (zeroed, then every field we
        // rely on set explicitly) before being passed to sigaction.  The
        // handler only performs an atomic store, which is async-signal-safe.
        let rc = unsafe {
            let mut action: libc::sigaction = std::mem::zeroed();
            action.sa_sigaction = handle_toggle_signal as usize;
            libc::sigemptyset(&mut action.sa_mask);
            action.sa_flags = 0;
            libc::sigaction(TOGGLE_SIGNAL, &action, ptr::null_mut())
        };
        if rc == -1 {
            return Err(io::Error::last_os_error());
        }

        debug!("installed SIGUSR1 toggle handler; signal blocked outside waits");
        Ok(Self { _installed: () })
    }
}

impl ToggleSource for ToggleSignal {
    fn take_toggle(&mut self) -> bool {
        TOGGLE_REQUESTED.swap(false, Ordering::SeqCst)
    }
}

/// Blocks until `fd` is readable or the toggle signal is delivered.
///
/// The thread's current signal mask is used for the wait with SIGUSR1
/// removed, so a toggle that became pending before the call interrupts it
/// immediately.
///
/// # Errors
///
/// Returns the OS error that ended the wait; a delivered toggle signal shows
/// up as [`io::ErrorKind::Interrupted`].
pub fn wait_readable(fd: RawFd) -> io::Result<()> {
    // SAFETY: `sigset_t` is plain data, and a null new-mask only reads the
    // current mask into `wait_mask`.
    let mut wait_mask: libc::sigset_t = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::pthread_sigmask(libc::SIG_SETMASK, ptr::null(), &mut wait_mask) };
    if rc != 0 {
        return Err(io::Error::from_raw_os_error(rc));
    }
    // SAFETY: `wait_mask` was filled in by pthread_sigmask above.
    unsafe { libc::sigdelset(&mut wait_mask, TOGGLE_SIGNAL) };

    let mut fds = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    // SAFETY: `fds` is a single live pollfd; a null timeout waits forever and
    // the mask is restored by the kernel when ppoll returns.
    let rc = unsafe { libc::ppoll(&mut fds, 1, ptr::null(), &wait_mask) };
    if rc == -1 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
