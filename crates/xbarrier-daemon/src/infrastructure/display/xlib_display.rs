//! Linux X11 display adapter via Xlib, XFixes and XRandR.
//!
//! # What is a pointer barrier?
//!
//! XFixes 5.0 added *pointer barriers*: line segments on the root window that
//! the server refuses to let the cursor cross.  Each barrier has a direction
//! mask; a set bit lets the pointer through in that direction, an empty mask
//! blocks it both ways.  Barriers are plain XIDs owned by the client that
//! created them and vanish when that client disconnects.
//!
//! # Monitor enumeration
//!
//! `XRRGetMonitors` (RandR 1.5) returns one rectangle per logical monitor in
//! root window coordinates.  This is the layout barriers are computed from;
//! it is queried afresh on every install.
//!
//! # Waiting for events
//!
//! Xlib buffers events internally, so the connection's file descriptor can be
//! quiet while events are already queued (for example ones read in during an
//! `XSync`).  [`XDisplay::wait`] therefore returns immediately when
//! `XQLength` is non-zero and only waits on the descriptor otherwise, via
//! [`signal::wait_readable`] so a pending toggle signal cuts the wait short.

use std::ffi::{c_char, c_int, c_long, c_uchar, c_ulong, c_void};
use std::io;
use std::ptr;

use tracing::debug;
use x11::{xfixes, xlib, xrandr};
use xbarrier_core::{BarrierDescriptor, MonitorRegion};

use super::StartupError;
use crate::application::lifecycle::{BarrierError, BarrierHandle, BarrierServer};
use crate::application::load_insets::InsetsPropertyReader;
use crate::application::reconcile::{DisplayEvent, DisplayEventSource};
use crate::infrastructure::signal;

/// `Success` status returned by Xlib requests.
const SUCCESS: c_int = 0;

/// First XFixes major version with pointer barriers.
const XFIXES_BARRIER_MAJOR: c_int = 5;

/// Null-terminated name of the insets property.
const INSETS_ATOM_NAME: &[u8] = b"_KATRIA_INSETS\0";

/// An open Xlib connection plus the default screen's root window.
pub struct XDisplay {
    display: *mut xlib::Display,
    root: xlib::Window,
}

impl XDisplay {
    /// Opens the display named by `DISPLAY`.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError::Connection`] if `XOpenDisplay` fails.
    pub fn open() -> Result<Self, StartupError> {
        // SAFETY: a null display name makes Xlib read `DISPLAY`.  The returned
        // pointer is closed exactly once, in `Drop`.
        let display = unsafe { xlib::XOpenDisplay(ptr::null()) };
        if display.is_null() {
            let name = std::env::var("DISPLAY").unwrap_or_else(|_| "<unset>".to_string());
            return Err(StartupError::Connection(name));
        }

        // SAFETY: `display` is a valid, non-null connection.
        let root = unsafe { xlib::XDefaultRootWindow(display) };
        debug!("connected to X display, root window {root:#x}");
        Ok(Self { display, root })
    }

    /// Verifies the server offers XFixes with pointer barrier support.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError::MissingExtension`] if XFixes is absent or
    /// older than 5.0.
    pub fn require_barrier_support(&self) -> Result<(), StartupError> {
        let (mut event_base, mut error_base) = (0, 0);
        // SAFETY: the out-pointers reference live locals.
        let present = unsafe {
            xfixes::XFixesQueryExtension(self.display, &mut event_base, &mut error_base)
        };
        if present == xlib::False {
            return Err(StartupError::MissingExtension("XFIXES".to_string()));
        }

        let (mut major, mut minor) = (XFIXES_BARRIER_MAJOR, 0);
        // SAFETY: as above.
        unsafe { xfixes::XFixesQueryVersion(self.display, &mut major, &mut minor) };
        debug!("XFIXES {major}.{minor}");
        if major < XFIXES_BARRIER_MAJOR {
            return Err(StartupError::MissingExtension(format!(
                "XFIXES >= {XFIXES_BARRIER_MAJOR}.0 (server has {major}.{minor})"
            )));
        }
        Ok(())
    }

    fn connection_fd(&self) -> c_int {
        // SAFETY: the connection is open for the lifetime of `self`.
        unsafe { xlib::XConnectionNumber(self.display) }
    }
}

impl Drop for XDisplay {
    fn drop(&mut self) {
        // SAFETY: `display` came from XOpenDisplay and is not used after this.
        // Closing the connection also frees every barrier it created.
        unsafe { xlib::XCloseDisplay(self.display) };
    }
}

impl BarrierServer for XDisplay {
    fn list_monitors(&mut self) -> Result<Vec<MonitorRegion>, BarrierError> {
        let mut count: c_int = 0;
        // SAFETY: `count` is a live local; the returned array is freed below.
        let info = unsafe { xrandr::XRRGetMonitors(self.display, self.root, xlib::True, &mut count) };
        if info.is_null() || count <= 0 {
            if !info.is_null() {
                // SAFETY: non-null array returned by XRRGetMonitors.
                unsafe { xrandr::XRRFreeMonitors(info) };
            }
            return Err(BarrierError::NoMonitors);
        }

        // SAFETY: XRRGetMonitors returned `count` contiguous entries.
        let entries = unsafe { std::slice::from_raw_parts(info, count as usize) };
        let monitors = entries
            .iter()
            .map(|m| MonitorRegion::new(m.x, m.y, m.width, m.height))
            .collect();

        // SAFETY: `entries` is not used past this point.
        unsafe { xrandr::XRRFreeMonitors(info) };
        Ok(monitors)
    }

    fn create_barrier(
        &mut self,
        barrier: &BarrierDescriptor,
    ) -> Result<BarrierHandle, BarrierError> {
        // SAFETY: zero devices with a null device list applies the barrier to
        // all pointer devices.
        let xid = unsafe {
            xfixes::XFixesCreatePointerBarrier(
                self.display,
                self.root,
                barrier.x1,
                barrier.y1,
                barrier.x2,
                barrier.y2,
                c_int::from(barrier.directions.0),
                0,
                ptr::null_mut(),
            )
        };
        if xid == 0 {
            return Err(BarrierError::Platform(format!(
                "XFixesCreatePointerBarrier returned no id for {barrier}"
            )));
        }
        Ok(BarrierHandle(u64::from(xid)))
    }

    fn destroy_barrier(&mut self, handle: BarrierHandle) {
        // Handles are created from XIDs in `create_barrier`, so this is lossless.
        let xid = handle.0 as c_ulong;
        // SAFETY: `xid` was returned by XFixesCreatePointerBarrier on this
        // connection and is destroyed only once by the manager.
        unsafe { xfixes::XFixesDestroyPointerBarrier(self.display, xid) };
    }

    fn sync(&mut self) {
        // SAFETY: the connection is open.
        unsafe { xlib::XSync(self.display, xlib::False) };
    }
}

impl DisplayEventSource for XDisplay {
    fn subscribe_layout_changes(&mut self) {
        // StructureNotifyMask on the root window yields ConfigureNotify
        // whenever the root window (the whole screen) is resized.
        // SAFETY: the connection is open and `root` belongs to it.
        unsafe {
            xlib::XSelectInput(self.display, self.root, xlib::StructureNotifyMask);
            xlib::XSync(self.display, xlib::False);
        }
    }

    fn wait(&mut self) -> io::Result<()> {
        // SAFETY: the connection is open.
        unsafe { xlib::XFlush(self.display) };
        // SAFETY: as above; XQLength only inspects the local queue.
        if unsafe { xlib::XQLength(self.display) } > 0 {
            return Ok(());
        }

        signal::wait_readable(self.connection_fd())
    }

    fn drain_events(&mut self) -> Vec<DisplayEvent> {
        let mut events = Vec::new();
        // SAFETY: the connection is open; XNextEvent fills `event` completely
        // and only runs while XPending reports a queued event, so it never
        // blocks.
        unsafe {
            while xlib::XPending(self.display) > 0 {
                let mut event: xlib::XEvent = std::mem::zeroed();
                xlib::XNextEvent(self.display, &mut event);
                if event.get_type() == xlib::ConfigureNotify {
                    let configure = event.configure;
                    events.push(DisplayEvent::LayoutChanged {
                        width: configure.width,
                        height: configure.height,
                    });
                } else {
                    events.push(DisplayEvent::Other);
                }
            }
        }
        events
    }
}

impl InsetsPropertyReader for XDisplay {
    fn read_insets_property(&mut self) -> Option<Vec<i64>> {
        // SAFETY: INSETS_ATOM_NAME is null-terminated.
        let atom = unsafe {
            xlib::XInternAtom(
                self.display,
                INSETS_ATOM_NAME.as_ptr() as *const c_char,
                xlib::False,
            )
        };

        let mut actual_type: xlib::Atom = 0;
        let mut actual_format: c_int = 0;
        let mut nitems: c_ulong = 0;
        let mut bytes_after: c_ulong = 0;
        let mut data: *mut c_uchar = ptr::null_mut();

        // SAFETY: every out-pointer references a live local.  On success the
        // returned buffer is freed with XFree below.
        let status = unsafe {
            xlib::XGetWindowProperty(
                self.display,
                self.root,
                atom,
                0,
                4,
                xlib::False,
                xlib::XA_INTEGER,
                &mut actual_type,
                &mut actual_format,
                &mut nitems,
                &mut bytes_after,
                &mut data,
            )
        };
        if status != SUCCESS || data.is_null() {
            return None;
        }

        // 32-bit format properties come back as an array of C longs.
        let items = if actual_format == 32 {
            // SAFETY: Xlib returned `nitems` longs in `data`.
            let longs = unsafe { std::slice::from_raw_parts(data as *const c_long, nitems as usize) };
            Some(longs.iter().map(|&v| i64::from(v)).collect())
        } else {
            debug!("_KATRIA_INSETS has format {actual_format}, expected 32");
            None
        };

        // SAFETY: `data` was allocated by Xlib and is not used after this.
        unsafe { xlib::XFree(data as *mut c_void) };
        items
    }
}
