//! Display-server adapter.
//!
//! On Linux the daemon talks to X11 through Xlib, XFixes (pointer barriers)
//! and XRandR (monitor enumeration).  The adapter implements every trait the
//! application layer needs from the server:
//!
//! | Trait                    | X11 requests used                                   |
//! |--------------------------|-----------------------------------------------------|
//! | `BarrierServer`          | `XRRGetMonitors`, `XFixes{Create,Destroy}PointerBarrier`, `XSync` |
//! | `DisplayEventSource`     | `XSelectInput`, `poll(2)` on the connection fd, `XNextEvent` |
//! | `InsetsPropertyReader`   | `XGetWindowProperty` on the root window             |
//!
//! Other platforms have no pointer barriers; there the daemon refuses to
//! start.

use thiserror::Error;

/// Fatal errors while bringing up the display connection.
#[derive(Debug, Error)]
pub enum StartupError {
    /// The X display could not be opened.
    #[error("cannot open display {0}")]
    Connection(String),

    /// A required server extension is missing or too old.
    #[error("no {0} extension available")]
    MissingExtension(String),

    /// The daemon was built for a platform without X11 support.
    #[error("pointer barriers require an X11 display server")]
    Unsupported,
}

#[cfg(target_os = "linux")]
pub mod xlib_display;

#[cfg(target_os = "linux")]
pub use xlib_display::XDisplay;
