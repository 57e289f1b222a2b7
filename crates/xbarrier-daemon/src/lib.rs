//! xbarrier-daemon library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does the daemon do?
//!
//! 1. Establishes the insets once: from the command line, a TOML config file,
//!    or by polling the `_KATRIA_INSETS` root-window property.
//! 2. Installs four XFixes pointer barriers on every XRandR monitor.
//! 3. Waits on the X connection and on SIGUSR1.
//! 4. On a root window reconfiguration, replaces the barriers with ones
//!    computed from the new layout.
//! 5. On SIGUSR1, switches enforcement off (removing every barrier) or back
//!    on (reinstalling them).

/// Application layer: barrier lifecycle, reconciliation loop, insets polling.
pub mod application;

/// Infrastructure layer: X11 adapter, signal bridge, config file, mocks.
pub mod infrastructure;
