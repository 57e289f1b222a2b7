//! Infrastructure layer for the daemon.
//!
//! Contains OS-facing adapters.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `xbarrier_core`, but MUST NOT be imported by the `application` layer
//! outside of tests.
//!
//! # Sub-modules
//!
//! - **`display`** – The X11 adapter (Linux only) implementing the
//!   application's server, event-source and property-reader traits.
//!
//! - **`signal`** – The SIGUSR1 toggle bridge and the signal-aware wait
//!   (Linux only).
//!
//! - **`config`** – TOML config file loading.
//!
//! - **`mock`** – An in-memory display server and toggle flag, always
//!   compiled so integration tests can use them without an X server.

pub mod config;
pub mod display;
pub mod mock;

#[cfg(target_os = "linux")]
pub mod signal;
