//! # xbarrier-core
//!
//! Shared library for xpointerbarrier containing the insets model, monitor
//! regions and the barrier geometry calculator.
//!
//! This crate has zero dependencies on OS APIs or display-server bindings, so
//! everything in it can be compiled and tested without an X server.
//!
//! # Architecture overview
//!
//! xpointerbarrier keeps the pointer inside each physical monitor by placing
//! four motion barriers along the monitor's edges.  A configurable *inset*
//! per edge moves the barrier inward, reserving a band (for a panel or dock)
//! that the pointer may enter from inside but never leave through.
//!
//! - **`domain::insets`** – validated `{top, left, right, bottom}` offsets and
//!   the typed decode of the `_KATRIA_INSETS` root-window property.
//! - **`domain::geometry`** – monitor regions, direction masks and the pure
//!   function mapping one monitor plus the insets to four barrier descriptors.

pub mod domain;

pub use domain::geometry::{compute_barriers, BarrierDescriptor, DirectionMask, Edge, MonitorRegion};
pub use domain::insets::{Insets, InsetsError};
