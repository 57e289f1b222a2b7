//! Application layer use cases for the daemon.
//!
//! - **`lifecycle`** – Owns the live barrier set and installs/removes it
//!   through a [`lifecycle::BarrierServer`] implementation injected at
//!   construction time.
//!
//! - **`reconcile`** – The event loop: waits on the display connection and
//!   the toggle signal, then keeps the barrier set in step with the monitor
//!   layout and the activation state.
//!
//! - **`load_insets`** – Bounded polling of the `_KATRIA_INSETS` root-window
//!   property at startup.

pub mod lifecycle;
pub mod load_insets;
pub mod reconcile;
