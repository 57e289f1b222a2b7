//! BarrierManager: installs and removes the live set of pointer barriers.
//!
//! The manager is the only owner of barrier handles.  It holds at most one
//! [`BarrierSet`] at a time and always removes the current set before
//! installing a new one, so the server never sees two generations of
//! barriers side by side.
//!
//! The display server itself is reached through the [`BarrierServer`] trait;
//! the X11 adapter lives in the infrastructure layer and a recording mock is
//! used by tests.

use thiserror::Error;
use tracing::{debug, info, warn};
use xbarrier_core::{compute_barriers, BarrierDescriptor, Insets, MonitorRegion};

/// Barriers derived per monitor: one per edge.
pub const BARRIERS_PER_MONITOR: usize = 4;

/// Error type for barrier operations.
#[derive(Debug, Error)]
pub enum BarrierError {
    /// The server reported no monitors (or refused the query).
    ///
    /// Not fatal: the manager absorbs it and leaves no barriers installed
    /// until the next layout change.
    #[error("no XRandR monitors found")]
    NoMonitors,

    /// Storage for the barrier set could not be reserved.
    #[error("could not allocate memory for {0} pointer barriers")]
    Allocation(usize),

    /// The display server rejected a barrier primitive.
    #[error("display server error: {0}")]
    Platform(String),
}

/// Opaque identifier the server assigns to an installed barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BarrierHandle(pub u64);

/// Display-server primitives the manager is built on.
///
/// Each method maps to one server request; none of them is expected to
/// round-trip except [`sync`](BarrierServer::sync).
pub trait BarrierServer {
    /// Returns the current monitor layout.
    ///
    /// # Errors
    ///
    /// Returns [`BarrierError::NoMonitors`] if the server reports no monitors.
    fn list_monitors(&mut self) -> Result<Vec<MonitorRegion>, BarrierError>;

    /// Installs one barrier and returns its handle.
    ///
    /// # Errors
    ///
    /// Returns [`BarrierError::Platform`] if the server refuses the barrier.
    fn create_barrier(&mut self, barrier: &BarrierDescriptor)
        -> Result<BarrierHandle, BarrierError>;

    /// Removes a barrier previously returned by `create_barrier`.
    fn destroy_barrier(&mut self, handle: BarrierHandle);

    /// Blocks until the server has processed every request sent so far.
    fn sync(&mut self);
}

/// An installed barrier together with the geometry it was created from.
#[derive(Debug, PartialEq, Eq)]
pub struct InstalledBarrier {
    pub handle: BarrierHandle,
    pub descriptor: BarrierDescriptor,
}

/// The barriers currently installed on the server, in creation order
/// (per monitor: top, left, right, bottom).
///
/// Deliberately not `Clone`: handles must have exactly one owner.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BarrierSet {
    barriers: Vec<InstalledBarrier>,
}

impl BarrierSet {
    pub fn len(&self) -> usize {
        self.barriers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.barriers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InstalledBarrier> {
        self.barriers.iter()
    }

    /// Handles in creation order.
    pub fn handles(&self) -> Vec<BarrierHandle> {
        self.barriers.iter().map(|b| b.handle).collect()
    }

    /// Geometry of every barrier in creation order.
    pub fn descriptors(&self) -> Vec<BarrierDescriptor> {
        self.barriers.iter().map(|b| b.descriptor).collect()
    }
}

/// Owns the display server handle, the insets and the live barrier set.
pub struct BarrierManager<S: BarrierServer> {
    server: S,
    insets: Insets,
    live: Option<BarrierSet>,
}

impl<S: BarrierServer> BarrierManager<S> {
    /// Creates a manager with no barriers installed.
    pub fn new(server: S, insets: Insets) -> Self {
        Self {
            server,
            insets,
            live: None,
        }
    }

    /// Installs barriers for every monitor in the current layout.
    ///
    /// Any live set is removed first.  Returns `Ok(None)` when the layout is
    /// unavailable; that condition is logged and the manager simply holds no
    /// barriers until it is asked again.
    ///
    /// If the server rejects a barrier part-way through, the barriers created
    /// so far are destroyed before the error is returned.
    ///
    /// # Errors
    ///
    /// - [`BarrierError::Allocation`] if the set's storage cannot be reserved.
    /// - [`BarrierError::Platform`] if the server rejects a barrier.
    pub fn install_all(&mut self) -> Result<Option<&BarrierSet>, BarrierError> {
        if self.live.is_some() {
            self.remove_all();
        }

        let monitors = match self.server.list_monitors() {
            Ok(monitors) if !monitors.is_empty() => monitors,
            Ok(_) | Err(BarrierError::NoMonitors) => {
                warn!("no XRandR monitors found; no barriers installed");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        debug!("found {} XRandR monitors", monitors.len());

        let count = monitors
            .len()
            .checked_mul(BARRIERS_PER_MONITOR)
            .ok_or(BarrierError::Allocation(usize::MAX))?;
        let mut barriers = Vec::new();
        barriers
            .try_reserve_exact(count)
            .map_err(|_| BarrierError::Allocation(count))?;

        for monitor in &monitors {
            for descriptor in compute_barriers(monitor, &self.insets) {
                match self.server.create_barrier(&descriptor) {
                    Ok(handle) => {
                        debug!("+ created barrier {} {descriptor}", handle.0);
                        barriers.push(InstalledBarrier { handle, descriptor });
                    }
                    Err(e) => {
                        self.destroy_in_order(&barriers);
                        self.server.sync();
                        return Err(e);
                    }
                }
            }
        }

        self.server.sync();
        info!(
            "installed {} pointer barriers on {} monitors",
            barriers.len(),
            monitors.len()
        );
        self.live = Some(BarrierSet { barriers });
        Ok(self.live.as_ref())
    }

    /// Removes every live barrier, in set order, and discards the set.
    ///
    /// Returns the number of barriers removed (zero if none were live).
    pub fn remove_all(&mut self) -> usize {
        let Some(set) = self.live.take() else {
            return 0;
        };

        self.destroy_in_order(&set.barriers);
        self.server.sync();
        info!("removed {} pointer barriers", set.len());
        set.len()
    }

    fn destroy_in_order(&mut self, barriers: &[InstalledBarrier]) {
        for barrier in barriers {
            self.server.destroy_barrier(barrier.handle);
            debug!("- destroyed barrier {}", barrier.handle.0);
        }
    }

    /// The live barrier set, if any.
    pub fn live(&self) -> Option<&BarrierSet> {
        self.live.as_ref()
    }

    pub fn is_installed(&self) -> bool {
        self.live.is_some()
    }

    pub fn insets(&self) -> Insets {
        self.insets
    }

    pub fn server(&self) -> &S {
        &self.server
    }

    pub fn server_mut(&mut self) -> &mut S {
        &mut self.server
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
