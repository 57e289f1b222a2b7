//! Mock display server for unit and integration tests.
//!
//! # Why a mock server?
//!
//! The real adapter talks to an X server, which:
//!
//! - Requires a running display and the XFixes/XRandR extensions.
//! - Enforces barriers on the tester's actual pointer.
//! - Gives no way to list the barriers currently installed.
//!
//! `MockDisplayServer` replaces every request with in-memory bookkeeping.  It
//! tracks which barriers are *live* (created and not yet destroyed) the way
//! the server would, and keeps ordered logs of creations, destructions and
//! syncs so tests can assert on exact sequences.
//!
//! # Usage in tests
//!
//! ```ignore
//! let server = MockDisplayServer::with_monitors(vec![MonitorRegion::new(0, 0, 1920, 1080)]);
//! let mut manager = BarrierManager::new(server, Insets::ZERO);
//!
//! manager.install_all().unwrap();
//! assert_eq!(manager.server().live_count(), 4);
//! ```

use std::collections::{BTreeMap, VecDeque};
use std::io;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use xbarrier_core::{BarrierDescriptor, MonitorRegion};

use crate::application::lifecycle::{BarrierError, BarrierHandle, BarrierServer};
use crate::application::load_insets::InsetsPropertyReader;
use crate::application::reconcile::{DisplayEvent, DisplayEventSource, ToggleSource};

/// A display server that records every request instead of talking to X.
#[derive(Debug, Default)]
pub struct MockDisplayServer {
    monitors: Vec<MonitorRegion>,
    next_handle: u64,
    live: BTreeMap<BarrierHandle, BarrierDescriptor>,
    created: Vec<(BarrierHandle, BarrierDescriptor)>,
    destroyed: Vec<BarrierHandle>,
    sync_count: usize,
    subscribed: bool,
    events: VecDeque<DisplayEvent>,
    wait_results: VecDeque<io::Result<()>>,
    property: Option<Vec<i64>>,
    /// When `true`, `list_monitors` fails with [`BarrierError::NoMonitors`].
    pub fail_monitor_query: bool,
    /// When `Some(n)`, creations after the first `n` fail.
    pub fail_create_after: Option<usize>,
}

impl MockDisplayServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a server reporting the given monitor layout.
    pub fn with_monitors(monitors: Vec<MonitorRegion>) -> Self {
        Self {
            monitors,
            ..Self::default()
        }
    }

    /// Replaces the layout returned by subsequent monitor queries.
    pub fn set_monitors(&mut self, monitors: Vec<MonitorRegion>) {
        self.monitors = monitors;
    }

    /// Queues an event for the next `drain_events`.
    pub fn push_event(&mut self, event: DisplayEvent) {
        self.events.push_back(event);
    }

    /// Queues the result of a future `wait`.  Once the queue is empty, `wait`
    /// reports the connection readable.
    pub fn push_wait_result(&mut self, result: io::Result<()>) {
        self.wait_results.push_back(result);
    }

    /// Sets the value of the insets root-window property.
    pub fn set_property(&mut self, items: Option<Vec<i64>>) {
        self.property = items;
    }

    /// Number of barriers currently installed on the "server".
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Geometry of every live barrier, ordered by handle.
    pub fn live_descriptors(&self) -> Vec<BarrierDescriptor> {
        self.live.values().copied().collect()
    }

    pub fn created(&self) -> &[(BarrierHandle, BarrierDescriptor)] {
        &self.created
    }

    pub fn destroyed(&self) -> &[BarrierHandle] {
        &self.destroyed
    }

    pub fn sync_count(&self) -> usize {
        self.sync_count
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    pub fn pending_event_count(&self) -> usize {
        self.events.len()
    }
}

impl BarrierServer for MockDisplayServer {
    fn list_monitors(&mut self) -> Result<Vec<MonitorRegion>, BarrierError> {
        if self.fail_monitor_query {
            return Err(BarrierError::NoMonitors);
        }
        Ok(self.monitors.clone())
    }

    fn create_barrier(
        &mut self,
        barrier: &BarrierDescriptor,
    ) -> Result<BarrierHandle, BarrierError> {
        if let Some(limit) = self.fail_create_after {
            if self.created.len() >= limit {
                return Err(BarrierError::Platform("mock failure".into()));
            }
        }
        self.next_handle += 1;
        let handle = BarrierHandle(self.next_handle);
        self.live.insert(handle, *barrier);
        self.created.push((handle, *barrier));
        Ok(handle)
    }

    /// Destroying an unknown handle panics: it means a handle leaked or was
    /// freed twice.
    fn destroy_barrier(&mut self, handle: BarrierHandle) {
        assert!(
            self.live.remove(&handle).is_some(),
            "destroyed barrier {handle:?} that is not live"
        );
        self.destroyed.push(handle);
    }

    fn sync(&mut self) {
        self.sync_count += 1;
    }
}

impl DisplayEventSource for MockDisplayServer {
    fn subscribe_layout_changes(&mut self) {
        self.subscribed = true;
    }

    fn wait(&mut self) -> io::Result<()> {
        self.wait_results.pop_front().unwrap_or(Ok(()))
    }

    fn drain_events(&mut self) -> Vec<DisplayEvent> {
        self.events.drain(..).collect()
    }
}

impl InsetsPropertyReader for MockDisplayServer {
    fn read_insets_property(&mut self) -> Option<Vec<i64>> {
        self.property.clone()
    }
}

/// A toggle flag shared between a test and the reconciler it drives.
///
/// Stands in for the SIGUSR1 bridge: `trigger` plays the signal handler.
#[derive(Debug, Clone, Default)]
pub struct SharedToggle(Arc<AtomicBool>);

impl SharedToggle {
    /// Requests a toggle, as a delivered signal would.
    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl ToggleSource for SharedToggle {
    fn take_toggle(&mut self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}
