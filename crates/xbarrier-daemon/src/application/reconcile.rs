//! Reconciler: the event loop that keeps barriers matched to the layout.
//!
//! # Event sources
//!
//! The loop multiplexes two sources onto one blocking wait:
//!
//! - the display connection becoming readable (layout-change notifications),
//! - the toggle signal interrupting the wait (`EINTR`).
//!
//! All state transitions happen in [`Reconciler::process_wake`], back on the
//! loop thread.  The signal handler only ever sets a flag.
//!
//! # One wake-up
//!
//! ```text
//! wait()                       -- readable, or interrupted by the signal
//!  └─ drain every pending event
//!       └─ any LayoutChanged -> remove live set once; reinstall if Active
//!  └─ take the toggle flag
//!       └─ set            -> flip state; remove live set; reinstall if Active
//! ```
//!
//! Layout changes are always handled before the toggle, so a layout change and
//! a toggle arriving together never install twice for the same concern.

use std::convert::Infallible;
use std::io;

use thiserror::Error;
use tracing::{debug, info};

use super::lifecycle::{BarrierError, BarrierManager, BarrierServer};

/// Error type for the reconciliation loop.  Every variant is fatal.
#[derive(Debug, Error)]
pub enum LoopError {
    /// The blocking wait failed for a reason other than signal delivery.
    #[error("waiting for display events failed: {0}")]
    Wait(#[source] io::Error),

    /// Installing barriers failed in a way that cannot be absorbed.
    #[error(transparent)]
    Barrier(#[from] BarrierError),
}

/// Whether barrier enforcement is switched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivationState {
    #[default]
    Active,
    Inactive,
}

impl ActivationState {
    /// Returns the opposite state.
    pub fn toggled(self) -> Self {
        match self {
            ActivationState::Active => ActivationState::Inactive,
            ActivationState::Inactive => ActivationState::Active,
        }
    }

    pub fn is_active(self) -> bool {
        self == ActivationState::Active
    }
}

/// A display event, reduced to what the loop cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayEvent {
    /// The root window was reconfigured; monitor geometry may have changed.
    LayoutChanged { width: i32, height: i32 },
    /// Any other event.  Drained and ignored.
    Other,
}

/// Why the blocking wait returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The display connection has data to read.
    Readable,
    /// A signal interrupted the wait.
    Interrupted,
}

/// The display connection seen as an event stream.
pub trait DisplayEventSource {
    /// Asks the server to report root window reconfiguration.
    fn subscribe_layout_changes(&mut self);

    /// Blocks until the connection is readable.
    ///
    /// Must not restart transparently when a signal arrives: an interrupted
    /// wait returns an error of kind [`io::ErrorKind::Interrupted`].  A toggle
    /// requested after the flag was last read, but before this call blocks,
    /// must still interrupt it.
    ///
    /// # Errors
    ///
    /// Returns the OS error that ended the wait.
    fn wait(&mut self) -> io::Result<()>;

    /// Removes and returns every event currently pending.
    fn drain_events(&mut self) -> Vec<DisplayEvent>;
}

/// A consumable "toggle requested" flag.
pub trait ToggleSource {
    /// Returns `true` if a toggle was requested since the last call, clearing
    /// the request.  Several requests between calls count as one.
    fn take_toggle(&mut self) -> bool;
}

/// What a single wake-up did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WakeReport {
    /// Layout-change events handled.
    pub layout_changes: usize,
    /// Whether the activation state was flipped.
    pub toggled: bool,
}

/// The reconciliation loop.
pub struct Reconciler<D, T>
where
    D: BarrierServer + DisplayEventSource,
    T: ToggleSource,
{
    manager: BarrierManager<D>,
    toggle: T,
    state: ActivationState,
}

impl<D, T> Reconciler<D, T>
where
    D: BarrierServer + DisplayEventSource,
    T: ToggleSource,
{
    /// Creates a reconciler in the `Active` state.  Nothing is installed
    /// until [`start`](Self::start) is called.
    pub fn new(manager: BarrierManager<D>, toggle: T) -> Self {
        Self {
            manager,
            toggle,
            state: ActivationState::Active,
        }
    }

    /// Performs the initial install and subscribes to layout changes.
    ///
    /// # Errors
    ///
    /// Returns [`LoopError::Barrier`] for fatal installation failures.
    pub fn start(&mut self) -> Result<(), LoopError> {
        if self.state.is_active() {
            self.manager.install_all()?;
        }
        self.manager.server_mut().subscribe_layout_changes();
        Ok(())
    }

    /// Runs forever: wait, then reconcile.
    ///
    /// # Errors
    ///
    /// Only returns on a fatal [`LoopError`].
    pub fn run(&mut self) -> Result<Infallible, LoopError> {
        loop {
            let outcome = self.wait()?;
            debug!("woke up: {outcome:?}");
            self.process_wake()?;
        }
    }

    /// Blocks until the display is readable or the toggle signal arrives.
    ///
    /// # Errors
    ///
    /// Returns [`LoopError::Wait`] for any failure other than `EINTR`.
    pub fn wait(&mut self) -> Result<WaitOutcome, LoopError> {
        match self.manager.server_mut().wait() {
            Ok(()) => Ok(WaitOutcome::Readable),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(WaitOutcome::Interrupted),
            Err(e) => Err(LoopError::Wait(e)),
        }
    }

    /// Handles everything that is pending after a wake-up: first all display
    /// events, then the toggle flag.  Each concern removes and reinstalls at
    /// most once per wake, however many events were drained.
    ///
    /// # Errors
    ///
    /// Returns [`LoopError::Barrier`] for fatal installation failures.
    pub fn process_wake(&mut self) -> Result<WakeReport, LoopError> {
        let mut report = WakeReport::default();

        for event in self.manager.server_mut().drain_events() {
            if let DisplayEvent::LayoutChanged { width, height } = event {
                info!("root window reconfigured to {width}x{height}");
                report.layout_changes += 1;
            }
        }

        // The monitor query is fresh either way, so one reinstall covers
        // every layout change drained in this wake.
        if report.layout_changes > 0 {
            self.reconcile()?;
        }

        if self.toggle.take_toggle() {
            self.state = self.state.toggled();
            info!("received toggle signal; barriers now {:?}", self.state);
            report.toggled = true;
            self.reconcile()?;
        }

        Ok(report)
    }

    /// Removes the live set, then reinstalls from a fresh monitor query if
    /// enforcement is active.
    fn reconcile(&mut self) -> Result<(), LoopError> {
        self.manager.remove_all();
        if self.state.is_active() {
            self.manager.install_all()?;
        }
        Ok(())
    }

    pub fn state(&self) -> ActivationState {
        self.state
    }

    pub fn manager(&self) -> &BarrierManager<D> {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut BarrierManager<D> {
        &mut self.manager
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mock::{MockDisplayServer, SharedToggle};
    use xbarrier_core::{Insets, MonitorRegion};

    fn reconciler() -> (Reconciler<MockDisplayServer, SharedToggle>, SharedToggle) {
        let server = MockDisplayServer::with_monitors(vec![MonitorRegion::new(0, 0, 1920, 1080)]);
        let toggle = SharedToggle::default();
        let reconciler = Reconciler::new(BarrierManager::new(server, Insets::ZERO), toggle.clone());
        (reconciler, toggle)
    }

    #[test]
    fn test_activation_state_starts_active_and_toggles() {
        assert_eq!(ActivationState::default(), ActivationState::Active);
        assert_eq!(ActivationState::Active.toggled(), ActivationState::Inactive);
        assert_eq!(ActivationState::Inactive.toggled(), ActivationState::Active);
    }

    #[test]
    fn test_start_installs_then_subscribes() {
        let (mut reconciler, _) = reconciler();

        reconciler.start().expect("start");

        let server = reconciler.manager().server();
        assert!(server.is_subscribed());
        assert_eq!(server.live_count(), 4);
    }

    #[test]
    fn test_layout_change_reinstalls_from_fresh_layout() {
        // Arrange
        let (mut reconciler, _) = reconciler();
        reconciler.start().unwrap();
        let server = reconciler.manager_mut().server_mut();
        server.set_monitors(vec![
            MonitorRegion::new(0, 0, 1920, 1080),
            MonitorRegion::new(1920, 0, 1280, 1024),
        ]);
        server.push_event(DisplayEvent::LayoutChanged {
            width: 3200,
            height: 1080,
        });

        // Act
        let report = reconciler.process_wake().unwrap();

        // Assert
        assert_eq!(report.layout_changes, 1);
        assert!(!report.toggled);
        assert_eq!(reconciler.state(), ActivationState::Active);
        assert_eq!(reconciler.manager().server().live_count(), 8);
        assert_eq!(reconciler.manager().server().destroyed().len(), 4);
    }

    #[test]
    fn test_burst_of_layout_changes_reinstalls_once() {
        // Arrange
        let (mut reconciler, _) = reconciler();
        reconciler.start().unwrap();
        let server = reconciler.manager_mut().server_mut();
        server.set_monitors(vec![MonitorRegion::new(0, 0, 2560, 1440)]);
        for (width, height) in [(1920, 1080), (2048, 1152), (2560, 1440)] {
            server.push_event(DisplayEvent::LayoutChanged { width, height });
        }
        let syncs_before = reconciler.manager().server().sync_count();

        // Act
        let report = reconciler.process_wake().unwrap();

        // Assert
        let server = reconciler.manager().server();
        assert_eq!(report.layout_changes, 3);
        assert_eq!(server.destroyed().len(), 4);
        assert_eq!(server.created().len(), 8);
        assert_eq!(server.live_count(), 4);
        assert_eq!(server.sync_count() - syncs_before, 2, "one remove, one install");
        assert_eq!(reconciler.manager().live().unwrap().descriptors()[2].x1, 2560);
    }

    #[test]
    fn test_other_events_are_drained_without_reconciling() {
        let (mut reconciler, _) = reconciler();
        reconciler.start().unwrap();
        reconciler.manager_mut().server_mut().push_event(DisplayEvent::Other);

        let report = reconciler.process_wake().unwrap();

        assert_eq!(report, WakeReport::default());
        assert_eq!(reconciler.manager().server().created().len(), 4);
        assert_eq!(reconciler.manager().server().pending_event_count(), 0);
    }

    #[test]
    fn test_toggle_deactivates_and_removes_barriers() {
        let (mut reconciler, toggle) = reconciler();
        reconciler.start().unwrap();

        toggle.trigger();
        let report = reconciler.process_wake().unwrap();

        assert!(report.toggled);
        assert_eq!(reconciler.state(), ActivationState::Inactive);
        assert!(!reconciler.manager().is_installed());
        assert_eq!(reconciler.manager().server().live_count(), 0);
    }

    #[test]
    fn test_layout_change_while_inactive_installs_nothing() {
        let (mut reconciler, toggle) = reconciler();
        reconciler.start().unwrap();
        toggle.trigger();
        reconciler.process_wake().unwrap();

        reconciler
            .manager_mut()
            .server_mut()
            .push_event(DisplayEvent::LayoutChanged {
                width: 1920,
                height: 1080,
            });
        reconciler.process_wake().unwrap();

        assert_eq!(reconciler.manager().server().live_count(), 0);
        assert_eq!(reconciler.manager().server().created().len(), 4);
    }

    #[test]
    fn test_repeated_signals_before_a_wake_collapse_into_one_toggle() {
        let (mut reconciler, toggle) = reconciler();
        reconciler.start().unwrap();

        toggle.trigger();
        toggle.trigger();
        toggle.trigger();
        reconciler.process_wake().unwrap();

        assert_eq!(reconciler.state(), ActivationState::Inactive);
        let report = reconciler.process_wake().unwrap();
        assert!(!report.toggled);
    }

    #[test]
    fn test_layout_change_is_handled_before_toggle_in_same_wake() {
        let (mut reconciler, toggle) = reconciler();
        reconciler.start().unwrap();
        reconciler
            .manager_mut()
            .server_mut()
            .push_event(DisplayEvent::LayoutChanged {
                width: 1920,
                height: 1080,
            });
        toggle.trigger();

        let report = reconciler.process_wake().unwrap();

        // Layout change reinstalls (4 more created), toggle then removes them.
        assert_eq!(report.layout_changes, 1);
        assert!(report.toggled);
        assert_eq!(reconciler.manager().server().created().len(), 8);
        assert_eq!(reconciler.manager().server().live_count(), 0);
    }

    #[test]
    fn test_wait_maps_interrupted_to_outcome() {
        let (mut reconciler, _) = reconciler();
        reconciler
            .manager_mut()
            .server_mut()
            .push_wait_result(Err(io::Error::from(io::ErrorKind::Interrupted)));

        assert_eq!(reconciler.wait().unwrap(), WaitOutcome::Interrupted);
        assert_eq!(reconciler.wait().unwrap(), WaitOutcome::Readable);
    }

    #[test]
    fn test_wait_failure_other_than_interrupt_is_fatal() {
        let (mut reconciler, _) = reconciler();
        reconciler
            .manager_mut()
            .server_mut()
            .push_wait_result(Err(io::Error::new(io::ErrorKind::Other, "bad file descriptor")));

        assert!(matches!(reconciler.wait(), Err(LoopError::Wait(_))));
    }
}
