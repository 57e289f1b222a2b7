//! Startup use case: wait for another client to publish `_KATRIA_INSETS`.
//!
//! A panel or dock publishes the insets it needs on the root window.  It may
//! start after us, so the property is polled at a fixed interval for a
//! bounded number of attempts.  There is no backoff.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};
use xbarrier_core::{Insets, InsetsError};

/// Name of the root-window property holding `[top, left, right, bottom]`.
pub const INSETS_PROPERTY: &str = "_KATRIA_INSETS";

/// Error type for property polling.
#[derive(Debug, Error)]
pub enum PollError {
    /// The property never appeared with four items.
    #[error("could not read _KATRIA_INSETS after {0} attempts")]
    Timeout(u32),

    /// The property was present but its values are unusable.
    #[error("invalid _KATRIA_INSETS: {0}")]
    Invalid(#[from] InsetsError),
}

/// Reads the raw items of the insets property.
#[cfg_attr(test, mockall::automock)]
pub trait InsetsPropertyReader {
    /// Returns the property's integer items, or `None` if the property is
    /// missing or could not be read.
    fn read_insets_property(&mut self) -> Option<Vec<i64>>;
}

/// How often and how long to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    /// Once per second for a minute.
    fn default() -> Self {
        Self {
            attempts: 60,
            interval: Duration::from_secs(1),
        }
    }
}

/// Polls `reader` until it yields exactly four items, sleeping between
/// attempts with `sleep`.
///
/// A read with any other item count counts as "not there yet".
///
/// # Errors
///
/// - [`PollError::Timeout`] once `policy.attempts` reads have failed.
/// - [`PollError::Invalid`] if the four items do not decode to valid insets.
pub fn poll_insets<R, F>(reader: &mut R, policy: PollPolicy, mut sleep: F) -> Result<Insets, PollError>
where
    R: InsetsPropertyReader + ?Sized,
    F: FnMut(Duration),
{
    for attempt in 1..=policy.attempts {
        if let Some(items) = reader.read_insets_property() {
            if items.len() == xbarrier_core::domain::insets::PROPERTY_ITEM_COUNT {
                let insets = Insets::from_property(&items)?;
                info!("read {INSETS_PROPERTY} on attempt {attempt}: {insets}");
                return Ok(insets);
            }
            debug!("{INSETS_PROPERTY} has {} items, expected 4", items.len());
        }

        if attempt < policy.attempts {
            debug!("waiting for {INSETS_PROPERTY} ...");
            sleep(policy.interval);
        }
    }

    Err(PollError::Timeout(policy.attempts))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
