//! Domain entities for xpointerbarrier.
//!
//! Pure types and rules with no infrastructure dependencies.  The daemon's
//! application layer combines these with a display-server adapter; nothing in
//! here knows that X11 exists.

/// Monitor regions, edges, direction masks and the barrier geometry rule.
pub mod geometry;

/// Validated per-edge insets.
///
/// See [`insets::Insets`] for the main type.
pub mod insets;
