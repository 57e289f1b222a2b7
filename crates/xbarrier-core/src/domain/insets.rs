//! Per-edge insets: how far each barrier sits inside its monitor edge.
//!
//! An inset of zero means "no reserved band": the barrier sits on the edge
//! itself.  A non-zero inset moves the barrier inward by that many pixels.
//!
//! Insets are established once at startup, from one of three sources:
//!
//! - four signed integers on the command line ([`Insets::new`]),
//! - the `_KATRIA_INSETS` property on the root window ([`Insets::from_property`]),
//! - the `[insets]` table of a TOML config file (via `serde`).
//!
//! All three funnel through the same non-negativity check, so a negative
//! value is rejected identically regardless of where it came from.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::geometry::Edge;

/// Number of items the `_KATRIA_INSETS` property must contain.
pub const PROPERTY_ITEM_COUNT: usize = 4;

/// Errors produced while building an [`Insets`] value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InsetsError {
    /// An inset was negative.  Only non-negative pixel offsets are valid.
    #[error("negative inset {value} for {edge} edge; insets must be >= 0")]
    Negative { edge: Edge, value: i64 },

    /// A property item does not fit into the inset's storage width.
    #[error("inset {value} for {edge} edge does not fit in a 32-bit signed integer")]
    OutOfRange { edge: Edge, value: i64 },

    /// The property held the wrong number of items.
    #[error("expected 4 inset values, found {0}")]
    WrongLength(usize),
}

/// Validated insets in pixels, in top/left/right/bottom order.
///
/// Every field is guaranteed to be `>= 0`; the only way to obtain a value is
/// through a validating constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "RawInsets", into = "RawInsets")]
pub struct Insets {
    top: i32,
    left: i32,
    right: i32,
    bottom: i32,
}

impl Insets {
    /// Insets of zero on every edge: barriers sit exactly on the monitor edges.
    pub const ZERO: Insets = Insets {
        top: 0,
        left: 0,
        right: 0,
        bottom: 0,
    };

    /// Builds insets from signed values, rejecting any negative one.
    ///
    /// # Errors
    ///
    /// Returns [`InsetsError::Negative`] naming the first offending edge in
    /// top/left/right/bottom order.
    pub fn new(top: i32, left: i32, right: i32, bottom: i32) -> Result<Self, InsetsError> {
        let insets = Self {
            top,
            left,
            right,
            bottom,
        };
        for edge in Edge::ALL {
            let value = insets.get(edge);
            if value < 0 {
                return Err(InsetsError::Negative {
                    edge,
                    value: i64::from(value),
                });
            }
        }
        Ok(insets)
    }

    /// Decodes the four items of the `_KATRIA_INSETS` property.
    ///
    /// X11 hands 32-bit property items back as C `long`s, which are wider
    /// than the inset fields on 64-bit hosts.  Rather than truncating, any
    /// item outside the `i32` range is reported as [`InsetsError::OutOfRange`].
    ///
    /// # Errors
    ///
    /// - [`InsetsError::WrongLength`] unless exactly four items are given.
    /// - [`InsetsError::OutOfRange`] if an item does not fit in an `i32`.
    /// - [`InsetsError::Negative`] if a decoded item is negative.
    pub fn from_property(items: &[i64]) -> Result<Self, InsetsError> {
        if items.len() != PROPERTY_ITEM_COUNT {
            return Err(InsetsError::WrongLength(items.len()));
        }

        let mut decoded = [0i32; PROPERTY_ITEM_COUNT];
        for ((slot, &value), edge) in decoded.iter_mut().zip(items).zip(Edge::ALL) {
            *slot = i32::try_from(value).map_err(|_| InsetsError::OutOfRange { edge, value })?;
        }

        let [top, left, right, bottom] = decoded;
        Self::new(top, left, right, bottom)
    }

    /// Returns the inset for one edge.
    pub fn get(&self, edge: Edge) -> i32 {
        match edge {
            Edge::Top => self.top,
            Edge::Left => self.left,
            Edge::Right => self.right,
            Edge::Bottom => self.bottom,
        }
    }

    pub fn top(&self) -> i32 {
        self.top
    }

    pub fn left(&self) -> i32 {
        self.left
    }

    pub fn right(&self) -> i32 {
        self.right
    }

    pub fn bottom(&self) -> i32 {
        self.bottom
    }
}

impl fmt::Display for Insets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "top {}, left {}, right {}, bottom {}",
            self.top, self.left, self.right, self.bottom
        )
    }
}

/// Unvalidated wire/config form of [`Insets`].
///
/// Missing fields default to zero so a config file only has to name the
/// edges it actually reserves.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct RawInsets {
    #[serde(default)]
    top: i64,
    #[serde(default)]
    left: i64,
    #[serde(default)]
    right: i64,
    #[serde(default)]
    bottom: i64,
}

impl TryFrom<RawInsets> for Insets {
    type Error = InsetsError;

    fn try_from(raw: RawInsets) -> Result<Self, Self::Error> {
        Insets::from_property(&[raw.top, raw.left, raw.right, raw.bottom])
    }
}

impl From<Insets> for RawInsets {
    fn from(insets: Insets) -> Self {
        Self {
            top: i64::from(insets.top),
            left: i64::from(insets.left),
            right: i64::from(insets.right),
            bottom: i64::from(insets.bottom),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_all_zero_insets() {
        let insets = Insets::new(0, 0, 0, 0).expect("zero insets are valid");
        assert_eq!(insets, Insets::ZERO);
    }

    #[test]
    fn test_new_keeps_values_in_top_left_right_bottom_order() {
        let insets = Insets::new(30, 1, 2, 40).expect("valid insets");

        assert_eq!(insets.top(), 30);
        assert_eq!(insets.left(), 1);
        assert_eq!(insets.right(), 2);
        assert_eq!(insets.bottom(), 40);
        assert_eq!(insets.get(Edge::Bottom), 40);
    }

    #[test]
    fn test_new_rejects_negative_top_inset() {
        let err = Insets::new(-5, 0, 0, 0).unwrap_err();
        assert_eq!(
            err,
            InsetsError::Negative {
                edge: Edge::Top,
                value: -5
            }
        );
    }

    #[test]
    fn test_new_reports_first_negative_edge() {
        let err = Insets::new(0, 0, -1, -2).unwrap_err();
        assert!(matches!(
            err,
            InsetsError::Negative {
                edge: Edge::Right,
                ..
            }
        ));
    }

    #[test]
    fn test_from_property_decodes_four_items() {
        let insets = Insets::from_property(&[24, 0, 0, 48]).expect("valid property");
        assert_eq!(insets, Insets::new(24, 0, 0, 48).unwrap());
    }

    #[test]
    fn test_from_property_rejects_wrong_item_count() {
        assert_eq!(
            Insets::from_property(&[1, 2, 3]),
            Err(InsetsError::WrongLength(3))
        );
        assert_eq!(Insets::from_property(&[]), Err(InsetsError::WrongLength(0)));
    }

    #[test]
    fn test_from_property_surfaces_values_wider_than_i32() {
        let too_big = i64::from(i32::MAX) + 1;
        let err = Insets::from_property(&[0, too_big, 0, 0]).unwrap_err();
        assert_eq!(
            err,
            InsetsError::OutOfRange {
                edge: Edge::Left,
                value: too_big
            }
        );
    }

    #[test]
    fn test_from_property_rejects_negative_items() {
        let err = Insets::from_property(&[0, 0, 0, -7]).unwrap_err();
        assert!(matches!(
            err,
            InsetsError::Negative {
                edge: Edge::Bottom,
                value: -7
            }
        ));
    }

    #[test]
    fn test_display_lists_every_edge() {
        let insets = Insets::new(1, 2, 3, 4).unwrap();
        assert_eq!(insets.to_string(), "top 1, left 2, right 3, bottom 4");
    }
}
