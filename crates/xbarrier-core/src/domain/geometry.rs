//! Barrier geometry: where the four barriers of one monitor go.
//!
//! # The zero-inset rule
//!
//! XFixes pointer barriers carry a *direction mask* naming the directions in
//! which the pointer may pass through.  A barrier with an empty mask blocks
//! motion both ways.
//!
//! - **Zero inset**: the barrier sits on the monitor edge and is
//!   omnidirectional.  Two neighbouring monitors share that edge line; if both
//!   barriers were directional they would coincide with opposite masks and
//!   each would let through exactly what the other blocks.
//! - **Non-zero inset**: the barrier moves inward by the inset and only lets
//!   the pointer move inward, away from the edge.  The pointer can enter the
//!   reserved band from the monitor's interior but cannot leave through it.
//!
//! | Edge   | Segment                                        | Mask when inset > 0 |
//! |--------|------------------------------------------------|---------------------|
//! | top    | `(x, y+t)` → `(x+w, y+t)`                      | `POSITIVE_Y`        |
//! | left   | `(x+l, y)` → `(x+l, y+h)`                      | `POSITIVE_X`        |
//! | right  | `(x+w-r, y)` → `(x+w-r, y+h)`                  | `NEGATIVE_X`        |
//! | bottom | `(x, y+h-b)` → `(x+w, y+h-b)`                  | `NEGATIVE_Y`        |

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::insets::Insets;

/// The four edges of a monitor, in barrier installation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Left,
    Right,
    Bottom,
}

impl Edge {
    /// All edges in the fixed per-monitor order: top, left, right, bottom.
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Left, Edge::Right, Edge::Bottom];

    /// The mask a directional barrier on this edge carries: the one inward
    /// direction the pointer may cross it in.
    pub fn inward(self) -> DirectionMask {
        match self {
            Edge::Top => DirectionMask(DirectionMask::POSITIVE_Y),
            Edge::Left => DirectionMask(DirectionMask::POSITIVE_X),
            Edge::Right => DirectionMask(DirectionMask::NEGATIVE_X),
            Edge::Bottom => DirectionMask(DirectionMask::NEGATIVE_Y),
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Edge::Top => "top",
            Edge::Left => "left",
            Edge::Right => "right",
            Edge::Bottom => "bottom",
        };
        f.write_str(name)
    }
}

/// Directions in which a barrier lets the pointer through.
///
/// Bit values match the XFixes `Barrier{Positive,Negative}{X,Y}` constants so
/// the mask can be handed to the server unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DirectionMask(pub u8);

impl DirectionMask {
    pub const POSITIVE_X: u8 = 1 << 0;
    pub const POSITIVE_Y: u8 = 1 << 1;
    pub const NEGATIVE_X: u8 = 1 << 2;
    pub const NEGATIVE_Y: u8 = 1 << 3;

    /// Blocks the pointer in every direction.
    pub const OMNIDIRECTIONAL: DirectionMask = DirectionMask(0);

    /// Returns `true` if the barrier blocks motion in every direction.
    pub fn is_omnidirectional(&self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if motion in `direction` (one of the bit constants)
    /// passes through the barrier.
    pub fn permits(&self, direction: u8) -> bool {
        self.0 & direction != 0
    }
}

/// One monitor's placement in the global screen coordinate space.
///
/// Re-queried from the display server on every reconciliation pass; never
/// cached across passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonitorRegion {
    /// X coordinate of the top-left corner (may be negative).
    pub x: i32,
    /// Y coordinate of the top-left corner (may be negative).
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl MonitorRegion {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// X coordinate of the right edge.
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Y coordinate of the bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }
}

/// A single pointer barrier: a line segment plus its direction mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BarrierDescriptor {
    /// The monitor edge this barrier guards.
    pub edge: Edge,
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub directions: DirectionMask,
}

impl fmt::Display for BarrierDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {}) -> ({}, {}) mask {:#x}",
            self.edge, self.x1, self.y1, self.x2, self.y2, self.directions.0
        )
    }
}

/// Computes the four barriers for one monitor, in top/left/right/bottom order.
///
/// Pure and deterministic.  Insets larger than the monitor are not clamped;
/// they produce segments outside the monitor, which the server accepts.
pub fn compute_barriers(monitor: &MonitorRegion, insets: &Insets) -> [BarrierDescriptor; 4] {
    Edge::ALL.map(|edge| compute_edge(monitor, insets.get(edge), edge))
}

fn compute_edge(monitor: &MonitorRegion, inset: i32, edge: Edge) -> BarrierDescriptor {
    let directions = if inset == 0 {
        DirectionMask::OMNIDIRECTIONAL
    } else {
        edge.inward()
    };

    let limit = match edge {
        Edge::Top | Edge::Bottom => monitor.height,
        Edge::Left | Edge::Right => monitor.width,
    };
    if inset >= limit {
        trace!("{edge} inset {inset} reaches past a monitor dimension of {limit}");
    }

    let (x1, y1, x2, y2) = match edge {
        Edge::Top => {
            let y = monitor.y.saturating_add(inset);
            (monitor.x, y, monitor.right(), y)
        }
        Edge::Left => {
            let x = monitor.x.saturating_add(inset);
            (x, monitor.y, x, monitor.bottom())
        }
        Edge::Right => {
            let x = monitor.right().saturating_sub(inset);
            (x, monitor.y, x, monitor.bottom())
        }
        Edge::Bottom => {
            let y = monitor.bottom().saturating_sub(inset);
            (monitor.x, y, monitor.right(), y)
        }
    };

    BarrierDescriptor {
        edge,
        x1,
        y1,
        x2,
        y2,
        directions,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn full_hd() -> MonitorRegion {
        MonitorRegion::new(0, 0, 1920, 1080)
    }

    #[test]
    fn test_zero_insets_produce_four_omnidirectional_edge_barriers() {
        // Arrange
        let monitor = full_hd();

        // Act
        let [top, left, right, bottom] = compute_barriers(&monitor, &Insets::ZERO);

        // Assert
        assert_eq!((top.x1, top.y1, top.x2, top.y2), (0, 0, 1920, 0));
        assert_eq!((left.x1, left.y1, left.x2, left.y2), (0, 0, 0, 1080));
        assert_eq!((right.x1, right.y1, right.x2, right.y2), (1920, 0, 1920, 1080));
        assert_eq!((bottom.x1, bottom.y1, bottom.x2, bottom.y2), (0, 1080, 1920, 1080));
        for barrier in [top, left, right, bottom] {
            assert!(barrier.directions.is_omnidirectional());
        }
    }

    #[test]
    fn test_top_inset_moves_only_the_top_barrier_inward() {
        let insets = Insets::new(30, 0, 0, 0).unwrap();

        let [top, left, right, bottom] = compute_barriers(&full_hd(), &insets);

        assert_eq!((top.x1, top.y1, top.x2, top.y2), (0, 30, 1920, 30));
        assert_eq!(top.directions, DirectionMask(DirectionMask::POSITIVE_Y));
        assert!(!top.directions.permits(DirectionMask::NEGATIVE_Y));
        assert!(left.directions.is_omnidirectional());
        assert!(right.directions.is_omnidirectional());
        assert!(bottom.directions.is_omnidirectional());
        assert_eq!(left.x1, 0);
        assert_eq!(right.x1, 1920);
        assert_eq!(bottom.y1, 1080);
    }

    #[test]
    fn test_each_single_inset_yields_exactly_one_directional_barrier() {
        for (index, edge) in Edge::ALL.into_iter().enumerate() {
            let mut values = [0; 4];
            values[index] = 25;
            let insets = Insets::new(values[0], values[1], values[2], values[3]).unwrap();

            let barriers = compute_barriers(&full_hd(), &insets);

            let directional: Vec<_> = barriers
                .iter()
                .filter(|b| !b.directions.is_omnidirectional())
                .collect();
            assert_eq!(directional.len(), 1, "edge {edge}");
            assert_eq!(directional[0].edge, edge);
            assert_eq!(directional[0].directions, edge.inward());
        }
    }

    #[test]
    fn test_right_and_bottom_insets_are_measured_from_the_far_edge() {
        let monitor = MonitorRegion::new(1920, 0, 2560, 1440);
        let insets = Insets::new(0, 0, 10, 40).unwrap();

        let [_, _, right, bottom] = compute_barriers(&monitor, &insets);

        assert_eq!((right.x1, right.y1, right.x2, right.y2), (4470, 0, 4470, 1440));
        assert_eq!(right.directions, DirectionMask(DirectionMask::NEGATIVE_X));
        assert_eq!((bottom.x1, bottom.y1, bottom.x2, bottom.y2), (1920, 1400, 4480, 1400));
        assert_eq!(bottom.directions, DirectionMask(DirectionMask::NEGATIVE_Y));
    }

    #[test]
    fn test_negative_monitor_origin_is_respected() {
        let monitor = MonitorRegion::new(-1280, -200, 1280, 1024);

        let [top, left, ..] = compute_barriers(&monitor, &Insets::ZERO);

        assert_eq!((top.x1, top.y1, top.x2, top.y2), (-1280, -200, 0, -200));
        assert_eq!((left.x1, left.y1, left.x2, left.y2), (-1280, -200, -1280, 824));
    }

    #[test]
    fn test_oversized_inset_is_not_clamped() {
        let insets = Insets::new(0, 5000, 0, 0).unwrap();

        let [_, left, ..] = compute_barriers(&full_hd(), &insets);

        assert_eq!(left.x1, 5000);
        assert_eq!(left.directions, DirectionMask(DirectionMask::POSITIVE_X));
    }

    #[test]
    fn test_barriers_come_out_in_top_left_right_bottom_order() {
        let edges: Vec<Edge> = compute_barriers(&full_hd(), &Insets::ZERO)
            .iter()
            .map(|b| b.edge)
            .collect();
        assert_eq!(edges, Edge::ALL.to_vec());
    }
}
