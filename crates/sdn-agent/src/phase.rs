//! Vehicle trip phases.

use std::fmt;

/// A vehicle's relationship to the compute node.
///
/// ```text
/// Unjoined → Idle → RoutePending → Advancing ⇄ Blocked
///                ↑                      │
///                └── route exhausted ───┘
///  … → Left   (at destination)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehiclePhase {
    /// Not yet known to the node.
    Unjoined,
    /// Joined, no route and no outstanding request.
    Idle,
    /// A job is queued; waiting for the dispatcher to deliver a route.
    RoutePending,
    /// Following a route; on a hop or about to take the next one.
    Advancing,
    /// The last road change was refused for lack of capacity.
    Blocked,
    /// Reached the destination and left the network.  Terminal.
    Left,
}

impl VehiclePhase {
    #[inline]
    pub fn is_joined(self) -> bool {
        !matches!(self, VehiclePhase::Unjoined | VehiclePhase::Left)
    }

    #[inline]
    pub fn is_done(self) -> bool {
        self == VehiclePhase::Left
    }
}

impl fmt::Display for VehiclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VehiclePhase::Unjoined     => "unjoined",
            VehiclePhase::Idle         => "idle",
            VehiclePhase::RoutePending => "route-pending",
            VehiclePhase::Advancing    => "advancing",
            VehiclePhase::Blocked      => "blocked",
            VehiclePhase::Left         => "left",
        };
        f.write_str(s)
    }
}
