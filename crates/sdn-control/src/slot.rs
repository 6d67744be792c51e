//! The vehicle-owned route mailbox.

use sdn_core::Guarded;
use sdn_spatial::Route;

#[derive(Debug, Default)]
struct SlotState {
    route:     Option<Route>,
    requested: bool,
}

/// A vehicle's route slot and its "route requested" flag, behind the
/// vehicle's own lock.
///
/// The vehicle owns the slot through an `Arc`; the node only keeps a `Weak`
/// to it.  Dispatch writes the route with [`set_route`](Self::set_route)
/// while holding the node lock, and the vehicle drains it with
/// [`take_route`](Self::take_route) on its own thread.
#[derive(Debug, Default)]
pub struct RouteSlot {
    state: Guarded<SlotState>,
}

impl RouteSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `route` and clear the requested flag.
    ///
    /// An empty route is dropped (the flag is still cleared) and `false` is
    /// returned; the previous contents of the slot are kept.
    pub fn set_route(&self, route: Route) -> bool {
        self.state.with(|s| {
            s.requested = false;
            if route.is_empty() {
                return false;
            }
            s.route = Some(route);
            true
        })
    }

    /// Set the requested flag.  Returns `false` if it was already set, in
    /// which case the caller must not queue another job.
    pub fn mark_requested(&self) -> bool {
        self.state.with(|s| !std::mem::replace(&mut s.requested, true))
    }

    pub fn clear_requested(&self) {
        self.state.with(|s| s.requested = false);
    }

    /// Remove and return the delivered route, if any.
    pub fn take_route(&self) -> Option<Route> {
        self.state.with(|s| s.route.take())
    }

    pub fn has_route(&self) -> bool {
        self.state.with(|s| s.route.is_some())
    }

    pub fn is_requested(&self) -> bool {
        self.state.with(|s| s.requested)
    }

    /// Clone of the delivered route without removing it.
    pub fn peek_route(&self) -> Option<Route> {
        self.state.with(|s| s.route.clone())
    }
}
