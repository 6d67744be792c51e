//! The vehicle agent.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use sdn_control::{CentralComputeNode, ControlResult, Job, RouteSlot};
use sdn_core::{SimConfig, SubnetId, VehicleId, VehicleRng};
use sdn_spatial::{Route, RouteStep, Router};

use crate::VehiclePhase;

/// What a finished (or abandoned) trip looked like.
#[derive(Debug, Clone, PartialEq)]
pub struct TripSummary {
    pub vehicle:     VehicleId,
    pub source:      SubnetId,
    pub destination: SubnetId,
    pub position:    SubnetId,
    pub phase:       VehiclePhase,
    /// Successful road changes.
    pub hops:        u32,
    /// Refused road changes.
    pub blocked:     u32,
    /// Routes received from the dispatcher.
    pub routes:      u32,
    /// Join to leave, or `None` if the vehicle never left.
    pub trip_time:   Option<Duration>,
}

/// One vehicle: identity, where it is, where it is going, and the route it
/// is following.
///
/// The vehicle owns its [`RouteSlot`]; the node only holds a weak handle to
/// it from [`join`](Self::join) until the vehicle leaves.
pub struct Vehicle {
    id:          VehicleId,
    source:      SubnetId,
    position:    SubnetId,
    destination: SubnetId,
    slot:        Arc<RouteSlot>,
    itinerary:   VecDeque<RouteStep>,
    phase:       VehiclePhase,
    /// Start and length of the hop in progress.
    hop:         Option<(Instant, Duration)>,
    joined_at:   Option<Instant>,
    left_at:     Option<Instant>,
    hops:        u32,
    blocked:     u32,
    routes:      u32,
    rng:         VehicleRng,
}

impl Vehicle {
    pub fn new(id: VehicleId, source: SubnetId, destination: SubnetId, seed: u64) -> Self {
        Self {
            id,
            source,
            position: source,
            destination,
            slot: Arc::new(RouteSlot::new()),
            itinerary: VecDeque::new(),
            phase: VehiclePhase::Unjoined,
            hop: None,
            joined_at: None,
            left_at: None,
            hops: 0,
            blocked: 0,
            routes: 0,
            rng: VehicleRng::new(seed, id),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn id(&self) -> VehicleId {
        self.id
    }

    pub fn position(&self) -> SubnetId {
        self.position
    }

    pub fn destination(&self) -> SubnetId {
        self.destination
    }

    pub fn phase(&self) -> VehiclePhase {
        self.phase
    }

    pub fn slot(&self) -> &Arc<RouteSlot> {
        &self.slot
    }

    /// Steps still to take, not including the current position.
    pub fn remaining(&self) -> impl Iterator<Item = &RouteStep> + '_ {
        self.itinerary.iter()
    }

    pub fn summary(&self) -> TripSummary {
        TripSummary {
            vehicle:     self.id,
            source:      self.source,
            destination: self.destination,
            position:    self.position,
            phase:       self.phase,
            hops:        self.hops,
            blocked:     self.blocked,
            routes:      self.routes,
            trip_time:   self
                .joined_at
                .zip(self.left_at)
                .map(|(j, l)| l.saturating_duration_since(j)),
        }
    }

    /// Polling interval plus this vehicle's random jitter.
    pub fn poll_delay(&mut self, config: &SimConfig) -> Duration {
        config.poll_interval + self.rng.jitter(config.poll_jitter)
    }

    // ── Node protocol ─────────────────────────────────────────────────────

    /// Join the network at the source subnet.
    pub fn join<R: Router>(&mut self, node: &CentralComputeNode<R>, now: Instant) -> ControlResult<()> {
        node.join_network(self.id, self.position, &self.slot)?;
        self.joined_at = Some(now);
        self.phase = VehiclePhase::Idle;
        Ok(())
    }

    /// Queue a route request from the current position, unless one is
    /// already outstanding.  Returns `true` if a job was queued.
    ///
    /// The slot lock is released before the node is called.
    pub fn request_route<R: Router>(&mut self, node: &CentralComputeNode<R>) -> ControlResult<bool> {
        if !self.slot.mark_requested() {
            return Ok(false);
        }
        let job = Job::new(self.id, self.position, self.destination);
        if let Err(e) = node.queue_job(job) {
            self.slot.clear_requested();
            return Err(e);
        }
        self.phase = VehiclePhase::RoutePending;
        log::trace!("{} requested a route {} -> {}", self.id, self.position, self.destination);
        Ok(true)
    }

    /// Try to move onto the next step of the itinerary.
    ///
    /// On success the step is consumed and a hop of
    /// `config.hop_duration(step.cost)` starts.  On refusal the step stays
    /// at the head of the itinerary for the next attempt.
    pub fn try_road_change<R: Router>(
        &mut self,
        node:   &CentralComputeNode<R>,
        config: &SimConfig,
        now:    Instant,
    ) -> bool {
        let Some(&next) = self.itinerary.front() else {
            return false;
        };
        if !node.try_change_road(self.id, self.position, next.subnet) {
            self.blocked += 1;
            self.phase = VehiclePhase::Blocked;
            return false;
        }
        self.itinerary.pop_front();
        self.position = next.subnet;
        self.hop = Some((now, config.hop_duration(next.cost)));
        self.hops += 1;
        self.phase = VehiclePhase::Advancing;
        true
    }

    /// Advance the trip by one poll and return the new phase.
    ///
    /// # Errors
    ///
    /// Only node configuration errors (a source or destination outside the
    /// network).  Blocked moves and missing routes are phases, not errors.
    pub fn step<R: Router>(
        &mut self,
        node:   &CentralComputeNode<R>,
        config: &SimConfig,
        now:    Instant,
    ) -> ControlResult<VehiclePhase> {
        match self.phase {
            VehiclePhase::Left => return Ok(VehiclePhase::Left),
            VehiclePhase::Unjoined => {
                self.join(node, now)?;
                return Ok(self.phase);
            }
            _ => {}
        }

        if let Some((started, len)) = self.hop {
            if now.saturating_duration_since(started) < len {
                return Ok(self.phase);
            }
            self.hop = None;
        }

        if self.position == self.destination {
            if !node.leave_network(self.id, self.position) {
                log::debug!("{} was no longer registered when it left", self.id);
            }
            self.itinerary.clear();
            self.left_at = Some(now);
            self.phase = VehiclePhase::Left;
            log::debug!("{} arrived at {} after {} hops", self.id, self.position, self.hops);
            return Ok(self.phase);
        }

        if self.itinerary.is_empty() {
            match self.slot.take_route() {
                Some(route) => self.load(route),
                None => {
                    if !self.request_route(node)? && self.slot.is_requested() {
                        self.phase = VehiclePhase::RoutePending;
                    }
                    return Ok(self.phase);
                }
            }
            if self.itinerary.is_empty() {
                self.phase = VehiclePhase::Idle;
                return Ok(self.phase);
            }
        }

        self.try_road_change(node, config, now);
        Ok(self.phase)
    }

    /// Replace the itinerary with `route`, dropping the entry for the
    /// current position.  A route that does not start here is discarded.
    fn load(&mut self, route: Route) {
        self.routes += 1;
        if route.start != self.position || route.steps.first().map(|s| s.subnet) != Some(self.position) {
            log::warn!(
                "{} discarded a route starting at {} while at {}",
                self.id,
                route.start,
                self.position,
            );
            return;
        }
        self.itinerary = route.steps.into_iter().skip(1).collect();
        self.phase = VehiclePhase::Advancing;
    }
}
