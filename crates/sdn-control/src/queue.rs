//! Pending route requests.

use std::collections::VecDeque;

use sdn_core::{SubnetId, VehicleId};

use crate::VehicleKey;

/// A request to plan a route for `vehicle` from `start` to `dest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Job {
    pub vehicle: VehicleId,
    pub start:   SubnetId,
    pub dest:    SubnetId,
}

impl Job {
    pub fn new(vehicle: VehicleId, start: SubnetId, dest: SubnetId) -> Self {
        Self { vehicle, start, dest }
    }

    /// The `(start, dest)` pair that dispatch batches on.
    #[inline]
    pub fn pair(&self) -> (SubnetId, SubnetId) {
        (self.start, self.dest)
    }
}

/// FIFO of jobs, each tagged with the registry key of the vehicle that
/// queued it.
///
/// There is no deduplication: a vehicle keeps to one outstanding job by
/// guarding with its own "route requested" flag.  Removal always preserves
/// the relative order of the jobs that stay.
#[derive(Debug, Default)]
pub struct JobQueue {
    jobs: VecDeque<(Job, VehicleKey)>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, job: Job, key: VehicleKey) {
        self.jobs.push_back((job, key));
    }

    pub fn front(&self) -> Option<&Job> {
        self.jobs.front().map(|(job, _)| job)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Jobs in queue order.
    pub fn iter(&self) -> impl Iterator<Item = &Job> + '_ {
        self.jobs.iter().map(|(job, _)| job)
    }

    /// Keep only the entries for which `keep` returns `true`.  Entries are
    /// visited exactly once, front to back.
    pub fn retain(&mut self, mut keep: impl FnMut(&Job, VehicleKey) -> bool) {
        self.jobs.retain(|(job, key)| keep(job, *key));
    }

    /// Drop every job queued under `key`.  Returns how many were removed.
    pub fn purge(&mut self, key: VehicleKey) -> usize {
        let before = self.jobs.len();
        self.jobs.retain(|(_, k)| *k != key);
        before - self.jobs.len()
    }
}
