//! Counted-capacity resources with a FIFO wait line.
//!
//! A [`Resource`] of capacity C admits at most C holders.  Requests that
//! cannot be served immediately join the wait line and are granted strictly
//! in arrival order as holders release.  Each grant hands out a
//! [`ResourceToken`]; the token is not `Clone`, so a slot can only be
//! released by whoever owns it, and releasing an unknown token panics.
//!
//! Resources are registered in a [`ResourcePool`] before the kernel is built,
//! which lets domain tables store `ResourceId`s without holding a kernel
//! reference.

use std::collections::VecDeque;

use hd_core::{ProcessId, ResourceId};

// ── Tokens ────────────────────────────────────────────────────────────────────

/// Proof of holding one slot of a resource.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a held slot must be released exactly once"]
pub struct ResourceToken {
    resource: ResourceId,
    serial:   u64,
}

impl ResourceToken {
    #[inline]
    pub fn resource(&self) -> ResourceId {
        self.resource
    }
}

/// A queued request that was just served by a release.
#[derive(Debug)]
pub(crate) struct Grant {
    pub(crate) pid:   ProcessId,
    pub(crate) token: ResourceToken,
}

// ── Resource ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Resource {
    id:           ResourceId,
    name:         String,
    capacity:     usize,
    /// `(serial, owner)` for every outstanding token.
    holders:      Vec<(u64, ProcessId)>,
    waiting:      VecDeque<ProcessId>,
    next_serial:  u64,
    peak_users:   usize,
    total_grants: u64,
}

impl Resource {
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(id: ResourceId, name: impl Into<String>, capacity: usize) -> Self {
        let name = name.into();
        assert!(capacity >= 1, "resource {name} needs capacity >= 1");
        Self {
            id,
            name,
            capacity,
            holders: Vec::with_capacity(capacity),
            waiting: VecDeque::new(),
            next_serial: 0,
            peak_users: 0,
            total_grants: 0,
        }
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of outstanding tokens.
    pub fn users(&self) -> usize {
        self.holders.len()
    }

    /// Number of requests in the wait line.
    pub fn queue_len(&self) -> usize {
        self.waiting.len()
    }

    /// Highest concurrent holder count seen so far.
    pub fn peak_users(&self) -> usize {
        self.peak_users
    }

    pub fn total_grants(&self) -> u64 {
        self.total_grants
    }

    pub fn is_idle(&self) -> bool {
        self.holders.is_empty()
    }

    /// Owner of the slot identified by `token`.
    pub fn holder_of(&self, token: &ResourceToken) -> Option<ProcessId> {
        self.holders.iter().find(|(s, _)| *s == token.serial).map(|&(_, p)| p)
    }

    /// Grant a slot to `pid` only if one is free and nobody is waiting.
    pub(crate) fn try_acquire(&mut self, pid: ProcessId) -> Option<ResourceToken> {
        if self.waiting.is_empty() && self.holders.len() < self.capacity {
            Some(self.grant_to(pid))
        } else {
            None
        }
    }

    /// Grant a slot immediately if possible, otherwise join the wait line.
    pub(crate) fn request(&mut self, pid: ProcessId) -> Option<ResourceToken> {
        let token = self.try_acquire(pid);
        if token.is_none() {
            self.waiting.push_back(pid);
        }
        token
    }

    /// Free the slot behind `token`, serving the head of the wait line if any.
    ///
    /// # Panics
    /// Panics if `token` does not belong to this resource or was already
    /// released.
    pub(crate) fn release(&mut self, token: ResourceToken) -> Option<Grant> {
        assert_eq!(token.resource, self.id, "token released on the wrong resource");
        let pos = self
            .holders
            .iter()
            .position(|(s, _)| *s == token.serial)
            .unwrap_or_else(|| panic!("double release of {} slot #{}", self.name, token.serial));
        self.holders.swap_remove(pos);

        let pid = self.waiting.pop_front()?;
        let token = self.grant_to(pid);
        Some(Grant { pid, token })
    }

    /// Drop `pid`'s pending request.  Returns whether one was queued.
    pub(crate) fn revoke(&mut self, pid: ProcessId) -> bool {
        match self.waiting.iter().position(|&p| p == pid) {
            Some(pos) => {
                self.waiting.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Record `to` as the new owner of the slot behind `token`.
    pub(crate) fn transfer(&mut self, token: &ResourceToken, to: ProcessId) {
        let holder = self
            .holders
            .iter_mut()
            .find(|(s, _)| *s == token.serial)
            .unwrap_or_else(|| panic!("hand-over of a released {} slot", self.name));
        holder.1 = to;
    }

    /// Reclaim every slot still owned by `pid`, as tokens ready to release.
    pub(crate) fn reclaim(&self, pid: ProcessId) -> Vec<ResourceToken> {
        self.holders
            .iter()
            .filter(|(_, owner)| *owner == pid)
            .map(|&(serial, _)| ResourceToken { resource: self.id, serial })
            .collect()
    }

    fn grant_to(&mut self, pid: ProcessId) -> ResourceToken {
        let serial = self.next_serial;
        self.next_serial += 1;
        self.holders.push((serial, pid));
        assert!(
            self.holders.len() <= self.capacity,
            "resource {} over capacity ({} > {})",
            self.name,
            self.holders.len(),
            self.capacity
        );
        self.peak_users = self.peak_users.max(self.holders.len());
        self.total_grants += 1;
        ResourceToken { resource: self.id, serial }
    }
}

// ── ResourcePool ──────────────────────────────────────────────────────────────

/// All resources of one run, indexed by `ResourceId`.
#[derive(Debug, Default)]
pub struct ResourcePool {
    resources: Vec<Resource>,
}

impl ResourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new resource and return its id.
    pub fn add(&mut self, name: impl Into<String>, capacity: usize) -> ResourceId {
        let id = ResourceId(self.resources.len() as u32);
        self.resources.push(Resource::new(id, name, capacity));
        id
    }

    /// # Panics
    /// Panics on an id this pool never issued.
    pub fn get(&self, id: ResourceId) -> &Resource {
        &self.resources[id.index()]
    }

    pub(crate) fn get_mut(&mut self, id: ResourceId) -> &mut Resource {
        &mut self.resources[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
