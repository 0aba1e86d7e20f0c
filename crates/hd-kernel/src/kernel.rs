//! The `Kernel` pump and the `Ctx` handle processes act through.
//!
//! # Event loop
//!
//! ```text
//! loop:
//!   ① pop the earliest (time, seq) event; advance `now` to its time
//!   ② discard it if its process finished or has moved past that epoch
//!   ③ translate the cue into a `Wake` (a patience cue either delivers a
//!      grant that already happened or withdraws the queued request)
//!   ④ resume the process; apply the returned `Step`
//! ```
//!
//! Every resume bumps the process epoch, so at most one pending event per
//! process is live at any time.  That is how the losing side of a
//! request-or-timeout race is ignored without searching the queue.

use hd_core::{ProcessId, ResourceId, SimTime};
use tracing::{debug, trace, warn};

use crate::{EventQueue, Process, ResourcePool, ResourceToken, Resource, Step, Wake};

// ── Events ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cue {
    Start,
    Timeout,
    Grant,
    Patience,
}

#[derive(Debug)]
struct Event {
    pid:   ProcessId,
    epoch: u64,
    cue:   Cue,
}

/// A process that stopped with an error instead of finishing.
#[derive(Debug, Clone, PartialEq)]
pub struct AbortRecord {
    pub pid:    ProcessId,
    pub label:  String,
    pub at:     SimTime,
    pub reason: String,
}

// ── Core ──────────────────────────────────────────────────────────────────────

struct Slot<W> {
    label:      String,
    process:    Option<Box<dyn Process<W>>>,
    epoch:      u64,
    /// Token granted but not yet delivered to the process.
    granted:    Option<ResourceToken>,
    /// Resource whose wait line currently holds this process.
    waiting_on: Option<ResourceId>,
    finished:   bool,
}

pub(crate) struct Core<W> {
    now:              SimTime,
    queue:            EventQueue<Event>,
    resources:        ResourcePool,
    slots:            Vec<Slot<W>>,
    aborted:          Vec<AbortRecord>,
    events_processed: u64,
}

impl<W> Core<W> {
    /// # Panics
    /// Panics if `at` lies before the current instant.
    fn schedule(&mut self, at: SimTime, pid: ProcessId, cue: Cue) {
        assert!(
            at >= self.now,
            "cannot schedule {:?} for {pid} at {at}: clock is already at {}",
            cue,
            self.now
        );
        let epoch = self.slots[pid.index()].epoch;
        self.queue.push(at, Event { pid, epoch, cue });
    }

    fn spawn(&mut self, process: Box<dyn Process<W>>) -> ProcessId {
        let pid = ProcessId(self.slots.len() as u32);
        let label = process.label();
        debug!(%pid, %label, now = self.now.as_f64(), "spawn");
        self.slots.push(Slot {
            label,
            process: Some(process),
            epoch: 0,
            granted: None,
            waiting_on: None,
            finished: false,
        });
        self.schedule(self.now, pid, Cue::Start);
        pid
    }

    fn next_pid(&self) -> ProcessId {
        ProcessId(self.slots.len() as u32)
    }

    fn deliver_grant(&mut self, pid: ProcessId, token: ResourceToken) {
        let slot = &mut self.slots[pid.index()];
        slot.waiting_on = None;
        slot.granted = Some(token);
        self.schedule(self.now, pid, Cue::Grant);
    }

    /// Returns whether the slot was granted on the spot.
    fn request(&mut self, pid: ProcessId, rid: ResourceId) -> bool {
        match self.resources.get_mut(rid).request(pid) {
            Some(token) => {
                self.deliver_grant(pid, token);
                true
            }
            None => {
                self.slots[pid.index()].waiting_on = Some(rid);
                false
            }
        }
    }

    fn release(&mut self, token: ResourceToken) {
        let rid = token.resource();
        if let Some(grant) = self.resources.get_mut(rid).release(token) {
            trace!(resource = %rid, pid = %grant.pid, "grant from wait line");
            self.deliver_grant(grant.pid, grant.token);
        }
    }

    fn apply(&mut self, pid: ProcessId, step: Step) {
        match step {
            Step::Sleep(d) => self.schedule(self.now.after(d), pid, Cue::Timeout),
            Step::SleepUntil(t) => self.schedule(t, pid, Cue::Timeout),
            Step::Request(rid) => {
                self.request(pid, rid);
            }
            Step::RequestWithin(rid, patience) => {
                if !self.request(pid, rid) {
                    self.schedule(self.now.after(patience), pid, Cue::Patience);
                }
            }
            Step::Finish => self.retire(pid, false),
        }
    }

    /// Drop the process and give back everything it still holds or waits on.
    fn retire(&mut self, pid: ProcessId, aborted: bool) {
        let slot = &mut self.slots[pid.index()];
        slot.finished = true;
        slot.process = None;
        // Any undelivered token is also listed as a holder and is reclaimed below.
        slot.granted = None;
        if let Some(rid) = slot.waiting_on.take() {
            self.resources.get_mut(rid).revoke(pid);
        }

        let leaked: Vec<ResourceToken> =
            self.resources.iter().flat_map(|r| r.reclaim(pid)).collect();
        for token in leaked {
            if !aborted {
                warn!(%pid, resource = %token.resource(), "process finished while holding a slot");
            }
            self.release(token);
        }
    }
}

// ── Ctx ───────────────────────────────────────────────────────────────────────

/// The running process's view of the kernel.
pub struct Ctx<'a, W> {
    core:      &'a mut Core<W>,
    pub world: &'a mut W,
    pid:       ProcessId,
}

impl<W> Ctx<'_, W> {
    #[inline]
    pub fn now(&self) -> SimTime {
        self.core.now
    }

    /// Id of the process being resumed.
    #[inline]
    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    /// Register a new process; it starts at the current instant, after every
    /// event already queued for it.
    pub fn spawn<P: Process<W> + 'static>(&mut self, process: P) -> ProcessId {
        self.core.spawn(Box::new(process))
    }

    /// Spawn a process that takes over a slot the caller holds.  The new
    /// process becomes the slot's owner, so it is reclaimed if that process
    /// aborts.
    pub fn spawn_holding<P, F>(&mut self, token: ResourceToken, make: F) -> ProcessId
    where
        P: Process<W> + 'static,
        F: FnOnce(ResourceToken) -> P,
    {
        let pid = self.core.next_pid();
        self.core.resources.get_mut(token.resource()).transfer(&token, pid);
        self.core.spawn(Box::new(make(token)))
    }

    pub fn resource(&self, rid: ResourceId) -> &Resource {
        self.core.resources.get(rid)
    }

    pub fn resources(&self) -> &ResourcePool {
        &self.core.resources
    }

    /// Take a free slot without waiting.  Fails if the resource is full or
    /// has a wait line.
    pub fn try_acquire(&mut self, rid: ResourceId) -> Option<ResourceToken> {
        self.core.resources.get_mut(rid).try_acquire(self.pid)
    }

    /// Give a slot back.  A queued request is served at the current instant.
    ///
    /// # Panics
    /// Panics if the slot was already released.
    pub fn release(&mut self, token: ResourceToken) {
        self.core.release(token);
    }
}

// ── Kernel ────────────────────────────────────────────────────────────────────

/// Single-threaded discrete-event engine over a world of type `W`.
pub struct Kernel<W> {
    core:  Core<W>,
    world: W,
}

impl<W> Kernel<W> {
    pub fn new(world: W, resources: ResourcePool) -> Self {
        Self {
            core: Core {
                now: SimTime::ZERO,
                queue: EventQueue::new(),
                resources,
                slots: Vec::new(),
                aborted: Vec::new(),
                events_processed: 0,
            },
            world,
        }
    }

    pub fn spawn<P: Process<W> + 'static>(&mut self, process: P) -> ProcessId {
        self.core.spawn(Box::new(process))
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn now(&self) -> SimTime {
        self.core.now
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn into_world(self) -> W {
        self.world
    }

    pub fn resources(&self) -> &ResourcePool {
        &self.core.resources
    }

    pub fn aborted(&self) -> &[AbortRecord] {
        &self.core.aborted
    }

    pub fn events_processed(&self) -> u64 {
        self.core.events_processed
    }

    pub fn pending_events(&self) -> usize {
        self.core.queue.len()
    }

    pub fn next_event_time(&self) -> Option<SimTime> {
        self.core.queue.next_time()
    }

    pub fn label(&self, pid: ProcessId) -> &str {
        &self.core.slots[pid.index()].label
    }

    pub fn is_finished(&self, pid: ProcessId) -> bool {
        self.core.slots[pid.index()].finished
    }

    /// Processes that have neither finished nor aborted.
    pub fn live_processes(&self) -> usize {
        self.core.slots.iter().filter(|s| !s.finished).count()
    }

    // ── Driving ───────────────────────────────────────────────────────────

    /// Process one event.  Returns `false` once the queue is empty.
    pub fn step(&mut self) -> bool {
        let Some((at, event)) = self.core.queue.pop() else {
            return false;
        };
        assert!(at >= self.core.now, "event queue went backwards: {at} < {}", self.core.now);
        self.core.now = at;
        self.core.events_processed += 1;

        let pid = event.pid;
        let slot = &mut self.core.slots[pid.index()];
        if slot.finished || slot.epoch != event.epoch {
            trace!(%pid, cue = ?event.cue, "stale event");
            return true;
        }

        let wake = match event.cue {
            Cue::Start => Wake::Start,
            Cue::Timeout => Wake::Timeout,
            Cue::Grant => match slot.granted.take() {
                Some(token) => Wake::Granted(token),
                None => panic!("grant event for {pid} without a pending token"),
            },
            Cue::Patience => match slot.granted.take() {
                Some(token) => Wake::Granted(token),
                None => {
                    if let Some(rid) = slot.waiting_on.take() {
                        self.core.resources.get_mut(rid).revoke(pid);
                    }
                    Wake::Expired
                }
            },
        };

        self.resume(pid, wake);
        true
    }

    /// Run until no events remain.
    pub fn run(&mut self) {
        while self.step() {}
    }

    /// Process every event at or before `until`, then park the clock there.
    pub fn run_until(&mut self, until: SimTime) {
        while self.core.queue.next_time().is_some_and(|t| t <= until) {
            self.step();
        }
        if until > self.core.now {
            self.core.now = until;
        }
    }

    fn resume(&mut self, pid: ProcessId, wake: Wake) {
        let slot = &mut self.core.slots[pid.index()];
        slot.epoch += 1;
        slot.waiting_on = None;
        let Some(mut process) = slot.process.take() else {
            return;
        };

        let result = {
            let mut cx = Ctx { core: &mut self.core, world: &mut self.world, pid };
            process.resume(wake, &mut cx)
        };

        match result {
            Ok(Step::Finish) => {
                trace!(%pid, "finish");
                self.core.retire(pid, false);
            }
            Ok(step) => {
                self.core.slots[pid.index()].process = Some(process);
                self.core.apply(pid, step);
            }
            Err(e) => {
                let label = self.core.slots[pid.index()].label.clone();
                warn!(%pid, %label, now = self.core.now.as_f64(), reason = %e.reason, "process aborted");
                self.core.aborted.push(AbortRecord {
                    pid,
                    label,
                    at: self.core.now,
                    reason: e.reason,
                });
                self.core.retire(pid, true);
            }
        }
    }
}
