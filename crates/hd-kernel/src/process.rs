//! The cooperative process protocol.
//!
//! A process is an explicit state machine.  The kernel calls
//! [`Process::resume`] with the reason it woke up; the process mutates the
//! world through [`Ctx`], then returns the [`Step`] it wants to suspend on.
//! Only one process runs at a time, so world mutation needs no locking.

use hd_core::{ResourceId, SimTime};

use crate::{Ctx, ProcessResult, ResourceToken};

/// Why a process is being resumed.
#[derive(Debug)]
pub enum Wake {
    /// First activation after `spawn`.
    Start,
    /// A `Sleep`/`SleepUntil` elapsed.
    Timeout,
    /// A `Request`/`RequestWithin` was served.  The process now owns the
    /// token and must release it exactly once.
    Granted(ResourceToken),
    /// The patience of a `RequestWithin` ran out first.  The queued request
    /// has already been withdrawn.
    Expired,
}

/// What a process suspends on next.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Resume after `d` time units with `Wake::Timeout`.
    Sleep(f64),
    /// Resume at an absolute instant with `Wake::Timeout`.
    SleepUntil(SimTime),
    /// Resume with `Wake::Granted` once the resource serves this request.
    Request(ResourceId),
    /// Race a request against a patience timer; resume with whichever wins.
    RequestWithin(ResourceId, f64),
    /// The process is done and is dropped.
    Finish,
}

/// A logical process driven by the kernel over world type `W`.
pub trait Process<W> {
    /// Short name used in logs and abort reports.
    fn label(&self) -> String;

    fn resume(&mut self, wake: Wake, cx: &mut Ctx<'_, W>) -> ProcessResult<Step>;
}
