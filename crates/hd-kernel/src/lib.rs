//! `hd-kernel`: the discrete-event engine under the haul-dispatch simulator.
//!
//! # Model
//!
//! ```text
//! Kernel<W>
//!   now            virtual clock, only ever moves forward
//!   EventQueue     (time, insertion seq) → process wake-up
//!   ResourcePool   counted slots with FIFO wait lines
//!   processes      Box<dyn Process<W>>, resumed one at a time
//!   world: W       domain state, mutated through Ctx::world
//! ```
//!
//! A process suspends by returning a [`Step`]: a sleep, a resource request,
//! or a race between the two ([`Step::RequestWithin`]).  The kernel resumes
//! it with a [`Wake`] saying which side fired.
//!
//! # Fatal vs recoverable
//!
//! Scheduling before `now`, releasing a slot twice, or exceeding a
//! resource's capacity panics.  A process returning `Err(ProcessError)` is
//! logged, recorded in [`Kernel::aborted`], stripped of any slots it holds,
//! and the run continues.

pub mod error;
pub mod kernel;
pub mod process;
pub mod queue;
pub mod resource;


pub use error::{ProcessError, ProcessResult};
pub use kernel::{AbortRecord, Ctx, Kernel};
pub use process::{Process, Step, Wake};
pub use queue::EventQueue;
pub use resource::{Resource, ResourcePool, ResourceToken};
