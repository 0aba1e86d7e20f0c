//! `hd-dispatch`: the processes that move concrete from plant to site.
//!
//! All processes run on a [`hd_kernel::Kernel`] whose world is a [`Plant`].
//!
//! | Module         | Contents                                                  |
//! |----------------|-----------------------------------------------------------|
//! | [`plant`]      | `Plant` world state, resolved `Route` of a ticket         |
//! | [`lifecycle`]  | `TicketLifecycle`: one ticket from launch to `Done`       |
//! | [`controller`] | `DispatchController`: immediate, queue-gated, estimated   |
//! | [`assignment`] | `AssignmentLoop`: idle truck ↔ due ticket matching        |
//! | [`shift`]      | `TruckShift`: clock in, roster, clock out                 |
//! | [`forecast`]   | `ReleaseForecast` feeding the estimated policy            |
//! | [`sampler`]    | `DischargeSampler`: deterministic / triangular / Gaussian |
//! | [`stats`]      | `DeliveryStats` wait and discharge accumulators           |
//!
//! # Launch modes
//!
//! Without a fleet, spawn one `DispatchController` over every ticket.  With
//! a fleet, spawn one `AssignmentLoop` plus a `TruckShift` per truck; the
//! loop never finishes, so the run needs a horizon.

pub mod assignment;
pub mod controller;
pub mod error;
pub mod forecast;
pub mod lifecycle;
pub mod plant;
pub mod sampler;
pub mod shift;
pub mod stats;


pub use assignment::AssignmentLoop;
pub use controller::DispatchController;
pub use error::{DispatchError, DispatchResult};
pub use forecast::ReleaseForecast;
pub use lifecycle::TicketLifecycle;
pub use plant::{Plant, Route};
pub use sampler::DischargeSampler;
pub use shift::TruckShift;
pub use stats::{mean, std_dev, DeliveryStats};
