//! `hd-core`: foundational types for the haul-dispatch simulator.
//!
//! Every other `hd-*` crate depends on this one.  It has no `hd-*`
//! dependencies and only `rand` and `thiserror` externally, plus optional
//! `serde`.
//!
//! # What lives here
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`ids`]         | `DepotId`, `SiteId`, `TruckId`, `TicketId`, `OrderId`, `ResourceId`, `ProcessId` |
//! | [`time`]        | `SimTime` (continuous virtual instant)                    |
//! | [`geo`]         | `GeoPoint`, haversine distance, `travel_minutes`          |
//! | [`rng`]         | `SimRng` with independent per-stream seeding              |
//! | [`config`]      | `SimConfig`, `DispatchMode`, `DispatchPolicy`, `Horizon`  |
//! | [`error`]       | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |
//!           | Required to load `SimConfig` from JSON.                    |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{AssignmentConfig, DischargeConfig, DispatchMode, DispatchPolicy, Horizon, SimConfig};
pub use error::{CoreError, CoreResult};
pub use geo::{travel_minutes, GeoPoint};
pub use ids::{DepotId, OrderId, ProcessId, ResourceId, SiteId, TicketId, TruckId};
pub use rng::SimRng;
pub use time::SimTime;
