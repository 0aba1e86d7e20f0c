//! `hd-model`: the entity model of the haul-dispatch simulator.
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`entity`]  | `Depot`, `DeliverySite`, `Truck`, `Order`, `Ticket`, `EntityRef` |
//! | [`stage`]   | `Stage`, `TicketState`, append-only `StageLog`              |
//! | [`yard`]    | `Yard` tables, name indexes, rosters, schedule exchange     |
//! | [`input`]   | CSV input records and loaders, `InputTables`                |
//! | [`builder`] | `YardBuilder`: input tables → `Yard` + registered resources |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                            |
//! |-----------|---------------------------------------------------|
//! | `serde`   | Serde derives on stage and duration types.        |
//! | `fx-hash` | FxHash instead of SipHash for the name indexes.   |

pub mod builder;
pub mod entity;
pub mod error;
pub mod input;
pub mod stage;
pub mod yard;

#[cfg(test)]
mod tests;

pub use builder::YardBuilder;
pub use entity::{DeliverySite, Depot, EntityRef, Order, StageDurations, Ticket, Truck};
pub use error::{ModelError, ModelResult};
pub use input::{
    load_depots_csv, load_depots_reader, load_orders_csv, load_orders_reader, load_sites_csv,
    load_sites_reader, load_tickets_csv, load_tickets_reader, load_trucks_csv, load_trucks_reader,
    DepotRecord, InputTables, OrderRecord, SiteRecord, TicketRecord, TruckRecord,
};
pub use stage::{Span, Stage, StageLog, TicketState};
pub use yard::Yard;
