//! Event Store Records
//!
//! Domain events as persisted by the unit of work.

pub mod entity;

pub use entity::{Event, ContextData};
