//! Application Aggregate
//!
//! Applications are owned by the enclosing platform layer. Keystone reads
//! them to resolve import/export targets and to derive policies for the
//! actions and module instances placed inside them.

pub mod entity;
pub mod repository;

pub use entity::Application;
pub use repository::ApplicationRepository;
