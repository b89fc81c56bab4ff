//! Action Aggregate
//!
//! Actions ("queries") belong to a module, an action collection or an
//! application. They are written by module creation, publish, import and
//! archive; there is no standalone action API.

pub mod entity;
pub mod repository;

pub use entity::{Action, ActionContext, ActionSnapshot, DatasourceRef};
pub use repository::ActionRepository;
