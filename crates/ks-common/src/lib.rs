//! Keystone Common
//!
//! Runtime utilities shared by the Keystone crates and binaries.

pub mod logging;

pub use logging::{init_default_logging, init_logging};
