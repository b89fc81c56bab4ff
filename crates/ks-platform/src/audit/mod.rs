//! Audit Log

pub mod entity;

pub use entity::AuditLog;
