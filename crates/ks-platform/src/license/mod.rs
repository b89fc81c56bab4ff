//! Offline licensing

pub mod validator;

pub use validator::{License, LicenseOrigin, LicenseStatus, LicenseValidator};
