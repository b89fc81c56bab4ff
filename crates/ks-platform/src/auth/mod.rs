//! Authentication
//!
//! Bearer token validation and the per-request auth context.

pub mod token_service;
pub mod context;

pub use token_service::{AccessTokenClaims, TokenConfig, TokenService, extract_bearer_token};
pub use context::AuthContext;
