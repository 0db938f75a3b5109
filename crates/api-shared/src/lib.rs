//! # API Shared
//!
//! Shared definitions for the PSB HTTP surface.
//!
//! Contains:
//! - Request and response payloads (`payloads` module), with OpenAPI schemas
//! - Shared services like `HealthService`

pub mod health;
pub mod payloads;

pub use health::HealthService;
pub use payloads::*;
