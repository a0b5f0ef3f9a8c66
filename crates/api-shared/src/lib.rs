//! # API Shared
//!
//! Shared definitions for the NurseNote APIs.
//!
//! Contains:
//! - Request and response bodies (`dto` module), with OpenAPI schemas
//! - The `HealthService` used by the health endpoint
//!
//! Used by `api-rest`; kept separate so other front ends can speak the same wire format.

pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
