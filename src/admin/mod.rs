//! Admin API.
//!
//! # Endpoints
//! - `GET /admin/backends`: breaker state of every backend in rotation order
//!
//! # Design Decisions
//! - Read-only: viewing a backend never closes its circuit
//! - Served on the main listener when `admin.enabled`

pub mod handlers;
