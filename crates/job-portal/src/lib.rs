//! Job board core: job catalog, application workflow and applicant profiles.
//!
//! HTTP wiring lives in [`board::router`]; process concerns (configuration, telemetry and the
//! top level error type) sit beside it so the API service can stay a thin binary.

pub mod board;
pub mod config;
pub mod error;
pub mod telemetry;
