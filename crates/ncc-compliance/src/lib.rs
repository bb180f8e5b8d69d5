//! Building compliance checks against the energy-efficiency provisions of NCC Section J.

pub mod compliance;
pub mod config;
pub mod error;
pub mod telemetry;
