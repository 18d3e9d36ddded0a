#![allow(clippy::field_reassign_with_default)]

//! Crate computing vehicle performance figures (acceleration milestones, top
//! speed, steady-speed and drive cycle efficiency) from a road-load vehicle model
//! # Features:
//! - logging: emit `log` records from the simulation and metrics driver
//! - resources: bundle the reference city and highway drive cycles

#[macro_use]
pub mod macros;

pub mod catalog;
pub mod cycle;
pub mod imports;
pub mod params;
pub mod performance;
#[cfg(feature = "resources")]
pub mod resources;
pub mod simdrive;
pub mod traits;
pub mod utils;
pub mod vehicle;

pub use catalog::CycleCatalog;
pub use performance::{simulate_performance, PerfParams, PerformanceError, PerformanceReport};
pub use simdrive::{PhysicsModel, SimParams};
pub use traits::{SerdeAPI, SimulateVehicle, VehicleModel};
pub use vehicle::Vehicle;
