//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Sweep: removes expired cache entries and forgets idle rate-limit clients

mod sweep;

pub use sweep::{spawn_sweep_task, sweep_once, SweepReport, SweepTask};
