//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Sweep: evicts idle cache entries and purges inactive rate-limit clients

mod cleanup;

pub use cleanup::{spawn_sweep_task, Sweep, SweepHandle};
