#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Clinic Core Library
//!
//! Domain model for the clinic appointment service: record types, identifier
//! newtypes, AM/PM slot capacity arithmetic, appointment and queue state
//! machines, dashboard statistics and service configuration. Nothing in this
//! crate performs I/O beyond reading a config file.

pub mod accounts;
pub mod announcement;
pub mod appointment;
pub mod capacity;
pub mod catalog;
pub mod config;
pub mod error;
pub mod ids;
pub mod queue;
pub mod schedule;
pub mod slot;
pub mod stats;
pub mod status;
pub mod validate;

mod proptests;

// Re-exports for convenience
pub use capacity::{DayAvailability, SlotAvailability, SlotCapacity};
pub use config::ClinicConfig;
pub use error::{Error, Result};
pub use ids::*;
pub use slot::{Purpose, Slot};
pub use status::{AppointmentStatus, DoctorStatus, QueueStatus, Role};
