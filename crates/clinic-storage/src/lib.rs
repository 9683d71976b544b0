//! # clinic-storage
//!
//! Persistence for the clinic appointment service.
//!
//! This crate provides:
//! - Repository traits, one per resource family, unified as [`ClinicStore`]
//! - [`MySqlStore`]: the production backend with embedded migrations
//! - [`MemoryStore`]: an in-process backend for tests and demos
//!
//! Both backends enforce the same slot capacity, soft-delete and status
//! rules; the domain checks themselves live in `clinic-core`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod error;
pub mod memory;
pub mod mysql;
pub mod traits;

mod proptests;

pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use mysql::MySqlStore;
pub use traits::{
    AccountStore, AnnouncementStore, AppointmentStore, CatalogStore, ClinicStore, QueueStore,
    RecordStore, ScheduleStore, StatsStore,
};
