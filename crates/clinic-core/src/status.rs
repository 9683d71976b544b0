//! Status enums and the appointment/queue state machines.
//!
//! Appointment lifecycle:
//!
//! ```text
//! Pending ──enqueue──▶ Approved ──mark done──▶ Done
//!    │
//!    └──reject──▶ Rejected
//! ```
//!
//! Queue lifecycle is `Processing ──▶ Done`. `Done` and `Rejected` are
//! terminal. Re-applying the current status is always accepted so that
//! idempotent client retries do not fail.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Lifecycle state of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AppointmentStatus {
    /// Booked, waiting for staff review.
    Pending,
    /// Accepted and placed in the visit queue.
    Approved,
    /// Visit completed.
    Done,
    /// Declined by staff; the appointment is soft-deleted.
    Rejected,
}

impl AppointmentStatus {
    /// Database and wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "Pending",
            AppointmentStatus::Approved => "Approved",
            AppointmentStatus::Done => "Done",
            AppointmentStatus::Rejected => "Rejected",
        }
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, AppointmentStatus::Done | AppointmentStatus::Rejected)
    }

    /// Whether moving from `self` to `to` is allowed.
    pub fn can_transition_to(self, to: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        self == to
            || matches!(
                (self, to),
                (Pending, Approved) | (Pending, Rejected) | (Approved, Done)
            )
    }

    /// Returns `to` if the transition is allowed.
    pub fn transition(self, to: AppointmentStatus) -> Result<AppointmentStatus> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(Error::InvalidTransition {
                from: self.to_string(),
                to: to.to_string(),
            })
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(AppointmentStatus::Pending),
            "approved" => Ok(AppointmentStatus::Approved),
            "done" => Ok(AppointmentStatus::Done),
            "rejected" => Ok(AppointmentStatus::Rejected),
            other => Err(Error::validation_field(
                "status",
                format!("unknown appointment status '{other}'"),
            )),
        }
    }
}

impl TryFrom<String> for AppointmentStatus {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<AppointmentStatus> for String {
    fn from(status: AppointmentStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Lifecycle state of a visit queue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum QueueStatus {
    /// Patient is waiting or being seen.
    Processing,
    /// Visit finished.
    Done,
}

impl QueueStatus {
    /// Database and wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            QueueStatus::Processing => "Processing",
            QueueStatus::Done => "Done",
        }
    }

    /// Whether moving from `self` to `to` is allowed.
    pub fn can_transition_to(self, to: QueueStatus) -> bool {
        self == to || (self == QueueStatus::Processing && to == QueueStatus::Done)
    }

    /// Returns `to` if the transition is allowed.
    pub fn transition(self, to: QueueStatus) -> Result<QueueStatus> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(Error::InvalidTransition {
                from: self.to_string(),
                to: to.to_string(),
            })
        }
    }

    /// `processed_at` value for an entry entering this status.
    pub fn processed_at(self, now: chrono::NaiveDateTime) -> Option<chrono::NaiveDateTime> {
        match self {
            QueueStatus::Done => Some(now),
            QueueStatus::Processing => None,
        }
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueueStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "processing" => Ok(QueueStatus::Processing),
            "done" => Ok(QueueStatus::Done),
            other => Err(Error::validation_field(
                "status",
                format!("unknown queue status '{other}'"),
            )),
        }
    }
}

impl TryFrom<String> for QueueStatus {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<QueueStatus> for String {
    fn from(status: QueueStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Whether a doctor currently has live schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoctorStatus {
    /// Has at least one live schedule.
    Active,
    /// Has no live schedules.
    Inactive,
}

impl DoctorStatus {
    /// Database representation.
    pub fn as_str(self) -> &'static str {
        match self {
            DoctorStatus::Active => "active",
            DoctorStatus::Inactive => "inactive",
        }
    }

    /// Status implied by the number of live schedules.
    pub fn from_schedule_count(count: i64) -> Self {
        if count > 0 {
            DoctorStatus::Active
        } else {
            DoctorStatus::Inactive
        }
    }
}

impl fmt::Display for DoctorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DoctorStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(DoctorStatus::Active),
            "inactive" => Ok(DoctorStatus::Inactive),
            other => Err(Error::validation_field(
                "status",
                format!("unknown doctor status '{other}'"),
            )),
        }
    }
}

/// Which portal an account belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Patient portal account.
    User,
    /// Doctor portal account.
    Doctor,
    /// Admin portal account.
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::User => "user",
            Role::Doctor => "doctor",
            Role::Admin => "admin",
        })
    }
}
