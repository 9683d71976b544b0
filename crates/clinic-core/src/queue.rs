//! Visit queue entries created when an appointment is approved.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ids::{AppointmentId, DoctorId, QueueId, UserId};
use crate::slot::Slot;
use crate::status::{AppointmentStatus, QueueStatus};

/// One row of the visit queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    /// Primary key
    pub id: QueueId,
    /// Appointment being seen
    pub appointment_id: AppointmentId,
    /// Doctor handling the visit
    pub assigned_to: Option<DoctorId>,
    /// Processing until marked done
    pub status: QueueStatus,
    /// When the visit was marked done
    pub processed_at: Option<NaiveDateTime>,
}

/// Request to put an appointment in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NewQueueEntry {
    /// Appointment to enqueue; must be pending
    pub appointment_id: AppointmentId,
    /// Doctor handling the visit
    pub assigned_to: Option<DoctorId>,
}

/// Staff edit of a queue entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueUpdate {
    /// New status
    pub status: Option<QueueStatus>,
    /// Doctor to hand the visit to
    pub assigned_to: Option<DoctorId>,
}

impl QueueEntry {
    /// Applies `update`; entering `Done` stamps `processed_at` with `now`.
    pub fn apply(&mut self, update: QueueUpdate, now: NaiveDateTime) -> Result<()> {
        if let Some(status) = update.status {
            let next = self.status.transition(status)?;
            if next != self.status {
                self.processed_at = next.processed_at(now);
            }
            self.status = next;
        }
        if update.assigned_to.is_some() {
            self.assigned_to = update.assigned_to;
        }
        Ok(())
    }
}

/// Queue entry joined with its appointment, patient and assigned doctor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueView {
    /// Queue entry
    pub queue_id: QueueId,
    /// Appointment
    pub appointment_id: AppointmentId,
    /// Queue status
    pub status: QueueStatus,
    /// When the visit was marked done
    pub processed_at: Option<NaiveDateTime>,
    /// Doctor handling the visit
    pub assigned_to: Option<DoctorId>,
    /// Assigned doctor's name
    pub doctor_name: Option<String>,
    /// Patient account
    pub user_id: UserId,
    /// Patient's name
    pub user_name: String,
    /// Patient's email
    pub user_email: String,
    /// Visit purpose, e.g. "Prenatal"
    pub purpose_of_appointment: String,
    /// Day of the visit
    pub appointment_date: NaiveDate,
    /// Half-day slot; `None` on rows that predate slots
    pub slot: Option<Slot>,
    /// Status of the underlying appointment
    pub appointment_status: AppointmentStatus,
}

/// Newest `processed_at` first; entries still processing go last.
pub fn sort_newest_first(views: &mut [QueueView]) {
    views.sort_by(|a, b| {
        b.processed_at
            .cmp(&a.processed_at)
            .then_with(|| b.queue_id.cmp(&a.queue_id))
    });
}
