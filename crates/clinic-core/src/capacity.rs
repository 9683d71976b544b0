//! Slot capacity arithmetic.
//!
//! A schedule carries one capacity per [`Slot`]. Only live appointments
//! (not soft-deleted) count as booked. Stores compute `booked` while holding
//! a lock on the schedule and then call [`SlotCapacity::reserve`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ids::ScheduleId;
use crate::slot::Slot;

/// Capacity and bookings of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotCapacity {
    /// Slot this capacity belongs to
    pub slot: Slot,
    /// Configured maximum
    pub max_patients: u32,
    /// Live appointments in the slot
    pub booked: u32,
}

impl SlotCapacity {
    /// Creates a capacity record.
    pub fn new(slot: Slot, max_patients: u32, booked: u32) -> Self {
        Self {
            slot,
            max_patients,
            booked,
        }
    }

    /// Places left. Overbooked slots (capacity lowered after booking) report zero.
    pub fn remaining(&self) -> u32 {
        self.max_patients.saturating_sub(self.booked)
    }

    /// Whether no place is left.
    pub fn is_full(&self) -> bool {
        self.booked >= self.max_patients
    }

    /// Takes one place, or fails with [`Error::SlotFull`].
    pub fn reserve(self) -> Result<SlotCapacity> {
        if self.is_full() {
            return Err(Error::SlotFull {
                slot: self.slot,
                max_patients: self.max_patients,
            });
        }
        Ok(SlotCapacity {
            booked: self.booked + 1,
            ..self
        })
    }
}

/// Remaining places in a slot, as reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAvailability {
    /// Places left
    pub remaining_slots: u32,
}

impl From<SlotCapacity> for SlotAvailability {
    fn from(capacity: SlotCapacity) -> Self {
        Self {
            remaining_slots: capacity.remaining(),
        }
    }
}

/// AM and PM availability for one schedule day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAvailability {
    /// Schedule the figures belong to
    pub schedule_id: ScheduleId,
    /// Day of the schedule
    pub schedule_date: NaiveDate,
    /// Morning availability
    pub am: SlotAvailability,
    /// Afternoon availability
    pub pm: SlotAvailability,
}

impl DayAvailability {
    /// Builds availability from both slot capacities.
    pub fn new(
        schedule_id: ScheduleId,
        schedule_date: NaiveDate,
        am: SlotCapacity,
        pm: SlotCapacity,
    ) -> Self {
        Self {
            schedule_id,
            schedule_date,
            am: am.into(),
            pm: pm.into(),
        }
    }

    /// Places left across both slots.
    pub fn total_remaining(&self) -> u32 {
        self.am.remaining_slots + self.pm.remaining_slots
    }
}
