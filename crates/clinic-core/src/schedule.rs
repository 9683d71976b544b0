//! Doctor schedules: one AM/PM capacity record per doctor per day.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::capacity::SlotCapacity;
use crate::ids::{DoctorId, ScheduleId, SpecialtyId};
use crate::slot::Slot;

/// A doctor's capacity for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Primary key
    pub id: ScheduleId,
    /// Doctor the schedule belongs to
    pub doctor_id: DoctorId,
    /// Day the schedule covers
    pub schedule_date: NaiveDate,
    /// Morning capacity
    pub am_max_patients: u32,
    /// Afternoon capacity
    pub pm_max_patients: u32,
    /// Last modification time
    pub updated_at: Option<NaiveDateTime>,
}

impl Schedule {
    /// Configured maximum for `slot`.
    pub fn max_patients(&self, slot: Slot) -> u32 {
        match slot {
            Slot::Am => self.am_max_patients,
            Slot::Pm => self.pm_max_patients,
        }
    }

    /// Capacity of `slot` given the number of live bookings in it.
    pub fn capacity(&self, slot: Slot, booked: u32) -> SlotCapacity {
        SlotCapacity::new(slot, self.max_patients(slot), booked)
    }
}

/// Fields for a new schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSchedule {
    /// Doctor the schedule belongs to
    pub doctor_id: DoctorId,
    /// Day the schedule covers
    pub schedule_date: NaiveDate,
    /// Morning capacity
    pub am_max_patients: u32,
    /// Afternoon capacity
    pub pm_max_patients: u32,
}

/// Schedule joined with its doctor and specialty, as listed to portals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleView {
    /// Schedule
    pub schedule_id: ScheduleId,
    /// Day the schedule covers
    pub schedule_date: NaiveDate,
    /// Morning capacity
    pub am_max_patients: u32,
    /// Afternoon capacity
    pub pm_max_patients: u32,
    /// Last modification time
    pub updated_at: Option<NaiveDateTime>,
    /// Doctor the schedule belongs to
    pub doctor_id: DoctorId,
    /// Doctor's name
    pub doctor_name: String,
    /// Doctor's email
    pub doctor_email: String,
    /// Doctor's specialty
    pub specialization_id: Option<SpecialtyId>,
    /// Doctor's specialty name
    pub doctor_specialization: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_picks_slot_maximum() {
        let schedule = Schedule {
            id: ScheduleId::new(3),
            doctor_id: DoctorId::new(1),
            schedule_date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            am_max_patients: 8,
            pm_max_patients: 4,
            updated_at: None,
        };
        assert_eq!(schedule.capacity(Slot::Am, 2).remaining(), 6);
        assert_eq!(schedule.capacity(Slot::Pm, 4).remaining(), 0);
    }
}
