//! In-memory store.
//!
//! Backs the API integration tests and `clinic serve --memory`. All tables
//! live behind one `RwLock`, so every method is atomic in the same way a
//! MySQL transaction would be: booking counts and inserts under a single
//! write guard.

mod accounts;
mod catalog;
mod content;
mod scheduling;

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDateTime;

use clinic_core::accounts::{Admin, Doctor, User, WithPassword};
use clinic_core::announcement::Announcement;
use clinic_core::appointment::{Appointment, ImmunizationInfo, PrenatalInfo, VitalSigns};
use clinic_core::catalog::{PurposeRecord, Specialty};
use clinic_core::queue::QueueEntry;
use clinic_core::schedule::Schedule;
use clinic_core::{
    AdminId, AnnouncementId, AppointmentId, DoctorId, ImmunizationId, PatientId, PrenatalId,
    PurposeId, QueueId, ScheduleId, SpecialtyId, UserId,
};

use crate::error::{Error, Result};
use crate::traits::ClinicStore;

#[derive(Debug, Clone)]
struct StoredSchedule {
    schedule: Schedule,
    deleted_at: Option<NaiveDateTime>,
}

impl StoredSchedule {
    fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

#[derive(Debug, Clone)]
struct VitalsRow {
    patient_id: PatientId,
    seq: i64,
    vitals: VitalSigns,
}

#[derive(Debug, Clone)]
struct DiagnosisRow {
    patient_id: PatientId,
    seq: i64,
    diagnosis: String,
    created_at: NaiveDateTime,
}

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<UserId, WithPassword<User>>,
    doctors: BTreeMap<DoctorId, WithPassword<Doctor>>,
    admins: BTreeMap<AdminId, WithPassword<Admin>>,
    specialties: BTreeMap<SpecialtyId, Specialty>,
    purposes: BTreeMap<PurposeId, PurposeRecord>,
    schedules: BTreeMap<ScheduleId, StoredSchedule>,
    appointments: BTreeMap<AppointmentId, Appointment>,
    queue: BTreeMap<QueueId, QueueEntry>,
    announcements: BTreeMap<AnnouncementId, Announcement>,
    prenatal: BTreeMap<PrenatalId, PrenatalInfo>,
    immunizations: BTreeMap<ImmunizationId, ImmunizationInfo>,
    vitals: Vec<VitalsRow>,
    diagnoses: Vec<DiagnosisRow>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn live_schedule(&self, id: ScheduleId) -> Result<&Schedule> {
        self.schedules
            .get(&id)
            .filter(|s| s.is_live())
            .map(|s| &s.schedule)
            .ok_or_else(|| Error::not_found("schedule", id))
    }

    fn live_appointment_mut(&mut self, id: AppointmentId) -> Result<&mut Appointment> {
        self.appointments
            .get_mut(&id)
            .filter(|a| a.is_live())
            .ok_or_else(|| Error::not_found("appointment", id))
    }

    fn live_appointment(&self, id: AppointmentId) -> Result<&Appointment> {
        self.appointments
            .get(&id)
            .filter(|a| a.is_live())
            .ok_or_else(|| Error::not_found("appointment", id))
    }

    fn doctor(&self, id: DoctorId) -> Result<&Doctor> {
        self.doctors
            .get(&id)
            .map(|d| &d.account)
            .ok_or_else(|| Error::not_found("doctor", id))
    }

    fn user(&self, id: UserId) -> Result<&User> {
        self.users
            .get(&id)
            .map(|u| &u.account)
            .ok_or_else(|| Error::not_found("user", id))
    }

    fn live_schedule_count(&self, doctor: DoctorId) -> i64 {
        self.schedules
            .values()
            .filter(|s| s.is_live() && s.schedule.doctor_id == doctor)
            .count() as i64
    }

    fn specialty_name(&self, id: Option<SpecialtyId>) -> Option<String> {
        id.and_then(|id| self.specialties.get(&id))
            .map(|s| s.specialty_name.clone())
    }
}

/// Store keeping every table in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| Error::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| Error::Poisoned)
    }
}

impl ClinicStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }
}

fn now() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}
