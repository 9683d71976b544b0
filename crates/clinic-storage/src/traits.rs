//! Repository traits.
//!
//! Each trait covers one resource family. [`ClinicStore`] is the union the
//! HTTP layer holds as `Arc<dyn ClinicStore>`.
//!
//! Conventions shared by every implementation:
//! - "live" means `deleted_at IS NULL`; soft-deleted rows behave as missing
//!   for reads and updates, except where a method says otherwise;
//! - missing records are [`clinic_core::Error::NotFound`];
//! - duplicate emails and duplicate live schedules are
//!   [`clinic_core::Error::Conflict`].

use async_trait::async_trait;
use chrono::NaiveDate;

use clinic_core::accounts::{
    Admin, AdminUpdate, Doctor, DoctorForPurpose, DoctorProfile, DoctorSummary, DoctorUpdate,
    NewAdmin, NewDoctor, NewUser, User, UserUpdate, WithPassword,
};
use clinic_core::announcement::{
    Announcement, AnnouncementUpdate, AnnouncementView, NewAnnouncement,
};
use clinic_core::appointment::{
    Appointment, AppointmentDetail, AppointmentUpdate, Booking, BookingReceipt, ImmunizationInfo,
    PatientDetails, PrenatalForm, PrenatalInfo, SlotBoard, UserAppointment, VisitRecord,
};
use clinic_core::catalog::{PurposeRecord, PurposeSummary, PurposeWithSpecialty, Specialty, SpecialtyInput};
use clinic_core::queue::{NewQueueEntry, QueueEntry, QueueUpdate, QueueView};
use clinic_core::schedule::{NewSchedule, Schedule, ScheduleView};
use clinic_core::stats::ClinicStats;
use clinic_core::{
    AdminId, AnnouncementId, AppointmentId, DayAvailability, DoctorId, PrenatalId, PurposeId,
    QueueId, ScheduleId, SpecialtyId, UserId,
};

use crate::error::Result;

/// Patient, doctor and admin accounts.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Inserts a patient account. Duplicate email is a conflict.
    async fn create_user(&self, user: NewUser) -> Result<User>;

    /// Looks up a patient with their password hash, for login.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<WithPassword<User>>>;

    /// Fetches one patient.
    async fn get_user(&self, id: UserId) -> Result<User>;

    /// All patients.
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Applies a partial profile update.
    async fn update_user(&self, id: UserId, update: UserUpdate) -> Result<User>;

    /// Inserts a doctor with status `active`.
    async fn create_doctor(&self, doctor: NewDoctor) -> Result<Doctor>;

    /// Looks up a doctor with their password hash, for login.
    async fn find_doctor_by_email(&self, email: &str) -> Result<Option<WithPassword<Doctor>>>;

    /// Doctor with specialty name and description.
    async fn doctor_profile(&self, id: DoctorId) -> Result<DoctorProfile>;

    /// Applies a partial profile update and stamps `updated_at`.
    async fn update_doctor(&self, id: DoctorId, update: DoctorUpdate) -> Result<Doctor>;

    /// Doctor directory. Each doctor's status is first recomputed from its
    /// live schedule count and persisted when it changed.
    async fn list_doctors(&self) -> Result<Vec<DoctorSummary>>;

    /// Doctors whose specialty owns `purpose`.
    async fn doctors_for_purpose(&self, purpose: PurposeId) -> Result<Vec<DoctorForPurpose>>;

    /// Looks up an admin with their password hash, for login.
    async fn find_admin_by_email(&self, email: &str) -> Result<Option<WithPassword<Admin>>>;

    /// Fetches one admin.
    async fn get_admin(&self, id: AdminId) -> Result<Admin>;

    /// Applies a partial profile update.
    async fn update_admin(&self, id: AdminId, update: AdminUpdate) -> Result<Admin>;

    /// Creates `admin` only when no admin exists yet. Returns the new account.
    async fn ensure_admin(&self, admin: NewAdmin) -> Result<Option<Admin>>;
}

/// Doctor specialties and visit purposes.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All specialties.
    async fn list_specialties(&self) -> Result<Vec<Specialty>>;

    /// One specialty.
    async fn get_specialty(&self, id: SpecialtyId) -> Result<Specialty>;

    /// Inserts a specialty.
    async fn create_specialty(&self, input: SpecialtyInput) -> Result<Specialty>;

    /// Replaces name and description.
    async fn update_specialty(&self, id: SpecialtyId, input: SpecialtyInput) -> Result<Specialty>;

    /// Deletes a specialty and its purposes.
    async fn delete_specialty(&self, id: SpecialtyId) -> Result<()>;

    /// Purposes owned by a specialty.
    async fn purposes_for_specialty(&self, id: SpecialtyId) -> Result<Vec<PurposeWithSpecialty>>;

    /// Adds a purpose to an existing specialty.
    async fn create_purpose(&self, specialty: SpecialtyId, name: &str) -> Result<PurposeRecord>;

    /// Renames a purpose.
    async fn rename_purpose(&self, id: PurposeId, name: &str) -> Result<PurposeRecord>;

    /// Deletes a purpose.
    async fn delete_purpose(&self, id: PurposeId) -> Result<()>;

    /// Distinct purposes offered by at least one active doctor.
    async fn offered_purposes(&self) -> Result<Vec<PurposeSummary>>;
}

/// Doctor schedules and slot availability.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Inserts a schedule. A second live schedule for the same doctor and
    /// date is a conflict; an unknown doctor is not found.
    async fn create_schedule(&self, schedule: NewSchedule) -> Result<Schedule>;

    /// Live schedules with doctor and specialty.
    async fn list_schedules(&self) -> Result<Vec<ScheduleView>>;

    /// Live schedules of one doctor.
    async fn schedules_for_doctor(&self, doctor: DoctorId) -> Result<Vec<ScheduleView>>;

    /// Whether the doctor has a live schedule on `date`.
    async fn has_schedule_on(&self, doctor: DoctorId, date: NaiveDate) -> Result<bool>;

    /// Remaining AM/PM places per live schedule of the doctor, by date.
    async fn available_slots(&self, doctor: DoctorId) -> Result<Vec<DayAvailability>>;

    /// Remaining AM/PM places of one live schedule.
    async fn remaining_slots(&self, schedule: ScheduleId) -> Result<DayAvailability>;

    /// Soft-deletes a schedule.
    async fn delete_schedule(&self, schedule: ScheduleId) -> Result<()>;
}

/// Appointment booking and lifecycle.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Reserves a place in the requested slot and records the intake form,
    /// all or nothing. Fails with `SlotFull` when the slot has no capacity.
    async fn book(&self, booking: Booking) -> Result<BookingReceipt>;

    /// One live appointment.
    async fn get_appointment(&self, id: AppointmentId) -> Result<Appointment>;

    /// Staff edit; status changes follow the appointment state machine.
    async fn update_appointment(
        &self,
        id: AppointmentId,
        update: AppointmentUpdate,
    ) -> Result<Appointment>;

    /// Soft-deletes a live appointment.
    async fn delete_appointment(&self, id: AppointmentId) -> Result<()>;

    /// Live appointments with patient data, split into AM and PM.
    async fn appointment_board(&self, doctor: Option<DoctorId>) -> Result<SlotBoard>;

    /// Live appointments with patient, doctor and schedule.
    async fn appointment_details(&self) -> Result<Vec<AppointmentDetail>>;

    /// Every appointment of a patient, including rejected ones.
    async fn user_appointments(&self, user: UserId) -> Result<Vec<UserAppointment>>;

    /// `Pending -> Rejected` and soft delete.
    async fn reject_appointment(&self, id: AppointmentId) -> Result<Appointment>;

    /// Stores remarks and, when given, vital signs and a diagnosis.
    async fn record_visit(&self, id: AppointmentId, visit: VisitRecord) -> Result<()>;

    /// Remarks plus latest vital signs and diagnosis of the appointment's patient.
    async fn patient_details(&self, id: AppointmentId) -> Result<PatientDetails>;
}

/// Visit queue.
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Queues a `Pending` appointment and approves it.
    async fn enqueue(&self, entry: NewQueueEntry) -> Result<QueueEntry>;

    /// Every entry, newest `processed_at` first.
    async fn list_queue(&self) -> Result<Vec<QueueView>>;

    /// Entry for an appointment.
    async fn queue_for_appointment(&self, appointment: AppointmentId) -> Result<QueueEntry>;

    /// Entries assigned to a doctor.
    async fn queue_for_doctor(&self, doctor: DoctorId) -> Result<Vec<QueueView>>;

    /// Edits status and assignee.
    async fn update_queue(&self, id: QueueId, update: QueueUpdate) -> Result<QueueEntry>;

    /// Completes the entry and its appointment together.
    async fn mark_queue_done(&self, id: QueueId) -> Result<QueueEntry>;

    /// Removes an entry.
    async fn delete_queue(&self, id: QueueId) -> Result<()>;
}

/// Admin announcements.
#[async_trait]
pub trait AnnouncementStore: Send + Sync {
    /// Inserts an announcement by an existing admin.
    async fn create_announcement(&self, announcement: NewAnnouncement) -> Result<Announcement>;

    /// All announcements with author names.
    async fn list_announcements(&self) -> Result<Vec<AnnouncementView>>;

    /// One announcement with author name.
    async fn get_announcement(&self, id: AnnouncementId) -> Result<AnnouncementView>;

    /// Replaces title and description.
    async fn update_announcement(
        &self,
        id: AnnouncementId,
        update: AnnouncementUpdate,
    ) -> Result<Announcement>;

    /// Deletes an announcement.
    async fn delete_announcement(&self, id: AnnouncementId) -> Result<()>;
}

/// Intake records outside the booking flow.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// One prenatal form.
    async fn get_prenatal(&self, id: PrenatalId) -> Result<PrenatalInfo>;

    /// Inserts a standalone prenatal form.
    async fn create_prenatal(&self, user: Option<UserId>, form: PrenatalForm) -> Result<PrenatalInfo>;

    /// Replaces a prenatal form.
    async fn update_prenatal(&self, id: PrenatalId, form: PrenatalForm) -> Result<PrenatalInfo>;

    /// Deletes a prenatal form.
    async fn delete_prenatal(&self, id: PrenatalId) -> Result<()>;

    /// First immunization form filed by a patient.
    async fn immunization_for_user(&self, user: UserId) -> Result<ImmunizationInfo>;

    /// Every immunization form.
    async fn list_immunizations(&self) -> Result<Vec<ImmunizationInfo>>;
}

/// Dashboard counters.
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Counters for the whole clinic, or for one doctor.
    async fn clinic_stats(&self, doctor: Option<DoctorId>) -> Result<ClinicStats>;

    /// Dates of live pending appointments in `[from, to]`.
    async fn pending_dates(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<NaiveDate>>;
}

/// Every store the service needs.
pub trait ClinicStore:
    AccountStore
    + CatalogStore
    + ScheduleStore
    + AppointmentStore
    + QueueStore
    + AnnouncementStore
    + RecordStore
    + StatsStore
{
    /// Backend name for logs.
    fn backend(&self) -> &'static str;
}
