//! Column decoding shared by the MySQL queries.

use std::str::FromStr;

use sqlx::Row;
use sqlx::mysql::MySqlRow;

use clinic_core::accounts::{Admin, Doctor, User};
use clinic_core::announcement::{Announcement, AnnouncementView};
use clinic_core::appointment::{
    Appointment, ImmunizationForm, ImmunizationInfo, PrenatalForm, PrenatalInfo,
};
use clinic_core::queue::QueueEntry;
use clinic_core::schedule::{Schedule, ScheduleView};
use clinic_core::Slot;

use crate::error::{Error, Result};

/// Narrows a MySQL insert id to the signed key type used by the ids.
pub(super) fn insert_id(result: &sqlx::mysql::MySqlQueryResult) -> i64 {
    i64::try_from(result.last_insert_id()).unwrap_or(i64::MAX)
}

/// Parses a `VARCHAR` status-like column through `FromStr`.
pub(super) fn parsed<T>(row: &MySqlRow, column: &'static str) -> Result<T>
where
    T: FromStr<Err = clinic_core::Error>,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|_| Error::Corrupt { column, value: raw })
}

/// Nullable `slot` column.
pub(super) fn slot(row: &MySqlRow, column: &'static str) -> Result<Option<Slot>> {
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|value| value.parse().map_err(|_| Error::Corrupt { column, value }))
        .transpose()
}

/// Id column decoded straight into a newtype.
pub(super) fn id<T: From<i64>>(row: &MySqlRow, column: &str) -> Result<T> {
    Ok(T::from(row.try_get::<i64, _>(column)?))
}

/// Nullable id column.
pub(super) fn opt_id<T: From<i64>>(row: &MySqlRow, column: &str) -> Result<Option<T>> {
    Ok(row.try_get::<Option<i64>, _>(column)?.map(T::from))
}

pub(super) const USER_COLUMNS: &str =
    "id, name, email, avatar, address, phone_number, birthdate, password";

pub(super) fn user(row: &MySqlRow) -> Result<User> {
    Ok(User {
        id: id(row, "id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        avatar: row.try_get("avatar")?,
        address: row.try_get("address")?,
        phone_number: row.try_get("phone_number")?,
        birthdate: row.try_get("birthdate")?,
    })
}

pub(super) const DOCTOR_COLUMNS: &str = "id, name, email, avatar, birthdate, address, \
     phone_number, specialization_id, status, updated_at, password";

pub(super) fn doctor(row: &MySqlRow) -> Result<Doctor> {
    Ok(Doctor {
        id: id(row, "id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        avatar: row.try_get("avatar")?,
        birthdate: row.try_get("birthdate")?,
        address: row.try_get("address")?,
        phone_number: row.try_get("phone_number")?,
        specialization_id: opt_id(row, "specialization_id")?,
        status: parsed(row, "status")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub(super) const ADMIN_COLUMNS: &str = "id, name, email, avatar, password";

pub(super) fn admin(row: &MySqlRow) -> Result<Admin> {
    Ok(Admin {
        id: id(row, "id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        avatar: row.try_get("avatar")?,
    })
}

pub(super) const SCHEDULE_COLUMNS: &str =
    "id, doctor_id, schedule_date, am_max_patients, pm_max_patients, updated_at";

pub(super) fn schedule(row: &MySqlRow) -> Result<Schedule> {
    Ok(Schedule {
        id: id(row, "id")?,
        doctor_id: id(row, "doctor_id")?,
        schedule_date: row.try_get("schedule_date")?,
        am_max_patients: row.try_get("am_max_patients")?,
        pm_max_patients: row.try_get("pm_max_patients")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Select list for [`schedule_view`]; expects `schedules s`, `doctors d`
/// and `doctor_specialties ds` in the FROM clause.
pub(super) const SCHEDULE_VIEW_SELECT: &str = "SELECT s.id AS schedule_id, s.schedule_date, \
     s.am_max_patients, s.pm_max_patients, s.updated_at, d.id AS doctor_id, \
     d.name AS doctor_name, d.email AS doctor_email, d.specialization_id, \
     ds.specialty_name AS doctor_specialization \
     FROM schedules s \
     JOIN doctors d ON d.id = s.doctor_id \
     LEFT JOIN doctor_specialties ds ON ds.id = d.specialization_id";

pub(super) fn schedule_view(row: &MySqlRow) -> Result<ScheduleView> {
    Ok(ScheduleView {
        schedule_id: id(row, "schedule_id")?,
        schedule_date: row.try_get("schedule_date")?,
        am_max_patients: row.try_get("am_max_patients")?,
        pm_max_patients: row.try_get("pm_max_patients")?,
        updated_at: row.try_get("updated_at")?,
        doctor_id: id(row, "doctor_id")?,
        doctor_name: row.try_get("doctor_name")?,
        doctor_email: row.try_get("doctor_email")?,
        specialization_id: opt_id(row, "specialization_id")?,
        doctor_specialization: row.try_get("doctor_specialization")?,
    })
}

pub(super) const APPOINTMENT_COLUMNS: &str = "id, user_id, doctor_id, schedule_id, \
     immunization_id, prenatal_id, patient_id, status, purpose_of_appointment, \
     appointment_date, slot, remarks, created_at, deleted_at";

pub(super) fn appointment(row: &MySqlRow) -> Result<Appointment> {
    Ok(Appointment {
        id: id(row, "id")?,
        user_id: id(row, "user_id")?,
        doctor_id: id(row, "doctor_id")?,
        schedule_id: id(row, "schedule_id")?,
        immunization_id: opt_id(row, "immunization_id")?,
        prenatal_id: opt_id(row, "prenatal_id")?,
        patient_id: opt_id(row, "patient_id")?,
        status: parsed(row, "status")?,
        purpose_of_appointment: row.try_get("purpose_of_appointment")?,
        appointment_date: row.try_get("appointment_date")?,
        slot: slot(row, "slot")?,
        remarks: row.try_get("remarks")?,
        created_at: row.try_get("created_at")?,
        deleted_at: row.try_get("deleted_at")?,
    })
}

pub(super) const QUEUE_COLUMNS: &str = "id, appointment_id, assigned_to, status, processed_at";

pub(super) fn queue_entry(row: &MySqlRow) -> Result<QueueEntry> {
    Ok(QueueEntry {
        id: id(row, "id")?,
        appointment_id: id(row, "appointment_id")?,
        assigned_to: opt_id(row, "assigned_to")?,
        status: parsed(row, "status")?,
        processed_at: row.try_get("processed_at")?,
    })
}

pub(super) fn announcement(row: &MySqlRow) -> Result<Announcement> {
    Ok(Announcement {
        id: id(row, "id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        created_by: id(row, "created_by")?,
        created_at: row.try_get("created_at")?,
    })
}

pub(super) fn announcement_view(row: &MySqlRow) -> Result<AnnouncementView> {
    Ok(AnnouncementView {
        announcement: announcement(row)?,
        created_by_name: row.try_get("created_by_name")?,
    })
}

pub(super) const PRENATAL_COLUMNS: &str =
    "id, user_id, name, age, address, occupation, husband_name, husband_age";

pub(super) fn prenatal(row: &MySqlRow) -> Result<PrenatalInfo> {
    Ok(PrenatalInfo {
        id: id(row, "id")?,
        user_id: opt_id(row, "user_id")?,
        form: PrenatalForm {
            name: row.try_get("name")?,
            age: row.try_get("age")?,
            address: row.try_get("address")?,
            occupation: row.try_get("occupation")?,
            husband_name: row.try_get("husband_name")?,
            husband_age: row.try_get("husband_age")?,
        },
    })
}

pub(super) const IMMUNIZATION_COLUMNS: &str = "id, user_id, child_name, birthdate, birthplace, \
     address, mother_name, father_name, birth_height, birth_weight, sex, health_center, \
     barangay, family_number";

pub(super) fn immunization(row: &MySqlRow) -> Result<ImmunizationInfo> {
    Ok(ImmunizationInfo {
        id: id(row, "id")?,
        user_id: opt_id(row, "user_id")?,
        form: ImmunizationForm {
            child_name: row.try_get("child_name")?,
            birthdate: row.try_get("birthdate")?,
            birthplace: row.try_get("birthplace")?,
            address: row.try_get("address")?,
            mother_name: row.try_get("mother_name")?,
            father_name: row.try_get("father_name")?,
            birth_height: row.try_get("birth_height")?,
            birth_weight: row.try_get("birth_weight")?,
            sex: row.try_get("sex")?,
            health_center: row.try_get("health_center")?,
            barangay: row.try_get("barangay")?,
            family_number: row.try_get("family_number")?,
        },
    })
}
