//! Patient, doctor and admin accounts.
//!
//! Password hashes never appear in these records; stores hand them out
//! separately through [`WithPassword`] for login checks only.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::ids::{AdminId, DoctorId, SpecialtyId, UserId};
use crate::status::DoctorStatus;

/// An account record paired with its stored password hash.
#[derive(Debug, Clone)]
pub struct WithPassword<T> {
    /// The account
    pub account: T,
    /// bcrypt hash
    pub password_hash: String,
}

/// Patient-portal account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Primary key
    pub id: UserId,
    /// Full name
    pub name: String,
    /// Login email, stored lowercase
    pub email: String,
    /// Avatar image URL
    pub avatar: Option<String>,
    /// Home address
    pub address: Option<String>,
    /// Contact number
    #[serde(rename = "phone")]
    pub phone_number: Option<String>,
    /// Date of birth
    #[serde(rename = "birthday")]
    pub birthdate: Option<NaiveDate>,
}

/// Fields for a new patient account.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Full name
    pub name: String,
    /// Login email, stored lowercase
    pub email: String,
    /// bcrypt hash
    pub password_hash: String,
    /// Avatar image URL
    pub avatar: Option<String>,
    /// Date of birth
    pub birthdate: Option<NaiveDate>,
    /// Home address
    pub address: Option<String>,
    /// Contact number
    pub phone_number: Option<String>,
}

/// Partial profile update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    /// Full name
    pub name: Option<String>,
    /// Login email, stored lowercase
    pub email: Option<String>,
    /// Avatar image URL
    pub avatar: Option<String>,
    /// Date of birth
    pub birthdate: Option<NaiveDate>,
    /// Home address
    pub address: Option<String>,
    /// Contact number
    pub phone_number: Option<String>,
}

impl User {
    /// Applies the present fields of `update`.
    pub fn apply(&mut self, update: UserUpdate) {
        if let Some(v) = update.name {
            self.name = v;
        }
        if let Some(v) = update.email {
            self.email = v;
        }
        if update.avatar.is_some() {
            self.avatar = update.avatar;
        }
        if update.birthdate.is_some() {
            self.birthdate = update.birthdate;
        }
        if update.address.is_some() {
            self.address = update.address;
        }
        if update.phone_number.is_some() {
            self.phone_number = update.phone_number;
        }
    }
}

/// Doctor-portal account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    /// Primary key
    pub id: DoctorId,
    /// Full name
    pub name: String,
    /// Login email, stored lowercase
    pub email: String,
    /// Avatar image URL
    pub avatar: Option<String>,
    /// Date of birth
    pub birthdate: Option<NaiveDate>,
    /// Home address
    pub address: Option<String>,
    /// Contact number
    pub phone_number: Option<String>,
    /// Specialty the doctor practices
    pub specialization_id: Option<SpecialtyId>,
    /// Active while the doctor has live schedules
    pub status: DoctorStatus,
    /// Last modification time
    pub updated_at: Option<NaiveDateTime>,
}

/// Doctor with the name and description of their specialty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorProfile {
    /// The doctor account
    #[serde(flatten)]
    pub doctor: Doctor,
    /// Specialty name
    pub specialty_name: Option<String>,
    /// Free-text description
    pub description: Option<String>,
}

/// Row of the doctor directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorSummary {
    /// The doctor account
    #[serde(flatten)]
    pub doctor: Doctor,
    /// Specialty name
    pub specialization: Option<String>,
    /// Live schedules on record
    pub active_schedule_count: i64,
}

/// Doctor offering a given visit purpose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorForPurpose {
    /// Doctor account
    pub doctor_id: DoctorId,
    /// Doctor's name
    pub doctor_name: String,
    /// Doctor's email
    pub doctor_email: String,
    /// Doctor's avatar URL
    pub doctor_avatar: Option<String>,
    /// Doctor's contact number
    pub phone_number: Option<String>,
    /// Doctor's address
    pub address: Option<String>,
    /// Specialty offering the purpose
    pub specialty_name: String,
}

/// Fields for a new doctor account. New doctors start `active`.
#[derive(Debug, Clone)]
pub struct NewDoctor {
    /// Full name
    pub name: String,
    /// Login email, stored lowercase
    pub email: String,
    /// bcrypt hash
    pub password_hash: String,
    /// Date of birth
    pub birthdate: Option<NaiveDate>,
    /// Home address
    pub address: Option<String>,
    /// Specialty the doctor practices; must exist
    pub specialization_id: SpecialtyId,
    /// Contact number
    pub phone_number: Option<String>,
}

/// Partial doctor profile update.
#[derive(Debug, Clone, Default)]
pub struct DoctorUpdate {
    /// Full name
    pub name: Option<String>,
    /// Login email, stored lowercase
    pub email: Option<String>,
    /// bcrypt hash
    pub password_hash: Option<String>,
    /// Avatar image URL
    pub avatar: Option<String>,
    /// Date of birth
    pub birthdate: Option<NaiveDate>,
    /// Home address
    pub address: Option<String>,
    /// Contact number
    pub phone_number: Option<String>,
    /// New directory status
    pub status: Option<DoctorStatus>,
    /// Specialty the doctor practices
    pub specialization_id: Option<SpecialtyId>,
}

impl DoctorUpdate {
    /// Whether any profile column (besides `updated_at`) changes.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.avatar.is_none()
            && self.birthdate.is_none()
            && self.address.is_none()
            && self.phone_number.is_none()
            && self.status.is_none()
            && self.specialization_id.is_none()
    }
}

impl Doctor {
    /// Applies the present non-secret fields of `update`.
    pub fn apply(&mut self, update: &DoctorUpdate) {
        if let Some(v) = &update.name {
            self.name = v.clone();
        }
        if let Some(v) = &update.email {
            self.email = v.clone();
        }
        if update.avatar.is_some() {
            self.avatar = update.avatar.clone();
        }
        if update.birthdate.is_some() {
            self.birthdate = update.birthdate;
        }
        if update.address.is_some() {
            self.address = update.address.clone();
        }
        if update.phone_number.is_some() {
            self.phone_number = update.phone_number.clone();
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if update.specialization_id.is_some() {
            self.specialization_id = update.specialization_id;
        }
    }
}

/// Admin-portal account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    /// Primary key
    pub id: AdminId,
    /// Full name
    pub name: String,
    /// Login email, stored lowercase
    pub email: String,
    /// Avatar image URL
    pub avatar: Option<String>,
}

/// Fields for a new admin account.
#[derive(Debug, Clone)]
pub struct NewAdmin {
    /// Full name
    pub name: String,
    /// Login email, stored lowercase
    pub email: String,
    /// bcrypt hash
    pub password_hash: String,
}

/// Partial admin profile update.
#[derive(Debug, Clone, Default)]
pub struct AdminUpdate {
    /// Full name
    pub name: Option<String>,
    /// Login email, stored lowercase
    pub email: Option<String>,
    /// bcrypt hash
    pub password_hash: Option<String>,
    /// Avatar image URL
    pub avatar: Option<String>,
}

impl AdminUpdate {
    /// Whether nothing would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.avatar.is_none()
    }
}
