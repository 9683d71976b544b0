//! Appointments, the intake forms captured when booking, and visit records.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};
use crate::ids::{
    AppointmentId, DoctorId, ImmunizationId, PatientId, PrenatalId, ScheduleId, SpecialtyId,
    UserId,
};
use crate::schedule::Schedule;
use crate::slot::{Purpose, Slot};
use crate::status::AppointmentStatus;

/// A booking against one slot of a doctor's schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    /// Primary key
    pub id: AppointmentId,
    /// Patient account
    pub user_id: UserId,
    /// Doctor account
    pub doctor_id: DoctorId,
    /// Schedule the booking sits in
    pub schedule_id: ScheduleId,
    /// Immunization form captured at booking
    pub immunization_id: Option<ImmunizationId>,
    /// Prenatal form captured at booking
    pub prenatal_id: Option<PrenatalId>,
    /// Patient record created for the booking
    pub patient_id: Option<PatientId>,
    /// Workflow status
    pub status: AppointmentStatus,
    /// Visit purpose, e.g. "Prenatal"
    pub purpose_of_appointment: String,
    /// Day of the visit
    pub appointment_date: NaiveDate,
    /// Half-day slot; `None` on rows that predate slots
    pub slot: Option<Slot>,
    /// Doctor's remarks
    pub remarks: Option<String>,
    /// Creation time
    pub created_at: Option<NaiveDateTime>,
    /// Soft-delete time; `None` while live
    pub deleted_at: Option<NaiveDateTime>,
}

impl Appointment {
    /// Not soft-deleted.
    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Whether this appointment occupies a place in `schedule`/`slot`.
    pub fn occupies(&self, schedule: ScheduleId, slot: Slot) -> bool {
        self.is_live() && self.schedule_id == schedule && self.slot == Some(slot)
    }
}

/// Prenatal intake form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrenatalForm {
    /// Mother's full name
    pub name: String,
    /// Mother's age
    #[serde(default, deserialize_with = "lenient_int")]
    pub age: Option<i32>,
    /// Home address
    #[serde(default)]
    pub address: Option<String>,
    /// Mother's occupation
    #[serde(default)]
    pub occupation: Option<String>,
    /// Husband's name
    #[serde(default)]
    pub husband_name: Option<String>,
    /// Husband's age
    #[serde(default, deserialize_with = "lenient_int")]
    pub husband_age: Option<i32>,
}

/// Child immunization intake form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImmunizationForm {
    /// Child's full name
    pub child_name: String,
    /// Child's date of birth
    #[serde(default)]
    pub birthdate: Option<NaiveDate>,
    /// Place of birth
    #[serde(default)]
    pub birthplace: Option<String>,
    /// Home address
    #[serde(default)]
    pub address: Option<String>,
    /// Mother's name
    #[serde(default)]
    pub mother_name: Option<String>,
    /// Father's name
    #[serde(default)]
    pub father_name: Option<String>,
    /// Length at birth, cm
    #[serde(default, deserialize_with = "lenient_float")]
    pub birth_height: Option<f64>,
    /// Weight at birth, kg
    #[serde(default, deserialize_with = "lenient_float")]
    pub birth_weight: Option<f64>,
    /// Child's sex
    #[serde(default)]
    pub sex: Option<String>,
    /// Health center of record
    #[serde(default)]
    pub health_center: Option<String>,
    /// Barangay of residence
    #[serde(default)]
    pub barangay: Option<String>,
    /// Family serial number
    #[serde(default)]
    pub family_number: Option<String>,
}

/// Stored prenatal form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrenatalInfo {
    /// Primary key
    pub id: PrenatalId,
    /// Account that submitted it
    pub user_id: Option<UserId>,
    /// Submitted form fields
    #[serde(flatten)]
    pub form: PrenatalForm,
}

/// Stored immunization form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImmunizationInfo {
    /// Primary key
    pub id: ImmunizationId,
    /// Account that submitted it
    pub user_id: Option<UserId>,
    /// Submitted form fields
    #[serde(flatten)]
    pub form: ImmunizationForm,
}

/// The purpose-specific form submitted with a booking.
#[derive(Debug, Clone, PartialEq)]
pub enum IntakeForm {
    /// Prenatal check-up
    Prenatal(PrenatalForm),
    /// Child immunization
    Immunization(ImmunizationForm),
}

impl IntakeForm {
    /// Decodes the raw form data for `purpose`.
    pub fn parse(purpose: Purpose, form: serde_json::Value) -> Result<Self> {
        let invalid = |e: serde_json::Error| Error::validation_field("formData", e.to_string());
        let intake = match purpose {
            Purpose::Prenatal => IntakeForm::Prenatal(serde_json::from_value(form).map_err(invalid)?),
            Purpose::Immunization => {
                IntakeForm::Immunization(serde_json::from_value(form).map_err(invalid)?)
            }
        };
        intake.validate()?;
        Ok(intake)
    }

    /// Visit purpose this form belongs to.
    pub fn purpose(&self) -> Purpose {
        match self {
            IntakeForm::Prenatal(_) => Purpose::Prenatal,
            IntakeForm::Immunization(_) => Purpose::Immunization,
        }
    }

    fn validate(&self) -> Result<()> {
        let (field, value) = match self {
            IntakeForm::Prenatal(form) => ("name", &form.name),
            IntakeForm::Immunization(form) => ("child_name", &form.child_name),
        };
        if value.trim().is_empty() {
            return Err(Error::validation_field(field, format!("{field} is required")));
        }
        Ok(())
    }
}

/// A validated booking request.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    /// Patient booking the visit
    pub user_id: UserId,
    /// Doctor to see
    pub doctor_id: DoctorId,
    /// Day to book; a live schedule must exist
    pub selected_date: NaiveDate,
    /// Requested half-day
    pub slot: Slot,
    /// Purpose-specific intake form
    pub intake: IntakeForm,
}

/// Result of a successful booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingReceipt {
    /// New appointment
    pub appointment_id: AppointmentId,
    /// Patient record created for the booking
    pub patient_id: PatientId,
    /// Schedule the place was taken from
    pub schedule_id: ScheduleId,
    /// Slot that was reserved
    pub slot: Slot,
    /// Always `Pending` for a new booking
    pub status: AppointmentStatus,
    /// Places left in the slot after this booking
    pub remaining_slots: u32,
}

/// Staff edit of an appointment; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentUpdate {
    /// Patient account
    pub user_id: Option<UserId>,
    /// Doctor owning the target schedule
    pub doctor_id: Option<DoctorId>,
    /// Schedule to move into
    pub schedule_id: Option<ScheduleId>,
    /// Visit purpose
    pub purpose_of_appointment: Option<String>,
    /// Must match the target schedule date
    pub appointment_date: Option<NaiveDate>,
    /// Requested status; must be a legal transition
    pub status: Option<AppointmentStatus>,
}

/// The live schedule an update moves an appointment into.
#[derive(Debug, Clone, Copy)]
pub struct Placement<'a> {
    /// Target schedule
    pub schedule: &'a Schedule,
    /// Live appointments already in the slot, the moving one excluded
    pub booked: u32,
}

impl Appointment {
    /// Schedule the appointment must fit into after `update`, when the update
    /// changes its doctor, schedule or date.
    pub fn target_schedule(&self, update: &AppointmentUpdate) -> Option<ScheduleId> {
        let moves = update.schedule_id.is_some_and(|s| s != self.schedule_id)
            || update.doctor_id.is_some_and(|d| d != self.doctor_id)
            || update.appointment_date.is_some_and(|d| d != self.appointment_date);
        moves.then(|| update.schedule_id.unwrap_or(self.schedule_id))
    }

    /// Applies `update`, enforcing the status state machine.
    ///
    /// A move needs the [`Placement`] for [`Appointment::target_schedule`]:
    /// the schedule must belong to the doctor, the date follows the schedule
    /// and the slot must have room. Nothing changes when any check fails.
    pub fn apply(&mut self, update: AppointmentUpdate, placement: Option<Placement<'_>>) -> Result<()> {
        let status = match update.status {
            Some(status) => self.status.transition(status)?,
            None => self.status,
        };
        let doctor_id = update.doctor_id.unwrap_or(self.doctor_id);
        let (schedule_id, appointment_date) = match self.target_schedule(&update) {
            None => (self.schedule_id, self.appointment_date),
            Some(target) => {
                let placement = placement
                    .filter(|p| p.schedule.id == target)
                    .ok_or_else(|| Error::not_found("schedule", target))?;
                placement.check(doctor_id, update.appointment_date, self.slot)?;
                (target, placement.schedule.schedule_date)
            }
        };

        self.status = status;
        self.doctor_id = doctor_id;
        self.schedule_id = schedule_id;
        self.appointment_date = appointment_date;
        if let Some(v) = update.user_id {
            self.user_id = v;
        }
        if let Some(v) = update.purpose_of_appointment {
            self.purpose_of_appointment = v;
        }
        Ok(())
    }
}

impl Placement<'_> {
    fn check(&self, doctor: DoctorId, date: Option<NaiveDate>, slot: Option<Slot>) -> Result<()> {
        if self.schedule.doctor_id != doctor {
            return Err(Error::validation_field(
                "schedule_id",
                format!("Schedule {} belongs to another doctor", self.schedule.id),
            ));
        }
        if let Some(date) = date
            && date != self.schedule.schedule_date
        {
            return Err(Error::validation_field(
                "appointment_date",
                format!("appointment_date must match the schedule date {}", self.schedule.schedule_date),
            ));
        }
        if let Some(slot) = slot {
            self.schedule.capacity(slot, self.booked).reserve()?;
        }
        Ok(())
    }
}

/// Appointment joined with its patient account, for the AM/PM boards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentView {
    /// Appointment
    pub appointment_id: AppointmentId,
    /// Patient account
    pub user_id: UserId,
    /// Patient's name
    pub user_name: String,
    /// Patient's email
    pub user_email: String,
    /// Patient's avatar URL
    pub avatar: Option<String>,
    /// Patient's address
    pub address: Option<String>,
    /// Patient's contact number
    pub phone_number: Option<String>,
    /// Visit purpose, e.g. "Prenatal"
    pub purpose_of_appointment: String,
    /// Day of the visit
    pub appointment_date: NaiveDate,
    /// Workflow status
    pub status: AppointmentStatus,
    /// Half-day slot; `None` on rows that predate slots
    pub slot: Option<Slot>,
}

/// Appointments split by half-day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotBoard {
    /// Morning appointments
    #[serde(rename = "AM")]
    pub am: Vec<AppointmentView>,
    /// Afternoon appointments
    #[serde(rename = "PM")]
    pub pm: Vec<AppointmentView>,
}

impl SlotBoard {
    /// Whether both halves are empty.
    pub fn is_empty(&self) -> bool {
        self.am.is_empty() && self.pm.is_empty()
    }
}

impl FromIterator<AppointmentView> for SlotBoard {
    /// Rows without a slot land on the PM board.
    fn from_iter<I: IntoIterator<Item = AppointmentView>>(iter: I) -> Self {
        let mut board = SlotBoard::default();
        for view in iter {
            match view.slot {
                Some(Slot::Am) => board.am.push(view),
                _ => board.pm.push(view),
            }
        }
        board
    }
}

/// Appointment joined with patient, doctor and schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDetail {
    /// Appointment
    pub appointment_id: AppointmentId,
    /// Workflow status
    pub status: AppointmentStatus,
    /// Visit purpose, e.g. "Prenatal"
    pub purpose_of_appointment: String,
    /// Day of the visit
    pub appointment_date: NaiveDate,
    /// Half-day slot; `None` on rows that predate slots
    pub slot: Option<Slot>,
    /// Patient account
    pub user_id: UserId,
    /// Patient's name
    pub user_name: String,
    /// Patient's email
    pub user_email: String,
    /// Patient's avatar URL
    pub user_avatar: Option<String>,
    /// Patient's address
    pub user_address: Option<String>,
    /// Patient's contact number
    pub user_phone_number: Option<String>,
    /// Doctor account
    pub doctor_id: DoctorId,
    /// Doctor's name
    pub doctor_name: String,
    /// Doctor's specialty
    pub doctor_specialty_id: Option<SpecialtyId>,
    /// Schedule the booking sits in
    pub schedule_id: ScheduleId,
    /// Day the schedule covers
    pub schedule_date: NaiveDate,
}

/// A patient's own appointment, including rejected ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAppointment {
    /// Appointment
    pub appointment_id: AppointmentId,
    /// Workflow status
    pub status: AppointmentStatus,
    /// Visit purpose, e.g. "Prenatal"
    pub purpose_of_appointment: String,
    /// Day of the visit
    pub appointment_date: NaiveDate,
    /// Half-day slot; `None` on rows that predate slots
    pub slot: Option<Slot>,
    /// Doctor account
    pub doctor_id: DoctorId,
    /// Doctor's name
    pub doctor_name: String,
    /// Doctor's specialty
    pub doctor_specialty_id: Option<SpecialtyId>,
    /// Schedule the booking sits in
    pub schedule_id: ScheduleId,
    /// Day the schedule covers
    pub schedule_date: NaiveDate,
}

/// Vital signs taken during a visit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalSigns {
    /// Height
    pub height: Option<String>,
    /// Weight
    pub weight: Option<String>,
    /// Blood pressure, e.g. "110/70"
    pub bp: Option<String>,
    /// Blood type
    pub blood_type: Option<String>,
    /// Prescribed medication
    pub prescription: Option<String>,
}

/// Diagnosis written during a visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisInput {
    /// Diagnosis as written
    #[serde(rename = "diagnosisText")]
    pub diagnosis_text: String,
    /// Diagnosing doctor
    pub doctor_id: Option<DoctorId>,
}

/// Outcome of a visit: remarks plus optional vitals and diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitRecord {
    /// Doctor's remarks; required
    pub remarks: String,
    /// Vitals taken, if any
    #[serde(default, rename = "vitalSigns")]
    pub vital_signs: Option<VitalSigns>,
    /// Diagnosis, if any
    #[serde(default)]
    pub diagnosis: Option<DiagnosisInput>,
}

impl VisitRecord {
    /// Remarks are mandatory.
    pub fn validate(&self) -> Result<()> {
        if self.remarks.trim().is_empty() {
            return Err(Error::validation_field("remarks", "Remarks field is required"));
        }
        Ok(())
    }
}

/// Latest clinical notes for the patient behind an appointment.
///
/// Serializes to `{}` when nothing has been recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientDetails {
    /// Remarks from the latest visit record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    /// Latest vital signs
    #[serde(flatten)]
    pub vital_signs: Option<VitalSigns>,
    /// Latest diagnosis text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    /// When the latest diagnosis was recorded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis_date: Option<NaiveDateTime>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn lenient_float<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("expected a number, got '{s}'"))),
    }
}

fn lenient_int<'de, D>(deserializer: D) -> std::result::Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient_float(deserializer)?;
    match value {
        None => Ok(None),
        Some(n) if n.fract() == 0.0 && n >= i32::MIN as f64 && n <= i32::MAX as f64 => {
            Ok(Some(n as i32))
        }
        Some(n) => Err(serde::de::Error::custom(format!("expected a whole number, got {n}"))),
    }
}
