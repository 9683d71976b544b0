use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlConnection, Row};

use clinic_core::appointment::{
    Appointment, AppointmentDetail, AppointmentUpdate, AppointmentView, Booking, BookingReceipt,
    IntakeForm, PatientDetails, Placement, SlotBoard, UserAppointment, VisitRecord, VitalSigns,
};
use clinic_core::queue::{self, NewQueueEntry, QueueEntry, QueueUpdate, QueueView};
use clinic_core::schedule::{NewSchedule, Schedule, ScheduleView};
use clinic_core::{
    AppointmentId, AppointmentStatus, DayAvailability, DoctorId, PatientId, QueueId, QueueStatus,
    ScheduleId, Slot, SlotCapacity, UserId,
};

use super::content::{insert_immunization, insert_prenatal};
use super::rows::{
    self, APPOINTMENT_COLUMNS, QUEUE_COLUMNS, SCHEDULE_COLUMNS, SCHEDULE_VIEW_SELECT,
};
use super::MySqlStore;
use crate::error::{Error, Result};
use crate::traits::{AppointmentStore, QueueStore, ScheduleStore};

const AVAILABILITY_SELECT: &str = "SELECT s.id, s.schedule_date, s.am_max_patients, \
     s.pm_max_patients, \
     (SELECT COUNT(*) FROM appointments a WHERE a.schedule_id = s.id AND a.slot = 'AM' \
        AND a.deleted_at IS NULL) AS am_booked, \
     (SELECT COUNT(*) FROM appointments a WHERE a.schedule_id = s.id AND a.slot = 'PM' \
        AND a.deleted_at IS NULL) AS pm_booked \
     FROM schedules s WHERE s.deleted_at IS NULL";

const QUEUE_VIEW_SELECT: &str = "SELECT q.id AS queue_id, q.appointment_id, q.status, \
     q.processed_at, q.assigned_to, d.name AS doctor_name, u.id AS user_id, \
     u.name AS user_name, u.email AS user_email, a.purpose_of_appointment, \
     a.appointment_date, a.slot, a.status AS appointment_status \
     FROM queue q \
     JOIN appointments a ON a.id = q.appointment_id \
     JOIN users u ON u.id = a.user_id \
     LEFT JOIN doctors d ON d.id = q.assigned_to";

fn count(row: &MySqlRow, column: &str) -> Result<u32> {
    let n: i64 = row.try_get(column)?;
    Ok(u32::try_from(n).unwrap_or(u32::MAX))
}

fn day_availability(row: &MySqlRow) -> Result<DayAvailability> {
    Ok(DayAvailability::new(
        rows::id(row, "id")?,
        row.try_get("schedule_date")?,
        SlotCapacity::new(Slot::Am, row.try_get("am_max_patients")?, count(row, "am_booked")?),
        SlotCapacity::new(Slot::Pm, row.try_get("pm_max_patients")?, count(row, "pm_booked")?),
    ))
}

fn queue_view(row: &MySqlRow) -> Result<QueueView> {
    Ok(QueueView {
        queue_id: rows::id(row, "queue_id")?,
        appointment_id: rows::id(row, "appointment_id")?,
        status: rows::parsed(row, "status")?,
        processed_at: row.try_get("processed_at")?,
        assigned_to: rows::opt_id(row, "assigned_to")?,
        doctor_name: row.try_get("doctor_name")?,
        user_id: rows::id(row, "user_id")?,
        user_name: row.try_get("user_name")?,
        user_email: row.try_get("user_email")?,
        purpose_of_appointment: row.try_get("purpose_of_appointment")?,
        appointment_date: row.try_get("appointment_date")?,
        slot: rows::slot(row, "slot")?,
        appointment_status: rows::parsed(row, "appointment_status")?,
    })
}

async fn ensure_exists(
    conn: &mut MySqlConnection,
    table: &'static str,
    entity: &'static str,
    id: i64,
) -> Result<()> {
    let sql = format!("SELECT id FROM {table} WHERE id = ?");
    sqlx::query(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?
        .map(|_| ())
        .ok_or_else(|| Error::not_found(entity, id))
}

/// Live appointment, row-locked for the rest of the transaction.
async fn lock_appointment(conn: &mut MySqlConnection, id: AppointmentId) -> Result<Appointment> {
    let sql = format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments \
         WHERE id = ? AND deleted_at IS NULL FOR UPDATE"
    );
    let row = sqlx::query(&sql)
        .bind(id.get())
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| Error::not_found("appointment", id))?;
    rows::appointment(&row)
}

/// Live schedule, row-locked for the rest of the transaction.
async fn lock_schedule(conn: &mut MySqlConnection, id: ScheduleId) -> Result<Schedule> {
    let sql = format!(
        "SELECT {SCHEDULE_COLUMNS} FROM schedules WHERE id = ? AND deleted_at IS NULL FOR UPDATE"
    );
    let row = sqlx::query(&sql)
        .bind(id.get())
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| Error::not_found("schedule", id))?;
    rows::schedule(&row)
}

async fn lock_queue_entry(conn: &mut MySqlConnection, id: QueueId) -> Result<QueueEntry> {
    let sql = format!("SELECT {QUEUE_COLUMNS} FROM queue WHERE id = ? FOR UPDATE");
    let row = sqlx::query(&sql)
        .bind(id.get())
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| Error::not_found("queue entry", id))?;
    rows::queue_entry(&row)
}

async fn store_queue_entry(conn: &mut MySqlConnection, entry: &QueueEntry) -> Result<()> {
    sqlx::query("UPDATE queue SET status = ?, assigned_to = ?, processed_at = ? WHERE id = ?")
        .bind(entry.status.as_str())
        .bind(entry.assigned_to.map(|d| d.get()))
        .bind(entry.processed_at)
        .bind(entry.id.get())
        .execute(conn)
        .await?;
    Ok(())
}

#[async_trait]
impl ScheduleStore for MySqlStore {
    async fn create_schedule(&self, schedule: NewSchedule) -> Result<Schedule> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT id FROM doctors WHERE id = ? FOR UPDATE")
            .bind(schedule.doctor_id.get())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| Error::not_found("doctor", schedule.doctor_id))?;

        let existing: i64 = sqlx::query(
            "SELECT COUNT(*) AS n FROM schedules \
             WHERE doctor_id = ? AND schedule_date = ? AND deleted_at IS NULL",
        )
        .bind(schedule.doctor_id.get())
        .bind(schedule.schedule_date)
        .fetch_one(&mut *tx)
        .await?
        .try_get("n")?;
        if existing > 0 {
            return Err(Error::conflict(
                "A schedule already exists for this doctor and date.",
            ));
        }

        let result = sqlx::query(
            "INSERT INTO schedules (doctor_id, schedule_date, am_max_patients, pm_max_patients, \
             updated_at) VALUES (?, ?, ?, ?, NOW())",
        )
        .bind(schedule.doctor_id.get())
        .bind(schedule.schedule_date)
        .bind(schedule.am_max_patients)
        .bind(schedule.pm_max_patients)
        .execute(&mut *tx)
        .await?;

        let sql = format!("SELECT {SCHEDULE_COLUMNS} FROM schedules WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(rows::insert_id(&result))
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        let created = rows::schedule(&row)?;
        tracing::info!(
            schedule_id = %created.id,
            doctor_id = %created.doctor_id,
            date = %created.schedule_date,
            "Schedule created"
        );
        Ok(created)
    }

    async fn list_schedules(&self) -> Result<Vec<ScheduleView>> {
        let sql = format!(
            "{SCHEDULE_VIEW_SELECT} WHERE s.deleted_at IS NULL ORDER BY s.schedule_date, s.id"
        );
        sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(rows::schedule_view)
            .collect()
    }

    async fn schedules_for_doctor(&self, doctor: DoctorId) -> Result<Vec<ScheduleView>> {
        let sql = format!(
            "{SCHEDULE_VIEW_SELECT} WHERE s.deleted_at IS NULL AND s.doctor_id = ? \
             ORDER BY s.schedule_date, s.id"
        );
        sqlx::query(&sql)
            .bind(doctor.get())
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(rows::schedule_view)
            .collect()
    }

    async fn has_schedule_on(&self, doctor: DoctorId, date: NaiveDate) -> Result<bool> {
        let n: i64 = sqlx::query(
            "SELECT COUNT(*) AS n FROM schedules \
             WHERE doctor_id = ? AND schedule_date = ? AND deleted_at IS NULL",
        )
        .bind(doctor.get())
        .bind(date)
        .fetch_one(&self.pool)
        .await?
        .try_get("n")?;
        Ok(n > 0)
    }

    async fn available_slots(&self, doctor: DoctorId) -> Result<Vec<DayAvailability>> {
        let sql = format!("{AVAILABILITY_SELECT} AND s.doctor_id = ? ORDER BY s.schedule_date, s.id");
        sqlx::query(&sql)
            .bind(doctor.get())
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(day_availability)
            .collect()
    }

    async fn remaining_slots(&self, schedule: ScheduleId) -> Result<DayAvailability> {
        let sql = format!("{AVAILABILITY_SELECT} AND s.id = ?");
        let row = sqlx::query(&sql)
            .bind(schedule.get())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::not_found("schedule", schedule))?;
        day_availability(&row)
    }

    async fn delete_schedule(&self, schedule: ScheduleId) -> Result<()> {
        let result = sqlx::query(
            "UPDATE schedules SET deleted_at = NOW() WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(schedule.get())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("schedule", schedule));
        }
        Ok(())
    }
}

#[async_trait]
impl AppointmentStore for MySqlStore {
    async fn book(&self, booking: Booking) -> Result<BookingReceipt> {
        let mut tx = self.pool.begin().await?;
        ensure_exists(&mut tx, "users", "user", booking.user_id.get()).await?;

        let sql = format!(
            "SELECT {SCHEDULE_COLUMNS} FROM schedules \
             WHERE doctor_id = ? AND schedule_date = ? AND deleted_at IS NULL \
             ORDER BY id LIMIT 1 FOR UPDATE"
        );
        let row = sqlx::query(&sql)
            .bind(booking.doctor_id.get())
            .bind(booking.selected_date)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                Error::not_found(
                    "schedule",
                    format!("doctor {} on {}", booking.doctor_id, booking.selected_date),
                )
            })?;
        let schedule = rows::schedule(&row)?;

        let booked = sqlx::query(
            "SELECT COUNT(*) AS n FROM appointments \
             WHERE schedule_id = ? AND slot = ? AND deleted_at IS NULL",
        )
        .bind(schedule.id.get())
        .bind(booking.slot.as_str())
        .fetch_one(&mut *tx)
        .await?;
        let reserved = schedule
            .capacity(booking.slot, count(&booked, "n")?)
            .reserve()?;

        let purpose = booking.intake.purpose();
        let (prenatal_id, immunization_id) = match &booking.intake {
            IntakeForm::Prenatal(form) => (
                Some(insert_prenatal(&mut tx, Some(booking.user_id), form).await?),
                None,
            ),
            IntakeForm::Immunization(form) => (
                None,
                Some(insert_immunization(&mut tx, Some(booking.user_id), form).await?),
            ),
        };

        let result = sqlx::query("INSERT INTO patients (prenatal_id, immunization_id) VALUES (?, ?)")
            .bind(prenatal_id.map(|id| id.get()))
            .bind(immunization_id.map(|id| id.get()))
            .execute(&mut *tx)
            .await?;
        let patient_id = PatientId::new(rows::insert_id(&result));

        let result = sqlx::query(
            "INSERT INTO appointments (user_id, doctor_id, schedule_id, immunization_id, \
             prenatal_id, patient_id, status, purpose_of_appointment, appointment_date, slot) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(booking.user_id.get())
        .bind(booking.doctor_id.get())
        .bind(schedule.id.get())
        .bind(immunization_id.map(|id| id.get()))
        .bind(prenatal_id.map(|id| id.get()))
        .bind(patient_id.get())
        .bind(AppointmentStatus::Pending.as_str())
        .bind(purpose.as_str())
        .bind(booking.selected_date)
        .bind(booking.slot.as_str())
        .execute(&mut *tx)
        .await?;
        let appointment_id = AppointmentId::new(rows::insert_id(&result));
        tx.commit().await?;

        tracing::info!(
            appointment_id = %appointment_id,
            schedule_id = %schedule.id,
            slot = %booking.slot,
            remaining = reserved.remaining(),
            "Appointment booked"
        );
        Ok(BookingReceipt {
            appointment_id,
            patient_id,
            schedule_id: schedule.id,
            slot: booking.slot,
            status: AppointmentStatus::Pending,
            remaining_slots: reserved.remaining(),
        })
    }

    async fn get_appointment(&self, id: AppointmentId) -> Result<Appointment> {
        let sql = format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ? AND deleted_at IS NULL"
        );
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::not_found("appointment", id))?;
        rows::appointment(&row)
    }

    async fn update_appointment(
        &self,
        id: AppointmentId,
        update: AppointmentUpdate,
    ) -> Result<Appointment> {
        let mut tx = self.pool.begin().await?;
        let mut appt = lock_appointment(&mut tx, id).await?;
        if let Some(user) = update.user_id {
            ensure_exists(&mut tx, "users", "user", user.get()).await?;
        }
        match appt.target_schedule(&update) {
            Some(target) => {
                let schedule = lock_schedule(&mut tx, target).await?;
                let booked = match appt.slot {
                    Some(slot) => {
                        let row = sqlx::query(
                            "SELECT COUNT(*) AS n FROM appointments \
                             WHERE schedule_id = ? AND slot = ? AND id <> ? \
                             AND deleted_at IS NULL",
                        )
                        .bind(schedule.id.get())
                        .bind(slot.as_str())
                        .bind(id.get())
                        .fetch_one(&mut *tx)
                        .await?;
                        count(&row, "n")?
                    }
                    None => 0,
                };
                appt.apply(update, Some(Placement { schedule: &schedule, booked }))?;
            }
            None => appt.apply(update, None)?,
        }
        sqlx::query(
            "UPDATE appointments SET user_id = ?, doctor_id = ?, schedule_id = ?, \
             purpose_of_appointment = ?, appointment_date = ?, status = ? WHERE id = ?",
        )
        .bind(appt.user_id.get())
        .bind(appt.doctor_id.get())
        .bind(appt.schedule_id.get())
        .bind(&appt.purpose_of_appointment)
        .bind(appt.appointment_date)
        .bind(appt.status.as_str())
        .bind(id.get())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(appt)
    }

    async fn delete_appointment(&self, id: AppointmentId) -> Result<()> {
        let result = sqlx::query(
            "UPDATE appointments SET deleted_at = NOW() WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(id.get())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("appointment", id));
        }
        Ok(())
    }

    async fn appointment_board(&self, doctor: Option<DoctorId>) -> Result<SlotBoard> {
        let doctor = doctor.map(|d| d.get());
        sqlx::query(
            "SELECT a.id AS appointment_id, u.id AS user_id, u.name AS user_name, \
             u.email AS user_email, u.avatar, u.address, u.phone_number, \
             a.purpose_of_appointment, a.appointment_date, a.status, a.slot \
             FROM appointments a JOIN users u ON u.id = a.user_id \
             WHERE a.deleted_at IS NULL AND (? IS NULL OR a.doctor_id = ?) \
             ORDER BY a.id",
        )
        .bind(doctor)
        .bind(doctor)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|row| {
            Ok(AppointmentView {
                appointment_id: rows::id(row, "appointment_id")?,
                user_id: rows::id(row, "user_id")?,
                user_name: row.try_get("user_name")?,
                user_email: row.try_get("user_email")?,
                avatar: row.try_get("avatar")?,
                address: row.try_get("address")?,
                phone_number: row.try_get("phone_number")?,
                purpose_of_appointment: row.try_get("purpose_of_appointment")?,
                appointment_date: row.try_get("appointment_date")?,
                status: rows::parsed(row, "status")?,
                slot: rows::slot(row, "slot")?,
            })
        })
        .collect()
    }

    async fn appointment_details(&self) -> Result<Vec<AppointmentDetail>> {
        sqlx::query(
            "SELECT a.id AS appointment_id, a.status, a.purpose_of_appointment, \
             a.appointment_date, a.slot, u.id AS user_id, u.name AS user_name, \
             u.email AS user_email, u.avatar AS user_avatar, u.address AS user_address, \
             u.phone_number AS user_phone_number, d.id AS doctor_id, d.name AS doctor_name, \
             d.specialization_id AS doctor_specialty_id, s.id AS schedule_id, s.schedule_date \
             FROM appointments a \
             JOIN users u ON u.id = a.user_id \
             JOIN doctors d ON d.id = a.doctor_id \
             JOIN schedules s ON s.id = a.schedule_id \
             WHERE a.deleted_at IS NULL ORDER BY a.id",
        )
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|row| {
            Ok(AppointmentDetail {
                appointment_id: rows::id(row, "appointment_id")?,
                status: rows::parsed(row, "status")?,
                purpose_of_appointment: row.try_get("purpose_of_appointment")?,
                appointment_date: row.try_get("appointment_date")?,
                slot: rows::slot(row, "slot")?,
                user_id: rows::id(row, "user_id")?,
                user_name: row.try_get("user_name")?,
                user_email: row.try_get("user_email")?,
                user_avatar: row.try_get("user_avatar")?,
                user_address: row.try_get("user_address")?,
                user_phone_number: row.try_get("user_phone_number")?,
                doctor_id: rows::id(row, "doctor_id")?,
                doctor_name: row.try_get("doctor_name")?,
                doctor_specialty_id: rows::opt_id(row, "doctor_specialty_id")?,
                schedule_id: rows::id(row, "schedule_id")?,
                schedule_date: row.try_get("schedule_date")?,
            })
        })
        .collect()
    }

    async fn user_appointments(&self, user: UserId) -> Result<Vec<UserAppointment>> {
        sqlx::query(
            "SELECT a.id AS appointment_id, a.status, a.purpose_of_appointment, \
             a.appointment_date, a.slot, d.id AS doctor_id, d.name AS doctor_name, \
             d.specialization_id AS doctor_specialty_id, s.id AS schedule_id, s.schedule_date \
             FROM appointments a \
             JOIN doctors d ON d.id = a.doctor_id \
             JOIN schedules s ON s.id = a.schedule_id \
             WHERE a.user_id = ? ORDER BY a.id",
        )
        .bind(user.get())
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|row| {
            Ok(UserAppointment {
                appointment_id: rows::id(row, "appointment_id")?,
                status: rows::parsed(row, "status")?,
                purpose_of_appointment: row.try_get("purpose_of_appointment")?,
                appointment_date: row.try_get("appointment_date")?,
                slot: rows::slot(row, "slot")?,
                doctor_id: rows::id(row, "doctor_id")?,
                doctor_name: row.try_get("doctor_name")?,
                doctor_specialty_id: rows::opt_id(row, "doctor_specialty_id")?,
                schedule_id: rows::id(row, "schedule_id")?,
                schedule_date: row.try_get("schedule_date")?,
            })
        })
        .collect()
    }

    async fn reject_appointment(&self, id: AppointmentId) -> Result<Appointment> {
        let mut tx = self.pool.begin().await?;
        let mut appt = lock_appointment(&mut tx, id).await?;
        appt.status = appt.status.transition(AppointmentStatus::Rejected)?;
        let now = Utc::now().naive_utc();
        appt.deleted_at = Some(now);
        sqlx::query("UPDATE appointments SET status = ?, deleted_at = ? WHERE id = ?")
            .bind(appt.status.as_str())
            .bind(now)
            .bind(id.get())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        tracing::info!(appointment_id = %id, "Appointment rejected");
        Ok(appt)
    }

    async fn record_visit(&self, id: AppointmentId, visit: VisitRecord) -> Result<()> {
        visit.validate()?;
        let mut tx = self.pool.begin().await?;
        let appt = lock_appointment(&mut tx, id).await?;
        let wants_patient = visit.vital_signs.is_some() || visit.diagnosis.is_some();
        if appt.patient_id.is_none() && wants_patient {
            return Err(Error::not_found("patient for appointment", id));
        }

        sqlx::query("UPDATE appointments SET remarks = ? WHERE id = ?")
            .bind(&visit.remarks)
            .bind(id.get())
            .execute(&mut *tx)
            .await?;

        if let Some(patient) = appt.patient_id {
            if let Some(vitals) = &visit.vital_signs {
                sqlx::query(
                    "INSERT INTO patient_vital_signs \
                     (patient_id, height, weight, bp, blood_type, prescription) \
                     VALUES (?, ?, ?, ?, ?, ?)",
                )
                .bind(patient.get())
                .bind(&vitals.height)
                .bind(&vitals.weight)
                .bind(&vitals.bp)
                .bind(&vitals.blood_type)
                .bind(&vitals.prescription)
                .execute(&mut *tx)
                .await?;
            }
            if let Some(diagnosis) = &visit.diagnosis {
                sqlx::query(
                    "INSERT INTO patient_diagnosed (patient_id, diagnosis, doctor_id) \
                     VALUES (?, ?, ?)",
                )
                .bind(patient.get())
                .bind(&diagnosis.diagnosis_text)
                .bind(diagnosis.doctor_id.map(|d| d.get()))
                .execute(&mut *tx)
                .await?;
            }
        }
        tx.commit().await?;
        Ok(())
    }

    async fn patient_details(&self, id: AppointmentId) -> Result<PatientDetails> {
        let row = sqlx::query("SELECT remarks, patient_id FROM appointments WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::not_found("appointment", id))?;
        let remarks: Option<String> = row.try_get("remarks")?;
        let Some(patient) = rows::opt_id::<PatientId>(&row, "patient_id")? else {
            return Ok(PatientDetails {
                remarks,
                ..Default::default()
            });
        };

        let vitals = sqlx::query(
            "SELECT height, weight, bp, blood_type, prescription FROM patient_vital_signs \
             WHERE patient_id = ? ORDER BY id DESC LIMIT 1",
        )
        .bind(patient.get())
        .fetch_optional(&self.pool)
        .await?
        .map(|row| -> Result<VitalSigns> {
            Ok(VitalSigns {
                height: row.try_get("height")?,
                weight: row.try_get("weight")?,
                bp: row.try_get("bp")?,
                blood_type: row.try_get("blood_type")?,
                prescription: row.try_get("prescription")?,
            })
        })
        .transpose()?;

        let diagnosis = sqlx::query(
            "SELECT diagnosis, created_at FROM patient_diagnosed \
             WHERE patient_id = ? ORDER BY id DESC LIMIT 1",
        )
        .bind(patient.get())
        .fetch_optional(&self.pool)
        .await?;
        let (diagnosis, diagnosis_date) = match diagnosis {
            Some(row) => (
                Some(row.try_get("diagnosis")?),
                Some(row.try_get("created_at")?),
            ),
            None => (None, None),
        };

        Ok(PatientDetails {
            remarks,
            vital_signs: vitals,
            diagnosis,
            diagnosis_date,
        })
    }
}

#[async_trait]
impl QueueStore for MySqlStore {
    async fn enqueue(&self, entry: NewQueueEntry) -> Result<QueueEntry> {
        let mut tx = self.pool.begin().await?;
        if let Some(doctor) = entry.assigned_to {
            ensure_exists(&mut tx, "doctors", "doctor", doctor.get()).await?;
        }
        let appt = lock_appointment(&mut tx, entry.appointment_id).await?;
        if appt.status != AppointmentStatus::Pending {
            return Err(clinic_core::Error::InvalidTransition {
                from: appt.status.to_string(),
                to: AppointmentStatus::Approved.to_string(),
            }
            .into());
        }

        sqlx::query("UPDATE appointments SET status = ? WHERE id = ?")
            .bind(AppointmentStatus::Approved.as_str())
            .bind(appt.id.get())
            .execute(&mut *tx)
            .await?;
        let result =
            sqlx::query("INSERT INTO queue (appointment_id, assigned_to, status) VALUES (?, ?, ?)")
                .bind(appt.id.get())
                .bind(entry.assigned_to.map(|d| d.get()))
                .bind(QueueStatus::Processing.as_str())
                .execute(&mut *tx)
                .await?;
        tx.commit().await?;

        let id = QueueId::new(rows::insert_id(&result));
        tracing::info!(queue_id = %id, appointment_id = %appt.id, "Appointment queued");
        Ok(QueueEntry {
            id,
            appointment_id: appt.id,
            assigned_to: entry.assigned_to,
            status: QueueStatus::Processing,
            processed_at: None,
        })
    }

    async fn list_queue(&self) -> Result<Vec<QueueView>> {
        let mut views = sqlx::query(QUEUE_VIEW_SELECT)
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(queue_view)
            .collect::<Result<Vec<_>>>()?;
        queue::sort_newest_first(&mut views);
        Ok(views)
    }

    async fn queue_for_appointment(&self, appointment: AppointmentId) -> Result<QueueEntry> {
        let sql = format!(
            "SELECT {QUEUE_COLUMNS} FROM queue WHERE appointment_id = ? ORDER BY id LIMIT 1"
        );
        let row = sqlx::query(&sql)
            .bind(appointment.get())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::not_found("queue entry for appointment", appointment))?;
        rows::queue_entry(&row)
    }

    async fn queue_for_doctor(&self, doctor: DoctorId) -> Result<Vec<QueueView>> {
        let sql = format!("{QUEUE_VIEW_SELECT} WHERE q.assigned_to = ? ORDER BY q.id");
        sqlx::query(&sql)
            .bind(doctor.get())
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(queue_view)
            .collect()
    }

    async fn update_queue(&self, id: QueueId, update: QueueUpdate) -> Result<QueueEntry> {
        let mut tx = self.pool.begin().await?;
        if let Some(doctor) = update.assigned_to {
            ensure_exists(&mut tx, "doctors", "doctor", doctor.get()).await?;
        }
        let mut entry = lock_queue_entry(&mut tx, id).await?;
        entry.apply(update, Utc::now().naive_utc())?;
        store_queue_entry(&mut tx, &entry).await?;
        tx.commit().await?;
        Ok(entry)
    }

    async fn mark_queue_done(&self, id: QueueId) -> Result<QueueEntry> {
        let mut tx = self.pool.begin().await?;
        let mut entry = lock_queue_entry(&mut tx, id).await?;
        let row = sqlx::query("SELECT status FROM appointments WHERE id = ? FOR UPDATE")
            .bind(entry.appointment_id.get())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| Error::not_found("appointment", entry.appointment_id))?;
        let appt_status: AppointmentStatus = rows::parsed(&row, "status")?;

        let next = appt_status.transition(AppointmentStatus::Done)?;
        entry.apply(
            QueueUpdate {
                status: Some(QueueStatus::Done),
                assigned_to: None,
            },
            Utc::now().naive_utc(),
        )?;

        sqlx::query("UPDATE appointments SET status = ? WHERE id = ?")
            .bind(next.as_str())
            .bind(entry.appointment_id.get())
            .execute(&mut *tx)
            .await?;
        store_queue_entry(&mut tx, &entry).await?;
        tx.commit().await?;

        tracing::info!(queue_id = %id, appointment_id = %entry.appointment_id, "Visit completed");
        Ok(entry)
    }

    async fn delete_queue(&self, id: QueueId) -> Result<()> {
        let result = sqlx::query("DELETE FROM queue WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("queue entry", id));
        }
        Ok(())
    }
}
