use async_trait::async_trait;
use chrono::NaiveDate;

use clinic_core::appointment::{
    Appointment, AppointmentDetail, AppointmentUpdate, AppointmentView, Booking, BookingReceipt,
    ImmunizationInfo, IntakeForm, PatientDetails, Placement, PrenatalInfo, SlotBoard,
    UserAppointment, VisitRecord,
};
use clinic_core::queue::{self, NewQueueEntry, QueueEntry, QueueUpdate, QueueView};
use clinic_core::schedule::{NewSchedule, Schedule, ScheduleView};
use clinic_core::{
    AppointmentId, AppointmentStatus, DayAvailability, DoctorId, ImmunizationId, PatientId,
    PrenatalId, QueueId, QueueStatus, ScheduleId, Slot, UserId,
};

use super::{DiagnosisRow, MemoryStore, StoredSchedule, Tables, VitalsRow, now};
use crate::error::{Error, Result};
use crate::traits::{AppointmentStore, QueueStore, ScheduleStore};

impl Tables {
    fn booked(&self, schedule: ScheduleId, slot: Slot) -> u32 {
        self.appointments
            .values()
            .filter(|a| a.occupies(schedule, slot))
            .count() as u32
    }

    fn availability(&self, schedule: &Schedule) -> DayAvailability {
        DayAvailability::new(
            schedule.id,
            schedule.schedule_date,
            schedule.capacity(Slot::Am, self.booked(schedule.id, Slot::Am)),
            schedule.capacity(Slot::Pm, self.booked(schedule.id, Slot::Pm)),
        )
    }

    fn live_schedules(&self) -> impl Iterator<Item = &Schedule> {
        self.schedules
            .values()
            .filter(|s| s.is_live())
            .map(|s| &s.schedule)
    }

    fn schedule_view(&self, schedule: &Schedule) -> Option<ScheduleView> {
        let doctor = self.doctors.get(&schedule.doctor_id)?;
        Some(ScheduleView {
            schedule_id: schedule.id,
            schedule_date: schedule.schedule_date,
            am_max_patients: schedule.am_max_patients,
            pm_max_patients: schedule.pm_max_patients,
            updated_at: schedule.updated_at,
            doctor_id: doctor.account.id,
            doctor_name: doctor.account.name.clone(),
            doctor_email: doctor.account.email.clone(),
            specialization_id: doctor.account.specialization_id,
            doctor_specialization: self.specialty_name(doctor.account.specialization_id),
        })
    }

    fn appointment_view(&self, appt: &Appointment) -> Option<AppointmentView> {
        let user = self.users.get(&appt.user_id)?;
        Some(AppointmentView {
            appointment_id: appt.id,
            user_id: user.account.id,
            user_name: user.account.name.clone(),
            user_email: user.account.email.clone(),
            avatar: user.account.avatar.clone(),
            address: user.account.address.clone(),
            phone_number: user.account.phone_number.clone(),
            purpose_of_appointment: appt.purpose_of_appointment.clone(),
            appointment_date: appt.appointment_date,
            status: appt.status,
            slot: appt.slot,
        })
    }

    fn queue_view(&self, entry: &QueueEntry) -> Option<QueueView> {
        let appt = self.appointments.get(&entry.appointment_id)?;
        let user = self.users.get(&appt.user_id)?;
        let doctor_name = entry
            .assigned_to
            .and_then(|id| self.doctors.get(&id))
            .map(|d| d.account.name.clone());
        Some(QueueView {
            queue_id: entry.id,
            appointment_id: entry.appointment_id,
            status: entry.status,
            processed_at: entry.processed_at,
            assigned_to: entry.assigned_to,
            doctor_name,
            user_id: user.account.id,
            user_name: user.account.name.clone(),
            user_email: user.account.email.clone(),
            purpose_of_appointment: appt.purpose_of_appointment.clone(),
            appointment_date: appt.appointment_date,
            slot: appt.slot,
            appointment_status: appt.status,
        })
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn create_schedule(&self, schedule: NewSchedule) -> Result<Schedule> {
        let mut t = self.write()?;
        t.doctor(schedule.doctor_id)?;
        if t.live_schedules().any(|s| {
            s.doctor_id == schedule.doctor_id && s.schedule_date == schedule.schedule_date
        }) {
            return Err(Error::conflict(
                "A schedule already exists for this doctor and date.",
            ));
        }
        let id = ScheduleId::new(t.next_id());
        let record = Schedule {
            id,
            doctor_id: schedule.doctor_id,
            schedule_date: schedule.schedule_date,
            am_max_patients: schedule.am_max_patients,
            pm_max_patients: schedule.pm_max_patients,
            updated_at: Some(now()),
        };
        t.schedules.insert(
            id,
            StoredSchedule {
                schedule: record.clone(),
                deleted_at: None,
            },
        );
        Ok(record)
    }

    async fn list_schedules(&self) -> Result<Vec<ScheduleView>> {
        let t = self.read()?;
        let mut views: Vec<ScheduleView> =
            t.live_schedules().filter_map(|s| t.schedule_view(s)).collect();
        views.sort_by_key(|v| (v.schedule_date, v.schedule_id));
        Ok(views)
    }

    async fn schedules_for_doctor(&self, doctor: DoctorId) -> Result<Vec<ScheduleView>> {
        let t = self.read()?;
        let mut views: Vec<ScheduleView> = t
            .live_schedules()
            .filter(|s| s.doctor_id == doctor)
            .filter_map(|s| t.schedule_view(s))
            .collect();
        views.sort_by_key(|v| (v.schedule_date, v.schedule_id));
        Ok(views)
    }

    async fn has_schedule_on(&self, doctor: DoctorId, date: NaiveDate) -> Result<bool> {
        let t = self.read()?;
        Ok(t.live_schedules()
            .any(|s| s.doctor_id == doctor && s.schedule_date == date))
    }

    async fn available_slots(&self, doctor: DoctorId) -> Result<Vec<DayAvailability>> {
        let t = self.read()?;
        let mut days: Vec<DayAvailability> = t
            .live_schedules()
            .filter(|s| s.doctor_id == doctor)
            .map(|s| t.availability(s))
            .collect();
        days.sort_by_key(|d| (d.schedule_date, d.schedule_id));
        Ok(days)
    }

    async fn remaining_slots(&self, schedule: ScheduleId) -> Result<DayAvailability> {
        let t = self.read()?;
        let schedule = t.live_schedule(schedule)?;
        Ok(t.availability(schedule))
    }

    async fn delete_schedule(&self, schedule: ScheduleId) -> Result<()> {
        let mut t = self.write()?;
        let stored = t
            .schedules
            .get_mut(&schedule)
            .filter(|s| s.is_live())
            .ok_or_else(|| Error::not_found("schedule", schedule))?;
        stored.deleted_at = Some(now());
        Ok(())
    }
}

#[async_trait]
impl AppointmentStore for MemoryStore {
    async fn book(&self, booking: Booking) -> Result<BookingReceipt> {
        let mut t = self.write()?;
        t.user(booking.user_id)?;
        let schedule = t
            .live_schedules()
            .find(|s| {
                s.doctor_id == booking.doctor_id && s.schedule_date == booking.selected_date
            })
            .cloned()
            .ok_or_else(|| {
                Error::not_found(
                    "schedule",
                    format!("doctor {} on {}", booking.doctor_id, booking.selected_date),
                )
            })?;

        let reserved = schedule
            .capacity(booking.slot, t.booked(schedule.id, booking.slot))
            .reserve()?;

        let purpose = booking.intake.purpose();
        let (prenatal_id, immunization_id) = match booking.intake {
            IntakeForm::Prenatal(form) => {
                let id = PrenatalId::new(t.next_id());
                t.prenatal.insert(
                    id,
                    PrenatalInfo {
                        id,
                        user_id: Some(booking.user_id),
                        form,
                    },
                );
                (Some(id), None)
            }
            IntakeForm::Immunization(form) => {
                let id = ImmunizationId::new(t.next_id());
                t.immunizations.insert(
                    id,
                    ImmunizationInfo {
                        id,
                        user_id: Some(booking.user_id),
                        form,
                    },
                );
                (None, Some(id))
            }
        };
        let patient_id = PatientId::new(t.next_id());

        let id = AppointmentId::new(t.next_id());
        t.appointments.insert(
            id,
            Appointment {
                id,
                user_id: booking.user_id,
                doctor_id: booking.doctor_id,
                schedule_id: schedule.id,
                immunization_id,
                prenatal_id,
                patient_id: Some(patient_id),
                status: AppointmentStatus::Pending,
                purpose_of_appointment: purpose.as_str().to_string(),
                appointment_date: booking.selected_date,
                slot: Some(booking.slot),
                remarks: None,
                created_at: Some(now()),
                deleted_at: None,
            },
        );

        Ok(BookingReceipt {
            appointment_id: id,
            patient_id,
            schedule_id: schedule.id,
            slot: booking.slot,
            status: AppointmentStatus::Pending,
            remaining_slots: reserved.remaining(),
        })
    }

    async fn get_appointment(&self, id: AppointmentId) -> Result<Appointment> {
        self.read()?.live_appointment(id).cloned()
    }

    async fn update_appointment(
        &self,
        id: AppointmentId,
        update: AppointmentUpdate,
    ) -> Result<Appointment> {
        let mut t = self.write()?;
        let mut next = t.live_appointment(id)?.clone();
        if let Some(user) = update.user_id {
            t.user(user)?;
        }
        match next.target_schedule(&update) {
            Some(target) => {
                let schedule = t.live_schedule(target)?.clone();
                let booked = next.slot.map_or(0, |slot| {
                    t.booked(schedule.id, slot) - u32::from(next.occupies(schedule.id, slot))
                });
                next.apply(update, Some(Placement { schedule: &schedule, booked }))?;
            }
            None => next.apply(update, None)?,
        }
        *t.live_appointment_mut(id)? = next.clone();
        Ok(next)
    }

    async fn delete_appointment(&self, id: AppointmentId) -> Result<()> {
        let mut t = self.write()?;
        t.live_appointment_mut(id)?.deleted_at = Some(now());
        Ok(())
    }

    async fn appointment_board(&self, doctor: Option<DoctorId>) -> Result<SlotBoard> {
        let t = self.read()?;
        Ok(t.appointments
            .values()
            .filter(|a| a.is_live())
            .filter(|a| doctor.is_none_or(|d| a.doctor_id == d))
            .filter_map(|a| t.appointment_view(a))
            .collect())
    }

    async fn appointment_details(&self) -> Result<Vec<AppointmentDetail>> {
        let t = self.read()?;
        let mut out = Vec::new();
        for appt in t.appointments.values().filter(|a| a.is_live()) {
            let (Some(user), Some(doctor), Some(schedule)) = (
                t.users.get(&appt.user_id),
                t.doctors.get(&appt.doctor_id),
                t.schedules.get(&appt.schedule_id),
            ) else {
                continue;
            };
            out.push(AppointmentDetail {
                appointment_id: appt.id,
                status: appt.status,
                purpose_of_appointment: appt.purpose_of_appointment.clone(),
                appointment_date: appt.appointment_date,
                slot: appt.slot,
                user_id: user.account.id,
                user_name: user.account.name.clone(),
                user_email: user.account.email.clone(),
                user_avatar: user.account.avatar.clone(),
                user_address: user.account.address.clone(),
                user_phone_number: user.account.phone_number.clone(),
                doctor_id: doctor.account.id,
                doctor_name: doctor.account.name.clone(),
                doctor_specialty_id: doctor.account.specialization_id,
                schedule_id: schedule.schedule.id,
                schedule_date: schedule.schedule.schedule_date,
            });
        }
        Ok(out)
    }

    async fn user_appointments(&self, user: UserId) -> Result<Vec<UserAppointment>> {
        let t = self.read()?;
        let mut out = Vec::new();
        for appt in t.appointments.values().filter(|a| a.user_id == user) {
            let (Some(doctor), Some(schedule)) = (
                t.doctors.get(&appt.doctor_id),
                t.schedules.get(&appt.schedule_id),
            ) else {
                continue;
            };
            out.push(UserAppointment {
                appointment_id: appt.id,
                status: appt.status,
                purpose_of_appointment: appt.purpose_of_appointment.clone(),
                appointment_date: appt.appointment_date,
                slot: appt.slot,
                doctor_id: doctor.account.id,
                doctor_name: doctor.account.name.clone(),
                doctor_specialty_id: doctor.account.specialization_id,
                schedule_id: schedule.schedule.id,
                schedule_date: schedule.schedule.schedule_date,
            });
        }
        Ok(out)
    }

    async fn reject_appointment(&self, id: AppointmentId) -> Result<Appointment> {
        let mut t = self.write()?;
        let appt = t.live_appointment_mut(id)?;
        appt.status = appt.status.transition(AppointmentStatus::Rejected)?;
        appt.deleted_at = Some(now());
        Ok(appt.clone())
    }

    async fn record_visit(&self, id: AppointmentId, visit: VisitRecord) -> Result<()> {
        visit.validate()?;
        let mut t = self.write()?;
        let patient_id = t.live_appointment(id)?.patient_id;
        let wants_patient = visit.vital_signs.is_some() || visit.diagnosis.is_some();
        let patient_id = match patient_id {
            Some(p) => Some(p),
            None if wants_patient => return Err(Error::not_found("patient for appointment", id)),
            None => None,
        };

        t.live_appointment_mut(id)?.remarks = Some(visit.remarks);
        if let Some(patient_id) = patient_id {
            if let Some(vitals) = visit.vital_signs {
                let seq = t.next_id();
                t.vitals.push(VitalsRow {
                    patient_id,
                    seq,
                    vitals,
                });
            }
            if let Some(diagnosis) = visit.diagnosis {
                let seq = t.next_id();
                t.diagnoses.push(DiagnosisRow {
                    patient_id,
                    seq,
                    diagnosis: diagnosis.diagnosis_text,
                    created_at: now(),
                });
            }
        }
        Ok(())
    }

    async fn patient_details(&self, id: AppointmentId) -> Result<PatientDetails> {
        let t = self.read()?;
        let appt = t
            .appointments
            .get(&id)
            .ok_or_else(|| Error::not_found("appointment", id))?;
        let Some(patient_id) = appt.patient_id else {
            return Ok(PatientDetails {
                remarks: appt.remarks.clone(),
                ..Default::default()
            });
        };
        let vitals = t
            .vitals
            .iter()
            .filter(|v| v.patient_id == patient_id)
            .max_by_key(|v| v.seq)
            .map(|v| v.vitals.clone());
        let diagnosis = t
            .diagnoses
            .iter()
            .filter(|d| d.patient_id == patient_id)
            .max_by_key(|d| d.seq);
        Ok(PatientDetails {
            remarks: appt.remarks.clone(),
            vital_signs: vitals,
            diagnosis: diagnosis.map(|d| d.diagnosis.clone()),
            diagnosis_date: diagnosis.map(|d| d.created_at),
        })
    }
}

#[async_trait]
impl QueueStore for MemoryStore {
    async fn enqueue(&self, entry: NewQueueEntry) -> Result<QueueEntry> {
        let mut t = self.write()?;
        if let Some(doctor) = entry.assigned_to {
            t.doctor(doctor)?;
        }
        let appt = t.live_appointment_mut(entry.appointment_id)?;
        if appt.status != AppointmentStatus::Pending {
            return Err(clinic_core::Error::InvalidTransition {
                from: appt.status.to_string(),
                to: AppointmentStatus::Approved.to_string(),
            }
            .into());
        }
        appt.status = AppointmentStatus::Approved;

        let id = QueueId::new(t.next_id());
        let record = QueueEntry {
            id,
            appointment_id: entry.appointment_id,
            assigned_to: entry.assigned_to,
            status: QueueStatus::Processing,
            processed_at: None,
        };
        t.queue.insert(id, record.clone());
        Ok(record)
    }

    async fn list_queue(&self) -> Result<Vec<QueueView>> {
        let t = self.read()?;
        let mut views: Vec<QueueView> = t.queue.values().filter_map(|q| t.queue_view(q)).collect();
        queue::sort_newest_first(&mut views);
        Ok(views)
    }

    async fn queue_for_appointment(&self, appointment: AppointmentId) -> Result<QueueEntry> {
        let t = self.read()?;
        t.queue
            .values()
            .find(|q| q.appointment_id == appointment)
            .cloned()
            .ok_or_else(|| Error::not_found("queue entry for appointment", appointment))
    }

    async fn queue_for_doctor(&self, doctor: DoctorId) -> Result<Vec<QueueView>> {
        let t = self.read()?;
        Ok(t.queue
            .values()
            .filter(|q| q.assigned_to == Some(doctor))
            .filter_map(|q| t.queue_view(q))
            .collect())
    }

    async fn update_queue(&self, id: QueueId, update: QueueUpdate) -> Result<QueueEntry> {
        let mut t = self.write()?;
        if let Some(doctor) = update.assigned_to {
            t.doctor(doctor)?;
        }
        let entry = t
            .queue
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("queue entry", id))?;
        entry.apply(update, now())?;
        Ok(entry.clone())
    }

    async fn mark_queue_done(&self, id: QueueId) -> Result<QueueEntry> {
        let mut t = self.write()?;
        let mut entry = t
            .queue
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found("queue entry", id))?;
        let appt_status = t
            .appointments
            .get(&entry.appointment_id)
            .map(|a| a.status)
            .ok_or_else(|| Error::not_found("appointment", entry.appointment_id))?;

        let next_appt = appt_status.transition(AppointmentStatus::Done)?;
        entry.apply(
            QueueUpdate {
                status: Some(QueueStatus::Done),
                assigned_to: None,
            },
            now(),
        )?;

        if let Some(appt) = t.appointments.get_mut(&entry.appointment_id) {
            appt.status = next_appt;
        }
        t.queue.insert(id, entry.clone());
        Ok(entry)
    }

    async fn delete_queue(&self, id: QueueId) -> Result<()> {
        let mut t = self.write()?;
        t.queue
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found("queue entry", id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::traits::{AccountStore, CatalogStore};
    use clinic_core::accounts::{NewDoctor, NewUser};
    use clinic_core::appointment::{DiagnosisInput, PrenatalForm, VitalSigns};
    use clinic_core::catalog::SpecialtyInput;

    struct Fixture {
        store: MemoryStore,
        user: UserId,
        doctor: DoctorId,
        schedule: Schedule,
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    async fn fixture(am: u32, pm: u32) -> Fixture {
        let store = MemoryStore::new();
        let specialty = store
            .create_specialty(SpecialtyInput {
                specialty_name: "OB-GYN".into(),
                description: None,
            })
            .await
            .unwrap();
        let doctor = store
            .create_doctor(NewDoctor {
                name: "Dr. Reyes".into(),
                email: "reyes@clinic.ph".into(),
                password_hash: "h".into(),
                birthdate: None,
                address: None,
                specialization_id: specialty.id,
                phone_number: None,
            })
            .await
            .unwrap();
        let user = store
            .create_user(NewUser {
                name: "Ana".into(),
                email: "ana@clinic.ph".into(),
                password_hash: "h".into(),
                avatar: None,
                birthdate: None,
                address: None,
                phone_number: None,
            })
            .await
            .unwrap();
        let schedule = store
            .create_schedule(NewSchedule {
                doctor_id: doctor.id,
                schedule_date: date(),
                am_max_patients: am,
                pm_max_patients: pm,
            })
            .await
            .unwrap();
        Fixture {
            store,
            user: user.id,
            doctor: doctor.id,
            schedule,
        }
    }

    fn booking(f: &Fixture, slot: Slot) -> Booking {
        Booking {
            user_id: f.user,
            doctor_id: f.doctor,
            selected_date: date(),
            slot,
            intake: IntakeForm::Prenatal(PrenatalForm {
                name: "Maria".into(),
                ..Default::default()
            }),
        }
    }

    #[tokio::test]
    async fn test_duplicate_live_schedule_conflicts() {
        let f = fixture(1, 1).await;
        let err = f
            .store
            .create_schedule(NewSchedule {
                doctor_id: f.doctor,
                schedule_date: date(),
                am_max_patients: 3,
                pm_max_patients: 3,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Core(clinic_core::Error::Conflict { .. })));

        f.store.delete_schedule(f.schedule.id).await.unwrap();
        assert!(!f.store.has_schedule_on(f.doctor, date()).await.unwrap());
        f.store
            .create_schedule(NewSchedule {
                doctor_id: f.doctor,
                schedule_date: date(),
                am_max_patients: 3,
                pm_max_patients: 3,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_booking_fills_slot_then_rejects() {
        let f = fixture(2, 1).await;
        let first = f.store.book(booking(&f, Slot::Am)).await.unwrap();
        assert_eq!(first.remaining_slots, 1);
        assert_eq!(first.status, AppointmentStatus::Pending);
        let second = f.store.book(booking(&f, Slot::Am)).await.unwrap();
        assert_eq!(second.remaining_slots, 0);

        let err = f.store.book(booking(&f, Slot::Am)).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Core(clinic_core::Error::SlotFull {
                slot: Slot::Am,
                max_patients: 2
            })
        ));

        let day = f.store.remaining_slots(f.schedule.id).await.unwrap();
        assert_eq!(day.am.remaining_slots, 0);
        assert_eq!(day.pm.remaining_slots, 1);
    }

    #[tokio::test]
    async fn test_deleted_appointment_frees_its_place() {
        let f = fixture(1, 0).await;
        let receipt = f.store.book(booking(&f, Slot::Am)).await.unwrap();
        assert!(f.store.book(booking(&f, Slot::Am)).await.is_err());

        f.store.delete_appointment(receipt.appointment_id).await.unwrap();
        let days = f.store.available_slots(f.doctor).await.unwrap();
        assert_eq!(days[0].am.remaining_slots, 1);
        f.store.book(booking(&f, Slot::Am)).await.unwrap();
    }

    #[tokio::test]
    async fn test_moving_appointment_respects_capacity() {
        let f = fixture(1, 1).await;
        let later = NaiveDate::from_ymd_opt(2024, 6, 4).unwrap();
        let other = f
            .store
            .create_schedule(NewSchedule {
                doctor_id: f.doctor,
                schedule_date: later,
                am_max_patients: 1,
                pm_max_patients: 1,
            })
            .await
            .unwrap();
        f.store.book(booking(&f, Slot::Am)).await.unwrap();
        let moving = f
            .store
            .book(Booking {
                selected_date: later,
                ..booking(&f, Slot::Am)
            })
            .await
            .unwrap();

        let into_full = AppointmentUpdate {
            schedule_id: Some(f.schedule.id),
            ..Default::default()
        };
        let err = f
            .store
            .update_appointment(moving.appointment_id, into_full)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Core(clinic_core::Error::SlotFull { .. })));

        let missing = AppointmentUpdate {
            schedule_id: Some(ScheduleId::new(9999)),
            ..Default::default()
        };
        let err = f
            .store
            .update_appointment(moving.appointment_id, missing)
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        // Naming the current schedule is not a move.
        let same = AppointmentUpdate {
            schedule_id: Some(other.id),
            status: Some(AppointmentStatus::Approved),
            ..Default::default()
        };
        let updated = f
            .store
            .update_appointment(moving.appointment_id, same)
            .await
            .unwrap();
        assert_eq!(updated.schedule_id, other.id);
        assert_eq!(updated.appointment_date, later);

        f.store.delete_schedule(other.id).await.unwrap();
        let fresh = f
            .store
            .create_schedule(NewSchedule {
                doctor_id: f.doctor,
                schedule_date: later,
                am_max_patients: 2,
                pm_max_patients: 0,
            })
            .await
            .unwrap();
        let moved = f
            .store
            .update_appointment(
                moving.appointment_id,
                AppointmentUpdate {
                    schedule_id: Some(fresh.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(moved.schedule_id, fresh.id);
        let day = f.store.remaining_slots(fresh.id).await.unwrap();
        assert_eq!(day.am.remaining_slots, 1);
    }

    #[tokio::test]
    async fn test_booking_without_schedule_is_not_found() {
        let f = fixture(1, 1).await;
        let mut b = booking(&f, Slot::Pm);
        b.selected_date = NaiveDate::from_ymd_opt(2024, 6, 4).unwrap();
        assert!(f.store.book(b).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_queue_workflow() {
        let f = fixture(3, 3).await;
        let receipt = f.store.book(booking(&f, Slot::Pm)).await.unwrap();
        let entry = f
            .store
            .enqueue(NewQueueEntry {
                appointment_id: receipt.appointment_id,
                assigned_to: Some(f.doctor),
            })
            .await
            .unwrap();
        assert_eq!(entry.status, QueueStatus::Processing);
        let appt = f.store.get_appointment(receipt.appointment_id).await.unwrap();
        assert_eq!(appt.status, AppointmentStatus::Approved);

        // Already approved, cannot be queued again
        assert!(
            f.store
                .enqueue(NewQueueEntry {
                    appointment_id: receipt.appointment_id,
                    assigned_to: None,
                })
                .await
                .is_err()
        );

        let done = f.store.mark_queue_done(entry.id).await.unwrap();
        assert_eq!(done.status, QueueStatus::Done);
        assert!(done.processed_at.is_some());
        let appt = f.store.get_appointment(receipt.appointment_id).await.unwrap();
        assert_eq!(appt.status, AppointmentStatus::Done);

        let listed = f.store.queue_for_doctor(f.doctor).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].appointment_status, AppointmentStatus::Done);
    }

    #[tokio::test]
    async fn test_reject_only_pending() {
        let f = fixture(3, 3).await;
        let receipt = f.store.book(booking(&f, Slot::Am)).await.unwrap();
        let rejected = f.store.reject_appointment(receipt.appointment_id).await.unwrap();
        assert_eq!(rejected.status, AppointmentStatus::Rejected);
        assert!(rejected.deleted_at.is_some());
        assert!(
            f.store
                .reject_appointment(receipt.appointment_id)
                .await
                .unwrap_err()
                .is_not_found()
        );

        let mine = f.store.user_appointments(f.user).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].status, AppointmentStatus::Rejected);
        assert!(f.store.appointment_board(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_visit_record_and_patient_details() {
        let f = fixture(3, 3).await;
        let receipt = f.store.book(booking(&f, Slot::Am)).await.unwrap();
        let empty = f.store.patient_details(receipt.appointment_id).await.unwrap();
        assert_eq!(empty, PatientDetails::default());

        f.store
            .record_visit(
                receipt.appointment_id,
                VisitRecord {
                    remarks: "Stable".into(),
                    vital_signs: Some(VitalSigns {
                        bp: Some("110/70".into()),
                        ..Default::default()
                    }),
                    diagnosis: Some(DiagnosisInput {
                        diagnosis_text: "Normal pregnancy".into(),
                        doctor_id: Some(f.doctor),
                    }),
                },
            )
            .await
            .unwrap();

        let details = f.store.patient_details(receipt.appointment_id).await.unwrap();
        assert_eq!(details.remarks.as_deref(), Some("Stable"));
        assert_eq!(details.vital_signs.unwrap().bp.as_deref(), Some("110/70"));
        assert_eq!(details.diagnosis.as_deref(), Some("Normal pregnancy"));
    }

    #[tokio::test]
    async fn test_board_groups_by_slot() {
        let f = fixture(3, 3).await;
        f.store.book(booking(&f, Slot::Am)).await.unwrap();
        f.store.book(booking(&f, Slot::Pm)).await.unwrap();
        f.store.book(booking(&f, Slot::Pm)).await.unwrap();
        let board = f.store.appointment_board(Some(f.doctor)).await.unwrap();
        assert_eq!(board.am.len(), 1);
        assert_eq!(board.pm.len(), 2);
        assert!(f.store.appointment_board(Some(DoctorId::new(999))).await.unwrap().is_empty());
    }
}
