use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::NaiveDate;

use clinic_core::announcement::{
    Announcement, AnnouncementUpdate, AnnouncementView, NewAnnouncement,
};
use clinic_core::appointment::{ImmunizationInfo, PrenatalForm, PrenatalInfo};
use clinic_core::stats::ClinicStats;
use clinic_core::{
    AnnouncementId, AppointmentStatus, DoctorId, DoctorStatus, PrenatalId, UserId,
};

use super::{MemoryStore, Tables, now};
use crate::error::{Error, Result};
use crate::traits::{AnnouncementStore, RecordStore, StatsStore};

impl Tables {
    fn announcement_view(&self, announcement: &Announcement) -> AnnouncementView {
        AnnouncementView {
            created_by_name: self
                .admins
                .get(&announcement.created_by)
                .map(|a| a.account.name.clone()),
            announcement: announcement.clone(),
        }
    }
}

#[async_trait]
impl AnnouncementStore for MemoryStore {
    async fn create_announcement(&self, announcement: NewAnnouncement) -> Result<Announcement> {
        let mut t = self.write()?;
        if !t.admins.contains_key(&announcement.created_by) {
            return Err(Error::not_found("admin", announcement.created_by));
        }
        let id = AnnouncementId::new(t.next_id());
        let record = Announcement {
            id,
            title: announcement.title,
            description: announcement.description,
            created_by: announcement.created_by,
            created_at: Some(now()),
        };
        t.announcements.insert(id, record.clone());
        Ok(record)
    }

    async fn list_announcements(&self) -> Result<Vec<AnnouncementView>> {
        let t = self.read()?;
        Ok(t.announcements
            .values()
            .map(|a| t.announcement_view(a))
            .collect())
    }

    async fn get_announcement(&self, id: AnnouncementId) -> Result<AnnouncementView> {
        let t = self.read()?;
        t.announcements
            .get(&id)
            .map(|a| t.announcement_view(a))
            .ok_or_else(|| Error::not_found("announcement", id))
    }

    async fn update_announcement(
        &self,
        id: AnnouncementId,
        update: AnnouncementUpdate,
    ) -> Result<Announcement> {
        let mut t = self.write()?;
        let record = t
            .announcements
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("announcement", id))?;
        record.title = update.title;
        record.description = update.description;
        Ok(record.clone())
    }

    async fn delete_announcement(&self, id: AnnouncementId) -> Result<()> {
        let mut t = self.write()?;
        t.announcements
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found("announcement", id))
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get_prenatal(&self, id: PrenatalId) -> Result<PrenatalInfo> {
        self.read()?
            .prenatal
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found("prenatal info", id))
    }

    async fn create_prenatal(
        &self,
        user: Option<UserId>,
        form: PrenatalForm,
    ) -> Result<PrenatalInfo> {
        let mut t = self.write()?;
        let id = PrenatalId::new(t.next_id());
        let record = PrenatalInfo {
            id,
            user_id: user,
            form,
        };
        t.prenatal.insert(id, record.clone());
        Ok(record)
    }

    async fn update_prenatal(&self, id: PrenatalId, form: PrenatalForm) -> Result<PrenatalInfo> {
        let mut t = self.write()?;
        let record = t
            .prenatal
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("prenatal info", id))?;
        record.form = form;
        Ok(record.clone())
    }

    async fn delete_prenatal(&self, id: PrenatalId) -> Result<()> {
        let mut t = self.write()?;
        t.prenatal
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found("prenatal info", id))
    }

    async fn immunization_for_user(&self, user: UserId) -> Result<ImmunizationInfo> {
        self.read()?
            .immunizations
            .values()
            .find(|i| i.user_id == Some(user))
            .cloned()
            .ok_or_else(|| Error::not_found("immunization info for user", user))
    }

    async fn list_immunizations(&self) -> Result<Vec<ImmunizationInfo>> {
        Ok(self.read()?.immunizations.values().cloned().collect())
    }
}

#[async_trait]
impl StatsStore for MemoryStore {
    async fn clinic_stats(&self, doctor: Option<DoctorId>) -> Result<ClinicStats> {
        let guard = self.read()?;
        let t: &Tables = &guard;
        let scoped = || {
            t.appointments
                .values()
                .filter(move |a| doctor.is_none_or(|d| a.doctor_id == d))
        };
        let patients: BTreeSet<UserId> = scoped().map(|a| a.user_id).collect();
        let active_doctors = t
            .doctors
            .values()
            .filter(|d| doctor.is_none_or(|id| d.account.id == id))
            .filter(|d| d.account.status == DoctorStatus::Active)
            .count();
        Ok(ClinicStats {
            total_appointments: scoped().count() as i64,
            active_doctors: active_doctors as i64,
            total_patients: patients.len() as i64,
            pending_appointments: scoped()
                .filter(|a| a.is_live() && a.status == AppointmentStatus::Pending)
                .count() as i64,
        })
    }

    async fn pending_dates(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<NaiveDate>> {
        let t = self.read()?;
        Ok(t.appointments
            .values()
            .filter(|a| a.is_live() && a.status == AppointmentStatus::Pending)
            .map(|a| a.appointment_date)
            .filter(|d| (from..=to).contains(d))
            .collect())
    }
}
