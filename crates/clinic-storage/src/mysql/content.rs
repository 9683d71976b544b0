use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{MySqlConnection, Row};

use clinic_core::announcement::{
    Announcement, AnnouncementUpdate, AnnouncementView, NewAnnouncement,
};
use clinic_core::appointment::{ImmunizationForm, ImmunizationInfo, PrenatalForm, PrenatalInfo};
use clinic_core::stats::ClinicStats;
use clinic_core::{
    AdminId, AnnouncementId, AppointmentStatus, DoctorId, DoctorStatus, ImmunizationId,
    PrenatalId, UserId,
};

use super::MySqlStore;
use super::rows::{self, IMMUNIZATION_COLUMNS, PRENATAL_COLUMNS};
use crate::error::{Error, Result};
use crate::traits::{AnnouncementStore, RecordStore, StatsStore};

const ANNOUNCEMENT_VIEW_SELECT: &str = "SELECT an.id, an.title, an.description, an.created_by, \
     an.created_at, ad.name AS created_by_name \
     FROM announcements an LEFT JOIN admins ad ON ad.id = an.created_by";

pub(super) async fn insert_prenatal(
    conn: &mut MySqlConnection,
    user: Option<UserId>,
    form: &PrenatalForm,
) -> Result<PrenatalId> {
    let result = sqlx::query(
        "INSERT INTO prenatal_info (user_id, name, age, address, occupation, husband_name, \
         husband_age) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(user.map(|u| u.get()))
    .bind(&form.name)
    .bind(form.age)
    .bind(&form.address)
    .bind(&form.occupation)
    .bind(&form.husband_name)
    .bind(form.husband_age)
    .execute(conn)
    .await?;
    Ok(PrenatalId::new(rows::insert_id(&result)))
}

pub(super) async fn insert_immunization(
    conn: &mut MySqlConnection,
    user: Option<UserId>,
    form: &ImmunizationForm,
) -> Result<ImmunizationId> {
    let result = sqlx::query(
        "INSERT INTO immunization_info (user_id, child_name, birthdate, birthplace, address, \
         mother_name, father_name, birth_height, birth_weight, sex, health_center, barangay, \
         family_number) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(user.map(|u| u.get()))
    .bind(&form.child_name)
    .bind(form.birthdate)
    .bind(&form.birthplace)
    .bind(&form.address)
    .bind(&form.mother_name)
    .bind(&form.father_name)
    .bind(form.birth_height)
    .bind(form.birth_weight)
    .bind(&form.sex)
    .bind(&form.health_center)
    .bind(&form.barangay)
    .bind(&form.family_number)
    .execute(conn)
    .await?;
    Ok(ImmunizationId::new(rows::insert_id(&result)))
}

impl MySqlStore {
    async fn announcement(&self, id: AnnouncementId) -> Result<Announcement> {
        Ok(self.get_announcement(id).await?.announcement)
    }

    async fn ensure_admin_exists(&self, id: AdminId) -> Result<()> {
        sqlx::query("SELECT id FROM admins WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?
            .map(|_| ())
            .ok_or_else(|| Error::not_found("admin", id))
    }
}

#[async_trait]
impl AnnouncementStore for MySqlStore {
    async fn create_announcement(&self, announcement: NewAnnouncement) -> Result<Announcement> {
        self.ensure_admin_exists(announcement.created_by).await?;
        let result = sqlx::query(
            "INSERT INTO announcements (title, description, created_by) VALUES (?, ?, ?)",
        )
        .bind(&announcement.title)
        .bind(&announcement.description)
        .bind(announcement.created_by.get())
        .execute(&self.pool)
        .await?;
        let id = AnnouncementId::new(rows::insert_id(&result));
        tracing::info!(announcement_id = %id, "Announcement posted");
        self.announcement(id).await
    }

    async fn list_announcements(&self) -> Result<Vec<AnnouncementView>> {
        let sql = format!("{ANNOUNCEMENT_VIEW_SELECT} ORDER BY an.created_at DESC, an.id DESC");
        sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(rows::announcement_view)
            .collect()
    }

    async fn get_announcement(&self, id: AnnouncementId) -> Result<AnnouncementView> {
        let sql = format!("{ANNOUNCEMENT_VIEW_SELECT} WHERE an.id = ?");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::not_found("announcement", id))?;
        rows::announcement_view(&row)
    }

    async fn update_announcement(
        &self,
        id: AnnouncementId,
        update: AnnouncementUpdate,
    ) -> Result<Announcement> {
        sqlx::query("UPDATE announcements SET title = ?, description = ? WHERE id = ?")
            .bind(&update.title)
            .bind(&update.description)
            .bind(id.get())
            .execute(&self.pool)
            .await?;
        self.announcement(id).await
    }

    async fn delete_announcement(&self, id: AnnouncementId) -> Result<()> {
        let result = sqlx::query("DELETE FROM announcements WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("announcement", id));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MySqlStore {
    async fn get_prenatal(&self, id: PrenatalId) -> Result<PrenatalInfo> {
        let sql = format!("SELECT {PRENATAL_COLUMNS} FROM prenatal_info WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::not_found("prenatal info", id))?;
        rows::prenatal(&row)
    }

    async fn create_prenatal(
        &self,
        user: Option<UserId>,
        form: PrenatalForm,
    ) -> Result<PrenatalInfo> {
        let mut conn = self.pool.acquire().await?;
        let id = insert_prenatal(&mut conn, user, &form).await?;
        Ok(PrenatalInfo {
            id,
            user_id: user,
            form,
        })
    }

    async fn update_prenatal(&self, id: PrenatalId, form: PrenatalForm) -> Result<PrenatalInfo> {
        sqlx::query(
            "UPDATE prenatal_info SET name = ?, age = ?, address = ?, occupation = ?, \
             husband_name = ?, husband_age = ? WHERE id = ?",
        )
        .bind(&form.name)
        .bind(form.age)
        .bind(&form.address)
        .bind(&form.occupation)
        .bind(&form.husband_name)
        .bind(form.husband_age)
        .bind(id.get())
        .execute(&self.pool)
        .await?;
        self.get_prenatal(id).await
    }

    async fn delete_prenatal(&self, id: PrenatalId) -> Result<()> {
        let result = sqlx::query("DELETE FROM prenatal_info WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("prenatal info", id));
        }
        Ok(())
    }

    async fn immunization_for_user(&self, user: UserId) -> Result<ImmunizationInfo> {
        let sql = format!(
            "SELECT {IMMUNIZATION_COLUMNS} FROM immunization_info WHERE user_id = ? \
             ORDER BY id LIMIT 1"
        );
        let row = sqlx::query(&sql)
            .bind(user.get())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::not_found("immunization info for user", user))?;
        rows::immunization(&row)
    }

    async fn list_immunizations(&self) -> Result<Vec<ImmunizationInfo>> {
        let sql = format!("SELECT {IMMUNIZATION_COLUMNS} FROM immunization_info ORDER BY id");
        sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(rows::immunization)
            .collect()
    }
}

#[async_trait]
impl StatsStore for MySqlStore {
    async fn clinic_stats(&self, doctor: Option<DoctorId>) -> Result<ClinicStats> {
        let doctor = doctor.map(|d| d.get());
        let row = sqlx::query(
            "SELECT \
             (SELECT COUNT(*) FROM appointments WHERE ? IS NULL OR doctor_id = ?) \
                AS total_appointments, \
             (SELECT COUNT(*) FROM doctors WHERE status = ? AND (? IS NULL OR id = ?)) \
                AS active_doctors, \
             (SELECT COUNT(DISTINCT user_id) FROM appointments WHERE ? IS NULL OR doctor_id = ?) \
                AS total_patients, \
             (SELECT COUNT(*) FROM appointments WHERE status = ? AND deleted_at IS NULL \
                AND (? IS NULL OR doctor_id = ?)) AS pending_appointments",
        )
        .bind(doctor)
        .bind(doctor)
        .bind(DoctorStatus::Active.as_str())
        .bind(doctor)
        .bind(doctor)
        .bind(doctor)
        .bind(doctor)
        .bind(AppointmentStatus::Pending.as_str())
        .bind(doctor)
        .bind(doctor)
        .fetch_one(&self.pool)
        .await?;
        Ok(ClinicStats {
            total_appointments: row.try_get("total_appointments")?,
            active_doctors: row.try_get("active_doctors")?,
            total_patients: row.try_get("total_patients")?,
            pending_appointments: row.try_get("pending_appointments")?,
        })
    }

    async fn pending_dates(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<NaiveDate>> {
        sqlx::query(
            "SELECT appointment_date FROM appointments \
             WHERE status = ? AND deleted_at IS NULL AND appointment_date BETWEEN ? AND ?",
        )
        .bind(AppointmentStatus::Pending.as_str())
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|row| Ok(row.try_get("appointment_date")?))
        .collect()
    }
}
