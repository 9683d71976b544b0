use async_trait::async_trait;
use sqlx::Row;

use clinic_core::accounts::{
    Admin, AdminUpdate, Doctor, DoctorForPurpose, DoctorProfile, DoctorSummary, DoctorUpdate,
    NewAdmin, NewDoctor, NewUser, User, UserUpdate, WithPassword,
};
use clinic_core::{AdminId, DoctorId, DoctorStatus, PurposeId, UserId};

use super::MySqlStore;
use super::rows::{self, ADMIN_COLUMNS, DOCTOR_COLUMNS, USER_COLUMNS};
use crate::error::{Error, Result};
use crate::traits::AccountStore;

#[async_trait]
impl AccountStore for MySqlStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let result = sqlx::query(
            "INSERT INTO users (name, email, avatar, birthdate, address, phone_number, password) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.avatar)
        .bind(user.birthdate)
        .bind(&user.address)
        .bind(&user.phone_number)
        .bind(&user.password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::on_duplicate(e, "User already exists"))?;

        let id = UserId::new(rows::insert_id(&result));
        tracing::debug!(user_id = %id, "Registered user");
        Ok(User {
            id,
            name: user.name,
            email: user.email,
            avatar: user.avatar,
            address: user.address,
            phone_number: user.phone_number,
            birthdate: user.birthdate,
        })
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<WithPassword<User>>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| {
            Ok(WithPassword {
                account: rows::user(&row)?,
                password_hash: row.try_get("password")?,
            })
        })
        .transpose()
    }

    async fn get_user(&self, id: UserId) -> Result<User> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::not_found("user", id))?;
        rows::user(&row)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");
        sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(rows::user)
            .collect()
    }

    async fn update_user(&self, id: UserId, update: UserUpdate) -> Result<User> {
        sqlx::query(
            "UPDATE users SET name = COALESCE(?, name), email = COALESCE(?, email), \
             avatar = COALESCE(?, avatar), birthdate = COALESCE(?, birthdate), \
             address = COALESCE(?, address), phone_number = COALESCE(?, phone_number), \
             updated_at = NOW() WHERE id = ?",
        )
        .bind(&update.name)
        .bind(&update.email)
        .bind(&update.avatar)
        .bind(update.birthdate)
        .bind(&update.address)
        .bind(&update.phone_number)
        .bind(id.get())
        .execute(&self.pool)
        .await
        .map_err(|e| Error::on_duplicate(e, "Email is already in use"))?;
        self.get_user(id).await
    }

    async fn create_doctor(&self, doctor: NewDoctor) -> Result<Doctor> {
        let mut tx = self.pool.begin().await?;
        let specialty = sqlx::query("SELECT id FROM doctor_specialties WHERE id = ?")
            .bind(doctor.specialization_id.get())
            .fetch_optional(&mut *tx)
            .await?;
        if specialty.is_none() {
            return Err(Error::not_found("specialty", doctor.specialization_id));
        }

        let result = sqlx::query(
            "INSERT INTO doctors (name, email, password, birthdate, address, specialization_id, \
             phone_number, status) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&doctor.name)
        .bind(&doctor.email)
        .bind(&doctor.password_hash)
        .bind(doctor.birthdate)
        .bind(&doctor.address)
        .bind(doctor.specialization_id.get())
        .bind(&doctor.phone_number)
        .bind(DoctorStatus::Active.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| Error::on_duplicate(e, "Doctor already exists"))?;
        tx.commit().await?;

        let id = DoctorId::new(rows::insert_id(&result));
        tracing::debug!(doctor_id = %id, "Registered doctor");
        Ok(Doctor {
            id,
            name: doctor.name,
            email: doctor.email,
            avatar: None,
            birthdate: doctor.birthdate,
            address: doctor.address,
            phone_number: doctor.phone_number,
            specialization_id: Some(doctor.specialization_id),
            status: DoctorStatus::Active,
            updated_at: None,
        })
    }

    async fn find_doctor_by_email(&self, email: &str) -> Result<Option<WithPassword<Doctor>>> {
        let sql = format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE email = ?");
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| {
            Ok(WithPassword {
                account: rows::doctor(&row)?,
                password_hash: row.try_get("password")?,
            })
        })
        .transpose()
    }

    async fn doctor_profile(&self, id: DoctorId) -> Result<DoctorProfile> {
        let row = sqlx::query(
            "SELECT d.id, d.name, d.email, d.avatar, d.birthdate, d.address, d.phone_number, \
             d.specialization_id, d.status, d.updated_at, \
             ds.specialty_name, ds.description \
             FROM doctors d LEFT JOIN doctor_specialties ds ON ds.id = d.specialization_id \
             WHERE d.id = ?",
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::not_found("doctor", id))?;
        Ok(DoctorProfile {
            doctor: rows::doctor(&row)?,
            specialty_name: row.try_get("specialty_name")?,
            description: row.try_get("description")?,
        })
    }

    async fn update_doctor(&self, id: DoctorId, update: DoctorUpdate) -> Result<Doctor> {
        sqlx::query(
            "UPDATE doctors SET name = COALESCE(?, name), email = COALESCE(?, email), \
             password = COALESCE(?, password), avatar = COALESCE(?, avatar), \
             birthdate = COALESCE(?, birthdate), address = COALESCE(?, address), \
             phone_number = COALESCE(?, phone_number), status = COALESCE(?, status), \
             specialization_id = COALESCE(?, specialization_id), updated_at = NOW() \
             WHERE id = ?",
        )
        .bind(&update.name)
        .bind(&update.email)
        .bind(&update.password_hash)
        .bind(&update.avatar)
        .bind(update.birthdate)
        .bind(&update.address)
        .bind(&update.phone_number)
        .bind(update.status.map(DoctorStatus::as_str))
        .bind(update.specialization_id.map(|s| s.get()))
        .bind(id.get())
        .execute(&self.pool)
        .await
        .map_err(|e| Error::on_duplicate(e, "Email is already in use"))?;
        Ok(self.doctor_profile(id).await?.doctor)
    }

    async fn list_doctors(&self) -> Result<Vec<DoctorSummary>> {
        let mut tx = self.pool.begin().await?;
        let counts = sqlx::query(
            "SELECT d.id, d.status, COUNT(s.id) AS live_schedules \
             FROM doctors d \
             LEFT JOIN schedules s ON s.doctor_id = d.id AND s.deleted_at IS NULL \
             GROUP BY d.id, d.status",
        )
        .fetch_all(&mut *tx)
        .await?;

        for row in &counts {
            let doctor: DoctorId = rows::id(row, "id")?;
            let stored: DoctorStatus = rows::parsed(row, "status")?;
            let live: i64 = row.try_get("live_schedules")?;
            let status = DoctorStatus::from_schedule_count(live);
            if status != stored {
                sqlx::query("UPDATE doctors SET status = ? WHERE id = ?")
                    .bind(status.as_str())
                    .bind(doctor.get())
                    .execute(&mut *tx)
                    .await?;
                tracing::debug!(doctor_id = %doctor, status = %status, "Doctor status recomputed");
            }
        }

        let listed = sqlx::query(
            "SELECT d.id, d.name, d.email, d.avatar, d.birthdate, d.address, d.phone_number, \
             d.specialization_id, d.status, d.updated_at, \
             ds.specialty_name AS specialization, \
             (SELECT COUNT(*) FROM schedules s WHERE s.doctor_id = d.id AND s.deleted_at IS NULL) \
                AS active_schedule_count \
             FROM doctors d LEFT JOIN doctor_specialties ds ON ds.id = d.specialization_id \
             ORDER BY d.id",
        )
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;

        listed
            .iter()
            .map(|row| {
                Ok(DoctorSummary {
                    doctor: rows::doctor(row)?,
                    specialization: row.try_get("specialization")?,
                    active_schedule_count: row.try_get("active_schedule_count")?,
                })
            })
            .collect()
    }

    async fn doctors_for_purpose(&self, purpose: PurposeId) -> Result<Vec<DoctorForPurpose>> {
        sqlx::query(
            "SELECT d.id AS doctor_id, d.name AS doctor_name, d.email AS doctor_email, \
             d.avatar AS doctor_avatar, d.phone_number, d.address, ds.specialty_name \
             FROM purposes p \
             JOIN doctor_specialties ds ON ds.id = p.specialty_id \
             JOIN doctors d ON d.specialization_id = ds.id \
             WHERE p.id = ? ORDER BY d.id",
        )
        .bind(purpose.get())
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|row| {
            Ok(DoctorForPurpose {
                doctor_id: rows::id(row, "doctor_id")?,
                doctor_name: row.try_get("doctor_name")?,
                doctor_email: row.try_get("doctor_email")?,
                doctor_avatar: row.try_get("doctor_avatar")?,
                phone_number: row.try_get("phone_number")?,
                address: row.try_get("address")?,
                specialty_name: row.try_get("specialty_name")?,
            })
        })
        .collect()
    }

    async fn find_admin_by_email(&self, email: &str) -> Result<Option<WithPassword<Admin>>> {
        let sql = format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE email = ?");
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| {
            Ok(WithPassword {
                account: rows::admin(&row)?,
                password_hash: row.try_get("password")?,
            })
        })
        .transpose()
    }

    async fn get_admin(&self, id: AdminId) -> Result<Admin> {
        let sql = format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::not_found("admin", id))?;
        rows::admin(&row)
    }

    async fn update_admin(&self, id: AdminId, update: AdminUpdate) -> Result<Admin> {
        sqlx::query(
            "UPDATE admins SET name = COALESCE(?, name), email = COALESCE(?, email), \
             password = COALESCE(?, password), avatar = COALESCE(?, avatar) WHERE id = ?",
        )
        .bind(&update.name)
        .bind(&update.email)
        .bind(&update.password_hash)
        .bind(&update.avatar)
        .bind(id.get())
        .execute(&self.pool)
        .await
        .map_err(|e| Error::on_duplicate(e, "Email is already in use"))?;
        self.get_admin(id).await
    }

    async fn ensure_admin(&self, admin: NewAdmin) -> Result<Option<Admin>> {
        let mut tx = self.pool.begin().await?;
        let existing: i64 = sqlx::query("SELECT COUNT(*) AS n FROM admins")
            .fetch_one(&mut *tx)
            .await?
            .try_get("n")?;
        if existing > 0 {
            return Ok(None);
        }
        let result = sqlx::query("INSERT INTO admins (name, email, password) VALUES (?, ?, ?)")
            .bind(&admin.name)
            .bind(&admin.email)
            .bind(&admin.password_hash)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        let id = AdminId::new(rows::insert_id(&result));
        tracing::info!(admin_id = %id, email = %admin.email, "Created default admin");
        Ok(Some(Admin {
            id,
            name: admin.name,
            email: admin.email,
            avatar: None,
        }))
    }
}
