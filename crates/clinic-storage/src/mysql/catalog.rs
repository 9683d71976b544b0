use async_trait::async_trait;
use sqlx::Row;
use sqlx::mysql::MySqlRow;

use clinic_core::catalog::{
    PurposeRecord, PurposeSummary, PurposeWithSpecialty, Specialty, SpecialtyInput,
};
use clinic_core::{DoctorStatus, PurposeId, SpecialtyId};

use super::MySqlStore;
use super::rows;
use crate::error::{Error, Result};
use crate::traits::CatalogStore;

fn specialty(row: &MySqlRow) -> Result<Specialty> {
    Ok(Specialty {
        id: rows::id(row, "id")?,
        specialty_name: row.try_get("specialty_name")?,
        description: row.try_get("description")?,
    })
}

fn purpose(row: &MySqlRow) -> Result<PurposeRecord> {
    Ok(PurposeRecord {
        id: rows::id(row, "id")?,
        specialty_id: rows::id(row, "specialty_id")?,
        purpose_name: row.try_get("purpose_name")?,
    })
}

impl MySqlStore {
    async fn purpose(&self, id: PurposeId) -> Result<PurposeRecord> {
        let row = sqlx::query("SELECT id, specialty_id, purpose_name FROM purposes WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::not_found("purpose", id))?;
        purpose(&row)
    }
}

#[async_trait]
impl CatalogStore for MySqlStore {
    async fn list_specialties(&self) -> Result<Vec<Specialty>> {
        sqlx::query("SELECT id, specialty_name, description FROM doctor_specialties ORDER BY id")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(specialty)
            .collect()
    }

    async fn get_specialty(&self, id: SpecialtyId) -> Result<Specialty> {
        let row = sqlx::query(
            "SELECT id, specialty_name, description FROM doctor_specialties WHERE id = ?",
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::not_found("specialty", id))?;
        specialty(&row)
    }

    async fn create_specialty(&self, input: SpecialtyInput) -> Result<Specialty> {
        let result =
            sqlx::query("INSERT INTO doctor_specialties (specialty_name, description) VALUES (?, ?)")
                .bind(&input.specialty_name)
                .bind(&input.description)
                .execute(&self.pool)
                .await?;
        Ok(Specialty {
            id: SpecialtyId::new(rows::insert_id(&result)),
            specialty_name: input.specialty_name,
            description: input.description,
        })
    }

    async fn update_specialty(&self, id: SpecialtyId, input: SpecialtyInput) -> Result<Specialty> {
        sqlx::query(
            "UPDATE doctor_specialties SET specialty_name = ?, description = ? WHERE id = ?",
        )
        .bind(&input.specialty_name)
        .bind(&input.description)
        .bind(id.get())
        .execute(&self.pool)
        .await?;
        self.get_specialty(id).await
    }

    async fn delete_specialty(&self, id: SpecialtyId) -> Result<()> {
        let result = sqlx::query("DELETE FROM doctor_specialties WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("specialty", id));
        }
        Ok(())
    }

    async fn purposes_for_specialty(&self, id: SpecialtyId) -> Result<Vec<PurposeWithSpecialty>> {
        sqlx::query(
            "SELECT p.id, p.purpose_name, ds.specialty_name \
             FROM purposes p JOIN doctor_specialties ds ON ds.id = p.specialty_id \
             WHERE p.specialty_id = ? ORDER BY p.id",
        )
        .bind(id.get())
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|row| {
            Ok(PurposeWithSpecialty {
                id: rows::id(row, "id")?,
                purpose_name: row.try_get("purpose_name")?,
                specialty_name: row.try_get("specialty_name")?,
            })
        })
        .collect()
    }

    async fn create_purpose(&self, specialty: SpecialtyId, name: &str) -> Result<PurposeRecord> {
        self.get_specialty(specialty).await?;
        let result = sqlx::query("INSERT INTO purposes (specialty_id, purpose_name) VALUES (?, ?)")
            .bind(specialty.get())
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(PurposeRecord {
            id: PurposeId::new(rows::insert_id(&result)),
            specialty_id: specialty,
            purpose_name: name.to_string(),
        })
    }

    async fn rename_purpose(&self, id: PurposeId, name: &str) -> Result<PurposeRecord> {
        sqlx::query("UPDATE purposes SET purpose_name = ? WHERE id = ?")
            .bind(name)
            .bind(id.get())
            .execute(&self.pool)
            .await?;
        self.purpose(id).await
    }

    async fn delete_purpose(&self, id: PurposeId) -> Result<()> {
        let result = sqlx::query("DELETE FROM purposes WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("purpose", id));
        }
        Ok(())
    }

    async fn offered_purposes(&self) -> Result<Vec<PurposeSummary>> {
        sqlx::query(
            "SELECT DISTINCT p.id, p.purpose_name \
             FROM purposes p JOIN doctors d ON d.specialization_id = p.specialty_id \
             WHERE d.status = ? ORDER BY p.id",
        )
        .bind(DoctorStatus::Active.as_str())
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|row| {
            Ok(PurposeSummary {
                id: rows::id(row, "id")?,
                purpose_name: row.try_get("purpose_name")?,
            })
        })
        .collect()
    }
}
