use std::collections::BTreeSet;

use async_trait::async_trait;

use clinic_core::catalog::{PurposeRecord, PurposeSummary, PurposeWithSpecialty, Specialty, SpecialtyInput};
use clinic_core::{DoctorStatus, PurposeId, SpecialtyId};

use super::MemoryStore;
use crate::error::{Error, Result};
use crate::traits::CatalogStore;

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list_specialties(&self) -> Result<Vec<Specialty>> {
        Ok(self.read()?.specialties.values().cloned().collect())
    }

    async fn get_specialty(&self, id: SpecialtyId) -> Result<Specialty> {
        self.read()?
            .specialties
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found("specialty", id))
    }

    async fn create_specialty(&self, input: SpecialtyInput) -> Result<Specialty> {
        let mut t = self.write()?;
        let id = SpecialtyId::new(t.next_id());
        let specialty = Specialty {
            id,
            specialty_name: input.specialty_name,
            description: input.description,
        };
        t.specialties.insert(id, specialty.clone());
        Ok(specialty)
    }

    async fn update_specialty(&self, id: SpecialtyId, input: SpecialtyInput) -> Result<Specialty> {
        let mut t = self.write()?;
        let specialty = t
            .specialties
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("specialty", id))?;
        specialty.specialty_name = input.specialty_name;
        specialty.description = input.description;
        Ok(specialty.clone())
    }

    async fn delete_specialty(&self, id: SpecialtyId) -> Result<()> {
        let mut t = self.write()?;
        if t.specialties.remove(&id).is_none() {
            return Err(Error::not_found("specialty", id));
        }
        t.purposes.retain(|_, p| p.specialty_id != id);
        for doctor in t.doctors.values_mut() {
            if doctor.account.specialization_id == Some(id) {
                doctor.account.specialization_id = None;
            }
        }
        Ok(())
    }

    async fn purposes_for_specialty(&self, id: SpecialtyId) -> Result<Vec<PurposeWithSpecialty>> {
        let t = self.read()?;
        let Some(specialty) = t.specialties.get(&id) else {
            return Ok(Vec::new());
        };
        Ok(t.purposes
            .values()
            .filter(|p| p.specialty_id == id)
            .map(|p| PurposeWithSpecialty {
                id: p.id,
                purpose_name: p.purpose_name.clone(),
                specialty_name: specialty.specialty_name.clone(),
            })
            .collect())
    }

    async fn create_purpose(&self, specialty: SpecialtyId, name: &str) -> Result<PurposeRecord> {
        let mut t = self.write()?;
        if !t.specialties.contains_key(&specialty) {
            return Err(Error::not_found("specialty", specialty));
        }
        let id = PurposeId::new(t.next_id());
        let purpose = PurposeRecord {
            id,
            specialty_id: specialty,
            purpose_name: name.to_string(),
        };
        t.purposes.insert(id, purpose.clone());
        Ok(purpose)
    }

    async fn rename_purpose(&self, id: PurposeId, name: &str) -> Result<PurposeRecord> {
        let mut t = self.write()?;
        let purpose = t
            .purposes
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("purpose", id))?;
        purpose.purpose_name = name.to_string();
        Ok(purpose.clone())
    }

    async fn delete_purpose(&self, id: PurposeId) -> Result<()> {
        let mut t = self.write()?;
        t.purposes
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found("purpose", id))
    }

    async fn offered_purposes(&self) -> Result<Vec<PurposeSummary>> {
        let t = self.read()?;
        let active: BTreeSet<SpecialtyId> = t
            .doctors
            .values()
            .filter(|d| d.account.status == DoctorStatus::Active)
            .filter_map(|d| d.account.specialization_id)
            .collect();
        Ok(t.purposes
            .values()
            .filter(|p| active.contains(&p.specialty_id))
            .map(|p| PurposeSummary {
                id: p.id,
                purpose_name: p.purpose_name.clone(),
            })
            .collect())
    }
}
