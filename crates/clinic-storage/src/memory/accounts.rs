use async_trait::async_trait;

use clinic_core::accounts::{
    Admin, AdminUpdate, Doctor, DoctorForPurpose, DoctorProfile, DoctorSummary, DoctorUpdate,
    NewAdmin, NewDoctor, NewUser, User, UserUpdate, WithPassword,
};
use clinic_core::{AdminId, DoctorId, DoctorStatus, PurposeId, UserId};

use super::{MemoryStore, now};
use crate::error::{Error, Result};
use crate::traits::AccountStore;

fn same_email(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut t = self.write()?;
        if t.users.values().any(|u| same_email(&u.account.email, &user.email)) {
            return Err(Error::conflict("User already exists"));
        }
        let id = UserId::new(t.next_id());
        let record = User {
            id,
            name: user.name,
            email: user.email,
            avatar: user.avatar,
            address: user.address,
            phone_number: user.phone_number,
            birthdate: user.birthdate,
        };
        t.users.insert(
            id,
            WithPassword {
                account: record.clone(),
                password_hash: user.password_hash,
            },
        );
        Ok(record)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<WithPassword<User>>> {
        let t = self.read()?;
        Ok(t.users
            .values()
            .find(|u| same_email(&u.account.email, email))
            .cloned())
    }

    async fn get_user(&self, id: UserId) -> Result<User> {
        self.read()?.user(id).cloned()
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let t = self.read()?;
        Ok(t.users.values().map(|u| u.account.clone()).collect())
    }

    async fn update_user(&self, id: UserId, update: UserUpdate) -> Result<User> {
        let mut t = self.write()?;
        if let Some(email) = &update.email
            && t.users
                .values()
                .any(|u| u.account.id != id && same_email(&u.account.email, email))
        {
            return Err(Error::conflict("Email is already in use"));
        }
        let stored = t.users.get_mut(&id).ok_or_else(|| Error::not_found("user", id))?;
        stored.account.apply(update);
        Ok(stored.account.clone())
    }

    async fn create_doctor(&self, doctor: NewDoctor) -> Result<Doctor> {
        let mut t = self.write()?;
        if t.doctors.values().any(|d| same_email(&d.account.email, &doctor.email)) {
            return Err(Error::conflict("Doctor already exists"));
        }
        if !t.specialties.contains_key(&doctor.specialization_id) {
            return Err(Error::not_found("specialty", doctor.specialization_id));
        }
        let id = DoctorId::new(t.next_id());
        let record = Doctor {
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
        };
        t.doctors.insert(
            id,
            WithPassword {
                account: record.clone(),
                password_hash: doctor.password_hash,
            },
        );
        Ok(record)
    }

    async fn find_doctor_by_email(&self, email: &str) -> Result<Option<WithPassword<Doctor>>> {
        let t = self.read()?;
        Ok(t.doctors
            .values()
            .find(|d| same_email(&d.account.email, email))
            .cloned())
    }

    async fn doctor_profile(&self, id: DoctorId) -> Result<DoctorProfile> {
        let t = self.read()?;
        let doctor = t.doctor(id)?.clone();
        let specialty = doctor
            .specialization_id
            .and_then(|sid| t.specialties.get(&sid));
        Ok(DoctorProfile {
            specialty_name: specialty.map(|s| s.specialty_name.clone()),
            description: specialty.and_then(|s| s.description.clone()),
            doctor,
        })
    }

    async fn update_doctor(&self, id: DoctorId, update: DoctorUpdate) -> Result<Doctor> {
        let mut t = self.write()?;
        if let Some(email) = &update.email
            && t.doctors
                .values()
                .any(|d| d.account.id != id && same_email(&d.account.email, email))
        {
            return Err(Error::conflict("Email is already in use"));
        }
        let stored = t
            .doctors
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("doctor", id))?;
        stored.account.apply(&update);
        if let Some(hash) = update.password_hash {
            stored.password_hash = hash;
        }
        stored.account.updated_at = Some(now());
        Ok(stored.account.clone())
    }

    async fn list_doctors(&self) -> Result<Vec<DoctorSummary>> {
        let mut t = self.write()?;
        let ids: Vec<DoctorId> = t.doctors.keys().copied().collect();
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            let count = t.live_schedule_count(id);
            let status = DoctorStatus::from_schedule_count(count);
            let specialization = {
                let doctor = t.doctor(id)?;
                t.specialty_name(doctor.specialization_id)
            };
            let stored = t
                .doctors
                .get_mut(&id)
                .ok_or_else(|| Error::not_found("doctor", id))?;
            stored.account.status = status;
            out.push(DoctorSummary {
                doctor: stored.account.clone(),
                specialization,
                active_schedule_count: count,
            });
        }
        Ok(out)
    }

    async fn doctors_for_purpose(&self, purpose: PurposeId) -> Result<Vec<DoctorForPurpose>> {
        let t = self.read()?;
        let Some(purpose) = t.purposes.get(&purpose) else {
            return Ok(Vec::new());
        };
        let Some(specialty) = t.specialties.get(&purpose.specialty_id) else {
            return Ok(Vec::new());
        };
        Ok(t.doctors
            .values()
            .map(|d| &d.account)
            .filter(|d| d.specialization_id == Some(specialty.id))
            .map(|d| DoctorForPurpose {
                doctor_id: d.id,
                doctor_name: d.name.clone(),
                doctor_email: d.email.clone(),
                doctor_avatar: d.avatar.clone(),
                phone_number: d.phone_number.clone(),
                address: d.address.clone(),
                specialty_name: specialty.specialty_name.clone(),
            })
            .collect())
    }

    async fn find_admin_by_email(&self, email: &str) -> Result<Option<WithPassword<Admin>>> {
        let t = self.read()?;
        Ok(t.admins
            .values()
            .find(|a| same_email(&a.account.email, email))
            .cloned())
    }

    async fn get_admin(&self, id: AdminId) -> Result<Admin> {
        let t = self.read()?;
        t.admins
            .get(&id)
            .map(|a| a.account.clone())
            .ok_or_else(|| Error::not_found("admin", id))
    }

    async fn update_admin(&self, id: AdminId, update: AdminUpdate) -> Result<Admin> {
        let mut t = self.write()?;
        if let Some(email) = &update.email
            && t.admins
                .values()
                .any(|a| a.account.id != id && same_email(&a.account.email, email))
        {
            return Err(Error::conflict("Email is already in use"));
        }
        let stored = t
            .admins
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("admin", id))?;
        if let Some(name) = update.name {
            stored.account.name = name;
        }
        if let Some(email) = update.email {
            stored.account.email = email;
        }
        if update.avatar.is_some() {
            stored.account.avatar = update.avatar;
        }
        if let Some(hash) = update.password_hash {
            stored.password_hash = hash;
        }
        Ok(stored.account.clone())
    }

    async fn ensure_admin(&self, admin: NewAdmin) -> Result<Option<Admin>> {
        let mut t = self.write()?;
        if !t.admins.is_empty() {
            return Ok(None);
        }
        let id = AdminId::new(t.next_id());
        let record = Admin {
            id,
            name: admin.name,
            email: admin.email,
            avatar: None,
        };
        t.admins.insert(
            id,
            WithPassword {
                account: record.clone(),
                password_hash: admin.password_hash,
            },
        );
        Ok(Some(record))
    }
}
