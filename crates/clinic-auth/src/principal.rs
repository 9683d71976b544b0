//! Authenticated account identity and extraction helpers.

use clinic_core::{AdminId, DoctorId, Role, UserId};

use crate::AuthError;

/// An authenticated account, extracted from a validated token.
///
/// Stored in HTTP request extensions by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Row id in the table matching `role`.
    pub id: i64,
    /// Portal the account belongs to.
    pub role: Role,
    /// Account email.
    pub email: String,
    /// Display name.
    pub name: String,
}

impl Principal {
    /// Builds a principal for a patient account.
    pub fn user(id: UserId, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.get(),
            role: Role::User,
            email: email.into(),
            name: name.into(),
        }
    }

    /// Builds a principal for a doctor account.
    pub fn doctor(id: DoctorId, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.get(),
            role: Role::Doctor,
            email: email.into(),
            name: name.into(),
        }
    }

    /// Builds a principal for an admin account.
    pub fn admin(id: AdminId, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.get(),
            role: Role::Admin,
            email: email.into(),
            name: name.into(),
        }
    }

    /// Fails with [`AuthError::Forbidden`] unless the role is one of `allowed`.
    pub fn require(&self, allowed: &[Role]) -> Result<(), AuthError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(AuthError::Forbidden { role: self.role })
        }
    }

    /// The admin id, when this is an admin.
    pub fn admin_id(&self) -> Option<AdminId> {
        (self.role == Role::Admin).then(|| AdminId::new(self.id))
    }

    /// The doctor id, when this is a doctor.
    pub fn doctor_id(&self) -> Option<DoctorId> {
        (self.role == Role::Doctor).then(|| DoctorId::new(self.id))
    }

    /// The patient id, when this is a patient.
    pub fn user_id(&self) -> Option<UserId> {
        (self.role == Role::User).then(|| UserId::new(self.id))
    }
}

/// Extract the [`Principal`] from HTTP request `Parts`, if present.
pub fn principal_from_parts(parts: &http::request::Parts) -> Option<&Principal> {
    parts.extensions.get::<Principal>()
}
