//! Doctor specialties and the visit purposes each one offers.

use serde::{Deserialize, Serialize};

use crate::ids::{PurposeId, SpecialtyId};

/// A medical specialty doctors register under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specialty {
    /// Primary key
    pub id: SpecialtyId,
    /// Specialty name, unique
    pub specialty_name: String,
    /// What the specialty covers
    pub description: Option<String>,
}

/// Fields for creating or replacing a specialty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialtyInput {
    /// Specialty name; required
    pub specialty_name: String,
    /// What the specialty covers
    pub description: Option<String>,
}

/// A visit purpose owned by a specialty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurposeRecord {
    /// Primary key
    pub id: PurposeId,
    /// Specialty offering the purpose
    pub specialty_id: SpecialtyId,
    /// Purpose label shown to patients
    pub purpose_name: String,
}

/// Purpose listed together with its specialty name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurposeWithSpecialty {
    /// Primary key
    pub id: PurposeId,
    /// Purpose label shown to patients
    pub purpose_name: String,
    /// Specialty offering the purpose
    pub specialty_name: String,
}

/// Purpose offered by at least one active doctor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PurposeSummary {
    /// Primary key
    pub id: PurposeId,
    /// Purpose label
    pub purpose_name: String,
}
