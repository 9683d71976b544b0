//! Half-day slots and visit purposes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Half-day capacity bucket within a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Slot {
    /// Morning
    Am,
    /// Afternoon
    Pm,
}

impl Slot {
    /// Both slots in display order.
    pub const ALL: [Slot; 2] = [Slot::Am, Slot::Pm];

    /// Database and wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Slot::Am => "AM",
            Slot::Pm => "PM",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Slot {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AM" => Ok(Slot::Am),
            "PM" => Ok(Slot::Pm),
            other => Err(Error::validation_field(
                "slot",
                format!("unknown slot '{other}', expected AM or PM"),
            )),
        }
    }
}

impl TryFrom<String> for Slot {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Slot> for String {
    fn from(slot: Slot) -> Self {
        slot.as_str().to_string()
    }
}

/// Reason for a visit. Selects which intake form is captured at booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Purpose {
    /// Prenatal check-up; captures [`crate::appointment::PrenatalForm`].
    Prenatal,
    /// Child immunization; captures [`crate::appointment::ImmunizationForm`].
    Immunization,
}

impl Purpose {
    /// Database and wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Purpose::Prenatal => "Prenatal",
            Purpose::Immunization => "Immunization",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Purpose {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prenatal" => Ok(Purpose::Prenatal),
            "immunization" => Ok(Purpose::Immunization),
            _ => Err(Error::validation_field("purpose", "Invalid purpose specified")),
        }
    }
}

impl TryFrom<String> for Purpose {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Purpose> for String {
    fn from(purpose: Purpose) -> Self {
        purpose.as_str().to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_parse_is_case_insensitive() {
        assert_eq!("am".parse::<Slot>().unwrap(), Slot::Am);
        assert_eq!(" PM ".parse::<Slot>().unwrap(), Slot::Pm);
        assert!("noon".parse::<Slot>().is_err());
    }

    #[test]
    fn test_slot_json() {
        assert_eq!(serde_json::to_string(&Slot::Pm).unwrap(), "\"PM\"");
        let slot: Slot = serde_json::from_str("\"am\"").unwrap();
        assert_eq!(slot, Slot::Am);
        assert!(serde_json::from_str::<Slot>("\"evening\"").is_err());
    }

    #[test]
    fn test_purpose_rejects_unknown() {
        assert_eq!("PRENATAL".parse::<Purpose>().unwrap(), Purpose::Prenatal);
        let err = "Dental".parse::<Purpose>().unwrap_err();
        assert!(err.to_string().contains("Invalid purpose specified"));
    }
}
