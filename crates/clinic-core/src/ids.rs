//! Identifier newtypes for clinic records.
//!
//! Every table uses a `BIGINT AUTO_INCREMENT` primary key. Wrapping the raw
//! integer keeps a doctor id from being passed where a schedule id is
//! expected.
//!
//! Ids serialize as bare numbers. They deserialize from a number or a numeric
//! string, since the portals send ids read back from `localStorage` as text.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl RawId {
    fn into_raw<E: serde::de::Error>(self) -> std::result::Result<i64, E> {
        match self {
            RawId::Number(n) => Ok(n),
            RawId::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("expected a numeric id, got '{s}'"))),
        }
    }
}

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                RawId::deserialize(deserializer)?.into_raw().map(Self)
            }
        }

        impl $name {
            /// Wraps a raw database key.
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Returns the raw database key.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }
    };
}

record_id!(
    /// Patient-portal account.
    UserId
);
record_id!(
    /// Doctor account.
    DoctorId
);
record_id!(
    /// Admin account.
    AdminId
);
record_id!(
    /// Doctor specialty.
    SpecialtyId
);
record_id!(
    /// Visit purpose offered by a specialty.
    PurposeId
);
record_id!(
    /// Per-day AM/PM capacity record.
    ScheduleId
);
record_id!(
    /// Booking against a schedule slot.
    AppointmentId
);
record_id!(
    /// Visit queue entry.
    QueueId
);
record_id!(
    /// Clinic announcement.
    AnnouncementId
);
record_id!(
    /// Patient record created per booking.
    PatientId
);
record_id!(
    /// Prenatal intake form.
    PrenatalId
);
record_id!(
    /// Immunization intake form.
    ImmunizationId
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_serializes_as_bare_number() {
        let id = ScheduleId::new(17);
        assert_eq!(serde_json::to_string(&id).unwrap(), "17");
        let back: ScheduleId = serde_json::from_str("17").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_id_accepts_numeric_string() {
        let id: UserId = serde_json::from_str("\"5\"").unwrap();
        assert_eq!(id, UserId::new(5));
        let id: Option<DoctorId> = serde_json::from_str("\" 12 \"").unwrap();
        assert_eq!(id, Some(DoctorId::new(12)));

        let err = serde_json::from_str::<UserId>("\"five\"").unwrap_err();
        assert!(err.to_string().contains("numeric id"));
        assert!(serde_json::from_str::<UserId>("1.5").is_err());
    }

    #[test]
    fn test_id_parses_from_path_segment() {
        let id: AppointmentId = " 9 ".parse().unwrap();
        assert_eq!(id.get(), 9);
        assert!("abc".parse::<AppointmentId>().is_err());
    }
}
