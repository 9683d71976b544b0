//! Clinic announcements posted by admins.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ids::{AdminId, AnnouncementId};
use crate::validate;

/// A stored announcement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    /// Primary key
    pub id: AnnouncementId,
    /// Headline
    pub title: String,
    /// Body text
    pub description: String,
    /// Admin who posted it
    pub created_by: AdminId,
    /// Creation time
    pub created_at: Option<NaiveDateTime>,
}

/// Announcement with the author's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnouncementView {
    /// The announcement
    #[serde(flatten)]
    pub announcement: Announcement,
    /// Posting admin's name
    pub created_by_name: Option<String>,
}

/// Fields for a new announcement.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnnouncement {
    /// Headline
    pub title: String,
    /// Body text
    pub description: String,
    /// Admin who posted it
    pub created_by: AdminId,
}

impl NewAnnouncement {
    /// Trims and checks the required fields.
    pub fn new(title: &str, description: &str, created_by: AdminId) -> Result<Self> {
        let title = validate::required("title", title, "Title is required")?;
        let description = validate::required("description", description, "Description is required")?;
        Ok(Self {
            title: title.to_string(),
            description: description.to_string(),
            created_by,
        })
    }
}

/// Replacement title and description.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnouncementUpdate {
    /// New headline
    pub title: String,
    /// New body text
    pub description: String,
}

impl AnnouncementUpdate {
    /// Both fields are required on update.
    pub fn new(title: &str, description: &str) -> Result<Self> {
        let title = validate::required("title", title, "Title and description are required")?;
        let description =
            validate::required("description", description, "Title and description are required")?;
        Ok(Self {
            title: title.to_string(),
            description: description.to_string(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_announcement_requires_fields() {
        assert!(NewAnnouncement::new("", "body", AdminId::new(1)).is_err());
        assert!(NewAnnouncement::new("Title", "  ", AdminId::new(1)).is_err());
        let ok = NewAnnouncement::new(" Free checkup ", "Saturday", AdminId::new(1)).unwrap();
        assert_eq!(ok.title, "Free checkup");
    }

    #[test]
    fn test_view_flattens_announcement() {
        let view = AnnouncementView {
            announcement: Announcement {
                id: AnnouncementId::new(2),
                title: "Closed".into(),
                description: "Holiday".into(),
                created_by: AdminId::new(1),
                created_at: None,
            },
            created_by_name: Some("Admin".into()),
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["id"], 2);
        assert_eq!(json["created_by_name"], "Admin");
    }
}
