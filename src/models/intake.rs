/// Offsec Program - Intake request model.
///
/// An intake request is a pre-engagement ask. Conversion to an engagement is
/// tracked via the "Converted" status and the linked_engagement_id column
/// but is not automated here.
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::intake_requests;

/// Intake request lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntakeStatus {
    New,
    Reviewed,
    Approved,
    Rejected,
    Converted,
}

impl IntakeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Reviewed => "Reviewed",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Converted => "Converted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "New" => Some(Self::New),
            "Reviewed" => Some(Self::Reviewed),
            "Approved" => Some(Self::Approved),
            "Rejected" => Some(Self::Rejected),
            "Converted" => Some(Self::Converted),
            _ => None,
        }
    }
}

/// Intake request database model.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = intake_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct IntakeRequest {
    pub id: i32,
    pub title: String,
    pub requester_name: Option<String>,
    pub requester_email: Option<String>,
    pub business_unit: Option<String>,
    pub system_name: Option<String>,
    pub description: Option<String>,
    pub risk_level: Option<String>,
    pub desired_window: Option<String>,
    pub engagement_type: Option<String>,
    pub status: String,
    pub linked_engagement_id: Option<i32>,
    pub created_by_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// New intake request for insertion.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = intake_requests)]
pub struct NewIntakeRequest {
    pub title: String,
    pub requester_name: Option<String>,
    pub requester_email: Option<String>,
    pub business_unit: Option<String>,
    pub system_name: Option<String>,
    pub description: Option<String>,
    pub risk_level: Option<String>,
    pub desired_window: Option<String>,
    pub engagement_type: Option<String>,
    pub status: String,
    pub created_by_id: Option<i32>,
}

/// Intake creation request.
#[derive(Debug, Clone, Deserialize, validator::Validate)]
pub struct CreateIntakeRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 100))]
    pub requester_name: Option<String>,
    #[validate(email)]
    pub requester_email: Option<String>,
    pub business_unit: Option<String>,
    pub system_name: Option<String>,
    pub description: Option<String>,
    pub risk_level: Option<String>,
    pub desired_window: Option<String>,
    pub engagement_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intake_status_roundtrip() {
        for s in [
            IntakeStatus::New,
            IntakeStatus::Reviewed,
            IntakeStatus::Approved,
            IntakeStatus::Rejected,
            IntakeStatus::Converted,
        ] {
            assert_eq!(IntakeStatus::parse(s.as_str()), Some(s));
        }
    }

    #[test]
    fn test_intake_status_parse_invalid() {
        assert_eq!(IntakeStatus::parse("new"), None);
        assert_eq!(IntakeStatus::parse("Pending"), None);
    }

    #[test]
    fn test_create_intake_request_rejects_bad_email() {
        use validator::Validate;
        let request = CreateIntakeRequest {
            title: "PCI segmentation test".to_string(),
            requester_name: None,
            requester_email: Some("not-an-email".to_string()),
            business_unit: None,
            system_name: None,
            description: None,
            risk_level: None,
            desired_window: None,
            engagement_type: None,
        };
        assert!(request.validate().is_err());
    }
}
