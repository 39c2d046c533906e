/// Offsec Program - Engagement model.
///
/// An engagement is one penetration-test cycle. It belongs to a program year
/// and an owner, and owns findings, asset associations, timeline events and
/// comments (all removed with it on delete).
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::engagements;

/// Engagement type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngagementType {
    Infra,
    WebApp,
    Pci,
    Ot,
    External,
    Purple,
}

impl EngagementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Infra => "Infra",
            Self::WebApp => "WebApp",
            Self::Pci => "PCI",
            Self::Ot => "OT",
            Self::External => "External",
            Self::Purple => "Purple",
        }
    }

    /// Strict parse; unknown values are rejected at the boundary.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Infra" => Some(Self::Infra),
            "WebApp" => Some(Self::WebApp),
            "PCI" => Some(Self::Pci),
            "OT" => Some(Self::Ot),
            "External" => Some(Self::External),
            "Purple" => Some(Self::Purple),
            _ => None,
        }
    }
}

/// Engagement lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngagementStatus {
    Planned,
    InProgress,
    Reporting,
    Completed,
    OnHold,
}

impl EngagementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planned => "Planned",
            Self::InProgress => "In-Progress",
            Self::Reporting => "Reporting",
            Self::Completed => "Completed",
            Self::OnHold => "On-Hold",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Planned" => Some(Self::Planned),
            "In-Progress" => Some(Self::InProgress),
            "Reporting" => Some(Self::Reporting),
            "Completed" => Some(Self::Completed),
            "On-Hold" => Some(Self::OnHold),
            _ => None,
        }
    }
}

/// Engagement database model.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = engagements)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Engagement {
    pub id: i32,
    pub name: String,
    pub program_year_id: Option<i32>,
    pub engagement_type: String,
    pub business_unit: Option<String>,
    pub owner_id: Option<i32>,
    pub status: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub scope_summary: Option<String>,
    pub objectives: Option<String>,
    pub methodology: Option<String>,
    pub exec_summary: Option<String>,
    pub recommendations_overall: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New engagement for insertion.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = engagements)]
pub struct NewEngagement {
    pub name: String,
    pub program_year_id: Option<i32>,
    pub engagement_type: String,
    pub business_unit: Option<String>,
    pub owner_id: Option<i32>,
    pub status: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub scope_summary: Option<String>,
    pub objectives: Option<String>,
    pub methodology: Option<String>,
}

/// Engagement creation request.
#[derive(Debug, Clone, Deserialize, validator::Validate)]
pub struct CreateEngagementRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Calendar year; the ProgramYear row is get-or-created.
    pub program_year: i32,
    pub engagement_type: String,
    pub business_unit: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub scope_summary: Option<String>,
    pub objectives: Option<String>,
    pub methodology: Option<String>,
}

/// Engagement partial-update request. Absent fields keep their values; an
/// explicit null clears a nullable field.
#[derive(Debug, Clone, Deserialize, validator::Validate)]
pub struct UpdateEngagementRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub engagement_type: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub business_unit: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub end_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub scope_summary: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub objectives: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub methodology: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub exec_summary: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub recommendations_overall: Option<Option<String>>,
}

/// Engagement list-view response with the resolved year.
#[derive(Debug, Clone, Serialize)]
pub struct EngagementSummary {
    pub id: i32,
    pub name: String,
    pub engagement_type: String,
    pub business_unit: Option<String>,
    pub status: String,
    pub year: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl EngagementSummary {
    pub fn from_engagement(e: &Engagement, year: Option<i32>) -> Self {
        Self {
            id: e.id,
            name: e.name.clone(),
            engagement_type: e.engagement_type.clone(),
            business_unit: e.business_unit.clone(),
            status: e.status.clone(),
            year,
            start_date: e.start_date,
            end_date: e.end_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== EngagementType Tests ====================

    #[test]
    fn test_engagement_type_parse_valid() {
        assert_eq!(EngagementType::parse("Infra"), Some(EngagementType::Infra));
        assert_eq!(EngagementType::parse("WebApp"), Some(EngagementType::WebApp));
        assert_eq!(EngagementType::parse("PCI"), Some(EngagementType::Pci));
        assert_eq!(EngagementType::parse("OT"), Some(EngagementType::Ot));
        assert_eq!(
            EngagementType::parse("External"),
            Some(EngagementType::External)
        );
        assert_eq!(EngagementType::parse("Purple"), Some(EngagementType::Purple));
    }

    #[test]
    fn test_engagement_type_parse_invalid() {
        assert_eq!(EngagementType::parse("pci"), None);
        assert_eq!(EngagementType::parse("Red"), None);
        assert_eq!(EngagementType::parse(""), None);
    }

    #[test]
    fn test_engagement_type_roundtrip() {
        for t in [
            EngagementType::Infra,
            EngagementType::WebApp,
            EngagementType::Pci,
            EngagementType::Ot,
            EngagementType::External,
            EngagementType::Purple,
        ] {
            assert_eq!(EngagementType::parse(t.as_str()), Some(t));
        }
    }

    // ==================== EngagementStatus Tests ====================

    #[test]
    fn test_engagement_status_parse_valid() {
        assert_eq!(
            EngagementStatus::parse("Planned"),
            Some(EngagementStatus::Planned)
        );
        assert_eq!(
            EngagementStatus::parse("In-Progress"),
            Some(EngagementStatus::InProgress)
        );
        assert_eq!(
            EngagementStatus::parse("On-Hold"),
            Some(EngagementStatus::OnHold)
        );
    }

    #[test]
    fn test_engagement_status_parse_invalid() {
        assert_eq!(EngagementStatus::parse("InProgress"), None);
        assert_eq!(EngagementStatus::parse("Done"), None);
    }

    #[test]
    fn test_engagement_status_roundtrip() {
        for s in [
            EngagementStatus::Planned,
            EngagementStatus::InProgress,
            EngagementStatus::Reporting,
            EngagementStatus::Completed,
            EngagementStatus::OnHold,
        ] {
            assert_eq!(EngagementStatus::parse(s.as_str()), Some(s));
        }
    }

    // ==================== UpdateEngagementRequest Tests ====================

    #[test]
    fn test_update_request_absent_field_stays_none() {
        let request: UpdateEngagementRequest =
            serde_json::from_str("{}").expect("deserialize");
        assert_eq!(request.end_date, None);
        assert_eq!(request.business_unit, None);
        assert_eq!(request.name, None);
    }

    #[test]
    fn test_update_request_explicit_null_clears() {
        let request: UpdateEngagementRequest =
            serde_json::from_str(r#"{"end_date": null, "business_unit": null}"#)
                .expect("deserialize");
        assert_eq!(request.end_date, Some(None));
        assert_eq!(request.business_unit, Some(None));
        assert_eq!(request.start_date, None);
    }

    #[test]
    fn test_update_request_value_is_double_wrapped() {
        let request: UpdateEngagementRequest =
            serde_json::from_str(r#"{"end_date": "2025-06-30", "business_unit": "Payments"}"#)
                .expect("deserialize");
        assert_eq!(request.end_date, Some(NaiveDate::from_ymd_opt(2025, 6, 30)));
        assert_eq!(request.business_unit, Some(Some("Payments".to_string())));
    }

    // ==================== EngagementSummary Tests ====================

    #[test]
    fn test_engagement_summary_carries_resolved_year() {
        let engagement = Engagement {
            id: 7,
            name: "Q2 2025 PCI Network Test".to_string(),
            program_year_id: Some(3),
            engagement_type: "PCI".to_string(),
            business_unit: Some("Payments".to_string()),
            owner_id: Some(1),
            status: "Planned".to_string(),
            start_date: None,
            end_date: None,
            scope_summary: None,
            objectives: None,
            methodology: None,
            exec_summary: None,
            recommendations_overall: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let summary = EngagementSummary::from_engagement(&engagement, Some(2025));
        assert_eq!(summary.year, Some(2025));
        assert_eq!(summary.id, 7);
        assert_eq!(summary.engagement_type, "PCI");
    }
}
