/// Offsec Program - Finding and finding template models.
///
/// A finding is one discovered issue within an engagement. It may be seeded
/// from a reusable template; the template's text is copied at creation time,
/// so deleting a template never touches existing findings.
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{finding_templates, findings};

/// Finding severity. The canonical display order for any severity-ordered
/// rendering is Critical, High, Medium, Low, Info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

/// Canonical severity display order, most severe first.
pub const SEVERITY_ORDER: [Severity; 5] = [
    Severity::Critical,
    Severity::High,
    Severity::Medium,
    Severity::Low,
    Severity::Info,
];

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }

    /// Strict parse; unknown values are rejected at the boundary.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Info" => Some(Self::Info),
            "Low" => Some(Self::Low),
            "Medium" => Some(Self::Medium),
            "High" => Some(Self::High),
            "Critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// Finding lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FindingStatus {
    New,
    Validated,
    Exploited,
    Mitigated,
    FalsePositive,
}

impl FindingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Validated => "Validated",
            Self::Exploited => "Exploited",
            Self::Mitigated => "Mitigated",
            Self::FalsePositive => "False-Positive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "New" => Some(Self::New),
            "Validated" => Some(Self::Validated),
            "Exploited" => Some(Self::Exploited),
            "Mitigated" => Some(Self::Mitigated),
            "False-Positive" => Some(Self::FalsePositive),
            _ => None,
        }
    }
}

/// Remediation tracking status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemediationStatus {
    NotStarted,
    InProgress,
    Completed,
    RiskAccepted,
}

impl RemediationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "Not-Started",
            Self::InProgress => "In-Progress",
            Self::Completed => "Completed",
            Self::RiskAccepted => "Risk-Accepted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Not-Started" => Some(Self::NotStarted),
            "In-Progress" => Some(Self::InProgress),
            "Completed" => Some(Self::Completed),
            "Risk-Accepted" => Some(Self::RiskAccepted),
            _ => None,
        }
    }
}

/// Finding database model.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = findings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Finding {
    pub id: i32,
    pub engagement_id: i32,
    pub template_id: Option<i32>,
    pub title: String,
    pub severity: String,
    pub status: String,
    pub description: Option<String>,
    pub impact: Option<String>,
    pub poc: Option<String>,
    pub recommendation: Option<String>,
    pub attack_techniques: Option<String>,
    pub remediation_status: String,
    pub remediation_owner: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub detection_status: Option<String>,
    pub detection_notes: Option<String>,
    pub risk_accepted: bool,
    pub risk_accepted_notes: Option<String>,
    pub created_by_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New finding for insertion.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = findings)]
pub struct NewFinding {
    pub engagement_id: i32,
    pub template_id: Option<i32>,
    pub title: String,
    pub severity: String,
    pub status: String,
    pub description: Option<String>,
    pub impact: Option<String>,
    pub poc: Option<String>,
    pub recommendation: Option<String>,
    pub attack_techniques: Option<String>,
    pub remediation_status: String,
    pub remediation_owner: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub created_by_id: Option<i32>,
}

/// Finding creation request. When `template_id` is set, the template's
/// default severity and canonical text fill any field left empty here.
#[derive(Debug, Clone, Deserialize, validator::Validate)]
pub struct CreateFindingRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub severity: Option<String>,
    pub template_id: Option<i32>,
    pub description: Option<String>,
    pub impact: Option<String>,
    pub poc: Option<String>,
    pub recommendation: Option<String>,
    pub attack_techniques: Option<String>,
    pub remediation_status: Option<String>,
    pub remediation_owner: Option<String>,
    pub due_date: Option<NaiveDate>,
}

/// Finding list-view response.
#[derive(Debug, Clone, Serialize)]
pub struct FindingSummary {
    pub id: i32,
    pub title: String,
    pub severity: String,
    pub status: String,
    pub remediation_status: String,
    pub due_date: Option<NaiveDate>,
}

impl From<&Finding> for FindingSummary {
    fn from(f: &Finding) -> Self {
        Self {
            id: f.id,
            title: f.title.clone(),
            severity: f.severity.clone(),
            status: f.status.clone(),
            remediation_status: f.remediation_status.clone(),
            due_date: f.due_date,
        }
    }
}

/// Finding template database model.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = finding_templates)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FindingTemplate {
    pub id: i32,
    pub title: String,
    pub category: Option<String>,
    pub severity_default: Option<String>,
    pub description: Option<String>,
    pub impact: Option<String>,
    pub recommendation: Option<String>,
    pub cwe_id: Option<String>,
    pub attack_techniques: Option<String>,
    pub external_references: Option<String>,
    pub created_by_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// New finding template for insertion.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = finding_templates)]
pub struct NewFindingTemplate {
    pub title: String,
    pub category: Option<String>,
    pub severity_default: Option<String>,
    pub description: Option<String>,
    pub impact: Option<String>,
    pub recommendation: Option<String>,
    pub cwe_id: Option<String>,
    pub attack_techniques: Option<String>,
    pub external_references: Option<String>,
    pub created_by_id: Option<i32>,
}

/// Finding template creation request.
#[derive(Debug, Clone, Deserialize, validator::Validate)]
pub struct CreateFindingTemplateRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub category: Option<String>,
    pub severity_default: Option<String>,
    pub description: Option<String>,
    pub impact: Option<String>,
    pub recommendation: Option<String>,
    pub cwe_id: Option<String>,
    pub attack_techniques: Option<String>,
    pub external_references: Option<String>,
}

/// Finding template partial-update request. Absent fields keep their
/// values; an explicit null clears a nullable field.
#[derive(Debug, Clone, Deserialize, validator::Validate)]
pub struct UpdateFindingTemplateRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub severity_default: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub impact: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub recommendation: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub cwe_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub attack_techniques: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub external_references: Option<Option<String>>,
}
