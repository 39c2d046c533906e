/// Offsec Program - Asset model.
///
/// Assets are reusable test targets (hosts, IP ranges, applications,
/// domains, cloud accounts, OT devices). They are created independently and
/// outlive any single engagement.
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{assets, engagement_assets, finding_assets};

/// Asset criticality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Criticality {
    Low,
    Medium,
    High,
}

impl Criticality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Low" => Some(Self::Low),
            "Medium" => Some(Self::Medium),
            "High" => Some(Self::High),
            _ => None,
        }
    }
}

/// Asset database model.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = assets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Asset {
    pub id: i32,
    pub name: String,
    pub asset_type: String,
    pub identifier: Option<String>,
    pub environment: Option<String>,
    pub business_unit: Option<String>,
    pub criticality: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Asset {
    /// "name (identifier or N/A)" label used by the exports.
    pub fn display_label(&self) -> String {
        format!(
            "{} ({})",
            self.name,
            self.identifier.as_deref().unwrap_or("N/A")
        )
    }
}

/// New asset for insertion.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = assets)]
pub struct NewAsset {
    pub name: String,
    pub asset_type: String,
    pub identifier: Option<String>,
    pub environment: Option<String>,
    pub business_unit: Option<String>,
    pub criticality: Option<String>,
    pub notes: Option<String>,
}

/// Asset creation request.
#[derive(Debug, Clone, Deserialize, validator::Validate)]
pub struct CreateAssetRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub asset_type: String,
    #[validate(length(max = 255))]
    pub identifier: Option<String>,
    pub environment: Option<String>,
    pub business_unit: Option<String>,
    pub criticality: Option<String>,
    pub notes: Option<String>,
}

/// Association row linking an engagement to an in-scope asset.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = engagement_assets)]
pub struct EngagementAsset {
    pub id: i32,
    pub engagement_id: i32,
    pub asset_id: i32,
    pub role: Option<String>,
    pub notes: Option<String>,
}

/// New engagement-asset association for insertion.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = engagement_assets)]
pub struct NewEngagementAsset {
    pub engagement_id: i32,
    pub asset_id: i32,
    pub role: Option<String>,
    pub notes: Option<String>,
}

/// Request to put an asset in scope for an engagement.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkEngagementAssetRequest {
    pub asset_id: i32,
    /// Primary or Supporting.
    pub role: Option<String>,
    pub notes: Option<String>,
}

/// Association row linking a finding to an affected asset.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = finding_assets)]
pub struct FindingAsset {
    pub id: i32,
    pub finding_id: i32,
    pub asset_id: i32,
}

/// New finding-asset association for insertion.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = finding_assets)]
pub struct NewFindingAsset {
    pub finding_id: i32,
    pub asset_id: i32,
}

/// Request to mark an asset as affected by a finding.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkFindingAssetRequest {
    pub asset_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_asset(identifier: Option<&str>) -> Asset {
        Asset {
            id: 1,
            name: "core-fw-01".to_string(),
            asset_type: "Host".to_string(),
            identifier: identifier.map(String::from),
            environment: Some("Prod".to_string()),
            business_unit: Some("Payments".to_string()),
            criticality: Some("High".to_string()),
            notes: None,
            created_at: Utc::now(),
        }
    }

    // ==================== Criticality Tests ====================

    #[test]
    fn test_criticality_parse_valid() {
        assert_eq!(Criticality::parse("Low"), Some(Criticality::Low));
        assert_eq!(Criticality::parse("Medium"), Some(Criticality::Medium));
        assert_eq!(Criticality::parse("High"), Some(Criticality::High));
    }

    #[test]
    fn test_criticality_parse_invalid() {
        assert_eq!(Criticality::parse("high"), None);
        assert_eq!(Criticality::parse("Critical"), None);
    }

    #[test]
    fn test_criticality_roundtrip() {
        for c in [Criticality::Low, Criticality::Medium, Criticality::High] {
            assert_eq!(Criticality::parse(c.as_str()), Some(c));
        }
    }

    // ==================== display_label Tests ====================

    #[test]
    fn test_display_label_with_identifier() {
        let asset = test_asset(Some("10.0.1.1"));
        assert_eq!(asset.display_label(), "core-fw-01 (10.0.1.1)");
    }

    #[test]
    fn test_display_label_without_identifier() {
        let asset = test_asset(None);
        assert_eq!(asset.display_label(), "core-fw-01 (N/A)");
    }

    // ==================== Validation Tests ====================

    #[test]
    fn test_create_asset_request_valid() {
        use validator::Validate;
        let request = CreateAssetRequest {
            name: "app-portal".to_string(),
            asset_type: "App".to_string(),
            identifier: Some("portal.internal".to_string()),
            environment: None,
            business_unit: None,
            criticality: None,
            notes: None,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_asset_request_empty_name() {
        use validator::Validate;
        let request = CreateAssetRequest {
            name: "".to_string(),
            asset_type: "App".to_string(),
            identifier: None,
            environment: None,
            business_unit: None,
            criticality: None,
            notes: None,
        };
        assert!(request.validate().is_err());
    }
}
