/// Offsec Program - Report assembly.
///
/// Everything a report needs is loaded once into an `EngagementAggregate`;
/// the assembler and both exports (`csv`, `markdown`) are pure functions of
/// that aggregate, so the three representations of one engagement can never
/// disagree on finding counts or field values.
pub mod csv;
pub mod markdown;

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Serialize;

use crate::db::DbConnection;
use crate::error::{AppError, AppResult};
use crate::models::asset::{Asset, EngagementAsset, FindingAsset};
use crate::models::engagement::Engagement;
use crate::models::finding::{Finding, SEVERITY_ORDER};
use crate::models::program_year::ProgramYear;
use crate::schema::{assets, engagement_assets, engagements, finding_assets, findings, program_years};

/// Fully loaded engagement with everything report generation needs.
///
/// `scope_assets` preserves association-row order; `findings` preserves
/// finding id order (load order), each paired with its affected assets in
/// finding-association load order.
#[derive(Debug, Clone)]
pub struct EngagementAggregate {
    pub engagement: Engagement,
    pub year: Option<i32>,
    pub scope_assets: Vec<Asset>,
    pub findings: Vec<(Finding, Vec<Asset>)>,
}

/// Load the engagement aggregate, or fail with not-found.
pub async fn load_aggregate(
    conn: &mut DbConnection,
    engagement_id: i32,
) -> AppResult<EngagementAggregate> {
    let engagement: Engagement = engagements::table
        .find(engagement_id)
        .first(conn)
        .await
        .map_err(|e| AppError::from_diesel(e, "Engagement"))?;

    let year = match engagement.program_year_id {
        Some(py_id) => program_years::table
            .find(py_id)
            .first::<ProgramYear>(conn)
            .await
            .optional()?
            .map(|py| py.year),
        None => None,
    };

    let scope_assets: Vec<Asset> = engagement_assets::table
        .inner_join(assets::table)
        .filter(engagement_assets::engagement_id.eq(engagement_id))
        .order(engagement_assets::id.asc())
        .load::<(EngagementAsset, Asset)>(conn)
        .await?
        .into_iter()
        .map(|(_, asset)| asset)
        .collect();

    let finding_rows: Vec<Finding> = findings::table
        .filter(findings::engagement_id.eq(engagement_id))
        .order(findings::id.asc())
        .load(conn)
        .await?;

    let finding_ids: Vec<i32> = finding_rows.iter().map(|f| f.id).collect();
    let links: Vec<(FindingAsset, Asset)> = finding_assets::table
        .inner_join(assets::table)
        .filter(finding_assets::finding_id.eq_any(&finding_ids))
        .order(finding_assets::id.asc())
        .load(conn)
        .await?;

    let mut assets_by_finding: HashMap<i32, Vec<Asset>> = HashMap::new();
    for (link, asset) in links {
        assets_by_finding
            .entry(link.finding_id)
            .or_default()
            .push(asset);
    }

    let findings = finding_rows
        .into_iter()
        .map(|f| {
            let affected = assets_by_finding.remove(&f.id).unwrap_or_default();
            (f, affected)
        })
        .collect();

    Ok(EngagementAggregate {
        engagement,
        year,
        scope_assets,
        findings,
    })
}

/// Asset fields exposed in report documents.
#[derive(Debug, Clone, Serialize)]
pub struct AssetSummary {
    pub id: i32,
    pub name: String,
    pub asset_type: String,
    pub identifier: Option<String>,
    pub environment: Option<String>,
    pub criticality: Option<String>,
}

impl From<&Asset> for AssetSummary {
    fn from(a: &Asset) -> Self {
        Self {
            id: a.id,
            name: a.name.clone(),
            asset_type: a.asset_type.clone(),
            identifier: a.identifier.clone(),
            environment: a.environment.clone(),
            criticality: a.criticality.clone(),
        }
    }
}

/// Report metadata block.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub id: i32,
    pub name: String,
    pub engagement_type: String,
    pub program_year: Option<i32>,
    pub business_unit: Option<String>,
    pub status: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub owner_id: Option<i32>,
}

/// Report scope block.
#[derive(Debug, Clone, Serialize)]
pub struct ReportScope {
    pub scope_summary: Option<String>,
    pub objectives: Option<String>,
    pub assets: Vec<AssetSummary>,
}

/// One finding with every descriptive field and its affected assets.
#[derive(Debug, Clone, Serialize)]
pub struct FindingReportItem {
    pub id: i32,
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
    pub assets: Vec<AssetSummary>,
}

/// The assembled report document.
#[derive(Debug, Clone, Serialize)]
pub struct EngagementReport {
    pub metadata: ReportMetadata,
    pub executive_summary: Option<String>,
    pub scope: ReportScope,
    pub methodology: Option<String>,
    /// Count of findings per severity label; zero counts are omitted.
    pub findings_summary: BTreeMap<String, usize>,
    pub findings: Vec<FindingReportItem>,
    pub recommendations_overall: Option<String>,
}

/// Assemble the report document from a loaded aggregate.
///
/// The severity histogram and the detail list derive from the same finding
/// collection, so the histogram total always equals the detail length.
pub fn assemble(agg: &EngagementAggregate) -> EngagementReport {
    let e = &agg.engagement;

    let metadata = ReportMetadata {
        id: e.id,
        name: e.name.clone(),
        engagement_type: e.engagement_type.clone(),
        program_year: agg.year,
        business_unit: e.business_unit.clone(),
        status: e.status.clone(),
        start_date: e.start_date,
        end_date: e.end_date,
        owner_id: e.owner_id,
    };

    let scope = ReportScope {
        scope_summary: e.scope_summary.clone(),
        objectives: e.objectives.clone(),
        assets: agg.scope_assets.iter().map(AssetSummary::from).collect(),
    };

    let mut findings_summary: BTreeMap<String, usize> = BTreeMap::new();
    for (finding, _) in &agg.findings {
        *findings_summary.entry(finding.severity.clone()).or_insert(0) += 1;
    }

    let findings = agg
        .findings
        .iter()
        .map(|(f, affected)| FindingReportItem {
            id: f.id,
            title: f.title.clone(),
            severity: f.severity.clone(),
            status: f.status.clone(),
            description: f.description.clone(),
            impact: f.impact.clone(),
            poc: f.poc.clone(),
            recommendation: f.recommendation.clone(),
            attack_techniques: f.attack_techniques.clone(),
            remediation_status: f.remediation_status.clone(),
            remediation_owner: f.remediation_owner.clone(),
            due_date: f.due_date,
            detection_status: f.detection_status.clone(),
            detection_notes: f.detection_notes.clone(),
            risk_accepted: f.risk_accepted,
            risk_accepted_notes: f.risk_accepted_notes.clone(),
            assets: affected.iter().map(AssetSummary::from).collect(),
        })
        .collect();

    EngagementReport {
        metadata,
        executive_summary: e.exec_summary.clone(),
        scope,
        methodology: e.methodology.clone(),
        findings_summary,
        findings,
        recommendations_overall: e.recommendations_overall.clone(),
    }
}

/// Severity histogram rows in canonical display order (Critical, High,
/// Medium, Low, Info), zero rows dropped. Labels outside the canonical set
/// are overflow buckets and come last, alphabetically.
pub fn ordered_severity_rows(summary: &BTreeMap<String, usize>) -> Vec<(String, usize)> {
    let mut rows = Vec::new();
    for severity in SEVERITY_ORDER {
        if let Some(&count) = summary.get(severity.as_str()) {
            if count > 0 {
                rows.push((severity.as_str().to_string(), count));
            }
        }
    }
    for (label, &count) in summary {
        if SEVERITY_ORDER.iter().all(|s| s.as_str() != label) && count > 0 {
            rows.push((label.clone(), count));
        }
    }
    rows
}


#[cfg(test)]
mod tests {
    use super::test_fixtures::*;
    use super::*;

    // ==================== Assembler Tests ====================

    #[test]
    fn test_histogram_total_equals_detail_length() {
        let report = assemble(&pci_scenario());
        let total: usize = report.findings_summary.values().sum();
        assert_eq!(total, report.findings.len());
        assert_eq!(total, 2);
    }

    #[test]
    fn test_scenario_findings_summary() {
        let report = assemble(&pci_scenario());
        assert_eq!(report.findings_summary.get("Critical"), Some(&1));
        assert_eq!(report.findings_summary.get("High"), Some(&1));
        assert_eq!(report.findings_summary.len(), 2);
    }

    #[test]
    fn test_zero_count_severities_omitted() {
        let report = assemble(&pci_scenario());
        assert!(!report.findings_summary.contains_key("Info"));
        assert!(!report.findings_summary.contains_key("Medium"));
        assert!(!report.findings_summary.contains_key("Low"));
    }

    #[test]
    fn test_metadata_block() {
        let report = assemble(&pci_scenario());
        assert_eq!(report.metadata.id, 7);
        assert_eq!(report.metadata.name, "Q2 2025 PCI Network Test");
        assert_eq!(report.metadata.engagement_type, "PCI");
        assert_eq!(report.metadata.program_year, Some(2025));
        assert_eq!(report.metadata.owner_id, Some(1));
    }

    #[test]
    fn test_scope_block_one_entry_per_association() {
        let report = assemble(&pci_scenario());
        assert_eq!(report.scope.assets.len(), 2);
        assert_eq!(report.scope.assets[0].name, "core-switch-01");
        assert_eq!(report.scope.assets[1].name, "cde-app-01");
    }

    #[test]
    fn test_finding_detail_carries_affected_assets() {
        let report = assemble(&pci_scenario());
        assert_eq!(report.findings[0].assets.len(), 1);
        assert_eq!(report.findings[0].assets[0].name, "core-switch-01");
        assert_eq!(report.findings[1].assets[0].name, "cde-app-01");
    }

    #[test]
    fn test_findings_preserve_load_order() {
        // High was loaded before Critical; detail order is load order,
        // not severity order.
        let report = assemble(&pci_scenario());
        assert_eq!(report.findings[0].severity, "High");
        assert_eq!(report.findings[1].severity, "Critical");
    }

    #[test]
    fn test_empty_engagement_report() {
        let report = assemble(&empty_aggregate());
        assert!(report.findings_summary.is_empty());
        assert!(report.findings.is_empty());
        assert!(report.scope.assets.is_empty());
        assert_eq!(report.metadata.program_year, None);
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = assemble(&pci_scenario());
        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["metadata"]["name"], "Q2 2025 PCI Network Test");
        assert_eq!(json["findings_summary"]["Critical"], 1);
    }

    // ==================== ordered_severity_rows Tests ====================

    #[test]
    fn test_ordered_severity_rows_canonical_order() {
        let mut summary = BTreeMap::new();
        summary.insert("High".to_string(), 1);
        summary.insert("Critical".to_string(), 1);
        let rows = ordered_severity_rows(&summary);
        assert_eq!(rows[0].0, "Critical");
        assert_eq!(rows[1].0, "High");
    }

    #[test]
    fn test_ordered_severity_rows_drops_zero() {
        let mut summary = BTreeMap::new();
        summary.insert("Low".to_string(), 0);
        summary.insert("Info".to_string(), 3);
        let rows = ordered_severity_rows(&summary);
        assert_eq!(rows, vec![("Info".to_string(), 3)]);
    }

    #[test]
    fn test_ordered_severity_rows_overflow_bucket_last() {
        let mut summary = BTreeMap::new();
        summary.insert("Catastrophic".to_string(), 2);
        summary.insert("Critical".to_string(), 1);
        let rows = ordered_severity_rows(&summary);
        assert_eq!(rows[0].0, "Critical");
        assert_eq!(rows[1].0, "Catastrophic");
    }

    #[test]
    fn test_ordered_severity_rows_empty() {
        let rows = ordered_severity_rows(&BTreeMap::new());
        assert!(rows.is_empty());
    }
}
