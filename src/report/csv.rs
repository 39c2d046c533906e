/// Offsec Program - CSV findings export.
///
/// One row per finding, fixed 14-column layout. An engagement with no
/// findings exports as the header row alone.
use anyhow::Context;

use crate::error::AppResult;
use crate::models::asset::Asset;
use crate::report::EngagementAggregate;

const HEADER: [&str; 14] = [
    "Finding ID",
    "Title",
    "Severity",
    "Status",
    "Description",
    "Impact",
    "Recommendation",
    "Remediation Status",
    "Remediation Owner",
    "Due Date",
    "Detection Status",
    "Risk Accepted",
    "Affected Assets",
    "ATT&CK Techniques",
];

fn assets_cell(affected: &[Asset]) -> String {
    if affected.is_empty() {
        return "N/A".to_string();
    }
    affected
        .iter()
        .map(|a| a.display_label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render the findings of an engagement as a CSV document.
pub fn render(agg: &EngagementAggregate) -> AppResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(HEADER)
        .context("writing CSV header")?;

    for (finding, affected) in &agg.findings {
        writer
            .write_record([
                finding.id.to_string(),
                finding.title.clone(),
                finding.severity.clone(),
                finding.status.clone(),
                finding.description.clone().unwrap_or_default(),
                finding.impact.clone().unwrap_or_default(),
                finding.recommendation.clone().unwrap_or_default(),
                finding.remediation_status.clone(),
                finding.remediation_owner.clone().unwrap_or_default(),
                finding
                    .due_date
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
                finding.detection_status.clone().unwrap_or_default(),
                if finding.risk_accepted { "Yes" } else { "No" }.to_string(),
                assets_cell(affected),
                finding.attack_techniques.clone().unwrap_or_default(),
            ])
            .context("writing CSV row")?;
    }

    let bytes = writer
        .into_inner()
        .map_err(csv::IntoInnerError::into_error)
        .context("flushing CSV writer")?;
    let body = String::from_utf8(bytes).context("CSV output is not UTF-8")?;
    Ok(body)
}

/// Attachment filename for the CSV export of one engagement.
pub fn filename(engagement_id: i32) -> String {
    format!("engagement_{}_findings.csv", engagement_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::test_fixtures::*;
    use chrono::NaiveDate;

    #[test]
    fn test_empty_engagement_exports_header_only() {
        let body = render(&empty_aggregate()).expect("render");
        let mut lines = body.lines();
        let header = lines.next().expect("header row");
        assert!(header.starts_with("Finding ID,Title,Severity"));
        assert!(header.ends_with("Affected Assets,ATT&CK Techniques"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_header_has_fourteen_columns() {
        let body = render(&empty_aggregate()).expect("render");
        let header = body.lines().next().expect("header row");
        assert_eq!(header.split(',').count(), 14);
    }

    #[test]
    fn test_one_row_per_finding() {
        let body = render(&pci_scenario()).expect("render");
        assert_eq!(body.lines().count(), 3);
    }

    #[test]
    fn test_affected_assets_cell_joins_labels() {
        let agg = pci_scenario();
        let body = render(&agg).expect("render");
        assert!(body.contains("core-switch-01 (10.0.0.1)"));
        assert!(body.contains("cde-app-01 (10.0.5.20)"));
    }

    #[test]
    fn test_no_assets_exports_na() {
        let mut agg = pci_scenario();
        agg.findings[0].1.clear();
        let body = render(&agg).expect("render");
        let row = body.lines().nth(1).expect("first finding row");
        assert!(row.contains("N/A"));
    }

    #[test]
    fn test_asset_without_identifier_labels_na() {
        let mut agg = pci_scenario();
        agg.findings[0].1 = vec![asset(3, "legacy-host", None)];
        let body = render(&agg).expect("render");
        assert!(body.contains("legacy-host (N/A)"));
    }

    #[test]
    fn test_multiple_assets_quoted_as_one_cell() {
        let mut agg = pci_scenario();
        agg.findings[0].1 = vec![
            asset(1, "core-switch-01", Some("10.0.0.1")),
            asset(2, "cde-app-01", Some("10.0.5.20")),
        ];
        let body = render(&agg).expect("render");
        // The joined cell contains a comma, so the csv writer must quote it.
        assert!(body.contains("\"core-switch-01 (10.0.0.1), cde-app-01 (10.0.5.20)\""));
    }

    #[test]
    fn test_risk_accepted_rendered_yes_no() {
        let mut agg = pci_scenario();
        agg.findings[1].0.risk_accepted = true;
        let body = render(&agg).expect("render");
        let first = body.lines().nth(1).expect("row");
        let second = body.lines().nth(2).expect("row");
        assert!(first.contains(",No,"));
        assert!(second.contains(",Yes,"));
    }

    #[test]
    fn test_absent_optionals_export_empty_strings() {
        let mut agg = pci_scenario();
        agg.findings[0].0.description = None;
        agg.findings[0].0.impact = None;
        agg.findings[0].0.recommendation = None;
        let body = render(&agg).expect("render");
        let row = body.lines().nth(1).expect("row");
        assert!(row.contains(",,,"));
    }

    #[test]
    fn test_due_date_iso_format() {
        let mut agg = pci_scenario();
        agg.findings[0].0.due_date = NaiveDate::from_ymd_opt(2025, 6, 30);
        let body = render(&agg).expect("render");
        assert!(body.contains("2025-06-30"));
    }

    #[test]
    fn test_filename() {
        assert_eq!(filename(7), "engagement_7_findings.csv");
    }
}
