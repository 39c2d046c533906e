/// Offsec Program - Markdown report export.
///
/// Narrative document built line by line. Optional sections are emitted only
/// when their source text or list is non-empty; an absent section leaves no
/// heading behind.
use crate::report::{ordered_severity_rows, EngagementAggregate, EngagementReport};

fn non_empty(text: &Option<String>) -> Option<&str> {
    text.as_deref().filter(|t| !t.trim().is_empty())
}

/// Render the engagement report as a Markdown document.
pub fn render(agg: &EngagementAggregate) -> String {
    let report: EngagementReport = super::assemble(agg);
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("# {}", report.metadata.name));
    lines.push(String::new());
    lines.push("## Engagement Metadata".to_string());
    lines.push(String::new());
    lines.push(format!("- **Type**: {}", report.metadata.engagement_type));
    lines.push(format!("- **Status**: {}", report.metadata.status));
    lines.push(format!(
        "- **Business Unit**: {}",
        report.metadata.business_unit.as_deref().unwrap_or("N/A")
    ));
    lines.push(format!(
        "- **Program Year**: {}",
        report
            .metadata
            .program_year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "N/A".to_string())
    ));
    if let Some(start) = report.metadata.start_date {
        lines.push(format!("- **Start Date**: {}", start));
    }
    if let Some(end) = report.metadata.end_date {
        lines.push(format!("- **End Date**: {}", end));
    }
    lines.push(String::new());

    if let Some(summary) = non_empty(&report.executive_summary) {
        lines.push("## Executive Summary".to_string());
        lines.push(String::new());
        lines.push(summary.to_string());
        lines.push(String::new());
    }

    if let Some(scope) = non_empty(&report.scope.scope_summary) {
        lines.push("## Scope".to_string());
        lines.push(String::new());
        lines.push(scope.to_string());
        lines.push(String::new());
    }

    if !report.scope.assets.is_empty() {
        lines.push("### In-Scope Assets".to_string());
        lines.push(String::new());
        for asset in &report.scope.assets {
            lines.push(format!(
                "- **{}** ({}): {}",
                asset.name,
                asset.asset_type,
                asset.identifier.as_deref().unwrap_or("N/A")
            ));
        }
        lines.push(String::new());
    }

    if let Some(objectives) = non_empty(&report.scope.objectives) {
        lines.push("## Objectives".to_string());
        lines.push(String::new());
        lines.push(objectives.to_string());
        lines.push(String::new());
    }

    if let Some(methodology) = non_empty(&report.methodology) {
        lines.push("## Methodology".to_string());
        lines.push(String::new());
        lines.push(methodology.to_string());
        lines.push(String::new());
    }

    lines.push("## Findings Summary".to_string());
    lines.push(String::new());
    let rows = ordered_severity_rows(&report.findings_summary);
    if rows.is_empty() {
        lines.push("No findings recorded.".to_string());
    } else {
        lines.push("| Severity | Count |".to_string());
        lines.push("|----------|-------|".to_string());
        for (severity, count) in rows {
            lines.push(format!("| {} | {} |", severity, count));
        }
    }
    lines.push(String::new());

    if !report.findings.is_empty() {
        lines.push("## Detailed Findings".to_string());
        lines.push(String::new());

        for (i, finding) in report.findings.iter().enumerate() {
            lines.push(format!("### {}. {}", i + 1, finding.title));
            lines.push(String::new());
            lines.push(format!("- **Severity**: {}", finding.severity));
            lines.push(format!("- **Status**: {}", finding.status));
            lines.push(format!(
                "- **Remediation Status**: {}",
                finding.remediation_status
            ));
            if let Some(owner) = non_empty(&finding.remediation_owner) {
                lines.push(format!("- **Remediation Owner**: {}", owner));
            }
            if let Some(due) = finding.due_date {
                lines.push(format!("- **Due Date**: {}", due));
            }
            lines.push(String::new());

            if !finding.assets.is_empty() {
                lines.push("**Affected Assets:**".to_string());
                for asset in &finding.assets {
                    lines.push(format!(
                        "- {} ({})",
                        asset.name,
                        asset.identifier.as_deref().unwrap_or("N/A")
                    ));
                }
                lines.push(String::new());
            }

            if let Some(description) = non_empty(&finding.description) {
                lines.push("**Description:**".to_string());
                lines.push(String::new());
                lines.push(description.to_string());
                lines.push(String::new());
            }

            if let Some(impact) = non_empty(&finding.impact) {
                lines.push("**Impact:**".to_string());
                lines.push(String::new());
                lines.push(impact.to_string());
                lines.push(String::new());
            }

            if let Some(poc) = non_empty(&finding.poc) {
                lines.push("**Proof of Concept:**".to_string());
                lines.push(String::new());
                lines.push(poc.to_string());
                lines.push(String::new());
            }

            if let Some(recommendation) = non_empty(&finding.recommendation) {
                lines.push("**Recommendation:**".to_string());
                lines.push(String::new());
                lines.push(recommendation.to_string());
                lines.push(String::new());
            }

            if let Some(techniques) = non_empty(&finding.attack_techniques) {
                lines.push(format!("**ATT&CK Techniques:** {}", techniques));
                lines.push(String::new());
            }
        }
    }

    if let Some(recommendations) = non_empty(&report.recommendations_overall) {
        lines.push("## Overall Recommendations".to_string());
        lines.push(String::new());
        lines.push(recommendations.to_string());
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Attachment filename for the Markdown export of one engagement.
pub fn filename(engagement_id: i32) -> String {
    format!("engagement_{}_report.md", engagement_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::test_fixtures::*;

    #[test]
    fn test_title_and_metadata() {
        let body = render(&pci_scenario());
        assert!(body.starts_with("# Q2 2025 PCI Network Test\n"));
        assert!(body.contains("- **Type**: PCI"));
        assert!(body.contains("- **Status**: Reporting"));
        assert!(body.contains("- **Business Unit**: Payments"));
        assert!(body.contains("- **Program Year**: 2025"));
        assert!(body.contains("- **Start Date**: 2025-04-01"));
        assert!(body.contains("- **End Date**: 2025-04-18"));
    }

    #[test]
    fn test_missing_metadata_renders_na_or_omitted() {
        let body = render(&empty_aggregate());
        assert!(body.contains("- **Business Unit**: N/A"));
        assert!(body.contains("- **Program Year**: N/A"));
        assert!(!body.contains("Start Date"));
        assert!(!body.contains("End Date"));
    }

    #[test]
    fn test_summary_table_canonical_order() {
        let body = render(&pci_scenario());
        let critical = body.find("| Critical | 1 |").expect("critical row");
        let high = body.find("| High | 1 |").expect("high row");
        assert!(critical < high);
        assert!(!body.contains("| Medium |"));
    }

    #[test]
    fn test_empty_engagement_reports_no_findings() {
        let body = render(&empty_aggregate());
        assert!(body.contains("No findings recorded."));
        assert!(!body.contains("| Severity | Count |"));
        assert!(!body.contains("## Detailed Findings"));
    }

    #[test]
    fn test_optional_sections_omitted_entirely() {
        let body = render(&empty_aggregate());
        assert!(!body.contains("## Executive Summary"));
        assert!(!body.contains("## Scope"));
        assert!(!body.contains("### In-Scope Assets"));
        assert!(!body.contains("## Objectives"));
        assert!(!body.contains("## Methodology"));
        assert!(!body.contains("## Overall Recommendations"));
    }

    #[test]
    fn test_blank_text_does_not_emit_heading() {
        let mut agg = empty_aggregate();
        agg.engagement.exec_summary = Some("   ".to_string());
        let body = render(&agg);
        assert!(!body.contains("## Executive Summary"));
    }

    #[test]
    fn test_findings_numbered_from_one_in_load_order() {
        let body = render(&pci_scenario());
        let first = body
            .find("### 1. Flat network segmentation")
            .expect("first finding");
        let second = body
            .find("### 2. Default credentials on switch")
            .expect("second finding");
        assert!(first < second);
    }

    #[test]
    fn test_finding_detail_sections() {
        let body = render(&pci_scenario());
        assert!(body.contains("- **Severity**: High"));
        assert!(body.contains("- **Remediation Status**: Not-Started"));
        assert!(body.contains("**Affected Assets:**"));
        assert!(body.contains("- core-switch-01 (10.0.0.1)"));
        assert!(body.contains("**Description:**"));
        assert!(body.contains("**Impact:**"));
        assert!(body.contains("**Recommendation:**"));
        assert!(body.contains("**ATT&CK Techniques:** T1021"));
        // No proof of concept was supplied.
        assert!(!body.contains("**Proof of Concept:**"));
    }

    #[test]
    fn test_in_scope_assets_listed_under_scope() {
        let body = render(&pci_scenario());
        assert!(body.contains("### In-Scope Assets"));
        assert!(body.contains("- **core-switch-01** (Host): 10.0.0.1"));
    }

    #[test]
    fn test_overall_recommendations_section() {
        let body = render(&pci_scenario());
        assert!(body.contains("## Overall Recommendations\n\nPatch and re-test."));
    }

    #[test]
    fn test_unknown_severity_row_appended_after_canonical() {
        let mut agg = pci_scenario();
        agg.findings[0].0.severity = "Catastrophic".to_string();
        let body = render(&agg);
        let critical = body.find("| Critical | 1 |").expect("critical row");
        let other = body.find("| Catastrophic | 1 |").expect("overflow row");
        assert!(critical < other);
    }

    #[test]
    fn test_filename() {
        assert_eq!(filename(7), "engagement_7_report.md");
    }
}
