//! Triage report generation
//!
//! A report is a Markdown document with five fixed sections, each written by
//! one completion call seeded with the relevant slice of the evidence
//! snapshot. A failing completion degrades that section to an explicit
//! placeholder; the document is always produced with all headings.

pub mod llm;

pub use llm::{FailingLlmClient, HttpLlmClient, LlmClient, StaticLlmClient};

use crate::core::error::{Result, TriageError};
use crate::core::evidence::{CollectorOutcome, EvidenceSnapshot};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// The fixed report sections, in document order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    CaseMetadata,
    FileSystemAnalysis,
    CommunicationsAnalysis,
    UsageStatsAnalysis,
    Conclusion,
}

impl Section {
    /// All sections in document order
    pub const ALL: &'static [Section] = &[
        Section::CaseMetadata,
        Section::FileSystemAnalysis,
        Section::CommunicationsAnalysis,
        Section::UsageStatsAnalysis,
        Section::Conclusion,
    ];

    /// Heading text for this section
    pub fn heading(&self) -> &'static str {
        match self {
            Section::CaseMetadata => "Case Metadata",
            Section::FileSystemAnalysis => "File System Analysis",
            Section::CommunicationsAnalysis => "Communications Analysis",
            Section::UsageStatsAnalysis => "Usage Stats Analysis",
            Section::Conclusion => "Conclusion",
        }
    }

    /// Build the completion prompt for this section from its snapshot slice
    fn prompt(&self, snapshot: &EvidenceSnapshot) -> String {
        let slice = match self {
            Section::CaseMetadata => serde_json::to_string_pretty(&snapshot.device_info),
            Section::FileSystemAnalysis => serde_json::to_string_pretty(&snapshot.files),
            Section::CommunicationsAnalysis => serde_json::to_string_pretty(&serde_json::json!({
                "calls": &snapshot.calls,
                "sms": &snapshot.sms,
            })),
            Section::UsageStatsAnalysis => serde_json::to_string_pretty(&snapshot.usage_stats),
            Section::Conclusion => serde_json::to_string_pretty(&serde_json::json!({
                "case_id": snapshot.case_id(),
                "collected": {
                    "files": matches!(snapshot.files, CollectorOutcome::Collected(_)),
                    "calls": matches!(snapshot.calls, CollectorOutcome::Collected(_)),
                    "sms": matches!(snapshot.sms, CollectorOutcome::Collected(_)),
                    "usage_stats": matches!(snapshot.usage_stats, CollectorOutcome::Collected(_)),
                },
            })),
        }
        .unwrap_or_else(|_| "{}".to_string());

        let instruction = match self {
            Section::CaseMetadata => {
                "Summarize the case metadata below (device identity and case id) in one paragraph."
            }
            Section::FileSystemAnalysis => {
                "Summarize the file inventory below: notable categories, counts, and locations."
            }
            Section::CommunicationsAnalysis => {
                "Summarize the call log and SMS data below: volumes, directions, notable contacts."
            }
            Section::UsageStatsAnalysis => {
                "Summarize the app usage events below: most active packages and activity windows."
            }
            Section::Conclusion => {
                "Write a short concluding paragraph for a triage report with the collection status below."
            }
        };

        format!("{}\n\n```json\n{}\n```", instruction, slice)
    }
}

/// Generate the report document for a snapshot.
///
/// Returns the path written: `<output_dir>/report_<case_id>.md`.
pub fn generate_report(
    snapshot: &EvidenceSnapshot,
    client: &dyn LlmClient,
    output_dir: &Path,
) -> Result<PathBuf> {
    let body = render_report(snapshot, client);

    fs::create_dir_all(output_dir)
        .map_err(|e| TriageError::Report(format!("Failed to create report directory: {}", e)))?;

    let path = output_dir.join(format!("report_{}.md", snapshot.case_id()));
    fs::write(&path, body)
        .map_err(|e| TriageError::Report(format!("Failed to write report: {}", e)))?;

    info!("Report written to {}", path.display());
    Ok(path)
}

/// Render the report body, degrading failed sections to placeholders
pub fn render_report(snapshot: &EvidenceSnapshot, client: &dyn LlmClient) -> String {
    let mut body = format!("# Forensic Triage Report\n\nCase: `{}`\n", snapshot.case_id());

    for section in Section::ALL {
        body.push_str(&format!("\n## {}\n\n", section.heading()));
        match client.complete(&section.prompt(snapshot)) {
            Ok(text) => {
                body.push_str(&text);
                body.push('\n');
            }
            Err(e) => {
                warn!("Section '{}' failed: {}", section.heading(), e);
                body.push_str(&format!("_Section unavailable: {}_\n", e));
            }
        }
    }

    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EvidenceConfig;
    use crate::core::staging::StagingArea;
    use crate::device::mock::MockDevice;

    fn snapshot() -> EvidenceSnapshot {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(dir.path().join("stage"));
        let device = MockDevice::new("RPT01");
        EvidenceSnapshot::collect(
            &device,
            &staging,
            &EvidenceConfig {
                file_summary_cap: 10,
                summary_dirs: vec!["/sdcard/DCIM".to_string()],
            },
        )
    }

    #[test]
    fn test_report_contains_all_headings() {
        let snapshot = snapshot();
        let body = render_report(&snapshot, &StaticLlmClient::new("analysis text"));

        for section in Section::ALL {
            assert!(
                body.contains(&format!("## {}", section.heading())),
                "missing heading {}",
                section.heading()
            );
        }
        assert!(body.contains("analysis text"));
    }

    #[test]
    fn test_failed_sections_degrade_to_placeholders() {
        let snapshot = snapshot();
        let body = render_report(&snapshot, &FailingLlmClient);

        for section in Section::ALL {
            assert!(body.contains(&format!("## {}", section.heading())));
        }
        assert_eq!(body.matches("_Section unavailable:").count(), Section::ALL.len());
    }

    #[test]
    fn test_report_path_derives_from_case_id() {
        let snapshot = snapshot();
        let dir = tempfile::tempdir().unwrap();

        let path = generate_report(&snapshot, &StaticLlmClient::new("x"), dir.path()).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with(&format!("report_{}", snapshot.case_id())));
        assert!(name.ends_with(".md"));
        assert!(path.exists());
    }
}
