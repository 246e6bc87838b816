//! Report rendering.
//!
//! Text output is the line-oriented report CI jobs grep; JSON output carries
//! the same information with structured errors.

use std::io::{self, Write};

use pbv_schema::{DirectoryReport, FileOutcome, FileStatus, ValidationError};
use serde::Serialize;

const RULE_WIDTH: usize = 50;

/// Write the human-readable report.
pub fn render_text(report: &DirectoryReport, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "\nValidation Results:")?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    for outcome in &report.outcomes {
        writeln!(out, "{}", outcome.message())?;
    }

    writeln!(out, "\nSummary:")?;
    writeln!(out, "Valid files: {}/{}", report.valid_count(), report.total())?;

    let invalid = report.invalid_files();
    if !invalid.is_empty() {
        writeln!(out, "\nInvalid files:")?;
        for name in invalid {
            writeln!(out, "- {name}")?;
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    directory: String,
    summary: JsonSummary,
    files: Vec<JsonFile<'a>>,
    skipped: &'a [String],
}

#[derive(Debug, Serialize)]
struct JsonSummary {
    valid: usize,
    total: usize,
    all_valid: bool,
}

#[derive(Debug, Serialize)]
struct JsonFile<'a> {
    name: &'a str,
    status: &'static str,
    via_fallback: bool,
    message: String,
    #[serde(skip_serializing_if = "no_errors")]
    errors: &'a [ValidationError],
    #[serde(skip_serializing_if = "no_errors")]
    warnings: &'a [ValidationError],
    /// Load or schema-resolution failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn no_errors(errors: &&[ValidationError]) -> bool {
    errors.is_empty()
}

impl<'a> From<&'a FileOutcome> for JsonFile<'a> {
    fn from(outcome: &'a FileOutcome) -> Self {
        let (errors, error) = match &outcome.status {
            FileStatus::Invalid(result) => (result.errors.as_slice(), None),
            FileStatus::LoadFailed(error) => (&[][..], Some(error.to_string())),
            FileStatus::ResolveFailed(error) => (&[][..], Some(error.to_string())),
            FileStatus::Valid | FileStatus::NoSchema | FileStatus::Excluded => (&[][..], None),
        };
        Self {
            name: &outcome.name,
            status: outcome.status.label(),
            via_fallback: outcome.via_fallback,
            message: outcome.message(),
            errors,
            warnings: &outcome.warnings,
            error,
        }
    }
}

/// Write the report as pretty-printed JSON.
pub fn render_json(report: &DirectoryReport, out: &mut dyn Write) -> serde_json::Result<()> {
    let view = JsonReport {
        directory: report.directory.display().to_string(),
        summary: JsonSummary {
            valid: report.valid_count(),
            total: report.total(),
            all_valid: report.all_valid(),
        },
        files: report.outcomes.iter().map(JsonFile::from).collect(),
        skipped: &report.skipped,
    };
    serde_json::to_writer_pretty(&mut *out, &view)?;
    writeln!(out).map_err(serde_json::Error::io)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn outcome(name: &str, status: FileStatus) -> FileOutcome {
        FileOutcome {
            name: name.into(),
            path: PathBuf::from(name),
            via_fallback: false,
            status,
            warnings: Vec::new(),
        }
    }

    fn report() -> DirectoryReport {
        DirectoryReport {
            directory: PathBuf::from("playbooks"),
            outcomes: vec![
                outcome("create_vms.yml", FileStatus::Valid),
                outcome("foo.yml", FileStatus::NoSchema),
            ],
            skipped: vec!["secret.yml".into()],
        }
    }

    #[test]
    fn text_report_layout() {
        let mut out = Vec::new();
        render_text(&report(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let expected = format!(
            "\nValidation Results:\n{}\n\
             ✓ create_vms.yml is valid.\n\
             No schema defined for foo.yml\n\
             \nSummary:\nValid files: 1/2\n\
             \nInvalid files:\n- foo.yml\n",
            "-".repeat(50)
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn text_report_omits_invalid_section_when_all_valid() {
        let report = DirectoryReport {
            directory: PathBuf::from("."),
            outcomes: vec![outcome("a.yml", FileStatus::Valid)],
            skipped: Vec::new(),
        };
        let mut out = Vec::new();
        render_text(&report, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("Valid files: 1/1\n"));
        assert!(!text.contains("Invalid files"));
    }

    #[test]
    fn json_report_carries_statuses_and_summary() {
        let mut out = Vec::new();
        render_json(&report(), &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["summary"]["valid"], 1);
        assert_eq!(value["summary"]["total"], 2);
        assert_eq!(value["summary"]["all_valid"], false);
        assert_eq!(value["files"][1]["status"], "no_schema");
        assert_eq!(value["files"][1]["message"], "No schema defined for foo.yml");
        assert!(value["files"][0].get("errors").is_none());
        assert!(value["files"][0].get("warnings").is_none());
        assert_eq!(value["skipped"][0], "secret.yml");
    }

    #[test]
    fn warnings_appear_in_both_formats() {
        let mut valid = outcome("create_vms.yml", FileStatus::Valid);
        valid.warnings.push(ValidationError {
            path: pbv_core::DocPath::root().child(0usize).child("become"),
            kind: pbv_schema::ErrorKind::BooleanLikeValue,
            detail: "the value 'yes' is a boolean only under YAML 1.1".into(),
        });
        let report = DirectoryReport {
            directory: PathBuf::from("."),
            outcomes: vec![valid],
            skipped: Vec::new(),
        };

        let mut out = Vec::new();
        render_text(&report, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("✓ create_vms.yml is valid.\n   warning: "), "{text}");
        assert!(text.contains("Valid files: 1/1"));

        let mut out = Vec::new();
        render_json(&report, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["files"][0]["status"], "valid");
        assert_eq!(value["files"][0]["warnings"][0]["kind"], "BooleanLikeValue");
    }
}
