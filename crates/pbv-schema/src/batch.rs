//! # Directory Validation
//!
//! Validates every YAML file directly inside a directory against a
//! [`SchemaRegistry`] and collects one [`FileOutcome`] per file.
//!
//! Per file the steps are: exclusion check, load (size ceiling first),
//! schema resolution, validation. An excluded file is never opened. A
//! failure at any later step is recorded in that file's outcome and the run
//! moves on; only an unusable directory aborts the batch.
//!
//! Unquoted `yes`/`no`/`on`/`off` values found while loading are attached to
//! the outcome as [`ErrorKind::BooleanLikeValue`] warnings. Warnings never
//! change a file's status.

use std::path::{Path, PathBuf};

use pbv_core::{load_linted, BooleanLike, DocumentLoadError, LoadOptions};
use thiserror::Error;

use crate::registry::{RegistryError, SchemaRegistry};
use crate::validator::{ambiguous_detail, ErrorKind, ValidationError, ValidationResult};

/// Prefix on messages for files validated through the fallback schema.
pub const FALLBACK_PREFIX: &str = "[Using fallback schema] ";

/// Errors that stop a batch before any file is processed.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("{path} is not a directory")]
    NotADirectory { path: String },

    #[error("failed to read directory {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Terminal state of one file.
#[derive(Debug)]
pub enum FileStatus {
    Valid,
    Invalid(ValidationResult),
    LoadFailed(DocumentLoadError),
    NoSchema,
    /// The registry refused the identity for a reason other than a missing
    /// schema.
    ResolveFailed(RegistryError),
    /// On the exclusion list; the file was not opened.
    Excluded,
}

impl FileStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Invalid(_) => "invalid",
            Self::LoadFailed(_) => "load_failed",
            Self::NoSchema => "no_schema",
            Self::ResolveFailed(_) => "resolve_failed",
            Self::Excluded => "excluded",
        }
    }
}

/// Result for a single file.
#[derive(Debug)]
pub struct FileOutcome {
    /// File name; also the identity used for schema lookup.
    pub name: String,
    pub path: PathBuf,
    pub via_fallback: bool,
    pub status: FileStatus,
    /// Authoring warnings, in document order.
    pub warnings: Vec<ValidationError>,
}

impl FileOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self.status, FileStatus::Valid)
    }

    /// The human-readable line(s) reported for this file.
    pub fn message(&self) -> String {
        let body = match &self.status {
            FileStatus::Valid => format!("✓ {} is valid.", self.name),
            FileStatus::Invalid(result) => {
                let mut text = format!("✗ {} validation error:", self.name);
                for error in &result.errors {
                    text.push_str("\n   ");
                    text.push_str(&error.to_string());
                }
                text
            }
            FileStatus::LoadFailed(error) => {
                format!("✗ {} validation error:\n   {error}", self.name)
            }
            FileStatus::ResolveFailed(error) => {
                format!("✗ {} validation error:\n   {error}", self.name)
            }
            FileStatus::NoSchema => format!("No schema defined for {}", self.name),
            FileStatus::Excluded => format!("Skipping {}: excluded from validation", self.name),
        };
        let mut text = if self.via_fallback {
            format!("{FALLBACK_PREFIX}{body}")
        } else {
            body
        };
        for warning in &self.warnings {
            text.push_str("\n   warning: ");
            text.push_str(&warning.to_string());
        }
        text
    }
}

/// Outcomes for one directory, sorted by file name.
#[derive(Debug)]
pub struct DirectoryReport {
    pub directory: PathBuf,
    pub outcomes: Vec<FileOutcome>,
    /// Excluded files that were seen and not loaded.
    pub skipped: Vec<String>,
}

impl DirectoryReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn valid_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_valid()).count()
    }

    pub fn invalid_files(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_valid())
            .map(|o| o.name.as_str())
            .collect()
    }

    pub fn all_valid(&self) -> bool {
        self.outcomes.iter().all(FileOutcome::is_valid)
    }

    pub fn outcome(&self, name: &str) -> Option<&FileOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml" | "yaml")
    )
}

/// List YAML files directly inside `dir`, sorted by file name.
///
/// Entries that cannot be inspected are logged and skipped.
pub fn discover(dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    let location = dir.display().to_string();
    if !dir.is_dir() {
        return Err(BatchError::NotADirectory { path: location });
    }
    let entries = std::fs::read_dir(dir).map_err(|source| BatchError::Io {
        path: location.clone(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(directory = %location, error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let path = entry.path();
        if is_yaml(&path) && path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Attach lint findings to a validation result. A finding at the path of
/// an [`ErrorKind::AmbiguousScalar`] error rewrites that error to show the
/// token as written; every other finding becomes a warning.
fn apply_lints(result: &mut ValidationResult, lints: Vec<BooleanLike>) -> Vec<ValidationError> {
    let mut warnings = Vec::new();
    for lint in lints {
        let ambiguous = result
            .errors
            .iter_mut()
            .find(|e| e.kind == ErrorKind::AmbiguousScalar && e.path == lint.path);
        match ambiguous {
            Some(error) => error.detail = ambiguous_detail("boolean", &lint.token),
            None => warnings.push(lint_warning(lint)),
        }
    }
    warnings
}

fn lint_warning(lint: BooleanLike) -> ValidationError {
    ValidationError {
        detail: lint.advice(),
        path: lint.path,
        kind: ErrorKind::BooleanLikeValue,
    }
}

/// Exclusion check, then load, resolve and validate one file.
pub fn validate_file(path: &Path, registry: &SchemaRegistry, options: &LoadOptions) -> FileOutcome {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let outcome = |via_fallback, status, warnings| FileOutcome {
        name: name.clone(),
        path: path.to_path_buf(),
        via_fallback,
        status,
        warnings,
    };

    if registry.is_excluded(&name) {
        tracing::debug!(file = %name, "excluded");
        return outcome(false, FileStatus::Excluded, Vec::new());
    }

    let linted = match load_linted(path, options) {
        Ok(linted) => linted,
        Err(error) => {
            tracing::warn!(file = %name, error = %error, "failed to load document");
            return outcome(false, FileStatus::LoadFailed(error), Vec::new());
        }
    };

    match registry.validate(&name, &linted.document) {
        Ok((resolved, mut result)) => {
            let warnings = apply_lints(&mut result, linted.lints);
            tracing::debug!(
                file = %name,
                via_fallback = resolved.via_fallback,
                errors = result.errors.len(),
                warnings = warnings.len(),
                "validated"
            );
            let status = if result.is_valid() {
                FileStatus::Valid
            } else {
                FileStatus::Invalid(result)
            };
            outcome(resolved.via_fallback, status, warnings)
        }
        Err(RegistryError::NoSchemaForIdentity { .. }) => {
            tracing::debug!(file = %name, "no schema for file");
            let warnings = linted.lints.into_iter().map(lint_warning).collect();
            outcome(false, FileStatus::NoSchema, warnings)
        }
        Err(RegistryError::Excluded { .. }) => outcome(false, FileStatus::Excluded, Vec::new()),
        Err(error) => {
            tracing::warn!(file = %name, error = %error, "schema resolution failed");
            outcome(false, FileStatus::ResolveFailed(error), Vec::new())
        }
    }
}

/// Validate every YAML file in `dir`.
pub fn validate_directory(
    dir: &Path,
    registry: &SchemaRegistry,
    options: &LoadOptions,
) -> Result<DirectoryReport, BatchError> {
    let files = discover(dir)?;
    let mut report = DirectoryReport {
        directory: dir.to_path_buf(),
        outcomes: Vec::with_capacity(files.len()),
        skipped: Vec::new(),
    };

    for path in files {
        let outcome = validate_file(&path, registry, options);
        if matches!(outcome.status, FileStatus::Excluded) {
            report.skipped.push(outcome.name);
        } else {
            report.outcomes.push(outcome);
        }
    }

    tracing::info!(
        directory = %dir.display(),
        valid = report.valid_count(),
        total = report.total(),
        skipped = report.skipped.len(),
        "validation finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ansible;
    use std::fs;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn discover_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.yml", "");
        write(dir.path(), "a.yaml", "");
        write(dir.path(), "notes.txt", "");
        fs::create_dir(dir.path().join("nested.yml")).unwrap();

        let names: Vec<String> = discover(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.yaml", "b.yml"]);
    }

    #[test]
    fn missing_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ansible::registry(false).unwrap();
        let err = validate_directory(
            &dir.path().join("absent"),
            &registry,
            &LoadOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, BatchError::NotADirectory { .. }));
    }

    #[test]
    fn messages_follow_status() {
        let valid = FileOutcome {
            name: "a.yml".into(),
            path: PathBuf::from("a.yml"),
            via_fallback: false,
            status: FileStatus::Valid,
            warnings: Vec::new(),
        };
        assert_eq!(valid.message(), "✓ a.yml is valid.");

        let fallback = FileOutcome {
            via_fallback: true,
            ..valid
        };
        assert_eq!(
            fallback.message(),
            "[Using fallback schema] ✓ a.yml is valid."
        );

        let missing = FileOutcome {
            name: "foo.yml".into(),
            path: PathBuf::from("foo.yml"),
            via_fallback: false,
            status: FileStatus::NoSchema,
            warnings: Vec::new(),
        };
        assert_eq!(missing.message(), "No schema defined for foo.yml");
        assert!(!missing.is_valid());
    }

    #[test]
    fn invalid_message_lists_each_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "create_vms.yml", "- name: x\n  bogus: 1\n");
        let registry = ansible::registry(false).unwrap();

        let outcome = validate_file(
            &dir.path().join("create_vms.yml"),
            &registry,
            &LoadOptions::default(),
        );
        assert_eq!(outcome.status.label(), "invalid");
        assert_eq!(
            outcome.message(),
            "✗ create_vms.yml validation error:\n   \
             [0].hosts: missing required field 'hosts'\n   \
             [0].bogus: unexpected field 'bogus'"
        );
    }

    #[test]
    fn excluded_file_is_never_opened() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "secret.yml", "password: [unclosed\n");
        let registry = ansible::registry(true).unwrap();

        let outcome = validate_file(
            &dir.path().join("secret.yml"),
            &registry,
            &LoadOptions::default(),
        );
        assert!(matches!(outcome.status, FileStatus::Excluded), "{}", outcome.status.label());
        assert_eq!(outcome.message(), "Skipping secret.yml: excluded from validation");
        assert!(!outcome.via_fallback);
    }

    #[test]
    fn unquoted_switch_values_become_warnings_without_failing() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "create_vms.yml",
            "- name: x\n  hosts: all\n  become: yes\n  vars:\n    ipv6: off\n",
        );
        let registry = ansible::registry(false).unwrap();

        let outcome = validate_file(
            &dir.path().join("create_vms.yml"),
            &registry,
            &LoadOptions::default(),
        );
        assert!(outcome.is_valid(), "{}", outcome.message());
        let paths: Vec<String> = outcome.warnings.iter().map(|w| w.path.to_string()).collect();
        assert_eq!(paths, vec!["[0].become", "[0].vars.ipv6"]);
        assert!(outcome
            .warnings
            .iter()
            .all(|w| w.kind == ErrorKind::BooleanLikeValue));
        assert!(outcome.message().starts_with(
            "✓ create_vms.yml is valid.\n   warning: [0].become: the value 'yes' is a boolean only under YAML 1.1"
        ));
    }

    #[test]
    fn ambiguous_string_names_the_written_token_once() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "create_vms.yml",
            "- name: no\n  hosts: all\n",
        );
        let registry = ansible::registry(false).unwrap();

        let outcome = validate_file(
            &dir.path().join("create_vms.yml"),
            &registry,
            &LoadOptions::default(),
        );
        match &outcome.status {
            FileStatus::Invalid(result) => {
                assert_eq!(result.count(ErrorKind::AmbiguousScalar), 1, "{result}");
                assert_eq!(
                    result.errors[0].detail,
                    "ambiguous boolean-like value 'no' where a string is expected; quote it"
                );
            }
            other => panic!("expected invalid, got {}", other.label()),
        }
        assert!(outcome.warnings.is_empty());
    }
}
