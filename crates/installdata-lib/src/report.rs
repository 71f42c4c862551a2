//! Human-readable diagnostics for a validation run.

use crate::check::{check_document, collect_urls, CheckOptions, Violation};
use crate::decode::{decode_install_data, DecodeError, IgnoredKeySet, StructuralError};
use crate::reachability::{ReachabilityChecker, ReachabilityReport, UnreachableUrl};
use crate::schema::InstallDataDefinition;

pub fn describe_structural(source: &str, err: &StructuralError) -> String {
    match err {
        StructuralError::DataCorrupted { path, message } => format!(
            "Something went wrong decoding {} at the {}: {}",
            source,
            path.describe(),
            message
        ),
        StructuralError::KeyNotFound { path, key } => format!(
            "According to the schema, a \"{}\" key should have been at the {} in {}, but there wasn't anything there",
            key,
            path.describe(),
            source
        ),
        StructuralError::ValueNotFound { path, expected } => format!(
            "According to the schema, there should have been a {} at the {}, but in {} the value was null instead",
            expected,
            path.describe(),
            source
        ),
        StructuralError::TypeMismatch {
            path,
            expected,
            found,
        } => format!(
            "According to the schema, there should have been a {} at the {}, but the value in {} was a {}",
            expected,
            path.describe(),
            source,
            found
        ),
    }
}

pub fn describe_ignored(source: &str, keyset: &IgnoredKeySet) -> String {
    let keys: Vec<&str> = keyset.ignored_keys.iter().map(String::as_str).collect();
    format!(
        "The keys [{}] were in {} at the {}, but nothing should be there according to the schema",
        keys.join(", "),
        source,
        keyset.path.describe()
    )
}

/// One line per problem; an ignored-keys failure yields one line per location
pub fn describe_decode_error(source: &str, err: &DecodeError) -> Vec<String> {
    match err {
        DecodeError::Structural(err) => vec![describe_structural(source, err)],
        DecodeError::IgnoredKeys(err) => err
            .keysets
            .iter()
            .map(|keyset| describe_ignored(source, keyset))
            .collect(),
    }
}

pub fn describe_violation(violation: &Violation) -> String {
    violation.to_string()
}

pub fn describe_unreachable(unreachable: &UnreachableUrl) -> String {
    let paths: Vec<String> = unreachable.paths.iter().map(ToString::to_string).collect();
    format!("{} (referenced at {})", unreachable, paths.join("; "))
}

/// Everything one run found about a listing
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub source: String,
    pub document: Option<InstallDataDefinition>,
    pub decode_error: Option<DecodeError>,
    pub violations: Vec<Violation>,
    pub reachability: Option<ReachabilityReport>,
}

impl ValidationReport {
    /// Decode `bytes` and, if that worked, run every consistency check
    pub fn run(source: &str, bytes: &[u8], options: &CheckOptions) -> Self {
        let mut report = Self {
            source: source.to_string(),
            document: None,
            decode_error: None,
            violations: Vec::new(),
            reachability: None,
        };
        match decode_install_data(bytes) {
            Ok(document) => {
                report.violations = check_document(&document, options);
                report.document = Some(document);
            }
            Err(err) => {
                log::error!("Failed to decode {}: {}", source, err);
                report.decode_error = Some(err);
            }
        }
        report
    }

    /// Probe every url of the decoded document. Does nothing if decoding failed.
    pub async fn probe(&mut self, checker: &ReachabilityChecker) {
        if let Some(document) = &self.document {
            let index = collect_urls(document);
            self.reachability = Some(checker.check_all(&index).await);
        }
    }

    pub fn is_success(&self) -> bool {
        self.decode_error.is_none()
            && self.violations.is_empty()
            && self.reachability.as_ref().map_or(true, ReachabilityReport::is_success)
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(err) = &self.decode_error {
            lines.extend(describe_decode_error(&self.source, err));
        }
        lines.extend(self.violations.iter().map(describe_violation));
        if let Some(reachability) = &self.reachability {
            lines.extend(reachability.unreachable.iter().map(describe_unreachable));
        }
        lines
    }

    pub fn summary(&self) -> String {
        if self.is_success() {
            return format!("{} passed validation", self.source);
        }
        let problems = self.lines().len();
        format!("{} failed validation with {} problem(s)", self.source, problems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{IgnoredKeysError, KeyPath};
    use crate::reachability::ProbeFailure;
    use std::collections::BTreeSet;

    #[test]
    fn ignored_keys_describe_each_location() {
        let err = DecodeError::IgnoredKeys(IgnoredKeysError {
            keysets: vec![
                IgnoredKeySet {
                    path: KeyPath::root(),
                    ignored_keys: BTreeSet::from(["comment".to_string()]),
                },
                IgnoredKeySet {
                    path: crate::key_path!["mods", 0usize, "submods", 0usize],
                    ignored_keys: BTreeSet::from(["downloadSize".to_string(), "size".to_string()]),
                },
            ],
        });
        let lines = describe_decode_error("installData.json", &err);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("at the top level"));
        assert!(lines[1].contains("[downloadSize, size]"));
        assert!(lines[1].contains("path mods → 0 → submods → 0"));
    }

    #[test]
    fn type_mismatch_names_expected_and_found() {
        let err = StructuralError::TypeMismatch {
            path: crate::key_path!["version"],
            expected: "integer".to_string(),
            found: crate::decode::JsonKind::String,
        };
        let line = describe_structural("installData.json", &err);
        assert!(line.contains("a integer at the path version"));
        assert!(line.ends_with("was a string"));
    }

    #[test]
    fn unreachable_lists_all_referencing_paths() {
        let unreachable = UnreachableUrl {
            url: "https://07th-mod.com/missing.7z".to_string(),
            paths: vec![crate::key_path!["a"], crate::key_path!["b"]],
            failure: ProbeFailure::UnexpectedStatus { status: 404 },
        };
        assert_eq!(
            describe_unreachable(&unreachable),
            "Failed to download https://07th-mod.com/missing.7z: response code was 404 (referenced at a; b)"
        );
    }

    #[test]
    fn decode_failure_skips_checks() {
        let report = ValidationReport::run("installData.json", b"[]", &CheckOptions::default());
        assert!(report.document.is_none());
        assert!(report.violations.is_empty());
        assert!(!report.is_success());
        assert_eq!(report.lines().len(), 1);
    }
}
