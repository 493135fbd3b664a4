//! Configuration validation.
//!
//! Checks values that parse fine as TOML but cannot drive a run.

use crate::config::schema::{parse_timeout, Backend, Config};
use serde::Serialize;
use std::fmt;

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    /// Blocks a run
    Error,
    /// Advisory only
    Warning,
}

/// A problem found in the configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub severity: ValidationSeverity,
    /// Dotted key, e.g. "verify.workers"
    pub section: String,
    pub message: String,
}

impl ValidationIssue {
    fn error(section: &str, message: impl Into<String>) -> Self {
        Self {
            severity: ValidationSeverity::Error,
            section: section.to_string(),
            message: message.into(),
        }
    }

    fn warning(section: &str, message: impl Into<String>) -> Self {
        Self {
            severity: ValidationSeverity::Warning,
            section: section.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            ValidationSeverity::Error => "error",
            ValidationSeverity::Warning => "warning",
        };
        write!(f, "{} [{}]: {}", level, self.section, self.message)
    }
}

/// Result of configuration validation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationResult {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == ValidationSeverity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == ValidationSeverity::Warning)
    }
}

/// Validate a configuration.
pub fn validate(config: &Config) -> ValidationResult {
    let mut issues = Vec::new();

    if config.verify.workers == 0 {
        issues.push(ValidationIssue::error(
            "verify.workers",
            "must be at least 1",
        ));
    } else if config.verify.workers > 256 {
        issues.push(ValidationIssue::warning(
            "verify.workers",
            format!(
                "{} concurrent reads may be throttled by the object store",
                config.verify.workers
            ),
        ));
    }

    if config.verify.chunk_size == 0 {
        issues.push(ValidationIssue::error(
            "verify.chunk_size",
            "must be at least 1 byte",
        ));
    }

    if let Some(timeout) = &config.verify.timeout {
        match parse_timeout(timeout) {
            Ok(d) if d.is_zero() => {
                issues.push(ValidationIssue::error("verify.timeout", "must be non-zero"))
            }
            Ok(_) => {}
            Err(e) => issues.push(ValidationIssue::error("verify.timeout", e.to_string())),
        }
    }

    match config.storage.backend {
        Backend::Http if config.storage.endpoint.is_none() => {
            issues.push(ValidationIssue::error(
                "storage.endpoint",
                "the http backend requires an endpoint",
            ));
        }
        Backend::Http if config.storage.region.is_some() => {
            issues.push(ValidationIssue::warning(
                "storage.region",
                "ignored by the http backend",
            ));
        }
        _ => {}
    }

    let manifest = &config.manifest;
    let named = manifest.checksum_column.is_named() || manifest.uri_column.is_named();
    if named && !manifest.has_header {
        issues.push(ValidationIssue::error(
            "manifest.has_header",
            "named columns require has_header = true",
        ));
    }
    if manifest.checksum_column == manifest.uri_column {
        issues.push(ValidationIssue::error(
            "manifest.uri_column",
            "checksum and URI columns must differ",
        ));
    }
    if manifest.delimiter == '\n' || manifest.delimiter == '\r' {
        issues.push(ValidationIssue::error(
            "manifest.delimiter",
            "line separators cannot be used as field delimiters",
        ));
    }

    ValidationResult { issues }
}
