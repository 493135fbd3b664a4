//! Manifest column layout.

use crate::error::{ManifestVerifyError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A manifest column, by zero-based position or by header name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

impl ColumnRef {
    pub fn is_named(&self) -> bool {
        matches!(self, ColumnRef::Name(_))
    }

    /// Resolve to a field index, looking names up in `header`.
    pub fn resolve(&self, header: Option<&[&str]>) -> Result<usize> {
        match self {
            ColumnRef::Index(idx) => Ok(*idx),
            ColumnRef::Name(name) => {
                let header = header.ok_or_else(|| {
                    ManifestVerifyError::Config(format!(
                        "column '{}' is referenced by name but the manifest has no header",
                        name
                    ))
                })?;
                header
                    .iter()
                    .position(|field| field.trim().eq_ignore_ascii_case(name))
                    .ok_or_else(|| ManifestVerifyError::ColumnNotFound(name.clone()))
            }
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Index(idx) => write!(f, "{}", idx),
            ColumnRef::Name(name) => write!(f, "{}", name),
        }
    }
}

impl FromStr for ColumnRef {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("column must not be empty".to_string());
        }
        match s.parse::<usize>() {
            Ok(idx) => Ok(ColumnRef::Index(idx)),
            Err(_) => Ok(ColumnRef::Name(s.to_string())),
        }
    }
}

/// How to read rows out of a manifest file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestFormat {
    /// Column holding the hex MD5 digest
    pub checksum_column: ColumnRef,
    /// Column holding the `scheme://bucket/key` URI
    pub uri_column: ColumnRef,
    /// First non-blank line is a header, not data
    pub has_header: bool,
    /// Field separator
    pub delimiter: char,
}

impl Default for ManifestFormat {
    fn default() -> Self {
        Self {
            checksum_column: ColumnRef::Index(1),
            uri_column: ColumnRef::Index(4),
            has_header: false,
            delimiter: '\t',
        }
    }
}

impl ManifestFormat {
    /// Resolve both columns against an optional header row.
    pub fn resolve(&self, header: Option<&[&str]>) -> Result<ResolvedColumns> {
        Ok(ResolvedColumns {
            checksum: self.checksum_column.resolve(header)?,
            uri: self.uri_column.resolve(header)?,
        })
    }
}

/// Field positions after header lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub checksum: usize,
    pub uri: usize,
}

impl ResolvedColumns {
    /// Fields a row needs for both columns to be present.
    pub fn min_fields(&self) -> usize {
        self.checksum.max(self.uri) + 1
    }
}
