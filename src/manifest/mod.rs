//! Manifest loading and row parsing.
//!
//! A manifest is a delimited text object in the store. Each data line names an
//! object URI and its expected MD5. Lines are parsed lazily; a line that cannot
//! produce a row yields a [`RowError`] for that line and the scan continues.

pub mod format;

use crate::error::{ManifestVerifyError, Result};
use crate::storage::{ObjectLocation, ObjectStore};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

pub use format::{ColumnRef, ManifestFormat, ResolvedColumns};

/// One data line of the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRow {
    /// 1-based line number in the manifest
    pub line: usize,
    pub expected_checksum: String,
    pub object_uri: String,
}

/// A manifest line that could not be turned into a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub line: usize,
    pub reason: String,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Manifest line {} is malformed: {}", self.line, self.reason)
    }
}

pub type RowResult = std::result::Result<ManifestRow, RowError>;

/// Decoded manifest content with its resolved column layout.
#[derive(Debug, Clone)]
pub struct Manifest {
    content: String,
    delimiter: char,
    columns: ResolvedColumns,
    /// Line number of the header, if any
    header_line: Option<usize>,
}

impl Manifest {
    /// Parse manifest text, resolving named columns against the header.
    pub fn parse(content: String, format: &ManifestFormat) -> Result<Self> {
        let uses_names = format.checksum_column.is_named() || format.uri_column.is_named();
        if uses_names && !format.has_header {
            return Err(ManifestVerifyError::Config(
                "named manifest columns require has_header = true".into(),
            ));
        }

        let (columns, header_line) = if format.has_header {
            match first_data_line(&content) {
                Some((line_no, header)) => {
                    let fields: Vec<&str> = header.split(format.delimiter).collect();
                    (distinct(format.resolve(Some(fields.as_slice()))?)?, Some(line_no))
                }
                // Empty manifest: nothing to resolve against, and nothing to verify.
                None if uses_names => (ResolvedColumns { checksum: 0, uri: 0 }, None),
                None => (distinct(format.resolve(None)?)?, None),
            }
        } else {
            (distinct(format.resolve(None)?)?, None)
        };

        tracing::debug!(
            "Manifest columns: checksum={}, uri={}",
            columns.checksum,
            columns.uri
        );

        Ok(Self {
            content,
            delimiter: format.delimiter,
            columns,
            header_line,
        })
    }

    pub fn columns(&self) -> ResolvedColumns {
        self.columns
    }

    /// Number of data lines (blank lines and the header excluded).
    pub fn row_count(&self) -> usize {
        self.content
            .lines()
            .enumerate()
            .filter(|(idx, line)| !line.trim().is_empty() && Some(idx + 1) != self.header_line)
            .count()
    }

    /// Lazily iterate the data rows, consuming the manifest.
    pub fn into_rows(self) -> ManifestRows {
        ManifestRows {
            manifest: self,
            offset: 0,
            line: 0,
        }
    }

    fn extract(&self, line: usize, raw: &str) -> RowResult {
        let fields: Vec<&str> = raw.split(self.delimiter).collect();
        let needed = self.columns.min_fields();

        if fields.len() < needed {
            return Err(RowError {
                line,
                reason: format!("expected at least {} fields, found {}", needed, fields.len()),
            });
        }

        let expected_checksum = fields[self.columns.checksum].trim();
        let object_uri = fields[self.columns.uri].trim();

        if expected_checksum.is_empty() {
            return Err(RowError {
                line,
                reason: "checksum field is empty".into(),
            });
        }
        if object_uri.is_empty() {
            return Err(RowError {
                line,
                reason: "object URI field is empty".into(),
            });
        }

        Ok(ManifestRow {
            line,
            expected_checksum: expected_checksum.to_string(),
            object_uri: object_uri.to_string(),
        })
    }
}

/// Owning, lazy iterator over manifest rows.
pub struct ManifestRows {
    manifest: Manifest,
    offset: usize,
    line: usize,
}

impl Iterator for ManifestRows {
    type Item = RowResult;

    fn next(&mut self) -> Option<RowResult> {
        loop {
            let content = &self.manifest.content;
            if self.offset >= content.len() {
                return None;
            }

            let start = self.offset;
            let end = content[start..]
                .find('\n')
                .map(|i| start + i)
                .unwrap_or(content.len());
            self.offset = end + 1;
            self.line += 1;

            let raw = &content[start..end];
            let raw = raw.strip_suffix('\r').unwrap_or(raw);

            if raw.trim().is_empty() || Some(self.line) == self.manifest.header_line {
                continue;
            }

            return Some(self.manifest.extract(self.line, raw));
        }
    }
}

/// Reject layouts where both fields come from the same column.
fn distinct(columns: ResolvedColumns) -> Result<ResolvedColumns> {
    if columns.checksum == columns.uri {
        return Err(ManifestVerifyError::Config(format!(
            "checksum and URI columns both resolve to field {}",
            columns.checksum
        )));
    }
    Ok(columns)
}

fn first_data_line(content: &str) -> Option<(usize, &str)> {
    content
        .lines()
        .enumerate()
        .find(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| (idx + 1, line.strip_suffix('\r').unwrap_or(line)))
}

/// Fetches manifests from the object store.
pub struct ManifestLoader {
    store: Arc<dyn ObjectStore>,
    format: ManifestFormat,
}

impl ManifestLoader {
    pub fn new(store: Arc<dyn ObjectStore>, format: ManifestFormat) -> Self {
        Self { store, format }
    }

    /// Fetch and decode the manifest at `location`.
    ///
    /// Any retrieval failure is returned as [`ManifestVerifyError::ManifestFetch`];
    /// nothing is parsed in that case.
    pub async fn load(&self, location: &ObjectLocation) -> Result<Manifest> {
        tracing::info!("Reading manifest {}", location);

        let bytes = self
            .store
            .get_object_bytes(&location.bucket, &location.key)
            .await
            .map_err(|e| ManifestVerifyError::ManifestFetch {
                location: location.to_string(),
                source: Box::new(e),
            })?;

        let content = String::from_utf8(bytes)
            .map_err(|e| ManifestVerifyError::ManifestDecode(format!("{}: {}", location, e)))?;

        Manifest::parse(content, &self.format)
    }
}
