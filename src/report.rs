//! Per-object result lines and the end-of-run summary.

use crate::dispatch::RunEvent;
use crate::utils::{count, header, human_bytes, human_elapsed, MessageType};
use crate::validation::VerifyOutcome;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;

/// The line printed for a single event.
pub fn event_line(event: &RunEvent) -> String {
    match event {
        RunEvent::Verified(report) => match &report.outcome {
            VerifyOutcome::Matched { .. } => format!("File {} matches the manifest.", report.uri),
            VerifyOutcome::Mismatched { .. } => {
                format!("File {} does not match the manifest.", report.uri)
            }
            VerifyOutcome::Unverifiable { reason } => {
                format!("File {} could not be verified: {}", report.uri, reason)
            }
        },
        RunEvent::Malformed(err) => err.to_string(),
    }
}

/// Tally of a verification run.
#[derive(Debug, Clone, Serialize)]
pub struct VerifySummary {
    /// Manifest location
    pub manifest: String,
    pub matched: usize,
    pub mismatched: usize,
    pub unverifiable: usize,
    pub malformed: usize,
    pub bytes_hashed: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Run was cancelled before every row was dispatched
    pub interrupted: bool,
    /// Every event that was not a match, in arrival order
    pub failures: Vec<RunEvent>,
}

impl VerifySummary {
    pub fn new(manifest: impl Into<String>) -> Self {
        Self {
            manifest: manifest.into(),
            matched: 0,
            mismatched: 0,
            unverifiable: 0,
            malformed: 0,
            bytes_hashed: 0,
            started_at: Utc::now(),
            finished_at: None,
            interrupted: false,
            failures: Vec::new(),
        }
    }

    pub fn record(&mut self, event: &RunEvent) {
        match event {
            RunEvent::Verified(report) => {
                self.bytes_hashed += report.bytes;
                match report.outcome {
                    VerifyOutcome::Matched { .. } => self.matched += 1,
                    VerifyOutcome::Mismatched { .. } => self.mismatched += 1,
                    VerifyOutcome::Unverifiable { .. } => self.unverifiable += 1,
                }
            }
            RunEvent::Malformed(_) => self.malformed += 1,
        }

        if event.is_failure() {
            self.failures.push(event.clone());
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn total(&self) -> usize {
        self.matched + self.mismatched + self.unverifiable + self.malformed
    }

    /// True when every row matched and the run was not interrupted.
    pub fn is_clean(&self) -> bool {
        self.total() == self.matched && !self.interrupted
    }

    pub fn elapsed(&self) -> Option<std::time::Duration> {
        self.finished_at
            .and_then(|end| (end - self.started_at).to_std().ok())
    }

    /// Multi-line text rendering.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&header("--- Verification Summary ---"));
        out.push('\n');
        out.push_str(&format!("Manifest:       {}\n", self.manifest));
        out.push_str(&format!("Total rows:     {}\n", self.total()));
        out.push_str(&format!(
            "Matched:        {}\n",
            count(self.matched, MessageType::Success)
        ));
        out.push_str(&format!(
            "Mismatched:     {}\n",
            count(self.mismatched, MessageType::Error)
        ));
        out.push_str(&format!(
            "Unverifiable:   {}\n",
            count(self.unverifiable, MessageType::Warning)
        ));
        out.push_str(&format!(
            "Malformed:      {}\n",
            count(self.malformed, MessageType::Warning)
        ));
        out.push_str(&format!("Bytes hashed:   {}\n", human_bytes(self.bytes_hashed)));
        if let Some(elapsed) = self.elapsed() {
            out.push_str(&format!("Elapsed:        {}\n", human_elapsed(elapsed)));
        }

        if self.interrupted {
            out.push_str(&MessageType::Warning.format("Run interrupted before all rows were verified"));
            out.push('\n');
        } else if self.is_clean() {
            out.push_str(&MessageType::Success.format("All objects match the manifest"));
            out.push('\n');
        } else {
            out.push_str(&MessageType::Error.format(&format!(
                "{} of {} rows did not verify",
                self.total() - self.matched,
                self.total()
            )));
            out.push('\n');
        }

        out
    }
}

/// Drain the result channel into a summary, calling `on_event` for each event.
pub async fn collect<F>(
    manifest: impl Into<String>,
    mut events: mpsc::Receiver<RunEvent>,
    mut on_event: F,
) -> VerifySummary
where
    F: FnMut(&RunEvent),
{
    let mut summary = VerifySummary::new(manifest);

    while let Some(event) = events.recv().await {
        on_event(&event);
        summary.record(&event);
    }

    summary.finish();
    tracing::info!(
        "Verified {} rows: {} matched, {} mismatched, {} unverifiable, {} malformed",
        summary.total(),
        summary.matched,
        summary.mismatched,
        summary.unverifiable,
        summary.malformed
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::VerifyReport;
    use crate::manifest::RowError;

    fn verified(line: usize, outcome: VerifyOutcome) -> RunEvent {
        RunEvent::Verified(VerifyReport {
            line,
            uri: "s3://bucket-a/data/file1.csv".into(),
            outcome,
            bytes: 100,
        })
    }

    #[test]
    fn test_event_lines() {
        let matched = verified(
            1,
            VerifyOutcome::Matched {
                digest: "abc".into(),
            },
        );
        assert_eq!(
            event_line(&matched),
            "File s3://bucket-a/data/file1.csv matches the manifest."
        );

        let mismatched = verified(
            1,
            VerifyOutcome::Mismatched {
                expected: "abc".into(),
                actual: "def".into(),
            },
        );
        assert_eq!(
            event_line(&mismatched),
            "File s3://bucket-a/data/file1.csv does not match the manifest."
        );

        let unverifiable = verified(
            1,
            VerifyOutcome::Unverifiable {
                reason: "Access Denied".into(),
            },
        );
        assert_eq!(
            event_line(&unverifiable),
            "File s3://bucket-a/data/file1.csv could not be verified: Access Denied"
        );

        let malformed = RunEvent::Malformed(RowError {
            line: 7,
            reason: "expected at least 5 fields, found 2".into(),
        });
        assert_eq!(
            event_line(&malformed),
            "Manifest line 7 is malformed: expected at least 5 fields, found 2"
        );
    }

    #[test]
    fn test_summary_tally() {
        let mut summary = VerifySummary::new("s3://m/manifest.tsv");
        summary.record(&verified(1, VerifyOutcome::Matched { digest: "a".into() }));
        summary.record(&verified(
            2,
            VerifyOutcome::Mismatched {
                expected: "a".into(),
                actual: "b".into(),
            },
        ));
        summary.record(&verified(
            3,
            VerifyOutcome::Unverifiable {
                reason: "timeout".into(),
            },
        ));
        summary.record(&RunEvent::Malformed(RowError {
            line: 4,
            reason: "short".into(),
        }));

        assert_eq!(summary.total(), 4);
        assert_eq!(summary.matched, 1);
        assert_eq!(summary.mismatched, 1);
        assert_eq!(summary.unverifiable, 1);
        assert_eq!(summary.malformed, 1);
        assert_eq!(summary.bytes_hashed, 300);
        assert_eq!(summary.failures.len(), 3);
        assert!(!summary.is_clean());
    }

    #[test]
    fn test_clean_and_interrupted() {
        let mut summary = VerifySummary::new("s3://m/k");
        assert!(summary.is_clean());
        summary.record(&verified(1, VerifyOutcome::Matched { digest: "a".into() }));
        assert!(summary.is_clean());
        summary.interrupted = true;
        assert!(!summary.is_clean());
    }

    #[test]
    fn test_render_text_mentions_counts() {
        let mut summary = VerifySummary::new("s3://m/k");
        summary.record(&verified(1, VerifyOutcome::Matched { digest: "a".into() }));
        summary.finish();

        let text = summary.render_text();
        assert!(text.contains("Verification Summary"));
        assert!(text.contains("s3://m/k"));
        assert!(text.contains("Total rows:     1"));
        assert!(text.contains("All objects match the manifest"));
    }

    #[test]
    fn test_summary_json() {
        let mut summary = VerifySummary::new("s3://m/k");
        summary.record(&RunEvent::Malformed(RowError {
            line: 2,
            reason: "short".into(),
        }));
        summary.finish();

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["malformed"], 1);
        assert_eq!(json["failures"][0]["kind"], "malformed");
        assert_eq!(json["failures"][0]["line"], 2);
        assert!(json["finished_at"].is_string());
    }

    #[tokio::test]
    async fn test_collect_drains_channel() {
        let (tx, rx) = mpsc::channel(4);
        tokio::spawn(async move {
            for line in 1..=3 {
                let _ = tx
                    .send(verified(line, VerifyOutcome::Matched { digest: "a".into() }))
                    .await;
            }
        });

        let mut seen = Vec::new();
        let summary = collect("s3://m/k", rx, |event| seen.push(event_line(event))).await;

        assert_eq!(seen.len(), 3);
        assert_eq!(summary.matched, 3);
        assert!(summary.finished_at.is_some());
    }
}
