//! Concurrent dispatch of verification units.
//!
//! A feeder task walks the manifest rows and queues one request per valid row
//! on a bounded channel. A fixed pool of workers takes requests from that
//! queue, verifies the object and publishes a [`RunEvent`] on the result
//! channel. Malformed rows skip the queue and are published by the feeder.
//! The result channel closes once the feeder and every worker have finished.

use crate::error::ManifestVerifyError;
use crate::manifest::{ManifestRow, RowError, RowResult};
use crate::validation::{ChecksumVerifier, VerifyOutcome};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};

/// Default number of concurrent verifications.
pub const DEFAULT_WORKERS: usize = 8;

/// One unit of work: verify `uri` against `expected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyRequest {
    pub line: usize,
    pub uri: String,
    pub expected: String,
}

impl From<ManifestRow> for VerifyRequest {
    fn from(row: ManifestRow) -> Self {
        Self {
            line: row.line,
            uri: row.object_uri,
            expected: row.expected_checksum,
        }
    }
}

/// Result of one verification unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    pub line: usize,
    pub uri: String,
    #[serde(flatten)]
    pub outcome: VerifyOutcome,
    /// Bytes read from the store
    pub bytes: u64,
}

/// Everything the driver receives, one event per manifest data row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunEvent {
    Verified(VerifyReport),
    Malformed(RowError),
}

impl RunEvent {
    pub fn line(&self) -> usize {
        match self {
            RunEvent::Verified(report) => report.line,
            RunEvent::Malformed(err) => err.line,
        }
    }

    /// True for anything other than a matching object.
    pub fn is_failure(&self) -> bool {
        match self {
            RunEvent::Verified(report) => !report.outcome.is_match(),
            RunEvent::Malformed(_) => true,
        }
    }
}

/// Bounded worker pool over a shared verifier.
pub struct Dispatcher {
    verifier: Arc<ChecksumVerifier>,
    workers: usize,
}

impl Dispatcher {
    pub fn new(verifier: Arc<ChecksumVerifier>, workers: usize) -> Self {
        Self {
            verifier,
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Start the feeder and workers; returns the result channel.
    ///
    /// Setting `shutdown` to `true` stops the feeder, stops workers from taking
    /// new requests and resolves in-flight units as unverifiable.
    pub fn spawn<I>(&self, rows: I, shutdown: watch::Receiver<bool>) -> mpsc::Receiver<RunEvent>
    where
        I: Iterator<Item = RowResult> + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel::<VerifyRequest>(self.workers * 2);
        let (event_tx, event_rx) = mpsc::channel::<RunEvent>(self.workers * 4);
        let request_rx = Arc::new(Mutex::new(request_rx));

        tracing::debug!("Starting {} verification workers", self.workers);

        for id in 0..self.workers {
            tokio::spawn(worker(
                id,
                Arc::clone(&self.verifier),
                Arc::clone(&request_rx),
                event_tx.clone(),
                shutdown.clone(),
            ));
        }

        tokio::spawn(feed(rows, request_tx, event_tx, shutdown));

        event_rx
    }
}

/// Queue every row, publishing malformed ones directly.
async fn feed<I>(
    rows: I,
    requests: mpsc::Sender<VerifyRequest>,
    events: mpsc::Sender<RunEvent>,
    mut shutdown: watch::Receiver<bool>,
) where
    I: Iterator<Item = RowResult> + Send,
{
    let mut queued = 0usize;

    for row in rows {
        let stop = *shutdown.borrow();
        if stop {
            tracing::info!("Dispatch stopped after {} rows", queued);
            break;
        }

        match row {
            Ok(row) => {
                let request = VerifyRequest::from(row);
                tokio::select! {
                    biased;
                    _ = cancelled(&mut shutdown) => break,
                    sent = requests.send(request) => {
                        if sent.is_err() {
                            break;
                        }
                        queued += 1;
                    }
                }
            }
            Err(err) => {
                tracing::warn!("{}", err);
                if events.send(RunEvent::Malformed(err)).await.is_err() {
                    break;
                }
            }
        }
    }

    tracing::debug!("Feeder finished, {} requests queued", queued);
}

async fn worker(
    id: usize,
    verifier: Arc<ChecksumVerifier>,
    requests: Arc<Mutex<mpsc::Receiver<VerifyRequest>>>,
    events: mpsc::Sender<RunEvent>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        let request = {
            let mut queue = requests.lock().await;
            tokio::select! {
                biased;
                _ = cancelled(&mut shutdown) => None,
                request = queue.recv() => request,
            }
        };

        let Some(request) = request else {
            break;
        };

        tracing::debug!("worker {}: verifying {}", id, request.uri);

        let (outcome, bytes) = tokio::select! {
            biased;
            _ = cancelled(&mut shutdown) => {
                let reason = ManifestVerifyError::Cancelled.to_string();
                (VerifyOutcome::Unverifiable { reason }, 0)
            }
            result = verifier.verify(&request.uri, &request.expected) => result,
        };

        let report = VerifyReport {
            line: request.line,
            uri: request.uri,
            outcome,
            bytes,
        };

        if events.send(RunEvent::Verified(report)).await.is_err() {
            break;
        }
    }

    tracing::debug!("worker {} finished", id);
}

/// Resolves once shutdown is requested. Never resolves if the sender is gone.
async fn cancelled(shutdown: &mut watch::Receiver<bool>) {
    let closed = shutdown.wait_for(|stop| *stop).await.is_err();
    if closed {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Manifest, ManifestFormat};
    use crate::storage::InMemoryStore;
    use crate::validation::md5_hex;
    use std::time::Duration;

    fn dispatcher(store: Arc<InMemoryStore>, workers: usize) -> Dispatcher {
        Dispatcher::new(Arc::new(ChecksumVerifier::new(store)), workers)
    }

    async fn drain(mut rx: mpsc::Receiver<RunEvent>) -> Vec<RunEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events.sort_by_key(|e| e.line());
        events
    }

    #[tokio::test]
    async fn test_every_row_produces_one_event() {
        let store = Arc::new(InMemoryStore::new());
        let mut content = String::new();
        for i in 0..50 {
            let key = format!("objects/{}.bin", i);
            let body = format!("object number {}", i);
            store.put("b", &key, body.clone());
            content.push_str(&format!("x\t{}\tx\tx\ts3://b/{}\n", md5_hex(body.as_bytes()), key));
        }

        let manifest = Manifest::parse(content, &ManifestFormat::default()).unwrap();
        let (_tx, shutdown) = watch::channel(false);
        let events = drain(dispatcher(store, 4).spawn(manifest.into_rows(), shutdown)).await;

        assert_eq!(events.len(), 50);
        assert!(events.iter().all(|e| !e.is_failure()));
        let lines: Vec<usize> = events.iter().map(|e| e.line()).collect();
        assert_eq!(lines, (1..=50).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_malformed_rows_are_reported() {
        let store = Arc::new(InMemoryStore::new());
        store.put("b", "ok", "content");
        let content = format!("short\trow\nx\t{}\tx\tx\ts3://b/ok\n", md5_hex(b"content"));

        let manifest = Manifest::parse(content, &ManifestFormat::default()).unwrap();
        let (_tx, shutdown) = watch::channel(false);
        let events = drain(dispatcher(store, 2).spawn(manifest.into_rows(), shutdown)).await;

        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], RunEvent::Malformed(err) if err.line == 1));
        assert!(!events[1].is_failure());
    }

    #[tokio::test]
    async fn test_single_worker_handles_more_rows_than_queue() {
        let store = Arc::new(InMemoryStore::new());
        store.put("b", "k", "v");
        let rows: Vec<RowResult> = (1..=20)
            .map(|line| {
                Ok(ManifestRow {
                    line,
                    expected_checksum: md5_hex(b"v"),
                    object_uri: "s3://b/k".into(),
                })
            })
            .collect();

        let (_tx, shutdown) = watch::channel(false);
        let d = dispatcher(Arc::clone(&store), 0);
        assert_eq!(d.workers(), 1);
        let events = drain(d.spawn(rows.into_iter(), shutdown)).await;

        assert_eq!(events.len(), 20);
        assert_eq!(store.request_count(), 20);
    }

    #[tokio::test]
    async fn test_shutdown_before_start_dispatches_nothing() {
        let store = Arc::new(InMemoryStore::new());
        store.put("b", "k", "v");
        let rows: Vec<RowResult> = (1..=5)
            .map(|line| {
                Ok(ManifestRow {
                    line,
                    expected_checksum: md5_hex(b"v"),
                    object_uri: "s3://b/k".into(),
                })
            })
            .collect();

        let (tx, shutdown) = watch::channel(false);
        tx.send(true).unwrap();
        let events = drain(dispatcher(Arc::clone(&store), 2).spawn(rows.into_iter(), shutdown)).await;

        assert!(events.is_empty());
        assert_eq!(store.request_count(), 0);
    }

    fn rows(count: usize, uri: &str) -> Vec<RowResult> {
        (1..=count)
            .map(|line| {
                Ok(ManifestRow {
                    line,
                    expected_checksum: md5_hex(b"v"),
                    object_uri: uri.into(),
                })
            })
            .collect()
    }

    #[tokio::test]
    async fn test_shutdown_mid_flight_cancels_in_flight_units() {
        let store = InMemoryStore::new().with_latency(Duration::from_secs(30));
        store.put("b", "k", "v");
        let store = Arc::new(store);

        let (tx, shutdown) = watch::channel(false);
        let rx = dispatcher(Arc::clone(&store), 2).spawn(rows(10, "s3://b/k").into_iter(), shutdown);

        // Both workers are now waiting on the store
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(store.request_count(), 2);
        tx.send(true).unwrap();

        let events = tokio::time::timeout(Duration::from_secs(5), drain(rx))
            .await
            .unwrap();

        assert_eq!(events.len(), 2);
        for event in &events {
            match event {
                RunEvent::Verified(report) => assert_eq!(
                    report.outcome,
                    VerifyOutcome::Unverifiable {
                        reason: "cancelled".into()
                    }
                ),
                other => panic!("unexpected event {:?}", other),
            }
        }
        // Queued requests were never picked up
        assert_eq!(store.request_count(), 2);
    }

    #[tokio::test]
    async fn test_timeout_resolves_each_unit_as_unverifiable() {
        let store = InMemoryStore::new().with_latency(Duration::from_secs(30));
        store.put("b", "k", "v");
        let verifier =
            ChecksumVerifier::new(Arc::new(store)).with_timeout(Some(Duration::from_millis(50)));
        let d = Dispatcher::new(Arc::new(verifier), 3);

        let (_tx, shutdown) = watch::channel(false);
        let events = tokio::time::timeout(
            Duration::from_secs(5),
            drain(d.spawn(rows(3, "s3://b/k").into_iter(), shutdown)),
        )
        .await
        .unwrap();

        assert_eq!(events.len(), 3);
        for event in &events {
            match event {
                RunEvent::Verified(report) => assert_eq!(
                    report.outcome,
                    VerifyOutcome::Unverifiable {
                        reason: "Timed out after 50ms".into()
                    }
                ),
                other => panic!("unexpected event {:?}", other),
            }
        }
    }

    #[test]
    fn test_report_serialization() {
        let event = RunEvent::Verified(VerifyReport {
            line: 3,
            uri: "s3://b/k".into(),
            outcome: VerifyOutcome::Mismatched {
                expected: "a".into(),
                actual: "b".into(),
            },
            bytes: 10,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "verified");
        assert_eq!(json["status"], "mismatched");
        assert_eq!(json["uri"], "s3://b/k");
        assert_eq!(json["expected"], "a");
    }
}
