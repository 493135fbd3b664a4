//! manifest-verify: check objects in S3-compatible storage against an MD5 manifest.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod manifest;
pub mod report;
pub mod storage;
pub mod utils;
pub mod validation;

// Re-export commonly used types
pub use dispatch::{Dispatcher, RunEvent, VerifyReport};
pub use error::{ManifestVerifyError, Result};
pub use manifest::{Manifest, ManifestFormat, ManifestLoader};
pub use report::VerifySummary;
pub use storage::{ObjectLocation, ObjectStore};
pub use validation::{ChecksumVerifier, VerifyOutcome};
