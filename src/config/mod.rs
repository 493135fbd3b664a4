pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::ConfigLoader;
pub use schema::{Backend, Config, StorageConfig, VerifyConfig};
pub use validator::{validate, ValidationIssue, ValidationResult, ValidationSeverity};
