pub mod config;
pub mod verify;

pub use config::run_config;
pub use verify::run_verify;
