use crate::cli::args::VerifyArgs;
use manifest_verify::config::{Config, ConfigLoader};
use manifest_verify::error::{ManifestVerifyError, Result};
use std::path::PathBuf;

/// Application context: configuration file merged with CLI arguments
pub struct AppContext {
    pub config: Config,
    /// Where the config was (or would be) read from
    pub config_path: Option<PathBuf>,
}

impl AppContext {
    /// Load the config file. `--config` and `MANIFEST_VERIFY_CONFIG` arrive as `path`.
    pub fn new(path: Option<PathBuf>) -> Result<Self> {
        let config_path = path.or_else(ConfigLoader::config_path);
        let config = match &config_path {
            Some(p) => ConfigLoader::load_from(p)?,
            None => Config::default(),
        };

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Path for commands that need one, failing when no config dir can be found
    pub fn require_config_path(&self) -> Result<PathBuf> {
        self.config_path.clone().ok_or_else(|| {
            ManifestVerifyError::Config("Could not determine config directory".to_string())
        })
    }

    /// Apply `verify` flags on top of the file values. Priority: CLI > config > defaults
    pub fn with_verify_overrides(mut self, args: &VerifyArgs) -> Self {
        let storage = &mut self.config.storage;
        if let Some(backend) = args.backend {
            storage.backend = backend;
        }
        if let Some(endpoint) = &args.endpoint {
            storage.endpoint = Some(endpoint.clone());
        }
        if let Some(region) = &args.region {
            storage.region = Some(region.clone());
        }

        let manifest = &mut self.config.manifest;
        if let Some(col) = &args.checksum_column {
            manifest.checksum_column = col.clone();
        }
        if let Some(col) = &args.uri_column {
            manifest.uri_column = col.clone();
        }
        if args.header {
            manifest.has_header = true;
        }

        let verify = &mut self.config.verify;
        if let Some(workers) = args.workers {
            verify.workers = workers;
        }
        if let Some(timeout) = &args.timeout {
            verify.timeout = Some(timeout.clone());
        }
        if let Some(chunk_size) = args.chunk_size {
            verify.chunk_size = chunk_size;
        }

        self
    }
}
