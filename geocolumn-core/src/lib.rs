use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

// Internal modules (private)
mod classifier;
mod credentials;
mod error;
mod geocoding;
mod input;
mod job;
mod resolver;
mod writer;

// Re-export public types
pub use classifier::{classify, CellValue, ClassifiedValue, ValueKind};
pub use credentials::ApiKey;
pub use error::{GeocolumnError, RequestFailed};
pub use geocoding::{Candidate, Geocoder, GoogleMapsClient};
pub use input::{CsvTable, InputRow};
pub use job::{GeocodeJob, ProgressEvent};
pub use resolver::{
    resolve_rows, resolve_value, ResolutionBatch, ResolutionRecord, RowProgress, NO_ADDRESS,
};
pub use writer::{output_path, write_batch, OutputMode};

/// Configuration options for a geocoding session
#[derive(Debug, Clone)]
pub struct GeocodeConfig {
    /// File whose first line holds the API key
    pub api_key_path: PathBuf,
    /// Scheme and host of the geocoding service
    pub api_base_url: String,
    /// Per-request timeout
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            api_key_path: PathBuf::from("api_key.txt"),
            api_base_url: "https://maps.googleapis.com".to_string(),
            request_timeout: Duration::from_secs(10),
            user_agent: format!(
                "Geocolumn/{} (https://github.com/h4x0r/geocolumn)",
                env!("CARGO_PKG_VERSION")
            ),
        }
    }
}

/// Everything a run needs, built once at startup and shared read-only
#[derive(Clone)]
pub struct GeocodeContext {
    config: GeocodeConfig,
    geocoder: Arc<dyn Geocoder>,
}

impl GeocodeContext {
    pub fn new(config: GeocodeConfig, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { config, geocoder }
    }

    /// Load the API key and build the Google Maps client
    ///
    /// Fails with [`GeocolumnError::Credential`] if the key file is missing or
    /// its first line is empty.
    pub fn from_config(config: GeocodeConfig) -> Result<Self> {
        let api_key = ApiKey::load(&config.api_key_path)?;
        let client = GoogleMapsClient::new(api_key, &config)?;
        Ok(Self::new(config, Arc::new(client)))
    }

    pub fn config(&self) -> &GeocodeConfig {
        &self.config
    }

    pub fn geocoder(&self) -> &dyn Geocoder {
        self.geocoder.as_ref()
    }
}
