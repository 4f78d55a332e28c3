use crate::error::GeocolumnError;
use std::fmt;
use std::fs;
use std::path::Path;

/// API key for the geocoding service, read once at startup
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    /// Read the key from the first line of a plain-text file
    pub fn load(path: &Path) -> Result<Self, GeocolumnError> {
        let credential_error = |reason: String| GeocolumnError::Credential {
            path: path.to_path_buf(),
            reason,
        };

        let contents = fs::read_to_string(path).map_err(|e| credential_error(e.to_string()))?;

        let first_line = contents
            .lines()
            .next()
            .unwrap_or_default()
            .trim_start_matches('\u{feff}')
            .trim();

        if first_line.is_empty() {
            return Err(credential_error("API key is empty".to_string()));
        }

        log::debug!("Loaded API key from {}", path.display());
        Ok(Self(first_line.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[cfg(test)]
    pub(crate) fn from_static(key: &str) -> Self {
        Self(key.to_string())
    }
}

// Never print the key itself
impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}
