/// JSON parameter files for the CLI.
use crate::error::{MeshError, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read pipeline parameters from a JSON file. Missing fields take their
/// defaults.
pub fn load_params<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)?;
    let params = serde_json::from_str(&text).map_err(MeshError::Config)?;
    debug!("Loaded parameters from {}", path.display());
    Ok(params)
}
