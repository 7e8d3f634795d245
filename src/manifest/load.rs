use std::path::Path;
use tracing::{debug, info};

use super::types::Manifest;
use crate::error::ManifestError;

/// Serialization of a manifest file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Yaml,
    Json,
}

impl ManifestFormat {
    /// `.yaml` and `.yml` are YAML; anything else is read as JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                ManifestFormat::Yaml
            }
            _ => ManifestFormat::Json,
        }
    }
}

pub fn parse_manifest(content: &str, format: ManifestFormat) -> Result<Manifest, ManifestError> {
    let manifest: Manifest = match format {
        ManifestFormat::Yaml => serde_yaml::from_str(content)?,
        ManifestFormat::Json => serde_json::from_str(content)?,
    };
    debug!(actions = manifest.actions.len(), format = ?format, "Manifest parsed");
    Ok(manifest)
}

/// Read and parse a manifest file
pub fn load_manifest(path: impl AsRef<Path>) -> Result<Manifest, ManifestError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let manifest = parse_manifest(&content, ManifestFormat::from_path(path))?;
    info!(
        path = %path.display(),
        actions_count = manifest.actions.len(),
        "Route manifest loaded"
    );
    Ok(manifest)
}
