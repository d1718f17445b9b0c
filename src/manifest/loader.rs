//! Manifest discovery, format detection, and decoding.

use crate::error::{ModstrapError, Result};
use crate::manifest::data_file;
use crate::manifest::schema::{Manifest, KNOWN_KEYS};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Encodings a manifest may be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    /// Static PowerShell data file (`.psd1`).
    DataFile,
    /// JSON document.
    Json,
    /// YAML document.
    Yaml,
}

impl ManifestFormat {
    /// Pick a format from the file extension, falling back to the content.
    pub fn detect(path: &Path, content: &str) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("psd1") => Self::DataFile,
            Some("json") => Self::Json,
            Some("yml") | Some("yaml") => Self::Yaml,
            _ => Self::sniff(content),
        }
    }

    fn sniff(content: &str) -> Self {
        if data_file::looks_like_data_file(content) {
            Self::DataFile
        } else if content.trim_start().starts_with('{') {
            Self::Json
        } else {
            Self::Yaml
        }
    }
}

/// Check that the manifest path names an existing regular file.
///
/// # Errors
///
/// Returns `ManifestNotFound` for an empty path, a missing path, or a
/// directory.
pub fn validate_manifest_path(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() || !path.is_file() {
        return Err(ModstrapError::ManifestNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Read and decode a manifest file.
///
/// # Errors
///
/// Returns `ManifestNotFound` if the file doesn't exist.
/// Returns `ManifestParseError` if the file can't be read as text or decoded.
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ModstrapError::ManifestNotFound {
            path: path.to_path_buf(),
        },
        _ => ModstrapError::ManifestParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
    })?;

    let format = ManifestFormat::detect(path, &content);
    tracing::debug!("Decoding manifest {} as {:?}", path.display(), format);
    parse_manifest(&content, format, path)
}

/// Decode manifest content.
///
/// Empty content yields an empty manifest. Known keys are matched
/// case-insensitively; other keys are ignored.
///
/// # Arguments
///
/// * `content` - The raw file content
/// * `format` - Encoding of `content`
/// * `source_path` - Path for error reporting
pub fn parse_manifest(content: &str, format: ManifestFormat, source_path: &Path) -> Result<Manifest> {
    let parse_error = |message: String| ModstrapError::ManifestParseError {
        path: source_path.to_path_buf(),
        message,
    };

    if content.trim().is_empty() {
        return Ok(Manifest::default());
    }

    let value = match format {
        ManifestFormat::DataFile => data_file::parse(content).map_err(|e| e.to_string()),
        ManifestFormat::Json => serde_json::from_str::<Value>(content).map_err(|e| e.to_string()),
        ManifestFormat::Yaml => serde_yaml::from_str::<Value>(content).map_err(|e| e.to_string()),
    }
    .map_err(parse_error)?;

    let value = match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, v)| (canonical_key(key), v))
                .collect(),
        ),
        Value::Null => return Ok(Manifest::default()),
        _ => {
            return Err(parse_error(
                "manifest must be a map of keys to unit lists".to_string(),
            ))
        }
    };

    serde_json::from_value(value).map_err(|e| parse_error(e.to_string()))
}

fn canonical_key(key: String) -> String {
    KNOWN_KEYS
        .iter()
        .find(|known| known.eq_ignore_ascii_case(&key))
        .map(|known| known.to_string())
        .unwrap_or(key)
}
