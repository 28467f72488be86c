//! Session-immutable inputs: the question schema and the image inventory.
//!
//! Both are loaded once at startup and injected into the engine. The
//! inventory comes either from an explicit JSON manifest or from a scan
//! of the image directory (sorted by file name, so traversal order is
//! stable across restarts as long as no files are renamed).

use std::path::Path;

use anyhow::Context;
use els_core::{ImageSet, Schema};

use crate::config::ServerConfig;

/// File extensions recognized as annotatable images.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff"];

/// Load the question schema from the configured JSON file.
pub fn load_schema(config: &ServerConfig) -> anyhow::Result<Schema> {
    let raw = std::fs::read_to_string(&config.schema_path)
        .with_context(|| format!("failed to read schema file '{}'", config.schema_path))?;
    let schema = Schema::from_json_str(&raw)
        .with_context(|| format!("invalid schema JSON in '{}'", config.schema_path))?;
    anyhow::ensure!(!schema.is_empty(), "schema must define at least one question");
    Ok(schema)
}

/// Build the image inventory from the manifest or a directory scan.
pub fn load_image_set(config: &ServerConfig) -> anyhow::Result<ImageSet> {
    if let Some(manifest) = &config.images_manifest {
        let raw = std::fs::read_to_string(manifest)
            .with_context(|| format!("failed to read image manifest '{manifest}'"))?;
        let ids: Vec<String> = serde_json::from_str(&raw)
            .with_context(|| format!("image manifest '{manifest}' must be a JSON string array"))?;
        return Ok(ImageSet::new(ids));
    }
    scan_images_dir(Path::new(&config.images_dir))
}

/// Scan a directory for image files, sorted by name.
///
/// A missing directory yields an empty inventory rather than an error so
/// a fresh deployment can start before its images are mounted.
fn scan_images_dir(dir: &Path) -> anyhow::Result<ImageSet> {
    if !dir.is_dir() {
        tracing::warn!(dir = %dir.display(), "Images directory missing; starting with an empty inventory");
        return Ok(ImageSet::default());
    }

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read images directory '{}'", dir.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_image = Path::new(&name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
        if is_image {
            names.push(name);
        }
    }
    names.sort();
    Ok(ImageSet::new(names))
}
