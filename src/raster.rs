//! The generic raster collaborator.
//!
//! Turning an arbitrary image into a rich metadata Item is delegated
//! through the [`RasterItemBuilder`] seam so the builder can be exercised
//! with a mock, the same way image encoding sits behind a backend trait in
//! a processing pipeline. The contract matters more than the
//! implementation: `Unsupported` is the one recognized failure category —
//! it means "fall back to a plain asset" — while every other error is a
//! real problem and propagates.

use chrono::{DateTime, Utc};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::catalog::{AssetNode, ItemNode};
use crate::media::MediaType;
use std::collections::BTreeMap;

#[derive(Error, Debug)]
pub enum RasterError {
    /// Not an image this builder understands. The recognized, non-fatal
    /// category: callers fall back to the minimal generic asset.
    #[error("not a supported raster format: {0}")]
    Unsupported(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds a metadata Item from a single raster file.
pub trait RasterItemBuilder {
    fn create_item(&self, path: &Path) -> Result<ItemNode, RasterError>;
}

/// Default raster probe: extension filter plus a TIFF magic-byte check.
///
/// Produces a minimal raster Item — identifier from the file stem, file
/// timestamp, the file itself as a `data` asset. Footprint and band
/// geometry need a real raster reader and stay empty here.
#[derive(Debug, Default)]
pub struct ExtensionProbe;

const RASTER_EXTENSIONS: &[&str] = &["tif", "tiff", "jp2"];

impl RasterItemBuilder for ExtensionProbe {
    fn create_item(&self, path: &Path) -> Result<ItemNode, RasterError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if !RASTER_EXTENSIONS.contains(&ext.as_str()) {
            return Err(RasterError::Unsupported(path.to_path_buf()));
        }
        if (ext == "tif" || ext == "tiff") && !has_tiff_magic(path)? {
            // Extension lied; same category as any other unreadable image.
            return Err(RasterError::Unsupported(path.to_path_buf()));
        }

        let meta = fs::metadata(path)?;
        let timestamp: DateTime<Utc> = meta.modified()?.into();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| stem.clone());

        let mut item = ItemNode::new(stem, timestamp);
        item.assets.insert(
            "data".to_string(),
            AssetNode {
                title: file_name,
                href: path.to_string_lossy().into_owned(),
                source_path: path.to_path_buf(),
                media_type: crate::media::guess(path),
                roles: vec!["data".to_string()],
                extra: BTreeMap::new(),
            },
        );
        Ok(item)
    }
}

/// Little- or big-endian classic TIFF header.
fn has_tiff_magic(path: &Path) -> Result<bool, std::io::Error> {
    let mut header = [0u8; 4];
    let mut file = fs::File::open(path)?;
    match file.read_exact(&mut header) {
        Ok(()) => Ok(header == [0x49, 0x49, 0x2a, 0x00] || header == [0x4d, 0x4d, 0x00, 0x2a]),
        Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
pub(crate) const TIFF_MAGIC_LE: &[u8] = &[0x49, 0x49, 0x2a, 0x00, 0x08, 0x00, 0x00, 0x00];
