//! Generic leaf building for ordinary files.
//!
//! Every file that is not part of a recognized product goes through here:
//! first the raster collaborator gets a chance to produce a rich metadata
//! Item; if it reports the file is not an image it understands, the
//! fallback is a minimal Asset — name, media type, creation timestamp,
//! `data` role. Only the `Unsupported` category falls back; any other
//! failure from the raster probe is a real error and aborts the build of
//! the containing subtree.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::catalog::{AssetNode, Element};
use crate::media;
use crate::raster::{RasterError, RasterItemBuilder};

#[derive(Error, Debug)]
pub enum LeafError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("raster probe failed: {0}")]
    Raster(RasterError),
}

/// Timestamp format recorded in the asset's `creation` field.
const CREATION_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Build the catalog element for one ordinary file.
pub fn build_leaf(path: &Path, raster: &dyn RasterItemBuilder) -> Result<Element, LeafError> {
    match raster.create_item(path) {
        Ok(item) => Ok(Element::Item(item)),
        Err(RasterError::Unsupported(_)) => Ok(Element::Asset(generic_asset(path)?)),
        Err(err) => Err(LeafError::Raster(err)),
    }
}

/// Minimal asset for a file nothing else could describe.
pub fn generic_asset(path: &Path) -> Result<AssetNode, std::io::Error> {
    let meta = fs::metadata(path)?;
    // Creation time where the filesystem has it; many Unix filesystems
    // only expose mtime.
    let stamp: DateTime<Utc> = meta.created().or_else(|_| meta.modified())?.into();
    let title = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());

    let mut extra = BTreeMap::new();
    extra.insert(
        "creation".to_string(),
        stamp.format(CREATION_FORMAT).to_string(),
    );

    Ok(AssetNode {
        title,
        href: path.to_string_lossy().into_owned(),
        source_path: path.to_path_buf(),
        media_type: media::guess(path),
        roles: vec!["data".to_string()],
        extra,
    })
}
