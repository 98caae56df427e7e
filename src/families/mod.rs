//! Per-family product Item builders.
//!
//! The tree builder consumes these through one narrow interface:
//! [`create_item`] keyed by (family, variant). Each family module owns the
//! quirks of its product layout — what the identifier is, where the
//! acquisition time lives, which file is the metadata asset. All of them
//! return a fully populated Item for the whole product folder; none of
//! them recurse.

pub mod landsat;
pub mod sentinel1;
pub mod sentinel2;

use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::catalog::{AssetNode, ItemNode};
use crate::media::MediaType;
use crate::product::ProductFamily;

#[derive(Error, Debug)]
pub enum ProductError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown {family} product variant: {variant}")]
    UnknownVariant {
        family: ProductFamily,
        variant: String,
    },
}

/// Build the single Item representing a recognized product folder.
pub fn create_item(
    family: ProductFamily,
    variant: &str,
    dir: &Path,
) -> Result<ItemNode, ProductError> {
    match family {
        ProductFamily::Sentinel1 => sentinel1::create_item(dir, variant),
        ProductFamily::Sentinel2 => sentinel2::create_item(dir, variant),
        ProductFamily::Landsat => landsat::create_item(dir, variant),
    }
}

/// Product identifier from a folder name, with the SAFE wrapper extension
/// stripped: `S1A_..._20210314.SAFE` → `S1A_..._20210314`.
pub(crate) fn product_id(dir: &Path) -> String {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.to_string_lossy().into_owned());
    name.strip_suffix(".SAFE").unwrap_or(&name).to_string()
}

/// An XML metadata file attached under the given asset key.
pub(crate) fn metadata_asset(path: &Path) -> AssetNode {
    AssetNode {
        title: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        href: path.to_string_lossy().into_owned(),
        source_path: path.to_path_buf(),
        media_type: Some(MediaType::Xml),
        roles: vec!["metadata".to_string()],
        extra: BTreeMap::new(),
    }
}
