//! Shared test utilities for the stacwalk test suite.
//!
//! Fixture builders write small but structurally faithful product folders
//! (SAFE manifests, MTL metadata) into temp directories; lookup helpers
//! panic with a clear message on a miss so failing tests read well.

use chrono::Utc;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::{AssetNode, CatalogNode, CollectionNode, ItemNode};
use crate::product::SAFE_MANIFEST;

// =========================================================================
// Filesystem fixtures
// =========================================================================

/// Write `contents` to `path`, creating parent directories as needed.
pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// A minimal file that passes the TIFF magic check.
pub fn make_tiff(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, crate::raster::TIFF_MAGIC_LE).unwrap();
}

/// Spec string for a path, as the path-set resolver expects it.
pub fn spec(path: impl AsRef<Path>) -> String {
    path.as_ref().to_string_lossy().into_owned()
}

/// A Sentinel-1 product folder: `<name>/manifest.safe` declaring the given
/// product type (GRD, SLC, or anything else for negative tests).
pub fn make_s1_product(root: &Path, name: &str, product_type: &str) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join(SAFE_MANIFEST),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<xfdu:XFDU xmlns:xfdu="urn:ccsds:schema:xfdu:1"
           xmlns:safe="http://www.esa.int/safe/sentinel-1.0"
           xmlns:s1sarl1="http://www.esa.int/safe/sentinel-1.0/sentinel-1/sar/level-1">
  <metadataSection>
    <metadataObject ID="acquisitionPeriod">
      <safe:startTime>2021-03-14T08:30:00.000000</safe:startTime>
      <safe:stopTime>2021-03-14T08:30:25.000000</safe:stopTime>
    </metadataObject>
    <metadataObject ID="generalProductInformation">
      <s1sarl1:productType>{product_type}</s1sarl1:productType>
    </metadataObject>
  </metadataSection>
</xfdu:XFDU>
"#
        ),
    )
    .unwrap();
    dir
}

/// A Sentinel-2 product folder whose manifest carries one content unit
/// with the given `unitType` (e.g. `Product_Level-2A`).
pub fn make_s2_product(root: &Path, name: &str, unit_type: &str) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join(SAFE_MANIFEST),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<xfdu:XFDU xmlns:xfdu="urn:ccsds:schema:xfdu:1">
  <informationPackageMap>
    <xfdu:contentUnit unitType="{unit_type}" textInfo="SENTINEL-2 User Product"/>
  </informationPackageMap>
</xfdu:XFDU>
"#
        ),
    )
    .unwrap();
    dir
}

/// A Landsat scene folder named `name`, with a matching `_MTL.xml`
/// metadata file and one band file.
pub fn make_landsat_product(root: &Path, name: &str) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join(format!("{name}_MTL.xml")),
        r#"<?xml version="1.0"?>
<LANDSAT_METADATA_FILE>
  <IMAGE_ATTRIBUTES>
    <SPACECRAFT_ID>LANDSAT_5</SPACECRAFT_ID>
    <DATE_ACQUIRED>2020-01-01</DATE_ACQUIRED>
  </IMAGE_ATTRIBUTES>
</LANDSAT_METADATA_FILE>
"#,
    )
    .unwrap();
    fs::write(dir.join(format!("{name}_B1.TIF")), "band data").unwrap();
    dir
}

// =========================================================================
// Node builders
// =========================================================================

/// A bare asset whose title and source path are both `title`.
pub fn asset(title: &str) -> AssetNode {
    asset_at(Path::new(title))
}

/// A bare asset backed by `path`.
pub fn asset_at(path: &Path) -> AssetNode {
    AssetNode {
        title: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned()),
        href: path.to_string_lossy().into_owned(),
        source_path: path.to_path_buf(),
        media_type: crate::media::guess(path),
        roles: vec!["data".to_string()],
        extra: BTreeMap::new(),
    }
}

/// A generic item with no geometry and a fresh timestamp.
pub fn generic_item(id: &str) -> ItemNode {
    ItemNode::new(id, Utc::now())
}

// =========================================================================
// Catalog lookups — panic with a clear message on a miss
// =========================================================================

/// Find a direct child collection of the catalog by id. Panics if absent.
pub fn find_collection<'a>(catalog: &'a CatalogNode, id: &str) -> &'a CollectionNode {
    catalog
        .collections
        .iter()
        .find(|c| c.id == id)
        .unwrap_or_else(|| {
            let ids: Vec<&str> = catalog.collections.iter().map(|c| c.id.as_str()).collect();
            panic!("collection '{id}' not found. Available: {ids:?}")
        })
}

/// Find an item anywhere in the catalog by id. Panics if absent.
pub fn find_item<'a>(catalog: &'a CatalogNode, id: &str) -> &'a ItemNode {
    fn search<'a>(collections: &'a [CollectionNode], id: &str) -> Option<&'a ItemNode> {
        for collection in collections {
            if let Some(item) = collection.items.iter().find(|i| i.id == id) {
                return Some(item);
            }
            if let Some(item) = search(&collection.collections, id) {
                return Some(item);
            }
        }
        None
    }

    catalog
        .items
        .iter()
        .find(|i| i.id == id)
        .or_else(|| search(&catalog.collections, id))
        .unwrap_or_else(|| panic!("item '{id}' not found in catalog '{}'", catalog.id))
}
