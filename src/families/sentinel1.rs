//! Sentinel-1 GRD/SLC product items.
//!
//! Identity comes from the folder name, acquisition time from the
//! `startTime`/`stopTime` pair in `manifest.safe`. The manifest was
//! already readable when the recognizer classified the folder; if it has
//! degraded since, the item falls back to a build-time timestamp rather
//! than failing the build.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::path::Path;

use super::{metadata_asset, product_id, ProductError};
use crate::catalog::ItemNode;
use crate::product::{scan_xml, ProductFamily, SAFE_MANIFEST};

pub fn create_item(dir: &Path, variant: &str) -> Result<ItemNode, ProductError> {
    if variant != "GRD" && variant != "SLC" {
        return Err(ProductError::UnknownVariant {
            family: ProductFamily::Sentinel1,
            variant: variant.to_string(),
        });
    }

    let manifest = dir.join(SAFE_MANIFEST);
    let scan = scan_xml(&manifest, &["startTime", "stopTime"]).ok();
    let start = scan
        .as_ref()
        .and_then(|s| s.texts("startTime").into_iter().next())
        .and_then(|t| parse_safe_time(&t));

    let mut item = ItemNode::new(product_id(dir), start.unwrap_or_else(Utc::now));
    item.properties.insert(
        "constellation".to_string(),
        serde_json::Value::String("sentinel-1".to_string()),
    );
    item.properties.insert(
        "product_type".to_string(),
        serde_json::Value::String(variant.to_string()),
    );
    if let Some(stop) = scan
        .as_ref()
        .and_then(|s| s.texts("stopTime").into_iter().next())
    {
        item.properties.insert(
            "end_datetime".to_string(),
            serde_json::Value::String(stop),
        );
    }
    item.assets
        .insert("manifest".to_string(), metadata_asset(&manifest));
    Ok(item)
}

/// SAFE manifests write times as `2021-03-14T08:30:00.000000` (no zone);
/// they are UTC by convention.
fn parse_safe_time(text: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
