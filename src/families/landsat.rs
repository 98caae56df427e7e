//! Landsat Collection 2 product items.
//!
//! The recognizer hands over the MTL metadata filename as the variant;
//! everything of interest here — spacecraft, acquisition date — is read
//! from that file.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::path::Path;

use super::{metadata_asset, product_id, ProductError};
use crate::catalog::ItemNode;
use crate::product::scan_xml;

pub fn create_item(dir: &Path, mtl_file: &str) -> Result<ItemNode, ProductError> {
    let mtl_path = dir.join(mtl_file);
    let scan = scan_xml(&mtl_path, &["DATE_ACQUIRED", "SPACECRAFT_ID"]).ok();

    let acquired = scan
        .as_ref()
        .and_then(|s| s.texts("DATE_ACQUIRED").into_iter().next())
        .and_then(|t| parse_mtl_date(&t));

    let mut item = ItemNode::new(product_id(dir), acquired.unwrap_or_else(Utc::now));
    if let Some(spacecraft) = scan
        .as_ref()
        .and_then(|s| s.texts("SPACECRAFT_ID").into_iter().next())
    {
        // "LANDSAT_5" → "landsat-5"
        item.properties.insert(
            "platform".to_string(),
            serde_json::Value::String(spacecraft.to_lowercase().replace('_', "-")),
        );
    }
    item.assets
        .insert("mtl".to_string(), metadata_asset(&mtl_path));
    Ok(item)
}

fn parse_mtl_date(text: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}
