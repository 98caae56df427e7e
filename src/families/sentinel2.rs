//! Sentinel-2 L1C/L2A product items.
//!
//! The datatake sensing time is the third underscore field of the product
//! name (`S2A_MSIL2A_20220101T101301_...`), which saves parsing the granule
//! metadata tree. The SAFE manifest is attached as the metadata asset.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::path::Path;

use super::{metadata_asset, product_id, ProductError};
use crate::catalog::ItemNode;
use crate::product::{ProductFamily, SAFE_MANIFEST};

pub fn create_item(dir: &Path, variant: &str) -> Result<ItemNode, ProductError> {
    if variant != "L1C" && variant != "L2A" {
        return Err(ProductError::UnknownVariant {
            family: ProductFamily::Sentinel2,
            variant: variant.to_string(),
        });
    }

    let id = product_id(dir);
    let sensing = id
        .split('_')
        .nth(2)
        .and_then(parse_compact_time)
        .unwrap_or_else(Utc::now);

    let mut item = ItemNode::new(id, sensing);
    item.properties.insert(
        "constellation".to_string(),
        serde_json::Value::String("sentinel-2".to_string()),
    );
    item.properties.insert(
        "processing_level".to_string(),
        serde_json::Value::String(variant.to_string()),
    );
    item.assets.insert(
        "manifest".to_string(),
        metadata_asset(&dir.join(SAFE_MANIFEST)),
    );
    Ok(item)
}

fn parse_compact_time(text: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text, "%Y%m%dT%H%M%S")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::make_s2_product;
    use tempfile::TempDir;

    #[test]
    fn l2a_item_tagged_with_processing_level() {
        let tmp = TempDir::new().unwrap();
        let dir = make_s2_product(
            tmp.path(),
            "S2A_MSIL2A_20220101T101301_N0301_R022_T33UUP_20220101T120000.SAFE",
            "Product_Level-2A",
        );
        let item = create_item(&dir, "L2A").unwrap();
        assert_eq!(item.properties["constellation"], "sentinel-2");
        assert_eq!(item.properties["processing_level"], "L2A");
        assert!(item.assets.contains_key("manifest"));
    }

    #[test]
    fn sensing_time_parsed_from_name() {
        let tmp = TempDir::new().unwrap();
        let dir = make_s2_product(
            tmp.path(),
            "S2A_MSIL2A_20220101T101301_N0301_R022_T33UUP_20220101T120000.SAFE",
            "Product_Level-2A",
        );
        let item = create_item(&dir, "L2A").unwrap();
        assert_eq!(
            item.datetime,
            "2022-01-01T10:13:01Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn unknown_variant_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let dir = make_s2_product(tmp.path(), "S2A_X.SAFE", "Product_Level-2A");
        assert!(matches!(
            create_item(&dir, "L0").unwrap_err(),
            ProductError::UnknownVariant { .. }
        ));
    }
}
