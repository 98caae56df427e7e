//! Self-contained catalog serialization.
//!
//! One descriptor file per node: `catalog.json` at the destination root,
//! `<id>/collection.json` per collection, `<id>/<id>.json` per item, each
//! nested inside its parent's directory. Links between descriptors are
//! relative paths, so the whole tree can be moved or served from anywhere.
//! Asset hrefs are written exactly as the rewrite pass left them.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::catalog::{AssetNode, CatalogNode, CollectionNode, Extent, ItemNode};

/// STAC spec version stamped into every descriptor.
pub const STAC_VERSION: &str = "1.1.0";

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("nothing to save: run create before save")]
    NotBuilt,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Descriptor documents
// ============================================================================

#[derive(Serialize)]
struct LinkDoc {
    rel: &'static str,
    href: String,
}

#[derive(Serialize)]
struct AssetDoc {
    href: String,
    title: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    media_type: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    roles: Vec<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, String>,
}

impl AssetDoc {
    fn from_node(asset: &AssetNode) -> Self {
        AssetDoc {
            href: asset.href.clone(),
            title: asset.title.clone(),
            media_type: asset.media_type.map(|m| m.as_str().to_string()),
            roles: asset.roles.clone(),
            extra: asset.extra.clone(),
        }
    }
}

#[derive(Serialize)]
struct SpatialDoc {
    bbox: [[f64; 4]; 1],
}

#[derive(Serialize)]
struct TemporalDoc {
    interval: [[Option<String>; 2]; 1],
}

#[derive(Serialize)]
struct ExtentDoc {
    spatial: SpatialDoc,
    temporal: TemporalDoc,
}

impl ExtentDoc {
    fn from_extent(extent: &Extent) -> Self {
        ExtentDoc {
            spatial: SpatialDoc {
                bbox: [extent.bbox],
            },
            temporal: TemporalDoc {
                interval: [[
                    extent.start.map(|t| t.to_rfc3339()),
                    extent.end.map(|t| t.to_rfc3339()),
                ]],
            },
        }
    }
}

#[derive(Serialize)]
struct CatalogDoc {
    #[serde(rename = "type")]
    kind: &'static str,
    stac_version: &'static str,
    id: String,
    description: String,
    links: Vec<LinkDoc>,
}

#[derive(Serialize)]
struct CollectionDoc {
    #[serde(rename = "type")]
    kind: &'static str,
    stac_version: &'static str,
    id: String,
    description: String,
    license: &'static str,
    extent: ExtentDoc,
    links: Vec<LinkDoc>,
    assets: BTreeMap<String, AssetDoc>,
}

#[derive(Serialize)]
struct ItemDoc {
    #[serde(rename = "type")]
    kind: &'static str,
    stac_version: &'static str,
    id: String,
    geometry: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bbox: Option<[f64; 4]>,
    properties: serde_json::Map<String, serde_json::Value>,
    links: Vec<LinkDoc>,
    assets: BTreeMap<String, AssetDoc>,
}

// ============================================================================
// Writers
// ============================================================================

/// Write the whole descriptor tree under `dest_root`.
pub fn save(catalog: &CatalogNode, dest_root: &Path) -> Result<(), SaveError> {
    fs::create_dir_all(dest_root)?;

    let mut links = Vec::new();
    for collection in &catalog.collections {
        links.push(LinkDoc {
            rel: "child",
            href: format!("{}/collection.json", collection.id),
        });
    }
    for item in &catalog.items {
        links.push(LinkDoc {
            rel: "item",
            href: format!("{0}/{0}.json", item.id),
        });
    }
    let doc = CatalogDoc {
        kind: "Catalog",
        stac_version: STAC_VERSION,
        id: catalog.id.clone(),
        description: catalog.description.clone(),
        links,
    };
    write_doc(&dest_root.join("catalog.json"), &doc)?;

    for collection in &catalog.collections {
        save_collection(
            collection,
            &dest_root.join(&collection.id),
            "../catalog.json",
            "../catalog.json",
        )?;
    }
    for item in &catalog.items {
        save_item(item, &dest_root.join(&item.id), "../catalog.json", "../catalog.json")?;
    }
    Ok(())
}

fn save_collection(
    collection: &CollectionNode,
    dir: &Path,
    root_rel: &str,
    parent_rel: &str,
) -> Result<(), SaveError> {
    fs::create_dir_all(dir)?;

    let mut links = vec![
        LinkDoc {
            rel: "root",
            href: root_rel.to_string(),
        },
        LinkDoc {
            rel: "parent",
            href: parent_rel.to_string(),
        },
    ];
    for sub in &collection.collections {
        links.push(LinkDoc {
            rel: "child",
            href: format!("{}/collection.json", sub.id),
        });
    }
    for item in &collection.items {
        links.push(LinkDoc {
            rel: "item",
            href: format!("{0}/{0}.json", item.id),
        });
    }

    let doc = CollectionDoc {
        kind: "Collection",
        stac_version: STAC_VERSION,
        id: collection.id.clone(),
        description: collection.description.clone(),
        license: "proprietary",
        extent: ExtentDoc::from_extent(&collection.extent),
        links,
        assets: collection
            .assets
            .iter()
            .map(|(key, asset)| (key.clone(), AssetDoc::from_node(asset)))
            .collect(),
    };
    write_doc(&dir.join("collection.json"), &doc)?;

    let child_root = format!("../{root_rel}");
    for sub in &collection.collections {
        save_collection(sub, &dir.join(&sub.id), &child_root, "../collection.json")?;
    }
    for item in &collection.items {
        save_item(item, &dir.join(&item.id), &child_root, "../collection.json")?;
    }
    Ok(())
}

fn save_item(item: &ItemNode, dir: &Path, root_rel: &str, parent_rel: &str) -> Result<(), SaveError> {
    fs::create_dir_all(dir)?;

    let mut properties = item.properties.clone();
    properties.insert(
        "datetime".to_string(),
        serde_json::Value::String(item.datetime.to_rfc3339()),
    );

    let doc = ItemDoc {
        kind: "Feature",
        stac_version: STAC_VERSION,
        id: item.id.clone(),
        geometry: item.geometry.clone(),
        bbox: item.bbox,
        properties,
        links: vec![
            LinkDoc {
                rel: "root",
                href: root_rel.to_string(),
            },
            LinkDoc {
                rel: "parent",
                href: parent_rel.to_string(),
            },
        ],
        assets: item
            .assets
            .iter()
            .map(|(key, asset)| (key.clone(), AssetDoc::from_node(asset)))
            .collect(),
    };
    write_doc(&dir.join(format!("{}.json", item.id)), &doc)
}

fn write_doc<T: Serialize>(path: &Path, doc: &T) -> Result<(), SaveError> {
    let json = serde_json::to_string_pretty(doc)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Element;
    use crate::test_helpers::{asset, generic_item};
    use tempfile::TempDir;

    fn read_json(path: &Path) -> serde_json::Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    fn sample_catalog() -> CatalogNode {
        let mut item = generic_item("scene");
        let mut a = asset("run.txt");
        a.href = "/logs/run.txt".to_string();
        item.attach(Element::Asset(a.clone()));

        let mut collection = CollectionNode::new("logs", "Collection of files");
        collection.attach(Element::Asset(a));
        collection.attach(Element::Item(item));

        let mut catalog = CatalogNode::new("Catalog", "STAC catalog for src");
        catalog.attach(Element::Collection(collection)).unwrap();
        catalog.attach(Element::Item(generic_item("loose"))).unwrap();
        catalog
    }

    #[test]
    fn writes_one_descriptor_per_node() {
        let tmp = TempDir::new().unwrap();
        save(&sample_catalog(), tmp.path()).unwrap();

        assert!(tmp.path().join("catalog.json").is_file());
        assert!(tmp.path().join("logs/collection.json").is_file());
        assert!(tmp.path().join("logs/scene/scene.json").is_file());
        assert!(tmp.path().join("loose/loose.json").is_file());
    }

    #[test]
    fn catalog_links_children_relatively() {
        let tmp = TempDir::new().unwrap();
        save(&sample_catalog(), tmp.path()).unwrap();

        let doc = read_json(&tmp.path().join("catalog.json"));
        assert_eq!(doc["type"], "Catalog");
        assert_eq!(doc["stac_version"], STAC_VERSION);
        let hrefs: Vec<&str> = doc["links"]
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["href"].as_str().unwrap())
            .collect();
        assert!(hrefs.contains(&"logs/collection.json"));
        assert!(hrefs.contains(&"loose/loose.json"));
    }

    #[test]
    fn collection_doc_carries_extent_and_assets() {
        let tmp = TempDir::new().unwrap();
        save(&sample_catalog(), tmp.path()).unwrap();

        let doc = read_json(&tmp.path().join("logs/collection.json"));
        assert_eq!(doc["type"], "Collection");
        assert_eq!(doc["extent"]["spatial"]["bbox"][0][0], -180.0);
        assert_eq!(doc["assets"]["run.txt"]["href"], "/logs/run.txt");
        assert_eq!(doc["assets"]["run.txt"]["roles"][0], "data");
    }

    #[test]
    fn item_doc_is_a_feature_with_datetime() {
        let tmp = TempDir::new().unwrap();
        save(&sample_catalog(), tmp.path()).unwrap();

        let doc = read_json(&tmp.path().join("logs/scene/scene.json"));
        assert_eq!(doc["type"], "Feature");
        assert!(doc["properties"]["datetime"].is_string());
        assert!(doc["geometry"].is_null());
        let parents: Vec<&str> = doc["links"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|l| l["rel"] == "parent")
            .map(|l| l["href"].as_str().unwrap())
            .collect();
        assert_eq!(parents, vec!["../collection.json"]);
    }

    #[test]
    fn nested_collection_root_link_climbs_all_levels() {
        let tmp = TempDir::new().unwrap();
        let mut inner = CollectionNode::new("inner", "");
        inner.attach(Element::Asset(asset("x.txt")));
        let mut outer = CollectionNode::new("outer", "");
        outer.attach(Element::Collection(inner));
        let mut catalog = CatalogNode::new("cat", "");
        catalog.attach(Element::Collection(outer)).unwrap();

        save(&catalog, tmp.path()).unwrap();
        let doc = read_json(&tmp.path().join("outer/inner/collection.json"));
        let roots: Vec<&str> = doc["links"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|l| l["rel"] == "root")
            .map(|l| l["href"].as_str().unwrap())
            .collect();
        assert_eq!(roots, vec!["../../catalog.json"]);
    }

    #[test]
    fn asset_extra_fields_flatten_into_the_document() {
        let tmp = TempDir::new().unwrap();
        let mut collection = CollectionNode::new("c", "");
        let mut a = asset("a.txt");
        a.extra
            .insert("creation".to_string(), "2024-05-01 10:30".to_string());
        collection.attach(Element::Asset(a));
        let mut catalog = CatalogNode::new("cat", "");
        catalog.attach(Element::Collection(collection)).unwrap();

        save(&catalog, tmp.path()).unwrap();
        let doc = read_json(&tmp.path().join("c/collection.json"));
        assert_eq!(doc["assets"]["a.txt"]["creation"], "2024-05-01 10:30");
    }
}
