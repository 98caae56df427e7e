//! The catalog container model.
//!
//! Four node kinds make up a built catalog:
//!
//! - [`CatalogNode`] — the root of exactly one build; holds top-level
//!   Collections and Items.
//! - [`CollectionNode`] — a named grouping with a spatial/temporal
//!   [`Extent`], an asset map, child Items and child Collections.
//! - [`ItemNode`] — one "thing" (a satellite product or a folder forced to
//!   be an item) with optional geometry and an asset map.
//! - [`AssetNode`] — a reference to one on-disk file plus descriptive
//!   metadata.
//!
//! The model is strictly a tree: every node has exactly one owner, and a
//! node is attached to its final parent exactly once, at the end of the
//! recursive call that created it. Nothing re-parents a node after attach.
//!
//! ## Attach dispatch
//!
//! "Attach element to container" is an exhaustive match over the closed
//! [`Element`] enum in each container kind. Adding a new element kind is a
//! compile error until every attach rule says what to do with it:
//!
//! | container  | Asset        | Item          | Collection          |
//! |------------|--------------|---------------|---------------------|
//! | Catalog    | error (drop) | child item    | child collection    |
//! | Collection | asset map    | child item    | child collection    |
//! | Item       | asset map    | absorb assets | absorb assets, deep |
//!
//! An Item handed an Item or Collection absorbs only the descendant assets,
//! flattening them into its own map — never descendant structure.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::media::MediaType;

/// Spatial extent covering the whole Earth, the collection default.
pub const WHOLE_EARTH_BBOX: [f64; 4] = [-180.0, -90.0, 180.0, 90.0];

#[derive(Error, Debug)]
pub enum AttachError {
    #[error("a catalog cannot hold a bare asset: {title}")]
    AssetIntoCatalog { title: String },
}

// ============================================================================
// Extent
// ============================================================================

/// Spatial bounding box plus temporal interval of a collection.
///
/// The default — whole Earth, open time range — means "unknown", not
/// literally everything: extent recomputation skips child collections that
/// still carry it, so real extents propagate upward undiluted.
#[derive(Debug, Clone, PartialEq)]
pub struct Extent {
    pub bbox: [f64; 4],
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl Default for Extent {
    fn default() -> Self {
        Extent {
            bbox: WHOLE_EARTH_BBOX,
            start: None,
            end: None,
        }
    }
}

impl Extent {
    pub fn is_default(&self) -> bool {
        *self == Extent::default()
    }
}

fn union_bbox(acc: Option<[f64; 4]>, next: [f64; 4]) -> Option<[f64; 4]> {
    Some(match acc {
        None => next,
        Some(a) => [
            a[0].min(next[0]),
            a[1].min(next[1]),
            a[2].max(next[2]),
            a[3].max(next[3]),
        ],
    })
}

fn widen_span(
    span: &mut Option<(DateTime<Utc>, DateTime<Utc>)>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) {
    *span = Some(match span {
        None => (start, end),
        Some((s, e)) => ((*s).min(start), (*e).max(end)),
    });
}

// ============================================================================
// Nodes
// ============================================================================

/// Reference to one on-disk file plus descriptive metadata.
///
/// `source_path` is the location captured at build time and never changes;
/// it is what the prune pass checks for existence. `href` starts out as the
/// same location and is rewritten to a public path by the rewrite pass.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetNode {
    pub title: String,
    pub href: String,
    pub source_path: PathBuf,
    pub media_type: Option<MediaType>,
    pub roles: Vec<String>,
    pub extra: BTreeMap<String, String>,
}

/// A leaf domain object: one product, or one folder/file forced to be an
/// item. Generic items carry no geometry and a build-time timestamp.
#[derive(Debug, Clone)]
pub struct ItemNode {
    pub id: String,
    pub geometry: Option<serde_json::Value>,
    pub bbox: Option<[f64; 4]>,
    pub datetime: DateTime<Utc>,
    pub properties: serde_json::Map<String, serde_json::Value>,
    pub assets: BTreeMap<String, AssetNode>,
    pub self_href: Option<PathBuf>,
}

/// A named grouping with extent, assets, child items and sub-collections.
#[derive(Debug, Clone)]
pub struct CollectionNode {
    pub id: String,
    pub description: String,
    pub extent: Extent,
    pub assets: BTreeMap<String, AssetNode>,
    pub items: Vec<ItemNode>,
    pub collections: Vec<CollectionNode>,
    pub self_href: Option<PathBuf>,
}

/// The root of one build.
#[derive(Debug, Clone)]
pub struct CatalogNode {
    pub id: String,
    pub description: String,
    pub collections: Vec<CollectionNode>,
    pub items: Vec<ItemNode>,
    pub self_href: Option<PathBuf>,
}

/// The closed set of element kinds a container can be handed.
#[derive(Debug, Clone)]
pub enum Element {
    Collection(CollectionNode),
    Item(ItemNode),
    Asset(AssetNode),
}

impl Element {
    /// Short human label used in diagnostics ("collection logs", "asset a.txt").
    pub fn describe(&self) -> String {
        match self {
            Element::Collection(c) => format!("collection {}", c.id),
            Element::Item(i) => format!("item {}", i.id),
            Element::Asset(a) => format!("asset {}", a.title),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

// ============================================================================
// Attach rules
// ============================================================================

impl CatalogNode {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        CatalogNode {
            id: id.into(),
            description: description.into(),
            collections: Vec::new(),
            items: Vec::new(),
            self_href: None,
        }
    }

    /// Catalog accepts Items and Collections. A bare Asset has no place at
    /// the root; the caller decides whether to drop it or fail the build.
    pub fn attach(&mut self, element: Element) -> Result<(), AttachError> {
        match element {
            Element::Item(item) => {
                self.items.push(item);
                Ok(())
            }
            Element::Collection(collection) => {
                self.collections.push(collection);
                Ok(())
            }
            Element::Asset(asset) => Err(AttachError::AssetIntoCatalog { title: asset.title }),
        }
    }
}

impl CollectionNode {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        CollectionNode {
            id: id.into(),
            description: description.into(),
            extent: Extent::default(),
            assets: BTreeMap::new(),
            items: Vec::new(),
            collections: Vec::new(),
            self_href: None,
        }
    }

    /// Collection accepts everything. Attaching an Item or a Collection
    /// recomputes the extent from the new child population; attaching an
    /// Asset does not (assets carry no extent of their own).
    pub fn attach(&mut self, element: Element) {
        match element {
            Element::Asset(asset) => {
                self.assets.insert(asset.title.clone(), asset);
            }
            Element::Item(item) => {
                self.items.push(item);
                self.recompute_extent();
            }
            Element::Collection(collection) => {
                self.collections.push(collection);
                self.recompute_extent();
            }
        }
    }

    /// No items, no assets, no sub-collections.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.assets.is_empty() && self.collections.is_empty()
    }

    /// All assets reachable from this collection: its own, its
    /// sub-collections' (recursively) and its items'. Later entries win on
    /// key collisions, mirroring map-merge semantics.
    pub fn descendant_assets(&self) -> BTreeMap<String, AssetNode> {
        let mut all = self.assets.clone();
        for sub in &self.collections {
            all.extend(sub.descendant_assets());
        }
        for item in &self.items {
            all.extend(item.assets.clone());
        }
        all
    }

    /// Union of child bboxes and time ranges. Items without a bbox
    /// contribute only their timestamp; sub-collections still carrying the
    /// default extent are treated as unknown and skipped. When no child
    /// contributes anything the default extent stands.
    fn recompute_extent(&mut self) {
        let mut bbox = None;
        let mut span = None;
        let mut open_start = false;
        let mut open_end = false;

        for item in &self.items {
            if let Some(b) = item.bbox {
                bbox = union_bbox(bbox, b);
            }
            widen_span(&mut span, item.datetime, item.datetime);
        }
        for sub in &self.collections {
            if sub.extent.is_default() {
                continue;
            }
            bbox = union_bbox(bbox, sub.extent.bbox);
            match (sub.extent.start, sub.extent.end) {
                (Some(s), Some(e)) => widen_span(&mut span, s, e),
                (Some(s), None) => {
                    widen_span(&mut span, s, s);
                    open_end = true;
                }
                (None, Some(e)) => {
                    widen_span(&mut span, e, e);
                    open_start = true;
                }
                (None, None) => {
                    open_start = true;
                    open_end = true;
                }
            }
        }

        if bbox.is_none() && span.is_none() {
            return;
        }
        self.extent = Extent {
            bbox: bbox.unwrap_or(WHOLE_EARTH_BBOX),
            start: if open_start { None } else { span.map(|(s, _)| s) },
            end: if open_end { None } else { span.map(|(_, e)| e) },
        };
    }
}

impl ItemNode {
    /// A generic item: no geometry, no bbox, empty property bag.
    pub fn new(id: impl Into<String>, datetime: DateTime<Utc>) -> Self {
        ItemNode {
            id: id.into(),
            geometry: None,
            bbox: None,
            datetime,
            properties: serde_json::Map::new(),
            assets: BTreeMap::new(),
            self_href: None,
        }
    }

    /// Item accepts Assets. Handed an Item or a Collection it absorbs only
    /// the descendant assets — structure is flattened away, never nested.
    pub fn attach(&mut self, element: Element) {
        match element {
            Element::Asset(asset) => {
                self.assets.insert(asset.title.clone(), asset);
            }
            Element::Item(item) => {
                self.assets.extend(item.assets);
            }
            Element::Collection(collection) => {
                self.assets.extend(collection.descendant_assets());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{asset, generic_item};

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    // =========================================================================
    // Attach rules
    // =========================================================================

    #[test]
    fn catalog_accepts_items_and_collections() {
        let mut catalog = CatalogNode::new("cat", "test");
        catalog.attach(Element::Item(generic_item("i1"))).unwrap();
        catalog
            .attach(Element::Collection(CollectionNode::new("c1", "")))
            .unwrap();
        assert_eq!(catalog.items.len(), 1);
        assert_eq!(catalog.collections.len(), 1);
    }

    #[test]
    fn catalog_rejects_bare_asset() {
        let mut catalog = CatalogNode::new("cat", "test");
        let err = catalog.attach(Element::Asset(asset("a.txt"))).unwrap_err();
        assert!(matches!(err, AttachError::AssetIntoCatalog { .. }));
        assert!(catalog.items.is_empty());
    }

    #[test]
    fn collection_stores_assets_by_title() {
        let mut col = CollectionNode::new("c", "");
        col.attach(Element::Asset(asset("a.txt")));
        col.attach(Element::Asset(asset("b.txt")));
        assert_eq!(col.assets.len(), 2);
        assert!(col.assets.contains_key("a.txt"));
    }

    #[test]
    fn collection_asset_keys_are_unique_later_wins() {
        let mut col = CollectionNode::new("c", "");
        let mut first = asset("a.txt");
        first.roles = vec!["data".into()];
        let mut second = asset("a.txt");
        second.roles = vec!["metadata".into()];
        col.attach(Element::Asset(first));
        col.attach(Element::Asset(second));
        assert_eq!(col.assets.len(), 1);
        assert_eq!(col.assets["a.txt"].roles, vec!["metadata".to_string()]);
    }

    #[test]
    fn item_absorbs_item_assets_not_structure() {
        let mut target = generic_item("target");
        let mut donor = generic_item("donor");
        donor.attach(Element::Asset(asset("x.txt")));
        target.attach(Element::Item(donor));
        assert_eq!(target.assets.len(), 1);
        assert!(target.assets.contains_key("x.txt"));
    }

    #[test]
    fn item_flattens_collection_assets_deeply() {
        let mut inner = CollectionNode::new("inner", "");
        inner.attach(Element::Asset(asset("deep.txt")));
        let mut sub_item = generic_item("sub");
        sub_item.attach(Element::Asset(asset("from-item.txt")));
        inner.attach(Element::Item(sub_item));

        let mut outer = CollectionNode::new("outer", "");
        outer.attach(Element::Asset(asset("shallow.txt")));
        outer.attach(Element::Collection(inner));

        let mut target = generic_item("target");
        target.attach(Element::Collection(outer));
        assert_eq!(target.assets.len(), 3);
        assert!(target.assets.contains_key("deep.txt"));
        assert!(target.assets.contains_key("from-item.txt"));
        assert!(target.assets.contains_key("shallow.txt"));
    }

    // =========================================================================
    // Emptiness
    // =========================================================================

    #[test]
    fn fresh_collection_is_empty() {
        assert!(CollectionNode::new("c", "").is_empty());
    }

    #[test]
    fn collection_with_only_subcollection_is_not_empty() {
        let mut col = CollectionNode::new("c", "");
        col.attach(Element::Collection(CollectionNode::new("sub", "")));
        assert!(!col.is_empty());
    }

    // =========================================================================
    // Extent recomputation
    // =========================================================================

    #[test]
    fn default_extent_is_whole_earth_open_time() {
        let extent = Extent::default();
        assert_eq!(extent.bbox, WHOLE_EARTH_BBOX);
        assert!(extent.start.is_none() && extent.end.is_none());
        assert!(extent.is_default());
    }

    #[test]
    fn extent_unions_item_bboxes() {
        let mut col = CollectionNode::new("c", "");
        let mut a = generic_item("a");
        a.bbox = Some([0.0, 0.0, 10.0, 10.0]);
        let mut b = generic_item("b");
        b.bbox = Some([-5.0, 2.0, 3.0, 20.0]);
        col.attach(Element::Item(a));
        col.attach(Element::Item(b));
        assert_eq!(col.extent.bbox, [-5.0, 0.0, 10.0, 20.0]);
    }

    #[test]
    fn extent_time_range_spans_item_datetimes() {
        let mut col = CollectionNode::new("c", "");
        let mut a = generic_item("a");
        a.datetime = utc("2020-01-01T00:00:00Z");
        let mut b = generic_item("b");
        b.datetime = utc("2022-06-15T12:00:00Z");
        col.attach(Element::Item(a));
        col.attach(Element::Item(b));
        assert_eq!(col.extent.start, Some(utc("2020-01-01T00:00:00Z")));
        assert_eq!(col.extent.end, Some(utc("2022-06-15T12:00:00Z")));
    }

    #[test]
    fn default_subcollection_extent_does_not_dilute_parent() {
        let mut parent = CollectionNode::new("p", "");
        let mut child = CollectionNode::new("child", "");
        let mut item = generic_item("i");
        item.bbox = Some([1.0, 1.0, 2.0, 2.0]);
        child.attach(Element::Item(item));
        parent.attach(Element::Collection(child));
        // Whole-earth default of a second, empty child must not widen this.
        parent.attach(Element::Collection(CollectionNode::new("empty", "")));
        assert_eq!(parent.extent.bbox, [1.0, 1.0, 2.0, 2.0]);
    }

    #[test]
    fn attaching_asset_leaves_extent_alone() {
        let mut col = CollectionNode::new("c", "");
        col.attach(Element::Asset(asset("a.txt")));
        assert!(col.extent.is_default());
    }
}
