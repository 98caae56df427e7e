//! The recursive catalog-tree builder.
//!
//! One build walks a source tree top-down, classifies every folder and
//! file, and folds the results bottom-up into a single [`CatalogNode`].
//!
//! ## Per-directory decisions
//!
//! For each directory the builder decides, in order:
//!
//! 1. **Ignored?** Nothing under it is visited, no node is created.
//! 2. **Forced boundary?** A path in the forced-collection set opens a
//!    fresh Collection; one in the forced-item set opens a fresh Item.
//!    Otherwise the directory inherits its parent's container.
//! 3. **Recognized product?** The whole folder becomes exactly one Item
//!    built by the family-specific builder, and recursion stops —
//!    product detection is authoritative and terminal.
//! 4. Otherwise every child file goes through the generic leaf builder
//!    (honoring per-file forced boundaries) and every child directory
//!    recurses.
//!
//! ## Where things land
//!
//! ```text
//! source/                          → catalog root
//! ├── S1A_...GRDH....SAFE/         → one Sentinel-1 Item (no recursion)
//! ├── logs/          (forced col)  → Collection "logs"
//! │   └── run.txt                  →     asset in "logs"
//! ├── scene.tif                    → raster Item, generic "Files" collection
//! └── readme.md                    → asset, generic "Files" collection
//! ```
//!
//! Leaf elements outside any boundary collect in the shared generic
//! collection, which is attached to the catalog only if it ends up
//! non-empty. Product items outside any boundary attach to the catalog
//! root directly. Every node is attached to its final parent exactly once,
//! at the end of the recursive call that created it; nothing is moved
//! afterwards.

use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::catalog::{CatalogNode, CollectionNode, Element, ItemNode};
use crate::diag::{BuildEvent, Diagnostics};
use crate::families::{self, ProductError};
use crate::generic::{self, LeafError};
use crate::normalize;
use crate::pathset::PathSet;
use crate::product::{self, Recognition};
use crate::raster::{ExtensionProbe, RasterItemBuilder};

/// Identifier of the catch-all collection for files outside any boundary.
pub const GENERIC_COLLECTION_ID: &str = "Files";
const GENERIC_COLLECTION_DESCRIPTION: &str = "Collection of generic files";
const FORCED_COLLECTION_DESCRIPTION: &str = "Collection of files";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Leaf(#[from] LeafError),
    #[error("{0}")]
    Product(#[from] ProductError),
}

/// Arguments to one [`Generator::create`] run.
#[derive(Debug, Clone)]
pub struct CreateOptions {
    pub source_root: PathBuf,
    pub catalog_name: String,
    /// Catalog description; defaults to one derived from the source root.
    pub description: Option<String>,
    /// Specs (literal paths or glob patterns) forcing collection boundaries.
    pub collection_specs: Vec<String>,
    /// Specs forcing item boundaries.
    pub item_specs: Vec<String>,
    /// Specs excluding subtrees entirely.
    pub ignore_specs: Vec<String>,
    /// Public prefix prepended to every rewritten asset href.
    pub asset_prefix: String,
}

impl CreateOptions {
    pub fn new(source_root: impl Into<PathBuf>, catalog_name: impl Into<String>) -> Self {
        CreateOptions {
            source_root: source_root.into(),
            catalog_name: catalog_name.into(),
            description: None,
            collection_specs: Vec::new(),
            item_specs: Vec::new(),
            ignore_specs: Vec::new(),
            asset_prefix: "/".to_string(),
        }
    }
}

// ============================================================================
// Generator
// ============================================================================

/// Owns one catalog build from `create` through `save`.
pub struct Generator {
    catalog: Option<CatalogNode>,
    source_root: PathBuf,
    dest_root: PathBuf,
    asset_prefix: String,
    diagnostics: Diagnostics,
    raster: Box<dyn RasterItemBuilder>,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    pub fn new() -> Self {
        Self::with_raster_builder(Box::new(ExtensionProbe))
    }

    /// Swap the raster collaborator, mainly for tests and embedders with a
    /// real raster reader.
    pub fn with_raster_builder(raster: Box<dyn RasterItemBuilder>) -> Self {
        Generator {
            catalog: None,
            source_root: PathBuf::new(),
            dest_root: PathBuf::new(),
            asset_prefix: "/".to_string(),
            diagnostics: Diagnostics::new(),
            raster,
        }
    }

    /// Build the full catalog tree for `opts.source_root`, then run the
    /// prune and rewrite normalization passes over it.
    pub fn create(&mut self, opts: CreateOptions) -> Result<&CatalogNode, BuildError> {
        let ctx = BuildContext {
            collections: PathSet::resolve(&opts.collection_specs),
            items: PathSet::resolve(&opts.item_specs),
            ignore: PathSet::resolve(&opts.ignore_specs),
            raster: self.raster.as_ref(),
            build_time: Utc::now(),
        };
        self.diagnostics = Diagnostics::new();

        let source_name = opts
            .source_root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| opts.source_root.to_string_lossy().into_owned());
        let description = opts
            .description
            .clone()
            .unwrap_or_else(|| format!("STAC catalog for {source_name}"));
        let mut catalog = CatalogNode::new(&opts.catalog_name, description);
        let mut generic_collection =
            CollectionNode::new(GENERIC_COLLECTION_ID, GENERIC_COLLECTION_DESCRIPTION);

        let gathered = populate_dir(&ctx, &mut self.diagnostics, &opts.source_root)?;
        for element in gathered.containers {
            attach_or_drop(&mut catalog, element, &mut self.diagnostics);
        }
        for element in gathered.loose {
            generic_collection.attach(element);
        }
        if !generic_collection.is_empty() {
            attach_or_drop(
                &mut catalog,
                Element::Collection(generic_collection),
                &mut self.diagnostics,
            );
        }

        self.source_root = opts.source_root;
        self.dest_root = PathBuf::from(format!("stac_{}", opts.catalog_name.to_lowercase()));
        self.asset_prefix = opts.asset_prefix;

        normalize::prune(&mut catalog, &mut self.diagnostics);
        normalize::rewrite(
            &mut catalog,
            &self.source_root,
            &self.dest_root,
            &self.asset_prefix,
        );

        Ok(self.catalog.insert(catalog))
    }

    /// Persist the built catalog as a self-contained descriptor tree.
    ///
    /// `dest` and `prefix` override the values chosen at `create` time; the
    /// rewrite pass is re-applied (it is idempotent, so re-running it with
    /// unchanged arguments changes nothing). Calling this before `create`
    /// is caller misuse and fails with [`crate::persist::SaveError::NotBuilt`].
    pub fn save(
        &mut self,
        dest: Option<&Path>,
        prefix: Option<&str>,
    ) -> Result<PathBuf, crate::persist::SaveError> {
        if let Some(dest) = dest {
            self.dest_root = dest.to_path_buf();
        }
        if let Some(prefix) = prefix {
            self.asset_prefix = prefix.to_string();
        }
        let Some(catalog) = self.catalog.as_mut() else {
            return Err(crate::persist::SaveError::NotBuilt);
        };
        normalize::rewrite(catalog, &self.source_root, &self.dest_root, &self.asset_prefix);
        crate::persist::save(catalog, &self.dest_root)?;
        Ok(self.dest_root.clone())
    }

    pub fn catalog(&self) -> Option<&CatalogNode> {
        self.catalog.as_ref()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}

// ============================================================================
// Recursion
// ============================================================================

struct BuildContext<'a> {
    collections: PathSet,
    items: PathSet,
    ignore: PathSet,
    raster: &'a dyn RasterItemBuilder,
    build_time: DateTime<Utc>,
}

/// A fresh container opened by a forced boundary.
enum Boundary {
    Collection(CollectionNode),
    Item(ItemNode),
}

impl Boundary {
    fn attach(&mut self, element: Element) {
        match self {
            Boundary::Collection(collection) => collection.attach(element),
            Boundary::Item(item) => item.attach(element),
        }
    }

    fn into_element(self) -> Element {
        match self {
            Boundary::Collection(collection) => Element::Collection(collection),
            Boundary::Item(item) => Element::Item(item),
        }
    }
}

/// What one recursive call hands back to its caller.
///
/// `containers` are finished nodes — forced boundaries and product items —
/// destined for the enclosing container, or the catalog root if there is
/// none. `loose` are plain leaf elements destined for the enclosing
/// container, or the shared generic collection if there is none.
#[derive(Default)]
struct Gathered {
    containers: Vec<Element>,
    loose: Vec<Element>,
}

impl Gathered {
    fn merge(&mut self, other: Gathered) {
        self.containers.extend(other.containers);
        self.loose.extend(other.loose);
    }
}

/// Ignore wins over forced membership: a path in both sets produces
/// nothing. Collection boundaries take precedence over item boundaries.
fn boundary_for(ctx: &BuildContext<'_>, path: &Path) -> Option<Boundary> {
    let base_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    if ctx.collections.contains(path) {
        Some(Boundary::Collection(CollectionNode::new(
            base_name,
            FORCED_COLLECTION_DESCRIPTION,
        )))
    } else if ctx.items.contains(path) {
        Some(Boundary::Item(ItemNode::new(base_name, ctx.build_time)))
    } else {
        None
    }
}

fn populate_dir(
    ctx: &BuildContext<'_>,
    diag: &mut Diagnostics,
    dir: &Path,
) -> Result<Gathered, BuildError> {
    if ctx.ignore.contains(dir) {
        diag.record(BuildEvent::Ignored {
            path: dir.to_path_buf(),
        });
        return Ok(Gathered::default());
    }

    let mut boundary = boundary_for(ctx, dir);

    match product::recognize(dir, diag)? {
        Recognition::Product { family, variant } => {
            diag.record(BuildEvent::ProductRecognized {
                path: dir.to_path_buf(),
                family,
                variant: variant.clone(),
            });
            let item = families::create_item(family, &variant, dir)?;
            let element = match boundary {
                Some(mut node) => {
                    node.attach(Element::Item(item));
                    node.into_element()
                }
                None => Element::Item(item),
            };
            return Ok(Gathered {
                containers: vec![element],
                loose: Vec::new(),
            });
        }
        Recognition::NotProduct => {}
    }

    let mut gathered = Gathered::default();
    for entry in collect_entries(dir)? {
        if ctx.ignore.contains(&entry) {
            diag.record(BuildEvent::Ignored { path: entry });
            continue;
        }
        if entry.is_dir() {
            gathered.merge(populate_dir(ctx, diag, &entry)?);
        } else if entry.is_file() {
            let leaf = generic::build_leaf(&entry, ctx.raster)?;
            diag.record(BuildEvent::FileAdded {
                path: entry.clone(),
            });
            match boundary_for(ctx, &entry) {
                Some(mut file_boundary) => {
                    file_boundary.attach(leaf);
                    gathered.containers.push(file_boundary.into_element());
                }
                None => gathered.loose.push(leaf),
            }
        }
    }

    Ok(match boundary.take() {
        Some(mut node) => {
            for element in gathered.containers {
                node.attach(element);
            }
            for element in gathered.loose {
                node.attach(element);
            }
            Gathered {
                containers: vec![node.into_element()],
                loose: Vec::new(),
            }
        }
        None => gathered,
    })
}

/// Direct children of `dir`, sorted by name. The listing order the OS
/// hands back is not guaranteed stable, and sibling order must not affect
/// correctness — sorting just keeps logs and descriptors deterministic.
fn collect_entries(dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .collect();
    entries.sort();
    Ok(entries)
}

/// Catalog-root attach with the lenient drop policy: an element the root
/// cannot hold is recorded and dropped rather than failing the build.
fn attach_or_drop(catalog: &mut CatalogNode, element: Element, diag: &mut Diagnostics) {
    let description = element.describe();
    if catalog.attach(element).is_err() {
        diag.record(BuildEvent::ElementDropped {
            container: format!("catalog {}", catalog.id),
            element: description,
        });
    }
}
