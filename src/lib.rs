//! # stacwalk
//!
//! Build STAC-style catalogs from directory trees of remote-sensing
//! products. Your filesystem is the data source: recognized product
//! folders become Items, forced boundaries become Collections, and every
//! other file becomes a generic Asset with a media type and timestamp.
//!
//! # Architecture: Build, Normalize, Persist
//!
//! A build runs three phases over one in-memory tree:
//!
//! ```text
//! 1. Build      source/   →  CatalogNode     (recursive walk + classification)
//! 2. Normalize  catalog   →  catalog         (prune dangling assets, rewrite hrefs)
//! 3. Persist    catalog   →  stac_<name>/    (one JSON descriptor per node)
//! ```
//!
//! The build phase is a single depth-first recursion: per directory it
//! checks the ignore set, opens a forced Collection/Item boundary if one
//! applies, asks the product recognizer whether the whole folder is one
//! product, and otherwise descends. Results fold upward — every node is
//! attached to its final parent exactly once, when the recursive call that
//! created it returns. There is no parallelism and no incremental mode;
//! the whole tree is materialized before normalization runs, so peak
//! memory is proportional to catalog size.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`builder`] | The recursive catalog-tree builder and [`Generator`] entry points |
//! | [`catalog`] | The four node kinds and the attach dispatch between them |
//! | [`product`] | Product folder recognition (Sentinel-1/2 manifests, Landsat naming) |
//! | [`families`] | Per-family product Item builders behind one narrow interface |
//! | [`generic`] | Generic leaf builder: raster Item or minimal Asset fallback |
//! | [`raster`] | The raster collaborator seam and its default probe |
//! | [`pathset`] | Literal/glob path spec expansion for forced and ignored paths |
//! | [`normalize`] | Post-build prune and rewrite passes |
//! | [`persist`] | Self-contained descriptor serialization |
//! | [`media`] | Well-known media types by extension |
//! | [`diag`] | Build-scoped structured diagnostics |
//! | [`output`] | CLI rendering of catalogs and diagnostics |
//! | [`config`] | `catalog.toml` build profiles |
//!
//! # Design Decisions
//!
//! ## Closed Element Dispatch
//!
//! "Attach element to container" is an exhaustive match over a closed
//! [`Element`] enum per container kind, not open-ended type inspection.
//! Adding a new element kind refuses to compile until every attach rule
//! handles it. The one impossible pair — a bare Asset at the catalog root —
//! surfaces as a recoverable error; the builder logs and drops it rather
//! than corrupting the tree.
//!
//! ## Diagnostics as Data
//!
//! The builder never writes to a process-wide logger. Each build fills a
//! [`Diagnostics`] value with typed events (classification outcomes,
//! drops, prunes) that the CLI renders afterwards and tests assert on
//! directly.
//!
//! ## Source Paths Survive Rewriting
//!
//! Assets keep their build-time `source_path` forever; the public `href`
//! is recomputed from it on every rewrite. That makes the rewrite pass
//! idempotent, lets the prefix change between `create` and `save`, and
//! gives the prune pass a location to check that no rewrite can corrupt.
//!
//! # Example
//!
//! ```no_run
//! use stacwalk::{CreateOptions, Generator};
//!
//! let mut generator = Generator::new();
//! let mut opts = CreateOptions::new("data", "Mission Archive");
//! opts.collection_specs = vec!["data/logs".into()];
//! opts.ignore_specs = vec!["data/tmp/**".into()];
//! generator.create(opts)?;
//! generator.save(None, Some("/public/archive"))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod catalog;
pub mod config;
pub mod diag;
pub mod families;
pub mod generic;
pub mod media;
pub mod normalize;
pub mod output;
pub mod pathset;
pub mod persist;
pub mod product;
pub mod raster;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use builder::{BuildError, CreateOptions, Generator, GENERIC_COLLECTION_ID};
pub use catalog::{AssetNode, CatalogNode, CollectionNode, Element, Extent, ItemNode};
pub use diag::{BuildEvent, Diagnostics};
pub use persist::SaveError;
pub use product::{ProductFamily, Recognition};
