//! Post-build normalization: the prune and rewrite passes.
//!
//! Both run over the completed tree, never incrementally. Prune removes
//! asset entries whose backing file has disappeared since it was scanned —
//! files deleted mid-build are tolerated this way. Rewrite assigns every
//! node its canonical descriptor location under the destination root and
//! turns every asset href into a public path: a configurable prefix plus
//! the asset's path relative to the source root.
//!
//! Rewrite recomputes hrefs from [`AssetNode::source_path`] every time, so
//! re-running it — with the same prefix or a different one — always lands
//! on the same answer for the same inputs.
//!
//! [`AssetNode::source_path`]: crate::catalog::AssetNode::source_path

use std::path::{Component, Path};

use crate::catalog::{CatalogNode, CollectionNode, ItemNode};
use crate::diag::{BuildEvent, Diagnostics};

// ============================================================================
// Prune
// ============================================================================

/// Remove asset entries whose backing file no longer exists. Containers
/// stay in place even when emptied. Returns the number of removed entries.
pub fn prune(catalog: &mut CatalogNode, diag: &mut Diagnostics) -> usize {
    let mut removed = 0;
    for collection in &mut catalog.collections {
        prune_collection(collection, diag, &mut removed);
    }
    for item in &mut catalog.items {
        prune_item(item, diag, &mut removed);
    }
    removed
}

fn prune_collection(collection: &mut CollectionNode, diag: &mut Diagnostics, removed: &mut usize) {
    prune_assets(&mut collection.assets, diag, removed);
    for item in &mut collection.items {
        prune_item(item, diag, removed);
    }
    for sub in &mut collection.collections {
        prune_collection(sub, diag, removed);
    }
}

fn prune_item(item: &mut ItemNode, diag: &mut Diagnostics, removed: &mut usize) {
    prune_assets(&mut item.assets, diag, removed);
}

fn prune_assets(
    assets: &mut std::collections::BTreeMap<String, crate::catalog::AssetNode>,
    diag: &mut Diagnostics,
    removed: &mut usize,
) {
    assets.retain(|_, asset| {
        let keep = asset.source_path.exists();
        if !keep {
            diag.record(BuildEvent::AssetPruned {
                title: asset.title.clone(),
                source_path: asset.source_path.clone(),
            });
            *removed += 1;
        }
        keep
    });
}

// ============================================================================
// Rewrite
// ============================================================================

/// Assign canonical descriptor locations and public asset hrefs.
///
/// Layout under `dest_root` mirrors the tree: `catalog.json` at the root,
/// `<id>/collection.json` per collection, `<id>/<id>.json` per item, each
/// nested inside its parent's directory.
pub fn rewrite(catalog: &mut CatalogNode, source_root: &Path, dest_root: &Path, prefix: &str) {
    catalog.self_href = Some(dest_root.join("catalog.json"));
    for collection in &mut catalog.collections {
        rewrite_collection(collection, source_root, dest_root, prefix);
    }
    for item in &mut catalog.items {
        rewrite_item(item, source_root, dest_root, prefix);
    }
}

fn rewrite_collection(
    collection: &mut CollectionNode,
    source_root: &Path,
    parent_dir: &Path,
    prefix: &str,
) {
    let dir = parent_dir.join(&collection.id);
    collection.self_href = Some(dir.join("collection.json"));
    for asset in collection.assets.values_mut() {
        asset.href = public_href(&asset.source_path, source_root, prefix);
    }
    for item in &mut collection.items {
        rewrite_item(item, source_root, &dir, prefix);
    }
    for sub in &mut collection.collections {
        rewrite_collection(sub, source_root, &dir, prefix);
    }
}

fn rewrite_item(item: &mut ItemNode, source_root: &Path, parent_dir: &Path, prefix: &str) {
    let dir = parent_dir.join(&item.id);
    item.self_href = Some(dir.join(format!("{}.json", item.id)));
    for asset in item.assets.values_mut() {
        asset.href = public_href(&asset.source_path, source_root, prefix);
    }
}

/// `prefix` + `/` + path relative to the source root, slash-separated.
/// An asset outside the source root keeps only its file name — it has no
/// meaningful relative location under the catalog.
fn public_href(source_path: &Path, source_root: &Path, prefix: &str) -> String {
    let rel = source_path
        .strip_prefix(source_root)
        .map(slash_join)
        .unwrap_or_else(|_| {
            source_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
    format!("{}/{}", prefix.trim_end_matches('/'), rel)
}

fn slash_join(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
