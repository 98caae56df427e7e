//! CLI output formatting.
//!
//! Each concern has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.
//!
//! Display is information-first: every node leads with its kind and
//! identifier, with counts as context, indented one level per tree depth.
//!
//! ```text
//! Catalog Files Folder Catalog
//!     Collection logs (1 asset)
//!         run.txt
//!     Collection Files (1 asset, 1 item)
//!         Item scene (1 asset)
//!         readme.md
//! Cataloged 2 collections, 1 item, 3 assets
//! ```

use crate::catalog::{CatalogNode, CollectionNode, ItemNode};
use crate::diag::{BuildEvent, Diagnostics};

/// 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// "1 asset", "2 assets, 1 item", "" — only non-zero counts are shown.
fn count_summary(assets: usize, items: usize, collections: usize) -> String {
    let mut parts = Vec::new();
    for (count, noun) in [(assets, "asset"), (items, "item"), (collections, "collection")] {
        match count {
            0 => {}
            1 => parts.push(format!("1 {noun}")),
            n => parts.push(format!("{n} {noun}s")),
        }
    }
    parts.join(", ")
}

struct Totals {
    collections: usize,
    items: usize,
    assets: usize,
}

// ============================================================================
// Catalog structure
// ============================================================================

/// Format the built catalog as an indented tree.
pub fn format_catalog_output(catalog: &CatalogNode) -> Vec<String> {
    let mut lines = vec![format!("Catalog {}", catalog.id)];
    let mut totals = Totals {
        collections: 0,
        items: 0,
        assets: 0,
    };

    for collection in &catalog.collections {
        format_collection(collection, 1, &mut lines, &mut totals);
    }
    for item in &catalog.items {
        format_item(item, 1, &mut lines, &mut totals);
    }

    let summary = count_summary(totals.assets, totals.items, totals.collections);
    if summary.is_empty() {
        lines.push("Cataloged nothing".to_string());
    } else {
        lines.push(format!("Cataloged {summary}"));
    }
    lines
}

fn format_collection(
    collection: &CollectionNode,
    depth: usize,
    lines: &mut Vec<String>,
    totals: &mut Totals,
) {
    totals.collections += 1;
    let counts = count_summary(
        collection.assets.len(),
        collection.items.len(),
        collection.collections.len(),
    );
    let header = if counts.is_empty() {
        format!("Collection {}", collection.id)
    } else {
        format!("Collection {} ({counts})", collection.id)
    };
    lines.push(format!("{}{header}", indent(depth)));

    for sub in &collection.collections {
        format_collection(sub, depth + 1, lines, totals);
    }
    for item in &collection.items {
        format_item(item, depth + 1, lines, totals);
    }
    for title in collection.assets.keys() {
        totals.assets += 1;
        lines.push(format!("{}{title}", indent(depth + 1)));
    }
}

fn format_item(item: &ItemNode, depth: usize, lines: &mut Vec<String>, totals: &mut Totals) {
    totals.items += 1;
    totals.assets += item.assets.len();
    let counts = count_summary(item.assets.len(), 0, 0);
    let header = if counts.is_empty() {
        format!("Item {}", item.id)
    } else {
        format!("Item {} ({counts})", item.id)
    };
    lines.push(format!("{}{header}", indent(depth)));
}

/// Print catalog structure to stdout.
pub fn print_catalog_output(catalog: &CatalogNode) {
    for line in format_catalog_output(catalog) {
        println!("{}", line);
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Format recorded build events worth a user's attention: warnings first,
/// then pruned assets. Returns an empty list when there is nothing to say.
pub fn format_diagnostics(diag: &Diagnostics) -> Vec<String> {
    let mut lines = Vec::new();

    let warnings: Vec<String> = diag.warnings().map(describe_event).collect();
    if !warnings.is_empty() {
        lines.push("Warnings".to_string());
        for warning in warnings {
            lines.push(format!("    {warning}"));
        }
    }

    let pruned: Vec<String> = diag
        .events()
        .iter()
        .filter(|e| matches!(e, BuildEvent::AssetPruned { .. }))
        .map(describe_event)
        .collect();
    if !pruned.is_empty() {
        lines.push("Pruned".to_string());
        for line in pruned {
            lines.push(format!("    {line}"));
        }
    }

    lines
}

fn describe_event(event: &BuildEvent) -> String {
    match event {
        BuildEvent::Ignored { path } => format!("{} ignored", path.display()),
        BuildEvent::ProductRecognized {
            path,
            family,
            variant,
        } => format!("{} recognized as {family} {variant}", path.display()),
        BuildEvent::ManifestUnreadable { path, detail } => {
            format!(
                "{} unreadable ({detail}), treated as plain folder",
                path.display()
            )
        }
        BuildEvent::UnsupportedProductCode { path, code } => format!(
            "{} matches Landsat naming but code {code} is unsupported; handled as plain folder",
            path.display()
        ),
        BuildEvent::FileAdded { path } => format!("{} added", path.display()),
        BuildEvent::ElementDropped { container, element } => {
            format!("{element} could not be added to {container} and was dropped")
        }
        BuildEvent::AssetPruned { title, source_path } => {
            format!("{title} ({} no longer exists)", source_path.display())
        }
    }
}

/// Print diagnostics to stdout.
pub fn print_diagnostics(diag: &Diagnostics) {
    for line in format_diagnostics(diag) {
        println!("{}", line);
    }
}
