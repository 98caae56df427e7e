//! Build-scoped diagnostics.
//!
//! Every build accumulates its own [`Diagnostics`] value instead of writing
//! to a process-wide logger. Events are typed, carry the path they concern,
//! and are rendered after the fact by the [`crate::output`] module. This
//! keeps the builder silent and testable: assertions run against recorded
//! events, not captured stderr.

use crate::product::ProductFamily;
use std::path::PathBuf;

/// One structured event recorded during a build.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildEvent {
    /// A path matched the ignore set; nothing under it was visited.
    Ignored { path: PathBuf },
    /// A folder was classified as a recognized product.
    ProductRecognized {
        path: PathBuf,
        family: ProductFamily,
        variant: String,
    },
    /// A manifest file existed but could not be read or parsed. The folder
    /// is handled as a plain folder; the build continues.
    ManifestUnreadable { path: PathBuf, detail: String },
    /// A folder matched a product naming convention but carried a
    /// family/level code outside the supported set.
    UnsupportedProductCode { path: PathBuf, code: String },
    /// A plain file was turned into a catalog element.
    FileAdded { path: PathBuf },
    /// An element could not be accepted by its target container and was
    /// dropped instead of corrupting the tree.
    ElementDropped { container: String, element: String },
    /// An asset's backing file disappeared before normalization; the entry
    /// was removed from its owning container.
    AssetPruned { title: String, source_path: PathBuf },
}

impl BuildEvent {
    /// Whether the event describes something a user should look at.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            BuildEvent::ManifestUnreadable { .. }
                | BuildEvent::UnsupportedProductCode { .. }
                | BuildEvent::ElementDropped { .. }
        )
    }
}

/// Accumulator for one build's events, in the order they occurred.
#[derive(Debug, Default)]
pub struct Diagnostics {
    events: Vec<BuildEvent>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: BuildEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BuildEvent] {
        &self.events
    }

    pub fn warnings(&self) -> impl Iterator<Item = &BuildEvent> {
        self.events.iter().filter(|e| e.is_warning())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_kept_in_order() {
        let mut diag = Diagnostics::new();
        diag.record(BuildEvent::Ignored { path: "a".into() });
        diag.record(BuildEvent::FileAdded { path: "b".into() });
        assert_eq!(diag.events().len(), 2);
        assert!(matches!(diag.events()[0], BuildEvent::Ignored { .. }));
    }

    #[test]
    fn warnings_filters_informational_events() {
        let mut diag = Diagnostics::new();
        diag.record(BuildEvent::FileAdded { path: "b".into() });
        diag.record(BuildEvent::UnsupportedProductCode {
            path: "l".into(),
            code: "08L102".into(),
        });
        diag.record(BuildEvent::AssetPruned {
            title: "a.txt".into(),
            source_path: "a.txt".into(),
        });
        assert_eq!(diag.warnings().count(), 1);
    }
}
