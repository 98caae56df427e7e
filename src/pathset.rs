//! Expansion of user-supplied path specifications into concrete path sets.
//!
//! A specification is either a literal path or a glob pattern (recursive
//! `**` supported). Three independent sets drive a build: forced-collection
//! paths, forced-item paths, and ignore paths. A spec that is malformed or
//! matches nothing contributes nothing — never an error.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A resolved set of concrete filesystem paths.
#[derive(Debug, Default, Clone)]
pub struct PathSet {
    paths: HashSet<PathBuf>,
}

impl PathSet {
    /// Expand a list of specs against the filesystem.
    ///
    /// Glob patterns contribute every match; a spec that names an existing
    /// path is honored as-is even when the glob walk misses it (patterns
    /// with special characters in their literal name fall in this bucket).
    /// Duplicates across specs collapse by set semantics.
    pub fn resolve(specs: &[String]) -> PathSet {
        let mut paths = HashSet::new();
        for spec in specs {
            if let Ok(matches) = glob::glob(spec) {
                for path in matches.flatten() {
                    paths.insert(path);
                }
            }
            let literal = PathBuf::from(spec);
            if literal.exists() {
                paths.insert(literal);
            }
        }
        PathSet { paths }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }
}
