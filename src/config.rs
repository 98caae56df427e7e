//! Build profile configuration.
//!
//! A `catalog.toml` file can hold everything the `build` and `check`
//! commands would otherwise take as flags: catalog name and description,
//! forced collection/item specs, ignore specs, destination, asset prefix.
//! CLI flags always win over file values; the file exists so recurring
//! builds don't need a shell script.
//!
//! ```toml
//! name = "Mission Archive"
//! collections = ["data/logs"]
//! ignore = ["data/tmp/**"]
//! asset-prefix = "/public/archive"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// One build's worth of settings, all optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct BuildProfile {
    /// Catalog identifier.
    pub name: Option<String>,
    /// Catalog description.
    pub description: Option<String>,
    /// Destination directory for descriptors.
    pub destination: Option<PathBuf>,
    /// Public prefix for rewritten asset hrefs.
    pub asset_prefix: Option<String>,
    /// Paths/globs forced to be collections.
    pub collections: Vec<String>,
    /// Paths/globs forced to be items.
    pub items: Vec<String>,
    /// Paths/globs excluded entirely.
    pub ignore: Vec<String>,
}

/// Load a profile from a TOML file.
pub fn load_profile(path: &Path) -> Result<BuildProfile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// A documented stock `catalog.toml`, printed by `stacwalk gen-config`.
pub fn stock_profile_toml() -> &'static str {
    r#"# stacwalk build profile
#
# Everything here is optional and can be overridden on the command line.

# Catalog identifier and description.
#name = "Catalog"
#description = "STAC catalog for my archive"

# Where descriptor files are written. Defaults to stac_<name, lowercased>.
#destination = "stac_catalog"

# Public prefix prepended to every asset href after rewriting.
#asset-prefix = "/"

# Paths or glob patterns (recursive ** supported) that force a boundary:
# a matching folder or file becomes its own Collection or Item instead of
# being folded into its surroundings.
#collections = ["data/logs"]
#items = ["data/logs/extra_logs"]

# Paths or glob patterns excluded from the build entirely.
#ignore = ["data/tmp/**"]
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn empty_file_is_all_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.toml");
        fs::write(&path, "").unwrap();
        assert_eq!(load_profile(&path).unwrap(), BuildProfile::default());
    }

    #[test]
    fn full_profile_round_trips() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.toml");
        fs::write(
            &path,
            r#"
name = "Archive"
description = "everything"
destination = "out/stac"
asset-prefix = "/public"
collections = ["data/logs"]
items = ["data/special.txt"]
ignore = ["data/tmp/**"]
"#,
        )
        .unwrap();

        let profile = load_profile(&path).unwrap();
        assert_eq!(profile.name.as_deref(), Some("Archive"));
        assert_eq!(profile.destination.as_deref(), Some(Path::new("out/stac")));
        assert_eq!(profile.asset_prefix.as_deref(), Some("/public"));
        assert_eq!(profile.collections, vec!["data/logs".to_string()]);
        assert_eq!(profile.ignore, vec!["data/tmp/**".to_string()]);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.toml");
        fs::write(&path, "nmae = \"typo\"\n").unwrap();
        assert!(matches!(load_profile(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            load_profile(Path::new("/no/such/catalog.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn stock_config_parses_clean() {
        let profile: BuildProfile = toml::from_str(stock_profile_toml()).unwrap();
        assert_eq!(profile, BuildProfile::default());
    }
}
