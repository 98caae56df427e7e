//! Media type lookup for catalog assets.
//!
//! A small closed set of well-known media types, keyed by file extension.
//! Extensions outside the table get a best-effort guess from a second,
//! looser table; anything else is `None` — an asset without a media type
//! is still valid, consumers just can't negotiate on it.

use serde::{Serialize, Serializer};
use std::fmt;
use std::path::Path;

/// Well-known asset media types.
///
/// The variants cover the formats the catalog commonly references. The
/// GeoTIFF variant carries the STAC-conventional parameterized MIME string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Json,
    Text,
    Pdf,
    Xml,
    Html,
    Yaml,
    Csv,
    Geotiff,
    Jp2,
    Jpeg,
    Png,
    Zip,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Json => "application/json",
            MediaType::Text => "text/plain",
            MediaType::Pdf => "application/pdf",
            MediaType::Xml => "application/xml",
            MediaType::Html => "text/html",
            MediaType::Yaml => "text/yaml",
            MediaType::Csv => "text/csv",
            MediaType::Geotiff => "image/tiff; application=geotiff",
            MediaType::Jp2 => "image/jp2",
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
            MediaType::Zip => "application/zip",
        }
    }

    /// Look up an extension (without the dot, any case) in the fixed table
    /// of well-known types. This is the authoritative mapping; [`guess`]
    /// falls back to a looser one.
    pub fn from_extension(ext: &str) -> Option<MediaType> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(MediaType::Json),
            "txt" | "text" => Some(MediaType::Text),
            "pdf" => Some(MediaType::Pdf),
            "xml" => Some(MediaType::Xml),
            "htm" | "html" => Some(MediaType::Html),
            "yaml" | "yml" => Some(MediaType::Yaml),
            "csv" => Some(MediaType::Csv),
            _ => None,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MediaType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Best-effort media type for a path: fixed table first, then a guess
/// from common raster/archive extensions. `None` when nothing matches.
pub fn guess(path: &Path) -> Option<MediaType> {
    let ext = path.extension()?.to_string_lossy();
    MediaType::from_extension(&ext).or_else(|| match ext.to_ascii_lowercase().as_str() {
        "tif" | "tiff" => Some(MediaType::Geotiff),
        "jp2" => Some(MediaType::Jp2),
        "jpg" | "jpeg" => Some(MediaType::Jpeg),
        "png" => Some(MediaType::Png),
        "zip" => Some(MediaType::Zip),
        _ => None,
    })
}
