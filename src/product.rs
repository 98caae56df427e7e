//! Product folder recognition.
//!
//! Decides whether a directory is a self-contained satellite product —
//! in which case the whole folder becomes exactly one Item and recursion
//! stops — or a generic folder to descend into. Detection is by folder
//! name plus a well-known metadata file, evaluated in priority order,
//! first match wins:
//!
//! 1. `S1*` + `manifest.safe` whose first `productType` element reads
//!    `GRD` or `SLC` → Sentinel-1.
//! 2. `S2*` + `manifest.safe` carrying a `unitType="Product_Level-2A"`
//!    (else `-1C`) attribute → Sentinel-2.
//! 3. A seven-field underscore name starting `L` whose family/level code
//!    matches the supported Landsat Collection 2 set, with an `*MTL.xml`
//!    metadata file in the folder → Landsat.
//!
//! Classification is side-effect free apart from manifest reads. A missing
//! or unparseable manifest is a classification miss, never an error: the
//! folder is handled as a plain folder and the miss lands in diagnostics.

use regex::Regex;
use std::fmt;
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::diag::{BuildEvent, Diagnostics};

/// Name of the SAFE-format manifest carried by Sentinel product folders.
pub const SAFE_MANIFEST: &str = "manifest.safe";

/// Landsat Collection 2 family/level codes this recognizer accepts:
/// Landsat 1–5 Level-1, or Landsat 4, 5, 7, 9 Level-2 scene data.
const LANDSAT_CODE_PATTERN: &str = r"^(0[1-5]L102|0[4579]L202)";

/// Supported product families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductFamily {
    Sentinel1,
    Sentinel2,
    Landsat,
}

impl fmt::Display for ProductFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProductFamily::Sentinel1 => "S1",
            ProductFamily::Sentinel2 => "S2",
            ProductFamily::Landsat => "LANDSAT",
        })
    }
}

/// Outcome of classifying one directory.
#[derive(Debug, Clone, PartialEq)]
pub enum Recognition {
    Product {
        family: ProductFamily,
        variant: String,
    },
    NotProduct,
}

/// Classify `dir`. IO failure on the directory listing itself propagates;
/// manifest trouble is downgraded to a recorded miss.
pub fn recognize(dir: &Path, diag: &mut Diagnostics) -> io::Result<Recognition> {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut file_names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.path().is_file() {
            file_names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    file_names.sort();
    let has_manifest = file_names.iter().any(|f| f == SAFE_MANIFEST);

    if name.starts_with("S1") && has_manifest {
        let manifest = dir.join(SAFE_MANIFEST);
        match scan_xml(&manifest, &["productType"]) {
            Ok(scan) => {
                if let Some(product_type) = scan.texts("productType").into_iter().next() {
                    if product_type == "GRD" || product_type == "SLC" {
                        return Ok(Recognition::Product {
                            family: ProductFamily::Sentinel1,
                            variant: product_type,
                        });
                    }
                }
            }
            Err(err) => diag.record(BuildEvent::ManifestUnreadable {
                path: manifest,
                detail: err.to_string(),
            }),
        }
    }

    if name.starts_with("S2") && has_manifest {
        let manifest = dir.join(SAFE_MANIFEST);
        match scan_xml(&manifest, &[]) {
            Ok(scan) => {
                for level in ["Product_Level-2A", "Product_Level-1C"] {
                    if scan.unit_types.iter().any(|u| u == level) {
                        let variant = level.trim_start_matches("Product_Level-");
                        return Ok(Recognition::Product {
                            family: ProductFamily::Sentinel2,
                            variant: format!("L{variant}"),
                        });
                    }
                }
            }
            Err(err) => diag.record(BuildEvent::ManifestUnreadable {
                path: manifest,
                detail: err.to_string(),
            }),
        }
    }

    let fields: Vec<&str> = name.split('_').collect();
    if fields.len() == 7 && fields[0].starts_with('L') {
        let code = format!(
            "{}{}{}",
            fields[0].get(2..).unwrap_or(""),
            fields[1].get(..2).unwrap_or(fields[1]),
            fields[5]
        );
        let accepted = Regex::new(LANDSAT_CODE_PATTERN)
            .map(|re| re.is_match(&code))
            .unwrap_or(false);
        if accepted {
            if let Some(mtl) = file_names
                .iter()
                .find(|f| f.to_lowercase().ends_with("mtl.xml"))
            {
                return Ok(Recognition::Product {
                    family: ProductFamily::Landsat,
                    variant: mtl.clone(),
                });
            }
        } else {
            diag.record(BuildEvent::UnsupportedProductCode {
                path: dir.to_path_buf(),
                code,
            });
            return Ok(Recognition::NotProduct);
        }
    }

    Ok(Recognition::NotProduct)
}

// ============================================================================
// Manifest scanning
// ============================================================================

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed XML: {0}")]
    Xml(String),
}

/// Fields harvested from one pass over an XML metadata file: text content
/// of requested element local names (namespace prefixes ignored), and every
/// `unitType` attribute value seen anywhere in the document.
#[derive(Debug, Default)]
pub(crate) struct XmlScan {
    texts: Vec<(String, String)>,
    pub(crate) unit_types: Vec<String>,
}

impl XmlScan {
    /// Text values collected for one element local name, in document order.
    pub(crate) fn texts(&self, local_name: &str) -> Vec<String> {
        self.texts
            .iter()
            .filter(|(name, _)| name == local_name)
            .map(|(_, text)| text.clone())
            .collect()
    }
}

/// Single streaming pass over `path` collecting the fields [`XmlScan`]
/// describes. Any reader or syntax error is one [`ManifestError`]; callers
/// decide whether that is fatal (it never is during recognition).
pub(crate) fn scan_xml(path: &Path, wanted: &[&str]) -> Result<XmlScan, ManifestError> {
    use quick_xml::events::Event;

    let xml = std::fs::read_to_string(path)?;
    let mut reader = quick_xml::Reader::from_str(&xml);
    let mut scan = XmlScan::default();
    let mut capture: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                let local = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                collect_unit_type(&start, &mut scan)?;
                if wanted.contains(&local.as_str()) {
                    capture = Some(local);
                }
            }
            Ok(Event::Empty(empty)) => {
                collect_unit_type(&empty, &mut scan)?;
            }
            Ok(Event::Text(text)) => {
                if let Some(name) = capture.take() {
                    let value = String::from_utf8_lossy(text.as_ref()).trim().to_string();
                    if value.is_empty() {
                        capture = Some(name);
                    } else {
                        scan.texts.push((name, value));
                    }
                }
            }
            Ok(Event::End(_)) => {
                capture = None;
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(ManifestError::Xml(err.to_string())),
            Ok(_) => {}
        }
    }
    Ok(scan)
}

fn collect_unit_type(
    element: &quick_xml::events::BytesStart<'_>,
    scan: &mut XmlScan,
) -> Result<(), ManifestError> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| ManifestError::Xml(e.to_string()))?;
        if attr.key.local_name().as_ref() == b"unitType" {
            scan.unit_types
                .push(String::from_utf8_lossy(&attr.value).into_owned());
        }
    }
    Ok(())
}
