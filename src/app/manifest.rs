//! Extension manifest extraction
//!
//! An extension package zip carries an `extension.json` at its root. The
//! uploader only needs the package name and platform from it, which
//! identify the package on the server.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::app::models::ExtensionPackageManifest;
use crate::constants::package;
use crate::errors::{ManifestError, ManifestResult};

/// Read and validate the manifest of the extension package at `zip_path`
///
/// # Errors
///
/// Returns `ManifestError` if the archive cannot be read, has no
/// `extension.json`, or the manifest lacks a name or platform.
pub fn read_manifest(zip_path: &Path) -> ManifestResult<ExtensionPackageManifest> {
    let file = File::open(zip_path).map_err(|e| ManifestError::Unreadable {
        reason: e.to_string(),
    })?;

    let mut archive = ZipArchive::new(file).map_err(|e| ManifestError::Unreadable {
        reason: e.to_string(),
    })?;

    let mut entry = match archive.by_name(package::MANIFEST_ENTRY) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Err(ManifestError::MissingManifest),
        Err(e) => {
            return Err(ManifestError::Unreadable {
                reason: e.to_string(),
            })
        }
    };

    let mut content = Vec::with_capacity(manifest_capacity(entry.size()));
    entry
        .by_ref()
        .take(package::MAX_MANIFEST_BYTES + 1)
        .read_to_end(&mut content)
        .map_err(|e| ManifestError::Unreadable {
            reason: e.to_string(),
        })?;
    if content.len() as u64 > package::MAX_MANIFEST_BYTES {
        return Err(ManifestError::Unreadable {
            reason: format!(
                "{} is larger than {} bytes.",
                package::MANIFEST_ENTRY,
                package::MAX_MANIFEST_BYTES
            ),
        });
    }

    let manifest = parse_manifest(&content)?;
    debug!(
        "Read manifest for {} ({}) from {}",
        manifest.name,
        manifest.platform,
        zip_path.display()
    );
    Ok(manifest)
}

/// Parse manifest JSON and require the fields that identify the package
pub fn parse_manifest(content: &[u8]) -> ManifestResult<ExtensionPackageManifest> {
    let manifest: ExtensionPackageManifest = serde_json::from_slice(content)?;

    if manifest.name.trim().is_empty() {
        return Err(ManifestError::MissingField { field: "name" });
    }
    if manifest.platform.trim().is_empty() {
        return Err(ManifestError::MissingField { field: "platform" });
    }

    Ok(manifest)
}

/// Allocation hint for the manifest; the size in the archive header is not trusted
fn manifest_capacity(declared: u64) -> usize {
    declared.min(package::MAX_MANIFEST_BYTES) as usize
}
