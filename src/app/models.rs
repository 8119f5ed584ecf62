//! Data models for extension packages
//!
//! Covers the manifest read from the zip and the subset of the Reactor
//! JSON:API resources the uploader needs to drive lookup, upload and polling.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::reactor;

/// Identity of an extension package as declared in its `extension.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionPackageManifest {
    /// Extension package name
    #[serde(default)]
    pub name: String,
    /// Target platform (e.g. `web`, `mobile`, `edge`)
    #[serde(default)]
    pub platform: String,
}

/// Extension package resource as returned by Reactor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionPackageRecord {
    pub id: String,
    #[serde(default)]
    pub attributes: PackageAttributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<PackageMeta>,
}

/// Attributes of an extension package resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageAttributes {
    /// Deployment stage, e.g. `development`, `private`, `public`
    #[serde(default)]
    pub availability: Option<String>,
    /// Processing status, e.g. `pending`, `succeeded`, `failed`
    #[serde(default)]
    pub status: Option<String>,
}

/// Resource metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMeta {
    #[serde(default)]
    pub status_details: Option<StatusDetails>,
}

/// Processing details attached to a failed package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDetails {
    #[serde(default)]
    pub errors: Vec<ReactorErrorEntry>,
}

/// JSON:API error object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactorErrorEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ReactorErrorEntry {
    /// Human-readable rendering: title and detail on their own lines
    pub fn to_message(&self) -> String {
        format!(
            "\ntitle:  {}\ndetail: {}",
            self.title.as_deref().unwrap_or_default(),
            self.detail.as_deref().unwrap_or_default()
        )
    }
}

/// Collection document (`data` is an array)
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionDocument {
    pub data: Vec<ExtensionPackageRecord>,
}

/// Single-resource document (`data` is an object)
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDocument {
    pub data: ExtensionPackageRecord,
}

/// Server-side processing status of an uploaded package
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingStatus {
    Pending,
    Succeeded,
    Failed,
    /// Missing or unrecognized status value
    Unknown(Option<String>),
}

impl ProcessingStatus {
    pub fn from_status(status: Option<&str>) -> Self {
        match status {
            Some("pending") => ProcessingStatus::Pending,
            Some("succeeded") => ProcessingStatus::Succeeded,
            Some("failed") => ProcessingStatus::Failed,
            other => ProcessingStatus::Unknown(other.map(str::to_string)),
        }
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingStatus::Pending => f.write_str("pending"),
            ProcessingStatus::Succeeded => f.write_str("succeeded"),
            ProcessingStatus::Failed => f.write_str("failed"),
            ProcessingStatus::Unknown(Some(status)) => write!(f, "unknown ({})", status),
            ProcessingStatus::Unknown(None) => f.write_str("unknown"),
        }
    }
}

impl ExtensionPackageRecord {
    /// Current processing status
    pub fn status(&self) -> ProcessingStatus {
        ProcessingStatus::from_status(self.attributes.status.as_deref())
    }

    /// Whether a new zip may replace this package in place
    pub fn is_updatable(&self) -> bool {
        self.attributes.availability.as_deref() == Some(reactor::UPDATABLE_AVAILABILITY)
    }

    /// First processing error reported by the server, if any
    pub fn first_status_error(&self) -> Option<&ReactorErrorEntry> {
        self.meta
            .as_ref()
            .and_then(|meta| meta.status_details.as_ref())
            .and_then(|details| details.errors.first())
    }
}
