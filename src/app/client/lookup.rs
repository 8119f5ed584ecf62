//! Existing extension package lookup
//!
//! Packages are identified on the server by name and platform. Only one
//! match matters, so the query asks for a single-item page.

use reqwest::header::HeaderMap;
use tracing::debug;
use url::Url;

use crate::app::client::http::HttpHandler;
use crate::app::client::response::{ensure_success, RequestFailure};
use crate::app::log_verbose_header;
use crate::app::models::{CollectionDocument, ExtensionPackageManifest, ExtensionPackageRecord};
use crate::errors::{ReactorError, ReactorResult};

/// Lookup operations handler
pub struct LookupHandler<'a> {
    http_handler: &'a HttpHandler,
    headers: HeaderMap,
}

impl<'a> LookupHandler<'a> {
    /// Creates a new LookupHandler sending `headers` with every request
    pub fn new(http_handler: &'a HttpHandler, headers: HeaderMap) -> Self {
        Self {
            http_handler,
            headers,
        }
    }

    /// Find the package matching the manifest's name and platform
    ///
    /// # Arguments
    ///
    /// * `collection` - Extension package collection URL
    /// * `manifest` - Identity of the package being uploaded
    /// * `availability` - Optional availability filter
    ///
    /// # Errors
    ///
    /// Returns `ReactorError::Lookup` if the request fails or the response
    /// is not a collection document
    pub async fn find_existing(
        &self,
        collection: &str,
        manifest: &ExtensionPackageManifest,
        availability: Option<&str>,
    ) -> ReactorResult<Option<ExtensionPackageRecord>> {
        if self.http_handler.verbose() {
            log_verbose_header("Retrieving extension package from server");
        }

        let url = lookup_url(collection, manifest, availability)?;
        debug!("Looking up extension package at {}", url);

        let record = self
            .request(url)
            .await
            .map_err(|failure| ReactorError::Lookup {
                detail: failure.describe(),
            })?;

        match &record {
            Some(found) => debug!("Found extension package {}", found.id),
            None => debug!("No extension package named {} on server", manifest.name),
        }

        Ok(record)
    }

    async fn request(&self, url: Url) -> Result<Option<ExtensionPackageRecord>, RequestFailure> {
        let builder = self
            .http_handler
            .client()
            .get(url)
            .headers(self.headers.clone());

        let body = ensure_success(self.http_handler.send(builder).await?)?;
        let document: CollectionDocument =
            serde_json::from_value(body.clone()).map_err(|e| RequestFailure::Malformed {
                reason: format!("Unexpected response format: {}.", e),
                body: body.clone(),
            })?;

        Ok(document.data.into_iter().next())
    }
}

/// Build the filtered collection URL
///
/// # Errors
///
/// Returns `ReactorError::InvalidUrl` if `collection` is not a valid URL
pub fn lookup_url(
    collection: &str,
    manifest: &ExtensionPackageManifest,
    availability: Option<&str>,
) -> ReactorResult<Url> {
    let mut url = Url::parse(collection).map_err(|e| ReactorError::InvalidUrl {
        url: collection.to_string(),
        error: e.to_string(),
    })?;

    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("page[size]", "1")
            .append_pair("page[number]", "1")
            .append_pair("filter[name]", &format!("EQ {}", manifest.name))
            .append_pair("filter[platform]", &format!("EQ {}", manifest.platform));
        if let Some(availability) = availability {
            query.append_pair("filter[availability]", &format!("EQ {}", availability));
        }
    }

    Ok(url)
}
