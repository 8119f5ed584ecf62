//! Extension package upload
//!
//! A zip either creates a new package (POST to the collection) or replaces
//! an existing development package in place (PATCH to the resource). The
//! zip is streamed from disk as the `package` multipart field.

use std::path::Path;

use colored::Colorize;
use reqwest::header::HeaderMap;
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use serde_json::Value;
use tokio::fs::File;
use tracing::debug;

use crate::app::client::http::HttpHandler;
use crate::app::client::response::RequestFailure;
use crate::app::log_verbose_header;
use crate::app::models::{ExtensionPackageManifest, ExtensionPackageRecord};
use crate::constants::reactor;
use crate::environment::EnvironmentConfig;
use crate::errors::{ReactorError, ReactorResult};

/// Where an upload goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadTarget {
    /// Create a new package
    Create,
    /// Replace the package with this id
    Update(String),
}

impl UploadTarget {
    /// Pick the target for a lookup result; only development packages are
    /// updated in place
    pub fn for_existing(existing: Option<&ExtensionPackageRecord>) -> Self {
        match existing.filter(|record| record.is_updatable()) {
            Some(record) => UploadTarget::Update(record.id.clone()),
            None => UploadTarget::Create,
        }
    }

    /// Request URL for this target
    pub fn url(&self, env: &EnvironmentConfig) -> String {
        match self {
            UploadTarget::Create => env.extension_packages.clone(),
            UploadTarget::Update(id) => env.extension_package_url(id),
        }
    }
}

/// Upload operations handler
pub struct UploadHandler<'a> {
    http_handler: &'a HttpHandler,
    headers: HeaderMap,
}

impl<'a> UploadHandler<'a> {
    /// Creates a new UploadHandler sending `headers` with every request
    pub fn new(http_handler: &'a HttpHandler, headers: HeaderMap) -> Self {
        Self {
            http_handler,
            headers,
        }
    }

    /// Upload the zip and return the package id the server assigned
    ///
    /// # Errors
    ///
    /// Returns `ReactorError::ZipOpen` if the zip cannot be opened and
    /// `ReactorError::Upload` if the request fails or the response carries
    /// no package id
    pub async fn upload(
        &self,
        env: &EnvironmentConfig,
        manifest: &ExtensionPackageManifest,
        existing: Option<&ExtensionPackageRecord>,
        zip_path: &Path,
    ) -> ReactorResult<String> {
        let target = UploadTarget::for_existing(existing);

        match &target {
            UploadTarget::Update(id) => println!(
                "An existing development extension package with the name {} was found on the server \
                 and will be updated. The extension package ID is {}.",
                manifest.name.bold(),
                id.bold()
            ),
            UploadTarget::Create => println!(
                "No development extension package was found on the server with the name {}. \
                 A new extension package will be created.",
                manifest.name.bold()
            ),
        }

        if self.http_handler.verbose() {
            log_verbose_header("Uploading zip");
        }

        let form = package_form(zip_path).await?;
        let url = target.url(env);
        debug!("Uploading {} to {}", zip_path.display(), url);

        let package_id = self
            .request(&target, &url, form)
            .await
            .map_err(|failure| ReactorError::Upload {
                detail: failure.describe(),
            })?;

        let prefix = match target {
            UploadTarget::Create => "The extension package has been assigned the ID",
            UploadTarget::Update(_) => "The extension package ID is",
        };
        println!("{} {}.", prefix, package_id.bold());

        Ok(package_id)
    }

    async fn request(
        &self,
        target: &UploadTarget,
        url: &str,
        form: Form,
    ) -> Result<String, RequestFailure> {
        let client = self.http_handler.client();
        let builder = match target {
            UploadTarget::Create => client.post(url),
            UploadTarget::Update(_) => client.patch(url),
        }
        .headers(self.headers.clone())
        .multipart(form);

        let response = self.http_handler.send(builder).await?;
        // The id is the only proof of success; error bodies are reported whole
        package_id(&response.body).ok_or_else(|| RequestFailure::Malformed {
            reason: "No extension package ID was returned from the API.".to_string(),
            body: response.body,
        })
    }
}

/// Multipart form streaming the zip from disk
async fn package_form(zip_path: &Path) -> ReactorResult<Form> {
    let zip_open = |source| ReactorError::ZipOpen {
        path: zip_path.to_path_buf(),
        source,
    };

    let file = File::open(zip_path).await.map_err(zip_open)?;
    let length = file.metadata().await.map_err(zip_open)?.len();
    let file_name = zip_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "package.zip".to_string());

    let part = Part::stream_with_length(Body::from(file), length)
        .file_name(file_name)
        .mime_str("application/zip")?;

    Ok(Form::new().part(reactor::PACKAGE_FIELD, part))
}

/// `data.id` of a resource document, when present and non-empty
fn package_id(body: &Value) -> Option<String> {
    body.get("data")
        .and_then(|data| data.get("id"))
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}
