//! The upload command
//!
//! Runs the pipeline front to back: configuration, credentials, zip
//! selection, manifest, lookup, upload, then processing status. Each step
//! fails the whole run; there is no partial recovery.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::app::{poll_until_settled, read_manifest, Delay, ReactorClient, TokioDelay};
use crate::auth::{
    acquire_access_token, check_renamed_environment_variables, CredentialResolver, ProcessEnv,
    VarSource,
};
use crate::cli::args::Cli;
use crate::cli::progress::ProcessingSpinner;
use crate::cli::prompts::{Prompter, TerminalPrompter};
use crate::cli::zip_path::resolve_zip_path;
use crate::config::AppConfig;
use crate::errors::Result;

/// Outside-world collaborators of the pipeline
pub struct UploadContext<'a> {
    pub prompter: &'a dyn Prompter,
    pub vars: &'a dyn VarSource,
    pub delay: &'a dyn Delay,
    /// Directory zips are discovered in and relative paths resolve against
    pub cwd: PathBuf,
}

/// Handle the upload command with the real terminal, environment and clock
pub async fn handle_upload(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let context = UploadContext {
        prompter: &TerminalPrompter,
        vars: &ProcessEnv,
        delay: &TokioDelay,
        cwd,
    };

    run_upload(&cli, &context).await.map(|_| ())
}

/// Run the pipeline, returning the id of the processed package
///
/// # Errors
///
/// Returns the first error of any step
pub async fn run_upload(cli: &Cli, context: &UploadContext<'_>) -> Result<String> {
    let verbose = cli.is_verbose();

    let config = AppConfig::load(cli.config.clone()).await?;
    let env = config.environment_config(cli.environment);
    info!("Uploading to the {} environment", env.environment);

    check_renamed_environment_variables(context.vars)?;

    let credentials = CredentialResolver::new(&env, context.vars, context.prompter)
        .resolve(&cli.credential_args())?;
    let client_config = config.client.to_runtime_config();
    let access_token =
        acquire_access_token(credentials, &env, &config.auth, &client_config, verbose).await?;

    let zip_path = resolve_zip_path(cli.zip_path.as_deref(), &context.cwd, context.prompter)?;
    debug!("Uploading zip {}", zip_path.display());
    let manifest = read_manifest(&zip_path)?;

    let client = ReactorClient::new(&client_config, env, &access_token, verbose)?;
    let existing = client.find_existing_package(&manifest).await?;
    let package_id = client
        .upload_package(&manifest, existing.as_ref(), &zip_path)
        .await?;

    let spinner = ProcessingSpinner::start("The extension package is being processed...");
    let outcome = poll_until_settled(
        &client,
        context.delay,
        &package_id,
        cli.upload_timeout,
        config.poll_interval(),
        verbose,
    )
    .await;

    match outcome {
        Ok(()) => {
            spinner.succeed("The extension package was successfully processed.");
            Ok(package_id)
        }
        Err(error) => {
            spinner.stop();
            Err(error)
        }
    }
}
