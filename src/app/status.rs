//! Extension package processing status polling
//!
//! After an upload the server processes the package asynchronously. The
//! poller fetches the package until it leaves `pending`, waiting between
//! checks, and gives up once the attempt budget is spent.
//!
//! Each fetched record is classified by [`transition`], a pure function, so
//! the loop itself only sequences requests and delays.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::app::log_verbose_header;
use crate::app::models::{ExtensionPackageRecord, ProcessingStatus};
use crate::errors::{AppError, PollError, ReactorResult};

/// Source of package records
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self, package_id: &str) -> ReactorResult<ExtensionPackageRecord>;
}

/// Wait between status checks
#[async_trait]
pub trait Delay: Send + Sync {
    async fn wait(&self, duration: Duration);
}

/// Real delay backed by the tokio timer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// What to do after observing a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Still pending: wait this long and check again
    Continue(Duration),
    /// Processing finished successfully
    Succeeded,
    /// Processing finished unsuccessfully
    Failed(PollError),
}

/// Classify a fetched record
pub fn transition(record: &ExtensionPackageRecord, interval: Duration) -> Transition {
    match record.status() {
        ProcessingStatus::Succeeded => Transition::Succeeded,
        ProcessingStatus::Pending => Transition::Continue(interval),
        ProcessingStatus::Failed => {
            let error = record.first_status_error();
            Transition::Failed(PollError::Processing {
                title: error
                    .and_then(|e| e.title.clone())
                    .unwrap_or_default(),
                detail: error
                    .and_then(|e| e.detail.clone())
                    .unwrap_or_default(),
            })
        }
        ProcessingStatus::Unknown(status) => Transition::Failed(PollError::UnknownStatus { status }),
    }
}

/// Progress through the attempt budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollState {
    pub package_id: String,
    /// Status requests made so far
    pub attempt: u32,
    pub max_attempts: u32,
}

impl PollState {
    pub fn new(package_id: impl Into<String>, max_attempts: u32) -> Self {
        Self {
            package_id: package_id.into(),
            attempt: 0,
            max_attempts,
        }
    }

    /// Whether another request is allowed
    pub fn has_budget(&self) -> bool {
        self.attempt < self.max_attempts
    }
}

/// Poll until the package succeeds, fails, or the budget runs out
///
/// # Arguments
///
/// * `source` - Where records come from
/// * `delay` - How to wait between checks
/// * `package_id` - Package to watch
/// * `max_attempts` - Maximum number of status requests
/// * `interval` - Wait after each pending result
/// * `verbose` - Log a header before each check
///
/// # Errors
///
/// Returns `AppError::Poll` for timeout, failed or unknown status, and
/// `AppError::Reactor` when a status request fails; request failures are
/// not retried
pub async fn poll_until_settled(
    source: &dyn StatusSource,
    delay: &dyn Delay,
    package_id: &str,
    max_attempts: u32,
    interval: Duration,
    verbose: bool,
) -> Result<(), AppError> {
    let mut state = PollState::new(package_id, max_attempts);

    loop {
        if !state.has_budget() {
            return Err(PollError::Timeout {
                attempts: state.attempt,
            }
            .into());
        }

        if verbose {
            log_verbose_header("Checking extension package status");
        }

        let record = source.fetch_status(&state.package_id).await?;
        state.attempt += 1;
        debug!(
            "Status check {}/{} for {}: {}",
            state.attempt,
            state.max_attempts,
            state.package_id,
            record.status()
        );

        match transition(&record, interval) {
            Transition::Succeeded => return Ok(()),
            Transition::Failed(error) => return Err(error.into()),
            Transition::Continue(wait) => delay.wait(wait).await,
        }
    }
}
