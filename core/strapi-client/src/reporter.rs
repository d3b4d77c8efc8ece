//! Build progress and fatal error reporting.

use std::error::Error;

use tracing::{error, info};

/// Receives progress messages and fatal failures from the fetch pipeline.
///
/// `panic` is called once for a failure that aborts the pipeline. The caller
/// still receives the error as a `Result`; implementations only report it.
pub trait Reporter: Send + Sync {
    fn info(&self, message: &str);

    fn panic(&self, message: &str, error: &(dyn Error + 'static));
}

/// [`Reporter`] that writes to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn info(&self, message: &str) {
        info!("{message}");
    }

    fn panic(&self, message: &str, error: &(dyn Error + 'static)) {
        error!(error = %error, "{message}");
    }
}
