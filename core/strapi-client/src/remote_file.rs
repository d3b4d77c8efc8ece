//! Media download.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::config::{MediaAuth, StrapiConfig};
use crate::error::ClientResult;

/// Downloads media files referenced by entities.
#[derive(Debug, Clone)]
pub struct RemoteFileFetcher {
    http: Client,
}

impl RemoteFileFetcher {
    pub fn new(timeout: Duration) -> ClientResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    /// Uses the request timeout from `config`.
    pub fn from_config(config: &StrapiConfig) -> ClientResult<Self> {
        Self::new(Duration::from_secs(config.request_timeout_secs))
    }

    /// Downloads `url`. A non-success status yields `Ok(None)`; transport
    /// failures are errors.
    pub async fn fetch(&self, url: &str, auth: Option<&MediaAuth>) -> ClientResult<Option<Vec<u8>>> {
        let mut request = self.http.get(url);
        if let Some(auth) = auth {
            request = request.basic_auth(&auth.htaccess_user, Some(&auth.htaccess_pass));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "Remote file download failed");
            return Ok(None);
        }

        let bytes = response.bytes().await?;
        debug!(url, size = bytes.len(), "Downloaded remote file");
        Ok(Some(bytes.to_vec()))
    }
}
