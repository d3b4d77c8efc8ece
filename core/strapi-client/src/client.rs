//! HTTP client for the Strapi REST API.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use strapi_schema::{PathIndex, SchemaMaps, build_rich_text_paths};
use tracing::{debug, info};

use crate::clean::{cast_array, clean};
use crate::config::StrapiConfig;
use crate::error::{ClientError, ClientResult};
use crate::reporter::Reporter;

/// Fetches entities and schema metadata from one Strapi instance.
///
/// Every request carries `Authorization: Bearer <jwt_token>` when a token is
/// configured. Failures are reported through the [`Reporter`] and returned;
/// callers treat them as fatal.
#[derive(Debug, Clone)]
pub struct StrapiClient {
    config: StrapiConfig,
    http: Client,
}

impl StrapiClient {
    /// Creates a client after validating `config`.
    pub fn new(config: StrapiConfig) -> ClientResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &StrapiConfig {
        &self.config
    }

    /// `<api_url>/<endpoint>?_limit=<query_limit>`
    pub fn entity_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}?_limit={}",
            self.config.base_url(),
            endpoint.trim_start_matches('/'),
            self.config.query_limit
        )
    }

    /// Fetches one endpoint and returns its cleaned entities.
    ///
    /// A single-object response yields a one-element list.
    pub async fn fetch_data(
        &self,
        endpoint: &str,
        reporter: &dyn Reporter,
    ) -> ClientResult<Vec<Value>> {
        let url = self.entity_url(endpoint);
        reporter.info(&format!("Starting to fetch data from Strapi - {url}"));

        match self.get_json(&url).await {
            Ok(body) => {
                let entities: Vec<Value> = cast_array(body).into_iter().map(clean).collect();
                debug!(endpoint, count = entities.len(), "Fetched entities");
                Ok(entities)
            }
            Err(e) => {
                reporter.panic("Failed to fetch data from Strapi", &e);
                Err(e)
            }
        }
    }

    /// Fetches content-type and component schemas and discovers every
    /// rich-text path.
    pub async fn fetch_metadata(&self, reporter: &dyn Reporter) -> ClientResult<PathIndex> {
        let base = format!("{}/content-type-builder", self.config.base_url());
        reporter.info(&format!("Starting to fetch metadata from Strapi - {base}"));

        match self.load_metadata(&base).await {
            Ok(index) => {
                info!(
                    paths = index.rich_text_paths().count(),
                    "Discovered rich text paths"
                );
                Ok(index)
            }
            Err(e) => {
                reporter.panic("Failed to fetch metadata from Strapi", &e);
                Err(e)
            }
        }
    }

    async fn load_metadata(&self, base: &str) -> ClientResult<PathIndex> {
        let types_url = format!("{base}/content-types");
        let components_url = format!("{base}/components");

        let (types, components) =
            tokio::try_join!(self.get_json(&types_url), self.get_json(&components_url))?;

        let maps = SchemaMaps::from_responses(types, components)?;
        debug!(
            types = maps.type_count(),
            components = maps.component_count(),
            "Decoded schema"
        );

        Ok(build_rich_text_paths(&maps))
    }

    async fn get_json(&self, url: &str) -> ClientResult<Value> {
        let mut request = self.http.get(url);
        if let Some(token) = self.config.bearer_token() {
            request = request.bearer_auth(token);
        }

        debug!(url, "GET");
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
