//! Connector configuration.

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Connection and sourcing settings for one Strapi instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrapiConfig {
    /// Base URL of the Strapi API (e.g. `http://localhost:1337`).
    pub api_url: String,
    /// Value of the `_limit` query parameter on entity requests.
    pub query_limit: u32,
    /// Bearer token sent with every API request when present.
    pub jwt_token: Option<String>,
    /// Collection types to source.
    pub content_types: Vec<ContentTypeConfig>,
    /// Single types to source.
    pub single_types: Vec<ContentTypeConfig>,
    /// Basic auth for media downloads.
    pub media_auth: Option<MediaAuth>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for StrapiConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:1337".to_string(),
            query_limit: 100,
            jwt_token: None,
            content_types: Vec::new(),
            single_types: Vec::new(),
            media_auth: None,
            request_timeout_secs: 60,
        }
    }
}

impl StrapiConfig {
    /// Creates a config for `api_url` with default settings.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Default::default()
        }
    }

    /// The API base URL without trailing slashes.
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    /// Checks the settings the client relies on.
    pub fn validate(&self) -> ClientResult<()> {
        let base = self.base_url();
        if base.is_empty() {
            return Err(ClientError::Config("api_url must not be empty".to_string()));
        }
        if !base.starts_with("http://") && !base.starts_with("https://") {
            return Err(ClientError::Config(format!(
                "api_url must be an http(s) URL, got {base}"
            )));
        }
        if self.query_limit == 0 {
            return Err(ClientError::Config(
                "query_limit must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// The bearer token, ignoring empty strings.
    pub fn bearer_token(&self) -> Option<&str> {
        self.jwt_token.as_deref().filter(|t| !t.is_empty())
    }

    /// Resolves a media URL against the API base. URLs that already start
    /// with `http` are returned as-is.
    pub fn media_url(&self, url: &str) -> String {
        if url.starts_with("http") {
            url.to_string()
        } else {
            format!("{}{}", self.base_url(), url)
        }
    }
}

/// A content type to source, configured either as a bare name or as
/// `{name, endpoint}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ContentTypeSpec")]
pub struct ContentTypeConfig {
    /// Type name as it appears in rich-text paths (e.g. `article`).
    pub name: String,
    /// API endpoint override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl ContentTypeConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Endpoint for a collection type: the override, or the name with an `s`.
    pub fn collection_endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("{}s", self.name))
    }

    /// Endpoint for a single type: the override, or the name itself.
    pub fn single_endpoint(&self) -> String {
        self.endpoint.clone().unwrap_or_else(|| self.name.clone())
    }
}

impl From<&str> for ContentTypeConfig {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ContentTypeSpec {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        endpoint: Option<String>,
    },
}

impl From<ContentTypeSpec> for ContentTypeConfig {
    fn from(spec: ContentTypeSpec) -> Self {
        match spec {
            ContentTypeSpec::Name(name) => Self::new(name),
            ContentTypeSpec::Full { name, endpoint } => Self { name, endpoint },
        }
    }
}

/// HTTP basic auth credentials for protected media URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAuth {
    pub htaccess_user: String,
    pub htaccess_pass: String,
}
