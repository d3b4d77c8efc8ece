//! Strapi REST client.
//!
//! - [`StrapiClient::fetch_data`] fetches one endpoint and cleans its entities
//! - [`StrapiClient::fetch_metadata`] fetches the content-type builder schema
//!   and runs rich-text path discovery on it
//! - [`RemoteFileFetcher`] downloads media files
//!
//! Fetch failures are reported through a [`Reporter`] and returned as
//! [`ClientError`]; without the source content there is nothing to build, so
//! callers abort on them.

mod clean;
mod client;
mod config;
mod error;
mod remote_file;
mod reporter;

pub use clean::{cast_array, clean};
pub use client::StrapiClient;
pub use config::{ContentTypeConfig, MediaAuth, StrapiConfig};
pub use error::{ClientError, ClientResult};
pub use remote_file::RemoteFileFetcher;
pub use reporter::{Reporter, TracingReporter};
