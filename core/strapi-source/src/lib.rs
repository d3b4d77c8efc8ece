//! Sources Strapi content into a content graph.
//!
//! A run discovers rich-text paths from the Strapi schema, fetches every
//! configured type, and rewrites each entity before it becomes a node:
//!
//! - rich-text fields move into `StrapiRichText` nodes and are replaced by a
//!   `<field>___NODE` reference
//! - media objects are downloaded into `File` nodes and gain a
//!   `localFile___NODE` reference
//!
//! Both are cached ([`Cache`]) so unchanged media is not downloaded again and
//! identical rich text maps to one node. The host supplies the cache, the
//! graph ([`ContentGraph`]) and a [`Reporter`](strapi_client::Reporter) through
//! a [`SourceContext`]; [`MemoryCache`], [`JsonFileCache`] and [`MemoryGraph`]
//! are in-process implementations.
//!
//! ```no_run
//! use strapi_client::{RemoteFileFetcher, StrapiClient, StrapiConfig, TracingReporter};
//! use strapi_source::{MemoryCache, MemoryGraph, SourceContext, source_nodes};
//!
//! # async fn run() -> strapi_source::SourceResult<()> {
//! let mut config = StrapiConfig::new("http://localhost:1337");
//! config.content_types = vec!["article".into()];
//!
//! let graph = MemoryGraph::new(RemoteFileFetcher::from_config(&config)?);
//! let client = StrapiClient::new(config)?;
//! let cache = MemoryCache::new();
//!
//! let report = source_nodes(SourceContext::new(&client, &cache, &graph, &TracingReporter)).await?;
//! println!("{} entities", report.entities);
//! # Ok(())
//! # }
//! ```

pub mod cache;
mod context;
mod error;
pub mod graph;
mod media;
mod normalize;
mod rich_text;
mod sourcing;

pub use cache::{Cache, JsonFileCache, MediaCacheEntry, MemoryCache, RichTextCacheEntry};
pub use context::SourceContext;
pub use error::{SourceError, SourceResult};
pub use graph::{ContentGraph, FileNode, MemoryGraph, Node, NodeInternal, RemoteFileRequest};
pub use media::{LOCAL_FILE_KEY, MIME_KEY, MediaDescriptor};
pub use normalize::{NODE_REFERENCE_SUFFIX, download_media_files, extract_fields};
pub use rich_text::rich_text_content;
pub use sourcing::{SourceReport, entity_node, node_type_name, source_nodes, source_type};
