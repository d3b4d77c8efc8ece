//! Strapi schema model and rich-text path discovery.
//!
//! The content-type builder API describes every content type and component
//! as a set of attributes. Some attributes are rich text; others embed a
//! component or relate to another content type, so rich text can sit several
//! levels deep and the reference graph may contain cycles.
//!
//! - [`SchemaMaps`] holds the decoded definitions keyed by uid
//! - [`build_rich_text_paths`] walks the graph and produces a [`PathIndex`]
//! - [`PathIndex::is_rich_text`] is the lookup used while normalizing entities
//!
//! # Example
//!
//! ```
//! use strapi_schema::{AttributeSpec, SchemaItem, SchemaMaps, build_rich_text_paths};
//!
//! let article = SchemaItem::content_type(
//!     "application::article.article",
//!     vec![("body", AttributeSpec::RichText)],
//! );
//! let maps = SchemaMaps::new(vec![article], vec![]);
//! let index = build_rich_text_paths(&maps);
//!
//! assert!(index.is_rich_text("article.body"));
//! ```

mod error;
mod paths;
mod schema;

pub use error::{SchemaError, SchemaResult};
pub use paths::{PathIndex, build_rich_text_paths, strip_type_namespace};
pub use schema::{APPLICATION_PREFIX, AttributeSpec, SchemaItem, SchemaMaps};
