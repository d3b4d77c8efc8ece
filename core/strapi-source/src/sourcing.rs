//! One sourcing run: metadata, entity fetches, normalization, node creation.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use strapi_client::ContentTypeConfig;
use strapi_schema::PathIndex;
use tracing::{debug, info};

use crate::context::SourceContext;
use crate::error::{SourceError, SourceResult};
use crate::graph::{ContentGraph, Node, NodeInternal};
use crate::normalize::download_media_files;

/// Prefix of entity node types.
pub const NODE_TYPE_PREFIX: &str = "Strapi";

/// Entity keys that collide with node bookkeeping fields and are renamed to
/// `strapi_<key>`.
const RESERVED_KEYS: [&str; 4] = ["parent", "children", "internal", "fields"];

/// Totals of one sourcing run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceReport {
    /// Number of flattened rich-text paths discovered.
    pub rich_text_paths: usize,
    /// Entity nodes created across all types.
    pub entities: usize,
    /// Entity nodes created per type name.
    pub per_type: BTreeMap<String, usize>,
}

/// Sources every configured collection type and single type.
///
/// Metadata is fetched once. Types are processed one after another; the
/// entities of one type are normalized concurrently. Any fetch, cache or
/// graph failure aborts the run.
pub async fn source_nodes(ctx: SourceContext<'_>) -> SourceResult<SourceReport> {
    let index = ctx.client.fetch_metadata(ctx.reporter).await?;
    let mut report = SourceReport {
        rich_text_paths: index.rich_text_paths().count(),
        ..SourceReport::default()
    };

    let config = ctx.config();
    let collections = config
        .content_types
        .iter()
        .map(|ty| (ty, ty.collection_endpoint()));
    let singles = config
        .single_types
        .iter()
        .map(|ty| (ty, ty.single_endpoint()));

    for (content_type, endpoint) in collections.chain(singles) {
        let count = source_type(ctx, &index, content_type, &endpoint).await?;
        *report.per_type.entry(content_type.name.clone()).or_default() += count;
        report.entities += count;
    }

    ctx.reporter.info(&format!(
        "Sourced {} entities of {} types from Strapi",
        report.entities,
        report.per_type.len()
    ));
    Ok(report)
}

/// Fetches, normalizes and creates nodes for one type. Returns the number of
/// entity nodes created.
pub async fn source_type(
    ctx: SourceContext<'_>,
    index: &PathIndex,
    content_type: &ContentTypeConfig,
    endpoint: &str,
) -> SourceResult<usize> {
    let entities = ctx.client.fetch_data(endpoint, ctx.reporter).await?;
    let entities = download_media_files(ctx, &content_type.name, index, entities).await?;

    let node_type = node_type_name(&content_type.name);
    let count = entities.len();
    for (i, entity) in entities.into_iter().enumerate() {
        let node = entity_node(ctx.graph, &node_type, i, entity)?;
        ctx.graph.create_node(node).await?;
    }

    info!(name = %content_type.name, endpoint, count, "Sourced content type");
    Ok(count)
}

/// `Strapi` followed by the PascalCase type name: `blog-post` becomes
/// `StrapiBlogPost`.
pub fn node_type_name(name: &str) -> String {
    let mut node_type = String::from(NODE_TYPE_PREFIX);
    for word in name.split(['-', '_', ' ']).filter(|w| !w.is_empty()) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            node_type.extend(first.to_uppercase());
            node_type.push_str(chars.as_str());
        }
    }
    node_type
}

/// Builds the node for entity `index` of `node_type`.
///
/// The entity's `id` moves to `strapiId` and keys reserved by the node
/// layout are prefixed with `strapi_`; everything else is kept in order.
pub fn entity_node(
    graph: &dyn ContentGraph,
    node_type: &str,
    index: usize,
    entity: Value,
) -> SourceResult<Node> {
    let content_digest = graph.create_content_digest(&serde_json::to_string(&entity)?);

    let Value::Object(object) = entity else {
        return Err(SourceError::Graph(format!(
            "entity {index} of {node_type} is not an object"
        )));
    };

    let entity_id = match object.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => index.to_string(),
    };

    let mut fields = Map::with_capacity(object.len());
    for (key, value) in object {
        if key == "id" {
            fields.insert("strapiId".to_string(), value);
        } else if RESERVED_KEYS.contains(&key.as_str()) {
            fields.insert(format!("strapi_{key}"), value);
        } else {
            fields.insert(key, value);
        }
    }

    let id = graph.create_node_id(&format!("{node_type}-{entity_id}"));
    debug!(node_type, id = %id, "Built entity node");

    Ok(Node {
        id,
        parent: None,
        children: Vec::new(),
        internal: NodeInternal {
            node_type: node_type.to_string(),
            media_type: None,
            content: None,
            content_digest,
        },
        fields,
    })
}
