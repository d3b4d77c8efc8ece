//! Rich-text field extraction.

use serde_json::Value;
use tracing::debug;

use crate::cache::{RichTextCacheEntry, read_entry, write_entry};
use crate::context::SourceContext;
use crate::error::SourceResult;
use crate::graph::Node;
use crate::media::is_truthy;

/// Text of a rich-text field. Missing and falsy values (`null`, `false`, `0`,
/// `""`) are empty; other non-string values are serialized.
pub fn rich_text_content(value: Option<&Value>) -> String {
    match value {
        Some(value) if !is_truthy(value) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Returns the id of the rich-text node holding `value`, creating it unless
/// a node with the same content digest is cached.
pub(crate) async fn extract_rich_text(
    ctx: &SourceContext<'_>,
    value: Option<&Value>,
    parent: &str,
) -> SourceResult<String> {
    let content = rich_text_content(value);
    let content_digest = ctx.graph.create_content_digest(&content);
    let cache_key = RichTextCacheEntry::key(&content_digest);

    if let Some(entry) = read_entry::<RichTextCacheEntry>(ctx.cache, &cache_key).await? {
        ctx.graph.touch_node(&entry.node_id).await?;
        return Ok(entry.node_id);
    }

    let node_id = ctx.graph.create_node_id(&content_digest);
    ctx.graph
        .create_node(Node::rich_text(node_id.clone(), content, content_digest))
        .await?;
    write_entry(
        ctx.cache,
        &cache_key,
        &RichTextCacheEntry {
            node_id: node_id.clone(),
        },
    )
    .await?;

    debug!(parent, node_id = %node_id, "Created rich text node");
    Ok(node_id)
}
