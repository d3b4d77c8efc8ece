//! Entity normalization.
//!
//! Entities are walked depth-first. Fields registered as rich-text paths are
//! moved into rich-text nodes and replaced by a `<field>___NODE` reference;
//! media objects gain a `localFile___NODE` reference to their file node.

use futures::future::{BoxFuture, FutureExt, try_join_all};
use serde_json::{Map, Value};
use strapi_schema::PathIndex;
use tracing::{debug, warn};

use crate::context::SourceContext;
use crate::error::SourceResult;
use crate::media::{MIME_KEY, MediaDescriptor, extract_media};
use crate::rich_text::extract_rich_text;

/// Suffix of keys holding node references.
pub const NODE_REFERENCE_SUFFIX: &str = "___NODE";

/// Normalizes every entity of one type concurrently.
///
/// Entity `i` is walked from path `type_name` with node id `type_name.i`.
/// The output keeps input order.
pub async fn download_media_files(
    ctx: SourceContext<'_>,
    type_name: &str,
    index: &PathIndex,
    entities: Vec<Value>,
) -> SourceResult<Vec<Value>> {
    debug!(type_name, count = entities.len(), "Normalizing entities");

    try_join_all(entities.into_iter().enumerate().map(|(i, entity)| {
        extract_fields(
            ctx,
            index,
            entity,
            type_name.to_string(),
            format!("{type_name}.{i}"),
        )
    }))
    .await
}

/// Rewrites one value found at `path`.
///
/// - an object with a `mime` key that reads as a [`MediaDescriptor`] is
///   extracted as media and not descended into
/// - an array at a rich-text path has each element replaced by a rich-text
///   node id; other arrays are walked element-wise with the same path
/// - an object is walked key by key, extracting registered rich-text fields
/// - scalars are returned unchanged
pub fn extract_fields<'a>(
    ctx: SourceContext<'a>,
    index: &'a PathIndex,
    value: Value,
    path: String,
    node_id: String,
) -> BoxFuture<'a, SourceResult<Value>> {
    async move {
        match value {
            Value::Object(object) => {
                if object.contains_key(MIME_KEY) {
                    match MediaDescriptor::from_object(&object) {
                        Ok(media) => {
                            return Ok(Value::Object(extract_media(&ctx, &media, object).await?));
                        }
                        Err(e) => {
                            warn!(path = %path, error = %e, "Object with mime is not a valid media descriptor");
                        }
                    }
                }
                extract_object(ctx, index, object, &path, &node_id).await
            }
            Value::Array(items) if index.is_rich_text(&path) => {
                let mut ids = Vec::with_capacity(items.len());
                for item in &items {
                    ids.push(Value::String(
                        extract_rich_text(&ctx, Some(item), &node_id).await?,
                    ));
                }
                Ok(Value::Array(ids))
            }
            Value::Array(items) => {
                let mut walked = Vec::with_capacity(items.len());
                for (i, item) in items.into_iter().enumerate() {
                    walked.push(
                        extract_fields(ctx, index, item, path.clone(), format!("{node_id}.{i}"))
                            .await?,
                    );
                }
                Ok(Value::Array(walked))
            }
            scalar => Ok(scalar),
        }
    }
    .boxed()
}

async fn extract_object(
    ctx: SourceContext<'_>,
    index: &PathIndex,
    object: Map<String, Value>,
    path: &str,
    node_id: &str,
) -> SourceResult<Value> {
    let mut rewritten = Map::with_capacity(object.len());

    for (key, value) in object {
        let field_path = format!("{path}.{key}");

        if index.is_rich_text(&field_path) {
            let rich_text_id = extract_rich_text(&ctx, Some(&value), node_id).await?;
            rewritten.insert(
                format!("{key}{NODE_REFERENCE_SUFFIX}"),
                Value::String(rich_text_id),
            );
        } else {
            let field_node_id = format!("{node_id}.{key}");
            let value = extract_fields(ctx, index, value, field_path, field_node_id).await?;
            rewritten.insert(key, value);
        }
    }

    Ok(Value::Object(rewritten))
}
