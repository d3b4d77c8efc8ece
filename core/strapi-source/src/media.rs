//! Media descriptors and their extraction into file nodes.

use serde::{Deserialize, Deserializer, de};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::cache::{MediaCacheEntry, read_entry, write_entry};
use crate::context::SourceContext;
use crate::error::SourceResult;
use crate::graph::RemoteFileRequest;

/// Key whose presence marks an object as a media candidate.
pub const MIME_KEY: &str = "mime";
/// Reference key added to media objects once a file node exists.
pub const LOCAL_FILE_KEY: &str = "localFile___NODE";

/// An uploaded file as embedded in entities.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MediaDescriptor {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub url: String,
    pub mime: String,
    pub ext: String,
    pub name: String,
    #[serde(default, rename = "updatedAt")]
    updated_at_camel: Option<Value>,
    #[serde(default, rename = "updated_at")]
    updated_at_snake: Option<Value>,
}

impl MediaDescriptor {
    /// Validates a JSON object as a media descriptor.
    pub fn from_object(object: &Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(object.clone()))
    }

    /// Last modification timestamp: `updatedAt`, falling back to `updated_at`.
    pub fn updated_at(&self) -> Option<&Value> {
        self.updated_at_camel
            .as_ref()
            .filter(|v| is_truthy(v))
            .or(self.updated_at_snake.as_ref())
    }
}

/// JSON truthiness: `null`, `false`, zero and `""` are falsy.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "media id must be a string or number, got {other}"
        ))),
    }
}

/// Replaces a media object with one that references its file node.
///
/// A cached file node is reused while the media's `updatedAt` is unchanged.
/// Otherwise the file is downloaded; if that yields no node the reference is
/// left out and the object is returned as it was.
pub(crate) async fn extract_media(
    ctx: &SourceContext<'_>,
    media: &MediaDescriptor,
    mut object: Map<String, Value>,
) -> SourceResult<Map<String, Value>> {
    let cache_key = MediaCacheEntry::key(&media.id);
    let mut file_node_id = None;

    if let Some(entry) = read_entry::<MediaCacheEntry>(ctx.cache, &cache_key).await? {
        if entry.updated_at.as_ref() == media.updated_at() {
            debug!(media_id = %media.id, node_id = %entry.file_node_id, "Reusing cached media");
            ctx.graph.touch_node(&entry.file_node_id).await?;
            file_node_id = Some(entry.file_node_id);
        }
    }

    if file_node_id.is_none() {
        let config = ctx.config();
        let request = RemoteFileRequest {
            url: config.media_url(&media.url),
            ext: media.ext.clone(),
            name: media.name.clone(),
            auth: config.media_auth.clone(),
        };

        match ctx.graph.create_remote_file_node(request).await {
            Ok(Some(file)) => {
                let entry = MediaCacheEntry {
                    file_node_id: file.id.clone(),
                    updated_at: media.updated_at().cloned(),
                };
                write_entry(ctx.cache, &cache_key, &entry).await?;
                file_node_id = Some(file.id);
            }
            Ok(None) => {
                warn!(media_id = %media.id, url = %media.url, "No file node created for media");
            }
            Err(e) => {
                warn!(media_id = %media.id, url = %media.url, error = %e, "Failed to create file node for media");
            }
        }
    }

    if let Some(id) = file_node_id {
        object.insert(LOCAL_FILE_KEY.to_string(), Value::String(id));
    }
    Ok(object)
}
