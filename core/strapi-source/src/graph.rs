//! Content graph abstraction and an in-memory implementation.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use strapi_client::{MediaAuth, RemoteFileFetcher};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::SourceResult;

/// Node type of extracted rich-text fields.
pub const RICH_TEXT_TYPE: &str = "StrapiRichText";
/// Media type of extracted rich-text fields.
pub const MARKDOWN_MEDIA_TYPE: &str = "text/markdown";
/// Node type of downloaded media.
pub const FILE_TYPE: &str = "File";

const NODE_ID_NAMESPACE: Uuid = Uuid::from_u128(0x5b2f_8c1e_4a7d_4f3b_9e21_6d0c_3a8f_71e4);

/// A node in the content graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub parent: Option<String>,
    #[serde(default)]
    pub children: Vec<String>,
    pub internal: NodeInternal,
    /// Payload fields, flattened next to the bookkeeping fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInternal {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub content_digest: String,
}

impl Node {
    /// A markdown rich-text node.
    pub fn rich_text(id: String, content: String, content_digest: String) -> Self {
        Self {
            id,
            parent: None,
            children: Vec::new(),
            internal: NodeInternal {
                node_type: RICH_TEXT_TYPE.to_string(),
                media_type: Some(MARKDOWN_MEDIA_TYPE.to_string()),
                content: Some(content),
                content_digest,
            },
            fields: Map::new(),
        }
    }

    pub fn node_type(&self) -> &str {
        &self.internal.node_type
    }
}

/// A downloaded media file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    pub id: String,
    pub url: String,
    pub ext: String,
    pub name: String,
    pub size: u64,
    pub content_digest: String,
}

impl FileNode {
    pub fn to_node(&self) -> Node {
        let mut fields = Map::new();
        fields.insert("url".to_string(), Value::String(self.url.clone()));
        fields.insert("ext".to_string(), Value::String(self.ext.clone()));
        fields.insert("name".to_string(), Value::String(self.name.clone()));
        fields.insert("size".to_string(), Value::from(self.size));

        Node {
            id: self.id.clone(),
            parent: None,
            children: Vec::new(),
            internal: NodeInternal {
                node_type: FILE_TYPE.to_string(),
                media_type: None,
                content: None,
                content_digest: self.content_digest.clone(),
            },
            fields,
        }
    }
}

/// Parameters for remote-file ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFileRequest {
    /// Absolute URL of the file.
    pub url: String,
    pub ext: String,
    pub name: String,
    pub auth: Option<MediaAuth>,
}

/// Sink for sourced nodes.
///
/// Implementations provide their own internal consistency; callers never
/// lock around them.
#[async_trait]
pub trait ContentGraph: Send + Sync {
    /// Creates or replaces a node.
    async fn create_node(&self, node: Node) -> SourceResult<()>;

    /// Marks an existing node as still referenced by this build.
    async fn touch_node(&self, node_id: &str) -> SourceResult<()>;

    /// Derives a stable node id from a seed.
    fn create_node_id(&self, seed: &str) -> String;

    /// Deterministic digest of `content`.
    fn create_content_digest(&self, content: &str) -> String;

    /// Downloads a remote file and creates a file node for it. `None` means
    /// the file could not be retrieved.
    async fn create_remote_file_node(
        &self,
        request: RemoteFileRequest,
    ) -> SourceResult<Option<FileNode>>;
}

/// Hex SHA-256 of `bytes`.
pub fn sha256_digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// [`ContentGraph`] that keeps nodes in memory and downloads media with a
/// [`RemoteFileFetcher`].
#[derive(Debug)]
pub struct MemoryGraph {
    fetcher: RemoteFileFetcher,
    nodes: RwLock<HashMap<String, Node>>,
    touched: RwLock<HashSet<String>>,
    remote_requests: AtomicUsize,
}

impl MemoryGraph {
    pub fn new(fetcher: RemoteFileFetcher) -> Self {
        Self {
            fetcher,
            nodes: RwLock::new(HashMap::new()),
            touched: RwLock::new(HashSet::new()),
            remote_requests: AtomicUsize::new(0),
        }
    }

    pub async fn node(&self, id: &str) -> Option<Node> {
        self.nodes.read().await.get(id).cloned()
    }

    /// Nodes of one type, sorted by id.
    pub async fn nodes_of_type(&self, node_type: &str) -> Vec<Node> {
        let mut nodes: Vec<Node> = self
            .nodes
            .read()
            .await
            .values()
            .filter(|n| n.node_type() == node_type)
            .cloned()
            .collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        nodes
    }

    pub async fn node_count(&self) -> usize {
        self.nodes.read().await.len()
    }

    pub async fn was_touched(&self, node_id: &str) -> bool {
        self.touched.read().await.contains(node_id)
    }

    /// Number of remote-file ingestion requests received.
    pub fn remote_file_requests(&self) -> usize {
        self.remote_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentGraph for MemoryGraph {
    async fn create_node(&self, node: Node) -> SourceResult<()> {
        debug!(id = %node.id, node_type = node.node_type(), "Creating node");
        self.nodes.write().await.insert(node.id.clone(), node);
        Ok(())
    }

    async fn touch_node(&self, node_id: &str) -> SourceResult<()> {
        if !self.nodes.read().await.contains_key(node_id) {
            debug!(node_id, "Touching node that is not in the graph");
        }
        self.touched.write().await.insert(node_id.to_string());
        Ok(())
    }

    fn create_node_id(&self, seed: &str) -> String {
        Uuid::new_v5(&NODE_ID_NAMESPACE, seed.as_bytes()).to_string()
    }

    fn create_content_digest(&self, content: &str) -> String {
        sha256_digest(content.as_bytes())
    }

    async fn create_remote_file_node(
        &self,
        request: RemoteFileRequest,
    ) -> SourceResult<Option<FileNode>> {
        self.remote_requests.fetch_add(1, Ordering::SeqCst);

        let Some(bytes) = self
            .fetcher
            .fetch(&request.url, request.auth.as_ref())
            .await?
        else {
            return Ok(None);
        };

        let file = FileNode {
            id: self.create_node_id(&request.url),
            size: bytes.len() as u64,
            content_digest: sha256_digest(&bytes),
            url: request.url,
            ext: request.ext,
            name: request.name,
        };
        self.create_node(file.to_node()).await?;

        Ok(Some(file))
    }
}
