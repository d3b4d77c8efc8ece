//! Rich-text path discovery over the content-type graph.
//!
//! Content types and components reference each other through component and
//! relation attributes, possibly in cycles. Discovery walks that graph and
//! records, for every type and component, the dotted field paths that end in
//! a rich-text attribute.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::schema::{APPLICATION_PREFIX, AttributeSpec, SchemaItem, SchemaMaps};

/// Result of path discovery.
///
/// `types` and `components` hold the raw per-uid paths; `rich_text_paths` is
/// the flattened `"<type name>.<path>"` lookup table consulted during entity
/// normalization. Uids without any rich-text path are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathIndex {
    rich_text_paths: BTreeSet<String>,
    types: BTreeMap<String, Vec<String>>,
    components: BTreeMap<String, Vec<String>>,
}

impl PathIndex {
    /// Builds an index directly from flattened paths, without per-uid maps.
    pub fn from_rich_text_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rich_text_paths: paths.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Whether `path` (e.g. `article.body`) holds rich text.
    pub fn is_rich_text(&self, path: &str) -> bool {
        self.rich_text_paths.contains(path)
    }

    pub fn rich_text_paths(&self) -> impl Iterator<Item = &str> {
        self.rich_text_paths.iter().map(String::as_str)
    }

    /// Discovered paths of a content type, in attribute order.
    pub fn type_paths(&self, uid: &str) -> Option<&[String]> {
        self.types.get(uid).map(Vec::as_slice)
    }

    /// Discovered paths of a component, in attribute order.
    pub fn component_paths(&self, uid: &str) -> Option<&[String]> {
        self.components.get(uid).map(Vec::as_slice)
    }

    pub fn types(&self) -> &BTreeMap<String, Vec<String>> {
        &self.types
    }

    pub fn components(&self) -> &BTreeMap<String, Vec<String>> {
        &self.components
    }

    pub fn is_empty(&self) -> bool {
        self.rich_text_paths.is_empty()
    }
}

/// Strips the `application::<api>.` namespace from a content-type uid.
///
/// `application::article.article` becomes `article`. Uids without the
/// namespace are returned unchanged.
pub fn strip_type_namespace(uid: &str) -> &str {
    let Some(prefix) = uid.get(..APPLICATION_PREFIX.len()) else {
        return uid;
    };
    if !prefix.eq_ignore_ascii_case(APPLICATION_PREFIX) {
        return uid;
    }
    let rest = &uid[APPLICATION_PREFIX.len()..];
    match rest.find('.') {
        Some(dot) => &rest[dot + 1..],
        None => uid,
    }
}

/// Discovers rich-text paths for every content type in `maps`.
///
/// A uid whose bucket already holds paths is not expanded again; its current
/// paths are composed into the referrer. A uid without paths is expanded each
/// time it is reached, except when no bucket has been created since it was
/// entered further up the walk, or since an earlier walk of it found nothing.
/// Either would repeat the same walk. Paths reachable through several
/// attributes are recorded once per route.
pub fn build_rich_text_paths(maps: &SchemaMaps) -> PathIndex {
    let mut builder = PathBuilder::new(maps);
    for uid in maps.type_uids() {
        builder.expand(Reference::Type, uid);
    }
    builder.finish()
}

/// Which map a reference resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reference {
    Type,
    Component,
}

#[derive(Debug, Clone, Copy)]
struct Frame<'a> {
    item: &'a SchemaItem,
    next: usize,
    /// Number of buckets when the frame was entered.
    buckets: usize,
    /// The attribute at `next` pushed a child frame that has since finished.
    resumed: bool,
}

struct PathBuilder<'a> {
    maps: &'a SchemaMaps,
    /// Items walked without finding paths, with the bucket count at the time.
    exhausted: HashMap<(&'a str, bool), usize>,
    types: BTreeMap<String, Vec<String>>,
    components: BTreeMap<String, Vec<String>>,
}

impl<'a> PathBuilder<'a> {
    fn new(maps: &'a SchemaMaps) -> Self {
        Self {
            maps,
            exhausted: HashMap::new(),
            types: BTreeMap::new(),
            components: BTreeMap::new(),
        }
    }

    fn bucket_count(&self) -> usize {
        self.types.len() + self.components.len()
    }

    fn has_bucket(&self, item: &SchemaItem) -> bool {
        if item.is_component() {
            self.components.contains_key(&item.uid)
        } else {
            self.types.contains_key(&item.uid)
        }
    }

    /// Returns a frame for the referenced item, or `None` if it is unknown,
    /// already has paths, or would repeat an earlier or enclosing walk.
    fn enter(&self, reference: Reference, uid: &str, stack: &[Frame<'a>]) -> Option<Frame<'a>> {
        let maps = self.maps;
        let found = match reference {
            Reference::Type => maps.content_type(uid),
            Reference::Component => maps.component(uid),
        };
        let Some(item) = found else {
            debug!(uid, ?reference, "Schema reference not found, skipping");
            return None;
        };

        if self.has_bucket(item) {
            return None;
        }

        let buckets = self.bucket_count();
        let exhausted_key = (item.uid.as_str(), item.is_component());
        if self.exhausted.get(&exhausted_key) == Some(&buckets) {
            return None;
        }

        let repeats_walk = stack.iter().any(|frame| {
            frame.buckets == buckets
                && frame.item.uid == item.uid
                && frame.item.is_component() == item.is_component()
        });
        if repeats_walk {
            debug!(uid, "Cyclic reference found no new paths, skipping");
            return None;
        }

        Some(Frame {
            item,
            next: 0,
            buckets,
            resumed: false,
        })
    }

    fn expand(&mut self, reference: Reference, uid: &str) {
        let Some(root) = self.enter(reference, uid, &[]) else {
            return;
        };

        let mut stack = vec![root];
        while let Some(top) = stack.last_mut() {
            let (item, next) = (top.item, top.next);
            let resumed = std::mem::take(&mut top.resumed);

            let Some((key, attr)) = item.attribute(next) else {
                stack.pop();
                if !self.has_bucket(item) {
                    let buckets = self.bucket_count();
                    self.exhausted
                        .insert((item.uid.as_str(), item.is_component()), buckets);
                }
                continue;
            };

            let (child_ref, child_uid) = match attr {
                AttributeSpec::RichText => {
                    self.record(item, vec![key.to_string()]);
                    advance(&mut stack);
                    continue;
                }
                AttributeSpec::Component { component } => (Reference::Component, component),
                AttributeSpec::Relation { target } => (Reference::Type, target),
                AttributeSpec::Other(_) => {
                    advance(&mut stack);
                    continue;
                }
            };

            // Expand the referenced item first; this attribute is revisited
            // once its frame is popped.
            if !resumed {
                if let Some(child) = self.enter(child_ref, child_uid, &stack) {
                    if let Some(top) = stack.last_mut() {
                        top.resumed = true;
                    }
                    stack.push(child);
                    continue;
                }
            }

            let prefixed: Vec<String> = self
                .discovered(child_ref, child_uid)
                .iter()
                .map(|path| format!("{key}.{path}"))
                .collect();
            self.record(item, prefixed);
            advance(&mut stack);
        }
    }

    fn discovered(&self, reference: Reference, uid: &str) -> &[String] {
        let bucket = match reference {
            Reference::Type => &self.types,
            Reference::Component => &self.components,
        };
        bucket.get(uid).map(Vec::as_slice).unwrap_or_default()
    }

    fn record(&mut self, item: &SchemaItem, paths: Vec<String>) {
        if paths.is_empty() {
            return;
        }
        let bucket = if item.is_component() {
            &mut self.components
        } else {
            &mut self.types
        };
        bucket.entry(item.uid.clone()).or_default().extend(paths);
    }

    fn finish(self) -> PathIndex {
        let mut rich_text_paths = BTreeSet::new();
        for (uid, paths) in &self.types {
            let name = strip_type_namespace(uid);
            for path in paths {
                rich_text_paths.insert(format!("{name}.{path}"));
            }
        }

        PathIndex {
            rich_text_paths,
            types: self.types,
            components: self.components,
        }
    }
}

fn advance(stack: &mut [Frame<'_>]) {
    if let Some(top) = stack.last_mut() {
        top.next += 1;
    }
}
