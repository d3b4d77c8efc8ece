use std::collections::HashMap;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::{SchemaError, SchemaResult};

/// Uid prefix of user-defined content types. Built-in and plugin types are
/// filtered out of [`SchemaMaps`].
pub const APPLICATION_PREFIX: &str = "application::";

/// One attribute of a content type or component, classified by what path
/// discovery cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeSpec {
    /// `{type: "richtext"}`
    RichText,
    /// `{type: "component", component: uid}`
    Component { component: String },
    /// `{target: uid}`, a relation to another content type.
    Relation { target: String },
    /// Any other attribute type. Ignored by discovery.
    Other(Option<String>),
}

impl AttributeSpec {
    /// Classifies a raw attribute definition.
    ///
    /// Checks run in the order richtext, component, relation; a definition
    /// matching none of them is [`AttributeSpec::Other`].
    pub fn from_value(value: &Value) -> Self {
        let kind = value.get("type").and_then(Value::as_str);

        if kind == Some("richtext") {
            return Self::RichText;
        }

        if kind == Some("component") {
            if let Some(component) = value.get("component").and_then(Value::as_str) {
                return Self::Component {
                    component: component.to_string(),
                };
            }
        } else if let Some(target) = value.get("target").and_then(Value::as_str) {
            return Self::Relation {
                target: target.to_string(),
            };
        }

        Self::Other(kind.map(str::to_string))
    }
}

/// A content type or component definition.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct SchemaItem {
    #[serde(default)]
    pub uid: String,
    /// `collectionType` / `singleType` for content types, absent for components.
    #[serde(default)]
    pub kind: Option<String>,
    /// Attributes in declaration order.
    #[serde(default, deserialize_with = "deserialize_attributes")]
    pub attributes: Option<Vec<(String, AttributeSpec)>>,
}

impl SchemaItem {
    /// Shorthand for a content type with the given attributes.
    pub fn content_type(uid: &str, attributes: Vec<(&str, AttributeSpec)>) -> Self {
        Self {
            uid: uid.to_string(),
            kind: Some("collectionType".to_string()),
            attributes: Some(owned(attributes)),
        }
    }

    /// Shorthand for a component with the given attributes.
    pub fn component(uid: &str, attributes: Vec<(&str, AttributeSpec)>) -> Self {
        Self {
            uid: uid.to_string(),
            kind: None,
            attributes: Some(owned(attributes)),
        }
    }

    /// Components carry no `kind`.
    pub fn is_component(&self) -> bool {
        self.kind.as_deref().is_none_or(str::is_empty)
    }

    /// Returns the attribute at `index` in declaration order.
    pub fn attribute(&self, index: usize) -> Option<(&str, &AttributeSpec)> {
        self.attributes
            .as_ref()
            .and_then(|attrs| attrs.get(index))
            .map(|(key, attr)| (key.as_str(), attr))
    }

    /// Builds an item from a `{uid, schema}` envelope entry. The envelope uid
    /// wins over any uid inside the schema body.
    fn from_entry(entry: SchemaEntry) -> SchemaResult<Self> {
        let mut item = match entry.schema {
            Value::Null => Self::default(),
            schema @ Value::Object(_) => serde_json::from_value(schema)?,
            other => {
                return Err(SchemaError::InvalidSchema {
                    uid: entry.uid,
                    reason: format!("expected an object, got {other}"),
                });
            }
        };
        item.uid = entry.uid;
        Ok(item)
    }
}

fn owned(attributes: Vec<(&str, AttributeSpec)>) -> Vec<(String, AttributeSpec)> {
    attributes
        .into_iter()
        .map(|(key, attr)| (key.to_string(), attr))
        .collect()
}

fn deserialize_attributes<'de, D>(
    deserializer: D,
) -> Result<Option<Vec<(String, AttributeSpec)>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Map<String, Value>>::deserialize(deserializer)?;
    Ok(raw.map(|attrs| {
        attrs
            .iter()
            .map(|(key, value)| (key.clone(), AttributeSpec::from_value(value)))
            .collect()
    }))
}

/// Envelope returned by the content-type builder endpoints.
#[derive(Debug, Deserialize)]
struct SchemaListResponse {
    data: Vec<SchemaEntry>,
}

#[derive(Debug, Deserialize)]
struct SchemaEntry {
    uid: String,
    #[serde(default)]
    schema: Value,
}

/// Content types and components keyed by uid.
///
/// Content types are restricted to [`APPLICATION_PREFIX`] uids; components
/// are kept as-is. Content-type uids remember their response order so that
/// discovery visits them deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaMaps {
    types: HashMap<String, SchemaItem>,
    components: HashMap<String, SchemaItem>,
    type_order: Vec<String>,
}

impl SchemaMaps {
    /// Builds the maps from already-decoded items.
    pub fn new(
        types: impl IntoIterator<Item = SchemaItem>,
        components: impl IntoIterator<Item = SchemaItem>,
    ) -> Self {
        let mut maps = Self::default();
        for item in types {
            maps.insert_type(item);
        }
        for item in components {
            maps.components.insert(item.uid.clone(), item);
        }
        maps
    }

    /// Decodes the raw `content-types` and `components` response bodies.
    pub fn from_responses(types: Value, components: Value) -> SchemaResult<Self> {
        let types: SchemaListResponse = serde_json::from_value(types)?;
        let components: SchemaListResponse = serde_json::from_value(components)?;

        let types = types
            .data
            .into_iter()
            .map(SchemaItem::from_entry)
            .collect::<SchemaResult<Vec<_>>>()?;
        let components = components
            .data
            .into_iter()
            .map(SchemaItem::from_entry)
            .collect::<SchemaResult<Vec<_>>>()?;

        Ok(Self::new(types, components))
    }

    fn insert_type(&mut self, item: SchemaItem) {
        if !item.uid.starts_with(APPLICATION_PREFIX) {
            return;
        }
        if !self.types.contains_key(&item.uid) {
            self.type_order.push(item.uid.clone());
        }
        self.types.insert(item.uid.clone(), item);
    }

    /// Looks up a content type by uid.
    pub fn content_type(&self, uid: &str) -> Option<&SchemaItem> {
        self.types.get(uid)
    }

    /// Looks up a component by uid.
    pub fn component(&self, uid: &str) -> Option<&SchemaItem> {
        self.components.get(uid)
    }

    /// Content-type uids in response order.
    pub fn type_uids(&self) -> impl Iterator<Item = &str> {
        self.type_order.iter().map(String::as_str)
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }
}
