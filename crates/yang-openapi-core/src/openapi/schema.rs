//! Named and inline schema values of the output document.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// Prefix of every local schema reference.
pub const REF_PREFIX: &str = "#/components/schemas/";

/// Integer widths without a format use the default; only values that may
/// exceed 32 signed bits are marked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerFormat {
    Int64,
}

impl IntegerFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            IntegerFormat::Int64 => "int64",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    Boolean,
    Integer { format: Option<IntegerFormat> },
    String,
    /// String restricted to the listed values.
    Enum(Vec<String>),
    Object(IndexMap<String, Schema>),
    AllOf(Vec<Schema>),
    Array(Box<Schema>),
    /// Reference to a schema in `components.schemas`, by name.
    Ref(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub kind: SchemaKind,
    pub description: Option<String>,
    pub default: Option<String>,
    /// `x-` extensions, keyed with their prefix.
    pub extensions: BTreeMap<String, Value>,
}

impl From<SchemaKind> for Schema {
    fn from(kind: SchemaKind) -> Self {
        Self {
            kind,
            description: None,
            default: None,
            extensions: BTreeMap::new(),
        }
    }
}

impl Schema {
    pub fn boolean() -> Self {
        SchemaKind::Boolean.into()
    }

    pub fn integer(format: Option<IntegerFormat>) -> Self {
        SchemaKind::Integer { format }.into()
    }

    pub fn string() -> Self {
        SchemaKind::String.into()
    }

    pub fn enumeration(values: Vec<String>) -> Self {
        SchemaKind::Enum(values).into()
    }

    pub fn object(properties: IndexMap<String, Schema>) -> Self {
        SchemaKind::Object(properties).into()
    }

    pub fn all_of(members: Vec<Schema>) -> Self {
        SchemaKind::AllOf(members).into()
    }

    pub fn array(items: Schema) -> Self {
        SchemaKind::Array(Box::new(items)).into()
    }

    pub fn reference(name: impl Into<String>) -> Self {
        SchemaKind::Ref(name.into()).into()
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_default(mut self, default: Option<String>) -> Self {
        self.default = default;
        self
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }

    /// Target name when this schema is a reference.
    pub fn ref_name(&self) -> Option<&str> {
        match &self.kind {
            SchemaKind::Ref(name) => Some(name),
            _ => None,
        }
    }

    pub fn properties(&self) -> Option<&IndexMap<String, Schema>> {
        match &self.kind {
            SchemaKind::Object(props) => Some(props),
            _ => None,
        }
    }

    pub fn properties_mut(&mut self) -> Option<&mut IndexMap<String, Schema>> {
        match &mut self.kind {
            SchemaKind::Object(props) => Some(props),
            _ => None,
        }
    }

    pub fn members(&self) -> Option<&[Schema]> {
        match &self.kind {
            SchemaKind::AllOf(members) => Some(members),
            _ => None,
        }
    }

    /// Order-insensitive structural comparison.
    ///
    /// All-of members are compared as a multiset and property maps as maps,
    /// so two schemas that differ only in visit order are equivalent.
    pub fn equivalent(&self, other: &Schema) -> bool {
        if self.description != other.description
            || self.default != other.default
            || self.extensions != other.extensions
        {
            return false;
        }
        match (&self.kind, &other.kind) {
            (SchemaKind::Object(a), SchemaKind::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|w| v.equivalent(w)))
            }
            (SchemaKind::AllOf(a), SchemaKind::AllOf(b)) => {
                if a.len() != b.len() {
                    return false;
                }
                let mut unmatched: Vec<&Schema> = b.iter().collect();
                for member in a {
                    match unmatched.iter().position(|m| member.equivalent(m)) {
                        Some(pos) => {
                            unmatched.swap_remove(pos);
                        }
                        None => return false,
                    }
                }
                true
            }
            (SchemaKind::Array(a), SchemaKind::Array(b)) => a.equivalent(b),
            (a, b) => a == b,
        }
    }

    /// Call `f` on every reference name in this schema, recursively.
    pub fn visit_refs_mut(&mut self, f: &mut dyn FnMut(&mut String)) {
        match &mut self.kind {
            SchemaKind::Ref(name) => f(name),
            SchemaKind::Object(props) => {
                for prop in props.values_mut() {
                    prop.visit_refs_mut(f);
                }
            }
            SchemaKind::AllOf(members) => {
                for member in members {
                    member.visit_refs_mut(f);
                }
            }
            SchemaKind::Array(items) => items.visit_refs_mut(f),
            _ => {}
        }
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match &self.kind {
            SchemaKind::Boolean => map.serialize_entry("type", "boolean")?,
            SchemaKind::Integer { format } => {
                map.serialize_entry("type", "integer")?;
                if let Some(format) = format {
                    map.serialize_entry("format", format.as_str())?;
                }
            }
            SchemaKind::String => map.serialize_entry("type", "string")?,
            SchemaKind::Enum(values) => {
                map.serialize_entry("type", "string")?;
                map.serialize_entry("enum", values)?;
            }
            SchemaKind::Object(props) => {
                map.serialize_entry("type", "object")?;
                map.serialize_entry("properties", props)?;
            }
            SchemaKind::AllOf(members) => map.serialize_entry("allOf", members)?,
            SchemaKind::Array(items) => {
                map.serialize_entry("type", "array")?;
                map.serialize_entry("items", items)?;
            }
            SchemaKind::Ref(name) => {
                map.serialize_entry("$ref", &format!("{REF_PREFIX}{name}"))?;
            }
        }
        if let Some(description) = &self.description {
            map.serialize_entry("description", description)?;
        }
        if let Some(default) = &self.default {
            map.serialize_entry("default", default)?;
        }
        for (key, value) in &self.extensions {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
