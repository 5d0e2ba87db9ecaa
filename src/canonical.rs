//! Canonical document model.
//!
//! Every value the normalizer produces is a [`Node`]: a coarse [`Kind`], an
//! optional variant discriminator (serialized as `type`), an optional
//! [`Position`], and named children. Nodes serialize to JSON objects whose keys
//! are emitted in sorted order, so two runs over the same input always produce
//! byte-identical documents.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::position::Position;

// ============================================================================
// KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Literal,
    Ident,
    Expression,
    Statement,
    Type,
    Decl,
    Field,
    Spec,
    File,
    Error,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Literal => "literal",
            Kind::Ident => "ident",
            Kind::Expression => "expression",
            Kind::Statement => "statement",
            Kind::Type => "type",
            Kind::Decl => "decl",
            Kind::Field => "field",
            Kind::Spec => "spec",
            Kind::File => "file",
            Kind::Error => "error",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// VALUES
// ============================================================================

/// A child slot of a canonical node.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Str(String),
    Strings(Vec<String>),
    Node(Box<Node>),
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            Value::Strings(items) => Some(items),
            _ => None,
        }
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Value::Node(Box::new(node))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<Vec<Node>> for Value {
    fn from(nodes: Vec<Node>) -> Self {
        Value::List(nodes.into_iter().map(Value::from).collect())
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::List(values)
    }
}

impl From<Vec<String>> for Value {
    fn from(texts: Vec<String>) -> Self {
        Value::Strings(texts)
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Bool(flag)
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Str(text)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Str(text.to_string())
    }
}

// ============================================================================
// NODE
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: Kind,
    variant: Option<&'static str>,
    position: Option<Position>,
    fields: BTreeMap<&'static str, Value>,
}

impl Node {
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            variant: None,
            position: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn typed(kind: Kind, variant: &'static str) -> Self {
        Self {
            variant: Some(variant),
            ..Self::new(kind)
        }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with(mut self, key: &'static str, value: impl Into<Value>) -> Self {
        self.fields.insert(key, value.into());
        self
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn variant(&self) -> Option<&'static str> {
        self.variant
    }

    pub fn is(&self, kind: Kind, variant: &str) -> bool {
        self.kind == kind && self.variant == Some(variant)
    }

    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Named child node; `None` when the slot is absent, null, or not a node.
    pub fn node(&self, key: &str) -> Option<&Node> {
        self.get(key).and_then(Value::as_node)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn list(&self, key: &str) -> Option<&[Value]> {
        self.get(key).and_then(Value::as_list)
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// Moves a named child out of the node.
    pub fn take(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(serde::Serialize)]
#[serde(untagged)]
enum Entry<'a> {
    Text(&'a str),
    Position(&'a Position),
    Value(&'a Value),
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut entries: BTreeMap<&str, Entry<'_>> = self
            .fields
            .iter()
            .map(|(key, value)| (*key, Entry::Value(value)))
            .collect();
        entries.insert("kind", Entry::Text(self.kind.as_str()));
        if let Some(variant) = self.variant {
            entries.insert("type", Entry::Text(variant));
        }
        if let Some(position) = &self.position {
            entries.insert("position", Entry::Position(position));
        }

        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (key, entry) in &entries {
            map.serialize_entry(key, entry)?;
        }
        map.end()
    }
}
