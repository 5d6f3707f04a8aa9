use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Persistent, JSON-shaped content tree.
///
/// Containers are `Arc`-shared: cloning a `Node` is cheap and an edit only rebuilds the
/// containers between the root and the touched leaf. Everything else stays pointer-equal,
/// which is what the page editors rely on for change detection and undo history.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum Node {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Arc<Vec<Node>>),
    Object(Arc<BTreeMap<String, Node>>),
}

impl Node {
    pub fn empty_object() -> Self {
        Node::Object(Arc::new(BTreeMap::new()))
    }

    pub fn array(items: Vec<Node>) -> Self {
        Node::Array(Arc::new(items))
    }

    pub fn object(fields: BTreeMap<String, Node>) -> Self {
        Node::Object(Arc::new(fields))
    }

    pub fn text(s: impl Into<String>) -> Self {
        Node::String(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Node]> {
        match self {
            Node::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Node>> {
        match self {
            Node::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Field lookup on an object node.
    pub fn field(&self, key: &str) -> Option<&Node> {
        self.as_object().and_then(|m| m.get(key))
    }

    /// Text used when a scalar is shown in a plain input.
    pub fn display_text(&self) -> String {
        match self {
            Node::Null => String::new(),
            Node::Bool(b) => b.to_string(),
            Node::Number(n) => n.to_string(),
            Node::String(s) => s.clone(),
            Node::Array(_) | Node::Object(_) => Value::from(self.clone()).to_string(),
        }
    }

    /// True when both nodes are the same shared container (or equal scalars).
    ///
    /// Scalars have no identity, so they compare by value.
    pub fn same_ref(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Array(a), Node::Array(b)) => Arc::ptr_eq(a, b),
            (Node::Object(a), Node::Object(b)) => Arc::ptr_eq(a, b),
            (Node::Array(_), _) | (Node::Object(_), _) => false,
            (a, b) => a == b,
        }
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(b),
            Value::Number(n) => Node::Number(n),
            Value::String(s) => Node::String(s),
            Value::Array(items) => Node::array(items.into_iter().map(Node::from).collect()),
            Value::Object(map) => {
                Node::object(map.into_iter().map(|(k, v)| (k, Node::from(v))).collect())
            }
        }
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        match node {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(b),
            Node::Number(n) => Value::Number(n),
            Node::String(s) => Value::String(s),
            Node::Array(items) => {
                Value::Array(items.iter().cloned().map(Value::from).collect())
            }
            Node::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from(v.clone())))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::String(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::String(s)
    }
}
