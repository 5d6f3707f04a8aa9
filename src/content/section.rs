use super::node::Node;
use super::path::Path;
use crate::richtext::{detect_format, is_block_array, StoredFormat};
use std::collections::BTreeMap;

/// What kind of editor a section of a content document needs.
///
/// Documents have no schema; the shape the backend returns decides the variant.
#[derive(Clone, Debug, PartialEq)]
pub enum SectionContent {
    Empty,
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
    /// `{label, value}` pair.
    Field { label: String, value: Node },
    /// HTML or legacy block content.
    RichText(String),
    /// Uploaded asset URL.
    Image(String),
    /// Rows with an identical column set.
    Table {
        columns: Vec<String>,
        rows: Vec<Node>,
    },
    List(Vec<Node>),
    Group(BTreeMap<String, Node>),
}

const IMAGE_KEY_HINTS: [&str; 6] = ["image", "img", "photo", "logo", "banner", "icon"];

/// Keys like `heroImage` or `logo` hold asset URLs even while still empty.
pub fn is_image_key(key: Option<&str>) -> bool {
    key.map(str::to_ascii_lowercase)
        .is_some_and(|k| IMAGE_KEY_HINTS.iter().any(|h| k.contains(h)))
}

const IMAGE_EXTENSIONS: [&str; 7] = [".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg", ".avif"];

fn looks_like_image_url(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    let path = lower.split(['?', '#']).next().unwrap_or_default();
    (lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with('/'))
        && IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

fn looks_like_rich_text(s: &str) -> bool {
    matches!(
        detect_format(&serde_json::Value::String(s.to_string())),
        StoredFormat::Blocks | StoredFormat::EmbeddedBlocks
    ) || (s.trim_start().starts_with('<') && s.contains("</"))
}

/// Column names when every row is a record with the same keys.
fn table_columns(items: &[Node]) -> Option<Vec<String>> {
    let first = items.first()?.as_object()?;
    if first.len() < 2 {
        return None;
    }
    let columns: Vec<String> = first.keys().cloned().collect();
    let uniform = items.iter().all(|row| {
        row.as_object().is_some_and(|r| {
            r.len() == columns.len()
                && columns.iter().all(|c| r.contains_key(c))
                && r.values().all(|v| !matches!(v, Node::Array(_) | Node::Object(_)))
        })
    });
    uniform.then_some(columns)
}

impl SectionContent {
    pub fn classify(node: &Node) -> Self {
        match node {
            Node::Null => SectionContent::Empty,
            Node::Bool(b) => SectionContent::Flag(*b),
            Node::Number(n) => SectionContent::Number(n.clone()),
            Node::String(s) if looks_like_image_url(s) => SectionContent::Image(s.clone()),
            Node::String(s) if looks_like_rich_text(s) => SectionContent::RichText(s.clone()),
            Node::String(s) => SectionContent::Text(s.clone()),
            Node::Array(items) => {
                if items.is_empty() {
                    return SectionContent::List(Vec::new());
                }
                if is_block_array(node) {
                    return SectionContent::RichText(
                        serde_json::Value::from(node.clone()).to_string(),
                    );
                }
                match table_columns(items) {
                    Some(columns) => SectionContent::Table {
                        columns,
                        rows: items.to_vec(),
                    },
                    None => SectionContent::List(items.to_vec()),
                }
            }
            Node::Object(fields) => {
                let is_field = fields.len() <= 2
                    && fields.contains_key("label")
                    && fields.contains_key("value");
                if is_field {
                    SectionContent::Field {
                        label: fields
                            .get("label")
                            .map(Node::display_text)
                            .unwrap_or_default(),
                        value: fields.get("value").cloned().unwrap_or_default(),
                    }
                } else {
                    SectionContent::Group(BTreeMap::clone(fields))
                }
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SectionContent::Empty => "empty",
            SectionContent::Text(_) => "text",
            SectionContent::Number(_) => "number",
            SectionContent::Flag(_) => "flag",
            SectionContent::Field { .. } => "field",
            SectionContent::RichText(_) => "rich-text",
            SectionContent::Image(_) => "image",
            SectionContent::Table { .. } => "table",
            SectionContent::List(_) => "list",
            SectionContent::Group(_) => "group",
        }
    }
}

/// Widget used for a single value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeafKind {
    Text,
    Number,
    Flag,
    RichText,
    Image,
}

impl LeafKind {
    /// Widget suggested by a value and its key. `None` for lists and records.
    pub fn detect(key: Option<&str>, node: &Node) -> Option<Self> {
        let kind = match SectionContent::classify(node) {
            SectionContent::Empty | SectionContent::Text(_) if is_image_key(key) => LeafKind::Image,
            SectionContent::Empty | SectionContent::Text(_) => LeafKind::Text,
            SectionContent::Number(_) => LeafKind::Number,
            SectionContent::Flag(_) => LeafKind::Flag,
            SectionContent::RichText(_) => LeafKind::RichText,
            SectionContent::Image(_) => LeafKind::Image,
            SectionContent::Field { .. }
            | SectionContent::Table { .. }
            | SectionContent::List(_)
            | SectionContent::Group(_) => return None,
        };
        Some(kind)
    }
}

/// Values are leaves unless they are records or plain lists; legacy block arrays count as
/// a single rich-text value.
fn is_leaf(node: &Node) -> bool {
    match node {
        Node::Object(_) => false,
        Node::Array(_) => is_block_array(node),
        _ => true,
    }
}

/// `curriculum.2.title` -> `curriculum.*.title`
fn pattern(path: &Path) -> Path {
    path.segments()
        .iter()
        .map(|seg| if seg.parse::<usize>().is_ok() { "*" } else { seg.as_str() })
        .fold(Path::root(), |p, seg| p.key(seg))
}

/// Editor widget pinned per field.
///
/// Kinds are detected once, when a document is loaded or a field first appears, and then
/// stay put while the value is edited: clearing a rich-text field must not turn it into a
/// plain input. List indices are wildcarded, so rows added later share the kind of the rows
/// already there.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditorKinds(BTreeMap<Path, LeafKind>);

impl EditorKinds {
    /// Detects every leaf of a freshly loaded document. Within a list, rich text or an image
    /// in any row wins over plain text in another.
    pub fn detect(doc: &Node) -> Self {
        let mut kinds = Self::default();
        kinds.walk(doc, &Path::root(), true);
        kinds
    }

    /// Pins leaves that have no kind yet. Existing pins are left alone.
    pub fn fill(&mut self, doc: &Node) {
        self.walk(doc, &Path::root(), false);
    }

    pub fn pin(&mut self, path: &Path, kind: LeafKind) {
        self.0.insert(pattern(path), kind);
    }

    pub fn get(&self, path: &Path) -> Option<LeafKind> {
        self.0.get(&pattern(path)).copied()
    }

    /// Widget for the value at `path`; `None` when it is a list or record.
    pub fn kind_at(&self, path: &Path, node: &Node) -> Option<LeafKind> {
        if !is_leaf(node) {
            return None;
        }
        self.get(path).or_else(|| LeafKind::detect(path.leaf(), node))
    }

    fn walk(&mut self, node: &Node, path: &Path, upgrade: bool) {
        if is_leaf(node) {
            let Some(kind) = LeafKind::detect(path.leaf(), node) else {
                return;
            };
            let slot = self.0.entry(pattern(path)).or_insert(kind);
            if upgrade
                && *slot == LeafKind::Text
                && matches!(kind, LeafKind::RichText | LeafKind::Image)
            {
                *slot = kind;
            }
            return;
        }
        match node {
            Node::Object(fields) => {
                for (key, value) in fields.iter() {
                    self.walk(value, &path.key(key), upgrade);
                }
            }
            Node::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.walk(item, &path.index(i), upgrade);
                }
            }
            _ => {}
        }
    }
}

/// Signature of a document's editable layout: record keys and list lengths, but no leaf
/// values. Editing a value never changes it, so the form is only rebuilt when fields or
/// rows come and go.
pub fn shape_key(node: &Node) -> String {
    fn walk(node: &Node, out: &mut String) {
        match node {
            Node::Object(fields) => {
                out.push('{');
                for (k, v) in fields.iter() {
                    out.push_str(k);
                    out.push(':');
                    walk(v, out);
                    out.push(';');
                }
                out.push('}');
            }
            Node::Array(items) if !is_block_array(node) => {
                out.push('[');
                for item in items.iter() {
                    walk(item, out);
                    out.push(';');
                }
                out.push(']');
            }
            _ => out.push('.'),
        }
    }

    let mut out = String::new();
    walk(node, &mut out);
    out
}
