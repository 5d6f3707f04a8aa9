//! Rich-text storage formats.
//!
//! Rich-text fields have been stored three ways over the life of the site: as a JSON array
//! of block nodes (`[{type, children: [{text, bold?, italic?}]}]`), as HTML, and as plain
//! strings. Some older writes also wrapped the block JSON in HTML tags. HTML is the only
//! format written going forward; [`normalize`] turns anything historical into it and never
//! fails.

use crate::content::{self, Node, Path};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

static EMBEDDED_BLOCKS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)\[\s*\{.*\}\s*\]").ok());

/// How a stored rich-text value is encoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum StoredFormat {
    Empty,
    /// HTML or plain text; rendered as is.
    Html,
    /// A block-node array, either as JSON or as a JSON-encoded string.
    Blocks,
    /// Block JSON buried inside other markup.
    EmbeddedBlocks,
}

fn is_block_node(v: &Value) -> bool {
    v.get("type").is_some() || v.get("children").is_some()
}

/// Finds block JSON inside a string, returning the decoded nodes and whether the match
/// covered the whole (trimmed) input.
fn sniff_embedded(s: &str) -> Option<(Vec<Value>, bool)> {
    let re = EMBEDDED_BLOCKS.as_ref()?;
    let m = re.find(s)?;
    let Ok(Value::Array(nodes)) = serde_json::from_str::<Value>(m.as_str()) else {
        return None;
    };
    if nodes.is_empty() || !nodes.iter().all(is_block_node) {
        return None;
    }
    Some((nodes, m.as_str().len() == s.trim().len()))
}

fn parse_direct(s: &str) -> Option<Vec<Value>> {
    let trimmed = s.trim_start();
    if !trimmed.starts_with('[') {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Array(nodes)) => Some(nodes),
        _ => None,
    }
}

pub fn detect_format(raw: &Value) -> StoredFormat {
    match raw {
        Value::Null => StoredFormat::Empty,
        Value::String(s) if s.is_empty() => StoredFormat::Empty,
        Value::Array(_) | Value::Object(_) => StoredFormat::Blocks,
        Value::String(s) => match sniff_embedded(s) {
            Some((_, true)) => StoredFormat::Blocks,
            Some((_, false)) => StoredFormat::EmbeddedBlocks,
            None if parse_direct(s).is_some() => StoredFormat::Blocks,
            None => StoredFormat::Html,
        },
        Value::Bool(_) | Value::Number(_) => StoredFormat::Html,
    }
}

/// Renders any stored rich-text value as HTML.
pub fn normalize(raw: &Value) -> String {
    match raw {
        Value::Null => String::new(),
        Value::Array(nodes) => render_blocks(nodes),
        Value::Object(_) => render_blocks(std::slice::from_ref(raw)),
        Value::String(s) => normalize_str(s),
        Value::Bool(_) | Value::Number(_) => raw.to_string(),
    }
}

pub fn normalize_str(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    if let Some((nodes, _)) = sniff_embedded(raw) {
        return render_blocks(&nodes);
    }
    if let Some(nodes) = parse_direct(raw) {
        return render_blocks(&nodes);
    }
    raw.to_string()
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn leaf_text(leaf: &Value) -> String {
    escape_html(leaf.get("text").and_then(Value::as_str).unwrap_or_default())
}

fn render_leaf(leaf: &Value) -> String {
    let flag = |k: &str| leaf.get(k).and_then(Value::as_bool).unwrap_or(false);
    let mut html = leaf_text(leaf);
    if flag("bold") {
        html = format!("<strong>{html}</strong>");
    }
    if flag("italic") {
        html = format!("<em>{html}</em>");
    }
    html
}

fn render_block(node: &Value) -> String {
    let children = node.get("children").and_then(Value::as_array);
    let is_paragraph = node.get("type").and_then(Value::as_str) == Some("paragraph");

    match (children, node.get("text").and_then(Value::as_str)) {
        (Some(children), _) if is_paragraph => {
            let inner: String = children.iter().map(render_leaf).collect();
            format!("<p>{inner}</p>")
        }
        (Some(children), _) => {
            let inner: String = children.iter().map(leaf_text).collect();
            format!("<p>{inner}</p>")
        }
        (None, Some(text)) => format!("<p>{}</p>", escape_html(text)),
        (None, None) => String::new(),
    }
}

fn render_blocks(nodes: &[Value]) -> String {
    nodes.iter().map(render_block).collect()
}

/// True for a content-tree array made of block nodes with `children`.
pub fn is_block_array(node: &Node) -> bool {
    node.as_array().is_some_and(|items| {
        !items.is_empty()
            && items
                .iter()
                .all(|i| matches!(i.field("children"), Some(Node::Array(_))))
    })
}

/// Rich-text field value, always held as HTML.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value", into = "String")]
pub struct RichText(String);

impl RichText {
    /// Reads any historical storage format.
    pub fn from_stored(raw: &Value) -> Self {
        RichText(normalize(raw))
    }

    pub fn from_html(html: impl Into<String>) -> Self {
        RichText(html.into())
    }

    pub fn as_html(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// String written back to the backend.
    pub fn to_stored(&self) -> String {
        self.0.clone()
    }
}

impl From<Value> for RichText {
    fn from(raw: Value) -> Self {
        RichText::from_stored(&raw)
    }
}

impl From<RichText> for String {
    fn from(rt: RichText) -> Self {
        rt.0
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub migrated: Vec<Path>,
    pub unchanged: Vec<Path>,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.migrated.is_empty()
    }
}

fn needs_migration(node: &Node) -> bool {
    match node {
        Node::String(s) => matches!(
            detect_format(&Value::String(s.clone())),
            StoredFormat::Blocks | StoredFormat::EmbeddedBlocks
        ),
        Node::Array(_) => is_block_array(node),
        Node::Object(_) => is_block_node(&Value::from(node.clone())) && node.field("children").is_some(),
        _ => false,
    }
}

/// Paths of every value in the tree still stored in a legacy block format.
pub fn find_legacy_fields(root: &Node) -> Vec<Path> {
    fn walk(node: &Node, at: Path, out: &mut Vec<Path>) {
        if needs_migration(node) {
            out.push(at);
            return;
        }
        match node {
            Node::Object(fields) => {
                for (k, v) in fields.iter() {
                    walk(v, at.key(k), out);
                }
            }
            Node::Array(items) => {
                for (i, v) in items.iter().enumerate() {
                    walk(v, at.index(i), out);
                }
            }
            _ => {}
        }
    }

    let mut out = Vec::new();
    walk(root, Path::root(), &mut out);
    out
}

/// Rewrites legacy rich-text values at `fields` as HTML.
///
/// This is the only place the embedded-JSON sniffing runs against stored documents; once a
/// document has been saved back it only holds HTML.
pub fn migrate_document(root: &Node, fields: &[Path]) -> (Node, MigrationReport) {
    let mut doc = root.clone();
    let mut report = MigrationReport::default();

    for path in fields {
        let Some(current) = content::get(&doc, path) else {
            report.unchanged.push(path.clone());
            continue;
        };
        if !needs_migration(current) {
            report.unchanged.push(path.clone());
            continue;
        }

        let html = normalize(&Value::from(current.clone()));
        match content::set_value(&doc, path, Node::String(html)) {
            Ok(next) => {
                doc = next;
                report.migrated.push(path.clone());
            }
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "rich-text migration skipped field");
                report.unchanged.push(path.clone());
            }
        }
    }

    if !report.is_noop() {
        tracing::debug!(migrated = report.migrated.len(), "migrated legacy rich-text fields");
    }
    (doc, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_inputs() {
        assert_eq!(normalize(&Value::Null), "");
        assert_eq!(normalize(&json!("")), "");
        assert_eq!(detect_format(&json!("")), StoredFormat::Empty);
    }

    #[test]
    fn test_bold_paragraph() {
        let raw = json!([{"type": "paragraph", "children": [{"text": "A", "bold": true}]}]);
        assert_eq!(normalize(&raw), "<p><strong>A</strong></p>");
    }

    #[test]
    fn test_mixed_marks_and_shapes() {
        let raw = json!([
            {"type": "paragraph", "children": [
                {"text": "plain "},
                {"text": "it", "italic": true},
                {"text": "both", "bold": true, "italic": true}
            ]},
            {"type": "heading", "children": [{"text": "raw", "bold": true}]},
            {"text": "loose"},
            {"type": "image", "url": "x.png"}
        ]);
        assert_eq!(
            normalize(&raw),
            "<p>plain <em>it</em><em><strong>both</strong></em></p><p>raw</p><p>loose</p>"
        );
    }

    #[test]
    fn test_single_object_is_a_block_list() {
        assert_eq!(normalize(&json!({"text": "solo"})), "<p>solo</p>");
    }

    #[test]
    fn test_json_string_is_parsed() {
        let raw = r#"[{"type":"paragraph","children":[{"text":"Hi"}]}]"#;
        assert_eq!(normalize_str(raw), "<p>Hi</p>");
        assert_eq!(detect_format(&json!(raw)), StoredFormat::Blocks);
    }

    #[test]
    fn test_json_wrapped_in_markup_is_recovered() {
        let raw = r#"<p>[{"type":"paragraph","children":[{"text":"Fees"}]}]</p>"#;
        assert_eq!(normalize_str(raw), "<p>Fees</p>");
        assert_eq!(detect_format(&json!(raw)), StoredFormat::EmbeddedBlocks);
    }

    #[test]
    fn test_malformed_embedded_json_is_returned_unchanged() {
        let raw = "<p>[{bad json</p>";
        assert_eq!(normalize_str(raw), raw);
        assert_eq!(detect_format(&json!(raw)), StoredFormat::Html);
    }

    #[test]
    fn test_bracketed_non_block_json_falls_through() {
        let raw = r#"<p>Scores: [{"a":1}]</p>"#;
        assert_eq!(normalize_str(raw), raw);
    }

    #[test]
    fn test_plain_html_passes_through() {
        let raw = "<h2>Admissions</h2><p>Open now</p>";
        assert_eq!(normalize_str(raw), raw);
    }

    #[test]
    fn test_text_is_escaped() {
        let raw = json!([{"type": "paragraph", "children": [{"text": "a < b & c"}]}]);
        assert_eq!(normalize(&raw), "<p>a &lt; b &amp; c</p>");
    }

    #[test]
    fn test_rich_text_deserializes_any_format() {
        let rt: RichText = serde_json::from_value(json!([{"text": "x"}])).unwrap();
        assert_eq!(rt.as_html(), "<p>x</p>");
        assert_eq!(serde_json::to_value(&rt).unwrap(), json!("<p>x</p>"));
        assert!(RichText::from_html("  ").is_empty());
    }

    #[test]
    fn test_migrate_document() {
        let doc = Node::from(json!({
            "overview": {
                "body": "[{\"type\":\"paragraph\",\"children\":[{\"text\":\"Old\"}]}]",
                "intro": "<p>New</p>"
            },
            "eligibility": [{"type": "paragraph", "children": [{"text": "E"}]}],
            "nav": [{"type": "link", "title": "Home"}]
        }));

        let fields = find_legacy_fields(&doc);
        assert_eq!(
            fields,
            vec![Path::parse("eligibility"), Path::parse("overview.body")]
        );

        let (out, report) = migrate_document(&doc, &fields);
        assert_eq!(report.migrated.len(), 2);
        assert_eq!(
            content::get(&out, &Path::parse("overview.body")).and_then(Node::as_str),
            Some("<p>Old</p>")
        );
        assert_eq!(
            content::get(&out, &Path::parse("eligibility")).and_then(Node::as_str),
            Some("<p>E</p>")
        );
        assert!(doc.field("nav").unwrap().same_ref(out.field("nav").unwrap()));

        let (again, report) = migrate_document(&out, &[Path::parse("overview.intro")]);
        assert!(report.is_noop());
        assert!(again.same_ref(&out));
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn html_without_brackets_is_untouched(s in "[^\\[]{0,64}") {
            prop_assert_eq!(normalize_str(&s), s);
        }

        #[test]
        fn normalize_never_panics(s in ".{0,128}") {
            let _ = normalize_str(&s);
        }
    }
}
