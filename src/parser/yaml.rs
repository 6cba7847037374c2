//! YAML document model built from a tree-sitter parse
//!
//! Converts the concrete syntax tree into an explicit node variant that keeps
//! the 1-indexed line of every scalar, so extracted references can point back
//! at the line they were declared on.
//!
//! ```text
//! stream
//!   document
//!     block_node
//!       block_mapping
//!         block_mapping_pair            <- Mapping entry
//!           flow_node > plain_scalar    <- key
//!           block_node > block_mapping  <- nested Mapping
//!         block_mapping_pair
//!           flow_node > plain_scalar    <- key
//!           flow_node > plain_scalar    <- Scalar(text, line)
//! ```

use indexmap::IndexMap;
use tracing::warn;

use crate::parser::traits::ParseError;

/// A scalar value and the line it starts on (1-indexed)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scalar {
    pub value: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YamlNode {
    Mapping(IndexMap<String, YamlNode>),
    Sequence(Vec<YamlNode>),
    Scalar(Scalar),
}

impl YamlNode {
    /// Value stored under `key` when this node is a mapping
    pub fn get(&self, key: &str) -> Option<&YamlNode> {
        match self {
            YamlNode::Mapping(entries) => entries.get(key),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            YamlNode::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[YamlNode]> {
        match self {
            YamlNode::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Scalar text under `key`, or an empty string when absent or not a scalar
    pub fn str_value(&self, key: &str) -> &str {
        self.get(key)
            .and_then(YamlNode::as_scalar)
            .map(|s| s.value.as_str())
            .unwrap_or_default()
    }

    /// Visit every mapping entry depth-first in document order.
    ///
    /// The callback receives the enclosing mapping, the key and the value.
    /// Each entry is visited before the entries nested inside its value.
    pub fn walk<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(&'a IndexMap<String, YamlNode>, &'a str, &'a YamlNode),
    {
        match self {
            YamlNode::Mapping(entries) => {
                for (key, value) in entries {
                    visit(entries, key.as_str(), value);
                    value.walk(visit);
                }
            }
            YamlNode::Sequence(items) => {
                for item in items {
                    item.walk(visit);
                }
            }
            YamlNode::Scalar(_) => {}
        }
    }
}

/// Parse the first document of `content`.
///
/// Returns `Ok(None)` for an empty document and an error when tree-sitter
/// reports a syntax error anywhere in the stream.
pub fn parse_document(content: &str) -> Result<Option<YamlNode>, ParseError> {
    let mut parser = tree_sitter::Parser::new();
    let language = tree_sitter_yaml::LANGUAGE;
    parser.set_language(&language.into()).map_err(|e| {
        warn!("Failed to set YAML language for tree-sitter: {}", e);
        ParseError::TreeSitter(e.to_string())
    })?;

    let tree = parser.parse(content, None).ok_or_else(|| {
        warn!("Failed to parse YAML content");
        ParseError::ParseFailed("Failed to parse YAML".to_string())
    })?;

    let root = tree.root_node();
    if root.has_error() {
        return Err(ParseError::InvalidSyntax(format!(
            "YAML syntax error near line {}",
            first_error_line(root)
        )));
    }

    let mut cursor = root.walk();
    let document = root
        .named_children(&mut cursor)
        .find(|child| child.kind() == "document");

    Ok(document.and_then(|doc| convert(doc, content)))
}

fn first_error_line(node: tree_sitter::Node) -> usize {
    if node.is_error() || node.is_missing() {
        return node.start_position().row + 1;
    }
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .find(|child| child.has_error())
        .map(first_error_line)
        .unwrap_or(node.start_position().row + 1)
}

/// Convert a syntax node into a [`YamlNode`].
///
/// Wrapper nodes (document, block_node, flow_node) resolve to their first
/// convertible child, which skips anchors, tags and comments. Aliases are
/// not expanded and convert to `None`.
fn convert(node: tree_sitter::Node, content: &str) -> Option<YamlNode> {
    match node.kind() {
        "document" | "block_node" | "flow_node" => {
            let mut cursor = node.walk();
            node.named_children(&mut cursor)
                .find_map(|child| convert(child, content))
        }
        "block_mapping" | "flow_mapping" => Some(convert_mapping(node, content)),
        "block_sequence" | "flow_sequence" => Some(convert_sequence(node, content)),
        "plain_scalar" | "double_quote_scalar" | "single_quote_scalar" | "block_scalar" => {
            Some(YamlNode::Scalar(Scalar {
                value: scalar_text(node, content),
                line: node.start_position().row + 1,
            }))
        }
        _ => None,
    }
}

fn convert_mapping(node: tree_sitter::Node, content: &str) -> YamlNode {
    let mut entries = IndexMap::new();
    let mut cursor = node.walk();

    for pair in node.named_children(&mut cursor) {
        if !matches!(pair.kind(), "block_mapping_pair" | "flow_pair") {
            continue;
        }

        let Some(key_node) = pair.child_by_field_name("key") else {
            continue;
        };
        let Some(YamlNode::Scalar(key)) = convert(key_node, content) else {
            continue;
        };

        // `key:` with no value is an empty scalar on the key's line
        let value = pair
            .child_by_field_name("value")
            .and_then(|value| convert(value, content))
            .unwrap_or_else(|| {
                YamlNode::Scalar(Scalar {
                    value: String::new(),
                    line: key.line,
                })
            });

        entries.insert(key.value, value);
    }

    YamlNode::Mapping(entries)
}

fn convert_sequence(node: tree_sitter::Node, content: &str) -> YamlNode {
    let mut items = Vec::new();
    let mut cursor = node.walk();

    for child in node.named_children(&mut cursor) {
        let item = match child.kind() {
            "block_sequence_item" => {
                let mut item_cursor = child.walk();
                child
                    .named_children(&mut item_cursor)
                    .find_map(|inner| convert(inner, content))
            }
            "flow_node" => convert(child, content),
            _ => None,
        };
        items.extend(item);
    }

    YamlNode::Sequence(items)
}

fn scalar_text(node: tree_sitter::Node, content: &str) -> String {
    let raw = &content[node.byte_range()];
    match node.kind() {
        "double_quote_scalar" => unescape_double_quoted(strip_quotes(raw, '"')),
        "single_quote_scalar" => strip_quotes(raw, '\'').replace("''", "'"),
        "block_scalar" => block_scalar_text(raw),
        _ => raw.trim().to_string(),
    }
}

fn strip_quotes(raw: &str, quote: char) -> &str {
    let raw = raw.trim();
    raw.strip_prefix(quote)
        .and_then(|s| s.strip_suffix(quote))
        .unwrap_or(raw)
}

fn unescape_double_quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Literal (`|`) and folded (`>`) block scalars, dedented
fn block_scalar_text(raw: &str) -> String {
    let mut lines = raw.lines();
    let header = lines.next().unwrap_or_default().trim();
    let body: Vec<&str> = lines.collect();

    let indent = body
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let dedented: Vec<&str> = body
        .iter()
        .map(|line| line.get(indent..).unwrap_or("").trim_end())
        .collect();

    let separator = if header.starts_with('>') { " " } else { "\n" };
    dedented.join(separator).trim_end().to_string()
}
