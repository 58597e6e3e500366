//! Tree-sitter parsing for spec files.

use std::path::Path;

use tree_sitter::{Language, Node, Parser as TSParser, Tree};

use super::error::LocateError;

/// Source language of a spec file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Dialect {
    #[default]
    JavaScript,
    TypeScript,
    Tsx,
}

impl Dialect {
    /// Pick a dialect from a file extension (without the leading dot).
    /// Unknown extensions fall back to JavaScript.
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            "ts" | "mts" | "cts" => Self::TypeScript,
            "tsx" => Self::Tsx,
            _ => Self::JavaScript,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or_default()
    }

    pub fn language_name(&self) -> &'static str {
        match self {
            Self::JavaScript => "JavaScript",
            Self::TypeScript => "TypeScript",
            Self::Tsx => "TSX",
        }
    }

    fn language(&self) -> Language {
        match self {
            Self::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// Parses source text into a tree-sitter tree for one dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceParser {
    dialect: Dialect,
}

impl SourceParser {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Parse `content`. A tree with any error or missing node is rejected.
    pub fn parse_tree(&self, content: &str) -> Result<Tree, LocateError> {
        let mut parser = TSParser::new();
        parser
            .set_language(&self.dialect.language())
            .map_err(|e| LocateError::Parse(format!("failed to set language: {e}")))?;

        let tree = parser
            .parse(content, None)
            .ok_or_else(|| LocateError::Parse("failed to parse content".to_string()))?;

        let root = tree.root_node();
        if root.has_error() {
            let message = match first_error(root) {
                Some(node) => {
                    let at = node.start_position();
                    format!(
                        "invalid {} at line {}, column {}",
                        self.dialect.language_name(),
                        at.row + 1,
                        at.column + 1
                    )
                }
                None => format!("invalid {}", self.dialect.language_name()),
            };
            return Err(LocateError::Parse(message));
        }

        Ok(tree)
    }
}

/// Get text for a node from source content.
pub fn node_text<'a>(node: &Node, content: &'a str) -> &'a str {
    &content[node.byte_range()]
}

/// First error or missing node in pre-order.
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}
