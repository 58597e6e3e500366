//! Depth-first search for the sentinel, collecting test labels on the way.

use tree_sitter::{Node, Tree};

use super::error::LocateError;
use super::marker::SENTINEL;
use super::treesitter::node_text;

/// Callee names that register a test or a test group.
pub const TEST_FUNCTIONS: &[&str] = &["describe", "it"];

/// Labels of the test calls enclosing the sentinel, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestPath {
    labels: Vec<String>,
}

impl TestPath {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels joined by single spaces, trimmed.
    pub fn render(&self) -> String {
        self.labels.join(" ").trim().to_string()
    }
}

impl std::fmt::Display for TestPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

/// Find the path of test labels leading to the sentinel in `tree`.
pub fn find_test_path(tree: &Tree, content: &str) -> Result<TestPath, LocateError> {
    let mut labels = Vec::new();
    if search(tree.root_node(), content, &mut labels) {
        Ok(TestPath::new(labels))
    } else {
        Err(LocateError::SentinelUnreachable)
    }
}

fn search(node: Node<'_>, content: &str, labels: &mut Vec<String>) -> bool {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if is_sentinel(&child, content) {
            return true;
        }

        let pushed = match test_label(&child, content) {
            Some(label) if !label.is_empty() => {
                labels.push(label.to_string());
                true
            }
            _ => false,
        };

        if search(child, content, labels) {
            return true;
        }
        if pushed {
            labels.pop();
        }
    }
    false
}

fn is_sentinel(node: &Node, content: &str) -> bool {
    node.kind() == "string" && node_text(node, content) == SENTINEL
}

/// Label of a `describe`/`it` call, when its first argument is a string.
pub fn test_label<'a>(node: &Node, content: &'a str) -> Option<&'a str> {
    if node.kind() != "call_expression" {
        return None;
    }

    let callee = node.child_by_field_name("function")?;
    if callee.kind() != "identifier" || !TEST_FUNCTIONS.contains(&node_text(&callee, content)) {
        return None;
    }

    let arguments = node.child_by_field_name("arguments")?;
    let mut cursor = arguments.walk();
    let first = arguments
        .named_children(&mut cursor)
        .find(|arg| arg.kind() != "comment")?;

    if first.kind() != "string" {
        return None;
    }
    Some(node_text(&first, content).trim_matches(|c| c == '\'' || c == '"'))
}
