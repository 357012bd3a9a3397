//! Parse trees and their text rendering
//!
//! A [`ParseTreeNode`] is what the engine hands back after a successful parse.
//! It arrives in the engine's `ptree` JSON shape, `["label", "text"]` for a
//! leaf and `["label", [child, ...]]` for an inner node, and is read-only from
//! here on.
//!
//! ## Example
//!
//! ```text
//! sum
//! ├─num "1"
//! ├─op "+"
//! └─num "2"
//! ```
//!
//! Rendering walks the tree with an explicit stack, so deeply nested grammars
//! cannot exhaust the call stack.

use serde::{Deserialize, Serialize};

use super::config::TreeStyle;
use super::text::escape_inline;

/// A labelled parse tree node: either a leaf with matched text or an inner
/// node with at least one child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawNode", into = "RawNode")]
pub struct ParseTreeNode {
    label: String,
    body: NodeBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeBody {
    Leaf(String),
    Children(Vec<ParseTreeNode>),
}

impl ParseTreeNode {
    pub fn leaf(label: impl Into<String>, text: impl Into<String>) -> Self {
        ParseTreeNode {
            label: label.into(),
            body: NodeBody::Leaf(text.into()),
        }
    }

    /// Build an inner node. Returns `None` when `children` is empty.
    pub fn node(label: impl Into<String>, children: Vec<ParseTreeNode>) -> Option<Self> {
        if children.is_empty() {
            return None;
        }
        Some(ParseTreeNode {
            label: label.into(),
            body: NodeBody::Children(children),
        })
    }

    pub fn children(&self) -> &[ParseTreeNode] {
        match &self.body {
            NodeBody::Leaf(_) => &[],
            NodeBody::Children(children) => children,
        }
    }
}

/// Wire shape of a node: a two-element JSON array.
#[derive(Serialize, Deserialize)]
struct RawNode(String, RawBody);

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawBody {
    Text(String),
    Children(Vec<ParseTreeNode>),
}

impl TryFrom<RawNode> for ParseTreeNode {
    type Error = String;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        let RawNode(label, body) = raw;
        match body {
            RawBody::Text(text) => Ok(ParseTreeNode::leaf(label, text)),
            RawBody::Children(children) => ParseTreeNode::node(label.clone(), children)
                .ok_or_else(|| format!("node '{}' has an empty child list", label)),
        }
    }
}

impl From<ParseTreeNode> for RawNode {
    fn from(node: ParseTreeNode) -> Self {
        let body = match node.body {
            NodeBody::Leaf(text) => RawBody::Text(text),
            NodeBody::Children(children) => RawBody::Children(children),
        };
        RawNode(node.label, body)
    }
}

fn node_content(node: &ParseTreeNode) -> String {
    match &node.body {
        NodeBody::Leaf(text) => format!("{} \"{}\"", node.label, escape_inline(text)),
        NodeBody::Children(_) => node.label.clone(),
    }
}

/// Render a tree with the default connector style.
pub fn to_tree_str(tree: &ParseTreeNode) -> String {
    render_tree(tree, TreeStyle::Connectors)
}

/// Render a tree, one line per node, children in their given order.
pub fn render_tree(tree: &ParseTreeNode, style: TreeStyle) -> String {
    struct Frame<'a> {
        node: &'a ParseTreeNode,
        prefix: String,
        depth: usize,
        is_last: bool,
    }

    let mut output = String::new();
    let mut stack = vec![Frame {
        node: tree,
        prefix: String::new(),
        depth: 0,
        is_last: true,
    }];

    while let Some(frame) = stack.pop() {
        let line_prefix = match style {
            TreeStyle::Connectors if frame.depth == 0 => String::new(),
            TreeStyle::Connectors => {
                let connector = if frame.is_last { "└─" } else { "├─" };
                format!("{}{}", frame.prefix, connector)
            }
            TreeStyle::Bars => "│ ".repeat(frame.depth),
        };
        output.push_str(&format!("{}{}\n", line_prefix, node_content(frame.node)));

        let children = frame.node.children();
        if children.is_empty() {
            continue;
        }

        let child_prefix = if frame.depth == 0 {
            String::new()
        } else {
            format!("{}{}", frame.prefix, if frame.is_last { "  " } else { "│ " })
        };
        let count = children.len();
        for (i, child) in children.iter().enumerate().rev() {
            stack.push(Frame {
                node: child,
                prefix: child_prefix.clone(),
                depth: frame.depth + 1,
                is_last: i == count - 1,
            });
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ParseTreeNode {
        let sum = ParseTreeNode::node(
            "sum",
            vec![
                ParseTreeNode::leaf("num", "1"),
                ParseTreeNode::leaf("op", "+"),
                ParseTreeNode::node("group", vec![ParseTreeNode::leaf("num", "2")]).unwrap(),
            ],
        );
        sum.unwrap()
    }

    #[test]
    fn renders_connectors() {
        assert_eq!(
            to_tree_str(&sample()),
            "sum\n├─num \"1\"\n├─op \"+\"\n└─group\n  └─num \"2\"\n"
        );
    }

    #[test]
    fn renders_bars() {
        assert_eq!(
            render_tree(&sample(), TreeStyle::Bars),
            "sum\n│ num \"1\"\n│ op \"+\"\n│ group\n│ │ num \"2\"\n"
        );
    }

    #[test]
    fn continuation_marker_follows_non_last_parent() {
        let tree = ParseTreeNode::node(
            "root",
            vec![
                ParseTreeNode::node("a", vec![ParseTreeNode::leaf("x", "1")]).unwrap(),
                ParseTreeNode::leaf("b", "2"),
            ],
        )
        .unwrap();
        assert_eq!(
            to_tree_str(&tree),
            "root\n├─a\n│ └─x \"1\"\n└─b \"2\"\n"
        );
    }

    #[test]
    fn leaf_root_and_escaping() {
        let tree = ParseTreeNode::leaf("line", "a\tb\n");
        assert_eq!(to_tree_str(&tree), "line \"a\\tb\\n\"\n");
    }

    #[test]
    fn reads_ptree_json() {
        let tree: ParseTreeNode =
            serde_json::from_str(r#"["sum",[["num","1"],["op","+"],["group",[["num","2"]]]]]"#)
                .unwrap();
        assert_eq!(tree, sample());
        let back = serde_json::to_string(&tree).unwrap();
        assert_eq!(back, r#"["sum",[["num","1"],["op","+"],["group",[["num","2"]]]]]"#);
    }

    #[test]
    fn rejects_empty_child_list() {
        let err = serde_json::from_str::<ParseTreeNode>(r#"["sum",[]]"#).unwrap_err();
        assert!(err.to_string().contains("empty child list"));
    }

    #[test]
    fn deep_trees_render_every_level() {
        let mut node = ParseTreeNode::leaf("x", "!");
        for _ in 0..2_000 {
            node = ParseTreeNode::node("n", vec![node]).unwrap();
        }
        let rendered = to_tree_str(&node);
        assert_eq!(rendered.lines().count(), 2_001);
        assert!(rendered.ends_with("└─x \"!\"\n"));
    }
}
