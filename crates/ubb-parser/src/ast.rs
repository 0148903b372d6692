use crate::tag::NodeType;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Index of a node in its [`UbbDocument`].
///
/// Only meaningful for the document that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Payload of a node, by structural variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    /// Verbatim run of text.
    Text { content: String },

    /// A tag, also used for the document root.
    Tag { attributes: BTreeMap<String, String> },

    /// Math formula between `$` or `$$`.
    Latex { formula: String, is_block: bool },
}

/// Node in the document tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UbbNode {
    id: NodeId,

    node_type: NodeType,

    #[serde(flatten)]
    kind: NodeKind,

    /// Set once when attached, the root has none.
    parent: Option<NodeId>,

    children: Vec<NodeId>,
}

impl UbbNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn parent_id(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn child_ids(&self) -> &[NodeId] {
        self.children.as_slice()
    }

    /// Text of a text node.
    pub fn content(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text { content } => Some(content.as_str()),
            _ => None,
        }
    }

    /// Attributes of a tag node.
    pub fn attributes(&self) -> Option<&BTreeMap<String, String>> {
        match &self.kind {
            NodeKind::Tag { attributes } => Some(attributes),
            _ => None,
        }
    }

    /// Get the attribute, if any.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes()?.get(key).map(String::as_str)
    }

    /// Formula of a latex node and whether it is a block one.
    pub fn formula(&self) -> Option<(&str, bool)> {
        match &self.kind {
            NodeKind::Latex { formula, is_block } => Some((formula.as_str(), *is_block)),
            _ => None,
        }
    }

    pub fn is_tag(&self) -> bool {
        matches!(self.kind, NodeKind::Tag { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text { .. })
    }

    pub fn is_latex(&self) -> bool {
        matches!(self.kind, NodeKind::Latex { .. })
    }
}

/// Counters over a whole document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DocumentStats {
    /// All nodes including the root.
    pub total: usize,

    /// Tag nodes including the root.
    pub tags: usize,

    pub texts: usize,

    pub latex: usize,

    /// Depth of the deepest node, the root is 0.
    pub max_depth: usize,
}

/// Parsed document.
///
/// Nodes live in one arena ordered by creation, which doubles as the node registry. The tree is
/// formed by `children` links from the root, `parent` links only point back up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UbbDocument {
    nodes: Vec<UbbNode>,
}

impl UbbDocument {
    const ROOT: NodeId = NodeId(0);

    /// Construct a document holding only the root.
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![UbbNode {
                id: Self::ROOT,
                node_type: NodeType::Document,
                kind: NodeKind::Tag {
                    attributes: BTreeMap::new(),
                },
                parent: None,
                children: vec![],
            }],
        }
    }

    /// Create a node and attach it as the last child of `parent`.
    pub(crate) fn append(&mut self, parent: NodeId, node_type: NodeType, kind: NodeKind) -> NodeId {
        debug_assert!(
            !self.nodes[parent.0].node_type.is_self_closing(),
            "self closing node {:?} can not hold children",
            self.nodes[parent.0].node_type
        );
        let id = NodeId(self.nodes.len());
        self.nodes.push(UbbNode {
            id,
            node_type,
            kind,
            parent: Some(parent),
            children: vec![],
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn root_id(&self) -> NodeId {
        Self::ROOT
    }

    pub fn root(&self) -> &UbbNode {
        &self.nodes[Self::ROOT.0]
    }

    /// Get node by id.
    ///
    /// # Panics
    ///
    /// When `id` does not come from this document.
    pub fn node(&self, id: NodeId) -> &UbbNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&UbbNode> {
        self.nodes.get(id.0)
    }

    /// All nodes in creation order, the root first.
    pub fn nodes(&self) -> &[UbbNode] {
        self.nodes.as_slice()
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &UbbNode> + '_ {
        self.nodes[id.0].children.iter().map(|x| &self.nodes[x.0])
    }

    pub fn parent(&self, id: NodeId) -> Option<&UbbNode> {
        self.nodes[id.0].parent.map(|x| &self.nodes[x.0])
    }

    /// Node `id` and all nodes below it, in pre-order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut ret = vec![];
        let mut stack = vec![id];
        while let Some(curr) = stack.pop() {
            ret.push(curr);
            stack.extend(self.nodes[curr.0].children.iter().rev());
        }
        ret
    }

    /// Concatenated content of all text nodes below `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|x| self.nodes[x.0].content())
            .collect()
    }

    pub fn stats(&self) -> DocumentStats {
        // Parents are always created before their children.
        let mut depth = vec![0usize; self.nodes.len()];
        let mut stats = DocumentStats::default();
        for node in &self.nodes {
            if let Some(parent) = node.parent {
                depth[node.id.0] = depth[parent.0] + 1;
            }
            stats.total += 1;
            stats.max_depth = stats.max_depth.max(depth[node.id.0]);
            match node.kind {
                NodeKind::Text { .. } => stats.texts += 1,
                NodeKind::Tag { .. } => stats.tags += 1,
                NodeKind::Latex { .. } => stats.latex += 1,
            }
        }
        stats
    }

    /// Print the tree, one node per line.
    ///
    /// ```console
    /// Tag: Document
    /// └── Tag: Url [default="a.com", href="a.com"] (parent: Document)
    ///     └── Text: "link"
    /// ```
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        // (node, prefix of the parent line, is last child)
        let mut stack: Vec<(NodeId, String, Option<bool>)> = vec![(Self::ROOT, String::new(), None)];

        while let Some((id, prefix, last)) = stack.pop() {
            let connector = match last {
                None => "",
                Some(true) => "└── ",
                Some(false) => "├── ",
            };
            let _ = writeln!(out, "{prefix}{connector}{}", self.describe(id));

            let child_prefix = match last {
                None => prefix,
                Some(true) => format!("{prefix}    "),
                Some(false) => format!("{prefix}│   "),
            };
            let children = &self.nodes[id.0].children;
            for (index, child) in children.iter().enumerate().rev() {
                stack.push((*child, child_prefix.clone(), Some(index + 1 == children.len())));
            }
        }

        out
    }

    fn describe(&self, id: NodeId) -> String {
        let node = &self.nodes[id.0];
        match &node.kind {
            NodeKind::Text { content } => format!("Text: \"{}\"", escape(content)),
            NodeKind::Latex { formula, is_block } => format!(
                "Latex: \"{}\" ({})",
                escape(formula),
                if *is_block { "block" } else { "inline" }
            ),
            NodeKind::Tag { attributes } => {
                let mut info = format!("Tag: {}", node.node_type);
                if !attributes.is_empty() {
                    let attrs = attributes
                        .iter()
                        .map(|(k, v)| format!("{k}=\"{v}\""))
                        .collect::<Vec<_>>()
                        .join(", ");
                    let _ = write!(info, " [{attrs}]");
                }
                if let Some(parent) = node.parent {
                    let _ = write!(info, " (parent: {})", self.nodes[parent.0].node_type);
                }
                info
            }
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}
