use super::block::{Content, Element};
use super::classify::{ItemValue, OutlineLevel};
use super::normalize::{TabPolicy, normalize_leading, normalize_space};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingRank {
    /// Document-level heading, rendered as `<h2>`.
    Document,
    /// Heading opening a section, rendered as `<h3>`.
    Section,
}

impl HeadingRank {
    pub fn tag(self) -> &'static str {
        match self {
            HeadingRank::Document => "h2",
            HeadingRank::Section => "h3",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Section {
        id: Option<String>,
    },
    Heading {
        rank: HeadingRank,
        id: Option<String>,
        content: Vec<Content>,
    },
    Paragraph {
        content: Vec<Content>,
    },
    List {
        level: OutlineLevel,
    },
    Item {
        value: ItemValue,
    },
    /// A source element carried over untouched.
    Verbatim {
        element: Element,
    },
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub kind: NodeKind,
    pub children: Vec<NodeId>,
}

/// Output document, built append-only during the forward pass.
#[derive(Debug, Clone)]
pub struct OutlineTree {
    nodes: Vec<TreeNode>,
}

impl Default for OutlineTree {
    fn default() -> Self {
        Self::new()
    }
}

impl OutlineTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![TreeNode {
                kind: NodeKind::Root,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(TreeNode {
            kind,
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn set_section_id(&mut self, section: NodeId, value: String) {
        if let NodeKind::Section { id } = &mut self.nodes[section.0].kind {
            *id = Some(value);
        }
    }
}

/// Moves content into the output tree, normalizing every text node on the way.
pub fn move_children(children: Vec<Content>, policy: TabPolicy) -> Vec<Content> {
    children
        .into_iter()
        .map(|child| normalize_content(child, policy))
        .collect()
}

fn normalize_content(content: Content, policy: TabPolicy) -> Content {
    match content {
        Content::Text(text) => Content::Text(normalize_space(&text, policy).into_owned()),
        Content::Element(mut element) => {
            element.children = move_children(element.children, policy);
            Content::Element(element)
        }
        Content::Comment(comment) => Content::Comment(comment),
    }
}

/// Removes a literal marker from the first child of a paragraph when that child is text.
///
/// Leaves the content untouched when the first child is not text or does not start with
/// `prefix` once normalized and left-trimmed.
pub fn strip_prefix(content: &mut [Content], prefix: &str, policy: TabPolicy) {
    let Some(Content::Text(text)) = content.first_mut() else {
        return;
    };

    let value = normalize_leading(text, policy);
    if let Some(rest) = value.strip_prefix(prefix) {
        *text = rest.trim_start().to_string();
    }
}
