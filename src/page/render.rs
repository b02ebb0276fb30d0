use std::cell::{Cell, RefCell};
use std::rc::Rc;

use html5ever::{Attribute, LocalName, QualName, ns};
use markup5ever_rcdom::{Handle, Node, NodeData};

use crate::restructure::{Content, Element, NodeId, NodeKind, OutlineTree};

/// Builds the replacement `<div>` for a restructured page.
pub fn render_tree(tree: &OutlineTree) -> Handle {
    render_node(tree, tree.root())
}

fn render_node(tree: &OutlineTree, id: NodeId) -> Handle {
    let handle = match tree.kind(id) {
        NodeKind::Root => create_element("div", &[]),
        NodeKind::Section { id: section_id } => match section_id {
            Some(value) => create_element("section", &[("id", value.as_str())]),
            None => create_element("section", &[]),
        },
        NodeKind::Heading { rank, id, content } => {
            let heading = match id {
                Some(value) => create_element(rank.tag(), &[("id", value.as_str())]),
                None => create_element(rank.tag(), &[]),
            };
            append_content(&heading, content);
            heading
        }
        NodeKind::Paragraph { content } => {
            let paragraph = create_element("p", &[]);
            append_content(&paragraph, content);
            paragraph
        }
        NodeKind::List { level } => create_element("ol", &[("type", level.list_type())]),
        NodeKind::Item { value } => {
            create_element("li", &[("value", value.to_string().as_str())])
        }
        NodeKind::Verbatim { element } => render_element(element),
    };

    for child in tree.children(id) {
        append_child(&handle, render_node(tree, *child));
    }

    handle
}

fn append_content(parent: &Handle, content: &[Content]) {
    for child in content {
        append_child(parent, render_content(child));
    }
}

fn render_content(content: &Content) -> Handle {
    match content {
        Content::Text(text) => create_text(text),
        Content::Comment(comment) => create_comment(comment),
        Content::Element(element) => render_element(element),
    }
}

fn render_element(element: &Element) -> Handle {
    let attrs = element
        .attrs
        .iter()
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .collect::<Vec<_>>();
    let handle = create_element(&element.tag, &attrs);
    append_content(&handle, &element.children);
    handle
}

pub fn append_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

pub fn create_element(tag: &str, attrs: &[(&str, &str)]) -> Handle {
    let attributes = attrs
        .iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(*name)),
            value: value.to_string().into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: QualName::new(None, ns!(html), LocalName::from(tag)),
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

pub fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

fn create_comment(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Comment {
            contents: text.to_string().into(),
        },
    })
}
