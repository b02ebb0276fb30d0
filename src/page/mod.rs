//! Page-level plumbing around the restructuring pass: parsing the exported statute page, finding
//! the legacy root container, and swapping in the rebuilt document.

mod render;


use std::rc::Rc;

use anyhow::{Context, Result};
use html5ever::serialize::{SerializeOpts, TraversalScope};
use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, serialize};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};
use tracing::{debug, info};

use crate::model::TransformCounts;
use crate::restructure::{
    Block, ClassifiedBlock, Content, Element, Restructurer, RestructureOutcome, TabPolicy,
};

use render::{append_child, create_element, create_text, render_tree};

pub const DEFAULT_ROOT_CLASS: &str = "WordSection1";
pub const DEFAULT_LAYOUT_RULE: &str = "p { max-width: 78ex; }";

#[derive(Debug, Clone)]
pub struct TransformOptions {
    pub root_class: String,
    pub layout_rule: String,
    pub tab_policy: TabPolicy,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            root_class: DEFAULT_ROOT_CLASS.to_string(),
            layout_rule: DEFAULT_LAYOUT_RULE.to_string(),
            tab_policy: TabPolicy::default(),
        }
    }
}

#[derive(Debug)]
pub struct TransformedPage {
    pub html: String,
    pub counts: TransformCounts,
    pub styles_removed: usize,
}

pub fn parse_html(source: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(source)
}

/// Runs the full page transform and returns the serialized result.
///
/// Fails when the legacy root container is missing, which is also what happens on a page that
/// has already been transformed.
pub fn transform_page(source: &str, options: &TransformOptions) -> Result<TransformedPage> {
    let dom = parse_html(source);
    let root = find_by_class(&dom.document, &options.root_class)
        .with_context(|| format!("root container .{} not found", options.root_class))?;

    let outcome = Restructurer::new(options.tab_policy)?.restructure(materialize_blocks(&root))?;
    detach(&root);

    let styles_removed = remove_elements(&dom.document, "style");
    debug!(count = styles_removed, "removed existing stylesheets");

    let head = find_by_tag(&dom.document, "head").context("page has no <head> element")?;
    let style = create_element("style", &[("type", "text/css")]);
    append_child(&style, create_text(&options.layout_rule));
    append_child(&head, style);

    let body = find_by_tag(&dom.document, "body").context("page has no <body> element")?;
    append_child(&body, render_tree(&outcome.tree));

    let html = serialize_document(&dom)?;
    info!(
        blocks = outcome.counts.blocks,
        sections = outcome.counts.sections,
        "readability transform finished"
    );

    Ok(TransformedPage {
        html,
        counts: outcome.counts,
        styles_removed,
    })
}

/// Classifies the page without producing output.
pub fn inspect_page(source: &str, options: &TransformOptions) -> Result<Vec<ClassifiedBlock>> {
    let dom = parse_html(source);
    let root = find_by_class(&dom.document, &options.root_class)
        .with_context(|| format!("root container .{} not found", options.root_class))?;

    let RestructureOutcome { trace, .. } =
        Restructurer::new(options.tab_policy)?.restructure(materialize_blocks(&root))?;
    Ok(trace)
}

/// Snapshots the element children of the root container; text between blocks is dropped.
pub fn materialize_blocks(root: &Handle) -> Vec<Block> {
    root.children
        .borrow()
        .iter()
        .filter_map(element_from_handle)
        .enumerate()
        .map(|(index, element)| Block::new(index, element))
        .collect()
}

fn element_from_handle(handle: &Handle) -> Option<Element> {
    let NodeData::Element { name, attrs, .. } = &handle.data else {
        return None;
    };

    let mut element = Element::new(&name.local[..]);
    element.attrs = attrs
        .borrow()
        .iter()
        .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
        .collect();
    element.children = handle
        .children
        .borrow()
        .iter()
        .filter_map(content_from_handle)
        .collect();

    Some(element)
}

fn content_from_handle(handle: &Handle) -> Option<Content> {
    match &handle.data {
        NodeData::Text { contents } => Some(Content::Text(contents.borrow().to_string())),
        NodeData::Comment { contents } => Some(Content::Comment(contents.to_string())),
        NodeData::Element { .. } => element_from_handle(handle).map(Content::Element),
        _ => None,
    }
}

fn element_matches(handle: &Handle, predicate: &dyn Fn(&str, &str) -> bool) -> bool {
    let NodeData::Element { name, attrs, .. } = &handle.data else {
        return false;
    };

    let class = attrs
        .borrow()
        .iter()
        .find(|attr| &*attr.name.local == "class")
        .map(|attr| attr.value.to_string())
        .unwrap_or_default();

    predicate(&name.local[..], class.as_str())
}

fn find_first(handle: &Handle, predicate: &dyn Fn(&str, &str) -> bool) -> Option<Handle> {
    for child in handle.children.borrow().iter() {
        if element_matches(child, predicate) {
            return Some(child.clone());
        }
        if let Some(found) = find_first(child, predicate) {
            return Some(found);
        }
    }

    None
}

pub fn find_by_class(document: &Handle, class: &str) -> Option<Handle> {
    find_first(document, &|_, classes| {
        classes.split_ascii_whitespace().any(|value| value == class)
    })
}

pub fn find_by_tag(document: &Handle, tag: &str) -> Option<Handle> {
    find_first(document, &|name, _| name.eq_ignore_ascii_case(tag))
}

fn detach(node: &Handle) {
    let Some(parent) = node.parent.take().and_then(|weak| weak.upgrade()) else {
        return;
    };
    parent
        .children
        .borrow_mut()
        .retain(|child| !Rc::ptr_eq(child, node));
}

/// Removes every element with the given tag anywhere below `handle`.
fn remove_elements(handle: &Handle, tag: &str) -> usize {
    let mut removed = 0;
    handle.children.borrow_mut().retain(|child| {
        let matches = element_matches(child, &|name, _| name.eq_ignore_ascii_case(tag));
        if matches {
            removed += 1;
        }
        !matches
    });

    for child in handle.children.borrow().iter() {
        removed += remove_elements(child, tag);
    }

    removed
}

fn serialize_document(dom: &RcDom) -> Result<String> {
    let mut output = Vec::new();
    let document: SerializableHandle = dom.document.clone().into();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::ChildrenOnly(None),
        ..Default::default()
    };

    serialize(&mut output, &document, opts).context("failed to serialize transformed page")?;
    String::from_utf8(output).context("serialized page is not valid utf-8")
}
