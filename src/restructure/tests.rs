use super::anchor::promote_anchor;
use super::classify::{OutlineMarker, SECTION_BODY_CLASS};
use super::normalize::normalize_space;
use super::outline::OutlineState;
use super::tree::{HeadingRank, move_children, strip_prefix};
use super::*;

fn body(text: &str) -> Element {
    Element::new("p").with_class(SECTION_BODY_CLASS).with_text(text)
}

fn section_heading(number: &str, title: &str, anchor: Option<&str>, rest: &str) -> Element {
    let mut section = Element::new("span").with_class("Section");
    if let Some(name) = anchor {
        section = section.with_child(Content::Element(Element::new("a").with_attr("name", name)));
    }
    section = section.with_text(number);

    let mut element = Element::new("p")
        .with_class(SECTION_BODY_CLASS)
        .with_child(Content::Element(
            Element::new("span").with_class("Empty").with_text("\u{a0}"),
        ))
        .with_child(Content::Element(section))
        .with_child(Content::Element(
            Element::new("span").with_class("Leadline").with_text(title),
        ));
    if !rest.is_empty() {
        element = element.with_text(rest);
    }
    element
}

fn blocks(elements: Vec<Element>) -> Vec<Block> {
    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| Block::new(index, element))
        .collect()
}

fn run(elements: Vec<Element>) -> RestructureOutcome {
    Restructurer::new(TabPolicy::Normalize)
        .unwrap()
        .restructure(blocks(elements))
        .unwrap()
}

fn text_of(content: &[Content]) -> String {
    let mut out = String::new();
    for child in content {
        child.append_text_content(&mut out);
    }
    out
}

fn paragraph_text(tree: &OutlineTree, id: NodeId) -> String {
    match tree.kind(id) {
        NodeKind::Paragraph { content } => text_of(content),
        other => panic!("expected paragraph, got {other:?}"),
    }
}

fn only_child(tree: &OutlineTree, id: NodeId) -> NodeId {
    let children = tree.children(id);
    assert_eq!(children.len(), 1, "expected one child of {:?}", tree.kind(id));
    children[0]
}

fn assert_list(tree: &OutlineTree, id: NodeId, expected: OutlineLevel) {
    assert_eq!(tree.kind(id), &NodeKind::List { level: expected });
}

fn assert_item(tree: &OutlineTree, id: NodeId, expected: ItemValue) {
    assert_eq!(tree.kind(id), &NodeKind::Item { value: expected });
}

fn classifier() -> BlockClassifier {
    BlockClassifier::new(TabPolicy::Normalize).unwrap()
}

#[test]
fn normalize_space_folds_no_break_spaces_and_tabs() {
    let value = normalize_space("1.\u{a0}\u{a0}Except\tas", TabPolicy::Normalize);
    assert_eq!(value, "1.  Except as");
    assert!(!value.contains('\u{a0}'));
}

#[test]
fn normalize_space_keep_policy_leaves_tabs() {
    let value = normalize_space("(a)\u{a0}\tThe", TabPolicy::Keep);
    assert_eq!(value, "(a) \tThe");
}

#[test]
fn match_outline_marker_reads_each_level() {
    let classifier = classifier();

    let numeric = classifier.match_outline_marker("12. text").unwrap();
    assert_eq!(numeric.level, OutlineLevel::Numeric);
    assert_eq!(numeric.value, ItemValue::Number(12));
    assert_eq!(numeric.matched, "12.");

    let lettered = classifier.match_outline_marker("(bb) The board").unwrap();
    assert_eq!(lettered.level, OutlineLevel::Lettered);
    assert_eq!(lettered.value, ItemValue::Label("bb".to_string()));

    let nested = classifier.match_outline_marker("(3) Any").unwrap();
    assert_eq!(nested.level, OutlineLevel::NumericParenthesized);
    assert_eq!(nested.value, ItemValue::Number(3));
    assert_eq!(nested.matched, "(3)");
}

#[test]
fn match_outline_marker_is_anchored_at_start() {
    let classifier = classifier();
    assert_eq!(classifier.match_outline_marker("See NRS 1.010."), None);
    assert_eq!(classifier.match_outline_marker("as in (a) above"), None);
    assert_eq!(classifier.match_outline_marker("(A) upper"), None);
}

#[test]
fn match_outline_marker_keeps_oversized_number_literal() {
    let classifier = classifier();
    let marker = classifier
        .match_outline_marker("99999999999999999999999. too large")
        .unwrap();
    assert_eq!(marker.level, OutlineLevel::Numeric);
    assert_eq!(
        marker.value,
        ItemValue::Label("99999999999999999999999".to_string())
    );
    assert_eq!(marker.matched, "99999999999999999999999.");
    assert_eq!(marker.value.to_string(), "99999999999999999999999");

    let nested = classifier
        .match_outline_marker("(18446744073709551616) past u64")
        .unwrap();
    assert_eq!(nested.level, OutlineLevel::NumericParenthesized);
    assert_eq!(
        nested.value,
        ItemValue::Label("18446744073709551616".to_string())
    );
}

#[test]
fn classify_follows_marker_class_precedence() {
    let classifier = classifier();
    let heading = Block::new(0, section_heading("NRS 1.010", "Title.", None, ""));
    let plain = Block::new(1, body("\u{a0}\u{a0}3.\u{a0}Text"));
    let note = Block::new(2, Element::new("p").with_class("SourceNote").with_text("(Added)"));
    let doc = Block::new(3, Element::new("p").with_class("COHead2").with_text("GENERAL"));
    let other = Block::new(4, Element::new("table"));

    assert_eq!(classifier.classify(&heading, false), BlockKind::SectionHeading);
    assert_eq!(classifier.classify(&heading, true), BlockKind::SectionHeading);
    assert_eq!(classifier.classify(&plain, false), BlockKind::RawPassthrough);
    assert_eq!(
        classifier.classify(&plain, true),
        BlockKind::OutlineItem(OutlineMarker {
            level: OutlineLevel::Numeric,
            value: ItemValue::Number(3),
            matched: "3.".to_string(),
        })
    );
    assert_eq!(classifier.classify(&note, true), BlockKind::SourceNote);
    assert_eq!(classifier.classify(&note, false), BlockKind::GenericBlock);
    assert_eq!(classifier.classify(&doc, true), BlockKind::DocHeading);
    assert_eq!(classifier.classify(&other, true), BlockKind::GenericBlock);
}

#[test]
fn classify_reads_marker_across_inline_elements() {
    let classifier = classifier();
    let block = Block::new(
        0,
        Element::new("p")
            .with_class(SECTION_BODY_CLASS)
            .with_child(Content::Element(Element::new("span").with_text("(")))
            .with_text("c) Split"),
    );

    match classifier.classify(&block, true) {
        BlockKind::OutlineItem(marker) => {
            assert_eq!(marker.value, ItemValue::Label("c".to_string()))
        }
        other => panic!("expected outline item, got {other:?}"),
    }
}

#[test]
fn strip_prefix_removes_marker_and_following_space() {
    let mut content = vec![Content::text("\u{a0}12.\u{a0}\u{a0}text")];
    strip_prefix(&mut content, "12.", TabPolicy::Normalize);
    assert_eq!(content, vec![Content::text("text")]);
}

#[test]
fn strip_prefix_leaves_non_matching_content_alone() {
    let mut content = vec![Content::text("13. text")];
    strip_prefix(&mut content, "12.", TabPolicy::Normalize);
    assert_eq!(content, vec![Content::text("13. text")]);

    let mut content = vec![
        Content::Element(Element::new("span").with_text("12.")),
        Content::text(" text"),
    ];
    let expected = content.clone();
    strip_prefix(&mut content, "12.", TabPolicy::Normalize);
    assert_eq!(content, expected);
}

#[test]
fn move_children_normalizes_nested_text() {
    let moved = move_children(
        vec![Content::Element(
            Element::new("b").with_text("a\u{a0}b").with_child(Content::Comment("\u{a0}".into())),
        )],
        TabPolicy::Normalize,
    );

    let Content::Element(element) = &moved[0] else {
        panic!("expected element");
    };
    assert_eq!(element.children[0], Content::text("a b"));
    assert_eq!(element.children[1], Content::Comment("\u{a0}".into()));
}

#[test]
fn promote_anchor_takes_first_named_anchor_only() {
    let mut content = vec![
        Content::Element(Element::new("a").with_attr("href", "#x").with_text("link")),
        Content::Element(
            Element::new("span")
                .with_child(Content::Element(Element::new("a").with_attr("name", "first")))
                .with_text("NRS 1.010"),
        ),
        Content::Element(Element::new("a").with_attr("name", "second")),
    ];

    assert_eq!(promote_anchor(&mut content), Some("first".to_string()));
    assert_eq!(content.len(), 3);
    assert_eq!(text_of(&content), "linkNRS 1.010");
    assert_eq!(promote_anchor(&mut content), Some("second".to_string()));
    assert_eq!(promote_anchor(&mut content), None);
}

#[test]
fn reset_below_only_clears_deeper_levels() {
    let mut tree = OutlineTree::new();
    let root = tree.root();
    let list = tree.append(root, NodeKind::List { level: OutlineLevel::Numeric });
    let state = OutlineState {
        section: Some(root),
        numbers: Some(list),
        letters: Some(list),
        subnumbers: Some(list),
        container: list,
    };

    let numeric = state.reset_below(OutlineLevel::Numeric);
    assert_eq!((numeric.numbers, numeric.letters, numeric.subnumbers), (Some(list), None, None));

    let lettered = state.reset_below(OutlineLevel::Lettered);
    assert_eq!(lettered.letters, Some(list));
    assert_eq!(lettered.subnumbers, None);

    assert_eq!(state.reset_below(OutlineLevel::NumericParenthesized), state);
}

#[test]
fn section_heading_splits_lead_from_body_and_promotes_anchor() {
    let outcome = run(vec![section_heading(
        "NRS\u{a0}1.010",
        "Scope.",
        Some("NRS001Sec010"),
        "\u{a0}\u{a0}This chapter applies.",
    )]);
    let tree = &outcome.tree;

    let section = only_child(tree, tree.root());
    assert_eq!(
        tree.kind(section),
        &NodeKind::Section {
            id: Some("NRS001Sec010".to_string())
        }
    );

    let children = tree.children(section);
    assert_eq!(children.len(), 2);
    match tree.kind(children[0]) {
        NodeKind::Heading { rank, id, content } => {
            assert_eq!(*rank, HeadingRank::Section);
            assert_eq!(id, &None);
            assert_eq!(content.len(), 3);
            assert_eq!(text_of(content), " NRS 1.010Scope.");
        }
        other => panic!("expected heading, got {other:?}"),
    }
    assert_eq!(paragraph_text(tree, children[1]), "  This chapter applies.");
    assert_eq!(outcome.counts.anchors_promoted, 1);
}

#[test]
fn section_heading_without_trailing_body_has_no_paragraph() {
    let outcome = run(vec![section_heading("NRS 1.020", "Definitions.", None, "")]);
    let tree = &outcome.tree;
    let section = only_child(tree, tree.root());

    assert_eq!(tree.kind(section), &NodeKind::Section { id: None });
    assert_eq!(tree.children(section).len(), 1);
    assert_eq!(outcome.counts.paragraphs, 0);
}

#[test]
fn numeric_marker_strips_prefix_from_item_paragraph() {
    let outcome = run(vec![
        section_heading("NRS 1.030", "Terms.", None, ""),
        body("12.\u{a0}text"),
    ]);
    let tree = &outcome.tree;
    let section = only_child(tree, tree.root());
    let list = tree.children(section)[1];
    assert_list(tree, list, OutlineLevel::Numeric);

    let item = only_child(tree, list);
    assert_item(tree, item, ItemValue::Number(12));
    assert_eq!(paragraph_text(tree, only_child(tree, item)), "text");
}

#[test]
fn lettered_marker_after_nested_item_rejoins_same_lettered_list() {
    let outcome = run(vec![
        section_heading("NRS 1.040", "A.", None, ""),
        body("1. One"),
        body("(a) Alpha"),
        body("(1) Sub"),
        body("(b) Beta"),
    ]);
    let tree = &outcome.tree;

    let section = only_child(tree, tree.root());
    let numbers = tree.children(section)[1];
    assert_list(tree, numbers, OutlineLevel::Numeric);

    let item_one = only_child(tree, numbers);
    assert_item(tree, item_one, ItemValue::Number(1));

    let item_one_children = tree.children(item_one);
    assert_eq!(item_one_children.len(), 2);
    assert_eq!(paragraph_text(tree, item_one_children[0]), "One");
    let letters = item_one_children[1];
    assert_list(tree, letters, OutlineLevel::Lettered);

    let lettered_items = tree.children(letters);
    assert_eq!(lettered_items.len(), 2);
    assert_item(tree, lettered_items[0], ItemValue::Label("a".to_string()));
    assert_item(tree, lettered_items[1], ItemValue::Label("b".to_string()));

    let item_a_children = tree.children(lettered_items[0]);
    let subnumbers = item_a_children[1];
    assert_list(tree, subnumbers, OutlineLevel::NumericParenthesized);
    let sub_item = only_child(tree, subnumbers);
    assert_item(tree, sub_item, ItemValue::Number(1));
    assert_eq!(paragraph_text(tree, only_child(tree, sub_item)), "Sub");

    assert_eq!(outcome.counts.lettered_lists, 1);
    assert_eq!(outcome.counts.lettered_items, 2);
}

#[test]
fn numeric_marker_after_lettered_list_opens_section_level_list() {
    let outcome = run(vec![
        section_heading("NRS 1.050", "A.", None, ""),
        body("(a) Alpha"),
        body("1. One"),
        body("(b) Beta"),
    ]);
    let tree = &outcome.tree;

    let section = only_child(tree, tree.root());
    let children = tree.children(section);
    assert_eq!(children.len(), 3);
    assert_list(tree, children[1], OutlineLevel::Lettered);
    assert_list(tree, children[2], OutlineLevel::Numeric);

    // The lettered pointer was reset by `1.`, so `(b)` starts a fresh list inside item 1.
    assert_eq!(tree.children(children[1]).len(), 1);
    let item_one = only_child(tree, children[2]);
    let nested = tree.children(item_one)[1];
    assert_list(tree, nested, OutlineLevel::Lettered);
    assert_item(tree, only_child(tree, nested), ItemValue::Label("b".to_string()));
}

#[test]
fn plain_paragraph_lands_in_current_item() {
    let outcome = run(vec![
        section_heading("NRS 1.060", "A.", None, ""),
        body("1. One"),
        body("Continued text of item one."),
        body("2. Two"),
    ]);
    let tree = &outcome.tree;

    let section = only_child(tree, tree.root());
    let numbers = tree.children(section)[1];
    let items = tree.children(numbers);
    assert_eq!(items.len(), 2);

    let first = tree.children(items[0]);
    assert_eq!(first.len(), 2);
    assert_eq!(paragraph_text(tree, first[1]), "Continued text of item one.");
    assert_item(tree, items[1], ItemValue::Number(2));
}

#[test]
fn source_note_attaches_to_section_and_list_is_reused() {
    let outcome = run(vec![
        section_heading("NRS 1.070", "A.", None, ""),
        body("1. One"),
        Element::new("p").with_class("SourceNote").with_text("(Added to NRS by 1995, 1)"),
        body("2. Two"),
    ]);
    let tree = &outcome.tree;

    let section = only_child(tree, tree.root());
    let children = tree.children(section);
    assert_eq!(children.len(), 3);
    assert!(matches!(tree.kind(children[2]), NodeKind::Verbatim { .. }));
    assert_eq!(tree.children(children[1]).len(), 2);
    assert_eq!(outcome.counts.numeric_lists, 1);
    assert_eq!(outcome.counts.source_notes, 1);
}

#[test]
fn generic_block_closes_section() {
    let outcome = run(vec![
        section_heading("NRS 1.080", "A.", None, ""),
        body("1. One"),
        Element::new("hr"),
        body("2. Two"),
        Element::new("p").with_class("SourceNote").with_text("orphan"),
    ]);
    let tree = &outcome.tree;

    let top = tree.children(tree.root());
    assert_eq!(top.len(), 4);
    assert!(matches!(tree.kind(top[0]), NodeKind::Section { .. }));
    match tree.kind(top[2]) {
        NodeKind::Verbatim { element } => {
            assert_eq!(element.text_content(), "2. Two");
            assert!(element.has_class(SECTION_BODY_CLASS));
        }
        other => panic!("expected passthrough, got {other:?}"),
    }
    assert!(matches!(tree.kind(top[3]), NodeKind::Verbatim { .. }));

    assert_eq!(outcome.counts.raw_passthrough, 1);
    assert_eq!(outcome.counts.generic_blocks, 2);
    assert_eq!(outcome.counts.orphan_source_notes, 1);
    assert_eq!(outcome.trace[3].kind, "raw_passthrough");
}

#[test]
fn doc_heading_promotes_anchor_without_closing_section() {
    let outcome = run(vec![
        section_heading("NRS 1.090", "A.", None, ""),
        body("1. One"),
        Element::new("p")
            .with_class("DocHeading")
            .with_child(Content::Element(Element::new("a").with_attr("name", "Chapter1")))
            .with_text("CHAPTER\u{a0}1"),
        body("2. Two"),
    ]);
    let tree = &outcome.tree;

    let top = tree.children(tree.root());
    assert_eq!(top.len(), 2);
    match tree.kind(top[1]) {
        NodeKind::Heading { rank, id, content } => {
            assert_eq!(*rank, HeadingRank::Document);
            assert_eq!(id.as_deref(), Some("Chapter1"));
            assert_eq!(content, &vec![Content::text("CHAPTER 1")]);
        }
        other => panic!("expected heading, got {other:?}"),
    }

    let numbers = tree.children(top[0])[1];
    assert_eq!(tree.children(numbers).len(), 2);
}

#[test]
fn trace_records_marker_values() {
    let outcome = run(vec![
        section_heading("NRS 1.100", "A.", None, ""),
        body("(c) Gamma"),
    ]);

    assert_eq!(outcome.trace.len(), 2);
    assert_eq!(outcome.trace[0].kind, "section_heading");
    assert_eq!(outcome.trace[1].level, Some(OutlineLevel::Lettered));
    assert_eq!(outcome.trace[1].value, Some(ItemValue::Label("c".to_string())));
    assert_eq!(outcome.trace[1].preview, "(c) Gamma");
    assert_eq!(outcome.counts.blocks, 2);
}
