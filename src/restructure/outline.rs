use anyhow::{Result, bail};
use tracing::debug;

use crate::model::TransformCounts;

use super::anchor::promote_anchor;
use super::block::{Block, Content};
use super::classify::{
    BlockKind, HEADING_LEAD_CLASSES, OutlineLevel, OutlineMarker, SOURCE_NOTE_CLASS,
};
use super::normalize::TabPolicy;
use super::tree::{HeadingRank, NodeId, NodeKind, OutlineTree, move_children, strip_prefix};

/// Position of the forward pass: open section, the three list pointers, and the container that
/// receives the next paragraph or nested list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutlineState {
    pub section: Option<NodeId>,
    pub numbers: Option<NodeId>,
    pub letters: Option<NodeId>,
    pub subnumbers: Option<NodeId>,
    pub container: NodeId,
}

impl OutlineState {
    pub fn new(root: NodeId) -> Self {
        Self {
            section: None,
            numbers: None,
            letters: None,
            subnumbers: None,
            container: root,
        }
    }

    pub fn section_open(&self) -> bool {
        self.section.is_some()
    }

    pub fn enter_section(self, section: NodeId) -> Self {
        Self {
            section: Some(section),
            ..Self::new(section)
        }
    }

    pub fn close_section(self, root: NodeId) -> Self {
        Self::new(root)
    }

    pub fn list_for(&self, level: OutlineLevel) -> Option<NodeId> {
        match level {
            OutlineLevel::Numeric => self.numbers,
            OutlineLevel::Lettered => self.letters,
            OutlineLevel::NumericParenthesized => self.subnumbers,
        }
    }

    fn with_list(mut self, level: OutlineLevel, list: NodeId) -> Self {
        match level {
            OutlineLevel::Numeric => self.numbers = Some(list),
            OutlineLevel::Lettered => self.letters = Some(list),
            OutlineLevel::NumericParenthesized => self.subnumbers = Some(list),
        }
        self
    }

    /// Drops the pointers nested below `level`; a marker never resets its own level.
    pub fn reset_below(mut self, level: OutlineLevel) -> Self {
        match level {
            OutlineLevel::Numeric => {
                self.letters = None;
                self.subnumbers = None;
            }
            OutlineLevel::Lettered => self.subnumbers = None,
            OutlineLevel::NumericParenthesized => {}
        }
        self
    }
}

/// Applies classified blocks to the output tree one at a time.
pub struct OutlineBuilder {
    tree: OutlineTree,
    counts: TransformCounts,
    tab_policy: TabPolicy,
}

impl OutlineBuilder {
    pub fn new(tab_policy: TabPolicy) -> Self {
        Self {
            tree: OutlineTree::new(),
            counts: TransformCounts::default(),
            tab_policy,
        }
    }

    pub fn initial_state(&self) -> OutlineState {
        OutlineState::new(self.tree.root())
    }

    pub fn finish(self) -> (OutlineTree, TransformCounts) {
        (self.tree, self.counts)
    }

    pub fn apply(
        &mut self,
        state: OutlineState,
        block: Block,
        kind: BlockKind,
    ) -> Result<OutlineState> {
        self.counts.blocks += 1;

        match kind {
            BlockKind::SectionHeading => Ok(self.open_section(block)),
            BlockKind::OutlineItem(marker) => self.push_item(state, block, marker),
            BlockKind::PlainContent => {
                let content = move_children(block.element.children, self.tab_policy);
                self.tree.append(state.container, NodeKind::Paragraph { content });
                self.counts.paragraphs += 1;
                Ok(state)
            }
            BlockKind::RawPassthrough => {
                self.tree.append(
                    state.container,
                    NodeKind::Verbatim {
                        element: block.element,
                    },
                );
                self.counts.raw_passthrough += 1;
                Ok(state)
            }
            BlockKind::SourceNote => {
                let Some(section) = state.section else {
                    bail!("source note at block {} has no open section", block.index);
                };
                self.tree.append(
                    section,
                    NodeKind::Verbatim {
                        element: block.element,
                    },
                );
                self.counts.source_notes += 1;
                Ok(state)
            }
            BlockKind::DocHeading => {
                let mut content = move_children(block.element.children, self.tab_policy);
                let id = self.promote(&mut content);
                let root = self.tree.root();
                self.tree.append(
                    root,
                    NodeKind::Heading {
                        rank: HeadingRank::Document,
                        id,
                        content,
                    },
                );
                self.counts.doc_headings += 1;
                Ok(state)
            }
            BlockKind::GenericBlock => {
                if block.has_class(SOURCE_NOTE_CLASS) {
                    debug!(
                        block = block.index,
                        "source note outside a section kept at document level"
                    );
                    self.counts.orphan_source_notes += 1;
                }

                let root = self.tree.root();
                self.tree.append(
                    root,
                    NodeKind::Verbatim {
                        element: block.element,
                    },
                );
                self.counts.generic_blocks += 1;
                Ok(state.close_section(root))
            }
        }
    }

    fn open_section(&mut self, block: Block) -> OutlineState {
        let root = self.tree.root();
        let section = self.tree.append(root, NodeKind::Section { id: None });

        let mut children = block.element.children.into_iter().peekable();
        let mut lead = Vec::new();
        while let Some(Content::Element(element)) = children.peek() {
            if !element.has_any_class(&HEADING_LEAD_CLASSES) {
                break;
            }
            if let Some(child) = children.next() {
                lead.push(child);
            }
        }

        let mut heading_content = move_children(lead, self.tab_policy);
        let id = self.promote(&mut heading_content);
        self.tree.append(
            section,
            NodeKind::Heading {
                rank: HeadingRank::Section,
                id: None,
                content: heading_content,
            },
        );

        let rest = move_children(children.collect(), self.tab_policy);
        if !rest.is_empty() {
            self.tree.append(section, NodeKind::Paragraph { content: rest });
            self.counts.paragraphs += 1;
        }

        if let Some(id) = id {
            self.tree.set_section_id(section, id);
        }

        self.counts.sections += 1;
        self.initial_state().enter_section(section)
    }

    fn push_item(
        &mut self,
        state: OutlineState,
        block: Block,
        marker: OutlineMarker,
    ) -> Result<OutlineState> {
        let Some(section) = state.section else {
            bail!(
                "outline item {} at block {} has no open section",
                marker.matched,
                block.index
            );
        };

        let level = marker.level;
        let (list, state) = match state.list_for(level) {
            Some(list) => (list, state),
            None => {
                let parent = match level {
                    OutlineLevel::Numeric => section,
                    OutlineLevel::Lettered | OutlineLevel::NumericParenthesized => {
                        state.container
                    }
                };
                let list = self.tree.append(parent, NodeKind::List { level });
                self.counts.record_list(level);
                (list, state.with_list(level, list))
            }
        };
        let state = state.reset_below(level);

        let item = self.tree.append(
            list,
            NodeKind::Item {
                value: marker.value,
            },
        );
        self.counts.record_item(level);

        let mut content = move_children(block.element.children, self.tab_policy);
        strip_prefix(&mut content, &marker.matched, self.tab_policy);
        self.tree.append(item, NodeKind::Paragraph { content });
        self.counts.paragraphs += 1;

        Ok(OutlineState {
            container: item,
            ..state
        })
    }

    fn promote(&mut self, content: &mut Vec<Content>) -> Option<String> {
        let id = promote_anchor(content)?;
        self.counts.anchors_promoted += 1;
        Some(id)
    }
}
