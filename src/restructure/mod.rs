//! Rebuilds section and outline structure from the flat block sequence of a legacy statute export.
//!
//! The export gives every paragraph the same `SectBody` class; nesting is recovered from the
//! leading marker text (`1.`, `(a)`, `(1)`) in a single forward pass over the blocks.

mod anchor;
mod block;
mod classify;
mod normalize;
mod outline;
mod tree;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use crate::model::TransformCounts;

pub use block::{Block, Content, Element};
pub use classify::{ItemValue, OutlineLevel};
pub use normalize::TabPolicy;
pub use tree::{NodeId, NodeKind, OutlineTree};

use classify::{BlockClassifier, BlockKind};
use normalize::normalize_leading;
use outline::OutlineBuilder;

const PREVIEW_CHARS: usize = 60;

/// How one block was read during the pass.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedBlock {
    pub index: usize,
    pub tag: String,
    pub classes: Vec<String>,
    pub kind: String,
    pub level: Option<OutlineLevel>,
    pub value: Option<ItemValue>,
    pub preview: String,
}

#[derive(Debug)]
pub struct RestructureOutcome {
    pub tree: OutlineTree,
    pub counts: TransformCounts,
    pub trace: Vec<ClassifiedBlock>,
}

pub struct Restructurer {
    classifier: BlockClassifier,
    tab_policy: TabPolicy,
}

impl Restructurer {
    pub fn new(tab_policy: TabPolicy) -> Result<Self> {
        Ok(Self {
            classifier: BlockClassifier::new(tab_policy)?,
            tab_policy,
        })
    }

    pub fn restructure(&self, blocks: Vec<Block>) -> Result<RestructureOutcome> {
        let mut builder = OutlineBuilder::new(self.tab_policy);
        let mut state = builder.initial_state();
        let mut trace = Vec::with_capacity(blocks.len());

        for block in blocks {
            let kind = self.classifier.classify(&block, state.section_open());
            let index = block.index;
            debug!(block = index, kind = kind.as_str(), "classified block");

            trace.push(self.describe(&block, &kind));
            state = builder
                .apply(state, block, kind)
                .with_context(|| format!("failed to place block {index}"))?;
        }

        let (tree, counts) = builder.finish();
        Ok(RestructureOutcome {
            tree,
            counts,
            trace,
        })
    }

    fn describe(&self, block: &Block, kind: &BlockKind) -> ClassifiedBlock {
        let (level, value) = match kind {
            BlockKind::OutlineItem(marker) => (Some(marker.level), Some(marker.value.clone())),
            _ => (None, None),
        };

        ClassifiedBlock {
            index: block.index,
            tag: block.element.tag.clone(),
            classes: block.element.classes().map(ToOwned::to_owned).collect(),
            kind: kind.as_str().to_string(),
            level,
            value,
            preview: normalize_leading(&block.element.text_content(), self.tab_policy)
                .chars()
                .take(PREVIEW_CHARS)
                .collect(),
        }
    }
}
