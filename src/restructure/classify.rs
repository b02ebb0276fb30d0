use std::fmt;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::block::Block;
use super::normalize::{TabPolicy, normalize_leading};

pub const SECTION_BODY_CLASS: &str = "SectBody";
pub const SECTION_HEADING_CLASS: &str = "Section";
pub const HEADING_LEAD_CLASSES: [&str; 3] = ["Empty", SECTION_HEADING_CLASS, "Leadline"];
pub const SOURCE_NOTE_CLASS: &str = "SourceNote";
pub const DOC_HEADING_CLASSES: [&str; 2] = ["DocHeading", "COHead2"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlineLevel {
    Numeric,
    Lettered,
    NumericParenthesized,
}

impl OutlineLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            OutlineLevel::Numeric => "numeric",
            OutlineLevel::Lettered => "lettered",
            OutlineLevel::NumericParenthesized => "numeric_parenthesized",
        }
    }

    /// Value of the `type` attribute on the rendered `<ol>`.
    pub fn list_type(self) -> &'static str {
        match self {
            OutlineLevel::Numeric | OutlineLevel::NumericParenthesized => "1",
            OutlineLevel::Lettered => "a",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemValue {
    Number(u64),
    /// Literal label token: letters, or a digit run too long for `u64`.
    Label(String),
}

impl fmt::Display for ItemValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemValue::Number(number) => write!(f, "{number}"),
            ItemValue::Label(label) => f.write_str(label),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineMarker {
    pub level: OutlineLevel,
    pub value: ItemValue,
    /// Literal marker text as matched, e.g. `12.` or `(a)`.
    pub matched: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    SectionHeading,
    OutlineItem(OutlineMarker),
    PlainContent,
    RawPassthrough,
    SourceNote,
    DocHeading,
    GenericBlock,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::SectionHeading => "section_heading",
            BlockKind::OutlineItem(_) => "outline_item",
            BlockKind::PlainContent => "plain_content",
            BlockKind::RawPassthrough => "raw_passthrough",
            BlockKind::SourceNote => "source_note",
            BlockKind::DocHeading => "doc_heading",
            BlockKind::GenericBlock => "generic_block",
        }
    }
}

pub struct BlockClassifier {
    rules: [(OutlineLevel, Regex); 3],
    tab_policy: TabPolicy,
}

impl BlockClassifier {
    pub fn new(tab_policy: TabPolicy) -> Result<Self> {
        let numeric =
            Regex::new(r"^([0-9]+)\.").context("failed to compile numeric marker regex")?;
        let lettered =
            Regex::new(r"^\(([a-z]+)\)").context("failed to compile lettered marker regex")?;
        let parenthesized = Regex::new(r"^\(([0-9]+)\)")
            .context("failed to compile parenthesized marker regex")?;

        Ok(Self {
            rules: [
                (OutlineLevel::Numeric, numeric),
                (OutlineLevel::Lettered, lettered),
                (OutlineLevel::NumericParenthesized, parenthesized),
            ],
            tab_policy,
        })
    }

    pub fn classify(&self, block: &Block, section_open: bool) -> BlockKind {
        let element = &block.element;

        if element.has_class(SECTION_BODY_CLASS) {
            if element.has_descendant_with_class(SECTION_HEADING_CLASS) {
                return BlockKind::SectionHeading;
            }

            if !section_open {
                return BlockKind::RawPassthrough;
            }

            let text = normalize_leading(&element.text_content(), self.tab_policy);
            return match self.match_outline_marker(&text) {
                Some(marker) => BlockKind::OutlineItem(marker),
                None => BlockKind::PlainContent,
            };
        }

        if element.has_class(SOURCE_NOTE_CLASS) && section_open {
            return BlockKind::SourceNote;
        }

        if element.has_any_class(&DOC_HEADING_CLASSES) {
            return BlockKind::DocHeading;
        }

        BlockKind::GenericBlock
    }

    /// Tries the marker rules in precedence order against already-normalized text.
    ///
    /// A numeric label too large for `u64` keeps its literal digits as the item value.
    pub fn match_outline_marker(&self, text: &str) -> Option<OutlineMarker> {
        for (level, regex) in &self.rules {
            let Some(captures) = regex.captures(text) else {
                continue;
            };

            let matched = captures.get(0)?.as_str().to_string();
            let label = captures.get(1)?.as_str();
            let value = match level {
                OutlineLevel::Lettered => ItemValue::Label(label.to_string()),
                OutlineLevel::Numeric | OutlineLevel::NumericParenthesized => label
                    .parse::<u64>()
                    .map(ItemValue::Number)
                    .unwrap_or_else(|_| ItemValue::Label(label.to_string())),
            };

            return Some(OutlineMarker {
                level: *level,
                value,
                matched,
            });
        }

        None
    }
}
