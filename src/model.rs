use serde::{Deserialize, Serialize};

use crate::restructure::OutlineLevel;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformCounts {
    pub blocks: usize,
    pub sections: usize,
    pub doc_headings: usize,
    pub anchors_promoted: usize,
    pub paragraphs: usize,
    pub source_notes: usize,
    pub orphan_source_notes: usize,
    pub raw_passthrough: usize,
    pub generic_blocks: usize,
    pub numeric_lists: usize,
    pub lettered_lists: usize,
    pub parenthesized_lists: usize,
    pub numeric_items: usize,
    pub lettered_items: usize,
    pub parenthesized_items: usize,
}

impl TransformCounts {
    pub fn record_list(&mut self, level: OutlineLevel) {
        match level {
            OutlineLevel::Numeric => self.numeric_lists += 1,
            OutlineLevel::Lettered => self.lettered_lists += 1,
            OutlineLevel::NumericParenthesized => self.parenthesized_lists += 1,
        }
    }

    pub fn record_item(&mut self, level: OutlineLevel) {
        match level {
            OutlineLevel::Numeric => self.numeric_items += 1,
            OutlineLevel::Lettered => self.lettered_items += 1,
            OutlineLevel::NumericParenthesized => self.parenthesized_items += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformSettings {
    pub root_class: String,
    pub layout_rule: String,
    pub tab_policy: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformPaths {
    pub cache_root: String,
    pub manifest_dir: String,
    pub output_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageEntry {
    pub input_path: String,
    pub sha256: Option<String>,
    pub output_path: Option<String>,
    pub status: String,
    pub failure_reason: Option<String>,
    pub counts: Option<TransformCounts>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub command: String,
    pub dry_run: bool,
    pub settings: TransformSettings,
    pub paths: TransformPaths,
    pub page_count: usize,
    pub failed_page_count: usize,
    pub pages: Vec<PageEntry>,
    pub warnings: Vec<String>,
}
