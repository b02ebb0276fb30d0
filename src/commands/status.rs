use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::model::TransformRunManifest;

const MANIFEST_PREFIX: &str = "transform_run_";

pub fn run(args: StatusArgs) -> Result<()> {
    let manifest_dir = args.cache_root.join("manifests");

    info!(cache_root = %args.cache_root.display(), "status requested");

    let Some(manifest_path) = latest_run_manifest(&manifest_dir)? else {
        warn!(path = %manifest_dir.display(), "no transform run manifest found");
        return Ok(());
    };

    let raw = fs::read(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    let manifest: TransformRunManifest = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", manifest_path.display()))?;

    info!(
        path = %manifest_path.display(),
        run_id = %manifest.run_id,
        status = %manifest.status,
        started_at = %manifest.started_at,
        updated_at = %manifest.updated_at,
        pages = manifest.page_count,
        failed = manifest.failed_page_count,
        tabs = %manifest.settings.tab_policy,
        "loaded transform run manifest"
    );

    for page in &manifest.pages {
        match (&page.counts, &page.failure_reason) {
            (Some(counts), _) => info!(
                input = %page.input_path,
                output = %page.output_path.clone().unwrap_or_default(),
                sections = counts.sections,
                numeric_items = counts.numeric_items,
                lettered_items = counts.lettered_items,
                parenthesized_items = counts.parenthesized_items,
                "page transformed"
            ),
            (None, reason) => warn!(
                input = %page.input_path,
                reason = %reason.clone().unwrap_or_default(),
                "page failed"
            ),
        }
    }

    for warning in &manifest.warnings {
        warn!(warning = %warning, "run warning");
    }

    Ok(())
}

/// Manifest names embed a compact UTC timestamp, so the lexically greatest is the newest.
fn latest_run_manifest(manifest_dir: &Path) -> Result<Option<PathBuf>> {
    if !manifest_dir.exists() {
        return Ok(None);
    }

    let entries = fs::read_dir(manifest_dir)
        .with_context(|| format!("failed to read {}", manifest_dir.display()))?;

    let mut latest: Option<PathBuf> = None;
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", manifest_dir.display()))?;
        let path = entry.path();

        let is_run_manifest = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with(MANIFEST_PREFIX) && name.ends_with(".json"))
            .unwrap_or(false);

        if is_run_manifest && latest.as_ref().is_none_or(|current| path > *current) {
            latest = Some(path);
        }
    }

    Ok(latest)
}
