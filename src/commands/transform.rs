use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use chrono::Utc;
use tracing::{error, info, warn};

use crate::cli::TransformArgs;
use crate::model::{PageEntry, TransformPaths, TransformRunManifest, TransformSettings};
use crate::page::{TransformOptions, transform_page};
use crate::util::{
    decode_page, ensure_directory, now_utc_string, read_page_bytes, sha256_hex,
    utc_compact_string, write_json_pretty, write_text,
};

const OUTPUT_SUFFIX: &str = "readable.html";
const OUTPUT_DIGEST_CHARS: usize = 12;

pub fn run(args: TransformArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    let cache_root = args.cache_root.clone();
    let manifest_dir = cache_root.join("manifests");
    let output_dir = args
        .out_dir
        .clone()
        .unwrap_or_else(|| cache_root.join("output"));
    let manifest_path = args.manifest_path.clone().unwrap_or_else(|| {
        manifest_dir.join(format!(
            "transform_run_{}.json",
            utc_compact_string(started_ts)
        ))
    });

    if !args.dry_run {
        ensure_directory(&output_dir)?;
    }

    let options = args.transform_options();
    info!(
        run_id = %run_id,
        pages = args.inputs.len(),
        root_class = %options.root_class,
        tabs = options.tab_policy.as_str(),
        "starting transform"
    );

    let mut pages = Vec::with_capacity(args.inputs.len());
    let mut warnings = Vec::new();
    let mut claimed_outputs = HashSet::new();

    for input in &args.inputs {
        let mut entry = PageEntry {
            input_path: input.display().to_string(),
            sha256: None,
            output_path: None,
            status: "failed".to_string(),
            failure_reason: None,
            counts: None,
        };

        let result = transform_one(
            input,
            &output_dir,
            &options,
            args.dry_run,
            &mut claimed_outputs,
            &mut entry,
        );
        if let Err(err) = result {
            error!(path = %input.display(), error = %err, "readability transform failed");
            for cause in err.chain().skip(1) {
                error!(cause = %cause, "caused by");
            }
            entry.failure_reason = Some(format!("{err:#}"));
        }

        if let Some(counts) = &entry.counts {
            if counts.orphan_source_notes > 0 {
                warnings.push(format!(
                    "{}: {} source note(s) outside any section kept at document level",
                    entry.input_path, counts.orphan_source_notes
                ));
            }
        }

        pages.push(entry);
    }

    let failed_page_count = pages.iter().filter(|page| page.status == "failed").count();
    let status = if failed_page_count == 0 {
        "completed"
    } else {
        "completed_with_failures"
    };

    let manifest = TransformRunManifest {
        manifest_version: 1,
        run_id: run_id.clone(),
        status: status.to_string(),
        started_at,
        updated_at: now_utc_string(),
        command: render_transform_command(&args),
        dry_run: args.dry_run,
        settings: TransformSettings {
            root_class: options.root_class.clone(),
            layout_rule: options.layout_rule.clone(),
            tab_policy: options.tab_policy.as_str().to_string(),
        },
        paths: TransformPaths {
            cache_root: cache_root.display().to_string(),
            manifest_dir: manifest_dir.display().to_string(),
            output_dir: output_dir.display().to_string(),
        },
        page_count: pages.len(),
        failed_page_count,
        pages,
        warnings,
    };

    if args.dry_run {
        info!(run_id = %run_id, failed = failed_page_count, "transform dry-run complete");
    } else {
        write_json_pretty(&manifest_path, &manifest)?;
        info!(path = %manifest_path.display(), "wrote transform run manifest");
    }

    if failed_page_count > 0 {
        bail!(
            "{failed_page_count} of {} page(s) failed to transform",
            manifest.page_count
        );
    }

    info!(pages = manifest.page_count, "transform completed");
    Ok(())
}

fn transform_one(
    input: &Path,
    output_dir: &Path,
    options: &TransformOptions,
    dry_run: bool,
    claimed_outputs: &mut HashSet<PathBuf>,
    entry: &mut PageEntry,
) -> Result<()> {
    let bytes = read_page_bytes(input)?;
    let digest = sha256_hex(&bytes);
    entry.sha256 = Some(digest.clone());

    let page = transform_page(&decode_page(&bytes), options)?;
    if page.styles_removed > 0 {
        info!(path = %input.display(), count = page.styles_removed, "dropped page stylesheets");
    }
    if page.counts.sections == 0 {
        warn!(path = %input.display(), "no section headings recognized");
    }

    if !dry_run {
        let output_path = output_path_for(input, output_dir, &digest, claimed_outputs)?;
        write_text(&output_path, &page.html)?;
        claimed_outputs.insert(output_path.clone());
        info!(path = %output_path.display(), "wrote readable page");
        entry.output_path = Some(output_path.display().to_string());
    }

    entry.status = "completed".to_string();
    entry.counts = Some(page.counts);
    Ok(())
}

/// Picks `<stem>.readable.html`, or `<stem>.<digest prefix>.readable.html` when another page in
/// the same run already wrote the plain name.
fn output_path_for(
    input: &Path,
    output_dir: &Path,
    digest: &str,
    claimed: &HashSet<PathBuf>,
) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .and_then(|value| value.to_str())
        .unwrap_or("page");

    let plain = output_dir.join(format!("{stem}.{OUTPUT_SUFFIX}"));
    if !claimed.contains(&plain) {
        return Ok(plain);
    }

    let short = &digest[..digest.len().min(OUTPUT_DIGEST_CHARS)];
    let keyed = output_dir.join(format!("{stem}.{short}.{OUTPUT_SUFFIX}"));
    if claimed.contains(&keyed) {
        bail!(
            "output {} was already written in this run by an identical page",
            keyed.display()
        );
    }

    Ok(keyed)
}

fn render_transform_command(args: &TransformArgs) -> String {
    let mut parts = vec!["nrs-readability".to_string(), "transform".to_string()];
    for input in &args.inputs {
        parts.push("--input".to_string());
        parts.push(input.display().to_string());
    }
    parts.push("--cache-root".to_string());
    parts.push(args.cache_root.display().to_string());
    if let Some(out_dir) = &args.out_dir {
        parts.push("--out-dir".to_string());
        parts.push(out_dir.display().to_string());
    }
    if let Some(manifest_path) = &args.manifest_path {
        parts.push("--manifest-path".to_string());
        parts.push(manifest_path.display().to_string());
    }
    parts.push("--root-class".to_string());
    parts.push(args.page.root_class.clone());
    parts.push("--tabs".to_string());
    parts.push(args.page.tabs.policy().as_str().to_string());
    parts.push("--layout-rule".to_string());
    parts.push(format!("{:?}", args.layout_rule));
    if args.dry_run {
        parts.push("--dry-run".to_string());
    }
    parts.join(" ")
}
