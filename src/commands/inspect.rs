use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InspectArgs;
use crate::page::inspect_page;
use crate::restructure::ClassifiedBlock;
use crate::util::{decode_page, read_page_bytes};

#[derive(Debug, Serialize)]
struct InspectResponse {
    input_path: String,
    root_class: String,
    block_count: usize,
    blocks: Vec<ClassifiedBlock>,
}

pub fn run(args: InspectArgs) -> Result<()> {
    let options = args.page.transform_options();
    let bytes = read_page_bytes(&args.input)?;
    let blocks = inspect_page(&decode_page(&bytes), &options)
        .with_context(|| format!("failed to inspect {}", args.input.display()))?;

    info!(path = %args.input.display(), blocks = blocks.len(), "inspected page");

    let response = InspectResponse {
        input_path: args.input.display().to_string(),
        root_class: options.root_class,
        block_count: blocks.len(),
        blocks,
    };

    if args.json {
        write_json_response(&response)
    } else {
        write_text_response(&response)
    }
}

fn write_json_response(response: &InspectResponse) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, response)
        .context("failed to serialize inspect json output")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

fn write_text_response(response: &InspectResponse) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());

    writeln!(output, "Page: {}", response.input_path)?;
    writeln!(
        output,
        "Root: .{} blocks={}",
        response.root_class, response.block_count
    )?;

    for block in &response.blocks {
        let marker = match (&block.level, &block.value) {
            (Some(level), Some(value)) => format!("{}={}", level.as_str(), value),
            _ => "-".to_string(),
        };

        writeln!(
            output,
            "{}.\t{}.{}\t{}\t{}\t{}",
            block.index,
            block.tag,
            block.classes.join("."),
            block.kind,
            marker,
            block.preview
        )?;
    }

    output.flush()?;
    Ok(())
}
