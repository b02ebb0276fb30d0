use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::page::{DEFAULT_LAYOUT_RULE, DEFAULT_ROOT_CLASS, TransformOptions};
use crate::restructure::TabPolicy;

#[derive(Parser, Debug)]
#[command(
    name = "nrs-readability",
    version,
    about = "Rebuild section and outline structure in exported statute pages"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Transform(TransformArgs),
    Inspect(InspectArgs),
    Status(StatusArgs),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum TabMode {
    Normalize,
    Keep,
}

impl TabMode {
    pub fn policy(self) -> TabPolicy {
        match self {
            Self::Normalize => TabPolicy::Normalize,
            Self::Keep => TabPolicy::Keep,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct PageOptionArgs {
    #[arg(long, default_value = DEFAULT_ROOT_CLASS)]
    pub root_class: String,

    #[arg(long, value_enum, default_value_t = TabMode::Normalize)]
    pub tabs: TabMode,
}

impl PageOptionArgs {
    /// Options for reading a page; the layout rule stays at its default.
    pub fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            root_class: self.root_class.clone(),
            tab_policy: self.tabs.policy(),
            ..TransformOptions::default()
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct TransformArgs {
    #[arg(long = "input", required = true)]
    pub inputs: Vec<PathBuf>,

    #[arg(long, default_value = ".cache/nrs-readability")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[command(flatten)]
    pub page: PageOptionArgs,

    #[arg(long, default_value = DEFAULT_LAYOUT_RULE)]
    pub layout_rule: String,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

impl TransformArgs {
    pub fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            layout_rule: self.layout_rule.clone(),
            ..self.page.transform_options()
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[command(flatten)]
    pub page: PageOptionArgs,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".cache/nrs-readability")]
    pub cache_root: PathBuf,
}
