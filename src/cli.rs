use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::model::{DEFAULT_ANCHORS, SectionSpec};

#[derive(Parser, Debug)]
#[command(
    name = "agent-sections",
    version,
    about = "Keep a shared section in sync across plugin agent documents"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Apply(ApplyArgs),
    Inventory(InventoryArgs),
}

#[derive(Args, Debug, Clone)]
pub struct TreeArgs {
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    #[arg(long, default_value = "plugins")]
    pub plugins_dir: PathBuf,

    #[arg(long, default_value = "agents")]
    pub agents_dir: String,

    #[arg(long)]
    pub template_path: Option<PathBuf>,
}

impl TreeArgs {
    pub fn plugins_root(&self) -> PathBuf {
        self.root.join(&self.plugins_dir)
    }

    pub fn resolved_template_path(&self) -> PathBuf {
        self.template_path.clone().unwrap_or_else(|| {
            self.root
                .join("shared")
                .join("serena-mcp")
                .join("AGENT_TEMPLATE_SECTION.md")
        })
    }
}

#[derive(Args, Debug, Clone)]
pub struct SectionArgs {
    #[arg(long, default_value = "## Serena MCP Integration")]
    pub heading: String,

    #[arg(long, default_value = "serena")]
    pub keyword: String,

    /// Heading prefix that bounds the insertion point; repeat to replace the defaults.
    #[arg(long = "anchor")]
    pub anchors: Vec<String>,
}

impl SectionArgs {
    pub fn to_spec(&self) -> SectionSpec {
        let anchors = if self.anchors.is_empty() {
            DEFAULT_ANCHORS.iter().map(|anchor| anchor.to_string()).collect()
        } else {
            self.anchors.clone()
        };

        SectionSpec {
            heading: self.heading.clone(),
            keyword: self.keyword.clone(),
            anchors,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub tree: TreeArgs,

    #[command(flatten)]
    pub section: SectionArgs,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    #[arg(long)]
    pub report_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct InventoryArgs {
    #[command(flatten)]
    pub tree: TreeArgs,

    #[command(flatten)]
    pub section: SectionArgs,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,
}
