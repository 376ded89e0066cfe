// Command-line interface.

use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use crate::api::ApiLayout;
use crate::api::client::DEFAULT_BASE_URL;
use crate::cache::DEFAULT_PARTITION;

/// Fetch a repository's commits, cache them, and render them as HTML cards.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
#[command(group(ArgGroup::new("repository").required(true).args(["page_path", "repo"])))]
pub struct Cli {
    /// Server the commits pages are served from
    #[arg(long, env = "COMMITVIEW_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// URL scheme of the deployment
    #[arg(long, value_enum, default_value_t = ApiLayout::V1)]
    pub layout: ApiLayout,

    /// Page path to resolve the repository from (e.g. /api/v1/repo/NAME/commits/all)
    #[arg(long)]
    pub page_path: Option<String>,

    /// Repository name, used as is
    #[arg(long)]
    pub repo: Option<String>,

    /// HTML page containing the commits-list element
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Write the rendered page here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Root directory for cache partitions
    #[arg(long, env = "COMMITVIEW_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Cache partition name
    #[arg(long, default_value = DEFAULT_PARTITION)]
    pub partition: String,

    /// Always go to the network, never read or write the cache
    #[arg(long)]
    pub no_cache: bool,

    /// Log debug output
    #[arg(short, long)]
    pub verbose: bool,
}
