// Runtime configuration.
// Resolves CLI flags and environment into what a single load needs.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::{ApiLayout, resolve_repository_identifier};
use crate::cache::{DiskCache, KeyedCache};
use crate::cli::Cli;
use crate::error::Result;
use crate::render::HtmlDocument;

/// Where cache partitions live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheSetting {
    /// No cache facility.
    Disabled,
    /// Under the platform cache directory.
    Platform,
    /// Under the given directory.
    Dir(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub layout: ApiLayout,
    /// Repository identifier, unvalidated.
    pub repo: String,
    pub template: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub cache: CacheSetting,
    pub partition: String,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Self {
        let repo = match (cli.repo, cli.page_path) {
            (Some(repo), _) => repo,
            (None, Some(path)) => resolve_repository_identifier(&path, cli.layout),
            (None, None) => String::new(),
        };

        let cache = match (cli.no_cache, cli.cache_dir) {
            (true, _) => CacheSetting::Disabled,
            (false, Some(dir)) => CacheSetting::Dir(dir),
            (false, None) => CacheSetting::Platform,
        };

        Self {
            base_url: cli.base_url,
            layout: cli.layout,
            repo,
            template: cli.template,
            output: cli.output,
            cache,
            partition: cli.partition,
        }
    }

    /// Open the configured cache partition.
    ///
    /// Failing to open it is not fatal: the load then runs without a cache.
    pub fn open_cache(&self) -> Option<Arc<dyn KeyedCache>> {
        let opened = match &self.cache {
            CacheSetting::Disabled => return None,
            CacheSetting::Platform => DiskCache::open_default(&self.partition),
            CacheSetting::Dir(root) => DiskCache::open(root, &self.partition),
        };
        match opened {
            Ok(cache) => {
                debug!(dir = %cache.dir().display(), "opened cache partition");
                Some(Arc::new(cache))
            }
            Err(e) => {
                warn!(error = %e, "cache unavailable, refreshing only");
                None
            }
        }
    }

    /// The page commits are mounted into.
    pub fn load_document(&self) -> Result<HtmlDocument> {
        match &self.template {
            Some(path) => Ok(HtmlDocument::new(fs::read_to_string(path)?)),
            None => Ok(HtmlDocument::page(&self.repo)),
        }
    }

    /// Write the rendered page to the output file, or stdout.
    pub fn write_output(&self, html: &str) -> Result<()> {
        match &self.output {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, html)?;
            }
            None => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(html.as_bytes())?;
                stdout.flush()?;
            }
        }
        Ok(())
    }
}
