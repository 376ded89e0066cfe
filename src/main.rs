use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use commitview::Result;
use commitview::api::CommitsClient;
use commitview::cli::Cli;
use commitview::config::Config;
use commitview::logging::setup_logger;
use commitview::render::COMMITS_LIST_ID;
use commitview::view::CommitsView;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logger(cli.verbose);

    match run(Config::from_cli(cli)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "commitview failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<()> {
    let client = CommitsClient::new(&config.base_url)?;
    let document = config.load_document()?;

    let mut view = CommitsView::new(client, document, config.layout);
    if let Some(cache) = config.open_cache() {
        view = view.with_cache(cache);
    }

    let report = view.load_commits(&config.repo).await;
    if !report.rendered() {
        info!(request = %report.request, "nothing rendered, page left as is");
    }

    let document = view.into_target();
    // A page without the mount point was never renderable
    document.inner_html(COMMITS_LIST_ID)?;
    config.write_output(document.as_str())
}
