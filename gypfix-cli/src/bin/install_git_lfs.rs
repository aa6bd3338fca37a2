//! Installs the pinned git-lfs release into `~/bin`.

use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;

use gypfix_cli::{finish, init_logging, FetchArgs};
use gypfix_core::Fetcher;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logging();
    tracing::info!("Starting install-git-lfs v{}", gypfix_core::VERSION);

    finish(run(FetchArgs::parse()).await)
}

async fn run(args: FetchArgs) -> anyhow::Result<()> {
    let fetcher = Fetcher::new(args.into_settings()?);
    tracing::debug!(settings = ?fetcher.settings(), "Fetch settings");

    fetcher
        .run()
        .await
        .context("Failed to install git-lfs")?;
    Ok(())
}
