use anyhow::Context;
use clap::{Parser, Subcommand};
use skraper::{config::Config, DefaultSkraperClient, ImageSize, ProviderKind, Registry};
use std::{path::PathBuf, process::ExitCode, sync::Arc};
use tokio::select;

#[derive(Parser)]
struct Opts {
    /// TOML config file, defaults are used when omitted
    #[clap(long)]
    config_path: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the latest posts of a page as json
    Posts {
        provider: ProviderKind,
        uri: String,
        #[clap(long, default_value_t = 10)]
        limit: usize,
    },
    /// Print the logo url of a page
    Logo {
        provider: ProviderKind,
        uri: String,
        #[clap(long, default_value_t = ImageSize::Medium)]
        size: ImageSize,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let opts = Opts::parse();

    select! {
        res = entrypoint(opts) => match res {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!("{e:#}");
                ExitCode::FAILURE
            },
        },
        _ = tokio::signal::ctrl_c() => {
            ExitCode::SUCCESS
        },
    }
}

async fn entrypoint(opts: Opts) -> anyhow::Result<()> {
    let config = match &opts.config_path {
        Some(path) => Config::load(path).await.context("Unable to load config")?,
        None => Config::default(),
    };

    let client = DefaultSkraperClient::from_settings(&config.client).context("Unable to create http client")?;
    let registry = Registry::with_defaults(Arc::new(client));

    match opts.command {
        Command::Posts { provider, uri, limit } => {
            let skraper = registry
                .get(provider)
                .with_context(|| format!("Provider {provider} is not registered"))?;

            let posts = skraper.get_latest_posts(&uri, limit).await;
            tracing::info!("fetched {} posts from {provider}", posts.len());

            println!("{}", serde_json::to_string_pretty(&posts)?);
        },
        Command::Logo { provider, uri, size } => {
            let skraper = registry
                .get(provider)
                .with_context(|| format!("Provider {provider} is not registered"))?;

            let logo = skraper
                .get_page_logo_url(&uri, size)
                .await
                .with_context(|| format!("No logo found for {uri} on {provider}"))?;

            println!("{logo}");
        },
    }

    Ok(())
}
