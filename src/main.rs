use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;
use tokio::io::AsyncWriteExt as _;

use hellonet::cli::{Cli, Command};
use hellonet::pipeline::{Pipeline, ProxyOutcome};
use hellonet::search::search_suggestions;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    hellonet::logging::init("warn").context("init logging")?;

    let cli = Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    let pipeline = Pipeline::with_defaults().context("build pipeline")?;

    match cli.command {
        Command::Proxy(args) => {
            let body = match pipeline.proxy(&args.target.url).await? {
                ProxyOutcome::Html(html) => html.into_bytes(),
                ProxyOutcome::Passthrough { content_type, body } => {
                    tracing::info!(content_type = %content_type, "non-html body passed through");
                    body
                }
            };
            match args.out {
                Some(path) => tokio::fs::write(&path, body)
                    .await
                    .with_context(|| format!("write proxied body: {path}"))?,
                None => write_stdout(&body).await?,
            }
        }
        Command::Extract(args) => {
            let record = pipeline.extract(&args.url).await?;
            print_json(&record).await?;
        }
        Command::Metadata(args) => {
            let metadata = pipeline.metadata(&args.url).await?;
            print_json(&metadata).await?;
        }
        Command::Search(args) => {
            anyhow::ensure!(!args.query.trim().is_empty(), "search query is required");
            let suggestions = search_suggestions(&args.query, chrono::Utc::now().to_rfc3339());
            print_json(&suggestions).await?;
        }
    }

    Ok(())
}

async fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    let mut json = serde_json::to_vec_pretty(value).context("serialize output json")?;
    json.push(b'\n');
    write_stdout(&json).await
}

async fn write_stdout(bytes: &[u8]) -> anyhow::Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(bytes).await.context("write stdout")?;
    stdout.flush().await.context("flush stdout")
}
