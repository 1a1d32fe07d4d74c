//! quill: chat with hosted language models from the terminal.

mod cli;
mod providers;
mod repl;

use std::process::ExitCode;

use quill_ai::{ProviderSelector, Session};
use quill_common::Result;
use quill_config::{toml_loader, QuillConfig};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use crate::cli::Args;
use crate::providers::build_provider;
use crate::repl::{format_providers, Repl};

const DEFAULT_LOG_FILTER: &str = "quill=info";

/// Load environment variables from a .env file (KEY=VALUE lines).
///
/// Variables already set in the environment are left alone.
fn load_dotenv() {
    let Ok(contents) = std::fs::read_to_string(".env") else {
        return;
    };
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if std::env::var(key).is_err() {
                std::env::set_var(key, value);
            }
        }
    }
}

/// `--log-level`, then `RUST_LOG`, then the config file, then the default.
fn log_filter(cli_level: Option<&str>, config_level: &str) -> EnvFilter {
    if let Some(filter) = cli_level.and_then(|level| EnvFilter::try_new(level).ok()) {
        return filter;
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::try_new(config_level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Out-of-range values are kept with a warning rather than discarding the file.
fn load_config(args: &Args) -> Result<QuillConfig> {
    let config = match &args.config {
        Some(path) => toml_loader::load_from_path(path)?,
        None => toml_loader::load_default()?,
    };
    Ok(config)
}

/// [`load_config`] under a provisional subscriber, so the loader's own
/// events are written before the real filter is known.
fn load_config_logged<W>(args: &Args, writer: W) -> Result<QuillConfig>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let provisional = tracing_subscriber::fmt()
        .with_env_filter(log_filter(args.log_level.as_deref(), DEFAULT_LOG_FILTER))
        .with_writer(writer)
        .with_ansi(false)
        .finish();
    tracing::subscriber::with_default(provisional, || load_config(args))
}

async fn run(args: Args, config: QuillConfig) -> Result<ExitCode> {
    let selector = ProviderSelector::new();

    if args.list_providers {
        print!("{}", format_providers(&selector, &config.provider.default));
        return Ok(ExitCode::SUCCESS);
    }

    let id = args
        .provider
        .clone()
        .unwrap_or_else(|| config.provider.default.clone());
    let provider = build_provider(&selector, &config, &id, args.model.as_deref())?;

    if args.check {
        let snapshot = provider.config();
        return Ok(if provider.validate_credential().await {
            println!("{snapshot}: credential ok");
            ExitCode::SUCCESS
        } else {
            println!("{snapshot}: credential rejected or backend unreachable");
            ExitCode::FAILURE
        });
    }

    let mut session = Session::new(provider);
    let system_prompt = config.session.system_prompt.trim();
    if !system_prompt.is_empty() {
        session = session.with_system_prompt(system_prompt);
    }
    tracing::info!(session = %session.id().short(), provider = %session.provider().name(), "session started");

    let stream = config.session.stream && !args.no_stream;
    Repl::new(session, config, selector, stream).run().await?;
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    load_dotenv();

    let args = cli::parse();

    // Config comes first so its log level can seed the filter.
    let loaded = load_config_logged(&args, std::io::stderr);
    let config_level = loaded
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(args.log_level.as_deref(), &config_level))
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("quill v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match loaded {
        Ok(config) => config,
        Err(e) if args.config.is_some() => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            tracing::warn!("config load failed, using defaults: {e}");
            QuillConfig::default()
        }
    };

    match run(args, config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
