use std::path::PathBuf;

use clap::Parser;

/// Quill: a terminal chat client for hosted language models.
#[derive(Parser, Debug)]
#[command(name = "quill", version, about)]
pub struct Args {
    /// Backend to start with (anthropic, openai, deepseek).
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Model override for the starting backend.
    #[arg(short, long)]
    pub model: Option<String>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log filter override (e.g. debug, quill_ai=trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Wait for whole replies instead of streaming them.
    #[arg(long)]
    pub no_stream: bool,

    /// Validate the backend credential and exit.
    #[arg(long)]
    pub check: bool,

    /// Print the supported backends and exit.
    #[arg(long)]
    pub list_providers: bool,
}

pub fn parse() -> Args {
    Args::parse()
}
