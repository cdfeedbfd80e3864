use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// `OpenAI`-compatible transcription proxy
#[derive(Debug, Parser)]
#[command(name = "murmur", about = "OpenAI-compatible transcription proxy for AssemblyAI")]
pub struct Args {
    /// Path to configuration file; without it configuration is read from the environment
    #[arg(short, long, env = "MURMUR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the listen address
    #[arg(long, env = "MURMUR_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Override the configured log filter (`RUST_LOG` still takes precedence)
    #[arg(long)]
    pub log_filter: Option<String>,
}
