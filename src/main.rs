mod api;
mod app;
mod cache;
mod config;
mod error;
mod pagination;

use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mbrowse")]
#[command(about = "Browse and manage members of the dating app from the terminal")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/mbrowse/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: app::Command,
}

/// Route tracing output to the configured log file, or stderr.
fn init_logging(config: &config::Config) -> Result<WorkerGuard> {
  let (writer, guard) = match &config.log.file {
    Some(path) => {
      let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
      let name = path
        .file_name()
        .ok_or_else(|| eyre!("Invalid log file path: {}", path.display()))?;
      let appender = tracing_appender::rolling::never(dir.unwrap_or(std::path::Path::new(".")), name);
      tracing_appender::non_blocking(appender)
    }
    None => tracing_appender::non_blocking(std::io::stderr()),
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(config.log.file.is_none())
    .init();

  Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;
  let _guard = init_logging(&config)?;

  let app = app::App::new(&config)?;
  app.run(args.command).await?;

  Ok(())
}
