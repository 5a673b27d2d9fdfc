mod cli;
mod commands;
mod config;
mod infrastructure;

use anyhow::Context;
use clap::Parser;

use crate::cli::Cli;
use crate::commands::App;
use crate::config::AppConfig;
use infrastructure::logging::init_logging;

pub fn run() -> anyhow::Result<()> {
  let cli = Cli::parse();

  // --- Composition ---

  // 1. Config (writes defaults back on first run)
  let cfg = AppConfig::load().context("cannot load configuration")?;

  // 2. Logging, as early as the level is known
  init_logging(&cfg.logging.level);
  tracing::debug!(config = %cfg.paths.config_file().display(), "configuration loaded");

  // 3. Adapters + services, then the command on a multi-thread runtime
  let app = App::new(cfg);
  let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build().context("cannot start runtime")?;

  runtime.block_on(app.dispatch(cli.command))
}
