use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use kokoro_provision::{HttpSource, ProvisionConfig, Provisioner};
use tracing_subscriber::EnvFilter;

/// Set to `json` for machine-readable log lines.
const LOG_FORMAT_ENV: &str = "KOKORO_LOG_FORMAT";

#[derive(Parser, Debug)]
#[command(name = "kokoro-provision", about = "Download and prepare the Kokoro v1.0 model", version)]
struct Cli {
    /// Output directory for model files
    #[arg(long)]
    output: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    let cfg = ProvisionConfig::load(None)?;
    cfg.validate().context("invalid provisioning config")?;

    let source = HttpSource::new(&cfg)?;
    let provisioner = Provisioner::new(cfg, source);
    let pair = provisioner.ensure(&cli.output).await?;

    println!(
        "{} Model files ready: {}, {}",
        "✓".green().bold(),
        pair.model_path.display(),
        pair.config_path.display()
    );
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    match std::env::var(LOG_FORMAT_ENV).as_deref() {
        Ok("json") => builder.json().init(),
        _ => builder.pretty().init(),
    }
}
