mod tasks;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::tasks::Task;

#[derive(Debug, Parser)]
#[command(name = "azubot")]
#[command(about = "Harvest rankings, trending repositories and creator reports into chat webhooks")]
struct Cli {
    /// Job to run.
    #[arg(long, value_enum)]
    task: Task,

    /// Creator identity, overriding the configured default (Bilibili uid,
    /// YouTube channel id, @handle or legacy alias).
    #[arg(long)]
    id: Option<String>,

    /// Print the formatted messages instead of delivering them.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = azubot_core::load_app_config()?;
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(source = %config.source, "configuration loaded");

    let task = cli.task;
    match tasks::run(task, cli.id.as_deref(), cli.dry_run, &config).await {
        Ok(()) => {
            tracing::info!(task = %task, "task completed");
            Ok(())
        }
        Err(e) => {
            tracing::error!(task = %task, error = %e, "task failed");
            Err(e)
        }
    }
}
