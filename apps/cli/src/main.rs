mod config;
mod main_lib;

use appstore_reports::ReportOrchestrator;
use config::Config;
use main_lib::{init_tracing, load_items, write_outputs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_json);

    let items = load_items(&config.items_file)?;
    tracing::info!(
        "Loaded {} item(s) from {}",
        items.len(),
        config.items_file.display()
    );

    let orchestrator = ReportOrchestrator::new(&config.reports)?;
    let results = orchestrator.run_batch(&items, &config.credential).await;

    let summary = write_outputs(&config.output_dir, results)?;
    tracing::info!(
        "Done: {} succeeded, {} failed, output in {}",
        summary.succeeded,
        summary.failed,
        config.output_dir.display()
    );

    if summary.failed > 0 {
        anyhow::bail!("{} item(s) failed", summary.failed);
    }
    Ok(())
}
