use std::io::Write;
use std::process::ExitCode;

use calendar_db::RestStore;
use calendar_setup::{Orchestrator, RunReport, Settings};
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging; stdout is reserved for the report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "calendar_setup=info,calendar_db=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut stdout = std::io::stdout().lock();

    // Config
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            writeln!(stdout, "[fail] Configuration: {}", e)?;
            let report = RunReport::aborted(format!("configuration: {}", e));
            return Ok(ExitCode::from(report.exit_code()));
        }
    };
    info!(mode = %settings.mode, seed = ?settings.seed, endpoint = %settings.store.endpoint, "Starting setup");

    let orchestrator = Orchestrator::new(settings.mode, settings.seed)
        .with_project_ref(settings.store.project_ref().map(str::to_owned));

    let report = orchestrator
        .run(RestStore::connect(settings.store.clone()), &mut stdout)
        .await?;

    Ok(ExitCode::from(report.exit_code()))
}
