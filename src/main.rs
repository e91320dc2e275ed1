use adaptive_placement::cli::{
    Args, ConfigDiscovery, ExecutionMode, run_results, run_simulate, run_take,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_directive = if args.verbose {
        "adaptive_placement=debug"
    } else {
        "adaptive_placement=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .init();

    let mode = match args.mode() {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    if let ExecutionMode::ShowConfig = mode {
        ConfigDiscovery::show_discovery_info();
        return Ok(());
    }

    let settings = ConfigDiscovery::load(args.config.as_deref())?;
    info!("Starting placement");

    let result = match mode {
        ExecutionMode::Take(config) => run_take(config, &settings).await,
        ExecutionMode::Simulate(config) => run_simulate(config, &settings).await,
        ExecutionMode::Results(session_id) => run_results(session_id, &settings).await,
        ExecutionMode::ShowConfig => Ok(()),
    };

    if let Err(e) = &result {
        error!("Command failed: {:#}", e);
    }
    result
}
