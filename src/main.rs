use clap::Parser;
use prometheus::Registry;
use promcon_registration_exporter::domain::ports::ConfigProvider;
use promcon_registration_exporter::server::{self, AppState};
use promcon_registration_exporter::utils::{logger, validation::Validate};
use promcon_registration_exporter::{
    CliConfig, ExporterError, HttpPageFetcher, RegistrationCollector,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    logger::init_logger(cli.verbose, cli.log_format);

    tracing::info!("Starting promcon_registration_exporter");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(cli).await {
        tracing::error!("❌ {} (category: {})", e, e.category());
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: CliConfig) -> Result<(), ExporterError> {
    let config = cli.resolve()?;
    config.validate()?;

    tracing::info!(
        "Watching {} for PromCon {} in {} (timeout: {}s)",
        config.url,
        config.year,
        config.location,
        config.timeout_seconds,
    );

    let fetcher = HttpPageFetcher::new(config.request_timeout())?;
    let bind_address = config.bind_address();
    let collector =
        RegistrationCollector::new(fetcher, config, tokio::runtime::Handle::current())?;

    let registry = Registry::new();
    registry.register(Box::new(collector))?;

    let listener = server::bind(&bind_address).await?;
    tracing::info!("Listening on: http://{}/metrics", bind_address);

    server::serve(listener, AppState { registry }, server::shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
