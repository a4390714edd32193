use bridge_relayer::cli::{Commands, RelayerCli};
use bridge_relayer::observability::init_observability;
use bridge_relayer_core::{builder::RelayerBuilder, config::RelayerConfig};
use clap::Parser;
use prometheus::{Encoder, TextEncoder};
use tracing::{error, info};
use warp::Filter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = RelayerCli::parse();
    match cli.command {
        Commands::Start(args) => {
            let env_loaded = dotenv::dotenv().is_ok();
            let config = RelayerConfig::from_file(&args.config)?;

            let _guard = init_observability(&config.observability)?;
            info!(
                "Observability initialized with level: {}",
                config.observability.level()
            );
            if !env_loaded {
                info!("No .env file found, using the process environment");
            }

            // Start the metrics server.
            let metrics_addr = config.metrics.socket_addr()?;
            let metrics_route = warp::path("metrics").map(|| {
                let encoder = TextEncoder::new();
                let mut buffer = Vec::new();
                if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
                    error!(error = %e, "failed to encode metrics");
                }
                String::from_utf8_lossy(&buffer).into_owned()
            }).boxed();
            tokio::spawn(async move {
                info!("Metrics available at http://{metrics_addr}/metrics");
                warp::serve(metrics_route).run(metrics_addr).await;
            });

            let mut builder = RelayerBuilder::new(config);
            if let Some(start) = args.start {
                builder = builder.start_at(start);
            }
            if let Some(end) = args.end {
                builder = builder.end_at(end);
            }

            // Run the relay loop.
            builder.start().await?;

            Ok(())
        }
    }
}
