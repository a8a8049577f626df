use std::sync::Arc;

use poem::Server;
use poem::listener::TcpListener;
use sensor_station::config::Config;
use sensor_station::error::StationError;
use sensor_station::store::ReadingsStore;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt};

fn init_telemetry() -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(BunyanFormattingLayer::new("sensor-station".into(), writer));
    tracing::subscriber::set_global_default(subscriber).expect("telemetry already initialized");
    guard
}

#[tokio::main]
async fn main() -> Result<(), StationError> {
    dotenvy::dotenv().ok();
    let _guard = init_telemetry();

    let config = Config::from_env()?;
    let store = Arc::new(ReadingsStore::open(
        config.data_file.clone(),
        config.max_records,
    )?);
    info!(
        addr = %config.bind_addr(),
        data_file = %store.data_file().display(),
        max_records = config.max_records,
        "Starting sensor station"
    );

    let app = sensor_station::api::app(store);
    Server::new(TcpListener::bind(config.bind_addr()))
        .run(app)
        .await?;
    Ok(())
}
