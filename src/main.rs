use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use lotusia_explorer::api::{router, AppState};
use lotusia_explorer::chronik::HttpChronik;
use lotusia_explorer::config::{init_global_settings, Settings};
use lotusia_explorer::enrich::Enricher;
use lotusia_explorer::geoip::{store_for_capacity, GeoIpCache, HttpGeoIpLookup};
use lotusia_explorer::metrics::init_metrics;
use lotusia_explorer::rank::RankScriptDecoder;
use lotusia_explorer::rank_api::HttpRankApi;
use lotusia_explorer::rpc::HttpNodeRpc;
use lotusia_explorer::telemetry::{init_tracing, TelemetryConfig};
use lotusia_explorer::upstream::build_http_client;

#[derive(Parser, Debug)]
#[command(name = "lotusia-explorer", version, about = "Lotus explorer and social API server")]
struct Args {
    /// Settings file (TOML). Defaults to ./config.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address, overrides `server.listen`
    #[arg(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(listen) = args.listen {
        settings.server.listen = listen;
    }
    let settings = init_global_settings(settings)?;

    // Keep the guard alive until exit so file logs are flushed
    let _log_guard = init_tracing(TelemetryConfig::default())?;
    init_metrics()?;

    let client = build_http_client(settings.http.timeout())?;

    let geoip = GeoIpCache::new(
        store_for_capacity(settings.geoip.capacity),
        Arc::new(HttpGeoIpLookup::new(client.clone(), settings.geoip.url.clone())),
    );

    let state = Arc::new(AppState {
        chronik: Arc::new(HttpChronik::new(client.clone(), settings.chronik.url.clone())),
        rpc: Arc::new(HttpNodeRpc::new(
            client.clone(),
            settings.rpc.url(),
            settings.rpc.user.clone(),
            settings.rpc.password.clone(),
        )),
        rank: Arc::new(HttpRankApi::new(client, settings.rank.url.clone())),
        geoip: Arc::new(geoip),
        enricher: Enricher::new(settings.network, Arc::new(RankScriptDecoder)),
    });

    let listener = TcpListener::bind(settings.server.listen.as_str()).await?;
    info!(
        listen = %settings.server.listen,
        network = ?settings.network,
        chronik = %settings.chronik.url,
        "🚀 Explorer API listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
        })
        .await?;

    info!("Server stopped");
    Ok(())
}
