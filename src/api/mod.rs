// API Module
//
// HTTP surface of the explorer. Each domain (blocks, transactions, addresses,
// network, social) lives in its own submodule; handlers share one `AppState`
// injected through an `Extension` layer.

pub mod types;
pub mod helpers;
pub mod network;
pub mod blocks;
pub mod transactions;
pub mod addresses;
pub mod social;

#[cfg(test)]
mod route_tests;

pub use types::*;
pub use helpers::*;

use axum::{
    http::header,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::chronik::ChronikClient;
use crate::enrich::Enricher;
use crate::geoip::GeoIpCache;
use crate::metrics::gather_metrics;
use crate::rank_api::RankApi;
use crate::rpc::NodeRpc;

/// Upstream clients and shared caches available to every handler
pub struct AppState {
    pub chronik: Arc<dyn ChronikClient>,
    pub rpc: Arc<dyn NodeRpc>,
    pub rank: Arc<dyn RankApi>,
    pub geoip: Arc<GeoIpCache>,
    pub enricher: Enricher,
}

pub type SharedState = Arc<AppState>;

pub fn router(state: SharedState) -> Router {
    let explorer_routes = Router::new()
        .route("/address/{address}", get(addresses::address))
        .route("/address/{address}/balance", get(addresses::address_balance))
        .route("/block/{hash_or_height}", get(blocks::block))
        .route("/blocks", get(blocks::blocks))
        .route("/chain-info", get(network::chain_info))
        .route("/mempool", get(network::mempool))
        .route("/overview", get(network::overview))
        .route("/peer-info", get(network::peer_info))
        .route("/tx/{txid}", get(transactions::tx));

    let social_routes = Router::new()
        .route("/activity", get(social::activity))
        .route("/profiles", get(social::profiles))
        .route("/search/{query}", get(social::search))
        .route("/stats/{target}/{direction}/{timespan}", get(social::stats))
        .route("/charts/wallet/summary/{period}", get(social::wallet_summary))
        .route("/charts/wallet/activity/{period}", get(social::wallet_activity_chart))
        .route("/wallet/{script_payload}", get(social::wallet_activity))
        .route("/wallet/{script_payload}/{start}", get(social::wallet_activity))
        .route("/wallet/{script_payload}/{start}/{end}", get(social::wallet_activity))
        .route("/wallet/summary/{script_payload}", get(social::wallet_activity_summary))
        .route("/wallet/summary/{script_payload}/{start}", get(social::wallet_activity_summary))
        .route(
            "/wallet/summary/{script_payload}/{start}/{end}",
            get(social::wallet_activity_summary),
        )
        .route("/{platform}/{profile_id}", get(social::profile))
        .route("/{platform}/{profile_id}/posts", get(social::posts))
        .route("/{platform}/{profile_id}/votes", get(social::votes))
        .route("/{platform}/{profile_id}/{post_id}", get(social::post));

    Router::new()
        .nest("/api/explorer", explorer_routes)
        .nest("/api/social", social_routes)
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// GET /metrics
async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        gather_metrics(),
    )
}

/// GET /health
async fn health_handler() -> Json<Health> {
    Json(Health { status: "ok" })
}
