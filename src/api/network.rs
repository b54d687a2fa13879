// Network Status API Endpoints
//
// Chain tip, mempool and node/peer information. Every endpoint here degrades
// to an empty or default answer when its upstream is down.

use axum::{Extension, Json};
use futures::future::join_all;
use serde_json::Value;
use tracing::debug;

use super::helpers::or_degraded;
use super::types::Overview;
use super::SharedState;
use crate::format::{to_minified_number, NumberKind};
use crate::rpc::PeerInfo;
use crate::telemetry::truncate_hex;
use crate::types::BlockchainInfo;

/// GET /api/explorer/chain-info
pub async fn chain_info(Extension(state): Extension<SharedState>) -> Json<BlockchainInfo> {
    Json(or_degraded("chain-info", state.chronik.blockchain_info().await))
}

/// GET /api/explorer/mempool
///
/// Decoded mempool transactions in mempool order. Transactions that fail to
/// fetch (typically mined or evicted in between) are left out.
pub async fn mempool(Extension(state): Extension<SharedState>) -> Json<Vec<Value>> {
    let txids = or_degraded("mempool", state.rpc.raw_mempool().await);

    let fetched = join_all(txids.iter().map(|txid| state.rpc.raw_transaction(txid))).await;

    let txs = txids
        .iter()
        .zip(fetched)
        .filter_map(|(txid, result)| match result {
            Ok(tx) => Some(tx),
            Err(e) => {
                debug!(txid = %truncate_hex(txid, 16), error = %e, "Dropping mempool tx");
                None
            }
        })
        .collect();

    Json(txs)
}

/// GET /api/explorer/overview
pub async fn overview(Extension(state): Extension<SharedState>) -> Json<Overview> {
    let (mining_info, peers) = tokio::join!(state.rpc.mining_info(), state.rpc.peer_info());
    let mininginfo = or_degraded("mininginfo", mining_info);
    let peerinfo = state
        .geoip
        .enrich_peers(or_degraded("peerinfo", peers))
        .await;
    let hashrate = to_minified_number(NumberKind::Hashrate, mininginfo.networkhashps);

    Json(Overview {
        mininginfo,
        peerinfo,
        hashrate,
    })
}

/// GET /api/explorer/peer-info
pub async fn peer_info(Extension(state): Extension<SharedState>) -> Json<Vec<PeerInfo>> {
    let peers = or_degraded("peerinfo", state.rpc.peer_info().await);
    Json(state.geoip.enrich_peers(peers).await)
}
