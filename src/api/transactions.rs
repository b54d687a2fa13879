// Transaction-Related API Endpoints

use axum::{extract::Path, Extension, Json};
use tracing::warn;

use super::helpers::{bad_request, internal_error, is_hex_hash, upstream_failure, ApiResult};
use super::SharedState;
use crate::enrich::EnrichedTransaction;

/// GET /api/explorer/tx/{txid}
///
/// Returns the transaction with addresses, decoded votes, burned total and
/// confirmations relative to the current tip.
pub async fn tx(
    Path(txid): Path<String>,
    Extension(state): Extension<SharedState>,
) -> ApiResult<EnrichedTransaction> {
    if !is_hex_hash(&txid) {
        return Err(bad_request("Invalid txid"));
    }

    let tx = state
        .chronik
        .tx(&txid)
        .await
        .map_err(|e| upstream_failure("Transaction", &e))?;

    let info = state.chronik.blockchain_info().await.map_err(|e| {
        warn!(error = %e, "Failed to fetch chain tip");
        internal_error("Failed to fetch chain tip")
    })?;

    Ok(Json(state.enricher.enrich(&tx, info.tip_height)))
}
