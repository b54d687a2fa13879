// Block-Related API Endpoints
//
// Single block detail and the newest-first block listing.

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use tracing::{debug, warn};

use super::helpers::{bad_request, internal_error, is_hex_hash, not_found, or_degraded, ApiResult, Pagination};
use super::types::{BlocksPage, ExplorerBlock, PageQuery};
use super::SharedState;
use crate::address::script_to_address;
use crate::constants::is_genesis_height;
use crate::enrich::TxWithBurned;
use crate::telemetry::truncate_hex;
use crate::types::Block;

/// GET /api/explorer/block/{hashOrHeight}
pub async fn block(
    Path(hash_or_height): Path<String>,
    Extension(state): Extension<SharedState>,
) -> ApiResult<ExplorerBlock> {
    if hash_or_height.parse::<u32>().is_err() && !is_hex_hash(&hash_or_height) {
        return Err(bad_request("Invalid block hash or height"));
    }

    let block = state.chronik.block(&hash_or_height).await.map_err(|e| {
        debug!(block = %truncate_hex(&hash_or_height, 16), error = %e, "Block lookup failed");
        not_found("Block not found")
    })?;

    let mined_by = if is_genesis_height(block.block_info.height) {
        None
    } else {
        mined_by(&block, &state)
    };

    Ok(Json(ExplorerBlock {
        block_info: block.block_info,
        txs: block.txs.into_iter().map(TxWithBurned::new).collect(),
        mined_by,
    }))
}

/// Address paid by the coinbase's second output, when it is an address script
fn mined_by(block: &Block, state: &SharedState) -> Option<String> {
    let output = block.txs.first()?.outputs.get(1)?;
    script_to_address(&output.output_script, state.enricher.network())
}

/// GET /api/explorer/blocks?page=&pageSize=
pub async fn blocks(
    Query(query): Query<PageQuery>,
    Extension(state): Extension<SharedState>,
) -> ApiResult<BlocksPage> {
    let pagination = Pagination::from_query(&query);

    let info = state.chronik.blockchain_info().await.map_err(|e| {
        warn!(error = %e, "Failed to fetch chain tip");
        internal_error("Failed to fetch chain tip")
    })?;

    let blocks = match block_range(info.tip_height, pagination) {
        Some((start, end)) => {
            let mut blocks = or_degraded("blocks", state.chronik.blocks(start, end).await);
            // indexer answers lowest height first
            blocks.sort_by(|a, b| b.height.cmp(&a.height));
            blocks
        }
        None => Vec::new(),
    };

    Ok(Json(BlocksPage {
        blocks,
        tip_height: info.tip_height,
    }))
}

/// Inclusive height range shown on a listing page, or `None` when the page
/// lies entirely below height 1.
pub fn block_range(tip_height: i32, pagination: Pagination) -> Option<(i32, i32)> {
    let size = pagination.page_size as i64;
    let start = tip_height as i64 - size * pagination.page as i64;
    let end = start + size;
    let lowest = (start + 1).max(1);
    if end < lowest {
        return None;
    }
    Some((lowest as i32, end as i32))
}
