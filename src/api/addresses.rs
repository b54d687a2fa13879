// Address-Related API Endpoints
//
// Balance and paginated history of an address, resolved through the
// indexer's script endpoints.

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use tracing::debug;

use super::helpers::{bad_request, upstream_failure, ApiResult, Pagination};
use super::types::{AddressDetail, AddressHistory, ApiError, PageQuery};
use super::SharedState;
use crate::address::{parse_address, ParsedAddress};
use crate::enrich::TxWithBurned;
use crate::types::Utxo;

fn parse(address: &str, state: &SharedState) -> Result<ParsedAddress, (StatusCode, Json<ApiError>)> {
    parse_address(address, state.enricher.network()).map_err(|e| {
        debug!(address, error = %e, "Rejected address");
        bad_request("Invalid address")
    })
}

/// Sum of UTXO values as a decimal string
pub fn balance(utxos: &[Utxo]) -> String {
    utxos
        .iter()
        .map(|utxo| utxo.value as i128)
        .sum::<i128>()
        .to_string()
}

/// GET /api/explorer/address/{address}?page=&pageSize=
pub async fn address(
    Path(address): Path<String>,
    Query(query): Query<PageQuery>,
    Extension(state): Extension<SharedState>,
) -> ApiResult<AddressDetail> {
    let parsed = parse(&address, &state)?;
    let pagination = Pagination::from_query(&query);
    let script_type = parsed.indexer_type();
    let payload = parsed.payload_hex();

    let (history, utxos) = tokio::join!(
        state.chronik.script_history(
            script_type,
            &payload,
            pagination.zero_indexed_page(),
            pagination.page_size,
        ),
        state.chronik.script_utxos(script_type, &payload),
    );
    let history = history.map_err(|e| upstream_failure("Address history", &e))?;
    let utxos = utxos.map_err(|e| upstream_failure("Address balance", &e))?;

    let last_seen = history.txs.first().map(|tx| tx.last_seen().to_string());
    let txs = history.txs.into_iter().map(TxWithBurned::new).collect();

    Ok(Json(AddressDetail {
        balance: balance(&utxos),
        last_seen,
        history: AddressHistory {
            txs,
            num_pages: history.num_pages,
        },
    }))
}

/// GET /api/explorer/address/{address}/balance
pub async fn address_balance(
    Path(address): Path<String>,
    Extension(state): Extension<SharedState>,
) -> ApiResult<String> {
    let parsed = parse(&address, &state)?;
    let utxos = state
        .chronik
        .script_utxos(parsed.indexer_type(), &parsed.payload_hex())
        .await
        .map_err(|e| upstream_failure("Address balance", &e))?;
    Ok(Json(balance(&utxos)))
}
