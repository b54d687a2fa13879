// Transaction enrichment
//
// Turns indexer transactions into display records: addresses on inputs and
// outputs, decoded RANK votes on data-carrying outputs, the burned-value total
// and a confirmation count. Pure transforms over data the caller already has.

use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::address::{script_to_address, Network};
use crate::constants::UNCONFIRMED;
use crate::rank::{VoteDecoder, VotePayload};
use crate::script::{classify, ScriptClass};
use crate::telemetry::truncate_hex;
use crate::types::{string_int, BlockMetadata, Tx, TxInput, TxOutput};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedInput {
    #[serde(flatten)]
    pub input: TxInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedOutput {
    #[serde(flatten)]
    pub output: TxOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank_output: Option<VotePayload>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedTransaction {
    pub txid: String,
    pub version: i32,
    pub inputs: Vec<EnrichedInput>,
    pub outputs: Vec<EnrichedOutput>,
    pub lock_time: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<BlockMetadata>,
    #[serde(with = "string_int")]
    pub time_first_seen: i64,
    pub size: u32,
    pub is_coinbase: bool,
    pub confirmations: i64,
    #[serde(with = "string_int")]
    pub sum_burned_sats: i64,
}

impl EnrichedTransaction {
    /// Strip the annotations back off
    pub fn raw(&self) -> Tx {
        Tx {
            txid: self.txid.clone(),
            version: self.version,
            inputs: self.inputs.iter().map(|i| i.input.clone()).collect(),
            outputs: self.outputs.iter().map(|o| o.output.clone()).collect(),
            lock_time: self.lock_time,
            block: self.block.clone(),
            time_first_seen: self.time_first_seen,
            size: self.size,
            is_coinbase: self.is_coinbase,
        }
    }
}

/// Raw transaction annotated only with its burned total, used in listings
/// (address history, block transactions) where full enrichment is skipped.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TxWithBurned {
    #[serde(flatten)]
    pub tx: Tx,
    #[serde(with = "string_int")]
    pub sum_burned_sats: i64,
}

impl TxWithBurned {
    pub fn new(tx: Tx) -> Self {
        let sum_burned_sats = sum_burned(&tx.outputs);
        Self {
            tx,
            sum_burned_sats,
        }
    }
}

/// Sum of the values of all data-carrying outputs with a positive value.
///
/// Accumulates in `u128` so no combination of `i64` outputs can overflow;
/// the result saturates at `i64::MAX`.
pub fn sum_burned(outputs: &[TxOutput]) -> i64 {
    let total: u128 = outputs
        .iter()
        .filter(|o| o.value > 0 && classify(&o.output_script).is_data_carrying())
        .map(|o| o.value as u128)
        .sum();
    i64::try_from(total).unwrap_or(i64::MAX)
}

/// `tip - height + 1` for mined transactions, `-1` otherwise
pub fn confirmations(block: Option<&BlockMetadata>, tip_height: i32) -> i64 {
    match block {
        Some(block) => tip_height as i64 - block.height as i64 + 1,
        None => UNCONFIRMED,
    }
}

/// Shared enrichment context: the network addresses are rendered for and the
/// vote decoder in use.
#[derive(Clone)]
pub struct Enricher {
    network: Network,
    decoder: Arc<dyn VoteDecoder>,
}

impl Enricher {
    pub fn new(network: Network, decoder: Arc<dyn VoteDecoder>) -> Self {
        Self { network, decoder }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn enrich(&self, tx: &Tx, tip_height: i32) -> EnrichedTransaction {
        let inputs = tx
            .inputs
            .iter()
            .map(|input| EnrichedInput {
                address: input
                    .output_script
                    .as_ref()
                    .and_then(|script| script_to_address(script, self.network)),
                input: input.clone(),
            })
            .collect();

        let outputs = tx
            .outputs
            .iter()
            .map(|output| self.enrich_output(&tx.txid, output))
            .collect();

        EnrichedTransaction {
            txid: tx.txid.clone(),
            version: tx.version,
            inputs,
            outputs,
            lock_time: tx.lock_time,
            block: tx.block.clone(),
            time_first_seen: tx.time_first_seen,
            size: tx.size,
            is_coinbase: tx.is_coinbase,
            confirmations: confirmations(tx.block.as_ref(), tip_height),
            sum_burned_sats: sum_burned(&tx.outputs),
        }
    }

    fn enrich_output(&self, txid: &str, output: &TxOutput) -> EnrichedOutput {
        let mut enriched = EnrichedOutput {
            output: output.clone(),
            address: None,
            rank_output: None,
        };

        match classify(&output.output_script) {
            ScriptClass::DataCarrying => {
                match self.decoder.decode(output.output_script.as_bytes()) {
                    Ok(vote) => enriched.rank_output = vote,
                    Err(e) => {
                        debug!(
                            txid = %truncate_hex(txid, 16),
                            error = %e,
                            "Dropping malformed RANK payload"
                        );
                    }
                }
            }
            ScriptClass::Address(_) => {
                enriched.address = script_to_address(&output.output_script, self.network);
            }
            ScriptClass::Other { .. } => {}
        }
        enriched
    }
}
