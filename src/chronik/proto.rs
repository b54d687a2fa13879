// Chronik protobuf messages
//
// Hand-declared subset of the indexer's `chronik.proto`. Token and network
// fields are omitted; prost skips unknown tags on decode. Hashes and txids
// arrive as little-endian bytes and are shown big-endian, so they are
// reversed before hex encoding.

use crate::types;
use crate::upstream::UpstreamError;

use super::SERVICE;

#[derive(Clone, PartialEq, prost::Message)]
pub struct BlockchainInfo {
    #[prost(bytes = "vec", tag = "1")]
    pub tip_hash: Vec<u8>,
    #[prost(int32, tag = "2")]
    pub tip_height: i32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct BlockInfo {
    #[prost(bytes = "vec", tag = "1")]
    pub hash: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub prev_hash: Vec<u8>,
    #[prost(int32, tag = "3")]
    pub height: i32,
    #[prost(uint32, tag = "4")]
    pub n_bits: u32,
    #[prost(int64, tag = "5")]
    pub timestamp: i64,
    #[prost(uint64, tag = "6")]
    pub block_size: u64,
    #[prost(uint64, tag = "7")]
    pub num_txs: u64,
    #[prost(uint64, tag = "8")]
    pub num_inputs: u64,
    #[prost(uint64, tag = "9")]
    pub num_outputs: u64,
    #[prost(int64, tag = "10")]
    pub sum_input_sats: i64,
    #[prost(int64, tag = "11")]
    pub sum_coinbase_output_sats: i64,
    #[prost(int64, tag = "12")]
    pub sum_normal_output_sats: i64,
    #[prost(int64, tag = "13")]
    pub sum_burned_sats: i64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Block {
    #[prost(message, optional, tag = "1")]
    pub block_info: Option<BlockInfo>,
    #[prost(message, repeated, tag = "2")]
    pub txs: Vec<Tx>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Blocks {
    #[prost(message, repeated, tag = "1")]
    pub blocks: Vec<BlockInfo>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Tx {
    #[prost(bytes = "vec", tag = "1")]
    pub txid: Vec<u8>,
    #[prost(int32, tag = "2")]
    pub version: i32,
    #[prost(message, repeated, tag = "3")]
    pub inputs: Vec<TxInput>,
    #[prost(message, repeated, tag = "4")]
    pub outputs: Vec<TxOutput>,
    #[prost(uint32, tag = "5")]
    pub lock_time: u32,
    #[prost(message, optional, tag = "8")]
    pub block: Option<BlockMetadata>,
    #[prost(int64, tag = "9")]
    pub time_first_seen: i64,
    #[prost(uint32, tag = "11")]
    pub size: u32,
    #[prost(bool, tag = "12")]
    pub is_coinbase: bool,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct BlockMetadata {
    #[prost(int32, tag = "1")]
    pub height: i32,
    #[prost(bytes = "vec", tag = "2")]
    pub hash: Vec<u8>,
    #[prost(int64, tag = "3")]
    pub timestamp: i64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct OutPoint {
    #[prost(bytes = "vec", tag = "1")]
    pub txid: Vec<u8>,
    #[prost(uint32, tag = "2")]
    pub out_idx: u32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct TxInput {
    #[prost(message, optional, tag = "1")]
    pub prev_out: Option<OutPoint>,
    #[prost(bytes = "vec", tag = "2")]
    pub input_script: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub output_script: Vec<u8>,
    #[prost(int64, tag = "4")]
    pub value: i64,
    #[prost(uint32, tag = "5")]
    pub sequence_no: u32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct TxOutput {
    #[prost(int64, tag = "1")]
    pub value: i64,
    #[prost(bytes = "vec", tag = "2")]
    pub output_script: Vec<u8>,
    #[prost(message, optional, tag = "4")]
    pub spent_by: Option<OutPoint>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct TxHistoryPage {
    #[prost(message, repeated, tag = "1")]
    pub txs: Vec<Tx>,
    #[prost(uint32, tag = "2")]
    pub num_pages: u32,
}

/// UTXOs grouped by the output script that owns them
#[derive(Clone, PartialEq, prost::Message)]
pub struct Utxos {
    #[prost(message, repeated, tag = "1")]
    pub script_utxos: Vec<ScriptUtxos>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ScriptUtxos {
    #[prost(bytes = "vec", tag = "1")]
    pub output_script: Vec<u8>,
    #[prost(message, repeated, tag = "2")]
    pub utxos: Vec<Utxo>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Utxo {
    #[prost(message, optional, tag = "1")]
    pub outpoint: Option<OutPoint>,
    #[prost(int32, tag = "2")]
    pub block_height: i32,
    #[prost(bool, tag = "3")]
    pub is_coinbase: bool,
    #[prost(int64, tag = "5")]
    pub value: i64,
}

/// Body of a non-2xx response
#[derive(Clone, PartialEq, prost::Message)]
pub struct ErrorBody {
    #[prost(string, tag = "1")]
    pub error_code: String,
    #[prost(string, tag = "2")]
    pub msg: String,
    #[prost(bool, tag = "3")]
    pub is_user_error: bool,
}

// ========== Conversion to chain types ==========

pub(super) fn hex_rev(bytes: &[u8]) -> String {
    let mut reversed = bytes.to_vec();
    reversed.reverse();
    hex::encode(reversed)
}

fn missing(field: &str) -> UpstreamError {
    UpstreamError::decode(SERVICE, format!("missing {}", field))
}

fn count(field: &str, value: u64) -> Result<i64, UpstreamError> {
    i64::try_from(value)
        .map_err(|_| UpstreamError::decode(SERVICE, format!("{} out of range: {}", field, value)))
}

impl From<BlockchainInfo> for types::BlockchainInfo {
    fn from(info: BlockchainInfo) -> Self {
        types::BlockchainInfo {
            tip_hash: hex_rev(&info.tip_hash),
            tip_height: info.tip_height,
        }
    }
}

impl From<OutPoint> for types::OutPoint {
    fn from(outpoint: OutPoint) -> Self {
        types::OutPoint {
            txid: hex_rev(&outpoint.txid),
            out_idx: outpoint.out_idx,
        }
    }
}

impl From<BlockMetadata> for types::BlockMetadata {
    fn from(block: BlockMetadata) -> Self {
        types::BlockMetadata {
            height: block.height,
            hash: hex_rev(&block.hash),
            timestamp: block.timestamp,
        }
    }
}

impl TryFrom<BlockInfo> for types::BlockInfo {
    type Error = UpstreamError;

    fn try_from(info: BlockInfo) -> Result<Self, Self::Error> {
        Ok(types::BlockInfo {
            hash: hex_rev(&info.hash),
            prev_hash: hex_rev(&info.prev_hash),
            height: info.height,
            n_bits: info.n_bits,
            timestamp: info.timestamp,
            block_size: count("blockSize", info.block_size)?,
            num_txs: count("numTxs", info.num_txs)?,
            num_inputs: count("numInputs", info.num_inputs)?,
            num_outputs: count("numOutputs", info.num_outputs)?,
            sum_input_sats: info.sum_input_sats,
            sum_coinbase_output_sats: info.sum_coinbase_output_sats,
            sum_normal_output_sats: info.sum_normal_output_sats,
            sum_burned_sats: info.sum_burned_sats,
        })
    }
}

impl TryFrom<TxInput> for types::TxInput {
    type Error = UpstreamError;

    fn try_from(input: TxInput) -> Result<Self, Self::Error> {
        let prev_out = input.prev_out.ok_or_else(|| missing("input prevOut"))?;
        Ok(types::TxInput {
            prev_out: prev_out.into(),
            input_script: types::Script::from_bytes(input.input_script),
            // coinbase inputs spend nothing
            output_script: (!input.output_script.is_empty())
                .then(|| types::Script::from_bytes(input.output_script)),
            value: input.value,
            sequence_no: input.sequence_no,
        })
    }
}

impl From<TxOutput> for types::TxOutput {
    fn from(output: TxOutput) -> Self {
        types::TxOutput {
            value: output.value,
            output_script: types::Script::from_bytes(output.output_script),
            spent_by: output.spent_by.map(Into::into),
        }
    }
}

impl TryFrom<Tx> for types::Tx {
    type Error = UpstreamError;

    fn try_from(tx: Tx) -> Result<Self, Self::Error> {
        Ok(types::Tx {
            txid: hex_rev(&tx.txid),
            version: tx.version,
            inputs: tx
                .inputs
                .into_iter()
                .map(types::TxInput::try_from)
                .collect::<Result<_, _>>()?,
            outputs: tx.outputs.into_iter().map(Into::into).collect(),
            lock_time: tx.lock_time,
            block: tx.block.map(Into::into),
            time_first_seen: tx.time_first_seen,
            size: tx.size,
            is_coinbase: tx.is_coinbase,
        })
    }
}

fn convert_txs(txs: Vec<Tx>) -> Result<Vec<types::Tx>, UpstreamError> {
    txs.into_iter().map(types::Tx::try_from).collect()
}

impl TryFrom<Block> for types::Block {
    type Error = UpstreamError;

    fn try_from(block: Block) -> Result<Self, Self::Error> {
        let block_info = block.block_info.ok_or_else(|| missing("blockInfo"))?;
        Ok(types::Block {
            block_info: block_info.try_into()?,
            txs: convert_txs(block.txs)?,
        })
    }
}

impl TryFrom<TxHistoryPage> for types::TxHistoryPage {
    type Error = UpstreamError;

    fn try_from(page: TxHistoryPage) -> Result<Self, Self::Error> {
        Ok(types::TxHistoryPage {
            txs: convert_txs(page.txs)?,
            num_pages: page.num_pages,
        })
    }
}

impl TryFrom<Utxo> for types::Utxo {
    type Error = UpstreamError;

    fn try_from(utxo: Utxo) -> Result<Self, Self::Error> {
        let outpoint = utxo.outpoint.ok_or_else(|| missing("utxo outpoint"))?;
        Ok(types::Utxo {
            outpoint: outpoint.into(),
            block_height: utxo.block_height,
            is_coinbase: utxo.is_coinbase,
            value: utxo.value,
        })
    }
}

impl Blocks {
    pub(super) fn into_infos(self) -> Result<Vec<types::BlockInfo>, UpstreamError> {
        self.blocks.into_iter().map(types::BlockInfo::try_from).collect()
    }
}

impl Utxos {
    /// Every UTXO of every script group, in response order
    pub(super) fn flatten(self) -> Result<Vec<types::Utxo>, UpstreamError> {
        self.script_utxos
            .into_iter()
            .flat_map(|group| group.utxos)
            .map(types::Utxo::try_from)
            .collect()
    }
}
