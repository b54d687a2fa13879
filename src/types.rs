// Chain data types
//
// Blocks, transactions and UTXOs as the handlers see them, plus the `Script`
// value type used by every classifier and enrichment step. Integer amounts
// and timestamps are rendered as decimal strings, so they go through
// `string_int`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Raw script bytes. Hex-encoded in JSON, bytes everywhere else.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Script(Vec<u8>);

impl Script {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Script(bytes.into())
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, hex::FromHexError> {
        hex::decode(hex_str).map(Script)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_hex())
    }
}

impl Serialize for Script {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Script {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let hex_str = String::deserialize(deserializer)?;
        Script::from_hex(&hex_str)
            .map_err(|e| D::Error::custom(format!("invalid script hex: {}", e)))
    }
}

/// (De)serialize an `i64` as a decimal string, accepting bare numbers on input.
pub mod string_int {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        use serde::de::Error;

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Str(String),
            Num(i64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Str(s) => s
                .parse::<i64>()
                .map_err(|_| D::Error::custom(format!("invalid integer string: {}", s))),
            Raw::Num(n) => Ok(n),
        }
    }
}

// ========== Transaction Types ==========

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OutPoint {
    pub txid: String,
    pub out_idx: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TxInput {
    pub prev_out: OutPoint,
    #[serde(default)]
    pub input_script: Script,
    /// Script of the output being spent; absent for coinbase inputs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_script: Option<Script>,
    #[serde(with = "string_int", default)]
    pub value: i64,
    #[serde(default)]
    pub sequence_no: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TxOutput {
    #[serde(with = "string_int")]
    pub value: i64,
    pub output_script: Script,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spent_by: Option<OutPoint>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BlockMetadata {
    pub height: i32,
    pub hash: String,
    #[serde(with = "string_int")]
    pub timestamp: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Tx {
    pub txid: String,
    #[serde(default)]
    pub version: i32,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    #[serde(default)]
    pub lock_time: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<BlockMetadata>,
    #[serde(with = "string_int", default)]
    pub time_first_seen: i64,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub is_coinbase: bool,
}

impl Tx {
    /// Time the transaction was last observed: block time when mined,
    /// first-seen time otherwise.
    pub fn last_seen(&self) -> i64 {
        match &self.block {
            Some(block) => block.timestamp,
            None => self.time_first_seen,
        }
    }
}

// ========== Block Types ==========

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BlockchainInfo {
    pub tip_hash: String,
    pub tip_height: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BlockInfo {
    pub hash: String,
    #[serde(default)]
    pub prev_hash: String,
    pub height: i32,
    #[serde(default)]
    pub n_bits: u32,
    #[serde(with = "string_int", default)]
    pub timestamp: i64,
    #[serde(with = "string_int", default)]
    pub block_size: i64,
    #[serde(with = "string_int", default)]
    pub num_txs: i64,
    #[serde(with = "string_int", default)]
    pub num_inputs: i64,
    #[serde(with = "string_int", default)]
    pub num_outputs: i64,
    #[serde(with = "string_int", default)]
    pub sum_input_sats: i64,
    #[serde(with = "string_int", default)]
    pub sum_coinbase_output_sats: i64,
    #[serde(with = "string_int", default)]
    pub sum_normal_output_sats: i64,
    #[serde(with = "string_int", default)]
    pub sum_burned_sats: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub block_info: BlockInfo,
    #[serde(default)]
    pub txs: Vec<Tx>,
}

// ========== Address Types ==========

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TxHistoryPage {
    pub txs: Vec<Tx>,
    pub num_pages: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Utxo {
    pub outpoint: OutPoint,
    #[serde(default)]
    pub block_height: i32,
    #[serde(default)]
    pub is_coinbase: bool,
    #[serde(with = "string_int")]
    pub value: i64,
}
