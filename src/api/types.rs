// API Type Definitions
//
// Request and response shapes of the explorer and social endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::enrich::TxWithBurned;
use crate::rank_api::ProfileSummary;
use crate::rpc::{MiningInfo, PeerInfo};
use crate::types::BlockInfo;

// ========== Error Types ==========

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiError {
    pub error: ErrorDetail,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorDetail {
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        ApiError {
            error: ErrorDetail {
                message: message.into(),
            },
        }
    }
}

// ========== Query Types ==========

/// Raw `page` / `pageSize` query parameters. Kept as text so malformed values
/// fall back to the defaults instead of rejecting the request.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// `{script_payload}[/{start}[/{end}]]` of the per-wallet social routes
#[derive(Deserialize, Debug, Clone)]
pub struct WalletPath {
    pub script_payload: String,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

// ========== Explorer Types ==========

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BlocksPage {
    pub blocks: Vec<BlockInfo>,
    pub tip_height: i32,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerBlock {
    pub block_info: BlockInfo,
    pub txs: Vec<TxWithBurned>,
    /// Address paid by the coinbase's second output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mined_by: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AddressHistory {
    pub txs: Vec<TxWithBurned>,
    pub num_pages: u32,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AddressDetail {
    /// Sum of unspent outputs, decimal sats
    pub balance: String,
    pub last_seen: Option<String>,
    pub history: AddressHistory,
}

#[derive(Serialize, Debug, Clone)]
pub struct Overview {
    pub mininginfo: MiningInfo,
    pub peerinfo: Vec<PeerInfo>,
    /// `networkhashps` abbreviated for display
    pub hashrate: String,
}

// ========== Social Types ==========

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProfileWithPercent {
    #[serde(flatten)]
    pub profile: ProfileSummary,
    pub positive_percent: String,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProfilesPage {
    pub profiles: Vec<ProfileWithPercent>,
    pub num_pages: u32,
}

#[derive(Serialize, Debug, Clone)]
pub struct Health {
    pub status: &'static str,
}

pub type JsonList = Vec<Value>;
