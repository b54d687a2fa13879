/// Explorer-wide constants
///
/// Currency units, pagination limits, protocol markers and the default
/// locations of the upstream services. Everything that would otherwise be a
/// magic number in the handlers lives here.

/// Number of sats in one XPI
pub const SATS_PER_XPI: u64 = 1_000_000;

/// Hard cap on rows returned by any paginated explorer/social listing
pub const EXPLORER_TABLE_MAX_ROWS: u32 = 40;

/// Default page size when the caller omits `pageSize`
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Default (1-indexed) page when the caller omits `page`
pub const DEFAULT_PAGE: u32 = 1;

/// Genesis block height
pub const HEIGHT_GENESIS: i32 = 0;

/// Confirmation count reported for transactions not yet in a block
pub const UNCONFIRMED: i64 = -1;

/// LOKAD tag carried by RANK vote payloads
pub const LOKAD_RANK: &[u8; 4] = b"RANK";

/// Human-readable prefix of every network address
pub const ADDRESS_PREFIX: &str = "lotus";

/// XAddress type byte for "payload is a full output script"
pub const XADDRESS_TYPE_SCRIPT: u8 = 0;

/// Profile search queries shorter than this are answered locally with `[]`
pub const MIN_SEARCH_QUERY_LEN: usize = 2;

pub const DEFAULT_LISTEN: &str = "0.0.0.0:3000";
pub const DEFAULT_CHRONIK_URL: &str = "http://127.0.0.1:7123";
pub const DEFAULT_RANK_URL: &str = "https://rank.lotusia.org/api/v1";
pub const DEFAULT_GEOIP_URL: &str = "https://api.sefinek.net/api/v2/geoip";
pub const DEFAULT_RPC_HOST: &str = "127.0.0.1";
pub const DEFAULT_RPC_PORT: u16 = 10604;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Check whether a block height is the genesis block
#[inline]
pub fn is_genesis_height(height: i32) -> bool {
    height == HEIGHT_GENESIS
}
