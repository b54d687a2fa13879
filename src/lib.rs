//! Lotus block explorer and social-reputation API.
//!
//! Reads chain data from a Chronik indexer and a node's JSON-RPC interface,
//! annotates it (addresses, RANK votes, burned value, confirmations) and
//! proxies the reputation backend.

pub mod address;
pub mod api;
pub mod chronik;
pub mod config;
pub mod constants;
pub mod enrich;
pub mod format;
pub mod geoip;
pub mod metrics;
pub mod rank;
pub mod rank_api;
pub mod rpc;
pub mod script;
pub mod telemetry;
pub mod types;
pub mod upstream;
