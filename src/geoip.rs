/// Peer GeoIP Cache
///
/// Resolves the location of connected peers through an external GeoIP
/// service, remembering every successful answer so each public IP costs at
/// most one network call.
///
/// - Only dotted IPv4 peers are looked up; private ranges are skipped.
/// - Read-through, write-once: a concurrent double miss is tolerated and the
///   last writer wins.
/// - Failures are never cached.
///
/// The backing store is pluggable: `MemoryStore` keeps everything for the
/// life of the process, `LruStore` bounds memory with LRU eviction.

use async_trait::async_trait;
use lru::LruCache;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::metrics::{increment_geoip_cache, set_geoip_cache_entries};
use crate::rpc::PeerInfo;
use crate::upstream::{join_url, send_json, UpstreamError};

const SERVICE: &str = "geoip";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GeoIpResult {
    pub country: String,
    pub city: String,
}

#[async_trait]
pub trait GeoIpStore: Send + Sync {
    async fn get(&self, ip: &str) -> Option<GeoIpResult>;
    async fn insert(&self, ip: String, result: GeoIpResult);
    async fn len(&self) -> usize;
}

/// Unbounded map; entries live until the process exits
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, GeoIpResult>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GeoIpStore for MemoryStore {
    async fn get(&self, ip: &str) -> Option<GeoIpResult> {
        self.entries.read().await.get(ip).cloned()
    }

    async fn insert(&self, ip: String, result: GeoIpResult) {
        self.entries.write().await.insert(ip, result);
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

/// Bounded store, evicts the least recently used IP
pub struct LruStore {
    entries: RwLock<LruCache<String, GeoIpResult>>,
}

impl LruStore {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(capacity)),
        }
    }
}

#[async_trait]
impl GeoIpStore for LruStore {
    async fn get(&self, ip: &str) -> Option<GeoIpResult> {
        self.entries.write().await.get(ip).cloned()
    }

    async fn insert(&self, ip: String, result: GeoIpResult) {
        self.entries.write().await.put(ip, result);
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

/// Pick the store for a configured capacity: 0 means unbounded
pub fn store_for_capacity(capacity: usize) -> Arc<dyn GeoIpStore> {
    match NonZeroUsize::new(capacity) {
        Some(capacity) => Arc::new(LruStore::new(capacity)),
        None => Arc::new(MemoryStore::new()),
    }
}

#[async_trait]
pub trait GeoIpLookup: Send + Sync {
    async fn lookup(&self, ip: Ipv4Addr) -> Result<GeoIpResult, UpstreamError>;
}

#[derive(Deserialize)]
struct GeoIpResponse {
    success: bool,
    #[serde(default)]
    data: Option<GeoIpResult>,
}

pub struct HttpGeoIpLookup {
    client: Client,
    base_url: String,
}

impl HttpGeoIpLookup {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl GeoIpLookup for HttpGeoIpLookup {
    async fn lookup(&self, ip: Ipv4Addr) -> Result<GeoIpResult, UpstreamError> {
        let url = join_url(SERVICE, &self.base_url, &[&ip.to_string()])?;
        let response: GeoIpResponse = send_json(SERVICE, self.client.get(url)).await?;
        match response {
            GeoIpResponse {
                success: true,
                data: Some(data),
            } => Ok(data),
            _ => Err(UpstreamError::NotFound { service: SERVICE }),
        }
    }
}

/// Bare IPv4 address of a `host:port` peer address, if it is public
pub fn peer_ip(addr: &str) -> Option<Ipv4Addr> {
    let host = addr.split(':').next()?;
    let ip: Ipv4Addr = host.parse().ok()?;
    if ip.is_private() {
        return None;
    }
    Some(ip)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerLocation {
    /// Not a public IPv4 peer; no lookup was attempted
    Skipped,
    Located(Ipv4Addr, GeoIpResult),
    /// Public peer whose lookup failed
    Unavailable(Ipv4Addr),
}

pub struct GeoIpCache {
    store: Arc<dyn GeoIpStore>,
    lookup: Arc<dyn GeoIpLookup>,
}

impl GeoIpCache {
    pub fn new(store: Arc<dyn GeoIpStore>, lookup: Arc<dyn GeoIpLookup>) -> Self {
        Self { store, lookup }
    }

    pub async fn lookup(&self, peer_addr: &str) -> PeerLocation {
        let Some(ip) = peer_ip(peer_addr) else {
            increment_geoip_cache("skipped");
            return PeerLocation::Skipped;
        };
        let key = ip.to_string();

        if let Some(result) = self.store.get(&key).await {
            increment_geoip_cache("hit");
            return PeerLocation::Located(ip, result);
        }
        increment_geoip_cache("miss");

        match self.lookup.lookup(ip).await {
            Ok(result) => {
                self.store.insert(key, result.clone()).await;
                set_geoip_cache_entries(self.store.len().await);
                PeerLocation::Located(ip, result)
            }
            Err(e) => {
                increment_geoip_cache("failed");
                warn!(ip = %ip, error = %e, "GeoIP lookup failed");
                PeerLocation::Unavailable(ip)
            }
        }
    }

    /// Drop non-public peers, rewrite `addr` to the bare IP and attach the
    /// location where one is known
    pub async fn enrich_peers(&self, peers: Vec<PeerInfo>) -> Vec<PeerInfo> {
        let mut enriched = Vec::with_capacity(peers.len());
        for mut peer in peers {
            match self.lookup(&peer.addr).await {
                PeerLocation::Skipped => {
                    debug!(addr = %peer.addr, "Skipping non-public peer");
                }
                PeerLocation::Located(ip, result) => {
                    peer.addr = ip.to_string();
                    peer.geoip = Some(result);
                    enriched.push(peer);
                }
                PeerLocation::Unavailable(ip) => {
                    peer.addr = ip.to_string();
                    peer.geoip = None;
                    enriched.push(peer);
                }
            }
        }
        enriched
    }
}
