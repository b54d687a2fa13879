// Router tests against in-memory upstreams

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use super::{router, AppState};
use crate::address::{encode_address, Network};
use crate::chronik::ChronikClient;
use crate::enrich::test_txs::{input, output, tx};
use crate::enrich::Enricher;
use crate::geoip::test_lookup::CountingLookup;
use crate::geoip::{GeoIpCache, MemoryStore};
use crate::rank::{encode_vote, Platform, RankScriptDecoder, Sentiment, VotePayload};
use crate::rank_api::{
    ChartPeriod, PostList, ProfileList, ProfileSummary, RankApi, StatsDirection, StatsTarget,
    Timespan, VoteList, WalletActivityPoint, WalletActivitySummary, WalletRange, WalletSummary,
};
use crate::rpc::{MiningInfo, NodeRpc, PeerInfo};
use crate::script::test_scripts::{p2pkh, p2sh};
use crate::types::{
    Block, BlockInfo, BlockchainInfo, OutPoint, Tx, TxHistoryPage, Utxo,
};
use crate::upstream::UpstreamError;

fn unavailable(service: &'static str) -> UpstreamError {
    UpstreamError::Status {
        service,
        status: 503,
    }
}

// ========== Fakes ==========

#[derive(Default)]
struct FakeChronik {
    down: bool,
    tip_height: i32,
    txs: HashMap<String, Tx>,
    blocks: HashMap<String, Block>,
    history: TxHistoryPage,
    utxos: Vec<Utxo>,
    range_calls: Mutex<Vec<(i32, i32)>>,
    history_calls: Mutex<Vec<(String, String, u32, u32)>>,
}

#[async_trait]
impl ChronikClient for FakeChronik {
    async fn blockchain_info(&self) -> Result<BlockchainInfo, UpstreamError> {
        if self.down {
            return Err(unavailable("chronik"));
        }
        Ok(BlockchainInfo {
            tip_hash: "00".repeat(32),
            tip_height: self.tip_height,
        })
    }

    async fn block(&self, hash_or_height: &str) -> Result<Block, UpstreamError> {
        self.blocks
            .get(hash_or_height)
            .cloned()
            .ok_or(UpstreamError::NotFound { service: "chronik" })
    }

    async fn blocks(&self, start_height: i32, end_height: i32) -> Result<Vec<BlockInfo>, UpstreamError> {
        self.range_calls.lock().unwrap().push((start_height, end_height));
        Ok((start_height..=end_height)
            .map(|height| BlockInfo {
                hash: format!("{:064x}", height),
                height,
                ..Default::default()
            })
            .collect())
    }

    async fn tx(&self, txid: &str) -> Result<Tx, UpstreamError> {
        self.txs
            .get(txid)
            .cloned()
            .ok_or(UpstreamError::NotFound { service: "chronik" })
    }

    async fn script_history(
        &self,
        script_type: &str,
        payload_hex: &str,
        page: u32,
        page_size: u32,
    ) -> Result<TxHistoryPage, UpstreamError> {
        self.history_calls.lock().unwrap().push((
            script_type.to_string(),
            payload_hex.to_string(),
            page,
            page_size,
        ));
        Ok(self.history.clone())
    }

    async fn script_utxos(&self, _script_type: &str, _payload_hex: &str) -> Result<Vec<Utxo>, UpstreamError> {
        Ok(self.utxos.clone())
    }
}

#[derive(Default)]
struct FakeRpc {
    down: bool,
    peers: Vec<PeerInfo>,
    mempool: Vec<(String, Option<Value>)>,
}

#[async_trait]
impl NodeRpc for FakeRpc {
    async fn mining_info(&self) -> Result<MiningInfo, UpstreamError> {
        if self.down {
            return Err(unavailable("rpc"));
        }
        Ok(MiningInfo {
            blocks: 1000,
            networkhashps: 1_234_567.0,
            chain: "main".to_string(),
            ..Default::default()
        })
    }

    async fn peer_info(&self) -> Result<Vec<PeerInfo>, UpstreamError> {
        if self.down {
            return Err(unavailable("rpc"));
        }
        Ok(self.peers.clone())
    }

    async fn raw_mempool(&self) -> Result<Vec<String>, UpstreamError> {
        if self.down {
            return Err(unavailable("rpc"));
        }
        Ok(self.mempool.iter().map(|(txid, _)| txid.clone()).collect())
    }

    async fn raw_transaction(&self, txid: &str) -> Result<Value, UpstreamError> {
        self.mempool
            .iter()
            .find(|(id, _)| id == txid)
            .and_then(|(_, tx)| tx.clone())
            .ok_or(UpstreamError::NotFound { service: "rpc" })
    }
}

#[derive(Default)]
struct FakeRank {
    down: bool,
    profiles: Vec<ProfileSummary>,
    activity_chart: Vec<WalletActivityPoint>,
    calls: Mutex<Vec<String>>,
}

impl FakeRank {
    fn record(&self, call: String) -> Result<(), UpstreamError> {
        self.calls.lock().unwrap().push(call);
        if self.down {
            return Err(unavailable("rank"));
        }
        Ok(())
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RankApi for FakeRank {
    async fn profiles(&self, page: u32, page_size: u32) -> Result<ProfileList, UpstreamError> {
        self.record(format!("profiles/{}/{}", page, page_size))?;
        Ok(ProfileList {
            profiles: self.profiles.clone(),
            num_pages: 3,
        })
    }

    async fn profile_ranking(&self, platform: Platform, profile_id: &str) -> Result<Value, UpstreamError> {
        self.record(format!("{}/{}", platform, profile_id))?;
        Ok(json!({ "platform": platform.as_str(), "profileId": profile_id, "ranking": "1000" }))
    }

    async fn profile_posts(
        &self,
        platform: Platform,
        profile_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<PostList, UpstreamError> {
        self.record(format!("{}/{}/posts/{}/{}", platform, profile_id, page, page_size))?;
        Ok(PostList {
            posts: vec![json!({ "id": "1790000000000000000" })],
            num_pages: 1,
        })
    }

    async fn profile_votes(
        &self,
        platform: Platform,
        profile_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<VoteList, UpstreamError> {
        self.record(format!("txs/{}/{}/{}/{}", platform, profile_id, page, page_size))?;
        Ok(VoteList::default())
    }

    async fn post_ranking(
        &self,
        platform: Platform,
        profile_id: &str,
        post_id: &str,
    ) -> Result<Value, UpstreamError> {
        self.record(format!("{}/{}/{}", platform, profile_id, post_id))?;
        Ok(json!({ "postId": post_id }))
    }

    async fn vote_activity(&self, page: u32, page_size: u32) -> Result<VoteList, UpstreamError> {
        self.record(format!("votes/{}/{}", page, page_size))?;
        Ok(VoteList {
            votes: vec![json!({ "txid": "aa" })],
            num_pages: 1,
        })
    }

    async fn stats(
        &self,
        target: StatsTarget,
        direction: StatsDirection,
        timespan: Timespan,
    ) -> Result<Vec<Value>, UpstreamError> {
        self.record(format!("stats/{}/{}/{}", target, direction, timespan))?;
        Ok(vec![json!({ "id": "alice" })])
    }

    async fn search_profiles(&self, query: &str) -> Result<Vec<Value>, UpstreamError> {
        self.record(format!("search/profile/{}", query))?;
        Ok(vec![json!({ "id": query })])
    }

    async fn wallet_summary(&self, period: ChartPeriod) -> Result<WalletSummary, UpstreamError> {
        self.record(format!("charts/wallet/summary/{}", period))?;
        Ok(WalletSummary {
            total_votes: 5,
            total_upvotes: 4,
            total_downvotes: 1,
            total_unique_wallets: 2,
            total_sats_burned: 5_000_000,
        })
    }

    async fn wallet_activity_chart(
        &self,
        period: ChartPeriod,
    ) -> Result<Vec<WalletActivityPoint>, UpstreamError> {
        self.record(format!("charts/wallet/activity/{}", period))?;
        Ok(self.activity_chart.clone())
    }

    async fn wallet_activity(
        &self,
        script_payload: &str,
        range: WalletRange<'_>,
    ) -> Result<Vec<Value>, UpstreamError> {
        let mut call = vec!["wallet", script_payload];
        call.extend(range.segments());
        self.record(call.join("/"))?;
        Ok(vec![json!({ "scriptPayload": script_payload, "sentiment": "positive" })])
    }

    async fn wallet_activity_summary(
        &self,
        script_payload: &str,
        range: WalletRange<'_>,
    ) -> Result<WalletActivitySummary, UpstreamError> {
        let mut call = vec!["wallet", "summary", script_payload];
        call.extend(range.segments());
        self.record(call.join("/"))?;
        Ok(WalletActivitySummary {
            script_payload: script_payload.to_string(),
            total_votes: 2,
            total_sats: 2_000_000,
            first_seen: 1_700_000_000,
            last_seen: 1_700_086_400,
        })
    }
}

// ========== Harness ==========

struct Harness {
    chronik: Arc<FakeChronik>,
    rank: Arc<FakeRank>,
    lookup: Arc<CountingLookup>,
    app: Router,
}

fn harness(chronik: FakeChronik, rpc: FakeRpc, rank: FakeRank) -> Harness {
    let chronik = Arc::new(chronik);
    let rank = Arc::new(rank);
    let lookup = Arc::new(CountingLookup::default());
    let state = Arc::new(AppState {
        chronik: chronik.clone(),
        rpc: Arc::new(rpc),
        rank: rank.clone(),
        geoip: Arc::new(GeoIpCache::new(Arc::new(MemoryStore::new()), lookup.clone())),
        enricher: Enricher::new(Network::Mainnet, Arc::new(RankScriptDecoder)),
    });
    Harness {
        chronik,
        rank,
        lookup,
        app: router(state),
    }
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn peer(addr: &str) -> PeerInfo {
    PeerInfo {
        addr: addr.to_string(),
        extra: serde_json::Map::new(),
        geoip: None,
    }
}

fn profile(id: &str, sats_positive: i64, sats_negative: i64) -> ProfileSummary {
    ProfileSummary {
        id: id.to_string(),
        platform: "twitter".to_string(),
        ranking: (sats_positive - sats_negative).to_string(),
        sats_positive,
        sats_negative,
        votes_positive: 1,
        votes_negative: 1,
        extra: serde_json::Map::new(),
    }
}

// ========== Explorer ==========

#[tokio::test]
async fn test_tx_is_enriched() {
    let txid = "ab".repeat(32);
    let vote = VotePayload {
        platform: Platform::Twitter,
        profile_id: "alice".to_string(),
        sentiment: Sentiment::Positive,
        post_id: None,
    };
    let raw = tx(
        &txid,
        vec![input(Some(p2pkh(7)), 10_000)],
        vec![output(1000, encode_vote(&vote).unwrap()), output(8_000, p2pkh(1))],
        Some(91),
    );
    let chronik = FakeChronik {
        tip_height: 100,
        txs: HashMap::from([(txid.clone(), raw)]),
        ..Default::default()
    };
    let h = harness(chronik, FakeRpc::default(), FakeRank::default());

    let (status, body) = get(&h.app, &format!("/api/explorer/tx/{}", txid)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sumBurnedSats"], "1000");
    assert_eq!(body["confirmations"], 10);

    let outputs = body["outputs"].as_array().unwrap();
    let addressed: Vec<_> = outputs.iter().filter(|o| o.get("address").is_some()).collect();
    assert_eq!(addressed.len(), 1);
    assert_eq!(outputs[0]["rankOutput"]["profileId"], "alice");
    assert_eq!(outputs[0]["rankOutput"]["sentiment"], "positive");
    assert!(body["inputs"][0]["address"].is_string());
}

#[tokio::test]
async fn test_tx_errors() {
    let h = harness(FakeChronik::default(), FakeRpc::default(), FakeRank::default());

    let (status, body) = get(&h.app, "/api/explorer/tx/not-a-txid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid txid");

    let (status, body) = get(&h.app, &format!("/api/explorer/tx/{}", "cd".repeat(32))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Transaction not found");
}

#[tokio::test]
async fn test_blocks_page_newest_first() {
    let chronik = FakeChronik {
        tip_height: 25,
        ..Default::default()
    };
    let h = harness(chronik, FakeRpc::default(), FakeRank::default());

    let (status, body) = get(&h.app, "/api/explorer/blocks?page=3&pageSize=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tipHeight"], 25);
    let heights: Vec<i64> = body["blocks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["height"].as_i64().unwrap())
        .collect();
    assert_eq!(heights, vec![5, 4, 3, 2, 1]);

    let (_, body) = get(&h.app, "/api/explorer/blocks?page=4&pageSize=10").await;
    assert_eq!(body["blocks"], json!([]));
    assert_eq!(*h.chronik.range_calls.lock().unwrap(), vec![(1, 5)]);
}

#[tokio::test]
async fn test_blocks_page_size_is_clamped() {
    let chronik = FakeChronik {
        tip_height: 10_000,
        ..Default::default()
    };
    let h = harness(chronik, FakeRpc::default(), FakeRank::default());

    let (_, body) = get(&h.app, "/api/explorer/blocks?pageSize=1000").await;
    assert_eq!(body["blocks"].as_array().unwrap().len(), 40);
    assert_eq!(*h.chronik.range_calls.lock().unwrap(), vec![(9_961, 10_000)]);
}

#[tokio::test]
async fn test_block_detail() {
    let mut coinbase = tx("cb", vec![input(None, 0)], vec![output(0, vec![0x6a]), output(5_000, p2pkh(3))], Some(50));
    coinbase.is_coinbase = true;
    let spend = tx("sp", vec![], vec![output(700, vec![0x6a]), output(1, p2sh(2))], Some(50));
    let block = Block {
        block_info: BlockInfo {
            hash: "ee".repeat(32),
            height: 50,
            ..Default::default()
        },
        txs: vec![coinbase, spend],
    };
    let genesis = Block {
        block_info: BlockInfo {
            hash: "00".repeat(32),
            height: 0,
            ..Default::default()
        },
        txs: vec![tx("gen", vec![], vec![output(0, p2pkh(9)), output(1, p2pkh(8))], Some(0))],
    };
    let chronik = FakeChronik {
        tip_height: 60,
        blocks: HashMap::from([("50".to_string(), block), ("0".to_string(), genesis)]),
        ..Default::default()
    };
    let h = harness(chronik, FakeRpc::default(), FakeRank::default());

    let (status, body) = get(&h.app, "/api/explorer/block/50").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["minedBy"], encode_address(&p2pkh(3), Network::Mainnet));
    assert_eq!(body["txs"][1]["sumBurnedSats"], "700");
    assert_eq!(body["blockInfo"]["height"], 50);

    let (status, body) = get(&h.app, "/api/explorer/block/0").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("minedBy").is_none());

    let (status, body) = get(&h.app, "/api/explorer/block/51").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Block not found");

    let (status, _) = get(&h.app, "/api/explorer/block/tip").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_address_history_and_balance() {
    let address = encode_address(&p2pkh(4), Network::Mainnet);
    let utxo = |value| Utxo {
        outpoint: OutPoint {
            txid: "aa".repeat(32),
            out_idx: 0,
        },
        block_height: 10,
        is_coinbase: false,
        value,
    };
    let chronik = FakeChronik {
        history: TxHistoryPage {
            txs: vec![tx("h1", vec![], vec![output(300, vec![0x6a]), output(5, p2pkh(4))], Some(12))],
            num_pages: 7,
        },
        utxos: vec![utxo(1_500), utxo(2_000)],
        ..Default::default()
    };
    let h = harness(chronik, FakeRpc::default(), FakeRank::default());

    let (status, body) = get(&h.app, &format!("/api/explorer/address/{}?page=2&pageSize=5", address)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], "3500");
    assert_eq!(body["lastSeen"], "1700000000");
    assert_eq!(body["history"]["numPages"], 7);
    assert_eq!(body["history"]["txs"][0]["sumBurnedSats"], "300");

    let calls = h.chronik.history_calls.lock().unwrap().clone();
    assert_eq!(calls, vec![("p2pkh".to_string(), "04".repeat(20), 1, 5)]);

    let (status, body) = get(&h.app, &format!("/api/explorer/address/{}/balance", address)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "3500");

    let (status, body) = get(&h.app, "/api/explorer/address/lotus_nonsense").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid address");
}

#[tokio::test]
async fn test_chain_info_degrades() {
    let chronik = FakeChronik {
        down: true,
        ..Default::default()
    };
    let h = harness(chronik, FakeRpc::default(), FakeRank::default());

    let (status, body) = get(&h.app, "/api/explorer/chain-info").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tipHeight"], 0);
}

#[tokio::test]
async fn test_mempool_drops_failed_fetches() {
    let rpc = FakeRpc {
        mempool: vec![
            ("t1".to_string(), Some(json!({ "txid": "t1" }))),
            ("t2".to_string(), None),
            ("t3".to_string(), Some(json!({ "txid": "t3" }))),
        ],
        ..Default::default()
    };
    let h = harness(FakeChronik::default(), rpc, FakeRank::default());

    let (status, body) = get(&h.app, "/api/explorer/mempool").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{ "txid": "t1" }, { "txid": "t3" }]));
}

#[tokio::test]
async fn test_overview_enriches_peers_once_per_ip() {
    let rpc = FakeRpc {
        peers: vec![
            peer("8.8.8.8:10605"),
            peer("192.168.1.20:10605"),
            peer("8.8.8.8:40000"),
            peer("[2001:db8::1]:10605"),
        ],
        ..Default::default()
    };
    let h = harness(FakeChronik::default(), rpc, FakeRank::default());

    let (status, body) = get(&h.app, "/api/explorer/overview").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hashrate"], "1.2 MH");
    assert_eq!(body["mininginfo"]["blocks"], 1000);

    let peers = body["peerinfo"].as_array().unwrap();
    assert_eq!(peers.len(), 2);
    assert!(peers.iter().all(|p| p["addr"] == "8.8.8.8"));
    assert_eq!(peers[0]["geoip"]["country"], "Testland");
    assert_eq!(h.lookup.calls(), 1);

    let (_, body) = get(&h.app, "/api/explorer/peer-info").await;
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(h.lookup.calls(), 1);
}

#[tokio::test]
async fn test_overview_degrades_when_node_is_down() {
    let rpc = FakeRpc {
        down: true,
        ..Default::default()
    };
    let h = harness(FakeChronik::default(), rpc, FakeRank::default());

    let (status, body) = get(&h.app, "/api/explorer/overview").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["peerinfo"], json!([]));
    assert_eq!(body["mininginfo"]["blocks"], 0);

    let (_, body) = get(&h.app, "/api/explorer/mempool").await;
    assert_eq!(body, json!([]));
}

// ========== Social ==========

#[tokio::test]
async fn test_unknown_platform_is_rejected() {
    let h = harness(FakeChronik::default(), FakeRpc::default(), FakeRank::default());

    for uri in [
        "/api/social/unknownplatform/alice",
        "/api/social/unknownplatform/alice/posts",
        "/api/social/unknownplatform/alice/votes",
        "/api/social/unknownplatform/alice/123",
    ] {
        let (status, body) = get(&h.app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["error"]["message"], "Invalid platform");
    }
    assert!(h.rank.calls().is_empty());
}

#[tokio::test]
async fn test_profile_routes() {
    let h = harness(FakeChronik::default(), FakeRpc::default(), FakeRank::default());

    let (status, body) = get(&h.app, "/api/social/twitter/alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profileId"], "alice");

    let (_, body) = get(&h.app, "/api/social/twitter/alice/posts?page=2&pageSize=1000").await;
    assert_eq!(body["numPages"], 1);

    let (_, body) = get(&h.app, "/api/social/twitter/alice/1790000000000000000").await;
    assert_eq!(body["postId"], "1790000000000000000");

    get(&h.app, "/api/social/twitter/alice/votes").await;

    assert_eq!(
        h.rank.calls(),
        vec![
            "twitter/alice",
            "twitter/alice/posts/2/40",
            "twitter/alice/1790000000000000000",
            "txs/twitter/alice/1/10",
        ]
    );
}

#[tokio::test]
async fn test_profiles_gain_positive_percent() {
    let rank = FakeRank {
        profiles: vec![profile("alice", 3_000_000, 1_000_000), profile("bob", 0, 0)],
        ..Default::default()
    };
    let h = harness(FakeChronik::default(), FakeRpc::default(), rank);

    let (status, body) = get(&h.app, "/api/social/profiles?pageSize=1000").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["numPages"], 3);
    assert_eq!(body["profiles"][0]["positivePercent"], "75.0");
    assert_eq!(body["profiles"][0]["satsPositive"], "3000000");
    assert_eq!(body["profiles"][1]["positivePercent"], "0");
    assert_eq!(h.rank.calls(), vec!["profiles/1/40"]);
}

#[tokio::test]
async fn test_search_and_stats() {
    let h = harness(FakeChronik::default(), FakeRpc::default(), FakeRank::default());

    let (status, body) = get(&h.app, "/api/social/search/a").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
    assert!(h.rank.calls().is_empty());

    let (_, body) = get(&h.app, "/api/social/search/al").await;
    assert_eq!(body[0]["id"], "al");

    let (status, _) = get(&h.app, "/api/social/stats/profiles/top-ranked/week").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get(&h.app, "/api/social/stats/profiles/best/week").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = get(&h.app, "/api/social/stats/profiles/top-ranked/year").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(
        h.rank.calls(),
        vec!["search/profile/al", "stats/profiles/top-ranked/week"]
    );
}

#[tokio::test]
async fn test_social_listings_degrade() {
    let rank = FakeRank {
        down: true,
        ..Default::default()
    };
    let h = harness(FakeChronik::default(), FakeRpc::default(), rank);

    let (status, body) = get(&h.app, "/api/social/activity").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "votes": [], "numPages": 0 }));

    let (_, body) = get(&h.app, "/api/social/profiles").await;
    assert_eq!(body, json!({ "profiles": [], "numPages": 0 }));

    let (_, body) = get(&h.app, "/api/social/twitter/alice/posts").await;
    assert_eq!(body, json!({ "posts": [], "numPages": 0 }));

    let (_, body) = get(&h.app, "/api/social/charts/wallet/summary/month").await;
    assert_eq!(body["totalVotes"], 0);
    assert_eq!(body["totalSatsBurned"], 0);

    let (status, _) = get(&h.app, "/api/social/twitter/alice").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_wallet_summary_period() {
    let h = harness(FakeChronik::default(), FakeRpc::default(), FakeRank::default());

    let (status, body) = get(&h.app, "/api/social/charts/wallet/summary/week").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalUpvotes"], 4);

    let (status, _) = get(&h.app, "/api/social/charts/wallet/summary/day").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_wallet_activity_chart_keeps_upstream_series() {
    let rank = FakeRank {
        activity_chart: vec![
            WalletActivityPoint {
                total_votes: 3,
                total_payouts_sent: 1,
                total_payout_amount: 1_000,
            };
            7
        ],
        ..Default::default()
    };
    let h = harness(FakeChronik::default(), FakeRpc::default(), rank);

    let (status, body) = get(&h.app, "/api/social/charts/wallet/activity/week").await;
    assert_eq!(status, StatusCode::OK);
    let points = body.as_array().unwrap();
    assert_eq!(points.len(), 7);
    assert_eq!(points[0]["totalVotes"], 3);
    assert_eq!(points[0]["totalPayoutAmount"], 1_000);

    let (status, _) = get(&h.app, "/api/social/charts/wallet/activity/year").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(h.rank.calls(), vec!["charts/wallet/activity/week"]);
}

#[tokio::test]
async fn test_wallet_activity_chart_zero_fills() {
    // an empty answer from a healthy backend
    let h = harness(FakeChronik::default(), FakeRpc::default(), FakeRank::default());
    let (status, body) = get(&h.app, "/api/social/charts/wallet/activity/month").await;
    assert_eq!(status, StatusCode::OK);
    let points = body.as_array().unwrap();
    assert_eq!(points.len(), 30);
    assert!(points.iter().all(|p| p["totalVotes"] == 0 && p["totalPayoutsSent"] == 0));

    let rank = FakeRank {
        down: true,
        ..Default::default()
    };
    let h = harness(FakeChronik::default(), FakeRpc::default(), rank);
    let (status, body) = get(&h.app, "/api/social/charts/wallet/activity/quarter").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 90);
    let (_, body) = get(&h.app, "/api/social/charts/wallet/activity/week").await;
    assert_eq!(body.as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn test_wallet_activity_routes() {
    let payload = "ab".repeat(20);
    let h = harness(FakeChronik::default(), FakeRpc::default(), FakeRank::default());

    let (status, body) = get(&h.app, &format!("/api/social/wallet/{}", payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["scriptPayload"], payload.as_str());

    get(&h.app, &format!("/api/social/wallet/{}/week", payload)).await;
    get(&h.app, &format!("/api/social/wallet/{}/1700000000/1700086400", payload)).await;

    let (status, body) = get(&h.app, &format!("/api/social/wallet/summary/{}", payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalVotes"], 2);
    assert_eq!(body["totalSats"], "2000000");
    assert_eq!(body["lastSeen"], "1700086400");

    get(&h.app, &format!("/api/social/wallet/summary/{}/today/now", payload)).await;

    assert_eq!(
        h.rank.calls(),
        vec![
            format!("wallet/{}", payload),
            format!("wallet/{}/week", payload),
            format!("wallet/{}/1700000000/1700086400", payload),
            format!("wallet/summary/{}", payload),
            format!("wallet/summary/{}/today/now", payload),
        ]
    );
}

#[tokio::test]
async fn test_wallet_routes_validate_and_degrade() {
    let h = harness(FakeChronik::default(), FakeRpc::default(), FakeRank::default());
    let (status, body) = get(&h.app, "/api/social/wallet/not-hex").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid scriptPayload");
    let (status, _) = get(&h.app, "/api/social/wallet/summary/xyz/week").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(h.rank.calls().is_empty());

    let rank = FakeRank {
        down: true,
        ..Default::default()
    };
    let h = harness(FakeChronik::default(), FakeRpc::default(), rank);
    let (status, body) = get(&h.app, "/api/social/wallet/abcd").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
    let (status, _) = get(&h.app, "/api/social/wallet/summary/abcd").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_health_and_metrics() {
    let h = harness(FakeChronik::default(), FakeRpc::default(), FakeRank::default());

    let (status, body) = get(&h.app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));

    let response = h
        .app
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/plain; version=0.0.4"
    );
}
