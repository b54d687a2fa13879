// Rank API client
//
// The reputation backend aggregates on-chain votes into profile and post
// rankings. Only the fields the explorer computes with are typed; everything
// else is passed through as JSON.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::rank::Platform;
use crate::types::string_int;
use crate::upstream::{join_url, send_json, UpstreamError};

const SERVICE: &str = "rank";

/// Declares a closed set of path keywords with `as_str` and `FromStr`
macro_rules! path_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(()),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

path_enum!(Timespan {
    Now => "now",
    Today => "today",
    Day => "day",
    Week => "week",
    Month => "month",
    Quarter => "quarter",
    All => "all",
});

path_enum!(StatsTarget {
    Profiles => "profiles",
    Posts => "posts",
});

path_enum!(StatsDirection {
    TopRanked => "top-ranked",
    LowestRanked => "lowest-ranked",
});

path_enum!(ChartPeriod {
    Week => "week",
    Month => "month",
    Quarter => "quarter",
});

impl ChartPeriod {
    /// Number of daily points in an activity chart for this period
    pub fn days(&self) -> usize {
        match self {
            ChartPeriod::Week => 7,
            ChartPeriod::Month => 30,
            ChartPeriod::Quarter => 90,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub id: String,
    pub platform: String,
    #[serde(default)]
    pub ranking: String,
    #[serde(with = "string_int", default)]
    pub sats_positive: i64,
    #[serde(with = "string_int", default)]
    pub sats_negative: i64,
    #[serde(default)]
    pub votes_positive: u64,
    #[serde(default)]
    pub votes_negative: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileList {
    #[serde(default)]
    pub profiles: Vec<ProfileSummary>,
    #[serde(default)]
    pub num_pages: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostList {
    #[serde(default)]
    pub posts: Vec<Value>,
    #[serde(default)]
    pub num_pages: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoteList {
    #[serde(default)]
    pub votes: Vec<Value>,
    #[serde(default)]
    pub num_pages: u32,
}

/// Vote totals over a chart period; all zero when the backend is unavailable
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct WalletSummary {
    pub total_votes: u64,
    pub total_upvotes: u64,
    pub total_downvotes: u64,
    pub total_unique_wallets: u64,
    #[serde(deserialize_with = "string_int::deserialize")]
    pub total_sats_burned: i64,
}

/// One day of wallet activity in a chart series
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct WalletActivityPoint {
    pub total_votes: u64,
    pub total_payouts_sent: u64,
    #[serde(deserialize_with = "string_int::deserialize")]
    pub total_payout_amount: i64,
}

impl WalletActivityPoint {
    /// All-zero series used when the backend has nothing for the period
    pub fn zero_series(period: ChartPeriod) -> Vec<WalletActivityPoint> {
        vec![WalletActivityPoint::default(); period.days()]
    }
}

/// Vote totals of a single wallet (script payload)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WalletActivitySummary {
    pub script_payload: String,
    #[serde(default)]
    pub total_votes: u64,
    #[serde(with = "string_int", default)]
    pub total_sats: i64,
    #[serde(with = "string_int", default)]
    pub first_seen: i64,
    #[serde(with = "string_int", default)]
    pub last_seen: i64,
}

/// Optional `/{start}[/{end}]` suffix of the per-wallet endpoints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalletRange<'a> {
    pub start: Option<&'a str>,
    pub end: Option<&'a str>,
}

impl<'a> WalletRange<'a> {
    /// Path segments after the script payload; `end` is only sent with a start
    pub fn segments(&self) -> Vec<&'a str> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => vec![start, end],
            (Some(start), None) => vec![start],
            (None, _) => Vec::new(),
        }
    }
}

#[async_trait]
pub trait RankApi: Send + Sync {
    async fn profiles(&self, page: u32, page_size: u32) -> Result<ProfileList, UpstreamError>;

    async fn profile_ranking(
        &self,
        platform: Platform,
        profile_id: &str,
    ) -> Result<Value, UpstreamError>;

    async fn profile_posts(
        &self,
        platform: Platform,
        profile_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<PostList, UpstreamError>;

    async fn profile_votes(
        &self,
        platform: Platform,
        profile_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<VoteList, UpstreamError>;

    async fn post_ranking(
        &self,
        platform: Platform,
        profile_id: &str,
        post_id: &str,
    ) -> Result<Value, UpstreamError>;

    async fn vote_activity(&self, page: u32, page_size: u32) -> Result<VoteList, UpstreamError>;

    async fn stats(
        &self,
        target: StatsTarget,
        direction: StatsDirection,
        timespan: Timespan,
    ) -> Result<Vec<Value>, UpstreamError>;

    async fn search_profiles(&self, query: &str) -> Result<Vec<Value>, UpstreamError>;

    async fn wallet_summary(&self, period: ChartPeriod) -> Result<WalletSummary, UpstreamError>;

    /// Daily activity chart for the period; may be empty
    async fn wallet_activity_chart(
        &self,
        period: ChartPeriod,
    ) -> Result<Vec<WalletActivityPoint>, UpstreamError>;

    /// Votes cast by one wallet, optionally bounded in time
    async fn wallet_activity(
        &self,
        script_payload: &str,
        range: WalletRange<'_>,
    ) -> Result<Vec<Value>, UpstreamError>;

    async fn wallet_activity_summary(
        &self,
        script_payload: &str,
        range: WalletRange<'_>,
    ) -> Result<WalletActivitySummary, UpstreamError>;
}

pub struct HttpRankApi {
    client: Client,
    base_url: String,
}

impl HttpRankApi {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, segments: &[&str]) -> Result<T, UpstreamError> {
        let url = join_url(SERVICE, &self.base_url, segments)?;
        send_json(SERVICE, self.client.get(url)).await
    }
}

#[async_trait]
impl RankApi for HttpRankApi {
    async fn profiles(&self, page: u32, page_size: u32) -> Result<ProfileList, UpstreamError> {
        self.get(&["profiles", &page.to_string(), &page_size.to_string()])
            .await
    }

    async fn profile_ranking(
        &self,
        platform: Platform,
        profile_id: &str,
    ) -> Result<Value, UpstreamError> {
        self.get(&[platform.as_str(), profile_id]).await
    }

    async fn profile_posts(
        &self,
        platform: Platform,
        profile_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<PostList, UpstreamError> {
        self.get(&[
            platform.as_str(),
            profile_id,
            "posts",
            &page.to_string(),
            &page_size.to_string(),
        ])
        .await
    }

    async fn profile_votes(
        &self,
        platform: Platform,
        profile_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<VoteList, UpstreamError> {
        self.get(&[
            "txs",
            platform.as_str(),
            profile_id,
            &page.to_string(),
            &page_size.to_string(),
        ])
        .await
    }

    async fn post_ranking(
        &self,
        platform: Platform,
        profile_id: &str,
        post_id: &str,
    ) -> Result<Value, UpstreamError> {
        self.get(&[platform.as_str(), profile_id, post_id]).await
    }

    async fn vote_activity(&self, page: u32, page_size: u32) -> Result<VoteList, UpstreamError> {
        self.get(&["votes", &page.to_string(), &page_size.to_string()])
            .await
    }

    async fn stats(
        &self,
        target: StatsTarget,
        direction: StatsDirection,
        timespan: Timespan,
    ) -> Result<Vec<Value>, UpstreamError> {
        self.get(&["stats", target.as_str(), direction.as_str(), timespan.as_str()])
            .await
    }

    async fn search_profiles(&self, query: &str) -> Result<Vec<Value>, UpstreamError> {
        self.get(&["search", "profile", query]).await
    }

    async fn wallet_summary(&self, period: ChartPeriod) -> Result<WalletSummary, UpstreamError> {
        // the backend answers `null` when it has no data for the period
        let summary: Option<WalletSummary> = self
            .get(&["charts", "wallet", "summary", period.as_str()])
            .await?;
        Ok(summary.unwrap_or_default())
    }

    async fn wallet_activity_chart(
        &self,
        period: ChartPeriod,
    ) -> Result<Vec<WalletActivityPoint>, UpstreamError> {
        let points: Option<Vec<WalletActivityPoint>> = self
            .get(&["charts", "wallet", "activity", period.as_str()])
            .await?;
        Ok(points.unwrap_or_default())
    }

    async fn wallet_activity(
        &self,
        script_payload: &str,
        range: WalletRange<'_>,
    ) -> Result<Vec<Value>, UpstreamError> {
        let mut segments = vec!["wallet", script_payload];
        segments.extend(range.segments());
        let votes: Option<Vec<Value>> = self.get(&segments).await?;
        Ok(votes.unwrap_or_default())
    }

    async fn wallet_activity_summary(
        &self,
        script_payload: &str,
        range: WalletRange<'_>,
    ) -> Result<WalletActivitySummary, UpstreamError> {
        let mut segments = vec!["wallet", "summary", script_payload];
        segments.extend(range.segments());
        let summary: Option<WalletActivitySummary> = self.get(&segments).await?;
        summary.ok_or(UpstreamError::NotFound { service: SERVICE })
    }
}
