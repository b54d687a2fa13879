// Social Reputation API Endpoints
//
// Thin proxies over the rank backend. Listings degrade to empty pages when the
// backend is unavailable; single-resource lookups report 404/500.

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use serde_json::Value;

use super::helpers::{bad_request, or_degraded, parse_platform, upstream_failure, ApiResult, Pagination};
use super::types::{ApiError, JsonList, PageQuery, ProfileWithPercent, ProfilesPage, WalletPath};
use super::SharedState;
use crate::constants::MIN_SEARCH_QUERY_LEN;
use crate::format::percent;
use crate::rank_api::{
    ChartPeriod, PostList, ProfileList, StatsDirection, StatsTarget, Timespan, VoteList,
    WalletActivityPoint, WalletActivitySummary, WalletRange, WalletSummary,
};

fn require_profile_id(profile_id: &str) -> Result<(), (StatusCode, Json<ApiError>)> {
    if profile_id.trim().is_empty() {
        return Err(bad_request("Invalid platform or profileId"));
    }
    Ok(())
}

fn parse_period(period: &str) -> Result<ChartPeriod, (StatusCode, Json<ApiError>)> {
    period.parse().map_err(|_| bad_request("Invalid period"))
}

/// Validate the script payload and borrow the optional time bounds
fn wallet_range(path: &WalletPath) -> Result<WalletRange<'_>, (StatusCode, Json<ApiError>)> {
    if path.script_payload.is_empty() || hex::decode(&path.script_payload).is_err() {
        return Err(bad_request("Invalid scriptPayload"));
    }
    Ok(WalletRange {
        start: path.start.as_deref(),
        end: path.end.as_deref(),
    })
}

/// GET /api/social/{platform}/{profileId}
pub async fn profile(
    Path((platform, profile_id)): Path<(String, String)>,
    Extension(state): Extension<SharedState>,
) -> ApiResult<Value> {
    let platform = parse_platform(&platform)?;
    require_profile_id(&profile_id)?;

    state
        .rank
        .profile_ranking(platform, &profile_id)
        .await
        .map(Json)
        .map_err(|e| upstream_failure("Profile", &e))
}

/// GET /api/social/{platform}/{profileId}/posts?page=&pageSize=
pub async fn posts(
    Path((platform, profile_id)): Path<(String, String)>,
    Query(query): Query<PageQuery>,
    Extension(state): Extension<SharedState>,
) -> ApiResult<PostList> {
    let platform = parse_platform(&platform)?;
    require_profile_id(&profile_id)?;
    let pagination = Pagination::from_query(&query);

    let posts = state
        .rank
        .profile_posts(platform, &profile_id, pagination.page, pagination.page_size)
        .await;
    Ok(Json(or_degraded("profile posts", posts)))
}

/// GET /api/social/{platform}/{profileId}/votes?page=&pageSize=
pub async fn votes(
    Path((platform, profile_id)): Path<(String, String)>,
    Query(query): Query<PageQuery>,
    Extension(state): Extension<SharedState>,
) -> ApiResult<VoteList> {
    let platform = parse_platform(&platform)?;
    require_profile_id(&profile_id)?;
    let pagination = Pagination::from_query(&query);

    let votes = state
        .rank
        .profile_votes(platform, &profile_id, pagination.page, pagination.page_size)
        .await;
    Ok(Json(or_degraded("profile votes", votes)))
}

/// GET /api/social/{platform}/{profileId}/{postId}
pub async fn post(
    Path((platform, profile_id, post_id)): Path<(String, String, String)>,
    Extension(state): Extension<SharedState>,
) -> ApiResult<Value> {
    let platform = parse_platform(&platform)?;
    require_profile_id(&profile_id)?;

    state
        .rank
        .post_ranking(platform, &profile_id, &post_id)
        .await
        .map(Json)
        .map_err(|e| upstream_failure("Post", &e))
}

/// GET /api/social/activity?page=&pageSize=
pub async fn activity(
    Query(query): Query<PageQuery>,
    Extension(state): Extension<SharedState>,
) -> Json<VoteList> {
    let pagination = Pagination::from_query(&query);
    let votes = state
        .rank
        .vote_activity(pagination.page, pagination.page_size)
        .await;
    Json(or_degraded("vote activity", votes))
}

/// GET /api/social/profiles?page=&pageSize=
///
/// Each profile gains `positivePercent`, the share of positive sats burned.
pub async fn profiles(
    Query(query): Query<PageQuery>,
    Extension(state): Extension<SharedState>,
) -> Json<ProfilesPage> {
    let pagination = Pagination::from_query(&query);
    let list: ProfileList = or_degraded(
        "profiles",
        state.rank.profiles(pagination.page, pagination.page_size).await,
    );

    let profiles = list
        .profiles
        .into_iter()
        .map(|profile| ProfileWithPercent {
            positive_percent: percent(profile.sats_positive, profile.sats_negative),
            profile,
        })
        .collect();

    Json(ProfilesPage {
        profiles,
        num_pages: list.num_pages,
    })
}

/// GET /api/social/stats/{target}/{direction}/{timespan}
pub async fn stats(
    Path((target, direction, timespan)): Path<(String, String, String)>,
    Extension(state): Extension<SharedState>,
) -> ApiResult<JsonList> {
    let target: StatsTarget = target
        .parse()
        .map_err(|_| bad_request("Invalid stats target"))?;
    let direction: StatsDirection = direction
        .parse()
        .map_err(|_| bad_request("Invalid stats direction"))?;
    let timespan: Timespan = timespan
        .parse()
        .map_err(|_| bad_request("Invalid timespan"))?;

    let stats = state.rank.stats(target, direction, timespan).await;
    Ok(Json(or_degraded("stats", stats)))
}

/// GET /api/social/search/{query}
pub async fn search(
    Path(query): Path<String>,
    Extension(state): Extension<SharedState>,
) -> Json<JsonList> {
    let query = query.trim();
    if query.chars().count() < MIN_SEARCH_QUERY_LEN {
        return Json(Vec::new());
    }
    Json(or_degraded("profile search", state.rank.search_profiles(query).await))
}

/// GET /api/social/charts/wallet/summary/{period}
pub async fn wallet_summary(
    Path(period): Path<String>,
    Extension(state): Extension<SharedState>,
) -> ApiResult<WalletSummary> {
    let period = parse_period(&period)?;
    let summary = state.rank.wallet_summary(period).await;
    Ok(Json(or_degraded("wallet summary", summary)))
}

/// GET /api/social/charts/wallet/activity/{period}
///
/// Always one point per day of the period; an empty or failed upstream answer
/// becomes an all-zero series.
pub async fn wallet_activity_chart(
    Path(period): Path<String>,
    Extension(state): Extension<SharedState>,
) -> ApiResult<Vec<WalletActivityPoint>> {
    let period = parse_period(&period)?;
    let points = or_degraded(
        "wallet activity chart",
        state.rank.wallet_activity_chart(period).await,
    );
    if points.is_empty() {
        return Ok(Json(WalletActivityPoint::zero_series(period)));
    }
    Ok(Json(points))
}

/// GET /api/social/wallet/{scriptPayload}[/{start}[/{end}]]
pub async fn wallet_activity(
    Path(path): Path<WalletPath>,
    Extension(state): Extension<SharedState>,
) -> ApiResult<JsonList> {
    let range = wallet_range(&path)?;
    let votes = state
        .rank
        .wallet_activity(&path.script_payload, range)
        .await;
    Ok(Json(or_degraded("wallet activity", votes)))
}

/// GET /api/social/wallet/summary/{scriptPayload}[/{start}[/{end}]]
pub async fn wallet_activity_summary(
    Path(path): Path<WalletPath>,
    Extension(state): Extension<SharedState>,
) -> ApiResult<WalletActivitySummary> {
    let range = wallet_range(&path)?;
    state
        .rank
        .wallet_activity_summary(&path.script_payload, range)
        .await
        .map(Json)
        .map_err(|e| upstream_failure("Wallet", &e))
}
