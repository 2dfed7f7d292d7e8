//! HTTP handlers for the registry API.
//!
//! Every listing takes a snapshot of the block list first, so a concurrent
//! block/unblock never changes the filter halfway through a response.

use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};

use super::dto::{
    AddHospitalResponse, BlockedPrefecturesResponse, HealthResponse, ListQuery, PrefectureQuery,
};
use super::error::AppError;
use super::page::render_index;
use super::state::AppState;
use crate::domain::model::{HospitalCard, HospitalInfo, HospitalRecord, IndexedCard, NewHospital};
use crate::utils::validation::validate_non_empty_string;

pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Listings
// =============================================================================

/// GET /
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, AppError> {
    let blocked = state.blocked.snapshot();
    let cards = state.catalog.cards(&blocked, query.exclude_blocked);
    let html = render_index(&cards, &blocked.to_vec(), query.exclude_blocked)?;
    Ok(Html(html))
}

/// GET /hospital_cards
pub async fn hospital_cards(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<HospitalCard>> {
    let blocked = state.blocked.snapshot();
    Json(state.catalog.cards(&blocked, query.exclude_blocked))
}

/// GET /hospital-cards
///
/// Header-less positional read with sequential ids.
pub async fn indexed_hospital_cards(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<IndexedCard>> {
    let blocked = state.blocked.snapshot();
    Json(state.catalog.indexed_cards(&blocked, query.exclude_blocked))
}

/// GET /hospital-info
pub async fn hospital_info(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<HospitalInfo>> {
    let blocked = state.blocked.snapshot();
    Json(state.catalog.infos(&blocked, query.exclude_blocked))
}

/// GET /hospital-data
pub async fn hospital_data(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<HospitalRecord>> {
    let blocked = state.blocked.snapshot();
    Json(state.catalog.records(&blocked, query.exclude_blocked))
}

/// POST /add-hospital
pub async fn add_hospital(
    State(state): State<AppState>,
    Json(hospital): Json<NewHospital>,
) -> HandlerResult<AddHospitalResponse> {
    let target = state.add_target.as_deref().ok_or_else(|| {
        AppError::Unavailable("No add target CSV is configured (sources.add_target)".to_string())
    })?;

    state.catalog.append_hospital(target, &hospital).await?;

    Ok(Json(AddHospitalResponse {
        message: "病院が追加されました".to_string(),
        name: hospital.name,
        address: hospital.address,
        departments: hospital.departments,
    }))
}

// =============================================================================
// Block list
// =============================================================================

/// GET /blocked-prefectures
pub async fn get_blocked_prefectures(
    State(state): State<AppState>,
) -> Json<BlockedPrefecturesResponse> {
    Json(BlockedPrefecturesResponse {
        message: None,
        blocked_prefectures: state.blocked.list(),
    })
}

/// POST /block-prefecture?prefecture=
pub async fn block_prefecture(
    State(state): State<AppState>,
    Query(query): Query<PrefectureQuery>,
) -> HandlerResult<BlockedPrefecturesResponse> {
    validate_non_empty_string("prefecture", &query.prefecture)?;

    let blocked_prefectures = state.blocked.block(&query.prefecture);
    Ok(Json(BlockedPrefecturesResponse {
        message: Some(format!("都道府県 '{}' がブロックされました", query.prefecture)),
        blocked_prefectures,
    }))
}

/// POST /unblock-prefecture?prefecture=
pub async fn unblock_prefecture(
    State(state): State<AppState>,
    Query(query): Query<PrefectureQuery>,
) -> HandlerResult<BlockedPrefecturesResponse> {
    validate_non_empty_string("prefecture", &query.prefecture)?;

    let blocked_prefectures = state.blocked.unblock(&query.prefecture);
    Ok(Json(BlockedPrefecturesResponse {
        message: Some(format!(
            "都道府県 '{}' のブロックが解除されました",
            query.prefecture
        )),
        blocked_prefectures,
    }))
}

/// POST /set-blocked-prefectures
pub async fn set_blocked_prefectures(
    State(state): State<AppState>,
    Json(prefectures): Json<Vec<String>>,
) -> HandlerResult<BlockedPrefecturesResponse> {
    for prefecture in &prefectures {
        validate_non_empty_string("prefecture", prefecture)?;
    }

    let blocked_prefectures = state.blocked.replace(prefectures);
    Ok(Json(BlockedPrefecturesResponse {
        message: Some("ブロックする都道府県が設定されました".to_string()),
        blocked_prefectures,
    }))
}

// =============================================================================
// Health
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.catalog.stats();

    Json(HealthResponse {
        status: "ok".to_string(),
        configured_sources: stats.configured_sources,
        loaded_sources: stats.loaded_sources,
        rows: stats.rows,
        blocked_prefectures: state.blocked.list().len(),
        loaded_at: stats.loaded_at,
    })
}
