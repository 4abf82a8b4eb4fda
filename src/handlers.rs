// region:    --- Imports
use crate::auction::events::{AuctionCreated, AuctionDeleted, AuctionEvent, AuctionUpdated};
use crate::auction::model::{self, Auction, AuctionDto, CreateAuctionDto, UpdateAuctionDto};
use crate::auction::store::AuctionStore;
use crate::error::{AppError, AppResult};
use crate::event_store::{OutboxDispatcher, OutboxEvent};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- State & Router
/// 핸들러 공유 상태
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AuctionStore>,
    pub dispatcher: Arc<OutboxDispatcher>,
    /// 인증 연동 전까지 사용하는 판매자
    pub seller: String,
}

pub const AUCTIONS_PATH: &str = "/api/auctions";

/// 경매 라우터
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            AUCTIONS_PATH,
            get(handle_list_auctions).post(handle_create_auction),
        )
        .route(
            "/api/auctions/:id",
            get(handle_get_auction)
                .put(handle_update_auction)
                .delete(handle_delete_auction),
        )
        .with_state(state)
}

// endregion: --- State & Router

// region:    --- Date Filter
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub date: Option<String>,
}

/// date 쿼리 파싱 (빈 문자열은 필터 없음)
pub fn parse_date_filter(raw: Option<&str>) -> AppResult<Option<DateTime<Utc>>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Some(naive.and_utc()));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Some(date.and_time(NaiveTime::MIN).and_utc()));
    }

    Err(AppError::InvalidDate(raw.to_string()))
}

// endregion: --- Date Filter

// region:    --- Query Handlers

/// 경매 목록 조회
pub async fn handle_list_auctions(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Vec<AuctionDto>>> {
    info!("{:<12} --> 경매 목록 조회 date: {:?}", "Handler", params.date);
    let updated_after = parse_date_filter(params.date.as_deref())?;
    let auctions = state.store.list(updated_after).await?;
    Ok(Json(auctions.iter().map(AuctionDto::from).collect()))
}

/// 경매 조회
pub async fn handle_get_auction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<AuctionDto>> {
    info!("{:<12} --> 경매 조회 id: {}", "Handler", id);
    let auction = state.store.find(id).await?.ok_or(AppError::NotFound(id))?;
    Ok(Json(AuctionDto::from(&auction)))
}

// endregion: --- Query Handlers

// region:    --- Command Handlers

/// 경매 생성
pub async fn handle_create_auction(
    State(state): State<AppState>,
    Json(input): Json<CreateAuctionDto>,
) -> AppResult<impl IntoResponse> {
    info!("{:<12} --> 경매 생성 요청: {:?}", "Handler", input);
    let at = model::now();
    // TODO: 인증 연동 후 요청 사용자를 판매자로 지정
    let auction = Auction::new(input, &state.seller, at);
    let dto = AuctionDto::from(&auction);

    let event = OutboxEvent::record(
        &AuctionEvent::AuctionCreated(AuctionCreated::from(&dto)),
        at,
    )?;
    if state.store.insert(&auction, &event).await? == 0 {
        return Err(AppError::SaveFailed("Could not save changes to the Database"));
    }
    state.dispatcher.publish_committed().await;

    let location = format!("{}/{}", AUCTIONS_PATH, auction.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(dto)))
}

/// 경매 수정 (전달된 필드만 반영)
pub async fn handle_update_auction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<UpdateAuctionDto>,
) -> AppResult<StatusCode> {
    info!("{:<12} --> 경매 수정 요청 id: {}, {:?}", "Handler", id, update);
    let mut auction: Auction = state.store.find(id).await?.ok_or(AppError::NotFound(id))?;

    let at = model::now();
    auction.apply_update(update, at);
    let dto = AuctionDto::from(&auction);

    let event = OutboxEvent::record(
        &AuctionEvent::AuctionUpdated(AuctionUpdated::from(&dto)),
        at,
    )?;
    if state.store.update(&auction, &event).await? == 0 {
        return Err(AppError::SaveFailed("Problem saving changes"));
    }
    state.dispatcher.publish_committed().await;

    Ok(StatusCode::OK)
}

/// 경매 삭제
pub async fn handle_delete_auction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    info!("{:<12} --> 경매 삭제 요청 id: {}", "Handler", id);
    let auction = state.store.find(id).await?.ok_or(AppError::NotFound(id))?;

    let event = OutboxEvent::record(
        &AuctionEvent::AuctionDeleted(AuctionDeleted { id: auction.id }),
        model::now(),
    )?;
    if state.store.delete(auction.id, &event).await? == 0 {
        return Err(AppError::SaveFailed("Could not update database"));
    }
    state.dispatcher.publish_committed().await;

    Ok(StatusCode::OK)
}

// endregion: --- Command Handlers
