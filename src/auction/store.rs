// region:    --- Imports
use super::model::{Auction, Item};
use crate::database::DatabaseManager;
use crate::error::{AppError, AppResult};
use crate::event_store::{EventOutbox, OutboxEvent};
use crate::query::queries;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Auction Store Trait
/// 경매 저장소 트레이트
/// 변경 연산은 아웃박스 이벤트를 같은 트랜잭션에 기록하고 영향받은 경매 수를 반환한다.
/// 반영된 경매가 없으면 이벤트도 기록하지 않는다.
#[async_trait]
pub trait AuctionStore: Send + Sync {
    async fn list(&self, updated_after: Option<DateTime<Utc>>) -> AppResult<Vec<Auction>>;
    async fn find(&self, id: Uuid) -> AppResult<Option<Auction>>;
    async fn insert(&self, auction: &Auction, event: &OutboxEvent) -> AppResult<u64>;
    async fn update(&self, auction: &Auction, event: &OutboxEvent) -> AppResult<u64>;
    async fn delete(&self, id: Uuid, event: &OutboxEvent) -> AppResult<u64>;
}

// endregion: --- Auction Store Trait

// region:    --- Rows
/// auctions + items 조인 결과
#[derive(Debug, FromRow)]
struct AuctionRow {
    id: Uuid,
    seller: String,
    reserve_price: i32,
    image_url: Option<String>,
    auction_end: Option<DateTime<Utc>>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    make: String,
    model: String,
    color: String,
    mileage: i32,
    year: i32,
}

impl TryFrom<AuctionRow> for Auction {
    type Error = AppError;

    fn try_from(row: AuctionRow) -> Result<Self, Self::Error> {
        Ok(Auction {
            id: row.id,
            seller: row.seller,
            reserve_price: row.reserve_price,
            image_url: row.image_url,
            auction_end: row.auction_end,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
            item: Item {
                make: row.make,
                model: row.model,
                color: row.color,
                mileage: row.mileage,
                year: row.year,
            },
        })
    }
}

// endregion: --- Rows

// region:    --- Postgres Store
/// PostgreSQL 경매 저장소
pub struct PgAuctionStore {
    db: Arc<DatabaseManager>,
}

impl PgAuctionStore {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }
}

/// 아웃박스 이벤트 기록
async fn insert_outbox_event(conn: &mut PgConnection, event: &OutboxEvent) -> Result<(), sqlx::Error> {
    sqlx::query(queries::INSERT_OUTBOX_EVENT)
        .bind(event.id)
        .bind(event.aggregate_id)
        .bind(&event.event_type)
        .bind(&event.data)
        .bind(event.created_at)
        .execute(conn)
        .await?;
    Ok(())
}

#[async_trait]
impl AuctionStore for PgAuctionStore {
    async fn list(&self, updated_after: Option<DateTime<Utc>>) -> AppResult<Vec<Auction>> {
        info!("{:<12} --> 경매 목록 조회 after: {:?}", "Store", updated_after);
        let sql = queries::list_auctions(updated_after.is_some());
        let mut query = sqlx::query_as::<_, AuctionRow>(&sql);
        if let Some(after) = updated_after {
            query = query.bind(after);
        }
        let rows = query.fetch_all(self.db.pool()).await?;
        rows.into_iter().map(Auction::try_from).collect()
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<Auction>> {
        info!("{:<12} --> 경매 조회 id: {}", "Store", id);
        let row = sqlx::query_as::<_, AuctionRow>(&queries::get_auction())
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        row.map(Auction::try_from).transpose()
    }

    async fn insert(&self, auction: &Auction, event: &OutboxEvent) -> AppResult<u64> {
        info!("{:<12} --> 경매 생성 id: {}", "Store", auction.id);
        let auction = auction.clone();
        let event = event.clone();
        self.db
            .transaction(move |tx| {
                Box::pin(async move {
                    let inserted = sqlx::query(queries::INSERT_AUCTION)
                        .bind(auction.id)
                        .bind(&auction.seller)
                        .bind(auction.reserve_price)
                        .bind(&auction.image_url)
                        .bind(auction.auction_end)
                        .bind(auction.status.as_str())
                        .bind(auction.created_at)
                        .bind(auction.updated_at)
                        .execute(&mut **tx)
                        .await?
                        .rows_affected();
                    if inserted == 0 {
                        return Ok(0);
                    }

                    let item = &auction.item;
                    sqlx::query(queries::INSERT_ITEM)
                        .bind(Uuid::new_v4())
                        .bind(auction.id)
                        .bind(&item.make)
                        .bind(&item.model)
                        .bind(&item.color)
                        .bind(item.mileage)
                        .bind(item.year)
                        .execute(&mut **tx)
                        .await?;

                    insert_outbox_event(&mut **tx, &event).await?;
                    Ok::<u64, AppError>(inserted)
                })
            })
            .await
    }

    async fn update(&self, auction: &Auction, event: &OutboxEvent) -> AppResult<u64> {
        info!("{:<12} --> 경매 수정 id: {}", "Store", auction.id);
        let auction = auction.clone();
        let event = event.clone();
        self.db
            .transaction(move |tx| {
                Box::pin(async move {
                    let touched = sqlx::query(queries::TOUCH_AUCTION)
                        .bind(auction.id)
                        .bind(auction.updated_at)
                        .execute(&mut **tx)
                        .await?
                        .rows_affected();
                    if touched == 0 {
                        return Ok(0);
                    }

                    let item = &auction.item;
                    let item_rows = sqlx::query(queries::UPDATE_ITEM)
                        .bind(auction.id)
                        .bind(&item.make)
                        .bind(&item.model)
                        .bind(&item.color)
                        .bind(item.mileage)
                        .bind(item.year)
                        .execute(&mut **tx)
                        .await?
                        .rows_affected();
                    // 차량 정보 없는 경매는 롤백
                    if item_rows == 0 {
                        return Err(AppError::SaveFailed("Problem saving changes"));
                    }

                    insert_outbox_event(&mut **tx, &event).await?;
                    Ok::<u64, AppError>(touched)
                })
            })
            .await
    }

    async fn delete(&self, id: Uuid, event: &OutboxEvent) -> AppResult<u64> {
        info!("{:<12} --> 경매 삭제 id: {}", "Store", id);
        let event = event.clone();
        self.db
            .transaction(move |tx| {
                Box::pin(async move {
                    let deleted = sqlx::query(queries::DELETE_AUCTION)
                        .bind(id)
                        .execute(&mut **tx)
                        .await?
                        .rows_affected();
                    if deleted == 0 {
                        return Ok(0);
                    }

                    insert_outbox_event(&mut **tx, &event).await?;
                    Ok::<u64, AppError>(deleted)
                })
            })
            .await
    }
}

#[async_trait]
impl EventOutbox for PgAuctionStore {
    async fn pending_events(&self, limit: i64) -> AppResult<Vec<OutboxEvent>> {
        let events = sqlx::query_as::<_, OutboxEvent>(queries::GET_PENDING_EVENTS)
            .bind(limit)
            .fetch_all(self.db.pool())
            .await?;
        Ok(events)
    }

    async fn mark_published(&self, id: Uuid) -> AppResult<bool> {
        let updated = sqlx::query(queries::MARK_EVENT_PUBLISHED)
            .bind(id)
            .bind(Utc::now())
            .execute(self.db.pool())
            .await?
            .rows_affected();
        Ok(updated > 0)
    }
}

// endregion: --- Postgres Store
