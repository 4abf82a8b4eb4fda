//! PostgreSQL 저장소 테스트 (DATABASE_URL 필요)
//! cargo test --test pg_store -- --ignored

use auction_search::auction::events::{AuctionCreated, AuctionDeleted, AuctionEvent, AuctionUpdated};
use auction_search::auction::model::{self, Auction, AuctionDto, CreateAuctionDto, UpdateAuctionDto};
use auction_search::auction::store::{AuctionStore, PgAuctionStore};
use auction_search::config::Config;
use auction_search::database::DatabaseManager;
use auction_search::event_store::OutboxEvent;
use chrono::Duration;
use std::sync::Arc;
use uuid::Uuid;

async fn setup() -> (PgAuctionStore, Arc<DatabaseManager>) {
    let config = Config::from_env().unwrap();
    let db = Arc::new(DatabaseManager::new(&config).await.unwrap());
    db.initialize_database().await.unwrap();
    (PgAuctionStore::new(db.clone()), db)
}

fn auction(make: &str, at: chrono::DateTime<chrono::Utc>) -> Auction {
    let input = CreateAuctionDto {
        make: make.to_string(),
        model: "Model".to_string(),
        color: "Red".to_string(),
        mileage: 100,
        year: 2020,
        reserve_price: 0,
        image_url: None,
        auction_end: None,
    };
    Auction::new(input, "test", at)
}

fn created(auction: &Auction) -> OutboxEvent {
    let dto = AuctionDto::from(auction);
    OutboxEvent::record(&AuctionEvent::AuctionCreated(AuctionCreated::from(&dto)), auction.created_at)
        .unwrap()
}

fn updated(auction: &Auction) -> OutboxEvent {
    let dto = AuctionDto::from(auction);
    OutboxEvent::record(&AuctionEvent::AuctionUpdated(AuctionUpdated::from(&dto)), auction.updated_at)
        .unwrap()
}

fn deleted(id: Uuid) -> OutboxEvent {
    OutboxEvent::record(&AuctionEvent::AuctionDeleted(AuctionDeleted { id }), model::now()).unwrap()
}

async fn outbox_rows_for(db: &DatabaseManager, id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM outbox WHERE aggregate_id = $1")
        .bind(id)
        .fetch_one(db.pool())
        .await
        .unwrap()
}

async fn item_rows_for(db: &DatabaseManager, id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE auction_id = $1")
        .bind(id)
        .fetch_one(db.pool())
        .await
        .unwrap()
}

/// 조인 조회, 날짜 필터, make 정렬
#[tokio::test]
#[ignore = "DATABASE_URL 의 PostgreSQL 필요"]
async fn test_list_joins_filters_and_orders() {
    let (store, _db) = setup().await;
    let tag = Uuid::new_v4().simple().to_string();
    let at = model::now();

    let older = auction(&format!("{tag}-b"), at - Duration::hours(1));
    let newer = auction(&format!("{tag}-a"), at);
    for a in [&older, &newer] {
        assert_eq!(store.insert(a, &created(a)).await.unwrap(), 1);
    }

    let ours = |list: Vec<Auction>| -> Vec<Uuid> {
        list.into_iter()
            .filter(|a| a.item.make.starts_with(&tag))
            .map(|a| a.id)
            .collect()
    };

    assert_eq!(ours(store.list(None).await.unwrap()), vec![newer.id, older.id]);
    assert_eq!(
        ours(store.list(Some(at - Duration::minutes(1))).await.unwrap()),
        vec![newer.id]
    );

    let found = store.find(newer.id).await.unwrap().unwrap();
    assert_eq!(found, newer);
    assert!(store.find(Uuid::new_v4()).await.unwrap().is_none());
}

/// 수정은 차량 정보와 수정 시각을 함께 반영
#[tokio::test]
#[ignore = "DATABASE_URL 의 PostgreSQL 필요"]
async fn test_update_changes_item_and_timestamp() {
    let (store, db) = setup().await;
    let mut a = auction("Ford", model::now());
    store.insert(&a, &created(&a)).await.unwrap();

    a.apply_update(
        UpdateAuctionDto {
            color: Some("Blue".to_string()),
            ..Default::default()
        },
        model::now(),
    );
    assert_eq!(store.update(&a, &updated(&a)).await.unwrap(), 1);

    let found = store.find(a.id).await.unwrap().unwrap();
    assert_eq!(found.item.color, "Blue");
    assert_eq!(found.updated_at, a.updated_at);
    assert_eq!(outbox_rows_for(&db, a.id).await, 2);
}

/// 삭제는 차량 정보까지 지운다
#[tokio::test]
#[ignore = "DATABASE_URL 의 PostgreSQL 필요"]
async fn test_delete_cascades_to_item() {
    let (store, db) = setup().await;
    let a = auction("Audi", model::now());
    store.insert(&a, &created(&a)).await.unwrap();
    assert_eq!(item_rows_for(&db, a.id).await, 1);

    assert_eq!(store.delete(a.id, &deleted(a.id)).await.unwrap(), 1);
    assert!(store.find(a.id).await.unwrap().is_none());
    assert_eq!(item_rows_for(&db, a.id).await, 0);
}

/// 없는 경매에 대한 변경은 0건이고 아웃박스에 이벤트가 남지 않는다
#[tokio::test]
#[ignore = "DATABASE_URL 의 PostgreSQL 필요"]
async fn test_missing_auction_writes_no_event() {
    let (store, db) = setup().await;
    let ghost = auction("Ghost", model::now());

    assert_eq!(store.update(&ghost, &updated(&ghost)).await.unwrap(), 0);
    assert_eq!(store.delete(ghost.id, &deleted(ghost.id)).await.unwrap(), 0);
    assert_eq!(outbox_rows_for(&db, ghost.id).await, 0);
}
