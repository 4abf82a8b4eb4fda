// region:    --- Imports
use auction_search::auction::store::PgAuctionStore;
use auction_search::config::Config;
use auction_search::database::DatabaseManager;
use auction_search::event_store::OutboxDispatcher;
use auction_search::handlers::{self, AppState};
use auction_search::message_broker::{KafkaManager, KafkaProducer};
use auction_search::scheduler::OutboxRelay;
use axum::extract::DefaultBodyLimit;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    let config = Config::from_env()?;

    // DatabaseManager 생성 및 스키마 확인
    let db_manager = Arc::new(DatabaseManager::new(&config).await?);
    if let Err(e) = db_manager.initialize_database().await {
        error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> 데이터베이스 초기화 성공", "Main");

    // 토픽 생성 (경매 이벤트 + 데드레터)
    let kafka_manager = KafkaManager::new(&config.kafka_brokers);
    kafka_manager.create_topic(&config.auction_topic, 5, 1).await?;
    kafka_manager
        .create_topic(&config.dead_letter_topic(), 1, 1)
        .await?;
    let producer = Arc::new(KafkaProducer::new(&config.kafka_brokers)?);

    let store = Arc::new(PgAuctionStore::new(Arc::clone(&db_manager)));
    let dispatcher = Arc::new(OutboxDispatcher::new(
        store.clone(),
        producer,
        config.auction_topic.clone(),
    ));

    // 아웃박스 릴레이 시작
    OutboxRelay::new(Arc::clone(&dispatcher), config.outbox_poll_interval).start();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let routes_all = handlers::router(AppState {
        store,
        dispatcher,
        seller: config.default_seller.clone(),
    })
    .layer(cors)
    .layer(DefaultBodyLimit::max(1024 * 1024));

    let listener = TcpListener::bind(&config.listen_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
