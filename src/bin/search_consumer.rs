// region:    --- Imports
use auction_search::config::Config;
use auction_search::message_broker::{DeadLetter, KafkaConsumer, KafkaProducer};
use auction_search::search::consumer::SearchConsumer;
use auction_search::search::store::MongoSearchStore;
use std::sync::Arc;
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

    let store = MongoSearchStore::connect(&config.mongodb_url, &config.mongodb_database).await?;
    let consumer = SearchConsumer::new(Arc::new(store));

    let dead_letter = DeadLetter {
        publisher: Arc::new(KafkaProducer::new(&config.kafka_brokers)?),
        topic: config.dead_letter_topic(),
    };
    let kafka_consumer = KafkaConsumer::new(&config.kafka_brokers, &config.search_group_id)?;

    info!(
        "{:<12} --> Search consumer 시작: topic={}, group={}",
        "Main", config.auction_topic, config.search_group_id
    );

    let result = kafka_consumer
        .consume_events(&config.auction_topic, &dead_letter, config.retry, |event| {
            let consumer = consumer.clone();
            async move { consumer.handle(event).await }
        })
        .await;

    if let Err(e) = result {
        error!("{:<12} --> 이벤트 소비 오류: {:?}", "Main", e);
        return Err(e.into());
    }
    Ok(())
}
// endregion: --- Main
