// region:    --- Imports
use crate::auction::events::AuctionEvent;
use crate::config::RetryPolicy;
use crate::error::MessagingError;
use async_trait::async_trait;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::Message;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::types::RDKafkaErrorCode;
use rdkafka::ClientConfig;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

// endregion: --- Imports

// region:    --- Event Publisher
/// 이벤트 발행 트레이트
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, topic: &str, key: &str, payload: &str) -> Result<(), MessagingError>;
}

// endregion: --- Event Publisher

// region:    --- Kafka Producer
#[derive(Clone)]
pub struct KafkaProducer {
    producer: Arc<FutureProducer>,
}

/// KafkaProducer 구현
impl KafkaProducer {
    pub fn new(brokers: &str) -> Result<Self, MessagingError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;

        Ok(KafkaProducer {
            producer: Arc::new(producer),
        })
    }

    /// 메시지 전송
    pub async fn send_message(&self, topic: &str, key: &str, value: &str) -> Result<(), MessagingError> {
        info!(
            "{:<12} --> Kafka 메시지 전송: topic={}, key={}",
            "Producer", topic, key
        );
        let record = FutureRecord::to(topic).key(key).payload(value);

        self.producer
            .send(record, Duration::from_secs(0))
            .await
            .map_err(|(e, _)| MessagingError::Kafka(e))?;

        Ok(())
    }
}

#[async_trait]
impl EventPublisher for KafkaProducer {
    async fn publish(&self, topic: &str, key: &str, payload: &str) -> Result<(), MessagingError> {
        self.send_message(topic, key, payload).await
    }
}

// endregion: --- Kafka Producer

// region:    --- Retry
/// 핸들러 재시도 (선형 백오프)
pub async fn deliver_with_retry<F, Fut, E>(
    policy: RetryPolicy,
    event: &AuctionEvent,
    handler: &F,
) -> Result<(), E>
where
    F: Fn(AuctionEvent) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match handler(event.clone()).await {
            Ok(()) => return Ok(()),
            Err(e) if attempt >= policy.max_attempts => return Err(e),
            Err(e) => {
                warn!(
                    "{:<12} --> 이벤트 처리 실패 (시도: {}/{}): {}",
                    "Consumer", attempt, policy.max_attempts, e
                );
                tokio::time::sleep(policy.backoff * attempt).await;
                attempt += 1;
            }
        }
    }
}

// endregion: --- Retry

// region:    --- Kafka Consumer
/// 처리 실패 메시지를 보낼 데드레터 목적지
pub struct DeadLetter {
    pub publisher: Arc<dyn EventPublisher>,
    pub topic: String,
}

impl DeadLetter {
    async fn forward(&self, key: &str, payload: &[u8]) -> Result<(), MessagingError> {
        warn!(
            "{:<12} --> 데드레터 전송: topic={}, key={}",
            "Consumer", self.topic, key
        );
        self.publisher
            .publish(&self.topic, key, &String::from_utf8_lossy(payload))
            .await
    }
}

/// 메시지 하나 처리 (디코딩 → 재시도 → 데드레터)
/// Err 이면 데드레터 전송까지 실패한 것이므로 오프셋을 커밋하면 안 된다.
pub async fn process_payload<F, Fut, E>(
    payload: &[u8],
    key: &str,
    policy: RetryPolicy,
    handler: &F,
    dead_letter: &DeadLetter,
) -> Result<(), MessagingError>
where
    F: Fn(AuctionEvent) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    let event = match serde_json::from_slice::<AuctionEvent>(payload) {
        Ok(event) => event,
        Err(e) => {
            error!("{:<12} --> deserialize 오류: {:?}", "Consumer", e);
            return dead_letter.forward(key, payload).await;
        }
    };
    debug!("{:<12} --> deserialize 성공: {:?}", "Consumer", event);

    match deliver_with_retry(policy, &event, handler).await {
        Ok(()) => {
            info!(
                "{:<12} --> {} 처리 성공: {}",
                "Consumer",
                event.name(),
                event.auction_id()
            );
            Ok(())
        }
        Err(e) => {
            error!("{:<12} --> {} 처리 실패: {}", "Consumer", event.name(), e);
            dead_letter.forward(key, payload).await
        }
    }
}

pub struct KafkaConsumer {
    consumer: Arc<StreamConsumer>,
}

/// KafkaConsumer 구현
impl KafkaConsumer {
    pub fn new(brokers: &str, group_id: &str) -> Result<Self, MessagingError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("group.id", group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "6000")
            .set("fetch.max.bytes", "5242880")
            .set("allow.auto.create.topics", "true")
            .create()?;

        Ok(KafkaConsumer {
            consumer: Arc::new(consumer),
        })
    }

    /// 경매 이벤트 소비 (재시도 후 실패 시 데드레터)
    pub async fn consume_events<F, Fut, E>(
        &self,
        topic: &str,
        dead_letter: &DeadLetter,
        policy: RetryPolicy,
        handler: F,
    ) -> Result<(), MessagingError>
    where
        F: Fn(AuctionEvent) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Display,
    {
        info!(
            "{:<12} --> Kafka 이벤트 소비 시작: topic={}",
            "Consumer", topic
        );
        self.consumer.subscribe(&[topic])?;

        loop {
            match self.consumer.recv().await {
                Ok(message) => {
                    info!(
                        "{:<12} --> 메시지 수신: topic={}, partition={}, offset={}",
                        "Consumer",
                        message.topic(),
                        message.partition(),
                        message.offset()
                    );
                    let key = message
                        .key()
                        .map(|k| String::from_utf8_lossy(k).into_owned())
                        .unwrap_or_default();

                    match message.payload() {
                        Some(payload) => {
                            // 데드레터 전송 실패 시 커밋하지 않고 중단 (재시작 후 재전달)
                            if let Err(e) =
                                process_payload(payload, &key, policy, &handler, dead_letter).await
                            {
                                error!("{:<12} --> 데드레터 전송 실패, 소비 중단: {:?}", "Consumer", e);
                                return Err(e);
                            }
                        }
                        None => warn!("{:<12} --> 빈 페이로드 수신", "Consumer"),
                    }

                    if let Err(e) = self.consumer.commit_message(&message, CommitMode::Async) {
                        error!("{:<12} --> 오프셋 커밋 오류: {:?}", "Consumer", e);
                    }
                }
                Err(e) => error!("{:<12} --> 메시지 수신 오류: {:?}", "Consumer", e),
            }
        }
    }
}

// endregion: --- Kafka Consumer

// region:    --- Kafka Manager
pub struct KafkaManager {
    brokers: String,
}

/// KafkaManager 구현
impl KafkaManager {
    pub fn new(brokers: &str) -> Self {
        KafkaManager {
            brokers: brokers.to_string(),
        }
    }

    /// 토픽 생성 (이미 존재하면 성공)
    pub async fn create_topic(
        &self,
        topic_name: &str,
        num_partitions: i32,
        replication_factor: i32,
    ) -> Result<(), MessagingError> {
        info!("{:<12} --> Kafka 토픽 생성 시작: {}", "Manager", topic_name);

        let admin_client: AdminClient<DefaultClientContext> = ClientConfig::new()
            .set("bootstrap.servers", &self.brokers)
            .create()?;

        let new_topic = NewTopic::new(
            topic_name,
            num_partitions,
            TopicReplication::Fixed(replication_factor),
        );

        let results = admin_client
            .create_topics(&[new_topic], &AdminOptions::new())
            .await?;

        for result in results {
            match result {
                Ok(topic) => info!("{:<12} --> Kafka 토픽 생성 성공: {}", "Manager", topic),
                Err((topic, RDKafkaErrorCode::TopicAlreadyExists)) => {
                    info!("{:<12} --> Kafka 토픽 이미 존재: {}", "Manager", topic)
                }
                Err((topic, code)) => {
                    error!("{:<12} --> Kafka 토픽 생성 실패: {:?}", "Manager", code);
                    return Err(MessagingError::TopicCreation {
                        topic,
                        reason: code.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

// endregion: --- Kafka Manager
