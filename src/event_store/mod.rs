// region:    --- Imports
use crate::auction::events::AuctionEvent;
use crate::error::AppResult;
use crate::message_broker::EventPublisher;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Outbox Event Model
/// 아웃박스에 기록되는 이벤트 (경매 변경과 같은 트랜잭션에 저장)
#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct OutboxEvent {
    pub id: Uuid,
    pub aggregate_id: Uuid,
    pub event_type: String,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl OutboxEvent {
    /// 도메인 이벤트를 아웃박스 레코드로 변환
    pub fn record(event: &AuctionEvent, at: DateTime<Utc>) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: Uuid::new_v4(),
            aggregate_id: event.auction_id(),
            event_type: event.name().to_string(),
            data: serde_json::to_value(event)?,
            created_at: at,
        })
    }
}

// endregion: --- Outbox Event Model

// region:    --- Event Outbox Trait
/// 아웃박스 저장소 트레이트
#[async_trait]
pub trait EventOutbox: Send + Sync {
    async fn pending_events(&self, limit: i64) -> AppResult<Vec<OutboxEvent>>;
    async fn mark_published(&self, id: Uuid) -> AppResult<bool>;
}

// endregion: --- Event Outbox Trait

// region:    --- Outbox Dispatcher
const FLUSH_BATCH_SIZE: i64 = 100;

/// 아웃박스 이벤트를 브로커로 발행
/// 발행은 항상 아웃박스 순서를 따른다 (핸들러와 릴레이가 같은 잠금 사용)
pub struct OutboxDispatcher {
    outbox: Arc<dyn EventOutbox>,
    publisher: Arc<dyn EventPublisher>,
    topic: String,
    flush_lock: Mutex<()>,
}

impl OutboxDispatcher {
    pub fn new(
        outbox: Arc<dyn EventOutbox>,
        publisher: Arc<dyn EventPublisher>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            outbox,
            publisher,
            topic: topic.into(),
            flush_lock: Mutex::new(()),
        }
    }

    /// 커밋 직후 발행 (실패해도 요청은 성공, 남은 이벤트는 릴레이가 재시도)
    pub async fn publish_committed(&self) {
        if let Err(e) = self.flush_pending().await {
            error!("{:<12} --> 미발행 이벤트 조회 실패: {}", "Outbox", e);
        }
    }

    /// 단건 발행 (호출자가 순서를 보장해야 함)
    async fn dispatch(&self, event: &OutboxEvent) -> bool {
        let key = event.aggregate_id.to_string();
        if let Err(e) = self
            .publisher
            .publish(&self.topic, &key, &event.data.to_string())
            .await
        {
            warn!(
                "{:<12} --> {} 발행 실패, 릴레이 대기: {}",
                "Outbox", event.event_type, e
            );
            return false;
        }

        match self.outbox.mark_published(event.id).await {
            Ok(_) => true,
            Err(e) => {
                warn!("{:<12} --> 발행 완료 표시 실패: {}", "Outbox", e);
                false
            }
        }
    }

    /// 미발행 이벤트 순서대로 발행, 첫 실패에서 중단
    pub async fn flush_pending(&self) -> AppResult<usize> {
        let _guard = self.flush_lock.lock().await;
        let mut published = 0;
        loop {
            let batch = self.outbox.pending_events(FLUSH_BATCH_SIZE).await?;
            let batch_len = batch.len();
            for event in &batch {
                if !self.dispatch(event).await {
                    return Ok(published);
                }
                published += 1;
            }
            if (batch_len as i64) < FLUSH_BATCH_SIZE {
                break;
            }
        }
        if published > 0 {
            info!("{:<12} --> 미발행 이벤트 {}건 발행", "Outbox", published);
        }
        Ok(published)
    }
}

// endregion: --- Outbox Dispatcher
