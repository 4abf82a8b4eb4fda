//! 프로세스 내부 구현 (테스트용)
//! 외부 저장소/브로커 없이 같은 트레이트를 만족한다.

// region:    --- Imports
use crate::auction::events::AuctionEvent;
use crate::auction::model::Auction;
use crate::auction::store::AuctionStore;
use crate::error::{AppResult, MessagingError, SearchError};
use crate::event_store::{EventOutbox, OutboxEvent};
use crate::message_broker::EventPublisher;
use crate::search::model::SearchDocument;
use crate::search::store::SearchStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rdkafka::error::KafkaError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Auction Store
#[derive(Default)]
struct StoreState {
    auctions: HashMap<Uuid, Auction>,
    outbox: Vec<(OutboxEvent, bool)>,
}

/// 메모리 경매 저장소 (아웃박스 포함)
#[derive(Default)]
pub struct InMemoryAuctionStore {
    state: Mutex<StoreState>,
    reject_writes: AtomicBool,
}

impl InMemoryAuctionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 이후 쓰기가 0건 반영되도록 설정 (저장 실패 재현)
    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// 아웃박스에 직접 이벤트 추가
    pub async fn push_outbox(&self, event: OutboxEvent) {
        self.state.lock().await.outbox.push((event, false));
    }

    /// 아웃박스 전체 (발행 여부 포함)
    pub async fn outbox(&self) -> Vec<(OutboxEvent, bool)> {
        self.state.lock().await.outbox.clone()
    }

    fn rejecting(&self) -> bool {
        self.reject_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuctionStore for InMemoryAuctionStore {
    async fn list(&self, updated_after: Option<DateTime<Utc>>) -> AppResult<Vec<Auction>> {
        let state = self.state.lock().await;
        let mut auctions: Vec<Auction> = state
            .auctions
            .values()
            .filter(|a| updated_after.map_or(true, |after| a.updated_at > after))
            .cloned()
            .collect();
        auctions.sort_by(|a, b| {
            a.item
                .make
                .cmp(&b.item.make)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(auctions)
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<Auction>> {
        Ok(self.state.lock().await.auctions.get(&id).cloned())
    }

    async fn insert(&self, auction: &Auction, event: &OutboxEvent) -> AppResult<u64> {
        if self.rejecting() {
            return Ok(0);
        }
        let mut state = self.state.lock().await;
        state.auctions.insert(auction.id, auction.clone());
        state.outbox.push((event.clone(), false));
        Ok(1)
    }

    async fn update(&self, auction: &Auction, event: &OutboxEvent) -> AppResult<u64> {
        if self.rejecting() {
            return Ok(0);
        }
        let mut state = self.state.lock().await;
        match state.auctions.get_mut(&auction.id) {
            Some(existing) => {
                *existing = auction.clone();
                state.outbox.push((event.clone(), false));
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: Uuid, event: &OutboxEvent) -> AppResult<u64> {
        if self.rejecting() {
            return Ok(0);
        }
        let mut state = self.state.lock().await;
        match state.auctions.remove(&id) {
            Some(_) => {
                state.outbox.push((event.clone(), false));
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[async_trait]
impl EventOutbox for InMemoryAuctionStore {
    async fn pending_events(&self, limit: i64) -> AppResult<Vec<OutboxEvent>> {
        let state = self.state.lock().await;
        Ok(state
            .outbox
            .iter()
            .filter(|(_, published)| !published)
            .take(limit.max(0) as usize)
            .map(|(event, _)| event.clone())
            .collect())
    }

    async fn mark_published(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        match state
            .outbox
            .iter_mut()
            .find(|(event, published)| event.id == id && !published)
        {
            Some(entry) => {
                entry.1 = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// endregion: --- Auction Store

// region:    --- Publisher
/// 발행된 메시지
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub topic: String,
    pub key: String,
    pub payload: String,
}

/// 발행 메시지를 기록하는 퍼블리셔
#[derive(Default)]
pub struct RecordingPublisher {
    messages: Mutex<Vec<PublishedMessage>>,
    failures: AtomicU32,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 다음 n번의 발행을 실패시킨다 (브로커 장애 재현)
    pub fn fail_next(&self, n: u32) {
        self.failures.store(n, Ordering::SeqCst);
    }

    pub async fn messages(&self) -> Vec<PublishedMessage> {
        self.messages.lock().await.clone()
    }

    /// 기록된 메시지를 경매 이벤트로 디코딩
    pub async fn events(&self) -> Vec<AuctionEvent> {
        self.messages
            .lock()
            .await
            .iter()
            .filter_map(|m| serde_json::from_str(&m.payload).ok())
            .collect()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, topic: &str, key: &str, payload: &str) -> Result<(), MessagingError> {
        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(MessagingError::Kafka(KafkaError::Canceled));
        }
        self.messages.lock().await.push(PublishedMessage {
            topic: topic.to_string(),
            key: key.to_string(),
            payload: payload.to_string(),
        });
        Ok(())
    }
}

// endregion: --- Publisher

// region:    --- Search Store
/// 메모리 검색 문서 저장소
#[derive(Default)]
pub struct InMemorySearchStore {
    documents: Mutex<HashMap<String, SearchDocument>>,
}

impl InMemorySearchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: Uuid) -> Option<SearchDocument> {
        self.documents.lock().await.get(&id.to_string()).cloned()
    }

    pub async fn len(&self) -> usize {
        self.documents.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SearchStore for InMemorySearchStore {
    async fn upsert(&self, document: &SearchDocument) -> Result<(), SearchError> {
        self.documents
            .lock()
            .await
            .insert(document.id.clone(), document.clone());
        Ok(())
    }

    async fn replace_existing(&self, document: &SearchDocument) -> Result<bool, SearchError> {
        let mut documents = self.documents.lock().await;
        match documents.get_mut(&document.id) {
            Some(existing) => {
                *existing = document.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, id: Uuid) -> Result<bool, SearchError> {
        Ok(self.documents.lock().await.remove(&id.to_string()).is_some())
    }
}

// endregion: --- Search Store
