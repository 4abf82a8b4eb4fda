// region:    --- Imports
use super::model::SearchDocument;
use super::store::SearchStore;
use crate::auction::events::{AuctionCreated, AuctionDeleted, AuctionEvent, AuctionUpdated};
use crate::error::SearchError;
use std::sync::Arc;
use tracing::{error, info, warn};

// endregion: --- Imports

/// 이 모델명의 생성 이벤트는 저장하지 않고 실패시킨다 (재전송/데드레터 검증용)
pub const POISON_MODEL: &str = "Foo";

// region:    --- Search Consumer
/// 경매 이벤트를 검색 문서로 반영
#[derive(Clone)]
pub struct SearchConsumer {
    store: Arc<dyn SearchStore>,
}

impl SearchConsumer {
    pub fn new(store: Arc<dyn SearchStore>) -> Self {
        Self { store }
    }

    /// 이벤트 처리
    pub async fn handle(&self, event: AuctionEvent) -> Result<(), SearchError> {
        match event {
            AuctionEvent::AuctionCreated(created) => self.on_created(&created).await,
            AuctionEvent::AuctionUpdated(updated) => self.on_updated(&updated).await,
            AuctionEvent::AuctionDeleted(deleted) => self.on_deleted(&deleted).await,
        }
    }

    async fn on_created(&self, event: &AuctionCreated) -> Result<(), SearchError> {
        info!("{:<12} --> 경매 생성 이벤트 소비: {}", "Search", event.id);
        let document = SearchDocument::from(event);

        if document.model == POISON_MODEL {
            error!("{:<12} --> 거부된 모델명: {}", "Search", document.model);
            return Err(SearchError::Poison(document.model));
        }

        self.store.upsert(&document).await
    }

    async fn on_updated(&self, event: &AuctionUpdated) -> Result<(), SearchError> {
        info!("{:<12} --> 경매 수정 이벤트 소비: {}", "Search", event.id);
        let document = SearchDocument::from(event);
        if !self.store.replace_existing(&document).await? {
            warn!("{:<12} --> 수정 대상 문서 없음: {}", "Search", event.id);
        }
        Ok(())
    }

    async fn on_deleted(&self, event: &AuctionDeleted) -> Result<(), SearchError> {
        info!("{:<12} --> 경매 삭제 이벤트 소비: {}", "Search", event.id);
        if !self.store.remove(event.id).await? {
            warn!("{:<12} --> 삭제 대상 문서 없음: {}", "Search", event.id);
        }
        Ok(())
    }
}

// endregion: --- Search Consumer
