//! MongoDB 검색 문서 저장소

use super::model::SearchDocument;
use crate::error::SearchError;
use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::{Client, Collection, Database};
use tracing::info;
use uuid::Uuid;

/// 검색 문서 저장소 트레이트
#[async_trait]
pub trait SearchStore: Send + Sync {
    /// 문서 생성 또는 교체 (재전송에도 결과 동일)
    async fn upsert(&self, document: &SearchDocument) -> Result<(), SearchError>;
    /// 기존 문서만 교체, 없으면 false
    async fn replace_existing(&self, document: &SearchDocument) -> Result<bool, SearchError>;
    /// 문서 삭제, 없으면 false
    async fn remove(&self, id: Uuid) -> Result<bool, SearchError>;
}

pub struct MongoSearchStore {
    collection: Collection<SearchDocument>,
}

impl MongoSearchStore {
    pub const COLLECTION: &'static str = "items";

    pub fn new(db: Database) -> Self {
        Self {
            collection: db.collection::<SearchDocument>(Self::COLLECTION),
        }
    }

    /// 연결 후 저장소 생성
    pub async fn connect(url: &str, database: &str) -> Result<Self, SearchError> {
        let client = Client::with_uri_str(url).await?;
        info!("{:<12} --> MongoDB 연결: {}", "Search", database);
        Ok(Self::new(client.database(database)))
    }
}

#[async_trait]
impl SearchStore for MongoSearchStore {
    async fn upsert(&self, document: &SearchDocument) -> Result<(), SearchError> {
        self.collection
            .replace_one(doc! { "_id": document.id.as_str() }, document)
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn replace_existing(&self, document: &SearchDocument) -> Result<bool, SearchError> {
        let result = self
            .collection
            .replace_one(doc! { "_id": document.id.as_str() }, document)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn remove(&self, id: Uuid) -> Result<bool, SearchError> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id.to_string() })
            .await?;
        Ok(result.deleted_count > 0)
    }
}
