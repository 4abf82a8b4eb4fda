use crate::auction::events::{AuctionCreated, AuctionUpdated};
use crate::auction::model::AuctionStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// 검색용 문서 (경매 id 를 키로 사용)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub seller: String,
    pub reserve_price: i32,
    pub image_url: Option<String>,
    pub auction_end: Option<DateTime<Utc>>,
    pub status: AuctionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub make: String,
    pub model: String,
    pub color: String,
    pub mileage: i32,
    pub year: i32,
}

impl From<&AuctionCreated> for SearchDocument {
    fn from(event: &AuctionCreated) -> Self {
        Self {
            id: event.id.to_string(),
            seller: event.seller.clone(),
            reserve_price: event.reserve_price,
            image_url: event.image_url.clone(),
            auction_end: event.auction_end,
            status: event.status,
            created_at: event.created_at,
            updated_at: event.updated_at,
            make: event.make.clone(),
            model: event.model.clone(),
            color: event.color.clone(),
            mileage: event.mileage,
            year: event.year,
        }
    }
}

impl From<&AuctionUpdated> for SearchDocument {
    fn from(event: &AuctionUpdated) -> Self {
        Self {
            id: event.id.to_string(),
            seller: event.seller.clone(),
            reserve_price: event.reserve_price,
            image_url: event.image_url.clone(),
            auction_end: event.auction_end,
            status: event.status,
            created_at: event.created_at,
            updated_at: event.updated_at,
            make: event.make.clone(),
            model: event.model.clone(),
            color: event.color.clone(),
            mileage: event.mileage,
            year: event.year,
        }
    }
}
