use super::model::{AuctionDto, AuctionStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// 경매 이벤트 (eventType 으로 구분)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "eventType", content = "message")]
pub enum AuctionEvent {
    AuctionCreated(AuctionCreated),
    AuctionUpdated(AuctionUpdated),
    AuctionDeleted(AuctionDeleted),
}

impl AuctionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AuctionEvent::AuctionCreated(_) => "AuctionCreated",
            AuctionEvent::AuctionUpdated(_) => "AuctionUpdated",
            AuctionEvent::AuctionDeleted(_) => "AuctionDeleted",
        }
    }

    pub fn auction_id(&self) -> Uuid {
        match self {
            AuctionEvent::AuctionCreated(e) => e.id,
            AuctionEvent::AuctionUpdated(e) => e.id,
            AuctionEvent::AuctionDeleted(e) => e.id,
        }
    }
}

// 경매 생성 이벤트
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuctionCreated {
    pub id: Uuid,
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

// 경매 수정 이벤트
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuctionUpdated {
    pub id: Uuid,
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

// 경매 삭제 이벤트
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuctionDeleted {
    pub id: Uuid,
}

impl From<&AuctionDto> for AuctionCreated {
    fn from(dto: &AuctionDto) -> Self {
        Self {
            id: dto.id,
            seller: dto.seller.clone(),
            reserve_price: dto.reserve_price,
            image_url: dto.image_url.clone(),
            auction_end: dto.auction_end,
            status: dto.status,
            created_at: dto.created_at,
            updated_at: dto.updated_at,
            make: dto.make.clone(),
            model: dto.model.clone(),
            color: dto.color.clone(),
            mileage: dto.mileage,
            year: dto.year,
        }
    }
}

impl From<&AuctionDto> for AuctionUpdated {
    fn from(dto: &AuctionDto) -> Self {
        Self {
            id: dto.id,
            seller: dto.seller.clone(),
            reserve_price: dto.reserve_price,
            image_url: dto.image_url.clone(),
            auction_end: dto.auction_end,
            status: dto.status,
            created_at: dto.created_at,
            updated_at: dto.updated_at,
            make: dto.make.clone(),
            model: dto.model.clone(),
            color: dto.color.clone(),
            mileage: dto.mileage,
            year: dto.year,
        }
    }
}
