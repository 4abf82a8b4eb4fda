// region:    --- Imports
use crate::error::AppError;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Entities
/// 경매 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionStatus {
    Live,
    Finished,
    ReserveNotMet,
}

impl AuctionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuctionStatus::Live => "Live",
            AuctionStatus::Finished => "Finished",
            AuctionStatus::ReserveNotMet => "ReserveNotMet",
        }
    }
}

impl fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuctionStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Live" => Ok(AuctionStatus::Live),
            "Finished" => Ok(AuctionStatus::Finished),
            "ReserveNotMet" => Ok(AuctionStatus::ReserveNotMet),
            other => Err(AppError::Internal(format!("unknown auction status: {other}"))),
        }
    }
}

/// 경매 (Item 하나를 소유)
#[derive(Debug, Clone, PartialEq)]
pub struct Auction {
    pub id: Uuid,
    pub seller: String,
    pub reserve_price: i32,
    pub image_url: Option<String>,
    pub auction_end: Option<DateTime<Utc>>,
    pub status: AuctionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub item: Item,
}

/// 차량 정보
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub make: String,
    pub model: String,
    pub color: String,
    pub mileage: i32,
    pub year: i32,
}

/// 저장소 정밀도(마이크로초)에 맞춘 현재 시각
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

impl Auction {
    /// 생성 요청으로부터 새 경매 구성
    pub fn new(input: CreateAuctionDto, seller: &str, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            seller: seller.to_string(),
            reserve_price: input.reserve_price,
            image_url: input.image_url,
            auction_end: input.auction_end.map(|end| end.trunc_subsecs(6)),
            status: AuctionStatus::Live,
            created_at: at,
            updated_at: at,
            item: Item {
                make: input.make,
                model: input.model,
                color: input.color,
                mileage: input.mileage,
                year: input.year,
            },
        }
    }

    /// 부분 수정 병합 (전달되지 않은 필드는 유지)
    pub fn apply_update(&mut self, update: UpdateAuctionDto, at: DateTime<Utc>) {
        let item = &mut self.item;
        if let Some(make) = update.make {
            item.make = make;
        }
        if let Some(model) = update.model {
            item.model = model;
        }
        if let Some(color) = update.color {
            item.color = color;
        }
        if let Some(mileage) = update.mileage {
            item.mileage = mileage;
        }
        if let Some(year) = update.year {
            item.year = year;
        }
        self.touch(at);
    }

    /// updated_at 갱신 (항상 이전 값보다 크게)
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = if at > self.updated_at {
            at
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }
}

// endregion: --- Entities

// region:    --- DTOs
/// 경매 응답 DTO (Auction + Item 평탄화)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionDto {
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

/// 경매 생성 요청
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuctionDto {
    pub make: String,
    pub model: String,
    pub color: String,
    pub mileage: i32,
    pub year: i32,
    #[serde(default)]
    pub reserve_price: i32,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub auction_end: Option<DateTime<Utc>>,
}

/// 경매 수정 요청 (null 과 누락은 동일하게 "변경 없음")
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAuctionDto {
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub mileage: Option<i32>,
    #[serde(default)]
    pub year: Option<i32>,
}

impl From<&Auction> for AuctionDto {
    fn from(auction: &Auction) -> Self {
        Self {
            id: auction.id,
            seller: auction.seller.clone(),
            reserve_price: auction.reserve_price,
            image_url: auction.image_url.clone(),
            auction_end: auction.auction_end,
            status: auction.status,
            created_at: auction.created_at,
            updated_at: auction.updated_at,
            make: auction.item.make.clone(),
            model: auction.item.model.clone(),
            color: auction.item.color.clone(),
            mileage: auction.item.mileage,
            year: auction.item.year,
        }
    }
}

// endregion: --- DTOs
