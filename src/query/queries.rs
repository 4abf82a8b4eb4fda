const AUCTION_COLUMNS: &str = "a.id, a.seller, a.reserve_price, a.image_url, a.auction_end, a.status, a.created_at, a.updated_at, i.make, i.model, i.color, i.mileage, i.year";

/// 경매 목록 조회 (make 오름차순)
pub fn list_auctions(updated_after: bool) -> String {
    let filter = if updated_after {
        " WHERE a.updated_at > $1"
    } else {
        ""
    };
    format!(
        "SELECT {AUCTION_COLUMNS} FROM auctions a JOIN items i ON i.auction_id = a.id{filter} ORDER BY i.make ASC, a.created_at ASC"
    )
}

/// 경매 단건 조회
pub fn get_auction() -> String {
    format!("SELECT {AUCTION_COLUMNS} FROM auctions a JOIN items i ON i.auction_id = a.id WHERE a.id = $1")
}

/// 경매 생성
pub const INSERT_AUCTION: &str = r#"
    INSERT INTO auctions (id, seller, reserve_price, image_url, auction_end, status, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
"#;

/// 차량 정보 생성
pub const INSERT_ITEM: &str = r#"
    INSERT INTO items (id, auction_id, make, model, color, mileage, year)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
"#;

/// 차량 정보 수정
pub const UPDATE_ITEM: &str = r#"
    UPDATE items SET make = $2, model = $3, color = $4, mileage = $5, year = $6
    WHERE auction_id = $1
"#;

/// 경매 수정 시각 갱신
pub const TOUCH_AUCTION: &str = "UPDATE auctions SET updated_at = $2 WHERE id = $1";

/// 경매 삭제 (items 는 cascade)
pub const DELETE_AUCTION: &str = "DELETE FROM auctions WHERE id = $1";

/// 아웃박스 이벤트 기록
pub const INSERT_OUTBOX_EVENT: &str = r#"
    INSERT INTO outbox (id, aggregate_id, event_type, data, created_at)
    VALUES ($1, $2, $3, $4, $5)
"#;

/// 미발행 아웃박스 이벤트 조회
pub const GET_PENDING_EVENTS: &str = r#"
    SELECT id, aggregate_id, event_type, data, created_at
    FROM outbox
    WHERE published_at IS NULL
    ORDER BY seq ASC
    LIMIT $1
"#;

/// 아웃박스 이벤트 발행 완료 표시
pub const MARK_EVENT_PUBLISHED: &str =
    "UPDATE outbox SET published_at = $2 WHERE id = $1 AND published_at IS NULL";
