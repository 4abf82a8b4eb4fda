use auction_search::auction::events::AuctionEvent;
use auction_search::auction::model::AuctionDto;
use auction_search::event_store::OutboxDispatcher;
use auction_search::handlers::{self, AppState};
use auction_search::memory::{InMemoryAuctionStore, InMemorySearchStore, RecordingPublisher};
use auction_search::search::consumer::SearchConsumer;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    store: Arc<InMemoryAuctionStore>,
    publisher: Arc<RecordingPublisher>,
}

/// 메모리 저장소 기반 라우터 구성
fn setup() -> TestApp {
    let store = Arc::new(InMemoryAuctionStore::new());
    let publisher = Arc::new(RecordingPublisher::new());
    let dispatcher = Arc::new(OutboxDispatcher::new(
        store.clone(),
        publisher.clone(),
        "auctions",
    ));
    let router = handlers::router(AppState {
        store: store.clone(),
        dispatcher,
        seller: "test".to_string(),
    });
    TestApp {
        router,
        store,
        publisher,
    }
}

async fn send(app: &TestApp, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Option<String>, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, location, value)
}

fn mustang() -> Value {
    json!({ "make": "Ford", "model": "Mustang", "color": "Red", "mileage": 0, "year": 2024 })
}

async fn create(app: &TestApp, body: Value) -> AuctionDto {
    let (status, _, value) = send(app, "POST", "/api/auctions", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    serde_json::from_value(value).unwrap()
}

/// 생성 → 조회 → 부분 수정 → 삭제 시나리오
#[tokio::test]
async fn test_auction_lifecycle() {
    let app = setup();

    let (status, location, value) = send(&app, "POST", "/api/auctions", Some(mustang())).await;
    assert_eq!(status, StatusCode::CREATED);
    let created: AuctionDto = serde_json::from_value(value).unwrap();
    assert_eq!(location, Some(format!("/api/auctions/{}", created.id)));
    assert_eq!(created.seller, "test");
    assert_eq!(
        (created.make.as_str(), created.model.as_str(), created.color.as_str()),
        ("Ford", "Mustang", "Red")
    );
    assert_eq!((created.mileage, created.year), (0, 2024));

    let uri = format!("/api/auctions/{}", created.id);
    let (status, _, value) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let fetched: AuctionDto = serde_json::from_value(value).unwrap();
    assert_eq!(fetched, created);

    let (status, _, _) = send(&app, "PUT", &uri, Some(json!({ "color": "Blue" }))).await;
    assert_eq!(status, StatusCode::OK);
    let (_, _, value) = send(&app, "GET", &uri, None).await;
    let updated: AuctionDto = serde_json::from_value(value).unwrap();
    assert_eq!(updated.color, "Blue");
    assert_eq!(updated.make, "Ford");
    assert_eq!(updated.model, "Mustang");
    assert!(updated.updated_at > created.updated_at);
    assert_eq!(updated.created_at, created.created_at);

    let (status, _, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _, _) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let names: Vec<&'static str> = app
        .publisher
        .events()
        .await
        .iter()
        .map(AuctionEvent::name)
        .collect();
    assert_eq!(names, vec!["AuctionCreated", "AuctionUpdated", "AuctionDeleted"]);
    assert!(app.store.outbox().await.iter().all(|(_, published)| *published));
}

/// 생성 이벤트는 DTO 전체를 담는다
#[tokio::test]
async fn test_created_event_carries_dto() {
    let app = setup();
    let created = create(&app, mustang()).await;

    let messages = app.publisher.messages().await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].topic, "auctions");
    assert_eq!(messages[0].key, created.id.to_string());

    match &app.publisher.events().await[0] {
        AuctionEvent::AuctionCreated(event) => {
            assert_eq!(event.id, created.id);
            assert_eq!(event.model, "Mustang");
            assert_eq!(event.created_at, created.created_at);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

/// 같은 부분 수정을 두 번 적용해도 필드 결과는 동일
#[tokio::test]
async fn test_partial_update_is_idempotent() {
    let app = setup();
    let created = create(&app, mustang()).await;
    let uri = format!("/api/auctions/{}", created.id);
    let update = json!({ "mileage": 1500, "model": null });

    send(&app, "PUT", &uri, Some(update.clone())).await;
    let (_, _, once) = send(&app, "GET", &uri, None).await;
    send(&app, "PUT", &uri, Some(update)).await;
    let (_, _, twice) = send(&app, "GET", &uri, None).await;

    for field in ["make", "model", "color", "mileage", "year"] {
        assert_eq!(once[field], twice[field], "field {field}");
    }
    assert_eq!(twice["mileage"], 1500);
    assert_eq!(twice["model"], "Mustang");
}

/// 목록은 make 오름차순, date 필터는 updatedAt 초과만 반환
#[tokio::test]
async fn test_list_ordering_and_date_filter() {
    let app = setup();
    let toyota = create(&app, json!({ "make": "Toyota", "model": "Supra", "color": "White", "mileage": 10, "year": 1998 })).await;
    let audi = create(&app, json!({ "make": "Audi", "model": "R8", "color": "Black", "mileage": 5, "year": 2021 })).await;
    let ford = create(&app, mustang()).await;

    let (status, _, value) = send(&app, "GET", "/api/auctions", None).await;
    assert_eq!(status, StatusCode::OK);
    let makes: Vec<String> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["make"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(makes, vec!["Audi", "Ford", "Toyota"]);

    let (_, _, value) = send(&app, "GET", "/api/auctions?date=", None).await;
    assert_eq!(value.as_array().unwrap().len(), 3);

    // toyota 를 가장 최근 수정으로 만든다
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    send(
        &app,
        "PUT",
        &format!("/api/auctions/{}", toyota.id),
        Some(json!({ "color": "Silver" })),
    )
    .await;
    let (_, _, value) = send(&app, "GET", &format!("/api/auctions/{}", toyota.id), None).await;
    let toyota: AuctionDto = serde_json::from_value(value).unwrap();

    let cutoff = audi.updated_at.max(ford.updated_at).to_rfc3339();
    let uri = format!("/api/auctions?date={}", cutoff.replace('+', "%2B"));
    let (status, _, value) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<String> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec![toyota.id.to_string()]);

    let exact = toyota.updated_at.to_rfc3339().replace('+', "%2B");
    let (_, _, value) = send(&app, "GET", &format!("/api/auctions?date={exact}"), None).await;
    assert!(value.as_array().unwrap().is_empty());
}

/// 잘못된 날짜는 400
#[tokio::test]
async fn test_invalid_date_filter_is_rejected() {
    let app = setup();
    let (status, _, value) = send(&app, "GET", "/api/auctions?date=not-a-date", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(value["error"].as_str().unwrap().contains("not-a-date"));
}

/// 없는 경매는 404
#[tokio::test]
async fn test_missing_auction_is_not_found() {
    let app = setup();
    let uri = format!("/api/auctions/{}", uuid::Uuid::new_v4());

    let (status, _, _) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, _) = send(&app, "PUT", &uri, Some(json!({ "color": "Blue" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert!(app.publisher.messages().await.is_empty());
}

/// 저장 결과가 0건이면 400, 이벤트도 기록되지 않는다
#[tokio::test]
async fn test_failed_save_is_bad_request() {
    let app = setup();
    let created = create(&app, mustang()).await;
    let uri = format!("/api/auctions/{}", created.id);
    app.store.reject_writes(true);

    let (status, _, value) = send(&app, "POST", "/api/auctions", Some(mustang())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["error"], "Could not save changes to the Database");

    let (status, _, value) = send(&app, "PUT", &uri, Some(json!({ "year": 2000 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["error"], "Problem saving changes");

    let (status, _, value) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["error"], "Could not update database");

    assert_eq!(app.store.outbox().await.len(), 1);
    assert_eq!(app.publisher.messages().await.len(), 1);

    app.store.reject_writes(false);
    let (status, _, value) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["year"], 2024);
}

/// 발행 실패 후에도 이벤트는 아웃박스 순서대로 나가고 검색 문서가 남지 않는다
#[tokio::test]
async fn test_events_keep_order_after_publish_failure() {
    let app = setup();
    app.publisher.fail_next(1);

    let created = create(&app, mustang()).await;
    assert!(app.publisher.messages().await.is_empty());

    let (status, _, _) = send(&app, "DELETE", &format!("/api/auctions/{}", created.id), None).await;
    assert_eq!(status, StatusCode::OK);

    let events = app.publisher.events().await;
    let names: Vec<&str> = events.iter().map(AuctionEvent::name).collect();
    assert_eq!(names, vec!["AuctionCreated", "AuctionDeleted"]);
    assert!(events.iter().all(|e| e.auction_id() == created.id));
    assert!(app
        .store
        .outbox()
        .await
        .iter()
        .all(|(_, published)| *published));

    let search_store = Arc::new(InMemorySearchStore::new());
    let consumer = SearchConsumer::new(search_store.clone());
    for event in events {
        consumer.handle(event).await.unwrap();
    }
    assert!(search_store.get(created.id).await.is_none());
    assert!(search_store.is_empty().await);
}
