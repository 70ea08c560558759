use auction_core::auction::model::{Auction, ChatMessage, User};
use auction_core::auth::{AuthProvider, MemoryAuth};
use auction_core::error::AuctionError;
use auction_core::query::ViewContext;
use auction_core::service::{AuctionService, NewAuction, ServiceConfig};
use auction_core::store::memory::MemoryStore;
use auction_core::store::{paths, DocumentStore, Precondition, StoreError, WriteBatch};
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// 트레이싱 초기화
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .with_test_writer()
        .try_init();
}

/// 테스트 환경 구성
fn setup() -> (Arc<MemoryStore>, Arc<MemoryAuth>, AuctionService) {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let auth = Arc::new(MemoryAuth::new());
    let service = AuctionService::new(
        Arc::clone(&store) as Arc<dyn DocumentStore>,
        Arc::clone(&auth) as Arc<dyn AuthProvider>,
        ServiceConfig::default(),
    );
    (store, auth, service)
}

/// 조건이 충족될 때까지 대기 (최대 1초)
async fn eventually<F: Fn() -> bool>(cond: F, what: &str) {
    for _ in 0..100 {
        if cond() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("제한 시간 내 조건 미충족: {what}");
}

/// 테스트용 경매 생성
async fn create_test_auction(
    store: &Arc<MemoryStore>,
    title: &str,
    category: &str,
    price: i64,
    created_by: &str,
) -> String {
    let id = store.create_id();
    let auction = json!({
        "title": title,
        "description": format!("{title} 테스트용 설명입니다."),
        "category": category,
        "endDate": Utc::now() + Duration::days(7),
        "startingPrice": price,
        "currentPrice": price,
        "isActive": true,
        "createdBy": created_by,
    });
    let mut batch = WriteBatch::new();
    batch.set(paths::AUCTIONS, &id, auction);
    store.commit(batch).await.expect("테스트 경매 생성 실패");
    id
}

/// 테스트용 사용자 생성
async fn create_test_user(
    store: &Arc<MemoryStore>,
    id: &str,
    first_name: Option<&str>,
    last_name: Option<&str>,
    profile_pic_url: &str,
    balance: i64,
) {
    let mut user = json!({
        "userId": id,
        "profilePicUrl": profile_pic_url,
        "balance": balance,
    });
    if let Some(first_name) = first_name {
        user["firstName"] = json!(first_name);
    }
    if let Some(last_name) = last_name {
        user["lastName"] = json!(last_name);
    }
    let mut batch = WriteBatch::new();
    batch.set(paths::USERS, id, user);
    store.commit(batch).await.expect("테스트 사용자 생성 실패");
}

/// 저장소에서 경매 문서 조회
async fn get_auction(store: &Arc<MemoryStore>, id: &str) -> Auction {
    let doc = store
        .get(paths::AUCTIONS, id)
        .await
        .expect("경매 조회 실패")
        .expect("경매 문서 없음");
    Auction::from_document(doc).expect("경매 역직렬화 실패")
}

/// 경매의 입찰 기록 수 조회
async fn count_bids(store: &Arc<MemoryStore>, auction_id: &str) -> usize {
    store
        .list(&paths::bids(auction_id))
        .await
        .expect("입찰 조회 실패")
        .len()
}

fn bid_fields(amount: i64, bidder: &str) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("currentPrice".to_string(), Value::from(amount));
    fields.insert("highestBidderId".to_string(), Value::from(bidder));
    fields
}

/// 입찰 테스트
#[tokio::test]
async fn test_place_bid() {
    let (store, _auth, service) = setup();
    create_test_user(&store, "bidder-1", Some("Jane"), Some("Doe"), "", 100_000).await;
    let auction_id =
        create_test_auction(&store, "입찰 테스트 경매", "Electronics", 10_000, "seller-1").await;

    let accepted = service
        .place_bid(&auction_id, Some(11_000), "bidder-1")
        .await
        .expect("입찰 처리 실패");
    assert!(accepted);

    let auction = get_auction(&store, &auction_id).await;
    assert_eq!(auction.current_price, 11_000);
    assert_eq!(auction.highest_bidder_id.as_deref(), Some("bidder-1"));
    assert_eq!(count_bids(&store, &auction_id).await, 1);
}

/// 연속 입찰 시 가격 단조 증가 테스트
#[tokio::test]
async fn test_sequential_bids_monotonic() {
    let (store, _auth, service) = setup();
    create_test_user(&store, "bidder-1", Some("Jane"), None, "", 100_000).await;
    create_test_user(&store, "bidder-2", Some("John"), None, "", 100_000).await;
    let auction_id =
        create_test_auction(&store, "단조 증가 테스트 경매", "Books", 10_000, "seller-1").await;

    assert!(service
        .place_bid(&auction_id, Some(11_000), "bidder-1")
        .await
        .expect("첫 입찰 실패"));
    let price_after_first = get_auction(&store, &auction_id).await.current_price;

    assert!(service
        .place_bid(&auction_id, Some(12_000), "bidder-2")
        .await
        .expect("두 번째 입찰 실패"));
    let price_after_second = get_auction(&store, &auction_id).await.current_price;

    assert!(price_after_second >= price_after_first);
    assert_eq!(price_after_second, 12_000);
    assert_eq!(count_bids(&store, &auction_id).await, 2);
}

/// 낮은 입찰 거부 테스트: 경매와 원장이 그대로여야 한다
#[tokio::test]
async fn test_low_bid_rejected_without_mutation() {
    let (store, _auth, service) = setup();
    create_test_user(&store, "bidder-1", Some("Jane"), Some("Doe"), "", 100_000).await;
    let auction_id =
        create_test_auction(&store, "거부 테스트 경매", "Books", 10_000, "seller-1").await;

    let err = service
        .place_bid(&auction_id, Some(10_000), "bidder-1")
        .await
        .expect_err("현재 가격 이하의 입찰은 거부되어야 한다");
    assert!(matches!(
        err,
        AuctionError::BidTooLow {
            current_price: 10_000
        }
    ));

    let err = service
        .place_bid(&auction_id, None, "bidder-1")
        .await
        .expect_err("금액 없는 입찰은 거부되어야 한다");
    assert!(matches!(err, AuctionError::AmountMissing));

    let auction = get_auction(&store, &auction_id).await;
    assert_eq!(auction.current_price, 10_000);
    assert!(auction.highest_bidder_id.is_none());
    assert_eq!(count_bids(&store, &auction_id).await, 0);
}

/// 잔액 부족 거부 테스트
#[tokio::test]
async fn test_insufficient_balance() {
    let (store, _auth, service) = setup();
    create_test_user(&store, "poor-bidder", Some("Jane"), Some("Doe"), "", 50).await;
    let auction_id =
        create_test_auction(&store, "잔액 테스트 경매", "Books", 100, "seller-1").await;

    let err = service
        .place_bid(&auction_id, Some(120), "poor-bidder")
        .await
        .expect_err("잔액이 부족하면 거부되어야 한다");
    assert!(matches!(
        err,
        AuctionError::InsufficientBalance {
            balance: 50,
            amount: 120
        }
    ));

    let auction = get_auction(&store, &auction_id).await;
    assert_eq!(auction.current_price, 100);
    assert_eq!(count_bids(&store, &auction_id).await, 0);
}

/// 커밋 내부 재검증 테스트
/// 오래된 가격으로 검증된 배치는 커밋에서 거부되고 아무것도 적용되지 않는다
#[tokio::test]
async fn test_stale_commit_rejected_atomically() {
    let (store, _auth, _service) = setup();
    let auction_id =
        create_test_auction(&store, "재검증 테스트 경매", "Books", 100, "seller-1").await;

    // 첫 번째 커밋: 100 -> 120
    let mut first = WriteBatch::new();
    first.update(
        paths::AUCTIONS,
        &auction_id,
        bid_fields(120, "user-a"),
        Some(Precondition::field_less_than("currentPrice", 120)),
    );
    first.set(
        &paths::bids(&auction_id),
        "bid-a",
        json!({"id": "bid-a", "userId": "user-a", "amount": 120, "timestamp": Utc::now()}),
    );
    store.commit(first).await.expect("첫 커밋 실패");

    // 두 번째 커밋: 가격 100 을 보고 검증된 110 — 커밋 내부 재검증에서 거부
    let mut second = WriteBatch::new();
    second.update(
        paths::AUCTIONS,
        &auction_id,
        bid_fields(110, "user-b"),
        Some(Precondition::field_less_than("currentPrice", 110)),
    );
    second.set(
        &paths::bids(&auction_id),
        "bid-b",
        json!({"id": "bid-b", "userId": "user-b", "amount": 110, "timestamp": Utc::now()}),
    );
    let err = store
        .commit(second)
        .await
        .expect_err("경합에서 진 커밋은 거부되어야 한다");
    assert!(matches!(err, StoreError::Conflict(_)));

    // 진 쪽의 쓰기는 입찰 기록까지 포함해 전부 버려져야 한다
    let auction = get_auction(&store, &auction_id).await;
    assert_eq!(auction.current_price, 120);
    assert_eq!(auction.highest_bidder_id.as_deref(), Some("user-a"));
    assert_eq!(count_bids(&store, &auction_id).await, 1);
}

/// 동시성 입찰 테스트
#[tokio::test]
async fn test_concurrent_bidding() {
    let (store, _auth, service) = setup();
    let auction_id =
        create_test_auction(&store, "동시성 입찰 테스트 경매", "Electronics", 10_000, "seller-1")
            .await;
    for i in 1..=20 {
        create_test_user(&store, &format!("bidder-{i}"), Some("Bidder"), None, "", 1_000_000)
            .await;
    }

    let service = Arc::new(service);
    let mut handles = vec![];
    for i in 1i64..=20 {
        let service = Arc::clone(&service);
        let auction_id = auction_id.clone();
        handles.push(tokio::spawn(async move {
            service
                .place_bid(&auction_id, Some(10_000 + i * 1_000), &format!("bidder-{i}"))
                .await
        }));
    }

    let mut accepted = 0usize;
    for handle in handles {
        match handle.await.expect("태스크 합류 실패") {
            Ok(true) => accepted += 1,
            Ok(false) => {}
            Err(AuctionError::BidTooLow { .. }) => {}
            Err(e) => panic!("예상치 못한 오류: {e}"),
        }
    }

    // 최고 금액 입찰은 어떤 순서로 끼어들어도 최종적으로 이긴다
    let auction = get_auction(&store, &auction_id).await;
    assert_eq!(auction.current_price, 30_000);
    assert_eq!(auction.highest_bidder_id.as_deref(), Some("bidder-20"));
    assert!(accepted >= 1);
    assert_eq!(count_bids(&store, &auction_id).await, accepted);
}

/// 카테고리 + 검색 결합 필터 테스트
#[tokio::test]
async fn test_filter_and_search() {
    let (store, _auth, service) = setup();
    create_test_auction(&store, "Gaming Laptop", "Electronics", 1_400, "seller-1").await;
    create_test_auction(&store, "Vintage Book", "Books", 90, "seller-2").await;
    eventually(|| service.get_all_auctions().len() == 2, "경매 캐시 동기화").await;

    service.select_filter("Electronics").await;
    service.search_auctions("lap").await;
    let filtered = service.filtered_auctions().borrow().clone();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].title, "Gaming Laptop");

    // 필터 해제 시 전체 복귀
    service.select_filter("All").await;
    service.search_auctions("").await;
    assert_eq!(service.filtered_auctions().borrow().len(), 2);

    // 검색은 대소문자를 무시한다
    service.search_auctions("VINTAGE").await;
    let filtered = service.filtered_auctions().borrow().clone();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].title, "Vintage Book");
}

/// 소유 범위 필터와 사용자 캐시 초기화 테스트
#[tokio::test]
async fn test_view_context_and_identity_cache() {
    let (store, auth, service) = setup();
    auth.sign_in("user-a");
    let mine = create_test_auction(&store, "내 경매", "Books", 100, "user-a").await;
    create_test_auction(&store, "남의 경매", "Books", 100, "user-b").await;
    eventually(|| service.get_all_auctions().len() == 2, "경매 캐시 동기화").await;

    service.set_view_context(ViewContext::MyAuctions).await;
    let filtered = service.filtered_auctions().borrow().clone();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, mine);

    let my_auctions = service.get_my_auctions().await;
    assert_eq!(my_auctions.len(), 1);
    assert_eq!(my_auctions[0].id, mine);

    // 로그아웃하면 캐시된 식별자가 초기화된다
    auth.sign_out();
    let mut cleared = false;
    for _ in 0..100 {
        if service.current_user_id().await.is_none() {
            cleared = true;
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert!(cleared, "로그아웃 후에도 캐시된 식별자가 남아 있다");

    service.set_view_context(ViewContext::MyAuctions).await;
    assert!(service.filtered_auctions().borrow().is_empty());
}

/// 빈 채팅 메시지 무시 테스트
#[tokio::test]
async fn test_empty_chat_message_noop() {
    let (store, _auth, service) = setup();
    let auction_id = create_test_auction(&store, "채팅 테스트 경매", "Books", 100, "seller-1").await;
    let chat_col = paths::chat(&auction_id);

    service
        .send_message(&auction_id, "   ", "user-1")
        .await
        .expect("빈 메시지는 오류 없이 무시되어야 한다");
    assert!(store.list(&chat_col).await.expect("채팅 조회 실패").is_empty());

    service
        .send_message(&auction_id, "  첫 메시지입니다  ", "user-1")
        .await
        .expect("메시지 전송 실패");
    let docs = store.list(&chat_col).await.expect("채팅 조회 실패");
    assert_eq!(docs.len(), 1);
    let message: ChatMessage =
        serde_json::from_value(docs[0].data.clone()).expect("채팅 역직렬화 실패");
    assert_eq!(message.message, "첫 메시지입니다");
    assert_eq!(message.sender_user_id, "user-1");
    assert!(!message.message_id.is_empty());
}

/// 채팅 피드 보강과 정렬 테스트
#[tokio::test]
async fn test_chat_feed_enrichment() {
    let (store, _auth, service) = setup();
    let auction_id = create_test_auction(&store, "채팅 보강 경매", "Books", 100, "seller-1").await;
    create_test_user(
        &store,
        "chatter-1",
        Some("Minji"),
        Some("Kim"),
        "https://img.example/minji.jpg",
        0,
    )
    .await;

    service
        .send_message(&auction_id, "안녕하세요", "chatter-1")
        .await
        .expect("메시지 전송 실패");
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    // 사용자 문서가 없는 발신자
    service
        .send_message(&auction_id, "hello", "ghost")
        .await
        .expect("메시지 전송 실패");

    let feed = service.chat().subscribe(&auction_id);
    eventually(
        || feed.latest().is_some_and(|messages| messages.len() == 2),
        "채팅 피드 발행",
    )
    .await;

    let messages = feed.latest().expect("채팅 피드 값 없음");
    // 최신 메시지가 먼저 온다
    assert_eq!(messages[0].sender_user_id, "ghost");
    assert_eq!(messages[0].display_name.as_deref(), Some("Anonymous"));
    assert_eq!(
        messages[0].profile_pic_url.as_deref(),
        Some("/assets/images/profile-pic.jpg")
    );
    assert_eq!(messages[1].display_name.as_deref(), Some("Minji Kim"));
    assert_eq!(
        messages[1].profile_pic_url.as_deref(),
        Some("https://img.example/minji.jpg")
    );
}

/// 입찰 원장 정렬과 보강 테스트
#[tokio::test]
async fn test_bid_ledger_sorted_and_enriched() {
    let (store, _auth, service) = setup();
    let auction_id = create_test_auction(&store, "원장 테스트 경매", "Books", 10_000, "seller-1").await;
    create_test_user(&store, "alice", Some("Alice"), None, "", 1_000_000).await;
    create_test_user(&store, "bob", Some("Bob"), Some("Lee"), "", 1_000_000).await;

    assert!(service
        .place_bid(&auction_id, Some(11_000), "alice")
        .await
        .expect("입찰 실패"));
    assert!(service
        .place_bid(&auction_id, Some(12_000), "bob")
        .await
        .expect("입찰 실패"));

    let feed = service.ledger().subscribe(&auction_id);
    eventually(
        || feed.latest().is_some_and(|bids| bids.len() == 2),
        "입찰 피드 발행",
    )
    .await;

    let bids = feed.latest().expect("입찰 피드 값 없음");
    // 금액 내림차순
    assert_eq!(bids[0].amount, 12_000);
    assert_eq!(bids[0].display_name.as_deref(), Some("Bob Lee"));
    assert_eq!(bids[1].amount, 11_000);
    // 성만 있는 사용자는 이름만 표시한다
    assert_eq!(bids[1].display_name.as_deref(), Some("Alice"));
    assert_eq!(
        bids[1].profile_pic_url.as_deref(),
        Some("/assets/images/profile-pic.jpg")
    );
}

/// 상세 결합 피드 테스트
/// 세 구성 요소가 모두 준비되기 전에는 발행하지 않고,
/// 이후에는 어떤 변경이든 나머지 최신 상태와 함께 재발행한다
#[tokio::test]
async fn test_detail_aggregator() {
    let (store, _auth, service) = setup();
    let auction_id = store.create_id();

    // 경매 문서가 아직 없으므로 발행되지 않아야 한다
    let feed = service.get_auction_with_bids_and_chats(&auction_id);
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert!(feed.latest().is_none());

    // 경매 문서가 생기면 첫 발행
    let auction = json!({
        "title": "상세 테스트 경매",
        "description": "상세 결합 피드 테스트용 경매입니다.",
        "category": "Electronics",
        "endDate": Utc::now() + Duration::days(3),
        "startingPrice": 10_000,
        "currentPrice": 10_000,
        "isActive": true,
        "createdBy": "seller-1",
    });
    let mut batch = WriteBatch::new();
    batch.set(paths::AUCTIONS, &auction_id, auction);
    store.commit(batch).await.expect("경매 생성 실패");

    eventually(|| feed.latest().is_some(), "상세 피드 첫 발행").await;
    let detail = feed.latest().expect("상세 피드 값 없음");
    assert_eq!(detail.auction.current_price, 10_000);
    assert!(detail.bids.is_empty());
    assert!(detail.chats.is_empty());

    // 입찰이 반영되면 최신 경매 상태와 함께 재발행
    create_test_user(&store, "bidder-1", Some("Jane"), Some("Doe"), "", 100_000).await;
    assert!(service
        .place_bid(&auction_id, Some(11_000), "bidder-1")
        .await
        .expect("입찰 실패"));
    eventually(
        || {
            feed.latest()
                .is_some_and(|d| d.bids.len() == 1 && d.auction.current_price == 11_000)
        },
        "입찰 반영 재발행",
    )
    .await;
    assert!(feed.latest().expect("상세 피드 값 없음").chats.is_empty());

    // 채팅이 반영되어도 입찰과 경매 상태는 최신으로 유지
    service
        .send_message(&auction_id, "첫 댓글", "bidder-1")
        .await
        .expect("메시지 전송 실패");
    eventually(
        || feed.latest().is_some_and(|d| d.chats.len() == 1),
        "채팅 반영 재발행",
    )
    .await;
    let detail = feed.latest().expect("상세 피드 값 없음");
    assert_eq!(detail.bids.len(), 1);
    assert_eq!(detail.auction.current_price, 11_000);
}

/// 경매 등록 검증 테스트
#[tokio::test]
async fn test_add_new_auction() {
    let (store, auth, service) = setup();

    let request = NewAuction {
        title: "새 경매".to_string(),
        description: "등록 테스트용 경매입니다.".to_string(),
        category: "Books".to_string(),
        end_date: Utc::now() + Duration::days(2),
        starting_price: 500,
        image_src: None,
    };

    // 미로그인 등록은 거부
    let err = service
        .add_new_auction(request.clone())
        .await
        .expect_err("미로그인 등록은 거부되어야 한다");
    assert!(matches!(err, AuctionError::AuthRequired));

    auth.sign_in("seller-9");

    // 시작가는 양수여야 한다
    let err = service
        .add_new_auction(NewAuction {
            starting_price: 0,
            ..request.clone()
        })
        .await
        .expect_err("시작가 0 은 거부되어야 한다");
    assert!(matches!(err, AuctionError::InvalidStartingPrice));

    // 종료는 최소 24시간 뒤여야 한다
    let err = service
        .add_new_auction(NewAuction {
            end_date: Utc::now() + Duration::hours(1),
            ..request.clone()
        })
        .await
        .expect_err("24시간 이내 종료는 거부되어야 한다");
    assert!(matches!(err, AuctionError::InvalidEndDate));

    let id = service
        .add_new_auction(request)
        .await
        .expect("경매 등록 실패");
    let auction = get_auction(&store, &id).await;
    assert!(auction.is_active);
    assert_eq!(auction.starting_price, 500);
    assert_eq!(auction.current_price, 500);
    assert_eq!(auction.created_by, "seller-9");

    eventually(
        || service.get_all_auctions().iter().any(|a| a.id == id),
        "등록된 경매 캐시 반영",
    )
    .await;
    assert_eq!(service.get_my_auctions().await.len(), 1);
}

/// 내 최고가 입찰 경매 조회 테스트
#[tokio::test]
async fn test_auctions_with_my_bids() {
    let (store, auth, service) = setup();
    auth.sign_in("me");
    create_test_user(&store, "me", Some("Me"), None, "", 1_000_000).await;
    create_test_user(&store, "rival", Some("Rival"), None, "", 1_000_000).await;

    let winning = create_test_auction(&store, "이기고 있는 경매", "Books", 10_000, "seller-1").await;
    let outbid = create_test_auction(&store, "밀린 경매", "Books", 10_000, "seller-1").await;

    assert!(service.place_bid(&winning, Some(11_000), "me").await.expect("입찰 실패"));
    assert!(service.place_bid(&outbid, Some(11_000), "me").await.expect("입찰 실패"));
    assert!(service.place_bid(&outbid, Some(12_000), "rival").await.expect("입찰 실패"));

    let results = service
        .get_auctions_with_my_bids()
        .await
        .expect("조회 실패");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].auction.id, winning);
    assert_eq!(results[0].highest_bid.amount, 11_000);
    assert_eq!(results[0].highest_bid.user_id, "me");
}

/// 잔액 충전 테스트
#[tokio::test]
async fn test_add_funds() {
    let (store, auth, service) = setup();

    let err = service
        .add_funds(50)
        .await
        .expect_err("미로그인 충전은 거부되어야 한다");
    assert!(matches!(err, AuctionError::AuthRequired));

    auth.sign_in("funder");
    create_test_user(&store, "funder", Some("Fund"), Some("Er"), "", 100).await;

    let err = service
        .add_funds(0)
        .await
        .expect_err("0 이하 금액은 거부되어야 한다");
    assert!(matches!(err, AuctionError::InvalidAmount));

    service.add_funds(50).await.expect("충전 실패");
    let doc = store
        .get(paths::USERS, "funder")
        .await
        .expect("사용자 조회 실패")
        .expect("사용자 문서 없음");
    let user: User = serde_json::from_value(doc.data).expect("사용자 역직렬화 실패");
    assert_eq!(user.balance, 150);

    // 동시 충전도 원자적으로 누적된다
    let (first, second) = tokio::join!(service.add_funds(70), service.add_funds(30));
    first.expect("충전 실패");
    second.expect("충전 실패");
    let doc = store
        .get(paths::USERS, "funder")
        .await
        .expect("사용자 조회 실패")
        .expect("사용자 문서 없음");
    let user: User = serde_json::from_value(doc.data).expect("사용자 역직렬화 실패");
    assert_eq!(user.balance, 250);
}

/// 남은 시간 표시 테스트
#[tokio::test]
async fn test_time_left() {
    let now = Utc::now();
    let auction = |end_date: DateTime<Utc>| Auction {
        id: "a".to_string(),
        title: "남은 시간 테스트".to_string(),
        description: String::new(),
        category: "Books".to_string(),
        end_date,
        starting_price: 100,
        current_price: 100,
        is_active: true,
        created_by: "seller-1".to_string(),
        image_src: None,
        winning_bidder: None,
        highest_bidder_id: None,
    };

    assert_eq!(
        auction(now + Duration::days(2) + Duration::hours(3)).time_left(now),
        "Ends in 2d 3h"
    );
    assert_eq!(
        auction(now + Duration::hours(1) + Duration::minutes(30)).time_left(now),
        "Ends in 1h 30m"
    );
    assert_eq!(
        auction(now + Duration::minutes(5) + Duration::seconds(20)).time_left(now),
        "Ends in 5m 20s"
    );
    assert_eq!(auction(now + Duration::seconds(45)).time_left(now), "Ends in 45s");
    assert_eq!(auction(now - Duration::seconds(1)).time_left(now), "Ended");
}

/// 오류 종류별 사용자 메시지 구분 테스트
#[test]
fn test_error_user_messages() {
    let messages = [
        AuctionError::AmountMissing.user_message(),
        AuctionError::BidTooLow { current_price: 100 }.user_message(),
        AuctionError::InsufficientBalance {
            balance: 50,
            amount: 120,
        }
        .user_message(),
        AuctionError::AuthRequired.user_message(),
    ];

    // 검증 오류는 종류마다 다른 메시지를 보여 준다
    for (i, message) in messages.iter().enumerate() {
        for (j, other) in messages.iter().enumerate() {
            if i != j {
                assert_ne!(message, other);
            }
        }
    }
    assert_eq!(messages[0], "Place your bid amount.");
}

/// 카테고리 목록 정렬 테스트
#[tokio::test]
async fn test_available_filters() {
    let (store, _auth, service) = setup();

    let mut batch = WriteBatch::new();
    batch.set(paths::AUCTION_TYPES, "t1", json!({"name": "Books", "order": 3}));
    batch.set(paths::AUCTION_TYPES, "t2", json!({"name": "Electronics", "order": 1}));
    batch.set(paths::AUCTION_TYPES, "t3", json!({"name": "Clothing", "order": 2}));
    store.commit(batch).await.expect("카테고리 생성 실패");

    eventually(
        || service.available_filters() == ["Electronics", "Clothing", "Books"],
        "카테고리 목록 발행",
    )
    .await;

    // 스트림에는 "All" 이 맨 앞에 온다
    let filters = service.query().filters().borrow().clone();
    assert_eq!(filters[0], "All");
    assert_eq!(filters.len(), 4);
}
