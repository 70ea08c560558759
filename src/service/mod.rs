/// 경매 서비스 파사드
/// 프레젠테이션 계층이 호출하는 공개 진입점으로, 캐시 저장소 / 질의 엔진 /
/// 입찰 원장 / 채팅 로그 / 상세 결합기를 묶고 로그인 상태 변화에 따라
/// 캐시된 사용자 식별자를 초기화한다
// region:    --- Imports
use crate::auction::model::{Auction, Bid, User};
use crate::auth::AuthProvider;
use crate::bidding::commands::{handle_place_bid, PlaceBidCommand};
use crate::chat::ChatLog;
use crate::detail::{DetailFeed, LiveDetailAggregator};
use crate::error::AuctionError;
use crate::ledger::BidLedger;
use crate::query::{AuctionQueryEngine, ViewContext};
use crate::repository::AuctionRepository;
use crate::store::{paths, DocumentStore, StoreError, WriteBatch};
use crate::users::UserDirectory;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Config
/// 서비스 설정
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// 아바타가 비어 있는 사용자에게 쓸 기본 이미지 경로
    pub default_profile_pic_url: String,
    /// 입찰 시 잔액 충분성 검사 여부
    pub enforce_balance: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_profile_pic_url: "/assets/images/profile-pic.jpg".to_string(),
            enforce_balance: true,
        }
    }
}
// endregion: --- Config

// region:    --- Requests / Views
/// 경매 등록 요청
#[derive(Debug, Clone)]
pub struct NewAuction {
    pub title: String,
    pub description: String,
    pub category: String,
    pub end_date: DateTime<Utc>,
    pub starting_price: i64,
    pub image_src: Option<String>,
}

/// 내 입찰이 최고가인 경매와 그 입찰
#[derive(Debug, Clone)]
pub struct AuctionWithMyBid {
    pub auction: Auction,
    pub highest_bid: Bid,
}
// endregion: --- Requests / Views

// region:    --- Auction Service
pub struct AuctionService {
    store: Arc<dyn DocumentStore>,
    auth: Arc<dyn AuthProvider>,
    repository: Arc<AuctionRepository>,
    query: AuctionQueryEngine,
    users: Arc<UserDirectory>,
    ledger: Arc<BidLedger>,
    chat: Arc<ChatLog>,
    detail: LiveDetailAggregator,
    config: ServiceConfig,
    cached_user: Arc<RwLock<Option<String>>>,
    auth_task: JoinHandle<()>,
}

impl AuctionService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        auth: Arc<dyn AuthProvider>,
        config: ServiceConfig,
    ) -> Self {
        let repository = Arc::new(AuctionRepository::new(Arc::clone(&store)));
        let query = AuctionQueryEngine::new(&store, Arc::clone(&repository), Arc::clone(&auth));
        let users = Arc::new(UserDirectory::new(
            Arc::clone(&store),
            config.default_profile_pic_url.clone(),
        ));
        let ledger = Arc::new(BidLedger::new(Arc::clone(&store), Arc::clone(&users)));
        let chat = Arc::new(ChatLog::new(Arc::clone(&store), Arc::clone(&users)));
        let detail =
            LiveDetailAggregator::new(Arc::clone(&store), Arc::clone(&ledger), Arc::clone(&chat));

        // 로그인 상태가 바뀔 때마다 캐시된 사용자 식별자를 버린다
        let cached_user = Arc::new(RwLock::new(None));
        let auth_task = {
            let cached_user = Arc::clone(&cached_user);
            let mut state = auth.subscribe();
            tokio::spawn(async move {
                while state.changed().await.is_ok() {
                    *lock_write(&cached_user) = None;
                }
            })
        };

        Self {
            store,
            auth,
            repository,
            query,
            users,
            ledger,
            chat,
            detail,
            config,
            cached_user,
            auth_task,
        }
    }

    // region:    --- Identity

    /// 현재 사용자 id (캐시 우선)
    pub async fn current_user_id(&self) -> Option<String> {
        if let Some(id) = lock_read(&self.cached_user).clone() {
            return Some(id);
        }
        let id = self.auth.current_user_id().await;
        if let Some(ref user_id) = id {
            *lock_write(&self.cached_user) = Some(user_id.clone());
        }
        id
    }

    /// 현재 사용자 문서
    pub async fn current_user(&self) -> Result<Option<User>, AuctionError> {
        match self.current_user_id().await {
            Some(id) => Ok(self.users.get_user(&id).await?),
            None => Ok(None),
        }
    }

    // endregion: --- Identity

    // region:    --- Queries

    /// 캐시된 전체 경매
    pub fn get_all_auctions(&self) -> Vec<Auction> {
        self.repository.get_all()
    }

    /// 내가 만든 경매
    pub async fn get_my_auctions(&self) -> Vec<Auction> {
        match self.current_user_id().await {
            Some(user_id) => self
                .repository
                .get_all()
                .into_iter()
                .filter(|auction| auction.created_by == user_id)
                .collect(),
            None => Vec::new(),
        }
    }

    /// 카테고리 필터 선택
    pub async fn select_filter(&self, filter: &str) {
        self.query.select_filter(filter).await;
    }

    /// 제목 검색
    pub async fn search_auctions(&self, text: &str) {
        self.query.set_search_text(text).await;
    }

    /// 질의 범위 변경 (전체 / 내 경매)
    pub async fn set_view_context(&self, context: ViewContext) {
        self.query.set_view_context(context).await;
    }

    /// 필터링된 경매 스트림
    pub fn filtered_auctions(&self) -> watch::Receiver<Vec<Auction>> {
        self.query.filtered_auctions()
    }

    /// 선택 가능한 카테고리 목록
    pub fn available_filters(&self) -> Vec<String> {
        self.query.available_filters()
    }

    /// 내 입찰이 최고가인 경매 목록 (일회성 조회)
    pub async fn get_auctions_with_my_bids(
        &self,
    ) -> Result<Vec<AuctionWithMyBid>, AuctionError> {
        let Some(user_id) = self.current_user_id().await else {
            return Ok(Vec::new());
        };

        let mut results = Vec::new();
        for doc in self.store.list(paths::AUCTIONS).await? {
            let auction = match Auction::from_document(doc) {
                Ok(auction) => auction,
                Err(e) => {
                    warn!("{:<12} --> 경매 문서 역직렬화 실패: {}", "Service", e);
                    continue;
                }
            };

            let highest = self
                .store
                .list(&paths::bids(&auction.id))
                .await?
                .into_iter()
                .filter_map(|doc| serde_json::from_value::<Bid>(doc.data).ok())
                .max_by_key(|bid| bid.amount);

            if let Some(bid) = highest {
                if bid.user_id == user_id {
                    results.push(AuctionWithMyBid {
                        auction,
                        highest_bid: bid,
                    });
                }
            }
        }
        Ok(results)
    }

    // endregion: --- Queries

    // region:    --- Commands

    /// 경매 등록: 로그인 필수, 시작가는 양수, 종료는 최소 24시간 뒤
    pub async fn add_new_auction(&self, new: NewAuction) -> Result<String, AuctionError> {
        let user_id = self
            .current_user_id()
            .await
            .ok_or(AuctionError::AuthRequired)?;

        if new.starting_price <= 0 {
            return Err(AuctionError::InvalidStartingPrice);
        }
        if new.end_date <= self.store.server_time() + Duration::hours(24) {
            return Err(AuctionError::InvalidEndDate);
        }

        let id = self.store.create_id();
        let auction = Auction {
            id: id.clone(),
            title: new.title,
            description: new.description,
            category: new.category,
            end_date: new.end_date,
            starting_price: new.starting_price,
            current_price: new.starting_price,
            is_active: true,
            created_by: user_id,
            image_src: new.image_src,
            winning_bidder: None,
            highest_bidder_id: None,
        };

        let mut batch = WriteBatch::new();
        batch.set(
            paths::AUCTIONS,
            &id,
            serde_json::to_value(&auction).map_err(StoreError::from)?,
        );
        self.store.commit(batch).await?;

        info!("{:<12} --> 경매 등록: {}", "Service", id);
        Ok(id)
    }

    /// 입찰
    pub async fn place_bid(
        &self,
        auction_id: &str,
        bid_amount: Option<i64>,
        bidder_id: &str,
    ) -> Result<bool, AuctionError> {
        handle_place_bid(
            PlaceBidCommand {
                auction_id: auction_id.to_string(),
                bid_amount,
                bidder_id: bidder_id.to_string(),
            },
            &self.store,
            self.config.enforce_balance,
        )
        .await
    }

    /// 채팅 메시지 전송
    pub async fn send_message(
        &self,
        auction_id: &str,
        message: &str,
        sender_id: &str,
    ) -> Result<(), AuctionError> {
        self.chat.send_message(auction_id, message, sender_id).await
    }

    /// 잔액 충전 (원자적 증가)
    pub async fn add_funds(&self, amount: i64) -> Result<(), AuctionError> {
        if amount <= 0 {
            return Err(AuctionError::InvalidAmount);
        }
        let user_id = self
            .current_user_id()
            .await
            .ok_or(AuctionError::AuthRequired)?;

        let mut batch = WriteBatch::new();
        batch.increment(paths::USERS, &user_id, "balance", amount);
        self.store.commit(batch).await?;

        info!("{:<12} --> 잔액 충전: user={}, amount={}", "Service", user_id, amount);
        Ok(())
    }

    // endregion: --- Commands

    // region:    --- Live Views

    /// 경매 + 입찰 + 채팅 결합 상세 피드
    pub fn get_auction_with_bids_and_chats(&self, auction_id: &str) -> DetailFeed {
        self.detail.subscribe(auction_id)
    }

    pub fn repository(&self) -> &AuctionRepository {
        &self.repository
    }

    pub fn query(&self) -> &AuctionQueryEngine {
        &self.query
    }

    pub fn ledger(&self) -> &BidLedger {
        &self.ledger
    }

    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    // endregion: --- Live Views
}

impl Drop for AuctionService {
    fn drop(&mut self) {
        self.auth_task.abort();
    }
}

fn lock_read(cell: &RwLock<Option<String>>) -> std::sync::RwLockReadGuard<'_, Option<String>> {
    cell.read().unwrap_or_else(|e| e.into_inner())
}

fn lock_write(cell: &RwLock<Option<String>>) -> std::sync::RwLockWriteGuard<'_, Option<String>> {
    cell.write().unwrap_or_else(|e| e.into_inner())
}
// endregion: --- Auction Service
