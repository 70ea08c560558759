/// 경매 질의 엔진
/// 카테고리 / 제목 검색 / 소유 범위 필터를 순서대로 적용해
/// 필터링된 경매 스트림을 발행한다
// region:    --- Imports
use crate::auction::model::Auction;
use crate::auth::AuthProvider;
use crate::repository::AuctionRepository;
use crate::store::{paths, DocumentStore};
use serde::Deserialize;
use std::sync::{Arc, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

// endregion: --- Imports

// region:    --- View Context
/// 질의 범위: 전체 경매 또는 내가 만든 경매
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewContext {
    AllAuctions,
    MyAuctions,
}
// endregion: --- View Context

// region:    --- Filter State
/// "All" 카테고리는 필터링하지 않는다
pub const ALL_FILTER: &str = "All";

struct FilterState {
    selected_filter: String,
    search_text: String,
    view_context: ViewContext,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            selected_filter: ALL_FILTER.to_string(),
            search_text: String::new(),
            view_context: ViewContext::AllAuctions,
        }
    }
}

/// 카테고리 문서 ({name, order})
#[derive(Deserialize)]
struct AuctionType {
    name: String,
    #[serde(default)]
    order: i64,
}
// endregion: --- Filter State

// region:    --- Auction Query Engine
pub struct AuctionQueryEngine {
    repository: Arc<AuctionRepository>,
    auth: Arc<dyn AuthProvider>,
    state: Arc<RwLock<FilterState>>,
    filtered: Arc<watch::Sender<Vec<Auction>>>,
    filters: Arc<watch::Sender<Vec<String>>>,
    tasks: Vec<JoinHandle<()>>,
}

impl AuctionQueryEngine {
    pub fn new(
        store: &Arc<dyn DocumentStore>,
        repository: Arc<AuctionRepository>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        let state = Arc::new(RwLock::new(FilterState::default()));
        let (filtered_tx, _) = watch::channel(Vec::new());
        let filtered = Arc::new(filtered_tx);
        let (filters_tx, _) = watch::channel(vec![ALL_FILTER.to_string()]);
        let filters = Arc::new(filters_tx);

        // 캐시 개정마다 재필터링
        let refilter_task = {
            let repository = Arc::clone(&repository);
            let auth = Arc::clone(&auth);
            let state = Arc::clone(&state);
            let filtered = Arc::clone(&filtered);
            let mut changes = repository.subscribe_changes();
            tokio::spawn(async move {
                loop {
                    Self::recompute_inner(&repository, &auth, &state, &filtered).await;
                    if changes.changed().await.is_err() {
                        break;
                    }
                }
            })
        };

        // 카테고리 컬렉션 구독: order 순으로 정렬해 발행
        let filters_task = {
            let mut feed = store.subscribe(paths::AUCTION_TYPES);
            let filters = Arc::clone(&filters);
            tokio::spawn(async move {
                loop {
                    let docs = feed.snapshot();
                    let mut types = Vec::with_capacity(docs.len());
                    for doc in docs {
                        match serde_json::from_value::<AuctionType>(doc.data) {
                            Ok(t) => types.push(t),
                            Err(e) => {
                                warn!("{:<12} --> 카테고리 문서 역직렬화 실패: {}", "Query", e);
                            }
                        }
                    }
                    types.sort_by_key(|t| t.order);

                    let mut list = vec![ALL_FILTER.to_string()];
                    list.extend(types.into_iter().map(|t| t.name));
                    filters.send_replace(list);

                    if !feed.changed().await {
                        break;
                    }
                }
            })
        };

        Self {
            repository,
            auth,
            state,
            filtered,
            filters,
            tasks: vec![refilter_task, filters_task],
        }
    }

    /// 카테고리 필터 선택
    pub async fn select_filter(&self, filter: &str) {
        lock_write(&self.state).selected_filter = filter.to_string();
        self.recompute().await;
    }

    /// 검색어 설정
    pub async fn set_search_text(&self, text: &str) {
        lock_write(&self.state).search_text = text.to_string();
        self.recompute().await;
    }

    /// 현재 검색어로 재검색
    pub async fn search_auctions(&self) {
        self.recompute().await;
    }

    /// 질의 범위 변경
    pub async fn set_view_context(&self, context: ViewContext) {
        lock_write(&self.state).view_context = context;
        self.recompute().await;
    }

    /// 필터 재적용
    pub async fn recompute(&self) {
        Self::recompute_inner(&self.repository, &self.auth, &self.state, &self.filtered).await;
    }

    async fn recompute_inner(
        repository: &AuctionRepository,
        auth: &Arc<dyn AuthProvider>,
        state: &RwLock<FilterState>,
        filtered: &watch::Sender<Vec<Auction>>,
    ) {
        let (selected_filter, search_text, view_context) = {
            let state = lock_read(state);
            (
                state.selected_filter.clone(),
                state.search_text.clone(),
                state.view_context,
            )
        };

        let mut current = repository.get_all();

        // 1. 카테고리 필터
        if selected_filter != ALL_FILTER {
            current.retain(|auction| auction.category == selected_filter);
        }

        // 2. 제목 검색 (대소문자 무시 부분 일치)
        if !search_text.is_empty() {
            let needle = search_text.to_lowercase();
            current.retain(|auction| auction.title.to_lowercase().contains(&needle));
        }

        // 3. 소유 범위 필터 (비동기로 현재 사용자 식별)
        if view_context == ViewContext::MyAuctions {
            match auth.current_user_id().await {
                Some(user_id) => current.retain(|auction| auction.created_by == user_id),
                None => current.clear(),
            }
        }

        debug!("{:<12} --> 필터링 결과: {}건", "Query", current.len());
        filtered.send_replace(current);
    }

    /// 필터링된 경매 스트림
    pub fn filtered_auctions(&self) -> watch::Receiver<Vec<Auction>> {
        self.filtered.subscribe()
    }

    /// 카테고리 목록 스트림 ("All" 포함, order 순)
    pub fn filters(&self) -> watch::Receiver<Vec<String>> {
        self.filters.subscribe()
    }

    /// 선택 가능한 카테고리 ("All" 제외)
    pub fn available_filters(&self) -> Vec<String> {
        self.filters
            .borrow()
            .iter()
            .filter(|f| f.as_str() != ALL_FILTER)
            .cloned()
            .collect()
    }
}

impl Drop for AuctionQueryEngine {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

fn lock_read(state: &RwLock<FilterState>) -> std::sync::RwLockReadGuard<'_, FilterState> {
    state.read().unwrap_or_else(|e| e.into_inner())
}

fn lock_write(state: &RwLock<FilterState>) -> std::sync::RwLockWriteGuard<'_, FilterState> {
    state.write().unwrap_or_else(|e| e.into_inner())
}
// endregion: --- Auction Query Engine
