/// 경매 캐시 저장소
/// auctions 컬렉션 라이브 구독으로 인메모리 캐시를 최신으로 유지하고,
/// 스냅샷이 바뀔 때마다 개정 번호를 올려 재필터링을 유발한다
// region:    --- Imports
use crate::auction::model::Auction;
use crate::store::{paths, DocumentStore};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

// endregion: --- Imports

// region:    --- Auction Repository
pub struct AuctionRepository {
    cache: Arc<RwLock<HashMap<String, Auction>>>,
    revision: watch::Receiver<u64>,
    sync_task: JoinHandle<()>,
}

impl AuctionRepository {
    /// 저장소 구독을 시작하고 동기화 태스크를 띄운다
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let cache = Arc::new(RwLock::new(HashMap::new()));
        let (rev_tx, rev_rx) = watch::channel(0u64);

        let mut feed = store.subscribe(paths::AUCTIONS);
        let task_cache = Arc::clone(&cache);
        let sync_task = tokio::spawn(async move {
            loop {
                let docs = feed.snapshot();
                let mut next = HashMap::with_capacity(docs.len());
                for doc in docs {
                    let id = doc.id.clone();
                    match Auction::from_document(doc) {
                        Ok(auction) => {
                            next.insert(id, auction);
                        }
                        Err(e) => {
                            warn!("{:<12} --> 경매 문서 역직렬화 실패 ({}): {}", "Repository", id, e);
                        }
                    }
                }
                debug!("{:<12} --> 캐시 갱신: {}건", "Repository", next.len());
                *lock_write(&task_cache) = next;
                rev_tx.send_modify(|rev| *rev += 1);

                if !feed.changed().await {
                    break;
                }
            }
        });

        Self {
            cache,
            revision: rev_rx,
            sync_task,
        }
    }

    /// 캐시된 전체 경매 (순서 무관)
    pub fn get_all(&self) -> Vec<Auction> {
        lock_read(&self.cache).values().cloned().collect()
    }

    /// 단일 경매 조회
    pub fn get(&self, auction_id: &str) -> Option<Auction> {
        lock_read(&self.cache).get(auction_id).cloned()
    }

    /// 캐시 개정 번호 구독 (스냅샷 반영마다 증가)
    pub fn subscribe_changes(&self) -> watch::Receiver<u64> {
        self.revision.clone()
    }
}

impl Drop for AuctionRepository {
    fn drop(&mut self) {
        self.sync_task.abort();
    }
}

fn lock_read(
    cache: &RwLock<HashMap<String, Auction>>,
) -> RwLockReadGuard<'_, HashMap<String, Auction>> {
    cache.read().unwrap_or_else(|e| e.into_inner())
}

fn lock_write(
    cache: &RwLock<HashMap<String, Auction>>,
) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Auction>> {
    cache.write().unwrap_or_else(|e| e.into_inner())
}
// endregion: --- Auction Repository
