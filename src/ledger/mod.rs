/// 입찰 원장
/// 경매별 입찰 하위 컬렉션을 구독해 사용자 표시 정보로 보강하고
/// 금액 내림차순으로 정렬해 발행한다
// region:    --- Imports
use crate::auction::model::Bid;
use crate::store::{paths, DocumentStore};
use crate::users::UserDirectory;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

// endregion: --- Imports

// region:    --- Bid Feed
/// 보강된 입찰 목록 라이브 피드
/// 첫 스냅샷이 보강되기 전까지는 None
pub struct BidFeed {
    rx: watch::Receiver<Option<Vec<Bid>>>,
    task: JoinHandle<()>,
}

impl BidFeed {
    /// 마지막으로 발행된 입찰 목록
    pub fn latest(&self) -> Option<Vec<Bid>> {
        self.rx.borrow().clone()
    }

    /// 다음 발행 대기. 피드가 끊기면 false
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

impl Drop for BidFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}
// endregion: --- Bid Feed

// region:    --- Bid Ledger
pub struct BidLedger {
    store: Arc<dyn DocumentStore>,
    users: Arc<UserDirectory>,
}

impl BidLedger {
    pub fn new(store: Arc<dyn DocumentStore>, users: Arc<UserDirectory>) -> Self {
        Self { store, users }
    }

    /// 경매 하나의 입찰 피드 구독 시작
    pub fn subscribe(&self, auction_id: &str) -> BidFeed {
        let (tx, rx) = watch::channel(None);
        let mut feed = self.store.subscribe(&paths::bids(auction_id));
        let users = Arc::clone(&self.users);

        let task = tokio::spawn(async move {
            loop {
                let docs = feed.snapshot();
                let mut bids: Vec<Bid> = Vec::with_capacity(docs.len());
                for doc in docs {
                    match serde_json::from_value::<Bid>(doc.data) {
                        Ok(bid) => bids.push(bid),
                        Err(e) => {
                            warn!("{:<12} --> 입찰 문서 역직렬화 실패 ({}): {}", "Ledger", doc.id, e);
                        }
                    }
                }

                // 스냅샷 내 동일 사용자 조회는 한 번만 수행한다
                let mut profiles: HashMap<String, (String, String)> = HashMap::new();
                for bid in &mut bids {
                    let (name, pic) = match profiles.get(&bid.user_id) {
                        Some(profile) => profile.clone(),
                        None => {
                            let profile = users.display_profile(&bid.user_id).await;
                            profiles.insert(bid.user_id.clone(), profile.clone());
                            profile
                        }
                    };
                    bid.display_name = Some(name);
                    bid.profile_pic_url = Some(pic);
                }

                bids.sort_by(|a, b| b.amount.cmp(&a.amount));
                tx.send_replace(Some(bids));

                if !feed.changed().await {
                    break;
                }
            }
        });

        BidFeed { rx, task }
    }
}
// endregion: --- Bid Ledger
