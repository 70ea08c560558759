/// 경매 상세 라이브 뷰
/// 경매 문서 / 입찰 목록 / 채팅 목록 세 피드를 combine-latest 로 결합해
/// 셋 모두 값이 생긴 뒤부터 변경 때마다 최신 묶음을 재발행한다
// region:    --- Imports
use crate::auction::model::{Auction, Bid, ChatMessage};
use crate::chat::ChatLog;
use crate::ledger::BidLedger;
use crate::store::{paths, DocumentStore};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

// endregion: --- Imports

// region:    --- Detail Model
/// 단일 경매의 결합된 상세 뷰
#[derive(Debug, Clone, Serialize)]
pub struct AuctionDetail {
    pub auction: Auction,
    pub bids: Vec<Bid>,
    pub chats: Vec<ChatMessage>,
}
// endregion: --- Detail Model

// region:    --- Detail Feed
/// 상세 뷰 라이브 피드
/// 내부 구독은 피드가 버려질 때 함께 정리된다
pub struct DetailFeed {
    rx: watch::Receiver<Option<AuctionDetail>>,
    tasks: Vec<JoinHandle<()>>,
}

impl DetailFeed {
    /// 마지막으로 발행된 상세 뷰 (세 피드가 모두 준비되기 전에는 None)
    pub fn latest(&self) -> Option<AuctionDetail> {
        self.rx.borrow().clone()
    }

    /// 다음 발행 대기. 피드가 끊기면 false
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

impl Drop for DetailFeed {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}
// endregion: --- Detail Feed

// region:    --- Live Detail Aggregator
pub struct LiveDetailAggregator {
    store: Arc<dyn DocumentStore>,
    ledger: Arc<BidLedger>,
    chat: Arc<ChatLog>,
}

impl LiveDetailAggregator {
    pub fn new(store: Arc<dyn DocumentStore>, ledger: Arc<BidLedger>, chat: Arc<ChatLog>) -> Self {
        Self { store, ledger, chat }
    }

    /// 경매 하나의 상세 피드 구독 시작
    pub fn subscribe(&self, auction_id: &str) -> DetailFeed {
        // 경매 문서 피드: auctions 컬렉션 스냅샷에서 해당 문서만 투영
        let (auction_tx, mut auction_rx) = watch::channel(None::<Auction>);
        let mut collection = self.store.subscribe(paths::AUCTIONS);
        let target_id = auction_id.to_string();
        let auction_task = tokio::spawn(async move {
            loop {
                let docs = collection.snapshot();
                if let Some(doc) = docs.into_iter().find(|doc| doc.id == target_id) {
                    match Auction::from_document(doc) {
                        Ok(auction) => {
                            auction_tx.send_replace(Some(auction));
                        }
                        Err(e) => {
                            warn!(
                                "{:<12} --> 경매 문서 역직렬화 실패 ({}): {}",
                                "Detail", target_id, e
                            );
                        }
                    }
                }
                if !collection.changed().await {
                    break;
                }
            }
        });

        let mut bids = self.ledger.subscribe(auction_id);
        let mut chats = self.chat.subscribe(auction_id);

        // 결합 태스크: 어느 피드가 먼저 갱신되든 최신 묶음으로 재발행
        let (tx, rx) = watch::channel(None);
        let combine_task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = auction_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    alive = bids.changed() => {
                        if !alive {
                            break;
                        }
                    }
                    alive = chats.changed() => {
                        if !alive {
                            break;
                        }
                    }
                }

                let auction = auction_rx.borrow().clone();
                if let (Some(auction), Some(bids), Some(chats)) =
                    (auction, bids.latest(), chats.latest())
                {
                    tx.send_replace(Some(AuctionDetail {
                        auction,
                        bids,
                        chats,
                    }));
                }
            }
        });

        DetailFeed {
            rx,
            tasks: vec![auction_task, combine_task],
        }
    }
}
// endregion: --- Live Detail Aggregator
