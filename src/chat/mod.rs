/// 경매별 채팅 로그
/// 쓰기: 공백 메시지는 무시하고 서버 id / 타임스탬프로 추가
/// 읽기: 타임스탬프 내림차순 라이브 피드 (입찰 원장과 같은 방식으로 보강)
// region:    --- Imports
use crate::auction::model::ChatMessage;
use crate::error::AuctionError;
use crate::store::{paths, DocumentStore, StoreError, WriteBatch};
use crate::users::UserDirectory;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

// endregion: --- Imports

// region:    --- Chat Feed
/// 보강된 채팅 목록 라이브 피드 (첫 스냅샷 전에는 None)
pub struct ChatFeed {
    rx: watch::Receiver<Option<Vec<ChatMessage>>>,
    task: JoinHandle<()>,
}

impl ChatFeed {
    pub fn latest(&self) -> Option<Vec<ChatMessage>> {
        self.rx.borrow().clone()
    }

    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

impl Drop for ChatFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}
// endregion: --- Chat Feed

// region:    --- Chat Log
pub struct ChatLog {
    store: Arc<dyn DocumentStore>,
    users: Arc<UserDirectory>,
}

impl ChatLog {
    pub fn new(store: Arc<dyn DocumentStore>, users: Arc<UserDirectory>) -> Self {
        Self { store, users }
    }

    /// 메시지 전송. 공백뿐인 메시지는 아무것도 하지 않는다
    pub async fn send_message(
        &self,
        auction_id: &str,
        message: &str,
        sender_id: &str,
    ) -> Result<(), AuctionError> {
        let trimmed = message.trim();
        if trimmed.is_empty() {
            return Ok(());
        }

        let message_id = self.store.create_id();
        let chat_message = ChatMessage {
            message_id: message_id.clone(),
            sender_user_id: sender_id.to_string(),
            message: trimmed.to_string(),
            timestamp: self.store.server_time(),
            display_name: None,
            profile_pic_url: None,
        };

        let mut batch = WriteBatch::new();
        batch.set(
            &paths::chat(auction_id),
            &message_id,
            serde_json::to_value(&chat_message).map_err(StoreError::from)?,
        );

        match self.store.commit(batch).await {
            Ok(()) => {
                info!("{:<12} --> 메시지 전송: auction={}", "Chat", auction_id);
                Ok(())
            }
            Err(e) => {
                error!("{:<12} --> 메시지 전송 실패: {}", "Chat", e);
                Err(e.into())
            }
        }
    }

    /// 경매 하나의 채팅 피드 구독 시작
    pub fn subscribe(&self, auction_id: &str) -> ChatFeed {
        let (tx, rx) = watch::channel(None);
        let mut feed = self.store.subscribe(&paths::chat(auction_id));
        let users = Arc::clone(&self.users);

        let task = tokio::spawn(async move {
            loop {
                let docs = feed.snapshot();
                let mut messages: Vec<ChatMessage> = Vec::with_capacity(docs.len());
                for doc in docs {
                    match serde_json::from_value::<ChatMessage>(doc.data) {
                        Ok(message) => messages.push(message),
                        Err(e) => {
                            warn!("{:<12} --> 채팅 문서 역직렬화 실패 ({}): {}", "Chat", doc.id, e);
                        }
                    }
                }

                let mut profiles: HashMap<String, (String, String)> = HashMap::new();
                for message in &mut messages {
                    let (name, pic) = match profiles.get(&message.sender_user_id) {
                        Some(profile) => profile.clone(),
                        None => {
                            let profile = users.display_profile(&message.sender_user_id).await;
                            profiles.insert(message.sender_user_id.clone(), profile.clone());
                            profile
                        }
                    };
                    message.display_name = Some(name);
                    message.profile_pic_url = Some(pic);
                }

                messages.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
                tx.send_replace(Some(messages));

                if !feed.changed().await {
                    break;
                }
            }
        });

        ChatFeed { rx, task }
    }
}
// endregion: --- Chat Log
