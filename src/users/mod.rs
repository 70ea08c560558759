/// 사용자 문서 조회와 표시 정보 결정
/// 입찰 / 채팅 목록이 공유하는 단일 보강 경로
// region:    --- Imports
use crate::auction::model::User;
use crate::store::{paths, DocumentStore, StoreError};
use std::sync::Arc;
use tracing::warn;

// endregion: --- Imports

// region:    --- User Directory
pub struct UserDirectory {
    store: Arc<dyn DocumentStore>,
    default_profile_pic: String,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn DocumentStore>, default_profile_pic: String) -> Self {
        Self {
            store,
            default_profile_pic,
        }
    }

    /// 사용자 문서 조회
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let Some(doc) = self.store.get(paths::USERS, user_id).await? else {
            return Ok(None);
        };
        let mut user: User = serde_json::from_value(doc.data)?;
        user.user_id = doc.id;
        Ok(Some(user))
    }

    /// 표시 이름과 아바타 결정
    /// 이름이 없으면 "Anonymous", 아바타가 비어 있으면 기본 이미지를 쓴다
    pub async fn display_profile(&self, user_id: &str) -> (String, String) {
        let user = match self.get_user(user_id).await {
            Ok(user) => user,
            Err(e) => {
                warn!("{:<12} --> 사용자 조회 실패 ({}): {}", "Users", user_id, e);
                None
            }
        };

        match user {
            Some(user) => {
                let name = match (user.first_name, user.last_name) {
                    (Some(first), Some(last)) => format!("{first} {last}"),
                    (Some(first), None) => first,
                    _ => "Anonymous".to_string(),
                };
                let pic = if user.profile_pic_url.is_empty() {
                    self.default_profile_pic.clone()
                } else {
                    user.profile_pic_url
                };
                (name, pic)
            }
            None => ("Anonymous".to_string(), self.default_profile_pic.clone()),
        }
    }
}
// endregion: --- User Directory
