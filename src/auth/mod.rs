/// 인증 공급자 추상화
/// 현재 로그인한 사용자 식별자와 로그인 상태 변경 스트림을 제공한다
// region:    --- Imports
use async_trait::async_trait;
use tokio::sync::watch;
use tracing::info;

// endregion: --- Imports

// region:    --- Auth Provider Trait
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// 현재 로그인한 사용자 id (미로그인 시 None)
    async fn current_user_id(&self) -> Option<String>;

    /// 로그인 / 로그아웃 상태 변경 구독
    fn subscribe(&self) -> watch::Receiver<Option<String>>;
}
// endregion: --- Auth Provider Trait

// region:    --- Memory Auth
/// 테스트용 인메모리 인증 공급자
pub struct MemoryAuth {
    state: watch::Sender<Option<String>>,
}

impl Default for MemoryAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAuth {
    pub fn new() -> Self {
        let (state, _) = watch::channel(None);
        Self { state }
    }

    /// 로그인 처리
    pub fn sign_in(&self, user_id: &str) {
        info!("{:<12} --> 로그인: {}", "Auth", user_id);
        self.state.send_replace(Some(user_id.to_string()));
    }

    /// 로그아웃 처리
    pub fn sign_out(&self) {
        info!("{:<12} --> 로그아웃", "Auth");
        self.state.send_replace(None);
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    async fn current_user_id(&self) -> Option<String> {
        self.state.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.state.subscribe()
    }
}
// endregion: --- Memory Auth
