/// 문서 저장소 추상화
/// 1. 단일 문서 조회 / 컬렉션 일괄 조회
/// 2. 원자적 다중 문서 커밋 (커밋 내부 사전 조건 재검증 포함)
/// 3. 컬렉션 단위 라이브 구독 (변경 시마다 전체 스냅샷 재발행)
// region:    --- Imports
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tokio::sync::watch;

// endregion: --- Imports

// region:    --- Modules
pub mod memory;
pub mod paths;

// endregion: --- Modules

// region:    --- Store Error
/// 저장소 오류
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("transaction aborted: {0}")]
    Conflict(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
// endregion: --- Store Error

// region:    --- Document Model
/// 컬렉션에 저장되는 문서 (저장소가 부여한 id + JSON 본문)
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub data: Value,
}
// endregion: --- Document Model

// region:    --- Write Batch
/// 커밋 내부에서 재검증되는 사전 조건
/// 조건이 깨지면 배치 전체가 Conflict 로 중단된다
#[derive(Debug, Clone)]
pub enum Precondition {
    /// 대상 문서의 숫자 필드가 주어진 값보다 작아야 한다
    FieldLessThan { field: String, value: i64 },
}

impl Precondition {
    pub fn field_less_than(field: &str, value: i64) -> Self {
        Self::FieldLessThan {
            field: field.to_string(),
            value,
        }
    }
}

/// 쓰기 연산
#[derive(Debug, Clone)]
pub enum WriteOp {
    /// 문서 생성 또는 전체 교체
    Set {
        collection: String,
        id: String,
        data: Value,
    },
    /// 기존 문서의 필드 병합 갱신 (선택적 사전 조건)
    Update {
        collection: String,
        id: String,
        fields: Map<String, Value>,
        precondition: Option<Precondition>,
    },
    /// 숫자 필드 원자적 증가
    Increment {
        collection: String,
        id: String,
        field: String,
        by: i64,
    },
}

/// 원자적 쓰기 배치: 모든 연산이 함께 적용되거나 전부 버려진다
#[derive(Debug, Default)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, collection: &str, id: &str, data: Value) -> &mut Self {
        self.ops.push(WriteOp::Set {
            collection: collection.to_string(),
            id: id.to_string(),
            data,
        });
        self
    }

    pub fn update(
        &mut self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
        precondition: Option<Precondition>,
    ) -> &mut Self {
        self.ops.push(WriteOp::Update {
            collection: collection.to_string(),
            id: id.to_string(),
            fields,
            precondition,
        });
        self
    }

    pub fn increment(&mut self, collection: &str, id: &str, field: &str, by: i64) -> &mut Self {
        self.ops.push(WriteOp::Increment {
            collection: collection.to_string(),
            id: id.to_string(),
            field: field.to_string(),
            by,
        });
        self
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
// endregion: --- Write Batch

// region:    --- Collection Feed
/// 컬렉션 라이브 구독
/// 구독 시점의 전체 스냅샷을 들고 있다가 커밋마다 새 스냅샷을 재발행한다
pub struct CollectionFeed {
    rx: watch::Receiver<Vec<Document>>,
}

impl CollectionFeed {
    pub fn new(rx: watch::Receiver<Vec<Document>>) -> Self {
        Self { rx }
    }

    /// 현재 스냅샷 (대기 중이던 변경도 확인 처리)
    pub fn snapshot(&mut self) -> Vec<Document> {
        self.rx.borrow_and_update().clone()
    }

    /// 다음 변경 대기. 발행자가 사라지면 false
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}
// endregion: --- Collection Feed

// region:    --- Document Store Trait
/// 문서 저장소 트레이트
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// 저장소가 부여하는 고유 문서 id
    fn create_id(&self) -> String;

    /// 서버 측 타임스탬프
    fn server_time(&self) -> DateTime<Utc>;

    /// 단일 문서 조회
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// 컬렉션 전체 일괄 조회
    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// 원자적 배치 커밋: 사전 조건 하나라도 깨지면 아무것도 적용되지 않는다
    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;

    /// 컬렉션 라이브 구독 시작
    fn subscribe(&self, collection: &str) -> CollectionFeed;
}
// endregion: --- Document Store Trait
