/// 인메모리 문서 저장소
/// 테스트와 로컬 실행을 위한 참조 구현으로, 단일 잠금 아래에서
/// 배치를 검증-적용하여 원자성을 보장한다
// region:    --- Imports
use super::{
    CollectionFeed, Document, DocumentStore, Precondition, StoreError, WriteBatch, WriteOp,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::debug;
use ulid::Ulid;

// endregion: --- Imports

// region:    --- Collection State
/// 컬렉션 하나의 문서들과 스냅샷 발행 채널
struct Collection {
    docs: BTreeMap<String, Value>,
    tx: watch::Sender<Vec<Document>>,
}

impl Collection {
    fn new() -> Self {
        let (tx, _) = watch::channel(Vec::new());
        Self {
            docs: BTreeMap::new(),
            tx,
        }
    }

    fn snapshot(&self) -> Vec<Document> {
        self.docs
            .iter()
            .map(|(id, data)| Document {
                id: id.clone(),
                data: data.clone(),
            })
            .collect()
    }

    /// 현재 스냅샷을 모든 구독자에게 재발행
    fn publish(&self) {
        self.tx.send_replace(self.snapshot());
    }
}
// endregion: --- Collection State

// region:    --- Memory Store
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Collection>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Collection>> {
        // 잠금이 오염되어도 데이터 자체는 유효하므로 복구해서 계속 사용한다
        self.collections.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn create_id(&self) -> String {
        Ulid::new().to_string()
    }

    fn server_time(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let cols = self.lock();
        Ok(cols.get(collection).and_then(|col| {
            col.docs.get(id).map(|data| Document {
                id: id.to_string(),
                data: data.clone(),
            })
        }))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let cols = self.lock();
        Ok(cols
            .get(collection)
            .map(Collection::snapshot)
            .unwrap_or_default())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut cols = self.lock();

        // 1단계: 모든 사전 조건 검증. 하나라도 실패하면 아무것도 적용하지 않는다
        for op in batch.ops() {
            match op {
                WriteOp::Set { .. } => {}
                WriteOp::Update {
                    collection,
                    id,
                    precondition,
                    ..
                } => {
                    let doc = cols
                        .get(collection.as_str())
                        .and_then(|col| col.docs.get(id))
                        .ok_or_else(|| StoreError::NotFound(format!("{collection}/{id}")))?;
                    if let Some(Precondition::FieldLessThan { field, value }) = precondition {
                        let current = doc.get(field).and_then(Value::as_i64);
                        match current {
                            Some(cur) if cur < *value => {}
                            _ => {
                                return Err(StoreError::Conflict(format!(
                                    "{collection}/{id}: {field} is no longer below {value}"
                                )))
                            }
                        }
                    }
                }
                WriteOp::Increment {
                    collection,
                    id,
                    field,
                    ..
                } => {
                    let doc = cols
                        .get(collection.as_str())
                        .and_then(|col| col.docs.get(id))
                        .ok_or_else(|| StoreError::NotFound(format!("{collection}/{id}")))?;
                    doc.get(field).and_then(Value::as_i64).ok_or_else(|| {
                        StoreError::Conflict(format!("{collection}/{id}: {field} is not numeric"))
                    })?;
                }
            }
        }

        // 2단계: 전체 적용
        let mut touched = BTreeSet::new();
        for op in batch.into_ops() {
            match op {
                WriteOp::Set {
                    collection,
                    id,
                    data,
                } => {
                    let col = cols.entry(collection.clone()).or_insert_with(Collection::new);
                    col.docs.insert(id, data);
                    touched.insert(collection);
                }
                WriteOp::Update {
                    collection,
                    id,
                    fields,
                    ..
                } => {
                    if let Some(Value::Object(obj)) = cols
                        .get_mut(collection.as_str())
                        .and_then(|col| col.docs.get_mut(&id))
                    {
                        for (key, value) in fields {
                            obj.insert(key, value);
                        }
                    }
                    touched.insert(collection);
                }
                WriteOp::Increment {
                    collection,
                    id,
                    field,
                    by,
                } => {
                    if let Some(Value::Object(obj)) = cols
                        .get_mut(collection.as_str())
                        .and_then(|col| col.docs.get_mut(&id))
                    {
                        let current = obj.get(&field).and_then(Value::as_i64).unwrap_or(0);
                        obj.insert(field, Value::from(current + by));
                    }
                    touched.insert(collection);
                }
            }
        }

        // 3단계: 변경된 컬렉션의 스냅샷 재발행
        for name in &touched {
            if let Some(col) = cols.get(name) {
                col.publish();
            }
        }
        debug!("{:<12} --> 배치 커밋 완료: {}개 컬렉션 갱신", "Store", touched.len());

        Ok(())
    }

    fn subscribe(&self, collection: &str) -> CollectionFeed {
        let mut cols = self.lock();
        let col = cols
            .entry(collection.to_string())
            .or_insert_with(Collection::new);
        CollectionFeed::new(col.tx.subscribe())
    }
}
// endregion: --- Memory Store
