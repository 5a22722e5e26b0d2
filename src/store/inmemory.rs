//! 内存版文档集合（InMemoryCollection）
//!
//! 以 `RwLock` 保护的文档向量 + 已声明索引表实现 `DocumentCollection`，
//! 并在自身的插入方法上强制唯一索引约束：
//! - `find`：在内存中求值过滤表达式、多键排序与条数上限；
//! - `create_index`：按名称幂等声明，unique 索引会回填并校验既有文档；
//! - `insert`/`insert_many`：逐条写入，违反唯一约束返回 `DuplicateKey`。
//!
//! 典型用途：测试环境、示例与本地开发。
//!
use crate::error::{StoreError, StoreResult};
use crate::query::{Filter, FindQuery, IndexSpec, SortOrder};
use crate::store::{DocumentCollection, DocumentCursor};
use async_trait::async_trait;
use futures_util::stream;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// 简单的内存文档集合实现
#[derive(Default)]
pub struct InMemoryCollection {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    documents: Vec<Value>,
    indexes: BTreeMap<String, IndexState>,
}

struct IndexState {
    spec: IndexSpec,
    /// unique 索引已占用的键指纹
    seen: HashSet<String>,
}

impl InMemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入单个文档，违反唯一索引时返回 `StoreError::DuplicateKey`
    pub fn insert(&self, document: Value) -> StoreResult<()> {
        self.write()?.insert(document)
    }

    /// 逐条插入；每个文档独立成败，不提供跨文档原子性
    pub fn insert_many(&self, documents: Vec<Value>) -> StoreResult<()> {
        let mut inner = self.write()?;
        for document in documents {
            inner.insert(document)?;
        }
        Ok(())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Inner>> {
        self.inner.read().map_err(|_| StoreError::Store {
            reason: "collection lock poisoned".into(),
        })
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Inner>> {
        self.inner.write().map_err(|_| StoreError::Store {
            reason: "collection lock poisoned".into(),
        })
    }
}

impl Inner {
    fn insert(&mut self, document: Value) -> StoreResult<()> {
        // 先校验全部唯一约束，再统一登记，避免部分登记
        let mut fingerprints = Vec::new();
        for state in self.indexes.values() {
            if !state.spec.unique() {
                continue;
            }
            let fingerprint = fingerprint(&document, state.spec.keys());
            if state.seen.contains(&fingerprint) {
                return Err(StoreError::DuplicateKey {
                    index: state.spec.name().to_string(),
                });
            }
            fingerprints.push((state.spec.name().to_string(), fingerprint));
        }

        for (name, fingerprint) in fingerprints {
            if let Some(state) = self.indexes.get_mut(&name) {
                state.seen.insert(fingerprint);
            }
        }
        self.documents.push(document);
        Ok(())
    }

    fn create_index(&mut self, index: IndexSpec) -> StoreResult<()> {
        if let Some(existing) = self.indexes.get(index.name()) {
            if existing.spec == index {
                return Ok(());
            }
            return Err(StoreError::IndexConflict {
                index: index.name().to_string(),
                reason: "an index with this name but a different definition exists".into(),
            });
        }

        let mut seen = HashSet::new();
        if index.unique() {
            for document in &self.documents {
                if !seen.insert(fingerprint(document, index.keys())) {
                    return Err(StoreError::DuplicateKey {
                        index: index.name().to_string(),
                    });
                }
            }
        }

        self.indexes
            .insert(index.name().to_string(), IndexState { spec: index, seen });
        Ok(())
    }
}

#[async_trait]
impl DocumentCollection for InMemoryCollection {
    async fn find(&self, query: FindQuery) -> StoreResult<DocumentCursor<'_>> {
        let mut results: Vec<Value> = {
            let inner = self.read()?;
            inner
                .documents
                .iter()
                .filter(|document| query.filter().is_none_or(|f| matches(f, document)))
                .cloned()
                .collect()
        };

        if !query.sort().is_empty() {
            results.sort_by(|a, b| compare_documents(a, b, query.sort()));
        }
        if let Some(limit) = query.limit() {
            results.truncate(limit);
        }

        Ok(Box::pin(stream::iter(results.into_iter().map(Ok))))
    }

    async fn create_index(&self, index: IndexSpec) -> StoreResult<()> {
        self.write()?.create_index(index)
    }
}

fn field_value<'a>(document: &'a Value, field: &str) -> &'a Value {
    const NULL: Value = Value::Null;
    document.get(field).unwrap_or(&NULL)
}

fn fingerprint(document: &Value, keys: &[(String, SortOrder)]) -> String {
    let values: Vec<&Value> = keys
        .iter()
        .map(|(field, _)| field_value(document, field))
        .collect();
    serde_json::to_string(&values).unwrap_or_default()
}

fn matches(filter: &Filter, document: &Value) -> bool {
    match filter {
        Filter::Eq(field, value) => field_value(document, field) == value,
        Filter::Ne(field, value) => field_value(document, field) != value,
        Filter::Gt(field, value) => {
            compare(field_value(document, field), value) == Some(Ordering::Greater)
        }
        Filter::Gte(field, value) => matches!(
            compare(field_value(document, field), value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Filter::Lt(field, value) => {
            compare(field_value(document, field), value) == Some(Ordering::Less)
        }
        Filter::Lte(field, value) => matches!(
            compare(field_value(document, field), value),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Filter::And(filters) => filters.iter().all(|f| matches(f, document)),
        Filter::Or(filters) => filters.iter().any(|f| matches(f, document)),
        Filter::Not(inner) => !matches(inner, document),
    }
}

fn compare_documents(a: &Value, b: &Value, sort: &[(String, SortOrder)]) -> Ordering {
    for (field, order) in sort {
        let ordering = compare(field_value(a, field), field_value(b, field))
            .unwrap_or(Ordering::Equal);
        let ordering = match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// 不同类型之间不可比，谓词按不匹配处理
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

fn compare_numbers(a: &serde_json::Number, b: &serde_json::Number) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return Some(a.cmp(&b));
    }
    a.as_f64().zip(b.as_f64()).and_then(|(a, b)| a.partial_cmp(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use serde_json::json;

    async fn collect(collection: &InMemoryCollection, query: FindQuery) -> Vec<Value> {
        let cursor = collection.find(query).await.unwrap();
        cursor.map(|doc| doc.unwrap()).collect().await
    }

    #[tokio::test]
    async fn filter_sort_and_limit() {
        let collection = InMemoryCollection::new();
        collection
            .insert_many(vec![
                json!({"n": 3, "kind": "a"}),
                json!({"n": 1, "kind": "a"}),
                json!({"n": 2, "kind": "b"}),
                json!({"n": 5, "kind": "a"}),
            ])
            .unwrap();

        let query = FindQuery::builder()
            .filter(Filter::equals("kind", "a"))
            .sort(vec![("n".to_string(), SortOrder::Ascending)])
            .limit(2)
            .build();

        let docs = collect(&collection, query).await;
        let numbers: Vec<i64> = docs.iter().map(|d| d["n"].as_i64().unwrap()).collect();
        assert_eq!(numbers, vec![1, 3]);
    }

    #[tokio::test]
    async fn descending_sort_and_boolean_operators() {
        let collection = InMemoryCollection::new();
        collection
            .insert_many(vec![
                json!({"n": 1}),
                json!({"n": 2}),
                json!({"n": 3}),
                json!({"n": 4}),
            ])
            .unwrap();

        let query = FindQuery::builder()
            .filter(
                Filter::greater_than("n", 1)
                    .and(Filter::less_than("n", 4))
                    .or(Filter::equals("n", 4))
                    .negate()
                    .negate(),
            )
            .sort(vec![("n".to_string(), SortOrder::Descending)])
            .build();

        let docs = collect(&collection, query).await;
        let numbers: Vec<i64> = docs.iter().map(|d| d["n"].as_i64().unwrap()).collect();
        assert_eq!(numbers, vec![4, 3, 2]);
    }

    #[tokio::test]
    async fn unique_index_rejects_duplicates() {
        let collection = InMemoryCollection::new();
        let index = IndexSpec::builder()
            .name("uniq".to_string())
            .keys(vec![("k".to_string(), SortOrder::Ascending)])
            .unique(true)
            .build();
        collection.create_index(index).await.unwrap();

        collection.insert(json!({"k": "x", "v": 1})).unwrap();
        let err = collection.insert(json!({"k": "x", "v": 2})).unwrap_err();
        match err {
            StoreError::DuplicateKey { index } => assert_eq!(index, "uniq"),
            other => panic!("unexpected {other:?}"),
        }

        // 不同键值可以写入
        collection.insert(json!({"k": "y", "v": 3})).unwrap();
    }

    #[tokio::test]
    async fn create_index_is_idempotent_but_rejects_redefinition() {
        let collection = InMemoryCollection::new();
        let index = IndexSpec::builder()
            .name("idx".to_string())
            .keys(vec![("k".to_string(), SortOrder::Ascending)])
            .unique(true)
            .build();

        collection.create_index(index.clone()).await.unwrap();
        collection.create_index(index).await.unwrap();

        let redefined = IndexSpec::builder()
            .name("idx".to_string())
            .keys(vec![("other".to_string(), SortOrder::Ascending)])
            .unique(true)
            .build();
        let err = collection.create_index(redefined).await.unwrap_err();
        assert!(matches!(err, StoreError::IndexConflict { .. }));
    }

    #[tokio::test]
    async fn unique_index_backfill_checks_existing_documents() {
        let collection = InMemoryCollection::new();
        collection.insert(json!({"k": "x"})).unwrap();
        collection.insert(json!({"k": "x"})).unwrap();

        let index = IndexSpec::builder()
            .name("late".to_string())
            .keys(vec![("k".to_string(), SortOrder::Ascending)])
            .unique(true)
            .build();
        let err = collection.create_index(index).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));
    }
}
