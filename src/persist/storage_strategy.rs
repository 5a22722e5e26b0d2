//! 存储策略
//!
//! 公开的存储契约：批量构造记录、按聚合与按条件的游标查询、
//! 最近快照定位与启动期索引声明。本层无状态、不加锁，
//! 只负责组合记录映射与查询构造，I/O 执行与写入由后端/调用方承担。
//!
use crate::domain_event::DomainEventMessage;
use crate::error::StoreResult;
use crate::persist::event_record::{
    AGGREGATE_IDENTIFIER_FIELD, AGGREGATE_TYPE_FIELD, EventRecord, SEQUENCE_NUMBER_FIELD,
    TIME_STAMP_FIELD,
};
use crate::persist::indexes::{event_collection_indexes, snapshot_collection_indexes};
use crate::query::{Filter, FindQuery, SortOrder};
use crate::serializer::Serializer;
use crate::store::{DocumentCollection, DocumentCursor};
use crate::upcaster::UpcasterChain;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// 事件与快照的存储契约
#[async_trait]
pub trait StorageStrategy: Send + Sync {
    /// 纯映射：与输入消息一一对应且保序，不做任何 I/O。
    /// 产出的记录由调用方/驱动负责插入，唯一性约束在插入时生效。
    fn create_records(
        &self,
        aggregate_type: &str,
        serializer: &dyn Serializer,
        messages: &[DomainEventMessage],
    ) -> StoreResult<Vec<EventRecord>>;

    /// 某聚合自 `first_sequence_number` 起的事件流，按序号升序
    async fn find_events_for_aggregate<'a>(
        &self,
        collection: &'a dyn DocumentCollection,
        aggregate_type: &str,
        aggregate_identifier: &str,
        first_sequence_number: i64,
    ) -> StoreResult<DocumentCursor<'a>>;

    /// 跨聚合事件流：条件缺省时为全集合，按（时间戳，序号）升序。
    /// 条件表达式由调用方构造，这里只负责透传。
    async fn find_events<'a>(
        &self,
        collection: &'a dyn DocumentCollection,
        criteria: Option<&Filter>,
    ) -> StoreResult<DocumentCursor<'a>>;

    /// 某聚合最近一条快照：序号降序、至多一条
    async fn find_last_snapshot<'a>(
        &self,
        collection: &'a dyn DocumentCollection,
        aggregate_type: &str,
        aggregate_identifier: &str,
    ) -> StoreResult<DocumentCursor<'a>>;

    /// 由存储返回的原始文档还原消息，经由上抬链
    fn extract_event_messages(
        &self,
        document: &Value,
        aggregate_identifier: Option<&str>,
        serializer: &dyn Serializer,
        upcaster_chain: &dyn UpcasterChain,
        skip_unknown_types: bool,
    ) -> StoreResult<Vec<DomainEventMessage>>;

    /// 幂等声明两个集合的全部索引，可在每次启动时调用
    async fn ensure_indexes(
        &self,
        events_collection: &dyn DocumentCollection,
        snapshots_collection: &dyn DocumentCollection,
    ) -> StoreResult<()>;
}

#[async_trait]
impl<T> StorageStrategy for Arc<T>
where
    T: StorageStrategy + ?Sized,
{
    fn create_records(
        &self,
        aggregate_type: &str,
        serializer: &dyn Serializer,
        messages: &[DomainEventMessage],
    ) -> StoreResult<Vec<EventRecord>> {
        (**self).create_records(aggregate_type, serializer, messages)
    }

    async fn find_events_for_aggregate<'a>(
        &self,
        collection: &'a dyn DocumentCollection,
        aggregate_type: &str,
        aggregate_identifier: &str,
        first_sequence_number: i64,
    ) -> StoreResult<DocumentCursor<'a>> {
        (**self)
            .find_events_for_aggregate(
                collection,
                aggregate_type,
                aggregate_identifier,
                first_sequence_number,
            )
            .await
    }

    async fn find_events<'a>(
        &self,
        collection: &'a dyn DocumentCollection,
        criteria: Option<&Filter>,
    ) -> StoreResult<DocumentCursor<'a>> {
        (**self).find_events(collection, criteria).await
    }

    async fn find_last_snapshot<'a>(
        &self,
        collection: &'a dyn DocumentCollection,
        aggregate_type: &str,
        aggregate_identifier: &str,
    ) -> StoreResult<DocumentCursor<'a>> {
        (**self)
            .find_last_snapshot(collection, aggregate_type, aggregate_identifier)
            .await
    }

    fn extract_event_messages(
        &self,
        document: &Value,
        aggregate_identifier: Option<&str>,
        serializer: &dyn Serializer,
        upcaster_chain: &dyn UpcasterChain,
        skip_unknown_types: bool,
    ) -> StoreResult<Vec<DomainEventMessage>> {
        (**self).extract_event_messages(
            document,
            aggregate_identifier,
            serializer,
            upcaster_chain,
            skip_unknown_types,
        )
    }

    async fn ensure_indexes(
        &self,
        events_collection: &dyn DocumentCollection,
        snapshots_collection: &dyn DocumentCollection,
    ) -> StoreResult<()> {
        (**self)
            .ensure_indexes(events_collection, snapshots_collection)
            .await
    }
}

/// 一事件一文档的存储策略。
///
/// 查询友好，但单次提交的多条事件各自独立成档，不提供跨文档原子性。
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentPerEventStorage;

impl DocumentPerEventStorage {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StorageStrategy for DocumentPerEventStorage {
    fn create_records(
        &self,
        aggregate_type: &str,
        serializer: &dyn Serializer,
        messages: &[DomainEventMessage],
    ) -> StoreResult<Vec<EventRecord>> {
        messages
            .iter()
            .map(|message| EventRecord::from_message(aggregate_type, message, serializer))
            .collect()
    }

    async fn find_events_for_aggregate<'a>(
        &self,
        collection: &'a dyn DocumentCollection,
        aggregate_type: &str,
        aggregate_identifier: &str,
        first_sequence_number: i64,
    ) -> StoreResult<DocumentCursor<'a>> {
        debug!(
            aggregate_type,
            aggregate_identifier, first_sequence_number, "loading aggregate event stream"
        );
        let query = FindQuery::builder()
            .filter(EventRecord::for_aggregate(
                aggregate_type,
                aggregate_identifier,
                first_sequence_number,
            ))
            .sort(vec![(
                SEQUENCE_NUMBER_FIELD.to_string(),
                SortOrder::Ascending,
            )])
            .build();
        collection.find(query).await
    }

    async fn find_events<'a>(
        &self,
        collection: &'a dyn DocumentCollection,
        criteria: Option<&Filter>,
    ) -> StoreResult<DocumentCursor<'a>> {
        debug!(restricted = criteria.is_some(), "loading event stream");
        let query = FindQuery::builder()
            .maybe_filter(criteria.cloned())
            .sort(vec![
                (TIME_STAMP_FIELD.to_string(), SortOrder::Ascending),
                (SEQUENCE_NUMBER_FIELD.to_string(), SortOrder::Ascending),
            ])
            .build();
        collection.find(query).await
    }

    async fn find_last_snapshot<'a>(
        &self,
        collection: &'a dyn DocumentCollection,
        aggregate_type: &str,
        aggregate_identifier: &str,
    ) -> StoreResult<DocumentCursor<'a>> {
        debug!(aggregate_type, aggregate_identifier, "loading last snapshot");
        let query = FindQuery::builder()
            .filter(
                Filter::equals(AGGREGATE_IDENTIFIER_FIELD, aggregate_identifier)
                    .and(Filter::equals(AGGREGATE_TYPE_FIELD, aggregate_type)),
            )
            .sort(vec![(
                SEQUENCE_NUMBER_FIELD.to_string(),
                SortOrder::Descending,
            )])
            .limit(1)
            .build();
        collection.find(query).await
    }

    fn extract_event_messages(
        &self,
        document: &Value,
        aggregate_identifier: Option<&str>,
        serializer: &dyn Serializer,
        upcaster_chain: &dyn UpcasterChain,
        skip_unknown_types: bool,
    ) -> StoreResult<Vec<DomainEventMessage>> {
        EventRecord::from_document(document.clone())?.to_domain_events(
            aggregate_identifier,
            serializer,
            upcaster_chain,
            skip_unknown_types,
        )
    }

    async fn ensure_indexes(
        &self,
        events_collection: &dyn DocumentCollection,
        snapshots_collection: &dyn DocumentCollection,
    ) -> StoreResult<()> {
        for index in event_collection_indexes() {
            debug!(index = index.name(), "declaring event collection index");
            events_collection.create_index(index).await?;
        }
        for index in snapshot_collection_indexes() {
            debug!(index = index.name(), "declaring snapshot collection index");
            snapshots_collection.create_index(index).await?;
        }
        Ok(())
    }
}
