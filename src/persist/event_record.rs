//! 事件记录映射（EventRecord）
//!
//! 一条领域事件对应一个持久化文档。定义文档的标准形态、写入路径的
//! 构造（消息 + 序列化器 -> 记录）与读取路径的还原（记录 -> 零或多条
//! 消息，经由上抬链），以及按聚合定位事件的过滤条件。
//!
//! 文档字段名与既有存储保持字节级兼容，不可改动。
//!
use crate::domain_event::{DomainEventMessage, EventPayload, MetaData};
use crate::error::StoreResult;
use crate::query::Filter;
use crate::serializer::{
    ContentType, SerializedEventData, SerializedObject, SerializedType, SerializedValue,
    Serializer,
};
use crate::upcaster::UpcasterChain;
use bon::Builder;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 聚合标识字段名
pub const AGGREGATE_IDENTIFIER_FIELD: &str = "aggregateIdentifier";
/// 序号字段名
pub const SEQUENCE_NUMBER_FIELD: &str = "sequenceNumber";
/// 聚合类型字段名
pub const AGGREGATE_TYPE_FIELD: &str = "type";
/// 时间戳字段名
pub const TIME_STAMP_FIELD: &str = "timeStamp";
pub const SERIALIZED_PAYLOAD_FIELD: &str = "serializedPayload";
pub const PAYLOAD_TYPE_FIELD: &str = "payloadType";
pub const PAYLOAD_REVISION_FIELD: &str = "payloadRevision";
pub const SERIALIZED_META_DATA_FIELD: &str = "serializedMetaData";
pub const EVENT_IDENTIFIER_FIELD: &str = "eventIdentifier";

/// 事件的持久化形态。快照记录复用同一形态，只是落在独立集合中。
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "aggregateIdentifier")]
    aggregate_identifier: String,
    #[serde(rename = "sequenceNumber")]
    sequence_number: i64,
    #[serde(rename = "type")]
    aggregate_type: String,
    #[serde(rename = "timeStamp")]
    time_stamp: String,
    #[serde(rename = "serializedPayload")]
    serialized_payload: SerializedValue,
    #[serde(rename = "payloadType")]
    payload_type: String,
    #[serde(rename = "payloadRevision")]
    payload_revision: Option<String>,
    #[serde(rename = "serializedMetaData")]
    serialized_meta_data: SerializedValue,
    #[serde(rename = "eventIdentifier")]
    event_identifier: String,
}

impl EventRecord {
    /// 由消息构造待持久化的记录。
    ///
    /// 表示形态按序列化器能力选择：支持原生文档则用之，否则回退文本；
    /// 载荷与元数据始终使用同一形态。序列化失败原样向上传播。
    pub fn from_message(
        aggregate_type: &str,
        message: &DomainEventMessage,
        serializer: &dyn Serializer,
    ) -> StoreResult<Self> {
        let target = if serializer.can_serialize_to(ContentType::NativeDocument) {
            ContentType::NativeDocument
        } else {
            ContentType::Text
        };

        let (payload, payload_type) = serializer.serialize(message.payload(), target)?.into_parts();

        // 元数据的逻辑类型与修订号在此丢弃，不写入文档
        let metadata = EventPayload::builder()
            .payload_type(MetaData::TYPE_NAME.to_string())
            .data(serde_json::to_value(message.metadata())?)
            .build();
        let (metadata, _) = serializer.serialize(&metadata, target)?.into_parts();

        Ok(Self {
            aggregate_identifier: message.aggregate_identifier().to_string(),
            sequence_number: message.sequence_number(),
            aggregate_type: aggregate_type.to_string(),
            time_stamp: lexical_timestamp(message.timestamp()),
            serialized_payload: payload,
            payload_type: payload_type.name().to_string(),
            payload_revision: payload_type.revision().map(|r| r.to_string()),
            serialized_meta_data: metadata,
            event_identifier: message.event_identifier().to_string(),
        })
    }

    /// 由存储返回的原始文档还原记录；缺失或不可读字段立即报错
    pub fn from_document(document: Value) -> StoreResult<Self> {
        Ok(serde_json::from_value(document)?)
    }

    /// 记录的文档形态，可直接批量插入
    pub fn as_document(&self) -> StoreResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// 经上抬链还原为领域事件消息，可能产出零条、一条或多条
    pub fn to_domain_events(
        &self,
        aggregate_identifier: Option<&str>,
        serializer: &dyn Serializer,
        upcaster_chain: &dyn UpcasterChain,
        skip_unknown_types: bool,
    ) -> StoreResult<Vec<DomainEventMessage>> {
        upcaster_chain.upcast_and_deserialize(
            self,
            aggregate_identifier,
            serializer,
            skip_unknown_types,
        )
    }

    /// 按聚合定位事件的过滤条件：标识相等、类型相等、序号不小于起点
    pub fn for_aggregate(
        aggregate_type: &str,
        aggregate_identifier: &str,
        first_sequence_number: i64,
    ) -> Filter {
        Filter::equals(AGGREGATE_IDENTIFIER_FIELD, aggregate_identifier)
            .and(Filter::greater_or_equal(
                SEQUENCE_NUMBER_FIELD,
                first_sequence_number,
            ))
            .and(Filter::equals(AGGREGATE_TYPE_FIELD, aggregate_type))
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn payload_type(&self) -> &str {
        &self.payload_type
    }

    pub fn payload_revision(&self) -> Option<&str> {
        self.payload_revision.as_deref()
    }

    pub fn time_stamp(&self) -> &str {
        &self.time_stamp
    }
}

impl SerializedEventData for EventRecord {
    fn event_identifier(&self) -> &str {
        &self.event_identifier
    }

    fn aggregate_identifier(&self) -> &str {
        &self.aggregate_identifier
    }

    fn sequence_number(&self) -> i64 {
        self.sequence_number
    }

    fn timestamp(&self) -> StoreResult<DateTime<Utc>> {
        Ok(DateTime::parse_from_rfc3339(&self.time_stamp)?.with_timezone(&Utc))
    }

    fn payload(&self) -> SerializedObject {
        SerializedObject::new(
            self.serialized_payload.clone(),
            SerializedType::new(self.payload_type.clone(), self.payload_revision.clone()),
        )
    }

    fn metadata(&self) -> SerializedObject {
        // 元数据的逻辑类型未持久化，读取时固定回退为默认类型、无修订号
        SerializedObject::new(
            self.serialized_meta_data.clone(),
            SerializedType::new(MetaData::TYPE_NAME, None),
        )
    }
}

/// 可按字典序排序的时间戳形态：定宽、UTC、微秒精度
pub(crate) fn lexical_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}
