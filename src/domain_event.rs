//! 领域事件消息边界类型
//!
//! 定义映射层消费的事件消息形态：载荷对象（`EventPayload`）、元数据
//! （`MetaData`）与不可变的领域事件消息（`DomainEventMessage`）。
//! 消息本身由上层运行时构造，这里只约定接口边界上的最小字段集。
//!
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// 事件载荷对象：内存对象形态 + 逻辑类型名 + 修订号
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct EventPayload {
    payload_type: String,
    revision: Option<String>,
    data: Value,
}

impl EventPayload {
    pub fn payload_type(&self) -> &str {
        &self.payload_type
    }

    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    pub fn data(&self) -> &Value {
        &self.data
    }
}

/// 事件元数据（键值对）。
///
/// 元数据的逻辑类型名与修订号不随文档持久化；重建时一律回退为
/// [`MetaData::TYPE_NAME`] 且无修订号。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetaData(BTreeMap<String, Value>);

impl MetaData {
    /// 重建元数据时使用的固定逻辑类型名
    pub const TYPE_NAME: &'static str = "event.metadata";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for MetaData {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// 不可变领域事件消息
///
/// 未显式给定事件标识时，构造期生成一个 v4 uuid。
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct DomainEventMessage {
    #[builder(default = Uuid::new_v4().to_string())]
    event_identifier: String,
    aggregate_identifier: String,
    sequence_number: i64,
    timestamp: DateTime<Utc>,
    payload: EventPayload,
    #[builder(default)]
    metadata: MetaData,
}

impl DomainEventMessage {
    pub fn event_identifier(&self) -> &str {
        &self.event_identifier
    }

    pub fn aggregate_identifier(&self) -> &str {
        &self.aggregate_identifier
    }

    pub fn sequence_number(&self) -> i64 {
        self.sequence_number
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    pub fn metadata(&self) -> &MetaData {
        &self.metadata
    }
}
