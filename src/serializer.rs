//! 序列化边界
//!
//! 定义映射层消费的序列化能力接口与中间形态：
//! - `ContentType`：文本 / 原生文档两种表示形态的显式标签；
//! - `SerializedValue`：已序列化的值，读取时按运行时形状还原标签；
//! - `SerializedObject`：值 + 逻辑类型（名称与修订号）；
//! - `Serializer`：能力接口（探测可用形态、序列化、反序列化）；
//! - `SerializedEventData`：记录暴露给上抬/反序列化方的只读视图。
//!
//! 具体序列化器由上层提供并注入，本 crate 不内置实现。
//!
use crate::domain_event::EventPayload;
use crate::error::StoreResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// 表示形态：UTF-8 文本或原生结构化文档
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Text,
    NativeDocument,
}

/// 已序列化的值，带显式形态标签。
///
/// 持久化时 `Text` 落为字符串、`Document` 落为原生文档；读取时由存储值的
/// 运行时形状决定变体（字符串归 `Text`，其余归 `Document`），此后一律以
/// 标签为准，不再做形状探测。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SerializedValue {
    Text(String),
    Document(Value),
}

impl SerializedValue {
    pub fn content_type(&self) -> ContentType {
        match self {
            SerializedValue::Text(_) => ContentType::Text,
            SerializedValue::Document(_) => ContentType::NativeDocument,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SerializedValue::Text(text) => Some(text),
            SerializedValue::Document(_) => None,
        }
    }

    pub fn as_document(&self) -> Option<&Value> {
        match self {
            SerializedValue::Text(_) => None,
            SerializedValue::Document(document) => Some(document),
        }
    }
}

/// 逻辑类型：完全限定类型名 + 可空修订号
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedType {
    name: String,
    revision: Option<String>,
}

impl SerializedType {
    pub fn new(name: impl Into<String>, revision: Option<String>) -> Self {
        Self {
            name: name.into(),
            revision,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }
}

/// 已序列化对象：值与逻辑类型的组合
#[derive(Debug, Clone, PartialEq)]
pub struct SerializedObject {
    data: SerializedValue,
    serialized_type: SerializedType,
}

impl SerializedObject {
    pub fn new(data: SerializedValue, serialized_type: SerializedType) -> Self {
        Self {
            data,
            serialized_type,
        }
    }

    pub fn data(&self) -> &SerializedValue {
        &self.data
    }

    pub fn serialized_type(&self) -> &SerializedType {
        &self.serialized_type
    }

    pub fn content_type(&self) -> ContentType {
        self.data.content_type()
    }

    pub fn into_parts(self) -> (SerializedValue, SerializedType) {
        (self.data, self.serialized_type)
    }
}

/// 序列化器能力接口
pub trait Serializer: Send + Sync {
    /// 探测是否支持目标表示形态
    fn can_serialize_to(&self, content_type: ContentType) -> bool;

    fn serialize(
        &self,
        payload: &EventPayload,
        content_type: ContentType,
    ) -> StoreResult<SerializedObject>;

    /// 类型不在实现方注册表内时返回 `StoreError::UnknownPayloadType`
    fn deserialize(&self, object: &SerializedObject) -> StoreResult<EventPayload>;
}

impl<T> Serializer for Arc<T>
where
    T: Serializer + ?Sized,
{
    fn can_serialize_to(&self, content_type: ContentType) -> bool {
        (**self).can_serialize_to(content_type)
    }

    fn serialize(
        &self,
        payload: &EventPayload,
        content_type: ContentType,
    ) -> StoreResult<SerializedObject> {
        (**self).serialize(payload, content_type)
    }

    fn deserialize(&self, object: &SerializedObject) -> StoreResult<EventPayload> {
        (**self).deserialize(object)
    }
}

/// 记录暴露给上抬/反序列化方的只读视图
pub trait SerializedEventData {
    fn event_identifier(&self) -> &str;

    fn aggregate_identifier(&self) -> &str;

    fn sequence_number(&self) -> i64;

    /// 解析持久化的字典序时间戳
    fn timestamp(&self) -> StoreResult<DateTime<Utc>>;

    fn payload(&self) -> SerializedObject;

    /// 元数据的逻辑类型固定回退为默认值，见 [`crate::domain_event::MetaData::TYPE_NAME`]
    fn metadata(&self) -> SerializedObject;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stored_string_decodes_as_text() {
        let value: SerializedValue = serde_json::from_value(json!("{\"a\":1}")).unwrap();
        assert_eq!(value.content_type(), ContentType::Text);
        assert_eq!(value.as_text(), Some("{\"a\":1}"));
    }

    #[test]
    fn stored_object_decodes_as_document() {
        let value: SerializedValue = serde_json::from_value(json!({"a": 1})).unwrap();
        assert_eq!(value.content_type(), ContentType::NativeDocument);
        assert_eq!(value.as_document(), Some(&json!({"a": 1})));
    }

    #[test]
    fn text_round_trips_as_plain_string() {
        let value = SerializedValue::Text("payload".into());
        assert_eq!(serde_json::to_value(&value).unwrap(), json!("payload"));
    }
}
