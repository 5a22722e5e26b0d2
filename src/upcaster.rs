//! 事件上抬边界
//!
//! 当事件载荷结构演进时，上抬链在读取路径将旧形态转换为当前形态
//! （可拆分、合并或丢弃），随后交给序列化器还原为消息。本 crate 只定义
//! 能力接口与不做演进的默认链；具体转换算法由上层提供并注入。
//!
use crate::domain_event::{DomainEventMessage, MetaData};
use crate::error::{StoreError, StoreResult};
use crate::serializer::{SerializedEventData, Serializer};
use std::sync::Arc;

/// 上抬并反序列化：一条记录可产出零条（未知类型被跳过）、一条（常规）
/// 或多条（旧事件被拆分）消息，产出顺序必须保持链返回的顺序。
pub trait UpcasterChain: Send + Sync {
    fn upcast_and_deserialize(
        &self,
        data: &dyn SerializedEventData,
        aggregate_identifier: Option<&str>,
        serializer: &dyn Serializer,
        skip_unknown_types: bool,
    ) -> StoreResult<Vec<DomainEventMessage>>;
}

impl<T> UpcasterChain for Arc<T>
where
    T: UpcasterChain + ?Sized,
{
    fn upcast_and_deserialize(
        &self,
        data: &dyn SerializedEventData,
        aggregate_identifier: Option<&str>,
        serializer: &dyn Serializer,
        skip_unknown_types: bool,
    ) -> StoreResult<Vec<DomainEventMessage>> {
        (**self).upcast_and_deserialize(data, aggregate_identifier, serializer, skip_unknown_types)
    }
}

/// 不做形态演进的默认链：直接反序列化载荷与元数据，产出至多一条消息
#[derive(Debug, Clone, Copy, Default)]
pub struct NoUpcasting;

impl UpcasterChain for NoUpcasting {
    fn upcast_and_deserialize(
        &self,
        data: &dyn SerializedEventData,
        aggregate_identifier: Option<&str>,
        serializer: &dyn Serializer,
        skip_unknown_types: bool,
    ) -> StoreResult<Vec<DomainEventMessage>> {
        let payload = match serializer.deserialize(&data.payload()) {
            Ok(payload) => payload,
            Err(StoreError::UnknownPayloadType { .. }) if skip_unknown_types => {
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };

        let metadata = serializer.deserialize(&data.metadata())?;
        let metadata: MetaData = serde_json::from_value(metadata.data().clone())?;

        let aggregate_identifier = aggregate_identifier.unwrap_or(data.aggregate_identifier());

        let message = DomainEventMessage::builder()
            .event_identifier(data.event_identifier().to_string())
            .aggregate_identifier(aggregate_identifier.to_string())
            .sequence_number(data.sequence_number())
            .timestamp(data.timestamp()?)
            .payload(payload)
            .metadata(metadata)
            .build();

        Ok(vec![message])
    }
}
