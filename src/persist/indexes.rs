//! 索引策略
//!
//! 固定的索引定义表，由 `ensure_indexes` 在启动期一次性消费。
//! 索引名称与既有存储保持一致，参与幂等重建。
//!
use crate::persist::event_record::{
    AGGREGATE_IDENTIFIER_FIELD, AGGREGATE_TYPE_FIELD, SEQUENCE_NUMBER_FIELD, TIME_STAMP_FIELD,
};
use crate::query::{IndexSpec, SortOrder};

/// 唯一索引名：`(aggregateIdentifier, type, sequenceNumber)` 的唯一性
/// 即乐观并发检测的落点
pub const UNIQUE_AGGREGATE_INDEX: &str = "uniqueAggregateIndex";
/// 非唯一索引名：支撑按 `(timeStamp, sequenceNumber)` 的全局有序读取
pub const ORDERED_EVENT_STREAM_INDEX: &str = "orderedEventStreamIndex";

/// 事件集合的索引定义
pub fn event_collection_indexes() -> Vec<IndexSpec> {
    vec![
        unique_aggregate_index(),
        IndexSpec::builder()
            .name(ORDERED_EVENT_STREAM_INDEX.to_string())
            .keys(vec![
                (TIME_STAMP_FIELD.to_string(), SortOrder::Ascending),
                (SEQUENCE_NUMBER_FIELD.to_string(), SortOrder::Ascending),
            ])
            .build(),
    ]
}

/// 快照集合的索引定义
pub fn snapshot_collection_indexes() -> Vec<IndexSpec> {
    vec![unique_aggregate_index()]
}

fn unique_aggregate_index() -> IndexSpec {
    IndexSpec::builder()
        .name(UNIQUE_AGGREGATE_INDEX.to_string())
        .keys(vec![
            (AGGREGATE_IDENTIFIER_FIELD.to_string(), SortOrder::Ascending),
            (AGGREGATE_TYPE_FIELD.to_string(), SortOrder::Ascending),
            (SEQUENCE_NUMBER_FIELD.to_string(), SortOrder::Ascending),
        ])
        .unique(true)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_indexes_match_declared_names_and_uniqueness() {
        let indexes = event_collection_indexes();
        assert_eq!(indexes.len(), 2);

        assert_eq!(indexes[0].name(), UNIQUE_AGGREGATE_INDEX);
        assert!(indexes[0].unique());
        assert_eq!(
            indexes[0]
                .keys()
                .iter()
                .map(|(field, _)| field.as_str())
                .collect::<Vec<_>>(),
            vec!["aggregateIdentifier", "type", "sequenceNumber"]
        );

        assert_eq!(indexes[1].name(), ORDERED_EVENT_STREAM_INDEX);
        assert!(!indexes[1].unique());
    }

    #[test]
    fn snapshot_collection_reuses_unique_aggregate_index() {
        let indexes = snapshot_collection_indexes();
        assert_eq!(indexes.len(), 1);
        assert_eq!(indexes[0].name(), UNIQUE_AGGREGATE_INDEX);
        assert!(indexes[0].unique());
    }
}
