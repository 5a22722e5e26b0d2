//! 存储映射层统一错误定义
//!
//! 聚焦记录映射、载荷类型识别、事件上抬与存储约束等最小必要集合，
//! 便于各实现层统一转换为 `StoreError`。
//!
use thiserror::Error;

/// 统一错误类型（基础库最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    // --- 记录映射/序列化 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },
    #[error("parse error: {reason}")]
    Parse { reason: String },
    #[error("unknown payload type: {payload_type}, revision={revision:?}")]
    UnknownPayloadType {
        payload_type: String,
        revision: Option<String>,
    },
    #[error("upcast failed: type={event_type}, stage={stage:?}, reason={reason}")]
    UpcastFailed {
        event_type: String,
        stage: Option<&'static str>,
        reason: String,
    },

    // --- 存储约束/后端 ---
    #[error("duplicate key: index={index}")]
    DuplicateKey { index: String },
    #[error("index conflict: index={index}, reason={reason}")]
    IndexConflict { index: String, reason: String },
    #[error("store error: {reason}")]
    Store { reason: String },
}

/// 统一 Result 类型别名
pub type StoreResult<T> = Result<T, StoreError>;

// ---- Cross-crate conversions for infrastructure convenience ----
// 允许在映射层直接使用 `?` 将 chrono 等错误转换为 StoreError

impl From<chrono::ParseError> for StoreError {
    fn from(err: chrono::ParseError) -> Self {
        StoreError::Parse {
            reason: err.to_string(),
        }
    }
}
