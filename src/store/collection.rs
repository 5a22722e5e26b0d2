use crate::error::StoreResult;
use crate::query::{FindQuery, IndexSpec};
use async_trait::async_trait;
use futures_core::stream::BoxStream;
use serde_json::Value;
use std::sync::Arc;

/// 惰性、单向、一次性的文档游标。
///
/// 消费方可以随时停止拉取；游标被 drop 即释放底层资源，
/// 包括出错与提前中断的退出路径。
pub type DocumentCursor<'a> = BoxStream<'a, StoreResult<Value>>;

/// 文档集合能力接口
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    async fn find(&self, query: FindQuery) -> StoreResult<DocumentCursor<'_>>;

    /// 幂等声明索引：同名同定义是空操作，同名不同定义返回
    /// `StoreError::IndexConflict`
    async fn create_index(&self, index: IndexSpec) -> StoreResult<()>;
}

#[async_trait]
impl<T> DocumentCollection for Arc<T>
where
    T: DocumentCollection + ?Sized,
{
    async fn find(&self, query: FindQuery) -> StoreResult<DocumentCursor<'_>> {
        (**self).find(query).await
    }

    async fn create_index(&self, index: IndexSpec) -> StoreResult<()> {
        (**self).create_index(index).await
    }
}
