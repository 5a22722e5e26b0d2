//! 持久化映射（persist）
//!
//! 将内存中的领域事件消息映射为可查询的持久化文档，并在读取路径
//! 还原为消息。包含：
//! - 记录映射（`EventRecord`）：一事件一文档的双向转换；
//! - 存储策略（`StorageStrategy`/`DocumentPerEventStorage`）：批量构造、
//!   按聚合/按条件查询、快照定位与索引声明；
//! - 索引策略（`indexes`）：启动期一次性消费的固定索引定义表。
//!
//! 本模块聚焦映射与查询构造，文档的实际插入与约束执行由后端承担。
//!
pub mod event_record;
pub mod indexes;
mod storage_strategy;

pub use event_record::EventRecord;
pub use storage_strategy::{DocumentPerEventStorage, StorageStrategy};
