//! 文档型事件存储映射层（event-docstore）
//!
//! 事件溯源运行时与文档数据库之间的持久化映射：一条领域事件对应
//! 一个持久化文档，通过索引设计保证追加序的唯一性（乐观并发检测）
//! 与有序读取，并在读取路径经由上抬链完成旧事件形态的兼容。
//!
//! 主要构件：
//! - 记录映射与存储策略（`persist`）；
//! - 查询模型（`query`）与存储能力接口（`store`）；
//! - 序列化与上抬的能力边界（`serializer`/`upcaster`）；
//! - 消息边界类型（`domain_event`）与统一错误（`error`）。
//!
//! 本 crate 不管理连接与事务，不决定快照时机，也不内置序列化器/
//! 上抬器实现；这些由上层装配并注入。
//!
pub mod domain_event;
pub mod error;
pub mod persist;
pub mod query;
pub mod serializer;
pub mod store;
pub mod upcaster;
