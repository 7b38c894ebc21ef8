//! 共享库
//!
//! 包含家庭记账各组件共用的配置、错误处理、数据库连接、汇总事件模型与可观测性基础设施。

pub mod config;
pub mod database;
pub mod error;
pub mod events;
pub mod observability;
