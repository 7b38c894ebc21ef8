//! 家庭记账服务
//!
//! 提供收支、预算、储蓄目标等实体的 REST API，以及每周预算汇总邮件。
//!
//! ## 模块结构
//!
//! - `crud`: 通用 CRUD 动作工厂，实体只需声明输入结构与生命周期钩子
//! - `resources`: 九个实体的声明
//! - `summary`: 每周预算汇总任务
//! - `handlers` / `routes`: HTTP 层
//! - `worker`: 进程内的每周调度
//! - `bootstrap`: 空库时创建初始管理员

pub mod auth;
pub mod bootstrap;
pub mod crud;
pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod resources;
pub mod routes;
pub mod state;
pub mod summary;
pub mod worker;

pub use dto::{ApiResponse, PageResponse, PaginationParams};
pub use error::{AdminError, Result};
pub use summary::{BudgetSummaryJob, BudgetSummaryResult};
