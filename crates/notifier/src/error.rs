//! 通知组件错误类型
//!
//! 区分配置错误、传输错误与邮件服务拒收，便于上层记录失败原因。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("邮件发送失败: 收件人={recipient}, 原因={reason}")]
    SendFailed { recipient: String, reason: String },

    #[error("邮件服务拒绝请求: status={status}, body={body}")]
    Rejected { status: u16, body: String },

    #[error("邮件配置无效: {0}")]
    Config(String),

    #[error(transparent)]
    Shared(#[from] budget_shared::error::BudgetError),
}
