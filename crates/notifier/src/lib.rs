//! 预算通知组件
//!
//! 负责把每周预算汇总渲染成邮件并通过邮件服务投递。
//! 发送行为通过 `EmailSender` trait 抽象，逐个收件人独立发送，
//! 单个收件人失败由调用方计数，不影响其他收件人。

pub mod error;
pub mod sender;
pub mod templates;

pub use error::NotificationError;
pub use sender::{
    EmailMessage, EmailSender, HttpEmailSender, LogEmailSender, SendResult, build_sender,
};
pub use templates::{RenderedEmail, SummaryEmailTemplate, format_money};
