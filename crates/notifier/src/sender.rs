//! 邮件发送器
//!
//! 通过 `EmailSender` trait 抽象发送行为：
//! - `LogEmailSender`：仅记录日志，开发环境与未配置邮件服务时使用
//! - `HttpEmailSender`：以 JSON 调用邮件服务 HTTP API（Bearer 鉴权）

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use budget_shared::config::EmailConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::NotificationError;

/// 一封待发送的邮件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// 发送结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendResult {
    /// 邮件服务返回的消息标识，用于追踪投递状态
    pub message_id: String,
}

/// 邮件发送器 trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// 发送一封邮件
    async fn send(&self, message: &EmailMessage) -> Result<SendResult, NotificationError>;

    /// 发送器名称，用于日志
    fn provider(&self) -> &'static str;
}

/// 根据配置构建发送器
///
/// `provider = "http"` 时必须提供 `api_key`，否则返回配置错误。
pub fn build_sender(config: &EmailConfig) -> Result<Arc<dyn EmailSender>, NotificationError> {
    match config.provider.as_str() {
        "log" => Ok(Arc::new(LogEmailSender)),
        "http" => {
            let api_key = config
                .api_key
                .clone()
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| NotificationError::Config("http 发送方式需要 api_key".to_string()))?;
            Ok(Arc::new(HttpEmailSender::new(
                config.api_url.clone(),
                api_key,
                Duration::from_secs(config.timeout_seconds),
            )?))
        }
        other => Err(NotificationError::Config(format!(
            "未知的邮件发送方式: {other}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// 日志发送器
// ---------------------------------------------------------------------------

/// 模拟邮件发送器
///
/// 只记录日志不真正投递，便于在无外部依赖的情况下验证汇总流程
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<SendResult, NotificationError> {
        let message_id = Uuid::now_v7().to_string();

        info!(
            provider = "log",
            to = %message.to,
            subject = %message.subject,
            message_id = %message_id,
            html_length = message.html.len(),
            "模拟发送邮件"
        );
        debug!(body = %message.text, "邮件正文");

        Ok(SendResult { message_id })
    }

    fn provider(&self) -> &'static str {
        "log"
    }
}

// ---------------------------------------------------------------------------
// HTTP 发送器
// ---------------------------------------------------------------------------

/// 邮件服务 API 请求体
#[derive(Serialize)]
struct SendEmailBody<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

/// 邮件服务 API 成功响应
#[derive(Deserialize)]
struct SendEmailResponse {
    id: String,
}

/// 通过 HTTP API 投递邮件
pub struct HttpEmailSender {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl HttpEmailSender {
    pub fn new(
        api_url: String,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, NotificationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotificationError::Config(format!("HTTP 客户端构建失败: {e}")))?;

        Ok(Self {
            client,
            api_url,
            api_key,
        })
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<SendResult, NotificationError> {
        let body = SendEmailBody {
            from: &message.from,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html,
            text: &message.text,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotificationError::SendFailed {
                recipient: message.to.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                provider = "http",
                to = %message.to,
                status = status.as_u16(),
                "邮件服务拒绝请求"
            );
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SendEmailResponse =
            response
                .json()
                .await
                .map_err(|e| NotificationError::SendFailed {
                    recipient: message.to.clone(),
                    reason: format!("响应解析失败: {e}"),
                })?;

        info!(
            provider = "http",
            to = %message.to,
            message_id = %parsed.id,
            "邮件已提交到邮件服务"
        );

        Ok(SendResult {
            message_id: parsed.id,
        })
    }

    fn provider(&self) -> &'static str {
        "http"
    }
}

// ---------------------------------------------------------------------------
// 测试
// ---------------------------------------------------------------------------
