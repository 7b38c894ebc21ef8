//! 家庭记账服务入口

use std::sync::Arc;

use axum::{
    Json, extract::Request, http::HeaderValue, middleware, middleware::Next, response::Response,
    routing::get,
};
use budget_notifier::build_sender;
use budget_service::{
    auth::{JwtConfig, JwtManager},
    bootstrap::{self, AdminSeed},
    crud::{PgRecordStore, RecordStore},
    routes,
    state::AppState,
    summary::{BudgetSummaryJob, PgSummaryStore},
    worker::SummaryWorker,
};
use budget_shared::{
    config::AppConfig,
    database::Database,
    observability::{self, middleware as obs_middleware},
};
use tokio::net::TcpListener;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};
use tracing::{info, warn};

const SERVICE_NAME: &str = "budget-service";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load(SERVICE_NAME).unwrap_or_default();

    let obs_config = config.observability.clone().with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config).await?;

    info!("Starting {} on {}", SERVICE_NAME, config.server_addr());

    let db = Database::connect(&config.database).await?;
    if config.database.run_migrations {
        db.run_migrations().await?;
    }

    let jwt_secret = required_secret(&config, "BUDGET_JWT_SECRET", "budget-service-secret-key-change-in-production");
    let cron_secret = required_secret(&config, "BUDGET_CRON_SECRET", "budget-cron-secret-change-in-production");

    let jwt_expires = std::env::var("BUDGET_JWT_EXPIRES_SECS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(7 * 86400);

    let jwt_config = JwtConfig {
        secret: jwt_secret,
        expires_in_secs: jwt_expires,
        issuer: SERVICE_NAME.to_string(),
    };

    let records: Arc<dyn RecordStore> = Arc::new(PgRecordStore::new(db.pool().clone()));
    bootstrap::ensure_admin(records.clone(), || AdminSeed {
        name: std::env::var("BUDGET_ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string()),
        email: required_secret(&config, "BUDGET_ADMIN_EMAIL", "admin@example.com"),
        password: required_secret(&config, "BUDGET_ADMIN_PASSWORD", "change-me-admin-password"),
    })
    .await?;

    let sender = build_sender(&config.email)?;
    info!(provider = sender.provider(), "邮件发送器已初始化");

    let summary_job = Arc::new(BudgetSummaryJob::new(
        Arc::new(PgSummaryStore::new(db.pool().clone())),
        sender,
        &config.summary,
        config.email.from_address.clone(),
    )?);

    if config.summary.scheduler_enabled {
        let worker = SummaryWorker::new(summary_job.clone(), &config.summary.schedule)?;
        tokio::spawn(async move {
            worker.run().await;
        });
    } else {
        info!("进程内调度已关闭，预算汇总只能通过 /api/cron/budget-summary 触发");
    }

    let state = AppState {
        pool: db.pool().clone(),
        jwt_manager: Arc::new(JwtManager::new(jwt_config)),
        records,
        summary_job,
        cron_secret: Arc::from(cron_secret),
    };

    let cors = cors_layer(&config);

    let app = routes::app(state)
        .route("/health", get(health_check))
        .route(
            "/ready",
            get({
                let db_for_ready = db;
                move || readiness_check(db_for_ready.clone())
            }),
        )
        .layer(middleware::from_fn(security_headers))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id));

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

/// 读取密钥：生产环境必须通过环境变量注入，开发环境使用默认值
fn required_secret(config: &AppConfig, var: &str, fallback: &str) -> String {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => {
            if config.is_production() {
                panic!("{var} must be set in production environment");
            }
            warn!("Using default value for {var} - set it for production");
            fallback.to_string()
        }
    }
}

/// CORS 来源来自 `server.cors_origins`，逗号分隔，`*` 表示全部
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let allowed_origins = config.server.cors_origins.trim();

    if allowed_origins == "*" {
        if config.is_production() {
            warn!("cors_origins=\"*\" 在生产环境中不安全，请设置为具体域名");
        }
        info!("CORS allowed_origins: * (all origins)");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        info!("CORS allowed_origins: {}", allowed_origins);
        let origins: Vec<_> = allowed_origins
            .split(',')
            .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// 为所有响应注入 HTTP 安全头
async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert("x-content-type-options", HeaderValue::from_static("nosniff"));
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "strict-transport-security",
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    headers.insert("x-xss-protection", HeaderValue::from_static("0"));
    response
}

/// 监听 SIGTERM 与 Ctrl+C，触发优雅关闭
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "注册 Ctrl+C 处理器失败");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "注册 SIGTERM 处理器失败");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}

/// 存活探针
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": SERVICE_NAME
    }))
}

/// 就绪探针：检查数据库连接
async fn readiness_check(db: Database) -> Json<serde_json::Value> {
    let db_ok = db.health_check().await.is_ok();

    Json(serde_json::json!({
        "status": if db_ok { "ok" } else { "degraded" },
        "service": SERVICE_NAME,
        "checks": {
            "database": if db_ok { "ok" } else { "fail" }
        }
    }))
}
