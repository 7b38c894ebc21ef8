//! JWT 认证中间件
//!
//! 验证请求中的 Bearer Token 并将用户信息注入请求扩展

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tracing::warn;

use crate::{
    auth::Claims,
    crud::Resource,
    error::AdminError,
    resources::Users,
    state::AppState,
};

/// 不需要登录即可访问的路径前缀
///
/// 定时任务入口由自己的密钥保护，不走 JWT。
const PUBLIC_PATHS: [&str; 4] = ["/api/auth/login", "/api/cron/", "/health", "/ready"];

/// 认证中间件
///
/// 从 Authorization header 中提取 Bearer Token，验证后将 Claims 注入请求扩展。
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if PUBLIC_PATHS.iter().any(|p| path.starts_with(p)) {
        return next.run(request).await;
    }

    let token = match request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
    {
        Some(token) => token,
        None => return unauthorized_response("缺少认证 Token"),
    };

    match state.jwt_manager.verify_token(token) {
        Ok(claims) => {
            if let Err(e) = ensure_active(&state, &claims).await {
                warn!(user = %claims.sub, error = %e, "账户不可用，拒绝请求");
                return e.into_response();
            }
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => unauthorized_response(&e.to_string()),
    }
}

/// Token 未过期也要确认账户仍存在且未被封禁
async fn ensure_active(state: &AppState, claims: &Claims) -> Result<(), AdminError> {
    let id = claims.user_id()?;
    let user = state
        .records
        .get(Users::TABLE, id)
        .await?
        .ok_or_else(|| AdminError::Unauthorized("账户不存在".to_string()))?;
    if user.get("is_banned").and_then(Value::as_bool).unwrap_or(false) {
        return Err(AdminError::UserDisabled);
    }
    Ok(())
}

/// 生成 401 未授权响应
pub(crate) fn unauthorized_response(message: &str) -> Response {
    let body = json!({
        "success": false,
        "code": "UNAUTHORIZED",
        "message": message,
        "data": null
    });

    (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
}
