//! 角色检查中间件

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::future::Future;
use std::pin::Pin;

use super::auth::unauthorized_response;
use crate::auth::Claims;

/// 角色检查中间件工厂
///
/// 必须挂在 `auth_middleware` 之后，依赖其注入的 Claims。
///
/// # 示例
/// ```ignore
/// Router::new()
///     .route("/users", get(list_users))
///     .route_layer(axum::middleware::from_fn(require_role("admin")))
/// ```
pub fn require_role(
    role: &'static str,
) -> impl Fn(Request<Body>, Next) -> Pin<Box<dyn Future<Output = Response> + Send>> + Clone + Send
{
    move |request: Request<Body>, next: Next| {
        Box::pin(async move { check_role(request, next, role).await })
    }
}

async fn check_role(request: Request<Body>, next: Next, required_role: &str) -> Response {
    let allowed = match request.extensions().get::<Claims>() {
        Some(claims) => claims.has_role(required_role),
        None => return unauthorized_response("未认证"),
    };

    if allowed {
        next.run(request).await
    } else {
        forbidden_response(&format!("需要 {} 角色", required_role))
    }
}

/// 生成 403 禁止访问响应
fn forbidden_response(message: &str) -> Response {
    let body = json!({
        "success": false,
        "code": "FORBIDDEN",
        "message": message,
        "data": null
    });

    (StatusCode::FORBIDDEN, axum::Json(body)).into_response()
}
