//! 认证相关的 HTTP 处理器
//!
//! 提供登录和获取当前用户的 API

use axum::{Extension, Json, extract::State};
use sqlx::FromRow;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{Claims, verify_password};
use crate::dto::{ApiResponse, CurrentUserDto, LoginRequest, LoginResponse};
use crate::error::{AdminError, Result};
use crate::extract::FormOrJson;
use crate::state::AppState;

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    is_banned: bool,
}

impl From<UserRow> for CurrentUserDto {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role,
        }
    }
}

/// 用户登录
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    FormOrJson(req): FormOrJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>> {
    req.validate()?;

    let user: UserRow = sqlx::query_as(
        r#"
        SELECT id, name, email, password_hash, role, is_banned
        FROM users
        WHERE LOWER(email) = LOWER($1)
        "#,
    )
    .bind(req.email.trim())
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AdminError::InvalidCredentials)?;

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(AdminError::InvalidCredentials);
    }

    // 密码正确后再暴露封禁状态，避免探测账号是否存在
    if user.is_banned {
        return Err(AdminError::UserDisabled);
    }

    let (token, expires_at) = state.jwt_manager.generate_token(
        user.id,
        &user.name,
        &user.email,
        vec![user.role.clone()],
    )?;

    info!(user_id = %user.id, "用户登录");

    Ok(Json(ApiResponse::success(LoginResponse {
        token,
        expires_at,
        user: user.into(),
    })))
}

/// 获取当前用户信息
///
/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<CurrentUserDto>>> {
    let user_id = claims.user_id()?;

    let user: UserRow = sqlx::query_as(
        r#"
        SELECT id, name, email, password_hash, role, is_banned
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AdminError::not_found("user", user_id))?;

    if user.is_banned {
        return Err(AdminError::UserDisabled);
    }

    Ok(Json(ApiResponse::success(user.into())))
}
