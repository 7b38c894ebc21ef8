//! 通用 CRUD 处理器
//!
//! 每个实体复用同一组处理器，按类型参数 `R` 区分。路由见 `routes::resource_routes`。

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    auth::Claims,
    crud::{Actor, CrudActions, Record, Resource},
    dto::{ApiResponse, PageResponse, PaginationParams},
    error::Result,
    extract::FormOrJson,
    state::AppState,
};

fn actions<R: Resource + Default>(state: &AppState) -> CrudActions<R> {
    CrudActions::new(R::default(), state.records.clone())
}

/// GET /api/{resource}
pub async fn list<R: Resource + Default>(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<Record>>>> {
    let page = actions::<R>(&state).list(&params).await?;
    Ok(Json(ApiResponse::success(page)))
}

/// GET /api/{resource}/{id}
pub async fn get<R: Resource + Default>(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Record>>> {
    let record = actions::<R>(&state).get(id).await?;
    Ok(Json(ApiResponse::success(record)))
}

/// POST /api/{resource}
pub async fn create<R: Resource + Default>(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    FormOrJson(input): FormOrJson<R::Input>,
) -> Result<(StatusCode, Json<ApiResponse<Record>>)> {
    let actor = Actor::from_claims(&claims)?;
    let record = actions::<R>(&state).create(&actor, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(record, "创建成功")),
    ))
}

/// PUT /api/{resource}/{id}
pub async fn update<R: Resource + Default>(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    FormOrJson(input): FormOrJson<R::Input>,
) -> Result<Json<ApiResponse<Record>>> {
    let actor = Actor::from_claims(&claims)?;
    let record = actions::<R>(&state).update(&actor, id, input).await?;
    Ok(Json(ApiResponse::success_with_message(record, "更新成功")))
}

/// DELETE /api/{resource}/{id}
///
/// 返回被删除的记录
pub async fn delete<R: Resource + Default>(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Record>>> {
    let actor = Actor::from_claims(&claims)?;
    let record = actions::<R>(&state).delete(&actor, id).await?;
    Ok(Json(ApiResponse::success_with_message(record, "删除成功")))
}
