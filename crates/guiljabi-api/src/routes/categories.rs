//! 카테고리 endpoint.
//!
//! 카테고리 트리의 공개 조회를 제공합니다. 생성/삭제는 관리자
//! 라우터(`/api/v1/admin/categories`)에 있습니다.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{db_error, not_found, ApiResult};
use crate::repository::{CategoryRecord, CategoryRepository};
use crate::state::AppState;

/// 카테고리 목록 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryListResponse {
    pub cnt: usize,
    pub list: Vec<CategoryRecord>,
}

impl From<Vec<CategoryRecord>> for CategoryListResponse {
    fn from(list: Vec<CategoryRecord>) -> Self {
        Self {
            cnt: list.len(),
            list,
        }
    }
}

/// 루트 카테고리 목록 조회.
///
/// GET /api/v1/categories/root
pub async fn root_categories(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<CategoryListResponse>> {
    let list = CategoryRepository::roots(&state.db_pool)
        .await
        .map_err(db_error)?;

    Ok(Json(list.into()))
}

/// 자식 카테고리 목록 조회.
///
/// GET /api/v1/categories/{pk}/children
pub async fn child_categories(
    State(state): State<Arc<AppState>>,
    Path(pk): Path<uuid::Uuid>,
) -> ApiResult<Json<CategoryListResponse>> {
    CategoryRepository::find_by_pk(&state.db_pool, pk)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("카테고리를 찾을 수 없습니다"))?;

    let list = CategoryRepository::children(&state.db_pool, pk)
        .await
        .map_err(db_error)?;

    Ok(Json(list.into()))
}

/// 조상 카테고리 목록 조회 (자신 포함, 루트 방향 순서).
///
/// GET /api/v1/categories/{pk}/ancestor
pub async fn ancestor_categories(
    State(state): State<Arc<AppState>>,
    Path(pk): Path<uuid::Uuid>,
) -> ApiResult<Json<CategoryListResponse>> {
    let list = CategoryRepository::ancestors(&state.db_pool, pk)
        .await
        .map_err(db_error)?;

    if list.is_empty() {
        return Err(not_found("카테고리를 찾을 수 없습니다"));
    }

    Ok(Json(list.into()))
}

/// 카테고리 라우터 생성 (`/api/v1/categories`).
pub fn categories_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/root", get(root_categories))
        .route("/{pk}/children", get(child_categories))
        .route("/{pk}/ancestor", get(ancestor_categories))
}
