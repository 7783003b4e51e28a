//! 관리자 endpoint.
//!
//! `/api/v1/admin/**` 아래의 모든 경로는 인가 정책 테이블에서 ADMIN
//! 역할을 요구하므로, 핸들러에 도달한 요청은 이미 관리자임이 보장됩니다.
//!
//! 제공 기능:
//! - 승인 대기 게시글 목록 / 승인·반려
//! - 신고 목록 / 처리(삭제)
//! - 수정요청 목록 / 처리 완료 표시
//! - 카테고리 생성/삭제

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::auth::AuthUser;
use crate::error::{db_error, invalid_input, not_found, ApiResult};
use crate::repository::{
    BoardListItem, BoardRecord, BoardRepository, BoardStatus, CategoryRecord, CategoryRepository,
    EditRequestRecord, EditRequestRepository, ReportRepository, ReportWithBoard,
};
use crate::state::AppState;

/// 목록 조회 공통 쿼리 (페이징).
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_size")]
    pub size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_size() -> i64 {
    20
}

/// 게시글 상태 변경 요청.
#[derive(Debug, Deserialize)]
pub struct UpdateBoardStatusRequest {
    /// 변경할 상태 ("approve" | "reject")
    pub status: String,
}

/// 카테고리 생성 요청.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 50, message = "카테고리 이름은 1~50자여야 합니다"))]
    pub name: String,
    #[serde(default)]
    pub parent_pk: Option<uuid::Uuid>,
}

/// 목록 응답 공통 형식.
#[derive(Debug, Serialize)]
pub struct AdminListResponse<T> {
    pub cnt: usize,
    pub list: Vec<T>,
}

impl<T> From<Vec<T>> for AdminListResponse<T> {
    fn from(list: Vec<T>) -> Self {
        Self {
            cnt: list.len(),
            list,
        }
    }
}

/// 승인 대기 게시글 목록 조회.
///
/// GET /api/v1/admin/boards/pending
pub async fn pending_boards(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<AdminListResponse<BoardListItem>>> {
    let list = BoardRepository::list_by_status(
        &state.db_pool,
        BoardStatus::Pending,
        query.page.max(1),
        query.size.clamp(1, 100),
    )
    .await
    .map_err(db_error)?;

    Ok(Json(list.into()))
}

/// 게시글 승인/반려.
///
/// PATCH /api/v1/admin/boards/{pk}/status
pub async fn update_board_status(
    State(state): State<Arc<AppState>>,
    AuthUser(admin): AuthUser,
    Path(pk): Path<uuid::Uuid>,
    Json(req): Json<UpdateBoardStatusRequest>,
) -> ApiResult<Json<BoardRecord>> {
    let status = match BoardStatus::parse(&req.status) {
        Some(BoardStatus::Approve) => BoardStatus::Approve,
        Some(BoardStatus::Reject) => BoardStatus::Reject,
        _ => return Err(invalid_input("status는 approve 또는 reject여야 합니다")),
    };

    let board = BoardRepository::update_status(&state.db_pool, pk, status)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("게시글을 찾을 수 없습니다"))?;

    info!(admin = %admin.nickname, board_pk = %pk, status = status.as_str(), "게시글 상태 변경");
    Ok(Json(board))
}

/// 신고 목록 조회.
///
/// GET /api/v1/admin/reports
pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<AdminListResponse<ReportWithBoard>>> {
    let list = ReportRepository::list(
        &state.db_pool,
        query.page.max(1),
        query.size.clamp(1, 100),
    )
    .await
    .map_err(db_error)?;

    Ok(Json(list.into()))
}

/// 신고 처리 (삭제).
///
/// DELETE /api/v1/admin/reports/{pk}
pub async fn process_report(
    State(state): State<Arc<AppState>>,
    AuthUser(admin): AuthUser,
    Path(pk): Path<uuid::Uuid>,
) -> ApiResult<StatusCode> {
    let deleted = ReportRepository::delete(&state.db_pool, pk)
        .await
        .map_err(db_error)?;

    if !deleted {
        return Err(not_found("신고를 찾을 수 없습니다"));
    }

    info!(admin = %admin.nickname, report_pk = %pk, "신고 처리 완료");
    Ok(StatusCode::NO_CONTENT)
}

/// 미처리 수정요청 목록 조회.
///
/// GET /api/v1/admin/edit-requests
pub async fn list_edit_requests(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<AdminListResponse<EditRequestRecord>>> {
    let list = EditRequestRepository::list_unprocessed(
        &state.db_pool,
        query.page.max(1),
        query.size.clamp(1, 100),
    )
    .await
    .map_err(db_error)?;

    Ok(Json(list.into()))
}

/// 수정요청 처리 완료 표시.
///
/// PATCH /api/v1/admin/edit-requests/{pk}
pub async fn process_edit_request(
    State(state): State<Arc<AppState>>,
    AuthUser(admin): AuthUser,
    Path(pk): Path<uuid::Uuid>,
) -> ApiResult<StatusCode> {
    let processed = EditRequestRepository::mark_processed(&state.db_pool, pk)
        .await
        .map_err(db_error)?;

    if !processed {
        return Err(not_found("미처리 수정요청을 찾을 수 없습니다"));
    }

    info!(admin = %admin.nickname, edit_request_pk = %pk, "수정요청 처리 완료");
    Ok(StatusCode::NO_CONTENT)
}

/// 카테고리 생성.
///
/// POST /api/v1/admin/categories
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<CategoryRecord>)> {
    req.validate().map_err(|e| invalid_input(e.to_string()))?;

    if let Some(parent_pk) = req.parent_pk {
        CategoryRepository::find_by_pk(&state.db_pool, parent_pk)
            .await
            .map_err(db_error)?
            .ok_or_else(|| not_found("상위 카테고리를 찾을 수 없습니다"))?;
    }

    let category = CategoryRepository::create(&state.db_pool, &req.name, req.parent_pk)
        .await
        .map_err(db_error)?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// 카테고리 삭제 (하위 카테고리 포함).
///
/// DELETE /api/v1/admin/categories/{pk}
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(pk): Path<uuid::Uuid>,
) -> ApiResult<StatusCode> {
    let deleted = CategoryRepository::delete(&state.db_pool, pk)
        .await
        .map_err(db_error)?;

    if !deleted {
        return Err(not_found("카테고리를 찾을 수 없습니다"));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// 관리자 라우터 생성 (`/api/v1/admin`).
pub fn admin_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/boards/pending", get(pending_boards))
        .route("/boards/{pk}/status", patch(update_board_status))
        .route("/reports", get(list_reports))
        .route("/reports/{pk}", delete(process_report))
        .route("/edit-requests", get(list_edit_requests))
        .route("/edit-requests/{pk}", patch(process_edit_request))
        .route("/categories", post(create_category))
        .route("/categories/{pk}", delete(delete_category))
}
