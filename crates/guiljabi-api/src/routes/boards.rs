//! 게시글 endpoint.
//!
//! 공개 조회(목록/인기/상세)와 인증이 필요한 작성/수정/삭제를 제공합니다.
//! 목록에는 승인된(approve) 게시글만 노출되며, 승인 대기 게시글은
//! 작성자와 관리자만 볼 수 있습니다.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::{AuthUser, Principal, Role};
use crate::error::{db_error, forbidden, invalid_input, not_found, ApiResult};
use crate::repository::{
    BoardListItem, BoardRecord, BoardRepository, BoardSortType, BoardStatus, CategoryRecord,
    CategoryRepository, NewBoard, UpdateBoard,
};
use crate::routes::comments::{create_comment, list_comments};
use crate::state::AppState;

/// 게시글 목록 조회 쿼리.
#[derive(Debug, Deserialize)]
pub struct BoardListQuery {
    /// 페이지 번호 (1부터 시작)
    #[serde(default = "default_page")]
    pub page: i64,
    /// 페이지 크기
    #[serde(default = "default_size")]
    pub size: i64,
    /// 정렬 기준 (latest | popular)
    #[serde(default)]
    pub sort: BoardSortType,
}

fn default_page() -> i64 {
    1
}

fn default_size() -> i64 {
    20
}

/// 게시글 목록 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct BoardListResponse {
    /// 전체 승인 게시글 수
    pub cnt: i64,
    /// 게시글 목록
    pub list: Vec<BoardListItem>,
}

/// 게시글 상세 응답 (카테고리 포함).
#[derive(Debug, Serialize, Deserialize)]
pub struct BoardDetailResponse {
    #[serde(flatten)]
    pub board: BoardRecord,
    /// 연결된 카테고리
    pub categories: Vec<CategoryRecord>,
}

/// 게시글 목록 조회.
///
/// GET /api/v1/boards
pub async fn list_boards(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BoardListQuery>,
) -> ApiResult<Json<BoardListResponse>> {
    let size = query.size.clamp(1, 100);
    let page = query.page.max(1);

    let list = BoardRepository::list_approved(&state.db_pool, page, size, query.sort)
        .await
        .map_err(db_error)?;
    let cnt = BoardRepository::count_approved(&state.db_pool)
        .await
        .map_err(db_error)?;

    Ok(Json(BoardListResponse { cnt, list }))
}

/// 인기 게시글 조회 (조회수 상위 10개).
///
/// GET /api/v1/boards/popular
pub async fn popular_boards(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<BoardListItem>>> {
    let list = BoardRepository::popular(&state.db_pool, 10)
        .await
        .map_err(db_error)?;

    Ok(Json(list))
}

/// 게시글 상세 조회.
///
/// GET /api/v1/boards/{pk}
///
/// 승인되지 않은 게시글은 작성자와 관리자에게만 보입니다.
/// 조회수는 승인된 게시글 조회 시에만 증가합니다.
pub async fn get_board(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(pk): Path<uuid::Uuid>,
) -> ApiResult<Json<BoardDetailResponse>> {
    let board = BoardRepository::find_by_pk(&state.db_pool, pk)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("게시글을 찾을 수 없습니다"))?;

    if board.status() != BoardStatus::Approve {
        let is_writer = principal.pk() == Some(board.writer_pk);
        let is_admin = principal.has_role(Role::Admin);
        if !is_writer && !is_admin {
            // 존재 여부를 노출하지 않음
            return Err(not_found("게시글을 찾을 수 없습니다"));
        }
    } else {
        BoardRepository::increase_view_count(&state.db_pool, pk)
            .await
            .map_err(db_error)?;
    }

    let categories = CategoryRepository::for_board(&state.db_pool, pk)
        .await
        .map_err(db_error)?;

    Ok(Json(BoardDetailResponse { board, categories }))
}

/// 게시글 작성.
///
/// POST /api/v1/boards
///
/// 작성된 게시글은 관리자 승인 전까지 공개 목록에 노출되지 않습니다.
pub async fn create_board(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(input): Json<NewBoard>,
) -> ApiResult<(StatusCode, Json<BoardRecord>)> {
    input.validate().map_err(|e| invalid_input(e.to_string()))?;

    let board = BoardRepository::create(&state.db_pool, user.pk, &input)
        .await
        .map_err(db_error)?;

    Ok((StatusCode::CREATED, Json(board)))
}

/// 게시글 수정 (작성자만).
///
/// PATCH /api/v1/boards/{pk}
pub async fn update_board(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(pk): Path<uuid::Uuid>,
    Json(input): Json<UpdateBoard>,
) -> ApiResult<Json<BoardRecord>> {
    input.validate().map_err(|e| invalid_input(e.to_string()))?;

    let board = BoardRepository::find_by_pk(&state.db_pool, pk)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("게시글을 찾을 수 없습니다"))?;

    if board.writer_pk != user.pk {
        return Err(forbidden("작성자만 수정할 수 있습니다"));
    }

    let updated = BoardRepository::update(&state.db_pool, pk, &input)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("게시글을 찾을 수 없습니다"))?;

    Ok(Json(updated))
}

/// 게시글 삭제 (작성자 또는 관리자).
///
/// DELETE /api/v1/boards/{pk}
pub async fn delete_board(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(pk): Path<uuid::Uuid>,
) -> ApiResult<StatusCode> {
    let board = BoardRepository::find_by_pk(&state.db_pool, pk)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("게시글을 찾을 수 없습니다"))?;

    if board.writer_pk != user.pk && user.role != Role::Admin {
        return Err(forbidden("작성자 또는 관리자만 삭제할 수 있습니다"));
    }

    BoardRepository::delete(&state.db_pool, pk)
        .await
        .map_err(db_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// 게시글 라우터 생성 (`/api/v1/boards`).
pub fn boards_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_boards).post(create_board))
        .route("/popular", get(popular_boards))
        .route(
            "/{pk}",
            get(get_board).patch(update_board).delete(delete_board),
        )
        .route("/{pk}/comments", get(list_comments).post(create_comment))
}
