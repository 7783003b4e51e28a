//! 댓글 endpoint.
//!
//! 게시글 댓글의 조회/작성은 게시글 라우터 아래
//! (`/api/v1/boards/{pk}/comments`)에 있고, 삭제는
//! `/api/v1/comments/{pk}`로 접근합니다.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::delete,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::{AuthUser, Role};
use crate::error::{db_error, forbidden, invalid_input, not_found, ApiResult};
use crate::repository::{BoardRepository, CommentRepository, CommentWithWriter, NewComment};
use crate::state::AppState;

/// 댓글 목록 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommentListResponse {
    pub cnt: usize,
    pub list: Vec<CommentWithWriter>,
}

/// 게시글 댓글 목록 조회.
///
/// GET /api/v1/boards/{pk}/comments
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Path(board_pk): Path<uuid::Uuid>,
) -> ApiResult<Json<CommentListResponse>> {
    // 게시글 존재 확인
    BoardRepository::find_by_pk(&state.db_pool, board_pk)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("게시글을 찾을 수 없습니다"))?;

    let list = CommentRepository::list_by_board(&state.db_pool, board_pk)
        .await
        .map_err(db_error)?;

    Ok(Json(CommentListResponse {
        cnt: list.len(),
        list,
    }))
}

/// 댓글 작성.
///
/// POST /api/v1/boards/{pk}/comments
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(board_pk): Path<uuid::Uuid>,
    Json(input): Json<NewComment>,
) -> ApiResult<(StatusCode, Json<CommentWithWriter>)> {
    input.validate().map_err(|e| invalid_input(e.to_string()))?;

    BoardRepository::find_by_pk(&state.db_pool, board_pk)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("게시글을 찾을 수 없습니다"))?;

    let comment = CommentRepository::create(&state.db_pool, board_pk, user.pk, &input.content)
        .await
        .map_err(db_error)?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// 댓글 삭제 (작성자 또는 관리자).
///
/// DELETE /api/v1/comments/{pk}
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(pk): Path<uuid::Uuid>,
) -> ApiResult<StatusCode> {
    let writer_pk = CommentRepository::find_writer(&state.db_pool, pk)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("댓글을 찾을 수 없습니다"))?;

    if writer_pk != user.pk && user.role != Role::Admin {
        return Err(forbidden("작성자 또는 관리자만 삭제할 수 있습니다"));
    }

    CommentRepository::delete(&state.db_pool, pk)
        .await
        .map_err(db_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// 댓글 라우터 생성 (`/api/v1/comments`).
pub fn comments_router() -> Router<Arc<AppState>> {
    Router::new().route("/{pk}", delete(delete_comment))
}
