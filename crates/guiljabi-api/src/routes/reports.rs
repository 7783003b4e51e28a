//! 신고 endpoint.
//!
//! 게시글 신고 접수를 제공합니다. 신고 목록 조회와 처리는 관리자
//! 라우터(`/api/v1/admin/reports`)에 있습니다.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::AuthUser;
use crate::error::{db_error, invalid_input, not_found, ApiResult};
use crate::repository::{BoardRepository, NewReport, ReportRepository};
use crate::state::AppState;

/// 신고 접수 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReportCreatedResponse {
    pub pk: uuid::Uuid,
}

/// 게시글 신고.
///
/// POST /api/v1/reports
pub async fn create_report(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(input): Json<NewReport>,
) -> ApiResult<(StatusCode, Json<ReportCreatedResponse>)> {
    input.validate().map_err(|e| invalid_input(e.to_string()))?;

    // 신고 대상 게시글 존재 확인
    BoardRepository::find_by_pk(&state.db_pool, input.board_pk)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("게시글을 찾을 수 없습니다"))?;

    let pk = ReportRepository::create(&state.db_pool, user.pk, &input)
        .await
        .map_err(db_error)?;

    Ok((StatusCode::CREATED, Json(ReportCreatedResponse { pk })))
}

/// 신고 라우터 생성 (`/api/v1/reports`).
pub fn reports_router() -> Router<Arc<AppState>> {
    Router::new().route("/", post(create_report))
}
