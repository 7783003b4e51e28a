//! 수정요청 endpoint.
//!
//! 게시글에 대한 수정요청 제출과 내 수정요청 목록 조회를 제공합니다.
//! 수정요청 처리(완료 표시)는 관리자 라우터에 있습니다.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::AuthUser;
use crate::error::{db_error, invalid_input, not_found, ApiResult};
use crate::repository::{
    BoardRepository, EditRequestRecord, EditRequestRepository, NewEditRequest,
};
use crate::state::AppState;

/// 수정요청 접수 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct EditRequestCreatedResponse {
    pub pk: uuid::Uuid,
}

/// 내 수정요청 목록 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct MyEditRequestListResponse {
    pub cnt: usize,
    pub list: Vec<EditRequestRecord>,
}

/// 수정요청 제출.
///
/// POST /api/v1/edit-requests
pub async fn create_edit_request(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(input): Json<NewEditRequest>,
) -> ApiResult<(StatusCode, Json<EditRequestCreatedResponse>)> {
    input.validate().map_err(|e| invalid_input(e.to_string()))?;

    BoardRepository::find_by_pk(&state.db_pool, input.board_pk)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("게시글을 찾을 수 없습니다"))?;

    let pk = EditRequestRepository::create(&state.db_pool, user.pk, &input)
        .await
        .map_err(db_error)?;

    Ok((
        StatusCode::CREATED,
        Json(EditRequestCreatedResponse { pk }),
    ))
}

/// 내가 제출한 수정요청 목록 조회.
///
/// GET /api/v1/edit-requests/my
pub async fn my_edit_requests(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<MyEditRequestListResponse>> {
    let list = EditRequestRepository::list_by_requester(&state.db_pool, user.pk)
        .await
        .map_err(db_error)?;

    Ok(Json(MyEditRequestListResponse {
        cnt: list.len(),
        list,
    }))
}

/// 수정요청 라우터 생성 (`/api/v1/edit-requests`).
pub fn edit_requests_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_edit_request))
        .route("/my", get(my_edit_requests))
}
