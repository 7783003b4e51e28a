//! 사용자 endpoint.
//!
//! 내 정보 조회/수정과 닉네임 중복 확인을 제공합니다.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::{AuthUser, Role};
use crate::error::{db_error, invalid_input, not_found, ApiResult};
use crate::repository::{UserRecord, UserRepository};
use crate::state::AppState;

/// 사용자 정보 응답 (비밀번호 해시 제외).
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub pk: uuid::Uuid,
    pub provider: String,
    pub nickname: String,
    pub email: Option<String>,
    pub role: Role,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        let role = user.role();
        Self {
            pk: user.pk,
            provider: user.provider,
            nickname: user.nickname,
            email: user.email,
            role,
            created_at: user.created_at,
        }
    }
}

/// 닉네임 중복 확인 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct NicknameExistsResponse {
    pub exists: bool,
}

/// 닉네임 변경 요청.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateNicknameRequest {
    #[validate(length(min = 2, max = 20, message = "닉네임은 2~20자여야 합니다"))]
    pub nickname: String,
}

/// 내 정보 조회.
///
/// GET /api/v1/users/me
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<UserResponse>> {
    let record = UserRepository::find_by_pk(&state.db_pool, user.pk)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("사용자를 찾을 수 없습니다"))?;

    Ok(Json(record.into()))
}

/// 닉네임 변경.
///
/// PATCH /api/v1/users/me
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(req): Json<UpdateNicknameRequest>,
) -> ApiResult<Json<UserResponse>> {
    req.validate()
        .map_err(|e| invalid_input(e.to_string()))?;

    if UserRepository::nickname_exists(&state.db_pool, &req.nickname)
        .await
        .map_err(db_error)?
    {
        return Err(invalid_input("이미 사용 중인 닉네임입니다"));
    }

    let record = UserRepository::update_nickname(&state.db_pool, user.pk, &req.nickname)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("사용자를 찾을 수 없습니다"))?;

    Ok(Json(record.into()))
}

/// 닉네임 사용 여부 확인.
///
/// GET /api/v1/users/nickname/{nickname}/exists
pub async fn nickname_exists(
    State(state): State<Arc<AppState>>,
    Path(nickname): Path<String>,
) -> ApiResult<Json<NicknameExistsResponse>> {
    let exists = UserRepository::nickname_exists(&state.db_pool, &nickname)
        .await
        .map_err(db_error)?;

    Ok(Json(NicknameExistsResponse { exists }))
}

/// 사용자 라우터 생성 (`/api/v1/users`).
pub fn users_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/me", get(get_me).patch(update_me))
        .route("/nickname/{nickname}/exists", get(nickname_exists))
}
