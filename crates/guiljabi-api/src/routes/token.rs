//! 토큰 검증/재발급 endpoint.
//!
//! 클라이언트가 액세스 토큰의 상태를 확인하고, 만료된 경우 리프레시
//! 토큰으로 새 액세스 토큰을 발급받는 경로입니다. 두 경로 모두
//! 화이트리스트에 포함되어 인증 없이 접근할 수 있습니다.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::{create_token, decode_refresh_token, decode_token, Claims, JwtError, Role};
use crate::error::{ApiErrorResponse, ApiResult};
use crate::repository::UserRepository;
use crate::state::AppState;

/// 토큰 검증 요청.
#[derive(Debug, Deserialize)]
pub struct TokenValidateRequest {
    /// 검증할 액세스 토큰
    pub token: String,
}

/// 토큰 검증 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenValidateResponse {
    /// 유효 여부 (이 응답이 반환되면 항상 true)
    pub valid: bool,
    /// 사용자 PK
    pub sub: String,
    /// 닉네임
    pub nickname: String,
    /// 역할
    pub role: Role,
    /// 만료 시각 (Unix timestamp)
    pub exp: i64,
}

/// 토큰 재발급 요청.
#[derive(Debug, Deserialize)]
pub struct TokenReissueRequest {
    /// 리프레시 토큰
    pub refresh_token: String,
}

/// 토큰 재발급 응답.
///
/// 액세스 토큰만 새로 발급됩니다. 리프레시 토큰의 만료 시각은
/// 연장되지 않습니다.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenReissueResponse {
    /// 새 액세스 토큰
    pub access_token: String,
    /// 액세스 토큰 만료 시간 (초)
    pub expires_in: i64,
    /// 토큰 타입 (항상 "Bearer")
    pub token_type: String,
}

/// JWT 에러를 401 응답으로 변환.
fn jwt_error_response(e: JwtError) -> (StatusCode, Json<ApiErrorResponse>) {
    let (code, message) = match e {
        JwtError::TokenExpired => ("TOKEN_EXPIRED", "토큰이 만료되었습니다"),
        _ => ("TOKEN_INVALID", "유효하지 않은 토큰입니다"),
    };
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiErrorResponse::new(code, message)),
    )
}

/// 액세스 토큰 검증.
///
/// POST /api/v1/token/validate
pub async fn validate_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TokenValidateRequest>,
) -> ApiResult<Json<TokenValidateResponse>> {
    let data = decode_token(&req.token, &state.jwt.secret).map_err(jwt_error_response)?;

    Ok(Json(TokenValidateResponse {
        valid: true,
        sub: data.claims.sub,
        nickname: data.claims.nickname,
        role: data.claims.role,
        exp: data.claims.exp,
    }))
}

/// 리프레시 토큰으로 액세스 토큰 재발급.
///
/// POST /api/v1/token/reissue
///
/// 리프레시 토큰의 서명/만료/종류를 검증한 뒤, 사용자 정보를 저장소에서
/// 다시 조회하여 현재 역할/닉네임이 반영된 새 액세스 토큰을 발급합니다.
/// 액세스 토큰을 리프레시 토큰 자리에 보내면 거부됩니다.
pub async fn reissue_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TokenReissueRequest>,
) -> ApiResult<Json<TokenReissueResponse>> {
    let data =
        decode_refresh_token(&req.refresh_token, &state.jwt.secret).map_err(jwt_error_response)?;

    let user_pk = uuid::Uuid::parse_str(&data.claims.sub)
        .map_err(|_| jwt_error_response(JwtError::InvalidToken))?;

    // 발급 시점의 사용자 상태를 다시 반영 (탈퇴한 사용자는 거부)
    let user = UserRepository::find_by_pk(&state.db_pool, user_pk)
        .await
        .map_err(crate::error::db_error)?
        .ok_or_else(|| jwt_error_response(JwtError::InvalidToken))?;

    let claims = Claims::new(
        user.pk,
        &user.nickname,
        user.role(),
        state.jwt.access_expires_minutes,
    );
    let access_token = create_token(&claims, &state.jwt.secret).map_err(|e| {
        tracing::error!(error = %e, "Token issuance failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiErrorResponse::new("TOKEN_ISSUE_FAILED", "토큰 발급에 실패했습니다")),
        )
    })?;

    debug!(user_pk = %user.pk, "액세스 토큰 재발급");

    Ok(Json(TokenReissueResponse {
        access_token,
        expires_in: state.jwt.access_expires_minutes * 60,
        token_type: "Bearer".to_string(),
    }))
}

/// 토큰 라우터 생성 (`/api/v1/token`).
pub fn token_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/validate", post(validate_token))
        .route("/reissue", post(reissue_token))
}
