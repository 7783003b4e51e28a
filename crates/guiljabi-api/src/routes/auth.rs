//! 로그인 endpoint.
//!
//! 소셜 로그인 URL 발급과 로그인(토큰 발급)을 담당합니다.
//!
//! # 소셜 로그인 흐름
//!
//! 1. 프론트엔드가 `GET /api/auth/kakao/login-url`로 로그인 URL과 state를 받음
//! 2. 사용자가 제공자 로그인 완료 → 리다이렉트로 인가 코드 전달
//! 3. 프론트엔드가 `POST /api/login/kakao`로 코드를 보내면 토큰 페어 발급
//!
//! state 값 대조는 리다이렉트를 받는 프론트엔드의 책임이며, 이 서버는
//! 발급한 state를 네이버 토큰 교환 시 그대로 전달합니다.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, routing::post, Json, Router};
use guiljabi_oauth::{ProviderClientError, UserProfile};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{
    create_token_pair, AuthProviderError, AuthenticationProvider, Credential, Principal, Role,
    TokenPair,
};
use crate::error::{ApiErrorResponse, ApiResult};
use crate::repository::UserRepository;
use crate::state::AppState;

/// 로그인 URL 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginUrlResponse {
    /// 제공자 로그인 페이지 URL
    pub login_url: String,
    /// CSRF 방지용 state 토큰 (리다이렉트 후 대조용)
    pub state: String,
}

/// 소셜 로그인 요청.
#[derive(Debug, Deserialize)]
pub struct OauthLoginRequest {
    /// 리다이렉트로 전달받은 인가 코드
    pub code: String,
    /// 로그인 시작 시 발급된 state
    #[serde(default)]
    pub state: String,
}

/// 관리자 로그인 요청.
#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub username: String,
    pub password: String,
}

/// 제공자 미설정 응답 헬퍼.
fn provider_not_configured(name: &str) -> (StatusCode, Json<ApiErrorResponse>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ApiErrorResponse::new(
            "PROVIDER_NOT_CONFIGURED",
            format!("{} 로그인이 설정되지 않았습니다", name),
        )),
    )
}

/// 제공자 호출 실패 응답 헬퍼.
///
/// 로그인 시도는 여기서 종료되며, 사용자는 새 인가 코드로 로그인을
/// 다시 시작해야 합니다.
fn provider_error(e: ProviderClientError) -> (StatusCode, Json<ApiErrorResponse>) {
    warn!(error = %e, "OAuth provider call failed");
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiErrorResponse::new(
            "PROVIDER_ERROR",
            "소셜 로그인에 실패했습니다. 다시 시도해주세요",
        )),
    )
}

/// 프로필로 사용자를 조회/생성하고 토큰 페어 발급.
async fn issue_tokens_for_profile(
    state: &AppState,
    profile: UserProfile,
) -> ApiResult<Json<TokenPair>> {
    let user = UserRepository::get_or_create_oauth_user(
        &state.db_pool,
        profile.provider.as_str(),
        &profile.id,
        profile.email.as_deref(),
        profile.nickname.as_deref(),
    )
    .await
    .map_err(crate::error::db_error)?;

    let pair = create_token_pair(user.pk, &user.nickname, user.role(), &state.jwt).map_err(|e| {
        tracing::error!(error = %e, "Token issuance failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiErrorResponse::new("TOKEN_ISSUE_FAILED", "토큰 발급에 실패했습니다")),
        )
    })?;

    info!(provider = %profile.provider, user_pk = %user.pk, "소셜 로그인 성공");
    Ok(Json(pair))
}

/// 카카오 로그인 URL 발급.
///
/// GET /api/auth/kakao/login-url
pub async fn kakao_login_url(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<LoginUrlResponse>> {
    let client = state.kakao.as_ref().ok_or_else(|| provider_not_configured("카카오"))?;

    let csrf_state = Uuid::new_v4().to_string();
    Ok(Json(LoginUrlResponse {
        login_url: client.login_url(&csrf_state),
        state: csrf_state,
    }))
}

/// 네이버 로그인 URL 발급.
///
/// GET /api/auth/naver/login-url
pub async fn naver_login_url(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<LoginUrlResponse>> {
    let client = state.naver.as_ref().ok_or_else(|| provider_not_configured("네이버"))?;

    let csrf_state = Uuid::new_v4().to_string();
    Ok(Json(LoginUrlResponse {
        login_url: client.login_url(&csrf_state),
        state: csrf_state,
    }))
}

/// 카카오 로그인 (인가 코드 → 토큰 페어).
///
/// POST /api/login/kakao
pub async fn kakao_login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<OauthLoginRequest>,
) -> ApiResult<Json<TokenPair>> {
    let client = state.kakao.as_ref().ok_or_else(|| provider_not_configured("카카오"))?;

    let access_token = client
        .request_access_token(&req.code)
        .await
        .map_err(provider_error)?;

    let profile = client
        .request_user_info(&access_token)
        .await
        .map_err(provider_error)?;

    issue_tokens_for_profile(&state, profile).await
}

/// 네이버 로그인 (인가 코드 → 토큰 페어).
///
/// POST /api/login/naver
pub async fn naver_login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<OauthLoginRequest>,
) -> ApiResult<Json<TokenPair>> {
    let client = state.naver.as_ref().ok_or_else(|| provider_not_configured("네이버"))?;

    let access_token = client
        .request_access_token(&req.code, &req.state)
        .await
        .map_err(provider_error)?;

    let profile = client
        .request_user_info(&access_token)
        .await
        .map_err(provider_error)?;

    issue_tokens_for_profile(&state, profile).await
}

/// 관리자 로그인 (아이디/비밀번호 → 토큰 페어).
///
/// POST /api/login/admin
pub async fn admin_login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AdminLoginRequest>,
) -> ApiResult<Json<TokenPair>> {
    let provider = AuthenticationProvider::new(state.db_pool.clone(), state.jwt.clone());

    let principal = provider
        .authenticate_with_role(
            Credential::Password {
                username: &req.username,
                password: &req.password,
            },
            Role::Admin,
        )
        .await
        .map_err(|e| match e {
            AuthProviderError::Database(db) => crate::error::db_error(db),
            // 계정 존재 여부를 노출하지 않는 일반화된 401
            _ => (
                StatusCode::UNAUTHORIZED,
                Json(ApiErrorResponse::new(
                    "BAD_CREDENTIALS",
                    "아이디 또는 비밀번호가 올바르지 않습니다",
                )),
            ),
        })?;

    let (pk, nickname, role) = match principal {
        Principal::User { pk, nickname, role } => (pk, nickname, role),
        Principal::Anonymous => unreachable!("authenticate never returns anonymous"),
    };

    let pair = create_token_pair(pk, &nickname, role, &state.jwt).map_err(|e| {
        tracing::error!(error = %e, "Token issuance failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiErrorResponse::new("TOKEN_ISSUE_FAILED", "토큰 발급에 실패했습니다")),
        )
    })?;

    info!(username = %req.username, "관리자 로그인 성공");
    Ok(Json(pair))
}

/// 로그인 URL 라우터 생성 (`/api/auth`).
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/kakao/login-url", get(kakao_login_url))
        .route("/naver/login-url", get(naver_login_url))
}

/// 로그인 라우터 생성 (`/api/login`).
pub fn login_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/kakao", post(kakao_login))
        .route("/naver", post(naver_login))
        .route("/admin", post(admin_login))
}
