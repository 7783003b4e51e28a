//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/auth` - 소셜 로그인 URL 발급
//! - `/api/login` - 소셜/관리자 로그인 (토큰 발급)
//! - `/api/v1/token` - 토큰 검증/재발급
//! - `/api/v1/users` - 사용자 정보
//! - `/api/v1/boards` - 게시글 및 댓글
//! - `/api/v1/comments` - 댓글 삭제
//! - `/api/v1/categories` - 카테고리 트리 조회
//! - `/api/v1/reports` - 게시글 신고
//! - `/api/v1/edit-requests` - 게시글 수정요청
//! - `/api/v1/admin` - 관리자 기능 (승인, 신고/수정요청 처리, 카테고리 관리)
//!
//! 경로별 접근 제어는 라우터가 아니라 [`crate::auth::default_policy`]의
//! 인가 정책 테이블이 담당합니다.

pub mod admin;
pub mod auth;
pub mod boards;
pub mod categories;
pub mod comments;
pub mod edit_requests;
pub mod health;
pub mod reports;
pub mod token;
pub mod users;

pub use auth::{auth_router, login_router, AdminLoginRequest, LoginUrlResponse, OauthLoginRequest};
pub use boards::{boards_router, BoardDetailResponse, BoardListResponse};
pub use categories::{categories_router, CategoryListResponse};
pub use comments::{comments_router, CommentListResponse};
pub use edit_requests::{edit_requests_router, MyEditRequestListResponse};
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use reports::reports_router;
pub use token::{token_router, TokenReissueResponse, TokenValidateResponse};
pub use users::{users_router, NicknameExistsResponse, UserResponse};

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 모든 서브 라우터를 조합하여 하나의 라우터로 반환합니다.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        // 헬스 체크 엔드포인트
        .nest("/health", health_router())
        // 로그인/토큰
        .nest("/api/auth", auth_router())
        .nest("/api/login", login_router())
        .nest("/api/v1/token", token_router())
        // API v1 엔드포인트
        .nest("/api/v1/users", users_router())
        .nest("/api/v1/boards", boards_router())
        .nest("/api/v1/comments", comments_router())
        .nest("/api/v1/categories", categories_router())
        .nest("/api/v1/reports", reports_router())
        .nest("/api/v1/edit-requests", edit_requests_router())
        // 관리자 전용 (인가 정책이 ADMIN 역할을 요구)
        .nest("/api/v1/admin", admin::admin_router())
}
