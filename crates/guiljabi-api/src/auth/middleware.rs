//! 요청 인증 미들웨어.
//!
//! 요청당 정확히 한 번 실행됩니다:
//!
//! 1. `Authorization: Bearer` 헤더에서 토큰 추출. 없거나 형식이 잘못되면
//!    에러가 아니라 익명 주체로 진행합니다.
//! 2. 토큰이 있으면 검증. 성공 시 [`Principal`]을 request extensions에
//!    넣고, 실패 시 익명으로 진행하되 실패 종류를 기억해 둡니다.
//! 3. 인가 정책을 평가하여 통과/401/403을 결정합니다. 거부 응답의 에러
//!    코드는 기억해 둔 검증 실패 종류를 반영합니다 (TOKEN_EXPIRED 등).
//!
//! 인증과 무관한 에러(핸들러의 비즈니스 에러)는 여기서 건드리지 않고
//! 그대로 통과합니다.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::error::ApiErrorResponse;

use super::{decode_token, JwtError, JwtSettings, Principal, SecurityPolicy};

/// 인증 실패 종류.
///
/// 인가 단계에서 요청이 거부될 때 클라이언트가 재발급 시도 여부를
/// 판단할 수 있도록 구분된 에러 코드로 변환됩니다.
#[derive(Debug, thiserror::Error)]
pub enum JwtAuthError {
    #[error("인증이 필요합니다")]
    Unauthenticated,
    #[error("토큰이 만료되었습니다")]
    TokenExpired,
    #[error("유효하지 않은 토큰")]
    TokenInvalid,
    #[error("권한이 부족합니다")]
    InsufficientPermission,
}

impl JwtAuthError {
    /// HTTP 상태와 에러 코드 반환.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            JwtAuthError::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            JwtAuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED"),
            JwtAuthError::TokenInvalid => (StatusCode::UNAUTHORIZED, "TOKEN_INVALID"),
            JwtAuthError::InsufficientPermission => {
                (StatusCode::FORBIDDEN, "INSUFFICIENT_PERMISSION")
            }
        }
    }
}

impl IntoResponse for JwtAuthError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = Json(ApiErrorResponse::simple(code, self.to_string()));
        (status, body).into_response()
    }
}

/// 인증 미들웨어 상태.
///
/// 기동 시 한 번 구성되는 불변 설정(서명 키 + 인가 정책)입니다.
#[derive(Clone)]
pub struct AuthState {
    /// JWT 서명/만료 설정
    pub jwt: Arc<JwtSettings>,
    /// 경로 인가 정책
    pub policy: Arc<SecurityPolicy>,
}

impl AuthState {
    /// 새 인증 상태 생성.
    pub fn new(jwt: JwtSettings, policy: SecurityPolicy) -> Self {
        Self {
            jwt: Arc::new(jwt),
            policy: Arc::new(policy),
        }
    }
}

/// 요청 인증 미들웨어.
///
/// 모든 라우트 앞에 장착되어 Principal 확정과 인가 평가를 수행합니다.
pub async fn authenticate_request(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    // 1. 토큰 추출. 헤더가 없거나 Bearer 형식이 아니면 익명으로 진행.
    let bearer = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.to_string());

    // 2. 토큰 검증. 실패해도 여기서 거부하지 않고 실패 종류만 기억.
    let (principal, failure) = match bearer {
        None => (Principal::Anonymous, None),
        Some(token) => match decode_token(&token, &auth.jwt.secret) {
            Ok(data) => match data.claims.to_principal() {
                Ok(principal) => (principal, None),
                Err(_) => (Principal::Anonymous, Some(JwtAuthError::TokenInvalid)),
            },
            Err(e) => {
                debug!(error = %e, "Bearer token validation failed");
                let failure = match e {
                    JwtError::TokenExpired => JwtAuthError::TokenExpired,
                    _ => JwtAuthError::TokenInvalid,
                };
                (Principal::Anonymous, Some(failure))
            }
        },
    };

    // 3. 인가 평가 (첫 일치 우선).
    match auth
        .policy
        .decide(req.method(), req.uri().path(), &principal)
    {
        super::Decision::Permit => {
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        super::Decision::RequireAuth => {
            // 검증 실패가 있었다면 그 이유를, 없었다면 토큰 부재를 알림
            failure.unwrap_or(JwtAuthError::Unauthenticated).into_response()
        }
        super::Decision::Forbidden => JwtAuthError::InsufficientPermission.into_response(),
    }
}

/// 인증된 사용자 추출기.
///
/// 미들웨어가 확정한 Principal에서 인증된 사용자 정보를 꺼냅니다.
/// 인가 정책이 보호하는 라우트에서만 사용해야 하며, 익명 주체가
/// 도달한 경우 401을 반환합니다.
///
/// # 사용 예시
///
/// ```rust,ignore
/// async fn protected_handler(
///     AuthUser(user): AuthUser,
/// ) -> impl IntoResponse {
///     format!("Authenticated user: {}", user.nickname)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthenticatedUser);

/// 인증된 사용자 정보.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// 사용자 PK
    pub pk: uuid::Uuid,
    /// 닉네임
    pub nickname: String,
    /// 역할
    pub role: super::Role,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = JwtAuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Principal>() {
            Some(Principal::User { pk, nickname, role }) => Ok(AuthUser(AuthenticatedUser {
                pk: *pk,
                nickname: nickname.clone(),
                role: *role,
            })),
            _ => Err(JwtAuthError::Unauthenticated),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{create_token, create_token_pair, default_policy, Claims, Role};
    use axum::{
        body::Body,
        http::{Method, Request as HttpRequest, StatusCode},
        middleware,
        routing::{get, post},
        Extension, Router,
    };
    use tower::ServiceExt;
    use uuid::Uuid;

    fn test_settings() -> JwtSettings {
        JwtSettings {
            secret: "test-secret-key-for-jwt-testing-minimum-32-chars".to_string(),
            access_expires_minutes: 30,
            refresh_expires_days: 14,
        }
    }

    /// 인가 정책 + 미들웨어가 장착된 테스트 라우터.
    fn test_app() -> Router {
        let auth_state = AuthState::new(test_settings(), default_policy());

        async fn public_handler() -> &'static str {
            "public"
        }

        async fn protected_handler(AuthUser(user): AuthUser) -> String {
            user.nickname
        }

        async fn admin_handler(Extension(principal): Extension<Principal>) -> String {
            format!("{:?}", principal.role())
        }

        Router::new()
            .route("/api/v1/boards", get(public_handler).post(protected_handler))
            .route("/api/v1/reports", post(protected_handler))
            .route("/api/v1/admin/reports", get(admin_handler))
            .layer(middleware::from_fn_with_state(
                auth_state,
                authenticate_request,
            ))
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {}", token)
    }

    async fn error_code(response: axum::response::Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ApiErrorResponse = serde_json::from_slice(&body).unwrap();
        error.code
    }

    #[tokio::test]
    async fn test_public_route_without_token() {
        let response = test_app()
            .oneshot(
                HttpRequest::builder()
                    .method(Method::GET)
                    .uri("/api/v1/boards")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_route_without_token() {
        let response = test_app()
            .oneshot(
                HttpRequest::builder()
                    .method(Method::POST)
                    .uri("/api/v1/reports")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(response).await, "UNAUTHENTICATED");
    }

    #[tokio::test]
    async fn test_protected_route_with_valid_token() {
        let settings = test_settings();
        let pair =
            create_token_pair(Uuid::new_v4(), "길잡이유저", Role::User, &settings).unwrap();

        let response = test_app()
            .oneshot(
                HttpRequest::builder()
                    .method(Method::POST)
                    .uri("/api/v1/reports")
                    .header(AUTHORIZATION, bearer(&pair.access_token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], "길잡이유저".as_bytes());
    }

    #[tokio::test]
    async fn test_expired_token_returns_distinct_code() {
        let settings = test_settings();
        let claims = Claims::new(Uuid::new_v4(), "user", Role::User, -5);
        let token = create_token(&claims, &settings.secret).unwrap();

        let response = test_app()
            .oneshot(
                HttpRequest::builder()
                    .method(Method::POST)
                    .uri("/api/v1/reports")
                    .header(AUTHORIZATION, bearer(&token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(response).await, "TOKEN_EXPIRED");
    }

    #[tokio::test]
    async fn test_wrong_key_token_rejected_on_protected_path() {
        // 다른 키로 서명된 토큰 → 컨텍스트 미설정 → 보호 경로에서 401
        let other = JwtSettings {
            secret: "another-secret-key-entirely-different-32ch".to_string(),
            ..test_settings()
        };
        let claims = Claims::new(Uuid::new_v4(), "user", Role::Admin, 30);
        let token = create_token(&claims, &other.secret).unwrap();

        let response = test_app()
            .oneshot(
                HttpRequest::builder()
                    .method(Method::POST)
                    .uri("/api/v1/reports")
                    .header(AUTHORIZATION, bearer(&token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(response).await, "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn test_wrong_key_token_still_passes_public_path() {
        // 검증 실패는 공개 경로 접근을 막지 않음 (익명으로 진행)
        let claims = Claims::new(Uuid::new_v4(), "user", Role::User, 30);
        let token = create_token(&claims, "wrong-secret-key-for-testing-minimum-32ch").unwrap();

        let response = test_app()
            .oneshot(
                HttpRequest::builder()
                    .method(Method::GET)
                    .uri("/api/v1/boards")
                    .header(AUTHORIZATION, bearer(&token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_admin_path_with_user_token_returns_403() {
        let settings = test_settings();
        let pair = create_token_pair(Uuid::new_v4(), "user", Role::User, &settings).unwrap();

        let response = test_app()
            .oneshot(
                HttpRequest::builder()
                    .method(Method::GET)
                    .uri("/api/v1/admin/reports")
                    .header(AUTHORIZATION, bearer(&pair.access_token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        // 403이어야 함 (401이 아님)
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(error_code(response).await, "INSUFFICIENT_PERMISSION");
    }

    #[tokio::test]
    async fn test_admin_path_with_admin_token() {
        let settings = test_settings();
        let pair = create_token_pair(Uuid::new_v4(), "admin", Role::Admin, &settings).unwrap();

        let response = test_app()
            .oneshot(
                HttpRequest::builder()
                    .method(Method::GET)
                    .uri("/api/v1/admin/reports")
                    .header(AUTHORIZATION, bearer(&pair.access_token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_header_treated_as_anonymous() {
        // Bearer 접두사가 없는 헤더는 익명 취급 (에러 아님)
        let response = test_app()
            .oneshot(
                HttpRequest::builder()
                    .method(Method::GET)
                    .uri("/api/v1/boards")
                    .header(AUTHORIZATION, "Basic dXNlcjpwYXNz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_refresh_token_rejected_as_access_token() {
        // Refresh Token을 Authorization 헤더로 보내면 인증되지 않음
        let settings = test_settings();
        let pair = create_token_pair(Uuid::new_v4(), "user", Role::User, &settings).unwrap();

        let response = test_app()
            .oneshot(
                HttpRequest::builder()
                    .method(Method::POST)
                    .uri("/api/v1/reports")
                    .header(AUTHORIZATION, bearer(&pair.refresh_token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
