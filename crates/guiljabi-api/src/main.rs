//! 길잡이 보드 API 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다.
//! 소셜 로그인, 게시글/댓글/카테고리/신고/수정요청 엔드포인트를 제공합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, middleware, Router};
use guiljabi_oauth::{KakaoAuthClient, NaverAuthClient, OauthConfig};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use guiljabi_api::auth::{
    authenticate_request, default_policy, hash_password, validate_password_strength, AuthState,
    JwtSettings,
};
use guiljabi_api::repository::UserRepository;
use guiljabi_api::routes::create_api_router;
use guiljabi_api::state::AppState;

/// 서버 설정 구조체.
struct ServerConfig {
    /// 바인딩할 호스트 주소
    host: String,
    /// 바인딩할 포트
    port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// 환경 변수에서 설정 로드.
    fn from_env() -> Self {
        let host = std::env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("API_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        Self { host, port }
    }

    /// 소켓 주소 반환.
    ///
    /// # Errors
    /// `host:port` 형식이 유효하지 않으면 `AddrParseError`를 반환합니다.
    fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// CORS 미들웨어 구성.
///
/// CORS_ORIGINS 환경변수가 설정되어 있으면 해당 origin만 허용합니다.
/// 설정되지 않으면 개발 모드로 간주하여 모든 origin을 허용합니다.
///
/// # 환경변수
///
/// - `CORS_ORIGINS`: 쉼표로 구분된 허용 origin 목록
///   예: `https://guiljabi.example.com,http://localhost:3000`
fn cors_layer() -> CorsLayer {
    let allow_origin = match std::env::var("CORS_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            // 프로덕션: 특정 origin만 허용
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => {
            // 개발: 모든 origin 허용
            warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        // 허용되는 HTTP 메서드
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PATCH,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        // 허용되는 헤더
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        // 자격 증명 포함 허용 (CORS_ORIGINS 설정 시에만)
        .allow_credentials(std::env::var("CORS_ORIGINS").is_ok())
        // preflight 요청 캐시 시간
        .max_age(Duration::from_secs(3600))
}

/// 관리자 계정 부트스트랩.
///
/// ADMIN_USERNAME / ADMIN_PASSWORD 환경변수가 설정되어 있으면 해당
/// 계정이 존재하는지 확인하고, 없으면 생성합니다. 이미 존재하면
/// 아무것도 하지 않습니다.
async fn ensure_admin_account(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let (Ok(username), Ok(password)) = (
        std::env::var("ADMIN_USERNAME"),
        std::env::var("ADMIN_PASSWORD"),
    ) else {
        warn!("ADMIN_USERNAME/ADMIN_PASSWORD not set, skipping admin bootstrap");
        return Ok(());
    };

    if let Err(reason) = validate_password_strength(&password) {
        anyhow::bail!("ADMIN_PASSWORD가 유효하지 않습니다: {}", reason);
    }

    let nickname =
        std::env::var("ADMIN_NICKNAME").unwrap_or_else(|_| "관리자".to_string());

    let hash = hash_password(&password)
        .map_err(|e| anyhow::anyhow!("관리자 비밀번호 해싱 실패: {}", e))?;

    let admin = UserRepository::create_admin(pool, &username, &hash, &nickname).await?;
    info!(username = %username, pk = %admin.pk, "Admin account ready");

    Ok(())
}

/// OAuth 클라이언트 생성 (환경변수 설정 시).
fn create_oauth_clients() -> (Option<KakaoAuthClient>, Option<NaverAuthClient>) {
    let kakao = match OauthConfig::kakao_from_env() {
        Some(config) => match KakaoAuthClient::new(config) {
            Ok(client) => {
                info!("Kakao login enabled");
                Some(client)
            }
            Err(e) => {
                error!(error = %e, "Failed to create Kakao client");
                None
            }
        },
        None => {
            warn!("Kakao login not configured. Set KAKAO_CLIENT_ID, KAKAO_CLIENT_SECRET, KAKAO_REDIRECT_URI to enable.");
            None
        }
    };

    let naver = match OauthConfig::naver_from_env() {
        Some(config) => match NaverAuthClient::new(config) {
            Ok(client) => {
                info!("Naver login enabled");
                Some(client)
            }
            Err(e) => {
                error!(error = %e, "Failed to create Naver client");
                None
            }
        },
        None => {
            warn!("Naver login not configured. Set NAVER_CLIENT_ID, NAVER_CLIENT_SECRET, NAVER_REDIRECT_URI to enable.");
            None
        }
    };

    (kakao, naver)
}

/// 전체 라우터 생성.
///
/// 인증 미들웨어는 모든 라우트 앞에서 실행되며, 경로별 접근 제어는
/// 기동 시 구성된 인가 정책 테이블이 담당합니다.
fn create_router(state: Arc<AppState>, auth_state: AuthState) -> Router {
    create_api_router()
        .with_state(state)
        // 인증/인가 (요청당 한 번)
        .layer(middleware::from_fn_with_state(
            auth_state,
            authenticate_request,
        ))
        // 기타 미들웨어
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 (30초) - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(cors_layer())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    // tracing 초기화
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "guiljabi_api=info,tower_http=info".into()),
        )
        .init();

    info!("Starting Guiljabi API server...");

    // 설정 로드
    let config = ServerConfig::from_env();
    let addr = config.socket_addr().map_err(|e| {
        error!(
            host = %config.host,
            port = config.port,
            error = %e,
            "소켓 주소 설정이 유효하지 않습니다. API_HOST, API_PORT 환경변수를 확인하세요."
        );
        e
    })?;

    // JWT 설정 로드
    let jwt = JwtSettings::from_env();

    // DB 연결 (필수)
    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL 환경변수가 설정되지 않았습니다"))?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&database_url)
        .await?;
    info!("Connected to PostgreSQL successfully");

    // 스키마 마이그레이션
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied");

    // 관리자 계정 부트스트랩
    ensure_admin_account(&pool).await?;

    // OAuth 클라이언트 생성 (환경변수 설정 시)
    let (kakao, naver) = create_oauth_clients();

    // AppState 빌드
    let mut state = AppState::new(pool, jwt.clone());
    if let Some(client) = kakao {
        state = state.with_kakao(client);
    }
    if let Some(client) = naver {
        state = state.with_naver(client);
    }

    info!(
        version = %state.version,
        has_kakao = state.has_kakao(),
        has_naver = state.has_naver(),
        "Application state initialized"
    );

    // 인증 미들웨어 상태 (불변 설정: 서명 키 + 인가 정책)
    let auth_state = AuthState::new(jwt, default_policy());

    // 라우터 생성
    let app = create_router(Arc::new(state), auth_state);

    // 서버 시작
    info!(%addr, "API server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 종료를 시작합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
