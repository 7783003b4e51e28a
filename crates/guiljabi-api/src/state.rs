//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 모든 API 핸들러에서 공유되는 상태를 관리합니다.
//! Arc로 래핑되어 여러 요청 간에 안전하게 공유되며, 기동 후에는
//! 변경되지 않습니다.

use std::sync::Arc;

use guiljabi_oauth::{KakaoAuthClient, NaverAuthClient};
use sqlx::PgPool;

use crate::auth::JwtSettings;

/// 애플리케이션 공유 상태.
///
/// Axum의 State extractor를 통해 핸들러에 주입됩니다.
#[derive(Clone)]
pub struct AppState {
    /// 데이터베이스 연결 풀 (PostgreSQL)
    pub db_pool: PgPool,

    /// JWT 서명/만료 설정 (불변)
    pub jwt: Arc<JwtSettings>,

    /// 카카오 OAuth 클라이언트 (환경변수 미설정 시 비활성화)
    pub kakao: Option<Arc<KakaoAuthClient>>,

    /// 네이버 OAuth 클라이언트 (환경변수 미설정 시 비활성화)
    pub naver: Option<Arc<NaverAuthClient>>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    pub fn new(db_pool: PgPool, jwt: JwtSettings) -> Self {
        Self {
            db_pool,
            jwt: Arc::new(jwt),
            kakao: None,
            naver: None,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 카카오 클라이언트 설정.
    pub fn with_kakao(mut self, client: KakaoAuthClient) -> Self {
        self.kakao = Some(Arc::new(client));
        self
    }

    /// 네이버 클라이언트 설정.
    pub fn with_naver(mut self, client: NaverAuthClient) -> Self {
        self.naver = Some(Arc::new(client));
        self
    }

    /// 서버 업타임(초) 반환.
    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }

    /// 데이터베이스 연결 상태 확인.
    pub async fn is_db_healthy(&self) -> bool {
        sqlx::query("SELECT 1").fetch_one(&self.db_pool).await.is_ok()
    }

    /// 카카오 로그인 활성화 여부.
    pub fn has_kakao(&self) -> bool {
        self.kakao.is_some()
    }

    /// 네이버 로그인 활성화 여부.
    pub fn has_naver(&self) -> bool {
        self.naver.is_some()
    }
}
