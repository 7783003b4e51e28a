//! 소셜 로그인 제공자 설정.
//!
//! 제공자별 client_id/client_secret과 엔드포인트 URL을 보관합니다.
//! 설정은 기동 시 환경변수에서 한 번 로드되고 이후 변경되지 않습니다.

use crate::ProviderKind;
use serde::{Deserialize, Serialize};

/// 카카오 기본 엔드포인트.
const KAKAO_AUTHORIZE_URL: &str = "https://kauth.kakao.com/oauth/authorize";
const KAKAO_TOKEN_URL: &str = "https://kauth.kakao.com/oauth/token";
const KAKAO_USER_INFO_URL: &str = "https://kapi.kakao.com/v2/user/me";

/// 네이버 기본 엔드포인트.
const NAVER_AUTHORIZE_URL: &str = "https://nid.naver.com/oauth2.0/authorize";
const NAVER_TOKEN_URL: &str = "https://nid.naver.com/oauth2.0/token";
const NAVER_USER_INFO_URL: &str = "https://openapi.naver.com/v1/nid/me";

/// OAuth 제공자 설정.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OauthConfig {
    /// 제공자 종류
    pub provider: ProviderKind,
    /// 앱 REST API 키
    pub client_id: String,
    /// 앱 시크릿
    pub client_secret: String,
    /// 로그인 완료 후 리다이렉트 URI
    pub redirect_uri: String,
    /// 인가 코드 발급 페이지 URL
    pub authorize_url: String,
    /// 토큰 교환 엔드포인트 URL
    pub token_url: String,
    /// 사용자 정보 엔드포인트 URL
    pub user_info_url: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

impl OauthConfig {
    /// 카카오 설정 생성 (기본 엔드포인트 사용).
    pub fn kakao(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            provider: ProviderKind::Kakao,
            client_id,
            client_secret,
            redirect_uri,
            authorize_url: KAKAO_AUTHORIZE_URL.to_string(),
            token_url: KAKAO_TOKEN_URL.to_string(),
            user_info_url: KAKAO_USER_INFO_URL.to_string(),
            timeout_secs: 10,
        }
    }

    /// 네이버 설정 생성 (기본 엔드포인트 사용).
    pub fn naver(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            provider: ProviderKind::Naver,
            client_id,
            client_secret,
            redirect_uri,
            authorize_url: NAVER_AUTHORIZE_URL.to_string(),
            token_url: NAVER_TOKEN_URL.to_string(),
            user_info_url: NAVER_USER_INFO_URL.to_string(),
            timeout_secs: 10,
        }
    }

    /// 환경변수에서 카카오 설정 로드.
    ///
    /// # 환경변수
    /// - `KAKAO_CLIENT_ID`: 카카오 REST API 키
    /// - `KAKAO_CLIENT_SECRET`: 카카오 앱 시크릿
    /// - `KAKAO_REDIRECT_URI`: 등록된 리다이렉트 URI
    ///
    /// 필수 변수가 없으면 `None`을 반환합니다 (해당 제공자 비활성화).
    pub fn kakao_from_env() -> Option<Self> {
        let client_id = std::env::var("KAKAO_CLIENT_ID").ok()?;
        let client_secret = std::env::var("KAKAO_CLIENT_SECRET").ok()?;
        let redirect_uri = std::env::var("KAKAO_REDIRECT_URI").ok()?;
        Some(Self::kakao(client_id, client_secret, redirect_uri))
    }

    /// 환경변수에서 네이버 설정 로드.
    ///
    /// # 환경변수
    /// - `NAVER_CLIENT_ID`, `NAVER_CLIENT_SECRET`, `NAVER_REDIRECT_URI`
    pub fn naver_from_env() -> Option<Self> {
        let client_id = std::env::var("NAVER_CLIENT_ID").ok()?;
        let client_secret = std::env::var("NAVER_CLIENT_SECRET").ok()?;
        let redirect_uri = std::env::var("NAVER_REDIRECT_URI").ok()?;
        Some(Self::naver(client_id, client_secret, redirect_uri))
    }

    /// 토큰 엔드포인트 변경 (테스트용).
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// 사용자 정보 엔드포인트 변경 (테스트용).
    pub fn with_user_info_url(mut self, url: impl Into<String>) -> Self {
        self.user_info_url = url.into();
        self
    }

    /// 타임아웃 변경.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kakao_config_defaults() {
        let config = OauthConfig::kakao(
            "id".to_string(),
            "secret".to_string(),
            "http://localhost:3000/callback".to_string(),
        );

        assert_eq!(config.provider, ProviderKind::Kakao);
        assert!(config.token_url.contains("kauth.kakao.com"));
        assert!(config.user_info_url.contains("kapi.kakao.com"));
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn test_naver_config_defaults() {
        let config = OauthConfig::naver(
            "id".to_string(),
            "secret".to_string(),
            "http://localhost:3000/callback".to_string(),
        );

        assert_eq!(config.provider, ProviderKind::Naver);
        assert!(config.token_url.contains("nid.naver.com"));
        assert!(config.user_info_url.contains("openapi.naver.com"));
    }

    #[test]
    fn test_builder_overrides() {
        let config = OauthConfig::kakao("id".into(), "secret".into(), "uri".into())
            .with_token_url("http://127.0.0.1:9999/token")
            .with_user_info_url("http://127.0.0.1:9999/me")
            .with_timeout_secs(3);

        assert_eq!(config.token_url, "http://127.0.0.1:9999/token");
        assert_eq!(config.user_info_url, "http://127.0.0.1:9999/me");
        assert_eq!(config.timeout_secs, 3);
    }
}
