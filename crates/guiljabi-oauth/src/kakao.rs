//! 카카오 OAuth 클라이언트.
//!
//! 카카오 인증 서버와의 통신을 담당합니다:
//! - 인가 코드로 액세스 토큰 요청 (POST /oauth/token, form 인코딩)
//! - 액세스 토큰으로 사용자 정보 요청 (POST /v2/user/me)

use crate::config::OauthConfig;
use crate::error::ProviderClientError;
use crate::response::{OauthErrorResponse, TokenResponse};
use crate::{ProviderKind, UserProfile};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info};

/// 카카오 사용자 정보 응답.
#[derive(Debug, Clone, Deserialize)]
pub struct KakaoUserResponse {
    /// 카카오 회원번호
    pub id: i64,
    /// 카카오 계정 정보 (동의 항목에 따라 일부만 존재)
    pub kakao_account: Option<KakaoAccount>,
}

/// 카카오 계정 정보.
#[derive(Debug, Clone, Deserialize)]
pub struct KakaoAccount {
    /// 이메일 (이메일 제공 미동의 시 없음)
    pub email: Option<String>,
    /// 프로필 정보
    pub profile: Option<KakaoProfile>,
}

/// 카카오 프로필 정보.
#[derive(Debug, Clone, Deserialize)]
pub struct KakaoProfile {
    /// 닉네임
    pub nickname: Option<String>,
}

impl From<KakaoUserResponse> for UserProfile {
    fn from(resp: KakaoUserResponse) -> Self {
        let (email, nickname) = match resp.kakao_account {
            Some(account) => (
                account.email,
                account.profile.and_then(|p| p.nickname),
            ),
            None => (None, None),
        };

        UserProfile {
            provider: ProviderKind::Kakao,
            id: resp.id.to_string(),
            email,
            nickname,
        }
    }
}

/// 카카오 API 클라이언트.
pub struct KakaoAuthClient {
    config: OauthConfig,
    client: Client,
}

impl KakaoAuthClient {
    /// 새 클라이언트 생성.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 `ProviderClientError::Config`를 반환합니다.
    pub fn new(config: OauthConfig) -> Result<Self, ProviderClientError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderClientError::Config(format!("HTTP client 생성 실패: {}", e)))?;

        Ok(Self { config, client })
    }

    /// 카카오 로그인 페이지 URL 생성.
    ///
    /// 프론트엔드가 이 URL로 사용자를 이동시키면, 로그인 완료 후
    /// `redirect_uri`로 인가 코드와 state가 전달됩니다.
    pub fn login_url(&self, state: &str) -> String {
        format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&state={}",
            self.config.authorize_url, self.config.client_id, self.config.redirect_uri, state,
        )
    }

    /// 인가 코드로 액세스 토큰 요청.
    ///
    /// 인가 코드는 1회용입니다. 이미 사용된 코드를 다시 보내면 카카오가
    /// `invalid_grant`로 거부하며, 그대로 에러로 전달됩니다.
    ///
    /// # Arguments
    ///
    /// * `code` - 리다이렉트로 전달받은 인가 코드
    pub async fn request_access_token(&self, code: &str) -> Result<String, ProviderClientError> {
        debug!("Requesting Kakao access token...");

        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code", code),
        ];

        let response = self
            .client
            .post(&self.config.token_url)
            .header("Content-Type", "application/x-www-form-urlencoded;charset=utf-8")
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("Kakao token request failed: {} - {}", status, body);

            // OAuth 에러 응답 파싱 시도
            if let Ok(oauth_error) = serde_json::from_str::<OauthErrorResponse>(&body) {
                return Err(ProviderClientError::Http {
                    status: status.as_u16(),
                    body: oauth_error.describe(),
                });
            }

            return Err(ProviderClientError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let token_resp: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderClientError::Parse(format!("토큰 응답 파싱 실패: {}", e)))?;

        let access_token = token_resp
            .access_token
            .ok_or(ProviderClientError::MissingToken)?;

        info!("Kakao access token obtained");
        Ok(access_token)
    }

    /// 액세스 토큰으로 사용자 정보 요청.
    pub async fn request_user_info(
        &self,
        access_token: &str,
    ) -> Result<UserProfile, ProviderClientError> {
        debug!("Requesting Kakao user info...");

        let response = self
            .client
            .post(&self.config.user_info_url)
            .header("Authorization", format!("Bearer {}", access_token))
            .header("Content-Type", "application/x-www-form-urlencoded;charset=utf-8")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("Kakao user info request failed: {} - {}", status, body);
            return Err(ProviderClientError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let user_resp: KakaoUserResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderClientError::Parse(format!("사용자 정보 파싱 실패: {}", e)))?;

        Ok(user_resp.into())
    }

    /// 설정 반환.
    pub fn config(&self) -> &OauthConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(server_url: &str) -> OauthConfig {
        OauthConfig::kakao(
            "test-client-id".to_string(),
            "test-client-secret".to_string(),
            "http://localhost:3000/callback".to_string(),
        )
        .with_token_url(format!("{}/oauth/token", server_url))
        .with_user_info_url(format!("{}/v2/user/me", server_url))
        .with_timeout_secs(3)
    }

    #[test]
    fn test_login_url_contains_params() {
        let client = KakaoAuthClient::new(test_config("http://localhost")).unwrap();
        let url = client.login_url("state-abc");

        assert!(url.contains("response_type=code"));
        assert!(url.contains("client_id=test-client-id"));
        assert!(url.contains("state=state-abc"));
    }

    #[tokio::test]
    async fn test_request_access_token_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "kakao-token-1", "token_type": "bearer", "expires_in": 21599}"#)
            .create_async()
            .await;

        let client = KakaoAuthClient::new(test_config(&server.url())).unwrap();
        let token = client.request_access_token("auth-code").await.unwrap();

        assert_eq!(token, "kakao-token-1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_request_access_token_missing_token() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/oauth/token")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = KakaoAuthClient::new(test_config(&server.url())).unwrap();
        let result = client.request_access_token("auth-code").await;

        assert!(matches!(result, Err(ProviderClientError::MissingToken)));
    }

    #[tokio::test]
    async fn test_replayed_code_is_rejected() {
        // 이미 사용된 인가 코드는 제공자가 invalid_grant로 거부함
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/oauth/token")
            .with_status(400)
            .with_body(r#"{"error": "invalid_grant", "error_description": "authorization code not found"}"#)
            .create_async()
            .await;

        let client = KakaoAuthClient::new(test_config(&server.url())).unwrap();
        let result = client.request_access_token("used-code").await;

        match result {
            Err(ProviderClientError::Http { status, body }) => {
                assert_eq!(status, 400);
                assert!(body.contains("invalid_grant"));
            }
            other => panic!("Expected Http error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_request_user_info_success() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v2/user/me")
            .match_header("authorization", "Bearer kakao-token-1")
            .with_status(200)
            .with_body(
                r#"{
                    "id": 123456789,
                    "kakao_account": {
                        "email": "user@example.com",
                        "profile": {"nickname": "길잡이유저"}
                    }
                }"#,
            )
            .create_async()
            .await;

        let client = KakaoAuthClient::new(test_config(&server.url())).unwrap();
        let profile = client.request_user_info("kakao-token-1").await.unwrap();

        assert_eq!(profile.provider, ProviderKind::Kakao);
        assert_eq!(profile.id, "123456789");
        assert_eq!(profile.email.as_deref(), Some("user@example.com"));
        assert_eq!(profile.nickname.as_deref(), Some("길잡이유저"));
    }

    #[tokio::test]
    async fn test_request_user_info_partial_consent() {
        // 이메일 제공 미동의 시에도 프로필은 파싱되어야 함
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v2/user/me")
            .with_status(200)
            .with_body(r#"{"id": 42}"#)
            .create_async()
            .await;

        let client = KakaoAuthClient::new(test_config(&server.url())).unwrap();
        let profile = client.request_user_info("token").await.unwrap();

        assert_eq!(profile.id, "42");
        assert!(profile.email.is_none());
        assert!(profile.nickname.is_none());
    }

    #[tokio::test]
    async fn test_user_info_transport_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v2/user/me")
            .with_status(401)
            .with_body(r#"{"msg": "this access token does not exist", "code": -401}"#)
            .create_async()
            .await;

        let client = KakaoAuthClient::new(test_config(&server.url())).unwrap();
        let result = client.request_user_info("bad-token").await;

        assert!(matches!(
            result,
            Err(ProviderClientError::Http { status: 401, .. })
        ));
    }
}
