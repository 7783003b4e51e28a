//! 네이버 OAuth 클라이언트.
//!
//! 네이버 인증 서버와의 통신을 담당합니다:
//! - 인가 코드로 액세스 토큰 요청 (GET /oauth2.0/token, 쿼리 파라미터)
//! - 액세스 토큰으로 사용자 정보 요청 (GET /v1/nid/me)
//!
//! 카카오와 달리 토큰 교환 시 `state` 파라미터가 필수입니다.

use crate::config::OauthConfig;
use crate::error::ProviderClientError;
use crate::response::{OauthErrorResponse, TokenResponse};
use crate::{ProviderKind, UserProfile};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info};

/// 네이버 사용자 정보 응답.
///
/// 네이버는 결과를 `resultcode`/`message`와 함께 `response` 필드에 감쌉니다.
#[derive(Debug, Clone, Deserialize)]
pub struct NaverUserResponse {
    /// 결과 코드 ("00" = 성공)
    pub resultcode: String,
    /// 결과 메시지
    pub message: String,
    /// 실제 프로필 (실패 시 없음)
    pub response: Option<NaverAccount>,
}

/// 네이버 계정 정보.
#[derive(Debug, Clone, Deserialize)]
pub struct NaverAccount {
    /// 네이버 회원 고유 식별자
    pub id: String,
    /// 이메일
    pub email: Option<String>,
    /// 닉네임
    pub nickname: Option<String>,
    /// 이름
    pub name: Option<String>,
}

impl From<NaverAccount> for UserProfile {
    fn from(account: NaverAccount) -> Self {
        // 닉네임이 없으면 이름으로 대체
        let nickname = account.nickname.or(account.name);

        UserProfile {
            provider: ProviderKind::Naver,
            id: account.id,
            email: account.email,
            nickname,
        }
    }
}

/// 네이버 API 클라이언트.
pub struct NaverAuthClient {
    config: OauthConfig,
    client: Client,
}

impl NaverAuthClient {
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

    /// 네이버 로그인 페이지 URL 생성.
    pub fn login_url(&self, state: &str) -> String {
        format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&state={}",
            self.config.authorize_url, self.config.client_id, self.config.redirect_uri, state,
        )
    }

    /// 인가 코드로 액세스 토큰 요청.
    ///
    /// `state`는 로그인 시작 시 발급한 값을 그대로 전달해야 하며,
    /// 네이버가 값을 대조합니다. 재사용된 인가 코드는 거부됩니다.
    ///
    /// # Arguments
    ///
    /// * `code` - 리다이렉트로 전달받은 인가 코드
    /// * `state` - 로그인 시작 시 발급한 상태 토큰
    pub async fn request_access_token(
        &self,
        code: &str,
        state: &str,
    ) -> Result<String, ProviderClientError> {
        debug!("Requesting Naver access token...");

        let response = self
            .client
            .get(&self.config.token_url)
            .query(&[
                ("grant_type", "authorization_code"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("code", code),
                ("state", state),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("Naver token request failed: {} - {}", status, body);
            return Err(ProviderClientError::Http {
                status: status.as_u16(),
                body,
            });
        }

        // 네이버는 HTTP 200으로 에러 본문을 반환하는 경우가 있음
        if let Ok(oauth_error) = serde_json::from_str::<OauthErrorResponse>(&body) {
            error!("Naver token request rejected: {}", oauth_error.describe());
            return Err(ProviderClientError::Http {
                status: status.as_u16(),
                body: oauth_error.describe(),
            });
        }

        let token_resp: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderClientError::Parse(format!("토큰 응답 파싱 실패: {}", e)))?;

        let access_token = token_resp
            .access_token
            .ok_or(ProviderClientError::MissingToken)?;

        info!("Naver access token obtained");
        Ok(access_token)
    }

    /// 액세스 토큰으로 사용자 정보 요청.
    pub async fn request_user_info(
        &self,
        access_token: &str,
    ) -> Result<UserProfile, ProviderClientError> {
        debug!("Requesting Naver user info...");

        let response = self
            .client
            .get(&self.config.user_info_url)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("Naver user info request failed: {} - {}", status, body);
            return Err(ProviderClientError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let user_resp: NaverUserResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderClientError::Parse(format!("사용자 정보 파싱 실패: {}", e)))?;

        if user_resp.resultcode != "00" {
            return Err(ProviderClientError::Http {
                status: status.as_u16(),
                body: format!("{} ({})", user_resp.message, user_resp.resultcode),
            });
        }

        let account = user_resp.response.ok_or_else(|| {
            ProviderClientError::Parse("응답에 프로필 정보가 없습니다".to_string())
        })?;

        Ok(account.into())
    }

    /// 설정 반환.
    pub fn config(&self) -> &OauthConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn test_config(server_url: &str) -> OauthConfig {
        OauthConfig::naver(
            "test-client-id".to_string(),
            "test-client-secret".to_string(),
            "http://localhost:3000/callback".to_string(),
        )
        .with_token_url(format!("{}/oauth2.0/token", server_url))
        .with_user_info_url(format!("{}/v1/nid/me", server_url))
        .with_timeout_secs(3)
    }

    #[tokio::test]
    async fn test_request_access_token_sends_state() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/oauth2.0/token")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
                Matcher::UrlEncoded("code".into(), "auth-code".into()),
                Matcher::UrlEncoded("state".into(), "state-xyz".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"access_token": "naver-token-1", "token_type": "bearer", "expires_in": 3600}"#)
            .create_async()
            .await;

        let client = NaverAuthClient::new(test_config(&server.url())).unwrap();
        let token = client
            .request_access_token("auth-code", "state-xyz")
            .await
            .unwrap();

        assert_eq!(token, "naver-token-1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_body_with_200_status() {
        // 네이버는 200 응답에 에러 본문을 담는 경우가 있음
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/oauth2.0/token")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"error": "invalid_request", "error_description": "no valid data in session"}"#)
            .create_async()
            .await;

        let client = NaverAuthClient::new(test_config(&server.url())).unwrap();
        let result = client.request_access_token("code", "bad-state").await;

        match result {
            Err(ProviderClientError::Http { body, .. }) => {
                assert!(body.contains("invalid_request"));
            }
            other => panic!("Expected Http error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_request_user_info_success() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/nid/me")
            .match_header("authorization", "Bearer naver-token-1")
            .with_status(200)
            .with_body(
                r#"{
                    "resultcode": "00",
                    "message": "success",
                    "response": {
                        "id": "naver-uid-1",
                        "email": "user@naver.com",
                        "name": "홍길동"
                    }
                }"#,
            )
            .create_async()
            .await;

        let client = NaverAuthClient::new(test_config(&server.url())).unwrap();
        let profile = client.request_user_info("naver-token-1").await.unwrap();

        assert_eq!(profile.provider, ProviderKind::Naver);
        assert_eq!(profile.id, "naver-uid-1");
        assert_eq!(profile.email.as_deref(), Some("user@naver.com"));
        // 닉네임이 없으면 이름으로 대체됨
        assert_eq!(profile.nickname.as_deref(), Some("홍길동"));
    }

    #[tokio::test]
    async fn test_user_info_failure_resultcode() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/nid/me")
            .with_status(200)
            .with_body(r#"{"resultcode": "024", "message": "Authentication failed"}"#)
            .create_async()
            .await;

        let client = NaverAuthClient::new(test_config(&server.url())).unwrap();
        let result = client.request_user_info("expired-token").await;

        match result {
            Err(ProviderClientError::Http { body, .. }) => {
                assert!(body.contains("024"));
            }
            other => panic!("Expected Http error, got {:?}", other.map(|_| ())),
        }
    }
}
