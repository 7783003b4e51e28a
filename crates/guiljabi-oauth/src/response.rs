//! 제공자 공통 응답 형식.

use serde::Deserialize;

/// OAuth 2.0 토큰 교환 응답.
///
/// 카카오/네이버 모두 표준 OAuth 2.0 형식을 따릅니다.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// 액세스 토큰 (실패 응답에서는 없을 수 있음)
    pub access_token: Option<String>,
    /// 토큰 타입 (보통 "bearer")
    #[allow(dead_code)]
    pub token_type: Option<String>,
    /// 만료까지 남은 시간 (초)
    #[allow(dead_code)]
    pub expires_in: Option<i64>,
}

/// OAuth 2.0 에러 응답 (토큰 교환 실패 시).
///
/// 네이버는 200 응답 본문에 에러를 담아 보내는 경우가 있어
/// 성공 status에서도 파싱을 시도합니다.
#[derive(Debug, Clone, Deserialize)]
pub struct OauthErrorResponse {
    /// 에러 코드 (예: "invalid_grant")
    pub error: String,
    /// 에러 설명
    pub error_description: Option<String>,
}

impl OauthErrorResponse {
    /// 사람이 읽을 수 있는 한 줄 설명.
    pub fn describe(&self) -> String {
        match &self.error_description {
            Some(desc) => format!("{} ({})", desc, self.error),
            None => self.error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_deserialization() {
        let json = r#"{
            "access_token": "abc123",
            "token_type": "bearer",
            "expires_in": 21599
        }"#;

        let resp: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.access_token.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_token_response_without_token() {
        // 필드가 모두 비어 있어도 파싱은 성공해야 함
        let resp: TokenResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.access_token.is_none());
    }

    #[test]
    fn test_oauth_error_describe() {
        let err: OauthErrorResponse = serde_json::from_str(
            r#"{"error": "invalid_grant", "error_description": "authorization code not found"}"#,
        )
        .unwrap();

        assert!(err.describe().contains("invalid_grant"));
        assert!(err.describe().contains("authorization code not found"));
    }
}
