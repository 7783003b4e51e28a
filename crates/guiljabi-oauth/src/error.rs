//! 제공자 클라이언트 에러 타입.

use thiserror::Error;

/// 소셜 로그인 제공자 호출 실패.
///
/// 어떤 변형이든 해당 로그인 시도의 종료를 의미합니다. 재시도하지 않으며,
/// 사용자는 새 인가 코드로 로그인 흐름을 다시 시작해야 합니다.
#[derive(Debug, Error)]
pub enum ProviderClientError {
    /// 네트워크 수준 실패 (연결 불가, 타임아웃 등)
    #[error("제공자 API 네트워크 에러: {0}")]
    Network(String),

    /// 제공자가 비 2xx 응답을 반환 (인가 코드 재사용 거부 포함)
    #[error("제공자 API 응답 실패 (HTTP {status}): {body}")]
    Http { status: u16, body: String },

    /// 응답 본문 파싱 실패
    #[error("제공자 응답 파싱 실패: {0}")]
    Parse(String),

    /// 2xx 응답이지만 액세스 토큰이 없음
    #[error("제공자 응답에 액세스 토큰이 없습니다")]
    MissingToken,

    /// 클라이언트 설정 오류
    #[error("제공자 설정 에러: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ProviderClientError {
    fn from(e: reqwest::Error) -> Self {
        ProviderClientError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProviderClientError::Http {
            status: 400,
            body: "invalid_grant".to_string(),
        };
        assert!(err.to_string().contains("400"));
        assert!(err.to_string().contains("invalid_grant"));

        let err = ProviderClientError::MissingToken;
        assert!(err.to_string().contains("액세스 토큰"));
    }
}
