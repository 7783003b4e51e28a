//! 소셜 로그인 제공자 연동.
//!
//! 카카오/네이버 OAuth 2.0 인가 코드 흐름의 클라이언트 측을 담당합니다:
//! - 인가 코드 → 액세스 토큰 교환
//! - 액세스 토큰 → 사용자 프로필 조회
//! - 로그인 URL 생성
//!
//! 각 제공자당 로그인 시도마다 두 번의 아웃바운드 HTTPS 호출이 발생하며,
//! 재시도는 하지 않습니다. 실패는 즉시 [`ProviderClientError`]로 호출자에게
//! 전달됩니다.

pub mod config;
pub mod error;
pub mod kakao;
pub mod naver;
mod response;

pub use config::OauthConfig;
pub use error::ProviderClientError;
pub use kakao::KakaoAuthClient;
pub use naver::NaverAuthClient;

use serde::{Deserialize, Serialize};

/// 지원하는 소셜 로그인 제공자.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// 카카오
    Kakao,
    /// 네이버
    Naver,
}

impl ProviderKind {
    /// DB 저장용 소문자 식별자.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Kakao => "kakao",
            ProviderKind::Naver => "naver",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 제공자에서 조회한 사용자 프로필.
///
/// 제공자별 응답 형식을 공통 형태로 정규화한 결과입니다.
/// 프로필 조회 직후 사용자 생성/조회에 한 번 사용되고 버려집니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// 제공자 종류
    pub provider: ProviderKind,
    /// 제공자 측 사용자 고유 식별자
    pub id: String,
    /// 이메일 (동의하지 않은 경우 없음)
    pub email: Option<String>,
    /// 닉네임 또는 이름
    pub nickname: Option<String>,
}
