//! 인증 제공자.
//!
//! 자격증명 종류(비밀번호/토큰)에 다형적인 인증 진입점입니다.
//! 저장소에 대한 읽기 외의 부수효과는 없습니다.

use sqlx::PgPool;
use std::sync::Arc;
use tracing::debug;

use crate::repository::UserRepository;

use super::{decode_token, verify_password, JwtError, JwtSettings, Principal, Role};

/// 인증 자격증명.
#[derive(Debug)]
pub enum Credential<'a> {
    /// 아이디/비밀번호 (관리자 로그인)
    Password {
        username: &'a str,
        password: &'a str,
    },
    /// Bearer 토큰
    BearerToken(&'a str),
}

/// 인증 실패.
#[derive(Debug, thiserror::Error)]
pub enum AuthProviderError {
    /// 아이디 또는 비밀번호 불일치.
    ///
    /// 계정 존재 여부를 노출하지 않기 위해 어느 쪽이 틀렸는지 구분하지
    /// 않습니다.
    #[error("아이디 또는 비밀번호가 올바르지 않습니다")]
    BadCredentials,

    /// 토큰 검증 실패
    #[error("인증되지 않은 요청: {0}")]
    Unauthenticated(#[from] JwtError),

    /// 저장소 접근 실패
    #[error("데이터베이스 에러: {0}")]
    Database(#[from] sqlx::Error),
}

/// 인증 제공자.
///
/// 자격증명을 검증하여 [`Principal`]을 확정합니다.
pub struct AuthenticationProvider {
    pool: PgPool,
    jwt: Arc<JwtSettings>,
}

impl AuthenticationProvider {
    /// 새 인증 제공자 생성.
    pub fn new(pool: PgPool, jwt: Arc<JwtSettings>) -> Self {
        Self { pool, jwt }
    }

    /// 자격증명 검증 및 Principal 확정.
    pub async fn authenticate(
        &self,
        credential: Credential<'_>,
    ) -> Result<Principal, AuthProviderError> {
        match credential {
            Credential::Password { username, password } => {
                self.authenticate_password(username, password).await
            }
            Credential::BearerToken(token) => self.authenticate_token(token),
        }
    }

    /// 비밀번호 기반 인증.
    async fn authenticate_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Principal, AuthProviderError> {
        let user = UserRepository::find_by_username(&self.pool, username)
            .await?
            .ok_or(AuthProviderError::BadCredentials)?;

        let hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthProviderError::BadCredentials)?;

        if verify_password(password, hash).is_err() {
            debug!(username, "Password verification failed");
            return Err(AuthProviderError::BadCredentials);
        }

        Ok(Principal::User {
            pk: user.pk,
            nickname: user.nickname.clone(),
            role: user.role(),
        })
    }

    /// 토큰 기반 인증.
    ///
    /// 토큰 검증은 순수 연산이므로 저장소에 접근하지 않습니다.
    fn authenticate_token(&self, token: &str) -> Result<Principal, AuthProviderError> {
        let data = decode_token(token, &self.jwt.secret)?;
        Ok(data.claims.to_principal()?)
    }

    /// 역할 확인이 포함된 비밀번호 인증 (관리자 로그인용).
    ///
    /// 인증은 성공했지만 요구 역할에 못 미치면 `BadCredentials`를
    /// 반환합니다 (관리자 계정 존재 여부를 노출하지 않음).
    pub async fn authenticate_with_role(
        &self,
        credential: Credential<'_>,
        required: Role,
    ) -> Result<Principal, AuthProviderError> {
        let principal = self.authenticate(credential).await?;
        if !principal.has_role(required) {
            return Err(AuthProviderError::BadCredentials);
        }
        Ok(principal)
    }
}
