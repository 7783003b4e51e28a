//! Users Repository
//!
//! 사용자 계정 관련 데이터베이스 연산을 담당합니다.
//! 소셜 로그인 사용자는 (provider, provider_id) 쌍으로 식별되고,
//! 관리자 계정은 username + 비밀번호 해시로 로그인합니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::auth::Role;

/// 사용자 레코드.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRecord {
    pub pk: Uuid,
    /// 인증 제공자 ("kakao" | "naver" | "local")
    pub provider: String,
    /// 제공자 측 사용자 식별자 (local 계정은 없음)
    #[sqlx(default)]
    pub provider_id: Option<String>,
    /// 로그인 아이디 (local 계정만)
    #[sqlx(default)]
    pub username: Option<String>,
    /// Argon2 비밀번호 해시 (local 계정만, 응답에 포함 금지)
    #[serde(skip_serializing)]
    #[sqlx(default)]
    pub password_hash: Option<String>,
    /// 닉네임 (전역 유일)
    pub nickname: String,
    #[sqlx(default)]
    pub email: Option<String>,
    /// 역할 ("admin" | "user")
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// 역할 파싱 (알 수 없는 값은 일반 사용자로 취급).
    pub fn role(&self) -> Role {
        Role::parse(&self.role).unwrap_or(Role::User)
    }
}

/// Users Repository
pub struct UserRepository;

impl UserRepository {
    /// PK로 사용자 조회.
    pub async fn find_by_pk(pool: &PgPool, pk: Uuid) -> Result<Option<UserRecord>, sqlx::Error> {
        let record = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE pk = $1")
            .bind(pk)
            .fetch_optional(pool)
            .await?;

        Ok(record)
    }

    /// 로그인 아이디로 사용자 조회 (관리자 로그인).
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<UserRecord>, sqlx::Error> {
        let record = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(pool)
            .await?;

        Ok(record)
    }

    /// 닉네임 사용 여부 확인.
    pub async fn nickname_exists(pool: &PgPool, nickname: &str) -> Result<bool, sqlx::Error> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE nickname = $1)")
                .bind(nickname)
                .fetch_one(pool)
                .await?;

        Ok(exists)
    }

    /// 소셜 로그인 사용자 조회 또는 생성.
    ///
    /// (provider, provider_id)로 기존 사용자를 찾고, 없으면 새로
    /// 생성합니다. 닉네임 충돌 시 짧은 접미사를 붙여 유일성을 확보합니다.
    pub async fn get_or_create_oauth_user(
        pool: &PgPool,
        provider: &str,
        provider_id: &str,
        email: Option<&str>,
        nickname_hint: Option<&str>,
    ) -> Result<UserRecord, sqlx::Error> {
        if let Some(existing) = sqlx::query_as::<_, UserRecord>(
            "SELECT * FROM users WHERE provider = $1 AND provider_id = $2",
        )
        .bind(provider)
        .bind(provider_id)
        .fetch_optional(pool)
        .await?
        {
            return Ok(existing);
        }

        let base_nickname = nickname_hint
            .filter(|n| !n.trim().is_empty())
            .map(|n| n.trim().to_string())
            .unwrap_or_else(|| format!("{}유저", provider));

        let nickname = if Self::nickname_exists(pool, &base_nickname).await? {
            // 충돌 시 접미사 부여
            let suffix = &Uuid::new_v4().to_string()[..6];
            format!("{}_{}", base_nickname, suffix)
        } else {
            base_nickname
        };

        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (provider, provider_id, nickname, email, role)
            VALUES ($1, $2, $3, $4, 'user')
            ON CONFLICT (provider, provider_id) DO UPDATE
            SET updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(provider)
        .bind(provider_id)
        .bind(&nickname)
        .bind(email)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// 관리자(local) 계정 생성.
    ///
    /// 이미 존재하는 username이면 아무것도 하지 않고 기존 레코드를
    /// 반환합니다.
    pub async fn create_admin(
        pool: &PgPool,
        username: &str,
        password_hash: &str,
        nickname: &str,
    ) -> Result<UserRecord, sqlx::Error> {
        if let Some(existing) = Self::find_by_username(pool, username).await? {
            return Ok(existing);
        }

        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (provider, username, password_hash, nickname, role)
            VALUES ('local', $1, $2, $3, 'admin')
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(nickname)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// 닉네임 변경.
    pub async fn update_nickname(
        pool: &PgPool,
        pk: Uuid,
        nickname: &str,
    ) -> Result<Option<UserRecord>, sqlx::Error> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            UPDATE users
            SET nickname = $2, updated_at = NOW()
            WHERE pk = $1
            RETURNING *
            "#,
        )
        .bind(pk)
        .bind(nickname)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }
}
