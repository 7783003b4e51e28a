//! Reports Repository
//!
//! 게시글 신고 관련 데이터베이스 연산을 담당합니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

/// 신고 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    /// 광고/스팸
    Ad,
    /// 욕설/비방
    Abuse,
    /// 음란물
    Obscene,
    /// 허위 정보
    FalseInfo,
    /// 기타
    #[default]
    Etc,
}

impl ReportType {
    /// DB 저장용 문자열.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Ad => "ad",
            ReportType::Abuse => "abuse",
            ReportType::Obscene => "obscene",
            ReportType::FalseInfo => "false_info",
            ReportType::Etc => "etc",
        }
    }
}

/// 신고 레코드 (게시글 제목/신고자 닉네임 포함, 관리자 목록용).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReportWithBoard {
    pub pk: Uuid,
    pub board_pk: Uuid,
    pub board_title: String,
    pub reporter_pk: Uuid,
    pub reporter_nickname: String,
    /// 신고 유형 ("ad" | "abuse" | "obscene" | "false_info" | "etc")
    pub report_type: String,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// 새 신고 입력.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewReport {
    pub board_pk: Uuid,
    /// 신고 유형 (기본값: etc)
    #[serde(default)]
    pub report_type: ReportType,
    #[validate(length(min = 1, max = 500, message = "신고 사유는 1~500자여야 합니다"))]
    pub reason: String,
}

/// Reports Repository
pub struct ReportRepository;

impl ReportRepository {
    /// 신고 생성.
    pub async fn create(
        pool: &PgPool,
        reporter_pk: Uuid,
        input: &NewReport,
    ) -> Result<Uuid, sqlx::Error> {
        let pk: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO reports (board_pk, reporter_pk, report_type, reason)
            VALUES ($1, $2, $3, $4)
            RETURNING pk
            "#,
        )
        .bind(input.board_pk)
        .bind(reporter_pk)
        .bind(input.report_type.as_str())
        .bind(&input.reason)
        .fetch_one(pool)
        .await?;

        Ok(pk)
    }

    /// 신고 목록 조회 (관리자용, 최신순).
    pub async fn list(
        pool: &PgPool,
        page: i64,
        size: i64,
    ) -> Result<Vec<ReportWithBoard>, sqlx::Error> {
        let records = sqlx::query_as::<_, ReportWithBoard>(
            r#"
            SELECT r.pk, r.board_pk, b.title AS board_title,
                   r.reporter_pk, u.nickname AS reporter_nickname,
                   r.report_type, r.reason, r.created_at
            FROM reports r
            JOIN boards b ON b.pk = r.board_pk
            JOIN users u ON u.pk = r.reporter_pk
            ORDER BY r.created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(size)
        .bind((page - 1).max(0) * size)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// 신고 수.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// 신고 삭제 (처리 완료, 관리자용).
    pub async fn delete(pool: &PgPool, pk: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reports WHERE pk = $1")
            .bind(pk)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
