//! EditRequests Repository
//!
//! 게시글 수정요청 관련 데이터베이스 연산을 담당합니다.
//! 사용자가 다른 사람의 게시글에 내용 수정을 제안하면 관리자가
//! 확인 후 처리 완료로 표시합니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

/// 수정요청 레코드 (게시글 제목 포함).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EditRequestRecord {
    pub pk: Uuid,
    pub board_pk: Uuid,
    pub board_title: String,
    pub requester_pk: Uuid,
    pub content: String,
    /// 관리자 처리 완료 여부
    pub is_processed: bool,
    pub created_at: DateTime<Utc>,
}

/// 새 수정요청 입력.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewEditRequest {
    pub board_pk: Uuid,
    #[validate(length(min = 1, max = 2000, message = "수정요청 내용은 1~2000자여야 합니다"))]
    pub content: String,
}

/// EditRequests Repository
pub struct EditRequestRepository;

impl EditRequestRepository {
    /// 수정요청 생성.
    pub async fn create(
        pool: &PgPool,
        requester_pk: Uuid,
        input: &NewEditRequest,
    ) -> Result<Uuid, sqlx::Error> {
        let pk: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO edit_requests (board_pk, requester_pk, content)
            VALUES ($1, $2, $3)
            RETURNING pk
            "#,
        )
        .bind(input.board_pk)
        .bind(requester_pk)
        .bind(&input.content)
        .fetch_one(pool)
        .await?;

        Ok(pk)
    }

    /// 내가 제출한 수정요청 목록 조회 (최신순).
    pub async fn list_by_requester(
        pool: &PgPool,
        requester_pk: Uuid,
    ) -> Result<Vec<EditRequestRecord>, sqlx::Error> {
        let records = sqlx::query_as::<_, EditRequestRecord>(
            r#"
            SELECT e.pk, e.board_pk, b.title AS board_title, e.requester_pk,
                   e.content, e.is_processed, e.created_at
            FROM edit_requests e
            JOIN boards b ON b.pk = e.board_pk
            WHERE e.requester_pk = $1
            ORDER BY e.created_at DESC
            "#,
        )
        .bind(requester_pk)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// 미처리 수정요청 목록 조회 (관리자용, 오래된 순).
    pub async fn list_unprocessed(
        pool: &PgPool,
        page: i64,
        size: i64,
    ) -> Result<Vec<EditRequestRecord>, sqlx::Error> {
        let records = sqlx::query_as::<_, EditRequestRecord>(
            r#"
            SELECT e.pk, e.board_pk, b.title AS board_title, e.requester_pk,
                   e.content, e.is_processed, e.created_at
            FROM edit_requests e
            JOIN boards b ON b.pk = e.board_pk
            WHERE e.is_processed = false
            ORDER BY e.created_at ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(size)
        .bind((page - 1).max(0) * size)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// 수정요청 처리 완료 표시 (관리자용).
    pub async fn mark_processed(pool: &PgPool, pk: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE edit_requests SET is_processed = true WHERE pk = $1 AND is_processed = false",
        )
        .bind(pk)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_edit_request_validation() {
        let valid = NewEditRequest {
            board_pk: Uuid::new_v4(),
            content: "출처 링크가 깨져 있습니다".to_string(),
        };
        assert!(valid.validate().is_ok());

        let empty = NewEditRequest {
            board_pk: Uuid::new_v4(),
            content: String::new(),
        };
        assert!(empty.validate().is_err());
    }
}
