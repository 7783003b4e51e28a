//! Comments Repository
//!
//! 게시글 댓글 관련 데이터베이스 연산을 담당합니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

/// 댓글 레코드 (작성자 닉네임 포함).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CommentWithWriter {
    pub pk: Uuid,
    pub board_pk: Uuid,
    pub writer_pk: Uuid,
    pub writer_nickname: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// 새 댓글 입력.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewComment {
    #[validate(length(min = 1, max = 1000, message = "댓글은 1~1000자여야 합니다"))]
    pub content: String,
}

/// Comments Repository
pub struct CommentRepository;

impl CommentRepository {
    /// 게시글의 댓글 목록 조회 (작성순).
    pub async fn list_by_board(
        pool: &PgPool,
        board_pk: Uuid,
    ) -> Result<Vec<CommentWithWriter>, sqlx::Error> {
        let records = sqlx::query_as::<_, CommentWithWriter>(
            r#"
            SELECT c.pk, c.board_pk, c.writer_pk, u.nickname AS writer_nickname,
                   c.content, c.created_at
            FROM comments c
            JOIN users u ON u.pk = c.writer_pk
            WHERE c.board_pk = $1
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(board_pk)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// 댓글 생성.
    pub async fn create(
        pool: &PgPool,
        board_pk: Uuid,
        writer_pk: Uuid,
        content: &str,
    ) -> Result<CommentWithWriter, sqlx::Error> {
        let record = sqlx::query_as::<_, CommentWithWriter>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (board_pk, writer_pk, content)
                VALUES ($1, $2, $3)
                RETURNING *
            )
            SELECT i.pk, i.board_pk, i.writer_pk, u.nickname AS writer_nickname,
                   i.content, i.created_at
            FROM inserted i
            JOIN users u ON u.pk = i.writer_pk
            "#,
        )
        .bind(board_pk)
        .bind(writer_pk)
        .bind(content)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// 댓글 작성자 PK 조회 (삭제 권한 확인용).
    pub async fn find_writer(pool: &PgPool, pk: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
        let writer: Option<Uuid> =
            sqlx::query_scalar("SELECT writer_pk FROM comments WHERE pk = $1")
                .bind(pk)
                .fetch_optional(pool)
                .await?;

        Ok(writer)
    }

    /// 댓글 삭제.
    pub async fn delete(pool: &PgPool, pk: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE pk = $1")
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
    fn test_new_comment_validation() {
        let valid = NewComment {
            content: "좋은 정보 감사합니다".to_string(),
        };
        assert!(valid.validate().is_ok());

        let empty = NewComment {
            content: String::new(),
        };
        assert!(empty.validate().is_err());

        let too_long = NewComment {
            content: "a".repeat(1001),
        };
        assert!(too_long.validate().is_err());
    }
}
