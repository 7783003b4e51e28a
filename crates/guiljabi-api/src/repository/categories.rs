//! Categories Repository
//!
//! 카테고리 트리 관련 데이터베이스 연산을 담당합니다.
//! 카테고리는 parent_pk로 연결된 트리 구조이며, 루트/자식/조상 조회를
//! 제공합니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// 카테고리 레코드.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CategoryRecord {
    pub pk: Uuid,
    pub name: String,
    #[sqlx(default)]
    pub parent_pk: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Categories Repository
pub struct CategoryRepository;

impl CategoryRepository {
    /// 루트 카테고리 목록 조회.
    pub async fn roots(pool: &PgPool) -> Result<Vec<CategoryRecord>, sqlx::Error> {
        let records = sqlx::query_as::<_, CategoryRecord>(
            "SELECT * FROM categories WHERE parent_pk IS NULL ORDER BY name",
        )
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// PK로 카테고리 조회.
    pub async fn find_by_pk(
        pool: &PgPool,
        pk: Uuid,
    ) -> Result<Option<CategoryRecord>, sqlx::Error> {
        let record = sqlx::query_as::<_, CategoryRecord>("SELECT * FROM categories WHERE pk = $1")
            .bind(pk)
            .fetch_optional(pool)
            .await?;

        Ok(record)
    }

    /// 자식 카테고리 목록 조회.
    pub async fn children(pool: &PgPool, pk: Uuid) -> Result<Vec<CategoryRecord>, sqlx::Error> {
        let records = sqlx::query_as::<_, CategoryRecord>(
            "SELECT * FROM categories WHERE parent_pk = $1 ORDER BY name",
        )
        .bind(pk)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// 조상 카테고리 목록 조회 (자신 포함, 루트가 마지막).
    pub async fn ancestors(pool: &PgPool, pk: Uuid) -> Result<Vec<CategoryRecord>, sqlx::Error> {
        let records = sqlx::query_as::<_, CategoryRecord>(
            r#"
            WITH RECURSIVE ancestry AS (
                SELECT *, 0 AS depth FROM categories WHERE pk = $1
                UNION ALL
                SELECT c.*, a.depth + 1
                FROM categories c
                JOIN ancestry a ON c.pk = a.parent_pk
            )
            SELECT pk, name, parent_pk, created_at FROM ancestry ORDER BY depth
            "#,
        )
        .bind(pk)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// 게시글에 연결된 카테고리 목록 조회.
    pub async fn for_board(
        pool: &PgPool,
        board_pk: Uuid,
    ) -> Result<Vec<CategoryRecord>, sqlx::Error> {
        let records = sqlx::query_as::<_, CategoryRecord>(
            r#"
            SELECT c.pk, c.name, c.parent_pk, c.created_at
            FROM categories c
            JOIN board_category bc ON bc.category_pk = c.pk
            WHERE bc.board_pk = $1
            ORDER BY c.name
            "#,
        )
        .bind(board_pk)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// 카테고리 생성 (관리자용).
    pub async fn create(
        pool: &PgPool,
        name: &str,
        parent_pk: Option<Uuid>,
    ) -> Result<CategoryRecord, sqlx::Error> {
        let record = sqlx::query_as::<_, CategoryRecord>(
            r#"
            INSERT INTO categories (name, parent_pk)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(parent_pk)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// 카테고리 삭제 (관리자용, 자식은 CASCADE로 함께 삭제됨).
    pub async fn delete(pool: &PgPool, pk: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE pk = $1")
            .bind(pk)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
