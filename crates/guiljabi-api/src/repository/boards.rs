//! Boards Repository
//!
//! 게시글(정보글) 관련 데이터베이스 연산을 담당합니다.
//! 게시글은 작성 시 승인 대기(pending) 상태로 시작하고, 관리자 승인
//! 후에만 공개 목록에 노출됩니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

/// 게시글 승인 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardStatus {
    /// 승인 대기
    Pending,
    /// 승인됨 (공개)
    Approve,
    /// 반려됨
    Reject,
}

impl BoardStatus {
    /// DB 저장용 문자열.
    pub fn as_str(&self) -> &'static str {
        match self {
            BoardStatus::Pending => "pending",
            BoardStatus::Approve => "approve",
            BoardStatus::Reject => "reject",
        }
    }

    /// 문자열에서 파싱.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(BoardStatus::Pending),
            "approve" => Some(BoardStatus::Approve),
            "reject" => Some(BoardStatus::Reject),
            _ => None,
        }
    }
}

/// 게시글 목록 정렬 기준.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardSortType {
    /// 최신순
    #[default]
    Latest,
    /// 조회수순
    Popular,
}

/// 게시글 레코드.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BoardRecord {
    pub pk: Uuid,
    pub writer_pk: Uuid,
    pub title: String,
    /// 한 줄 소개
    #[sqlx(default)]
    pub introduction: Option<String>,
    pub content: String,
    #[sqlx(default)]
    pub thumbnail_url: Option<String>,
    /// 승인 상태 ("pending" | "approve" | "reject")
    pub status: String,
    pub view_cnt: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BoardRecord {
    /// 승인 상태 파싱.
    pub fn status(&self) -> BoardStatus {
        BoardStatus::parse(&self.status).unwrap_or(BoardStatus::Pending)
    }
}

/// 목록 조회용 게시글 요약 (작성자 닉네임 포함).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BoardListItem {
    pub pk: Uuid,
    pub title: String,
    #[sqlx(default)]
    pub introduction: Option<String>,
    #[sqlx(default)]
    pub thumbnail_url: Option<String>,
    pub view_cnt: i64,
    pub writer_nickname: String,
    pub created_at: DateTime<Utc>,
}

/// 새 게시글 입력.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewBoard {
    #[validate(length(min = 1, max = 100, message = "제목은 1~100자여야 합니다"))]
    pub title: String,
    #[validate(length(max = 300, message = "소개는 300자 이하여야 합니다"))]
    #[serde(default)]
    pub introduction: Option<String>,
    #[validate(length(min = 1, message = "내용을 입력해야 합니다"))]
    pub content: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    /// 연결할 카테고리 PK 목록
    #[serde(default)]
    pub category_pks: Vec<Uuid>,
}

/// 게시글 수정 입력.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateBoard {
    #[validate(length(min = 1, max = 100, message = "제목은 1~100자여야 합니다"))]
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub introduction: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

/// Boards Repository
pub struct BoardRepository;

impl BoardRepository {
    /// 승인된 게시글 목록 조회 (페이징 + 정렬).
    pub async fn list_approved(
        pool: &PgPool,
        page: i64,
        size: i64,
        sort: BoardSortType,
    ) -> Result<Vec<BoardListItem>, sqlx::Error> {
        let order_by = match sort {
            BoardSortType::Latest => "b.created_at DESC",
            BoardSortType::Popular => "b.view_cnt DESC, b.created_at DESC",
        };

        let query = format!(
            r#"
            SELECT b.pk, b.title, b.introduction, b.thumbnail_url, b.view_cnt,
                   u.nickname AS writer_nickname, b.created_at
            FROM boards b
            JOIN users u ON u.pk = b.writer_pk
            WHERE b.status = 'approve'
            ORDER BY {}
            LIMIT $1 OFFSET $2
            "#,
            order_by
        );

        let records = sqlx::query_as::<_, BoardListItem>(&query)
            .bind(size)
            .bind((page - 1).max(0) * size)
            .fetch_all(pool)
            .await?;

        Ok(records)
    }

    /// 승인된 게시글 수.
    pub async fn count_approved(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM boards WHERE status = 'approve'")
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// 인기 게시글 조회 (조회수 상위 N개).
    pub async fn popular(pool: &PgPool, limit: i64) -> Result<Vec<BoardListItem>, sqlx::Error> {
        let records = sqlx::query_as::<_, BoardListItem>(
            r#"
            SELECT b.pk, b.title, b.introduction, b.thumbnail_url, b.view_cnt,
                   u.nickname AS writer_nickname, b.created_at
            FROM boards b
            JOIN users u ON u.pk = b.writer_pk
            WHERE b.status = 'approve'
            ORDER BY b.view_cnt DESC, b.created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// PK로 게시글 조회.
    pub async fn find_by_pk(pool: &PgPool, pk: Uuid) -> Result<Option<BoardRecord>, sqlx::Error> {
        let record = sqlx::query_as::<_, BoardRecord>("SELECT * FROM boards WHERE pk = $1")
            .bind(pk)
            .fetch_optional(pool)
            .await?;

        Ok(record)
    }

    /// 조회수 증가.
    pub async fn increase_view_count(pool: &PgPool, pk: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE boards SET view_cnt = view_cnt + 1 WHERE pk = $1")
            .bind(pk)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// 게시글 생성 (승인 대기 상태로 시작).
    ///
    /// 카테고리 연결도 함께 저장합니다.
    pub async fn create(
        pool: &PgPool,
        writer_pk: Uuid,
        input: &NewBoard,
    ) -> Result<BoardRecord, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let record = sqlx::query_as::<_, BoardRecord>(
            r#"
            INSERT INTO boards (writer_pk, title, introduction, content, thumbnail_url, status)
            VALUES ($1, $2, $3, $4, $5, 'pending')
            RETURNING *
            "#,
        )
        .bind(writer_pk)
        .bind(&input.title)
        .bind(&input.introduction)
        .bind(&input.content)
        .bind(&input.thumbnail_url)
        .fetch_one(&mut *tx)
        .await?;

        for category_pk in &input.category_pks {
            sqlx::query(
                "INSERT INTO board_category (board_pk, category_pk) VALUES ($1, $2)
                 ON CONFLICT DO NOTHING",
            )
            .bind(record.pk)
            .bind(category_pk)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(record)
    }

    /// 게시글 수정 (작성자 확인은 핸들러에서 수행).
    ///
    /// 수정된 게시글은 다시 승인 대기 상태가 됩니다.
    pub async fn update(
        pool: &PgPool,
        pk: Uuid,
        input: &UpdateBoard,
    ) -> Result<Option<BoardRecord>, sqlx::Error> {
        let record = sqlx::query_as::<_, BoardRecord>(
            r#"
            UPDATE boards
            SET
                title = COALESCE($2, title),
                introduction = COALESCE($3, introduction),
                content = COALESCE($4, content),
                thumbnail_url = COALESCE($5, thumbnail_url),
                status = 'pending',
                updated_at = NOW()
            WHERE pk = $1
            RETURNING *
            "#,
        )
        .bind(pk)
        .bind(&input.title)
        .bind(&input.introduction)
        .bind(&input.content)
        .bind(&input.thumbnail_url)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// 게시글 삭제 (연결 레코드는 CASCADE로 함께 삭제됨).
    pub async fn delete(pool: &PgPool, pk: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM boards WHERE pk = $1")
            .bind(pk)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 상태별 게시글 목록 조회 (관리자용).
    pub async fn list_by_status(
        pool: &PgPool,
        status: BoardStatus,
        page: i64,
        size: i64,
    ) -> Result<Vec<BoardListItem>, sqlx::Error> {
        let records = sqlx::query_as::<_, BoardListItem>(
            r#"
            SELECT b.pk, b.title, b.introduction, b.thumbnail_url, b.view_cnt,
                   u.nickname AS writer_nickname, b.created_at
            FROM boards b
            JOIN users u ON u.pk = b.writer_pk
            WHERE b.status = $1
            ORDER BY b.created_at ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(status.as_str())
        .bind(size)
        .bind((page - 1).max(0) * size)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// 게시글 승인 상태 변경 (관리자용).
    pub async fn update_status(
        pool: &PgPool,
        pk: Uuid,
        status: BoardStatus,
    ) -> Result<Option<BoardRecord>, sqlx::Error> {
        let record = sqlx::query_as::<_, BoardRecord>(
            r#"
            UPDATE boards
            SET status = $2, updated_at = NOW()
            WHERE pk = $1
            RETURNING *
            "#,
        )
        .bind(pk)
        .bind(status.as_str())
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }
}
