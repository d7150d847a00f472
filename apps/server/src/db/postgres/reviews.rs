use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::{
    db::traits::ReviewRepository,
    error::{Error, Result},
    models::{average_grade, Review},
};

#[derive(Clone)]
pub struct PostgresReviewRepository {
    pool: PgPool,
}

impl PostgresReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewRepository for PostgresReviewRepository {
    async fn list_for_dressmaker(&self, dressmaker_id: Uuid) -> Result<Vec<Review>> {
        let rows = sqlx::query(
            r#"
            SELECT id, dressmaker_id, user_id, grade, comment, created_at, updated_at
            FROM dressmaker_reviews
            WHERE dressmaker_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(dressmaker_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<Review> {
                Ok(Review {
                    id: row.try_get("id")?,
                    dressmaker_id: row.try_get("dressmaker_id")?,
                    user_id: row.try_get("user_id")?,
                    grade: row.try_get("grade")?,
                    comment: row.try_get("comment")?,
                    created_at: row.try_get("created_at")?,
                    updated_at: row.try_get("updated_at")?,
                })
            })
            .collect()
    }

    async fn add_and_regrade(&self, review: &Review) -> Result<f64> {
        let mut tx = self.pool.begin().await?;

        // Lock the dressmaker row so concurrent reviews regrade in sequence.
        let locked = sqlx::query("SELECT id FROM dressmakers WHERE id = $1 FOR UPDATE")
            .bind(review.dressmaker_id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(Error::not_found("dressmaker"));
        }

        sqlx::query(
            r#"
            INSERT INTO dressmaker_reviews (id, dressmaker_id, user_id, grade, comment, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(review.id)
        .bind(review.dressmaker_id)
        .bind(review.user_id)
        .bind(review.grade)
        .bind(&review.comment)
        .bind(review.created_at)
        .bind(review.updated_at)
        .execute(&mut *tx)
        .await?;

        let grades: Vec<f64> =
            sqlx::query_scalar("SELECT grade FROM dressmaker_reviews WHERE dressmaker_id = $1")
                .bind(review.dressmaker_id)
                .fetch_all(&mut *tx)
                .await?;
        let grade = average_grade(&grades);

        sqlx::query("UPDATE dressmakers SET grade = $2, updated_at = $3 WHERE id = $1")
            .bind(review.dressmaker_id)
            .bind(grade)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(grade)
    }
}
