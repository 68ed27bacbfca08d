use sqlx::{Pool, Sqlite};

pub struct UploadCrud {
    pool: Pool<Sqlite>,
}

impl UploadCrud {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// True when another user's photo or project image points at `key`.
    pub async fn referenced_by_other(&self, key: &str, user_id: &str) -> Result<bool, sqlx::Error> {
        let suffix = format!("%/{}", key);

        let result: (i64,) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users WHERE image LIKE ? AND id != ?)
              + (SELECT COUNT(*) FROM projects p
                 JOIN user_pages up ON up.id = p.user_page_id
                 WHERE p.image LIKE ? AND up.user_id != ?)
            "#,
        )
        .bind(&suffix)
        .bind(user_id)
        .bind(&suffix)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0 > 0)
    }

    /// True when any photo or project image points at `key`.
    pub async fn is_referenced(&self, key: &str) -> Result<bool, sqlx::Error> {
        let suffix = format!("%/{}", key);

        let result: (i64,) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users WHERE image LIKE ?)
              + (SELECT COUNT(*) FROM projects WHERE image LIKE ?)
            "#,
        )
        .bind(&suffix)
        .bind(&suffix)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0 > 0)
    }
}
