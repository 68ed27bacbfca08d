use sqlx::{Pool, Sqlite};

use super::model::{Category, ProjectStatus};

pub struct CatalogCrud {
    pool: Pool<Sqlite>,
}

impl CatalogCrud {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn categories(&self) -> Result<Vec<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>("SELECT id, name, description FROM categories ORDER BY rowid")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn project_statuses(&self) -> Result<Vec<ProjectStatus>, sqlx::Error> {
        sqlx::query_as::<_, ProjectStatus>(
            "SELECT id, name, description FROM project_statuses ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn category_exists(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0 > 0)
    }

    pub async fn status_exists(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM project_statuses WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0 > 0)
    }
}
