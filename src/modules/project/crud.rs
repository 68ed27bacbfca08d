use chrono::Utc;
use sqlx::{Pool, Sqlite, SqliteConnection};

use super::model::{Project, ProjectPatch, ProjectView};
use crate::error::ApiError;
use crate::services::ordering::{self, OrderError};

const VIEW_SELECT: &str = r#"
    SELECT p.id, p.name, p.description, p.image, p.url, p.revenue,
           p.category_id, c.name AS category_name,
           p.status_id, s.name AS status_name,
           p.status_is_visible, p.sort_index
    FROM projects p
    LEFT JOIN categories c ON c.id = p.category_id
    LEFT JOIN project_statuses s ON s.id = p.status_id
"#;

#[derive(Debug, thiserror::Error)]
pub enum ReorderError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<ReorderError> for ApiError {
    fn from(err: ReorderError) -> Self {
        match err {
            ReorderError::Order(e) => {
                tracing::debug!("Rejected project order: {}", e);
                ApiError::bad_request("Invalid project order!")
            }
            ReorderError::Database(e) => e.into(),
        }
    }
}

async fn page_project_ids(
    conn: &mut SqliteConnection,
    page_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT id FROM projects WHERE user_page_id = ? ORDER BY sort_index")
            .bind(page_id)
            .fetch_all(&mut *conn)
            .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Rewrites indices to `0..n` following `ids`. Existing indices are first
/// moved to negative values so the per-page uniqueness holds after every
/// statement.
async fn write_order(
    conn: &mut SqliteConnection,
    page_id: &str,
    ids: &[String],
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE projects SET sort_index = -sort_index - 1 WHERE user_page_id = ?")
        .bind(page_id)
        .execute(&mut *conn)
        .await?;

    for (index, id) in ids.iter().enumerate() {
        sqlx::query("UPDATE projects SET sort_index = ? WHERE id = ? AND user_page_id = ?")
            .bind(index as i64)
            .bind(id)
            .bind(page_id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

pub struct ProjectCrud {
    pool: Pool<Sqlite>,
}

impl ProjectCrud {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn list_views(&self, page_id: &str) -> Result<Vec<ProjectView>, sqlx::Error> {
        sqlx::query_as::<_, ProjectView>(&format!(
            "{} WHERE p.user_page_id = ? ORDER BY p.sort_index",
            VIEW_SELECT
        ))
        .bind(page_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn find_view(&self, id: &str) -> Result<Option<ProjectView>, sqlx::Error> {
        sqlx::query_as::<_, ProjectView>(&format!("{} WHERE p.id = ?", VIEW_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Finds a project only if it belongs to `page_id`.
    pub async fn find_owned(&self, id: &str, page_id: &str) -> Result<Option<Project>, sqlx::Error> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = ? AND user_page_id = ?")
            .bind(id)
            .bind(page_id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Inserts the project at the end of the page; `sort_index` on the
    /// argument is ignored.
    pub async fn append(&self, project: &Project) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO projects (id, user_page_id, name, description, image, url, revenue,
                                  category_id, status_id, status_is_visible, sort_index,
                                  created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?,
                    (SELECT COUNT(*) FROM projects WHERE user_page_id = ?),
                    ?, ?)
            "#,
        )
        .bind(&project.id)
        .bind(&project.user_page_id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(&project.image)
        .bind(&project.url)
        .bind(project.revenue)
        .bind(&project.category_id)
        .bind(&project.status_id)
        .bind(project.status_is_visible)
        .bind(&project.user_page_id)
        .bind(project.created_at)
        .bind(project.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Writes only the columns the patch changes.
    pub async fn update(&self, id: &str, patch: &ProjectPatch) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE projects
            SET name = CASE WHEN ? THEN ? ELSE name END,
                description = CASE WHEN ? THEN ? ELSE description END,
                image = CASE WHEN ? THEN ? ELSE image END,
                url = CASE WHEN ? THEN ? ELSE url END,
                revenue = CASE WHEN ? THEN ? ELSE revenue END,
                category_id = CASE WHEN ? THEN ? ELSE category_id END,
                status_id = CASE WHEN ? THEN ? ELSE status_id END,
                status_is_visible = CASE WHEN ? THEN ? ELSE status_is_visible END,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(patch.name.is_change())
        .bind(patch.name.value().map(String::as_str))
        .bind(patch.description.is_change())
        .bind(patch.description.value().map(String::as_str))
        .bind(patch.image.is_change())
        .bind(patch.image.value().map(String::as_str))
        .bind(patch.url.is_change())
        .bind(patch.url.value().map(String::as_str))
        .bind(patch.revenue.is_change())
        .bind(patch.revenue.value().copied())
        .bind(patch.category_id.is_change())
        .bind(patch.category_id.value().map(String::as_str))
        .bind(patch.status_id.is_change())
        .bind(patch.status_id.value().map(String::as_str))
        .bind(patch.status_is_visible.is_change())
        .bind(patch.status_is_visible.value().copied())
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn set_image(&self, id: &str, image: Option<&str>) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE projects SET image = ?, updated_at = ? WHERE id = ?")
            .bind(image)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Deletes the project and closes the gap it leaves in the ordering.
    pub async fn delete_and_compact(&self, id: &str, page_id: &str) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM projects WHERE id = ? AND user_page_id = ?")
            .bind(id)
            .bind(page_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        let remaining = page_project_ids(&mut tx, page_id).await?;
        write_order(&mut tx, page_id, &remaining).await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Persists a new order. `ids` must be a permutation of the page's
    /// projects.
    pub async fn reorder(&self, page_id: &str, ids: &[String]) -> Result<(), ReorderError> {
        let mut tx = self.pool.begin().await?;

        let current = page_project_ids(&mut tx, page_id).await?;
        ordering::validate_permutation(&current, ids)?;
        write_order(&mut tx, page_id, ids).await?;

        tx.commit().await?;
        Ok(())
    }
}
