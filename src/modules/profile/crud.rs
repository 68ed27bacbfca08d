use chrono::Utc;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use super::model::{Platform, SocialMediaLink, UserPage};

/// Optional page text field: `None` keeps the column, `Some("")` clears it.
fn page_field(value: Option<&str>) -> (bool, Option<&str>) {
    match value {
        None => (false, None),
        Some("") => (true, None),
        Some(value) => (true, Some(value)),
    }
}

pub struct PageCrud {
    pool: Pool<Sqlite>,
}

impl PageCrud {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn find_by_user_id(&self, user_id: &str) -> Result<Option<UserPage>, sqlx::Error> {
        sqlx::query_as::<_, UserPage>("SELECT * FROM user_pages WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Returns the user's page, creating an empty one the first time.
    pub async fn ensure_for_user(&self, user_id: &str) -> Result<UserPage, sqlx::Error> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO user_pages (id, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        sqlx::query_as::<_, UserPage>("SELECT * FROM user_pages WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn update_details(
        &self,
        page_id: &str,
        biography: Option<&str>,
        location: Option<&str>,
        contact_email: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        let (set_biography, biography) = page_field(biography);
        let (set_location, location) = page_field(location);
        let (set_contact_email, contact_email) = page_field(contact_email);

        sqlx::query(
            r#"
            UPDATE user_pages
            SET biography = CASE WHEN ? THEN ? ELSE biography END,
                location = CASE WHEN ? THEN ? ELSE location END,
                contact_email = CASE WHEN ? THEN ? ELSE contact_email END,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(set_biography)
        .bind(biography)
        .bind(set_location)
        .bind(location)
        .bind(set_contact_email)
        .bind(contact_email)
        .bind(Utc::now())
        .bind(page_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Style columns take the stored (upper-case) names; `None` keeps the column.
    pub async fn update_styles(
        &self,
        page_id: &str,
        background_style: Option<&str>,
        project_cards_style: Option<&str>,
        social_links_style: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE user_pages
            SET background_style = COALESCE(?, background_style),
                project_cards_style = COALESCE(?, project_cards_style),
                social_links_style = COALESCE(?, social_links_style),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(background_style)
        .bind(project_cards_style)
        .bind(social_links_style)
        .bind(Utc::now())
        .bind(page_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn links(&self, page_id: &str) -> Result<Vec<SocialMediaLink>, sqlx::Error> {
        sqlx::query_as::<_, SocialMediaLink>(
            "SELECT * FROM social_media_links WHERE user_page_id = ?",
        )
        .bind(page_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Applies link edits in one transaction: empty handles delete the
    /// platform's link, anything else creates or replaces it.
    pub async fn apply_links(
        &self,
        page_id: &str,
        entries: &[(Platform, &str)],
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        for (platform, username) in entries {
            if username.is_empty() {
                sqlx::query("DELETE FROM social_media_links WHERE user_page_id = ? AND platform = ?")
                    .bind(page_id)
                    .bind(platform.as_str())
                    .execute(&mut *tx)
                    .await?;
            } else {
                sqlx::query(
                    r#"
                    INSERT INTO social_media_links (id, user_page_id, platform, username)
                    VALUES (?, ?, ?, ?)
                    ON CONFLICT(user_page_id, platform) DO UPDATE SET username = excluded.username
                    "#,
                )
                .bind(Uuid::new_v4().to_string())
                .bind(page_id)
                .bind(platform.as_str())
                .bind(*username)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await
    }
}
