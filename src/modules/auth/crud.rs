use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::modules::auth::model::{EmailToken, TokenKind, User};
use crate::services::tokens;

pub struct UserCrud {
    pool: Pool<Sqlite>,
}

impl UserCrud {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Inserts the user together with its (empty) page.
    pub async fn create_with_page(&self, user: &User) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, email_verified, password_hash, username, image, two_factor_enabled, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.email_verified)
        .bind(&user.password_hash)
        .bind(&user.username)
        .bind(&user.image)
        .bind(user.two_factor_enabled)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO user_pages (id, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&user.id)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, sqlx::Error> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0 > 0)
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool, sqlx::Error> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0 > 0)
    }

    /// Sets the username only if none is set yet. Returns false when the user
    /// already had one.
    pub async fn claim_username(&self, id: &str, username: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET username = ?, updated_at = ? WHERE id = ? AND username IS NULL",
        )
        .bind(username)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn mark_email_verified(&self, id: &str, email: &str) -> Result<(), sqlx::Error> {
        let now = Utc::now();
        sqlx::query("UPDATE users SET email = ?, email_verified = ?, updated_at = ? WHERE id = ?")
            .bind(email)
            .bind(now)
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn update_password(&self, id: &str, password_hash: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Partial update; `None` leaves the column unchanged.
    pub async fn update_settings(
        &self,
        id: &str,
        name: Option<&str>,
        two_factor_enabled: Option<bool>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET name = COALESCE(?, name),
                two_factor_enabled = COALESCE(?, two_factor_enabled),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(name)
        .bind(two_factor_enabled)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn update_image(&self, id: &str, image: Option<&str>) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET image = ?, updated_at = ? WHERE id = ?")
            .bind(image)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// Verification, password reset and two-factor tokens.
pub struct TokenCrud {
    pool: Pool<Sqlite>,
}

impl TokenCrud {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Generates a fresh token for `email`, replacing any earlier one of the same kind.
    pub async fn issue(&self, kind: TokenKind, email: &str) -> Result<EmailToken, sqlx::Error> {
        self.issue_for(kind, email, None).await
    }

    /// Like [`issue`](Self::issue), but ties the token to an existing account
    /// whose address is about to change to `email`.
    pub async fn issue_for(
        &self,
        kind: TokenKind,
        email: &str,
        user_id: Option<&str>,
    ) -> Result<EmailToken, sqlx::Error> {
        let token = EmailToken {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            user_id: user_id.map(str::to_string),
            token: match kind {
                TokenKind::TwoFactor => tokens::generate_two_factor_code(),
                _ => tokens::generate_link_token(),
            },
            expires_at: tokens::expiry_in(kind.ttl_minutes()),
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!("DELETE FROM {} WHERE email = ?", kind.table()))
            .bind(email)
            .execute(&mut *tx)
            .await?;

        sqlx::query(&format!(
            "INSERT INTO {} (id, email, user_id, token, expires_at) VALUES (?, ?, ?, ?, ?)",
            kind.table()
        ))
        .bind(&token.id)
        .bind(&token.email)
        .bind(&token.user_id)
        .bind(&token.token)
        .bind(token.expires_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(token)
    }

    pub async fn find_by_token(
        &self,
        kind: TokenKind,
        token: &str,
    ) -> Result<Option<EmailToken>, sqlx::Error> {
        sqlx::query_as::<_, EmailToken>(&format!("SELECT * FROM {} WHERE token = ?", kind.table()))
            .bind(token)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_by_email(
        &self,
        kind: TokenKind,
        email: &str,
    ) -> Result<Option<EmailToken>, sqlx::Error> {
        sqlx::query_as::<_, EmailToken>(&format!(
            "SELECT * FROM {} WHERE email = ? ORDER BY expires_at DESC LIMIT 1",
            kind.table()
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    /// Counts a wrong 2FA code against the token and returns the total so far.
    pub async fn record_failed_attempt(&self, id: &str) -> Result<i64, sqlx::Error> {
        let attempts: Option<(i64,)> = sqlx::query_as(
            "UPDATE two_factor_tokens SET attempts = attempts + 1 WHERE id = ? RETURNING attempts",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attempts.map_or(tokens::MAX_TWO_FACTOR_ATTEMPTS, |(n,)| n))
    }

    /// Deletes the token; returns false if it was already consumed.
    pub async fn consume(&self, kind: TokenKind, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", kind.table()))
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn delete_expired(&self, kind: TokenKind, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE expires_at < ?", kind.table()))
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn replace_confirmation(&self, user_id: &str) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM two_factor_confirmations WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO two_factor_confirmations (id, user_id) VALUES (?, ?)")
            .bind(Uuid::new_v4().to_string())
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await
    }

    /// Consumes the user's two-factor confirmation, if any.
    pub async fn take_confirmation(&self, user_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM two_factor_confirmations WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
