//! User repository implementation
//!
//! Queries run on whatever connection the caller owns, which is normally the
//! open transaction of a [`PgUnitOfWork`](crate::database::postgres::PgUnitOfWork).

use sqlx::PgConnection;
use chrono::Utc;
use crate::models::user::{User, UpsertUserRequest};
use crate::utils::errors::BotError;

const USER_COLUMNS: &str = "id, chat_id, first_name, last_name, username, bonuses, created_at, updated_at";

pub struct UserRepository;

impl UserRepository {
    /// Insert a user or refresh its identity fields
    pub async fn upsert(conn: &mut PgConnection, request: &UpsertUserRequest) -> Result<(), BotError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, chat_id, first_name, last_name, username, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            ON CONFLICT (id) DO UPDATE
            SET chat_id = EXCLUDED.chat_id,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                username = EXCLUDED.username,
                updated_at = EXCLUDED.updated_at
            "#
        )
        .bind(request.id)
        .bind(request.chat_id)
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(&request.username)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Find user by ID
    pub async fn find_by_id(conn: &mut PgConnection, id: i64) -> Result<Option<User>, BotError> {
        let user = sqlx::query_as::<_, User>(
            &format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS)
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(user)
    }

    /// Find the most recently refreshed user holding this exact username
    pub async fn find_by_username(conn: &mut PgConnection, username: &str) -> Result<Option<User>, BotError> {
        let user = sqlx::query_as::<_, User>(
            &format!(
                "SELECT {} FROM users WHERE username = $1 ORDER BY updated_at DESC LIMIT 1",
                USER_COLUMNS
            )
        )
        .bind(username)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(user)
    }

    /// List users with pagination
    pub async fn list(conn: &mut PgConnection, limit: i64, offset: i64) -> Result<Vec<User>, BotError> {
        let users = sqlx::query_as::<_, User>(
            &format!("SELECT {} FROM users ORDER BY id LIMIT $1 OFFSET $2", USER_COLUMNS)
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *conn)
        .await?;

        Ok(users)
    }

    /// Add bonuses in a single conditional write
    pub async fn add_bonuses(conn: &mut PgConnection, id: i64, amount: i64) -> Result<Option<User>, BotError> {
        let user = sqlx::query_as::<_, User>(
            &format!(
                r#"
                UPDATE users
                SET bonuses = bonuses + $2, updated_at = $3
                WHERE id = $1
                RETURNING {}
                "#,
                USER_COLUMNS
            )
        )
        .bind(id)
        .bind(amount)
        .bind(Utc::now())
        .fetch_optional(&mut *conn)
        .await?;

        Ok(user)
    }

    /// Subtract bonuses only when the balance covers the amount
    ///
    /// The guard and the write are one statement: concurrent debits on the same
    /// row are serialized by the row lock and the guard is re-checked against
    /// the committed balance.
    pub async fn withdraw_bonuses(conn: &mut PgConnection, id: i64, amount: i64) -> Result<Option<User>, BotError> {
        let user = sqlx::query_as::<_, User>(
            &format!(
                r#"
                UPDATE users
                SET bonuses = bonuses - $2, updated_at = $3
                WHERE id = $1 AND bonuses >= $2
                RETURNING {}
                "#,
                USER_COLUMNS
            )
        )
        .bind(id)
        .bind(amount)
        .bind(Utc::now())
        .fetch_optional(&mut *conn)
        .await?;

        Ok(user)
    }

    /// Count total users
    pub async fn count(conn: &mut PgConnection) -> Result<i64, BotError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *conn)
            .await?;

        Ok(count.0)
    }
}
