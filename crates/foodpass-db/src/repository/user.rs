//! # User Repository
//!
//! Operator account reads for audit attribution, plus the inserts the
//! seeding path needs.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use foodpass_core::{User, UserRole};
use foodpass_engine::{IdentityStore, StoreResult};

use crate::error::DbResult;

#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    email: String,
    name: String,
    role: UserRole,
    is_active: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            name: row.name,
            role: row.role,
            is_active: row.is_active,
        }
    }
}

/// Repository for operator accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a user. The caller supplies the id (UUID v4).
    pub async fn insert(&self, user: &User) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO users (id, email, name, role, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.role)
        .bind(user.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        debug!(user_id = %user.id, role = user.role.as_str(), "User inserted");
        Ok(())
    }

    /// Looks up a user by id, active or not.
    pub async fn get_by_id(&self, user_id: &str) -> DbResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, name, role, is_active FROM users WHERE id = ?1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    /// Looks up a user by email, active or not.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, name, role, is_active FROM users WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    /// One active user, most privileged role first.
    ///
    /// The CASE ordering mirrors [`UserRole::priority`]; the id tie-break
    /// makes the pick deterministic across calls.
    pub async fn get_one_active(&self) -> DbResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, name, role, is_active
               FROM users
              WHERE is_active = 1
              ORDER BY CASE role
                           WHEN 'admin' THEN 0
                           WHEN 'supervisor' THEN 1
                           ELSE 2
                       END,
                       id
              LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }
}

#[async_trait]
impl IdentityStore for UserRepository {
    async fn find_by_id(&self, user_id: &str) -> StoreResult<Option<User>> {
        Ok(self.get_by_id(user_id).await?)
    }

    async fn find_one_active(&self) -> StoreResult<Option<User>> {
        Ok(self.get_one_active().await?)
    }
}
