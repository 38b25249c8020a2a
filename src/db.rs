//! Persistent users database.
//!
//! A single-table SQLite store of named accounts with a role and creation
//! time. The store bootstraps its own schema and seed data the first time
//! it is opened; every open, create, and close writes a diagnostic record
//! through the activity log.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;
use tracing::info;

use crate::logger::ActivityLog;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(sqlx::Error),
    #[error("account already exists: {0}")]
    AccountExists(String),
    #[error("account not found: {0}")]
    AccountNotFound(String),
    #[error("log write failed: {0}")]
    Log(#[from] std::io::Error),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        DbError::Sqlx(err)
    }
}

/// Account privilege role.
///
/// The ordinal reflects the original on-disk encoding; privilege rank runs
/// opposite to it (`Root` is the most privileged despite ordinal 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Root = 0,
    Admin = 1,
    Moderator = 2,
    SuperUser = 3,
    User = 4,
    Restricted = 5,
}

impl Role {
    /// On-disk integer encoding.
    pub fn ordinal(self) -> i64 {
        self as i64
    }

    /// Decode the on-disk integer encoding.
    pub fn from_ordinal(value: i64) -> Option<Role> {
        match value {
            0 => Some(Role::Root),
            1 => Some(Role::Admin),
            2 => Some(Role::Moderator),
            3 => Some(Role::SuperUser),
            4 => Some(Role::User),
            5 => Some(Role::Restricted),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Root => "root",
            Role::Admin => "admin",
            Role::Moderator => "moderator",
            Role::SuperUser => "super-user",
            Role::User => "user",
            Role::Restricted => "restricted",
        };
        f.write_str(name)
    }
}

/// A persisted account row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub created_at: i64,
    pub role: Role,
}

/// Handle to the users database.
pub struct UserDb {
    pool: SqlitePool,
}

impl UserDb {
    /// Connection acquire timeout - a wedged database must not stall the
    /// protocol loop indefinitely.
    const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Open the users database, bootstrapping schema and seed accounts when
    /// the backing file does not exist yet.
    ///
    /// Idempotent: opening an already-initialized store connects to it
    /// without re-seeding.
    pub async fn open(path: &Path, log: &mut ActivityLog) -> Result<Self, DbError> {
        let fresh = !path.exists();

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Self::ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        if fresh {
            db.bootstrap(log).await?;
        } else {
            log.log("[Connected to users db.]")?;
        }

        info!(path = %path.display(), fresh, "users db opened");
        Ok(db)
    }

    /// Create the schema and the three seed accounts, then log the
    /// initialization record.
    async fn bootstrap(&self, log: &mut ActivityLog) -> Result<(), DbError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                name TEXT UNIQUE NOT NULL,
                created_at INTEGER NOT NULL,
                role INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        self.create_account("ixtli", Role::Root, log).await?;
        self.create_account("ag", Role::Admin, log).await?;
        self.create_account("oobity", Role::Moderator, log).await?;

        log.log("[Initialized users db.]")?;
        Ok(())
    }

    /// Insert a new account with `created_at = now`.
    ///
    /// A duplicate name surfaces as [`DbError::AccountExists`] and leaves
    /// the store untouched. On success the insert is committed before the
    /// diagnostic record is written and the row returned.
    pub async fn create_account(
        &self,
        name: &str,
        role: Role,
        log: &mut ActivityLog,
    ) -> Result<Account, DbError> {
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query("INSERT INTO users (name, created_at, role) VALUES (?, ?, ?)")
            .bind(name)
            .bind(now)
            .bind(role.ordinal())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return DbError::AccountExists(name.to_string());
                }
                DbError::from(e)
            })?;

        log.log(&format!("[Added {} account '{}']", role, name))?;

        Ok(Account {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            created_at: now,
            role,
        })
    }

    /// Look up the full row for `name`. Read-only; does not log.
    pub async fn get_account(&self, name: &str) -> Result<Account, DbError> {
        let row = sqlx::query_as::<_, (i64, String, i64, i64)>(
            "SELECT id, name, created_at, role FROM users WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((id, name, created_at, role)) => Ok(Account {
                id,
                name,
                created_at,
                role: Role::from_ordinal(role)
                    .ok_or_else(|| DbError::Internal(format!("bad role ordinal {}", role)))?,
            }),
            None => Err(DbError::AccountNotFound(name.to_string())),
        }
    }

    /// Total number of accounts in the store.
    pub async fn account_count(&self) -> Result<i64, DbError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Close the connection pool and log the final diagnostic record.
    pub async fn close(&self, log: &mut ActivityLog) -> Result<(), DbError> {
        self.pool.close().await;
        log.log("[Users db connection closed.]")?;
        Ok(())
    }
}
