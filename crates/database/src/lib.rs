//! SQLite persistence layer for BridgeChat.
//!
//! This crate stores users, SMS participants, groups, memberships and
//! messages using SQLx with SQLite. Rows are converted to the
//! [`bridge_core`] domain types on the way out, so a row that breaks an
//! entity invariant surfaces as [`DatabaseError::Corrupt`] instead of
//! reaching callers.
//!
//! Writes that insert messages or change memberships take a
//! [`Capability`](bridge_core::Capability): end-user writes are checked
//! against the actor's membership; service writes are not.
//!
//! # Example
//!
//! ```no_run
//! use bridge_core::{validate_phone_number, UserId};
//! use database::{group, user, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:bridgechat.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let owner = UserId::new();
//!     user::upsert_user(db.pool(), &owner, "ana@example.com", "Ana").await?;
//!
//!     let number = validate_phone_number("+15550001111")?;
//!     let group = group::create_group(db.pool(), "Hiking", &number, &owner).await?;
//!     println!("created {}", group.id);
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod group;
pub mod membership;
pub mod message;
pub mod models;
pub mod participant;
pub mod user;

pub use error::{DatabaseError, Result};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 10;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/bridgechat.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
