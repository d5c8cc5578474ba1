use anyhow::{Context, Result};
use serde::Deserialize;

#[cfg(not(feature = "mysql"))]
pub type Rdb = sqlx::Sqlite;
#[cfg(feature = "mysql")]
pub type Rdb = sqlx::MySql;

pub type RdbPool = sqlx::Pool<Rdb>;

/// Connection settings for the relational store.
///
/// For sqlite only `dbname` (the database file path) and `max_connections` are used.
#[derive(Deserialize, Clone, Debug)]
pub struct RdbConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    pub dbname: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// sqlite only: how long a writer waits for the database lock
    #[serde(default = "default_busy_timeout_msec")]
    pub busy_timeout_msec: u64,
}

fn default_max_connections() -> u32 {
    10
}
fn default_busy_timeout_msec() -> u64 {
    5000
}

impl Default for RdbConfig {
    fn default() -> Self {
        tracing::info!("Use default RdbConfig (sqlite: ./jobboard.sqlite3).");
        Self {
            host: String::new(),
            port: String::new(),
            user: String::new(),
            password: String::new(),
            dbname: "./jobboard.sqlite3".to_string(),
            max_connections: default_max_connections(),
            busy_timeout_msec: default_busy_timeout_msec(),
        }
    }
}

pub trait UseRdbPool {
    fn db_pool(&self) -> &RdbPool;
}

#[cfg(not(feature = "mysql"))]
async fn connect(config: &RdbConfig) -> Result<RdbPool> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::time::Duration;

    let options = SqliteConnectOptions::new()
        .filename(&config.dbname)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(config.busy_timeout_msec))
        .foreign_keys(true);
    SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
        .with_context(|| format!("cannot connect sqlite: {}", &config.dbname))
}

#[cfg(feature = "mysql")]
async fn connect(config: &RdbConfig) -> Result<RdbPool> {
    use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};

    let port: u16 = config
        .port
        .parse()
        .with_context(|| format!("invalid mysql port: {}", &config.port))?;
    let options = MySqlConnectOptions::new()
        .host(&config.host)
        .port(port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.dbname);
    MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
        .with_context(|| format!("cannot connect mysql: {}:{}", &config.host, &config.port))
}

/// Create a connection pool, applying `init_schema` (idempotent DDL) when given.
pub async fn new_rdb_pool(config: &RdbConfig, init_schema: Option<&str>) -> Result<RdbPool> {
    let pool = connect(config).await?;
    if let Some(schema) = init_schema {
        sqlx::raw_sql(schema)
            .execute(&pool)
            .await
            .context("error in applying schema")?;
        tracing::debug!("schema applied: {}", &config.dbname);
    }
    Ok(pool)
}

#[cfg(all(test, not(feature = "mysql")))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_rdb_pool_applies_schema() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = RdbConfig {
            dbname: dir.path().join("pool.sqlite3").to_string_lossy().to_string(),
            max_connections: 2,
            ..Default::default()
        };
        let pool = new_rdb_pool(
            &config,
            Some("CREATE TABLE IF NOT EXISTS sample (id INTEGER PRIMARY KEY, name TEXT NOT NULL);"),
        )
        .await?;
        sqlx::query("INSERT INTO sample (name) VALUES (?)")
            .bind("a")
            .execute(&pool)
            .await?;
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sample")
            .fetch_one(&pool)
            .await?;
        assert_eq!(count, 1);
        Ok(())
    }
}
