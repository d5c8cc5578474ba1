use super::rdb::{new_rdb_pool, RdbConfig, RdbPool};
use anyhow::Result;
use tempfile::TempDir;

/// A sqlite database in its own temporary directory, removed on drop.
pub struct TestRdb {
    _dir: TempDir,
    pub pool: RdbPool,
}

impl TestRdb {
    pub fn pool(&self) -> &RdbPool {
        &self.pool
    }
}

pub async fn setup_test_rdb(schema: &str) -> Result<TestRdb> {
    let dir = tempfile::tempdir()?;
    let config = RdbConfig {
        dbname: dir
            .path()
            .join("test_db.sqlite3")
            .to_string_lossy()
            .to_string(),
        max_connections: 8,
        ..Default::default()
    };
    let pool = new_rdb_pool(&config, Some(schema)).await?;
    Ok(TestRdb { _dir: dir, pool })
}
