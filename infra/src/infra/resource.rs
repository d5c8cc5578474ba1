use anyhow::Result;
use infra_utils::infra::rdb::{RdbConfig, RdbPool};
use jobboard_base::error::JobBoardError;

pub const SQLITE_SCHEMA: &str = include_str!("../../sql/sqlite/001_schema.sql");
pub const MYSQL_SCHEMA: &str = include_str!("../../sql/mysql/001_schema.sql");

#[cfg(not(feature = "mysql"))]
pub const SCHEMA: &str = SQLITE_SCHEMA;
#[cfg(feature = "mysql")]
pub const SCHEMA: &str = MYSQL_SCHEMA;

#[cfg(not(feature = "mysql"))]
const RDB_ENV_PREFIX: &str = "SQLITE_";
#[cfg(feature = "mysql")]
const RDB_ENV_PREFIX: &str = "MYSQL_";

pub fn load_db_config_from_env() -> Result<RdbConfig> {
    envy::prefixed(RDB_ENV_PREFIX)
        .from_env::<RdbConfig>()
        .map_err(|e| {
            JobBoardError::RuntimeError(format!("cannot read rdb config from env: {e:?}")).into()
        })
}

/// Open the pool and make sure the tables exist.
pub async fn setup_rdb(db_config: &RdbConfig) -> Result<RdbPool> {
    infra_utils::infra::rdb::new_rdb_pool(db_config, Some(SCHEMA))
        .await
        .map_err(|e| {
            JobBoardError::StorageUnavailable(format!(
                "cannot initialize rdb ({}): {e:?}",
                &db_config.dbname
            ))
            .into()
        })
}

pub async fn setup_rdb_by_env() -> Result<RdbPool> {
    let conf = load_db_config_from_env().unwrap_or_default();
    setup_rdb(&conf).await
}
