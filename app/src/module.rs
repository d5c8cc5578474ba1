use crate::app::job::{JobApp, JobAppImpl};
use crate::app::job_view::{JobViewApp, JobViewAppImpl};
use anyhow::Result;
use infra::infra::module::RdbRepositoryModule;
use infra::infra::InfraConfigModule;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct AppModule {
    pub repositories: Arc<RdbRepositoryModule>,
    pub job_app: Arc<dyn JobApp + 'static>,
    pub job_view_app: Arc<dyn JobViewApp + 'static>,
}

impl AppModule {
    pub fn new(repositories: Arc<RdbRepositoryModule>) -> Self {
        let job_app = Arc::new(JobAppImpl::new(repositories.clone()));
        let job_view_app = Arc::new(JobViewAppImpl::new(repositories.clone()));
        Self {
            repositories,
            job_app,
            job_view_app,
        }
    }

    pub async fn new_by_config(config_module: &InfraConfigModule) -> Result<Self> {
        let repositories =
            Arc::new(RdbRepositoryModule::new_by_config(&config_module.rdb_config).await?);
        Ok(Self::new(repositories))
    }

    pub async fn new_by_env() -> Result<Self> {
        Self::new_by_config(&InfraConfigModule::new_by_env()).await
    }
}

#[cfg(all(any(test, feature = "test-utils"), not(feature = "mysql")))]
pub mod test {
    use super::AppModule;
    use anyhow::Result;
    use infra::infra::module::RdbRepositoryModule;
    use infra_utils::infra::test::TestRdb;
    use std::sync::Arc;

    /// App on a fresh sqlite database. Keep the returned `TestRdb` alive while testing.
    pub async fn create_test_app() -> Result<(TestRdb, AppModule)> {
        let rdb = infra::infra::test::setup_test_rdb().await?;
        let repositories = Arc::new(RdbRepositoryModule::new(rdb.pool().clone()));
        Ok((rdb, AppModule::new(repositories)))
    }
}
