use crate::infra::job::rdb::{JobRepositoryImpl, UseJobRepository};
use crate::infra::job_view::rdb::{JobViewRepositoryImpl, UseJobViewRepository};
use crate::infra::resource;
use anyhow::Result;
use infra_utils::infra::rdb::{RdbConfig, RdbPool};

pub trait UseRdbRepositoryModule {
    fn rdb_repository_module(&self) -> &RdbRepositoryModule;
}
impl<T: UseRdbRepositoryModule> UseJobRepository for T {
    fn job_repository(&self) -> &JobRepositoryImpl {
        &self.rdb_repository_module().job_repository
    }
}
impl<T: UseRdbRepositoryModule> UseJobViewRepository for T {
    fn job_view_repository(&self) -> &JobViewRepositoryImpl {
        &self.rdb_repository_module().job_view_repository
    }
}

#[derive(Clone, Debug)]
pub struct RdbRepositoryModule {
    pub job_repository: JobRepositoryImpl,
    pub job_view_repository: JobViewRepositoryImpl,
}

impl RdbRepositoryModule {
    pub fn new(pool: RdbPool) -> Self {
        RdbRepositoryModule {
            job_repository: JobRepositoryImpl::new(pool.clone()),
            job_view_repository: JobViewRepositoryImpl::new(pool),
        }
    }

    pub async fn new_by_config(rdb_config: &RdbConfig) -> Result<Self> {
        let pool = resource::setup_rdb(rdb_config).await?;
        Ok(Self::new(pool))
    }

    pub async fn new_by_env() -> Result<Self> {
        let pool = resource::setup_rdb_by_env().await?;
        Ok(Self::new(pool))
    }
}

#[cfg(all(test, not(feature = "mysql")))]
mod test {
    use super::*;
    use crate::infra::job::rdb::JobRepository;
    use crate::infra::job_view::rdb::JobViewRepository;
    use crate::infra::test::{job_data, setup_test_rdb};

    struct Holder(RdbRepositoryModule);
    impl UseRdbRepositoryModule for Holder {
        fn rdb_repository_module(&self) -> &RdbRepositoryModule {
            &self.0
        }
    }

    #[tokio::test]
    async fn test_repositories_share_pool() -> Result<()> {
        let rdb = setup_test_rdb().await?;
        let holder = Holder(RdbRepositoryModule::new(rdb.pool().clone()));
        holder
            .job_repository()
            .create(&job_data("job_1", "Acme", &[], 1))
            .await?;
        let recorded = holder
            .job_view_repository()
            .record_view("job_1", "u1", chrono::Utc::now())
            .await?;
        assert_eq!(recorded.total_job_views, 1);
        Ok(())
    }
}
