pub mod job;
pub mod job_view;
pub mod module;
pub mod resource;

use infra_utils::infra::rdb::RdbConfig;

use self::resource::load_db_config_from_env;

pub struct InfraConfigModule {
    pub rdb_config: RdbConfig,
}

impl InfraConfigModule {
    pub fn new_by_env() -> Self {
        let rdb_config = load_db_config_from_env().unwrap_or_else(|e| {
            tracing::info!("rdb config not found in env ({:?}), use default.", e);
            RdbConfig::default()
        });
        Self { rdb_config }
    }
}

// using from other test
#[cfg(any(test, feature = "test-utils"))]
pub mod test {
    use chrono::{TimeZone, Utc};
    use model::{ConnectionType, JobData, JobStatus, JobType, SalaryRange};

    /// Fresh sqlite database with the job board schema applied.
    #[cfg(not(feature = "mysql"))]
    pub async fn setup_test_rdb() -> anyhow::Result<infra_utils::infra::test::TestRdb> {
        infra_utils::infra::test::setup_test_rdb(super::resource::SCHEMA).await
    }

    /// Full time remote listing posted on 2025-03-`day` 12:00 UTC.
    pub fn job_data(job_id: &str, company: &str, skills: &[&str], day: u32) -> JobData {
        let posted = Utc
            .with_ymd_and_hms(2025, 3, day, 12, 0, 0)
            .single()
            .unwrap_or_default();
        JobData {
            job_id: job_id.to_string(),
            title: format!("title of {job_id}"),
            description: "description".to_string(),
            company: company.to_string(),
            location: "Tokyo".to_string(),
            job_type: JobType::FullTime,
            connection_type: ConnectionType::Remote,
            salary_range: SalaryRange {
                min: 100.0,
                max: 200.0,
                currency: "USD".to_string(),
            },
            posted_date: posted,
            skills: skills.iter().map(|s| s.to_string()).collect(),
            source: "test".to_string(),
            status: JobStatus::Active,
            created_at: posted,
            updated_at: posted,
        }
    }
}
