use crate::app::require_non_empty;
use anyhow::Result;
use async_trait::async_trait;
use command_utils::util::datetime;
use infra::infra::job::rdb::{JobRepository, UseJobRepository};
use infra::infra::module::{RdbRepositoryModule, UseRdbRepositoryModule};
use jobboard_base::error::JobBoardError;
use model::{JobFilter, JobInput, JobListing, JobStatus};
use std::{fmt, sync::Arc};

#[async_trait]
pub trait JobApp: fmt::Debug + Send + Sync {
    async fn create_job(&self, input: JobInput) -> Result<JobListing>;

    async fn find_jobs(&self, filter: &JobFilter) -> Result<Vec<JobListing>>;

    /// Open listings posted since the start of the current UTC day.
    async fn find_today_jobs(&self) -> Result<Vec<JobListing>>;

    async fn find_job_detail(&self, job_id: &str) -> Result<JobListing>;

    async fn update_job_status(&self, job_id: &str, status: JobStatus) -> Result<JobListing>;

    async fn ping(&self) -> Result<()>;
}

#[derive(Clone, Debug)]
pub struct JobAppImpl {
    repositories: Arc<RdbRepositoryModule>,
}

impl JobAppImpl {
    pub fn new(repositories: Arc<RdbRepositoryModule>) -> Self {
        Self { repositories }
    }
}

impl UseRdbRepositoryModule for JobAppImpl {
    fn rdb_repository_module(&self) -> &RdbRepositoryModule {
        &self.repositories
    }
}

#[async_trait]
impl JobApp for JobAppImpl {
    async fn create_job(&self, input: JobInput) -> Result<JobListing> {
        input.validate()?;
        let data = input.into_data(datetime::now());
        let created = self.job_repository().create(&data).await?;
        tracing::info!("job listing created: {}", &created.data.job_id);
        Ok(created)
    }

    async fn find_jobs(&self, filter: &JobFilter) -> Result<Vec<JobListing>> {
        let criteria = filter.criteria()?;
        tracing::debug!("find jobs: {:?} ({})", &criteria, filter.operator);
        self.job_repository()
            .find_list(&criteria, filter.operator)
            .await
    }

    async fn find_today_jobs(&self) -> Result<Vec<JobListing>> {
        self.job_repository()
            .find_posted_since(datetime::today_start())
            .await
    }

    async fn find_job_detail(&self, job_id: &str) -> Result<JobListing> {
        require_non_empty("job_id", job_id)?;
        match self.job_repository().find(job_id).await? {
            Some(listing) => Ok(listing),
            None => {
                tracing::warn!("job not found: {}", job_id);
                Err(JobBoardError::NotFound(format!("job not found: {job_id}")).into())
            }
        }
    }

    async fn update_job_status(&self, job_id: &str, status: JobStatus) -> Result<JobListing> {
        require_non_empty("job_id", job_id)?;
        let updated = self
            .job_repository()
            .update_status(job_id, status, datetime::now())
            .await?;
        if !updated {
            tracing::warn!("job not found for status update: {}", job_id);
            return Err(JobBoardError::NotFound(format!("job not found: {job_id}")).into());
        }
        tracing::info!("job status updated: {} -> {}", job_id, status);
        self.find_job_detail(job_id).await
    }

    async fn ping(&self) -> Result<()> {
        self.job_repository().ping().await
    }
}

#[cfg(all(test, not(feature = "mysql")))]
mod tests {
    use crate::module::test::create_test_app;
    use anyhow::Result;
    use chrono::Duration;
    use command_utils::util::datetime;
    use jobboard_base::error::JobBoardError;
    use model::{FilterOperator, JobFilter, JobInput, JobStatus};
    use serde_json::json;

    fn input(job_id: &str, company: &str, location: &str, posted_date: String) -> JobInput {
        serde_json::from_value(json!({
            "job_id": job_id,
            "title": "Engineer",
            "description": "desc",
            "company": company,
            "location": location,
            "job_type": "Full Time",
            "connection_type": "Remote",
            "salary_range": {"min": 1.0, "max": 2.0, "currency": "USD"},
            "posted_date": posted_date,
            "skills": ["rust"],
            "source": "test"
        }))
        .unwrap()
    }

    fn error_of(e: &anyhow::Error) -> Option<&JobBoardError> {
        e.downcast_ref::<JobBoardError>()
    }

    #[tokio::test]
    async fn test_create_duplicate_and_invalid() -> Result<()> {
        let (_rdb, app) = create_test_app().await?;
        let created = app
            .job_app
            .create_job(input("job_1", "Acme", "Remote", "2025-03-01".to_string()))
            .await?;
        assert_eq!(created.view_count, 0);
        assert!(created.data.created_at <= datetime::now());

        let err = app
            .job_app
            .create_job(input("job_1", "Other", "Remote", "2025-03-01".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(error_of(&err), Some(JobBoardError::DuplicateKey(_))));
        // first record untouched
        let found = app.job_app.find_job_detail("job_1").await?;
        assert_eq!(found.data.company, "Acme");

        let err = app
            .job_app
            .create_job(input("", "Acme", "Remote", "2025-03-01".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(error_of(&err), Some(JobBoardError::InvalidParameter(_))));

        let err = app
            .job_app
            .create_job(input("job_2", "Acme", "", "2025-03-01".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(error_of(&err), Some(JobBoardError::InvalidParameter(_))));
        assert!(app.job_app.find_job_detail("job_2").await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_find_jobs_and_or() -> Result<()> {
        let (_rdb, app) = create_test_app().await?;
        let day = "2025-03-01".to_string();
        app.job_app.create_job(input("a", "Acme", "Remote", day.clone())).await?;
        app.job_app.create_job(input("b", "Acme", "Tokyo", day.clone())).await?;
        app.job_app.create_job(input("c", "Initech", "Remote", day)).await?;

        let mut filter = JobFilter {
            company: Some("Acme".to_string()),
            location: Some("Remote".to_string()),
            ..Default::default()
        };
        let ids = |v: Vec<model::JobListing>| v.into_iter().map(|l| l.data.job_id).collect::<Vec<_>>();
        assert_eq!(ids(app.job_app.find_jobs(&filter).await?), ["a"]);
        filter.operator = FilterOperator::Or;
        assert_eq!(ids(app.job_app.find_jobs(&filter).await?), ["a", "b", "c"]);

        let all = app.job_app.find_jobs(&JobFilter::default()).await?;
        assert_eq!(all.len(), 3);

        let bad = JobFilter {
            posted_from: Some("2025-03-02".to_string()),
            posted_to: Some("2025-03-01".to_string()),
            ..Default::default()
        };
        let err = app.job_app.find_jobs(&bad).await.unwrap_err();
        assert!(matches!(error_of(&err), Some(JobBoardError::InvalidFilter(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_today_jobs() -> Result<()> {
        let (_rdb, app) = create_test_app().await?;
        let start = datetime::today_start();
        let yesterday = start - Duration::milliseconds(1);
        app.job_app
            .create_job(input("midnight", "Acme", "Remote", start.to_rfc3339()))
            .await?;
        app.job_app
            .create_job(input("yesterday", "Acme", "Remote", yesterday.to_rfc3339()))
            .await?;
        app.job_app
            .create_job(input("closed", "Acme", "Remote", start.to_rfc3339()))
            .await?;
        app.job_app.update_job_status("closed", JobStatus::Closed).await?;

        let today = app.job_app.find_today_jobs().await?;
        let ids: Vec<_> = today.iter().map(|l| l.data.job_id.as_str()).collect();
        assert_eq!(ids, ["midnight"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_detail_and_status_not_found() -> Result<()> {
        let (_rdb, app) = create_test_app().await?;
        let err = app.job_app.find_job_detail("missing").await.unwrap_err();
        assert!(matches!(error_of(&err), Some(JobBoardError::NotFound(_))));
        let err = app
            .job_app
            .update_job_status("missing", JobStatus::Closed)
            .await
            .unwrap_err();
        assert!(matches!(error_of(&err), Some(JobBoardError::NotFound(_))));
        app.job_app.ping().await?;
        Ok(())
    }
}
