use crate::app::require_non_empty;
use anyhow::Result;
use async_trait::async_trait;
use command_utils::util::datetime;
use infra::infra::job_view::rdb::{JobViewRepository, UseJobViewRepository};
use infra::infra::module::{RdbRepositoryModule, UseRdbRepositoryModule};
use jobboard_base::error::JobBoardError;
use model::{RecordedView, View, ViewCount};
use std::{fmt, sync::Arc};

#[async_trait]
pub trait JobViewApp: fmt::Debug + Send + Sync {
    /// First view of a user is created, later ones refresh its view_date.
    async fn record_view(&self, job_id: &str, user_id: &str) -> Result<RecordedView>;

    /// Raw view entries, for trusted callers only.
    async fn find_views(&self, job_id: &str) -> Result<Vec<View>>;

    async fn count_views(&self, job_id: &str) -> Result<ViewCount>;
}

#[derive(Clone, Debug)]
pub struct JobViewAppImpl {
    repositories: Arc<RdbRepositoryModule>,
}

impl JobViewAppImpl {
    pub fn new(repositories: Arc<RdbRepositoryModule>) -> Self {
        Self { repositories }
    }
}

impl UseRdbRepositoryModule for JobViewAppImpl {
    fn rdb_repository_module(&self) -> &RdbRepositoryModule {
        &self.repositories
    }
}

fn not_found(job_id: &str) -> anyhow::Error {
    tracing::warn!("job not found: {}", job_id);
    JobBoardError::NotFound(format!("job not found: {job_id}")).into()
}

#[async_trait]
impl JobViewApp for JobViewAppImpl {
    async fn record_view(&self, job_id: &str, user_id: &str) -> Result<RecordedView> {
        require_non_empty("job_id", job_id)?;
        require_non_empty("user_id", user_id)?;
        let recorded = self
            .job_view_repository()
            .record_view(job_id, user_id, datetime::now())
            .await?;
        tracing::info!(
            "job view {}: {} by {} (total {})",
            recorded.action,
            job_id,
            user_id,
            recorded.total_job_views
        );
        Ok(recorded)
    }

    async fn find_views(&self, job_id: &str) -> Result<Vec<View>> {
        self.job_view_repository()
            .find_views(job_id)
            .await?
            .ok_or_else(|| not_found(job_id))
    }

    async fn count_views(&self, job_id: &str) -> Result<ViewCount> {
        let view_count = self
            .job_view_repository()
            .count_views(job_id)
            .await?
            .ok_or_else(|| not_found(job_id))?;
        Ok(ViewCount {
            job_id: job_id.to_string(),
            view_count,
        })
    }
}
