use super::rows::JobViewRow;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use command_utils::util::datetime;
use infra_utils::infra::rdb::{Rdb, RdbPool, UseRdbPool};
use jobboard_base::error::{is_foreign_key_violation, JobBoardError};
use model::{RecordedView, View, ViewAction};
use sqlx::{Executor, Transaction};

fn map_record_error(e: sqlx::Error, job_id: &str) -> JobBoardError {
    if is_foreign_key_violation(&e) {
        JobBoardError::NotFound(format!("job not found: {job_id}"))
    } else {
        JobBoardError::from(e)
    }
}

#[async_trait]
pub trait JobViewRepository: UseRdbPool + Sync + Send {
    /// Record that `user_id` viewed `job_id` at `view_date`.
    ///
    /// The first view of a user appends an entry, later views only move its
    /// `view_date`. Insert, refresh and count run in one transaction so the
    /// reported total always includes this call.
    async fn record_view(
        &self,
        job_id: &str,
        user_id: &str,
        view_date: DateTime<Utc>,
    ) -> Result<RecordedView> {
        let view_date = datetime::truncate_millis(view_date);
        let mut tx = self
            .db_pool()
            .begin()
            .await
            .map_err(JobBoardError::from)?;
        let action = self
            .upsert_view_tx(&mut tx, job_id, user_id, view_date)
            .await?;
        let total = self.count_views_tx(&mut *tx, job_id).await?;
        tx.commit()
            .await
            .map_err(JobBoardError::from)
            .context("error in commit job view")?;
        tracing::debug!(
            "job view {}: job_id={}, user_id={}, total={}",
            action,
            job_id,
            user_id,
            total
        );
        Ok(RecordedView {
            job_id: job_id.to_string(),
            user_id: user_id.to_string(),
            view_date,
            action,
            total_job_views: total.max(0) as u64,
        })
    }

    #[cfg(not(feature = "mysql"))]
    async fn upsert_view_tx(
        &self,
        tx: &mut Transaction<'_, Rdb>,
        job_id: &str,
        user_id: &str,
        view_date: DateTime<Utc>,
    ) -> Result<ViewAction> {
        // OR IGNORE only covers the (job_id, user_id) key: an unknown job still fails the FK
        let inserted = sqlx::query::<Rdb>(
            "INSERT OR IGNORE INTO `job_view` (`job_id`, `user_id`, `view_date`) VALUES (?,?,?)",
        )
        .bind(job_id)
        .bind(user_id)
        .bind(view_date.timestamp_millis())
        .execute(&mut **tx)
        .await
        .map_err(|e| map_record_error(e, job_id))?
        .rows_affected();
        if inserted > 0 {
            return Ok(ViewAction::Created);
        }
        sqlx::query::<Rdb>(
            "UPDATE `job_view` SET `view_date` = ? WHERE `job_id` = ? AND `user_id` = ?",
        )
        .bind(view_date.timestamp_millis())
        .bind(job_id)
        .bind(user_id)
        .execute(&mut **tx)
        .await
        .map_err(JobBoardError::from)
        .context(format!("error in update job_view: {job_id}, {user_id}"))?;
        Ok(ViewAction::Updated)
    }

    #[cfg(feature = "mysql")]
    async fn upsert_view_tx(
        &self,
        tx: &mut Transaction<'_, Rdb>,
        job_id: &str,
        user_id: &str,
        view_date: DateTime<Utc>,
    ) -> Result<ViewAction> {
        // the job row lock serializes every view of this job until commit
        let locked: Option<i64> =
            sqlx::query_scalar("SELECT `id` FROM `job` WHERE `job_id` = ? FOR UPDATE")
                .bind(job_id)
                .fetch_optional(&mut **tx)
                .await
                .map_err(JobBoardError::from)
                .context(format!("error in lock job: {job_id}"))?;
        if locked.is_none() {
            return Err(JobBoardError::NotFound(format!("job not found: {job_id}")).into());
        }
        let existing: Option<i64> = sqlx::query_scalar(
            "SELECT `id` FROM `job_view` WHERE `job_id` = ? AND `user_id` = ? FOR UPDATE",
        )
        .bind(job_id)
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(JobBoardError::from)
        .context(format!("error in find job_view: {job_id}, {user_id}"))?;
        match existing {
            Some(id) => {
                sqlx::query::<Rdb>("UPDATE `job_view` SET `view_date` = ? WHERE `id` = ?")
                    .bind(view_date.timestamp_millis())
                    .bind(id)
                    .execute(&mut **tx)
                    .await
                    .map_err(JobBoardError::from)
                    .context(format!("error in update job_view: {job_id}, {user_id}"))?;
                Ok(ViewAction::Updated)
            }
            None => {
                sqlx::query::<Rdb>(
                    "INSERT INTO `job_view` (`job_id`, `user_id`, `view_date`) VALUES (?,?,?)",
                )
                .bind(job_id)
                .bind(user_id)
                .bind(view_date.timestamp_millis())
                .execute(&mut **tx)
                .await
                .map_err(|e| map_record_error(e, job_id))?;
                Ok(ViewAction::Created)
            }
        }
    }

    /// View entries of `job_id` in first-view order, or None if the job does not exist.
    async fn find_views(&self, job_id: &str) -> Result<Option<Vec<View>>> {
        let pool = self.db_pool();
        if !self.job_exists_tx(pool, job_id).await? {
            return Ok(None);
        }
        let rows = sqlx::query_as::<Rdb, JobViewRow>(
            "SELECT * FROM `job_view` WHERE `job_id` = ? ORDER BY `id` ASC",
        )
        .bind(job_id)
        .fetch_all(pool)
        .await
        .map_err(JobBoardError::from)
        .context(format!("error in find_views: job_id = {job_id}"))?;
        Ok(Some(rows.iter().map(|r| r.to_view()).collect()))
    }

    /// Number of distinct viewers of `job_id`, or None if the job does not exist.
    async fn count_views(&self, job_id: &str) -> Result<Option<u64>> {
        let pool = self.db_pool();
        if !self.job_exists_tx(pool, job_id).await? {
            return Ok(None);
        }
        let count = self.count_views_tx(pool, job_id).await?;
        Ok(Some(count.max(0) as u64))
    }

    async fn count_views_tx<'c, E: Executor<'c, Database = Rdb>>(
        &self,
        tx: E,
        job_id: &str,
    ) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM `job_view` WHERE `job_id` = ?")
            .bind(job_id)
            .fetch_one(tx)
            .await
            .map_err(JobBoardError::from)
            .context(format!("error in count_views: job_id = {job_id}"))
    }

    async fn job_exists_tx<'c, E: Executor<'c, Database = Rdb>>(
        &self,
        tx: E,
        job_id: &str,
    ) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM `job` WHERE `job_id` = ?")
            .bind(job_id)
            .fetch_one(tx)
            .await
            .map_err(JobBoardError::from)
            .context(format!("error in job_exists: job_id = {job_id}"))?;
        Ok(count > 0)
    }
}

#[derive(Clone, Debug)]
pub struct JobViewRepositoryImpl {
    pool: RdbPool,
}

pub trait UseJobViewRepository {
    fn job_view_repository(&self) -> &JobViewRepositoryImpl;
}

impl JobViewRepositoryImpl {
    pub fn new(pool: RdbPool) -> Self {
        Self { pool }
    }
}

impl UseRdbPool for JobViewRepositoryImpl {
    fn db_pool(&self) -> &RdbPool {
        &self.pool
    }
}

impl JobViewRepository for JobViewRepositoryImpl {}
