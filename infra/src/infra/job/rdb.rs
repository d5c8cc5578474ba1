use super::rows::{JobRow, JobSkillRow};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use command_utils::util::datetime;
use infra_utils::infra::rdb::{Rdb, RdbPool, UseRdbPool};
use itertools::Itertools;
use jobboard_base::error::JobBoardError;
use model::{FilterOperator, JobCriterion, JobData, JobListing, JobStatus};
use sqlx::{Executor, QueryBuilder, Transaction};
use std::collections::HashMap;

const SKILL_QUERY_CHUNK_SIZE: usize = 1000;

const SELECT_JOB_WITH_VIEW_COUNT: &str = "SELECT j.*, \
    (SELECT COUNT(*) FROM `job_view` v WHERE v.`job_id` = j.`job_id`) AS `view_count` \
    FROM `job` j";

fn push_criterion(builder: &mut QueryBuilder<'static, Rdb>, criterion: &JobCriterion) {
    match criterion {
        JobCriterion::JobId(v) => {
            builder.push("j.`job_id` = ").push_bind(v.clone());
        }
        JobCriterion::Company(v) => {
            builder.push("j.`company` = ").push_bind(v.clone());
        }
        JobCriterion::Location(v) => {
            builder.push("j.`location` = ").push_bind(v.clone());
        }
        JobCriterion::JobType(v) => {
            builder.push("j.`job_type` = ").push_bind(v.as_ref().to_string());
        }
        JobCriterion::ConnectionType(v) => {
            builder
                .push("j.`connection_type` = ")
                .push_bind(v.as_ref().to_string());
        }
        JobCriterion::Skills(skills) => {
            // all skills must be present: one EXISTS per skill
            builder.push("(");
            for (i, skill) in skills.iter().enumerate() {
                if i > 0 {
                    builder.push(" AND ");
                }
                builder
                    .push("EXISTS (SELECT 1 FROM `job_skill` s WHERE s.`job_id` = j.`job_id` AND s.`skill` = ")
                    .push_bind(skill.clone())
                    .push(")");
            }
            builder.push(")");
        }
        JobCriterion::PostedFrom(from) => {
            builder
                .push("j.`posted_date` >= ")
                .push_bind(from.timestamp_millis());
        }
        JobCriterion::PostedTo(to) => {
            builder
                .push("j.`posted_date` <= ")
                .push_bind(to.timestamp_millis());
        }
    }
}

fn push_any_skill(builder: &mut QueryBuilder<'static, Rdb>, skills: &[String]) {
    builder.push("EXISTS (SELECT 1 FROM `job_skill` s WHERE s.`job_id` = j.`job_id` AND s.`skill` IN (");
    let mut separated = builder.separated(", ");
    for skill in skills {
        separated.push_bind(skill.clone());
    }
    separated.push_unseparated("))");
}

/// Build the listing query for `criteria` combined by `operator`.
/// No criteria matches every listing.
pub fn build_find_list_query(
    criteria: &[JobCriterion],
    operator: FilterOperator,
) -> QueryBuilder<'static, Rdb> {
    let mut builder = QueryBuilder::<Rdb>::new(SELECT_JOB_WITH_VIEW_COUNT);
    if !criteria.is_empty() {
        let glue = match operator {
            FilterOperator::And => " AND ",
            FilterOperator::Or => " OR ",
        };
        builder.push(" WHERE (");
        for (i, criterion) in criteria.iter().enumerate() {
            if i > 0 {
                builder.push(glue);
            }
            match (operator, criterion) {
                // under OR, a single matching skill is enough
                (FilterOperator::Or, JobCriterion::Skills(skills)) => {
                    push_any_skill(&mut builder, skills)
                }
                _ => push_criterion(&mut builder, criterion),
            }
        }
        builder.push(")");
    }
    builder.push(" ORDER BY j.`id` ASC");
    builder
}

#[async_trait]
pub trait JobRepository: UseRdbPool + Sync + Send {
    /// Insert a new listing with its skills. Fails with DuplicateKey when job_id is taken.
    async fn create(&self, data: &JobData) -> Result<JobListing> {
        // returned timestamps must equal the stored (millisecond) ones
        let data = &JobData {
            posted_date: datetime::truncate_millis(data.posted_date),
            created_at: datetime::truncate_millis(data.created_at),
            updated_at: datetime::truncate_millis(data.updated_at),
            ..data.clone()
        };
        let mut tx = self
            .db_pool()
            .begin()
            .await
            .map_err(JobBoardError::from)?;
        self.create_tx(&mut tx, data).await?;
        tx.commit()
            .await
            .map_err(JobBoardError::from)
            .context("error in commit job creation")?;
        tracing::debug!("job created: job_id={}", &data.job_id);
        Ok(JobListing::new(data.clone(), 0))
    }

    async fn create_tx(&self, tx: &mut Transaction<'_, Rdb>, data: &JobData) -> Result<()> {
        let res = sqlx::query::<Rdb>(
            "INSERT INTO `job` (
            `job_id`,
            `title`,
            `description`,
            `company`,
            `location`,
            `job_type`,
            `connection_type`,
            `salary_min`,
            `salary_max`,
            `salary_currency`,
            `posted_date`,
            `source`,
            `status`,
            `created_at`,
            `updated_at`
            ) VALUES (?,?,?,?,?,?,?,?,?,?,?,?,?,?,?)",
        )
        .bind(&data.job_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.company)
        .bind(&data.location)
        .bind(data.job_type.as_ref())
        .bind(data.connection_type.as_ref())
        .bind(data.salary_range.min)
        .bind(data.salary_range.max)
        .bind(&data.salary_range.currency)
        .bind(data.posted_date.timestamp_millis())
        .bind(&data.source)
        .bind(data.status.as_ref())
        .bind(data.created_at.timestamp_millis())
        .bind(data.updated_at.timestamp_millis())
        .execute(&mut **tx)
        .await
        .map_err(|e| match JobBoardError::from(e) {
            JobBoardError::DuplicateKey(_) => {
                JobBoardError::DuplicateKey(format!("job_id already exists: {}", &data.job_id))
            }
            other => other,
        })?;
        if res.rows_affected() == 0 {
            return Err(JobBoardError::RuntimeError(format!(
                "Cannot insert job (logic error?): {}",
                &data.job_id
            ))
            .into());
        }
        self.create_skills_tx(tx, &data.job_id, &data.skills).await?;
        Ok(())
    }

    async fn create_skills_tx(
        &self,
        tx: &mut Transaction<'_, Rdb>,
        job_id: &str,
        skills: &[String],
    ) -> Result<u64> {
        if skills.is_empty() {
            return Ok(0);
        }
        let mut builder =
            QueryBuilder::<Rdb>::new("INSERT INTO `job_skill` (`job_id`, `position`, `skill`) ");
        builder.push_values(skills.iter().enumerate(), |mut b, (position, skill)| {
            b.push_bind(job_id)
                .push_bind(position as i32)
                .push_bind(skill);
        });
        let res = builder
            .build()
            .execute(&mut **tx)
            .await
            .map_err(JobBoardError::from)
            .context(format!("error in insert job_skill: job_id = {job_id}"))?;
        Ok(res.rows_affected())
    }

    async fn find(&self, job_id: &str) -> Result<Option<JobListing>> {
        let pool = self.db_pool();
        let row = sqlx::query_as::<Rdb, JobRow>(&format!(
            "{SELECT_JOB_WITH_VIEW_COUNT} WHERE j.`job_id` = ?"
        ))
        .bind(job_id)
        .fetch_optional(pool)
        .await
        .map_err(JobBoardError::from)
        .context(format!("error in find: job_id = {job_id}"))?;

        match row {
            Some(row) => {
                let mut skills = self.find_skills_tx(pool, &[row.job_id.clone()]).await?;
                let listing = row.to_listing(skills.remove(&row.job_id).unwrap_or_default())?;
                Ok(Some(listing))
            }
            None => Ok(None),
        }
    }

    /// Listings matching `criteria`, oldest insertion first.
    async fn find_list(
        &self,
        criteria: &[JobCriterion],
        operator: FilterOperator,
    ) -> Result<Vec<JobListing>> {
        let pool = self.db_pool();
        let rows = build_find_list_query(criteria, operator)
            .build_query_as::<JobRow>()
            .fetch_all(pool)
            .await
            .map_err(JobBoardError::from)
            .context(format!("error in find_list: {criteria:?} ({operator})"))?;
        self.to_listings(pool, rows).await
    }

    /// Listings posted at or after `since` that are not closed.
    async fn find_posted_since(&self, since: DateTime<Utc>) -> Result<Vec<JobListing>> {
        let pool = self.db_pool();
        let rows = sqlx::query_as::<Rdb, JobRow>(&format!(
            "{SELECT_JOB_WITH_VIEW_COUNT} WHERE j.`posted_date` >= ? AND j.`status` <> ? ORDER BY j.`id` ASC"
        ))
        .bind(since.timestamp_millis())
        .bind(JobStatus::Closed.as_ref())
        .fetch_all(pool)
        .await
        .map_err(JobBoardError::from)
        .context(format!("error in find_posted_since: {since}"))?;
        self.to_listings(pool, rows).await
    }

    async fn update_status(
        &self,
        job_id: &str,
        status: JobStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool> {
        sqlx::query::<Rdb>("UPDATE `job` SET `status` = ?, `updated_at` = ? WHERE `job_id` = ?")
            .bind(status.as_ref())
            .bind(updated_at.timestamp_millis())
            .bind(job_id)
            .execute(self.db_pool())
            .await
            .map(|r| r.rows_affected() > 0)
            .map_err(JobBoardError::from)
            .context(format!("error in update_status: job_id = {job_id}"))
    }

    /// Skills of `job_ids` keyed by job_id, queried in chunks to stay under
    /// the bind parameter limit.
    async fn find_skills_tx<'c, E: Executor<'c, Database = Rdb> + Copy>(
        &self,
        tx: E,
        job_ids: &[String],
    ) -> Result<HashMap<String, Vec<String>>> {
        let mut skills = HashMap::new();
        for chunk in job_ids.chunks(SKILL_QUERY_CHUNK_SIZE) {
            let mut builder =
                QueryBuilder::<Rdb>::new("SELECT * FROM `job_skill` WHERE `job_id` IN (");
            let mut separated = builder.separated(", ");
            for job_id in chunk {
                separated.push_bind(job_id.clone());
            }
            separated.push_unseparated(") ORDER BY `job_id`, `position`");
            let rows = builder
                .build_query_as::<JobSkillRow>()
                .fetch_all(tx)
                .await
                .map_err(JobBoardError::from)
                .context(format!("error in find_skills: {} job ids", chunk.len()))?;
            let grouped = rows.into_iter().chunk_by(|r| r.job_id.clone());
            skills.extend(
                grouped
                    .into_iter()
                    .map(|(job_id, group)| (job_id, group.map(|r| r.skill).collect_vec())),
            );
        }
        Ok(skills)
    }

    async fn to_listings(&self, pool: &RdbPool, rows: Vec<JobRow>) -> Result<Vec<JobListing>> {
        let job_ids = rows.iter().map(|r| r.job_id.clone()).collect_vec();
        let mut skills = self.find_skills_tx(pool, &job_ids).await?;
        rows.iter()
            .map(|row| row.to_listing(skills.remove(&row.job_id).unwrap_or_default()))
            .collect()
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query::<Rdb>("SELECT 1")
            .execute(self.db_pool())
            .await
            .map_err(JobBoardError::from)?;
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct JobRepositoryImpl {
    pool: RdbPool,
}

pub trait UseJobRepository {
    fn job_repository(&self) -> &JobRepositoryImpl;
}

impl JobRepositoryImpl {
    pub fn new(pool: RdbPool) -> Self {
        Self { pool }
    }
}

impl UseRdbPool for JobRepositoryImpl {
    fn db_pool(&self) -> &RdbPool {
        &self.pool
    }
}

impl JobRepository for JobRepositoryImpl {}

#[cfg(all(test, not(feature = "mysql")))]
mod test {
    use super::*;
    use crate::infra::test::{job_data, setup_test_rdb};
    use chrono::TimeZone;
    use model::JobType;

    #[tokio::test]
    async fn test_create_and_find() -> Result<()> {
        let rdb = setup_test_rdb().await?;
        let repository = JobRepositoryImpl::new(rdb.pool().clone());

        let data = job_data("job_1", "Acme", &["rust", "sql"], 1);
        let created = repository.create(&data).await?;
        assert_eq!(created.view_count, 0);
        assert_eq!(created.data, data);

        let found = repository.find("job_1").await?;
        assert_eq!(found, Some(JobListing::new(data.clone(), 0)));
        assert_eq!(repository.find("missing").await?, None);

        let err = repository.create(&data).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<JobBoardError>(),
            Some(JobBoardError::DuplicateKey(_))
        ));
        assert_eq!(repository.find_list(&[], FilterOperator::And).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_find_list_by_criteria() -> Result<()> {
        let rdb = setup_test_rdb().await?;
        let repository = JobRepositoryImpl::new(rdb.pool().clone());
        repository.create(&job_data("a", "Acme", &["rust", "sql"], 1)).await?;
        repository.create(&job_data("b", "Acme", &["go"], 5)).await?;
        repository.create(&job_data("c", "Initech", &["rust"], 10)).await?;

        let ids = |v: Vec<JobListing>| v.into_iter().map(|l| l.data.job_id).collect_vec();

        assert_eq!(ids(repository.find_list(&[], FilterOperator::And).await?), ["a", "b", "c"]);

        let and = [
            JobCriterion::Company("Acme".to_string()),
            JobCriterion::Skills(vec!["rust".to_string()]),
        ];
        assert_eq!(ids(repository.find_list(&and, FilterOperator::And).await?), ["a"]);
        assert_eq!(
            ids(repository.find_list(&and, FilterOperator::Or).await?),
            ["a", "b", "c"]
        );

        let all_skills = [JobCriterion::Skills(vec!["rust".to_string(), "sql".to_string()])];
        assert_eq!(ids(repository.find_list(&all_skills, FilterOperator::And).await?), ["a"]);
        let any_skill = [JobCriterion::Skills(vec!["go".to_string(), "sql".to_string()])];
        assert_eq!(
            ids(repository.find_list(&any_skill, FilterOperator::Or).await?),
            ["a", "b"]
        );

        let range = [
            JobCriterion::PostedFrom(Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap()),
            JobCriterion::PostedTo(Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()),
        ];
        assert_eq!(ids(repository.find_list(&range, FilterOperator::And).await?), ["b", "c"]);

        let none = [JobCriterion::JobType(JobType::Intern)];
        assert!(repository.find_list(&none, FilterOperator::And).await?.is_empty());

        // skills come back in insertion order
        let a = repository.find_list(&[JobCriterion::JobId("a".to_string())], FilterOperator::And).await?;
        assert_eq!(a[0].data.skills, vec!["rust", "sql"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_posted_since_and_status() -> Result<()> {
        let rdb = setup_test_rdb().await?;
        let repository = JobRepositoryImpl::new(rdb.pool().clone());
        repository.create(&job_data("old", "Acme", &[], 1)).await?;
        repository.create(&job_data("new", "Acme", &[], 20)).await?;
        repository.create(&job_data("closed", "Acme", &[], 20)).await?;
        let updated_at = Utc.with_ymd_and_hms(2025, 3, 21, 0, 0, 0).unwrap();
        assert!(repository.update_status("closed", JobStatus::Closed, updated_at).await?);
        assert!(!repository.update_status("missing", JobStatus::Closed, updated_at).await?);

        let since = Utc.with_ymd_and_hms(2025, 3, 20, 0, 0, 0).unwrap();
        let found = repository.find_posted_since(since).await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].data.job_id, "new");

        let closed = repository.find("closed").await?.unwrap();
        assert_eq!(closed.data.status, JobStatus::Closed);
        assert_eq!(closed.data.updated_at, updated_at);
        repository.ping().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_returns_stored_timestamps() -> Result<()> {
        let rdb = setup_test_rdb().await?;
        let repository = JobRepositoryImpl::new(rdb.pool().clone());
        let mut data = job_data("job_1", "Acme", &[], 1);
        data.created_at += chrono::Duration::nanoseconds(987_654_321);
        let created = repository.create(&data).await?;
        assert_eq!(created.data.created_at.timestamp_subsec_millis(), 987);
        assert_eq!(Some(created), repository.find("job_1").await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_find_list_more_listings_than_bind_limit() -> Result<()> {
        let rdb = setup_test_rdb().await?;
        let repository = JobRepositoryImpl::new(rdb.pool().clone());
        let total = 33_000;
        let mut tx = rdb.pool().begin().await?;
        for batch in (0..total).collect_vec().chunks(1000) {
            let mut builder = QueryBuilder::<Rdb>::new(
                "INSERT INTO `job` (`job_id`, `title`, `description`, `company`, `location`, \
                `job_type`, `connection_type`, `salary_min`, `salary_max`, `salary_currency`, \
                `posted_date`, `source`, `status`, `created_at`, `updated_at`) ",
            );
            builder.push_values(batch, |mut b, i| {
                b.push_bind(format!("job_{i}"))
                    .push_bind("title")
                    .push_bind("description")
                    .push_bind("Acme")
                    .push_bind("Tokyo")
                    .push_bind("Full Time")
                    .push_bind("Remote")
                    .push_bind(1.0)
                    .push_bind(2.0)
                    .push_bind("USD")
                    .push_bind(0_i64)
                    .push_bind("test")
                    .push_bind("active")
                    .push_bind(0_i64)
                    .push_bind(0_i64);
            });
            builder.build().execute(&mut *tx).await?;
            repository
                .create_skills_tx(&mut tx, &format!("job_{}", batch[0]), &["rust".to_string()])
                .await?;
        }
        tx.commit().await?;

        let all = repository.find_list(&[], FilterOperator::And).await?;
        assert_eq!(all.len(), total);
        assert_eq!(all[0].data.skills, vec!["rust"]);
        assert_eq!(all.iter().filter(|l| !l.data.skills.is_empty()).count(), 33);
        Ok(())
    }
}
