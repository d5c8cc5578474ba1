use anyhow::Result;
use command_utils::util::datetime;
use jobboard_base::error::JobBoardError;
use model::{ConnectionType, JobData, JobListing, JobStatus, JobType, SalaryRange};
use std::str::FromStr;

// db row definitions
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct JobRow {
    pub id: i64,
    pub job_id: String,
    pub title: String,
    pub description: String,
    pub company: String,
    pub location: String,
    pub job_type: String,
    pub connection_type: String,
    pub salary_min: f64,
    pub salary_max: f64,
    pub salary_currency: String,
    pub posted_date: i64,
    pub source: String,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
    // computed by subquery
    pub view_count: i64,
}

fn parse_column<T: FromStr>(column: &str, value: &str) -> Result<T, JobBoardError> {
    T::from_str(value).map_err(|_| {
        JobBoardError::RuntimeError(format!("unknown {column} stored in job table: {value}"))
    })
}

impl JobRow {
    pub fn to_data(&self, skills: Vec<String>) -> Result<JobData> {
        Ok(JobData {
            job_id: self.job_id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            company: self.company.clone(),
            location: self.location.clone(),
            job_type: parse_column::<JobType>("job_type", &self.job_type)?,
            connection_type: parse_column::<ConnectionType>(
                "connection_type",
                &self.connection_type,
            )?,
            salary_range: SalaryRange {
                min: self.salary_min,
                max: self.salary_max,
                currency: self.salary_currency.clone(),
            },
            posted_date: datetime::from_epoch_milli(self.posted_date),
            skills,
            source: self.source.clone(),
            status: parse_column::<JobStatus>("status", &self.status)?,
            created_at: datetime::from_epoch_milli(self.created_at),
            updated_at: datetime::from_epoch_milli(self.updated_at),
        })
    }

    pub fn to_listing(&self, skills: Vec<String>) -> Result<JobListing> {
        Ok(JobListing::new(
            self.to_data(skills)?,
            self.view_count.max(0) as u64,
        ))
    }
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct JobSkillRow {
    pub job_id: String,
    pub position: i32,
    pub skill: String,
}
