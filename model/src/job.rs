use chrono::{DateTime, Utc};
use jobboard_base::error::JobBoardError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
)]
pub enum JobType {
    #[serde(rename = "Full Time")]
    #[strum(serialize = "Full Time")]
    FullTime,
    #[serde(rename = "Part Time")]
    #[strum(serialize = "Part Time")]
    PartTime,
    Contract,
    Intern,
    Temporary,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
)]
pub enum ConnectionType {
    Onsite,
    Remote,
    Hybrid,
}

/// Open/closed state of a listing. Closed listings drop out of the "today" feed.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Active,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SalaryRange {
    pub min: f64,
    pub max: f64,
    /// ISO 4217 code, e.g. "USD"
    pub currency: String,
}

/// Payload of `create_job_listing`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct JobInput {
    /// externally assigned, unique identifier of the listing
    pub job_id: String,
    pub title: String,
    pub description: String,
    pub company: String,
    pub location: String,
    pub job_type: JobType,
    pub connection_type: ConnectionType,
    pub salary_range: SalaryRange,
    /// RFC 3339 timestamp or YYYY-MM-DD
    #[serde(deserialize_with = "crate::datetime_format::deserialize")]
    #[schemars(with = "String")]
    pub posted_date: DateTime<Utc>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub source: String,
    #[serde(default)]
    pub status: JobStatus,
    /// assigned by the server if omitted
    #[serde(default, deserialize_with = "crate::datetime_format::option::deserialize")]
    #[schemars(with = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
    /// assigned by the server if omitted
    #[serde(default, deserialize_with = "crate::datetime_format::option::deserialize")]
    #[schemars(with = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl JobInput {
    pub fn validate(&self) -> Result<(), JobBoardError> {
        for (name, value) in [
            ("job_id", &self.job_id),
            ("title", &self.title),
            ("description", &self.description),
            ("company", &self.company),
            ("location", &self.location),
            ("source", &self.source),
            ("salary_range.currency", &self.salary_range.currency),
        ] {
            if value.trim().is_empty() {
                return Err(JobBoardError::InvalidParameter(format!(
                    "{name} must not be empty"
                )));
            }
        }
        let salary = &self.salary_range;
        if !salary.min.is_finite() || !salary.max.is_finite() || salary.min > salary.max {
            return Err(JobBoardError::InvalidParameter(format!(
                "invalid salary_range: min={} max={}",
                salary.min, salary.max
            )));
        }
        Ok(())
    }

    /// Fill missing server-side timestamps with `now`.
    pub fn into_data(self, now: DateTime<Utc>) -> JobData {
        let created_at = self.created_at.unwrap_or(now);
        JobData {
            job_id: self.job_id,
            title: self.title,
            description: self.description,
            company: self.company,
            location: self.location,
            job_type: self.job_type,
            connection_type: self.connection_type,
            salary_range: self.salary_range,
            posted_date: self.posted_date,
            skills: self.skills,
            source: self.source,
            status: self.status,
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
        }
    }
}

/// Stored attributes of a listing, without its view log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct JobData {
    pub job_id: String,
    pub title: String,
    pub description: String,
    pub company: String,
    pub location: String,
    pub job_type: JobType,
    pub connection_type: ConnectionType,
    pub salary_range: SalaryRange,
    pub posted_date: DateTime<Utc>,
    pub skills: Vec<String>,
    pub source: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client facing form of a listing: the view log is replaced by its length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct JobListing {
    #[serde(flatten)]
    pub data: JobData,
    pub view_count: u64,
}

impl JobListing {
    pub fn new(data: JobData, view_count: u64) -> Self {
        Self { data, view_count }
    }
}
