use model::{JobFilter, JobInput, JobStatus};
use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct FetchJobListingsParams {
    /// Search criteria. Omit to list every job.
    #[serde(default)]
    pub filter: Option<JobFilter>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateJobListingParams {
    pub job: JobInput,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateJobViewParams {
    pub job_id: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetJobViewsParams {
    #[serde(alias = "jobid")]
    pub job_id: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateJobListingStatusParams {
    pub job_id: String,
    /// "active" or "closed"
    pub status: JobStatus,
}
