use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One user having viewed one listing. Kept at most once per (job, user).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct View {
    pub user_id: String,
    pub view_date: DateTime<Utc>,
}

/// Outcome of recording a view: a first view appends, a repeat view touches.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    JsonSchema,
    strum_macros::Display,
    strum_macros::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ViewAction {
    Created,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RecordedView {
    pub job_id: String,
    pub user_id: String,
    pub view_date: DateTime<Utc>,
    pub action: ViewAction,
    /// size of the view log after this call
    pub total_job_views: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ViewCount {
    pub job_id: String,
    pub view_count: u64,
}
