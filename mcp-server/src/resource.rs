//! `jobs://` resource addressing.

use jobboard_base::error::JobBoardError;
use std::str::FromStr;

pub const SCHEME: &str = "jobs://";
pub const TODAY_URI: &str = "jobs://today";
pub const DETAILS_URI_TEMPLATE: &str = "jobs://details/{job_id}";
pub const VIEWS_URI_TEMPLATE: &str = "jobs://views/{job_id}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobResourceUri {
    /// open listings posted today
    Today,
    /// one listing with its view count
    Details(String),
    /// view count of one listing
    Views(String),
}

fn decode_job_id(uri: &str, raw: &str) -> Result<String, JobBoardError> {
    if raw.is_empty() || raw.contains('/') {
        return Err(JobBoardError::InvalidParameter(format!(
            "invalid job_id in resource uri: {uri}"
        )));
    }
    let decoded = urlencoding::decode(raw)
        .map_err(|e| JobBoardError::InvalidParameter(format!("invalid escape in {uri}: {e}")))?;
    if decoded.trim().is_empty() {
        return Err(JobBoardError::InvalidParameter(format!(
            "empty job_id in resource uri: {uri}"
        )));
    }
    Ok(decoded.into_owned())
}

impl FromStr for JobResourceUri {
    type Err = JobBoardError;

    fn from_str(uri: &str) -> Result<Self, Self::Err> {
        let path = uri
            .strip_prefix(SCHEME)
            .ok_or_else(|| JobBoardError::InvalidParameter(format!("unknown resource: {uri}")))?;
        if path == "today" {
            return Ok(Self::Today);
        }
        if let Some(raw) = path.strip_prefix("details/") {
            return decode_job_id(uri, raw).map(Self::Details);
        }
        if let Some(raw) = path.strip_prefix("views/") {
            return decode_job_id(uri, raw).map(Self::Views);
        }
        Err(JobBoardError::InvalidParameter(format!(
            "unknown resource: {uri}"
        )))
    }
}
