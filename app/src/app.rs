pub mod job;
pub mod job_view;

use jobboard_base::error::JobBoardError;

pub(crate) fn require_non_empty(name: &str, value: &str) -> Result<(), JobBoardError> {
    if value.trim().is_empty() {
        Err(JobBoardError::InvalidParameter(format!(
            "{name} must not be empty"
        )))
    } else {
        Ok(())
    }
}
