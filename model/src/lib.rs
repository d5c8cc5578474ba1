//! Data types of the job board: listings, their view log and query filters.
//!
//! Listings are handed to clients as [`JobListing`], which carries only the
//! computed `view_count`. Raw [`View`] entries are served by a separate,
//! switchable tool.

pub mod datetime_format;
pub mod filter;
pub mod job;
pub mod view;

pub use filter::{FilterOperator, JobCriterion, JobFilter};
pub use job::{ConnectionType, JobData, JobInput, JobListing, JobStatus, JobType, SalaryRange};
pub use view::{RecordedView, View, ViewAction, ViewCount};
