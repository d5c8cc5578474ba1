use crate::datetime_format::{parse_timestamp, DayBound};
use crate::job::{ConnectionType, JobType};
use chrono::{DateTime, Utc};
use jobboard_base::error::JobBoardError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How filter criteria are combined.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    JsonSchema,
    strum_macros::Display,
    strum_macros::AsRefStr,
)]
pub enum FilterOperator {
    #[default]
    #[serde(rename = "AND", alias = "and")]
    #[strum(serialize = "AND")]
    And,
    #[serde(rename = "OR", alias = "or")]
    #[strum(serialize = "OR")]
    Or,
}

/// Listing search filter. Absent or empty fields are not applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct JobFilter {
    pub job_id: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<JobType>,
    pub connection_type: Option<ConnectionType>,
    /// AND: listing has every skill, OR: listing has at least one
    pub skills: Option<Vec<String>>,
    /// inclusive lower bound (RFC 3339 or YYYY-MM-DD)
    pub posted_from: Option<String>,
    /// inclusive upper bound; a plain date covers the whole day
    pub posted_to: Option<String>,
    #[serde(default)]
    pub operator: FilterOperator,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobCriterion {
    JobId(String),
    Company(String),
    Location(String),
    JobType(JobType),
    ConnectionType(ConnectionType),
    Skills(Vec<String>),
    PostedFrom(DateTime<Utc>),
    PostedTo(DateTime<Utc>),
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_bound(name: &str, value: &str, bound: DayBound) -> Result<DateTime<Utc>, JobBoardError> {
    parse_timestamp(value, bound)
        .ok_or_else(|| JobBoardError::InvalidFilter(format!("{name}: invalid date '{value}'")))
}

impl JobFilter {
    pub fn with_operator(operator: FilterOperator) -> Self {
        Self {
            operator,
            ..Default::default()
        }
    }

    /// Criteria to apply, in a fixed order. Fails on unparsable dates or an
    /// inverted posted range.
    pub fn criteria(&self) -> Result<Vec<JobCriterion>, JobBoardError> {
        let mut criteria = Vec::new();
        if let Some(v) = non_empty(&self.job_id) {
            criteria.push(JobCriterion::JobId(v));
        }
        if let Some(v) = non_empty(&self.company) {
            criteria.push(JobCriterion::Company(v));
        }
        if let Some(v) = non_empty(&self.location) {
            criteria.push(JobCriterion::Location(v));
        }
        if let Some(v) = self.job_type {
            criteria.push(JobCriterion::JobType(v));
        }
        if let Some(v) = self.connection_type {
            criteria.push(JobCriterion::ConnectionType(v));
        }
        if let Some(skills) = &self.skills {
            let mut skills: Vec<String> = skills
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            skills.dedup();
            if !skills.is_empty() {
                criteria.push(JobCriterion::Skills(skills));
            }
        }
        let from = non_empty(&self.posted_from)
            .map(|v| parse_bound("posted_from", &v, DayBound::Start))
            .transpose()?;
        let to = non_empty(&self.posted_to)
            .map(|v| parse_bound("posted_to", &v, DayBound::End))
            .transpose()?;
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(JobBoardError::InvalidFilter(format!(
                    "posted_from ({}) is later than posted_to ({})",
                    from.to_rfc3339(),
                    to.to_rfc3339()
                )));
            }
        }
        if let Some(from) = from {
            criteria.push(JobCriterion::PostedFrom(from));
        }
        if let Some(to) = to {
            criteria.push(JobCriterion::PostedTo(to));
        }
        Ok(criteria)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_filter_has_no_criteria() {
        let filter: JobFilter = serde_json::from_value(json!({})).unwrap();
        assert_eq!(filter.operator, FilterOperator::And);
        assert!(filter.criteria().unwrap().is_empty());

        let filter: JobFilter = serde_json::from_value(json!({
            "company": "",
            "skills": [],
            "posted_from": " "
        }))
        .unwrap();
        assert!(filter.criteria().unwrap().is_empty());
    }

    #[test]
    fn test_operator_forms() {
        let filter: JobFilter = serde_json::from_value(json!({"operator": "or"})).unwrap();
        assert_eq!(filter.operator, FilterOperator::Or);
        let filter: JobFilter = serde_json::from_value(json!({"operator": "OR"})).unwrap();
        assert_eq!(filter.operator, FilterOperator::Or);
        assert!(serde_json::from_value::<JobFilter>(json!({"operator": "XOR"})).is_err());
        assert_eq!(FilterOperator::And.as_ref(), "AND");
    }

    #[test]
    fn test_criteria_order_and_dates() {
        let filter: JobFilter = serde_json::from_value(json!({
            "company": "Acme",
            "job_type": "Contract",
            "skills": ["rust", " ", "go"],
            "posted_from": "2025-03-01",
            "posted_to": "2025-03-01"
        }))
        .unwrap();
        let criteria = filter.criteria().unwrap();
        assert_eq!(criteria.len(), 5);
        assert_eq!(criteria[0], JobCriterion::Company("Acme".to_string()));
        assert_eq!(criteria[1], JobCriterion::JobType(JobType::Contract));
        assert_eq!(
            criteria[2],
            JobCriterion::Skills(vec!["rust".to_string(), "go".to_string()])
        );
        match (&criteria[3], &criteria[4]) {
            (JobCriterion::PostedFrom(from), JobCriterion::PostedTo(to)) => {
                assert!(from < to);
                assert_eq!(from.date_naive(), to.date_naive());
            }
            other => panic!("unexpected criteria: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_ranges() {
        let filter = JobFilter {
            posted_from: Some("2025-03-10".to_string()),
            posted_to: Some("2025-03-01".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            filter.criteria(),
            Err(JobBoardError::InvalidFilter(_))
        ));

        let filter = JobFilter {
            posted_from: Some("last week".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            filter.criteria(),
            Err(JobBoardError::InvalidFilter(_))
        ));
    }
}
