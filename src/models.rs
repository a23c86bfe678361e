use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Academic term. Spring sorts before Fall so year+term groupings keep
/// chronological order within a year.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum Term {
    Spring,
    Fall,
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Spring => write!(f, "Spring"),
            Term::Fall => write!(f, "Fall"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Department {
    Engineering,
    Business,
    Arts,
    Science,
}

impl Department {
    pub const ALL: [Department; 4] = [
        Department::Engineering,
        Department::Business,
        Department::Arts,
        Department::Science,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Department::Engineering => "Engineering",
            Department::Business => "Business",
            Department::Arts => "Arts",
            Department::Science => "Science",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One term/year observation row of the source dataset. Field renames map
/// one-to-one onto the CSV headers, so the loader and the raw export share
/// a single schema definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermRecord {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Term")]
    pub term: Term,
    #[serde(rename = "Applications")]
    pub applications: u64,
    #[serde(rename = "Admitted")]
    pub admitted: u64,
    #[serde(rename = "Enrolled")]
    pub enrolled: u64,
    #[serde(rename = "Retention Rate (%)")]
    pub retention_rate: f64,
    #[serde(rename = "Student Satisfaction (%)")]
    pub satisfaction: f64,
    #[serde(rename = "Engineering Enrolled")]
    pub engineering_enrolled: u64,
    #[serde(rename = "Business Enrolled")]
    pub business_enrolled: u64,
    #[serde(rename = "Arts Enrolled")]
    pub arts_enrolled: u64,
    #[serde(rename = "Science Enrolled")]
    pub science_enrolled: u64,
}

impl TermRecord {
    pub fn department_enrolled(&self, department: Department) -> u64 {
        match department {
            Department::Engineering => self.engineering_enrolled,
            Department::Business => self.business_enrolled,
            Department::Arts => self.arts_enrolled,
            Department::Science => self.science_enrolled,
        }
    }
}

/// The loaded dataset: immutable after load, shared read-only by every
/// downstream computation.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<TermRecord>,
}

impl Dataset {
    pub fn new(records: Vec<TermRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[TermRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A metric column of the dataset. Rate metrics aggregate by mean, count
/// metrics by sum; mixing the two up is a correctness bug, so the policy
/// lives here and nowhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Metric {
    Applications,
    Admitted,
    Enrolled,
    RetentionRate,
    Satisfaction,
}

impl Metric {
    pub fn is_rate(self) -> bool {
        matches!(self, Metric::RetentionRate | Metric::Satisfaction)
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Applications => "Applications",
            Metric::Admitted => "Admitted",
            Metric::Enrolled => "Enrolled",
            Metric::RetentionRate => "Retention Rate (%)",
            Metric::Satisfaction => "Student Satisfaction (%)",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reduction of a group of records sharing a key into one row: summed
/// counts, averaged rates. `term` is set when grouping by year+term or by
/// term alone; term-only summaries carry `year: None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub year: Option<i32>,
    pub term: Option<Term>,
    pub applications: u64,
    pub admitted: u64,
    pub enrolled: u64,
    pub retention_rate: f64,
    pub satisfaction: f64,
}

impl PeriodSummary {
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Applications => self.applications as f64,
            Metric::Admitted => self.admitted as f64,
            Metric::Enrolled => self.enrolled as f64,
            Metric::RetentionRate => self.retention_rate,
            Metric::Satisfaction => self.satisfaction,
        }
    }
}

/// A projected future value. Count projections are already rounded to a
/// whole number; rate projections keep full precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectionPoint {
    pub year: i32,
    pub value: f64,
}

/// Named thresholds behind the narrative text, kept out of the report
/// strings so tests can assert on them directly. Loadable from a toml file;
/// defaults match the published dashboard copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Retention above this is called out as excellent.
    pub excellent_retention: f64,
    /// Satisfaction above this signals high educational quality.
    pub high_satisfaction: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            excellent_retention: 85.0,
            high_satisfaction: 80.0,
        }
    }
}

impl Thresholds {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let thresholds = toml::from_str(&content)?;
        Ok(thresholds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spring_sorts_before_fall() {
        assert!(Term::Spring < Term::Fall);
    }

    #[test]
    fn rate_metrics_are_flagged() {
        assert!(Metric::RetentionRate.is_rate());
        assert!(Metric::Satisfaction.is_rate());
        assert!(!Metric::Applications.is_rate());
        assert!(!Metric::Admitted.is_rate());
        assert!(!Metric::Enrolled.is_rate());
    }

    #[test]
    fn default_thresholds_match_dashboard_copy() {
        let thresholds = Thresholds::default();
        assert_eq!(thresholds.excellent_retention, 85.0);
        assert_eq!(thresholds.high_satisfaction, 80.0);
    }

    #[test]
    fn thresholds_parse_from_toml() {
        let parsed: Thresholds = toml::from_str("excellent_retention = 90.0").unwrap();
        assert_eq!(parsed.excellent_retention, 90.0);
        // Missing keys fall back to defaults.
        assert_eq!(parsed.high_satisfaction, 80.0);
    }
}
