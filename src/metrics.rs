//! Pure derived-metric computations over period summaries: funnel
//! conversion rates, term deltas, trend classification, growth rates,
//! projections and the department growth ranking.
//!
//! Everything here is deterministic and synchronous. Failures are
//! data-quality conditions, reported through [`MetricError`] so the
//! presentation layer can degrade a single figure to "N/A" without
//! failing the whole report.

use std::fmt;

use thiserror::Error;

use crate::models::{Department, Metric, PeriodSummary, ProjectionPoint, Term, TermRecord};
use crate::aggregate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MetricError {
    /// The operation needs at least one row and got none. Distinct from a
    /// valid "no data after filtering" empty aggregation result.
    #[error("no data to compute over")]
    EmptyInput,
    /// Growth needs a first and a last period.
    #[error("need at least two periods")]
    TooFewPeriods,
    /// Zero denominator; the figure is undefined rather than an error state.
    #[error("not computable (zero denominator)")]
    NotComputable,
}

/// `part / whole * 100`, undefined when `whole` is zero.
pub fn conversion_rate(part: u64, whole: u64) -> Result<f64, MetricError> {
    if whole == 0 {
        return Err(MetricError::NotComputable);
    }
    Ok(part as f64 / whole as f64 * 100.0)
}

/// The admission funnel over a span of summaries: totals plus the three
/// stage-to-stage conversion rates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Funnel {
    pub applications: u64,
    pub admitted: u64,
    pub enrolled: u64,
    /// Applications that became admissions.
    pub admission_rate: f64,
    /// Admissions that became enrollments.
    pub yield_rate: f64,
    /// Applications that became enrollments.
    pub overall_rate: f64,
}

pub fn funnel(summaries: &[PeriodSummary]) -> Result<Funnel, MetricError> {
    if summaries.is_empty() {
        return Err(MetricError::EmptyInput);
    }
    let applications: u64 = summaries.iter().map(|s| s.applications).sum();
    let admitted: u64 = summaries.iter().map(|s| s.admitted).sum();
    let enrolled: u64 = summaries.iter().map(|s| s.enrolled).sum();
    Ok(Funnel {
        applications,
        admitted,
        enrolled,
        admission_rate: conversion_rate(admitted, applications)?,
        yield_rate: conversion_rate(enrolled, admitted)?,
        overall_rate: conversion_rate(enrolled, applications)?,
    })
}

/// Binary trend classification over an ordered series. A single dip
/// anywhere makes the whole series variable; this is not a slope estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Increasing,
    Variable,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Increasing => write!(f, "increasing"),
            Trend::Variable => write!(f, "variable"),
        }
    }
}

pub fn classify_trend(values: &[f64]) -> Trend {
    if values.windows(2).all(|w| w[1] >= w[0]) {
        Trend::Increasing
    } else {
        Trend::Variable
    }
}

fn check_series(values: &[f64]) -> Result<(), MetricError> {
    match values.len() {
        0 => Err(MetricError::EmptyInput),
        1 => Err(MetricError::TooFewPeriods),
        _ => Ok(()),
    }
}

/// Average absolute per-period change of a rate series:
/// `(last - first) / series length`. The divisor is the series length, not
/// the number of gaps; downstream figures depend on that exact divisor.
pub fn linear_growth_rate(values: &[f64]) -> Result<f64, MetricError> {
    check_series(values)?;
    let first = values[0];
    let last = values[values.len() - 1];
    Ok((last - first) / values.len() as f64)
}

/// Ratio-based per-period growth of a count series:
/// `((last / first) - 1) / series length`. Deliberately not true CAGR
/// root-extraction; the literal formula is what downstream figures expect.
pub fn compound_growth_rate(values: &[f64]) -> Result<f64, MetricError> {
    check_series(values)?;
    let first = values[0];
    let last = values[values.len() - 1];
    if first == 0.0 {
        return Err(MetricError::NotComputable);
    }
    Ok((last / first - 1.0) / values.len() as f64)
}

/// Extrapolate a rate metric linearly for `horizon` future years.
pub fn project_rate(
    last_year: i32,
    last_value: f64,
    rate: f64,
    horizon: usize,
) -> Vec<ProjectionPoint> {
    (1..=horizon as i32)
        .map(|i| ProjectionPoint {
            year: last_year + i,
            value: last_value + rate * i as f64,
        })
        .collect()
}

/// Extrapolate a count metric compoundingly, rounding each projected year
/// to a whole student count.
pub fn project_count(
    last_year: i32,
    last_value: f64,
    rate: f64,
    horizon: usize,
) -> Vec<ProjectionPoint> {
    (1..=horizon as i32)
        .map(|i| ProjectionPoint {
            year: last_year + i,
            value: (last_value * (1.0 + rate).powi(i)).round(),
        })
        .collect()
}

/// Fall-minus-Spring difference for one metric, with the leading term
/// called out. A positive difference means Fall leads; zero or negative
/// credits Spring, so the comparator label always names a term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TermGap {
    pub metric: Metric,
    pub difference: f64,
    pub leader: Term,
}

pub fn term_gap(term_summaries: &[PeriodSummary], metric: Metric) -> Result<TermGap, MetricError> {
    let spring = term_summaries
        .iter()
        .find(|s| s.term == Some(Term::Spring))
        .ok_or(MetricError::EmptyInput)?;
    let fall = term_summaries
        .iter()
        .find(|s| s.term == Some(Term::Fall))
        .ok_or(MetricError::EmptyInput)?;
    let difference = fall.metric(metric) - spring.metric(metric);
    Ok(TermGap {
        metric,
        difference,
        leader: if difference > 0.0 { Term::Fall } else { Term::Spring },
    })
}

/// Total percentage growth of one department's enrollment over the span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepartmentGrowth {
    pub department: Department,
    pub first: f64,
    pub last: f64,
    /// `((last / first) - 1) * 100` when `first > 0`, else 0.
    pub growth_pct: f64,
}

/// Growth per department in canonical order (Engineering, Business, Arts,
/// Science). Empty when there are no records.
pub fn department_growth(records: &[TermRecord]) -> Vec<DepartmentGrowth> {
    if records.is_empty() {
        return Vec::new();
    }
    Department::ALL
        .iter()
        .map(|&department| {
            let series = aggregate::department_series(records, department);
            let first = series[0];
            let last = series[series.len() - 1];
            let growth_pct = if first > 0.0 {
                (last / first - 1.0) * 100.0
            } else {
                0.0
            };
            DepartmentGrowth {
                department,
                first,
                last,
                growth_pct,
            }
        })
        .collect()
}

/// Fastest, slowest and most stable department by total growth. Most
/// stable is the smallest absolute growth; ties go to the department that
/// appears first in canonical order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepartmentRanking {
    pub fastest: DepartmentGrowth,
    pub slowest: DepartmentGrowth,
    pub most_stable: DepartmentGrowth,
}

pub fn rank_departments(growths: &[DepartmentGrowth]) -> Option<DepartmentRanking> {
    let first = *growths.first()?;
    let mut fastest = first;
    let mut slowest = first;
    let mut most_stable = first;
    for &g in &growths[1..] {
        if g.growth_pct > fastest.growth_pct {
            fastest = g;
        }
        if g.growth_pct < slowest.growth_pct {
            slowest = g;
        }
        if g.growth_pct.abs() < most_stable.growth_pct.abs() {
            most_stable = g;
        }
    }
    Some(DepartmentRanking {
        fastest,
        slowest,
        most_stable,
    })
}
