//! Grouping and reduction of term records into period summaries.
//!
//! Ordering matters downstream: delta and trend computations assume the
//! first and last rows of a summary sequence are the earliest and latest
//! periods, so every function here returns rows sorted ascending by year
//! (Spring before Fall when terms are in the key).

use std::collections::BTreeMap;

use crate::models::{Department, Metric, PeriodSummary, Term, TermRecord};

/// How a metric column collapses across a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    Mean,
    Sum,
}

impl Reducer {
    /// The fixed reducer policy: rates average, counts add up.
    pub fn for_metric(metric: Metric) -> Reducer {
        if metric.is_rate() {
            Reducer::Mean
        } else {
            Reducer::Sum
        }
    }
}

fn reduce_group(year: Option<i32>, term: Option<Term>, rows: &[&TermRecord]) -> PeriodSummary {
    let n = rows.len() as f64;
    PeriodSummary {
        year,
        term,
        applications: rows.iter().map(|r| r.applications).sum(),
        admitted: rows.iter().map(|r| r.admitted).sum(),
        enrolled: rows.iter().map(|r| r.enrolled).sum(),
        retention_rate: rows.iter().map(|r| r.retention_rate).sum::<f64>() / n,
        satisfaction: rows.iter().map(|r| r.satisfaction).sum::<f64>() / n,
    }
}

/// One summary row per year, ascending.
pub fn summarize_by_year(records: &[TermRecord]) -> Vec<PeriodSummary> {
    let mut groups: BTreeMap<i32, Vec<&TermRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.year).or_default().push(record);
    }
    groups
        .into_iter()
        .map(|(year, rows)| reduce_group(Some(year), None, &rows))
        .collect()
}

/// One summary row per (year, term), ascending by year then Spring, Fall.
pub fn summarize_by_year_term(records: &[TermRecord]) -> Vec<PeriodSummary> {
    let mut groups: BTreeMap<(i32, Term), Vec<&TermRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry((record.year, record.term))
            .or_default()
            .push(record);
    }
    groups
        .into_iter()
        .map(|((year, term), rows)| reduce_group(Some(year), Some(term), &rows))
        .collect()
}

/// One summary row per term across all years, Spring then Fall.
pub fn summarize_by_term(records: &[TermRecord]) -> Vec<PeriodSummary> {
    let mut groups: BTreeMap<Term, Vec<&TermRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.term).or_default().push(record);
    }
    groups
        .into_iter()
        .map(|(term, rows)| reduce_group(None, Some(term), &rows))
        .collect()
}

/// Total enrollment per department over the whole slice, largest first.
pub fn department_totals(records: &[TermRecord]) -> Vec<(Department, u64)> {
    let mut totals: Vec<(Department, u64)> = Department::ALL
        .iter()
        .map(|&dept| {
            (
                dept,
                records.iter().map(|r| r.department_enrolled(dept)).sum(),
            )
        })
        .collect();
    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals
}

/// Yearly enrollment sums for one department, ascending by year.
pub fn department_series(records: &[TermRecord], department: Department) -> Vec<f64> {
    let mut groups: BTreeMap<i32, u64> = BTreeMap::new();
    for record in records {
        *groups.entry(record.year).or_default() += record.department_enrolled(department);
    }
    groups.into_values().map(|v| v as f64).collect()
}
