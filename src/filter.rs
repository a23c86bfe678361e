//! Row filters applied by the presentation layer before aggregation.
//! Filtering an empty slice, or filtering everything away, is a valid
//! empty result rather than an error.

use crate::models::{Term, TermRecord};

pub fn from_year(records: &[TermRecord], year: i32) -> Vec<TermRecord> {
    records.iter().filter(|r| r.year >= year).cloned().collect()
}

pub fn year_range(records: &[TermRecord], start: i32, end: i32) -> Vec<TermRecord> {
    records
        .iter()
        .filter(|r| r.year >= start && r.year <= end)
        .cloned()
        .collect()
}

pub fn years_in(records: &[TermRecord], years: &[i32]) -> Vec<TermRecord> {
    records
        .iter()
        .filter(|r| years.contains(&r.year))
        .cloned()
        .collect()
}

pub fn with_term(records: &[TermRecord], term: Term) -> Vec<TermRecord> {
    records.iter().filter(|r| r.term == term).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(year: i32, term: Term) -> TermRecord {
        TermRecord {
            year,
            term,
            applications: 100,
            admitted: 60,
            enrolled: 50,
            retention_rate: 80.0,
            satisfaction: 78.0,
            engineering_enrolled: 15,
            business_enrolled: 12,
            arts_enrolled: 10,
            science_enrolled: 13,
        }
    }

    #[test]
    fn from_year_keeps_the_cutoff_year() {
        let records = vec![
            record(2018, Term::Spring),
            record(2019, Term::Spring),
            record(2020, Term::Fall),
        ];
        let filtered = from_year(&records, 2019);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.year >= 2019));
    }

    #[test]
    fn year_range_is_inclusive_on_both_ends() {
        let records: Vec<_> = (2015..=2024).map(|y| record(y, Term::Fall)).collect();
        let filtered = year_range(&records, 2017, 2019);
        let years: Vec<i32> = filtered.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2017, 2018, 2019]);
    }

    #[test]
    fn years_in_selects_exact_years() {
        let records: Vec<_> = (2015..=2024).map(|y| record(y, Term::Spring)).collect();
        let filtered = years_in(&records, &[2015, 2024]);
        let years: Vec<i32> = filtered.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2015, 2024]);
    }

    #[test]
    fn with_term_splits_terms() {
        let records = vec![record(2020, Term::Spring), record(2020, Term::Fall)];
        assert_eq!(with_term(&records, Term::Spring).len(), 1);
        assert_eq!(with_term(&records, Term::Fall).len(), 1);
    }

    #[test]
    fn filters_on_empty_input_stay_empty() {
        assert!(from_year(&[], 2015).is_empty());
        assert!(years_in(&[], &[2015]).is_empty());
    }
}
