use std::fmt::Write;

use chrono::Utc;

use crate::aggregate;
use crate::metrics::{self, MetricError, Trend};
use crate::models::{Metric, TermRecord, Thresholds};

/// Render a metric result, degrading an uncomputable figure to "N/A"
/// instead of failing the whole report.
fn pct_or_na(value: Result<f64, MetricError>) -> String {
    match value {
        Ok(v) => format!("{v:.1}%"),
        Err(_) => "N/A".to_string(),
    }
}

/// Build the full markdown report: every dashboard section in one
/// document, in reading order.
pub fn build_report(records: &[TermRecord], thresholds: &Thresholds, horizon: usize) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# University Admissions Analytics Report");
    let _ = writeln!(
        output,
        "Generated on {} over {} records",
        Utc::now().date_naive(),
        records.len()
    );

    write_executive_summary(&mut output, records);
    write_trends(&mut output, records);
    write_funnel(&mut output, records);
    write_term_comparison(&mut output, records);
    write_departments(&mut output, records);
    write_forecast(&mut output, records, horizon);
    write_recommendations(&mut output, records, thresholds);

    output
}

fn write_executive_summary(output: &mut String, records: &[TermRecord]) {
    let _ = writeln!(output);
    let _ = writeln!(output, "## Executive Summary");

    if records.is_empty() {
        let _ = writeln!(output, "No records in the dataset.");
        return;
    }

    let n = records.len() as f64;
    let avg_retention = records.iter().map(|r| r.retention_rate).sum::<f64>() / n;
    let max_retention = records
        .iter()
        .map(|r| r.retention_rate)
        .fold(f64::MIN, f64::max);
    let avg_satisfaction = records.iter().map(|r| r.satisfaction).sum::<f64>() / n;
    let total_applications: u64 = records.iter().map(|r| r.applications).sum();
    let total_admitted: u64 = records.iter().map(|r| r.admitted).sum();
    let total_enrolled: u64 = records.iter().map(|r| r.enrolled).sum();

    let _ = writeln!(
        output,
        "- Average retention {avg_retention:.1}% (peak {max_retention:.0}%)"
    );
    let _ = writeln!(output, "- Average satisfaction {avg_satisfaction:.1}%");
    let _ = writeln!(
        output,
        "- {total_applications} applications, {total_admitted} admitted, {total_enrolled} enrolled all-time"
    );
    let _ = writeln!(
        output,
        "- Historical admission rate {}",
        pct_or_na(metrics::conversion_rate(total_admitted, total_applications))
    );

    let yearly = aggregate::summarize_by_year(records);
    if let (Some(first), Some(last)) = (yearly.first(), yearly.last()) {
        let satisfaction_change = last.satisfaction - first.satisfaction;
        let _ = writeln!(
            output,
            "- Satisfaction has moved {satisfaction_change:+.1} points since the first recorded year"
        );
        let app_growth =
            metrics::conversion_rate(last.applications, first.applications).map(|p| p - 100.0);
        let _ = writeln!(
            output,
            "- Applications grew {} from first to last year",
            pct_or_na(app_growth)
        );
    }
}

fn write_trends(output: &mut String, records: &[TermRecord]) {
    let _ = writeln!(output);
    let _ = writeln!(output, "## Temporal Trends");

    let yearly = aggregate::summarize_by_year(records);
    if yearly.len() < 2 {
        let _ = writeln!(output, "Not enough yearly data to describe a trend.");
        return;
    }

    for metric in [Metric::RetentionRate, Metric::Satisfaction] {
        let series: Vec<f64> = yearly.iter().map(|s| s.metric(metric)).collect();
        let trend = metrics::classify_trend(&series);
        let first = series[0];
        let last = series[series.len() - 1];
        let _ = writeln!(
            output,
            "- {metric}: {trend} trend, {first:.1}% to {last:.1}% ({:+.1} points total)",
            last - first
        );
    }

    let enrolled_first = yearly[0].enrolled;
    let enrolled_last = yearly[yearly.len() - 1].enrolled;
    let growth = metrics::conversion_rate(enrolled_last, enrolled_first).map(|p| p - 100.0);
    let _ = writeln!(
        output,
        "- Enrollment moved from {enrolled_first} to {enrolled_last} students ({} total growth)",
        pct_or_na(growth)
    );
}

fn write_funnel(output: &mut String, records: &[TermRecord]) {
    let _ = writeln!(output);
    let _ = writeln!(output, "## Admission Funnel");

    let yearly = aggregate::summarize_by_year(records);
    match metrics::funnel(&yearly) {
        Ok(funnel) => {
            let _ = writeln!(
                output,
                "- Application to admission: {:.1}%",
                funnel.admission_rate
            );
            let _ = writeln!(
                output,
                "- Admission to enrollment: {:.1}%",
                funnel.yield_rate
            );
            let _ = writeln!(
                output,
                "- Overall conversion: {:.1}%",
                funnel.overall_rate
            );
            let _ = writeln!(
                output,
                "\nOf every 100 applicants, {} are admitted and {} finally enroll.",
                funnel.admission_rate as u64, funnel.overall_rate as u64
            );
        }
        Err(_) => {
            let _ = writeln!(output, "Funnel rates are not computable for this selection.");
        }
    }
}

fn write_term_comparison(output: &mut String, records: &[TermRecord]) {
    let _ = writeln!(output);
    let _ = writeln!(output, "## Spring vs Fall");

    let by_term = aggregate::summarize_by_term(records);
    let mut wrote_any = false;
    for metric in [Metric::RetentionRate, Metric::Satisfaction, Metric::Enrolled] {
        if let Ok(gap) = metrics::term_gap(&by_term, metric) {
            let _ = writeln!(
                output,
                "- {metric}: {} leads by {:.2}",
                gap.leader,
                gap.difference.abs()
            );
            wrote_any = true;
        }
    }
    if !wrote_any {
        let _ = writeln!(output, "Both terms are needed for a comparison.");
    }
}

fn write_departments(output: &mut String, records: &[TermRecord]) {
    let _ = writeln!(output);
    let _ = writeln!(output, "## Departments");

    let totals = aggregate::department_totals(records);
    let grand_total: u64 = totals.iter().map(|(_, enrolled)| enrolled).sum();
    if grand_total == 0 {
        let _ = writeln!(output, "No departmental enrollment in this selection.");
        return;
    }

    for (department, enrolled) in &totals {
        let share = *enrolled as f64 / grand_total as f64 * 100.0;
        let _ = writeln!(output, "- {department}: {enrolled} enrolled ({share:.1}% of total)");
    }

    let growths = metrics::department_growth(records);
    if let Some(ranking) = metrics::rank_departments(&growths) {
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "Fastest growing: {} ({:+.1}%). Slowest: {} ({:+.1}%). Most stable: {} ({:+.1}%).",
            ranking.fastest.department,
            ranking.fastest.growth_pct,
            ranking.slowest.department,
            ranking.slowest.growth_pct,
            ranking.most_stable.department,
            ranking.most_stable.growth_pct
        );
    }
}

fn write_forecast(output: &mut String, records: &[TermRecord], horizon: usize) {
    let _ = writeln!(output);
    let _ = writeln!(output, "## {horizon}-Year Forecast");

    let yearly = aggregate::summarize_by_year(records);
    if yearly.len() < 2 {
        let _ = writeln!(output, "Not enough yearly data to project forward.");
        return;
    }
    let last = &yearly[yearly.len() - 1];
    let last_year = last.year.unwrap_or_default();

    let retention: Vec<f64> = yearly.iter().map(|s| s.retention_rate).collect();
    let satisfaction: Vec<f64> = yearly.iter().map(|s| s.satisfaction).collect();
    let enrolled: Vec<f64> = yearly.iter().map(|s| s.enrolled as f64).collect();

    let retention_rate = metrics::linear_growth_rate(&retention);
    let satisfaction_rate = metrics::linear_growth_rate(&satisfaction);
    let enrollment_rate = metrics::compound_growth_rate(&enrolled);

    let _ = writeln!(
        output,
        "Per-year growth: retention {}, satisfaction {}, enrollment {}.",
        match retention_rate {
            Ok(r) => format!("{r:+.2} points"),
            Err(_) => "N/A".to_string(),
        },
        match satisfaction_rate {
            Ok(r) => format!("{r:+.2} points"),
            Err(_) => "N/A".to_string(),
        },
        pct_or_na(enrollment_rate.map(|r| r * 100.0))
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "| Year | Retention (%) | Satisfaction (%) | Enrollment |");
    let _ = writeln!(output, "|------|---------------|------------------|------------|");

    let projected_retention = retention_rate
        .map(|r| metrics::project_rate(last_year, last.retention_rate, r, horizon))
        .unwrap_or_default();
    let projected_satisfaction = satisfaction_rate
        .map(|r| metrics::project_rate(last_year, last.satisfaction, r, horizon))
        .unwrap_or_default();
    let projected_enrollment = enrollment_rate
        .map(|r| metrics::project_count(last_year, last.enrolled as f64, r, horizon))
        .unwrap_or_default();

    for i in 0..horizon {
        let year = last_year + 1 + i as i32;
        let retention_cell = projected_retention
            .get(i)
            .map(|p| format!("{:.1}", p.value))
            .unwrap_or_else(|| "N/A".to_string());
        let satisfaction_cell = projected_satisfaction
            .get(i)
            .map(|p| format!("{:.1}", p.value))
            .unwrap_or_else(|| "N/A".to_string());
        let enrollment_cell = projected_enrollment
            .get(i)
            .map(|p| format!("{:.0}", p.value))
            .unwrap_or_else(|| "N/A".to_string());
        let _ = writeln!(
            output,
            "| {year} | {retention_cell} | {satisfaction_cell} | {enrollment_cell} |"
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "Projections extend historical trends linearly and assume current conditions hold."
    );
}

fn write_recommendations(output: &mut String, records: &[TermRecord], thresholds: &Thresholds) {
    let _ = writeln!(output);
    let _ = writeln!(output, "## Recommendations");

    if records.is_empty() {
        let _ = writeln!(output, "Nothing to recommend without data.");
        return;
    }

    let yearly = aggregate::summarize_by_year(records);
    let latest = &yearly[yearly.len() - 1];

    if latest.retention_rate > thresholds.excellent_retention {
        let _ = writeln!(
            output,
            "- Retention is above {:.0}%: excellent. Document current practices and keep them in place.",
            thresholds.excellent_retention
        );
    } else {
        let _ = writeln!(
            output,
            "- Retention is at or below the {:.0}% bar: review advising and first-year support.",
            thresholds.excellent_retention
        );
    }

    if latest.satisfaction > thresholds.high_satisfaction {
        let _ = writeln!(
            output,
            "- Satisfaction above {:.0}% signals high educational quality; run qualitative studies to find what drives it.",
            thresholds.high_satisfaction
        );
    } else {
        let _ = writeln!(
            output,
            "- Satisfaction at or below {:.0}%: survey students for the main friction points.",
            thresholds.high_satisfaction
        );
    }

    let retention_series: Vec<f64> = yearly.iter().map(|s| s.retention_rate).collect();
    if metrics::classify_trend(&retention_series) == Trend::Increasing {
        let _ = writeln!(output, "- Overall quality trend is positive.");
    }

    let growths = metrics::department_growth(records);
    if let Some(ranking) = metrics::rank_departments(&growths) {
        let _ = writeln!(
            output,
            "- {} grew {:+.1}%, the least of all departments: review its program offer and outreach.",
            ranking.slowest.department, ranking.slowest.growth_pct
        );
        let _ = writeln!(
            output,
            "- Benchmark against {} ({:+.1}%) and replicate its recruiting practices.",
            ranking.fastest.department, ranking.fastest.growth_pct
        );
    }
}
