use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

mod aggregate;
mod export;
mod filter;
mod loader;
mod metrics;
mod models;
mod report;

use models::{Metric, Term, Thresholds};

#[derive(Parser)]
#[command(name = "campus-metrics")]
#[command(about = "Admissions, enrollment and retention analytics over a university term dataset", long_about = None)]
struct Cli {
    /// Path to the term dataset CSV.
    #[arg(long, global = true, default_value = "data/university_student_data.csv")]
    data: PathBuf,
    /// Optional toml file with insight thresholds.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// System-wide indicators over the full history
    Summary {
        #[arg(long)]
        json: bool,
    },
    /// Yearly evolution of the key indicators
    Trends {
        #[arg(long)]
        from_year: Option<i32>,
        #[arg(long, value_enum)]
        term: Option<Term>,
    },
    /// Compare selected years and terms against each other
    Compare {
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        years: Vec<i32>,
        #[arg(long, value_enum, default_value = "retention-rate")]
        metric: Metric,
    },
    /// Departmental enrollment breakdown and growth ranking
    Departments {
        #[arg(long)]
        from_year: Option<i32>,
        #[arg(long)]
        to_year: Option<i32>,
    },
    /// Growth rates and forward projections
    Forecast {
        #[arg(long, default_value_t = 3)]
        horizon: usize,
    },
    /// Write the full markdown report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
        #[arg(long, default_value_t = 3)]
        horizon: usize,
    },
    /// Export the yearly summary table as CSV
    ExportYearly {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Export the raw dataset as CSV
    ExportRaw {
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let thresholds = match &cli.config {
        Some(path) => Thresholds::load_from_file(path)
            .with_context(|| format!("reading thresholds from {}", path.display()))?,
        None => Thresholds::default(),
    };

    let dataset = loader::shared(&cli.data)
        .with_context(|| format!("loading dataset {}", cli.data.display()))?;
    let records = dataset.records();

    match cli.command {
        Commands::Summary { json } => {
            let yearly = aggregate::summarize_by_year(records);
            if json {
                println!("{}", serde_json::to_string_pretty(&yearly)?);
                return Ok(());
            }
            println!("Yearly summary ({} records):", records.len());
            for summary in &yearly {
                println!(
                    "- {}: {} applications, {} admitted, {} enrolled, retention {:.1}%, satisfaction {:.1}%",
                    summary.year.unwrap_or_default(),
                    summary.applications,
                    summary.admitted,
                    summary.enrolled,
                    summary.retention_rate,
                    summary.satisfaction
                );
            }
            match metrics::funnel(&yearly) {
                Ok(funnel) => println!(
                    "Funnel: admission {:.1}%, yield {:.1}%, overall {:.1}%",
                    funnel.admission_rate, funnel.yield_rate, funnel.overall_rate
                ),
                Err(err) => println!("Funnel: {err}"),
            }
        }
        Commands::Trends { from_year, term } => {
            let mut selected = match from_year {
                Some(year) => filter::from_year(records, year),
                None => records.to_vec(),
            };
            if let Some(term) = term {
                selected = filter::with_term(&selected, term);
            }
            let yearly = aggregate::summarize_by_year(&selected);
            if yearly.is_empty() {
                println!("No data for this selection.");
                return Ok(());
            }
            for metric in [Metric::RetentionRate, Metric::Satisfaction] {
                let series: Vec<f64> = yearly.iter().map(|s| s.metric(metric)).collect();
                println!(
                    "{metric}: {} trend, {:.1}% to {:.1}%",
                    metrics::classify_trend(&series),
                    series[0],
                    series[series.len() - 1]
                );
            }
            let first = yearly[0].enrolled;
            let last = yearly[yearly.len() - 1].enrolled;
            println!("Enrollment: {first} to {last} students");
        }
        Commands::Compare { years, metric } => {
            if years.len() < 2 {
                println!("Select at least 2 years to compare.");
                return Ok(());
            }
            let selected = filter::years_in(records, &years);
            for summary in aggregate::summarize_by_year_term(&selected) {
                println!(
                    "- {} {}: {:.1}",
                    summary.year.unwrap_or_default(),
                    summary.term.map(|t| t.to_string()).unwrap_or_default(),
                    summary.metric(metric)
                );
            }
            let by_term = aggregate::summarize_by_term(&selected);
            for m in [Metric::RetentionRate, Metric::Satisfaction, Metric::Enrolled] {
                match metrics::term_gap(&by_term, m) {
                    Ok(gap) => println!("{m}: {} leads by {:.2}", gap.leader, gap.difference.abs()),
                    Err(err) => println!("{m}: {err}"),
                }
            }
        }
        Commands::Departments { from_year, to_year } => {
            let start = from_year.unwrap_or(i32::MIN);
            let end = to_year.unwrap_or(i32::MAX);
            let selected = filter::year_range(records, start, end);
            let totals = aggregate::department_totals(&selected);
            let grand_total: u64 = totals.iter().map(|(_, enrolled)| enrolled).sum();
            if grand_total == 0 {
                println!("No departmental enrollment in this selection.");
                return Ok(());
            }
            for (department, enrolled) in &totals {
                println!(
                    "- {department}: {enrolled} enrolled ({:.1}% of total)",
                    *enrolled as f64 / grand_total as f64 * 100.0
                );
            }
            let growths = metrics::department_growth(&selected);
            if let Some(ranking) = metrics::rank_departments(&growths) {
                println!(
                    "Fastest: {} ({:+.1}%), slowest: {} ({:+.1}%), most stable: {} ({:+.1}%)",
                    ranking.fastest.department,
                    ranking.fastest.growth_pct,
                    ranking.slowest.department,
                    ranking.slowest.growth_pct,
                    ranking.most_stable.department,
                    ranking.most_stable.growth_pct
                );
            }
        }
        Commands::Forecast { horizon } => {
            let yearly = aggregate::summarize_by_year(records);
            if yearly.len() < 2 {
                println!("Not enough yearly data to project forward.");
                return Ok(());
            }
            let last = &yearly[yearly.len() - 1];
            let last_year = last.year.unwrap_or_default();

            let retention: Vec<f64> = yearly.iter().map(|s| s.retention_rate).collect();
            let enrolled: Vec<f64> = yearly.iter().map(|s| s.enrolled as f64).collect();

            match metrics::linear_growth_rate(&retention) {
                Ok(rate) => {
                    println!("Retention grows {rate:+.2} points per year");
                    for point in metrics::project_rate(last_year, last.retention_rate, rate, horizon)
                    {
                        println!("- {}: {:.1}%", point.year, point.value);
                    }
                }
                Err(err) => println!("Retention growth: {err}"),
            }
            match metrics::compound_growth_rate(&enrolled) {
                Ok(rate) => {
                    println!("Enrollment grows {:.1}% per year", rate * 100.0);
                    for point in
                        metrics::project_count(last_year, last.enrolled as f64, rate, horizon)
                    {
                        println!("- {}: {:.0} students", point.year, point.value);
                    }
                }
                Err(err) => println!("Enrollment growth: {err}"),
            }
        }
        Commands::Report { out, horizon } => {
            let document = report::build_report(records, &thresholds, horizon);
            std::fs::write(&out, document)?;
            println!("Report written to {}.", out.display());
        }
        Commands::ExportYearly { out } => {
            let bytes = export::yearly_summary_csv(records)?;
            write_export(out, &bytes)?;
        }
        Commands::ExportRaw { out } => {
            let bytes = export::raw_dataset_csv(records)?;
            write_export(out, &bytes)?;
        }
    }

    Ok(())
}

fn write_export(out: Option<PathBuf>, bytes: &[u8]) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            std::fs::write(&path, bytes)?;
            println!("Export written to {}.", path.display());
        }
        None => print!("{}", String::from_utf8_lossy(bytes)),
    }
    Ok(())
}
