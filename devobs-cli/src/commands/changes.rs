use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Subcommand};

use devobs_core::api::ChangeReportFilter;
use devobs_core::types::{AnalysisStatus, ChangeAnalysis};

use super::{Session, or_dash, print_json, truncate};

#[derive(Subcommand, Debug)]
pub enum ChangesCommand {
    /// List change reports of a repository
    List(ListArgs),
    /// Request a new change report
    Create {
        repo_id: String,
        /// Days of history to analyse (default from config)
        #[arg(long)]
        days: Option<u32>,
    },
    /// Show one change report
    Show { repo_id: String, id: String },
    /// Delete one change report
    Delete { repo_id: String, id: String },
}

#[derive(Args, Debug)]
pub struct ListArgs {
    pub repo_id: String,

    /// Only reports in this status (pending, processing, completed, failed)
    #[arg(long)]
    pub status: Option<String>,

    /// Earliest date, YYYY-MM-DD or RFC 3339
    #[arg(long)]
    pub since: Option<String>,

    /// Latest date, YYYY-MM-DD or RFC 3339
    #[arg(long)]
    pub until: Option<String>,

    #[arg(long)]
    pub limit: Option<u32>,

    /// Skip this many reports before listing
    #[arg(long)]
    pub offset: Option<u32>,
}

pub async fn run(cmd: ChangesCommand, session: &Session) -> anyhow::Result<()> {
    let reports = &session.store.change_reports;
    match cmd {
        ChangesCommand::List(args) => {
            let filter = ChangeReportFilter {
                status: args.status.map(AnalysisStatus::from),
                start_date: args.since.as_deref().map(parse_date).transpose()?,
                end_date: args.until.as_deref().map(parse_date).transpose()?,
                limit: args.limit,
                offset: args.offset,
                ..ChangeReportFilter::for_repo(&args.repo_id)
            };
            session
                .pending(
                    "Fetching change reports",
                    reports.fetch_for(&args.repo_id, Some(filter)),
                )
                .await
                .with_context(|| format!("Failed to list change reports for {}", args.repo_id))?;

            let mut list = reports.reports(&args.repo_id);
            list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            if session.json {
                return print_json(&list);
            }
            print_table(&args.repo_id, &list);
        }
        ChangesCommand::Create { repo_id, days } => {
            let days = days.unwrap_or(session.config.changes.default_days);
            let created = session
                .pending("Requesting change report", reports.create(&repo_id, days))
                .await
                .with_context(|| format!("Failed to create change report for {repo_id}"))?;
            match created {
                Some(report) if session.json => return print_json(&report),
                Some(report) => println!(
                    "Requested report {} for {repo_id} ({days} days): {}",
                    report.id, report.status
                ),
                None => println!("Requested a {days}-day report for {repo_id}"),
            }
        }
        ChangesCommand::Show { repo_id, id } => {
            let report = session
                .pending("Fetching change report", reports.fetch_one(&repo_id, &id))
                .await
                .with_context(|| format!("Failed to fetch change report {id}"))?
                .with_context(|| format!("Change report {id} not found"))?;
            if session.json {
                return print_json(&report);
            }
            print_detail(&report);
        }
        ChangesCommand::Delete { repo_id, id } => {
            session
                .pending("Deleting change report", reports.delete(&repo_id, &id))
                .await
                .with_context(|| format!("Failed to delete change report {id}"))?;
            println!("Deleted change report {id}");
        }
    }
    Ok(())
}

fn parse_date(s: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date {s:?}, expected YYYY-MM-DD"))?;
    Ok(date.and_time(chrono::NaiveTime::MIN).and_utc())
}

fn print_table(repo_id: &str, reports: &[ChangeAnalysis]) {
    if reports.is_empty() {
        println!("No change reports for {repo_id}.");
        return;
    }
    println!(
        "  {:<38} {:<11} {:>5} {:>8} {:<20}",
        "ID", "STATUS", "DAYS", "COMMITS", "CREATED"
    );
    for r in reports {
        println!(
            "  {:<38} {:<11} {:>5} {:>8} {:<20}",
            r.id,
            r.status,
            or_dash(r.period_days),
            or_dash(r.stats.as_ref().map(|s| s.commit_count)),
            or_dash(r.created_at.map(|t| t.format("%Y-%m-%d %H:%M"))),
        );
    }
    println!();
    println!("  {} reports", reports.len());
}

fn print_detail(report: &ChangeAnalysis) {
    println!("Change report {}", report.id);
    println!();
    println!(
        "  Repository:  {}",
        report.repo_name.as_deref().unwrap_or(&report.repo_id)
    );
    println!("  Status:      {}", report.status);
    println!("  Period:      {} days", or_dash(report.period_days));
    println!("  Created:     {}", or_dash(report.created_at));
    println!("  Analyzed:    {}", or_dash(report.analyzed_at));
    if let Some(err) = &report.error_message {
        println!("  Error:       {}", truncate(err, 200));
    }
    if let Some(key) = &report.observation_key {
        println!("  Observation: {key}");
    }
    if let Some(stats) = &report.stats {
        println!();
        println!(
            "  {} commits, +{} -{} across {} files",
            stats.commit_count, stats.additions, stats.deletions, stats.files_changed
        );
        let mut langs: Vec<_> = stats.languages.iter().collect();
        langs.sort_by(|a, b| b.1.cmp(a.1));
        for (lang, lines) in langs {
            println!("    {lang:<20} {lines:>8}");
        }
    }
    if let Some(summary) = &report.summary_content {
        println!();
        println!("{summary}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_date_is_midnight_utc() {
        let dt = parse_date("2025-03-01").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-03-01T00:00:00+00:00");
    }

    #[test]
    fn parse_rfc3339_converts_to_utc() {
        let dt = parse_date("2025-03-01T02:00:00+02:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-03-01T00:00:00+00:00");
    }

    #[test]
    fn parse_garbage_fails() {
        let err = parse_date("last tuesday").unwrap_err();
        assert!(format!("{err:#}").contains("Invalid date"));
    }
}
