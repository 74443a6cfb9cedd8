use crate::filter::filter_by_date;
use crate::loader::{load, LoadOptions};
use crate::record::LogRecord;
use crate::report::{ReportKind, ReportOutput};
use anyhow::anyhow;
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Report(ReportOutput),
    /// Nothing survived loading and filtering; no report was built.
    NoRecords,
}

#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    pub date: Option<String>,
    pub strict_date: bool,
    pub load: LoadOptions,
}

pub fn resolve_report(token: &str) -> anyhow::Result<ReportKind> {
    ReportKind::lookup(token).ok_or_else(|| anyhow!("report '{}' not found (available: {})", token, ReportKind::tokens().join(", ")))
}

/// Load, filter and aggregate `paths` into the report named by `token`.
pub fn run(paths: &[PathBuf], token: &str, opts: &RunOptions) -> anyhow::Result<Outcome> {
    let kind = resolve_report(token)?;
    let loaded = load(paths, opts.load);
    summarize(loaded.records, kind, opts.date.as_deref(), opts.strict_date)
}

pub fn summarize(records: Vec<LogRecord>, kind: ReportKind, date: Option<&str>, strict_date: bool) -> anyhow::Result<Outcome> {
    let records = filter_by_date(records, date, strict_date)?;
    if records.is_empty() {
        log::info!("No records left after filtering");
        return Ok(Outcome::NoRecords);
    }
    Ok(Outcome::Report(kind.generate(&records, date)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Cell;

    fn two_day_log() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("access.log");
        std::fs::write(&p, concat!(
            "{\"@timestamp\": \"2025-10-25T10:00:00+00:00\", \"url\": \"/api/today\", \"response_time\": 0.5, \"http_user_agent\": \"Mozilla/5.0 Firefox/120.0\"}\n",
            "{\"@timestamp\": \"2025-10-26T11:00:00+00:00\", \"url\": \"/api/tomorrow\", \"response_time\": 0.1}\n",
        )).unwrap();
        (dir, p)
    }

    #[test]
    fn date_filtered_average_report() {
        let (_dir, p) = two_day_log();
        let opts = RunOptions { date: Some("2025-10-25".into()), ..Default::default() };
        let Outcome::Report(out) = run(&[p], "average", &opts).unwrap() else { panic!("expected a report") };
        assert!(out.title.ends_with("for 2025-10-25"));
        assert_eq!(out.rows, vec![vec![Cell::Text("/api/today".into()), Cell::Count(1), Cell::Float(0.5)]]);
    }

    #[test]
    fn user_agent_report_over_file() {
        let (_dir, p) = two_day_log();
        let Outcome::Report(out) = run(&[p], "user_agent", &RunOptions::default()).unwrap() else { panic!("expected a report") };
        assert_eq!(out.title, "Browser report");
        assert_eq!(out.rows, vec![vec![Cell::Text("Firefox".into()), Cell::Count(1)]]);
    }

    #[test]
    fn no_matching_day_short_circuits() {
        let (_dir, p) = two_day_log();
        let opts = RunOptions { date: Some("2024-01-01".into()), ..Default::default() };
        assert_eq!(run(&[p], "average", &opts).unwrap(), Outcome::NoRecords);
        assert_eq!(run(&[PathBuf::from("definitely-missing.log")], "average", &RunOptions::default()).unwrap(), Outcome::NoRecords);
    }

    #[test]
    fn unknown_report_is_fatal() {
        let (_dir, p) = two_day_log();
        let err = run(&[p], "latency", &RunOptions::default()).unwrap_err();
        assert!(err.to_string().contains("report 'latency' not found"));
    }

    #[test]
    fn strict_date_rejects_bad_input() {
        let (_dir, p) = two_day_log();
        let lenient = RunOptions { date: Some("25/10/2025".into()), ..Default::default() };
        let Outcome::Report(out) = run(&[p.clone()], "average", &lenient).unwrap() else { panic!("expected a report") };
        assert_eq!(out.rows.len(), 2);
        assert!(out.title.ends_with("for 25/10/2025"));
        let strict = RunOptions { strict_date: true, ..lenient };
        assert!(run(&[p], "average", &strict).is_err());
    }

    #[test]
    fn repeated_runs_are_identical() {
        let (_dir, p) = two_day_log();
        let a = run(&[p.clone()], "average", &RunOptions::default()).unwrap();
        let b = run(&[p], "average", &RunOptions::default()).unwrap();
        assert_eq!(a, b);
    }
}
