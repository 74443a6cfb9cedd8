use crate::accumulator::Tally;
use crate::record::{endpoint, number_field, str_field, LogRecord, RESPONSE_TIME_FIELD, USER_AGENT_FIELD};
use serde::Serialize;
use std::fmt;

/// One table cell of a rendered report.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Count(u64),
    Float(f64),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Count(n) => write!(f, "{}", n),
            Cell::Float(x) => write!(f, "{}", x),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReportOutput {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// A two-stage report: fold records into counters, then lay the counters out as a table.
pub trait Report {
    type Counters;
    fn process(&self, records: &[LogRecord]) -> Self::Counters;
    fn render(&self, counters: &Self::Counters, date: Option<&str>) -> ReportOutput;
}

fn titled(base: &str, date: Option<&str>) -> String {
    match date {
        Some(d) if !d.is_empty() => format!("{} for {}", base, d),
        _ => base.to_string(),
    }
}

fn headers(names: &[&str]) -> Vec<String> { names.iter().map(|s| s.to_string()).collect() }

/// Round half away from zero to three decimals.
fn round3(x: f64) -> f64 { (x * 1000.0).round() / 1000.0 }

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EndpointStat {
    pub count: u64,
    pub total_time: f64,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AverageResponseTime;

impl Report for AverageResponseTime {
    type Counters = Tally<String, EndpointStat>;

    fn process(&self, records: &[LogRecord]) -> Self::Counters {
        let mut stats: Tally<String, EndpointStat> = Tally::new();
        for r in records {
            let (Some(ep), Some(rt)) = (endpoint(r), number_field(r, RESPONSE_TIME_FIELD)) else { continue };
            let st = stats.entry_or_default(ep.to_string());
            st.count += 1;
            st.total_time += rt;
        }
        stats
    }

    fn render(&self, stats: &Self::Counters, date: Option<&str>) -> ReportOutput {
        let rows = stats
            .iter()
            .filter(|(_, st)| st.count > 0)
            .map(|(ep, st)| vec![
                Cell::Text(ep.clone()),
                Cell::Count(st.count),
                Cell::Float(round3(st.total_time / st.count as f64)),
            ])
            .collect();
        ReportOutput {
            title: titled("Average response-time report with request counts", date),
            headers: headers(&["handler", "total", "avg_response_time"]),
            rows,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Browser { Chrome, Firefox, Safari, Other }

impl Browser {
    /// Chrome ships a `Safari/` token too, so it is tested first.
    pub fn classify(ua: &str) -> Browser {
        if ua.contains("Chrome/") && ua.contains("Safari/") { Browser::Chrome }
        else if ua.contains("Firefox/") { Browser::Firefox }
        else if ua.contains("Safari/") { Browser::Safari }
        else { Browser::Other }
    }

    pub fn as_str(&self) -> &'static str {
        match self { Browser::Chrome => "Chrome", Browser::Firefox => "Firefox", Browser::Safari => "Safari", Browser::Other => "Other" }
    }
}

/// Placeholder some proxies log instead of the real agent string.
const ELIDED_USER_AGENT: &str = "...";

#[derive(Clone, Copy, Debug, Default)]
pub struct UserAgentClassification;

impl Report for UserAgentClassification {
    type Counters = Tally<Browser, u64>;

    fn process(&self, records: &[LogRecord]) -> Self::Counters {
        let mut counts: Tally<Browser, u64> = Tally::new();
        for r in records {
            match str_field(r, USER_AGENT_FIELD) {
                Some(ua) if !ua.is_empty() && ua != ELIDED_USER_AGENT => *counts.entry_or_default(Browser::classify(ua)) += 1,
                _ => continue,
            }
        }
        counts
    }

    fn render(&self, counts: &Self::Counters, date: Option<&str>) -> ReportOutput {
        ReportOutput {
            title: titled("Browser report", date),
            headers: headers(&["User-Agent", "total"]),
            rows: counts.iter().map(|(b, n)| vec![Cell::Text(b.as_str().to_string()), Cell::Count(*n)]).collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportKind { Average, UserAgent }

const REGISTRY: &[(&str, ReportKind)] = &[
    ("average", ReportKind::Average),
    ("user_agent", ReportKind::UserAgent),
];

impl ReportKind {
    pub fn lookup(token: &str) -> Option<ReportKind> {
        REGISTRY.iter().find(|(t, _)| *t == token).map(|(_, k)| *k)
    }

    pub fn tokens() -> Vec<&'static str> { REGISTRY.iter().map(|(t, _)| *t).collect() }

    pub fn generate(&self, records: &[LogRecord], date: Option<&str>) -> ReportOutput {
        match self {
            ReportKind::Average => run_report(&AverageResponseTime, records, date),
            ReportKind::UserAgent => run_report(&UserAgentClassification, records, date),
        }
    }
}

fn run_report<R: Report>(report: &R, records: &[LogRecord], date: Option<&str>) -> ReportOutput {
    let counters = report.process(records);
    report.render(&counters, date)
}
