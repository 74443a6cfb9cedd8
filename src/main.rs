use std::path::PathBuf;
use anyhow::Context;
use clap::{Parser, ValueEnum, ColorChoice, ArgAction, CommandFactory};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};
use is_terminal::IsTerminal;
mod accumulator;
mod filter;
mod loader;
mod markdown;
mod pipeline;
mod record;
mod render;
mod report;
mod sources;

use loader::{InputFormat, LoadOptions};
use pipeline::{Outcome, RunOptions};
use render::{paint, ENABLE_COLOR};

const DEFAULT_REPORT: &str = "average";
const DEFAULT_CONFIG: &str = "logreport.toml";

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum OutputFmt { Text, Json }

#[derive(Clone, Copy, Debug, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum LogLevel { Error, Warn, Info, Debug, Trace }

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum LogFormat { Text, Json }

#[derive(Parser, Debug)]
#[command(
    name = "logreport",
    about = "Summarise JSON access logs into tabular reports",
    long_about = "Reads newline-delimited (or array-form) JSON access logs, optionally keeps a single calendar day, and prints either the average response time per endpoint or the browser distribution.",
    after_long_help = "Examples:\n  logreport --file access.log\n  logreport --file a.log b.log --report user_agent\n  logreport --file logs/ --glob '*.log' --date 2025-06-22 --output json\n  logreport --file access.log --csv-path report.csv --md-path report.md",
    color = ColorChoice::Auto
)]
struct Args {
    /// Log files or directories to read
    #[arg(long, num_args = 1.., required_unless_present = "completions")]
    file: Vec<PathBuf>,
    /// Report to build: average | user_agent [default: average]
    #[arg(long, short = 'r')]
    report: Option<String>,
    /// Keep only records whose @timestamp falls on this day (YYYY-MM-DD)
    #[arg(long, short = 'd')]
    date: Option<String>,
    /// Fail instead of ignoring an unparseable --date
    #[arg(long, default_value_t = false)]
    strict_date: bool,
    #[arg(long, value_enum)]
    input_format: Option<InputFormat>,
    /// File-name pattern applied when --file names a directory
    #[arg(long, short = 'g')]
    glob: Option<String>,
    #[arg(long, short = 'o', value_enum)]
    output: Option<OutputFmt>,
    #[arg(long, short = 'j')]
    json_path: Option<String>,
    #[arg(long)]
    csv_path: Option<String>,
    #[arg(long)]
    md_path: Option<String>,
    #[arg(long, short = 'C', default_value_t = false)]
    no_color: bool,
    #[arg(long, default_value_t = false)]
    force_color: bool,
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
    #[arg(short = 'q', long, default_value_t = false)]
    quiet: bool,
    #[arg(long)]
    log_level: Option<LogLevel>,
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
    #[arg(long)]
    log_path: Option<String>,
    #[arg(long, default_value_t = false)]
    progress: bool,
    /// TOML config file (default ./logreport.toml when present)
    #[arg(long)]
    config: Option<String>,
    #[arg(long, value_enum)]
    completions: Option<Shell>,
    #[arg(long)]
    completions_out: Option<String>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            file: vec![],
            report: None,
            date: None,
            strict_date: false,
            input_format: None,
            glob: None,
            output: None,
            json_path: None,
            csv_path: None,
            md_path: None,
            no_color: false,
            force_color: false,
            verbose: 0,
            quiet: false,
            log_level: None,
            log_format: None,
            log_path: None,
            progress: false,
            config: None,
            completions: None,
            completions_out: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct AppConfig {
    report: Option<String>,
    date: Option<String>,
    strict_date: Option<bool>,
    input_format: Option<InputFormat>,
    glob: Option<String>,
    output: Option<OutputFmt>,
    json_path: Option<String>,
    csv_path: Option<String>,
    md_path: Option<String>,
    no_color: Option<bool>,
    progress: Option<bool>,
    log_format: Option<LogFormat>,
    log_path: Option<String>,
}

fn main() {
    let mut args = Args::parse();
    if let Some(sh) = args.completions {
        write_completions(sh, args.completions_out.as_deref());
        return;
    }
    let deferred = match load_config(args.config.as_deref()) {
        Ok(Some(cfg)) => { apply_config(&mut args, cfg); None }
        Ok(None) => None,
        Err(e) if args.config.is_some() => { eprintln!("Error: {:#}", e); std::process::exit(1); }
        Err(e) => Some(e),
    };
    init_logging(&args);
    if let Some(e) = deferred { log::warn!("Ignoring {}: {:#}", DEFAULT_CONFIG, e); }
    let term = std::env::var("TERM").unwrap_or_default();
    let no_color_env = std::env::var_os("NO_COLOR").is_some();
    let color_default = std::io::stdout().is_terminal() && !no_color_env && term != "dumb";
    let enable_color = if args.force_color { true } else { color_default && !args.no_color };
    let _ = ENABLE_COLOR.set(enable_color);
    if let Err(e) = run(&args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Write shell completions to `out`, falling back to stdout when it cannot be created.
fn write_completions(sh: Shell, out: Option<&str>) {
    let mut cmd = Args::command();
    if let Some(path) = out {
        match std::fs::File::create(path) {
            Ok(mut f) => { clap_complete::generate(sh, &mut cmd, "logreport", &mut f); return; }
            Err(e) => eprintln!("Failed to create completions file {}: {}; writing to stdout", path, e),
        }
    }
    clap_complete::generate(sh, &mut cmd, "logreport", &mut std::io::stdout());
}

fn load_config(path: Option<&str>) -> anyhow::Result<Option<AppConfig>> {
    let p = match path {
        Some(p) => p,
        None if std::path::Path::new(DEFAULT_CONFIG).is_file() => DEFAULT_CONFIG,
        None => return Ok(None),
    };
    let s = std::fs::read_to_string(p).with_context(|| format!("failed to read config {}", p))?;
    let cfg = toml::from_str::<AppConfig>(&s).with_context(|| format!("failed to parse config {}", p))?;
    Ok(Some(cfg))
}

fn apply_config(args: &mut Args, cfg: AppConfig) {
    if args.report.is_none() { args.report = cfg.report; }
    if args.date.is_none() { args.date = cfg.date; }
    if !args.strict_date { if let Some(v) = cfg.strict_date { args.strict_date = v; } }
    if args.input_format.is_none() { args.input_format = cfg.input_format; }
    if args.glob.is_none() { args.glob = cfg.glob; }
    if args.output.is_none() { args.output = cfg.output; }
    if args.json_path.is_none() { args.json_path = cfg.json_path; }
    if args.csv_path.is_none() { args.csv_path = cfg.csv_path; }
    if args.md_path.is_none() { args.md_path = cfg.md_path; }
    if !args.no_color { if let Some(v) = cfg.no_color { args.no_color = v; } }
    if !args.progress { if let Some(v) = cfg.progress { args.progress = v; } }
    if args.log_format.is_none() { args.log_format = cfg.log_format; }
    if args.log_path.is_none() { args.log_path = cfg.log_path; }
}

fn level_filter(args: &Args) -> Option<log::LevelFilter> {
    if args.quiet { return Some(log::LevelFilter::Error); }
    if let Some(lvl) = args.log_level {
        return Some(match lvl { LogLevel::Error => log::LevelFilter::Error, LogLevel::Warn => log::LevelFilter::Warn, LogLevel::Info => log::LevelFilter::Info, LogLevel::Debug => log::LevelFilter::Debug, LogLevel::Trace => log::LevelFilter::Trace });
    }
    match args.verbose {
        0 => None,
        1 => Some(log::LevelFilter::Info),
        2 => Some(log::LevelFilter::Debug),
        _ => Some(log::LevelFilter::Trace),
    }
}

fn init_logging(args: &Args) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(f) = level_filter(args) { builder.filter_level(f); }
    match args.log_format {
        Some(LogFormat::Json) => {
            builder.format(|buf, record| {
                use std::io::Write;
                let ts = chrono::Local::now().to_rfc3339();
                let obj = serde_json::json!({
                    "ts": ts,
                    "level": record.level().to_string(),
                    "target": record.target(),
                    "msg": record.args().to_string(),
                });
                writeln!(buf, "{}", obj)
            });
        }
        Some(LogFormat::Text) => {
            builder.format(|buf, record| {
                use std::io::Write;
                let ts = chrono::Local::now().format("%H:%M:%S");
                writeln!(buf, "[{:<5} {}] {}", record.level(), ts, record.args())
            });
        }
        None => {}
    }
    if let Some(path) = args.log_path.as_ref() {
        match std::fs::File::create(path) {
            Ok(f) => { builder.target(env_logger::Target::Pipe(Box::new(f))); }
            Err(e) => { eprintln!("Failed to open log file {}: {}", path, e); }
        }
    }
    builder.init();
}

fn run_options(args: &Args) -> RunOptions {
    RunOptions {
        date: args.date.clone(),
        strict_date: args.strict_date,
        load: LoadOptions { format: args.input_format.unwrap_or(InputFormat::Auto), progress: args.progress },
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let token = args.report.as_deref().unwrap_or(DEFAULT_REPORT);
    let paths = sources::resolve_paths(&args.file, args.glob.as_deref())?;
    match pipeline::run(&paths, token, &run_options(args))? {
        Outcome::NoRecords => {
            match args.date.as_deref().filter(|d| !d.is_empty()) {
                Some(d) => println!("No logs to process for the given criteria (date: {})", d),
                None => println!("No logs to process for the given criteria"),
            }
            Ok(())
        }
        Outcome::Report(out) => emit(args, &out),
    }
}

fn emit(args: &Args, out: &report::ReportOutput) -> anyhow::Result<()> {
    match args.output.unwrap_or(OutputFmt::Text) {
        OutputFmt::Text => println!("{}", render::render_text(out)),
        OutputFmt::Json => println!("{}", render::render_json(out).context("failed to serialise report")?),
    }
    if let Some(p) = args.json_path.as_ref() {
        match render::write_json(p, out) {
            Ok(_) => log::info!("{}", paint(&format!("JSON written: {}", p), "1;36")),
            Err(e) => log::error!("JSON write failed for {}: {}", p, e),
        }
    }
    if let Some(p) = args.csv_path.as_ref() {
        match render::write_csv(p, out) {
            Ok(_) => log::info!("{}", paint(&format!("CSV written: {}", p), "1;36")),
            Err(e) => log::error!("CSV write failed for {}: {}", p, e),
        }
    }
    if let Some(p) = args.md_path.as_ref() {
        match std::fs::write(p, markdown::render_markdown(out)) {
            Ok(_) => log::info!("{}", paint(&format!("Markdown written: {}", p), "1;36")),
            Err(e) => log::error!("Markdown write failed for {}: {}", p, e),
        }
    }
    Ok(())
}
