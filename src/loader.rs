use crate::record::LogRecord;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// Array when the file starts with `[`, newline-delimited otherwise.
    Auto,
    Lines,
    Array,
}

#[derive(Clone, Copy, Debug)]
pub struct LoadOptions {
    pub format: InputFormat,
    pub progress: bool,
}

impl Default for LoadOptions {
    fn default() -> Self { Self { format: InputFormat::Auto, progress: false } }
}

#[derive(Clone, Debug, Default)]
pub struct LoadSummary {
    pub records: Vec<LogRecord>,
    pub files_read: usize,
    pub files_skipped: usize,
    pub lines_skipped: usize,
}

/// Read every path in order. Missing or unreadable files and malformed lines
/// are logged and skipped; nothing here aborts the batch.
pub fn load(paths: &[PathBuf], opts: LoadOptions) -> LoadSummary {
    let mut summary = LoadSummary::default();
    let pb = if opts.progress { Some(indicatif::ProgressBar::new_spinner()) } else { None };
    for p in paths {
        if let Some(ref pb) = pb { pb.set_message(format!("Reading {}", p.to_string_lossy())); pb.tick(); }
        let bytes = match std::fs::read(p) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::error!("File not found: {}", p.to_string_lossy());
                summary.files_skipped += 1;
                continue;
            }
            Err(e) => {
                log::error!("Failed to read {}: {}", p.to_string_lossy(), e);
                summary.files_skipped += 1;
                continue;
            }
        };
        let text = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes[..]);
        let format = match opts.format {
            InputFormat::Auto => detect_format(text),
            f => f,
        };
        match format {
            InputFormat::Array => match parse_array(text) {
                Ok(mut recs) => {
                    log::debug!("{}: {} record(s) (array)", p.to_string_lossy(), recs.len());
                    summary.records.append(&mut recs);
                    summary.files_read += 1;
                }
                Err(e) => {
                    log::error!("Invalid JSON array in {}: {}", p.to_string_lossy(), e);
                    summary.files_skipped += 1;
                }
            },
            _ => {
                let before = summary.records.len();
                summary.lines_skipped += parse_lines(p, text, &mut summary.records);
                log::debug!("{}: {} record(s) (lines)", p.to_string_lossy(), summary.records.len() - before);
                summary.files_read += 1;
            }
        }
    }
    if let Some(pb) = pb { pb.finish_and_clear(); }
    log::info!(
        "Loaded {} record(s) from {} file(s); {} file(s) and {} line(s) skipped",
        summary.records.len(), summary.files_read, summary.files_skipped, summary.lines_skipped
    );
    summary
}

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

fn detect_format(text: &[u8]) -> InputFormat {
    if text.trim_ascii_start().starts_with(b"[") { InputFormat::Array } else { InputFormat::Lines }
}

/// Parse newline-delimited objects into `out`, returning the number of rejected lines.
/// UTF-8 is validated per line, so a stray byte only costs its own line.
fn parse_lines(path: &Path, text: &[u8], out: &mut Vec<LogRecord>) -> usize {
    let mut skipped = 0;
    for (idx, line) in text.split(|b| *b == b'\n').enumerate() {
        let line = line.trim_ascii();
        if line.is_empty() { continue; }
        match serde_json::from_slice::<Value>(line) {
            Ok(Value::Object(map)) => out.push(map),
            Ok(_) => {
                log::warn!("{}:{}: expected a JSON object, skipping line", path.to_string_lossy(), idx + 1);
                skipped += 1;
            }
            Err(e) => {
                log::warn!("{}:{}: invalid JSON ({}), skipping line", path.to_string_lossy(), idx + 1, e);
                skipped += 1;
            }
        }
    }
    skipped
}

/// All-or-nothing: one bad element rejects the whole file.
fn parse_array(text: &[u8]) -> Result<Vec<LogRecord>, serde_json::Error> {
    serde_json::from_slice::<Vec<LogRecord>>(text)
}
