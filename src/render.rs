use crate::report::ReportOutput;
use comfy_table::{ContentArrangement, Table};
use std::sync::OnceLock;

pub static ENABLE_COLOR: OnceLock<bool> = OnceLock::new();

pub fn paint(s: &str, code: &str) -> String {
    if *ENABLE_COLOR.get().unwrap_or(&false) { format!("\x1b[{}m{}\x1b[0m", code, s) } else { s.to_string() }
}

fn table_rows(out: &ReportOutput) -> impl Iterator<Item = Vec<String>> + '_ {
    out.rows.iter().map(|r| r.iter().map(|c| c.to_string()).collect())
}

pub fn render_text(out: &ReportOutput) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(out.headers.iter().map(|h| paint(h, "1")).collect::<Vec<String>>());
    for row in table_rows(out) { table.add_row(row); }
    format!("\n{}\n\n{}", paint(&out.title, "1;36"), table)
}

pub fn render_json(out: &ReportOutput) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(out)
}

pub fn write_json(path: &str, out: &ReportOutput) -> Result<(), std::io::Error> {
    let body = serde_json::to_vec_pretty(out)?;
    std::fs::write(path, body)
}

pub fn write_csv(path: &str, out: &ReportOutput) -> Result<(), std::io::Error> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(&out.headers)?;
    for row in table_rows(out) { wtr.write_record(&row)?; }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Cell;

    fn sample() -> ReportOutput {
        ReportOutput {
            title: "Browser report for 2025-06-22".to_string(),
            headers: vec!["User-Agent".to_string(), "total".to_string()],
            rows: vec![
                vec![Cell::Text("Chrome".into()), Cell::Count(2)],
                vec![Cell::Text("Other".into()), Cell::Count(1)],
            ],
        }
    }

    #[test]
    fn text_has_title_and_rows() {
        let s = render_text(&sample());
        assert!(s.contains("Browser report for 2025-06-22"));
        assert!(s.contains("User-Agent"));
        let chrome = s.find("Chrome").unwrap();
        let other = s.find("Other").unwrap();
        assert!(chrome < other);
    }

    #[test]
    fn json_shape() {
        let v: serde_json::Value = serde_json::from_str(&render_json(&sample()).unwrap()).unwrap();
        assert_eq!(v["title"], "Browser report for 2025-06-22");
        assert_eq!(v["rows"][0][1], 2);
        assert_eq!(v["headers"][1], "total");
    }

    #[test]
    fn csv_and_json_files_written() {
        let dir = tempfile::tempdir().unwrap();
        let csv_p = dir.path().join("r.csv");
        let json_p = dir.path().join("r.json");
        write_csv(&csv_p.to_string_lossy(), &sample()).unwrap();
        write_json(&json_p.to_string_lossy(), &sample()).unwrap();
        assert_eq!(std::fs::read_to_string(&csv_p).unwrap(), "User-Agent,total\nChrome,2\nOther,1\n");
        assert!(std::fs::read_to_string(&json_p).unwrap().contains("\"Chrome\""));
    }
}
