use crate::report::ReportOutput;

fn md_cell(s: &str) -> String { s.replace('|', "\\|").replace('\n', " ") }

pub fn render_markdown(out: &ReportOutput) -> String {
    let mut s = String::new();
    s.push_str(&format!("# {}\n\n", out.title));
    s.push_str(&format!("| {} |\n", out.headers.iter().map(|h| md_cell(h)).collect::<Vec<_>>().join(" | ")));
    s.push_str(&format!("|{}\n", "---|".repeat(out.headers.len())));
    for row in &out.rows {
        let cells: Vec<String> = row.iter().map(|c| md_cell(&c.to_string())).collect();
        s.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    if out.rows.is_empty() { s.push_str("\n_No rows._\n"); }
    s
}
