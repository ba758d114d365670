pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Quote a CSV cell when it carries a separator, quote or line break.
pub fn csv_cell(raw: &str) -> String {
    if raw.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

/// Escape a Markdown table cell.
pub fn markdown_cell(raw: &str) -> String {
    raw.replace('|', "\\|").replace('\n', " ")
}
