use anyhow::Result;
use colored::Colorize;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::io::Write;
use std::time::Duration;

use colonie_core::{Record, ReportId, Value};

use crate::util::{csv_cell, markdown_cell};

/// Evaluated reports in request order.
pub type ReportResults = [(ReportId, Vec<Record>)];

const ABSENT: &str = "n/a";

/// Serializes as an object keyed by report id, preserving request order.
struct ReportSet<'a>(&'a ReportResults);

impl Serialize for ReportSet<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, records) in self.0 {
            map.serialize_entry(id.slug(), records)?;
        }
        map.end()
    }
}

fn columns(records: &[Record]) -> Vec<&'static str> {
    records
        .first()
        .map(|record| record.names().collect())
        .unwrap_or_default()
}

fn cell(value: &Value) -> String {
    if value.is_absent() {
        ABSENT.to_string()
    } else {
        value.to_string()
    }
}

/// One report is written as a bare array, several as an object keyed by id.
pub fn generate_json_report<W: Write + ?Sized>(
    writer: &mut W,
    results: &ReportResults,
) -> Result<()> {
    let json_output = match results {
        [(_, records)] => serde_json::to_string_pretty(records)?,
        _ => serde_json::to_string_pretty(&ReportSet(results))?,
    };
    writeln!(writer, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report<W: Write + ?Sized>(
    writer: &mut W,
    results: &ReportResults,
) -> Result<()> {
    writeln!(writer, "# Colonie Robot Ethics Dashboard\n")?;
    for (id, records) in results {
        writeln!(writer, "## {id}\n")?;
        writeln!(writer, "_{}_\n", id.description())?;
        if records.is_empty() {
            writeln!(writer, "_No data._\n")?;
            continue;
        }
        let header = columns(records);
        writeln!(writer, "| {} |", header.join(" | "))?;
        writeln!(
            writer,
            "|{}",
            header.iter().map(|_| " --- |").collect::<String>()
        )?;
        for record in records {
            let cells: Vec<_> = record
                .fields()
                .iter()
                .map(|(_, value)| markdown_cell(&cell(value)))
                .collect();
            writeln!(writer, "| {} |", cells.join(" | "))?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Every row is prefixed with its report id; each report starts with a
/// header row of its own.
pub fn generate_csv_report<W: Write + ?Sized>(
    writer: &mut W,
    results: &ReportResults,
) -> Result<()> {
    for (index, (id, records)) in results.iter().enumerate() {
        if index > 0 {
            writeln!(writer)?;
        }
        let header = columns(records);
        let mut line = vec!["report".to_string()];
        line.extend(header.iter().map(|name| csv_cell(name)));
        writeln!(writer, "{}", line.join(","))?;
        for record in records {
            let mut line = vec![id.slug().to_string()];
            line.extend(record.fields().iter().map(|(_, value)| match value {
                Value::Absent => String::new(),
                other => csv_cell(&other.to_string()),
            }));
            writeln!(writer, "{}", line.join(","))?;
        }
    }
    Ok(())
}

pub fn generate_console_report<W: Write + ?Sized>(
    writer: &mut W,
    results: &ReportResults,
    total_duration: Duration,
) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "📊 Report Results".bright_cyan().bold())?;
    writeln!(writer, "{}", "=================".cyan())?;

    for (id, records) in results {
        writeln!(writer)?;
        writeln!(writer, "{} {}", id.slug().bold(), format!("({})", id.description()).dimmed())?;
        if records.is_empty() {
            writeln!(writer, "   {}", "no data".yellow())?;
            continue;
        }

        let header = columns(records);
        let rows: Vec<Vec<String>> = records
            .iter()
            .map(|record| record.fields().iter().map(|(_, value)| cell(value)).collect())
            .collect();
        let widths: Vec<usize> = header
            .iter()
            .enumerate()
            .map(|(col, name)| {
                rows.iter()
                    .filter_map(|row| row.get(col))
                    .map(|text| text.chars().count())
                    .chain(std::iter::once(name.len()))
                    .max()
                    .unwrap_or_default()
            })
            .collect();

        let header_line: Vec<_> = header
            .iter()
            .zip(&widths)
            .map(|(name, width)| format!("{name:<width$}"))
            .collect();
        writeln!(writer, "   {}", header_line.join("  ").underline())?;
        for row in &rows {
            let line: Vec<_> = row
                .iter()
                .zip(&widths)
                .map(|(text, width)| {
                    let padded = format!("{text:<width$}");
                    if text == ABSENT {
                        padded.dimmed().to_string()
                    } else {
                        padded
                    }
                })
                .collect();
            writeln!(writer, "   {}", line.join("  "))?;
        }
    }

    writeln!(writer)?;
    writeln!(writer, "Reports: {}", results.len().to_string().green())?;
    writeln!(writer, "Total time: {total_duration:?}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<(ReportId, Vec<Record>)> {
        vec![
            (
                ReportId::ActionKinds,
                vec![
                    Record::new()
                        .with("kind", Value::Text("Negotiation, calm".into()))
                        .with("count", Value::Integer(4)),
                ],
            ),
            (
                ReportId::PerformanceByModel,
                vec![
                    Record::new()
                        .with("model", Value::Text("Service-A".into()))
                        .with("total_actions", Value::Integer(0))
                        .with("success_rate", Value::Absent),
                ],
            ),
        ]
    }

    #[test]
    fn json_keeps_request_order_and_nulls() {
        let mut buffer = Vec::new();
        generate_json_report(&mut buffer, &sample()).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let kinds = text.find("action-kinds").unwrap();
        let models = text.find("performance-by-model").unwrap();
        assert!(kinds < models);
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(parsed["performance-by-model"][0]["success_rate"].is_null());
    }

    #[test]
    fn json_single_report_is_bare_array() {
        let mut buffer = Vec::new();
        generate_json_report(&mut buffer, &sample()[..1]).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed[0]["count"], 4);
    }

    #[test]
    fn csv_prefixes_rows_and_blanks_absent() {
        let mut buffer = Vec::new();
        generate_csv_report(&mut buffer, &sample()).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("report,kind,count\naction-kinds,\"Negotiation, calm\",4\n"));
        assert!(text.contains("performance-by-model,Service-A,0,\n"));
    }

    #[test]
    fn markdown_renders_tables() {
        let mut buffer = Vec::new();
        generate_markdown_report(&mut buffer, &sample()).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("## performance-by-model"));
        assert!(text.contains("| model | total_actions | success_rate |"));
        assert!(text.contains("| Service-A | 0 | n/a |"));
    }

    #[test]
    fn console_lists_every_report() {
        colored::control::set_override(false);
        let mut buffer = Vec::new();
        generate_console_report(&mut buffer, &sample(), Duration::from_millis(5)).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("action-kinds"));
        assert!(text.contains("n/a"));
        assert!(text.contains("Reports: 2"));
    }
}
