//! Rendering of the ranked origin list.
use crate::input::OutputFormat;
use crate::results::ScanRecord;
use crate::scanner::ScanReport;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde_derive::Serialize;
use std::time::Duration;

const NAME_WIDTH: usize = 50;
const DOMAIN_WIDTH: usize = 30;
const LATENCY_WIDTH: usize = 15;
const SERVER_WIDTH: usize = 20;

/// JSON shape of a finished run.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    /// Region code the candidates were filtered by.
    pub region: &'a str,
    /// When the document was rendered.
    pub scanned_at: DateTime<Utc>,
    /// Candidates in the region.
    pub candidates: usize,
    /// Candidates that had a domain to probe.
    pub submitted: usize,
    /// Origin hits before truncation.
    pub origins_found: usize,
    /// Probe tasks that did not complete.
    pub failed_tasks: usize,
    /// Wall-clock duration of the scan.
    pub elapsed_ms: f64,
    /// Ranked records.
    pub results: &'a [ScanRecord],
}

/// Renders the report in the requested format. Table output is coloured
/// unless `accessible` is set.
pub fn render(
    report: &ScanReport,
    region: &str,
    candidates: usize,
    format: OutputFormat,
    accessible: bool,
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Table => Ok(table(&report.records, accessible)),
        OutputFormat::Greppable => Ok(greppable(&report.records)),
        OutputFormat::Json => json(report, region, candidates),
    }
}

/// Fixed-width table with a header row and a separator.
pub fn table(records: &[ScanRecord], accessible: bool) -> String {
    let mut out = String::new();
    let header = format!(
        "{:<NAME_WIDTH$} {:<DOMAIN_WIDTH$} {:<LATENCY_WIDTH$} {:<SERVER_WIDTH$}",
        "University", "Domain", "Latency", "Server"
    );
    if accessible {
        out.push_str(&header);
    } else {
        out.push_str(&header.bold().to_string());
    }
    out.push('\n');
    out.push_str(&"-".repeat(NAME_WIDTH + DOMAIN_WIDTH + LATENCY_WIDTH + SERVER_WIDTH + 5));
    out.push('\n');

    for record in records {
        let latency = format!("{:<LATENCY_WIDTH$}", format_latency(record.latency));
        let latency = if accessible {
            latency
        } else {
            latency.green().to_string()
        };
        out.push_str(&format!(
            "{:<NAME_WIDTH$} {:<DOMAIN_WIDTH$} {} {:<SERVER_WIDTH$}\n",
            truncate(&record.name, NAME_WIDTH - 2),
            truncate(&record.domain, DOMAIN_WIDTH - 2),
            latency,
            truncate(&record.server, SERVER_WIDTH - 2),
        ));
    }
    out
}

/// One `domain,latency_ms,server` line per record.
pub fn greppable(records: &[ScanRecord]) -> String {
    records
        .iter()
        .map(|record| {
            format!(
                "{},{:.1},{}\n",
                record.domain,
                record.latency.as_secs_f64() * 1000.0,
                record.server
            )
        })
        .collect()
}

/// Pretty-printed JSON document with counters and records.
pub fn json(report: &ScanReport, region: &str, candidates: usize) -> serde_json::Result<String> {
    let document = JsonReport {
        region,
        scanned_at: Utc::now(),
        candidates,
        submitted: report.submitted,
        origins_found: report.accepted,
        failed_tasks: report.failed_tasks,
        elapsed_ms: report.elapsed.as_secs_f64() * 1000.0,
        results: &report.records,
    };
    serde_json::to_string_pretty(&document)
}

/// Human-readable latency with millisecond precision.
pub fn format_latency(latency: Duration) -> String {
    format!("{:.3}ms", latency.as_secs_f64() * 1000.0)
}

/// Cuts `text` to `max_chars` characters, ending in `...` when shortened.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    let keep = max_chars.saturating_sub(3);
    let mut cut: String = text.chars().take(keep).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, domain: &str, ms: u64, server: &str) -> ScanRecord {
        ScanRecord {
            name: name.to_owned(),
            domain: domain.to_owned(),
            latency: Duration::from_millis(ms),
            server: server.to_owned(),
            sequence: 0,
        }
    }

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate("nginx", 18), "nginx");
        assert_eq!(truncate("exactly-ten", 11), "exactly-ten");
    }

    #[test]
    fn truncate_appends_ellipsis() {
        let cut = truncate("Massachusetts Institute of Technology", 20);
        assert_eq!(cut, "Massachusetts Ins...");
        assert_eq!(cut.chars().count(), 20);
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        let cut = truncate("Universität für Bodenkultur Wien", 12);
        assert_eq!(cut, "Universit...");
        assert_eq!(truncate("Zürich", 6), "Zürich");
    }

    #[test]
    fn accessible_table_has_plain_rows() {
        let rendered = table(&[record("Alpha University", "alpha.edu", 12, "nginx")], true);
        let lines: Vec<_> = rendered.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("University"));
        assert!(lines[1].chars().all(|c| c == '-'));
        assert!(lines[2].starts_with("Alpha University"));
        assert!(lines[2].contains("alpha.edu"));
        assert!(lines[2].contains("12.000ms"));
        assert!(lines[2].trim_end().ends_with("nginx"));
    }

    #[test]
    fn empty_table_only_has_header() {
        assert_eq!(table(&[], true).lines().count(), 2);
    }

    #[test]
    fn greppable_lines() {
        let rendered = greppable(&[
            record("A", "a.edu", 5, "nginx"),
            record("B", "b.edu", 7, ""),
        ]);
        assert_eq!(rendered, "a.edu,5.0,nginx\nb.edu,7.0,\n");
    }

    #[test]
    fn json_document_has_counters() {
        let report = ScanReport {
            records: vec![record("A", "a.edu", 5, "nginx")],
            submitted: 4,
            accepted: 2,
            failed_tasks: 1,
            elapsed: Duration::from_secs(2),
        };

        let value: serde_json::Value = serde_json::from_str(&json(&report, "NL", 5).unwrap()).unwrap();
        assert_eq!(value["region"], "NL");
        assert_eq!(value["candidates"], 5);
        assert_eq!(value["submitted"], 4);
        assert_eq!(value["origins_found"], 2);
        assert_eq!(value["failed_tasks"], 1);
        assert_eq!(value["elapsed_ms"], 2000.0);
        assert_eq!(value["results"][0]["domain"], "a.edu");
        assert_eq!(value["results"][0]["latency"], 5.0);
    }

    #[test]
    fn render_dispatches_on_format() {
        let report = ScanReport {
            records: vec![record("A", "a.edu", 5, "nginx")],
            ..ScanReport::default()
        };

        assert_eq!(
            render(&report, "US", 1, OutputFormat::Greppable, false).unwrap(),
            "a.edu,5.0,nginx\n"
        );
        assert!(render(&report, "US", 1, OutputFormat::Table, true)
            .unwrap()
            .contains("a.edu"));
        assert!(render(&report, "US", 1, OutputFormat::Json, false)
            .unwrap()
            .contains("\"region\": \"US\""));
    }

    #[test]
    fn json_with_no_results_is_a_full_document() {
        let value: serde_json::Value =
            serde_json::from_str(&json(&ScanReport::default(), "FI", 3).unwrap()).unwrap();

        assert_eq!(value["region"], "FI");
        assert_eq!(value["candidates"], 3);
        assert_eq!(value["results"], serde_json::json!([]));
    }
}
