use crate::error::{AppError, Result};
use crate::types::UpgradeRecord;
use crate::util::{normalize_diff_text, parse_leading_float, split_fields, strip_bom, strip_quotes};
use std::cmp::Ordering;
use std::mem::take;
use std::path::Path;
use tracing::{debug, warn};

/// Number of logical columns: period, client, vendor, process, plan, diff.
const COLUMNS: usize = 6;

/// What happened to the lines of one export while parsing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    /// Lines after the header, blank ones included.
    pub data_lines: usize,
    pub blank_lines: usize,
    /// Rows whose six fields were all empty.
    pub empty_rows: usize,
    /// Rows with no client, vendor or plan and a zero diff.
    pub blank_identity_rows: usize,
    /// Diff values that were not a sentinel but still failed to parse.
    pub unparseable_diffs: usize,
    pub records: usize,
}

/// Parse a semicolon-delimited upgrade export into records sorted by `diff`,
/// largest first.
///
/// The first line is a header and is always discarded. Malformed input never
/// fails: short rows are padded, bad numbers become `0.0`.
pub fn parse(text: &str) -> Vec<UpgradeRecord> {
    parse_with_report(text).0
}

/// Same as [`parse`], plus counts of what was skipped or coerced.
pub fn parse_with_report(text: &str) -> (Vec<UpgradeRecord>, ParseReport) {
    let mut report = ParseReport::default();
    let mut records: Vec<UpgradeRecord> = Vec::new();

    let text = strip_bom(text);
    for line in text.split('\n').skip(1) {
        report.data_lines += 1;
        // `trim` also takes care of a `\r` left over from CRLF endings.
        let line = line.trim();
        if line.is_empty() {
            report.blank_lines += 1;
            continue;
        }

        let mut cols: Vec<String> = split_fields(line)
            .into_iter()
            .take(COLUMNS)
            .map(strip_quotes)
            .collect();
        cols.resize(COLUMNS, String::new());
        if cols.iter().all(|c| c.is_empty()) {
            report.empty_rows += 1;
            continue;
        }

        let normalized = normalize_diff_text(&cols[5]);
        if cols[1].is_empty() && cols[2].is_empty() && cols[4].is_empty() && normalized == "0" {
            report.blank_identity_rows += 1;
            continue;
        }

        let diff = match parse_leading_float(&normalized) {
            Some(v) => v,
            None => {
                debug!(raw = %cols[5], "diff did not parse, using 0");
                report.unparseable_diffs += 1;
                0.0
            }
        };

        records.push(UpgradeRecord {
            period: take(&mut cols[0]),
            client: take(&mut cols[1]),
            vendor: take(&mut cols[2]),
            process: take(&mut cols[3]),
            plan: take(&mut cols[4]),
            diff,
            raw_diff: take(&mut cols[5]),
        });
    }

    // `sort_by` is stable, so equal diffs keep file order.
    records.sort_by(|a, b| b.diff.partial_cmp(&a.diff).unwrap_or(Ordering::Equal));
    report.records = records.len();
    debug!(?report, "parsed upgrade export");
    (records, report)
}

/// Read an export from disk as UTF-8 text.
///
/// Invalid byte sequences are replaced with U+FFFD rather than rejected.
pub fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|source| AppError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            warn!(path = %path.display(), "file is not valid UTF-8, replacing invalid bytes");
            Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Periodo;Cliente;Vendedor;Processo;Plano;Diferenca";

    #[test]
    fn empty_and_header_only_inputs() {
        assert!(parse("").is_empty());
        assert!(parse("   \n  ").is_empty());
        assert!(parse(HEADER).is_empty());
        assert!(parse(&format!("{HEADER}\n")).is_empty());
    }

    #[test]
    fn end_to_end_example() {
        let text = "h1;h2;h3;h4;h5;h6\n;Alice;Bob;P1;Gold;1.234,56\n;Carol;Dan;P2;Silver;-\n";
        let records = parse(text);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].vendor, "Bob");
        assert_eq!(records[0].client, "Alice");
        assert_eq!(records[0].plan, "Gold");
        assert_eq!(records[0].diff, 1234.56);
        assert_eq!(records[0].raw_diff, "1.234,56");
        assert_eq!(records[1].vendor, "Dan");
        assert_eq!(records[1].diff, 0.0);
        assert_eq!(records[1].raw_diff, "-");
    }

    #[test]
    fn strips_bom_and_handles_crlf() {
        let text = format!("\u{feff}{HEADER}\r\n2024-01;C;V;P;Gold;10,5\r\n");
        let records = parse(&text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].period, "2024-01");
        assert_eq!(records[0].diff, 10.5);
    }

    #[test]
    fn short_rows_are_padded_and_extra_columns_ignored() {
        let text = format!("{HEADER}\n;Client;Vendor\n;C;V;P;Plan;5;extra;more\n");
        let records = parse(&text);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].diff, 5.0);
        assert_eq!(records[0].plan, "Plan");
        assert_eq!(records[1].vendor, "Vendor");
        assert_eq!(records[1].plan, "");
        assert_eq!(records[1].raw_diff, "");
        assert_eq!(records[1].diff, 0.0);
    }

    #[test]
    fn quoted_fields_keep_semicolons() {
        let text = format!("{HEADER}\n\"jan;fev\";\"Acme; Ltd\";Ana;P;Gold;\"1.000,00\"\n");
        let records = parse(&text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].period, "jan;fev");
        assert_eq!(records[0].client, "Acme; Ltd");
        assert_eq!(records[0].diff, 1000.0);
    }

    #[test]
    fn delimiter_only_rows_are_dropped() {
        let text = format!("{HEADER}\n;;;;;\n\"\";\"\";;;;\n;;;P9;;0\n");
        let (records, report) = parse_with_report(&text);
        assert!(records.is_empty());
        assert_eq!(report.empty_rows, 2);
        assert_eq!(report.blank_identity_rows, 1);
    }

    #[test]
    fn blank_identity_rule_uses_normalized_text() {
        // "0,00" normalizes to "0.00", which is not the literal "0".
        let text = format!("{HEADER}\n2024;;;P1;;0,00\n2024;;;P2;;n/a\n");
        let records = parse(&text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].process, "P1");
        assert_eq!(records[0].diff, 0.0);
    }

    #[test]
    fn sorted_descending_and_stable() {
        let text = format!("{HEADER}\n;a;V1;first;X;10\n;b;V2;P;X;30\n;c;V3;second;X;10\n;d;V4;P;X;-5\n");
        let records = parse(&text);
        let diffs: Vec<f64> = records.iter().map(|r| r.diff).collect();
        assert_eq!(diffs, vec![30.0, 10.0, 10.0, -5.0]);
        assert_eq!(records[1].process, "first");
        assert_eq!(records[2].process, "second");
        assert!(records.windows(2).all(|w| w[0].diff >= w[1].diff));
    }

    #[test]
    fn unparseable_diff_becomes_zero_and_is_counted() {
        let text = format!("{HEADER}\n;C;V;P;Gold;abc\n;C;V;P;Gold;1e999\n");
        let (records, report) = parse_with_report(&text);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.diff == 0.0 && r.diff.is_finite()));
        assert_eq!(report.unparseable_diffs, 2);
        assert_eq!(records[0].raw_diff, "abc");
    }

    #[test]
    fn report_counts_lines() {
        let text = format!("{HEADER}\n;C;V;P;Gold;1\n\n;;;;;\n");
        let (_, report) = parse_with_report(&text);
        assert_eq!(report.data_lines, 4);
        assert_eq!(report.blank_lines, 2);
        assert_eq!(report.empty_rows, 1);
        assert_eq!(report.records, 1);
    }

    #[test]
    fn parse_is_deterministic() {
        let text = format!("{HEADER}\n;C;B;P;Gold;2\n;C;A;P;Gold;2\n;C;C;P;Silver;3,5\n");
        assert_eq!(parse(&text), parse(&text));
    }

    #[test]
    fn read_text_reports_missing_file() {
        let err = read_text(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, AppError::FileRead { .. }));
    }

    #[test]
    fn read_text_replaces_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, b"h\n;C;V;P;Gold;1\xff\n").unwrap();
        let text = read_text(&path).unwrap();
        assert!(text.contains('\u{fffd}'));
        assert_eq!(parse(&text)[0].diff, 1.0);
    }
}
