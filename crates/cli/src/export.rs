//! Reconciled-table export: CSV (lossless, readable back) and XLSX.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};

use warpcheck_recon::model::{DatasetStats, ReconciledRow, Report};
use warpcheck_recon::normalize::DEFAULT_IDENTIFIER_COLUMN;

const VALUE_PREFIX: &str = "warpage(um)_";

/// Column headers for a report's reconciled table.
pub fn headers(report: &Report) -> [String; 5] {
    [
        DEFAULT_IDENTIFIER_COLUMN.to_string(),
        format!("{VALUE_PREFIX}{}", report.sources.a),
        format!("{VALUE_PREFIX}{}", report.sources.b),
        "comparable".to_string(),
        "delta".to_string(),
    ]
}

fn format_opt(v: Option<f64>) -> String {
    // `{}` on f64 prints the shortest string that parses back to the same value
    v.map(|x| x.to_string()).unwrap_or_default()
}

/// Write by file extension (`.csv` or `.xlsx`).
pub fn export(report: &Report, path: &Path) -> Result<(), String> {
    match path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()) {
        Some(ext) if ext == "csv" => write_csv(report, path),
        Some(ext) if ext == "xlsx" => write_xlsx(report, path),
        _ => Err(format!(
            "unsupported export format for {} (expected .csv or .xlsx)",
            path.display()
        )),
    }
}

pub fn write_csv(report: &Report, path: &Path) -> Result<(), String> {
    let file = std::fs::File::create(path)
        .map_err(|e| format!("cannot create {}: {e}", path.display()))?;
    write_csv_to(report, file)
}

pub fn write_csv_to<W: std::io::Write>(report: &Report, writer: W) -> Result<(), String> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(headers(report)).map_err(|e| e.to_string())?;

    for row in &report.rows {
        wtr.write_record([
            row.identifier.clone(),
            format_opt(row.value_a),
            format_opt(row.value_b),
            row.comparable.to_string(),
            format_opt(row.delta),
        ])
        .map_err(|e| e.to_string())?;
    }

    wtr.flush().map_err(|e| e.to_string())
}

/// Read an exported CSV back into reconciled rows.
pub fn read_csv(path: &Path) -> Result<Vec<ReconciledRow>, String> {
    let data = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    read_csv_str(&data)
}

pub fn read_csv_str(data: &str) -> Result<Vec<ReconciledRow>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data.as_bytes());

    let headers = reader.headers().map_err(|e| e.to_string())?;
    if headers.len() != 5 || !headers[1].starts_with(VALUE_PREFIX) || !headers[2].starts_with(VALUE_PREFIX) {
        return Err(format!("not a reconciled table: unexpected headers {headers:?}"));
    }

    let parse_opt = |line: usize, col: &str, s: &str| -> Result<Option<f64>, String> {
        if s.is_empty() {
            return Ok(None);
        }
        s.parse::<f64>()
            .map(Some)
            .map_err(|_| format!("line {line}: cannot parse {col} '{s}'"))
    };

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| e.to_string())?;
        let line = i + 2;
        let comparable = match &record[3] {
            "true" => true,
            "false" => false,
            other => return Err(format!("line {line}: cannot parse comparable '{other}'")),
        };
        rows.push(ReconciledRow {
            identifier: record[0].to_string(),
            value_a: parse_opt(line, "value", &record[1])?,
            value_b: parse_opt(line, "value", &record[2])?,
            comparable,
            delta: parse_opt(line, "delta", &record[4])?,
        });
    }
    Ok(rows)
}

/// Write a workbook with a `reconciled` sheet and a `statistics` sheet.
pub fn write_xlsx(report: &Report, path: &Path) -> Result<(), String> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let xlsx_err = |e: rust_xlsxwriter::XlsxError| e.to_string();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("reconciled").map_err(xlsx_err)?;

        for (col, h) in headers(report).iter().enumerate() {
            sheet
                .write_string_with_format(0, col as u16, h, &bold)
                .map_err(xlsx_err)?;
        }

        for (i, row) in report.rows.iter().enumerate() {
            let r = (i + 1) as u32;
            sheet.write_string(r, 0, &row.identifier).map_err(xlsx_err)?;
            for (col, value) in [(1u16, row.value_a), (2, row.value_b), (4, row.delta)] {
                if let Some(v) = value {
                    sheet.write_number(r, col, v).map_err(xlsx_err)?;
                }
            }
            sheet.write_boolean(r, 3, row.comparable).map_err(xlsx_err)?;
        }
    }

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("statistics").map_err(xlsx_err)?;

        sheet.write_string_with_format(0, 0, "metric", &bold).map_err(xlsx_err)?;
        sheet.write_string_with_format(0, 1, &report.sources.a, &bold).map_err(xlsx_err)?;
        sheet.write_string_with_format(0, 2, &report.sources.b, &bold).map_err(xlsx_err)?;

        let pick = |stats: &Option<DatasetStats>, f: fn(&DatasetStats) -> Option<f64>| {
            stats.as_ref().and_then(f)
        };
        let metrics: [(&str, fn(&DatasetStats) -> Option<f64>); 5] = [
            ("mean", |s| Some(s.mean)),
            ("std_dev", |s| s.std_dev),
            ("max", |s| Some(s.max)),
            ("min", |s| Some(s.min)),
            ("capability_index", |s| s.capability_index),
        ];

        let mut r = 1u32;
        for (name, f) in metrics {
            sheet.write_string(r, 0, name).map_err(xlsx_err)?;
            for (col, stats) in [(1u16, &report.stats_a), (2, &report.stats_b)] {
                if let Some(v) = pick(stats, f) {
                    sheet.write_number(r, col, v).map_err(xlsx_err)?;
                }
            }
            r += 1;
        }

        r += 1;
        let c = &report.comparison;
        for (name, value) in [
            ("delta_mean", c.delta_mean),
            ("delta_std_dev", c.delta_std_dev),
            ("correlation", c.correlation),
        ] {
            sheet.write_string(r, 0, name).map_err(xlsx_err)?;
            if let Some(v) = value {
                sheet.write_number(r, 1, v).map_err(xlsx_err)?;
            }
            r += 1;
        }
        sheet.write_string(r, 0, "spec_limit").map_err(xlsx_err)?;
        sheet.write_number(r, 1, report.spec_limit).map_err(xlsx_err)?;
        sheet.write_string(r + 1, 0, "verdict").map_err(xlsx_err)?;
        sheet.write_string(r + 1, 1, report.verdict.as_str()).map_err(xlsx_err)?;
    }

    workbook
        .save(path)
        .map_err(|e| format!("cannot write {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use warpcheck_recon::{analyze, AnalysisOptions, RawTable};

    fn sample_report() -> Report {
        let a = RawTable::new(
            "quality",
            vec!["part no".into(), "warpage(um)".into()],
            vec![
                vec!["P1".into(), "10.1".into()],
                vec!["P2".into(), "-0.30000000000000004".into()],
                vec!["P4".into(), "".into()],
            ],
        );
        let b = RawTable::new(
            "dsol",
            vec!["part no".into(), "warpage(um)".into()],
            vec![
                vec!["P1".into(), "12.7".into()],
                vec!["P2".into(), "0.1".into()],
                vec!["P3".into(), "5".into()],
            ],
        );
        analyze(&a, &b, 30.0, &AnalysisOptions::default()).unwrap()
    }

    #[test]
    fn csv_round_trip_is_lossless() {
        let report = sample_report();
        let mut buf = Vec::new();
        write_csv_to(&report, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("part no,warpage(um)_quality,warpage(um)_dsol,comparable,delta\n"));

        let rows = read_csv_str(&text).unwrap();
        assert_eq!(rows, report.rows);
    }

    #[test]
    fn read_rejects_foreign_csv() {
        assert!(read_csv_str("a,b\n1,2\n").is_err());
    }

    #[test]
    fn export_dispatches_on_extension() {
        let report = sample_report();
        let dir = tempfile::tempdir().unwrap();

        let csv_path = dir.path().join("out.csv");
        export(&report, &csv_path).unwrap();
        assert_eq!(read_csv(&csv_path).unwrap(), report.rows);

        let xlsx_path = dir.path().join("out.XLSX");
        export(&report, &xlsx_path).unwrap();
        let bytes = std::fs::read(&xlsx_path).unwrap();
        // zip container magic
        assert_eq!(&bytes[..2], b"PK");

        assert!(export(&report, &dir.path().join("out.json")).is_err());
    }

    #[test]
    fn xlsx_sheets_carry_values_and_blanks() {
        use calamine::{open_workbook_auto, Data, Reader};

        let a = RawTable::new(
            "quality",
            vec!["part no".into(), "warpage(um)".into()],
            vec![vec!["P1".into(), "10".into()], vec!["P2".into(), "40".into()]],
        );
        let b = RawTable::new(
            "dsol",
            vec!["part no".into(), "warpage(um)".into()],
            vec![vec!["P1".into(), "12".into()]],
        );
        let report = analyze(&a, &b, 30.0, &AnalysisOptions::default()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        write_xlsx(&report, &path).unwrap();

        let mut workbook = open_workbook_auto(&path).unwrap();
        assert_eq!(workbook.sheet_names().to_vec(), vec!["reconciled", "statistics"]);
        let blank = |v: Option<&Data>| matches!(v, None | Some(Data::Empty));

        let rows = workbook.worksheet_range("reconciled").unwrap();
        assert_eq!(rows.get_value((0, 1)), Some(&Data::String("warpage(um)_quality".into())));
        assert_eq!(rows.get_value((1, 0)), Some(&Data::String("P1".into())));
        assert_eq!(rows.get_value((1, 4)), Some(&Data::Float(2.0)));
        assert_eq!(rows.get_value((1, 3)), Some(&Data::Bool(true)));
        // P2 has no dsol value and no delta
        assert_eq!(rows.get_value((2, 1)), Some(&Data::Float(40.0)));
        assert!(blank(rows.get_value((2, 2))));
        assert!(blank(rows.get_value((2, 4))));
        assert_eq!(rows.get_value((2, 3)), Some(&Data::Bool(false)));

        let stats = workbook.worksheet_range("statistics").unwrap();
        assert_eq!(stats.get_value((1, 0)), Some(&Data::String("mean".into())));
        assert_eq!(stats.get_value((1, 1)), Some(&Data::Float(25.0)));
        assert_eq!(stats.get_value((1, 2)), Some(&Data::Float(12.0)));
        // single dsol value: no spread, no capability index
        assert!(blank(stats.get_value((2, 2))));
        assert!(blank(stats.get_value((5, 2))));
        assert_eq!(stats.get_value((7, 0)), Some(&Data::String("delta_mean".into())));
        assert_eq!(stats.get_value((7, 1)), Some(&Data::Float(2.0)));
        assert_eq!(stats.get_value((9, 0)), Some(&Data::String("correlation".into())));
        assert!(blank(stats.get_value((9, 1))));
        assert_eq!(stats.get_value((10, 1)), Some(&Data::Float(30.0)));
        assert_eq!(stats.get_value((11, 1)), Some(&Data::String("high_deviation".into())));
    }
}
