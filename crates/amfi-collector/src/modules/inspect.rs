//! 로컬 리포트 파일 점검.
//!
//! DB에 접근하지 않고 파일을 정규화해 결과를 출력합니다.

use amfi_core::NormalizedRecord;
use amfi_data::{NormalizedReport, ReportParser};
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use crate::error::{CollectorError, Result};

/// 출력 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// 파일을 정규화하고 결과를 `out`에 씁니다.
pub fn inspect_report<W: Write>(
    parser: &dyn ReportParser,
    path: &Path,
    format: OutputFormat,
    out: &mut W,
) -> Result<NormalizedReport> {
    let report = parser.parse(path)?;

    match format {
        OutputFormat::Json => {
            let body = serde_json::json!({
                "path": path.display().to_string(),
                "stats": &report.stats,
                "records": &report.records,
            });
            serde_json::to_writer_pretty(&mut *out, &body)?;
            writeln!(out)?;
        }
        OutputFormat::Table => write_table(&report.records, out)?,
    }

    Ok(report)
}

const TABLE_HEADER: [&str; 7] = [
    "SR",
    "Scheme Name",
    "Folios",
    "Net Sales",
    "AUM",
    "Scheme Type",
    "Detailed Scheme Type",
];

fn write_table<W: Write>(records: &[NormalizedRecord], out: &mut W) -> Result<()> {
    let rows: Vec<[String; 7]> = records
        .iter()
        .map(|r| {
            [
                r.sr.clone(),
                r.scheme_name.clone(),
                opt(r.no_of_folio),
                opt(r.net_sales),
                opt(r.aum),
                r.scheme_type_label().unwrap_or("unknown").to_string(),
                r.detailed_scheme_type_label().unwrap_or("unknown").to_string(),
            ]
        })
        .collect();

    let mut widths = TABLE_HEADER.map(|h| h.chars().count());
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let header = TABLE_HEADER.map(str::to_string);
    write_line(out, &header, &widths)?;
    let rule = widths.map(|w| "-".repeat(w));
    write_line(out, &rule, &widths)?;
    for row in &rows {
        write_line(out, row, &widths)?;
    }
    writeln!(out, "({} records)", rows.len())?;
    Ok(())
}

fn write_line<W: Write>(out: &mut W, cells: &[String; 7], widths: &[usize; 7]) -> Result<()> {
    let line: Vec<String> = cells
        .iter()
        .zip(widths.iter())
        .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
        .collect();
    writeln!(out, "{}", line.join("  ").trim_end()).map_err(CollectorError::from)
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}
