//! 리포트 정규화.
//!
//! 원본 스프레드시트는 카테고리를 코드 행과 빈 구분 행으로만 표현합니다.
//! 정규화는 다음 순서로 진행됩니다:
//!
//! 1. 모든 행에 대해 카테고리를 forward-fill로 먼저 확정 (행 제거 전)
//! 2. 업무 컬럼 중 비어 있지 않은 값이 7개 미만인 행 제거
//! 3. Scheme Name에 합계 표식이 포함된 행 제거
//! 4. 남은 첫 행 제거 (헤더 잔여 행)
//!
//! 1단계는 I/O 없이 [`resolve_categories`]로 독립 테스트할 수 있습니다.

pub mod workbook;

pub use workbook::{grid_to_rows, load_rows};

use amfi_core::{
    CategoryMarker, CategoryState, NormalizedRecord, RawReportRow, ReportColumn,
    ResolvedCategory,
};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::Result;

/// 이보다 적은 수의 값이 채워진 행은 구분/공백 행으로 간주합니다.
pub const SPARSE_ROW_THRESHOLD: usize = 7;

/// 합계/소계 행을 나타내는 Scheme Name 부분 문자열 (대소문자 구분).
pub const AGGREGATE_MARKERS: [&str; 4] = [
    "Sub Total",
    "Total",
    "Grand Total",
    "Fund of Funds Scheme (Domestic) **",
];

/// 숫자로 읽는 컬럼
const NUMERIC_COLUMNS: [ReportColumn; 9] = [
    ReportColumn::NoOfScheme,
    ReportColumn::NoOfFolio,
    ReportColumn::GrossSales,
    ReportColumn::Redemption,
    ReportColumn::NetSales,
    ReportColumn::Aum,
    ReportColumn::Aaum,
    ReportColumn::NoOfPortfolio,
    ReportColumn::Nav,
];

/// 카테고리가 확정된 행.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedRow {
    pub row: RawReportRow,
    pub category: ResolvedCategory,
}

/// 정규화 단계별 통계.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeStats {
    /// 배너/헤더를 제외한 원본 행 수
    pub rows_read: usize,
    /// 카테고리 코드 행 수
    pub marker_rows: usize,
    /// 값이 부족해 제거된 행 수
    pub sparse_dropped: usize,
    /// 합계 표식으로 제거된 행 수
    pub aggregate_dropped: usize,
    /// 헤더 잔여 행으로 제거된 행 수 (0 또는 1)
    pub artifact_dropped: usize,
    /// 최종 레코드 수
    pub records: usize,
}

/// 정규화 결과.
#[derive(Debug, Clone, Default)]
pub struct NormalizedReport {
    pub records: Vec<NormalizedRecord>,
    pub stats: NormalizeStats,
}

/// 로컬 리포트 파일을 레코드 집합으로 변환하는 파서.
pub trait ReportParser: Send + Sync {
    fn parse(&self, path: &Path) -> Result<NormalizedReport>;
}

/// calamine 기반 워크북 파서.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkbookParser;

impl ReportParser for WorkbookParser {
    fn parse(&self, path: &Path) -> Result<NormalizedReport> {
        let rows = load_rows(path)?;
        let report = normalize_rows(rows);
        info!(
            path = %path.display(),
            rows_read = report.stats.rows_read,
            records = report.stats.records,
            "리포트 정규화 완료"
        );
        Ok(report)
    }
}

/// 모든 행의 카테고리를 원래 순서대로 확정합니다.
///
/// 결과는 입력과 같은 길이이며, i번째 값은 i번째 행 이전(자신 포함)에 나온
/// 가장 가까운 코드 행의 라벨입니다.
pub fn resolve_categories(rows: &[RawReportRow]) -> Vec<ResolvedCategory> {
    rows.iter()
        .scan(CategoryState::new(), |state, row| Some(state.advance(&row.sr())))
        .collect()
}

/// 값이 부족한 행인지
pub fn is_sparse(row: &RawReportRow) -> bool {
    row.non_blank_count() < SPARSE_ROW_THRESHOLD
}

/// 합계 표식이 포함된 Scheme Name인지 (부분 문자열 일치)
pub fn is_aggregate_name(name: &str) -> bool {
    AGGREGATE_MARKERS.iter().any(|marker| name.contains(marker))
}

/// 값이 부족한 행 제거
pub fn drop_sparse_rows(rows: Vec<TaggedRow>) -> Vec<TaggedRow> {
    rows.into_iter().filter(|t| !is_sparse(&t.row)).collect()
}

/// 합계 행 제거. 두 번 적용해도 결과가 같습니다.
pub fn retain_data_rows(rows: Vec<TaggedRow>) -> Vec<TaggedRow> {
    rows.into_iter()
        .filter(|t| !is_aggregate_name(&t.row.scheme_name()))
        .collect()
}

/// 배너/헤더가 제거된 원본 행을 정규화합니다.
pub fn normalize_rows(rows: Vec<RawReportRow>) -> NormalizedReport {
    let mut stats = NormalizeStats {
        rows_read: rows.len(),
        marker_rows: rows
            .iter()
            .filter(|r| CategoryMarker::parse(&r.sr()).is_some())
            .count(),
        ..Default::default()
    };

    let categories = resolve_categories(&rows);
    let tagged: Vec<TaggedRow> = rows
        .into_iter()
        .zip(categories)
        .map(|(row, category)| TaggedRow { row, category })
        .collect();

    let before = tagged.len();
    let dense = drop_sparse_rows(tagged);
    stats.sparse_dropped = before - dense.len();

    let before = dense.len();
    let data = retain_data_rows(dense);
    stats.aggregate_dropped = before - data.len();

    let mut data = data.into_iter();
    if let Some(first) = data.next() {
        stats.artifact_dropped = 1;
        debug!(
            sr = %first.row.sr(),
            scheme_name = %first.row.scheme_name(),
            "첫 잔여 행 제거"
        );
    }

    let records: Vec<NormalizedRecord> = data
        .map(|t| {
            warn_non_numeric(&t.row);
            NormalizedRecord::from_row(&t.row, t.category)
        })
        .collect();
    stats.records = records.len();

    debug!(?stats, "정규화 통계");

    NormalizedReport { records, stats }
}

fn warn_non_numeric(row: &RawReportRow) {
    for column in NUMERIC_COLUMNS {
        let cell = row.cell(column);
        if cell.is_non_numeric() {
            warn!(
                sr = %row.sr(),
                column = column.header(),
                value = %cell.as_text(),
                "숫자가 아닌 값은 NULL로 저장됩니다"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amfi_core::{Cell, DetailedSchemeType, SchemeType};
    use proptest::prelude::*;

    /// SR, 이름, 숫자 값 개수로 행 생성 (숫자는 앞에서부터 채움)
    fn row(sr: &str, name: &str, numbers: usize) -> RawReportRow {
        let mut cells = vec![
            if sr.is_empty() {
                Cell::Empty
            } else {
                Cell::Text(sr.to_string())
            },
            if name.is_empty() {
                Cell::Empty
            } else {
                Cell::Text(name.to_string())
            },
        ];
        for i in 0..9 {
            cells.push(if i < numbers {
                Cell::Number((i + 1) as f64)
            } else {
                Cell::Empty
            });
        }
        RawReportRow::new(cells).unwrap()
    }

    fn data(sr: &str, name: &str) -> RawReportRow {
        row(sr, name, 9)
    }

    #[test]
    fn test_sparse_threshold_boundary() {
        // SR + 이름 + 숫자 4개 = 6개 → 제거
        assert!(is_sparse(&row("1", "Six Fund", 4)));
        // SR + 이름 + 숫자 5개 = 7개 → 유지
        assert!(!is_sparse(&row("1", "Seven Fund", 5)));
    }

    #[test]
    fn test_aggregate_markers_match_substrings() {
        assert!(is_aggregate_name("Sub Total - I"));
        assert!(is_aggregate_name("Grand Total"));
        assert!(is_aggregate_name("Total A+B+C"));
        assert!(is_aggregate_name("Fund of Funds Scheme (Domestic) ** "));
        // 대소문자 구분
        assert!(!is_aggregate_name("sub total"));
        assert!(!is_aggregate_name("Fund of Funds Scheme (Domestic)"));
        assert!(!is_aggregate_name("Liquid Fund"));
    }

    #[test]
    fn test_category_marker_without_data_still_updates_state() {
        let rows = vec![
            row("A", "Open Ended Schemes", 0),
            row("I", "Income/Debt Oriented Schemes", 0),
            // 데이터 없이 바로 다음 코드
            row("II", "Growth/Equity Oriented Schemes", 0),
            data("1", "Large Cap Fund"),
        ];
        let categories = resolve_categories(&rows);

        assert_eq!(
            categories[3],
            ResolvedCategory {
                scheme_type: Some(SchemeType::OpenEnded),
                detailed_scheme_type: Some(DetailedSchemeType::GrowthEquity),
            }
        );
    }

    #[test]
    fn test_rows_before_any_marker_are_unknown() {
        let rows = vec![
            data("x", "Header Fragment"),
            data("1", "Orphan Fund"),
            row("B", "Close Ended Schemes", 0),
            data("2", "FMP Series 1"),
        ];

        let report = normalize_rows(rows);

        assert_eq!(report.records.len(), 2);
        let orphan = &report.records[0];
        assert_eq!(orphan.scheme_name, "Orphan Fund");
        assert_eq!(orphan.scheme_type, None);
        assert_eq!(orphan.detailed_scheme_type, None);
        assert_eq!(report.records[1].scheme_type, Some(SchemeType::ClosedEnded));
    }

    #[test]
    fn test_fill_survives_dropped_marker_rows() {
        // 코드 행은 값이 부족해 제거되지만 라벨은 이후 행으로 전파되어야 함
        let rows = vec![
            row("A", "Open Ended Schemes", 0),
            row("III", "Hybrid Schemes", 0),
            data("", "Residual"),
            row("", "", 0),
            data("1", "Balanced Advantage Fund"),
            data("", "Sub Total - III"),
        ];

        let report = normalize_rows(rows);

        assert_eq!(report.stats.rows_read, 6);
        assert_eq!(report.stats.marker_rows, 2);
        assert_eq!(report.stats.sparse_dropped, 3);
        assert_eq!(report.stats.aggregate_dropped, 1);
        assert_eq!(report.stats.artifact_dropped, 1);
        assert_eq!(report.stats.records, 1);

        let record = &report.records[0];
        assert_eq!(record.scheme_name, "Balanced Advantage Fund");
        assert_eq!(record.scheme_type, Some(SchemeType::OpenEnded));
        assert_eq!(record.detailed_scheme_type, Some(DetailedSchemeType::Hybrid));
    }

    #[test]
    fn test_empty_input() {
        let report = normalize_rows(Vec::new());
        assert!(report.records.is_empty());
        assert_eq!(report.stats, NormalizeStats::default());
    }

    #[test]
    fn test_only_artifact_row_yields_nothing() {
        let report = normalize_rows(vec![data("1", "Only Row")]);
        assert!(report.records.is_empty());
        assert_eq!(report.stats.artifact_dropped, 1);
    }

    const SR_POOL: &[&str] = &[
        "A", "B", "C", "I", "II", "III", "IV", "V", "1", "2", "17", "", " A ", "VI", "b",
    ];

    const NAME_POOL: &[&str] = &[
        "Liquid Fund",
        "Sub Total - II",
        "Grand Total",
        "Total",
        "Gilt Fund",
        "Fund of Funds Scheme (Domestic) **",
        "Index Funds",
        "",
    ];

    /// 뒤로 훑어 가장 가까운 코드 행을 찾는 기준 구현
    fn nearest_preceding(rows: &[RawReportRow], idx: usize) -> ResolvedCategory {
        let scheme_type = rows[..=idx]
            .iter()
            .rev()
            .find_map(|r| SchemeType::from_code(r.sr().as_str()));
        let detailed_scheme_type = rows[..=idx]
            .iter()
            .rev()
            .find_map(|r| DetailedSchemeType::from_code(r.sr().as_str()));
        ResolvedCategory {
            scheme_type,
            detailed_scheme_type,
        }
    }

    fn arb_rows() -> impl Strategy<Value = Vec<RawReportRow>> {
        prop::collection::vec(
            (
                prop::sample::select(SR_POOL),
                prop::sample::select(NAME_POOL),
                0usize..=9,
            ),
            0..40,
        )
        .prop_map(|specs| {
            specs
                .into_iter()
                .map(|(sr, name, numbers)| row(sr, name, numbers))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_forward_fill_matches_nearest_marker(rows in arb_rows()) {
            let categories = resolve_categories(&rows);
            prop_assert_eq!(categories.len(), rows.len());
            for (idx, category) in categories.iter().enumerate() {
                prop_assert_eq!(*category, nearest_preceding(&rows, idx));
            }
        }

        #[test]
        fn prop_aggregate_filter_is_idempotent(rows in arb_rows()) {
            let tagged: Vec<TaggedRow> = rows
                .into_iter()
                .map(|row| TaggedRow { row, category: ResolvedCategory::default() })
                .collect();
            let once = retain_data_rows(tagged);
            let twice = retain_data_rows(once.clone());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_records_never_carry_aggregate_names(rows in arb_rows()) {
            let report = normalize_rows(rows);
            for record in &report.records {
                prop_assert!(!is_aggregate_name(&record.scheme_name));
            }
            let s = &report.stats;
            prop_assert_eq!(
                s.rows_read,
                s.sparse_dropped + s.aggregate_dropped + s.artifact_dropped + s.records
            );
        }
    }
}
