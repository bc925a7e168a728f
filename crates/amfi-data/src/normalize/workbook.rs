//! 워크북 로딩.
//!
//! calamine으로 첫 번째 워크시트를 읽어 [`RawReportRow`] 목록으로 변환합니다.
//! 행/열 위치는 A1 기준 절대 위치로 맞춥니다 (시트가 B3에서 시작해도 첫 행은 배너).

use amfi_core::{Cell, RawReportRow, COLUMN_COUNT};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use tracing::debug;

use crate::error::{DataError, Result};

/// 리포트 파일의 첫 워크시트를 읽어 배너/헤더를 제외한 행을 반환합니다.
pub fn load_rows(path: &Path) -> Result<Vec<RawReportRow>> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| DataError::Parse(format!("{}: {}", path.display(), e)))?;

    let first_sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| DataError::Parse(format!("{}: 워크시트가 없습니다", path.display())))?;

    let range = workbook
        .worksheet_range(&first_sheet)
        .map_err(|e| DataError::Parse(format!("{}: {}", path.display(), e)))?;

    let (start_row, start_col) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    debug!(
        sheet = %first_sheet,
        start_row,
        start_col,
        height = range.height(),
        width = range.width(),
        "워크시트 로드"
    );

    let leading = std::iter::repeat_with(Vec::new).take(start_row);
    let body = range.rows().map(|row| {
        std::iter::repeat(Cell::Empty)
            .take(start_col)
            .chain(row.iter().map(to_cell))
            .collect::<Vec<_>>()
    });

    grid_to_rows(leading.chain(body))
}

/// 셀 격자(배너 포함)를 리포트 행으로 변환합니다.
///
/// 0번 행은 배너, 1번 행은 헤더로 버립니다. 마지막 비어 있지 않은 셀 기준
/// 격자 너비가 11이 아니면 구조가 다른 파일로 보고 에러를 반환합니다.
/// 짧은 행은 빈 셀로 채웁니다.
pub fn grid_to_rows<I>(grid: I) -> Result<Vec<RawReportRow>>
where
    I: IntoIterator<Item = Vec<Cell>>,
{
    let mut grid = grid.into_iter();

    if grid.next().is_none() {
        return Err(DataError::Parse("배너 행이 없습니다".to_string()));
    }
    let header = grid
        .next()
        .ok_or_else(|| DataError::Parse("헤더 행이 없습니다".to_string()))?;

    let body: Vec<Vec<Cell>> = grid.collect();

    let width = std::iter::once(&header)
        .chain(body.iter())
        .map(|cells| effective_width(cells))
        .max()
        .unwrap_or(0);
    if width != COLUMN_COUNT {
        return Err(DataError::Parse(format!(
            "컬럼 수가 {}개여야 하지만 {}개입니다",
            COLUMN_COUNT, width
        )));
    }

    body.into_iter()
        .map(|mut cells| {
            cells.resize(COLUMN_COUNT, Cell::Empty);
            RawReportRow::new(cells).map_err(|e| DataError::Parse(e.to_string()))
        })
        .collect()
}

/// 마지막 비어 있지 않은 셀까지의 너비
fn effective_width(cells: &[Cell]) -> usize {
    cells
        .iter()
        .rposition(|c| !c.is_blank())
        .map(|i| i + 1)
        .unwrap_or(0)
}

/// calamine 셀을 도메인 셀로 변환합니다.
pub(crate) fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        // 날짜와 오류 셀은 표시 문자열로 보관
        other => Cell::Text(other.to_string()),
    }
}
