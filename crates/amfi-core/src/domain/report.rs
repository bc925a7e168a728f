//! 리포트 행 및 정규화된 레코드.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

use super::category::{DetailedSchemeType, ResolvedCategory, SchemeType};
use crate::error::{CoreError, CoreResult};

/// 리포트 업무 컬럼 수.
pub const COLUMN_COUNT: usize = 11;

/// 헤더 행을 대체하는 표준 컬럼 이름.
pub const REPORT_COLUMNS: [&str; COLUMN_COUNT] = [
    "SR",
    "Scheme Name",
    "No of Scheme",
    "No of Folio",
    "Gross Sales",
    "Redemption",
    "Net Sales",
    "AUM",
    "AAUM",
    "No of Portfolio",
    "NAV",
];

/// 리포트 컬럼 위치.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportColumn {
    Sr = 0,
    SchemeName,
    NoOfScheme,
    NoOfFolio,
    GrossSales,
    Redemption,
    NetSales,
    Aum,
    Aaum,
    NoOfPortfolio,
    Nav,
}

impl ReportColumn {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn header(self) -> &'static str {
        REPORT_COLUMNS[self.index()]
    }
}

/// 스프레드시트 셀 값.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// 비어 있거나 공백뿐인 셀
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) | Self::Bool(_) => false,
        }
    }

    /// 텍스트 표현. 정수 값 숫자는 소수부 없이 출력합니다 (`3.0` → `"3"`).
    ///
    /// 이전 적재 작업은 숫자 SR을 `"3.0"`으로 저장했으므로, 기존 테이블의 행과
    /// SR 값을 비교할 때는 형식이 다릅니다.
    pub fn as_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Self::Number(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }

    /// 고정 소수점 값. 텍스트는 천 단위 쉼표를 제거한 뒤 파싱합니다.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Number(n) => Decimal::from_f64(*n),
            Self::Text(s) => {
                let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
                if cleaned.is_empty() {
                    return None;
                }
                Decimal::from_str(&cleaned)
                    .or_else(|_| Decimal::from_scientific(&cleaned))
                    .ok()
            }
            Self::Empty | Self::Bool(_) => None,
        }
    }

    /// 정수 값 (가장 가까운 정수로 반올림).
    pub fn as_i64(&self) -> Option<i64> {
        self.as_decimal().and_then(|d| d.round().to_i64())
    }

    /// 비어 있지 않지만 숫자로 읽을 수 없는 셀
    pub fn is_non_numeric(&self) -> bool {
        !self.is_blank() && self.as_decimal().is_none()
    }
}

/// 의미 해석 전의 원본 리포트 행 (업무 컬럼 11개).
#[derive(Debug, Clone, PartialEq)]
pub struct RawReportRow {
    cells: Vec<Cell>,
}

impl RawReportRow {
    /// 셀 목록에서 행을 생성합니다. 컬럼 수가 11개가 아니면 에러.
    pub fn new(cells: Vec<Cell>) -> CoreResult<Self> {
        if cells.len() != COLUMN_COUNT {
            return Err(CoreError::InvalidInput(format!(
                "expected {} columns, found {}",
                COLUMN_COUNT,
                cells.len()
            )));
        }
        Ok(Self { cells })
    }

    pub fn cell(&self, column: ReportColumn) -> &Cell {
        &self.cells[column.index()]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// SR 컬럼의 텍스트 (앞뒤 공백 제거)
    pub fn sr(&self) -> String {
        self.cell(ReportColumn::Sr).as_text().trim().to_string()
    }

    /// Scheme Name 컬럼의 텍스트
    pub fn scheme_name(&self) -> String {
        self.cell(ReportColumn::SchemeName).as_text()
    }

    /// 비어 있지 않은 업무 컬럼 수
    pub fn non_blank_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_blank()).count()
    }
}

/// 카테고리가 부여된 데이터 행 (13개 필드).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    pub sr: String,
    pub scheme_name: String,
    pub no_of_scheme: Option<i64>,
    pub no_of_folio: Option<i64>,
    pub gross_sales: Option<Decimal>,
    pub redemption: Option<Decimal>,
    pub net_sales: Option<Decimal>,
    pub aum: Option<Decimal>,
    pub aaum: Option<Decimal>,
    pub no_of_portfolio: Option<i64>,
    pub nav: Option<Decimal>,
    /// 코드 행 이전의 데이터 행이면 None ("unknown")
    pub scheme_type: Option<SchemeType>,
    pub detailed_scheme_type: Option<DetailedSchemeType>,
}

impl NormalizedRecord {
    pub fn from_row(row: &RawReportRow, category: ResolvedCategory) -> Self {
        use ReportColumn as C;
        Self {
            sr: row.sr(),
            scheme_name: row.scheme_name().trim().to_string(),
            no_of_scheme: row.cell(C::NoOfScheme).as_i64(),
            no_of_folio: row.cell(C::NoOfFolio).as_i64(),
            gross_sales: row.cell(C::GrossSales).as_decimal(),
            redemption: row.cell(C::Redemption).as_decimal(),
            net_sales: row.cell(C::NetSales).as_decimal(),
            aum: row.cell(C::Aum).as_decimal(),
            aaum: row.cell(C::Aaum).as_decimal(),
            no_of_portfolio: row.cell(C::NoOfPortfolio).as_i64(),
            nav: row.cell(C::Nav).as_decimal(),
            scheme_type: category.scheme_type,
            detailed_scheme_type: category.detailed_scheme_type,
        }
    }

    pub fn scheme_type_label(&self) -> Option<&'static str> {
        self.scheme_type.map(|t| t.label())
    }

    pub fn detailed_scheme_type_label(&self) -> Option<&'static str> {
        self.detailed_scheme_type.map(|t| t.label())
    }
}
