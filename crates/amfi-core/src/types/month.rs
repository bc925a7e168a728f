//! 리포트 기준 월.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

const MONTH_ABBREVS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// 월간 리포트가 다루는 달력 월.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReportMonth {
    pub year: i32,
    /// 1..=12
    pub month: u32,
}

impl ReportMonth {
    /// 주어진 날짜가 속한 달.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// 주어진 날짜 직전의 완료된 달력 월 (1월이면 전년도 12월).
    pub fn preceding(date: NaiveDate) -> Self {
        let first = date.with_day(1).unwrap_or(date);
        // 1일에서 한 달을 빼는 연산은 항상 유효한 날짜를 만든다
        let prev = first
            .checked_sub_months(Months::new(1))
            .unwrap_or(NaiveDate::MIN);
        Self::of(prev)
    }

    /// 영문 소문자 3글자 월 약어 (예: "jan")
    pub fn abbrev(&self) -> &'static str {
        MONTH_ABBREVS[(self.month.clamp(1, 12) - 1) as usize]
    }

    /// URL에 들어가는 월 식별자 (예: "jan2024")
    pub fn slug(&self) -> String {
        format!("{}{:04}", self.abbrev(), self.year)
    }
}

impl fmt::Display for ReportMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
