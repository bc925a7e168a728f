//! 스킴 카테고리 계층.
//!
//! 원본 스프레드시트는 카테고리를 별도 컬럼 없이 SR 컬럼의 코드 행으로만 표시합니다.
//! - `A`/`B`/`C` 행: 스킴 유형 (개방형/폐쇄형/인터벌)
//! - `I`..`V` 행: 상세 스킴 유형 (채권형/주식형/혼합형/...)
//!
//! 이후의 데이터 행은 가장 최근에 나온 코드 행의 값을 이어받습니다 (forward-fill).

use serde::{Serialize, Serializer};
use std::fmt;

/// 스킴 유형 (SR 코드 A/B/C).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemeType {
    OpenEnded,
    ClosedEnded,
    Interval,
}

impl SchemeType {
    pub const ALL: [Self; 3] = [Self::OpenEnded, Self::ClosedEnded, Self::Interval];

    /// SR 코드에서 파싱
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "A" => Some(Self::OpenEnded),
            "B" => Some(Self::ClosedEnded),
            "C" => Some(Self::Interval),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::OpenEnded => "A",
            Self::ClosedEnded => "B",
            Self::Interval => "C",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::OpenEnded => "Open Ended Scheme",
            Self::ClosedEnded => "Closed Ended Scheme",
            Self::Interval => "Interval Scheme",
        }
    }
}

impl fmt::Display for SchemeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for SchemeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// 상세 스킴 유형 (SR 코드 I..V).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailedSchemeType {
    IncomeDebt,
    GrowthEquity,
    Hybrid,
    SolutionOriented,
    Other,
}

impl DetailedSchemeType {
    pub const ALL: [Self; 5] = [
        Self::IncomeDebt,
        Self::GrowthEquity,
        Self::Hybrid,
        Self::SolutionOriented,
        Self::Other,
    ];

    /// SR 코드(로마 숫자)에서 파싱
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "I" => Some(Self::IncomeDebt),
            "II" => Some(Self::GrowthEquity),
            "III" => Some(Self::Hybrid),
            "IV" => Some(Self::SolutionOriented),
            "V" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::IncomeDebt => "I",
            Self::GrowthEquity => "II",
            Self::Hybrid => "III",
            Self::SolutionOriented => "IV",
            Self::Other => "V",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::IncomeDebt => "Income/Debt Oriented Schemes",
            Self::GrowthEquity => "Growth/Equity Oriented Schemes",
            Self::Hybrid => "Hybrid Schemes",
            Self::SolutionOriented => "Solution Oriented Schemes",
            Self::Other => "Other Schemes",
        }
    }
}

impl fmt::Display for DetailedSchemeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for DetailedSchemeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// SR 값이 카테고리 코드일 때의 해석 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryMarker {
    Scheme(SchemeType),
    Detailed(DetailedSchemeType),
}

impl CategoryMarker {
    /// SR 값을 카테고리 코드로 해석합니다. 앞뒤 공백은 무시하고 대소문자는 구분합니다.
    pub fn parse(sr: &str) -> Option<Self> {
        let code = sr.trim();
        SchemeType::from_code(code)
            .map(Self::Scheme)
            .or_else(|| DetailedSchemeType::from_code(code).map(Self::Detailed))
    }
}

/// 한 행에 대해 확정된 카테고리 쌍.
///
/// 어떤 코드 행보다 먼저 나온 행은 `None`을 가집니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvedCategory {
    pub scheme_type: Option<SchemeType>,
    pub detailed_scheme_type: Option<DetailedSchemeType>,
}

/// 파싱 중 가장 최근에 본 카테고리를 들고 다니는 누산기.
#[derive(Debug, Clone, Default)]
pub struct CategoryState {
    current: ResolvedCategory,
}

impl CategoryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 현재 상태
    pub fn current(&self) -> ResolvedCategory {
        self.current
    }

    /// 한 행의 SR 값을 반영하고 그 행의 카테고리를 반환합니다.
    ///
    /// 코드가 일치하면 행에 데이터가 있든 없든 상태를 갱신합니다.
    pub fn advance(&mut self, sr: &str) -> ResolvedCategory {
        match CategoryMarker::parse(sr) {
            Some(CategoryMarker::Scheme(t)) => self.current.scheme_type = Some(t),
            Some(CategoryMarker::Detailed(t)) => self.current.detailed_scheme_type = Some(t),
            None => {}
        }
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip_through_labels() {
        for t in SchemeType::ALL {
            assert_eq!(SchemeType::from_code(t.code()), Some(t));
        }
        for t in DetailedSchemeType::ALL {
            assert_eq!(DetailedSchemeType::from_code(t.code()), Some(t));
        }
        assert_eq!(SchemeType::OpenEnded.to_string(), "Open Ended Scheme");
        assert_eq!(
            DetailedSchemeType::IncomeDebt.to_string(),
            "Income/Debt Oriented Schemes"
        );
    }

    #[test]
    fn test_marker_parse() {
        assert_eq!(
            CategoryMarker::parse(" B "),
            Some(CategoryMarker::Scheme(SchemeType::ClosedEnded))
        );
        assert_eq!(
            CategoryMarker::parse("IV"),
            Some(CategoryMarker::Detailed(DetailedSchemeType::SolutionOriented))
        );
        // 대소문자 구분, 숫자 SR은 코드가 아님
        assert_eq!(CategoryMarker::parse("a"), None);
        assert_eq!(CategoryMarker::parse("iii"), None);
        assert_eq!(CategoryMarker::parse("12"), None);
        assert_eq!(CategoryMarker::parse("VI"), None);
    }

    #[test]
    fn test_state_forward_fills() {
        let mut state = CategoryState::new();

        // 코드 행 이전
        assert_eq!(state.advance("1"), ResolvedCategory::default());

        let r = state.advance("A");
        assert_eq!(r.scheme_type, Some(SchemeType::OpenEnded));
        assert_eq!(r.detailed_scheme_type, None);

        state.advance("I");
        let r = state.advance("2");
        assert_eq!(r.scheme_type, Some(SchemeType::OpenEnded));
        assert_eq!(r.detailed_scheme_type, Some(DetailedSchemeType::IncomeDebt));

        // 스킴 유형만 바뀌면 상세 유형은 유지
        let r = state.advance("B");
        assert_eq!(r.scheme_type, Some(SchemeType::ClosedEnded));
        assert_eq!(r.detailed_scheme_type, Some(DetailedSchemeType::IncomeDebt));
    }

    #[test]
    fn test_labels_serialize_as_strings() {
        let json = serde_json::to_string(&DetailedSchemeType::Hybrid).unwrap();
        assert_eq!(json, "\"Hybrid Schemes\"");
    }
}
