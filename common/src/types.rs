//! 워크북 모델
//!
//! 엑셀 파일을 읽은 뒤 검사 엔진이 보는 읽기 전용 뷰:
//! - Workbook: 시트 이름 → Sheet (순서 유지)
//! - Sheet: 1부터 시작하는 (행, 열) 희소 격자
//! - Cell: 빈 셀 / 리터럴 / 수식 텍스트

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 리터럴 값
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Literal {
    /// 공백 문자열은 빈 값으로 본다
    pub fn is_blank(&self) -> bool {
        match self {
            Literal::Text(s) => s.trim().is_empty(),
            Literal::Number(_) | Literal::Bool(_) => false,
        }
    }

    /// 0 또는 0으로 읽히는 값
    pub fn is_zero(&self) -> bool {
        match self {
            Literal::Number(n) => n.abs() < 1e-9,
            Literal::Text(s) => s.trim().parse::<f64>().map(|n| n.abs() < 1e-9).unwrap_or(false),
            Literal::Bool(_) => false,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Literal::Number(n) => Some(*n),
            Literal::Text(s) => s.trim().replace(',', "").parse::<f64>().ok(),
            Literal::Bool(_) => None,
        }
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Text(s) => write!(f, "{}", s),
            // 정수값은 소수점 없이 표시
            Literal::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Literal::Number(n) => write!(f, "{}", n),
            Literal::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

/// 셀 내용
///
/// 수식 셀은 계산된 값이 있을 수도(캐시된 값), 없을 수도(미계산 수식) 있다.
/// 검사 엔진은 수식 텍스트만 사용한다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Literal(Literal),
    Formula {
        cached: Option<Literal>,
        text: String,
    },
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Literal(Literal::Text(s.into()))
    }

    pub fn number(n: f64) -> Self {
        Cell::Literal(Literal::Number(n))
    }

    pub fn formula(text: impl Into<String>) -> Self {
        Cell::Formula { cached: None, text: text.into() }
    }

    pub fn is_formula(&self) -> bool {
        matches!(self, Cell::Formula { .. })
    }

    pub fn formula_text(&self) -> Option<&str> {
        match self {
            Cell::Formula { text, .. } => Some(text.as_str()),
            _ => None,
        }
    }

    /// 표시용 값 (수식은 캐시된 값)
    pub fn value(&self) -> Option<&Literal> {
        match self {
            Cell::Empty => None,
            Cell::Literal(v) => Some(v),
            Cell::Formula { cached, .. } => cached.as_ref(),
        }
    }

    /// 문자열로 읽은 값 (앞뒤 공백 제거). 빈 셀은 None, 공백 문자열은 Some("").
    pub fn as_text(&self) -> Option<String> {
        self.value().map(|v| v.to_string().trim().to_string())
    }

    pub fn is_blank(&self) -> bool {
        self.value().map(|v| v.is_blank()).unwrap_or(true)
    }
}

/// 시트: 1-based 희소 격자
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    cells: HashMap<(u32, u32), Cell>,
    max_row: u32,
    max_col: u32,
}

const EMPTY_CELL: Cell = Cell::Empty;

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// 셀 설정. 범위는 자동으로 늘어난다.
    pub fn set(&mut self, row: u32, col: u32, cell: Cell) {
        if row == 0 || col == 0 {
            return;
        }
        if matches!(cell, Cell::Empty) {
            self.cells.remove(&(row, col));
            return;
        }
        self.max_row = self.max_row.max(row);
        self.max_col = self.max_col.max(col);
        self.cells.insert((row, col), cell);
    }

    /// 빌더 형태의 셀 설정 (테스트·픽스처용)
    pub fn with(mut self, row: u32, col: u32, cell: Cell) -> Self {
        self.set(row, col, cell);
        self
    }

    pub fn cell(&self, row: u32, col: u32) -> &Cell {
        self.cells.get(&(row, col)).unwrap_or(&EMPTY_CELL)
    }

    pub fn max_row(&self) -> u32 {
        self.max_row
    }

    pub fn max_col(&self) -> u32 {
        self.max_col
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

/// 워크북: 시트 이름 → 시트
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// 시트 추가 (같은 이름이 있으면 교체)
    pub fn add_sheet(&mut self, sheet: Sheet) {
        if let Some(existing) = self.sheets.iter_mut().find(|s| s.name == sheet.name) {
            *existing = sheet;
        } else {
            self.sheets.push(sheet);
        }
    }

    pub fn with_sheet(mut self, sheet: Sheet) -> Self {
        self.add_sheet(sheet);
        self
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sheet(name).is_some()
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }
}

/// 열 번호 → 열 문자 (1 → "A", 27 → "AA")
pub fn column_letters(mut col: u32) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let rem = ((col - 1) % 26) as u8;
        letters.push((b'A' + rem) as char);
        col = (col - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// 열 문자 → 열 번호 ("A" → 1). 알파벳 이외 문자가 있으면 None.
pub fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    letters.chars().try_fold(0u32, |acc, c| {
        let c = c.to_ascii_uppercase();
        if c.is_ascii_uppercase() {
            Some(acc * 26 + (c as u32 - 'A' as u32 + 1))
        } else {
            None
        }
    })
}

/// 셀 좌표 문자열 ("B12")
pub fn coordinate(row: u32, col: u32) -> String {
    format!("{}{}", column_letters(col), row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_extent_grows() {
        let mut sheet = Sheet::new("일위대가");
        sheet.set(3, 5, Cell::text("품명"));
        sheet.set(10, 2, Cell::number(1.0));
        assert_eq!(sheet.max_row(), 10);
        assert_eq!(sheet.max_col(), 5);
        assert_eq!(sheet.cell(1, 1), &Cell::Empty);
    }

    #[test]
    fn test_workbook_lookup_miss() {
        let wb = Workbook::new().with_sheet(Sheet::new("단가대비표"));
        assert!(wb.sheet("단가대비표").is_some());
        assert!(wb.sheet("공종별집계표").is_none());
    }

    #[test]
    fn test_column_letters_roundtrip() {
        assert_eq!(column_letters(1), "A");
        assert_eq!(column_letters(26), "Z");
        assert_eq!(column_letters(27), "AA");
        assert_eq!(column_letters(703), "AAA");
        assert_eq!(column_index("A"), Some(1));
        assert_eq!(column_index("aa"), Some(27));
        assert_eq!(column_index("A1"), None);
        assert_eq!(coordinate(12, 2), "B12");
    }

    #[test]
    fn test_literal_blank_and_zero() {
        assert!(Literal::Text("  ".into()).is_blank());
        assert!(Literal::Number(0.0).is_zero());
        assert!(Literal::Text("0".into()).is_zero());
        assert!(!Literal::Text("-".into()).is_zero());
        assert_eq!(Literal::Number(1200.0).to_string(), "1200");
        assert_eq!(Literal::Text("1,200".into()).as_f64(), Some(1200.0));
    }

    #[test]
    fn test_formula_cell_without_cache_is_blank_value() {
        let cell = Cell::formula("단가대비표!C5");
        assert!(cell.is_formula());
        assert!(cell.is_blank());
        assert_eq!(cell.formula_text(), Some("단가대비표!C5"));
    }
}
