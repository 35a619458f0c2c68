//! 최근접 헤더 해석 (일위대가형 시트)
//!
//! 일위대가형 시트는 항목마다 헤더행(품명만 있고 단위·수량이 빈 행)과
//! 그 아래 구성행(단위·수량이 있는 행)으로 이루어진다.
//! 임의의 행을 그 행이 속한 블록의 헤더 키로 바꾼다.

use crate::alias::label;
use crate::config::SubtotalRule;
use crate::header::HeaderLayout;
use crate::key::{extract_key, Key, SheetKind};
use crate::types::{Cell, Literal, Sheet};

/// "해당 없음"으로 쓰는 대시 문자
const DASHES: &[&str] = &["-", "—", "–", "－", "―"];

/// 단위·수량 칸이 비었는지 (빈 값, 0, 대시)
pub fn is_blank_measure(cell: &Cell) -> bool {
    match cell {
        Cell::Empty => true,
        Cell::Literal(Literal::Number(n)) => n.abs() < 1e-9,
        Cell::Literal(Literal::Text(s)) => {
            let t = s.trim();
            t.is_empty() || DASHES.contains(&t)
        }
        Cell::Literal(Literal::Bool(_)) => false,
        Cell::Formula { .. } => false,
    }
}

/// 일위대가형 시트의 열 배치
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailLayout {
    pub header_row: u32,
    pub name: u32,
    pub spec: u32,
    pub unit: u32,
    pub quantity: u32,
}

impl DetailLayout {
    /// 품명/규격/단위/수량 열이 모두 있는 헤더 배치만 일위대가형이다
    pub fn from_layout(layout: &HeaderLayout) -> Option<Self> {
        Some(Self {
            header_row: layout.row,
            name: layout.column(label::NAME)?,
            spec: layout.column(label::SPEC)?,
            unit: layout.column(label::UNIT)?,
            quantity: layout.column(label::QUANTITY)?,
        })
    }

    fn name_of(&self, sheet: &Sheet, row: u32) -> Option<String> {
        sheet
            .cell(row, self.name)
            .as_text()
            .map(|s| s.replace('\u{3000}', " ").trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// 블록 헤더행 여부: 품명 있음, 단위·수량 빔, 합계행 아님
    pub fn is_block_header(&self, sheet: &Sheet, row: u32, rule: &SubtotalRule) -> bool {
        let Some(name) = self.name_of(sheet, row) else {
            return false;
        };
        is_blank_measure(sheet.cell(row, self.unit))
            && is_blank_measure(sheet.cell(row, self.quantity))
            && !rule.is_marker(&name)
    }

    /// row 바로 위부터 헤더 경계까지 올라가며 가장 가까운 블록 헤더행
    pub fn nearest_header_row(&self, sheet: &Sheet, row: u32, rule: &SubtotalRule) -> Option<u32> {
        (self.header_row + 1..row)
            .rev()
            .find(|&r| self.is_block_header(sheet, r, rule))
    }

    /// 폴백: 위쪽에서 품명이 있는 가장 가까운 행
    pub fn nearest_named_row(&self, sheet: &Sheet, row: u32) -> Option<u32> {
        (self.header_row + 1..row)
            .rev()
            .find(|&r| self.name_of(sheet, r).is_some())
    }

    pub fn key_at(&self, sheet: &Sheet, row: u32) -> Option<Key> {
        extract_key(sheet, row, self.name, self.spec, SheetKind::Detail)
    }

    /// 행 → 소속 블록의 헤더 키
    pub fn resolve(&self, sheet: &Sheet, row: u32, rule: &SubtotalRule) -> Option<Key> {
        if row <= self.header_row || row > sheet.max_row() {
            return None;
        }
        if let Some(key) = self
            .nearest_header_row(sheet, row, rule)
            .and_then(|r| self.key_at(sheet, r))
        {
            return Some(key);
        }
        if let Some(key) = self
            .nearest_named_row(sheet, row)
            .and_then(|r| self.key_at(sheet, r))
        {
            return Some(key);
        }
        self.key_at(sheet, row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CheckConfig;
    use crate::header::locate;

    const DETAIL_LABELS: [&str; 4] = [label::NAME, label::SPEC, label::UNIT, label::QUANTITY];

    fn detail_layout(sheet: &Sheet) -> DetailLayout {
        let config = CheckConfig::default();
        let layout = locate(sheet, &DETAIL_LABELS, &config.aliases, config.header_window).unwrap();
        DetailLayout::from_layout(&layout).unwrap()
    }

    /// 헤더 3행, 블록 헤더 10행(펌프), 구성행 11~13행, 합계행 14행
    fn pump_sheet() -> Sheet {
        Sheet::new("일위대가")
            .with(3, 2, Cell::text("품명"))
            .with(3, 3, Cell::text("규격"))
            .with(3, 4, Cell::text("단위"))
            .with(3, 5, Cell::text("수량"))
            .with(4, 2, Cell::text("배관"))
            .with(4, 3, Cell::text("SPP 50A"))
            .with(5, 2, Cell::text("배관공"))
            .with(5, 4, Cell::text("인"))
            .with(5, 5, Cell::number(0.3))
            .with(10, 2, Cell::text("펌프"))
            .with(10, 3, Cell::text("50HP"))
            .with(10, 4, Cell::text("-"))
            .with(11, 2, Cell::text("기계설비공"))
            .with(11, 4, Cell::text("인"))
            .with(11, 5, Cell::number(1.5))
            .with(12, 2, Cell::text("보통인부"))
            .with(12, 4, Cell::text("인"))
            .with(12, 5, Cell::number(0.5))
            .with(13, 2, Cell::text("공구손료"))
            .with(13, 4, Cell::text("식"))
            .with(13, 5, Cell::number(1.0))
            .with(14, 2, Cell::text("[ 합 계 ]"))
    }

    #[test]
    fn test_blank_measure() {
        assert!(is_blank_measure(&Cell::Empty));
        assert!(is_blank_measure(&Cell::number(0.0)));
        assert!(is_blank_measure(&Cell::text(" — ")));
        assert!(!is_blank_measure(&Cell::number(2.0)));
        assert!(!is_blank_measure(&Cell::formula("A1*2")));
    }

    #[test]
    fn test_component_resolves_to_block_header() {
        let sheet = pump_sheet();
        let layout = detail_layout(&sheet);
        assert_eq!(layout.header_row, 3);
        let key = layout.resolve(&sheet, 12, &SubtotalRule::default()).unwrap();
        assert_eq!(key, Key::new("펌프", "50HP"));
    }

    #[test]
    fn test_subtotal_row_resolves_to_block_header() {
        let sheet = pump_sheet();
        let layout = detail_layout(&sheet);
        let rule = SubtotalRule::default();
        // 15행은 범위 밖, 3행은 헤더행
        assert!(layout.resolve(&sheet, 15, &rule).is_none());
        assert!(layout.resolve(&sheet, 3, &rule).is_none());
        let key = layout.resolve(&sheet, 14, &rule).unwrap();
        assert_eq!(key, Key::new("펌프", "50HP"));
    }

    #[test]
    fn test_subtotal_marker_is_not_a_header() {
        let sheet = pump_sheet()
            .with(15, 2, Cell::text("유압기"))
            .with(15, 4, Cell::text("대"))
            .with(15, 5, Cell::number(1.0));
        let layout = detail_layout(&sheet);
        // 14행([합계])을 건너뛰고 10행을 찾는다
        assert_eq!(layout.nearest_header_row(&sheet, 15, &SubtotalRule::default()), Some(10));
    }

    #[test]
    fn test_fallback_to_nearest_named_row() {
        let sheet = pump_sheet();
        let layout = detail_layout(&sheet);
        // 5행 위에는 4행(배관, 단위·수량 빔)이 헤더
        assert_eq!(layout.resolve(&sheet, 5, &SubtotalRule::default()), Some(Key::new("배관", "SPP 50A")));
        // 4행 위에는 후보가 없으므로 자기 자신
        assert_eq!(layout.resolve(&sheet, 4, &SubtotalRule::default()), Some(Key::new("배관", "SPP 50A")));
    }

    #[test]
    fn test_layout_without_quantity_is_not_detail() {
        let sheet = Sheet::new("단가대비표")
            .with(2, 1, Cell::text("품명"))
            .with(2, 2, Cell::text("규격"));
        let config = CheckConfig::default();
        let layout = locate(&sheet, &[label::NAME, label::SPEC], &config.aliases, config.header_window).unwrap();
        assert!(DetailLayout::from_layout(&layout).is_none());
    }
}
