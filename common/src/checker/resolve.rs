//! 참조 대상 행의 키 해석 전략

use super::Resolution;
use crate::alias::label;
use crate::config::CheckConfig;
use crate::detail::DetailLayout;
use crate::header::{locate, HeaderLayout};
use crate::key::{extract_key, Key, SheetKind};
use crate::types::{Sheet, Workbook};
use std::collections::HashMap;

/// 장비 단가산출서는 (품명|사양)을 먼저 본다
const EQUIPMENT_ORDER: [(&str, &str); 3] = [
    (label::NAME, label::ALT_SPEC),
    (label::NAME, label::SPEC),
    (label::ALT_NAME, label::SPEC),
];

const GENERAL_ORDER: [(&str, &str); 3] = [
    (label::NAME, label::SPEC),
    (label::NAME, label::ALT_SPEC),
    (label::ALT_NAME, label::SPEC),
];

/// 장비 단가산출서 시트 여부 (공백 무시)
pub fn is_equipment_sheet(name: &str) -> bool {
    let compact: String = name.chars().filter(|c| !c.is_whitespace()).collect();
    compact.contains("장비") && compact.contains("단가산출서")
}

/// 해석 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub key: Key,
    /// 키를 만든 헤더 쌍 ("품명|사양")
    pub headers: String,
}

/// 대상 시트의 헤더 배치를 캐시하며 키를 해석한다.
/// 검사 한 번 동안만 살아 있다.
pub struct Resolver<'a> {
    workbook: &'a Workbook,
    config: &'a CheckConfig,
    layouts: HashMap<(String, Vec<&'static str>), Option<HeaderLayout>>,
}

impl<'a> Resolver<'a> {
    pub fn new(workbook: &'a Workbook, config: &'a CheckConfig) -> Self {
        Self {
            workbook,
            config,
            layouts: HashMap::new(),
        }
    }

    fn layout(&mut self, sheet: &Sheet, labels: &[&'static str]) -> Option<HeaderLayout> {
        let cache_key = (sheet.name.clone(), labels.to_vec());
        if let Some(cached) = self.layouts.get(&cache_key) {
            return cached.clone();
        }
        let found = locate(sheet, labels, &self.config.aliases, self.config.header_window).ok();
        self.layouts.insert(cache_key, found.clone());
        found
    }

    /// 같은 행 키. 행은 (헤더행, 마지막 행] 안이어야 한다.
    fn same_row(&mut self, sheet: &Sheet, row: u32, labels: &[&'static str], name: &str, spec: &str) -> Option<Key> {
        let layout = self.layout(sheet, labels)?;
        if row <= layout.row || row > sheet.max_row() {
            return None;
        }
        extract_key(sheet, row, layout.column(name)?, layout.column(spec)?, SheetKind::Plain)
    }

    fn nearest_header(&mut self, sheet: &Sheet, row: u32) -> Option<Key> {
        let detail = self
            .layout(sheet, &[label::NAME, label::SPEC, label::UNIT, label::QUANTITY])
            .and_then(|l| DetailLayout::from_layout(&l));
        match detail {
            Some(layout) => layout.resolve(sheet, row, &self.config.subtotal),
            None => self.same_row(sheet, row, &[label::NAME, label::SPEC], label::NAME, label::SPEC),
        }
    }

    fn header_pair_fallback(&mut self, sheet: &Sheet, row: u32) -> Option<Resolved> {
        let orders = if is_equipment_sheet(&sheet.name) {
            EQUIPMENT_ORDER
        } else {
            GENERAL_ORDER
        };

        for (name, spec) in orders {
            let Some(layout) = self.layout(sheet, &[name, spec]) else {
                continue;
            };
            if row <= layout.row || row > sheet.max_row() {
                continue;
            }
            let (Some(name_col), Some(spec_col)) = (layout.column(name), layout.column(spec)) else {
                continue;
            };
            // 빈 행이어도 키는 "None|None"으로 만든다
            let key = extract_key(sheet, row, name_col, spec_col, SheetKind::Plain).unwrap_or_default();
            return Some(Resolved {
                key,
                headers: format!("{}|{}", name, spec),
            });
        }
        None
    }

    /// (시트, 행) → 키
    ///
    /// 시트가 없거나, 헤더가 없거나, 행이 범위 밖이면 None (미해석).
    pub fn resolve(&mut self, strategy: Resolution, sheet_name: &str, row: u32) -> Option<Resolved> {
        let workbook = self.workbook;
        let sheet = workbook.sheet(sheet_name)?;

        let plain = |key: Option<Key>| {
            key.map(|key| Resolved {
                key,
                headers: format!("{}|{}", label::NAME, label::SPEC),
            })
        };

        match strategy {
            Resolution::SameRowByHeaderType => {
                let labels: &[&'static str] = if sheet_name.ends_with("단가대비표") {
                    &[label::NAME, label::SPEC, label::UNIT]
                } else {
                    &[label::NAME, label::SPEC]
                };
                plain(self.same_row(sheet, row, labels, label::NAME, label::SPEC))
            }
            Resolution::SameRow => {
                plain(self.same_row(sheet, row, &[label::NAME, label::SPEC], label::NAME, label::SPEC))
            }
            Resolution::NearestHeader => plain(self.nearest_header(sheet, row)),
            Resolution::HeaderPairFallback => self.header_pair_fallback(sheet, row),
        }
    }
}
