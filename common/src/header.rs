//! 헤더 위치 탐색
//!
//! 양식이 느슨한 시트 상단에서 필요한 머리글이 모두 놓인 행을 찾는다.

use crate::alias::{normalize_label, LabelAliases};
use crate::config::ScanWindow;
use crate::error::{Error, Result};
use crate::types::Sheet;
use std::collections::HashMap;

/// 헤더 행과 라벨별 열 위치
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLayout {
    pub row: u32,
    columns: HashMap<String, u32>,
}

impl HeaderLayout {
    pub fn column(&self, label: &str) -> Option<u32> {
        self.columns.get(label).copied()
    }

    pub fn has(&self, label: &str) -> bool {
        self.columns.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// 헤더 탐색
///
/// 창 안의 행을 위에서부터 훑어, 요청한 라벨이 모두 발견된 첫 행을 헤더로 돌려준다.
/// 각 라벨은 그 행에서 처음 나타난 열을 갖고, 한 셀은 한 라벨에만 배정된다.
///
/// # Errors
/// 창 안에 그런 행이 없으면 `Error::HeaderNotFound`
pub fn locate(
    sheet: &Sheet,
    labels: &[&str],
    aliases: &LabelAliases,
    window: ScanWindow,
) -> Result<HeaderLayout> {
    let forms: Vec<(&str, Vec<String>)> = labels
        .iter()
        .map(|l| (*l, aliases.normalized_forms(l)))
        .collect();

    let last_row = window.rows.min(sheet.max_row());
    let last_col = window.cols.min(sheet.max_col());

    for row in 1..=last_row {
        let mut columns: HashMap<String, u32> = HashMap::new();

        for col in 1..=last_col {
            let text = match sheet.cell(row, col).as_text() {
                Some(t) if !t.is_empty() => normalize_label(&t),
                _ => continue,
            };

            let hit = forms
                .iter()
                .find(|(label, alts)| !columns.contains_key(*label) && alts.contains(&text));
            if let Some((label, _)) = hit {
                columns.insert(label.to_string(), col);
            }
        }

        if columns.len() == labels.len() {
            return Ok(HeaderLayout { row, columns });
        }
    }

    Err(Error::header_not_found(&sheet.name, labels))
}
