//! 수식 참조 파서
//!
//! 수식 텍스트에서 다른 시트 셀 참조를 뽑는다. 수식 값은 계산하지 않는다.
//!
//! ## 문법
//! ```text
//! ref    := sheet '!' '$'? COL '$'? ROW
//! sheet  := "'" (문자 | "''")+ "'"      (따옴표 이름, 공백 허용)
//!         | [^'!:]+                    (맨 이름, 앞의 함수·연산자 접두는 잘라냄)
//! COL    := [A-Za-z]{1,3}
//! ROW    := [0-9]+
//! ```
//! 맞지 않는 조각은 조용히 무시한다. 이 파서는 실패하지 않는다.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref SHEET_REF_RE: Regex =
        Regex::new(r"(?i)(?:'((?:[^']|'')+)'|([^'!:]+))!\$?([A-Z]{1,3})\$?(\d+)").unwrap();
}

/// 맨 시트 이름 앞에 붙을 수 있는 함수 호출·연산자 문자
const PREFIX_DELIMITERS: &[char] = &[
    '(', ',', '+', '-', '*', '/', '^', '&', '=', '<', '>', ';', '{', '}', ' ', '\u{3000}', '\n',
];

/// 다른 시트 셀 참조
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRef {
    pub sheet: String,
    pub column: String,
    pub row: u32,
}

impl CellRef {
    pub fn target(&self) -> RefTarget {
        RefTarget {
            sheet: self.sheet.clone(),
            row: self.row,
        }
    }
}

impl std::fmt::Display for CellRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}!{}{}", self.sheet, self.column, self.row)
    }
}

/// 참조 대상 (시트, 행)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RefTarget {
    pub sheet: String,
    pub row: u32,
}

impl std::fmt::Display for RefTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}!{}", self.sheet, self.row)
    }
}

/// 참조 수집 범위
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefScope {
    /// 모든 시트
    Any,
    /// 이름이 목록 항목으로 끝나는 시트만
    Sheets(Vec<String>),
}

impl RefScope {
    pub fn sheets(names: &[&str]) -> Self {
        RefScope::Sheets(names.iter().map(|s| s.to_string()).collect())
    }

    pub fn allows(&self, sheet: &str) -> bool {
        match self {
            RefScope::Any => true,
            RefScope::Sheets(names) => names.iter().any(|n| sheet.ends_with(n.as_str())),
        }
    }
}

/// 맨 시트 이름 정리: 앞의 `=`/`+`, 따옴표, 함수·연산자 접두 제거
fn clean_bare_sheet_name(raw: &str) -> String {
    let s = raw.trim_start_matches(['=', '+']).trim().trim_matches('\'');
    let tail = s
        .char_indices()
        .rev()
        .find(|(_, c)| PREFIX_DELIMITERS.contains(c))
        .map(|(i, c)| &s[i + c.len_utf8()..])
        .unwrap_or(s);
    tail.trim().trim_matches('\'').to_string()
}

/// 수식 텍스트에서 시트 참조 추출
///
/// # Arguments
/// * `formula` - 수식 텍스트 (`=` 유무 무관)
/// * `scope` - 수집할 시트 범위
/// * `own_sheet` - 수식이 있는 시트 이름 (자기 참조는 버린다)
pub fn extract_refs(formula: &str, scope: &RefScope, own_sheet: &str) -> Vec<CellRef> {
    let mut refs = Vec::new();

    for caps in SHEET_REF_RE.captures_iter(formula) {
        let sheet = match (caps.get(1), caps.get(2)) {
            (Some(quoted), _) => quoted.as_str().replace("''", "'").trim().to_string(),
            (None, Some(bare)) => clean_bare_sheet_name(bare.as_str()),
            _ => continue,
        };
        if sheet.is_empty() || sheet == own_sheet || !scope.allows(&sheet) {
            continue;
        }
        let Ok(row) = caps[4].parse::<u32>() else {
            continue;
        };
        refs.push(CellRef {
            sheet,
            column: caps[3].to_ascii_uppercase(),
            row,
        });
    }

    refs
}

/// 대표 참조 선택
///
/// (시트, 행) 쌍 중 가장 많이 나온 것. 동률이면 먼저 나온 것.
pub fn representative<'a, I>(refs: I) -> Option<RefTarget>
where
    I: IntoIterator<Item = &'a CellRef>,
{
    let mut counts: Vec<(RefTarget, usize)> = Vec::new();

    for r in refs {
        let target = r.target();
        match counts.iter_mut().find(|(t, _)| *t == target) {
            Some((_, count)) => *count += 1,
            None => counts.push((target, 1)),
        }
    }

    let mut best: Option<(RefTarget, usize)> = None;
    for (target, count) in counts {
        if best.as_ref().map(|(_, c)| count > *c).unwrap_or(true) {
            best = Some((target, count));
        }
    }
    best.map(|(target, _)| target)
}
