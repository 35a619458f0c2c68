//! 복합 키 (품명|규격)
//!
//! - 키 정규화: 쉼표·공백 표기 차이를 없앤다
//! - 키 추출: 행에서 품명/규격을 읽어 키를 만든다

use crate::types::Sheet;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// 키 구분자
pub const SEPARATOR: char = '|';

/// 빠진 부분의 표기. 빈 문자열("")과 구별된다.
pub const ABSENT: &str = "None";

/// 문자열 정규화: 쉼표 → 공백, 연속 공백(전각 포함) → 한 칸, 앞뒤 공백 제거
pub fn normalize_text(s: &str) -> String {
    s.replace([',', '，'], " ")
        .split(|c: char| c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// 키 정규화
///
/// 구분자가 있으면 앞뒤 절반을 각각, 없으면 전체를 정규화한다.
pub fn normalize(key: &str) -> String {
    match key.split_once(SEPARATOR) {
        Some((name, spec)) => format!("{}{}{}", normalize_text(name), SEPARATOR, normalize_text(spec)),
        None => normalize_text(key),
    }
}

/// 정규화 후 동일 여부
pub fn keys_equal(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// 행 식별 키
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    pub name: Option<String>,
    pub spec: Option<String>,
}

impl Key {
    pub fn new(name: impl Into<String>, spec: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            spec: Some(spec.into()),
        }
    }

    /// 품명·규격이 모두 비었는지
    pub fn is_empty(&self) -> bool {
        let blank = |p: &Option<String>| p.as_deref().map(|s| s.trim().is_empty()).unwrap_or(true);
        blank(&self.name) && blank(&self.spec)
    }

    pub fn name_text(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn spec_text(&self) -> &str {
        self.spec.as_deref().unwrap_or("")
    }

    pub fn normalized(&self) -> String {
        normalize(&self.to_string())
    }

    /// 품명만 정규화
    pub fn normalized_name(&self) -> String {
        normalize_text(self.name.as_deref().unwrap_or(ABSENT))
    }

    /// 이름이나 규격에 특정 문자열이 들어 있는지
    pub fn mentions(&self, needle: &str) -> bool {
        self.name_text().contains(needle) || self.spec_text().contains(needle)
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.name.as_deref().unwrap_or(ABSENT),
            SEPARATOR,
            self.spec.as_deref().unwrap_or(ABSENT)
        )
    }
}

/// 시트 종류. 내역형(일위대가형) 시트만 규격 분리 폴백을 쓴다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    Plain,
    Detail,
}

lazy_static! {
    // 두 칸 이상 공백 (반각/전각)
    static ref WIDE_GAP_RE: Regex = Regex::new(r"[ \u{3000}]{2,}").unwrap();
}

/// 행의 키 추출
///
/// 품명과 규격이 모두 비어 있으면 None.
/// 내역형 시트에서 규격이 비어 있으면 품명을 두 칸 이상 공백으로 나눠
/// 앞 두 토큰을 (품명, 규격)으로 쓴다.
pub fn extract_key(sheet: &Sheet, row: u32, name_col: u32, spec_col: u32, kind: SheetKind) -> Option<Key> {
    let mut name = sheet.cell(row, name_col).as_text();
    let mut spec = sheet.cell(row, spec_col).as_text();

    let blank = |p: &Option<String>| p.as_deref().map(str::is_empty).unwrap_or(true);
    if blank(&name) && blank(&spec) {
        return None;
    }

    if kind == SheetKind::Detail && blank(&spec) {
        if let Some(full) = name.as_deref() {
            let tokens: Vec<&str> = WIDE_GAP_RE
                .split(full)
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect();
            if tokens.len() >= 2 {
                spec = Some(tokens[1].to_string());
                name = Some(tokens[0].to_string());
            }
        }
    }

    Some(Key { name, spec })
}
