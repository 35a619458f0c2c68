//! 헤더 라벨 별칭 모듈
//!
//! 시트마다 제각각인 머리글 표기(공백, 전각 문자, 동의어)를
//! 정규 라벨 하나로 모은다.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 정규 라벨
pub mod label {
    pub const NAME: &str = "품명";
    pub const ALT_NAME: &str = "품평";
    pub const SPEC: &str = "규격";
    pub const ALT_SPEC: &str = "사양";
    pub const UNIT: &str = "단위";
    pub const QUANTITY: &str = "수량";
    pub const CODE: &str = "코드";
    pub const TOTAL_UNIT_PRICE: &str = "합계 단가";
    pub const MATERIAL_UNIT_PRICE: &str = "재료비 단가";
    pub const LABOR_UNIT_PRICE: &str = "노무비 단가";
    pub const EXPENSE_UNIT_PRICE: &str = "경비 단가";
    pub const MATERIAL_APPLIED: &str = "재료비 적용단가";
    pub const LABOR: &str = "노무비";
    pub const EXPENSE_APPLIED: &str = "경비 적용단가";
}

/// 라벨 비교용 정규화: 모든 공백 제거, 전각 → 반각, 소문자화
pub fn normalize_label(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
            _ => c,
        })
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// 정규 라벨 → 별칭 목록
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelAliases {
    aliases: HashMap<String, Vec<String>>,
}

impl LabelAliases {
    /// 내역서 양식에서 쓰이는 기본 별칭
    pub fn builtin() -> Self {
        let mut config = Self::default();

        config.insert(label::NAME, &["품명", "공종명", "항목명"]);
        config.insert(label::SPEC, &["규격"]);
        config.insert(label::ALT_SPEC, &["사양"]);
        config.insert(label::TOTAL_UNIT_PRICE, &["합계 단가", "합계단가"]);
        config.insert(label::MATERIAL_UNIT_PRICE, &["재료비 단가"]);
        config.insert(label::LABOR_UNIT_PRICE, &["노무비 단가"]);
        config.insert(label::EXPENSE_UNIT_PRICE, &["경비 단가"]);

        config
    }

    /// JSON 문자열에서 읽기 ({"품명": ["공종명", ...]})
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    pub fn insert(&mut self, canonical: &str, alts: &[&str]) {
        let entry = self.aliases.entry(canonical.to_string()).or_default();
        for alt in alts {
            if !entry.iter().any(|a| a == alt) {
                entry.push(alt.to_string());
            }
        }
    }

    /// 라벨이 받아들이는 정규화된 표기 목록 (라벨 자신 포함)
    pub fn normalized_forms(&self, canonical: &str) -> Vec<String> {
        let mut forms = vec![normalize_label(canonical)];
        if let Some(alts) = self.aliases.get(canonical) {
            for alt in alts {
                let n = normalize_label(alt);
                if !forms.contains(&n) {
                    forms.push(n);
                }
            }
        }
        forms
    }

    /// 설정 병합 (뒤에 추가한 별칭이 더해진다)
    pub fn merge(&mut self, other: &LabelAliases) {
        for (canonical, alts) in &other.aliases {
            let alts: Vec<&str> = alts.iter().map(String::as_str).collect();
            self.insert(canonical, &alts);
        }
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("품 명"), "품명");
        assert_eq!(normalize_label("재 료 비\u{3000}단 가"), "재료비단가");
        assert_eq!(normalize_label("ＣＯＤＥ"), "code");
        assert_eq!(normalize_label("Code"), "code");
    }

    #[test]
    fn test_builtin_name_aliases() {
        let config = LabelAliases::builtin();
        let forms = config.normalized_forms(label::NAME);
        assert!(forms.contains(&"품명".to_string()));
        assert!(forms.contains(&"공종명".to_string()));
    }

    #[test]
    fn test_label_without_aliases_matches_itself() {
        let config = LabelAliases::builtin();
        assert_eq!(config.normalized_forms(label::UNIT), vec!["단위".to_string()]);
    }

    #[test]
    fn test_merge_from_json() {
        let mut config = LabelAliases::builtin();
        let custom = LabelAliases::from_json(r#"{"규격": ["치수"], "단위": ["단 위"]}"#).unwrap();
        config.merge(&custom);

        let forms = config.normalized_forms(label::SPEC);
        assert!(forms.contains(&"치수".to_string()));
        assert!(forms.contains(&"규격".to_string()));
        // 라벨 자신과 같은 정규형은 중복되지 않는다
        assert_eq!(config.normalized_forms(label::UNIT).len(), 1);
    }
}
