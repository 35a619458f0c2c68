//! 검사 엔진 설정
//!
//! 라벨 별칭, 헤더 탐색 범위, 합계행 판정 규칙을 한 구조체로 묶어
//! 각 컴포넌트에 주입한다.

use crate::alias::LabelAliases;
use serde::{Deserialize, Serialize};

/// 헤더 탐색 범위 (1행/1열부터)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanWindow {
    pub rows: u32,
    pub cols: u32,
}

impl Default for ScanWindow {
    fn default() -> Self {
        Self { rows: 40, cols: 100 }
    }
}

impl ScanWindow {
    /// 공종별집계표 헤더 탐색 범위 기본값
    pub fn summary() -> Self {
        Self { rows: 10, cols: 100 }
    }
}

/// 합계·소계 행 판정 규칙
///
/// 품명에 괄호쌍과 합계 토큰이 함께 있으면 합계행으로 본다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtotalRule {
    pub brackets: Vec<(char, char)>,
    pub tokens: Vec<String>,
}

impl Default for SubtotalRule {
    fn default() -> Self {
        Self {
            brackets: vec![('[', ']'), ('(', ')'), ('【', '】'), ('（', '）'), ('<', '>')],
            tokens: vec!["합계".into(), "소계".into(), "총계".into(), "total".into()],
        }
    }
}

impl SubtotalRule {
    pub fn is_marker(&self, name: &str) -> bool {
        let compact: String = name
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(|c| c.to_lowercase())
            .collect();
        if compact.is_empty() {
            return false;
        }

        let bracketed = self.brackets.iter().any(|(open, close)| {
            match (compact.find(*open), compact.rfind(*close)) {
                (Some(o), Some(c)) => o < c,
                _ => false,
            }
        });

        bracketed
            && self
                .tokens
                .iter()
                .any(|t| compact.contains(&t.to_lowercase()))
    }
}

/// 검사 엔진 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    pub aliases: LabelAliases,
    pub header_window: ScanWindow,
    /// 공종별집계표 헤더 탐색 범위
    pub summary_window: ScanWindow,
    pub subtotal: SubtotalRule,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            aliases: LabelAliases::builtin(),
            header_window: ScanWindow::default(),
            summary_window: ScanWindow::summary(),
            subtotal: SubtotalRule::default(),
        }
    }
}
