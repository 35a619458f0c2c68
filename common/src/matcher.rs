//! 단가대비표 근사 매칭
//!
//! 서로 다른 분야가 만든 두 내역서의 단가대비표 품목을 짝짓는다.
//! 1단계는 품명 완전 일치, 2단계는 가중 유사도(품명 0.8 + 규격 0.2).

use crate::alias::{label, LabelAliases};
use crate::config::ScanWindow;
use crate::error::Result;
use crate::header::locate;
use crate::key::normalize_text;
use crate::similarity::{spec_similarity, token_sort_ratio};
use crate::types::Sheet;
use serde::{Deserialize, Serialize};

/// 비교표 헤더 라벨 (열 순서)
pub const COST_LABELS: [&str; 6] = [
    label::NAME,
    label::SPEC,
    label::UNIT,
    label::MATERIAL_APPLIED,
    label::LABOR,
    label::EXPENSE_APPLIED,
];

const NAME_WEIGHT: f64 = 0.8;
const SPEC_WEIGHT: f64 = 0.2;

/// 매칭 옵션
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// 가중 유사도 하한 (이상이면 채택)
    pub threshold: f64,
    pub header_window: ScanWindow,
    pub aliases: LabelAliases,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            threshold: 30.0,
            header_window: ScanWindow { rows: 10, cols: 100 },
            aliases: LabelAliases::builtin(),
        }
    }
}

/// 단가대비표 한 행
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRow {
    pub row: u32,
    pub name: String,
    pub spec: String,
    pub unit: String,
    pub material: Option<f64>,
    pub labor: Option<f64>,
    pub expense: Option<f64>,
}

impl CostRow {
    pub fn new(name: &str, spec: &str) -> Self {
        Self {
            row: 0,
            name: name.to_string(),
            spec: spec.to_string(),
            unit: String::new(),
            material: None,
            labor: None,
            expense: None,
        }
    }

    pub fn with_prices(mut self, material: f64, labor: f64, expense: f64) -> Self {
        self.material = Some(material);
        self.labor = Some(labor);
        self.expense = Some(expense);
        self
    }

    fn normalized_name(&self) -> String {
        normalize_text(&self.name)
    }
}

/// 핵심 열만 남긴 비교표
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostTable {
    pub sheet: String,
    pub header_row: u32,
    pub rows: Vec<CostRow>,
}

impl CostTable {
    pub fn from_rows(rows: Vec<CostRow>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// 비교표 추출
///
/// 품명이 빈 행은 버리고, 빈 규격은 ""로 둔다. 단가는 숫자로 읽히지 않으면 None.
///
/// # Errors
/// 창 안에서 헤더를 못 찾으면 `Error::HeaderNotFound`
pub fn extract_cost_table(sheet: &Sheet, options: &MatchOptions) -> Result<CostTable> {
    let layout = locate(sheet, &COST_LABELS, &options.aliases, options.header_window)?;
    let col = |l: &str| layout.column(l).unwrap_or(0);
    let (name_col, spec_col, unit_col) = (col(label::NAME), col(label::SPEC), col(label::UNIT));
    let (material_col, labor_col, expense_col) = (
        col(label::MATERIAL_APPLIED),
        col(label::LABOR),
        col(label::EXPENSE_APPLIED),
    );

    let text = |row: u32, c: u32| sheet.cell(row, c).as_text().unwrap_or_default();
    let price = |row: u32, c: u32| sheet.cell(row, c).value().and_then(|v| v.as_f64());

    let mut rows = Vec::new();
    for row in layout.row + 1..=sheet.max_row() {
        let name = text(row, name_col);
        if name.is_empty() {
            continue;
        }
        rows.push(CostRow {
            row,
            name,
            spec: text(row, spec_col),
            unit: text(row, unit_col),
            material: price(row, material_col),
            labor: price(row, labor_col),
            expense: price(row, expense_col),
        });
    }

    tracing::debug!(sheet = %sheet.name, header_row = layout.row, rows = rows.len(), "비교표 추출");

    Ok(CostTable {
        sheet: sheet.name.clone(),
        header_row: layout.row,
        rows,
    })
}

/// 매칭 유형
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchType {
    ExactName,
    WeightedSimilarity,
}

impl MatchType {
    pub fn label(&self) -> &'static str {
        match self {
            MatchType::ExactName => "품명완전일치",
            MatchType::WeightedSimilarity => "가중유사도",
        }
    }
}

/// 매칭 결과 한 줄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub left: CostRow,
    pub right: CostRow,
    pub match_type: MatchType,
    pub name_similarity: f64,
    pub spec_similarity: f64,
    pub combined: f64,
}

impl MatchRecord {
    /// 재료비·노무비·경비가 모두 같은지
    pub fn prices_equal(&self) -> bool {
        self.left.material == self.right.material
            && self.left.labor == self.right.labor
            && self.left.expense == self.right.expense
    }
}

fn combined(name: f64, spec: f64) -> f64 {
    NAME_WEIGHT * name + SPEC_WEIGHT * spec
}

fn match_row(left: &CostRow, right: &CostTable, threshold: f64) -> Option<MatchRecord> {
    let left_name = left.normalized_name();

    // 1단계: 품명 완전 일치 중 규격이 가장 비슷한 것
    let mut exact: Option<(&CostRow, f64)> = None;
    for candidate in right.rows.iter().filter(|r| r.normalized_name() == left_name) {
        let spec = spec_similarity(&left.spec, &candidate.spec);
        if exact.map(|(_, best)| spec > best).unwrap_or(true) {
            exact = Some((candidate, spec));
        }
    }
    if let Some((chosen, spec)) = exact {
        return Some(MatchRecord {
            left: left.clone(),
            right: chosen.clone(),
            match_type: MatchType::ExactName,
            name_similarity: 100.0,
            spec_similarity: spec,
            combined: combined(100.0, spec),
        });
    }

    // 2단계: 가중 유사도 최댓값
    let mut best: Option<(&CostRow, f64, f64, f64)> = None;
    for candidate in &right.rows {
        let name = token_sort_ratio(&left_name, &candidate.normalized_name());
        let spec = spec_similarity(&left.spec, &candidate.spec);
        let score = combined(name, spec);
        if best.map(|(_, _, _, s)| score > s).unwrap_or(true) {
            best = Some((candidate, name, spec, score));
        }
    }

    let (chosen, name, spec, score) = best?;
    if score < threshold {
        return None;
    }
    Some(MatchRecord {
        left: left.clone(),
        right: chosen.clone(),
        match_type: MatchType::WeightedSimilarity,
        name_similarity: name,
        spec_similarity: spec,
        combined: score,
    })
}

/// 두 비교표 매칭
///
/// 왼쪽 행마다 최대 하나의 기록. 적당한 후보가 없는 행은 조용히 빠진다.
/// 결과는 종합 유사도 내림차순 (같은 점수는 왼쪽 순서 유지).
pub fn match_tables(left: &CostTable, right: &CostTable, options: &MatchOptions) -> Vec<MatchRecord> {
    let mut records: Vec<MatchRecord> = left
        .rows
        .iter()
        .filter_map(|row| match_row(row, right, options.threshold))
        .collect();

    records.sort_by(|a, b| b.combined.total_cmp(&a.combined));

    tracing::debug!(
        left = left.len(),
        right = right.len(),
        matched = records.len(),
        "매칭 완료"
    );
    records
}
