//! 참조 정합성 검사 (A~E)
//!
//! 다섯 검사는 같은 알고리즘을 공유하고 [`CheckerSpec`] 서술자만 다르다:
//!
//! 1. 원본 시트의 헤더를 찾는다
//! 2. 헤더 아래 각 행의 키를 뽑는다 (빈 행, 합계행은 건너뜀)
//! 3. 훑을 열의 수식에서 범위 안의 시트 참조를 모은다
//! 4. 대표 참조를 골라 대상 행의 키로 해석한다
//! 5. 원본 키와 비교해 Match / Mismatch / Exempt로 분류한다
//!
//! 참조가 없는 행은 값 열에 직접 입력된 리터럴이 있으면 "직접 입력"으로 기록한다.

mod resolve;

pub use resolve::{is_equipment_sheet, Resolved, Resolver};

use crate::alias::label;
use crate::config::{CheckConfig, ScanWindow};
use crate::error::{Error, Result};
use crate::formula::{extract_refs, representative, CellRef, RefScope, RefTarget};
use crate::header::{locate, HeaderLayout};
use crate::key::{extract_key, Key, SheetKind};
use crate::types::{coordinate, Cell, Literal, Sheet, Workbook};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 검사 대상 시트 이름
pub mod sheet_name {
    pub const DETAIL: &str = "일위대가";
    pub const ITEM_LIST: &str = "일위대가목록";
    pub const UNIT_PRICE: &str = "단가대비표";
    pub const STATEMENT: &str = "공종별내역서";
    pub const SUMMARY: &str = "공종별집계표";
}

/// 기록에 남기는 수식 발췌 길이
const FORMULA_EXCERPT_CHARS: usize = 140;

/// 검사 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CheckerKind {
    A,
    B,
    C,
    D,
    E,
}

impl CheckerKind {
    pub const ALL: [CheckerKind; 5] = [
        CheckerKind::A,
        CheckerKind::B,
        CheckerKind::C,
        CheckerKind::D,
        CheckerKind::E,
    ];

    pub fn letter(&self) -> char {
        match self {
            CheckerKind::A => 'A',
            CheckerKind::B => 'B',
            CheckerKind::C => 'C',
            CheckerKind::D => 'D',
            CheckerKind::E => 'E',
        }
    }

    /// 결과 파일·요약에 쓰는 제목
    pub fn title(&self) -> &'static str {
        match self {
            CheckerKind::A => "A_일위대가_참조검사",
            CheckerKind::B => "B_일위대가목록_참조검사",
            CheckerKind::C => "C_공종별내역서_참조검사",
            CheckerKind::D => "D_공종별집계표_참조검사",
            CheckerKind::E => "E_단가대비표_참조검사",
        }
    }

    pub fn source_sheet(&self) -> &'static str {
        match self {
            CheckerKind::A => sheet_name::DETAIL,
            CheckerKind::B => sheet_name::ITEM_LIST,
            CheckerKind::C => sheet_name::STATEMENT,
            CheckerKind::D => sheet_name::SUMMARY,
            CheckerKind::E => sheet_name::UNIT_PRICE,
        }
    }

    /// 이 검사의 서술자
    pub fn spec(&self) -> CheckerSpec {
        match self {
            CheckerKind::A => CheckerSpec {
                kind: *self,
                source_kind: SheetKind::Detail,
                header_labels: vec![label::NAME, label::SPEC, label::UNIT, label::QUANTITY],
                header_window: HeaderWindow::General,
                scope: RefScope::sheets(&[sheet_name::UNIT_PRICE, sheet_name::ITEM_LIST]),
                scan: ScanMode::WholeRow,
                resolution: Resolution::SameRowByHeaderType,
                granularity: Granularity::FullKey,
                exemption: Exemption::PercentMarker,
                unresolved: Unresolved::Mismatch,
                existing_targets_only: false,
                value_columns: vec![label::QUANTITY],
            },
            CheckerKind::B => CheckerSpec {
                kind: *self,
                source_kind: SheetKind::Plain,
                header_labels: vec![label::CODE, label::NAME, label::SPEC],
                header_window: HeaderWindow::General,
                scope: RefScope::sheets(&[sheet_name::DETAIL]),
                scan: ScanMode::WholeRow,
                resolution: Resolution::NearestHeader,
                granularity: Granularity::FullKey,
                exemption: Exemption::None,
                unresolved: Unresolved::Mismatch,
                existing_targets_only: false,
                value_columns: vec![],
            },
            CheckerKind::C => CheckerSpec {
                kind: *self,
                source_kind: SheetKind::Plain,
                header_labels: vec![label::NAME, label::SPEC, label::TOTAL_UNIT_PRICE],
                header_window: HeaderWindow::General,
                scope: RefScope::Any,
                scan: ScanMode::WholeRow,
                resolution: Resolution::SameRow,
                granularity: Granularity::FullKey,
                exemption: Exemption::None,
                unresolved: Unresolved::Mismatch,
                existing_targets_only: false,
                value_columns: vec![label::TOTAL_UNIT_PRICE],
            },
            CheckerKind::D => CheckerSpec {
                kind: *self,
                source_kind: SheetKind::Plain,
                header_labels: vec![
                    label::NAME,
                    label::SPEC,
                    label::MATERIAL_UNIT_PRICE,
                    label::LABOR_UNIT_PRICE,
                    label::EXPENSE_UNIT_PRICE,
                ],
                header_window: HeaderWindow::Summary,
                scope: RefScope::Any,
                scan: ScanMode::Designated(vec![
                    label::MATERIAL_UNIT_PRICE,
                    label::LABOR_UNIT_PRICE,
                    label::EXPENSE_UNIT_PRICE,
                ]),
                resolution: Resolution::NearestHeader,
                granularity: Granularity::NameOnly,
                exemption: Exemption::None,
                unresolved: Unresolved::Mismatch,
                existing_targets_only: false,
                value_columns: vec![
                    label::MATERIAL_UNIT_PRICE,
                    label::LABOR_UNIT_PRICE,
                    label::EXPENSE_UNIT_PRICE,
                ],
            },
            CheckerKind::E => CheckerSpec {
                kind: *self,
                source_kind: SheetKind::Plain,
                header_labels: vec![label::NAME, label::SPEC, label::MATERIAL_APPLIED, label::LABOR],
                header_window: HeaderWindow::General,
                scope: RefScope::Any,
                scan: ScanMode::PerColumn(vec![label::MATERIAL_APPLIED, label::LABOR]),
                resolution: Resolution::HeaderPairFallback,
                granularity: Granularity::FullKey,
                exemption: Exemption::None,
                unresolved: Unresolved::Unset,
                existing_targets_only: true,
                value_columns: vec![],
            },
        }
    }
}

impl std::fmt::Display for CheckerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for CheckerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(CheckerKind::A),
            "B" => Ok(CheckerKind::B),
            "C" => Ok(CheckerKind::C),
            "D" => Ok(CheckerKind::D),
            "E" => Ok(CheckerKind::E),
            other => Err(Error::Config(format!("알 수 없는 검사: {}", other))),
        }
    }
}

/// 행에서 수식을 훑는 방식
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanMode {
    /// 행의 모든 열, 참조 전체에서 대표 하나
    WholeRow,
    /// 지정 열들, 참조 전체에서 대표 하나
    Designated(Vec<&'static str>),
    /// 지정 열마다 따로, 그 열의 첫 참조
    PerColumn(Vec<&'static str>),
}

/// 대상 키 해석 전략
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// 같은 행. 단가대비표는 품명/규격/단위, 그 외는 품명/규격 헤더
    SameRowByHeaderType,
    /// 같은 행, 품명/규격 헤더
    SameRow,
    /// 일위대가형이면 최근접 블록 헤더, 아니면 같은 행
    NearestHeader,
    /// 헤더 쌍을 순서대로 시도
    HeaderPairFallback,
}

/// 비교 단위
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    FullKey,
    NameOnly,
}

/// 불일치 면제 규칙
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exemption {
    None,
    /// 원본 키에 '%'가 있으면 Exempt
    PercentMarker,
}

/// 대상 키를 못 찾았을 때의 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unresolved {
    Mismatch,
    /// 분류 없음
    Unset,
}

/// 원본 헤더를 찾을 범위
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderWindow {
    /// `CheckConfig::header_window`
    General,
    /// `CheckConfig::summary_window` (집계표 헤더는 위쪽 몇 줄 안에 있다)
    Summary,
}

/// 검사 서술자
#[derive(Debug, Clone)]
pub struct CheckerSpec {
    pub kind: CheckerKind,
    pub source_kind: SheetKind,
    pub header_labels: Vec<&'static str>,
    pub header_window: HeaderWindow,
    pub scope: RefScope,
    pub scan: ScanMode,
    pub resolution: Resolution,
    pub granularity: Granularity,
    pub exemption: Exemption,
    pub unresolved: Unresolved,
    /// 워크북에 없는 시트 참조는 버린다
    pub existing_targets_only: bool,
    /// 직접 입력을 확인할 값 열
    pub value_columns: Vec<&'static str>,
}

impl CheckerSpec {
    pub fn source_sheet(&self) -> &'static str {
        self.kind.source_sheet()
    }

    fn window(&self, config: &CheckConfig) -> ScanWindow {
        match self.header_window {
            HeaderWindow::General => config.header_window,
            HeaderWindow::Summary => config.summary_window,
        }
    }

    fn compare(&self, source: &Key, target: &Key) -> bool {
        match self.granularity {
            Granularity::FullKey => source.normalized() == target.normalized(),
            Granularity::NameOnly => source.normalized_name() == target.normalized_name(),
        }
    }

    fn exempt(&self, source: &Key) -> bool {
        match self.exemption {
            Exemption::None => false,
            Exemption::PercentMarker => source.mentions("%") || source.mentions("％"),
        }
    }

    /// 분류. 대상 키가 없으면 `unresolved` 규칙을 따른다.
    pub fn classify(&self, source: &Key, target: Option<&Key>) -> Option<Classification> {
        let base = match target {
            Some(t) if self.compare(source, t) => Classification::Match,
            Some(_) => Classification::Mismatch,
            None => match self.unresolved {
                Unresolved::Mismatch => Classification::Mismatch,
                Unresolved::Unset => return None,
            },
        };
        if base == Classification::Mismatch && self.exempt(source) {
            return Some(Classification::Exempt);
        }
        Some(base)
    }
}

/// 분류 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    Match,
    Mismatch,
    Exempt,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Match => "Match",
            Classification::Mismatch => "Mismatch",
            Classification::Exempt => "Exempt",
        }
    }
}

/// 기록의 출처
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecordOrigin {
    /// 수식 참조
    Reference,
    /// 값 열에 직접 입력된 리터럴
    DirectInput { value: String },
}

/// 검사 기록 한 줄
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRecord {
    pub checker: CheckerKind,
    pub source_sheet: String,
    pub source_row: u32,
    /// 수식(또는 직접 입력)이 있던 셀 ("F12")
    pub cell: String,
    /// 값을 읽은 열 라벨 (열별 검사)
    pub column_label: Option<String>,
    pub source_key: Key,
    pub references: Vec<CellRef>,
    pub representative: Option<RefTarget>,
    pub target_key: Option<Key>,
    /// 대상 키를 만든 헤더 쌍
    pub target_headers: Option<String>,
    pub classification: Option<Classification>,
    pub origin: RecordOrigin,
    /// 수식 발췌 (140자 초과분은 "...")
    pub formula: Option<String>,
}

impl CheckRecord {
    pub fn is_direct_input(&self) -> bool {
        matches!(self.origin, RecordOrigin::DirectInput { .. })
    }

    pub fn is_mismatch(&self) -> bool {
        self.classification == Some(Classification::Mismatch)
    }
}

/// 검사 집계
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckStats {
    pub rows_scanned: usize,
    pub rows_with_refs: usize,
    pub references: usize,
    pub matched: usize,
    pub mismatched: usize,
    pub exempt: usize,
    pub unset: usize,
    pub unresolved: usize,
    pub direct_input: usize,
}

impl CheckStats {
    fn count(&mut self, record: &CheckRecord) {
        match record.classification {
            Some(Classification::Match) => self.matched += 1,
            Some(Classification::Mismatch) => self.mismatched += 1,
            Some(Classification::Exempt) => self.exempt += 1,
            None => self.unset += 1,
        }
        if record.is_direct_input() {
            self.direct_input += 1;
        } else if record.target_key.is_none() {
            self.unresolved += 1;
        }
    }
}

/// 검사 하나의 결과
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    pub kind: CheckerKind,
    pub sheet: String,
    pub header_row: u32,
    pub records: Vec<CheckRecord>,
    pub stats: CheckStats,
}

impl CheckReport {
    pub fn mismatches(&self) -> impl Iterator<Item = &CheckRecord> {
        self.records.iter().filter(|r| r.is_mismatch())
    }

    pub fn matches(&self) -> impl Iterator<Item = &CheckRecord> {
        self.records
            .iter()
            .filter(|r| r.classification == Some(Classification::Match))
    }
}

/// 일괄 실행 결과 (검사마다 성공/실패)
#[derive(Debug)]
pub struct CheckOutcome {
    pub kind: CheckerKind,
    pub result: Result<CheckReport>,
}

fn excerpt(formula: &str) -> String {
    if formula.chars().count() <= FORMULA_EXCERPT_CHARS {
        return formula.to_string();
    }
    let head: String = formula.chars().take(FORMULA_EXCERPT_CHARS).collect();
    format!("{}...", head)
}

/// 직접 입력으로 볼 리터럴: 공백 아닌 문자열 또는 0 아닌 숫자
fn direct_literal(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Literal(Literal::Text(s)) if !s.trim().is_empty() && !Literal::Text(s.clone()).is_zero() => {
            Some(s.trim().to_string())
        }
        Cell::Literal(lit @ Literal::Number(_)) if !lit.is_zero() => Some(lit.to_string()),
        _ => None,
    }
}

/// 한 셀에서 모은 참조
struct CellRefs {
    col: u32,
    formula: String,
    refs: Vec<CellRef>,
}

fn scan_cell(sheet: &Sheet, spec: &CheckerSpec, workbook: &Workbook, row: u32, col: u32) -> Option<CellRefs> {
    let formula = sheet.cell(row, col).formula_text()?;
    let mut refs = extract_refs(formula, &spec.scope, &sheet.name);
    if spec.existing_targets_only {
        refs.retain(|r| workbook.contains(&r.sheet));
    }
    if refs.is_empty() {
        return None;
    }
    Some(CellRefs {
        col,
        formula: formula.to_string(),
        refs,
    })
}

struct Run<'a> {
    workbook: &'a Workbook,
    sheet: &'a Sheet,
    spec: &'a CheckerSpec,
    layout: HeaderLayout,
    resolver: Resolver<'a>,
    records: Vec<CheckRecord>,
    stats: CheckStats,
}

impl<'a> Run<'a> {
    fn columns(&self, labels: &[&'static str]) -> Vec<(&'static str, u32)> {
        labels
            .iter()
            .filter_map(|l| self.layout.column(l).map(|c| (*l, c)))
            .collect()
    }

    fn push(&mut self, record: CheckRecord) {
        tracing::debug!(
            checker = %record.checker,
            row = record.source_row,
            classification = ?record.classification,
            "{} -> {}",
            record.source_key,
            record.target_key.as_ref().map(|k| k.to_string()).unwrap_or_default()
        );
        self.stats.count(&record);
        self.records.push(record);
    }

    /// 대표 참조 하나로 기록을 만든다
    fn reference_record(
        &mut self,
        row: u32,
        key: &Key,
        column_label: Option<&str>,
        cell: &CellRefs,
        refs: Vec<CellRef>,
        target: RefTarget,
    ) -> CheckRecord {
        let resolved = self.resolver.resolve(self.spec.resolution, &target.sheet, target.row);
        let (target_key, target_headers) = match resolved {
            Some(r) => (Some(r.key), Some(r.headers)),
            None => (None, None),
        };
        CheckRecord {
            checker: self.spec.kind,
            source_sheet: self.sheet.name.clone(),
            source_row: row,
            cell: coordinate(row, cell.col),
            column_label: column_label.map(str::to_string),
            source_key: key.clone(),
            references: refs,
            representative: Some(target),
            classification: self.spec.classify(key, target_key.as_ref()),
            target_key,
            target_headers,
            origin: RecordOrigin::Reference,
            formula: Some(excerpt(&cell.formula)),
        }
    }

    fn direct_input(&mut self, row: u32, key: &Key) {
        let columns = self.columns(&self.spec.value_columns);
        for (label, col) in columns {
            let Some(value) = direct_literal(self.sheet.cell(row, col)) else {
                continue;
            };
            let record = CheckRecord {
                checker: self.spec.kind,
                source_sheet: self.sheet.name.clone(),
                source_row: row,
                cell: coordinate(row, col),
                column_label: Some(label.to_string()),
                source_key: key.clone(),
                references: Vec::new(),
                representative: None,
                target_key: None,
                target_headers: None,
                classification: self.spec.classify(key, None),
                origin: RecordOrigin::DirectInput { value },
                formula: None,
            };
            self.push(record);
            // 행당 하나
            return;
        }
    }

    /// 여러 셀의 참조를 합쳐 대표 하나
    fn union_row(&mut self, row: u32, key: &Key, cols: Vec<u32>) {
        let cells: Vec<CellRefs> = cols
            .into_iter()
            .filter_map(|c| scan_cell(self.sheet, self.spec, self.workbook, row, c))
            .collect();

        if cells.is_empty() {
            self.direct_input(row, key);
            return;
        }

        let refs: Vec<CellRef> = cells.iter().flat_map(|c| c.refs.iter().cloned()).collect();
        self.stats.rows_with_refs += 1;
        self.stats.references += refs.len();

        let Some(target) = representative(&refs) else {
            return;
        };
        // 대표를 처음 가리킨 셀
        let Some(origin) = cells
            .iter()
            .find(|c| c.refs.iter().any(|r| r.target() == target))
        else {
            return;
        };
        let record = self.reference_record(row, key, None, origin, refs.clone(), target);
        self.push(record);
    }

    /// 열마다 첫 참조로 기록
    fn per_column_row(&mut self, row: u32, key: &Key, columns: Vec<(&'static str, u32)>) {
        let mut any = false;
        for (label, col) in columns {
            let Some(cell) = scan_cell(self.sheet, self.spec, self.workbook, row, col) else {
                continue;
            };
            if !any {
                self.stats.rows_with_refs += 1;
                any = true;
            }
            self.stats.references += cell.refs.len();
            let target = cell.refs[0].target();
            let refs = cell.refs.clone();
            let record = self.reference_record(row, key, Some(label), &cell, refs, target);
            self.push(record);
        }
        if !any {
            self.direct_input(row, key);
        }
    }

    fn execute(mut self, config: &CheckConfig) -> CheckReport {
        let spec = self.spec;
        let name_col = self.layout.column(label::NAME);
        let spec_col = self.layout.column(label::SPEC);
        let (Some(name_col), Some(spec_col)) = (name_col, spec_col) else {
            return self.finish();
        };

        for row in self.layout.row + 1..=self.sheet.max_row() {
            let Some(key) = extract_key(self.sheet, row, name_col, spec_col, spec.source_kind) else {
                continue;
            };
            if key.is_empty() || config.subtotal.is_marker(key.name_text()) {
                continue;
            }
            self.stats.rows_scanned += 1;

            match &spec.scan {
                ScanMode::WholeRow => {
                    let cols = (1..=self.sheet.max_col()).collect();
                    self.union_row(row, &key, cols);
                }
                ScanMode::Designated(labels) => {
                    let cols = self.columns(labels).into_iter().map(|(_, c)| c).collect();
                    self.union_row(row, &key, cols);
                }
                ScanMode::PerColumn(labels) => {
                    let columns = self.columns(labels);
                    self.per_column_row(row, &key, columns);
                }
            }
        }

        self.finish()
    }

    fn finish(self) -> CheckReport {
        CheckReport {
            kind: self.spec.kind,
            sheet: self.sheet.name.clone(),
            header_row: self.layout.row,
            records: self.records,
            stats: self.stats,
        }
    }
}

/// 서술자대로 검사 실행
///
/// # Errors
/// - 원본 시트가 없으면 `Error::MissingSheet`
/// - 원본 헤더가 창 안에 없으면 `Error::HeaderNotFound`
pub fn run_spec(workbook: &Workbook, spec: &CheckerSpec, config: &CheckConfig) -> Result<CheckReport> {
    let sheet = workbook
        .sheet(spec.source_sheet())
        .ok_or_else(|| Error::MissingSheet(spec.source_sheet().to_string()))?;
    let layout = locate(sheet, &spec.header_labels, &config.aliases, spec.window(config))?;

    tracing::debug!(
        checker = %spec.kind,
        sheet = %sheet.name,
        header_row = layout.row,
        "헤더 확인"
    );

    let run = Run {
        workbook,
        sheet,
        spec,
        layout,
        resolver: Resolver::new(workbook, config),
        records: Vec::new(),
        stats: CheckStats::default(),
    };
    Ok(run.execute(config))
}

/// 검사 하나 실행. 실패는 `Error::CheckFailed`로 감싼다.
pub fn run_checker(workbook: &Workbook, kind: CheckerKind, config: &CheckConfig) -> Result<CheckReport> {
    let spec = kind.spec();
    run_spec(workbook, &spec, config).map_err(|e| Error::CheckFailed {
        checker: kind.letter(),
        sheet: kind.source_sheet().to_string(),
        source: Box::new(e),
    })
}

/// 여러 검사 실행. 하나가 실패해도 나머지는 계속한다.
pub fn run_all(workbook: &Workbook, kinds: &[CheckerKind], config: &CheckConfig) -> Vec<CheckOutcome> {
    kinds
        .iter()
        .map(|&kind| {
            let result = run_checker(workbook, kind, config);
            match &result {
                Ok(report) => tracing::info!(
                    checker = %kind,
                    records = report.records.len(),
                    mismatched = report.stats.mismatched,
                    "검사 완료"
                ),
                Err(e) => tracing::warn!(checker = %kind, "{}", e),
            }
            CheckOutcome { kind, result }
        })
        .collect()
}
