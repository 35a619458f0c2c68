//! matchflag: 내역서 워크북 참조 정합성 검사·단가대비표 매칭
//!
//! 검사 엔진은 `matchflag-common`에 있고, 이 크레이트는 파일 읽기·결과 저장·CLI를 맡는다.

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod loader;
pub mod naming;
pub mod report;
pub mod scanner;

use error::Result;
use matchflag_common::checker::{run_all, CheckOutcome, CheckerKind};
use matchflag_common::matcher::{extract_cost_table, match_tables, MatchOptions, MatchRecord};
use matchflag_common::{CheckConfig, Error as CommonError};
use std::path::Path;

/// 단가대비표 시트 이름
pub const COST_SHEET: &str = "단가대비표";

/// 파일 하나 검사
pub fn check_file(path: &Path, kinds: &[CheckerKind], config: &CheckConfig) -> Result<Vec<CheckOutcome>> {
    let workbook = loader::load_workbook(path)?;
    tracing::info!(file = %path.display(), sheets = workbook.sheet_names().len(), "워크북 읽음");
    Ok(run_all(&workbook, kinds, config))
}

/// 두 파일의 단가대비표 매칭
pub fn match_files(left: &Path, right: &Path, options: &MatchOptions) -> Result<Vec<MatchRecord>> {
    let left_wb = loader::load_workbook(left)?;
    let right_wb = loader::load_workbook(right)?;

    let left_sheet = left_wb
        .sheet(COST_SHEET)
        .ok_or_else(|| CommonError::MissingSheet(format!("{} ({})", COST_SHEET, left.display())))?;
    let right_sheet = right_wb
        .sheet(COST_SHEET)
        .ok_or_else(|| CommonError::MissingSheet(format!("{} ({})", COST_SHEET, right.display())))?;

    let left_table = extract_cost_table(left_sheet, options)?;
    let right_table = extract_cost_table(right_sheet, options)?;
    tracing::info!(left = left_table.len(), right = right_table.len(), "단가대비표 추출");

    Ok(match_tables(&left_table, &right_table, options))
}
