//! 엑셀 워크북 읽기 (calamine → 검사용 워크북 모델)
//!
//! 값과 수식 텍스트를 모두 읽는다. 수식 셀은 캐시된 값이 있으면 함께 보관한다.

use crate::error::{MatchflagError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader, Sheets};
use matchflag_common::{Cell, Literal, Sheet, Workbook};
use std::io::{Cursor, Read, Seek};
use std::path::Path;

/// 파일 경로에서 워크북 읽기 (xlsx/xlsm/xls/xlsb/ods)
pub fn load_workbook(path: &Path) -> Result<Workbook> {
    if !path.exists() {
        return Err(MatchflagError::FileNotFound(path.display().to_string()));
    }
    let bytes = std::fs::read(path)?;
    load_workbook_from_bytes(bytes)
        .map_err(|e| match e {
            MatchflagError::WorkbookOpen(msg) => MatchflagError::WorkbookOpen(format!("{}: {}", path.display(), msg)),
            other => other,
        })
}

/// 바이트에서 워크북 읽기 (형식은 내용으로 판별)
pub fn load_workbook_from_bytes(bytes: Vec<u8>) -> Result<Workbook> {
    let mut sheets = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| MatchflagError::WorkbookOpen(e.to_string()))?;
    read_sheets(&mut sheets)
}

fn literal(data: &Data) -> Option<Literal> {
    match data {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(Literal::Text(s.clone())),
        Data::Float(n) => Some(Literal::Number(*n)),
        Data::Int(n) => Some(Literal::Number(*n as f64)),
        Data::Bool(b) => Some(Literal::Bool(*b)),
        Data::Error(e) => Some(Literal::Text(format!("#{:?}", e))),
        // 날짜는 일련번호로 둔다
        Data::DateTime(dt) => Some(Literal::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(Literal::Text(s.clone())),
    }
}

fn read_sheets<RS: Read + Seek>(workbook: &mut Sheets<RS>) -> Result<Workbook> {
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let mut result = Workbook::new();

    for sheet_name in &sheet_names {
        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| MatchflagError::SheetRead(format!("{}: {}", sheet_name, e)))?;

        let mut sheet = Sheet::new(sheet_name.as_str());

        // 범위가 A1에서 시작하지 않을 수 있다 (0-based)
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        for (row_idx, row) in range.rows().enumerate() {
            for (col_idx, data) in row.iter().enumerate() {
                if let Some(value) = literal(data) {
                    let r = start_row + row_idx as u32 + 1;
                    let c = start_col + col_idx as u32 + 1;
                    sheet.set(r, c, Cell::Literal(value));
                }
            }
        }

        // 수식 텍스트 (없는 형식이면 값만)
        match workbook.worksheet_formula(sheet_name) {
            Ok(formulas) => {
                let (start_row, start_col) = formulas.start().unwrap_or((0, 0));
                for (row_idx, row) in formulas.rows().enumerate() {
                    for (col_idx, text) in row.iter().enumerate() {
                        if text.is_empty() {
                            continue;
                        }
                        let r = start_row + row_idx as u32 + 1;
                        let c = start_col + col_idx as u32 + 1;
                        let cached = sheet.cell(r, c).value().cloned();
                        sheet.set(
                            r,
                            c,
                            Cell::Formula {
                                cached,
                                text: text.clone(),
                            },
                        );
                    }
                }
            }
            Err(e) => {
                tracing::debug!(sheet = %sheet_name, "수식을 읽지 못함: {}", e);
            }
        }

        tracing::debug!(
            sheet = %sheet_name,
            cells = sheet.cell_count(),
            rows = sheet.max_row(),
            cols = sheet.max_col(),
            "시트 읽음"
        );
        result.add_sheet(sheet);
    }

    Ok(result)
}
