pub mod excel;

use crate::error::Result;
use crate::naming::{result_dir, result_file_name};
use matchflag_common::export::excel_core::{check_split_tables, match_table};
use matchflag_common::{CheckReport, MatchRecord};
use std::path::{Path, PathBuf};

/// 검사 결과 저장
///
/// 검사마다 `<제목>_전체`, `_불일치` (A·C는 `_일치`도) 파일을
/// `<출력 폴더>/<원본 꼬리> 검사결과/`에 쓴다.
pub fn export_check_reports(reports: &[CheckReport], source: &Path, output_root: &Path) -> Result<Vec<PathBuf>> {
    let dir = result_dir(output_root, source);
    let mut written = Vec::new();

    for report in reports {
        for (suffix, table) in check_split_tables(report.kind, &report.records) {
            let title = format!("{}_{}", report.kind.title(), suffix);
            let path = dir.join(result_file_name(&title, source));
            let saved = excel::write_tables(std::slice::from_ref(&table), &path)?;
            tracing::debug!(path = %saved.display(), rows = table.rows.len(), "결과 저장");
            written.push(saved);
        }
    }

    Ok(written)
}

/// 매칭 결과 저장 (시트 이름 `<왼쪽>_vs_<오른쪽>`)
pub fn export_matches(records: &[MatchRecord], left_label: &str, right_label: &str, output: &Path) -> Result<PathBuf> {
    let table = match_table(records, left_label, right_label);
    excel::write_tables(&[table], output)
}
