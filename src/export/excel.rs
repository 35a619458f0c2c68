//! xlsx 파일 저장
//!
//! 대상 파일이 다른 프로그램에서 열려 있으면 `이름(1).xlsx`, `이름(2).xlsx` …로 바꿔 저장한다.

use crate::error::{MatchflagError, Result};
use matchflag_common::export::excel_core::{generate_tables_buffer, SheetTable};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAX_RENAME_ATTEMPTS: u32 = 20;
const RETRY_DELAY: Duration = Duration::from_millis(200);

fn numbered_path(path: &Path, k: u32) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}({}).{}", stem, k, ext.to_string_lossy()),
        None => format!("{}({})", stem, k),
    };
    path.with_file_name(name)
}

/// 버퍼 저장. 잠긴 파일이면 번호를 붙여 다시 시도한다.
///
/// # Returns
/// 실제로 저장된 경로
pub fn save_buffer(buffer: &[u8], path: &Path) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut target = path.to_path_buf();
    for k in 1..=MAX_RENAME_ATTEMPTS {
        match std::fs::write(&target, buffer) {
            Ok(()) => return Ok(target),
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                tracing::warn!(path = %target.display(), "파일이 잠겨 있어 이름을 바꿉니다");
                std::thread::sleep(RETRY_DELAY);
                target = numbered_path(path, k);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(MatchflagError::ExcelGeneration(format!(
        "저장할 수 없습니다: {}",
        path.display()
    )))
}

/// 표들을 xlsx로 저장
pub fn write_tables(tables: &[SheetTable], path: &Path) -> Result<PathBuf> {
    let buffer = generate_tables_buffer(tables).map_err(MatchflagError::ExcelGeneration)?;
    save_buffer(&buffer, path)
}
