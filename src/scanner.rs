use crate::error::{MatchflagError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb"];

/// 엑셀 잠금 파일 접두사
const LOCK_PREFIX: &str = "~$";

fn is_workbook(path: &Path) -> bool {
    let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
        return false;
    };
    if name.starts_with(LOCK_PREFIX) {
        return false;
    }
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            WORKBOOK_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// 폴더 안의 워크북 (하위 폴더 포함, 경로순)
pub fn scan_folder(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(MatchflagError::FolderNotFound(folder.display().to_string()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(folder)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_workbook(e.path()))
        .map(|e| e.path().to_path_buf())
        .collect();

    files.sort();
    Ok(files)
}

/// 입력 목록 정리: 파일은 그대로, 폴더는 펼친다
pub fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            files.extend(scan_folder(input)?);
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            return Err(MatchflagError::FileNotFound(input.display().to_string()));
        }
    }

    if files.is_empty() {
        let joined = inputs
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(MatchflagError::NoWorkbooksFound(joined));
    }

    files.dedup();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_is_workbook() {
        assert!(is_workbook(Path::new("내역서.xlsx")));
        assert!(is_workbook(Path::new("a/B.XLSM")));
        assert!(!is_workbook(Path::new("~$내역서.xlsx")));
        assert!(!is_workbook(Path::new("메모.txt")));
        assert!(!is_workbook(Path::new("xlsx")));
    }

    #[test]
    fn test_scan_folder_not_found() {
        let result = scan_folder(Path::new("/nonexistent/folder"));
        assert!(matches!(result, Err(MatchflagError::FolderNotFound(_))));
    }

    #[test]
    fn test_scan_folder_recursive_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("토목")).unwrap();
        fs::write(dir.path().join("b.xlsx"), b"x").unwrap();
        fs::write(dir.path().join("~$b.xlsx"), b"x").unwrap();
        fs::write(dir.path().join("토목").join("a.xls"), b"x").unwrap();
        fs::write(dir.path().join("readme.md"), b"x").unwrap();

        let files = scan_folder(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("b.xlsx"));
        assert!(files[1].ends_with("토목/a.xls"));
    }

    #[test]
    fn test_collect_inputs_empty_folder() {
        let dir = tempfile::tempdir().unwrap();
        let result = collect_inputs(&[dir.path().to_path_buf()]);
        assert!(matches!(result, Err(MatchflagError::NoWorkbooksFound(_))));
    }

    #[test]
    fn test_collect_inputs_missing_file() {
        let result = collect_inputs(&[PathBuf::from("/nonexistent/x.xlsx")]);
        assert!(matches!(result, Err(MatchflagError::FileNotFound(_))));
    }
}
