//! 결과 파일 이름 규칙
//!
//! - 분야 라벨: 파일 이름에서 분야 키워드 찾기
//! - 원본 꼬리: 파일 이름 앞의 "(...)" 접두 제거

use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};

/// 분야 키워드. "건축설비"가 "건축"보다 먼저 와야 한다.
const DISCIPLINES: [&str; 6] = ["건축설비", "토목", "조경", "건축", "기계", "전기"];

pub const DEFAULT_LEFT_LABEL: &str = "왼쪽";
pub const DEFAULT_RIGHT_LABEL: &str = "오른쪽";

lazy_static! {
    static ref LEADING_PAREN_RE: Regex = Regex::new(r"^\s*[(（][^)）]*[)）]\s*").unwrap();
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// 파일 이름의 분야 라벨 (공백 무시)
pub fn detect_discipline(path: &Path) -> Option<&'static str> {
    let name: String = stem(path).chars().filter(|c| !c.is_whitespace()).collect();
    DISCIPLINES.iter().copied().find(|key| name.contains(key))
}

/// 매칭 결과의 (왼쪽, 오른쪽) 라벨
///
/// 두 라벨이 같으면 구분이 안 되므로 기본값을 쓴다.
pub fn match_labels(left: &Path, right: &Path) -> (String, String) {
    let l = detect_discipline(left).unwrap_or(DEFAULT_LEFT_LABEL);
    let r = detect_discipline(right).unwrap_or(DEFAULT_RIGHT_LABEL);
    if l == r {
        return (DEFAULT_LEFT_LABEL.to_string(), DEFAULT_RIGHT_LABEL.to_string());
    }
    (l.to_string(), r.to_string())
}

/// 원본 꼬리: "(설계)내역서" → "내역서"
pub fn source_tail(path: &Path) -> String {
    let stem = stem(path);
    let tail = LEADING_PAREN_RE.replace(&stem, "").trim().to_string();
    if tail.is_empty() {
        stem
    } else {
        tail
    }
}

/// `<출력 폴더>/<꼬리> 검사결과`
pub fn result_dir(output_root: &Path, source: &Path) -> PathBuf {
    output_root.join(format!("{} 검사결과", source_tail(source)))
}

/// `<제목>_<꼬리>.xlsx`
pub fn result_file_name(title: &str, source: &Path) -> String {
    format!("{}_{}.xlsx", title, source_tail(source))
}

/// 매칭 결과 기본 경로: `단가대비표매칭결과/<왼쪽>_vs_<오른쪽>.xlsx`
pub fn default_match_output(left: &Path, right: &Path) -> PathBuf {
    PathBuf::from("단가대비표매칭결과").join(format!("{}_vs_{}.xlsx", stem(left), stem(right)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_discipline_order() {
        assert_eq!(detect_discipline(Path::new("OO청사 건축 설비 내역.xlsx")), Some("건축설비"));
        assert_eq!(detect_discipline(Path::new("OO청사 건축 내역.xlsx")), Some("건축"));
        assert_eq!(detect_discipline(Path::new("/a/토목내역.xlsx")), Some("토목"));
        assert_eq!(detect_discipline(Path::new("내역.xlsx")), None);
    }

    #[test]
    fn test_match_labels_default() {
        let (l, r) = match_labels(Path::new("기계.xlsx"), Path::new("내역.xlsx"));
        assert_eq!((l.as_str(), r.as_str()), ("기계", "오른쪽"));

        let (l, r) = match_labels(Path::new("토목1.xlsx"), Path::new("토목2.xlsx"));
        assert_eq!((l.as_str(), r.as_str()), ("왼쪽", "오른쪽"));
    }

    #[test]
    fn test_source_tail() {
        assert_eq!(source_tail(Path::new("(설계) OO공사 내역서.xlsx")), "OO공사 내역서");
        assert_eq!(source_tail(Path::new("OO공사(2차).xlsx")), "OO공사(2차)");
        assert_eq!(source_tail(Path::new("(설계).xlsx")), "(설계)");
    }

    #[test]
    fn test_result_paths() {
        let src = Path::new("/data/(설계)내역서.xlsx");
        assert_eq!(result_dir(Path::new("out"), src), PathBuf::from("out/내역서 검사결과"));
        assert_eq!(result_file_name("A_일위대가_참조검사_전체", src), "A_일위대가_참조검사_전체_내역서.xlsx");
        assert_eq!(
            default_match_output(Path::new("기계.xlsx"), Path::new("토목.xlsx")),
            PathBuf::from("단가대비표매칭결과/기계_vs_토목.xlsx")
        );
    }
}
