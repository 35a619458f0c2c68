//! 에러 타입 정의

use thiserror::Error;

/// 공용 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    #[error("헤더 라벨 탐색 실패: {sheet} -> {labels:?}")]
    HeaderNotFound { sheet: String, labels: Vec<String> },

    #[error("시트 없음: {0}")]
    MissingSheet(String),

    #[error("{checker}검사 실패 ({sheet}): {source}")]
    CheckFailed {
        checker: char,
        sheet: String,
        #[source]
        source: Box<Error>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    pub fn header_not_found(sheet: &str, labels: &[&str]) -> Self {
        Error::HeaderNotFound {
            sheet: sheet.to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, Error>;
