use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatchflagError {
    #[error("설정 오류: {0}")]
    Config(String),

    #[error("파일을 찾을 수 없습니다: {0}")]
    FileNotFound(String),

    #[error("폴더를 찾을 수 없습니다: {0}")]
    FolderNotFound(String),

    #[error("워크북을 열 수 없습니다: {0}")]
    WorkbookOpen(String),

    #[error("시트 읽기 오류: {0}")]
    SheetRead(String),

    #[error("Excel 생성 오류: {0}")]
    ExcelGeneration(String),

    #[error("검사할 엑셀 파일이 없습니다: {0}")]
    NoWorkbooksFound(String),

    #[error("JSON 해석 오류: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO 오류: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] matchflag_common::Error),
}

pub type Result<T> = std::result::Result<T, MatchflagError>;
