//! 결과 내보내기 (CLI·라이브러리 공용)

#[cfg(feature = "excel")]
pub mod excel_core;
