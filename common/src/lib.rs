//! matchflag 공용 라이브러리
//!
//! 내역서 워크북의 참조 정합성 검사 엔진과 단가대비표 근사 매칭.
//! 파일 입출력은 하지 않는다 (워크북 읽기·결과 저장은 CLI 쪽).

pub mod types;
pub mod alias;
pub mod error;
pub mod config;
pub mod header;
pub mod key;
pub mod detail;
pub mod formula;
pub mod checker;
pub mod similarity;
pub mod matcher;
pub mod export;

pub use types::{Cell, Literal, Sheet, Workbook};
pub use alias::{LabelAliases, normalize_label};
pub use error::{Error, Result};
pub use config::{CheckConfig, ScanWindow, SubtotalRule};
pub use header::{locate, HeaderLayout};
pub use key::{extract_key, keys_equal, normalize, Key, SheetKind};
pub use detail::DetailLayout;
pub use formula::{extract_refs, representative, CellRef, RefScope, RefTarget};
pub use checker::{
    run_all, run_checker, CheckOutcome, CheckRecord, CheckReport, CheckStats, CheckerKind,
    Classification, RecordOrigin,
};
pub use similarity::{spec_similarity, token_sort_ratio};
pub use matcher::{extract_cost_table, match_tables, CostRow, CostTable, MatchOptions, MatchRecord, MatchType};
