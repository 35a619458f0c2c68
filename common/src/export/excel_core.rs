//! 검사·매칭 결과 xlsx 생성 (공용)
//!
//! 결과를 표(SheetTable)로 바꾼 뒤 rust_xlsxwriter로 버퍼에 쓴다.
//! 파일 위치와 저장은 호출하는 쪽이 정한다.

use crate::checker::{CheckRecord, CheckerKind, Classification, RecordOrigin};
use crate::matcher::MatchRecord;
use rust_xlsxwriter::*;

/// 표의 셀 값
#[derive(Debug, Clone, PartialEq)]
pub enum TableCell {
    Empty,
    Text(String),
    Number(f64),
    /// 수식과 미리 계산한 결과
    Formula { text: String, result: String },
}

impl From<&str> for TableCell {
    fn from(s: &str) -> Self {
        TableCell::Text(s.to_string())
    }
}

impl From<String> for TableCell {
    fn from(s: String) -> Self {
        TableCell::Text(s)
    }
}

impl From<Option<f64>> for TableCell {
    fn from(v: Option<f64>) -> Self {
        v.map(TableCell::Number).unwrap_or(TableCell::Empty)
    }
}

/// 시트 하나 분량의 표
#[derive(Debug, Clone, Default)]
pub struct SheetTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<TableCell>>,
    pub autofilter: bool,
}

impl SheetTable {
    pub fn new(name: &str, headers: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
            autofilter: false,
        }
    }
}

/// 분류 표시 (E의 미분류는 빈 칸)
pub fn status_label(classification: Option<Classification>) -> &'static str {
    match classification {
        Some(Classification::Match) => "일치",
        Some(Classification::Mismatch) => "불일치",
        Some(Classification::Exempt) => "제외",
        None => "",
    }
}

/// 검사 결과 열 머리글
pub const CHECK_HEADERS: [&str; 14] = [
    "검사",
    "원본시트",
    "행",
    "셀",
    "열",
    "품명|규격",
    "참조셀",
    "대표참조",
    "참조_품명|규격",
    "참조헤더",
    "참조유형",
    "입력값",
    "일치여부",
    "수식_일부",
];

fn check_row(record: &CheckRecord) -> Vec<TableCell> {
    let references = record
        .references
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let (origin, value) = match &record.origin {
        RecordOrigin::Reference => ("참조", String::new()),
        RecordOrigin::DirectInput { value } => ("값 직접입력", value.clone()),
    };

    vec![
        record.checker.letter().to_string().into(),
        record.source_sheet.clone().into(),
        TableCell::Number(record.source_row as f64),
        record.cell.clone().into(),
        record.column_label.clone().unwrap_or_default().into(),
        record.source_key.to_string().into(),
        references.into(),
        record.representative.as_ref().map(|r| r.to_string()).unwrap_or_default().into(),
        record.target_key.as_ref().map(|k| k.to_string()).unwrap_or_default().into(),
        record.target_headers.clone().unwrap_or_default().into(),
        origin.into(),
        value.into(),
        status_label(record.classification).into(),
        record.formula.clone().unwrap_or_default().into(),
    ]
}

/// 검사 기록 → 표
pub fn check_table<'a, I>(name: &str, records: I) -> SheetTable
where
    I: IntoIterator<Item = &'a CheckRecord>,
{
    let mut table = SheetTable::new(name, &CHECK_HEADERS);
    table.rows = records.into_iter().map(check_row).collect();
    table.autofilter = true;
    table
}

/// 검사 결과 파일 구성: (접미사, 표)
///
/// 모든 검사는 전체·불일치를, A와 C는 일치도 따로 낸다.
pub fn check_split_tables(kind: CheckerKind, records: &[CheckRecord]) -> Vec<(&'static str, SheetTable)> {
    let sheet = kind.source_sheet();
    let mut tables = vec![("전체", check_table(sheet, records))];
    if matches!(kind, CheckerKind::A | CheckerKind::C) {
        let matched = records
            .iter()
            .filter(|r| r.classification == Some(Classification::Match));
        tables.push(("일치", check_table(sheet, matched)));
    }
    tables.push(("불일치", check_table(sheet, records.iter().filter(|r| r.is_mismatch()))));
    tables
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// 매칭 결과 → 표
///
/// 재료비(I,J)·노무비(K,L)·경비(M,N) 쌍을 비교하는 `비교결과` 수식 열이 붙는다.
pub fn match_table(records: &[MatchRecord], left_label: &str, right_label: &str) -> SheetTable {
    let l = left_label;
    let r = right_label;
    let headers = [
        format!("{l}_품명"),
        format!("{l}_규격"),
        format!("{r}_품명"),
        format!("{r}_규격"),
        "매칭유형".to_string(),
        "종합유사도(%)".to_string(),
        "품명유사(%)".to_string(),
        "규격유사(%)".to_string(),
        format!("{l}_재료비적용단가"),
        format!("{r}_재료비적용단가"),
        format!("{l}_노무비"),
        format!("{r}_노무비"),
        format!("{l}_경비적용단가"),
        format!("{r}_경비적용단가"),
        "비교결과".to_string(),
    ];

    let rows = records
        .iter()
        .enumerate()
        .map(|(i, m)| {
            // 머리글이 1행이므로 데이터는 2행부터
            let n = i + 2;
            vec![
                m.left.name.clone().into(),
                m.left.spec.clone().into(),
                m.right.name.clone().into(),
                m.right.spec.clone().into(),
                m.match_type.label().into(),
                TableCell::Number(round1(m.combined)),
                TableCell::Number(round1(m.name_similarity)),
                TableCell::Number(round1(m.spec_similarity)),
                m.left.material.into(),
                m.right.material.into(),
                m.left.labor.into(),
                m.right.labor.into(),
                m.left.expense.into(),
                m.right.expense.into(),
                TableCell::Formula {
                    text: format!("=IF(AND(J{n}=I{n},K{n}=L{n},M{n}=N{n}),TRUE,FALSE)"),
                    result: if m.prices_equal() { "TRUE" } else { "FALSE" }.to_string(),
                },
            ]
        })
        .collect();

    SheetTable {
        name: format!("{}_vs_{}", l, r),
        headers: headers.to_vec(),
        rows,
        autofilter: true,
    }
}

/// 시트 이름 제약 (31자, 금지 문자)
fn safe_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if "[]:*?/\\".contains(c) { '_' } else { c })
        .take(31)
        .collect();
    if cleaned.trim().is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned
    }
}

/// 표들을 xlsx 버퍼로 생성
pub fn generate_tables_buffer(tables: &[SheetTable]) -> Result<Vec<u8>, String> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF2F2F2))
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xBFBFBF));

    for table in tables {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(safe_sheet_name(&table.name))
            .map_err(|e| format!("시트 이름 설정 오류: {}", e))?;

        for (c, header) in table.headers.iter().enumerate() {
            worksheet
                .write_string_with_format(0, c as u16, header, &header_format)
                .map_err(|e| format!("머리글 쓰기 오류: {}", e))?;
        }

        for (i, row) in table.rows.iter().enumerate() {
            let r = (i + 1) as u32;
            for (c, cell) in row.iter().enumerate() {
                let c = c as u16;
                match cell {
                    TableCell::Empty => {}
                    TableCell::Text(s) => {
                        worksheet
                            .write_string(r, c, s)
                            .map_err(|e| format!("셀 쓰기 오류: {}", e))?;
                    }
                    TableCell::Number(n) => {
                        worksheet
                            .write_number(r, c, *n)
                            .map_err(|e| format!("셀 쓰기 오류: {}", e))?;
                    }
                    TableCell::Formula { text, result } => {
                        let formula = Formula::new(text).set_result(result);
                        worksheet
                            .write_formula(r, c, formula)
                            .map_err(|e| format!("수식 쓰기 오류: {}", e))?;
                    }
                }
            }
        }

        if !table.headers.is_empty() {
            worksheet
                .set_freeze_panes(1, 0)
                .map_err(|e| format!("틀 고정 오류: {}", e))?;
        }
        if table.autofilter && !table.headers.is_empty() {
            let last_row = table.rows.len() as u32;
            let last_col = (table.headers.len() - 1) as u16;
            worksheet
                .autofilter(0, 0, last_row, last_col)
                .map_err(|e| format!("자동 필터 오류: {}", e))?;
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| format!("Excel 저장 오류: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;
    use crate::matcher::{CostRow, MatchType};

    fn record(classification: Option<Classification>) -> CheckRecord {
        CheckRecord {
            checker: CheckerKind::C,
            source_sheet: "공종별내역서".into(),
            source_row: 7,
            cell: "C7".into(),
            column_label: None,
            source_key: Key::new("레미콘", "25-24-150"),
            references: vec![],
            representative: None,
            target_key: None,
            target_headers: None,
            classification,
            origin: RecordOrigin::DirectInput { value: "1200".into() },
            formula: None,
        }
    }

    #[test]
    fn test_status_label() {
        assert_eq!(status_label(Some(Classification::Exempt)), "제외");
        assert_eq!(status_label(None), "");
    }

    #[test]
    fn test_check_row_columns() {
        let row = check_row(&record(Some(Classification::Mismatch)));
        assert_eq!(row.len(), CHECK_HEADERS.len());
        assert_eq!(row[5], TableCell::Text("레미콘|25-24-150".into()));
        assert_eq!(row[10], TableCell::Text("값 직접입력".into()));
        assert_eq!(row[12], TableCell::Text("불일치".into()));
    }

    #[test]
    fn test_split_tables() {
        let records = vec![
            record(Some(Classification::Match)),
            record(Some(Classification::Mismatch)),
            record(Some(Classification::Exempt)),
        ];
        let tables = check_split_tables(CheckerKind::C, &records);
        let names: Vec<_> = tables.iter().map(|(s, _)| *s).collect();
        assert_eq!(names, vec!["전체", "일치", "불일치"]);
        assert_eq!(tables[0].1.rows.len(), 3);
        assert_eq!(tables[1].1.rows.len(), 1);
        assert_eq!(tables[2].1.rows.len(), 1);

        let tables = check_split_tables(CheckerKind::E, &records);
        assert_eq!(tables.len(), 2);
    }

    #[test]
    fn test_match_table_formula_column() {
        let m = MatchRecord {
            left: CostRow::new("레미콘", "").with_prices(1.0, 2.0, 3.0),
            right: CostRow::new("레미콘", "").with_prices(1.0, 2.0, 4.0),
            match_type: MatchType::ExactName,
            name_similarity: 100.0,
            spec_similarity: 100.0,
            combined: 100.0,
        };
        let table = match_table(&[m], "기계", "토목");
        assert_eq!(table.name, "기계_vs_토목");
        assert_eq!(table.headers[0], "기계_품명");
        assert_eq!(table.headers[14], "비교결과");
        assert_eq!(
            table.rows[0][14],
            TableCell::Formula {
                text: "=IF(AND(J2=I2,K2=L2,M2=N2),TRUE,FALSE)".into(),
                result: "FALSE".into(),
            }
        );
    }

    #[test]
    fn test_safe_sheet_name() {
        assert_eq!(safe_sheet_name("a/b"), "a_b");
        assert_eq!(safe_sheet_name(&"가".repeat(40)).chars().count(), 31);
        assert_eq!(safe_sheet_name(" "), "Sheet1");
    }

    #[test]
    fn test_generate_buffer() {
        let table = check_table("공종별내역서", &[record(None)]);
        let buf = generate_tables_buffer(&[table]).unwrap();
        // xlsx는 zip
        assert_eq!(&buf[..2], b"PK");
    }
}
