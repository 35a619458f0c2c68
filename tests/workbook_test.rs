//! xlsx 파일을 거치는 통합 테스트
//!
//! rust_xlsxwriter로 작은 내역서를 만들고 읽기 → 검사 → 결과 저장까지 확인한다.

use matchflag::export::{export_check_reports, export_matches};
use matchflag::{check_file, loader, match_files, naming};
use matchflag_common::{
    CheckConfig, CheckReport, CheckerKind, Classification, Key, MatchOptions, MatchType, RecordOrigin,
};
use rust_xlsxwriter::{Workbook, XlsxError};
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// 단가대비표 머리글 (2행)
const COST_HEADERS: [&str; 6] = ["품명", "규격", "단위", "재료비 적용단가", "노무비", "경비 적용단가"];

/// (품명, 규격, 단위, 재료비, 노무비, 경비)
type CostLine<'a> = (&'a str, &'a str, &'a str, f64, f64, f64);

fn write_cost_sheet(workbook: &mut Workbook, lines: &[CostLine]) -> Result<(), XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name("단가대비표")?;
    for (c, header) in COST_HEADERS.iter().enumerate() {
        sheet.write_string(1, c as u16, *header)?;
    }
    // 품목은 5행부터
    for (i, (name, spec, unit, material, labor, expense)) in lines.iter().enumerate() {
        let r = 4 + i as u32;
        sheet.write_string(r, 0, *name)?;
        sheet.write_string(r, 1, *spec)?;
        sheet.write_string(r, 2, *unit)?;
        sheet.write_number(r, 3, *material)?;
        sheet.write_number(r, 4, *labor)?;
        sheet.write_number(r, 5, *expense)?;
    }
    Ok(())
}

/// 일위대가: 머리글 3행, 11~13행 품목, 14행 합계
fn write_detail_sheet(workbook: &mut Workbook) -> Result<(), XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name("일위대가")?;
    for (c, header) in ["품명", "규격", "단위", "수량", "재료비"].iter().enumerate() {
        sheet.write_string(2, 1 + c as u16, *header)?;
    }
    sheet.write_string(9, 1, "펌프")?;
    sheet.write_string(9, 2, "50HP")?;

    sheet.write_string(10, 1, "레미콘")?;
    sheet.write_string(10, 2, "25-24-150")?;
    sheet.write_string(10, 3, "m3")?;
    sheet.write_number(10, 4, 1.0)?;
    sheet.write_formula(10, 5, "=단가대비표!D5*E11")?;

    sheet.write_string(11, 1, "콘크리트")?;
    sheet.write_string(11, 2, "10%")?;
    sheet.write_string(11, 3, "식")?;
    sheet.write_number(11, 4, 1.0)?;
    sheet.write_formula(11, 5, "=단가대비표!D7")?;

    sheet.write_string(12, 1, "보통인부")?;
    sheet.write_string(12, 3, "인")?;
    sheet.write_number(12, 4, 0.2)?;

    sheet.write_string(13, 1, "[ 합 계 ]")?;
    sheet.write_formula(13, 5, "=SUM(F11:F13)")?;
    Ok(())
}

fn estimate_lines() -> Vec<CostLine<'static>> {
    vec![
        ("레미콘", "25-24-150", "m3", 78000.0, 0.0, 0.0),
        ("콘크리트", "10%", "식", 0.0, 0.0, 0.0),
        ("철근", "SD400 D13", "ton", 850000.0, 0.0, 0.0),
    ]
}

fn create_estimate(dir: &Path, file_name: &str) -> PathBuf {
    let path = dir.join(file_name);
    let mut workbook = Workbook::new();
    write_cost_sheet(&mut workbook, &estimate_lines()).expect("Failed to write cost sheet");
    write_detail_sheet(&mut workbook).expect("Failed to write detail sheet");
    workbook.save(&path).expect("Failed to save fixture");
    path
}

fn create_cost_only(dir: &Path, file_name: &str, lines: &[CostLine]) -> PathBuf {
    let path = dir.join(file_name);
    let mut workbook = Workbook::new();
    write_cost_sheet(&mut workbook, lines).expect("Failed to write cost sheet");
    workbook.save(&path).expect("Failed to save fixture");
    path
}

#[test]
fn test_loader_reads_values_and_formulas() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = create_estimate(dir.path(), "내역서.xlsx");

    let workbook = loader::load_workbook(&path).unwrap();
    assert!(workbook.contains("단가대비표"));
    assert!(workbook.contains("일위대가"));

    let detail = workbook.sheet("일위대가").unwrap();
    assert_eq!(detail.cell(11, 2).as_text().as_deref(), Some("레미콘"));
    let formula = detail.cell(11, 6).formula_text().unwrap();
    assert!(formula.contains("단가대비표!D5"), "formula was {formula}");
}

#[test]
fn test_loader_reads_bytes() {
    let mut workbook = Workbook::new();
    write_cost_sheet(&mut workbook, &estimate_lines()).expect("Failed to write cost sheet");
    let buffer = workbook.save_to_buffer().expect("Failed to build fixture");

    let loaded = loader::load_workbook_from_bytes(buffer).unwrap();
    assert_eq!(loaded.sheet_names(), vec!["단가대비표"]);
    let sheet = loaded.sheet("단가대비표").unwrap();
    assert_eq!(sheet.cell(7, 1).as_text().as_deref(), Some("철근"));
}

#[test]
fn test_check_file_from_xlsx() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = create_estimate(dir.path(), "내역서.xlsx");

    let outcomes = check_file(&path, &[CheckerKind::A], &CheckConfig::default()).unwrap();
    assert_eq!(outcomes.len(), 1);
    let report = outcomes[0].result.as_ref().unwrap();

    assert_eq!(report.header_row, 3);
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.records[0].classification, Some(Classification::Match));
    assert_eq!(report.records[1].target_key, Some(Key::new("철근", "SD400 D13")));
    assert_eq!(report.records[1].classification, Some(Classification::Exempt));
    assert_eq!(report.records[2].origin, RecordOrigin::DirectInput { value: "0.2".into() });
}

#[test]
fn test_check_and_export_all() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = create_estimate(dir.path(), "(설계)토목 내역서.xlsx");
    let out = dir.path().join("결과");

    let outcomes = check_file(&path, &CheckerKind::ALL, &CheckConfig::default()).unwrap();
    assert_eq!(outcomes.len(), 5);
    // 일위대가목록·공종별내역서·공종별집계표가 없는 파일
    let failed: Vec<CheckerKind> = outcomes
        .iter()
        .filter(|o| o.result.is_err())
        .map(|o| o.kind)
        .collect();
    assert_eq!(failed, vec![CheckerKind::B, CheckerKind::C, CheckerKind::D]);

    let reports: Vec<CheckReport> = outcomes.into_iter().filter_map(|o| o.result.ok()).collect();
    let written = export_check_reports(&reports, &path, &out).unwrap();

    // A: 전체·일치·불일치, E: 전체·불일치
    assert_eq!(written.len(), 5);
    let result_dir = out.join("토목 내역서 검사결과");
    for file in &written {
        assert!(file.exists());
        assert_eq!(file.parent(), Some(result_dir.as_path()));
    }
    let all = result_dir.join("A_일위대가_참조검사_전체_토목 내역서.xlsx");
    assert!(written.contains(&all));

    // 저장한 결과를 다시 읽어 행 수 확인 (머리글 + 기록 3건)
    let saved = loader::load_workbook(&all).unwrap();
    let sheet = saved.sheet("일위대가").unwrap();
    assert_eq!(sheet.max_row(), 4);
}

#[test]
fn test_match_files_and_export() {
    let dir = tempdir().expect("Failed to create temp dir");
    let left = create_cost_only(
        dir.path(),
        "건축 내역.xlsx",
        &[
            ("레미콘", "25-24-150", "m3", 78000.0, 0.0, 0.0),
            ("이형철근", "SD400 D13", "ton", 850000.0, 0.0, 0.0),
            ("전혀다른품목", "", "EA", 1.0, 0.0, 0.0),
        ],
    );
    let right = create_cost_only(
        dir.path(),
        "토목 내역.xlsx",
        &[
            ("레미콘", "25-24-150", "m3", 78000.0, 0.0, 0.0),
            ("이형 철근", "SD400 D13", "ton", 860000.0, 0.0, 0.0),
        ],
    );

    let records = match_files(&left, &right, &MatchOptions::default()).unwrap();
    assert!(records.len() >= 2);
    assert_eq!(records[0].match_type, MatchType::ExactName);
    assert_eq!(records[0].left.name, "레미콘");
    assert!(records[0].prices_equal());
    for pair in records.windows(2) {
        assert!(pair[0].combined >= pair[1].combined);
    }

    let (l, r) = naming::match_labels(&left, &right);
    assert_eq!((l.as_str(), r.as_str()), ("건축", "토목"));

    let output = dir.path().join("매칭").join("건축_vs_토목.xlsx");
    let saved = export_matches(&records, &l, &r, &output).unwrap();
    assert_eq!(saved, output);

    let workbook = loader::load_workbook(&saved).unwrap();
    let sheet = workbook.sheet("건축_vs_토목").unwrap();
    assert_eq!(sheet.cell(1, 1).as_text().as_deref(), Some("건축_품명"));
    assert!(sheet.cell(2, 15).is_formula());
}

#[test]
fn test_match_requires_cost_sheet() {
    let dir = tempdir().expect("Failed to create temp dir");
    let left = create_estimate(dir.path(), "a.xlsx");

    let right = dir.path().join("b.xlsx");
    let mut workbook = Workbook::new();
    workbook
        .add_worksheet()
        .set_name("공종별내역서")
        .expect("Failed to name sheet");
    workbook.save(&right).expect("Failed to save fixture");

    let err = match_files(&left, &right, &MatchOptions::default()).unwrap_err();
    assert!(err.to_string().contains("단가대비표"));
}
