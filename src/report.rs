//! 검사 요약 출력

use matchflag_common::checker::{CheckOutcome, CheckReport, CheckerKind};

/// 불일치 상세는 이만큼만 보인다
pub const MISMATCH_DETAIL_LIMIT: usize = 200;

fn display_name(kind: CheckerKind) -> &'static str {
    match kind {
        CheckerKind::A => "일위대가 검사",
        CheckerKind::B => "일위대가 목록 검사",
        CheckerKind::C => "공종별 내역서 검사",
        CheckerKind::D => "공종별 집계표 검사",
        CheckerKind::E => "단가대비표 검사",
    }
}

/// 검사 하나의 요약 한 줄
pub fn summary_line(report: &CheckReport) -> String {
    let s = &report.stats;
    let mut line = format!(
        "{}: 참조 {}건 ({}행), 일치 {}, 불일치 {}",
        display_name(report.kind),
        s.references,
        s.rows_with_refs,
        s.matched,
        s.mismatched
    );
    if s.exempt > 0 {
        line.push_str(&format!(", 제외 {}", s.exempt));
    }
    if s.unset > 0 {
        line.push_str(&format!(", 미분류 {}", s.unset));
    }
    if s.direct_input > 0 {
        line.push_str(&format!(", 값 직접입력 {}", s.direct_input));
    }
    line
}

/// 전체 요약 (실패한 검사는 오류 메시지)
pub fn summary_lines(outcomes: &[CheckOutcome]) -> Vec<String> {
    outcomes
        .iter()
        .map(|o| match &o.result {
            Ok(report) => summary_line(report),
            Err(e) => format!("{}: 실패 - {}", display_name(o.kind), e),
        })
        .collect()
}

/// 불일치 상세 (최대 `limit`줄, 넘치면 생략 표시)
pub fn mismatch_lines<'a, I>(reports: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a CheckReport>,
{
    let mut lines = Vec::new();
    let mut total = 0usize;

    for report in reports {
        for record in report.mismatches() {
            total += 1;
            if lines.len() >= limit {
                continue;
            }
            let target = record
                .target_key
                .as_ref()
                .map(|k| k.to_string())
                .unwrap_or_else(|| "(해석 불가)".to_string());
            let via = record
                .representative
                .as_ref()
                .map(|r| r.to_string())
                .unwrap_or_else(|| "값 직접입력".to_string());
            lines.push(format!(
                "[{}] {}!{} {} ≠ {} ({})",
                record.checker, record.source_sheet, record.cell, record.source_key, target, via
            ));
        }
    }

    if total > lines.len() {
        lines.push(format!("... 외 {}건", total - lines.len()));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchflag_common::checker::{CheckRecord, CheckStats, Classification, RecordOrigin};
    use matchflag_common::{Error, Key, RefTarget};

    fn mismatch(row: u32) -> CheckRecord {
        CheckRecord {
            checker: CheckerKind::A,
            source_sheet: "일위대가".into(),
            source_row: row,
            cell: format!("F{}", row),
            column_label: None,
            source_key: Key::new("레미콘", "25-24-150"),
            references: vec![],
            representative: Some(RefTarget { sheet: "단가대비표".into(), row: 7 }),
            target_key: Some(Key::new("철근", "D13")),
            target_headers: None,
            classification: Some(Classification::Mismatch),
            origin: RecordOrigin::Reference,
            formula: None,
        }
    }

    fn report(records: Vec<CheckRecord>) -> CheckReport {
        CheckReport {
            kind: CheckerKind::A,
            sheet: "일위대가".into(),
            header_row: 3,
            stats: CheckStats {
                references: 5,
                rows_with_refs: 4,
                matched: 2,
                mismatched: records.len(),
                exempt: 1,
                ..Default::default()
            },
            records,
        }
    }

    #[test]
    fn test_summary_line() {
        let line = summary_line(&report(vec![mismatch(11)]));
        assert_eq!(line, "일위대가 검사: 참조 5건 (4행), 일치 2, 불일치 1, 제외 1");
    }

    #[test]
    fn test_summary_lines_with_failure() {
        let outcomes = vec![CheckOutcome {
            kind: CheckerKind::D,
            result: Err(Error::MissingSheet("공종별집계표".into())),
        }];
        let lines = summary_lines(&outcomes);
        assert_eq!(lines, vec!["공종별 집계표 검사: 실패 - 시트 없음: 공종별집계표".to_string()]);
    }

    #[test]
    fn test_mismatch_lines_limit() {
        let r = report((1..=5).map(mismatch).collect());
        let lines = mismatch_lines([&r], 3);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "[A] 일위대가!F1 레미콘|25-24-150 ≠ 철근|D13 (단가대비표!7)");
        assert_eq!(lines[3], "... 외 2건");
    }
}
