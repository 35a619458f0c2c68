//! 문자열 유사도 (0~100)
//!
//! 토큰 순서에 무관한 비교: 공백으로 나눈 토큰을 정렬해 다시 붙인 뒤
//! 삽입·삭제 편집거리 기반 비율을 계산한다.

/// 최장 공통 부분열 길이
fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    // 한 줄씩만 유지
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            curr[j] = if a[i - 1] == b[j - 1] {
                prev[j - 1] + 1
            } else {
                prev[j].max(curr[j - 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// 정규화된 삽입·삭제 유사도: 100 · 2·LCS / (|a|+|b|)
///
/// 한쪽이라도 비어 있으면 0.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    if a_chars.is_empty() || b_chars.is_empty() {
        return 0.0;
    }
    if a_chars == b_chars {
        return 100.0;
    }

    let total = (a_chars.len() + b_chars.len()) as f64;
    200.0 * lcs_len(&a_chars, &b_chars) as f64 / total
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// 토큰 정렬 유사도
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// 규격 유사도. 둘 다 비어 있으면 완전 일치(100)로 본다.
pub fn spec_similarity(a: &str, b: &str) -> f64 {
    if a.trim().is_empty() && b.trim().is_empty() {
        return 100.0;
    }
    token_sort_ratio(a, b)
}
