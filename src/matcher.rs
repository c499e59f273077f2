//! Fuzzy token matching and hint ranking.
//!
//! Matching is a greedy first-occurrence subsequence walk, ASCII
//! case-insensitive. The score favors contiguous runs, runs that start a
//! hyphen or underscore segment, whole-prefix matches and exact matches, so
//! `box` places `box-shadow` above `border-box` while both stay in the list.

use crate::hints::{HintItem, MatchSpan};

const CHAR_BASE: i64 = 10;
const RUN_BONUS: i64 = 5;
const SEGMENT_BONUS: i64 = 20;
const PREFIX_BONUS: i64 = 10_000;
const EXACT_BONUS: i64 = 100;

fn segment_start(name: &[u8], at: usize) -> bool {
    at == 0 || matches!(name[at - 1], b'-' | b'_')
}

/// Score `name` against `token`, returning the score and the matched char
/// ranges, or `None` when `token` is not a subsequence of `name`. An empty
/// token matches everything at score zero.
pub fn fuzzy_match(name: &str, token: &str) -> Option<(i64, Vec<MatchSpan>)> {
    if token.is_empty() {
        return Some((0, Vec::new()));
    }
    let name_bytes = name.as_bytes();
    let token_bytes = token.as_bytes();
    let mut spans: Vec<MatchSpan> = Vec::new();
    let mut score: i64 = 0;
    let mut ni = 0usize;
    for &tb in token_bytes {
        let mut found = None;
        while ni < name_bytes.len() {
            if name_bytes[ni].eq_ignore_ascii_case(&tb) {
                found = Some(ni);
                break;
            }
            ni += 1;
        }
        let at = found?;
        score += CHAR_BASE;
        match spans.last_mut() {
            Some(last) if last.end == at => {
                last.end = at + 1;
                score += RUN_BONUS;
            }
            _ => {
                if segment_start(name_bytes, at) {
                    score += SEGMENT_BONUS;
                }
                spans.push(MatchSpan { start: at, end: at + 1 });
            }
        }
        ni = at + 1;
    }
    if spans.len() == 1 && spans[0].start == 0 && spans[0].end == token_bytes.len() {
        score += PREFIX_BONUS;
        if name_bytes.len() == token_bytes.len() {
            score += EXACT_BONUS;
        }
    }
    Some((score, spans))
}

/// Filter `pool` by `token`, order by score then priority then name, and cap
/// the result at `max_hints`. Input order never leaks into the output: ties
/// resolve alphabetically.
pub fn rank_hints(pool: &[HintItem], token: &str, max_hints: usize) -> Vec<HintItem> {
    let mut ranked: Vec<HintItem> = pool
        .iter()
        .filter_map(|item| {
            fuzzy_match(&item.name, token).map(|(score, ranges)| {
                let mut hit = item.clone();
                hit.match_score = score;
                hit.match_ranges = ranges;
                hit
            })
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.match_score
            .cmp(&a.match_score)
            .then_with(|| b.priority.cmp(&a.priority))
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked.truncate(max_hints);
    ranked
}
