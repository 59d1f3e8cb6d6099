use smallvec::SmallVec;
use std::cmp::Ordering;

/// Per-segment weight vectors; one entry per token of the segment.
pub type PathScore = Vec<SmallVec<[i32; 4]>>;

const MULTIPLIER: i32 = 1000;

// Weights are scaled so that the fractional bonuses stay integral.
pub const SCORE_ROOT: i32 = 9 * MULTIPLIER;
pub const SCORE_SEGMENT: i32 = 4 * MULTIPLIER;
pub const SCORE_STATIC: i32 = 4 * MULTIPLIER;
pub const SCORE_DYNAMIC: i32 = 2 * MULTIPLIER;
pub const BONUS_CUSTOM_REGEXP: i32 = MULTIPLIER;
// cancels the custom pattern bonus a catch-all always carries
pub const BONUS_WILDCARD: i32 = -4 * MULTIPLIER - BONUS_CUSTOM_REGEXP;
pub const BONUS_REPEATABLE: i32 = -2 * MULTIPLIER;
pub const BONUS_OPTIONAL: i32 = -(8 * MULTIPLIER) / 10;
// strict and case sensitive must stay below a tenth of the multiplier so a
// strict `/:page` never outranks a structurally more specific pattern
pub const BONUS_STRICT: i32 = (7 * MULTIPLIER) / 100;
pub const BONUS_CASE_SENSITIVE: i32 = (25 * MULTIPLIER) / 1000;

/// Compares the weights of one segment. `Less` means `a` is more specific.
pub fn compare_score_array(a: &[i32], b: &[i32]) -> Ordering {
    for (left, right) in a.iter().zip(b.iter()) {
        match right.cmp(left) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    // a lone static token wins over a longer segment, otherwise the longer
    // segment goes first
    match a.len().cmp(&b.len()) {
        Ordering::Less => {
            if a.len() == 1 && a[0] == SCORE_STATIC + SCORE_SEGMENT {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
        Ordering::Greater => {
            if b.len() == 1 && b[0] == SCORE_STATIC + SCORE_SEGMENT {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        Ordering::Equal => Ordering::Equal,
    }
}

/// Total order over compiled patterns. `Less` means `a` must be tried
/// before `b`.
pub fn compare_path_score(a: &PathScore, b: &PathScore) -> Ordering {
    for (left, right) in a.iter().zip(b.iter()) {
        match compare_score_array(left, right) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    if a.len().abs_diff(b.len()) == 1 {
        if is_last_score_negative(a) {
            return Ordering::Greater;
        }
        if is_last_score_negative(b) {
            return Ordering::Less;
        }
    }

    // same leading entries: the one with more segments goes first
    b.len().cmp(&a.len())
}

fn is_last_score_negative(score: &PathScore) -> bool {
    score
        .last()
        .and_then(|segment| segment.last())
        .is_some_and(|weight| *weight < 0)
}
