//! Series guard — keeps "part two" courses out until a plausible part one is done.
//!
//! A title signals a sequel when it carries II / IIB / 2nd / 2, or says
//! "advanced" / "intermediate" without also saying "introduction". Plausible
//! prequels are pool courses titled with "intro" or a standalone "I" that share
//! at least `min(3, title_words)` title words (floor 1) with the sequel, or whose
//! title is the sequel's title with the numeral swapped for "I".

use std::collections::{BTreeSet, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::course::CourseRecord;

static SEQUEL_NUMERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:ii|iib|2nd|2)\b").expect("Invalid sequel numeral regex"));

static NUMERALS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:i{1,3}|iv|v|vi{0,3}|2nd|ii|2)\b").expect("Invalid numeral regex")
});

static CLUTTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:formerly|previously|honors|with lab|laboratory)\b")
        .expect("Invalid clutter regex")
});

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z]+").expect("Invalid word regex"));

static STANDALONE_I: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bi\b").expect("Invalid I regex"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("Invalid space regex"));

const IGNORED_TOKENS: &[&str] = &["i", "ii", "iii", "iv", "v", "vi", "and", "or"];

const ADVANCED_WORDS: &[&str] = &["advanced", "intermediate"];

/// True if the title reads as the second or advanced installment of a series.
pub fn is_sequel_title(title: &str) -> bool {
    let name = title.to_lowercase();
    if SEQUEL_NUMERAL.is_match(&name) {
        return true;
    }
    ADVANCED_WORDS.iter().any(|w| name.contains(w)) && !name.contains("introduction")
}

/// Returns true when `course` is a sequel whose plausible prequels exist in `pool`
/// and none of them has been completed.
///
/// A sequel with no identifiable prequel in the pool passes; prerequisite
/// checking is responsible for it.
pub fn is_advanced_without_intro(
    course: &CourseRecord,
    completed: &BTreeSet<String>,
    pool: &[CourseRecord],
) -> bool {
    if !is_sequel_title(course.name()) {
        return false;
    }

    let prequels = plausible_prequels(course, pool);
    !prequels.is_empty() && !prequels.iter().any(|code| completed.contains(code))
}

/// Normalized codes of pool courses that look like the first installment of `course`.
fn plausible_prequels(course: &CourseRecord, pool: &[CourseRecord]) -> HashSet<String> {
    let name = course.name().to_lowercase();
    let own_code = course.normalized_code();

    let base = NUMERALS.replace_all(&name, " ");
    let base = CLUTTER.replace_all(&base, " ");
    let base_tokens: HashSet<&str> = WORD
        .find_iter(&base)
        .map(|m| m.as_str())
        .filter(|t| !IGNORED_TOKENS.contains(t))
        .collect();
    let required_overlap = base_tokens.len().min(3).max(1);

    let swapped = collapse(&SEQUEL_NUMERAL.replace_all(&name, " i "));

    let mut prequels = HashSet::new();
    for candidate in pool {
        let Some(code) = candidate.normalized_code() else {
            continue;
        };
        if own_code.as_deref() == Some(code.as_str()) {
            continue;
        }

        let candidate_name = candidate.name().to_lowercase();

        let looks_intro =
            candidate_name.contains("intro") || STANDALONE_I.is_match(&candidate_name);
        if looks_intro {
            let overlap = WORD
                .find_iter(&candidate_name)
                .map(|m| m.as_str())
                .collect::<HashSet<_>>()
                .intersection(&base_tokens)
                .count();
            if overlap >= required_overlap {
                prequels.insert(code);
                continue;
            }
        }

        if collapse(&candidate_name) == swapped {
            prequels.insert(code);
        }
    }

    prequels
}

fn collapse(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}
