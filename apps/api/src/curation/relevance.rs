//! Relevance Scoring — pluggable, trait-based scorer that ranks eligible candidates
//! against a career's keyword profile.
//!
//! Default: `KeywordRelevanceScorer` (whole-word keyword weights plus level-band and
//! no-prerequisite bonuses). `AppState` holds an `Arc<dyn RelevanceScorer>`.
//!
//! The reason string is part of the output contract: it is written into every
//! recommendation as `selection_reason` and shown to students.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::curation::eligibility::is_lab_course;
use crate::curation::prereq_parser::has_no_prereq_phrase;
use crate::curation::slot_category::{KeywordTableKind, SlotCategory};
use crate::errors::CurationError;
use crate::models::career::{CareerProfile, KeywordTable};
use crate::models::course::CourseRecord;

const EXACT_BAND_BONUS: i64 = 10;
const ADJACENT_BAND_BONUS: i64 = 5;
const NO_PREREQ_BONUS: i64 = 3;

// ────────────────────────────────────────────────────────────────────────────
// Keyword matching
// ────────────────────────────────────────────────────────────────────────────

/// A keyword table compiled to whole-word, case-insensitive patterns, in table order.
#[derive(Debug, Clone, Default)]
pub struct KeywordSet {
    entries: Vec<(String, i64, Regex)>,
}

impl KeywordSet {
    pub fn compile<'a, I>(keywords: I) -> Result<Self, CurationError>
    where
        I: IntoIterator<Item = (&'a str, i64)>,
    {
        let entries = keywords
            .into_iter()
            .map(|(keyword, weight)| {
                let pattern = format!(r"\b{}\b", regex::escape(&keyword.to_lowercase()));
                Regex::new(&pattern)
                    .map(|re| (keyword.to_string(), weight, re))
                    .map_err(|source| CurationError::InvalidKeyword {
                        keyword: keyword.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    pub fn from_table(table: &KeywordTable) -> Result<Self, CurationError> {
        Self::compile(table.iter().map(|(k, w)| (k.as_str(), *w)))
    }

    pub fn from_list(keywords: &[String]) -> Result<Self, CurationError> {
        Self::compile(keywords.iter().map(|k| (k.as_str(), 0)))
    }

    /// Keywords (with weights) whose whole word appears in the lowercased text.
    pub fn matches<'s>(&'s self, text: &'s str) -> impl Iterator<Item = (&'s str, i64)> + 's {
        self.entries
            .iter()
            .filter(move |(_, _, re)| re.is_match(text))
            .map(|(keyword, weight, _)| (keyword.as_str(), *weight))
    }
}

/// A career profile compiled once per run.
#[derive(Debug, Clone, Default)]
pub struct ScoringProfile {
    pub technical: KeywordSet,
    pub general_education: KeywordSet,
    pub negative: KeywordSet,
}

impl ScoringProfile {
    pub fn from_career(career: &CareerProfile) -> Result<Self, CurationError> {
        Ok(Self {
            technical: KeywordSet::from_table(&career.technical_keywords())?,
            general_education: KeywordSet::from_table(&career.general_ed_keywords)?,
            negative: KeywordSet::from_list(&career.negative_keywords)?,
        })
    }

    /// The keyword table that scores a slot category.
    pub fn table_for(&self, category: SlotCategory) -> &KeywordSet {
        match category.rules().keyword_table {
            KeywordTableKind::Technical => &self.technical,
            KeywordTableKind::GeneralEducation => &self.general_education,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Score and justification for one candidate. A score of 0 removes the candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreOutcome {
    pub score: i64,
    pub reason: String,
}

/// The relevance scorer trait. Implement this to swap scoring backends without
/// touching the tracker or the handlers.
pub trait RelevanceScorer: Send + Sync {
    fn score(
        &self,
        candidate: &CourseRecord,
        keywords: &KeywordSet,
        negative: &KeywordSet,
        target_year: u8,
    ) -> ScoreOutcome;

    /// Extra notes appended to the reason for a given slot category.
    fn notes(&self, candidate: &CourseRecord, category: SlotCategory) -> Vec<String> {
        if category == SlotCategory::Scl && is_lab_course(candidate) {
            vec!["lab verified".to_string()]
        } else {
            Vec::new()
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordRelevanceScorer — default implementation
// ────────────────────────────────────────────────────────────────────────────

/// Algorithm:
/// 1. Any negative keyword in name + description → score 0, disqualified
/// 2. Sum weights of matching keywords; no hits → score 0
/// 3. Level band (`level / 1000` vs target year): exact +10, adjacent +5
/// 4. No-prerequisite phrase in prerequisites or description: +3
pub struct KeywordRelevanceScorer;

impl RelevanceScorer for KeywordRelevanceScorer {
    fn score(
        &self,
        candidate: &CourseRecord,
        keywords: &KeywordSet,
        negative: &KeywordSet,
        target_year: u8,
    ) -> ScoreOutcome {
        compute_keyword_relevance(candidate, keywords, negative, target_year)
    }
}

fn compute_keyword_relevance(
    candidate: &CourseRecord,
    keywords: &KeywordSet,
    negative: &KeywordSet,
    target_year: u8,
) -> ScoreOutcome {
    let text = candidate.searchable_text();

    if let Some((veto, _)) = negative.matches(&text).next() {
        return ScoreOutcome {
            score: 0,
            reason: format!("Disqualified by negative keyword: '{veto}'."),
        };
    }

    let mut keyword_score = 0;
    let mut hits = Vec::new();
    for (keyword, weight) in keywords.matches(&text) {
        keyword_score += weight;
        hits.push(keyword);
    }

    if keyword_score == 0 {
        return ScoreOutcome {
            score: 0,
            reason: String::new(),
        };
    }

    let mut reasons = vec![format!("Matches: ({})", hits.join(", "))];
    let mut bonus = 0;

    if let Some(level) = candidate.level() {
        let band = i64::from(level / 1000);
        let (band_bonus, note) = match (band - i64::from(target_year)).abs() {
            0 => (EXACT_BAND_BONUS, "ideal level band"),
            1 => (ADJACENT_BAND_BONUS, "nearby level band"),
            _ => (0, "level band mismatch"),
        };
        bonus += band_bonus;
        reasons.push(note.to_string());
    }

    let prereq_text = format!("{} {}", candidate.prerequisites(), candidate.description());
    if has_no_prereq_phrase(&prereq_text) {
        bonus += NO_PREREQ_BONUS;
        reasons.push("no prerequisites".to_string());
    }

    ScoreOutcome {
        score: keyword_score + bonus,
        reason: reasons.join(". "),
    }
}

/// Joins a score reason and category notes into the final `selection_reason`.
pub fn build_selection_reason(reason: &str, notes: &[String]) -> String {
    std::iter::once(reason)
        .chain(notes.iter().map(String::as_str))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(". ")
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
