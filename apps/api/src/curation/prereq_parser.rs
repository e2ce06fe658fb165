//! Prerequisite Parser — turns a free-text prerequisite statement into a `Requirement`.
//!
//! Pure pattern matching, no catalog context. The parser is a heuristic
//! classifier, not a boolean-expression parser:
//! - codes come from three ordered pattern families, unioned
//! - `any` logic is chosen when the word "or" survives once flag phrases are removed
//! - text that clearly states a prerequisite we cannot read sets `raw_has_prereq`
//!
//! `is_satisfied` is the only consumer of the struct's logic; eligibility reads the
//! flags directly.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::course::normalize_code;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// How the extracted codes combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementLogic {
    /// At least one code completed.
    Any,
    /// Every code completed.
    #[default]
    All,
}

/// Qualitative conditions that cannot be checked against completed codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementFlag {
    Permission,
    JuniorStanding,
    SeniorStanding,
    MajorsOnly,
    CoreqPresent,
}

/// Structured form of a prerequisite statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    /// Normalized codes: `PREFIX.NUMBER`, or `#NN.NNN` for legacy codes with no department.
    pub codes: BTreeSet<String>,
    pub logic: RequirementLogic,
    pub flags: BTreeSet<RequirementFlag>,
    /// Prerequisite language was present but no code could be extracted.
    pub raw_has_prereq: bool,
}

impl Requirement {
    pub fn has_flag(&self, flag: RequirementFlag) -> bool {
        self.flags.contains(&flag)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Patterns
// ────────────────────────────────────────────────────────────────────────────

static NO_PREREQ: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:no\s+pre-?req\w*|this class has no prerequisites|none|n/a)\b")
        .expect("Invalid no-prerequisite regex")
});

static MAJOR_RESTRICTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:majors only|(?:limited to|restricted to|open only to) [a-z&/\s-]+ majors)\b",
    )
    .expect("Invalid major restriction regex")
});

static PERMISSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:permission|consent) of (?:the )?instructor\b")
        .expect("Invalid permission regex")
});

static JUNIOR_STANDING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bjunior standing\b").expect("Invalid junior standing regex"));

static SENIOR_STANDING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bsenior standing\b").expect("Invalid senior standing regex"));

static COREQ: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bco(?:-|\s)?req\w*").expect("Invalid co-requisite regex"));

static PREREQ_VOCABULARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bpre(?:-|\s)?req").expect("Invalid prerequisite regex"));

static OR_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bor\b").expect("Invalid or regex"));

/// ECON.2110, MATH.1320, PHYS.1010L
static DOTTED_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Z]{2,5})\.(\d{3,4}L?)\b").expect("Invalid dotted code regex")
});

/// ECON 2110, PHYS 1010L
static SPACED_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Z]{2,5})\s+(\d{3,4}L?)\b").expect("Invalid spaced code regex")
});

/// Legacy numeric codes such as 92.183 (department unknown).
static LEGACY_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{2})\.(\d{3})\b").expect("Invalid legacy code regex"));

// ────────────────────────────────────────────────────────────────────────────
// Parsing
// ────────────────────────────────────────────────────────────────────────────

/// True if the text contains a canonical "no prerequisite" phrase.
pub fn has_no_prereq_phrase(text: &str) -> bool {
    NO_PREREQ.is_match(&text.to_lowercase())
}

/// True if the text restricts enrollment to a major ("CS majors only",
/// "restricted to nursing majors", ...).
pub fn detect_major_restriction(text: &str) -> bool {
    !text.is_empty() && MAJOR_RESTRICTION.is_match(&text.to_lowercase())
}

/// Parses a raw prerequisite statement.
pub fn parse_prerequisites(raw: &str) -> Requirement {
    let mut requirement = Requirement::default();

    let text = raw.trim();
    if text.is_empty() || has_no_prereq_phrase(text) {
        return requirement;
    }

    let lower = text.to_lowercase();

    let flag_patterns: [(&Lazy<Regex>, RequirementFlag); 5] = [
        (&MAJOR_RESTRICTION, RequirementFlag::MajorsOnly),
        (&PERMISSION, RequirementFlag::Permission),
        (&JUNIOR_STANDING, RequirementFlag::JuniorStanding),
        (&SENIOR_STANDING, RequirementFlag::SeniorStanding),
        (&COREQ, RequirementFlag::CoreqPresent),
    ];

    // Flag phrases are removed before the "or" check so they cannot sway the logic.
    let mut residue = lower.clone();
    for (pattern, flag) in flag_patterns {
        if pattern.is_match(&lower) {
            requirement.flags.insert(flag);
            residue = pattern.replace_all(&residue, " ").into_owned();
        }
    }

    requirement.codes = extract_codes(text);

    if requirement.codes.is_empty() && PREREQ_VOCABULARY.is_match(&lower) {
        debug!("Unreadable prerequisite statement: {:?}", text);
        requirement.raw_has_prereq = true;
    }

    requirement.logic = if OR_WORD.is_match(&residue) {
        RequirementLogic::Any
    } else {
        RequirementLogic::All
    };

    requirement
}

/// Union of all codes found by the three pattern families.
fn extract_codes(text: &str) -> BTreeSet<String> {
    let mut codes = BTreeSet::new();

    for pattern in [&DOTTED_CODE, &SPACED_CODE] {
        for caps in pattern.captures_iter(text) {
            if let Some(code) = normalize_code(&format!("{}.{}", &caps[1], &caps[2])) {
                codes.insert(code);
            }
        }
    }

    for caps in LEGACY_CODE.captures_iter(text) {
        codes.insert(format!("#{}.{}", &caps[1], &caps[2]));
    }

    codes
}

// ────────────────────────────────────────────────────────────────────────────
// Satisfaction
// ────────────────────────────────────────────────────────────────────────────

/// Checks a requirement against the codes completed in earlier terms.
///
/// An unreadable requirement is never satisfied, whatever the term position.
pub fn is_satisfied(
    requirement: &Requirement,
    completed: &BTreeSet<String>,
    is_first_term: bool,
) -> bool {
    if !requirement.codes.is_empty() {
        return match requirement.logic {
            RequirementLogic::Any => requirement.codes.iter().any(|c| completed.contains(c)),
            RequirementLogic::All => requirement.codes.is_subset(completed),
        };
    }

    if requirement.raw_has_prereq {
        debug!(
            "Unreadable prerequisite treated as unmet (first term: {})",
            is_first_term
        );
        return false;
    }

    true
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
