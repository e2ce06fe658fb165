//! Eligibility Classifier — decides which catalog records may fill an elective slot.
//!
//! Checks run in a fixed order and the first failure wins:
//! 1. Universal exclusions (code, level, credits, already scheduled, special course types)
//! 2. Category rules from `SlotCategory::rules()` (majors-only, department, lab, level band)
//! 3. Requirement flags (permission, standing, co-requisites)
//! 4. Prerequisite satisfaction against earlier terms
//! 5. Series guard
//!
//! Excluded records are reported with their reason so a slot's silence can be explained.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::curation::prereq_parser::{
    detect_major_restriction, is_satisfied, parse_prerequisites, RequirementFlag,
};
use crate::curation::series_guard::is_advanced_without_intro;
use crate::curation::slot_category::SlotCategory;
use crate::models::course::CourseRecord;

/// Graduate-level courses start here.
const GRADUATE_LEVEL: u32 = 5000;

/// Course-name fragments that mark a course as unsuitable for an elective slot.
const DISALLOWED_SPECIAL_TYPES: &[&str] = &[
    "capstone",
    "internship",
    "practicum",
    "thesis",
    "honors",
    "directed study",
    "independent study",
    "research seminar",
    "research service learning",
    "senior seminar",
    "seminar",
    "fieldwork",
    "co-op",
];

static LAB_NUMBER_IN_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{3,4}L\b").expect("Invalid lab number regex"));

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Why a record cannot fill the slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Exclusion {
    MissingCode,
    MissingLevel,
    GraduateLevel(u32),
    InvalidCredits,
    AlreadyScheduled,
    SpecialType(&'static str),
    MajorRestricted,
    OutsideDepartments(String),
    NotLabCourse,
    LevelTooHigh { level: u32, max: u32 },
    LevelTooLow { level: u32, min: u32 },
    NeedsPermission,
    NeedsJuniorStanding,
    NeedsSeniorStanding,
    CorequisiteNotMet,
    PrerequisitesNotMet,
    SequelWithoutIntro,
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exclusion::MissingCode => write!(f, "missing course code"),
            Exclusion::MissingLevel => write!(f, "no numeric level"),
            Exclusion::GraduateLevel(level) => write!(f, "graduate level {level}"),
            Exclusion::InvalidCredits => write!(f, "missing or non-positive credits"),
            Exclusion::AlreadyScheduled => write!(f, "already required by the pathway"),
            Exclusion::SpecialType(kind) => write!(f, "special course type '{kind}'"),
            Exclusion::MajorRestricted => write!(f, "restricted to majors"),
            Exclusion::OutsideDepartments(prefix) => {
                write!(f, "department {prefix} not allowed for this slot")
            }
            Exclusion::NotLabCourse => write!(f, "not a lab course and under the credit floor"),
            Exclusion::LevelTooHigh { level, max } => {
                write!(f, "level {level} not below {max}")
            }
            Exclusion::LevelTooLow { level, min } => write!(f, "level {level} below {min}"),
            Exclusion::NeedsPermission => write!(f, "requires instructor permission"),
            Exclusion::NeedsJuniorStanding => write!(f, "requires junior standing"),
            Exclusion::NeedsSeniorStanding => write!(f, "requires senior standing"),
            Exclusion::CorequisiteNotMet => write!(f, "co-requisite not completed"),
            Exclusion::PrerequisitesNotMet => write!(f, "prerequisites not met"),
            Exclusion::SequelWithoutIntro => write!(f, "first course of the series not taken"),
        }
    }
}

/// Slot-level inputs shared by every candidate check.
#[derive(Debug, Clone, Copy)]
pub struct EligibilityContext<'a> {
    pub category: SlotCategory,
    pub target_year: u8,
    /// Codes completed in terms strictly before the current one.
    pub completed: &'a BTreeSet<String>,
    pub is_first_term: bool,
    /// Codes of every required (non-placeholder) course in the pathway.
    pub scheduled: &'a HashSet<String>,
}

/// Result of filtering a candidate pool.
#[derive(Debug, Clone)]
pub struct EligibilityOutcome<'a> {
    pub admissible: Vec<&'a CourseRecord>,
    pub excluded: Vec<(String, Exclusion)>, // (course code, reason)
}

// ────────────────────────────────────────────────────────────────────────────
// Filtering
// ────────────────────────────────────────────────────────────────────────────

/// Splits `pool` into admissible candidates and excluded records, preserving pool order.
pub fn filter_candidates<'a>(
    pool: &'a [CourseRecord],
    ctx: &EligibilityContext<'_>,
) -> EligibilityOutcome<'a> {
    let mut admissible = Vec::new();
    let mut excluded = Vec::new();

    for course in pool {
        match check_candidate(course, pool, ctx) {
            Ok(()) => admissible.push(course),
            Err(reason) => excluded.push((course.code().to_string(), reason)),
        }
    }

    EligibilityOutcome {
        admissible,
        excluded,
    }
}

/// Runs every check for one candidate. `pool` is the slot's full candidate pool,
/// used by the series guard to find first installments.
pub fn check_candidate(
    course: &CourseRecord,
    pool: &[CourseRecord],
    ctx: &EligibilityContext<'_>,
) -> Result<(), Exclusion> {
    let code = course.normalized_code().ok_or(Exclusion::MissingCode)?;

    let level = course
        .level()
        .filter(|l| *l > 0)
        .ok_or(Exclusion::MissingLevel)?;
    if level >= GRADUATE_LEVEL {
        return Err(Exclusion::GraduateLevel(level));
    }

    let credits = course
        .credit_value()
        .filter(|c| *c > 0.0)
        .ok_or(Exclusion::InvalidCredits)?;

    if ctx.scheduled.contains(&code) {
        return Err(Exclusion::AlreadyScheduled);
    }

    if let Some(kind) = disallowed_special_type(course.name()) {
        return Err(Exclusion::SpecialType(kind));
    }

    check_category_rules(course, level, credits, ctx)?;

    let requirement = parse_prerequisites(course.prerequisites());

    if requirement.has_flag(RequirementFlag::Permission) {
        return Err(Exclusion::NeedsPermission);
    }
    if requirement.has_flag(RequirementFlag::JuniorStanding) && ctx.target_year < 3 {
        return Err(Exclusion::NeedsJuniorStanding);
    }
    if requirement.has_flag(RequirementFlag::SeniorStanding) && ctx.target_year < 4 {
        return Err(Exclusion::NeedsSeniorStanding);
    }
    if requirement.has_flag(RequirementFlag::CoreqPresent)
        && !requirement.codes.iter().any(|c| ctx.completed.contains(c))
    {
        return Err(Exclusion::CorequisiteNotMet);
    }

    if !is_satisfied(&requirement, ctx.completed, ctx.is_first_term) {
        return Err(Exclusion::PrerequisitesNotMet);
    }

    if is_advanced_without_intro(course, ctx.completed, pool) {
        return Err(Exclusion::SequelWithoutIntro);
    }

    Ok(())
}

fn check_category_rules(
    course: &CourseRecord,
    level: u32,
    credits: f64,
    ctx: &EligibilityContext<'_>,
) -> Result<(), Exclusion> {
    let rules = ctx.category.rules();

    if rules.rejects_major_restricted
        && (detect_major_restriction(course.prerequisites())
            || detect_major_restriction(course.description()))
    {
        return Err(Exclusion::MajorRestricted);
    }

    if let Some(prefixes) = rules.allowed_prefixes {
        let prefix = course.prefix();
        if !prefixes.contains(&prefix.as_str()) {
            return Err(Exclusion::OutsideDepartments(prefix));
        }
    }

    if let Some(min_credits) = rules.lab_or_min_credits {
        if !is_lab_course(course) && credits < min_credits {
            return Err(Exclusion::NotLabCourse);
        }
    }

    if let Some(max) = rules.max_level {
        if level >= max {
            return Err(Exclusion::LevelTooHigh { level, max });
        }
    }

    for &(from_year, min) in rules.min_level_by_year {
        if ctx.target_year >= from_year && level < min {
            return Err(Exclusion::LevelTooLow { level, min });
        }
    }

    Ok(())
}

/// A course looks like a lab if its name says so, its title carries a `NNNNL`
/// number, or its code ends in `L`.
pub fn is_lab_course(course: &CourseRecord) -> bool {
    let name = course.name().to_lowercase();
    name.contains("lab")
        || name.contains("laboratory")
        || LAB_NUMBER_IN_TITLE.is_match(course.name())
        || course.code().trim().ends_with('L')
}

/// The first disallowed special-type fragment found in a course name.
pub fn disallowed_special_type(name: &str) -> Option<&'static str> {
    let lower = name.to_lowercase();
    DISALLOWED_SPECIAL_TYPES
        .iter()
        .copied()
        .find(|kind| lower.contains(kind))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
