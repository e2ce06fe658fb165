//! Slot categories — classifies an elective placeholder and carries its rules.
//!
//! Each category maps to one `CategoryRules` entry; eligibility and scoring read
//! the table instead of branching on labels.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::career::MajorConfig;

pub const SCIENCE_LAB_CATALOG: &str = "sciences_with_lab.json";
pub const TECHNICAL_CATALOG: &str = "comp_courses.json";
pub const ARTS_HUMANITIES_CATALOG: &str = "arts_humanities_courses.json";
pub const SOCIAL_SCIENCES_CATALOG: &str = "social_sciences_courses.json";

/// Department prefixes admitted for science-with-lab slots.
pub const SCIENCE_LAB_PREFIXES: &[&str] = &[
    "BIOL", "LIFE", "CHEM", "ATMO", "ENVI", "GEOL", "PHYS", "RADI",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotCategory {
    /// Science with lab.
    Scl,
    /// Arts & humanities.
    Ah,
    /// Social sciences.
    Ss,
    /// Technical / computer science.
    Tech,
    Free,
    Other,
}

/// Which career keyword table scores a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordTableKind {
    Technical,
    GeneralEducation,
}

/// Category-specific eligibility and scoring rules.
#[derive(Debug, Clone, Copy)]
pub struct CategoryRules {
    /// Exclusive upper bound on course level.
    pub max_level: Option<u32>,
    /// `(target_year, min_level)`: from that target year on, level must be at least `min_level`.
    pub min_level_by_year: &'static [(u8, u32)],
    pub allowed_prefixes: Option<&'static [&'static str]>,
    /// Course must look like a lab or carry at least this many credits.
    pub lab_or_min_credits: Option<f64>,
    /// Majors-only courses cannot fill this slot.
    pub rejects_major_restricted: bool,
    pub keyword_table: KeywordTableKind,
}

const SCL_RULES: CategoryRules = CategoryRules {
    max_level: Some(3000),
    min_level_by_year: &[],
    allowed_prefixes: Some(SCIENCE_LAB_PREFIXES),
    lab_or_min_credits: Some(4.0),
    rejects_major_restricted: true,
    keyword_table: KeywordTableKind::GeneralEducation,
};

const GEN_ED_RULES: CategoryRules = CategoryRules {
    max_level: Some(3000),
    min_level_by_year: &[],
    allowed_prefixes: None,
    lab_or_min_credits: None,
    rejects_major_restricted: true,
    keyword_table: KeywordTableKind::GeneralEducation,
};

const TECH_RULES: CategoryRules = CategoryRules {
    max_level: None,
    min_level_by_year: &[(3, 2000), (4, 3000)],
    allowed_prefixes: None,
    lab_or_min_credits: None,
    rejects_major_restricted: false,
    keyword_table: KeywordTableKind::Technical,
};

const FREE_RULES: CategoryRules = CategoryRules {
    max_level: None,
    min_level_by_year: &[],
    allowed_prefixes: None,
    lab_or_min_credits: None,
    rejects_major_restricted: true,
    keyword_table: KeywordTableKind::GeneralEducation,
};

const OTHER_RULES: CategoryRules = CategoryRules {
    max_level: None,
    min_level_by_year: &[],
    allowed_prefixes: None,
    lab_or_min_credits: None,
    rejects_major_restricted: false,
    keyword_table: KeywordTableKind::GeneralEducation,
};

impl SlotCategory {
    /// Classifies a slot label. First match wins.
    pub fn from_label(label: &str) -> Self {
        let s = label.to_lowercase();
        if (s.contains("science") && s.contains("lab")) || s.contains("scl") {
            SlotCategory::Scl
        } else if is_arts_humanities(&s) {
            SlotCategory::Ah
        } else if s.contains("social sciences") || s.contains("(ss") {
            SlotCategory::Ss
        } else if s.contains("computer science") || s.contains("technical") {
            SlotCategory::Tech
        } else if s.contains("free elective") {
            SlotCategory::Free
        } else {
            SlotCategory::Other
        }
    }

    pub fn rules(self) -> &'static CategoryRules {
        match self {
            SlotCategory::Scl => &SCL_RULES,
            SlotCategory::Ah | SlotCategory::Ss => &GEN_ED_RULES,
            SlotCategory::Tech => &TECH_RULES,
            SlotCategory::Free => &FREE_RULES,
            SlotCategory::Other => &OTHER_RULES,
        }
    }
}

/// Maps a year label ("Junior Year") to 1–4 by its leading word; 0 if unknown.
pub fn target_year_level(year_label: &str) -> u8 {
    let lower = year_label.to_lowercase();
    match lower.split_whitespace().next().unwrap_or("") {
        "freshman" => 1,
        "sophomore" => 2,
        "junior" => 3,
        "senior" => 4,
        _ => 0,
    }
}

fn is_arts_humanities(lower: &str) -> bool {
    lower.contains("arts and humanities")
        || lower.contains("arts & humanities")
        || lower.contains("(ah")
}

static NATURAL_SCIENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"natural\s*science").expect("Invalid natural science regex"));

static SCL_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bSCL\b").expect("Invalid SCL regex"));

/// Catalog files that supply candidates for a slot label, in pool order.
///
/// Free electives draw from every catalog the major marks as relevant; labels that
/// match no rule draw from nothing.
pub fn catalogs_for_slot(label: &str, major: &MajorConfig) -> Vec<String> {
    let name = label.to_lowercase();
    if NATURAL_SCIENCE.is_match(&name)
        || SCL_WORD.is_match(label)
        || name.contains("with lab")
        || name.contains("science with lab")
    {
        vec![SCIENCE_LAB_CATALOG.to_string()]
    } else if name.contains("computer science elective") || name.contains("technical elective") {
        vec![TECHNICAL_CATALOG.to_string()]
    } else if is_arts_humanities(&name) {
        vec![ARTS_HUMANITIES_CATALOG.to_string()]
    } else if name.contains("social sciences") || name.contains("(ss") {
        vec![SOCIAL_SCIENCES_CATALOG.to_string()]
    } else if name.contains("free elective") {
        major.relevant_catalogs.clone()
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_label() {
        assert_eq!(
            SlotCategory::from_label("Science with Lab Elective (SCL)"),
            SlotCategory::Scl
        );
        assert_eq!(
            SlotCategory::from_label("Arts and Humanities Elective"),
            SlotCategory::Ah
        );
        assert_eq!(SlotCategory::from_label("Gen Ed (AH)"), SlotCategory::Ah);
        assert_eq!(
            SlotCategory::from_label("Arts & Humanities Elective"),
            SlotCategory::Ah
        );
        assert_eq!(
            SlotCategory::from_label("Social Sciences Elective"),
            SlotCategory::Ss
        );
        assert_eq!(
            SlotCategory::from_label("Computer Science Elective"),
            SlotCategory::Tech
        );
        assert_eq!(
            SlotCategory::from_label("Technical Elective"),
            SlotCategory::Tech
        );
        assert_eq!(SlotCategory::from_label("Free Elective"), SlotCategory::Free);
        assert_eq!(
            SlotCategory::from_label("Major Elective"),
            SlotCategory::Other
        );
    }

    #[test]
    fn test_rules_dispatch() {
        let scl = SlotCategory::Scl.rules();
        assert_eq!(scl.max_level, Some(3000));
        assert!(scl.allowed_prefixes.unwrap().contains(&"PHYS"));
        assert_eq!(
            SlotCategory::Tech.rules().keyword_table,
            KeywordTableKind::Technical
        );
        assert!(!SlotCategory::Tech.rules().rejects_major_restricted);
        assert!(!SlotCategory::Other.rules().rejects_major_restricted);
        assert!(SlotCategory::Free.rules().rejects_major_restricted);
        assert_eq!(SlotCategory::Ss.rules().max_level, Some(3000));
    }

    #[test]
    fn test_target_year_level() {
        assert_eq!(target_year_level("Freshman Year"), 1);
        assert_eq!(target_year_level("sophomore"), 2);
        assert_eq!(target_year_level("Junior Year"), 3);
        assert_eq!(target_year_level("SENIOR YEAR"), 4);
        assert_eq!(target_year_level("Year 5"), 0);
        assert_eq!(target_year_level(""), 0);
    }

    #[test]
    fn test_catalogs_for_slot() {
        let major = MajorConfig {
            relevant_catalogs: vec![
                TECHNICAL_CATALOG.to_string(),
                ARTS_HUMANITIES_CATALOG.to_string(),
            ],
            ..Default::default()
        };
        assert_eq!(
            catalogs_for_slot("Natural Science Elective", &major),
            vec![SCIENCE_LAB_CATALOG]
        );
        assert_eq!(
            catalogs_for_slot("Gen Ed scl", &major),
            vec![SCIENCE_LAB_CATALOG]
        );
        assert_eq!(
            catalogs_for_slot("Technical Elective", &major),
            vec![TECHNICAL_CATALOG]
        );
        assert_eq!(
            catalogs_for_slot("Social Sciences Elective", &major),
            vec![SOCIAL_SCIENCES_CATALOG]
        );
        assert_eq!(
            catalogs_for_slot("Free Elective", &major),
            major.relevant_catalogs
        );
        assert!(catalogs_for_slot("Major Elective", &major).is_empty());
    }
}
