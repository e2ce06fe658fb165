use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

static FIRST_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("Invalid level regex"));

/// Loaded catalogs keyed by file name (`"comp_courses.json"`).
pub type CatalogSet = HashMap<String, Vec<CourseRecord>>;

/// A single course as it appears in a scraped catalog file.
///
/// Every field is optional on the wire: catalogs are scraped and routinely carry
/// nulls, strings where numbers belong, and extra attributes. Unknown attributes
/// are kept in `extra` so a recommendation round-trips the full source record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prerequisites: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CourseRecord {
    pub fn code(&self) -> &str {
        self.course_number.as_deref().unwrap_or("")
    }

    pub fn name(&self) -> &str {
        self.course_name.as_deref().unwrap_or("")
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub fn prerequisites(&self) -> &str {
        self.prerequisites.as_deref().unwrap_or("")
    }

    /// Identity of the course: see [`normalize_code`].
    pub fn normalized_code(&self) -> Option<String> {
        normalize_code(self.code())
    }

    /// Department prefix of the primary code (`MATH` for `MATH.1310/MATH.1310L`).
    pub fn prefix(&self) -> String {
        primary_code(self.code())
            .split('.')
            .next()
            .unwrap_or("")
            .to_uppercase()
    }

    /// Numeric level: the first run of digits in the course code.
    pub fn level(&self) -> Option<u32> {
        FIRST_NUMBER
            .find(self.code())
            .and_then(|m| m.as_str().parse().ok())
    }

    /// Usable credit value. Numbers and numeric strings are accepted; anything
    /// else (null, "TBA", "3-4") yields `None`.
    pub fn credit_value(&self) -> Option<f64> {
        match self.credits.as_ref()? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|c| c.is_finite())
    }

    /// Lowercased `name + " " + description`, the text keywords are matched against.
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.name(), self.description()).to_lowercase()
    }
}

/// The code before any cross-listing (`ECON.2110/POLI.2110` → `ECON.2110`).
pub fn primary_code(raw: &str) -> &str {
    raw.split('/').next().unwrap_or("").trim()
}

/// Normalizes a course code to `PREFIX.NUMBER`: cross-listings dropped, uppercased,
/// lab suffix stripped. Returns `None` for an empty code.
pub fn normalize_code(raw: &str) -> Option<String> {
    let upper = primary_code(raw).to_uppercase();
    if upper.is_empty() {
        return None;
    }
    let stripped = match upper.strip_suffix('L') {
        Some(rest) if rest.ends_with(|c: char| c.is_ascii_digit()) => rest,
        _ => upper.as_str(),
    };
    Some(stripped.to_string())
}

/// Placeholder codes look like `XXXX.XXXX` and never count as a real course.
pub fn is_placeholder_code(raw: &str) -> bool {
    raw.to_lowercase().contains("xxxx")
}
