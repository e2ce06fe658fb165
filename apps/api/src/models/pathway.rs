use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::models::course::{is_placeholder_code, normalize_code, CourseRecord};

/// `term_label → slots`, in document order.
pub type TermMap = IndexMap<String, Vec<PathwaySlot>>;

/// A degree pathway: `year_label → term_label → slots`.
///
/// Document order is trusted as chronological; maps are order-preserving so a
/// curated pathway serializes in the same order it was read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathwayDocument {
    #[serde(default)]
    pub pathway: IndexMap<String, TermMap>,
    /// Root-level attributes (pathway title, run metadata after curation, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One course entry in a term. Elective placeholders are slots too.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathwaySlot {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub course_number: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub course_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_options: Option<Vec<Recommendation>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A ranked candidate written back into an elective slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(flatten)]
    pub course: CourseRecord,
    pub selection_reason: String,
    pub rank: usize,
}

/// Scraped templates carry `null` for unknown codes and names; read it as "".
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl PathwaySlot {
    /// Elective placeholders are named "... Elective" or carry a `XXXX.XXXX` code.
    pub fn is_elective(&self) -> bool {
        self.course_name.to_lowercase().contains("elective")
            || self.course_number.to_lowercase().contains("xxxx.xxxx")
    }

    /// Normalized code of a real (non-placeholder) course, if any.
    pub fn scheduled_code(&self) -> Option<String> {
        if is_placeholder_code(&self.course_number) {
            return None;
        }
        normalize_code(&self.course_number)
    }
}

impl PathwayDocument {
    pub fn slots(&self) -> impl Iterator<Item = &PathwaySlot> {
        self.pathway
            .values()
            .flat_map(|terms| terms.values())
            .flatten()
    }

    /// Elective slots that received at least one recommendation.
    pub fn enriched_slots(&self) -> impl Iterator<Item = &PathwaySlot> {
        self.slots().filter(|slot| {
            slot.recommended_options
                .as_ref()
                .is_some_and(|options| !options.is_empty())
        })
    }
}
