use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// `keyword → weight`, in configuration order.
pub type KeywordTable = IndexMap<String, i64>;

/// `major_key → major`, in configuration order.
pub type MajorTable = IndexMap<String, MajorConfig>;

/// Keyword profile for one career built on top of a base pathway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CareerProfile {
    pub career_name: String,
    pub base_pathway_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_keywords: Option<KeywordTable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_keywords: Option<KeywordTable>,
    #[serde(default)]
    pub general_ed_keywords: KeywordTable,
    #[serde(default)]
    pub negative_keywords: Vec<String>,
}

impl CareerProfile {
    /// Keywords for technical slots: `tech_keywords`, falling back to
    /// `core_keywords` when the former is absent or empty.
    pub fn technical_keywords(&self) -> KeywordTable {
        self.tech_keywords
            .as_ref()
            .filter(|table| !table.is_empty())
            .or(self.core_keywords.as_ref())
            .cloned()
            .unwrap_or_default()
    }

    /// File name of the curated pathway for this career.
    pub fn output_file_name(&self) -> String {
        format!(
            "{}.json",
            self.career_name.to_lowercase().replace(|c: char| c == ' ' || c == '/', "-")
        )
    }
}

/// One major: where its pathways live, where output goes, and its careers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MajorConfig {
    pub pathways_dir_name: String,
    pub output_dir_name: String,
    #[serde(default)]
    pub pathway_files: IndexMap<String, String>,
    /// Catalogs that feed "Free Elective" slots.
    #[serde(default)]
    pub relevant_catalogs: Vec<String>,
    #[serde(default)]
    pub careers: Vec<CareerProfile>,
}

impl MajorConfig {
    pub fn career(&self, career_name: &str) -> Option<&CareerProfile> {
        self.careers
            .iter()
            .find(|c| c.career_name.eq_ignore_ascii_case(career_name))
    }
}
