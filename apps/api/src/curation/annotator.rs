//! Pathway Annotator — turns scored candidates into ranked recommendations and
//! stamps run metadata onto the curated document.

use std::collections::HashSet;

use serde_json::json;

use crate::models::career::CareerProfile;
use crate::models::course::CourseRecord;
use crate::models::pathway::{PathwayDocument, PathwaySlot, Recommendation};

/// A candidate that survived eligibility, with its score and justification.
#[derive(Debug, Clone)]
pub struct ScoredCandidate<'a> {
    pub course: &'a CourseRecord,
    pub score: i64,
    pub reason: String,
}

/// Ranks scored candidates for one slot.
///
/// Zero/negative scores are dropped, the rest are stably sorted by descending
/// score (ties keep catalog order), deduplicated by normalized code keeping the
/// highest-scored entry, and cut to `top_k` with 1-based ranks. Recommendations
/// are deep copies; catalog records are never touched.
pub fn rank_candidates(mut scored: Vec<ScoredCandidate<'_>>, top_k: usize) -> Vec<Recommendation> {
    scored.retain(|c| c.score > 0);
    scored.sort_by(|a, b| b.score.cmp(&a.score));

    let mut seen = HashSet::new();
    scored
        .into_iter()
        .filter(|c| seen.insert(c.course.normalized_code().unwrap_or_default()))
        .take(top_k)
        .enumerate()
        .map(|(i, c)| Recommendation {
            course: c.course.clone(),
            selection_reason: c.reason,
            rank: i + 1,
        })
        .collect()
}

/// Writes recommendations into a slot. An empty list removes the field entirely:
/// an unannotated slot is preferred over a weak suggestion.
pub fn annotate_slot(slot: &mut PathwaySlot, recommendations: Vec<Recommendation>) {
    slot.recommended_options = if recommendations.is_empty() {
        None
    } else {
        Some(recommendations)
    };
}

/// Attaches `career_metadata` and `db_bindings` at the document root.
pub fn attach_run_metadata(doc: &mut PathwayDocument, major_key: &str, career: &CareerProfile) {
    doc.extra.insert(
        "career_metadata".to_string(),
        json!({
            "major_key": major_key,
            "career_name": career.career_name,
            "base_pathway_name": career.base_pathway_name,
            "keywords_used": {
                "tech_keywords_or_core": career.technical_keywords(),
                "general_ed_keywords": career.general_ed_keywords,
                "negative_keywords": career.negative_keywords,
            }
        }),
    );
    doc.extra.insert(
        "db_bindings".to_string(),
        json!({
            "Majors.Name": major_key.replace('_', " "),
            "CareerPaths.Name": career.career_name,
            "DegreePathways.Name": career.base_pathway_name,
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn course(code: &str) -> CourseRecord {
        CourseRecord {
            course_number: Some(code.to_string()),
            course_name: Some(format!("Course {code}")),
            credits: Some(json!(3)),
            ..Default::default()
        }
    }

    fn scored<'a>(course: &'a CourseRecord, score: i64) -> ScoredCandidate<'a> {
        ScoredCandidate {
            course,
            score,
            reason: format!("score {score}"),
        }
    }

    #[test]
    fn test_ranks_descending_and_drops_zero_scores() {
        let a = course("HIST.1010");
        let b = course("HIST.1020");
        let c = course("HIST.1030");
        let ranked = rank_candidates(vec![scored(&a, 5), scored(&b, 0), scored(&c, 9)], 5);
        let codes: Vec<_> = ranked.iter().map(|r| r.course.code()).collect();
        assert_eq!(codes, vec!["HIST.1030", "HIST.1010"]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].rank, 2);
        assert_eq!(ranked[0].selection_reason, "score 9");
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let a = course("ARTH.1010");
        let b = course("ARTH.1020");
        let c = course("ARTH.1030");
        let ranked = rank_candidates(vec![scored(&a, 4), scored(&b, 7), scored(&c, 4)], 5);
        let codes: Vec<_> = ranked.iter().map(|r| r.course.code()).collect();
        assert_eq!(codes, vec!["ARTH.1020", "ARTH.1010", "ARTH.1030"]);
    }

    #[test]
    fn test_dedup_keeps_highest_scored_code() {
        let lecture = course("CHEM.1210");
        let lab = course("CHEM.1210L");
        let ranked = rank_candidates(vec![scored(&lecture, 3), scored(&lab, 8)], 5);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].course.code(), "CHEM.1210L");
    }

    #[test]
    fn test_top_k_limit() {
        let courses: Vec<_> = (0..8).map(|i| course(&format!("ENGL.10{i}0"))).collect();
        let ranked = rank_candidates(courses.iter().map(|c| scored(c, 1)).collect(), 5);
        assert_eq!(ranked.len(), 5);
        assert_eq!(ranked.last().map(|r| r.rank), Some(5));
    }

    #[test]
    fn test_empty_recommendations_remove_field() {
        let mut slot = PathwaySlot {
            course_name: "Free Elective".to_string(),
            recommended_options: Some(vec![]),
            ..Default::default()
        };
        annotate_slot(&mut slot, Vec::new());
        assert!(slot.recommended_options.is_none());
    }

    #[test]
    fn test_run_metadata_attached_at_root() {
        let mut doc = PathwayDocument::default();
        let career = CareerProfile {
            career_name: "Data Analyst".to_string(),
            base_pathway_name: "BS Mathematics".to_string(),
            negative_keywords: vec!["nursing".to_string()],
            ..Default::default()
        };
        attach_run_metadata(&mut doc, "Applied_Math", &career);
        assert_eq!(
            doc.extra["career_metadata"]["career_name"],
            json!("Data Analyst")
        );
        assert_eq!(
            doc.extra["db_bindings"]["Majors.Name"],
            json!("Applied Math")
        );
        assert_eq!(
            doc.extra["career_metadata"]["keywords_used"]["negative_keywords"],
            json!(["nursing"])
        );
    }

    #[test]
    fn test_run_metadata_keeps_keyword_order() {
        let mut doc = PathwayDocument::default();
        let career = CareerProfile {
            career_name: "Data Analyst".to_string(),
            tech_keywords: Some(
                [("statistics", 5), ("databases", 4), ("algorithms", 3)]
                    .into_iter()
                    .map(|(k, w)| (k.to_string(), w))
                    .collect(),
            ),
            ..Default::default()
        };
        attach_run_metadata(&mut doc, "Mathematics", &career);

        let used = doc.extra["career_metadata"]["keywords_used"]["tech_keywords_or_core"]
            .as_object()
            .unwrap();
        let keys: Vec<_> = used.keys().cloned().collect();
        assert_eq!(keys, vec!["statistics", "databases", "algorithms"]);

        let metadata_keys: Vec<_> = doc.extra["career_metadata"]
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(
            metadata_keys,
            vec!["major_key", "career_name", "base_pathway_name", "keywords_used"]
        );
    }
}
