//! Run orchestration — one curation run per (major, career) pair.
//!
//! Runs are independent: each loads its own copy of the base pathway and threads
//! its own term state, so `run_all` fans them out over blocking worker threads.
//! A failed run is reported in the summary and never stops its siblings.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::curation::annotator::attach_run_metadata;
use crate::curation::relevance::{RelevanceScorer, ScoringProfile};
use crate::curation::tracker::{curate_pathway, CurationInputs, CurationStats};
use crate::errors::CurationError;
use crate::models::career::{CareerProfile, MajorConfig};
use crate::models::pathway::PathwayDocument;
use crate::store::{load_pathway, persist_curated, DataStore};

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// A curated pathway and what the run did to it.
#[derive(Debug, Clone, Serialize)]
pub struct CareerRun {
    pub major_key: String,
    pub career_name: String,
    pub stats: CurationStats,
    pub document: PathwayDocument,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    Succeeded {
        output_path: PathBuf,
        #[serde(flatten)]
        stats: CurationStats,
    },
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub major_key: String,
    pub career_name: String,
    #[serde(flatten)]
    pub status: RunStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub succeeded: usize,
    pub failed: usize,
    /// One entry per pair, in major-table order.
    pub outcomes: Vec<RunOutcome>,
}

// ────────────────────────────────────────────────────────────────────────────
// Single runs
// ────────────────────────────────────────────────────────────────────────────

/// Curates one career's base pathway. Nothing is written to disk.
pub fn run_career(
    store: &DataStore,
    scorer: &dyn RelevanceScorer,
    top_k: usize,
    major_key: &str,
    major: &MajorConfig,
    career: &CareerProfile,
) -> Result<CareerRun, CurationError> {
    let file_name = major
        .pathway_files
        .get(&career.base_pathway_name)
        .ok_or_else(|| CurationError::MissingPathwayFile(career.base_pathway_name.clone()))?;

    let mut document = load_pathway(&store.pathway_path(major, file_name))?;
    attach_run_metadata(&mut document, major_key, career);

    let stats = curate_document(store, scorer, top_k, major, career, &mut document)?;
    info!(
        "Curated '{}' for {} / {}: {} of {} elective slot(s) annotated",
        career.base_pathway_name,
        major_key,
        career.career_name,
        stats.annotated_slots,
        stats.elective_slots
    );

    Ok(CareerRun {
        major_key: major_key.to_string(),
        career_name: career.career_name.clone(),
        stats,
        document,
    })
}

/// Curates a caller-supplied pathway in place against the loaded catalogs.
pub fn curate_document(
    store: &DataStore,
    scorer: &dyn RelevanceScorer,
    top_k: usize,
    major: &MajorConfig,
    career: &CareerProfile,
    document: &mut PathwayDocument,
) -> Result<CurationStats, CurationError> {
    let profile = ScoringProfile::from_career(career)?;
    let inputs = CurationInputs {
        catalogs: &store.catalogs,
        major,
        profile: &profile,
        scorer,
        top_k,
    };
    curate_pathway(document, &inputs)
}

// ────────────────────────────────────────────────────────────────────────────
// Batch runs
// ────────────────────────────────────────────────────────────────────────────

/// Runs every configured (major, career) pair and persists each success.
pub async fn run_all(
    store: Arc<DataStore>,
    scorer: Arc<dyn RelevanceScorer>,
    top_k: usize,
) -> RunSummary {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    info!("Curation run {run_id} started");

    let pairs: Vec<(String, String)> = store
        .majors
        .iter()
        .flat_map(|(key, major)| {
            major
                .careers
                .iter()
                .map(move |c| (key.clone(), c.career_name.clone()))
        })
        .collect();

    let mut tasks = JoinSet::new();
    for (index, (major_key, career_name)) in pairs.iter().cloned().enumerate() {
        let store = Arc::clone(&store);
        let scorer = Arc::clone(&scorer);
        tasks.spawn(async move {
            let status = tokio::task::spawn_blocking({
                let major_key = major_key.clone();
                let career_name = career_name.clone();
                move || run_and_persist(&store, scorer.as_ref(), top_k, &major_key, &career_name)
            })
            .await
            .unwrap_or_else(|e| RunStatus::Failed {
                error: format!("spawn_blocking failed in curation run: {e}"),
            });
            (
                index,
                RunOutcome {
                    major_key,
                    career_name,
                    status,
                },
            )
        });
    }

    let mut slots: Vec<Option<RunOutcome>> = vec![None; pairs.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => slots[index] = Some(outcome),
            Err(e) => error!("Curation task aborted: {e}"),
        }
    }

    let outcomes: Vec<RunOutcome> = slots.into_iter().flatten().collect();
    let failed = outcomes
        .iter()
        .filter(|o| matches!(o.status, RunStatus::Failed { .. }))
        .count();
    let succeeded = outcomes.len() - failed;

    let finished_at = Utc::now();
    info!(
        "Curation run {run_id} finished: {succeeded} succeeded, {failed} failed in {} ms",
        (finished_at - started_at).num_milliseconds()
    );

    RunSummary {
        run_id,
        started_at,
        finished_at,
        succeeded,
        failed,
        outcomes,
    }
}

fn run_and_persist(
    store: &DataStore,
    scorer: &dyn RelevanceScorer,
    top_k: usize,
    major_key: &str,
    career_name: &str,
) -> RunStatus {
    let result = store
        .majors
        .get(major_key)
        .and_then(|major| major.career(career_name).map(|career| (major, career)))
        .ok_or_else(|| {
            CurationError::MissingPathwayFile(format!("{major_key} / {career_name}"))
        })
        .and_then(|(major, career)| {
            let run = run_career(store, scorer, top_k, major_key, major, career)?;
            let output_path = store.curated_path(major, career);
            persist_curated(&output_path, &run.document)?;
            Ok((output_path, run.stats))
        });

    match result {
        Ok((output_path, stats)) => {
            info!("Saved {}", output_path.display());
            RunStatus::Succeeded { output_path, stats }
        }
        Err(e) => {
            warn!("Skipping {major_key} / {career_name}: {e}");
            RunStatus::Failed {
                error: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curation::relevance::KeywordRelevanceScorer;
    use crate::curation::slot_category::ARTS_HUMANITIES_CATALOG;
    use crate::models::course::{CatalogSet, CourseRecord};
    use crate::store::load_curated;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn fixture(root: &TempDir) -> DataStore {
        let pathways_dir = root.path().join("pathways");
        fs::create_dir_all(pathways_dir.join("history")).unwrap();
        fs::write(
            pathways_dir.join("history").join("ba_history.json"),
            json!({
                "pathway": {
                    "Sophomore Year": {
                        "Fall": [
                            { "course_number": "HIST.2010", "course_name": "World History" },
                            { "course_number": "XXXX.XXXX", "course_name": "Arts and Humanities Elective" }
                        ]
                    }
                }
            })
            .to_string(),
        )
        .unwrap();

        let catalog: Vec<CourseRecord> = serde_json::from_value(json!([
            {
                "course_number": "ARTH.2110",
                "course_name": "Museum Studies",
                "credits": 3,
                "description": "Curating archives and collections.",
                "prerequisites": "None"
            },
            {
                "course_number": "PHIL.2030",
                "course_name": "Ethics",
                "credits": 3,
                "description": "Moral theory.",
                "prerequisites": ""
            }
        ]))
        .unwrap();

        let majors = serde_json::from_value(json!({
            "History": {
                "pathways_dir_name": "history",
                "output_dir_name": "history_out",
                "pathway_files": { "BA History": "ba_history.json" },
                "careers": [
                    {
                        "career_name": "Archivist",
                        "base_pathway_name": "BA History",
                        "general_ed_keywords": { "archives": 5 }
                    },
                    {
                        "career_name": "Policy Analyst",
                        "base_pathway_name": "BA Political Science",
                        "general_ed_keywords": { "policy": 5 }
                    }
                ]
            }
        }))
        .unwrap();

        DataStore {
            catalogs: CatalogSet::from([(ARTS_HUMANITIES_CATALOG.to_string(), catalog)]),
            majors,
            pathways_dir,
            output_dir: root.path().join("out"),
            reports_dir: root.path().join("reports"),
        }
    }

    #[test]
    fn test_run_career_attaches_metadata() {
        let root = TempDir::new().unwrap();
        let store = fixture(&root);
        let major = &store.majors["History"];
        let career = major.career("archivist").unwrap();

        let run = run_career(&store, &KeywordRelevanceScorer, 5, "History", major, career).unwrap();
        assert_eq!(run.stats.annotated_slots, 1);
        assert_eq!(
            run.document.extra["db_bindings"]["DegreePathways.Name"],
            json!("BA History")
        );

        let slot = run.document.enriched_slots().next().unwrap();
        let options = slot.recommended_options.as_ref().unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].course.code(), "ARTH.2110");
        assert_eq!(
            options[0].selection_reason,
            "Matches: (archives). ideal level band. no prerequisites"
        );
    }

    #[test]
    fn test_run_career_without_pathway_file_fails() {
        let root = TempDir::new().unwrap();
        let store = fixture(&root);
        let major = &store.majors["History"];
        let career = major.career("Policy Analyst").unwrap();

        let err = run_career(&store, &KeywordRelevanceScorer, 5, "History", major, career)
            .unwrap_err();
        assert!(matches!(err, CurationError::MissingPathwayFile(ref name) if name == "BA Political Science"));
    }

    #[tokio::test]
    async fn test_run_all_isolates_failures_and_persists_successes() {
        let root = TempDir::new().unwrap();
        let store = Arc::new(fixture(&root));

        let summary = run_all(Arc::clone(&store), Arc::new(KeywordRelevanceScorer), 5).await;
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert!(summary.finished_at >= summary.started_at);

        let names: Vec<_> = summary.outcomes.iter().map(|o| o.career_name.as_str()).collect();
        assert_eq!(names, vec!["Archivist", "Policy Analyst"]);

        let output = root.path().join("out").join("history_out").join("archivist.json");
        match &summary.outcomes[0].status {
            RunStatus::Succeeded { output_path, stats } => {
                assert_eq!(output_path, &output);
                assert_eq!(stats.recommendations, 1);
            }
            other => panic!("expected success, got {other:?}"),
        }
        assert!(load_curated(&output).is_some());
        assert!(!root.path().join("out").join("history_out").join("policy-analyst.json").exists());
    }

    #[tokio::test]
    async fn test_run_summary_serializes_status_tag() {
        let root = TempDir::new().unwrap();
        let store = Arc::new(fixture(&root));
        let summary = run_all(store, Arc::new(KeywordRelevanceScorer), 5).await;

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["outcomes"][0]["status"], json!("succeeded"));
        assert_eq!(value["outcomes"][0]["annotated_slots"], json!(1));
        assert_eq!(value["outcomes"][1]["status"], json!("failed"));
    }
}
