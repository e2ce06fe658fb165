//! Axum route handlers for the Curation API.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::curation::annotator::attach_run_metadata;
use crate::curation::report::render_comparison_report;
use crate::curation::runner::{curate_document, run_all, run_career, CareerRun, RunSummary};
use crate::curation::tracker::CurationStats;
use crate::errors::AppError;
use crate::models::career::{CareerProfile, MajorConfig};
use crate::models::pathway::PathwayDocument;
use crate::state::AppState;
use crate::store::{load_curated, persist_report};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CareerSummary {
    pub career_name: String,
    pub base_pathway_name: String,
    pub output_file: String,
}

#[derive(Debug, Serialize)]
pub struct MajorSummary {
    pub major_key: String,
    pub pathways: Vec<String>,
    pub relevant_catalogs: Vec<String>,
    pub careers: Vec<CareerSummary>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub major_key: String,
    pub pathway: PathwayDocument,
    pub career: CareerProfile,
    /// Catalogs that feed "Free Elective" slots.
    #[serde(default)]
    pub relevant_catalogs: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub stats: CurationStats,
    pub document: PathwayDocument,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/majors
pub async fn handle_list_majors(State(state): State<AppState>) -> Json<Vec<MajorSummary>> {
    let majors = state
        .store
        .majors
        .iter()
        .map(|(key, major)| MajorSummary {
            major_key: key.clone(),
            pathways: major.pathway_files.keys().cloned().collect(),
            relevant_catalogs: major.relevant_catalogs.clone(),
            careers: major
                .careers
                .iter()
                .map(|c| CareerSummary {
                    career_name: c.career_name.clone(),
                    base_pathway_name: c.base_pathway_name.clone(),
                    output_file: c.output_file_name(),
                })
                .collect(),
        })
        .collect();

    Json(majors)
}

/// GET /api/v1/majors/:major/careers/:career
///
/// Curates one career's base pathway and returns it. Nothing is persisted.
pub async fn handle_curate_career(
    State(state): State<AppState>,
    Path((major_key, career_name)): Path<(String, String)>,
) -> Result<Json<CareerRun>, AppError> {
    let (major, career) = lookup(&state, &major_key, &career_name)?;
    let store = state.store.clone();
    let scorer = state.scorer.clone();
    let top_k = state.config.recommendations_per_slot;

    let run = tokio::task::spawn_blocking(move || {
        run_career(&store, scorer.as_ref(), top_k, &major_key, &major, &career)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in curation: {e}")))??;

    Ok(Json(run))
}

/// POST /api/v1/curation/preview
///
/// Curates an inline pathway for an inline career profile against the loaded catalogs.
pub async fn handle_preview(
    State(state): State<AppState>,
    Json(request): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, AppError> {
    if request.pathway.pathway.is_empty() {
        return Err(AppError::Validation("pathway cannot be empty".to_string()));
    }
    if request.career.career_name.trim().is_empty() {
        return Err(AppError::Validation(
            "career.career_name cannot be empty".to_string(),
        ));
    }

    let store = state.store.clone();
    let scorer = state.scorer.clone();
    let top_k = state.config.recommendations_per_slot;

    let response = tokio::task::spawn_blocking(move || {
        let PreviewRequest {
            major_key,
            mut pathway,
            career,
            relevant_catalogs,
        } = request;
        let major = MajorConfig {
            relevant_catalogs,
            ..Default::default()
        };
        attach_run_metadata(&mut pathway, &major_key, &career);
        let stats = curate_document(&store, scorer.as_ref(), top_k, &major, &career, &mut pathway)?;
        Ok::<_, AppError>(PreviewResponse {
            stats,
            document: pathway,
        })
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in preview: {e}")))??;

    Ok(Json(response))
}

/// POST /api/v1/curation/runs
///
/// Runs every configured (major, career) pair and persists each curated pathway.
/// Individual failures are reported in the summary, not as an error response.
pub async fn handle_run_all(State(state): State<AppState>) -> Json<RunSummary> {
    let summary = run_all(
        state.store.clone(),
        state.scorer.clone(),
        state.config.recommendations_per_slot,
    )
    .await;
    Json(summary)
}

/// GET /api/v1/majors/:major/report
///
/// Renders the comparison report from persisted curated pathways and saves a copy.
pub async fn handle_report(
    State(state): State<AppState>,
    Path(major_key): Path<String>,
) -> Result<Response, AppError> {
    let major = state
        .store
        .majors
        .get(&major_key)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Major '{major_key}' not found")))?;
    let store = state.store.clone();

    let markdown = tokio::task::spawn_blocking(move || {
        let curated: HashMap<String, PathwayDocument> = major
            .careers
            .iter()
            .filter_map(|career| {
                load_curated(&store.curated_path(&major, career))
                    .map(|doc| (career.career_name.clone(), doc))
            })
            .collect();

        let markdown = render_comparison_report(&major_key, &major, &curated);
        let path = store.report_path(&major_key);
        persist_report(&path, &markdown)?;
        info!("Report saved to {}", path.display());
        Ok::<_, AppError>(markdown)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in report: {e}")))??;

    Ok((
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        markdown,
    )
        .into_response())
}

fn lookup(
    state: &AppState,
    major_key: &str,
    career_name: &str,
) -> Result<(MajorConfig, CareerProfile), AppError> {
    let major = state
        .store
        .majors
        .get(major_key)
        .ok_or_else(|| AppError::NotFound(format!("Major '{major_key}' not found")))?;
    let career = major.career(career_name).ok_or_else(|| {
        AppError::NotFound(format!(
            "Career '{career_name}' not found for major '{major_key}'"
        ))
    })?;
    Ok((major.clone(), career.clone()))
}
