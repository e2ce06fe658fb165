pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::curation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Majors & careers
        .route("/api/v1/majors", get(handlers::handle_list_majors))
        .route(
            "/api/v1/majors/:major/careers/:career",
            get(handlers::handle_curate_career),
        )
        .route("/api/v1/majors/:major/report", get(handlers::handle_report))
        // Curation runs
        .route("/api/v1/curation/preview", post(handlers::handle_preview))
        .route("/api/v1/curation/runs", post(handlers::handle_run_all))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::curation::relevance::KeywordRelevanceScorer;
    use crate::curation::slot_category::SOCIAL_SCIENCES_CATALOG;
    use crate::models::course::CatalogSet;
    use crate::store::DataStore;

    fn app(root: &TempDir) -> Router {
        let catalog = serde_json::from_value(json!([
            {
                "course_number": "PSYC.1010",
                "course_name": "Introduction to Psychology",
                "credits": 3,
                "description": "Survey of human behavior and cognition.",
                "prerequisites": "No prerequisites"
            },
            {
                "course_number": "ECON.2010",
                "course_name": "Principles of Microeconomics",
                "credits": 3,
                "description": "Markets and incentives.",
                "prerequisites": "ECON.1010"
            }
        ]))
        .unwrap();

        let majors = serde_json::from_value(json!({
            "Computer_Science": {
                "pathways_dir_name": "cs",
                "output_dir_name": "cs",
                "pathway_files": { "BS Computer Science": "bs_cs.json" },
                "careers": [
                    {
                        "career_name": "UX Researcher",
                        "base_pathway_name": "BS Computer Science",
                        "general_ed_keywords": { "behavior": 4, "cognition": 3 }
                    }
                ]
            }
        }))
        .unwrap();

        let config = Config {
            data_dir: root.path().to_path_buf(),
            output_dir: root.path().join("out"),
            reports_dir: root.path().join("reports"),
            curation_config: PathBuf::from("config.json"),
            recommendations_per_slot: 5,
            port: 0,
            rust_log: "info".to_string(),
        };
        let store = DataStore {
            catalogs: CatalogSet::from([(SOCIAL_SCIENCES_CATALOG.to_string(), catalog)]),
            majors,
            pathways_dir: root.path().join("pathways"),
            output_dir: config.output_dir.clone(),
            reports_dir: config.reports_dir.clone(),
        };

        build_router(AppState {
            config,
            store: Arc::new(store),
            scorer: Arc::new(KeywordRelevanceScorer),
        })
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn preview_body(pathway: Value) -> Body {
        Body::from(
            json!({
                "major_key": "Computer_Science",
                "pathway": pathway,
                "career": {
                    "career_name": "UX Researcher",
                    "base_pathway_name": "BS Computer Science",
                    "general_ed_keywords": { "behavior": 4 }
                }
            })
            .to_string(),
        )
    }

    fn post_json(uri: &str, body: Body) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let root = TempDir::new().unwrap();
        let response = app(&root)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], json!("ok"));
    }

    #[tokio::test]
    async fn test_list_majors() {
        let root = TempDir::new().unwrap();
        let response = app(&root)
            .oneshot(Request::get("/api/v1/majors").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body[0]["major_key"], json!("Computer_Science"));
        assert_eq!(body[0]["careers"][0]["output_file"], json!("ux-researcher.json"));
    }

    #[tokio::test]
    async fn test_unknown_career_is_404() {
        let root = TempDir::new().unwrap();
        let response = app(&root)
            .oneshot(
                Request::get("/api/v1/majors/Computer_Science/careers/Astronaut")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"]["code"], json!("NOT_FOUND"));
    }

    #[tokio::test]
    async fn test_unreadable_base_pathway_is_server_error() {
        let root = TempDir::new().unwrap();
        let response = app(&root)
            .oneshot(
                Request::get("/api/v1/majors/Computer_Science/careers/UX%20Researcher")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        // bs_cs.json was never written, so the pathway cannot be loaded.
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_preview_rejects_empty_pathway() {
        let root = TempDir::new().unwrap();
        let response = app(&root)
            .oneshot(post_json(
                "/api/v1/curation/preview",
                preview_body(json!({ "pathway": {} })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_preview_annotates_inline_pathway() {
        let root = TempDir::new().unwrap();
        let pathway = json!({
            "pathway": {
                "Freshman Year": {
                    "Fall": [
                        { "course_number": "XXXX.XXXX", "course_name": "Social Sciences Elective" }
                    ]
                }
            }
        });
        let response = app(&root)
            .oneshot(post_json("/api/v1/curation/preview", preview_body(pathway)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["stats"]["annotated_slots"], json!(1));
        let options = &body["document"]["pathway"]["Freshman Year"]["Fall"][0]["recommended_options"];
        assert_eq!(options[0]["course_number"], json!("PSYC.1010"));
        assert_eq!(options[0]["rank"], json!(1));
        assert_eq!(
            options[0]["selection_reason"],
            json!("Matches: (behavior). ideal level band. no prerequisites")
        );
        // ECON.2010 needs ECON.1010, which no earlier term completed.
        assert!(options.get(1).is_none());
        assert_eq!(
            body["document"]["career_metadata"]["career_name"],
            json!("UX Researcher")
        );
    }

    #[tokio::test]
    async fn test_report_is_markdown_and_saved() {
        let root = TempDir::new().unwrap();
        let response = app(&root)
            .oneshot(
                Request::get("/api/v1/majors/Computer_Science/report")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/markdown; charset=utf-8"
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let markdown = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(markdown.contains("## UX Researcher"));
        assert!(markdown.contains("Could not find the generated roadmap file"));
        assert!(root
            .path()
            .join("reports")
            .join("Computer_Science_comparison_report.md")
            .exists());
    }
}
