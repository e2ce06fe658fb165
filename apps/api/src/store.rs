//! File-backed data store: catalogs, the major table, base pathways, curated output.
//!
//! Everything is read once at startup except pathways, which are read per run so
//! each run starts from its own copy.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::CurationError;
use crate::models::career::{CareerProfile, MajorConfig, MajorTable};
use crate::models::course::{CatalogSet, CourseRecord};
use crate::models::pathway::PathwayDocument;

/// Loaded reference data plus the directories runs read from and write to.
#[derive(Debug, Clone, Default)]
pub struct DataStore {
    pub catalogs: CatalogSet,
    pub majors: MajorTable,
    pub pathways_dir: PathBuf,
    pub output_dir: PathBuf,
    pub reports_dir: PathBuf,
}

impl DataStore {
    /// Loads catalogs and the major table. A bad major table fails startup;
    /// bad catalog files are skipped.
    pub fn load(config: &Config) -> Result<Self> {
        let catalogs = load_catalogs(&config.data_dir.join("catalogs"));
        info!("Loaded {} catalog file(s)", catalogs.len());

        let majors = load_major_table(&config.curation_config).with_context(|| {
            format!(
                "Failed to load major table from {}",
                config.curation_config.display()
            )
        })?;
        info!("Loaded {} major(s)", majors.len());

        Ok(Self {
            catalogs,
            majors,
            pathways_dir: config.data_dir.join("pathways"),
            output_dir: config.output_dir.clone(),
            reports_dir: config.reports_dir.clone(),
        })
    }

    /// Location of a base pathway file for a major.
    pub fn pathway_path(&self, major: &MajorConfig, file_name: &str) -> PathBuf {
        self.pathways_dir
            .join(&major.pathways_dir_name)
            .join(file_name)
    }

    /// Location of a career's curated pathway.
    pub fn curated_path(&self, major: &MajorConfig, career: &CareerProfile) -> PathBuf {
        self.output_dir
            .join(&major.output_dir_name)
            .join(career.output_file_name())
    }

    pub fn report_path(&self, major_key: &str) -> PathBuf {
        self.reports_dir
            .join(format!("{major_key}_comparison_report.md"))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Loading
// ────────────────────────────────────────────────────────────────────────────

/// Reads every `*.json` catalog in `dir`, keyed by file name.
/// Unreadable or malformed files are logged and treated as absent.
pub fn load_catalogs(dir: &Path) -> CatalogSet {
    let mut catalogs = CatalogSet::new();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Catalog directory {} is unreadable: {e}", dir.display());
            return catalogs;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        match read_json::<Vec<Value>>(&path) {
            Ok(raw) => {
                let records = parse_catalog_records(name, raw);
                info!("Catalog {name}: {} course(s)", records.len());
                catalogs.insert(name.to_string(), records);
            }
            Err(e) => warn!("Skipping catalog {name}: {e}"),
        }
    }

    catalogs
}

/// Converts raw catalog entries one at a time; an entry that does not fit the
/// record shape is dropped without affecting the rest of the catalog.
fn parse_catalog_records(catalog: &str, raw: Vec<Value>) -> Vec<CourseRecord> {
    let total = raw.len();
    let records: Vec<CourseRecord> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!("Catalog {catalog}: dropping entry #{index}: {e}");
                None
            }
        })
        .collect();

    if records.len() < total {
        warn!(
            "Catalog {catalog}: skipped {} of {total} unreadable entries",
            total - records.len()
        );
    }
    records
}

pub fn load_major_table(path: &Path) -> Result<MajorTable, CurationError> {
    read_json(path)
}

pub fn load_pathway(path: &Path) -> Result<PathwayDocument, CurationError> {
    let raw = fs::read_to_string(path).map_err(|source| CurationError::PathwayUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CurationError::PathwayMalformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a curated pathway written by an earlier run.
/// A missing or unparseable file is `None`.
pub fn load_curated(path: &Path) -> Option<PathwayDocument> {
    match read_json(path) {
        Ok(doc) => Some(doc),
        Err(e) => {
            warn!("No usable curated pathway at {}: {e}", path.display());
            None
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CurationError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

// ────────────────────────────────────────────────────────────────────────────
// Persisting
// ────────────────────────────────────────────────────────────────────────────

/// Writes a curated pathway as pretty JSON. The file appears only once fully
/// written: content goes to a temp file in the target directory, then is renamed.
pub fn persist_curated(path: &Path, doc: &PathwayDocument) -> Result<(), CurationError> {
    let mut body = serde_json::to_vec_pretty(doc)?;
    body.push(b'\n');
    write_atomic(path, &body)
}

pub fn persist_report(path: &Path, markdown: &str) -> Result<(), CurationError> {
    write_atomic(path, markdown.as_bytes())
}

fn write_atomic(path: &Path, body: &[u8]) -> Result<(), CurationError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(body)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}
