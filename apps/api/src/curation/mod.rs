// Elective curation engine
// Implements: prerequisite parsing, eligibility, relevance scoring, term-by-term
// annotation, run orchestration and comparison reports.
// Curation is CPU-bound and synchronous; async callers go through spawn_blocking.

pub mod annotator;
pub mod eligibility;
pub mod handlers;
pub mod prereq_parser;
pub mod relevance;
pub mod report;
pub mod runner;
pub mod series_guard;
pub mod slot_category;
pub mod tracker;
