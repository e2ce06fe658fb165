//! Term-State Tracker — walks a pathway term by term and fills every elective slot.
//!
//! The set of completed codes is an explicit value threaded through the walk: a
//! term sees only what earlier terms finished, and courses scheduled in a term are
//! added only after every slot of that term has been processed.

use std::borrow::Cow;
use std::collections::{BTreeSet, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::curation::annotator::{annotate_slot, rank_candidates, ScoredCandidate};
use crate::curation::eligibility::{filter_candidates, EligibilityContext};
use crate::curation::relevance::{build_selection_reason, RelevanceScorer, ScoringProfile};
use crate::curation::slot_category::{catalogs_for_slot, target_year_level, SlotCategory};
use crate::errors::CurationError;
use crate::models::career::MajorConfig;
use crate::models::course::{CatalogSet, CourseRecord};
use crate::models::pathway::{PathwayDocument, PathwaySlot};

/// Codes completed in terms strictly before the one being processed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermState {
    completed: BTreeSet<String>,
}

impl TermState {
    pub fn completed(&self) -> &BTreeSet<String> {
        &self.completed
    }

    pub fn is_first_term(&self) -> bool {
        self.completed.is_empty()
    }

    /// State for the next term: everything scheduled in `slots` is now complete.
    pub fn advance(mut self, slots: &[PathwaySlot]) -> Self {
        self.completed
            .extend(slots.iter().filter_map(PathwaySlot::scheduled_code));
        self
    }
}

/// Everything a curation walk reads besides the pathway itself.
pub struct CurationInputs<'a> {
    pub catalogs: &'a CatalogSet,
    pub major: &'a MajorConfig,
    pub profile: &'a ScoringProfile,
    pub scorer: &'a dyn RelevanceScorer,
    pub top_k: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CurationStats {
    pub terms: usize,
    pub elective_slots: usize,
    pub annotated_slots: usize,
    pub recommendations: usize,
}

/// Normalized codes of every required course anywhere in the pathway.
pub fn collect_scheduled_codes(doc: &PathwayDocument) -> HashSet<String> {
    doc.slots().filter_map(PathwaySlot::scheduled_code).collect()
}

/// Annotates every elective slot of `doc` in document order.
///
/// A missing catalog aborts the walk; the caller treats the run as failed.
pub fn curate_pathway(
    doc: &mut PathwayDocument,
    inputs: &CurationInputs<'_>,
) -> Result<CurationStats, CurationError> {
    let scheduled = collect_scheduled_codes(doc);
    let mut state = TermState::default();
    let mut stats = CurationStats::default();

    for (year_label, terms) in doc.pathway.iter_mut() {
        let target_year = target_year_level(year_label);
        for (term_label, slots) in terms.iter_mut() {
            debug!(
                "Curating {} / {} ({} completed so far)",
                year_label,
                term_label,
                state.completed().len()
            );
            process_term(slots, &state, target_year, &scheduled, inputs, &mut stats)?;
            state = state.advance(slots);
            stats.terms += 1;
        }
    }

    Ok(stats)
}

fn process_term(
    slots: &mut [PathwaySlot],
    state: &TermState,
    target_year: u8,
    scheduled: &HashSet<String>,
    inputs: &CurationInputs<'_>,
    stats: &mut CurationStats,
) -> Result<(), CurationError> {
    for slot in slots.iter_mut().filter(|s| s.is_elective()) {
        stats.elective_slots += 1;

        let category = SlotCategory::from_label(&slot.course_name);
        let pool = candidate_pool(&slot.course_name, inputs)?;
        let ctx = EligibilityContext {
            category,
            target_year,
            completed: state.completed(),
            is_first_term: state.is_first_term(),
            scheduled,
        };

        let outcome = filter_candidates(&pool, &ctx);
        for (code, reason) in &outcome.excluded {
            debug!("'{}': excluded {} ({})", slot.course_name, code, reason);
        }

        let keywords = inputs.profile.table_for(category);
        let scored = outcome
            .admissible
            .into_iter()
            .map(|course| {
                let outcome =
                    inputs
                        .scorer
                        .score(course, keywords, &inputs.profile.negative, target_year);
                let notes = inputs.scorer.notes(course, category);
                ScoredCandidate {
                    course,
                    score: outcome.score,
                    reason: build_selection_reason(&outcome.reason, &notes),
                }
            })
            .collect();

        let recommendations = rank_candidates(scored, inputs.top_k);
        if recommendations.is_empty() {
            debug!("'{}': no recommendation above zero", slot.course_name);
        } else {
            stats.annotated_slots += 1;
            stats.recommendations += recommendations.len();
        }
        annotate_slot(slot, recommendations);
    }

    Ok(())
}

/// Concatenates the catalogs a slot draws from, in catalog order.
fn candidate_pool<'a>(
    label: &str,
    inputs: &CurationInputs<'a>,
) -> Result<Cow<'a, [CourseRecord]>, CurationError> {
    let names = catalogs_for_slot(label, inputs.major);

    let mut catalogs = Vec::with_capacity(names.len());
    for name in names {
        let records = inputs
            .catalogs
            .get(&name)
            .ok_or(CurationError::MissingCatalog(name))?;
        catalogs.push(records.as_slice());
    }

    Ok(match catalogs.as_slice() {
        [] => Cow::Borrowed(&[][..]),
        [single] => Cow::Borrowed(*single),
        many => Cow::Owned(many.concat()),
    })
}
