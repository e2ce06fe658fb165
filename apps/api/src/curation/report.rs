//! Comparison report — markdown summary of what each career's run added to its
//! base pathway. Pure formatting over persisted output.

use std::collections::HashMap;

use crate::models::career::MajorConfig;
use crate::models::pathway::PathwayDocument;

/// Renders the report for one major. `curated` maps career name → curated
/// pathway; careers without an entry are reported as missing.
pub fn render_comparison_report(
    major_key: &str,
    major: &MajorConfig,
    curated: &HashMap<String, PathwayDocument>,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Comparison Report for Major: {major_key}\n\n"));
    out.push_str(
        "This report shows the recommended courses that were automatically appended to each elective slot.\n\n",
    );

    for career in &major.careers {
        out.push_str(&format!("## {}\n", career.career_name));
        out.push_str(&format!("**Based on:** `{}`\n\n", career.base_pathway_name));

        let Some(doc) = curated.get(&career.career_name) else {
            out.push_str("Could not find the generated roadmap file for this career path.\n\n---\n\n");
            continue;
        };

        let mut enriched = doc.enriched_slots().peekable();
        if enriched.peek().is_none() {
            out.push_str(
                "No specific recommendations were generated for the elective slots in this path.\n\n",
            );
        } else {
            out.push_str("### Enriched Elective Slots with Recommendations\n\n");
            for slot in enriched {
                out.push_str(&format!(
                    "#### Recommendations for: `{} - {}`\n",
                    slot.course_number, slot.course_name
                ));
                for option in slot.recommended_options.iter().flatten() {
                    out.push_str(&format!("* {} - {}\n", option.course.code(), option.course.name()));
                    if !option.selection_reason.is_empty() {
                        out.push_str(&format!("  * *Selection Logic: {}*\n", option.selection_reason));
                    }
                }
                out.push('\n');
            }
        }

        out.push_str("---\n\n");
    }

    out
}
