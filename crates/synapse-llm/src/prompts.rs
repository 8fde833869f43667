//! Prompt construction for the analysis operations.

use std::fmt::Write as _;

use synapse_common::StudyItem;
use synapse_graph::BridgeEntity;

/// Maximum characters of document text sent for analysis.
pub const MAX_DOCUMENT_CHARS: usize = 30_000;

/// Maximum characters of collection context in Q&A and narrative prompts.
pub const MAX_CONTEXT_CHARS: usize = 12_000;

/// Cut `s` to at most `max` chars, on a char boundary.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

pub fn document_analysis_prompt(text: &str, source: &str) -> String {
    let body = truncate_chars(text, MAX_DOCUMENT_CHARS);
    let truncated = if body.len() < text.len() { "\n[document truncated]" } else { "" };
    format!(
        "Analyse the following intelligence document received via {source}.\n\
         Extract every named entity (people, organisations, units, places, assets, events, \
         dates, capabilities) with a type tag and a confidence between 0 and 1, the relations \
         between them using entity names exactly as extracted, the key analytical insights, \
         and a dated timeline of events. Rate the source reliability between 0 and 1. \
         Return a cleaned version of the text without boilerplate.\n\n\
         --- DOCUMENT ---\n{body}{truncated}\n--- END DOCUMENT ---"
    )
}

/// One piece of reporting that mentions the profiled entity.
#[derive(Debug, Clone)]
pub struct ContextSnippet {
    pub study_title: String,
    pub source: String,
    pub mention: String,
    pub summary: String,
}

pub fn entity_context_prompt(entity: &str, snippets: &[ContextSnippet]) -> String {
    let mut prompt = format!(
        "Write a context card (dossier) for the entity \"{entity}\". Cover: identity and \
         affiliation, role in the reporting, known activities, relationships, and an \
         assessment of significance. Keep it under 250 words and mark any statement not \
         supported by the reporting below as background knowledge.\n"
    );
    if snippets.is_empty() {
        prompt.push_str("\nNo collection reporting mentions this entity.\n");
    } else {
        prompt.push_str("\nReporting that mentions it:\n");
        for (i, s) in snippets.iter().enumerate() {
            let _ = writeln!(
                prompt,
                "{}. [{}] ({}) as \"{}\": {}",
                i + 1,
                s.study_title,
                s.source,
                s.mention,
                s.summary
            );
        }
    }
    prompt
}

/// Longest summary carried into a single context line.
pub const MAX_SUMMARY_CHARS: usize = 600;

const OMITTED_DOCUMENTS: &str = "- [further documents omitted]\n";

/// Compact listing of studies used as grounding context. Long summaries are
/// cut per line; lines that no longer fit are skipped and flagged once.
pub fn collection_context(studies: &[StudyItem]) -> String {
    let mut ctx = String::new();
    let mut omitted = 0usize;
    for study in studies {
        let names: Vec<&str> = study.entities().iter().take(8).map(|e| e.name.as_str()).collect();
        let summary = truncate_chars(&study.intel.summary, MAX_SUMMARY_CHARS);
        let ellipsis = if summary.len() < study.intel.summary.len() { "…" } else { "" };
        let line = format!(
            "- [{}] {} ({}): {summary}{ellipsis} Entities: {}\n",
            study.id,
            study.display_title(),
            study.source,
            names.join(", ")
        );
        if ctx.len() + line.len() > MAX_CONTEXT_CHARS {
            omitted += 1;
            continue;
        }
        ctx.push_str(&line);
    }
    if omitted > 0 {
        ctx.push_str(OMITTED_DOCUMENTS);
    }
    ctx
}

pub fn contextual_question_prompt(question: &str, studies: &[StudyItem]) -> String {
    format!(
        "Answer the analyst's question using only the documents below. Cite document ids in \
         square brackets. If the documents do not answer it, say so plainly.\n\n\
         DOCUMENTS:\n{}\nQUESTION: {question}",
        collection_context(studies)
    )
}

/// One dated line of the merged timeline.
#[derive(Debug, Clone)]
pub struct TimelineLine {
    pub date: String,
    pub event: String,
    pub study_title: String,
    pub historical: bool,
}

const OMITTED_EVENTS: &str = "- [earlier events omitted]\n";

/// The bridge block is always complete; the timeline gives way to it,
/// dropping its oldest lines first.
pub fn narrative_prompt(
    current: &StudyItem,
    timeline: &[TimelineLine],
    bridges: &[BridgeEntity],
) -> String {
    let mut prompt = format!(
        "Write an analytical narrative (3–5 paragraphs) placing the current report \"{}\" in \
         its historical context. Explain how past events lead to the present situation, \
         anchoring every connection on the bridge entities listed. End with a short outlook.\n\n\
         CURRENT SUMMARY: {}\n\nTIMELINE:\n",
        current.display_title(),
        truncate_chars(&current.intel.summary, MAX_SUMMARY_CHARS * 4)
    );

    let mut bridge_block = String::from("\nBRIDGE ENTITIES:\n");
    for b in bridges {
        let _ = writeln!(
            bridge_block,
            "- {} (also \"{}\" in [{}] {})",
            b.name, b.historical_name, b.historical_study_id, b.historical_title
        );
    }
    if bridges.is_empty() {
        bridge_block.push_str("- none found; say that the link to history is weak\n");
    }

    let budget = MAX_DOCUMENT_CHARS
        .saturating_sub(prompt.len() + bridge_block.len() + OMITTED_EVENTS.len());
    prompt.push_str(&timeline_section(timeline, budget));
    prompt.push_str(&bridge_block);
    prompt
}

/// Newest lines that fit in `budget` bytes, in chronological order.
fn timeline_section(timeline: &[TimelineLine], budget: usize) -> String {
    if timeline.is_empty() {
        return "- no dated events reported\n".to_string();
    }
    let mut kept: Vec<String> = Vec::new();
    let mut used = 0usize;
    for line in timeline.iter().rev() {
        let marker = if line.historical { "historical" } else { "current" };
        let rendered = format!("- {} | {} | {} ({marker})\n", line.date, line.event, line.study_title);
        if used + rendered.len() > budget {
            break;
        }
        used += rendered.len();
        kept.push(rendered);
    }

    let mut section = String::with_capacity(used + OMITTED_EVENTS.len());
    if kept.len() < timeline.len() {
        section.push_str(OMITTED_EVENTS);
    }
    for rendered in kept.iter().rev() {
        section.push_str(rendered);
    }
    section
}
