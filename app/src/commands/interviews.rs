use anyhow::Result;
use research::interview::Interview;
use std::fmt::Write as _;

use crate::commands::product::select_product;
use crate::state::{AppState, InterviewData};

impl From<&Interview> for InterviewData {
    fn from(interview: &Interview) -> Self {
        Self {
            id: interview.id.clone(),
            persona_id: interview.persona_id.0,
            sentiment: interview.metrics.sentiment_score,
            conviction: interview.metrics.conviction_level,
            concerns: interview
                .metrics
                .main_concerns
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

/// Run autonomous interviews over the session's personas and save the results.
///
/// Personas are assembled from the default segment first if the session has none.
pub fn run_interviews(
    state: &AppState,
    product: Option<&str>,
    interviews: Option<usize>,
    questions: Option<usize>,
) -> Result<()> {
    let mut session = state.open_session()?;

    if session.personas.is_empty() {
        let segment = state.catalog.find(&state.config.default_segment)?;
        session.assemble_personas(segment, state.config.persona_count)?;
    }
    select_product(&mut session, product, &state.config.default_product)?;

    let questions = questions.unwrap_or(state.config.questions_per_interview);
    let results: Vec<InterviewData> = session
        .run_autonomous(interviews, questions)?
        .iter()
        .map(InterviewData::from)
        .collect();
    state.save_session(&session)?;

    let summary = session.summary();
    state.emit(&results, |results| {
        let mut out = String::new();
        for r in results {
            let _ = writeln!(
                out,
                "{:<14} persona #{:<3} sentiment {:>4.0}%  conviction {:>4.0}%  {}",
                r.id,
                r.persona_id,
                r.sentiment * 100.0,
                r.conviction * 100.0,
                r.concerns.join(", ")
            );
        }
        let _ = writeln!(
            out,
            "\n{} interviews total, average sentiment {:.0}%, average conviction {:.0}%",
            summary.interviews,
            summary.average_sentiment * 100.0,
            summary.average_conviction * 100.0
        );
        out
    })
}
