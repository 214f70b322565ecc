use anyhow::Result;
use rand::Rng;
use research::assembly::{example_personas, PersonaAssembler};
use research::{PersonaDraft, PersonaId, ResearchSession};
use std::fmt::Write as _;
use tracing::info;

use crate::state::{AppState, PersonaData};

fn render_table(personas: &[PersonaData]) -> String {
    let mut out = String::new();
    for p in personas {
        let _ = writeln!(
            out,
            "#{:<3} {:<28} {:<6} {:>3}  {:<28} {}",
            p.id, p.name, p.gender, p.age, p.job, p.segment
        );
    }
    out
}

/// Assemble a fresh persona set for a segment (or load the examples) and save it
pub fn generate_personas(
    state: &AppState,
    segment: Option<&str>,
    count: Option<u32>,
    examples: bool,
) -> Result<()> {
    if !examples {
        return generate_seeded(state, segment, count, &mut rand::thread_rng());
    }

    let mut session = state.open_session()?;
    session.load_personas(example_personas());
    info!("Loaded {} example personas", session.personas.len());
    save_and_print(state, &session)
}

/// Assemble a persona set from the given RNG and save it
pub fn generate_seeded<R: Rng + ?Sized>(
    state: &AppState,
    segment: Option<&str>,
    count: Option<u32>,
    rng: &mut R,
) -> Result<()> {
    let mut session = state.open_session()?;
    let name = segment.unwrap_or(&state.config.default_segment);
    let segment = state.catalog.find(name)?;
    session.assemble_with_rng(
        &PersonaAssembler::builtin(),
        segment,
        count.or(state.config.persona_count),
        rng,
    )?;
    save_and_print(state, &session)
}

fn save_and_print(state: &AppState, session: &ResearchSession) -> Result<()> {
    state.save_session(session)?;
    let personas: Vec<PersonaData> = session.personas.iter().map(PersonaData::from).collect();
    state.emit(&personas, |p| render_table(p))
}

/// Add a hand-built persona to the session's persona set
pub fn add_persona(state: &AppState, draft: PersonaDraft) -> Result<()> {
    let mut session = state.open_session()?;
    let added = PersonaData::from(session.add_persona(draft)?);
    state.save_session(&session)?;
    state.emit(&added, |p| render_table(std::slice::from_ref(p)))
}

pub fn list_personas(state: &AppState) -> Result<()> {
    let session = state.open_session()?;
    let personas: Vec<PersonaData> = session.personas.iter().map(PersonaData::from).collect();
    state.emit(&personas, |p| render_table(p))
}

/// Full profile of one persona
pub fn get_persona(state: &AppState, persona_id: u64) -> Result<()> {
    let session = state.open_session()?;
    let persona = session.persona(PersonaId(persona_id))?;

    state.emit(persona, |p| {
        format!(
            "{} ({}, {})\n{} at {}\nSegment: {}\n\nExperience: {}\nPain points: {}\nGoals: {}\nPersonality: {}\n",
            p.display_name,
            p.age,
            p.identity.gender,
            p.job,
            p.company,
            p.segment,
            p.experience,
            p.pain_points,
            p.goals,
            p.personality
        )
    })
}
