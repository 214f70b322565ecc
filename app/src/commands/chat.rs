use anyhow::Result;
use research::insights::InterviewMetrics;
use research::{PersonaId, ResearchSession};
use std::io::{self, BufRead, Write};
use tracing::info;

use crate::commands::product::select_product;
use crate::state::AppState;

/// Interactive chat with one persona over stdin/stdout. The transcript is
/// saved into the session when the chat ends.
pub fn chat(state: &AppState, persona_id: u64, product: Option<&str>) -> Result<()> {
    let mut session = state.open_session()?;
    select_product(&mut session, product, &state.config.default_product)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let turns = run_chat(&mut session, PersonaId(persona_id), stdin.lock(), stdout.lock())?;
    info!("Chat with persona {} ended after {} turns", persona_id, turns);

    state.save_session(&session)
}

fn render_metrics(metrics: &InterviewMetrics) -> String {
    let concerns: Vec<String> = metrics.main_concerns.iter().map(|c| c.to_string()).collect();
    format!(
        "sentiment {:.0}% | conviction {:.0}% | concerns: {}",
        metrics.sentiment_score * 100.0,
        metrics.conviction_level * 100.0,
        if concerns.is_empty() { "none".to_string() } else { concerns.join(", ") }
    )
}

/// Chat loop: a blank line or `/quit` ends it, `/insights` shows live
/// metrics, `/suggest` proposes follow-up questions. Returns the number of
/// questions asked.
pub fn run_chat<R: BufRead, W: Write>(
    session: &mut ResearchSession,
    persona_id: PersonaId,
    input: R,
    mut output: W,
) -> Result<usize> {
    let persona = session.persona(persona_id)?;
    writeln!(
        output,
        "Talking to {} ({}, {}). Blank line or /quit to stop.",
        persona.display_name, persona.age, persona.job
    )?;
    let name = persona.identity.first_name.clone();

    let mut turns = 0;
    for line in input.lines() {
        let line = line?;
        let question = line.trim();
        match question {
            "" | "/quit" => break,
            "/insights" => {
                writeln!(output, "{}", render_metrics(&session.chat_metrics(persona_id)))?;
            }
            "/suggest" => {
                for q in session.suggested_questions(persona_id)? {
                    writeln!(output, "  - {}", q)?;
                }
            }
            _ => {
                let answer = session.ask(persona_id, question)?;
                writeln!(output, "{}: {}", name, answer)?;
                turns += 1;
            }
        }
    }

    Ok(turns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use research::assembly::example_personas;
    use std::io::Cursor;

    fn session() -> ResearchSession {
        let mut session = ResearchSession::new();
        session.load_personas(example_personas());
        select_product(&mut session, Some("connect hub"), "FlexSpace System").unwrap();
        session
    }

    #[test]
    fn test_chat_loop() {
        let mut session = session();
        let input = Cursor::new("What does it cost?\n/insights\nWould you recommend it?\n/quit\nignored\n");
        let mut output = Vec::new();

        let turns = run_chat(&mut session, PersonaId(1), input, &mut output).unwrap();
        assert_eq!(turns, 2);
        assert_eq!(session.chat_history(PersonaId(1)).len(), 4);

        let text = String::from_utf8(output).unwrap();
        assert!(text.starts_with("Talking to Thomas Richter"));
        assert!(text.contains("sentiment"));
        assert!(text.contains("Thomas: "));
    }

    #[test]
    fn test_unknown_persona() {
        let mut session = session();
        let result = run_chat(&mut session, PersonaId(42), Cursor::new(""), Vec::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_suggest_lists_three_questions() {
        let mut session = session();
        let mut output = Vec::new();
        run_chat(&mut session, PersonaId(4), Cursor::new("/suggest\n"), &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.lines().filter(|l| l.starts_with("  - ")).count(), 3);
        assert!(text.contains("Does Connect Hub fit your existing installations?"));
    }
}
