//! Research Session - main orchestrator

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, warn};

use crate::assembly::PersonaAssembler;
use crate::components::{ChatMessage, Persona, PersonaDraft, PersonaId, Product};
use crate::error::{ResearchError, Result};
use crate::insights::{interview_metrics, summarize, InterviewMetrics, ResearchSummary};
use crate::interview::{self, Interview};
use crate::segments::Segment;

pub struct ResearchSession {
    pub segment: Option<Segment>,
    pub personas: Vec<Persona>,
    pub product: Option<Product>,
    pub interviews: Vec<Interview>,
    /// Live chat transcripts, one per persona talked to
    pub chats: Vec<(PersonaId, Vec<ChatMessage>)>,
    pub next_persona_id: u64,
    pub next_interview_number: u64,
}

impl ResearchSession {
    pub fn new() -> Self {
        Self {
            segment: None,
            personas: Vec::new(),
            product: None,
            interviews: Vec::new(),
            chats: Vec::new(),
            next_persona_id: 1,
            next_interview_number: 1,
        }
    }

    /// Replace the persona set with a fresh batch for `segment`.
    ///
    /// Interviews and chats belong to the replaced set and are dropped.
    pub fn assemble_personas(&mut self, segment: &Segment, count: Option<u32>) -> Result<&[Persona]> {
        self.assemble_with_rng(
            &PersonaAssembler::builtin(),
            segment,
            count,
            &mut rand::thread_rng(),
        )
    }

    pub fn assemble_with_rng<R: Rng + ?Sized>(
        &mut self,
        assembler: &PersonaAssembler<'_>,
        segment: &Segment,
        count: Option<u32>,
        rng: &mut R,
    ) -> Result<&[Persona]> {
        let personas = assembler.assemble_with_rng(segment, count, self.next_persona_id, rng)?;
        self.next_persona_id += personas.len() as u64;

        self.replace_personas(personas, Some(segment.clone()));
        Ok(&self.personas)
    }

    /// Use a prepared persona set (e.g. the examples) instead of assembling one.
    /// Like assembly this starts a new study without a segment.
    pub fn load_personas(&mut self, personas: Vec<Persona>) {
        let after_loaded = personas.iter().map(|p| p.id.0 + 1).max().unwrap_or(1);
        self.next_persona_id = self.next_persona_id.max(after_loaded);
        self.replace_personas(personas, None);
    }

    fn replace_personas(&mut self, personas: Vec<Persona>, segment: Option<Segment>) {
        if !self.interviews.is_empty() || !self.chats.is_empty() {
            warn!(
                "Replacing personas drops {} interviews and {} chats",
                self.interviews.len(),
                self.chats.len()
            );
        }
        self.interviews.clear();
        self.chats.clear();
        self.segment = segment;
        self.personas = personas;
    }

    /// Add a hand-built persona to the current set
    pub fn add_persona(&mut self, draft: PersonaDraft) -> Result<&Persona> {
        let persona = draft.into_persona(PersonaId(self.next_persona_id))?;
        self.next_persona_id += 1;
        info!("Added persona #{} {}", persona.id, persona.display_name);
        self.personas.push(persona);
        Ok(&self.personas[self.personas.len() - 1])
    }

    pub fn set_product(&mut self, product: Product) {
        info!("Product under research: {}", product.name);
        self.product = Some(product);
    }

    pub fn persona(&self, id: PersonaId) -> Result<&Persona> {
        self.personas
            .iter()
            .find(|p| p.id == id)
            .ok_or(ResearchError::PersonaNotFound(id.0))
    }

    /// One chat turn: record the question and the persona's reply, return the reply.
    pub fn ask(&mut self, persona_id: PersonaId, question: &str) -> Result<String> {
        let product = self.product.as_ref().ok_or(ResearchError::NoProduct)?;
        let persona = self.persona(persona_id)?;
        let answer = interview::reply(persona, product, question, &mut rand::thread_rng());

        let history = match self.chats.iter().position(|(id, _)| *id == persona_id) {
            Some(pos) => &mut self.chats[pos].1,
            None => {
                self.chats.push((persona_id, Vec::new()));
                let last = self.chats.len() - 1;
                &mut self.chats[last].1
            }
        };
        history.push(ChatMessage::user(question));
        history.push(ChatMessage::persona(answer.as_str()));

        Ok(answer)
    }

    pub fn chat_history(&self, persona_id: PersonaId) -> &[ChatMessage] {
        self.chats
            .iter()
            .find(|(id, _)| *id == persona_id)
            .map(|(_, history)| history.as_slice())
            .unwrap_or(&[])
    }

    /// Live metrics for an ongoing chat
    pub fn chat_metrics(&self, persona_id: PersonaId) -> InterviewMetrics {
        interview_metrics(self.chat_history(persona_id))
    }

    /// Follow-up questions for an ongoing chat
    pub fn suggested_questions(&self, persona_id: PersonaId) -> Result<Vec<String>> {
        let product = self.product.as_ref().ok_or(ResearchError::NoProduct)?;
        let persona = self.persona(persona_id)?;
        Ok(interview::adaptive_followups(persona, product, self.chat_history(persona_id)))
    }

    /// Run `num_interviews` interviews (one per persona when `None`) with
    /// the stock questions. Personas are taken in order; once every persona
    /// has been interviewed the rest are picked at random. Returns the new
    /// interviews.
    pub fn run_autonomous(
        &mut self,
        num_interviews: Option<usize>,
        questions_per_interview: usize,
    ) -> Result<&[Interview]> {
        self.run_autonomous_with_rng(num_interviews, questions_per_interview, &mut rand::thread_rng())
    }

    pub fn run_autonomous_with_rng<R: Rng + ?Sized>(
        &mut self,
        num_interviews: Option<usize>,
        questions_per_interview: usize,
        rng: &mut R,
    ) -> Result<&[Interview]> {
        let product = self.product.as_ref().ok_or(ResearchError::NoProduct)?;
        let wanted = num_interviews.unwrap_or(self.personas.len());
        if wanted > 0 && self.personas.is_empty() {
            return Err(ResearchError::InvalidArgument("no personas to interview".into()));
        }

        let mut selected: Vec<&Persona> = self.personas.iter().take(wanted).collect();
        while selected.len() < wanted {
            match self.personas.choose(rng) {
                Some(persona) => selected.push(persona),
                None => break,
            }
        }
        if wanted > self.personas.len() {
            info!(
                "{} interviews requested for {} personas, reusing random personas",
                wanted,
                self.personas.len()
            );
        }

        let questions = interview::default_questions(product, questions_per_interview);
        let batch = interview::run_interviews(
            &selected,
            product,
            &questions,
            self.next_interview_number,
        );
        self.next_interview_number += batch.len() as u64;

        let start = self.interviews.len();
        self.interviews.extend(batch);
        Ok(&self.interviews[start..])
    }

    pub fn summary(&self) -> ResearchSummary {
        summarize(self.interviews.iter().map(|i| &i.metrics))
    }
}

impl Default for ResearchSession {
    fn default() -> Self {
        Self::new()
    }
}
