use anyhow::{Context, Result};
use research::segments::{Segment, SegmentCatalog};
use research::{Persona, ResearchSession};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::LabConfig;

/// Application state shared by every command
pub struct AppState {
    pub config: LabConfig,
    pub catalog: SegmentCatalog,
    pub session_path: PathBuf,
    pub json: bool,
}

impl AppState {
    pub fn new(config: LabConfig, session_path: Option<PathBuf>, json: bool) -> Result<Self> {
        let mut catalog = SegmentCatalog::builtin();
        for file in &config.segment_files {
            catalog.merge(
                SegmentCatalog::from_csv_path(file)
                    .with_context(|| format!("Failed to load segments from {}", file.display()))?,
            );
        }

        let session_path = session_path.unwrap_or_else(|| config.session_path.clone());
        Ok(Self {
            config,
            catalog,
            session_path,
            json,
        })
    }

    pub fn add_segments(&mut self, csv: &Path) -> Result<()> {
        let loaded = SegmentCatalog::from_csv_path(csv)
            .with_context(|| format!("Failed to load segments from {}", csv.display()))?;
        self.catalog.merge(loaded);
        Ok(())
    }

    /// Load the session file, or start a fresh session if it doesn't exist yet
    pub fn open_session(&self) -> Result<ResearchSession> {
        if !self.session_path.exists() {
            info!("Starting new session at {}", self.session_path.display());
            return Ok(ResearchSession::new());
        }
        ResearchSession::load(&self.session_path)
            .with_context(|| format!("Failed to load session {}", self.session_path.display()))
    }

    pub fn save_session(&self, session: &ResearchSession) -> Result<()> {
        session
            .save(&self.session_path)
            .with_context(|| format!("Failed to save session {}", self.session_path.display()))
    }

    /// Print as JSON in `--json` mode, otherwise via the text renderer
    pub fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            print!("{}", text(value));
        }
        Ok(())
    }
}

// -- Serializable types returned by commands --

#[derive(Serialize, Clone)]
pub struct SegmentData {
    pub name: String,
    pub framework: String,
    pub age_range: String,
    pub persona_count: u32,
    pub key_motivations: Vec<String>,
}

impl From<&Segment> for SegmentData {
    fn from(segment: &Segment) -> Self {
        Self {
            name: segment.name.clone(),
            framework: segment.framework.clone(),
            age_range: segment.age_range(),
            persona_count: segment.persona_count,
            key_motivations: segment.key_motivations.clone(),
        }
    }
}

#[derive(Serialize, Clone)]
pub struct PersonaData {
    pub id: u64,
    pub name: String,
    pub gender: String,
    pub age: u8,
    pub job: String,
    pub segment: String,
}

impl From<&Persona> for PersonaData {
    fn from(persona: &Persona) -> Self {
        Self {
            id: persona.id.0,
            name: persona.display_name.clone(),
            gender: persona.identity.gender.to_string(),
            age: persona.age,
            job: persona.job.clone(),
            segment: persona.segment.clone(),
        }
    }
}

#[derive(Serialize, Clone)]
pub struct InterviewData {
    pub id: String,
    pub persona_id: u64,
    pub sentiment: f64,
    pub conviction: f64,
    pub concerns: Vec<String>,
}
