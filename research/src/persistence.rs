//! Persistence module for export/import of research sessions
//!
//! Serializes a whole session to JSON and restores it; also renders the CSV
//! summary and Markdown report exports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

use crate::components::{ChatMessage, Persona, PersonaId, Product, Role};
use crate::error::{ResearchError, Result};
use crate::interview::Interview;
use crate::segments::Segment;
use crate::session::ResearchSession;

/// Current schema version
pub const EXPORT_VERSION: u8 = 1;

// ============================================================================
// Export Data Structures
// ============================================================================

/// Complete session state for persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportData {
    pub version: u8, // Schema version for forward compatibility
    pub exported_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<Segment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
    pub personas: Vec<Persona>,
    pub interviews: Vec<Interview>,
    #[serde(default)]
    pub chats: Vec<ExportedChat>,
    pub next_persona_id: u64,
    pub next_interview_number: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedChat {
    pub persona_id: PersonaId,
    pub messages: Vec<ChatMessage>,
}

/// Result of import operation
#[derive(Debug, Clone, PartialEq)]
pub struct ImportResult {
    pub personas: usize,
    pub interviews: usize,
    pub chats: usize,
}

// ============================================================================
// Export Implementation
// ============================================================================

impl ResearchSession {
    pub fn export_data(&self) -> ExportData {
        ExportData {
            version: EXPORT_VERSION,
            exported_at: Utc::now(),
            segment: self.segment.clone(),
            product: self.product.clone(),
            personas: self.personas.clone(),
            interviews: self.interviews.clone(),
            chats: self
                .chats
                .iter()
                .map(|(persona_id, messages)| ExportedChat {
                    persona_id: *persona_id,
                    messages: messages.clone(),
                })
                .collect(),
            next_persona_id: self.next_persona_id,
            next_interview_number: self.next_interview_number,
        }
    }

    /// Export entire session state to pretty-printed JSON
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.export_data())?)
    }

    /// Import session state from JSON, replacing current state
    pub fn import_json(&mut self, json: &str) -> Result<ImportResult> {
        let data: ExportData = serde_json::from_str(json)?;

        if data.version != EXPORT_VERSION {
            return Err(ResearchError::UnsupportedVersion(data.version));
        }

        let result = ImportResult {
            personas: data.personas.len(),
            interviews: data.interviews.len(),
            chats: data.chats.len(),
        };

        self.segment = data.segment;
        self.product = data.product;
        self.personas = data.personas;
        self.interviews = data.interviews;
        self.chats = data
            .chats
            .into_iter()
            .map(|chat| (chat.persona_id, chat.messages))
            .collect();
        self.next_persona_id = data.next_persona_id;
        self.next_interview_number = data.next_interview_number;

        Ok(result)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.export_json()?)?;
        info!("Saved session to {}", path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let mut session = Self::new();
        let result = session.import_json(&json)?;
        info!(
            "Loaded session from {}: {} personas, {} interviews",
            path.display(),
            result.personas,
            result.interviews
        );
        Ok(session)
    }

    // ========================================================================
    // Reports
    // ========================================================================

    /// One CSV row per interview
    pub fn summary_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record([
            "interview",
            "persona",
            "age",
            "job",
            "segment",
            "sentiment",
            "conviction",
            "concerns",
        ])?;

        for interview in &self.interviews {
            let persona = self.persona(interview.persona_id).ok();
            let concerns: Vec<&str> = interview.metrics.main_concerns.iter().map(|c| c.label()).collect();
            writer.write_record([
                interview.id.clone(),
                persona.map(|p| p.display_name.clone()).unwrap_or_default(),
                persona.map(|p| p.age.to_string()).unwrap_or_default(),
                persona.map(|p| p.job.clone()).unwrap_or_default(),
                persona.map(|p| p.segment.clone()).unwrap_or_default(),
                format!("{:.2}", interview.metrics.sentiment_score),
                format!("{:.2}", interview.metrics.conviction_level),
                concerns.join("; "),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ResearchError::Io(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Human-readable research report
    pub fn markdown_report(&self) -> String {
        let summary = self.summary();
        let mut out = String::new();

        let product = self.product.as_ref().map(|p| p.name.as_str()).unwrap_or("(no product)");
        let _ = writeln!(out, "# Research Report: {}\n", product);
        if let Some(segment) = &self.segment {
            let _ = writeln!(out, "Segment: **{}** ({}, ages {})\n", segment.name, segment.framework, segment.age_range());
        }

        let _ = writeln!(out, "## Summary\n");
        let _ = writeln!(out, "- Interviews: {}", summary.interviews);
        let _ = writeln!(out, "- Average sentiment: {:.0}%", summary.average_sentiment * 100.0);
        let _ = writeln!(out, "- Average conviction: {:.0}%", summary.average_conviction * 100.0);
        let _ = writeln!(
            out,
            "- Positive / neutral / negative: {} / {} / {}\n",
            summary.positive, summary.neutral, summary.negative
        );

        if !summary.concerns.is_empty() {
            let _ = writeln!(out, "## Top Concerns\n");
            for c in &summary.concerns {
                let _ = writeln!(out, "- {}: {} interview(s)", c.concern, c.interviews);
            }
            let _ = writeln!(out);
        }

        let _ = writeln!(out, "## Interviews\n");
        for interview in &self.interviews {
            let name = self
                .persona(interview.persona_id)
                .map(|p| format!("{} ({}, {})", p.display_name, p.age, p.job))
                .unwrap_or_else(|_| format!("persona {}", interview.persona_id));
            let _ = writeln!(out, "### {} with {}\n", interview.id, name);
            for message in &interview.conversation {
                let speaker = match message.role {
                    Role::User => "Q",
                    Role::Persona => "A",
                };
                let _ = writeln!(out, "**{}:** {}\n", speaker, message.content);
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::example_personas;
    use crate::segments::SegmentCatalog;

    fn session_with_interviews() -> ResearchSession {
        let mut session = ResearchSession::new();
        session
            .assemble_personas(SegmentCatalog::builtin().find("Premium Homeowners").unwrap(), Some(3))
            .unwrap();
        session.set_product(Product {
            name: "LuxRain".into(),
            description: "Rain shower".into(),
            value_proposition: "Spa at home".into(),
            target_market: "Villas".into(),
        });
        session.run_autonomous(None, 4).unwrap();
        session.ask(PersonaId(1), "What about the price?").unwrap();
        session
    }

    #[test]
    fn test_json_export_import() {
        let session = session_with_interviews();
        let json = session.export_json().unwrap();

        let mut restored = ResearchSession::new();
        let result = restored.import_json(&json).unwrap();
        assert_eq!(result, ImportResult { personas: 3, interviews: 3, chats: 1 });
        assert_eq!(restored.next_persona_id, 4);
        assert_eq!(restored.next_interview_number, 4);
        assert_eq!(restored.personas[0].display_name, session.personas[0].display_name);
        let (before, after) = (&session.interviews[2].metrics, &restored.interviews[2].metrics);
        assert_eq!(after.main_concerns, before.main_concerns);
        assert!((after.sentiment_score - before.sentiment_score).abs() < 1e-9);
        assert_eq!(restored.chat_history(PersonaId(1)).len(), 2);
        assert_eq!(restored.segment, session.segment);
    }

    #[test]
    fn test_import_rejects_unknown_version() {
        let mut data = ResearchSession::new().export_data();
        data.version = 2;
        let json = serde_json::to_string(&data).unwrap();

        let err = ResearchSession::new().import_json(&json).unwrap_err();
        assert!(matches!(err, ResearchError::UnsupportedVersion(2)));

        let err = ResearchSession::new().import_json("{not json").unwrap_err();
        assert!(matches!(err, ResearchError::Json(_)));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut session = ResearchSession::new();
        session.load_personas(example_personas());
        session.save(&path).unwrap();

        let loaded = ResearchSession::load(&path).unwrap();
        assert_eq!(loaded.personas.len(), 7);
        assert!(loaded.product.is_none());
    }

    #[test]
    fn test_summary_csv() {
        let session = session_with_interviews();
        let csv = session.summary_csv().unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("interview,persona,age"));
        assert!(lines[1].starts_with("interview_1,"));
    }

    #[test]
    fn test_markdown_report() {
        let session = session_with_interviews();
        let report = session.markdown_report();
        assert!(report.starts_with("# Research Report: LuxRain"));
        assert!(report.contains("Segment: **Premium Homeowners**"));
        assert!(report.contains("- Interviews: 3"));
        assert!(report.contains("### interview_3 with"));
    }
}
