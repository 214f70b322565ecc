//! Core records shared across the research engine
//!
//! Identities, personas, products and chat messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ResearchError, Result};

// ============================================================================
// Identity
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PersonaId(pub u64);

impl fmt::Display for PersonaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ResearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            other => Err(ResearchError::InvalidArgument(format!(
                "unknown gender '{}', expected male or female",
                other
            ))),
        }
    }
}

/// Minimal naming unit produced by the identity generator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub first_name: String,
    pub surname: String,
    pub gender: Gender,
}

impl IdentityRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.surname)
    }
}

// ============================================================================
// Persona
// ============================================================================

/// A fictional consumer built from a segment and an identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    pub id: PersonaId,
    pub identity: IdentityRecord,
    /// Name shown to the user; carries a suffix when the identity repeats
    pub display_name: String,
    pub age: u8,
    pub job: String,
    pub company: String,
    pub experience: String,
    pub pain_points: String,
    pub goals: String,
    pub personality: String,
    /// Name of the segment this persona was assembled from
    pub segment: String,
}

/// Hand-entered persona fields; the session assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonaDraft {
    /// Full name; the last word is taken as the surname
    pub name: String,
    pub gender: Gender,
    pub age: u8,
    pub job: String,
    pub company: String,
    pub experience: String,
    pub pain_points: String,
    pub goals: String,
    pub personality: String,
}

/// Age bounds accepted for hand-entered personas
pub const CUSTOM_AGE_RANGE: std::ops::RangeInclusive<u8> = 18..=100;

/// Segment label for hand-entered personas
pub const CUSTOM_SEGMENT: &str = "Custom";

impl PersonaDraft {
    pub fn into_persona(self, id: PersonaId) -> Result<Persona> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ResearchError::InvalidArgument("persona name is empty".into()));
        }
        if !CUSTOM_AGE_RANGE.contains(&self.age) {
            return Err(ResearchError::InvalidArgument(format!(
                "age {} is outside {}-{}",
                self.age,
                CUSTOM_AGE_RANGE.start(),
                CUSTOM_AGE_RANGE.end()
            )));
        }

        let (first_name, surname) = match name.rsplit_once(char::is_whitespace) {
            Some((first, last)) => (first.trim_end().to_string(), last.to_string()),
            None => (name.to_string(), String::new()),
        };

        Ok(Persona {
            id,
            identity: IdentityRecord {
                first_name,
                surname,
                gender: self.gender,
            },
            display_name: name.to_string(),
            age: self.age,
            job: self.job,
            company: self.company,
            experience: self.experience,
            pain_points: self.pain_points,
            goals: self.goals,
            personality: self.personality,
            segment: CUSTOM_SEGMENT.to_string(),
        })
    }
}

/// The product under research.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub description: String,
    pub value_proposition: String,
    pub target_market: String,
}

impl Product {
    /// A product described by hand rather than taken from the templates
    pub fn custom(
        name: &str,
        description: &str,
        value_proposition: &str,
        target_market: &str,
    ) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ResearchError::InvalidArgument("product name is empty".into()));
        }
        Ok(Self {
            name: name.to_string(),
            description: description.trim().to_string(),
            value_proposition: value_proposition.trim().to_string(),
            target_market: target_market.trim().to_string(),
        })
    }
}

// ============================================================================
// Conversation
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Persona,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn persona(content: impl Into<String>) -> Self {
        Self {
            role: Role::Persona,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}
