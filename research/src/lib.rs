//! Persona Lab Research Engine
//!
//! Synthetic user research: unique persona identities, segment catalogs,
//! templated personas, keyword-driven interviews and rough insights.

pub mod assembly;
pub mod components;
pub mod error;
pub mod insights;
pub mod interview;
pub mod names;
pub mod persistence;
pub mod products;
pub mod segments;
pub mod session;

pub use components::*;
pub use error::{ResearchError, Result};
pub use names::{generate, GenderRatio, IdentityGenerator, NamePool};
pub use persistence::{ExportData, ImportResult};
pub use session::ResearchSession;
