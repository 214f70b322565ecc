//! Segment catalog
//!
//! Consumer segments drive persona assembly: they carry the age range,
//! motivations and the number of personas to build. A small builtin catalog
//! ships with the crate; more segments can be loaded from CSV.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{ResearchError, Result};
use crate::names::GenderRatio;

/// Framework label for the builtin segments
pub const BUILTIN_FRAMEWORK: &str = "Demographic templates";

/// A consumer segment from some segmentation framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub name: String,
    pub framework: String,
    pub age_min: u8,
    pub age_max: u8,
    pub income_level: String,
    pub location: String,
    pub lifestyle: String,
    pub tech_comfort: String,
    pub experience_level: String,
    pub key_motivations: Vec<String>,
    pub description: String,
    pub persona_count: u32,
    /// Share of male personas; an even split when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub male_share: Option<f64>,
}

impl Segment {
    pub fn age_range(&self) -> String {
        format!("{}-{}", self.age_min, self.age_max)
    }

    pub fn gender_ratio(&self) -> GenderRatio {
        match self.male_share {
            Some(male_share) => GenderRatio::Proportional { male_share },
            None => GenderRatio::Even,
        }
    }

    fn validate(&self) -> Result<()> {
        let invalid = |reason: String| ResearchError::InvalidSegment {
            name: self.name.clone(),
            reason,
        };
        if self.name.trim().is_empty() {
            return Err(invalid("name is empty".into()));
        }
        if self.age_min > self.age_max {
            return Err(invalid(format!(
                "age_min {} is above age_max {}",
                self.age_min, self.age_max
            )));
        }
        if self.persona_count == 0 {
            return Err(invalid("persona_count must be at least 1".into()));
        }
        if let Some(share) = self.male_share {
            if !(0.0..=1.0).contains(&share) {
                return Err(invalid(format!("male_share {} is outside [0, 1]", share)));
            }
        }
        Ok(())
    }
}

/// Flat CSV row; `key_motivations` is `;`-separated
#[derive(Debug, Deserialize)]
struct SegmentRow {
    name: String,
    framework: String,
    age_min: u8,
    age_max: u8,
    income_level: String,
    location: String,
    lifestyle: String,
    tech_comfort: String,
    experience_level: String,
    key_motivations: String,
    description: String,
    persona_count: u32,
    #[serde(default)]
    male_share: Option<f64>,
}

impl From<SegmentRow> for Segment {
    fn from(row: SegmentRow) -> Self {
        Segment {
            name: row.name.trim().to_string(),
            framework: row.framework,
            age_min: row.age_min,
            age_max: row.age_max,
            income_level: row.income_level,
            location: row.location,
            lifestyle: row.lifestyle,
            tech_comfort: row.tech_comfort,
            experience_level: row.experience_level,
            key_motivations: row
                .key_motivations
                .split(';')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(String::from)
                .collect(),
            description: row.description,
            persona_count: row.persona_count,
            male_share: row.male_share,
        }
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Ordered set of segments, keyed by case-insensitive name.
#[derive(Debug, Clone, Default)]
pub struct SegmentCatalog {
    segments: Vec<Segment>,
}

impl SegmentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding the builtin segments
    pub fn builtin() -> Self {
        Self {
            segments: BUILTIN_SEGMENTS.clone(),
        }
    }

    /// Parse segments from CSV with a header row.
    pub fn from_csv<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let mut catalog = Self::new();
        for row in csv_reader.deserialize::<SegmentRow>() {
            let segment = Segment::from(row?);
            segment.validate()?;
            debug!("Loaded segment '{}' ({})", segment.name, segment.framework);
            catalog.insert(segment);
        }
        Ok(catalog)
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let catalog = Self::from_csv(file)?;
        info!("Loaded {} segments from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Add a segment, replacing any segment with the same name
    pub fn insert(&mut self, segment: Segment) {
        match self.position(&segment.name) {
            Some(pos) => self.segments[pos] = segment,
            None => self.segments.push(segment),
        }
    }

    /// Merge another catalog into this one; its segments win on name clashes
    pub fn merge(&mut self, other: SegmentCatalog) {
        for segment in other.segments {
            self.insert(segment);
        }
    }

    pub fn find(&self, name: &str) -> Result<&Segment> {
        self.position(name)
            .map(|pos| &self.segments[pos])
            .ok_or_else(|| ResearchError::SegmentNotFound(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    /// Segments belonging to one framework
    pub fn by_framework<'a>(&'a self, framework: &'a str) -> impl Iterator<Item = &'a Segment> {
        self.segments
            .iter()
            .filter(move |s| s.framework.eq_ignore_ascii_case(framework))
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.segments
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name))
    }
}

// ============================================================================
// Builtin Segments
// ============================================================================

fn builtin(
    name: &str,
    (age_min, age_max): (u8, u8),
    income_level: &str,
    location: &str,
    lifestyle: &str,
    tech_comfort: &str,
    experience_level: &str,
    key_motivations: &[&str],
    description: &str,
) -> Segment {
    Segment {
        name: name.into(),
        framework: BUILTIN_FRAMEWORK.into(),
        age_min,
        age_max,
        income_level: income_level.into(),
        location: location.into(),
        lifestyle: lifestyle.into(),
        tech_comfort: tech_comfort.into(),
        experience_level: experience_level.into(),
        key_motivations: key_motivations.iter().map(|m| m.to_string()).collect(),
        description: description.into(),
        persona_count: 5,
        male_share: None,
    }
}

static BUILTIN_SEGMENTS: Lazy<Vec<Segment>> = Lazy::new(|| {
    vec![
        builtin(
            "Premium Homeowners",
            (35, 65),
            "High (€80k+)",
            "Urban/Suburban premium areas",
            "Quality-focused, design-conscious",
            "Medium to High",
            "Some to Extensive",
            &["Quality", "Status", "Long-term value", "Innovation"],
            "Affluent homeowners who value premium quality and are willing to invest in \
             high-end solutions. They appreciate craftsmanship, innovation, and products \
             that reflect their status.",
        ),
        builtin(
            "Growing Families",
            (28, 45),
            "Medium to High (€50k-100k)",
            "Suburban family neighborhoods",
            "Family-focused, practical, busy",
            "Medium",
            "Limited to Some",
            &["Functionality", "Safety", "Durability", "Value for money"],
            "Young to middle-aged families with children who prioritize practical \
             solutions that make daily life easier. They need robust, safe products that \
             can handle family use.",
        ),
        builtin(
            "Eco-Conscious Millennials",
            (25, 40),
            "Medium (€40k-80k)",
            "Urban areas, eco-friendly communities",
            "Sustainability-focused, tech-savvy",
            "High",
            "DIY-friendly, research-heavy",
            &["Sustainability", "Innovation", "Cost savings", "Environmental impact"],
            "Environmentally conscious millennials who research extensively and prefer \
             sustainable, innovative solutions. They're willing to invest in eco-friendly \
             technology.",
        ),
        builtin(
            "Commercial Decision Makers",
            (35, 55),
            "Business/Corporate",
            "Commercial properties, hotels, offices",
            "Professional, efficiency-focused",
            "Medium to High",
            "Extensive (professional)",
            &["ROI", "Reliability", "Maintenance costs", "Guest satisfaction"],
            "Professional decision makers in hospitality, real estate, or facilities \
             management who focus on operational efficiency, cost-effectiveness, and \
             customer satisfaction.",
        ),
        builtin(
            "Active Seniors",
            (55, 75),
            "Medium to High (established wealth)",
            "Established neighborhoods, retirement communities",
            "Comfort-focused, accessibility-aware",
            "Low to Medium",
            "Extensive life experience",
            &["Comfort", "Accessibility", "Reliability", "Ease of use"],
            "Active seniors who are planning for aging in place. They value comfort, \
             accessibility, and reliable products that are easy to use and maintain.",
        ),
    ]
});

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "name,framework,age_min,age_max,income_level,location,lifestyle,\
tech_comfort,experience_level,key_motivations,description,persona_count,male_share\n";

    #[test]
    fn test_builtin_catalog() {
        let catalog = SegmentCatalog::builtin();
        assert_eq!(catalog.len(), 5);
        let families = catalog.find("growing families").unwrap();
        assert_eq!(families.age_range(), "28-45");
        assert_eq!(families.gender_ratio(), GenderRatio::Even);
        assert_eq!(catalog.by_framework(BUILTIN_FRAMEWORK).count(), 5);
    }

    #[test]
    fn test_unknown_segment() {
        let err = SegmentCatalog::builtin().find("Astronauts").unwrap_err();
        assert!(matches!(err, ResearchError::SegmentNotFound(name) if name == "Astronauts"));
    }

    #[test]
    fn test_load_csv() {
        let data = format!(
            "{}{}{}",
            HEADER,
            "Adaptive Navigators,Values,30,50,Middle,Urban,Flexible,High,Some,Freedom; Balance ;,Pragmatic movers,3,0.4\n",
            "Traditionalists,Values,60,80,Low,Rural,Settled,Low,Extensive,Security,Rooted and careful,2,\n",
        );
        let catalog = SegmentCatalog::from_csv(data.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 2);

        let navigators = catalog.find("Adaptive Navigators").unwrap();
        assert_eq!(navigators.key_motivations, vec!["Freedom", "Balance"]);
        assert_eq!(navigators.persona_count, 3);
        assert_eq!(
            navigators.gender_ratio(),
            GenderRatio::Proportional { male_share: 0.4 }
        );

        let traditionalists = catalog.find("traditionalists").unwrap();
        assert_eq!(traditionalists.male_share, None);
    }

    #[test]
    fn test_csv_rejects_inverted_age_range() {
        let data = format!(
            "{}{}",
            HEADER, "Broken,Values,50,30,Middle,Urban,Flexible,High,Some,Freedom,Oops,3,\n"
        );
        let err = SegmentCatalog::from_csv(data.as_bytes()).unwrap_err();
        assert!(matches!(err, ResearchError::InvalidSegment { name, .. } if name == "Broken"));
    }

    #[test]
    fn test_csv_rejects_zero_personas() {
        let data = format!(
            "{}{}",
            HEADER, "Empty,Values,30,50,Middle,Urban,Flexible,High,Some,Freedom,None,0,\n"
        );
        let err = SegmentCatalog::from_csv(data.as_bytes()).unwrap_err();
        assert!(matches!(err, ResearchError::InvalidSegment { .. }));
    }

    #[test]
    fn test_merge_replaces_by_name() {
        let mut catalog = SegmentCatalog::builtin();
        let data = format!(
            "{}{}",
            HEADER,
            "Active Seniors,Custom,60,70,High,Coast,Sailing,Medium,Some,Comfort,Retired sailors,2,\n"
        );
        catalog.merge(SegmentCatalog::from_csv(data.as_bytes()).unwrap());

        assert_eq!(catalog.len(), 5);
        let seniors = catalog.find("Active Seniors").unwrap();
        assert_eq!(seniors.framework, "Custom");
        assert_eq!(seniors.persona_count, 2);
    }

    #[test]
    fn test_load_csv_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("segments.csv");
        std::fs::write(
            &path,
            format!(
                "{}{}",
                HEADER, "Urban Pioneers,Values,20,35,Middle,City,Mobile,High,Little,Novelty,Early adopters,4,0.5\n"
            ),
        )
        .unwrap();

        let catalog = SegmentCatalog::from_csv_path(&path).unwrap();
        assert_eq!(catalog.find("Urban Pioneers").unwrap().persona_count, 4);
    }
}
