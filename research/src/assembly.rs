//! Persona Assembly
//!
//! Turns a segment plus a batch of unique identities into full personas by
//! filling static text templates.

use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracing::info;

use crate::components::{Gender, IdentityRecord, Persona, PersonaId};
use crate::error::{ResearchError, Result};
use crate::names::{disambiguated_names, IdentityGenerator};
use crate::segments::Segment;

/// Jobs by age band: young (< 35), established (35-54), senior (55+)
const JOBS: [&[&str]; 3] = [
    &[
        "Junior Software Developer",
        "UX Designer",
        "Marketing Coordinator",
        "Nurse",
        "Sustainability Consultant",
    ],
    &[
        "Senior Architect",
        "Plumbing Contractor",
        "Marketing Manager",
        "Hotel Operations Manager",
        "Managing Partner",
    ],
    &[
        "Retired Teacher",
        "Semi-retired Engineer",
        "Pharmacist",
        "Former Civil Servant",
        "Independent Consultant",
    ],
];

const COMPANIES: [&[&str]; 3] = [
    &[
        "Fintech startup with 45 employees",
        "Regional hospital",
        "Digital agency in the city centre",
    ],
    &[
        "Mid-sized engineering firm (300 employees)",
        "Own trade business with 12 employees",
        "Architecture practice (35 employees)",
    ],
    &[
        "Retired, volunteers on the local senior council",
        "Part-time advisor to a family business",
        "Small practice run with a partner",
    ],
];

/// Pain points keyed by motivation keyword
const PAIN_POINTS: &[(&str, &str)] = &[
    ("quality", "Too many products look premium in the brochure and disappoint after a year."),
    ("status", "Most manufacturers offer nothing that feels genuinely exclusive."),
    ("innovation", "Worries that today's smart features will be outdated in ten years."),
    ("value", "Struggles to tell which upgrades are worth the money and which are marketing."),
    ("functionality", "Mornings are chaotic and the current setup makes them worse."),
    ("safety", "Keeps noticing sharp edges, slippery floors and things children can break."),
    ("durability", "Replaced cheap fittings twice already and is tired of repairs."),
    ("sustainability", "Finds it hard to verify eco claims and distrusts greenwashing."),
    ("cost", "Running costs for water and energy keep climbing."),
    ("roi", "Every purchase has to pay back within a tight budget cycle."),
    ("reliability", "Downtime and complaints cost time and reputation."),
    ("maintenance", "Maintenance contracts eat up more of the budget every year."),
    ("comfort", "Everyday routines have become more tiring than they used to be."),
    ("accessibility", "Refuses products that look like hospital equipment."),
    ("ease", "Modern controls feel fiddly and the manuals are no help."),
];

const GENERIC_PAIN_POINT: &str = "Feels overwhelmed by the number of options on the market.";

fn age_band(age: u8) -> usize {
    match age {
        0..=34 => 0,
        35..=54 => 1,
        _ => 2,
    }
}

/// Builds personas for a segment.
#[derive(Debug, Clone, Copy)]
pub struct PersonaAssembler<'a> {
    identities: IdentityGenerator<'a>,
}

impl PersonaAssembler<'static> {
    pub fn builtin() -> Self {
        Self::new(IdentityGenerator::builtin())
    }
}

impl<'a> PersonaAssembler<'a> {
    pub fn new(identities: IdentityGenerator<'a>) -> Self {
        Self { identities }
    }

    /// Assemble personas for a segment using the thread-local RNG.
    ///
    /// `count` defaults to the segment's persona count; ids start at `first_id`.
    pub fn assemble(&self, segment: &Segment, count: Option<u32>, first_id: u64) -> Result<Vec<Persona>> {
        self.assemble_with_rng(segment, count, first_id, &mut rand::thread_rng())
    }

    pub fn assemble_with_rng<R: Rng + ?Sized>(
        &self,
        segment: &Segment,
        count: Option<u32>,
        first_id: u64,
        rng: &mut R,
    ) -> Result<Vec<Persona>> {
        let count = count.unwrap_or(segment.persona_count);
        let identities =
            self.identities
                .generate_with_rng(i64::from(count), &segment.gender_ratio(), rng)?;
        let display_names = disambiguated_names(&identities);

        let ages = AgeSampler::new(segment)?;
        let personas: Vec<Persona> = identities
            .into_iter()
            .zip(display_names)
            .enumerate()
            .map(|(i, (identity, display_name))| {
                let age = ages.sample(rng);
                fill_persona(
                    PersonaId(first_id + i as u64),
                    identity,
                    display_name,
                    age,
                    segment,
                    rng,
                )
            })
            .collect();

        info!(
            "Assembled {} personas for segment '{}'",
            personas.len(),
            segment.name
        );
        Ok(personas)
    }
}

/// Normal distribution over the segment's age range, clamped to it
struct AgeSampler {
    min: u8,
    max: u8,
    normal: Normal<f64>,
}

impl AgeSampler {
    fn new(segment: &Segment) -> Result<Self> {
        let (min, max) = (segment.age_min, segment.age_max);
        let mean = (f64::from(min) + f64::from(max)) / 2.0;
        let std_dev = f64::from(max.saturating_sub(min)) / 4.0;
        let normal = Normal::new(mean, std_dev)
            .map_err(|e| ResearchError::InvalidArgument(format!("age distribution: {}", e)))?;
        Ok(Self { min, max, normal })
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u8 {
        let age = self.normal.sample(rng).round();
        age.clamp(f64::from(self.min), f64::from(self.max)) as u8
    }
}

fn fill_persona<R: Rng + ?Sized>(
    id: PersonaId,
    identity: IdentityRecord,
    display_name: String,
    age: u8,
    segment: &Segment,
    rng: &mut R,
) -> Persona {
    let band = age_band(age);
    let job = JOBS[band].choose(rng).copied().unwrap_or("Consultant");
    let company = COMPANIES[band].choose(rng).copied().unwrap_or("Self-employed");
    let first = identity.first_name.clone();
    let (pronoun, possessive) = match identity.gender {
        Gender::Male => ("He", "his"),
        Gender::Female => ("She", "her"),
    };

    let experience = format!(
        "{} lives in {}. {} describes {} renovation experience as {} and follows a {} lifestyle on a {} income.",
        first,
        segment.location.to_lowercase(),
        pronoun,
        possessive,
        segment.experience_level.to_lowercase(),
        segment.lifestyle.to_lowercase(),
        segment.income_level.to_lowercase(),
    );

    let mut pains: Vec<&str> = segment
        .key_motivations
        .iter()
        .filter_map(|m| pain_point_for(m))
        .collect();
    pains.dedup();
    pains.truncate(2);
    let pain_points = if pains.is_empty() {
        GENERIC_PAIN_POINT.to_string()
    } else {
        pains.join(" ")
    };

    let goals = match segment.key_motivations.as_slice() {
        [] => format!("{} wants a solution that simply works.", first),
        [only] => format!("{} is looking for {}.", first, only.to_lowercase()),
        [a, b, ..] => format!(
            "{} is looking for {} above all, followed closely by {}.",
            first,
            a.to_lowercase(),
            b.to_lowercase()
        ),
    };

    let personality = personality_for(&segment.tech_comfort, pronoun);

    Persona {
        id,
        identity,
        display_name,
        age,
        job: job.to_string(),
        company: company.to_string(),
        experience,
        pain_points,
        goals,
        personality,
        segment: segment.name.clone(),
    }
}

fn pain_point_for(motivation: &str) -> Option<&'static str> {
    let motivation = motivation.to_lowercase();
    PAIN_POINTS
        .iter()
        .find(|(key, _)| motivation.contains(key))
        .map(|(_, text)| *text)
}

fn personality_for(tech_comfort: &str, pronoun: &str) -> String {
    let comfort = tech_comfort.to_lowercase();
    if comfort.starts_with("high") {
        format!("Digitally fluent and curious. {} researches everything online and trusts reviews over sales pitches.", pronoun)
    } else if comfort.starts_with("low") {
        format!("Careful and analytical. {} questions advertising promises and values things that last.", pronoun)
    } else {
        format!("Pragmatic and structured. {} likes trends but decides on value for money.", pronoun)
    }
}

// ============================================================================
// Example Personas
// ============================================================================

/// Hand-written personas for demos and as a fallback (ids 1-7)
pub fn example_personas() -> Vec<Persona> {
    let example = |id: u64,
                   (first, surname, gender): (&str, &str, Gender),
                   age: u8,
                   job: &str,
                   company: &str,
                   experience: &str,
                   pain_points: &str,
                   goals: &str,
                   personality: &str,
                   segment: &str| {
        let identity = IdentityRecord {
            first_name: first.into(),
            surname: surname.into(),
            gender,
        };
        Persona {
            id: PersonaId(id),
            display_name: identity.full_name(),
            identity,
            age,
            job: job.into(),
            company: company.into(),
            experience: experience.into(),
            pain_points: pain_points.into(),
            goals: goals.into(),
            personality: personality.into(),
            segment: segment.into(),
        }
    };

    vec![
        example(
            1,
            ("Thomas", "Richter", Gender::Male),
            52,
            "Managing Partner",
            "Richter & Partner Strategic Consulting (120 employees)",
            "Has completed two property projects and is building a third villa by the lake.",
            "Balancing timeless design with technology that still works in ten years. Most manufacturers offer nothing truly exclusive.",
            "A private wellness retreat that integrates impressive technology seamlessly.",
            "A perfectionist who pays for exceptional quality, but only from authentic brands.",
            "Premium Homeowners",
        ),
        example(
            2,
            ("Julia", "Schneider", Gender::Female),
            38,
            "Senior Architect",
            "Architecture practice (35 employees)",
            "Twelve years of high-end residential and hotel projects.",
            "Missing CAD and BIM data, unreliable delivery times, products discontinued at short notice.",
            "Present clients solutions that still convince in twenty years.",
            "Detail-oriented and systematic; fascinated by innovation but always pragmatic.",
            "Commercial Decision Makers",
        ),
        example(
            3,
            ("Michael", "Wagner", Gender::Male),
            46,
            "Master Plumber and Owner",
            "Wagner Building Services (12 employees)",
            "Runs his own business for fifteen years, specialised in full renovations.",
            "Skilled-labour shortage, complicated installation manuals, time lost on complaints.",
            "Reliable products that install quickly and keep a good margin.",
            "Down to earth and direct; quality and reliability come first.",
            "Commercial Decision Makers",
        ),
        example(
            4,
            ("Anna", "Bergmann", Gender::Female),
            42,
            "Marketing Manager",
            "Mid-sized engineering firm (300 employees)",
            "Bought a 1970s house three years ago and modernises it step by step.",
            "Overwhelmed by choice, limited budget, coordinating tradespeople is stressful.",
            "A modern, easy-care bathroom that raises the value of the house.",
            "Structured and researches thoroughly; inspired by trends but pragmatic.",
            "Growing Families",
        ),
        example(
            5,
            ("Werner", "Hoffmann", Gender::Male),
            68,
            "Retired Teacher",
            "Retired, volunteers on the local senior council",
            "Has lived in the same house for forty years and is adapting it for old age.",
            "Future-proofing the investment; controls his wife finds hard to use; products that look clinical.",
            "Safety without a care-home look, so they can stay independent for longer.",
            "Analytical and sceptical of marketing claims; longevity beats trends.",
            "Active Seniors",
        ),
        example(
            6,
            ("Sandra & Marco", "Keller", Gender::Female),
            37,
            "Part-time Controller & Head of Sales",
            "Energy supplier and a medical technology company",
            "Bought a terraced house five years ago and renovate it room by room. With three children (4, 8 and 11) the bathroom is the bottleneck every morning.",
            "Morning rush with five people in one bathroom, no clever storage, children who waste water and break things.",
            "A family bathroom that calms everyday life, with robust fittings and two washbasins.",
            "Sandra organises and puts practicality over design; Marco questions every expense. Stressed but loving.",
            "Growing Families",
        ),
        example(
            7,
            ("Lukas", "Bauer", Gender::Male),
            26,
            "Junior Software Developer",
            "Fintech startup with 45 employees",
            "Moved into his first flat six months ago; researches on YouTube and review sites.",
            "Tight budget, a tiny bathroom, unsure how long he will stay.",
            "A small but modern bathroom that looks good on Instagram.",
            "Digitally fluent, open to new brands with good design at fair prices.",
            "Eco-Conscious Millennials",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::{GenderRatio, NamePool};
    use crate::segments::SegmentCatalog;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_assemble_uses_segment_count_and_age_range() {
        let catalog = SegmentCatalog::builtin();
        let segment = catalog.find("Active Seniors").unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        let personas = PersonaAssembler::builtin()
            .assemble_with_rng(segment, None, 10, &mut rng)
            .unwrap();

        assert_eq!(personas.len(), segment.persona_count as usize);
        for (i, p) in personas.iter().enumerate() {
            assert_eq!(p.id, PersonaId(10 + i as u64));
            assert!(p.age >= segment.age_min && p.age <= segment.age_max);
            assert_eq!(p.segment, "Active Seniors");
            assert!(p.experience.starts_with(&p.identity.first_name));
            let pronouns = match p.identity.gender {
                Gender::Male => ("He describes his", "She "),
                Gender::Female => ("She describes her", "He "),
            };
            assert!(p.experience.contains(pronouns.0), "{}", p.experience);
            assert!(!p.experience.contains(pronouns.1), "{}", p.experience);
            assert!(!p.experience.contains("their"), "{}", p.experience);
        }

        let names: HashSet<_> = personas.iter().map(|p| p.display_name.clone()).collect();
        assert_eq!(names.len(), personas.len());
    }

    #[test]
    fn test_assemble_count_override_and_ratio() {
        let mut segment = SegmentCatalog::builtin()
            .find("Growing Families")
            .unwrap()
            .clone();
        segment.male_share = Some(1.0);

        let personas = PersonaAssembler::builtin().assemble(&segment, Some(7), 1).unwrap();
        assert_eq!(personas.len(), 7);
        assert!(personas.iter().all(|p| p.identity.gender == Gender::Male));
        assert_eq!(segment.gender_ratio(), GenderRatio::Proportional { male_share: 1.0 });
    }

    #[test]
    fn test_pain_points_follow_motivations() {
        let segment = SegmentCatalog::builtin()
            .find("Growing Families")
            .unwrap()
            .clone();
        let personas = PersonaAssembler::builtin().assemble(&segment, Some(1), 1).unwrap();
        assert!(personas[0].pain_points.contains("Mornings are chaotic"));
        assert!(personas[0].goals.contains("functionality"));
    }

    #[test]
    fn test_exhausted_pool_gets_suffixed_names() {
        let pool = NamePool::new(
            vec!["Erik".into()],
            vec!["Anna".into()],
            vec!["Fischer".into()],
        )
        .unwrap();
        let assembler = PersonaAssembler::new(IdentityGenerator::new(&pool).with_max_attempts(3));
        let mut segment = SegmentCatalog::builtin().find("Active Seniors").unwrap().clone();
        segment.male_share = Some(1.0);

        let personas = assembler.assemble(&segment, Some(3), 1).unwrap();
        let names: Vec<_> = personas.iter().map(|p| p.display_name.as_str()).collect();
        assert_eq!(names, vec!["Erik Fischer", "Erik Fischer (2)", "Erik Fischer (3)"]);
    }

    #[test]
    fn test_single_age_segment() {
        let mut segment = SegmentCatalog::builtin().find("Active Seniors").unwrap().clone();
        segment.age_min = 60;
        segment.age_max = 60;
        let personas = PersonaAssembler::builtin().assemble(&segment, Some(3), 1).unwrap();
        assert!(personas.iter().all(|p| p.age == 60));
    }

    #[test]
    fn test_example_personas() {
        let examples = example_personas();
        assert_eq!(examples.len(), 7);
        assert_eq!(examples[5].display_name, "Sandra & Marco Keller");
        let ids: HashSet<_> = examples.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), examples.len());
    }
}
