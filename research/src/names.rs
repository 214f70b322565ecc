//! Unique identity generation for personas
//!
//! Draws first names (by gender) and surnames from fixed lists and hands out
//! a batch of identities in which no `(first name, surname)` pair repeats.

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::components::{Gender, IdentityRecord};
use crate::error::{ResearchError, Result};

/// Sampling attempts per slot before accepting a repeated pair
pub const MAX_ATTEMPTS_PER_SLOT: usize = 100;

/// Common German first names for males
const MALE_FIRST_NAMES: &[&str] = &[
    "Thomas", "Michael", "Andreas", "Stefan", "Christian", "Markus", "Frank",
    "Jürgen", "Uwe", "Klaus", "Peter", "Wolfgang", "Matthias", "Tobias",
    "Alexander", "Sebastian", "Daniel", "Jan", "Florian", "Lukas", "Jonas",
    "Felix", "Maximilian", "Leon", "Paul", "Erik", "Niklas", "Tim", "Moritz",
    "Werner", "Dieter", "Bernd", "Marco", "Philipp", "Julian",
];

/// Common German first names for females
const FEMALE_FIRST_NAMES: &[&str] = &[
    "Anna", "Julia", "Sandra", "Sabine", "Claudia", "Petra", "Andrea", "Nicole",
    "Stefanie", "Katrin", "Susanne", "Birgit", "Monika", "Ursula", "Laura",
    "Lena", "Lea", "Sophie", "Marie", "Hannah", "Emma", "Mia", "Lisa", "Sarah",
    "Melanie", "Christina", "Franziska", "Johanna", "Miriam", "Heike", "Karin",
    "Ingrid", "Carina", "Nina", "Vanessa",
];

/// Common German surnames
const SURNAMES: &[&str] = &[
    "Müller", "Schmidt", "Schneider", "Fischer", "Weber", "Meyer", "Wagner",
    "Becker", "Schulz", "Hoffmann", "Schäfer", "Koch", "Bauer", "Richter",
    "Klein", "Wolf", "Schröder", "Neumann", "Schwarz", "Zimmermann", "Braun",
    "Krüger", "Hofmann", "Hartmann", "Lange", "Schmitt", "Werner", "Schmitz",
    "Krause", "Meier", "Lehmann", "Schmid", "Schulze", "Maier", "Köhler",
    "Herrmann", "König", "Walter", "Mayer", "Huber", "Kaiser", "Fuchs",
    "Peters", "Lang", "Scholz", "Möller", "Weiß", "Jung", "Hahn", "Keller",
    "Bergmann",
];

static BUILTIN_POOL: Lazy<NamePool> = Lazy::new(|| NamePool {
    male: MALE_FIRST_NAMES.iter().map(|s| s.to_string()).collect(),
    female: FEMALE_FIRST_NAMES.iter().map(|s| s.to_string()).collect(),
    surnames: SURNAMES.iter().map(|s| s.to_string()).collect(),
});

// ============================================================================
// Name Pool
// ============================================================================

/// First names partitioned by gender plus a shared surname list.
///
/// Read-only once built; the builtin pool is shared process-wide.
#[derive(Debug, Clone)]
pub struct NamePool {
    male: Vec<String>,
    female: Vec<String>,
    surnames: Vec<String>,
}

impl NamePool {
    /// The static pool compiled into the crate
    pub fn builtin() -> &'static NamePool {
        &BUILTIN_POOL
    }

    /// Build a custom pool. Duplicate entries within a list are rejected;
    /// empty lists are accepted and surface as `PoolExhausted` on use.
    pub fn new(male: Vec<String>, female: Vec<String>, surnames: Vec<String>) -> Result<Self> {
        for (label, list) in [("male", &male), ("female", &female), ("surname", &surnames)] {
            let mut seen = HashSet::with_capacity(list.len());
            if let Some(dup) = list.iter().find(|name| !seen.insert(name.as_str())) {
                return Err(ResearchError::InvalidArgument(format!(
                    "duplicate entry '{}' in {} pool",
                    dup, label
                )));
            }
        }
        Ok(Self { male, female, surnames })
    }

    pub fn first_names(&self, gender: Gender) -> &[String] {
        match gender {
            Gender::Male => &self.male,
            Gender::Female => &self.female,
        }
    }

    pub fn surnames(&self) -> &[String] {
        &self.surnames
    }

    pub fn contains_first_name(&self, gender: Gender, name: &str) -> bool {
        self.first_names(gender).iter().any(|n| n == name)
    }

    pub fn contains_surname(&self, name: &str) -> bool {
        self.surnames.iter().any(|n| n == name)
    }
}

// ============================================================================
// Gender Assignment
// ============================================================================

/// Per-slot gender assignment policy for a batch.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GenderRatio {
    /// Alternate male/female, starting with male
    #[default]
    Even,
    /// Exact counts; must add up to the batch size
    Counts { male: usize, female: usize },
    /// Share of male slots in `[0, 1]`, rounded to the nearest slot
    Proportional { male_share: f64 },
    /// One gender per slot, in order
    Slots(Vec<Gender>),
}

impl GenderRatio {
    /// Resolve the policy into one gender per slot.
    pub fn resolve<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Result<Vec<Gender>> {
        let slots = match self {
            GenderRatio::Even => (0..count)
                .map(|i| if i % 2 == 0 { Gender::Male } else { Gender::Female })
                .collect(),
            GenderRatio::Counts { male, female } => {
                if male + female != count {
                    return Err(ResearchError::InvalidArgument(format!(
                        "gender counts {} + {} do not match batch size {}",
                        male, female, count
                    )));
                }
                let mut slots = vec![Gender::Male; *male];
                slots.extend(std::iter::repeat(Gender::Female).take(*female));
                slots.shuffle(rng);
                slots
            }
            GenderRatio::Proportional { male_share } => {
                if !(0.0..=1.0).contains(male_share) {
                    return Err(ResearchError::InvalidArgument(format!(
                        "male share must be within [0, 1], got {}",
                        male_share
                    )));
                }
                let male = ((count as f64 * male_share).round() as usize).min(count);
                let mut slots = vec![Gender::Male; male];
                slots.extend(std::iter::repeat(Gender::Female).take(count - male));
                slots.shuffle(rng);
                slots
            }
            GenderRatio::Slots(slots) => {
                if slots.len() != count {
                    return Err(ResearchError::InvalidArgument(format!(
                        "{} gender slots given for batch size {}",
                        slots.len(),
                        count
                    )));
                }
                slots.clone()
            }
        };
        Ok(slots)
    }
}

// ============================================================================
// Identity Generator
// ============================================================================

/// Generates batches of identities with unique full names.
///
/// Uses rejection sampling with a bounded number of attempts per slot. Once
/// the attempts run out the last candidate is kept even if it repeats an
/// earlier pair, so a batch always has exactly the requested length.
#[derive(Debug, Clone, Copy)]
pub struct IdentityGenerator<'a> {
    pool: &'a NamePool,
    max_attempts: usize,
}

impl IdentityGenerator<'static> {
    pub fn builtin() -> Self {
        Self::new(NamePool::builtin())
    }
}

impl<'a> IdentityGenerator<'a> {
    pub fn new(pool: &'a NamePool) -> Self {
        Self {
            pool,
            max_attempts: MAX_ATTEMPTS_PER_SLOT,
        }
    }

    /// Override the per-slot attempt cap (at least one attempt is always made)
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Generate `count` identities using the thread-local RNG.
    pub fn generate(&self, count: i64, ratio: &GenderRatio) -> Result<Vec<IdentityRecord>> {
        self.generate_with_rng(count, ratio, &mut rand::thread_rng())
    }

    /// Generate `count` identities from the given RNG.
    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        count: i64,
        ratio: &GenderRatio,
        rng: &mut R,
    ) -> Result<Vec<IdentityRecord>> {
        let count = usize::try_from(count).map_err(|_| {
            ResearchError::InvalidArgument(format!("count must be non-negative, got {}", count))
        })?;

        let slots = ratio.resolve(count, rng)?;
        if count == 0 {
            return Ok(Vec::new());
        }

        // Fail before sampling so an empty pool can never spin
        let surnames = self.pool.surnames();
        if surnames.is_empty() {
            return Err(ResearchError::PoolExhausted("surname pool is empty".into()));
        }
        for gender in [Gender::Male, Gender::Female] {
            if slots.contains(&gender) && self.pool.first_names(gender).is_empty() {
                return Err(ResearchError::PoolExhausted(format!(
                    "{} first-name pool is empty",
                    gender
                )));
            }
        }

        let mut used: HashSet<(&str, &str)> = HashSet::with_capacity(count);
        let mut records = Vec::with_capacity(count);
        let mut repeated = 0usize;

        for gender in slots {
            let first_names = self.pool.first_names(gender);

            let mut pair = sample_pair(first_names, surnames, rng);
            let mut attempts = 1;
            while used.contains(&pair) && attempts < self.max_attempts {
                pair = sample_pair(first_names, surnames, rng);
                attempts += 1;
            }

            if used.contains(&pair) {
                repeated += 1;
                debug!("Slot {} kept repeated name {} {}", records.len(), pair.0, pair.1);
            }
            used.insert(pair);

            records.push(IdentityRecord {
                first_name: pair.0.to_string(),
                surname: pair.1.to_string(),
                gender,
            });
        }

        if repeated > 0 {
            warn!(
                "Name pool exhausted: {} of {} identities repeat an earlier name",
                repeated, count
            );
        }

        Ok(records)
    }
}

fn sample_pair<'p, R: Rng + ?Sized>(
    first_names: &'p [String],
    surnames: &'p [String],
    rng: &mut R,
) -> (&'p str, &'p str) {
    let first = &first_names[rng.gen_range(0..first_names.len())];
    let surname = &surnames[rng.gen_range(0..surnames.len())];
    (first.as_str(), surname.as_str())
}

/// Generate identities from the builtin pool
pub fn generate(count: i64, ratio: &GenderRatio) -> Result<Vec<IdentityRecord>> {
    IdentityGenerator::builtin().generate(count, ratio)
}

/// Display names for a batch: repeated full names get a ` (n)` suffix,
/// counting from the second occurrence.
pub fn disambiguated_names(records: &[IdentityRecord]) -> Vec<String> {
    let mut seen: HashMap<(&str, &str), usize> = HashMap::new();
    records
        .iter()
        .map(|r| {
            let n = seen.entry((r.first_name.as_str(), r.surname.as_str())).or_insert(0);
            *n += 1;
            if *n == 1 {
                r.full_name()
            } else {
                format!("{} ({})", r.full_name(), n)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn distinct_pairs(records: &[IdentityRecord]) -> usize {
        records
            .iter()
            .map(|r| (r.first_name.as_str(), r.surname.as_str()))
            .collect::<HashSet<_>>()
            .len()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_builtin_pools_have_no_duplicates() {
        let pool = NamePool::builtin();
        for list in [
            pool.first_names(Gender::Male),
            pool.first_names(Gender::Female),
            pool.surnames(),
        ] {
            assert!(!list.is_empty());
            let unique: HashSet<_> = list.iter().collect();
            assert_eq!(unique.len(), list.len());
        }
    }

    #[test]
    fn test_batches_are_full_length_and_unique() {
        for count in 1..=20 {
            for ratio in [
                GenderRatio::Even,
                GenderRatio::Proportional { male_share: 0.3 },
                GenderRatio::Slots(vec![Gender::Female; count]),
            ] {
                let batch = generate(count as i64, &ratio).unwrap();
                assert_eq!(batch.len(), count);
                assert_eq!(distinct_pairs(&batch), count, "duplicate in {:?}", batch);
            }
        }
    }

    #[test]
    fn test_zero_count_is_empty() {
        assert!(generate(0, &GenderRatio::Even).unwrap().is_empty());
        assert!(generate(0, &GenderRatio::Counts { male: 0, female: 0 }).unwrap().is_empty());
    }

    #[test]
    fn test_negative_count_is_invalid() {
        let err = generate(-1, &GenderRatio::Even).unwrap_err();
        assert!(matches!(err, ResearchError::InvalidArgument(_)));
    }

    #[test]
    fn test_gender_counts_are_exact() {
        let pool = NamePool::builtin();
        let batch = generate(5, &GenderRatio::Counts { male: 3, female: 2 }).unwrap();

        let males: Vec<_> = batch.iter().filter(|r| r.gender == Gender::Male).collect();
        let females: Vec<_> = batch.iter().filter(|r| r.gender == Gender::Female).collect();
        assert_eq!(males.len(), 3);
        assert_eq!(females.len(), 2);

        for r in &batch {
            assert!(pool.contains_first_name(r.gender, &r.first_name));
            assert!(pool.contains_surname(&r.surname));
        }
    }

    #[test]
    fn test_mismatched_ratio_is_invalid() {
        let err = generate(4, &GenderRatio::Counts { male: 3, female: 2 }).unwrap_err();
        assert!(matches!(err, ResearchError::InvalidArgument(_)));

        let err = generate(2, &GenderRatio::Slots(vec![Gender::Male])).unwrap_err();
        assert!(matches!(err, ResearchError::InvalidArgument(_)));

        let err = generate(2, &GenderRatio::Proportional { male_share: 1.5 }).unwrap_err();
        assert!(matches!(err, ResearchError::InvalidArgument(_)));
    }

    #[test]
    fn test_even_split_alternates() {
        let batch = generate(4, &GenderRatio::Even).unwrap();
        let genders: Vec<_> = batch.iter().map(|r| r.gender).collect();
        assert_eq!(
            genders,
            vec![Gender::Male, Gender::Female, Gender::Male, Gender::Female]
        );
    }

    #[test]
    fn test_proportional_rounds_to_nearest_slot() {
        let mut rng = StdRng::seed_from_u64(7);
        let slots = GenderRatio::Proportional { male_share: 0.25 }
            .resolve(10, &mut rng)
            .unwrap();
        // 2.5 rounds away from zero
        assert_eq!(slots.iter().filter(|g| **g == Gender::Male).count(), 3);
    }

    #[test]
    fn test_exhaustion_still_returns_full_batch() {
        let pool = NamePool::new(names(&["Erik"]), names(&["Anna"]), names(&["Fischer", "Weber"]))
            .unwrap();
        let generator = IdentityGenerator::new(&pool);
        let mut rng = StdRng::seed_from_u64(42);

        let batch = generator
            .generate_with_rng(5, &GenderRatio::Slots(vec![Gender::Male; 5]), &mut rng)
            .unwrap();

        assert_eq!(batch.len(), 5);
        // Only two distinct male names exist
        assert_eq!(distinct_pairs(&batch), 2);
        assert!(batch.iter().all(|r| r.first_name == "Erik"));
    }

    #[test]
    fn test_surnames_may_repeat_across_first_names() {
        let pool = NamePool::new(names(&["Erik", "Jan"]), names(&["Anna"]), names(&["Fischer"]))
            .unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let batch = IdentityGenerator::new(&pool)
            .generate_with_rng(3, &GenderRatio::Even, &mut rng)
            .unwrap();

        assert_eq!(distinct_pairs(&batch), 3);
        assert!(batch.iter().all(|r| r.surname == "Fischer"));
    }

    #[test]
    fn test_empty_pool_is_reported() {
        let pool = NamePool::new(names(&["Erik"]), Vec::new(), names(&["Fischer"])).unwrap();
        let generator = IdentityGenerator::new(&pool);

        let err = generator.generate(2, &GenderRatio::Even).unwrap_err();
        assert!(matches!(err, ResearchError::PoolExhausted(_)));

        // Male-only batches never touch the empty list
        let batch = generator
            .generate(1, &GenderRatio::Slots(vec![Gender::Male]))
            .unwrap();
        assert_eq!(batch[0].full_name(), "Erik Fischer");

        let no_surnames = NamePool::new(names(&["Erik"]), names(&["Anna"]), Vec::new()).unwrap();
        let err = IdentityGenerator::new(&no_surnames)
            .generate(1, &GenderRatio::Even)
            .unwrap_err();
        assert!(matches!(err, ResearchError::PoolExhausted(_)));
    }

    #[test]
    fn test_pool_rejects_duplicates() {
        let err = NamePool::new(names(&["Erik", "Erik"]), names(&["Anna"]), names(&["Weber"]))
            .unwrap_err();
        assert!(matches!(err, ResearchError::InvalidArgument(_)));
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let generator = IdentityGenerator::builtin();
        let a = generator
            .generate_with_rng(8, &GenderRatio::Even, &mut StdRng::seed_from_u64(99))
            .unwrap();
        let b = generator
            .generate_with_rng(8, &GenderRatio::Even, &mut StdRng::seed_from_u64(99))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_disambiguated_names() {
        let erik = IdentityRecord {
            first_name: "Erik".into(),
            surname: "Fischer".into(),
            gender: Gender::Male,
        };
        let anna = IdentityRecord {
            first_name: "Anna".into(),
            surname: "Fischer".into(),
            gender: Gender::Female,
        };
        let names = disambiguated_names(&[erik.clone(), anna, erik.clone(), erik]);
        assert_eq!(
            names,
            vec!["Erik Fischer", "Anna Fischer", "Erik Fischer (2)", "Erik Fischer (3)"]
        );
    }
}
