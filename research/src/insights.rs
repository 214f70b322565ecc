//! Insight Extraction
//!
//! Keyword-based sentiment, concern tagging and conviction scoring over
//! interview transcripts. Deliberately rough: plain substring matching on
//! lower-cased text.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::components::{ChatMessage, Role};

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "love", "perfect", "interesting", "helpful", "like", "excellent",
    "convincing", "impressive",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "problem", "difficult", "expensive", "complicated", "frustrating", "worried",
    "doubt", "unsure", "disappoint",
];

/// Sentiment above which a reply counts towards conviction
const CONVICTION_THRESHOLD: f64 = 0.6;

/// Neutral score used when no keywords match
pub const NEUTRAL: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Concern {
    Cost,
    Time,
    Security,
    Complexity,
    Integration,
    Support,
}

impl Concern {
    pub const ALL: [Concern; 6] = [
        Concern::Cost,
        Concern::Time,
        Concern::Security,
        Concern::Complexity,
        Concern::Integration,
        Concern::Support,
    ];

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Concern::Cost => &["cost", "price", "budget", "expensive"],
            Concern::Time => &["time", "duration", "fast", "slow", "delay"],
            Concern::Security => &["safe", "secur", "risk", "privacy"],
            Concern::Complexity => &["complex", "complicated", "difficult"],
            Concern::Integration => &["integrat", "compatib"],
            Concern::Support => &["support", "help", "training"],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Concern::Cost => "Cost",
            Concern::Time => "Time",
            Concern::Security => "Security",
            Concern::Complexity => "Complexity",
            Concern::Integration => "Integration",
            Concern::Support => "Support",
        }
    }
}

impl fmt::Display for Concern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Share of positive keyword hits among all keyword hits; neutral when none match.
pub fn analyze_sentiment(text: &str) -> f64 {
    let text = text.to_lowercase();
    let positive = POSITIVE_WORDS.iter().filter(|w| text.contains(*w)).count();
    let negative = NEGATIVE_WORDS.iter().filter(|w| text.contains(*w)).count();

    if positive + negative == 0 {
        return NEUTRAL;
    }
    positive as f64 / (positive + negative) as f64
}

pub fn extract_concerns(text: &str) -> BTreeSet<Concern> {
    let text = text.to_lowercase();
    Concern::ALL
        .into_iter()
        .filter(|c| c.keywords().iter().any(|k| text.contains(k)))
        .collect()
}

/// Share of persona replies that read clearly positive.
pub fn calculate_conviction(history: &[ChatMessage]) -> f64 {
    if history.is_empty() {
        return 0.0;
    }

    let replies: Vec<&ChatMessage> = history.iter().filter(|m| m.role == Role::Persona).collect();
    let positive = replies
        .iter()
        .filter(|m| analyze_sentiment(&m.content) > CONVICTION_THRESHOLD)
        .count();

    (positive as f64 / replies.len().max(1) as f64).min(1.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewMetrics {
    pub sentiment_score: f64,
    pub conviction_level: f64,
    pub main_concerns: BTreeSet<Concern>,
}

impl Default for InterviewMetrics {
    fn default() -> Self {
        Self {
            sentiment_score: NEUTRAL,
            conviction_level: NEUTRAL,
            main_concerns: BTreeSet::new(),
        }
    }
}

/// Metrics for one conversation, computed over the persona's replies
pub fn interview_metrics(conversation: &[ChatMessage]) -> InterviewMetrics {
    let replies: Vec<&str> = conversation
        .iter()
        .filter(|m| m.role == Role::Persona)
        .map(|m| m.content.as_str())
        .collect();

    if replies.is_empty() {
        return InterviewMetrics::default();
    }

    let sentiment_score =
        replies.iter().map(|r| analyze_sentiment(r)).sum::<f64>() / replies.len() as f64;
    let main_concerns = replies.iter().flat_map(|r| extract_concerns(r)).collect();

    InterviewMetrics {
        sentiment_score,
        conviction_level: calculate_conviction(conversation),
        main_concerns,
    }
}

// ============================================================================
// Summary across interviews
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcernCount {
    pub concern: Concern,
    pub interviews: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchSummary {
    pub interviews: usize,
    pub average_sentiment: f64,
    pub average_conviction: f64,
    /// Positive / neutral / negative interview counts
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    /// Most frequent first
    pub concerns: Vec<ConcernCount>,
}

/// Aggregate a set of interview metrics
pub fn summarize<'a>(metrics: impl IntoIterator<Item = &'a InterviewMetrics>) -> ResearchSummary {
    let mut count = 0usize;
    let (mut sentiment, mut conviction) = (0.0, 0.0);
    let (mut positive, mut neutral, mut negative) = (0, 0, 0);
    let mut concern_counts: HashMap<Concern, usize> = HashMap::new();

    for m in metrics {
        count += 1;
        sentiment += m.sentiment_score;
        conviction += m.conviction_level;
        if m.sentiment_score > CONVICTION_THRESHOLD {
            positive += 1;
        } else if m.sentiment_score < 1.0 - CONVICTION_THRESHOLD {
            negative += 1;
        } else {
            neutral += 1;
        }
        for concern in &m.main_concerns {
            *concern_counts.entry(*concern).or_default() += 1;
        }
    }

    let mut concerns: Vec<ConcernCount> = concern_counts
        .into_iter()
        .map(|(concern, interviews)| ConcernCount { concern, interviews })
        .collect();
    concerns.sort_by(|a, b| b.interviews.cmp(&a.interviews).then(a.concern.cmp(&b.concern)));

    let divisor = count.max(1) as f64;
    ResearchSummary {
        interviews: count,
        average_sentiment: if count == 0 { NEUTRAL } else { sentiment / divisor },
        average_conviction: if count == 0 { 0.0 } else { conviction / divisor },
        positive,
        neutral,
        negative,
        concerns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment() {
        assert_eq!(analyze_sentiment("The weather today."), NEUTRAL);
        assert_eq!(analyze_sentiment("That looks great, I love it"), 1.0);
        assert_eq!(analyze_sentiment("Too EXPENSIVE and complicated"), 0.0);
        assert_eq!(analyze_sentiment("Great idea, but expensive"), 0.5);
    }

    #[test]
    fn test_extract_concerns() {
        let concerns = extract_concerns("The price worries me, and installation takes time.");
        assert_eq!(
            concerns.into_iter().collect::<Vec<_>>(),
            vec![Concern::Cost, Concern::Time]
        );
        assert!(extract_concerns("Lovely colours.").is_empty());
        assert!(extract_concerns("Is it compatible with my system?").contains(&Concern::Integration));
    }

    #[test]
    fn test_conviction() {
        assert_eq!(calculate_conviction(&[]), 0.0);

        let history = vec![
            ChatMessage::user("What do you think?"),
            ChatMessage::persona("I love it, great design."),
            ChatMessage::user("And the price?"),
            ChatMessage::persona("Far too expensive."),
        ];
        assert_eq!(calculate_conviction(&history), 0.5);

        // Only questions, no replies
        assert_eq!(calculate_conviction(&[ChatMessage::user("Hello?")]), 0.0);
    }

    #[test]
    fn test_interview_metrics() {
        assert_eq!(interview_metrics(&[]), InterviewMetrics::default());

        let conversation = vec![
            ChatMessage::user("First impression?"),
            ChatMessage::persona("Interesting, but the budget is tight."),
            ChatMessage::user("Support?"),
            ChatMessage::persona("I would need help with the setup."),
        ];
        let metrics = interview_metrics(&conversation);
        assert_eq!(metrics.sentiment_score, 0.75);
        assert!(metrics.main_concerns.contains(&Concern::Cost));
        assert!(metrics.main_concerns.contains(&Concern::Support));
    }

    #[test]
    fn test_summarize() {
        let mut a = InterviewMetrics::default();
        a.sentiment_score = 0.9;
        a.conviction_level = 1.0;
        a.main_concerns.insert(Concern::Cost);

        let mut b = InterviewMetrics::default();
        b.sentiment_score = 0.1;
        b.conviction_level = 0.0;
        b.main_concerns.insert(Concern::Cost);
        b.main_concerns.insert(Concern::Time);

        let summary = summarize([&a, &b]);
        assert_eq!(summary.interviews, 2);
        assert!((summary.average_sentiment - 0.5).abs() < 1e-9);
        assert_eq!((summary.positive, summary.neutral, summary.negative), (1, 0, 1));
        assert_eq!(summary.concerns[0], ConcernCount { concern: Concern::Cost, interviews: 2 });
        assert_eq!(summary.concerns[1].concern, Concern::Time);

        let empty = summarize(std::iter::empty());
        assert_eq!(empty.interviews, 0);
        assert_eq!(empty.average_sentiment, NEUTRAL);
    }
}
