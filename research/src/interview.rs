//! Interview Engine
//!
//! Keyword-triggered persona replies, stock question sets and autonomous
//! interviews over many personas.

use rand::seq::SliceRandom;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::components::{ChatMessage, Persona, PersonaId, Product, Role};
use crate::insights::{interview_metrics, InterviewMetrics};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewStatus {
    Running,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interview {
    pub id: String,
    pub persona_id: PersonaId,
    pub product: Product,
    pub conversation: Vec<ChatMessage>,
    pub metrics: InterviewMetrics,
    pub status: InterviewStatus,
}

// ============================================================================
// Questions
// ============================================================================

/// Stock questions; `{product}` is replaced with the product name
const STOCK_QUESTIONS: &[&str] = &[
    "What is your first impression of {product}?",
    "What concerns would you have about buying it?",
    "How would it change your daily routine?",
    "What matters most to you in products like this?",
    "Have you used similar products before?",
    "Which problems should it solve for you?",
    "Would you recommend it to others?",
    "What is still missing for you to decide?",
];

/// The stock interview questions, cycled or truncated to `num_questions`.
pub fn default_questions(product: &Product, num_questions: usize) -> Vec<String> {
    STOCK_QUESTIONS
        .iter()
        .cycle()
        .take(num_questions)
        .map(|q| q.replace("{product}", &product.name))
        .collect()
}

// ============================================================================
// Adaptive Questions
// ============================================================================

/// Number of questions suggested per turn
pub const SUGGESTED_QUESTIONS: usize = 3;

/// Persona replies looked at when picking follow-ups
const RECENT_MESSAGES: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Topic {
    Price,
    Installation,
    Technology,
    Design,
    Sustainability,
    Family,
    Quality,
    Comparison,
    Concerns,
    Benefits,
}

impl Topic {
    const ALL: [Topic; 10] = [
        Topic::Price,
        Topic::Installation,
        Topic::Technology,
        Topic::Design,
        Topic::Sustainability,
        Topic::Family,
        Topic::Quality,
        Topic::Comparison,
        Topic::Concerns,
        Topic::Benefits,
    ];

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Topic::Price => &["price", "cost", "budget", "money", "expensive", "cheap", "afford", "investment"],
            Topic::Installation => &["install", "fitting", "tradespeople", "plumber", "diy", "yourself"],
            Topic::Technology => &["technology", "digital", "smart", "app", "controls"],
            Topic::Design => &["design", "look", "style", "colour"],
            Topic::Sustainability => &["sustainab", "environment", "energy", "water", "saving"],
            Topic::Family => &["family", "children", "kids", "daily", "morning", "stress"],
            Topic::Quality => &["quality", "robust", "durab", "lasts", "reliab"],
            Topic::Comparison => &["compare", "competitor", "alternative", "difference"],
            Topic::Concerns => &["concern", "problem", "difficult", "worr", "risk"],
            Topic::Benefits => &["benefit", "advantage", "help", "better", "improve"],
        }
    }
}

/// Opening questions for the example personas, keyed by full name
const OPENING_QUESTIONS: &[(&str, [&str; 3])] = &[
    (
        "Thomas Richter",
        [
            "Does {product} meet your premium standards for the villa?",
            "How important is exclusivity compared to standard solutions?",
            "What role does the future-proofing of the technology play for you?",
        ],
    ),
    (
        "Julia Schneider",
        [
            "How would you integrate {product} into your hotel projects?",
            "Which technical data do you need for planning?",
            "How do you rate its sustainability for your certifications?",
        ],
    ),
    (
        "Michael Wagner",
        [
            "How complicated is the installation of {product}?",
            "What margin can you make on it as a trade business?",
            "How good is the availability of spare parts and service?",
        ],
    ),
    (
        "Anna Bergmann",
        [
            "Does {product} fit your existing installations?",
            "How do you justify the investment against cheaper alternatives?",
            "How would it affect your ongoing house renovation?",
        ],
    ),
    (
        "Werner Hoffmann",
        [
            "Is {product} easy to use for older people as well?",
            "How safe do you feel with this new technology?",
            "Does the investment pay off over the next 20 years?",
        ],
    ),
    (
        "Sandra & Marco Keller",
        [
            "How would {product} reduce your morning rush with three children?",
            "Is it robust enough for everyday family life?",
            "Can you afford it on your family budget?",
        ],
    ),
    (
        "Lukas Bauer",
        [
            "Does {product} fit into your small flat and your budget?",
            "Could you install it yourself or would you need a tradesperson?",
            "Is it relevant for young people like you?",
        ],
    ),
];

const GENERIC_OPENING: [&str; 3] = [
    "What is your first impression of {product}?",
    "What concerns would you have about buying it?",
    "How would it change your daily routine?",
];

/// Persona-specific follow-ups per topic, keyed by full name
const PERSONA_FOLLOWUPS: &[(&str, &[(Topic, &str)])] = &[
    (
        "Thomas Richter",
        &[
            (Topic::Quality, "Which premium features are non-negotiable for you?"),
            (Topic::Design, "How important is the design language for your villa?"),
        ],
    ),
    (
        "Julia Schneider",
        &[
            (Topic::Sustainability, "Which certifications do your projects need?"),
            (Topic::Technology, "How do you integrate smart solutions into your plans?"),
        ],
    ),
    (
        "Michael Wagner",
        &[
            (Topic::Installation, "What training would you need for {product}?"),
            (Topic::Price, "How do you price premium products like this?"),
        ],
    ),
    (
        "Anna Bergmann",
        &[
            (Topic::Comparison, "Which products do you compare {product} with?"),
            (Topic::Quality, "How important is durability for your renovation?"),
        ],
    ),
    (
        "Werner Hoffmann",
        &[
            (Topic::Technology, "Would you need help operating it?"),
            (Topic::Family, "Should your children be able to use it too?"),
        ],
    ),
    (
        "Sandra & Marco Keller",
        &[
            (Topic::Family, "How would you explain the new technology to the kids?"),
            (Topic::Benefits, "Which time saving would be most valuable to you?"),
        ],
    ),
    (
        "Lukas Bauer",
        &[
            (Topic::Price, "Would you buy it in instalments?"),
            (Topic::Technology, "Which apps or features do you use most?"),
        ],
    ),
];

const GENERAL_FOLLOWUPS: &[&str] = &[
    "How would you describe {product} to your friends?",
    "What would your next step with {product} be?",
    "What questions do you still have about {product}?",
    "How important is the brand in this decision?",
    "Would you recommend {product}?",
];

/// Exactly three suggested questions for an ongoing chat.
///
/// Opening questions while the chat has at most one exchange, then
/// follow-ups on the topics of the persona's recent replies, padded with
/// general follow-ups.
pub fn adaptive_followups(persona: &Persona, product: &Product, history: &[ChatMessage]) -> Vec<String> {
    let fill = |q: &str| q.replace("{product}", &product.name);
    let name = persona.display_name.as_str();

    if history.len() <= 2 {
        let opening = OPENING_QUESTIONS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, questions)| questions)
            .unwrap_or(&GENERIC_OPENING);
        return opening.iter().map(|q| fill(*q)).collect();
    }

    let recent: Vec<String> = history[history.len().saturating_sub(RECENT_MESSAGES)..]
        .iter()
        .filter(|m| m.role == Role::Persona)
        .map(|m| m.content.to_lowercase())
        .collect();
    let topics: Vec<Topic> = Topic::ALL
        .into_iter()
        .filter(|t| {
            recent
                .iter()
                .any(|reply| t.keywords().iter().any(|k| reply.contains(k)))
        })
        .collect();
    let discussed = |topic: Topic| topics.contains(&topic);

    let mut questions = Vec::new();
    if discussed(Topic::Price) {
        questions.push(match name {
            "Thomas Richter" => fill("What extras would justify the price of {product}?"),
            "Lukas Bauer" => fill("Is there a financing option for {product}?"),
            _ => fill("What would {product} have to deliver to justify the price?"),
        });
    }
    if discussed(Topic::Installation) {
        questions.push("What kind of support do you expect after installation?".to_string());
    }
    if discussed(Topic::Technology) {
        questions.push("Which additional smart features would interest you?".to_string());
    }
    if discussed(Topic::Concerns) {
        questions.push(fill("What could address your concerns about {product}?"));
    }
    if discussed(Topic::Benefits) {
        questions.push(fill("Which benefit of {product} matters most to you?"));
    }

    if let Some((_, followups)) = PERSONA_FOLLOWUPS.iter().find(|(n, _)| *n == name) {
        questions.extend(
            followups
                .iter()
                .filter(|(topic, _)| discussed(*topic))
                .map(|(_, q)| fill(*q)),
        );
    }

    for q in GENERAL_FOLLOWUPS {
        if questions.len() >= SUGGESTED_QUESTIONS {
            break;
        }
        questions.push(fill(*q));
    }
    questions.truncate(SUGGESTED_QUESTIONS);
    questions
}

// ============================================================================
// Replies
// ============================================================================

/// Keyword groups that trigger a canned reply
const TOPICS: &[(&[&str], &[&str])] = &[
    (
        &["price", "cost", "afford", "expensive", "budget", "pay"],
        &[
            "Honestly, the price is my biggest question. At my budget, {product} has to last for years.",
            "It looks good, but if it is too expensive I would wait for a cheaper alternative.",
        ],
    ),
    (
        &["time", "routine", "daily", "day"],
        &[
            "If it saves me time in the morning, that would be great. My days are packed.",
            "Installation time worries me. I can't have the bathroom out of action for weeks.",
        ],
    ),
    (
        &["safe", "secur", "risk", "privacy"],
        &[
            "Safety matters a lot to me. I would want proof that {product} is safe to use every day.",
        ],
    ),
    (
        &["complicated", "complex", "difficult", "easy", "use"],
        &[
            "It has to be easy. If the controls are complicated, nobody in my house will use it.",
            "I like technology, but only when it does not make simple things difficult.",
        ],
    ),
    (
        &["compatible", "integrat", "connect", "existing"],
        &["Does it integrate with what I already have? I don't want to replace everything."],
    ),
    (
        &["support", "help", "install", "service"],
        &["Good support after the purchase is important. Who helps me if something breaks?"],
    ),
    (
        &["recommend", "friends", "others"],
        &[
            "If it holds up for a year, I would recommend it. I tell friends about things that work.",
            "Maybe. I only recommend products I would buy again myself.",
        ],
    ),
    (
        &["impression", "think", "feel", "opinion"],
        &[
            "My first impression is interesting. {product} looks well thought out.",
            "Honestly, I am unsure. The idea is good, but I need to see it in real life.",
        ],
    ),
];

/// Fallback replies by temperament, matched against the persona's personality
const PERSONALITY_REPLIES: &[(&[&str], &[&str])] = &[
    (
        &["analytical", "careful", "sceptical", "perfectionist", "detail"],
        &[
            "I would need hard facts before I believe that. What does {product} deliver over ten years?",
            "As a {job}, I look at the details first. Show me the specifications and we can talk.",
        ],
    ),
    (
        &["digital", "curious", "open to new"],
        &[
            "I'd look it up online first and read the reviews. If the design is good, I'm open to it.",
            "Sounds interesting. Is there an app, and what do other users say about {product}?",
        ],
    ),
    (
        &["pragmatic", "practical", "down to earth", "structured"],
        &[
            "It depends on whether it makes everyday life easier. As a {job}, I have no time for gimmicks.",
            "Show me how it works in a normal week and I'll tell you. What matters to me is {goal}",
        ],
    ),
];

const GENERIC_REPLIES: &[&str] = &[
    "That's a good question. As a {job}, I mostly care whether it fits my everyday life.",
    "I'd have to think about that. What matters most to me is {goal}",
    "Hard to say. I compare a lot before I decide anything.",
];

/// A canned reply chosen by keywords in the question.
///
/// Without a keyword match the reply comes from the persona's temperament,
/// or a generic reply mentioning the persona's job or goals.
pub fn reply<R: Rng + ?Sized>(persona: &Persona, product: &Product, question: &str, rng: &mut R) -> String {
    let question = question.to_lowercase();
    let template = TOPICS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| question.contains(k)))
        .map(|(_, replies)| *replies)
        .unwrap_or_else(|| personality_replies(&persona.personality))
        .choose(rng)
        .copied()
        .unwrap_or("I'm not sure.");

    template
        .replace("{product}", &product.name)
        .replace("{job}", &persona.job.to_lowercase())
        .replace("{goal}", &lowercase_first(&persona.goals))
}

fn personality_replies(personality: &str) -> &'static [&'static str] {
    let personality = personality.to_lowercase();
    PERSONALITY_REPLIES
        .iter()
        .find(|(traits, _)| traits.iter().any(|t| personality.contains(t)))
        .map(|(_, replies)| *replies)
        .unwrap_or(GENERIC_REPLIES)
}

fn lowercase_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ============================================================================
// Autonomous Interviews
// ============================================================================

/// Run a full scripted interview with one persona.
pub fn conduct_interview(id: String, persona: &Persona, product: &Product, questions: &[String]) -> Interview {
    let mut rng = rand::thread_rng();
    let mut interview = Interview {
        id,
        persona_id: persona.id,
        product: product.clone(),
        conversation: Vec::with_capacity(questions.len() * 2),
        metrics: InterviewMetrics::default(),
        status: InterviewStatus::Running,
    };

    for (i, question) in questions.iter().enumerate() {
        interview.conversation.push(ChatMessage::user(question.as_str()));
        let answer = reply(persona, product, question, &mut rng);
        interview.conversation.push(ChatMessage::persona(answer));
        debug!("{}: question {}/{}", interview.id, i + 1, questions.len());
    }

    interview.metrics = interview_metrics(&interview.conversation);
    interview.status = InterviewStatus::Completed;
    interview
}

/// Interview many personas in parallel. Output order follows `personas`
/// (a persona may appear more than once); ids are
/// `interview_{first_number + index}`.
pub fn run_interviews(
    personas: &[&Persona],
    product: &Product,
    questions: &[String],
    first_number: u64,
) -> Vec<Interview> {
    let interviews: Vec<Interview> = personas
        .par_iter()
        .enumerate()
        .map(|(i, persona)| {
            let id = format!("interview_{}", first_number + i as u64);
            conduct_interview(id, persona, product, questions)
        })
        .collect();

    info!(
        "Completed {} interviews about '{}' ({} questions each)",
        interviews.len(),
        product.name,
        questions.len()
    );
    interviews
}
