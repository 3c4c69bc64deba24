use once_cell::sync::Lazy;
use regex::Regex;

use crate::gate::is_travel_query;
use crate::models::{MessageAnalysis, QueryType};

const ITINERARY_KEYWORDS: &[&str] = &[
    "plan",
    "itinerary",
    "day trip",
    "days",
    "schedule",
    "agenda",
    "what should i do",
    "what to do",
];

const BUDGET_KEYWORDS: &[&str] = &[
    "budget",
    "cost",
    "price",
    "expensive",
    "how much",
    "afford",
    "spend",
    "money",
];

const ATTRACTION_KEYWORDS: &[&str] = &[
    "attraction",
    "visit",
    "see",
    "place",
    "spot",
    "museum",
    "temple",
    "church",
    "monument",
    "must-see",
    "best places",
];

const TIME_KEYWORDS: &[&str] = &[
    "when",
    "best time",
    "season",
    "weather",
    "climate",
    "rain",
    "hot",
    "cold",
    "month",
];

const PRACTICAL_KEYWORDS: &[&str] = &[
    "transport",
    "getting around",
    "taxi",
    "train",
    "bus",
    "flight",
    "food",
    "eat",
    "restaurant",
    "language",
    "culture",
    "tip",
];

const ACTIVITY_KEYWORDS: &[&str] = &[
    "adventure",
    "relax",
    "family",
    "couple",
    "solo",
    "nightlife",
    "beach",
    "hiking",
    "shopping",
    "dining",
];

static DURATION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+)\s*-?\s*day").expect("valid duration regex"));

/// Keyword table for one scored query type.
pub fn keywords_for(query_type: QueryType) -> &'static [&'static str] {
    match query_type {
        QueryType::Itinerary => ITINERARY_KEYWORDS,
        QueryType::Budget => BUDGET_KEYWORDS,
        QueryType::Attraction => ATTRACTION_KEYWORDS,
        QueryType::Time => TIME_KEYWORDS,
        QueryType::Practical => PRACTICAL_KEYWORDS,
        QueryType::Activity => ACTIVITY_KEYWORDS,
        QueryType::General => &[],
    }
}

/// Per-type keyword hit counts for a single message, in evaluation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationScore {
    scores: Vec<(QueryType, u32)>,
}

impl ClassificationScore {
    pub fn get(&self, query_type: QueryType) -> u32 {
        self.scores
            .iter()
            .find(|(kind, _)| *kind == query_type)
            .map(|(_, score)| *score)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (QueryType, u32)> + '_ {
        self.scores.iter().copied()
    }

    /// Highest scoring type; the earliest one wins a tie, all-zero is `General`.
    pub fn best(&self) -> QueryType {
        let mut best = QueryType::General;
        let mut best_score = 0;
        for (kind, score) in self.iter() {
            if score > best_score {
                best = kind;
                best_score = score;
            }
        }
        best
    }
}

pub fn score_query(text: &str) -> ClassificationScore {
    let lower = text.to_lowercase();
    let scores = QueryType::ALL_SCORED
        .iter()
        .map(|kind| (*kind, count_hits(&lower, keywords_for(*kind))))
        .collect();

    ClassificationScore { scores }
}

pub fn classify_query_type(text: &str) -> QueryType {
    score_query(text).best()
}

/// First ASCII number written directly before "day", e.g. "3 days", "3-day" or "3day".
///
/// Matches too large for a `u32` are skipped in favour of the next one.
pub fn extract_duration(text: &str) -> Option<u32> {
    let lower = text.to_lowercase();
    DURATION_PATTERN
        .captures_iter(&lower)
        .filter_map(|caps| caps.get(1))
        .find_map(|digits| digits.as_str().parse().ok())
}

pub fn analyze_message(text: &str) -> MessageAnalysis {
    MessageAnalysis {
        query_type: classify_query_type(text),
        duration_days: extract_duration(text),
        travel_related: is_travel_query(text),
    }
}

pub(crate) fn contains_any(input: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| input.contains(needle))
}

fn count_hits(input: &str, needles: &[&str]) -> u32 {
    needles.iter().filter(|needle| input.contains(*needle)).count() as u32
}
